//! PNG chart rendering for the analysis stage.

use crate::analysis::summary::{self, VolatilityPoint, CORRELATION_LABELS};
use crate::errors::{Result, LmeHubError};
use crate::models::record::PriceRecord;
use chrono::{Duration, NaiveDate};
use log::info;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const TRENDS_FILE: &str = "lme_copper_trends.png";
const DISTRIBUTION_FILE: &str = "lme_copper_distribution.png";
const VOLATILITY_FILE: &str = "lme_copper_volatility.png";
const CORRELATION_FILE: &str = "lme_copper_correlation.png";

const HISTOGRAM_BINS: usize = 50;

fn chart_err<E: std::fmt::Display>(e: E) -> LmeHubError {
    LmeHubError::ChartError(e.to_string())
}

/// Date axis range with one day of padding so single-day datasets still
/// produce a drawable range
fn date_range(records: &[PriceRecord]) -> Result<(NaiveDate, NaiveDate)> {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) => Ok((first.date - Duration::days(1), last.date + Duration::days(1))),
        _ => Err(LmeHubError::DataError("No data to plot".to_string())),
    }
}

/// Value axis range with 5% headroom, tolerating flat series
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

fn series(records: &[PriceRecord], f: impl Fn(&PriceRecord) -> Option<f64>) -> Vec<(NaiveDate, f64)> {
    records.iter().filter_map(|r| f(r).map(|v| (r.date, v))).collect()
}

/// Price and stock trends as two stacked panels
pub fn plot_price_trends(records: &[PriceRecord], out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(TRENDS_FILE);
    let (from, to) = date_range(records)?;

    let cash = series(records, |r| r.cash_settlement);
    let three = series(records, |r| r.three_month);
    let stock = series(records, |r| r.stock.map(|v| v as f64));

    let render_path = path.clone();
    let root = BitMapBackend::new(&render_path, (1500, 1000)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let (upper, lower) = root.split_vertically(500);

    let (price_min, price_max) =
        value_range(cash.iter().chain(three.iter()).map(|(_, v)| *v));

    let mut price_chart = ChartBuilder::on(&upper)
        .caption("LME Copper Prices Over Time", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(from..to, price_min..price_max)
        .map_err(chart_err)?;
    price_chart
        .configure_mesh()
        .y_desc("Price (USD/tonne)")
        .draw()
        .map_err(chart_err)?;

    price_chart
        .draw_series(LineSeries::new(cash, &BLUE))
        .map_err(chart_err)?
        .label("Cash Settlement")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    price_chart
        .draw_series(LineSeries::new(three, &GREEN))
        .map_err(chart_err)?
        .label("3-Month")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    price_chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(chart_err)?;

    let (stock_min, stock_max) = value_range(stock.iter().map(|(_, v)| *v));
    let mut stock_chart = ChartBuilder::on(&lower)
        .caption("LME Copper Stock Levels Over Time", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(from..to, stock_min..stock_max)
        .map_err(chart_err)?;
    stock_chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Stock (tonnes)")
        .draw()
        .map_err(chart_err)?;
    stock_chart
        .draw_series(LineSeries::new(stock, &RGBColor(255, 165, 0)))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!("Chart saved as '{}'", path.display());
    Ok(path)
}

fn histogram_panel(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    values: &[f64],
    title: &str,
    color: RGBColor,
) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }

    let (min, max) = value_range(values.iter().copied());
    let bin_width = (max - min) / HISTOGRAM_BINS as f64;

    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for v in values {
        let idx = (((v - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 25))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min..max, 0.0..max_count * 1.05)
        .map_err(chart_err)?;
    chart
        .configure_mesh()
        .x_desc("Price (USD/tonne)")
        .y_desc("Frequency")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * bin_width;
            let x1 = x0 + bin_width;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], color.mix(0.7).filled())
        }))
        .map_err(chart_err)?;

    Ok(())
}

/// Price distribution histograms, one panel per series
pub fn plot_price_distribution(records: &[PriceRecord], out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(DISTRIBUTION_FILE);

    let cash: Vec<f64> = records.iter().filter_map(|r| r.cash_settlement).collect();
    let three: Vec<f64> = records.iter().filter_map(|r| r.three_month).collect();
    if cash.is_empty() && three.is_empty() {
        return Err(LmeHubError::DataError("No data to plot".to_string()));
    }

    let render_path = path.clone();
    let root = BitMapBackend::new(&render_path, (1500, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let (left, right) = root.split_horizontally(750);

    histogram_panel(&left, &cash, "Cash Settlement Price Distribution", BLUE)?;
    histogram_panel(&right, &three, "3-Month Price Distribution", GREEN)?;

    root.present().map_err(chart_err)?;
    info!("Chart saved as '{}'", path.display());
    Ok(path)
}

/// Rolling annualized volatility lines for both price series
pub fn plot_volatility(records: &[PriceRecord], window: usize, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(VOLATILITY_FILE);
    let (from, to) = date_range(records)?;

    let points = summary::rolling_volatility(records, window);
    let cash: Vec<(NaiveDate, f64)> = points
        .iter()
        .filter_map(|p: &VolatilityPoint| p.cash.map(|v| (p.date, v)))
        .collect();
    let three: Vec<(NaiveDate, f64)> = points
        .iter()
        .filter_map(|p| p.three_month.map(|v| (p.date, v)))
        .collect();

    let (vol_min, vol_max) = value_range(cash.iter().chain(three.iter()).map(|(_, v)| *v));

    let render_path = path.clone();
    let root = BitMapBackend::new(&render_path, (1500, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("LME Copper Price Volatility (Annualized)", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(from..to, vol_min.max(0.0)..vol_max)
        .map_err(chart_err)?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Volatility")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(cash, &BLUE))
        .map_err(chart_err)?
        .label(format!("Cash Settlement ({}-day rolling)", window))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(three, &GREEN))
        .map_err(chart_err)?
        .label(format!("3-Month ({}-day rolling)", window))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!("Chart saved as '{}'", path.display());
    Ok(path)
}

/// Map a correlation in [-1, 1] to a blue-white-red gradient
fn correlation_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let clamped = value.clamp(-1.0, 1.0);
    if clamped >= 0.0 {
        let t = clamped;
        RGBColor(255, (255.0 * (1.0 - t * 0.7)) as u8, (255.0 * (1.0 - t)) as u8)
    } else {
        let t = -clamped;
        RGBColor((255.0 * (1.0 - t)) as u8, (255.0 * (1.0 - t * 0.7)) as u8, 255)
    }
}

/// Correlation heat-map with per-cell annotations
pub fn plot_correlation_matrix(records: &[PriceRecord], out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(CORRELATION_FILE);
    if records.is_empty() {
        return Err(LmeHubError::DataError("No data to plot".to_string()));
    }

    let matrix = summary::correlation_matrix(records);

    let render_path = path.clone();
    let root = BitMapBackend::new(&render_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("LME Copper Data Correlation Matrix", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(160)
        .build_cartesian_2d(0.0..3.0, 0.0..3.0)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(3)
        .y_labels(3)
        .x_label_formatter(&|x| label_for_axis(*x))
        .y_label_formatter(&|y| label_for_axis(*y))
        .draw()
        .map_err(chart_err)?;

    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let (x0, y0) = (j as f64, 2.0 - i as f64);
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x0, y0), (x0 + 1.0, y0 + 1.0)],
                    correlation_color(value).filled(),
                )))
                .map_err(chart_err)?;

            let text = if value.is_nan() {
                "n/a".to_string()
            } else {
                format!("{:.3}", value)
            };
            chart
                .draw_series(std::iter::once(Text::new(
                    text,
                    (x0 + 0.38, y0 + 0.5),
                    ("sans-serif", 20),
                )))
                .map_err(chart_err)?;
        }
    }

    root.present().map_err(chart_err)?;
    info!("Chart saved as '{}'", path.display());
    Ok(path)
}

fn label_for_axis(pos: f64) -> String {
    let idx = pos.floor() as usize;
    CORRELATION_LABELS
        .get(idx)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_colors_span_the_gradient() {
        assert_eq!(correlation_color(1.0), RGBColor(255, 76, 0));
        assert_eq!(correlation_color(-1.0), RGBColor(0, 76, 255));
        assert_eq!(correlation_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(correlation_color(f64::NAN), RGBColor(200, 200, 200));
    }

    #[test]
    fn value_range_pads_flat_series() {
        let (min, max) = value_range([5.0, 5.0].into_iter());
        assert!(min < 5.0 && max > 5.0);
    }

    #[test]
    fn value_range_of_empty_series_is_unit() {
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
    }
}
