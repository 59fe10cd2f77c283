//! Plain-text analysis report export.

use crate::analysis::summary::{self, Summary, YearlySummary};
use crate::errors::{Result, LmeHubError};
use crate::models::record::PriceRecord;
use chrono::Local;
use log::info;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const REPORT_FILE: &str = "lme_analysis_report.txt";

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn summary_section(out: &mut String, summary: &Summary) {
    let _ = writeln!(out, "Basic Info:");
    let _ = writeln!(out, "----------");
    let _ = writeln!(out, "Total Records: {}", summary.total_records);
    let _ = writeln!(
        out,
        "Date Range: {} to {}",
        summary.first_date, summary.last_date
    );
    let _ = writeln!(out, "Data Span (Years): {}", summary.span_years);
    let _ = writeln!(out, "Missing Cash Prices: {}", summary.cash.missing);
    let _ = writeln!(out, "Missing 3-Month Prices: {}", summary.three_month.missing);
    let _ = writeln!(out, "Missing Stock Data: {}", summary.stock.missing);
    let _ = writeln!(out);

    let _ = writeln!(out, "Price Statistics (USD/tonne):");
    let _ = writeln!(out, "----------------------------");
    let _ = writeln!(out, "Cash Settlement - Mean: {:.2}", summary.cash.mean);
    let _ = writeln!(out, "Cash Settlement - Std Dev: {:.2}", summary.cash.std_dev);
    let _ = writeln!(out, "Cash Settlement - Min: {:.2}", summary.cash.min);
    let _ = writeln!(out, "Cash Settlement - Max: {:.2}", summary.cash.max);
    let _ = writeln!(out, "3-Month - Mean: {:.2}", summary.three_month.mean);
    let _ = writeln!(out, "3-Month - Std Dev: {:.2}", summary.three_month.std_dev);
    let _ = writeln!(out, "3-Month - Min: {:.2}", summary.three_month.min);
    let _ = writeln!(out, "3-Month - Max: {:.2}", summary.three_month.max);
    let _ = writeln!(out);

    let _ = writeln!(out, "Stock Statistics (tonnes):");
    let _ = writeln!(out, "-------------------------");
    let _ = writeln!(out, "Mean Stock: {:.0}", summary.stock.mean);
    let _ = writeln!(out, "Std Dev Stock: {:.0}", summary.stock.std_dev);
    let _ = writeln!(out, "Min Stock: {:.0}", summary.stock.min);
    let _ = writeln!(out, "Max Stock: {:.0}", summary.stock.max);
    let _ = writeln!(out);
}

fn yearly_section(out: &mut String, years: &[YearlySummary]) {
    let _ = writeln!(out, "YEARLY SUMMARY:");
    let _ = writeln!(out, "---------------");
    let _ = writeln!(
        out,
        "{:<6} {:>12} {:>12} {:>12} {:>10} {:>12} {:>12} {:>12} {:>12}",
        "year",
        "cash_mean",
        "cash_min",
        "cash_max",
        "cash_std",
        "3m_mean",
        "3m_min",
        "3m_max",
        "stock_mean"
    );
    for year in years {
        let _ = writeln!(
            out,
            "{:<6} {:>12} {:>12} {:>12} {:>10} {:>12} {:>12} {:>12} {:>12}",
            year.year,
            fmt_opt(year.cash_mean),
            fmt_opt(year.cash_min),
            fmt_opt(year.cash_max),
            fmt_opt(year.cash_std),
            fmt_opt(year.three_month_mean),
            fmt_opt(year.three_month_min),
            fmt_opt(year.three_month_max),
            fmt_opt(year.stock_mean)
        );
    }
    let _ = writeln!(out);
}

fn recent_section(out: &mut String, records: &[PriceRecord]) {
    let _ = writeln!(out, "RECENT DATA (Last 10 records):");
    let _ = writeln!(out, "------------------------------");
    let _ = writeln!(
        out,
        "{:<12} {:>16} {:>12} {:>12}",
        "date", "cash_settlement", "3_month", "stock"
    );

    let tail_start = records.len().saturating_sub(10);
    for record in &records[tail_start..] {
        let _ = writeln!(
            out,
            "{:<12} {:>16} {:>12} {:>12}",
            record.date,
            fmt_opt(record.cash_settlement),
            fmt_opt(record.three_month),
            record
                .stock
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    let _ = writeln!(out);
}

/// Summary section as display text, shared with the interactive menu
pub fn render_summary_text(summary: &Summary) -> String {
    let mut out = String::new();
    summary_section(&mut out, summary);
    out
}

/// Yearly table as display text, shared with the interactive menu
pub fn render_yearly_text(years: &[YearlySummary]) -> String {
    let mut out = String::new();
    yearly_section(&mut out, years);
    out
}

/// Render the full report text for the given records
pub fn render_report(records: &[PriceRecord]) -> Result<String> {
    let summary = summary::summary(records)
        .ok_or_else(|| LmeHubError::DataError("No data available for report".to_string()))?;

    let mut out = String::new();
    let _ = writeln!(out, "LME COPPER DATA ANALYSIS REPORT");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated on: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out);

    out.push_str(&render_summary_text(&summary));
    out.push_str(&render_yearly_text(&summary::yearly_summary(records)));
    recent_section(&mut out, records);

    Ok(out)
}

/// Write the analysis report next to the chart artifacts
pub fn export_report(records: &[PriceRecord], out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(REPORT_FILE);
    let report = render_report(records)?;
    std::fs::write(&path, report)?;

    info!("Analysis report saved as '{}'", path.display());
    Ok(path)
}
