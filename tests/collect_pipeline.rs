//! End-to-end pipeline test over fabricated HTML pages: extraction,
//! normalization, dedup/ordering and the CSV round trip.

use chrono::NaiveDate;
use lme_datahub::data_provider::PriceDataProvider;
use lme_datahub::scrapers::extract;
use lme_datahub::services::collector::{merge_records, rows_to_records, write_csv};

const PAGE_A: &str = r#"
    <html><body>
    <table>
        <tr><th>date</th><th>LME Copper cash-settlement</th><th>LME Copper 3-month</th><th>LME Copper stock</th></tr>
        <tr><td>13. Januar 2025</td><td>9,600.00</td><td>9,650.00</td><td>150,000</td></tr>
        <tr><td>14. Januar 2025</td><td>9,610.00</td><td>9,660.00</td><td>149,500</td></tr>
    </table>
    </body></html>"#;

const PAGE_B: &str = r#"
    <html><body>
    <table>
        <tr><th>date</th><th>LME Copper cash-settlement</th><th>LME Copper 3-month</th><th>LME Copper stock</th></tr>
        <tr><td>13. January 2025</td><td>9,700.00</td><td>9,750.00</td><td>151,000</td></tr>
        <tr><td>10. January 2025</td><td>9,500.00</td><td>9,550.00</td><td>152,000</td></tr>
    </table>
    </body></html>"#;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn first_seen_page_wins_and_output_is_sorted() {
    let mut collected = Vec::new();
    for page in [PAGE_A, PAGE_B] {
        collected.extend(rows_to_records(&extract::data_table_rows(page)));
    }

    let merged = merge_records(collected);

    // 13 Jan appears on both pages; page A was crawled first and wins
    assert_eq!(merged.len(), 3);
    let duplicate_day = merged
        .iter()
        .find(|r| r.date == ymd(2025, 1, 13))
        .expect("record for 2025-01-13");
    assert_eq!(duplicate_day.cash_settlement, Some(9600.00));
    assert_eq!(duplicate_day.stock, Some(150_000));

    // Ascending by date regardless of crawl order
    let dates: Vec<NaiveDate> = merged.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![ymd(2025, 1, 10), ymd(2025, 1, 13), ymd(2025, 1, 14)]
    );
}

#[test]
fn crawl_order_decides_the_winner_when_pages_swap() {
    let mut collected = Vec::new();
    for page in [PAGE_B, PAGE_A] {
        collected.extend(rows_to_records(&extract::data_table_rows(page)));
    }

    let merged = merge_records(collected);
    let duplicate_day = merged
        .iter()
        .find(|r| r.date == ymd(2025, 1, 13))
        .expect("record for 2025-01-13");
    assert_eq!(duplicate_day.cash_settlement, Some(9700.00));
}

#[test]
fn csv_round_trip_preserves_records_and_absent_fields() {
    let html = r#"
        <table>
            <tr><th>date</th><th>cash</th><th>3-month</th><th>stock</th></tr>
            <tr><td>13. Januar 2025</td><td>9,600.00</td><td></td><td></td></tr>
            <tr><td>14. Januar 2025</td><td>9,610.50</td><td>9,660.00</td><td>149,500</td></tr>
        </table>"#;

    let merged = merge_records(rows_to_records(&extract::data_table_rows(html)));
    assert_eq!(merged.len(), 2);

    let path = std::env::temp_dir().join(format!(
        "lme_datahub_roundtrip_{}.csv",
        std::process::id()
    ));
    write_csv(&merged, &path).unwrap();

    let provider = PriceDataProvider::load_from_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(provider.len(), 2);

    let partial = provider.get_by_date(&ymd(2025, 1, 13)).unwrap();
    assert_eq!(partial.cash_settlement, Some(9600.00));
    assert_eq!(partial.three_month, None);
    assert_eq!(partial.stock, None);

    let full = provider.get_by_date(&ymd(2025, 1, 14)).unwrap();
    assert_eq!(full.cash_settlement, Some(9610.50));
    assert_eq!(full.stock, Some(149_500));
}
