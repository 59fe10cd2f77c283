//! HTML page to raw table rows.
//!
//! This is the only module that knows anything about page structure. If the
//! upstream site changes its markup, the fix lands here and nowhere else.

use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Header keywords that mark a table as the copper data table
const TABLE_KEYWORDS: [&str; 4] = ["copper", "cash", "settlement", "stock"];

/// Extract the data rows from every recognized data table in the document.
///
/// A table qualifies when its first row's text contains any of the keyword
/// set (case-insensitive). The header row itself is skipped; remaining rows
/// come back as trimmed cell text, both `td` and `th` cells included.
pub fn data_table_rows(html: &str) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td, th").unwrap();

    let mut rows = Vec::new();

    for table in document.select(&table_selector) {
        let table_rows: Vec<ElementRef> = table.select(&row_selector).collect();

        // Tables without data rows carry nothing worth inspecting
        if table_rows.len() <= 1 {
            continue;
        }

        let header_text = row_text(&table_rows[0]).to_lowercase();
        if !TABLE_KEYWORDS.iter().any(|kw| header_text.contains(kw)) {
            debug!("Skipping table with header: '{}'", header_text.trim());
            continue;
        }

        for row in &table_rows[1..] {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();

            if !cells.is_empty() {
                rows.push(cells);
            }
        }
    }

    rows
}

fn row_text(row: &ElementRef) -> String {
    row.text().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_rows_from_keyword_table() {
        let html = r#"
            <html><body>
            <table>
                <tr><th>date</th><th>LME Copper cash-settlement</th><th>3-month</th><th>stock</th></tr>
                <tr><td>11. July 2025</td><td>9,637.50</td><td>9,650.00</td><td>108,725</td></tr>
                <tr><td>10. July 2025</td><td>9,600.00</td><td>9,610.00</td><td>108,100</td></tr>
            </table>
            </body></html>"#;

        let rows = data_table_rows(html);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["11. July 2025", "9,637.50", "9,650.00", "108,725"]);
        assert_eq!(rows[1][3], "108,100");
    }

    #[test]
    fn ignores_tables_without_keywords() {
        let html = r#"
            <table>
                <tr><th>navigation</th><th>links</th></tr>
                <tr><td>home</td><td>about</td></tr>
            </table>"#;

        assert!(data_table_rows(html).is_empty());
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let html = r#"
            <table>
                <tr><th>Date</th><th>Cash Settlement</th></tr>
                <tr><td>11. July 2025</td><td>9,637.50</td></tr>
            </table>"#;

        assert_eq!(data_table_rows(html).len(), 1);
    }

    #[test]
    fn skips_header_only_tables() {
        let html = r#"
            <table>
                <tr><th>copper</th></tr>
            </table>"#;

        assert!(data_table_rows(html).is_empty());
    }

    #[test]
    fn handles_documents_without_tables() {
        assert!(data_table_rows("<html><body><p>no data</p></body></html>").is_empty());
    }
}
