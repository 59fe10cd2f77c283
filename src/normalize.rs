//! Text normalization for scraped table cells.
//!
//! The source site mixes English and German month names and both European
//! (`1.234,56`) and US (`1,234.56`) digit grouping, sometimes within the same
//! table. Everything here degrades to `None` on malformed input instead of
//! returning an error; callers treat absence as a missing field.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^(\d{1,2})\.\s*([A-Za-zäöüÄÖÜ]+)\s*(\d{4})").unwrap();
    static ref NON_NUMERIC_RE: Regex = Regex::new(r"[^\d,.\-]").unwrap();
}

/// Recognized month names, case-sensitive. The site serves English names on
/// the `/en/` pages and German ones on cached year pages.
fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "January" | "Januar" => 1,
        "February" | "Februar" => 2,
        "March" | "März" => 3,
        "April" => 4,
        "May" | "Mai" => 5,
        "June" | "Juni" => 6,
        "July" | "Juli" => 7,
        "August" => 8,
        "September" => 9,
        "October" | "Oktober" => 10,
        "November" => 11,
        "December" | "Dezember" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parse a date token like `13. Januar 2025` or `11. July 2025` to a
/// calendar date. Already-canonical `YYYY-MM-DD` input passes through
/// unchanged. Returns `None` for anything unrecognized.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    let caps = match DATE_RE.captures(trimmed) {
        Some(caps) => caps,
        None => {
            warn!("Unrecognized date format: '{}'", raw);
            return None;
        }
    };

    // The regex guarantees 1-2 and 4 digit groups, so these cannot overflow
    let day: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let month = match month_number(&caps[2]) {
        Some(m) => m,
        None => {
            warn!("Unrecognized month name in date: '{}'", raw);
            return None;
        }
    };

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Some(date),
        None => {
            warn!("Date out of calendar range: '{}'", raw);
            None
        }
    }
}

/// Which resolution policy applies when a lone separator is ambiguous.
///
/// Price cells favor the decimal reading; stock cells favor the
/// thousands-grouping reading. The two policies are deliberately distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Price,
    Stock,
}

/// Parse a price token like `9,637.50` or `1.234,56` to two decimal places.
pub fn normalize_price(raw: &str) -> Option<f64> {
    normalize_number(raw, NumberKind::Price).map(|v| (v * 100.0).round() / 100.0)
}

/// Parse a stock token like `108,725` to a whole tonne count.
pub fn normalize_stock(raw: &str) -> Option<i64> {
    normalize_number(raw, NumberKind::Stock).map(|v| v.round() as i64)
}

fn normalize_number(raw: &str, kind: NumberKind) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    let cleaned = NON_NUMERIC_RE.replace_all(trimmed, "").into_owned();
    if cleaned.is_empty() {
        warn!("Could not parse number: '{}'", raw);
        return None;
    }

    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');

    let canonical = if has_comma && has_dot {
        rightmost_separator_is_decimal(&cleaned)
    } else if has_comma {
        resolve_single_separator(&cleaned, ',', kind)
    } else if has_dot {
        resolve_single_separator(&cleaned, '.', kind)
    } else {
        cleaned
    };

    match canonical.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            // Collapse negative zero so absence stays the only "odd" state
            if value == 0.0 {
                Some(0.0)
            } else {
                Some(value)
            }
        }
        _ => {
            warn!("Could not parse number: '{}'", raw);
            None
        }
    }
}

/// Both separators present: the rightmost one is the decimal point and
/// everything to its left is digit grouping. Handles `1.234,56` and
/// `9,637.50` with the same rule.
fn rightmost_separator_is_decimal(s: &str) -> String {
    let last = match s.rfind(|c| c == ',' || c == '.') {
        Some(last) => last,
        None => return s.to_string(),
    };

    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            ',' | '.' if i == last => out.push('.'),
            ',' | '.' => {}
            _ => out.push(c),
        }
    }
    out
}

/// One separator kind present: decide between thousands grouping and a
/// decimal point. The policies differ per field intent and both are kept.
fn resolve_single_separator(s: &str, sep: char, kind: NumberKind) -> String {
    let count = s.matches(sep).count();

    let treat_as_thousands = match kind {
        // Stock cells are integer counts; a token shaped like grouped
        // digits (108,725 or 1,082,725) reads as thousands separators.
        NumberKind::Stock => is_grouped_integer(s, sep),
        // Price cells read a lone separator as the decimal point; more
        // than one occurrence can only be grouping.
        NumberKind::Price => count > 1,
    };

    if treat_as_thousands {
        s.replace(sep, "")
    } else {
        s.replace(sep, ".")
    }
}

/// True when every group after the first is exactly three digits, i.e. the
/// token looks like an integer with thousands separators.
fn is_grouped_integer(s: &str, sep: char) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let mut groups = unsigned.split(sep);

    let head = match groups.next() {
        Some(head) => head,
        None => return false,
    };
    if head.is_empty() || head.len() > 3 || !head.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let mut saw_group = false;
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        saw_group = true;
    }
    saw_group
}
