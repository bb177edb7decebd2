//! Rows → records, and records → chart series.

use crate::config::{ChartConfig, SeriesSpec};
use crate::error::DashboardError;
use crate::models::{Record, Series, Table};
use crate::tokenizer;
use tracing::{debug, warn};

// ── Records ───────────────────────────────────────────────────────────────────

/// Project data rows under a header. Short rows are padded with `""`,
/// fields past the header width are dropped.
pub fn project_records(header: &[String], rows: &[Vec<String>]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut record = Record::new();
            for (j, name) in header.iter().enumerate() {
                let value = row.get(j).map(String::as_str).unwrap_or("");
                record.insert(name.as_str(), value);
            }
            record
        })
        .collect()
}

/// Tokenize a CSV body and project it into a table.
pub fn parse_table(text: &str) -> Result<Table, DashboardError> {
    let (headers, rows) = tokenizer::tokenize_with_header(text);

    if !headers.is_empty() && headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::Parse(
            "header row has no named columns".to_string(),
        ));
    }

    let width_mismatches = rows.iter().filter(|r| r.len() != headers.len()).count();
    if width_mismatches > 0 {
        debug!(
            "{} of {} rows differ from header width {}",
            width_mismatches,
            rows.len(),
            headers.len()
        );
    }

    let records = project_records(&headers, &rows);
    Ok(Table { headers, records })
}

// ── Numeric coercion ──────────────────────────────────────────────────────────

/// Strip everything except digits, dots and a leading minus, then parse.
/// "$1,234.50" → 1234.5 | "" → 0 | "abc" → 0 | "-5" → -5
pub fn coerce_number(s: &str) -> f64 {
    let mut cleaned = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_digit() || c == '.' {
            cleaned.push(c);
        } else if c == '-' && cleaned.is_empty() {
            cleaned.push(c);
        }
    }
    cleaned.parse().unwrap_or(0.0)
}

/// Read one column across all records as numbers.
pub fn extract_series(records: &[Record], column: &str) -> Vec<f64> {
    records.iter().map(|r| coerce_number(r.get(column))).collect()
}

// ── Labelled series ───────────────────────────────────────────────────────────

/// Build one chart series from a label column and a value column.
///
/// Rows with an empty label are dropped as a whole, so every label keeps the
/// value from its own row.
pub fn labelled_series(records: &[Record], name: &str, label_column: &str, column: &str) -> Series {
    let pairs: Vec<(String, f64)> = records
        .iter()
        .filter_map(|r| {
            let label = r.get(label_column).trim();
            if label.is_empty() {
                None
            } else {
                Some((label.to_string(), coerce_number(r.get(column))))
            }
        })
        .collect();

    Series::from_pairs(name, pairs)
}

/// One series per row, labelled by 1-based row number.
pub fn numbered_series(records: &[Record], name: &str, column: &str) -> Series {
    let values = extract_series(records, column);
    let labels = (1..=values.len()).map(|i| i.to_string()).collect();
    Series {
        name: name.to_string(),
        labels,
        values,
    }
}

/// Build every configured series for a table. An empty `label_column`
/// charts every row, labelled by row number.
pub fn project_series(table: &Table, charts: &ChartConfig) -> Vec<Series> {
    let label_column = charts.label_column.trim();
    if !label_column.is_empty()
        && !table.is_empty()
        && !table.headers.iter().any(|h| h == label_column)
    {
        warn!("Label column {:?} not in header", label_column);
    }

    charts
        .series
        .iter()
        .map(|SeriesSpec { name, column }| {
            if !table.is_empty() && !table.headers.iter().any(|h| h == column) {
                warn!("{}: column {:?} not in header, values default to 0", name, column);
            }
            if label_column.is_empty() {
                numbered_series(&table.records, name, column)
            } else {
                labelled_series(&table.records, name, label_column, column)
            }
        })
        .collect()
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Keep records where any value contains `term`, ignoring case.
pub fn filter_records(records: &[Record], term: &str) -> Vec<Record> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.values().any(|v| v.to_lowercase().contains(&term)))
        .cloned()
        .collect()
}
