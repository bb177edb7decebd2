use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Record ────────────────────────────────────────────────────────────────────

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts under the same name win.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Missing keys read as the empty string.
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// Header row plus the records projected under it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same headers, only the given records.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            headers: self.headers.clone(),
            records,
        }
    }
}

// ── Series ────────────────────────────────────────────────────────────────────

/// A named numeric column paired with its labels. Both vectors always have
/// the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn from_pairs(name: impl Into<String>, pairs: Vec<(String, f64)>) -> Self {
        let (labels, values) = pairs.into_iter().unzip();
        Self {
            name: name.into(),
            labels,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Everything one successful refresh cycle produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub table: Table,
    pub series: Vec<Series>,
    pub fetched_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_missing_key_is_empty() {
        let mut r = Record::new();
        r.insert("Asset", "Pod A");
        assert_eq!(r.get("Asset"), "Pod A");
        assert_eq!(r.get("Revenue"), "");
        assert!(!r.contains_key("Revenue"));
    }

    #[test]
    fn test_series_from_pairs_stays_aligned() {
        let s = Series::from_pairs(
            "revenue",
            vec![("A".to_string(), 1.5), ("B".to_string(), 2.5)],
        );
        assert_eq!(s.labels, vec!["A", "B"]);
        assert_eq!(s.values, vec![1.5, 2.5]);
        assert_eq!(s.total(), 4.0);
    }
}
