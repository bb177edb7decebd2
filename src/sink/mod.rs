//! Render targets for refreshed data.

pub mod terminal;

use crate::models::{Series, Table};

pub use self::terminal::TerminalSink;

/// What the user sees instead of, or alongside, the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Loading,
    Ready,
    NoData,
    Error(String),
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Status::Loading => "Loading…",
            Status::Ready => "",
            Status::NoData => "No data",
            Status::Error(msg) => msg,
        }
    }
}

/// Consumer of projected data. Each call replaces what was shown before.
pub trait PublishSink: Send + Sync {
    /// Replace the displayed table. An empty table renders as "no data".
    fn render_table(&self, table: &Table);

    /// Replace one chart. `labels` and `values` have the same length.
    fn render_series(&self, series: &Series);

    fn render_status(&self, status: &Status, last_updated: Option<&str>);
}
