//! Owner of the current dashboard data.
//!
//! `Dashboard` holds the last good snapshot and the active search term, and
//! republishes to its sink whenever either changes. A failed cycle only
//! updates the status line; the table and charts stay as they were.

use crate::error::DashboardError;
use crate::models::Snapshot;
use crate::projector::filter_records;
use crate::scheduler::CycleHandler;
use crate::sink::{PublishSink, Status};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug)]
pub struct DashboardState {
    pub snapshot: Option<Snapshot>,
    pub status: Status,
    pub filter: String,
    pub failures: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            snapshot: None,
            status: Status::Loading,
            filter: String::new(),
            failures: 0,
        }
    }
}

impl DashboardState {
    pub fn last_updated(&self) -> Option<String> {
        self.snapshot
            .as_ref()
            .map(|s| s.fetched_at.format("%H:%M:%S").to_string())
    }
}

pub struct Dashboard<S: PublishSink> {
    state: Mutex<DashboardState>,
    sink: S,
}

impl<S: PublishSink> Dashboard<S> {
    #[cfg(test)]
    pub fn new(sink: S) -> Self {
        Self {
            state: Mutex::new(DashboardState::default()),
            sink,
        }
    }

    pub fn with_filter(sink: S, filter: impl Into<String>) -> Self {
        let state = DashboardState {
            filter: filter.into(),
            ..DashboardState::default()
        };
        Self {
            state: Mutex::new(state),
            sink,
        }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub async fn status(&self) -> Status {
        self.state.lock().await.status.clone()
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.state.lock().await.snapshot.clone()
    }

    pub async fn failures(&self) -> u64 {
        self.state.lock().await.failures
    }

    /// Nothing to fetch from: show "no data" without touching the network.
    pub async fn show_unconfigured(&self) {
        let mut state = self.state.lock().await;
        state.status = Status::NoData;
        self.sink.render_status(&state.status, None);
    }

    /// Store a fresh snapshot and publish table, charts and status.
    pub async fn apply_success(&self, snapshot: Snapshot) {
        let mut state = self.state.lock().await;
        state.status = if snapshot.table.is_empty() {
            Status::NoData
        } else {
            Status::Ready
        };
        state.snapshot = Some(snapshot);
        self.publish(&state);
    }

    /// Keep the previous snapshot and report the failure.
    pub async fn apply_failure(&self, error: &DashboardError) {
        let mut state = self.state.lock().await;
        state.failures += 1;
        state.status = match error {
            DashboardError::Config(_) | DashboardError::Parse(_) => Status::NoData,
            _ => Status::Error(error.status_message().to_string()),
        };
        let last_updated = state.last_updated();
        self.sink.render_status(&state.status, last_updated.as_deref());
    }

    /// Change the search term and re-render the current table.
    pub async fn set_filter(&self, term: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.filter = term.into();
        debug!("Filter set to {:?}", state.filter);
        if let Some(snapshot) = &state.snapshot {
            let records = filter_records(&snapshot.table.records, &state.filter);
            self.sink.render_table(&snapshot.table.with_records(records));
        }
    }

    fn publish(&self, state: &DashboardState) {
        let Some(snapshot) = &state.snapshot else {
            return;
        };

        let records = filter_records(&snapshot.table.records, &state.filter);
        if records.len() != snapshot.table.records.len() {
            info!(
                "Showing {} of {} rows matching {:?}",
                records.len(),
                snapshot.table.records.len(),
                state.filter
            );
        }
        self.sink.render_table(&snapshot.table.with_records(records));

        for series in &snapshot.series {
            self.sink.render_series(series);
        }

        let last_updated = state.last_updated();
        self.sink.render_status(&state.status, last_updated.as_deref());
    }
}

#[async_trait]
impl<S: PublishSink> CycleHandler for Dashboard<S> {
    async fn on_success(&self, snapshot: Snapshot) {
        self.apply_success(snapshot).await;
    }

    async fn on_failure(&self, error: DashboardError) {
        self.apply_failure(&error).await;
    }
}
