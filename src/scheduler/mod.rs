//! Fixed-interval refresh loop.
//!
//! ## Behaviour
//!
//! `start()` fires one cycle immediately and then one per interval, measured
//! from the start of each tick. A cycle is fetch → tokenize → project, and
//! ends in exactly one `on_success` or `on_failure` call.
//!
//! Single-flight: while a cycle is outstanding, further ticks are dropped.
//!
//! `stop()` halts the ticker but does not abort an in-flight request. A cycle
//! that completes after `stop()` is discarded without calling the handler.
//! Cycles check the active flag and call the handler under one callback lock,
//! and `stop()` takes that lock before returning, so once it returns no
//! handler call is running or can start.

use crate::config::ChartConfig;
use crate::error::DashboardError;
use crate::models::Snapshot;
use crate::projector::{parse_table, project_series};
use crate::source::CsvSource;
use crate::utils::Timer;
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Receives the outcome of every cycle that completes while the scheduler is
/// active.
#[async_trait]
pub trait CycleHandler: Send + Sync {
    async fn on_success(&self, snapshot: Snapshot);
    async fn on_failure(&self, error: DashboardError);
}

/// Run one fetch → parse → project cycle.
pub async fn run_cycle(
    source: &dyn CsvSource,
    charts: &ChartConfig,
) -> Result<Snapshot, DashboardError> {
    let text = source.fetch_csv().await?;
    let table = parse_table(&text)?;
    let series = project_series(&table, charts);

    Ok(Snapshot {
        table,
        series,
        fetched_at: Local::now(),
    })
}

/// Clears the in-flight flag however the cycle task ends.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct RefreshScheduler {
    charts: Arc<ChartConfig>,
    active: Arc<AtomicBool>,
    callback_lock: Arc<Mutex<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(charts: ChartConfig) -> Self {
        Self {
            charts: Arc::new(charts),
            active: Arc::new(AtomicBool::new(false)),
            callback_lock: Arc::new(Mutex::new(())),
            ticker: None,
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Begin polling. Restarting replaces the previous run; anything that
    /// run still has in flight is discarded.
    pub async fn start(
        &mut self,
        interval: Duration,
        source: Arc<dyn CsvSource>,
        handler: Arc<dyn CycleHandler>,
    ) {
        self.stop().await;

        // Fresh flags per run so a late cycle from an earlier run stays inert.
        let active = Arc::new(AtomicBool::new(true));
        let in_flight = Arc::new(AtomicBool::new(false));
        self.active = Arc::clone(&active);

        let charts = Arc::clone(&self.charts);
        let callback_lock = Arc::clone(&self.callback_lock);
        info!("Refreshing every {:?}", interval);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut cycle = 0u64;

            loop {
                ticker.tick().await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                if in_flight.swap(true, Ordering::SeqCst) {
                    debug!("Previous cycle still in flight, skipping tick");
                    continue;
                }

                cycle += 1;
                let guard = InFlightGuard(Arc::clone(&in_flight));
                let active = Arc::clone(&active);
                let source = Arc::clone(&source);
                let handler = Arc::clone(&handler);
                let charts = Arc::clone(&charts);
                let callback_lock = Arc::clone(&callback_lock);

                tokio::spawn(async move {
                    let _guard = guard;
                    let timer = Timer::start(format!("refresh cycle {}", cycle));
                    let outcome = run_cycle(source.as_ref(), &charts).await;

                    let _callback = callback_lock.lock().await;
                    if !active.load(Ordering::SeqCst) {
                        debug!("Cycle {} finished after stop, discarding", cycle);
                        return;
                    }

                    match outcome {
                        Ok(snapshot) => {
                            info!(
                                "Cycle {}: {} rows, {} series in {:.2?}",
                                cycle,
                                snapshot.table.records.len(),
                                snapshot.series.len(),
                                timer.elapsed()
                            );
                            handler.on_success(snapshot).await;
                        }
                        Err(e) => {
                            warn!("Cycle {} failed: {}", cycle, e);
                            handler.on_failure(e).await;
                        }
                    }
                });
            }
        });

        self.ticker = Some(handle);
    }

    /// Stop future ticks and wait out any handler call already running.
    /// In-flight results are dropped when they land.
    pub async fn stop(&mut self) {
        self.halt();
        let _callback = self.callback_lock.lock().await;
    }

    fn halt(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            info!("Refresh stopped");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.halt();
    }
}
