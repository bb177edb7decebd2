mod config;
mod dashboard;
mod error;
mod models;
mod projector;
mod scheduler;
mod sink;
mod source;
mod tokenizer;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{is_embed_placeholder, AppConfig};
use crate::dashboard::Dashboard;
use crate::models::Table;
use crate::projector::{filter_records, parse_table, project_series};
use crate::scheduler::{run_cycle, RefreshScheduler};
use crate::sink::TerminalSink;
use crate::source::SheetSource;

#[derive(Parser)]
#[command(name = "sheet-dash", about = "Live dashboard for a published spreadsheet CSV", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the sheet and re-render on every refresh (Ctrl-C to stop)
    Watch {
        /// Override the configured CSV URL
        #[arg(long, env = "DASH_CSV_URL")]
        url: Option<String>,

        /// Override the refresh interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Only show rows containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Fetch once and render
    Once {
        #[arg(long, env = "DASH_CSV_URL")]
        url: Option<String>,

        #[arg(short, long)]
        filter: Option<String>,

        /// Also write the (filtered) table to this CSV file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render a local CSV file without touching the network
    Parse {
        file: PathBuf,

        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List the configured chart embed links
    Charts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "sheet_dashboard=info,warn",
        1 => "sheet_dashboard=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Watch { url, interval_ms, filter } => {
            if let Some(url) = url {
                config.source.csv_url = url;
            }
            if let Some(ms) = interval_ms {
                config.source.refresh_interval_ms = ms;
            }

            let dashboard = Arc::new(Dashboard::with_filter(
                TerminalSink::stdout(),
                filter.unwrap_or_default(),
            ));

            if !config.source.is_configured() {
                dashboard.show_unconfigured().await;
                warn!("No CSV URL configured (set source.csv_url or DASH__SOURCE__CSV_URL)");
                return Ok(());
            }

            let source = Arc::new(SheetSource::new(&config.source)?);
            let interval = config.source.refresh_interval();
            let mut scheduler = RefreshScheduler::new(config.charts.clone());
            scheduler.start(interval, source, dashboard.clone()).await;
            info!("Type a search term and press Enter to filter, empty line clears, Ctrl-C stops");

            let mut terms = spawn_stdin_lines();
            loop {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        res.context("Failed to listen for Ctrl-C")?;
                        break;
                    }
                    Some(term) = terms.recv() => {
                        dashboard.set_filter(term.trim()).await;
                    }
                }
            }
            scheduler.stop().await;
            info!("Stopped after {} failed cycles", dashboard.failures().await);
        }

        Command::Once { url, filter, out } => {
            if let Some(url) = url {
                config.source.csv_url = url;
            }
            let _t = utils::Timer::start("Single refresh");

            let dashboard = Dashboard::with_filter(TerminalSink::stdout(), filter.clone().unwrap_or_default());
            if !config.source.is_configured() {
                dashboard.show_unconfigured().await;
                return Ok(());
            }

            let source = SheetSource::new(&config.source)?;
            match run_cycle(&source, &config.charts).await {
                Ok(snapshot) => {
                    let table = snapshot.table.clone();
                    dashboard.apply_success(snapshot).await;
                    if let Some(path) = out {
                        let records = filter_records(&table.records, filter.as_deref().unwrap_or(""));
                        export_csv(&table.with_records(records), &path)?;
                    }
                }
                Err(e) => {
                    dashboard.apply_failure(&e).await;
                    return Err(e).context("Refresh failed");
                }
            }
        }

        Command::Parse { file, filter } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Could not read {:?}", file))?;
            let table = parse_table(&text).with_context(|| format!("Could not parse {:?}", file))?;
            let series = project_series(&table, &config.charts);

            let dashboard = Dashboard::with_filter(TerminalSink::stdout(), filter.unwrap_or_default());
            dashboard
                .apply_success(models::Snapshot {
                    table,
                    series,
                    fetched_at: chrono::Local::now(),
                })
                .await;
        }

        Command::Charts => {
            if config.charts.embeds.is_empty() {
                println!("No chart embeds configured.");
            } else {
                for (name, link) in &config.charts.embeds {
                    if is_embed_placeholder(link) {
                        println!("  {:<10} (not set)", name);
                    } else {
                        println!("  {:<10} {}", name, link);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Forward stdin lines as search terms. A plain thread is used because a
/// blocking read on the runtime's pool would hold up shutdown until Enter.
fn spawn_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Write a table back out as CSV, columns in header order.
fn export_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Could not create {:?}", path))?;

    writer.write_record(&table.headers)?;
    for record in &table.records {
        writer.write_record(table.headers.iter().map(|h| record.get(h)))?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {:?}", table.records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_csv_quotes_embedded_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = parse_table("Asset,Revenue\nPod A,\"$1,234.50\"\n").unwrap();

        export_csv(&table, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Asset,Revenue\nPod A,\"$1,234.50\"\n");
        assert_eq!(parse_table(&written).unwrap(), table);
    }

    #[test]
    fn test_cli_parses_watch_flags() {
        let cli = Cli::try_parse_from([
            "sheet-dash", "-v", "watch", "--interval-ms", "5000", "--filter", "pod",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Watch { interval_ms, filter, .. } => {
                assert_eq!(interval_ms, Some(5000));
                assert_eq!(filter.as_deref(), Some("pod"));
            }
            _ => panic!("expected watch"),
        }
    }
}
