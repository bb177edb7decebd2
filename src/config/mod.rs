use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Literal left in place until a real sheet URL is pasted in.
pub const CSV_URL_PLACEHOLDER: &str = "YOUR_CSV_PUBLISH_LINK_HERE";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub charts: ChartConfig,
}

/// Where the CSV comes from and how often
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub csv_url: String,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_cache_bust_param")]
    pub cache_bust_param: String,
}

/// Column mapping for the charts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartConfig {
    #[serde(default = "default_label_column")]
    pub label_column: String,

    #[serde(default = "default_series")]
    pub series: Vec<SeriesSpec>,

    /// Published chart embed links, by chart name.
    #[serde(default)]
    pub embeds: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub column: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_refresh_interval_ms() -> u64 {
    30_000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "sheet-dashboard/0.1".to_string()
}
fn default_cache_bust_param() -> String {
    "t".to_string()
}
fn default_label_column() -> String {
    "Asset".to_string()
}
fn default_series() -> Vec<SeriesSpec> {
    [("minutes", "Minutes"), ("revenue", "Revenue"), ("impact", "Impact")]
        .into_iter()
        .map(|(name, column)| SeriesSpec {
            name: name.to_string(),
            column: column.to_string(),
        })
        .collect()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            csv_url: String::new(),
            refresh_interval_ms: default_refresh_interval_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            cache_bust_param: default_cache_bust_param(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            label_column: default_label_column(),
            series: default_series(),
            embeds: BTreeMap::new(),
        }
    }
}

impl SourceConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }

    /// False while the URL is empty or still the placeholder.
    pub fn is_configured(&self) -> bool {
        let url = self.csv_url.trim();
        !url.is_empty() && url != CSV_URL_PLACEHOLDER
    }
}

/// True for an unset `CHART_<n>_EMBED_SRC_URL` style placeholder.
pub fn is_embed_placeholder(link: &str) -> bool {
    let link = link.trim();
    link.is_empty() || (link.starts_with("CHART_") && link.ends_with("_EMBED_SRC_URL"))
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("DASH").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    #[cfg(test)]
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.source.refresh_interval_ms, 30_000);
        assert_eq!(cfg.charts.label_column, "Asset");
        assert_eq!(cfg.charts.series.len(), 3);
        assert!(!cfg.source.is_configured());
    }

    #[test]
    fn test_from_toml_partial() {
        let cfg = AppConfig::from_toml(
            r#"
            [source]
            csv_url = "https://example.com/sheet.csv"
            refresh_interval_ms = 5000

            [charts]
            label_column = "Name"
            series = [{ name = "cost", column = "Cost" }]

            [charts.embeds]
            minutes = "CHART_1_EMBED_SRC_URL"
            "#,
        )
        .unwrap();

        assert!(cfg.source.is_configured());
        assert_eq!(cfg.source.refresh_interval(), Duration::from_millis(5000));
        assert_eq!(cfg.source.timeout_secs, 30);
        assert_eq!(cfg.source.cache_bust_param, "t");
        assert_eq!(cfg.charts.label_column, "Name");
        assert_eq!(
            cfg.charts.series,
            vec![SeriesSpec { name: "cost".into(), column: "Cost".into() }]
        );
        assert!(is_embed_placeholder(&cfg.charts.embeds["minutes"]));
    }

    #[test]
    fn test_placeholder_url_is_unconfigured() {
        let mut source = SourceConfig::default();
        source.csv_url = CSV_URL_PLACEHOLDER.to_string();
        assert!(!source.is_configured());
        assert!(!is_embed_placeholder("https://docs.google.com/x/pubchart?oid=1"));
    }
}
