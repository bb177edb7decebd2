pub mod envelope;
pub mod http_client;

use crate::config::SourceConfig;
use crate::error::DashboardError;
use async_trait::async_trait;
use chrono::Utc;
use url::Url;

use self::envelope::decode_body;
use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Anything that can produce one CSV body per refresh cycle.
#[async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch_csv(&self) -> Result<String, DashboardError>;
}

// ── Published sheet over HTTP ─────────────────────────────────────────────────

pub struct SheetSource {
    client: HttpClient,
    base_url: Url,
    cache_bust_param: String,
}

impl SheetSource {
    pub fn new(config: &SourceConfig) -> Result<Self, DashboardError> {
        if !config.is_configured() {
            return Err(DashboardError::Config("csv_url is not set".to_string()));
        }

        let base_url = Url::parse(config.csv_url.trim())
            .map_err(|e| DashboardError::Config(format!("csv_url {:?}: {}", config.csv_url, e)))?;

        Ok(Self {
            client: HttpClient::new(config)?,
            base_url,
            cache_bust_param: config.cache_bust_param.clone(),
        })
    }

    /// Source URL with a timestamp appended so caches never answer.
    fn request_url(&self) -> Url {
        cache_busted(&self.base_url, &self.cache_bust_param, Utc::now().timestamp_millis())
    }
}

#[async_trait]
impl CsvSource for SheetSource {
    async fn fetch_csv(&self) -> Result<String, DashboardError> {
        let url = self.request_url();
        let body = self.client.get_text(url.as_str()).await?;
        decode_body(&body)
    }
}

/// Append `param=stamp`, keeping any existing query.
pub fn cache_busted(base: &Url, param: &str, stamp: i64) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair(param, &stamp.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted_without_query() {
        let base = Url::parse("https://example.com/sheet.csv").unwrap();
        assert_eq!(
            cache_busted(&base, "t", 1700000000000).as_str(),
            "https://example.com/sheet.csv?t=1700000000000"
        );
    }

    #[test]
    fn test_cache_busted_keeps_existing_query() {
        let base = Url::parse("https://docs.google.com/pub?output=csv&gid=0").unwrap();
        assert_eq!(
            cache_busted(&base, "t", 42).as_str(),
            "https://docs.google.com/pub?output=csv&gid=0&t=42"
        );
    }

    #[test]
    fn test_unconfigured_source_rejected() {
        let config = SourceConfig::default();
        assert!(matches!(SheetSource::new(&config), Err(DashboardError::Config(_))));

        let config = SourceConfig {
            csv_url: "not a url".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(SheetSource::new(&config), Err(DashboardError::Config(_))));
    }
}
