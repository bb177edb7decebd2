use crate::config::SourceConfig;
use crate::error::DashboardError;
use std::time::Duration;
use tracing::debug;

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &SourceConfig) -> Result<Self, DashboardError> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Apps Script web apps answer with a redirect that sets cookies
            .cookie_store(true)
            .build()?;

        Ok(Self { inner })
    }

    /// GET a URL and return the body as text. No retries: the next scheduled
    /// cycle is the retry.
    pub async fn get_text(&self, url: &str) -> Result<String, DashboardError> {
        debug!("GET {}", url);

        let resp = self.inner.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::Fetch(format!("HTTP {}", status)));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !is_textual(ct) {
                return Err(DashboardError::Decode(format!(
                    "unexpected content type {}",
                    ct
                )));
            }
        }

        let text = resp
            .text()
            .await
            .map_err(|e| DashboardError::Decode(format!("body: {}", e)))?;
        Ok(text)
    }
}

/// Text, CSV and JSON bodies are accepted.
pub fn is_textual(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.starts_with("text/") || ct.contains("csv") || ct.contains("json")
}
