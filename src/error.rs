use thiserror::Error;

/// Failures a refresh cycle can end with.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network, DNS, timeout or non-success HTTP status.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Body was not text, or the proxy envelope was malformed.
    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("unusable CSV: {0}")]
    Parse(String),

    #[error("source not configured: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Message shown to the user in place of the table.
    pub fn status_message(&self) -> &'static str {
        match self {
            DashboardError::Parse(_) => "No data",
            DashboardError::Config(_) => "No data",
            _ => "Connection Error. Check URL.",
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        DashboardError::Fetch(e.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Decode(e.to_string())
    }
}
