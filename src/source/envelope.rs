use crate::error::DashboardError;
use serde::Deserialize;

/// Shape returned by CORS proxies such as allorigins: the sheet body sits
/// under `contents`.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    contents: Option<serde_json::Value>,
}

/// Unwrap a proxy envelope if there is one, otherwise return the body as-is.
pub fn decode_body(body: &str) -> Result<String, DashboardError> {
    if !body.trim_start().starts_with('{') {
        return Ok(body.to_string());
    }

    let envelope: ProxyEnvelope = serde_json::from_str(body)?;
    match envelope.contents {
        Some(serde_json::Value::String(text)) => Ok(text),
        Some(other) => Err(DashboardError::Decode(format!(
            "`contents` is not a string: {}",
            other
        ))),
        None => Err(DashboardError::Decode("envelope has no `contents`".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_csv_passes_through() {
        let body = "Asset,Revenue\nA,1\n";
        assert_eq!(decode_body(body).unwrap(), body);
    }

    #[test]
    fn test_envelope_unwrapped() {
        let body = r#"{"contents":"Asset,Revenue\nA,1\n","status":{"http_code":200}}"#;
        assert_eq!(decode_body(body).unwrap(), "Asset,Revenue\nA,1\n");
    }

    #[test]
    fn test_bad_envelopes() {
        assert!(matches!(decode_body("{not json"), Err(DashboardError::Decode(_))));
        assert!(matches!(decode_body(r#"{"status":1}"#), Err(DashboardError::Decode(_))));
        assert!(matches!(decode_body(r#"{"contents":5}"#), Err(DashboardError::Decode(_))));
    }
}
