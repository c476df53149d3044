//! Ingestion error taxonomy.

use thiserror::Error;

/// Failures talking to the yields provider.
///
/// Only [`IngestError::UpstreamUnavailable`] ever leaves the ingestion
/// cache; the other variants describe why a single remote call failed and
/// are absorbed by the stale-serving path.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("yields provider unavailable and no cached data: {0}")]
    UpstreamUnavailable(String),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed provider payload: {0}")]
    Decode(String),

    #[error("provider call exceeded {0}s deadline")]
    Timeout(u64),
}

impl From<reqwest::Error> for IngestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            IngestError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            IngestError::Status(status.as_u16())
        } else {
            IngestError::Http(e.to_string())
        }
    }
}
