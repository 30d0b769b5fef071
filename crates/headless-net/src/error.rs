//! Resource loading errors

use std::sync::Arc;

/// Why a single fetch failed
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx response. `status_text` is the standard reason phrase for
    /// `status` (empty for unregistered codes); reqwest does not expose the
    /// phrase the server sent.
    #[error("HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },

    /// Only `text/*` responses are accepted
    #[error("only supports `text/*` resources, got {}", .content_type.as_deref().unwrap_or("no content-type"))]
    ContentType { content_type: Option<String> },

    #[error("failed to decode {encoding} body")]
    Decode {
        encoding: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request header `{name}`")]
    InvalidHeader { name: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A failed resource load, tagged with the identity that failed
///
/// Cloning is cheap; every requester of a deduplicated resource receives a
/// clone of the same error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("resource load failed: \"{identity}\"")]
pub struct LoadError {
    identity: String,
    #[source]
    cause: Arc<FetchError>,
}

impl LoadError {
    pub fn new(identity: impl Into<String>, cause: FetchError) -> Self {
        Self {
            identity: identity.into(),
            cause: Arc::new(cause),
        }
    }

    /// Normalized identity of the resource that failed
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn cause(&self) -> &FetchError {
        &self.cause
    }

    /// Whether two errors are the same shared failure
    pub fn same_failure(&self, other: &LoadError) -> bool {
        Arc::ptr_eq(&self.cause, &other.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_load_error_display_and_source() {
        let err = LoadError::new(
            "a.css",
            FetchError::Status {
                status: 404,
                status_text: "Not Found".into(),
            },
        );
        assert_eq!(err.to_string(), "resource load failed: \"a.css\"");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("HTTP 404 Not Found"));
        assert!(err.same_failure(&err.clone()));
    }

    #[test]
    fn test_content_type_message() {
        let err = FetchError::ContentType { content_type: None };
        assert_eq!(err.to_string(), "only supports `text/*` resources, got no content-type");
    }
}
