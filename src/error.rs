use std::path::PathBuf;
use std::time::Duration;

use crate::config::MIB;

/// Every way a single upload can fail. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("file too large: {:.2} MiB (max: {:.0} MiB)", mib(.size), mib(.max))]
    TooLarge { size: u64, max: u64 },

    #[error("upload failed with HTTP {status}: {body}{}", hint_suffix(.hint))]
    Http {
        status: u16,
        body: String,
        hint: Option<&'static str>,
    },

    #[error("could not connect to the upload endpoint: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("upload timed out after {timeout:?}: {source}")]
    Timeout {
        timeout: Duration,
        #[source]
        source: reqwest::Error,
    },

    #[error("transport error while uploading: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upload API returned an error: {message}")]
    Api { message: String },

    #[error("upload reported success but no file URL was found: {payload}")]
    MalformedSuccess { payload: serde_json::Value },

    #[error("unexpected response payload: {payload}")]
    UnexpectedShape { payload: serde_json::Value },

    #[error("response is neither JSON nor a hosted URL: {body}")]
    UnparsableResponse { body: String },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl UploadError {
    /// True for failures detected before any network activity.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::TooLarge { .. })
    }
}

/// Extra guidance for status codes with a well-known cause.
pub fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        413 => Some("Payload Too Large: the file exceeds the payload size the server accepts"),
        400 => Some("Bad Request: the server rejected the file format or the form fields"),
        _ => None,
    }
}

pub(crate) fn mib(bytes: &u64) -> f64 {
    *bytes as f64 / MIB as f64
}

fn hint_suffix(hint: &Option<&'static str>) -> String {
    hint.map(|h| format!(" ({h})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_reports_mib() {
        let err = UploadError::TooLarge {
            size: 600 * MIB,
            max: 500 * MIB,
        };
        assert_eq!(err.to_string(), "file too large: 600.00 MiB (max: 500 MiB)");
        assert!(err.is_local());
    }

    #[test]
    fn http_error_carries_hint() {
        let err = UploadError::Http {
            status: 413,
            body: "nope".into(),
            hint: status_hint(413),
        };
        let text = err.to_string();
        assert!(text.starts_with("upload failed with HTTP 413: nope ("));
        assert!(text.contains("payload size"));
        assert!(!err.is_local());
    }

    #[test]
    fn only_413_and_400_have_hints() {
        assert!(status_hint(400).is_some());
        assert!(status_hint(413).is_some());
        assert!(status_hint(500).is_none());

        let err = UploadError::Http {
            status: 502,
            body: "bad gateway".into(),
            hint: status_hint(502),
        };
        assert_eq!(err.to_string(), "upload failed with HTTP 502: bad gateway");
    }
}
