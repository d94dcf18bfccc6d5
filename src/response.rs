// Response resolution: the body is read once by the client and handed here
// as text. Each service has its own JSON shape. qu.ax may also answer with
// a bare URL; Videy.co always answers with JSON.

use serde::Deserialize;
use serde_json::Value;

use crate::config::Service;
use crate::error::UploadError;

/// What the service tells us about a hosted file. Only `url` is guaranteed;
/// the rest comes from the JSON payload when the server includes it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Kept as raw JSON because the server sends either a string or a number.
    #[serde(default)]
    pub expiry: Option<Value>,
}

impl UploadedFile {
    fn from_url(url: &str) -> Self {
        UploadedFile {
            url: url.to_string(),
            name: None,
            size: None,
            expiry: None,
        }
    }
}

/// Resolve a successful (2xx) response body into the hosted file.
pub fn resolve_body(
    service: Service,
    body: &str,
    url_prefix: &str,
) -> Result<UploadedFile, UploadError> {
    match service {
        Service::Quax => resolve_quax(body, url_prefix),
        Service::Videy => resolve_videy(body),
    }
}

/// `{success: true, files: [{url, ..}]}`, `{error}` or a bare URL.
pub fn resolve_quax(body: &str, url_prefix: &str) -> Result<UploadedFile, UploadError> {
    match serde_json::from_str::<Value>(body) {
        Ok(payload) => resolve_quax_json(payload),
        Err(_) => resolve_plain_text(body, url_prefix),
    }
}

/// `{status: true, data: {url, name, size}}` or `{status: false, message}`.
pub fn resolve_videy(body: &str) -> Result<UploadedFile, UploadError> {
    let payload: Value = serde_json::from_str(body).map_err(|_| UploadError::UnparsableResponse {
        body: body.trim().to_string(),
    })?;

    match payload.get("status").and_then(Value::as_bool) {
        Some(true) => {
            let hosted = payload
                .get("data")
                .and_then(|data| Some((data, data.get("url")?.as_str()?)));
            match hosted {
                Some((data, url)) => Ok(parse_entry(data, url)),
                None => Err(UploadError::MalformedSuccess { payload }),
            }
        }
        Some(false) => match payload.get("message") {
            Some(Value::String(message)) => Err(UploadError::Api {
                message: message.clone(),
            }),
            Some(other) => Err(UploadError::Api {
                message: other.to_string(),
            }),
            None => Err(UploadError::UnexpectedShape { payload }),
        },
        None => Err(UploadError::UnexpectedShape { payload }),
    }
}

fn resolve_quax_json(payload: Value) -> Result<UploadedFile, UploadError> {
    let succeeded = payload.get("success").and_then(Value::as_bool) == Some(true);
    let first = payload
        .get("files")
        .and_then(Value::as_array)
        .and_then(|files| files.first());

    if succeeded {
        if let Some(entry) = first {
            return match entry.get("url").and_then(Value::as_str) {
                Some(url) => Ok(parse_entry(entry, url)),
                None => Err(UploadError::MalformedSuccess { payload }),
            };
        }
    }

    if let Some(error) = payload.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(UploadError::Api { message });
    }

    Err(UploadError::UnexpectedShape { payload })
}

// Metadata fields are best effort: a wrongly typed `size` must not lose the URL.
fn parse_entry(entry: &Value, url: &str) -> UploadedFile {
    serde_json::from_value::<UploadedFile>(entry.clone()).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring unreadable file metadata");
        UploadedFile::from_url(url)
    })
}

fn resolve_plain_text(body: &str, url_prefix: &str) -> Result<UploadedFile, UploadError> {
    let text = body.trim();
    if text.starts_with(url_prefix) {
        Ok(UploadedFile::from_url(text))
    } else {
        Err(UploadError::UnparsableResponse {
            body: text.to_string(),
        })
    }
}
