// Client configuration: everything the uploader needs to know about the
// remote service. Presets cover qu.ax and Videy.co; tests swap the endpoint
// for a local mock server.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_UPLOAD_URL: &str = "https://qu.ax/upload.php";
pub const DEFAULT_URL_PREFIX: &str = "https://qu.ax/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * MIB;

pub const VIDEY_UPLOAD_URL: &str = "https://videy.co/api/upload";
pub const VIDEY_URL_PREFIX: &str = "https://videy.co/";
pub const VIDEY_TIMEOUT: Duration = Duration::from_secs(300);
pub const VIDEY_MAX_FILE_SIZE: u64 = 1000 * MIB;

pub const MIB: u64 = 1024 * 1024;

/// Which hosting service the uploader talks to. Decides the response format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    Quax,
    Videy,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Quax => write!(f, "qu.ax"),
            Service::Videy => write!(f, "Videy.co"),
        }
    }
}

/// Settings for one `Uploader`. Built once and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct UploaderConfig {
    pub service: Service,
    /// Multipart POST target.
    pub upload_url: String,
    /// Query parameters appended to every upload request.
    pub query: Vec<(String, String)>,
    /// Plain-text responses are only accepted as URLs when they start with this.
    pub url_prefix: String,
    pub user_agent: String,
    pub accept: String,
    /// Sent on every request besides the user agent and accept headers.
    pub extra_headers: Vec<(String, String)>,
    /// Multipart field carrying the file.
    pub file_field: String,
    /// Form field for retention in days; `None` when the service has none.
    pub expiry_field: Option<String>,
    /// Bounds the whole request/response cycle.
    pub timeout: Duration,
    /// Client-side ceiling in bytes, checked before anything is sent.
    pub max_file_size: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self::quax()
    }
}

impl UploaderConfig {
    /// qu.ax: `files[]` part, optional `expiry`, JSON or bare-URL replies.
    pub fn quax() -> Self {
        Self {
            service: Service::Quax,
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            query: Vec::new(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "*/*".to_string(),
            extra_headers: Vec::new(),
            file_field: "files[]".to_string(),
            expiry_field: Some("expiry".to_string()),
            timeout: DEFAULT_TIMEOUT,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Videy.co: `file` part, identified by a visitor id, no expiry setting.
    pub fn videy(visitor_id: impl Into<String>) -> Self {
        Self {
            service: Service::Videy,
            upload_url: VIDEY_UPLOAD_URL.to_string(),
            query: vec![("visitorId".to_string(), visitor_id.into())],
            url_prefix: VIDEY_URL_PREFIX.to_string(),
            extra_headers: vec![("X-Requested-With".to_string(), "XMLHttpRequest".to_string())],
            file_field: "file".to_string(),
            expiry_field: None,
            timeout: VIDEY_TIMEOUT,
            max_file_size: VIDEY_MAX_FILE_SIZE,
            ..Self::quax()
        }
    }

    /// Pick a preset with `UPLOAD_SERVICE` (`quax` or `videy`, the latter
    /// needing `VIDEY_VISITOR_ID`), then apply `UPLOAD_URL`,
    /// `UPLOAD_TIMEOUT_SECS` and `UPLOAD_MAX_SIZE_MIB` when they are set.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let service = get("UPLOAD_SERVICE").unwrap_or_else(|| "quax".to_string());
        let mut config = match service.trim().to_ascii_lowercase().as_str() {
            "quax" | "qu.ax" => Self::quax(),
            "videy" | "videy.co" => {
                let visitor_id = get("VIDEY_VISITOR_ID")
                    .context("VIDEY_VISITOR_ID must be set to upload to Videy.co")?;
                Self::videy(visitor_id)
            }
            other => bail!("UPLOAD_SERVICE must be `quax` or `videy`, got {other:?}"),
        };

        if let Some(url) = get("UPLOAD_URL") {
            config.upload_url = url;
        }
        if let Some(secs) = get("UPLOAD_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("UPLOAD_TIMEOUT_SECS is not a number of seconds: {secs:?}"))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get("UPLOAD_MAX_SIZE_MIB") {
            let mib: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("UPLOAD_MAX_SIZE_MIB is not a number of MiB: {raw:?}"))?;
            config.max_file_size = mib
                .checked_mul(MIB)
                .with_context(|| format!("UPLOAD_MAX_SIZE_MIB is too large: {raw:?}"))?;
        }

        Ok(config)
    }

    /// Point the client at another endpoint, keeping everything else.
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<UploaderConfig> {
        let env = vars(pairs);
        UploaderConfig::from_vars(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_target_quax() {
        let config = UploaderConfig::default();
        assert_eq!(config.service, Service::Quax);
        assert_eq!(config.upload_url, "https://qu.ax/upload.php");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_file_size, 524_288_000);
        assert_eq!(config.accept, "*/*");
        assert_eq!(config.file_field, "files[]");
        assert_eq!(config.expiry_field.as_deref(), Some("expiry"));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.query.is_empty());
    }

    #[test]
    fn videy_preset() {
        let config = UploaderConfig::videy("visitor-1");
        assert_eq!(config.service, Service::Videy);
        assert_eq!(config.upload_url, "https://videy.co/api/upload");
        assert_eq!(config.query, vec![("visitorId".to_string(), "visitor-1".to_string())]);
        assert_eq!(config.file_field, "file");
        assert!(config.expiry_field.is_none());
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_file_size, 1000 * MIB);
        assert_eq!(
            config.extra_headers,
            vec![("X-Requested-With".to_string(), "XMLHttpRequest".to_string())]
        );
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("UPLOAD_URL", "http://127.0.0.1:9999/upload.php"),
            ("UPLOAD_TIMEOUT_SECS", " 15 "),
            ("UPLOAD_MAX_SIZE_MIB", "2"),
        ])
        .unwrap();
        assert_eq!(config.upload_url, "http://127.0.0.1:9999/upload.php");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_file_size, 2 * MIB);
        assert_eq!(config.url_prefix, DEFAULT_URL_PREFIX);
    }

    #[test]
    fn missing_vars_keep_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.service, Service::Quax);
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn videy_is_selected_by_service_var() {
        let config = load(&[("UPLOAD_SERVICE", "Videy"), ("VIDEY_VISITOR_ID", "abc")]).unwrap();
        assert_eq!(config.service, Service::Videy);
        assert_eq!(config.query[0].1, "abc");
    }

    #[test]
    fn videy_needs_visitor_id() {
        let err = load(&[("UPLOAD_SERVICE", "videy")]).unwrap_err();
        assert!(err.to_string().contains("VIDEY_VISITOR_ID"));
    }

    #[test]
    fn unknown_service_is_rejected() {
        let err = load(&[("UPLOAD_SERVICE", "catbox")]).unwrap_err();
        assert!(err.to_string().contains("UPLOAD_SERVICE"));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = load(&[("UPLOAD_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("UPLOAD_TIMEOUT_SECS"));
    }

    #[test]
    fn overflowing_size_ceiling_is_rejected() {
        let err = load(&[("UPLOAD_MAX_SIZE_MIB", "99999999999999")]).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
