// Upload client: a small blocking HTTP client for the hosting service.
// One call is one attempt. The file is streamed into the multipart body and
// the handle lives exactly as long as the request that owns it.

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::config::UploaderConfig;
use crate::error::{mib, status_hint, UploadError};
use crate::response::{resolve_body, UploadedFile};

/// Holds a reqwest blocking client configured with the service's headers
/// and timeout, plus the configuration it was built from.
#[derive(Clone, Debug)]
pub struct Uploader {
    client: Client,
    config: UploaderConfig,
}

/// A local file that passed validation and is ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

impl LocalFile {
    pub fn size_mib(&self) -> f64 {
        mib(&self.size)
    }
}

impl Uploader {
    pub fn new(config: UploaderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent header")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&config.accept).context("Invalid accept header")?,
        );
        for (name, value) in &config.extra_headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())
                    .with_context(|| format!("Invalid header name {name:?}"))?,
                HeaderValue::from_str(value)
                    .with_context(|| format!("Invalid value for header {name}"))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Uploader { client, config })
    }

    /// Build an uploader from `UploaderConfig::from_env`.
    pub fn from_env() -> Result<Self> {
        Self::new(UploaderConfig::from_env()?)
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Check that `path` is a regular file within the size ceiling and work
    /// out what it will be sent as. Touches only the local filesystem.
    pub fn inspect(&self, path: impl AsRef<Path>) -> Result<LocalFile, UploadError> {
        let path = path.as_ref();
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(UploadError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(UploadError::Unexpected(format!(
                    "cannot read metadata of {}: {e}",
                    path.display()
                )))
            }
        };
        if !metadata.is_file() {
            return Err(UploadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let size = metadata.len();
        if size > self.config.max_file_size {
            return Err(UploadError::TooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(LocalFile {
            path: path.to_path_buf(),
            name,
            size,
            content_type,
        })
    }

    /// Upload one file and return where it is hosted. `expiry_days` is sent
    /// as the service's expiry form field; `None` leaves retention to the
    /// server.
    pub fn upload(
        &self,
        path: impl AsRef<Path>,
        expiry_days: Option<u32>,
    ) -> Result<UploadedFile, UploadError> {
        let local = self.inspect(path)?;
        self.upload_local(&local, expiry_days)
    }

    /// Upload a file already checked by `inspect`. Exactly `local.size`
    /// bytes are sent, even if the file changed in the meantime.
    pub fn upload_local(
        &self,
        local: &LocalFile,
        expiry_days: Option<u32>,
    ) -> Result<UploadedFile, UploadError> {
        tracing::info!(
            service = %self.config.service,
            path = %local.path.display(),
            size = local.size,
            content_type = %local.content_type,
            endpoint = %self.config.upload_url,
            "Uploading file"
        );

        let result = self.send(local, expiry_days);
        match &result {
            Ok(file) => tracing::info!(url = %file.url, "Upload finished"),
            Err(e) => tracing::warn!(error = %e, "Upload failed"),
        }
        result
    }

    fn send(&self, local: &LocalFile, expiry_days: Option<u32>) -> Result<UploadedFile, UploadError> {
        let form = self.build_form(local, expiry_days)?;

        // The form owns the file; it is dropped with the request on every path.
        let mut request = self.client.post(&self.config.upload_url);
        if !self.config.query.is_empty() {
            request = request.query(&self.config.query);
        }
        let response = request
            .multipart(form)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().map_err(|e| self.classify(e))?;
            return Err(UploadError::Http {
                status: status.as_u16(),
                body: body.trim().to_string(),
                hint: status_hint(status.as_u16()),
            });
        }

        let body = response.text().map_err(|e| self.classify(e))?;
        tracing::debug!(status = status.as_u16(), body = %body, "Upload response");
        resolve_body(self.config.service, &body, &self.config.url_prefix)
    }

    fn build_form(
        &self,
        local: &LocalFile,
        expiry_days: Option<u32>,
    ) -> Result<multipart::Form, UploadError> {
        let file = File::open(&local.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => UploadError::NotFound {
                path: local.path.clone(),
            },
            _ => UploadError::Unexpected(format!(
                "cannot open {}: {e}",
                local.path.display()
            )),
        })?;

        let part = multipart::Part::reader_with_length(file.take(local.size), local.size)
            .file_name(local.name.clone())
            .mime_str(&local.content_type)
            .map_err(|e| UploadError::Unexpected(format!("invalid content type: {e}")))?;

        let mut form = multipart::Form::new().part(self.config.file_field.clone(), part);
        match (&self.config.expiry_field, expiry_days) {
            (Some(field), Some(days)) => form = form.text(field.clone(), days.to_string()),
            (None, Some(_)) => {
                tracing::debug!(service = %self.config.service, "Service has no expiry setting, ignoring it")
            }
            _ => {}
        }
        Ok(form)
    }

    fn classify(&self, err: reqwest::Error) -> UploadError {
        if err.is_timeout() {
            UploadError::Timeout {
                timeout: self.config.timeout,
                source: err,
            }
        } else if err.is_connect() {
            UploadError::Connection(err)
        } else {
            UploadError::Transport(err)
        }
    }
}
