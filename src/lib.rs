// Library root
// ------------
// This crate uploads one local file to qu.ax or Videy.co and hands back
// the hosted URL.
// The binary (`main.rs`) wires these modules into a small demo flow.
//
// Module responsibilities:
// - `config`: service presets with endpoint, headers, timeout and size
//   ceiling used by the client.
// - `api`: the blocking HTTP client that validates the file, builds the
//   multipart request and classifies transport failures.
// - `response`: turns the raw response body into an `UploadedFile`.
// - `error`: the typed failure kinds callers branch on.
// - `ui`: terminal narration around a single upload.
pub mod api;
pub mod config;
pub mod error;
pub mod response;
pub mod ui;

pub use api::{LocalFile, Uploader};
pub use config::{Service, UploaderConfig};
pub use error::UploadError;
pub use response::UploadedFile;
