// UI layer: narrates a single upload on the terminal. Prompts are shown
// only when stdin is a terminal so the demo also runs unattended.

use crate::api::Uploader;
use crate::error::UploadError;
use crate::response::UploadedFile;
use anyhow::Result;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Sample file the demo uploads when nothing else is chosen.
pub const SAMPLE_FILE: &str = "27f4273337f94786ae07e67a6ace2113.mp4";
pub const SAMPLE_EXPIRY_DAYS: u32 = 30;

/// Upload the sample file (or whatever the user picks) and print a summary.
/// Returns the hosted file so `main` can pick the exit status.
pub fn run_demo(uploader: &Uploader) -> Result<Option<UploadedFile>> {
    let config = uploader.config();
    println!("--- {} upload example ---", config.service);
    let has_expiry = config.expiry_field.is_some();

    let (path, expiry) = if std::io::stdin().is_terminal() {
        let path: String = Input::new()
            .with_prompt("File to upload")
            .default(SAMPLE_FILE.to_string())
            .interact_text()?;
        let expiry = if has_expiry {
            let days: u32 = Input::new()
                .with_prompt("Expiry (days)")
                .default(SAMPLE_EXPIRY_DAYS)
                .interact_text()?;
            Some(days)
        } else {
            None
        };
        (path, expiry)
    } else {
        (SAMPLE_FILE.to_string(), has_expiry.then_some(SAMPLE_EXPIRY_DAYS))
    };

    let outcome = upload_with_spinner(uploader, &path, expiry)?;
    match &outcome {
        Ok(file) => {
            println!("\nUploaded '{}' to: {}", path, file.url);
            println!(
                "Name: {}, size: {} bytes, expiry: {}",
                file.name.as_deref().unwrap_or("-"),
                file.size.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                file.expiry
                    .as_ref()
                    .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
                    .unwrap_or_else(|| "-".into()),
            );
        }
        Err(e) => {
            println!("\nUpload failed: {}", e);
            report_failure(e);
        }
    }

    println!("\n--- Done ---");
    Ok(outcome.ok())
}

/// Run one upload behind a spinner. The outer `Result` covers terminal
/// errors; the inner one is the upload outcome.
pub fn upload_with_spinner(
    uploader: &Uploader,
    path: &str,
    expiry_days: Option<u32>,
) -> Result<std::result::Result<UploadedFile, UploadError>> {
    let local = match uploader.inspect(path) {
        Ok(local) => local,
        Err(e) => return Ok(Err(e)),
    };
    println!(
        "Uploading {} ({:.2} MiB, {}) to {}...",
        local.path.display(),
        local.size_mib(),
        local.content_type,
        uploader.config().upload_url
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Uploading...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = uploader.upload_local(&local, expiry_days);
    spinner.finish_and_clear();
    Ok(outcome)
}

/// Extra lines for failures where the user can do something about it.
fn report_failure(err: &UploadError) {
    match err {
        UploadError::NotFound { .. } => println!("Check that the path is correct."),
        UploadError::TooLarge { .. } => println!("Pick a smaller file or compress it first."),
        UploadError::Http {
            status,
            hint: Some(hint),
            ..
        } => println!("Status {}: {}", status, hint),
        UploadError::Connection(_) => println!("Check your internet connection."),
        UploadError::Timeout { .. } => {
            println!("The connection may be slow or the server busy; try again later.")
        }
        _ => {}
    }
}
