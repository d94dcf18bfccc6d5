// Entrypoint for the demo binary.
// - Keeps `main` small: set up logging, build the uploader, hand it to the UI.
// - Logs go to stderr so they stay out of the narration on stdout.

use quax_upload::{ui::run_demo, Uploader};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // `UPLOAD_SERVICE` picks qu.ax or Videy.co; endpoint, timeout and size
    // ceiling can be overridden through `UPLOAD_URL`, `UPLOAD_TIMEOUT_SECS`
    // and `UPLOAD_MAX_SIZE_MIB`.
    let uploader = Uploader::from_env()?;

    if run_demo(&uploader)?.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
