//! Logging initialization

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on debug flag
///
/// With `--debug`, everything from `debug` up goes to a temp log file so it
/// never mixes with JSON on stdout; the file path is returned. Otherwise only
/// warnings reach stderr. `RUST_LOG` overrides the level in both modes.
pub fn init_logging(debug: bool) -> Option<PathBuf> {
    if !debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_target(false)
            .init();
        return None;
    }

    let temp_file = tempfile::Builder::new()
        .prefix("metaroute-")
        .suffix(".log")
        .tempfile()
        .and_then(|f| f.keep().map_err(|e| e.error))
        .map(|(_, path)| path)
        .unwrap_or_else(|_| std::env::temp_dir().join(format!("metaroute-{}.log", std::process::id())));

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&temp_file)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Could not open log file {}: {}; logging to stderr",
                temp_file.display(),
                e
            );
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(EnvFilter::new("debug"))
                .init();
            return None;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(temp_file)
}
