use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

/// Default filter when `RUST_LOG` is unset. Decoder crates stay quiet.
const DEFAULT_FILTER: &str = "info";
const QUIET_DEPENDENCIES: [&str; 3] = ["png=warn", "tiff=warn", "image=warn"];

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        QUIET_DEPENDENCIES
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::new(DEFAULT_FILTER), |filter, directive| {
                filter.add_directive(directive)
            })
    })
}

/// Install file logging, plus stderr when `echo` is set.
///
/// The log file is `frame_sampler_<YYYYmmdd_HHMMSS>.log` inside `log_dir`
/// (created if needed). Returns the log file path.
pub fn setup_logging(log_dir: &Path, echo: bool) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("frame_sampler_{}.log", timestamp));
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    let stderr_layer = echo.then(|| {
        fmt::layer()
            .event_format(BracketedFormatter)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(default_filter())
        .with(file_layer)
        .with(stderr_layer)
        .init();

    info!("Log file created at: {:?}", log_path);
    Ok(log_path)
}

/// Stderr-only logging, for when no log directory is usable
pub fn setup_console_logging() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().event_format(BracketedFormatter).with_writer(io::stderr))
        .init();
}
