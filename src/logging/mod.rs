//! Logging for the frame sampler
//!
//! - Bracketed event format shared by every output
//! - Dual logging (timestamped file + stderr)
//! - `RUST_LOG` overrides the default filter

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::{setup_console_logging, setup_logging};
