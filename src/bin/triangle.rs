//! Opens a window showing a single animated triangle. Escape quits.

use std::process::ExitCode;

use glow_demos::demos::Triangle;
use glow_demos::logging::{init_logging, LoggingConfig};
use glow_demos::AppConfig;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match glow_demos::run(AppConfig::default(), Triangle::default()) {
        Ok(()) => ExitCode::SUCCESS,
        // Already logged by the harness.
        Err(_) => ExitCode::FAILURE,
    }
}
