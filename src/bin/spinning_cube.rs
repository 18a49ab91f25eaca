//! Opens a window showing spinning cubes under a perspective projection. Escape quits.

use std::process::ExitCode;

use glow_demos::demos::SpinningCube;
use glow_demos::logging::{init_logging, LoggingConfig};
use glow_demos::AppConfig;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match glow_demos::run(AppConfig::default(), SpinningCube::default()) {
        Ok(()) => ExitCode::SUCCESS,
        // Already logged by the harness.
        Err(_) => ExitCode::FAILURE,
    }
}
