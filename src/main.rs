use std::process::ExitCode;

use vk_context::logging::{init_logging, LoggingConfig};
use vk_context::{window, AppConfig, WindowConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match window::run(WindowConfig::default(), AppConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
