use std::process::ExitCode;

use anyhow::Context;
use lumen_engine::logging::init_logging;
use lumen_engine::{EngineConfig, ShutdownReason};

fn main() -> ExitCode {
    let config = EngineConfig::from_env();
    init_logging(config.logging.clone());

    match lumen_engine::run(&config).context("engine initialization failed") {
        Ok(ShutdownReason::Closed) => ExitCode::SUCCESS,
        Ok(ShutdownReason::Fatal) => {
            // Runtime failures still unwind cleanly.
            log::warn!("stopped after a runtime failure");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
