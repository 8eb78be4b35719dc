use clap::Parser;
use prediction_validation::{Args, ValidationError, run};
use spdlog::prelude::*;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Exits with status 2 on a wrong argument count, before any file is opened.
    let args = Args::parse();
    spdlog::default_logger().set_level_filter(args.log_level.filter());

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err @ ValidationError::InvalidNumber { .. }) => {
            error!("There are invalid inputs: {}. Output up to this point was kept.", err);
            ExitCode::FAILURE
        }
        Err(err @ ValidationError::Overflow(_)) => {
            error!("{}. Output up to this point was kept.", err);
            ExitCode::FAILURE
        }
        Err(ValidationError::Io(err)) => {
            error!("I/O failure: {}", err);
            ExitCode::FAILURE
        }
    }
}
