use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser;
use log::error;
use simplelog::{
    ColorChoice, CombinedLogger, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use course_index::{run, Config, Result, Session};

fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(e) = initialize_logging(&config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run_batch(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, since stdout carries the answers.
fn initialize_logging(config: &Config) -> Result<()> {
    let log_config = simplelog::Config::default();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        loggers.push(WriteLogger::new(
            log::LevelFilter::Debug,
            log_config,
            File::create(path)?,
        ));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Stdout is line buffered, so every answer shows up as soon as its query has been read.
fn run_batch(config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut session = Session::new();

    match config.input_file() {
        Some(path) => run(BufReader::new(File::open(path)?), stdout.lock(), &mut session)?,
        None => run(io::stdin().lock(), stdout.lock(), &mut session)?,
    };
    Ok(())
}
