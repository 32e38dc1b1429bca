//! Runtime configuration for the `course_index` binary.
//!
//! ```text
//! course_index [INPUT] [--log-level LEVEL] [--log-file PATH]
//! ```
//!
//! `INPUT` defaults to standard input (`-` also means standard input). The log level can also
//! come from the `COURSE_INDEX_LOG` environment variable; the command line wins.

use std::path::{Path, PathBuf};

use clap::Parser;
use log::LevelFilter;

/// Environment variable holding the default log level.
pub const LOG_ENV_VAR: &str = "COURSE_INDEX_LOG";

/// Where queries come from and how much to log about them.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "course_index")]
#[command(about = "Answer course registration queries against a red-black tree index")]
pub struct Config {
    /// File to read queries from ("-" or nothing for standard input)
    pub input: Option<PathBuf>,

    /// Level for the stderr logger (off, error, warn, info, debug, trace)
    #[arg(long, env = "COURSE_INDEX_LOG", default_value = "warn")]
    pub log_level: LevelFilter,

    /// Also log everything at debug and above to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            log_level: LevelFilter::Warn,
            log_file: None,
        }
    }
}

impl Config {
    /// Builds a configuration from command line arguments (without the program name) and the
    /// environment.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let program = std::iter::once(std::ffi::OsString::from("course_index"));
        Self::try_parse_from(program.chain(args.into_iter().map(Into::into)))
    }

    /// The file to read queries from, or `None` for standard input.
    pub fn input_file(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| *path != Path::new("-"))
    }
}
