//! Wrapper around the Ookla `speedtest` CLI
//!
//! The CLI is run with `--format json --progress` and prints one JSON event per
//! line. Events are validated as they arrive and folded into a
//! [`SpeedtestResult`] that callers can display while the test is running.

pub mod event;
pub mod format;
pub mod result;
pub mod runner;

use thiserror::Error;

pub use event::{parse_line, SpeedtestEvent};
pub use format::{percentage_to_string, ping_to_string, speed_to_string};
pub use result::{ResultProgress, SpeedtestResult, Update};
pub use runner::SpeedtestCli;

#[derive(Debug, Error)]
pub enum SpeedtestError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read speedtest output: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected speedtest output: {message} (line: {line})")]
    SchemaMismatch { line: String, message: String },
    #[error("speedtest exited with {status}: {stderr}")]
    Exit {
        status: std::process::ExitStatus,
        /// Tail of the CLI's stderr, empty when it printed nothing
        stderr: String,
    },
    #[error("speedtest finished without a result")]
    Incomplete,
}
