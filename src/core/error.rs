use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of the rotation engine.
///
/// Everything here aborts the run. Non-fatal conditions (close or flush
/// failures) are reported through the `log` facade and never surface as an
/// `Error`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("filename too long: {len} bytes (limit {max})")]
    FilenameTooLong { len: usize, max: usize },
    #[error("failed to open input file for reading: {}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open log file: {}", path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rotation failed: {op}")]
    RotationFailed {
        op: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to recover existing log")]
    RecoveryFailed(#[source] io::Error),
    #[error("failed to write {what}")]
    WriteFailed {
        what: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to read input")]
    ReadFailed(#[source] io::Error),
}

impl Error {
    pub(crate) fn rotation(op: impl Into<String>, source: io::Error) -> Self {
        Error::RotationFailed {
            op: op.into(),
            source,
        }
    }

    pub(crate) fn write(what: &'static str, source: io::Error) -> Self {
        Error::WriteFailed { what, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
