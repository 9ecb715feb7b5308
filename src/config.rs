use std::path::PathBuf;

use crate::core::{Error, LogFamily, Result, Stamps};

/// Live file used when no filename is given.
pub const DEFAULT_LOG_FILENAME: &str = "log.log";
/// Default line budget of a live file.
pub const DEFAULT_MAX_LINES: u64 = 10_000;
/// Default family size (live file + backups).
pub const DEFAULT_MAX_FILES: u32 = 10;

/// Where the bytes to log come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSource {
    #[default]
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Map an optional input path: absent or empty means standard input.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if !path.as_os_str().is_empty() => InputSource::File(path),
            _ => InputSource::Stdin,
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the live file; backups are `log_path.N`.
    pub log_path: PathBuf,
    pub input: InputSource,
    /// Lines per file before rotating.
    pub max_lines: u64,
    /// Files kept in total, live file included.
    pub max_files: u32,
    /// Continue the existing live file instead of rotating it away on start.
    pub append: bool,
    pub stamps: Stamps,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_FILENAME),
            input: InputSource::Stdin,
            max_lines: DEFAULT_MAX_LINES,
            max_files: DEFAULT_MAX_FILES,
            append: false,
            stamps: Stamps::none(),
        }
    }
}

impl Config {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    /// Check the configuration and describe the log family it targets.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidConfig`: empty filename, zero lines or zero files
    /// - `Error::FilenameTooLong`: the oldest backup path exceeds the limit
    pub fn validate(&self) -> Result<LogFamily> {
        if self.max_lines == 0 {
            return Err(Error::InvalidConfig("maximum number of lines must be positive"));
        }
        LogFamily::new(self.log_path.clone(), self.max_files)
    }
}
