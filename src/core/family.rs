//! Log family naming.
//!
//! A family is the live file plus its numbered backups:
//!
//! ```text
//! {dir}/
//!   app.log        ← index 0, live
//!   app.log.1      ← newest backup
//!   app.log.2
//!   app.log.N-1    ← oldest retained backup
//! ```
//!
//! All functions here are stateless and only build or parse paths.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::core::{Error, Result};

/// Upper bound, in bytes, on the longest member path of a family.
pub const MAX_FILENAME_LENGTH: usize = 1024;

/// The on-disk family of a rotated log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFamily {
    base: PathBuf,
    max_files: u32,
}

impl LogFamily {
    /// Describe the family rooted at `base` retaining `max_files` members in
    /// total (the live file included).
    ///
    /// # Errors
    ///
    /// - `Error::InvalidConfig`: empty base, base without a file name, or zero
    ///   `max_files`
    /// - `Error::FilenameTooLong`: `base.(max_files-1)` does not fit in
    ///   `MAX_FILENAME_LENGTH`
    pub fn new(base: impl Into<PathBuf>, max_files: u32) -> Result<Self> {
        let base = base.into();
        if base.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("filename must not be empty"));
        }
        if base.file_name().is_none() {
            return Err(Error::InvalidConfig("filename must name a file"));
        }
        if max_files == 0 {
            return Err(Error::InvalidConfig("maximum number of files must be positive"));
        }
        let longest = base.as_os_str().len() + format!(".{}", max_files - 1).len();
        if longest >= MAX_FILENAME_LENGTH {
            return Err(Error::FilenameTooLong {
                len: longest,
                max: MAX_FILENAME_LENGTH,
            });
        }
        Ok(Self { base, max_files })
    }

    /// Path of the live file.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn max_files(&self) -> u32 {
        self.max_files
    }

    /// Index of the oldest member that may exist after a rotation.
    pub fn oldest_index(&self) -> u32 {
        self.max_files - 1
    }

    /// Path of member `index`: the base path for 0, `base.index` otherwise.
    pub fn member_path(&self, index: u32) -> PathBuf {
        member_path(&self.base, index)
    }

    /// Directory holding every member.
    pub fn dir(&self) -> &Path {
        match self.base.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// File name of the live file, used as the prefix of every backup name.
    pub fn file_name(&self) -> &OsStr {
        // `new` rejects bases without a file name.
        self.base.file_name().unwrap_or_default()
    }

    /// Parse a directory entry name into a member index.
    ///
    /// Returns `None` for names that do not belong to this family. Backup
    /// suffixes must be canonical decimals (`app.log.01` is not a member).
    pub fn parse_member_index(&self, name: &OsStr) -> Option<u32> {
        parse_member_index(self.file_name(), name)
    }
}

/// Path of member `index` of the family rooted at `base`.
pub fn member_path(base: &Path, index: u32) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn parse_member_index(base_name: &OsStr, name: &OsStr) -> Option<u32> {
    if name == base_name {
        return Some(0);
    }
    let base_name = base_name.to_str()?;
    let name = name.to_str()?;
    let suffix = name.strip_prefix(base_name)?.strip_prefix('.')?;
    if suffix.is_empty() || suffix.starts_with('0') || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok().filter(|index| *index > 0)
}
