use std::io::{self, Read, Write};

use crate::core::{Error, Result};

const SCAN_CHUNK: usize = 64 * 1024;

/// What append recovery found in an existing live file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recovery {
    /// Newline-terminated lines in the file, the repaired line included.
    pub line_count: u64,
    /// Whether the file already ended at a line boundary (empty files do).
    pub trailing_newline: bool,
}

impl Recovery {
    /// True when recovery had to append a newline to close a partial line.
    pub fn repaired(&self) -> bool {
        !self.trailing_newline
    }
}

/// Scan an existing live file opened for read + append.
///
/// Every newline byte counts as a line. If the file ends in the middle of a
/// line, a single newline is appended and flushed so that new output starts on
/// a fresh line; that line is counted too. On return the handle's write
/// position is at end of file.
///
/// # Errors
///
/// - `Error::RecoveryFailed`: reading the file, or writing or flushing the
///   closing newline, failed
pub fn recover<F: Read + Write>(file: &mut F) -> Result<Recovery> {
    let mut buf = vec![0u8; SCAN_CHUNK];
    let mut line_count = 0u64;
    let mut at_line_start = true;

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::RecoveryFailed(err)),
        };
        let chunk = &buf[..n];
        line_count += chunk.iter().filter(|&&b| b == b'\n').count() as u64;
        at_line_start = chunk[n - 1] == b'\n';
    }

    if !at_line_start {
        file.write_all(b"\n").map_err(Error::RecoveryFailed)?;
        file.flush().map_err(Error::RecoveryFailed)?;
        line_count += 1;
        log::info!("closed partial trailing line of existing log");
    }

    Ok(Recovery {
        line_count,
        trailing_newline: at_line_start,
    })
}
