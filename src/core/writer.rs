//! The live side of a log family.
//!
//! [`RotatingWriter`] owns the open live file together with the line budget
//! that decides when it is rotated away. It does not look at the bytes it is
//! given; line boundaries are reported by the caller through `end_line`.

use std::io::{self, BufWriter, Write};

use crate::core::family::LogFamily;
use crate::core::fs::FileSystem;
use crate::core::recovery::{recover, Recovery};
use crate::core::rotation;
use crate::core::{Error, Result};

/// Live log file plus its rotation state.
pub struct RotatingWriter<F: FileSystem> {
    fs: F,
    family: LogFamily,
    max_lines: u64,
    /// Lines completed in the live file since it was opened or rotated.
    line_count: u64,
    out: Option<BufWriter<F::File>>,
    rotations: u64,
}

impl<F: FileSystem> RotatingWriter<F> {
    /// Start a fresh live file by rotating whatever is on disk.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidConfig`: `max_lines` is zero
    /// - `Error::RotationFailed`: the initial rotation failed
    pub fn create(fs: F, family: LogFamily, max_lines: u64) -> Result<Self> {
        let mut writer = Self::unopened(fs, family, max_lines)?;
        writer.rotate()?;
        writer.rotations = 0;
        Ok(writer)
    }

    /// Continue the existing live file, recovering its line count.
    ///
    /// The live file is created if missing.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidConfig`: `max_lines` is zero
    /// - `Error::OpenOutput`: the live file cannot be opened for append
    /// - `Error::RecoveryFailed`: scanning or repairing the live file failed
    pub fn resume(fs: F, family: LogFamily, max_lines: u64) -> Result<(Self, Recovery)> {
        let mut writer = Self::unopened(fs, family, max_lines)?;
        let base = writer.family.base().to_path_buf();
        let mut file = writer
            .fs
            .open_append(&base)
            .map_err(|source| Error::OpenOutput { path: base, source })?;
        let recovery = recover(&mut file)?;
        log::info!(
            "resuming {} at {} lines",
            writer.family.base().display(),
            recovery.line_count
        );
        writer.line_count = recovery.line_count;
        writer.out = Some(BufWriter::new(file));
        Ok((writer, recovery))
    }

    fn unopened(fs: F, family: LogFamily, max_lines: u64) -> Result<Self> {
        if max_lines == 0 {
            return Err(Error::InvalidConfig("maximum number of lines must be positive"));
        }
        Ok(Self {
            fs,
            family,
            max_lines,
            line_count: 0,
            out: None,
            rotations: 0,
        })
    }

    pub fn family(&self) -> &LogFamily {
        &self.family
    }

    pub fn max_lines(&self) -> u64 {
        self.max_lines
    }

    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    /// Threshold rotations performed so far (the initial rotation of
    /// `create` is not counted).
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// True once the live file holds its full line budget.
    pub fn needs_rotation(&self) -> bool {
        self.line_count >= self.max_lines
    }

    /// Close the live file, shift the family and open a fresh live file.
    pub fn rotate(&mut self) -> Result<()> {
        self.close("rotating");
        let file = rotation::rotate(&self.fs, &self.family)?;
        self.out = Some(BufWriter::new(file));
        self.line_count = 0;
        self.rotations += 1;
        Ok(())
    }

    /// Record a completed line and push it to the underlying file.
    ///
    /// A failed flush is only a warning: the bytes stay buffered and go out
    /// with a later flush.
    pub fn end_line(&mut self) {
        self.line_count += 1;
        if let Some(out) = self.out.as_mut() {
            if let Err(err) = out.flush() {
                log::warn!("failed to flush output after newline: {err}");
            }
        }
    }

    /// Flush and close the live file.
    pub fn finish(mut self) {
        self.close("exiting");
    }

    fn close(&mut self, context: &str) {
        if let Some(mut out) = self.out.take() {
            if let Err(err) = out.flush() {
                log::warn!("failed to close log file while {context}: {err}");
            }
        }
    }

    fn active(&mut self) -> io::Result<&mut BufWriter<F::File>> {
        self.out
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no live log file open"))
    }
}

impl<F: FileSystem> Write for RotatingWriter<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.active()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.active()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.active()?.flush()
    }
}
