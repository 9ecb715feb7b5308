//! Line-aware copy from the input stream into a rotating log.
//!
//! # Per-line protocol
//!
//! ```text
//! at line start, with a byte to write:
//!   1. rotate if the live file already holds max_lines lines
//!   2. write the datetime stamp, then the epoch stamp (if enabled)
//! then copy bytes up to and including the next newline, and on newline:
//!   3. count the line and flush the live file
//! ```
//!
//! Rotation and stamps only ever happen at line starts, so a rotation never
//! separates a stamp from its line and a long line is never split across
//! files. Nothing happens at a line start until a byte for that line
//! arrives: input ending right after a newline never triggers a rotation.

use std::io::{self, BufRead, Write};

use crate::core::clock::Clock;
use crate::core::fs::FileSystem;
use crate::core::stamp::Stamps;
use crate::core::writer::RotatingWriter;
use crate::core::{Error, Result};

/// Counters for one transcoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Input bytes copied to the log family (stamps excluded).
    pub bytes_in: u64,
    /// Newlines copied.
    pub lines: u64,
    /// Threshold rotations performed.
    pub rotations: u64,
}

pub struct Transcoder<F: FileSystem, C: Clock> {
    writer: RotatingWriter<F>,
    clock: C,
    stamps: Stamps,
    at_line_start: bool,
    bytes_in: u64,
    lines: u64,
}

impl<F: FileSystem, C: Clock> Transcoder<F, C> {
    /// Wrap a writer positioned at a line start (a fresh file, or one that
    /// append recovery left ending in a newline).
    pub fn new(writer: RotatingWriter<F>, stamps: Stamps, clock: C) -> Self {
        Self {
            writer,
            clock,
            stamps,
            at_line_start: true,
            bytes_in: 0,
            lines: 0,
        }
    }

    pub fn writer(&self) -> &RotatingWriter<F> {
        &self.writer
    }

    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            bytes_in: self.bytes_in,
            lines: self.lines,
            rotations: self.writer.rotations(),
        }
    }

    /// Copy `input` until end of stream.
    ///
    /// # Errors
    ///
    /// - `Error::ReadFailed`: reading the input failed
    /// - `Error::RotationFailed`: a threshold rotation failed
    /// - `Error::WriteFailed`: writing a stamp or input bytes failed
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        loop {
            let consumed = {
                let chunk = match input.fill_buf() {
                    Ok(chunk) => chunk,
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => return Err(Error::ReadFailed(err)),
                };
                if chunk.is_empty() {
                    break;
                }
                self.write_chunk(chunk)?;
                chunk.len()
            };
            input.consume(consumed);
        }
        Ok(())
    }

    /// Copy one chunk of input. Chunks may split lines anywhere.
    pub fn write_chunk(&mut self, mut chunk: &[u8]) -> Result<()> {
        while !chunk.is_empty() {
            if self.at_line_start {
                self.begin_line()?;
            }

            let (segment, ends_line) = match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => (&chunk[..=pos], true),
                None => (chunk, false),
            };
            self.writer
                .write_all(segment)
                .map_err(|err| Error::write("log output", err))?;
            self.bytes_in += segment.len() as u64;
            chunk = &chunk[segment.len()..];

            self.at_line_start = ends_line;
            if ends_line {
                self.lines += 1;
                self.writer.end_line();
            }
        }
        Ok(())
    }

    fn begin_line(&mut self) -> Result<()> {
        if self.writer.needs_rotation() {
            log::debug!(
                "line budget of {} reached, rotating",
                self.writer.max_lines()
            );
            self.writer.rotate()?;
        }
        if !self.stamps.is_empty() {
            self.stamps
                .write(&mut self.writer, &self.clock)
                .map_err(|err| Error::write("line stamp", err))?;
        }
        Ok(())
    }

    /// Flush and close the live file, returning the run counters.
    pub fn finish(self) -> RunStats {
        let stats = self.stats();
        self.writer.finish();
        stats
    }
}
