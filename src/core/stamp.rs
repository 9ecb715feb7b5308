//! Line prefixes.
//!
//! ```text
//! [2026-01-24 09:15:02.123456]: [81234.000042]: original line
//!  └─ datetime (local wall)      └─ epoch (monotonic)
//! ```

use std::io::{self, Write};
use std::time::Duration;

use time::OffsetDateTime;

use crate::core::clock::Clock;

/// Which prefixes are written at the start of every line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stamps {
    pub datetime: bool,
    pub epoch: bool,
}

impl Stamps {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.datetime && !self.epoch
    }

    /// Write the enabled prefixes, datetime first, reading `clock` once per
    /// prefix.
    pub fn write<W: Write + ?Sized, C: Clock + ?Sized>(
        &self,
        out: &mut W,
        clock: &C,
    ) -> io::Result<()> {
        if self.datetime {
            write_datetime(out, clock.wall())?;
        }
        if self.epoch {
            write_epoch(out, clock.monotonic())?;
        }
        Ok(())
    }
}

/// `[YYYY-MM-DD HH:MM:SS.ffffff]: `
pub fn write_datetime<W: Write + ?Sized>(out: &mut W, dt: OffsetDateTime) -> io::Result<()> {
    write!(
        out,
        "[{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}]: ",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.microsecond()
    )
}

/// `[seconds.ffffff]: `
pub fn write_epoch<W: Write + ?Sized>(out: &mut W, elapsed: Duration) -> io::Result<()> {
    write!(
        out,
        "[{}.{:06}]: ",
        elapsed.as_secs(),
        elapsed.subsec_micros()
    )
}
