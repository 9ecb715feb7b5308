use std::cell::Cell;
use std::time::Duration;

use time::{OffsetDateTime, UtcOffset};

/// A source of timestamps for line stamps.
///
/// Wall time feeds the datetime stamp and must be local time. Monotonic time
/// feeds the epoch stamp and never goes backwards.
pub trait Clock {
    /// Current wall-clock time in the local offset.
    fn wall(&self) -> OffsetDateTime;
    /// Time elapsed on the system monotonic clock.
    fn monotonic(&self) -> Duration;
}

/// A clock backed by the operating system.
///
/// Local offset lookup can fail (unknown timezone database, or a process that
/// has already spawned threads on some platforms). The offset resolved at
/// construction is used as the fallback, and UTC if even that failed.
///
/// The local offset is looked up at most once per wall-clock second.
#[derive(Debug, Clone)]
pub struct SystemClock {
    fallback_offset: UtcOffset,
    /// Unix second and the offset resolved for it.
    cached: Cell<Option<(i64, UtcOffset)>>,
}

impl Default for SystemClock {
    fn default() -> Self {
        let fallback_offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
            log::debug!("local offset unavailable, datetime stamps fall back to UTC");
            UtcOffset::UTC
        });
        Self {
            fallback_offset,
            cached: Cell::new(None),
        }
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn wall(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let second = now.unix_timestamp();
        let offset = match self.cached.get() {
            Some((cached_second, offset)) if cached_second == second => offset,
            _ => {
                let offset = UtcOffset::local_offset_at(now).unwrap_or(self.fallback_offset);
                self.cached.set(Some((second, offset)));
                offset
            }
        };
        now.to_offset(offset)
    }

    #[cfg(unix)]
    fn monotonic(&self) -> Duration {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if rc != 0 {
            return Duration::ZERO;
        }
        Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
    }

    #[cfg(not(unix))]
    fn monotonic(&self) -> Duration {
        use std::sync::OnceLock;
        use std::time::Instant;

        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed()
    }
}

/// A clock frozen at fixed readings. Useful for deterministic output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub wall: OffsetDateTime,
    pub monotonic: Duration,
}

impl FixedClock {
    pub fn new(wall: OffsetDateTime, monotonic: Duration) -> Self {
        Self { wall, monotonic }
    }
}

impl Clock for FixedClock {
    fn wall(&self) -> OffsetDateTime {
        self.wall
    }

    fn monotonic(&self) -> Duration {
        self.monotonic
    }
}
