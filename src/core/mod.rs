//! Rotation engine: log family naming, rename-chain rotation, append
//! recovery and the line-aware stream transcoder.

pub mod clock;
pub mod error;
pub mod family;
pub mod fs;
pub mod recovery;
pub mod rotation;
pub mod stamp;
pub mod transcoder;
pub mod writer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use family::{LogFamily, MAX_FILENAME_LENGTH};
pub use fs::{FileSystem, MemoryFs, OsFs};
pub use recovery::Recovery;
pub use rotation::RotationOp;
pub use stamp::Stamps;
pub use transcoder::{RunStats, Transcoder};
pub use writer::RotatingWriter;
