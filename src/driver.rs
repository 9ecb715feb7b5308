//! Top-level run: open the input, prepare the live file, stream until the
//! input ends.
//!
//! Every handle is owned by a value on this stack frame, so early returns
//! close them on the way out.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::config::{Config, InputSource};
use crate::core::{
    Clock, Error, FileSystem, OsFs, Result, RotatingWriter, RunStats, SystemClock, Transcoder,
};

/// Run `config` against the host filesystem and clocks.
pub fn run(config: &Config) -> Result<RunStats> {
    config.validate()?;
    let input = open_input(&config.input)?;
    run_with(config, input, OsFs, SystemClock::new())
}

/// Run `config` reading from `input`, with an explicit filesystem and clock.
///
/// A non-append run starts by rotating the family, so the live file is empty
/// before the first byte arrives. An append run recovers the live file's
/// line count and continues it.
pub fn run_with<R, F, C>(config: &Config, input: R, fs: F, clock: C) -> Result<RunStats>
where
    R: BufRead,
    F: FileSystem,
    C: Clock,
{
    let family = config.validate()?;
    let writer = if config.append {
        let (writer, recovery) = RotatingWriter::resume(fs, family, config.max_lines)?;
        if recovery.repaired() {
            log::warn!(
                "{} ended mid-line, appended a newline",
                writer.family().base().display()
            );
        }
        writer
    } else {
        RotatingWriter::create(fs, family, config.max_lines)?
    };

    let mut transcoder = Transcoder::new(writer, config.stamps, clock);
    transcoder.run(input)?;
    let stats = transcoder.finish();
    log::info!(
        "input exhausted: {} bytes, {} lines, {} rotations",
        stats.bytes_in,
        stats.lines,
        stats.rotations
    );
    Ok(stats)
}

fn open_input(source: &InputSource) -> Result<Box<dyn BufRead>> {
    match source {
        InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
        InputSource::File(path) => {
            let file = File::open(path).map_err(|source| Error::OpenInput {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}
