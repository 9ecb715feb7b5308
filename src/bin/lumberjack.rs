use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use lumberjack::config::{DEFAULT_LOG_FILENAME, DEFAULT_MAX_FILES, DEFAULT_MAX_LINES};
use lumberjack::core::Stamps;
use lumberjack::{Config, InputSource};

#[derive(Parser, Debug)]
#[command(
    name = "lumberjack",
    version,
    about = "Chop log into smaller logs.",
    override_usage = "<some_binary> 2>&1 | lumberjack [OPTION]...\n       lumberjack [OPTION]..."
)]
struct Args {
    /// Append existing log output
    #[arg(short = 'a', long)]
    append: bool,

    /// Add local datetime stamp at the start of each line
    #[arg(short = 'd', long)]
    datetime: bool,

    /// Filename to use
    #[arg(short = 'f', long = "file", value_name = "FILENAME", default_value = DEFAULT_LOG_FILENAME)]
    file: PathBuf,

    /// Read input from provided filename instead of stdin
    #[arg(short = 'i', long = "input", value_name = "FILENAME")]
    input: Option<PathBuf>,

    /// Maximum number of lines per file
    #[arg(
        short = 'l',
        long = "lines",
        value_name = "LINES",
        default_value_t = DEFAULT_MAX_LINES,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    lines: u64,

    /// Maximum number of files to maintain
    #[arg(
        short = 'n',
        long = "files",
        value_name = "FILES",
        default_value_t = DEFAULT_MAX_FILES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    files: u32,

    /// Add epoch timestamp at the start of each line
    #[arg(short = 't', long)]
    epoch: bool,

    /// Report rotations on stderr (-vv for every rotation step)
    #[arg(short = 'v', long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report fatal errors on stderr
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            log_path: self.file,
            input: InputSource::from_path(self.input),
            max_lines: self.lines,
            max_files: self.files,
            append: self.append,
            stamps: Stamps {
                datetime: self.datetime,
                epoch: self.epoch,
            },
        }
    }
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args);
    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.into_config();
    lumberjack::run(&config)
        .with_context(|| format!("logging to {}", config.log_path.display()))?;
    Ok(())
}
