//! Command line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use segfetch::{DEFAULT_SECTION_SIZE, DEFAULT_WORKERS, SplitStrategy};

/// Download files in concurrent byte-range sections.
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
pub struct Args {
    /// URLs to download.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Directory to save downloads into.
    #[arg(short = 'd', long, default_value = ".")]
    pub dir: PathBuf,

    /// Maximum number of concurrent section fetches per download.
    #[arg(
        short = 'w',
        long,
        default_value_t = DEFAULT_WORKERS as u8,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub workers: u8,

    /// How to split a resource into sections.
    #[arg(long, value_enum, default_value = "workers")]
    pub split: SplitMode,

    /// Section size in bytes when splitting by size.
    #[arg(
        short = 's',
        long,
        default_value_t = DEFAULT_SECTION_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub section_size: u64,

    /// Increase log verbosity (-v, -vv).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log errors only.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Split strategies selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// One section per worker.
    Workers,
    /// Fixed-size sections of `--section-size` bytes.
    Size,
}

impl From<SplitMode> for SplitStrategy {
    fn from(mode: SplitMode) -> Self {
        match mode {
            SplitMode::Workers => SplitStrategy::WorkerCount,
            SplitMode::Size => SplitStrategy::SectionSize,
        }
    }
}
