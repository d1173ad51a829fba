use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::zip::Direction;

/// Repack mode, matching the classic tool's verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Decompress every entry to stored (uncompressed) form
    Inflate,
    /// Compress every stored entry with DEFLATE
    Deflate,
}

#[derive(Parser, Debug)]
#[command(name = "rezip")]
#[command(version)]
#[command(about = "Repack ZIP archives between stored and DEFLATE compression", long_about = None)]
#[command(after_help = "Examples:\n  \
  rezip inflate app.zip app-stored.zip    decompress every entry to stored form\n  \
  rezip deflate app-stored.zip app.zip    compress every stored entry\n  \
  rezip -q inflate in.zip out.zip         same, without the summary line")]
pub struct Cli {
    /// Repack direction
    #[arg(value_enum)]
    pub mode: Mode,

    /// Source ZIP archive
    #[arg(value_name = "ZIPFILE")]
    pub input: PathBuf,

    /// Destination archive (created or truncated)
    #[arg(value_name = "OUTFILE")]
    pub output: PathBuf,

    /// Quiet mode (suppress the banner and summary)
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn direction(&self) -> Direction {
        match self.mode {
            Mode::Inflate => Direction::ToStored,
            Mode::Deflate => Direction::ToCompressed,
        }
    }
}
