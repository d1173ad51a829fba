//! Main entry point for the rezip CLI application.
//!
//! This binary repacks a ZIP archive, decompressing every entry to stored
//! form (`inflate`) or compressing every stored entry (`deflate`), and
//! reports a short summary of what was rewritten.

use anyhow::{Context, Result};
use clap::Parser;

use rezip::cli::Mode;
use rezip::{Cli, repack};

/// Application entry point.
///
/// Parses command-line arguments, runs the repack, and propagates any
/// failure as a non-zero exit status. A failed run can leave a partial file
/// at the output path; nothing is cleaned up automatically.
fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        match cli.mode {
            Mode::Inflate => println!("inflate mode"),
            Mode::Deflate => println!("deflate mode"),
        }
    }

    let summary = repack(cli.direction(), &cli.input, &cli.output)
        .with_context(|| format!("repacking {}", cli.input.display()))?;

    if !cli.quiet {
        println!(
            "{} entries repacked: {} in, {} out",
            summary.entries,
            format_size(summary.input_bytes),
            format_size(summary.output_bytes)
        );
    }

    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
