//! # rezip
//!
//! Repack ZIP archives between stored and DEFLATE compression.
//!
//! This library rewrites a ZIP archive, changing the compression method of
//! every contained entry while keeping the archive valid. Two directions are
//! supported: decompressing every entry to stored form ("inflate"), and
//! compressing every currently-stored entry with DEFLATE ("deflate").
//! Everything else (filenames, extra fields, comments, timestamps, CRC-32
//! values, attributes) is copied through verbatim.
//!
//! The source archive is memory-mapped read-only and never mutated. The
//! rewritten archive is streamed to the output path entry by entry, with the
//! central directory patched to match the new offsets and sizes.
//!
//! ## Example
//!
//! ```no_run
//! use rezip::{repack, Direction};
//!
//! fn main() -> rezip::Result<()> {
//!     let summary = repack(
//!         Direction::ToStored,
//!         "app.zip".as_ref(),
//!         "app-stored.zip".as_ref(),
//!     )?;
//!     println!("{} entries repacked", summary.entries);
//!     Ok(())
//! }
//! ```
//!
//! ## Limitations
//!
//! - No ZIP64 support (archives and offsets must stay below 4 GiB)
//! - No multi-disk archive support
//! - No encrypted entries

use thiserror::Error;

pub mod cli;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use io::{OutputSink, SourceMap};
pub use zip::{CompressionMethod, Direction, RepackSummary, repack};

/// Errors produced while repacking an archive.
///
/// Everything here is fatal for the run. The one recoverable condition, a
/// compressor unable to shrink an entry, is not an error at all: that
/// entry falls back to stored form and the repack continues.
#[derive(Debug, Error)]
pub enum RepackError {
    /// Source unreadable/unmappable, output uncreatable, or a write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No end-of-central-directory signature before the start of the file.
    #[error("end of central directory record not found")]
    TrailerNotFound,

    /// Malformed or inconsistent binary structure. Offsets downstream of a
    /// suspect directory are unverifiable, so the whole repack aborts.
    #[error("malformed archive: {0}")]
    Format(String),

    /// Decompression did not produce the declared uncompressed size.
    #[error("inflated {produced} bytes, expected {expected}")]
    Inflate { produced: u64, expected: u64 },

    /// An entry that was expected to be stored carries another method.
    /// Signals caller misuse rather than a data problem.
    #[error("unexpected compression method {0} on entry expected to be stored")]
    UnexpectedCompression(u16),
}

pub type Result<T> = std::result::Result<T, RepackError>;
