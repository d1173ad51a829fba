//! ZIP archive repacking.
//!
//! This module rewrites the compression method of every entry in a ZIP
//! archive while keeping the archive valid.
//!
//! ## Architecture
//!
//! The module is organized leaf-first:
//!
//! - [`structures`]: typed, bounds-checked views over the fixed-layout
//!   archive records (local header, central directory entry, trailer)
//! - [`locator`]: finds the end-of-central-directory trailer by backward
//!   scan and decodes the directory's location from it
//! - [`walker`]: enumerates the central directory and resolves each entry's
//!   local header offset
//! - [`transcoder`]: rewrites a single entry's payload in the selected
//!   direction
//! - [`rebuilder`]: streams the rewritten archive (prefix, entries,
//!   patched directory, patched trailer) while tracking the running offset
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Repacking changes entry payload lengths, so every offset and size field
//! that cross-references another record (directory entry → local header,
//! trailer → directory) is recomputed to describe what was actually
//! written.
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No ZIP64 extensions (everything must stay below 4 GiB)

pub mod locator;
pub mod rebuilder;
pub mod structures;
pub mod transcoder;
pub mod walker;

pub use locator::{Trailer, find_trailer};
pub use rebuilder::{RepackSummary, repack};
pub use structures::*;
pub use transcoder::{TranscodedEntry, to_deflate, to_stored};
pub use walker::{Directory, EntrySlot, walk};

/// Which way a repack run transcodes entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Decompress every entry to stored form ("inflate").
    ToStored,
    /// DEFLATE-compress every currently-stored entry ("deflate").
    ToCompressed,
}
