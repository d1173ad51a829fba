//! Walking the central directory.
//!
//! The directory is a contiguous run of variable-size entries; each entry
//! names the offset of its local header. The walk validates every entry
//! signature up front: once a record is misaligned, the offsets of all
//! subsequent entries are garbage, so a single mismatch aborts the whole
//! operation rather than attempting recovery.

use std::ops::Range;

use crate::zip::locator::Trailer;
use crate::zip::structures::CdirEntry;
use crate::{RepackError, Result};

/// One directory entry's position, as seen by the rebuilder.
#[derive(Debug)]
pub struct EntrySlot {
    /// Byte range of this entry's record, relative to the start of the
    /// central directory. Record sizes never change during a repack, so the
    /// same range indexes both the source directory and the mutable copy.
    pub range: Range<usize>,
    /// Offset of the entry's local header from the start of the archive.
    pub local_offset: usize,
}

/// The walked central directory.
#[derive(Debug)]
pub struct Directory {
    pub slots: Vec<EntrySlot>,
    /// Minimum local header offset across all entries, or the archive
    /// length when the directory is empty. Everything before this point
    /// (e.g. a self-extractor stub) is copied into the output verbatim.
    pub lowest_local_offset: usize,
}

/// Enumerate the directory entries the trailer declares.
pub fn walk(archive: &[u8], trailer: &Trailer) -> Result<Directory> {
    let cd_start = trailer.eocd.cd_offset as usize;
    let cd_end = cd_start + trailer.eocd.cd_size as usize;
    let count = trailer.eocd.total_entries as usize;

    let mut slots = Vec::with_capacity(count);
    let mut lowest_local_offset = archive.len();
    let mut pos = cd_start;

    for index in 0..count {
        let entry = CdirEntry::parse(archive, pos)?;
        let size = entry.record_size();
        if pos + size > cd_end {
            return Err(RepackError::Format(format!(
                "directory entry {index} overruns the declared directory size"
            )));
        }

        let local_offset = entry.local_header_offset() as usize;
        lowest_local_offset = lowest_local_offset.min(local_offset);

        slots.push(EntrySlot {
            range: pos - cd_start..pos - cd_start + size,
            local_offset,
        });
        pos += size;
    }

    Ok(Directory {
        slots,
        lowest_local_offset,
    })
}
