//! Rewriting the archive.
//!
//! One pass over the entries in directory order, tracking the running
//! output offset. The source mapping is never touched; all patching happens
//! on private byte copies (one per local header, plus a single mutable copy
//! of the whole central directory that is written out once at the end).

use std::path::Path;

use crate::io::{OutputSink, SourceMap};
use crate::zip::locator::find_trailer;
use crate::zip::structures::{
    LocalFileHeader, patch_cdir_entry, patch_trailer_offset, patched_local_header,
};
use crate::zip::transcoder::{to_deflate, to_stored};
use crate::zip::walker::walk;
use crate::zip::Direction;
use crate::{RepackError, Result};

/// What a completed repack run did.
#[derive(Debug)]
pub struct RepackSummary {
    /// Number of entries rewritten (always equals the source entry count).
    pub entries: usize,
    /// Size of the source archive in bytes.
    pub input_bytes: u64,
    /// Size of the rewritten archive in bytes.
    pub output_bytes: u64,
}

fn as_u32_offset(offset: u64) -> Result<u32> {
    u32::try_from(offset)
        .map_err(|_| RepackError::Format("output offset exceeds 4 GiB and needs ZIP64".into()))
}

/// Repack `input` into `output`, transcoding every entry per `direction`.
///
/// The output file is created with truncation and written sequentially; on
/// error a partial file is left behind at `output`.
pub fn repack(direction: Direction, input: &Path, output: &Path) -> Result<RepackSummary> {
    let source = SourceMap::open(input)?;
    let archive = source.bytes();
    let mut sink = OutputSink::create(output)?;

    let trailer = find_trailer(archive)?;
    let cd_start = trailer.eocd.cd_offset as usize;
    let cd_size = trailer.eocd.cd_size as usize;
    let directory = walk(archive, &trailer)?;

    // The one mutable central directory copy, patched entry by entry below
    // and written out in a single piece at the end.
    let mut cdir = archive[cd_start..cd_start + cd_size].to_vec();

    // Anything before the first entry (e.g. a self-extractor stub) is
    // copied into the output verbatim.
    let mut out_offset = sink.write_fully(&archive[..directory.lowest_local_offset])? as u64;

    for slot in &directory.slots {
        let header = LocalFileHeader::parse(archive, slot.local_offset)?;
        let entry = match direction {
            Direction::ToStored => to_stored(&header)?,
            Direction::ToCompressed => to_deflate(&header)?,
        };

        let entry_offset = as_u32_offset(out_offset)?;
        let compressed_size = as_u32_offset(entry.compressed_size() as u64)?;

        log::debug!(
            "writing entry '{}' at {} ({} -> {} bytes)",
            header.file_name(),
            entry_offset,
            header.compressed_size(),
            compressed_size
        );

        let header_copy = patched_local_header(header.as_bytes(), entry.method, compressed_size);
        out_offset += sink.write_fully(&header_copy)? as u64;
        out_offset += sink.write_fully(&entry.payload)? as u64;

        patch_cdir_entry(
            &mut cdir[slot.range.clone()],
            entry.method,
            compressed_size,
            entry_offset,
        );
    }

    // If the original directory physically preceded the entries, the prefix
    // copy above already carried its (stale) bytes into the output; patch
    // it in place there to keep the same layout shape. Otherwise append it
    // after the last entry.
    let new_cdir_offset = if cd_start < directory.lowest_local_offset {
        log::debug!("replacing directory in place at {cd_start}");
        sink.seek_to(cd_start as u64)?;
        sink.write_fully(&cdir)?;
        out_offset = sink.seek_end()?;
        as_u32_offset(cd_start as u64)?
    } else {
        log::debug!("appending directory at {out_offset}");
        let offset = as_u32_offset(out_offset)?;
        out_offset += sink.write_fully(&cdir)? as u64;
        offset
    };

    // The trailer is the verbatim source tail (comment included) with only
    // the directory offset patched.
    let mut tail = archive[trailer.offset..].to_vec();
    patch_trailer_offset(&mut tail, new_cdir_offset);
    out_offset += sink.write_fully(&tail)? as u64;

    Ok(RepackSummary {
        entries: directory.slots.len(),
        input_bytes: source.len() as u64,
        output_bytes: out_offset,
    })
}
