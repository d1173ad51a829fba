//! Per-entry payload transcoding.
//!
//! Each entry is an independent raw DEFLATE stream (no zlib header, no
//! dictionary, nothing shared across entries). Decompression is driven into
//! a buffer sized exactly to the header's declared uncompressed size, and
//! producing exactly that many bytes is the authoritative success signal;
//! some decompressor status codes are ambiguous at the final block.
//! Compression is capped at the uncompressed size: if the stream does not
//! finish within that bound the entry cannot shrink, and it falls back to
//! stored form instead of aborting the archive.

use std::borrow::Cow;

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::zip::structures::{CompressionMethod, LocalFileHeader};
use crate::{RepackError, Result};

/// A rewritten entry payload: the new method and the bytes to emit.
///
/// Borrows the source payload when it passes through unchanged, owns the
/// buffer when it was actually transcoded.
#[derive(Debug)]
pub struct TranscodedEntry<'a> {
    pub method: CompressionMethod,
    pub payload: Cow<'a, [u8]>,
}

impl TranscodedEntry<'_> {
    pub fn compressed_size(&self) -> usize {
        self.payload.len()
    }
}

/// Decompress an entry to stored form. Stored entries pass through.
pub fn to_stored<'a>(header: &LocalFileHeader<'a>) -> Result<TranscodedEntry<'a>> {
    let uncompressed_size = header.uncompressed_size() as usize;

    if header.compression() == CompressionMethod::Stored {
        return Ok(TranscodedEntry {
            method: CompressionMethod::Stored,
            payload: Cow::Borrowed(header.payload(uncompressed_size)?),
        });
    }

    let compressed = header.payload(header.compressed_size() as usize)?;
    let mut out = vec![0u8; uncompressed_size];
    let mut inflater = Decompress::new(false);

    // Size is the authoritative success signal: the status code is
    // ambiguous at the final block, in both directions. A stream that
    // filled the buffer exactly is complete even without StreamEnd, and a
    // StreamEnd that produced the wrong byte count is still a bad entry.
    let _ = inflater.decompress(compressed, &mut out, FlushDecompress::Finish);
    let produced = inflater.total_out();

    if produced != uncompressed_size as u64 {
        return Err(RepackError::Inflate {
            produced,
            expected: uncompressed_size as u64,
        });
    }

    Ok(TranscodedEntry {
        method: CompressionMethod::Stored,
        payload: Cow::Owned(out),
    })
}

/// Compress a stored entry with DEFLATE.
///
/// The entry must currently be stored; anything else is a caller invariant
/// violation, since this direction only ever runs on freshly-read originals.
pub fn to_deflate<'a>(header: &LocalFileHeader<'a>) -> Result<TranscodedEntry<'a>> {
    let method = header.compression();
    if method != CompressionMethod::Stored {
        return Err(RepackError::UnexpectedCompression(method.as_u16()));
    }

    let uncompressed_size = header.uncompressed_size() as usize;
    let input = header.payload(uncompressed_size)?;

    let mut out = vec![0u8; uncompressed_size];
    let mut deflater = Compress::new(Compression::best(), false);
    let finished = matches!(
        deflater.compress(input, &mut out, FlushCompress::Finish),
        Ok(Status::StreamEnd)
    );

    if !finished {
        // Entry does not shrink under DEFLATE; stored is always valid.
        log::warn!(
            "entry '{}' ({} bytes) does not compress, storing it as-is",
            header.file_name(),
            uncompressed_size
        );
        return Ok(TranscodedEntry {
            method: CompressionMethod::Stored,
            payload: Cow::Borrowed(input),
        });
    }

    out.truncate(deflater.total_out() as usize);
    Ok(TranscodedEntry {
        method: CompressionMethod::Deflate,
        payload: Cow::Owned(out),
    })
}
