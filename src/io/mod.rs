//! File access capabilities for the repack run.
//!
//! The source archive is opened once and memory-mapped read-only for the
//! duration of the run; nothing ever writes through the mapping. The output
//! is a plain truncate-on-create file wrapped so that short or interrupted
//! writes are retried until the full byte count is flushed.

use std::fs::File;
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::Result;

/// Read-only memory mapping of the source archive.
pub struct SourceMap {
    mmap: Mmap,
}

impl SourceMap {
    /// Open and map a file read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and the file is never written
        // through it for the lifetime of the run.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// The mapped archive contents.
    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// Append-oriented output file.
///
/// Created with truncation, so a failed run can leave a partial file at the
/// output path. Callers that need atomicity should write to a temporary path
/// and rename on success.
pub struct OutputSink {
    file: File,
}

impl OutputSink {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Write the whole buffer, retrying short and interrupted writes.
    ///
    /// Returns the number of bytes written, which on success always equals
    /// `buf.len()`.
    pub fn write_fully(&mut self, buf: &[u8]) -> Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.file.write(&buf[written..]) {
                Ok(0) => {
                    return Err(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "output sink accepted no bytes",
                    )
                    .into());
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(written)
    }

    /// Reposition the write cursor to an absolute offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Reposition the write cursor to the end of the file, returning the
    /// file length.
    pub fn seek_end(&mut self) -> Result<u64> {
        Ok(self.file.seek(SeekFrom::End(0))?)
    }
}
