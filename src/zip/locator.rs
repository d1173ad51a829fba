//! Locating the end-of-central-directory trailer.
//!
//! The trailer carries a variable-length comment, so its start position is
//! not computable forward; the standard technique is to scan backward from
//! the end of the archive for the 4-byte signature. The first match found
//! scanning backward wins. A comment that happens to contain the signature
//! bytes could forge an earlier match, but such archives are out of scope
//! here, matching the behavior of every mainstream unzip tool.

use crate::zip::structures::EndOfCentralDirectory;
use crate::{RepackError, Result};

/// The located trailer plus where it sits in the source archive.
#[derive(Debug)]
pub struct Trailer {
    pub eocd: EndOfCentralDirectory,
    /// Byte position of the trailer record in the archive. The output
    /// trailer is the verbatim source tail from here (comment included)
    /// with only the directory offset patched.
    pub offset: usize,
}

/// Scan backward from `len - 22` for the trailer and decode it.
///
/// Also validates that the central directory range the trailer declares
/// lies within the mapped archive, so downstream walkers never index out
/// of range.
pub fn find_trailer(archive: &[u8]) -> Result<Trailer> {
    if archive.len() < EndOfCentralDirectory::SIZE {
        return Err(RepackError::TrailerNotFound);
    }

    let mut pos = archive.len() - EndOfCentralDirectory::SIZE;
    loop {
        if &archive[pos..pos + 4] == EndOfCentralDirectory::SIGNATURE {
            let eocd = EndOfCentralDirectory::from_bytes(&archive[pos..])?;

            let cd_start = eocd.cd_offset as usize;
            let cd_end = cd_start + eocd.cd_size as usize;
            if cd_end > archive.len() {
                return Err(RepackError::Format(format!(
                    "central directory ({cd_start}..{cd_end}) overruns the archive"
                )));
            }

            log::debug!(
                "found trailer at {}: {} entries, directory at {} ({} bytes)",
                pos,
                eocd.total_entries,
                eocd.cd_offset,
                eocd.cd_size
            );
            return Ok(Trailer { eocd, offset: pos });
        }

        if pos == 0 {
            return Err(RepackError::TrailerNotFound);
        }
        pos -= 1;
    }
}
