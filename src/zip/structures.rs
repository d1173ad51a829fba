//! Typed views over the fixed-layout ZIP records.
//!
//! Every multi-byte field in a ZIP archive is little-endian. The views here
//! borrow directly from the read-only source mapping and bounds-check every
//! computed offset against the mapped length before interpreting bytes, so a
//! corrupt trailing-field length turns into a [`RepackError::Format`] instead
//! of an out-of-range read. Nothing in this module can mutate the mapping;
//! the patch helpers only operate on the rebuilder's private byte copies.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::borrow::Cow;
use std::io::Cursor;

use crate::{RepackError, Result};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

fn format_err(msg: String) -> RepackError {
    RepackError::Format(msg)
}

/// Local File Header (LFH) - fixed part is 30 bytes, followed by the
/// filename, the extra field, and then the entry payload.
#[derive(Debug)]
pub struct LocalFileHeader<'a> {
    /// The full header record: fixed part + filename + extra field.
    record: &'a [u8],
    /// Bytes following the record; the payload starts here.
    rest: &'a [u8],
}

impl<'a> LocalFileHeader<'a> {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const FIXED_SIZE: usize = 30;

    /// Parse the local header at `offset` in the mapped archive.
    ///
    /// The header's signature is not validated here: the central directory
    /// entry that referenced this offset has already been signature-checked,
    /// and a mismatch in the declared sizes is caught by the bounds checks
    /// and the transcoder's size verification.
    pub fn parse(archive: &'a [u8], offset: usize) -> Result<Self> {
        let fixed = archive
            .get(offset..offset + Self::FIXED_SIZE)
            .ok_or_else(|| {
                format_err(format!("local header at offset {offset} overruns the archive"))
            })?;

        let filename_len = LittleEndian::read_u16(&fixed[26..28]) as usize;
        let extra_len = LittleEndian::read_u16(&fixed[28..30]) as usize;
        let end = offset + Self::FIXED_SIZE + filename_len + extra_len;

        let record = archive.get(offset..end).ok_or_else(|| {
            format_err(format!(
                "local header fields at offset {offset} overrun the archive"
            ))
        })?;

        Ok(Self {
            record,
            rest: &archive[end..],
        })
    }

    pub fn compression(&self) -> CompressionMethod {
        CompressionMethod::from_u16(LittleEndian::read_u16(&self.record[8..10]))
    }

    pub fn crc32(&self) -> u32 {
        LittleEndian::read_u32(&self.record[14..18])
    }

    pub fn compressed_size(&self) -> u32 {
        LittleEndian::read_u32(&self.record[18..22])
    }

    pub fn uncompressed_size(&self) -> u32 {
        LittleEndian::read_u32(&self.record[22..26])
    }

    /// Size of the header including the trailing filename and extra field.
    pub fn record_size(&self) -> usize {
        self.record.len()
    }

    /// The raw header bytes, used to build the rewritten copy.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.record
    }

    pub fn file_name(&self) -> Cow<'a, str> {
        let filename_len = LittleEndian::read_u16(&self.record[26..28]) as usize;
        String::from_utf8_lossy(&self.record[Self::FIXED_SIZE..Self::FIXED_SIZE + filename_len])
    }

    /// The `len` payload bytes immediately following the header.
    pub fn payload(&self, len: usize) -> Result<&'a [u8]> {
        self.rest.get(..len).ok_or_else(|| {
            format_err(format!(
                "payload of {len} bytes for entry '{}' overruns the archive",
                self.file_name()
            ))
        })
    }
}

/// Central Directory File Header (CDFH) - fixed part is 46 bytes, followed
/// by the filename, the extra field, and the file comment.
#[derive(Debug)]
pub struct CdirEntry<'a> {
    record: &'a [u8],
}

impl<'a> CdirEntry<'a> {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const FIXED_SIZE: usize = 46;

    /// Parse and signature-check the directory entry at `offset`.
    pub fn parse(archive: &'a [u8], offset: usize) -> Result<Self> {
        let fixed = archive
            .get(offset..offset + Self::FIXED_SIZE)
            .ok_or_else(|| {
                format_err(format!(
                    "central directory entry at offset {offset} overruns the archive"
                ))
            })?;

        if &fixed[0..4] != Self::SIGNATURE {
            return Err(format_err(format!(
                "bad central directory entry signature at offset {offset}"
            )));
        }

        let filename_len = LittleEndian::read_u16(&fixed[28..30]) as usize;
        let extra_len = LittleEndian::read_u16(&fixed[30..32]) as usize;
        let comment_len = LittleEndian::read_u16(&fixed[32..34]) as usize;
        let end = offset + Self::FIXED_SIZE + filename_len + extra_len + comment_len;

        let record = archive.get(offset..end).ok_or_else(|| {
            format_err(format!(
                "central directory entry fields at offset {offset} overrun the archive"
            ))
        })?;

        Ok(Self { record })
    }

    pub fn compression(&self) -> CompressionMethod {
        CompressionMethod::from_u16(LittleEndian::read_u16(&self.record[10..12]))
    }

    pub fn crc32(&self) -> u32 {
        LittleEndian::read_u32(&self.record[16..20])
    }

    pub fn compressed_size(&self) -> u32 {
        LittleEndian::read_u32(&self.record[20..24])
    }

    pub fn uncompressed_size(&self) -> u32 {
        LittleEndian::read_u32(&self.record[24..28])
    }

    /// Offset of the corresponding local header from the archive start.
    pub fn local_header_offset(&self) -> u32 {
        LittleEndian::read_u32(&self.record[42..46])
    }

    /// Size of the entry including filename, extra field, and comment.
    pub fn record_size(&self) -> usize {
        self.record.len()
    }

    pub fn file_name(&self) -> Cow<'a, str> {
        let filename_len = LittleEndian::read_u16(&self.record[28..30]) as usize;
        String::from_utf8_lossy(&self.record[Self::FIXED_SIZE..Self::FIXED_SIZE + filename_len])
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(format_err(
                "invalid end of central directory record".to_string(),
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

/// Build a copy of a local header with the compression fields patched.
/// Filename and extra-field bytes come through verbatim.
pub fn patched_local_header(
    record: &[u8],
    method: CompressionMethod,
    compressed_size: u32,
) -> Vec<u8> {
    let mut copy = record.to_vec();
    LittleEndian::write_u16(&mut copy[8..10], method.as_u16());
    LittleEndian::write_u32(&mut copy[18..22], compressed_size);
    copy
}

/// Patch a directory entry copy so it matches what was actually written:
/// new method, new compressed size, and the entry's offset in the output.
pub fn patch_cdir_entry(
    entry: &mut [u8],
    method: CompressionMethod,
    compressed_size: u32,
    local_header_offset: u32,
) {
    LittleEndian::write_u16(&mut entry[10..12], method.as_u16());
    LittleEndian::write_u32(&mut entry[20..24], compressed_size);
    LittleEndian::write_u32(&mut entry[42..46], local_header_offset);
}

/// Patch the trailer copy's central directory offset field.
pub fn patch_trailer_offset(trailer: &mut [u8], cd_offset: u32) {
    LittleEndian::write_u32(&mut trailer[16..20], cd_offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    /// Hand-build a local header record followed by its payload.
    fn local_header_bytes(
        method: u16,
        crc32: u32,
        compressed_size: u32,
        uncompressed_size: u32,
        name: &[u8],
        extra: &[u8],
        payload: &[u8],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(LocalFileHeader::SIGNATURE);
        buf.write_u16::<LittleEndian>(20).unwrap(); // min version
        buf.write_u16::<LittleEndian>(0).unwrap(); // general flags
        buf.write_u16::<LittleEndian>(method).unwrap();
        buf.write_u16::<LittleEndian>(0x6000).unwrap(); // mod time
        buf.write_u16::<LittleEndian>(0x5800).unwrap(); // mod date
        buf.write_u32::<LittleEndian>(crc32).unwrap();
        buf.write_u32::<LittleEndian>(compressed_size).unwrap();
        buf.write_u32::<LittleEndian>(uncompressed_size).unwrap();
        buf.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(extra.len() as u16).unwrap();
        buf.extend_from_slice(name);
        buf.extend_from_slice(extra);
        buf.extend_from_slice(payload);
        buf
    }

    fn cdir_entry_bytes(
        method: u16,
        compressed_size: u32,
        uncompressed_size: u32,
        offset: u32,
        name: &[u8],
        comment: &[u8],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(CdirEntry::SIGNATURE);
        buf.write_u16::<LittleEndian>(20).unwrap(); // creator version
        buf.write_u16::<LittleEndian>(20).unwrap(); // min version
        buf.write_u16::<LittleEndian>(0).unwrap(); // general flags
        buf.write_u16::<LittleEndian>(method).unwrap();
        buf.write_u16::<LittleEndian>(0x6000).unwrap(); // mod time
        buf.write_u16::<LittleEndian>(0x5800).unwrap(); // mod date
        buf.write_u32::<LittleEndian>(0xDEADBEEF).unwrap(); // crc32
        buf.write_u32::<LittleEndian>(compressed_size).unwrap();
        buf.write_u32::<LittleEndian>(uncompressed_size).unwrap();
        buf.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap(); // extra len
        buf.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap(); // disk number
        buf.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        buf.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        buf.write_u32::<LittleEndian>(offset).unwrap();
        buf.extend_from_slice(name);
        buf.extend_from_slice(comment);
        buf
    }

    #[test]
    fn local_header_accessors() {
        let bytes = local_header_bytes(8, 0xCAFEBABE, 4, 11, b"a.txt", b"xx", b"pay!");
        let header = LocalFileHeader::parse(&bytes, 0).unwrap();

        assert_eq!(header.compression(), CompressionMethod::Deflate);
        assert_eq!(header.crc32(), 0xCAFEBABE);
        assert_eq!(header.compressed_size(), 4);
        assert_eq!(header.uncompressed_size(), 11);
        assert_eq!(header.record_size(), 30 + 5 + 2);
        assert_eq!(header.file_name(), "a.txt");
        assert_eq!(header.payload(4).unwrap(), b"pay!");
    }

    #[test]
    fn local_header_truncated_fixed_part() {
        let bytes = local_header_bytes(0, 0, 0, 0, b"", b"", b"");
        let err = LocalFileHeader::parse(&bytes[..20], 0).unwrap_err();
        assert!(matches!(err, RepackError::Format(_)));
    }

    #[test]
    fn local_header_trailing_fields_overrun() {
        // Declared filename length reaches past the end of the buffer.
        let bytes = local_header_bytes(0, 0, 0, 0, b"name", b"", b"");
        let err = LocalFileHeader::parse(&bytes[..32], 0).unwrap_err();
        assert!(matches!(err, RepackError::Format(_)));
    }

    #[test]
    fn payload_overrun_is_format_error() {
        let bytes = local_header_bytes(0, 0, 3, 3, b"f", b"", b"abc");
        let header = LocalFileHeader::parse(&bytes, 0).unwrap();
        assert_eq!(header.payload(3).unwrap(), b"abc");
        assert!(matches!(
            header.payload(4).unwrap_err(),
            RepackError::Format(_)
        ));
    }

    #[test]
    fn cdir_entry_accessors() {
        let bytes = cdir_entry_bytes(0, 9, 9, 0x1234, b"dir/file", b"note");
        let entry = CdirEntry::parse(&bytes, 0).unwrap();

        assert_eq!(entry.compression(), CompressionMethod::Stored);
        assert_eq!(entry.compressed_size(), 9);
        assert_eq!(entry.uncompressed_size(), 9);
        assert_eq!(entry.local_header_offset(), 0x1234);
        assert_eq!(entry.record_size(), 46 + 8 + 4);
        assert_eq!(entry.file_name(), "dir/file");
        assert_eq!(entry.crc32(), 0xDEADBEEF);
    }

    #[test]
    fn cdir_entry_bad_signature() {
        let mut bytes = cdir_entry_bytes(0, 0, 0, 0, b"", b"");
        bytes[1] = b'X';
        let err = CdirEntry::parse(&bytes, 0).unwrap_err();
        assert!(matches!(err, RepackError::Format(_)));
    }

    #[test]
    fn eocd_round_trip() {
        let mut buf = Vec::new();
        buf.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        buf.write_u16::<LittleEndian>(0).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap();
        buf.write_u16::<LittleEndian>(3).unwrap();
        buf.write_u16::<LittleEndian>(3).unwrap();
        buf.write_u32::<LittleEndian>(150).unwrap();
        buf.write_u32::<LittleEndian>(0x400).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap();

        let eocd = EndOfCentralDirectory::from_bytes(&buf).unwrap();
        assert_eq!(eocd.total_entries, 3);
        assert_eq!(eocd.cd_size, 150);
        assert_eq!(eocd.cd_offset, 0x400);
        assert_eq!(eocd.comment_len, 0);
    }

    #[test]
    fn patch_helpers_rewrite_the_right_fields() {
        let original = local_header_bytes(8, 0xCAFEBABE, 4, 11, b"a.txt", b"", b"");
        let patched = patched_local_header(&original, CompressionMethod::Stored, 11);
        let header = LocalFileHeader::parse(&patched, 0).unwrap();
        assert_eq!(header.compression(), CompressionMethod::Stored);
        assert_eq!(header.compressed_size(), 11);
        // Everything else is untouched.
        assert_eq!(header.crc32(), 0xCAFEBABE);
        assert_eq!(header.uncompressed_size(), 11);
        assert_eq!(header.file_name(), "a.txt");

        let mut entry = cdir_entry_bytes(8, 4, 11, 0, b"a.txt", b"");
        patch_cdir_entry(&mut entry, CompressionMethod::Stored, 11, 77);
        let view = CdirEntry::parse(&entry, 0).unwrap();
        assert_eq!(view.compression(), CompressionMethod::Stored);
        assert_eq!(view.compressed_size(), 11);
        assert_eq!(view.local_header_offset(), 77);
        assert_eq!(view.crc32(), 0xDEADBEEF);
    }
}
