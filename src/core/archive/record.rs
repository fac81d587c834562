//! Archive entry metadata and packed timestamp decoding

use crate::core::error::{Result, VfsError};
use crate::core::path::{FilePath, SEPARATOR};
use chrono::{DateTime, TimeZone, Utc};

/// How an entry's bytes are stored in the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Stored as-is
    None,
    Deflate,
}

/// Metadata for one file or folder inside an archive
///
/// Records are produced by an [`ArchiveSource`](super::ArchiveSource) and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    path: FilePath,
    is_folder: bool,
    header_offset: u64,
    compressed_length: u64,
    uncompressed_length: u64,
    compression: CompressionMethod,
    packed_time: u32,
}

impl ArchiveRecord {
    /// Create a record from a raw container entry.
    ///
    /// A raw path ending in `/` marks a folder. Stored entries must have
    /// equal compressed and uncompressed lengths.
    pub fn new(
        raw_path: &str,
        header_offset: u64,
        compressed_length: u64,
        uncompressed_length: u64,
        compression: CompressionMethod,
        packed_time: u32,
    ) -> Result<Self> {
        if compression == CompressionMethod::None && compressed_length != uncompressed_length {
            return Err(VfsError::InvalidArgument(format!(
                "Stored entry {} has compressed length {} but uncompressed length {}",
                raw_path, compressed_length, uncompressed_length
            )));
        }

        Ok(ArchiveRecord {
            path: FilePath::of(raw_path),
            is_folder: raw_path.ends_with(SEPARATOR),
            header_offset,
            compressed_length,
            uncompressed_length,
            compression,
            packed_time,
        })
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    /// Offset of the entry's header within the container.
    pub fn header_offset(&self) -> u64 {
        self.header_offset
    }

    pub fn compressed_length(&self) -> u64 {
        self.compressed_length
    }

    pub fn uncompressed_length(&self) -> u64 {
        self.uncompressed_length
    }

    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    /// Raw packed date/time as stored in the container.
    pub fn packed_time(&self) -> u32 {
        self.packed_time
    }

    pub fn modified_time(&self) -> DateTime<Utc> {
        decode_packed_time(self.packed_time)
    }
}

/// Decode an MS-DOS packed date/time.
///
/// The high 16 bits hold the date (7 bits years since 1980, 4 bits month,
/// 5 bits day), the low 16 bits the time (5 bits hour, 6 bits minute, 5 bits
/// half-seconds). Out of range fields, and dates that don't exist, decode to
/// the Unix epoch. Fields are read as UTC.
pub fn decode_packed_time(packed: u32) -> DateTime<Utc> {
    let time = packed & 0xFFFF;
    let date = packed >> 16;

    let second = (time & 0x1F) * 2;
    let minute = (time >> 5) & 0x3F;
    let hour = (time >> 11) & 0x1F;
    let day = date & 0x1F;
    let month = (date >> 5) & 0x0F;
    let year = 1980 + ((date >> 9) & 0x7F) as i32;

    if second >= 60 || minute >= 60 || hour >= 24 {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return DateTime::<Utc>::UNIX_EPOCH;
    }

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Encode a calendar date/time into the MS-DOS packed layout.
///
/// Seconds are truncated to even values. Returns `None` for years outside
/// 1980..=2107.
pub fn encode_packed_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<u32> {
    if !(1980..=2107).contains(&year) {
        return None;
    }
    let date = (((year - 1980) as u32) << 9) | (month << 5) | day;
    let time = (hour << 11) | (minute << 5) | (second / 2);
    Some((date << 16) | time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> u32 {
        encode_packed_time(year, month, day, hour, minute, second).unwrap()
    }

    #[test]
    fn test_decode_valid_time() {
        let time = decode_packed_time(packed(2016, 3, 14, 15, 9, 26));
        assert_eq!(time, Utc.with_ymd_and_hms(2016, 3, 14, 15, 9, 26).unwrap());

        let odd = decode_packed_time(packed(2001, 12, 31, 23, 59, 59));
        assert_eq!(odd, Utc.with_ymd_and_hms(2001, 12, 31, 23, 59, 58).unwrap());
    }

    #[test]
    fn test_decode_out_of_range_is_epoch() {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        let base = packed(2000, 6, 15, 12, 30, 0);

        // second = 60 (30 half-seconds)
        assert_eq!(decode_packed_time((base & !0x1F) | 30), epoch);
        // minute = 60
        assert_eq!(decode_packed_time((base & !(0x3F << 5)) | (60 << 5)), epoch);
        // hour = 24
        assert_eq!(decode_packed_time((base & !(0x1F << 11)) | (24 << 11)), epoch);
        // day = 0
        assert_eq!(decode_packed_time(base & !(0x1F << 16)), epoch);
        // month = 0
        assert_eq!(decode_packed_time(base & !(0x0F << 21)), epoch);
        // month = 13
        assert_eq!(decode_packed_time((base & !(0x0F << 21)) | (13 << 21)), epoch);
    }

    #[test]
    fn test_decode_nonexistent_date_is_epoch() {
        assert_eq!(
            decode_packed_time(packed(2001, 2, 31, 0, 0, 0)),
            DateTime::<Utc>::UNIX_EPOCH
        );
    }

    #[test]
    fn test_encode_rejects_years_outside_range() {
        assert_eq!(encode_packed_time(1979, 1, 1, 0, 0, 0), None);
        assert_eq!(encode_packed_time(2108, 1, 1, 0, 0, 0), None);
        assert!(encode_packed_time(2107, 12, 31, 23, 59, 58).is_some());
    }

    #[test]
    fn test_folder_from_trailing_separator() {
        let folder = ArchiveRecord::new("sub1/", 0, 0, 0, CompressionMethod::None, 0).unwrap();
        assert!(folder.is_folder());
        assert_eq!(folder.path(), &FilePath::of("sub1"));

        let file =
            ArchiveRecord::new("sub1/a.txt", 10, 4, 9, CompressionMethod::Deflate, 0).unwrap();
        assert!(!file.is_folder());
    }

    #[test]
    fn test_stored_lengths_must_match() {
        let result = ArchiveRecord::new("a.txt", 0, 4, 9, CompressionMethod::None, 0);
        assert!(matches!(result, Err(VfsError::InvalidArgument(_))));
    }
}
