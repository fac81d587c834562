//! ZIP container parser backed by the `zip` crate

use super::record::{ArchiveRecord, CompressionMethod};
use super::ArchiveSource;
use crate::core::error::{Result, VfsError};
use std::collections::HashMap;
use std::io::{self, Read, Seek};
use zip::ZipArchive;

/// Upper bound for the read buffer allocated up front from header sizes.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// [`ArchiveSource`] reading a ZIP file from any seekable handle
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    /// Header offset -> entry index
    entries: HashMap<u64, usize>,
}

impl<R: Read + Seek> ZipSource<R> {
    /// Parse the central directory of `reader`.
    pub fn new(reader: R) -> Result<Self> {
        Ok(ZipSource {
            archive: ZipArchive::new(reader)?,
            entries: HashMap::new(),
        })
    }

    fn entry_index(&self, record: &ArchiveRecord) -> Result<usize> {
        self.entries
            .get(&record.header_offset())
            .copied()
            .ok_or_else(|| VfsError::NotFound(record.path().clone()))
    }
}

impl<R: Read + Seek + Send> ArchiveSource for ZipSource<R> {
    fn read_records(&mut self) -> Result<Vec<ArchiveRecord>> {
        let mut records = Vec::with_capacity(self.archive.len());
        self.entries.clear();

        for index in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(index)?;
            let compression = match entry.compression() {
                zip::CompressionMethod::Stored => CompressionMethod::None,
                zip::CompressionMethod::Deflated => CompressionMethod::Deflate,
                other => {
                    return Err(VfsError::Archive(format!(
                        "Unsupported compression method {:?} for {}",
                        other,
                        entry.name()
                    )))
                }
            };
            let modified = entry.last_modified();
            let packed = (u32::from(modified.datepart()) << 16) | u32::from(modified.timepart());

            let record = ArchiveRecord::new(
                entry.name(),
                entry.header_start(),
                entry.compressed_size(),
                entry.size(),
                compression,
                packed,
            )?;
            self.entries.insert(record.header_offset(), index);
            records.push(record);
        }
        Ok(records)
    }

    fn open_record(&mut self, record: &ArchiveRecord) -> Result<Vec<u8>> {
        let index = self.entry_index(record)?;
        let mut entry = self.archive.by_index(index)?;

        let mut bytes =
            Vec::with_capacity(record.uncompressed_length().min(MAX_PREALLOCATION) as usize);
        entry.read_to_end(&mut bytes)?;
        if (bytes.len() as u64) < record.uncompressed_length() {
            return Err(VfsError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Read {} of {} bytes from {}",
                    bytes.len(),
                    record.uncompressed_length(),
                    record.path()
                ),
            )));
        }
        Ok(bytes)
    }

    fn data_offset(&mut self, record: &ArchiveRecord) -> Result<u64> {
        let index = self.entry_index(record)?;
        let entry = self.archive.by_index_raw(index)?;
        Ok(entry.data_start())
    }
}
