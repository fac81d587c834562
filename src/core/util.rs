//! Whole-file helpers built on the stream contracts

use crate::core::error::Result;
use crate::core::filesystem::{FileSystem, WritableFileSystem};
use crate::core::path::FilePath;
use std::io::{self, Read, Write};

/// Reads the complete content of a file.
pub fn read_bytes<F: FileSystem + ?Sized>(fs: &F, path: &FilePath) -> Result<Vec<u8>> {
    let mut input = fs.open_input_stream(path)?;
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Reads a file as UTF-8 text, skipping a leading byte order mark.
pub fn read_string<F: FileSystem + ?Sized>(fs: &F, path: &FilePath) -> Result<String> {
    let bytes = read_bytes(fs, path)?;
    let skip = skip_bom(&bytes);
    let text = std::str::from_utf8(&bytes[skip..])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(text.to_string())
}

/// Replaces the content of a file.
pub fn write_bytes<F: WritableFileSystem + ?Sized>(
    fs: &F,
    path: &FilePath,
    bytes: &[u8],
) -> Result<()> {
    let mut output = fs.open_output_stream(path, false)?;
    output.write_all(bytes)?;
    output.flush()?;
    Ok(())
}

pub fn write_string<F: WritableFileSystem + ?Sized>(
    fs: &F,
    path: &FilePath,
    text: &str,
) -> Result<()> {
    write_bytes(fs, path, text.as_bytes())
}

/// Length of the byte order mark at the start of `bytes`, or 0.
///
/// Recognizes the UTF-8 mark and both UTF-16 marks.
pub fn skip_bom(bytes: &[u8]) -> usize {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => 3,
        [0xFE, 0xFF, ..] | [0xFF, 0xFE, ..] => 2,
        _ => 0,
    }
}
