//! PDF header sniffing, run before the engine is asked to decode anything.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header facts of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// Header version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of `%PDF-` (non-zero when junk precedes the header)
    pub header_offset: usize,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept a header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Inspect the start of a buffer for a PDF header.
pub fn detect_format(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let rest = &data[offset + PDF_MAGIC.len()..];
    let version: String = rest
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|b| *b as char)
        .collect();

    match version.split_once('.') {
        Some((major, minor))
            if matches!(major, "1" | "2") && !minor.is_empty() && minor.len() <= 2 =>
        {
            Ok(PdfFormat {
                version,
                header_offset: offset,
            })
        }
        _ if version.is_empty() => Err(Error::UnknownFormat),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

/// Inspect the start of a file for a PDF header.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let mut header = Vec::with_capacity(HEADER_WINDOW + 16);
    File::open(path)?
        .take((HEADER_WINDOW + 16) as u64)
        .read_to_end(&mut header)?;
    detect_format(&header)
}

/// Whether a file looks like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}
