//! Error types for pdfextractor.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfextractor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while exporting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The output location cannot be used for writing.
    #[error("Output directory {} is not writable: {reason}", path.display())]
    OutputNotWritable {
        /// The configured output directory
        path: PathBuf,
        /// Why the check failed
        reason: String,
    },

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// A renderer or writer could not produce its artifact.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Raster image encoding failed.
    #[error("Image encoding error: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text run or style data does not have the expected shape.
    #[error("Malformed text content: {0}")]
    MalformedText(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_output_not_writable_display() {
        let err = Error::OutputNotWritable {
            path: PathBuf::from("/nope"),
            reason: "does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Output directory /nope is not writable: does not exist"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
