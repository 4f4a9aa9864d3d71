//! Error types for the glyphmark library.

use std::io;
use thiserror::Error;

/// Result type alias for glyphmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is empty, has zero pages, or is not a readable document.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The document is encrypted and no password was supplied.
    #[error("Document is password protected")]
    PasswordRequired,

    /// The supplied password does not open the document.
    #[error("Incorrect password")]
    PasswordIncorrect,

    /// OCR was requested but no adapter is available, or the adapter failed.
    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    /// A page produced zero text lines. Recorded per page; never fatal.
    #[error("Page has no text lines")]
    DegenerateLayout,

    /// Conversion was cancelled through the cancellation token.
    #[error("Conversion cancelled")]
    Cancelled,

    /// Error reported by the glyph source while reading the PDF.
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    /// Invariant violation. Must not occur in release builds.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::PasswordRequired,
            _ => Error::Pdf(err.to_string()),
        }
    }
}
