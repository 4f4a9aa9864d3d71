//! PDF input sniffing.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Detected PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// Version string from the header, e.g. "1.7"
    pub version: String,
}

/// Check magic bytes without reporting a version.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.len() >= 5 && data.starts_with(b"%PDF-")
}

/// Detect PDF format from a byte prefix.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < 8 || !data.starts_with(b"%PDF-") {
        return Err(Error::InvalidInput("not a PDF file".to_string()));
    }

    let version: String = data[5..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|b| *b as char)
        .collect();
    if version.is_empty() {
        return Err(Error::InvalidInput("malformed PDF header".to_string()));
    }

    Ok(PdfFormat { version })
}

/// Detect PDF format by reading the head of a file.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let mut file = std::fs::File::open(path.as_ref())?;
    let mut head = [0u8; 16];
    let read = file.read(&mut head)?;
    detect_format_from_bytes(&head[..read])
}
