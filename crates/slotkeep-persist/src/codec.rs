//! Compact form of save data.
//!
//! Save text is deflated (zlib framing, fastest level) and then base64
//! encoded so it can live in text-only stores. The blob-level helpers also
//! carry the absent/empty sentinels that existing stored data relies on:
//!
//! | input              | `encode` | `decode`      |
//! |--------------------|----------|---------------|
//! | absent (`None`)    | `""`     | `Some("")`    |
//! | empty (`Some("")`) | non-empty| `None`        |
//!
//! Stored data written by earlier releases depends on this asymmetry.

use crate::error::CompressionError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compression level (1 = fastest; this path sits next to the game loop).
pub const COMPRESSION_LEVEL: u32 = 1;

/// Deflate and base64-encode text.
pub fn compress(text: &str) -> Result<String, CompressionError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| CompressionError::Worker(format!("deflate failed: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CompressionError::Worker(format!("deflate failed: {}", e)))?;

    Ok(STANDARD.encode(compressed))
}

/// Base64-decode and inflate a compact form back to text.
pub fn decompress(compact: &str) -> Result<String, CompressionError> {
    let compressed = STANDARD
        .decode(compact)
        .map_err(|e| CompressionError::Malformed(format!("invalid base64: {}", e)))?;

    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| CompressionError::Malformed(format!("invalid deflate stream: {}", e)))?;

    String::from_utf8(inflated).map_err(|e| CompressionError::NotText {
        context: format!("decompressed data is not UTF-8 ({})", e.utf8_error()),
    })
}

/// Encode an optional blob for storage. Absent data encodes to `""`.
pub fn encode(blob: Option<&str>) -> Result<String, CompressionError> {
    match blob {
        None => Ok(String::new()),
        Some(text) => compress(text),
    }
}

/// Decode stored data. Absent storage reads as `""`, an empty stored
/// string reads as absent.
pub fn decode(stored: Option<&str>) -> Result<Option<String>, CompressionError> {
    match stored {
        None => Ok(Some(String::new())),
        Some("") => Ok(None),
        Some(compact) => decompress(compact).map(Some),
    }
}
