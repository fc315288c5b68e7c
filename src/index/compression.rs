//! Lossless compaction of page bodies

use std::io::Cursor;

/// zstd level used for stored bodies
const COMPRESSION_LEVEL: i32 = 3;

/// Compresses a page body for storage
pub fn compress_text(body: &str) -> std::io::Result<Vec<u8>> {
    zstd::encode_all(Cursor::new(body.as_bytes()), COMPRESSION_LEVEL)
}

/// Restores a page body from its stored encoding
pub fn decompress_text(payload: &[u8]) -> std::io::Result<String> {
    let bytes = zstd::decode_all(Cursor::new(payload))?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
