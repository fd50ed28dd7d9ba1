use crate::error::{HgSaveError, Result};
use crate::header::Compression;
use std::io::{Read, Write};

/// Compress one chunk. Empty input compresses to an empty stream
pub fn compress(data: &[u8], algorithm: Compression) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    match algorithm {
        Compression::Lz4 => Ok(compress_lz4(data)),
        Compression::Zstd => compress_zstd(data),
        Compression::Brotli => compress_brotli(data),
        Compression::None => Ok(data.to_vec()),
    }
}

/// Decompress one chunk, which must inflate to exactly `expected_len` bytes
pub fn decompress(data: &[u8], expected_len: usize, algorithm: Compression) -> Result<Vec<u8>> {
    if data.is_empty() {
        if expected_len == 0 {
            return Ok(Vec::new());
        }
        return Err(HgSaveError::DecompressionFailure(format!(
            "empty stream, expected {} bytes",
            expected_len
        )));
    }

    let output = match algorithm {
        Compression::Lz4 => decompress_lz4(data, expected_len)?,
        Compression::Zstd => decompress_zstd(data, expected_len)?,
        Compression::Brotli => decompress_brotli(data, expected_len)?,
        Compression::None => data.to_vec(),
    };

    if output.len() != expected_len {
        return Err(HgSaveError::DecompressionFailure(format!(
            "{:?}: produced {} bytes, expected {}",
            algorithm,
            output.len(),
            expected_len
        )));
    }
    Ok(output)
}

/// Raw LZ4 block; the uncompressed size lives in the metadata record
fn compress_lz4(data: &[u8]) -> Vec<u8> {
    lz4_flex::block::compress(data)
}

fn decompress_lz4(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    lz4_flex::block::decompress(data, expected_len)
        .map_err(|e| HgSaveError::DecompressionFailure(format!("lz4: {}", e)))
}

fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(data, 3)
        .map_err(|e| HgSaveError::CompressionError(format!("zstd: {}", e)))
}

/// Output is capped at `expected_len`; a larger frame is an error
fn decompress_zstd(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    zstd::bulk::decompress(data, expected_len)
        .map_err(|e| HgSaveError::DecompressionFailure(format!("zstd: {}", e)))
}

fn compress_brotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut writer = brotli::CompressorWriter::new(&mut output, 4096, 4, 22);
    writer
        .write_all(data)
        .map_err(|e| HgSaveError::CompressionError(format!("brotli: {}", e)))?;
    drop(writer);
    Ok(output)
}

/// Reads one byte past `expected_len` so an oversized stream fails the
/// length check without being inflated in full
fn decompress_brotli(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_len);
    let mut reader = brotli::Decompressor::new(data, 4096).take(expected_len as u64 + 1);
    reader
        .read_to_end(&mut output)
        .map_err(|e| HgSaveError::DecompressionFailure(format!("brotli: {}", e)))?;
    Ok(output)
}
