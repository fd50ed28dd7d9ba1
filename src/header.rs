use crate::error::{HgSaveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compression algorithm options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Lz4,
    Zstd,
    Brotli,
    None,
}

impl std::str::FromStr for Compression {
    type Err = HgSaveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lz4" => Ok(Self::Lz4),
            "zstd" => Ok(Self::Zstd),
            "brotli" => Ok(Self::Brotli),
            "none" => Ok(Self::None),
            _ => Err(HgSaveError::UnsupportedAlgorithm(format!(
                "compression: {}",
                s
            ))),
        }
    }
}

/// Keyed checksum algorithm used for per-chunk integrity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
    Sha3,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = HgSaveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" => Ok(Self::Sha256),
            "sha3" => Ok(Self::Sha3),
            _ => Err(HgSaveError::UnsupportedAlgorithm(format!("hash: {}", s))),
        }
    }
}

/// Whether chunks go through the block cipher.
///
/// `Plain` matches saves written after the format revision that dropped
/// payload encryption; chunking, checksums and metadata are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodecMode {
    Plain,
    #[default]
    Ciphered,
}

impl std::str::FromStr for CodecMode {
    type Err = HgSaveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "ciphered" => Ok(Self::Ciphered),
            _ => Err(HgSaveError::UnsupportedAlgorithm(format!("mode: {}", s))),
        }
    }
}

/// File-layout constants for one container format variant.
///
/// `Default` is the layout this crate writes and reads. It is provisional:
/// the keyed chunk checksum, raw LZ4 blocks, the plaintext metadata record,
/// `profile_mix` and the padding and chunk limits have not been confirmed
/// against saves written by the game. Load a JSON override (`--format`) to
/// match another variant. Values are passed explicitly to keying and to the
/// container codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Metadata magic
    pub magic: u32,
    /// Metadata format revision
    pub format_version: u32,
    /// Cipher padding granularity in bytes
    pub cipher_block_size: usize,
    /// Maximum uncompressed bytes per chunk
    pub max_chunk_size: usize,
    /// Largest chunk count accepted
    pub max_chunks: usize,
    /// Chunk compressor
    pub compression: Compression,
    /// Keyed per-chunk checksum
    pub checksum: HashAlgorithm,
    /// 16 ASCII bytes forming the base cipher key
    pub base_key: String,
    /// Slot mixing constant without a profile key
    pub default_mix: u32,
    /// Slot mixing constant with a profile key
    pub profile_mix: u32,
}

impl Default for FormatConfig {
    /// Provisional layout; none of these values has been checked against a
    /// real save, and a `--format` override takes precedence.
    fn default() -> Self {
        Self {
            magic: 0xEEEE_EEBE,
            format_version: 0x7D2,
            cipher_block_size: 8,
            max_chunk_size: 0x8_0000,
            max_chunks: 4096,
            compression: Compression::default(),
            checksum: HashAlgorithm::default(),
            base_key: "NAESEVADNAYRTNRG".to_string(),
            default_mix: 0x1422_CB8C,
            profile_mix: 0x8B3C_2E6D,
        }
    }
}

impl FormatConfig {
    /// Length of `base_key` in bytes
    pub const KEY_SIZE: usize = 16;

    /// Check that the constants describe a usable layout
    pub fn validate(&self) -> Result<()> {
        if self.cipher_block_size < 8 || self.cipher_block_size % 4 != 0 {
            return Err(HgSaveError::InvalidConfig(format!(
                "cipher block size {} must be a multiple of 4 and at least 8",
                self.cipher_block_size
            )));
        }
        if self.max_chunk_size == 0 || self.max_chunk_size > u32::MAX as usize {
            return Err(HgSaveError::InvalidConfig(format!(
                "max chunk size {} out of range",
                self.max_chunk_size
            )));
        }
        if self.max_chunks == 0 || self.max_chunks > u32::MAX as usize {
            return Err(HgSaveError::InvalidConfig(format!(
                "max chunks {} out of range",
                self.max_chunks
            )));
        }
        if self.base_key.len() != Self::KEY_SIZE {
            return Err(HgSaveError::InvalidConfig(format!(
                "base key must be {} bytes, got {}",
                Self::KEY_SIZE,
                self.base_key.len()
            )));
        }
        Ok(())
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize from JSON bytes and validate
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON override file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Largest document this variant can hold
    pub fn capacity_bytes(&self) -> usize {
        self.max_chunk_size.saturating_mul(self.max_chunks)
    }
}
