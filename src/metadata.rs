use crate::error::{HgSaveError, Result};
use crate::header::FormatConfig;

/// Size of the keyed per-chunk checksum in bytes
pub const CHECKSUM_SIZE: usize = 16;

/// Size of the SHA-256 payload digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// One chunk's layout and checksum.
/// Layout: [stored_len: 4][compressed_len: 4][uncompressed_len: 4][reserved: 4][checksum: 16]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkEntry {
    /// Bytes occupied in the payload file (compressed + cipher padding)
    pub stored_len: u32,
    /// Length of the compressed stream before padding
    pub compressed_len: u32,
    /// Length after decompression
    pub uncompressed_len: u32,
    /// Keyed checksum over the stored bytes
    pub checksum: [u8; CHECKSUM_SIZE],
}

impl ChunkEntry {
    pub const SIZE: usize = 32;

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.stored_len.to_le_bytes());
        buf.extend_from_slice(&self.compressed_len.to_le_bytes());
        buf.extend_from_slice(&self.uncompressed_len.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&self.checksum);
    }

    fn read_from(data: &[u8], index: usize) -> Result<Self> {
        let reserved = read_u32(data, 12);
        if reserved != 0 {
            return Err(HgSaveError::MalformedMetadata(format!(
                "chunk {} reserved field is {:#x}",
                index, reserved
            )));
        }
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&data[16..16 + CHECKSUM_SIZE]);
        Ok(Self {
            stored_len: read_u32(data, 0),
            compressed_len: read_u32(data, 4),
            uncompressed_len: read_u32(data, 8),
            checksum,
        })
    }
}

/// Companion metadata file contents.
/// Layout: [magic: 4][format_version: 4][chunk_count: 4][max_chunk_size: 4][payload_digest: 32][entries: 32 * n]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub magic: u32,
    pub format_version: u32,
    /// Chunk size the document was split with
    pub max_chunk_size: u32,
    /// SHA-256 of the entire payload file
    pub payload_digest: [u8; DIGEST_SIZE],
    pub chunks: Vec<ChunkEntry>,
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(word)
}

impl MetadataRecord {
    /// Fixed part before the chunk table
    pub const HEADER_SIZE: usize = 48;

    /// Exact serialized size for `chunk_count` chunks
    pub fn encoded_len(chunk_count: usize) -> usize {
        Self::HEADER_SIZE + chunk_count * ChunkEntry::SIZE
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total payload bytes the chunk table describes
    pub fn payload_len(&self) -> usize {
        self.chunks.iter().map(|c| c.stored_len as usize).sum()
    }

    /// Total document bytes after decompression
    pub fn document_len(&self) -> usize {
        self.chunks.iter().map(|c| c.uncompressed_len as usize).sum()
    }

    /// Serialize to the on-disk layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::encoded_len(self.chunks.len()));
        buf.extend_from_slice(&self.magic.to_le_bytes());
        buf.extend_from_slice(&self.format_version.to_le_bytes());
        buf.extend_from_slice(&(self.chunks.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.max_chunk_size.to_le_bytes());
        buf.extend_from_slice(&self.payload_digest);
        for chunk in &self.chunks {
            chunk.write_to(&mut buf);
        }
        buf
    }

    /// Parse and validate a record against the format variant.
    ///
    /// Structural problems are `MalformedMetadata`; well-formed records that
    /// describe a layout this codec does not produce are `UnsupportedLayout`.
    pub fn from_bytes(data: &[u8], config: &FormatConfig) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(HgSaveError::MalformedMetadata(format!(
                "{} bytes, need at least {}",
                data.len(),
                Self::HEADER_SIZE
            )));
        }

        let magic = read_u32(data, 0);
        if magic != config.magic {
            return Err(HgSaveError::MalformedMetadata(format!(
                "bad magic {:#010x}",
                magic
            )));
        }

        let format_version = read_u32(data, 4);
        if format_version != config.format_version {
            return Err(HgSaveError::UnsupportedLayout(format!(
                "format version {:#x}, expected {:#x}",
                format_version, config.format_version
            )));
        }

        let chunk_count = read_u32(data, 8) as usize;
        if chunk_count == 0 {
            return Err(HgSaveError::MalformedMetadata("chunk count is zero".into()));
        }
        if chunk_count > config.max_chunks {
            return Err(HgSaveError::UnsupportedLayout(format!(
                "{} chunks, at most {} supported",
                chunk_count, config.max_chunks
            )));
        }
        let expected_len = Self::encoded_len(chunk_count);
        if data.len() != expected_len {
            return Err(HgSaveError::MalformedMetadata(format!(
                "{} bytes for {} chunks, expected {}",
                data.len(),
                chunk_count,
                expected_len
            )));
        }

        let max_chunk_size = read_u32(data, 12);
        if max_chunk_size as usize != config.max_chunk_size {
            return Err(HgSaveError::UnsupportedLayout(format!(
                "chunk size {:#x}, expected {:#x}",
                max_chunk_size, config.max_chunk_size
            )));
        }

        let mut payload_digest = [0u8; DIGEST_SIZE];
        payload_digest.copy_from_slice(&data[16..16 + DIGEST_SIZE]);

        let mut chunks = Vec::with_capacity(chunk_count);
        for (index, entry) in data[Self::HEADER_SIZE..]
            .chunks_exact(ChunkEntry::SIZE)
            .enumerate()
        {
            let chunk = ChunkEntry::read_from(entry, index)?;
            let is_last = index + 1 == chunk_count;
            if chunk.uncompressed_len > max_chunk_size {
                return Err(HgSaveError::UnsupportedLayout(format!(
                    "chunk {} holds {} bytes, limit {}",
                    index, chunk.uncompressed_len, max_chunk_size
                )));
            }
            if !is_last && chunk.uncompressed_len != max_chunk_size {
                return Err(HgSaveError::UnsupportedLayout(format!(
                    "non-final chunk {} holds {} bytes, expected {}",
                    index, chunk.uncompressed_len, max_chunk_size
                )));
            }
            chunks.push(chunk);
        }

        Ok(Self {
            magic,
            format_version,
            max_chunk_size,
            payload_digest,
            chunks,
        })
    }
}
