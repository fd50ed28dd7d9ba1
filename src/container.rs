use crate::error::{HgSaveError, Result};
use crate::header::{CodecMode, FormatConfig};
use crate::keying::{derive_key, ArchiveSlot, CipherKey, ProfileKey};
use crate::metadata::{ChunkEntry, MetadataRecord};
use crate::pipeline::{
    chunk_checksum, compress, decompress, decrypt_chunk, encrypt_chunk, join_chunks,
    pad_to_block, payload_digest, split_chunks, verify_chunk_checksum,
};
use tracing::debug;

/// Which archive is being converted and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub slot: ArchiveSlot,
    pub profile_key: Option<ProfileKey>,
    pub mode: CodecMode,
}

impl CodecOptions {
    pub fn new(slot: ArchiveSlot, profile_key: Option<ProfileKey>) -> Self {
        Self {
            slot,
            profile_key,
            mode: CodecMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: CodecMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn key(&self, config: &FormatConfig) -> CipherKey {
        derive_key(self.slot, self.profile_key, config)
    }
}

/// Contents of a metadata + payload file pair, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArchive {
    pub metadata: Vec<u8>,
    pub payload: Vec<u8>,
    /// Chunks described by `metadata`
    pub chunk_count: usize,
}

/// Encode a document into a metadata record and payload.
/// Pipeline per chunk: Split → Compress → Pad → Encrypt → Checksum
/// Output is deterministic for a given document, options and config.
pub fn encode_archive(
    document: &[u8],
    options: &CodecOptions,
    config: &FormatConfig,
) -> Result<EncodedArchive> {
    config.validate()?;
    let key = options.key(config);
    let secret = key.to_bytes();

    if document.len() > config.capacity_bytes() {
        return Err(HgSaveError::UnsupportedLayout(format!(
            "document of {} bytes exceeds the {} byte capacity of {} chunks",
            document.len(),
            config.capacity_bytes(),
            config.max_chunks
        )));
    }
    let pieces = split_chunks(document, config.max_chunk_size);

    let mut payload = Vec::new();
    let mut chunks = Vec::with_capacity(pieces.len());

    for piece in pieces {
        let compressed = compress(piece, config.compression)?;
        let stored = match options.mode {
            CodecMode::Ciphered => {
                encrypt_chunk(&pad_to_block(&compressed, config.cipher_block_size), &key)
            }
            CodecMode::Plain => compressed.clone(),
        };

        chunks.push(ChunkEntry {
            stored_len: to_u32(stored.len(), "stored chunk")?,
            compressed_len: to_u32(compressed.len(), "compressed chunk")?,
            uncompressed_len: to_u32(piece.len(), "chunk")?,
            checksum: chunk_checksum(&stored, &secret, config.checksum),
        });
        payload.extend_from_slice(&stored);
    }

    let record = MetadataRecord {
        magic: config.magic,
        format_version: config.format_version,
        max_chunk_size: to_u32(config.max_chunk_size, "max chunk size")?,
        payload_digest: payload_digest(&payload),
        chunks,
    };

    debug!(
        slot = %options.slot,
        mode = ?options.mode,
        chunks = record.chunk_count(),
        document_bytes = document.len(),
        payload_bytes = payload.len(),
        "encoded archive"
    );

    Ok(EncodedArchive {
        metadata: record.to_bytes(),
        payload,
        chunk_count: record.chunk_count(),
    })
}

/// Decode a metadata + payload pair back into the document.
/// Pipeline per chunk: Checksum → Decrypt → Unpad → Decompress → Join
/// Either the whole document is returned or an error; never partial output.
pub fn decode_archive(
    metadata: &[u8],
    payload: &[u8],
    options: &CodecOptions,
    config: &FormatConfig,
) -> Result<Vec<u8>> {
    config.validate()?;
    let record = MetadataRecord::from_bytes(metadata, config)?;
    check_layout(&record, options.mode, config)?;

    let expected = record.payload_len();
    if payload.len() < expected {
        return Err(HgSaveError::TruncatedPayload {
            expected,
            actual: payload.len(),
        });
    }
    if payload.len() > expected {
        return Err(HgSaveError::UnsupportedLayout(format!(
            "{} trailing payload bytes after {} declared",
            payload.len() - expected,
            expected
        )));
    }

    if payload_digest(payload) != record.payload_digest {
        return Err(HgSaveError::IntegrityMismatch(
            "payload digest does not match metadata".into(),
        ));
    }

    let key = options.key(config);
    let secret = key.to_bytes();
    let mut decoded = Vec::with_capacity(record.chunk_count());
    let mut offset = 0usize;

    for (index, chunk) in record.chunks.iter().enumerate() {
        let stored = &payload[offset..offset + chunk.stored_len as usize];
        offset += stored.len();

        if !verify_chunk_checksum(stored, &secret, config.checksum, &chunk.checksum) {
            return Err(HgSaveError::IntegrityMismatch(format!(
                "chunk {} checksum mismatch (wrong slot or profile key?)",
                index
            )));
        }

        let compressed = match options.mode {
            CodecMode::Ciphered => decrypt_chunk(stored, chunk.compressed_len as usize, &key)?,
            CodecMode::Plain => stored.to_vec(),
        };

        let data = decompress(&compressed, chunk.uncompressed_len as usize, config.compression)
            .map_err(|e| match e {
                HgSaveError::DecompressionFailure(msg) => {
                    HgSaveError::DecompressionFailure(format!("chunk {}: {}", index, msg))
                }
                other => other,
            })?;
        decoded.push(data);
    }

    let document = join_chunks(&decoded);
    debug!(
        slot = %options.slot,
        mode = ?options.mode,
        chunks = record.chunk_count(),
        document_bytes = document.len(),
        "decoded archive"
    );
    Ok(document)
}

/// Stored lengths must be consistent with the cipher step of `mode`
fn check_layout(record: &MetadataRecord, mode: CodecMode, config: &FormatConfig) -> Result<()> {
    let block = config.cipher_block_size;
    for (index, chunk) in record.chunks.iter().enumerate() {
        let stored = chunk.stored_len as usize;
        let compressed = chunk.compressed_len as usize;
        let valid = match mode {
            CodecMode::Ciphered => stored >= block && stored % block == 0 && compressed <= stored,
            CodecMode::Plain => stored == compressed,
        };
        if !valid {
            return Err(HgSaveError::UnsupportedLayout(format!(
                "chunk {}: {} stored bytes for {} compressed bytes in {:?} mode",
                index, stored, compressed, mode
            )));
        }
    }
    Ok(())
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| HgSaveError::UnsupportedLayout(format!("{} of {} bytes", what, value)))
}
