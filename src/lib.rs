//! hgsave - HG save-game container codec
//!
//! A save slot is stored as two files: a small metadata record (`mf_*.hg`)
//! and a payload (`*.hg`) holding one or more chunks. Concatenating the
//! decoded chunks yields the save's JSON document.
//!
//! ## Transform Pipeline
//!
//! ```text
//! Encode: Document → Split → Compress → Pad → Encrypt → Checksum → Metadata + Payload
//! Decode: Metadata + Payload → Digest → Checksum → Decrypt → Unpad → Decompress → Join
//! ```
//!
//! - **Split**: fixed maximum chunk size (512 KiB by default)
//! - **Compress**: raw LZ4 blocks (default), zstd, brotli, or none
//! - **Encrypt**: XXTEA keyed from the archive slot and optional profile key;
//!   skipped in [`CodecMode::Plain`]
//! - **Checksum**: keyed per-chunk checksum over the stored bytes, plus a
//!   SHA-256 digest of the whole payload
//!
//! ## Example
//!
//! ```no_run
//! use hgsave::{decode_archive, encode_archive, ArchiveSlot, CodecOptions, FormatConfig, ProfileKey};
//!
//! let config = FormatConfig::default();
//! let options = CodecOptions::new(ArchiveSlot(0), Some(ProfileKey(76561198012345678)));
//!
//! let archive = encode_archive(br#"{"Version":4720}"#, &options, &config).unwrap();
//! let document = decode_archive(&archive.metadata, &archive.payload, &options, &config).unwrap();
//! assert_eq!(document, br#"{"Version":4720}"#);
//! ```

pub mod archive;
pub mod cli;
pub mod container;
pub mod error;
pub mod header;
pub mod keying;
pub mod metadata;
pub mod pipeline;
pub mod storage;

pub use container::{decode_archive, encode_archive, CodecOptions, EncodedArchive};
pub use error::{HgSaveError, Result};
pub use header::{CodecMode, Compression, FormatConfig, HashAlgorithm};
pub use keying::{derive_key, ArchiveSlot, CipherKey, ProfileKey};
pub use metadata::MetadataRecord;
pub use storage::{read_archive, write_archive};
