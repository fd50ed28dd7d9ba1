use crate::container::{decode_archive, CodecOptions};
use crate::error::Result;
use crate::header::FormatConfig;
use crate::storage::{read_archive, write_atomic};
use std::path::Path;

/// Options for the decode command
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub codec: CodecOptions,
    pub config: FormatConfig,
}

/// Decode a metadata + payload pair into a JSON document file.
/// Returns the number of document bytes written
pub fn decode_save(
    metadata_path: &Path,
    payload_path: &Path,
    output_path: &Path,
    options: &DecodeOptions,
) -> Result<usize> {
    let (metadata, payload) = read_archive(metadata_path, payload_path)?;
    let document = decode_archive(&metadata, &payload, &options.codec, &options.config)?;

    // Nothing is written unless the whole archive decoded
    write_atomic(output_path, &document)?;
    Ok(document.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::encode::{encode_save, EncodeOptions};
    use crate::error::HgSaveError;
    use crate::keying::{ArchiveSlot, ProfileKey};
    use tempfile::tempdir;

    #[test]
    fn test_decode_roundtrip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("storage3.json");
        let meta = dir.path().join("mf_storage3.hg");
        let payload = dir.path().join("storage3.hg");
        let output = dir.path().join("decoded.json");

        let original = br#"{"Version":4720,"Platform":"PC"}"#;
        std::fs::write(&input, original).unwrap();

        let codec = CodecOptions::new(ArchiveSlot(2), Some(ProfileKey(76561198000000000)));
        let encode = EncodeOptions {
            codec,
            ..Default::default()
        };
        encode_save(&input, &meta, &payload, &encode).unwrap();

        let decode = DecodeOptions {
            codec,
            ..Default::default()
        };
        let written = decode_save(&meta, &payload, &output, &decode).unwrap();
        assert_eq!(written, original.len());
        assert_eq!(std::fs::read(&output).unwrap(), original);
    }

    #[test]
    fn test_decode_wrong_slot_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("storage.json");
        let meta = dir.path().join("mf_storage.hg");
        let payload = dir.path().join("storage.hg");
        let output = dir.path().join("decoded.json");

        std::fs::write(&input, b"{\"secret\":true}").unwrap();
        encode_save(&input, &meta, &payload, &EncodeOptions::default()).unwrap();

        let decode = DecodeOptions {
            codec: CodecOptions::new(ArchiveSlot(1), None),
            ..Default::default()
        };
        let err = decode_save(&meta, &payload, &output, &decode).unwrap_err();
        assert!(matches!(err, HgSaveError::IntegrityMismatch(_)));
        assert!(!output.exists());
    }
}
