use crate::container::{encode_archive, CodecOptions};
use crate::error::Result;
use crate::header::FormatConfig;
use crate::storage::write_archive;
use std::path::Path;

/// Options for the encode command
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub codec: CodecOptions,
    pub config: FormatConfig,
}

/// Encode a JSON document file into a metadata + payload pair.
/// Returns the number of chunks written
pub fn encode_save(
    input_path: &Path,
    metadata_path: &Path,
    payload_path: &Path,
    options: &EncodeOptions,
) -> Result<usize> {
    let document = std::fs::read(input_path)?;
    let archive = encode_archive(&document, &options.codec, &options.config)?;
    write_archive(metadata_path, payload_path, &archive)?;
    Ok(archive.chunk_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::CodecMode;
    use crate::metadata::MetadataRecord;
    use tempfile::tempdir;

    #[test]
    fn test_encode_new_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("storage.json");
        let meta = dir.path().join("mf_storage.hg");
        let payload = dir.path().join("storage.hg");

        std::fs::write(&input, b"{\"Version\":1}").unwrap();
        let chunks = encode_save(&input, &meta, &payload, &EncodeOptions::default()).unwrap();

        assert_eq!(chunks, 1);
        assert_eq!(
            std::fs::metadata(&meta).unwrap().len() as usize,
            MetadataRecord::encoded_len(1)
        );
        assert!(payload.exists());
    }

    #[test]
    fn test_encode_multi_chunk() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("storage.json");
        let meta = dir.path().join("mf_storage.hg");
        let payload = dir.path().join("storage.hg");

        std::fs::write(&input, vec![b' '; 1000]).unwrap();
        let options = EncodeOptions {
            codec: CodecOptions::default().with_mode(CodecMode::Plain),
            config: FormatConfig {
                max_chunk_size: 300,
                ..Default::default()
            },
        };
        assert_eq!(encode_save(&input, &meta, &payload, &options).unwrap(), 4);

        let record =
            MetadataRecord::from_bytes(&std::fs::read(&meta).unwrap(), &options.config).unwrap();
        assert_eq!(record.chunk_count(), 4);
    }

    #[test]
    fn test_encode_missing_input_leaves_no_files() {
        let dir = tempdir().unwrap();
        let meta = dir.path().join("mf_storage.hg");
        let payload = dir.path().join("storage.hg");
        let result = encode_save(
            &dir.path().join("absent.json"),
            &meta,
            &payload,
            &EncodeOptions::default(),
        );
        assert!(result.is_err());
        assert!(!meta.exists());
        assert!(!payload.exists());
    }
}
