use crate::archive::{ArchiveFiles, GameMode};
use crate::cli::decode::{decode_save, DecodeOptions};
use crate::cli::encode::{encode_save, EncodeOptions};
use crate::container::CodecOptions;
use crate::error::Result;
use crate::header::{CodecMode, FormatConfig};
use crate::keying::ProfileKey;
use std::path::Path;
use tracing::{debug, info};

/// Conversion direction for a whole save folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Decode,
    Encode,
}

/// Options for the folder command
#[derive(Debug, Clone, Default)]
pub struct FolderOptions {
    pub direction: Direction,
    pub game_mode: GameMode,
    pub mode: CodecMode,
    pub config: FormatConfig,
}

/// Convert every slot of a game mode found in `dir`.
///
/// The profile key comes from the folder name. Slots whose source files are
/// missing are skipped; the first failing slot aborts the run.
/// Returns the files that were converted.
pub fn process_folder(dir: &Path, options: &FolderOptions) -> Result<Vec<ArchiveFiles>> {
    let profile_key = ProfileKey::from_folder_name(&dir.to_string_lossy())?;
    info!(
        dir = %dir.display(),
        profile_key = ?profile_key.map(|k| k.0),
        direction = ?options.direction,
        "processing save folder"
    );

    let mut converted = Vec::new();
    for files in ArchiveFiles::for_mode(dir, options.game_mode) {
        let codec = CodecOptions::new(files.slot, profile_key).with_mode(options.mode);
        match options.direction {
            Direction::Decode => {
                if !files.metadata.exists() || !files.payload.exists() {
                    debug!(slot = %files.slot, "no archive, skipping");
                    continue;
                }
                let decode = DecodeOptions {
                    codec,
                    config: options.config.clone(),
                };
                decode_save(&files.metadata, &files.payload, &files.document, &decode)?;
            }
            Direction::Encode => {
                if !files.document.exists() {
                    debug!(slot = %files.slot, "no document, skipping");
                    continue;
                }
                let encode = EncodeOptions {
                    codec,
                    config: options.config.clone(),
                };
                encode_save(&files.document, &files.metadata, &files.payload, &encode)?;
            }
        }
        converted.push(files);
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HgSaveError;
    use crate::keying::ArchiveSlot;
    use tempfile::tempdir;

    #[test]
    fn test_folder_roundtrip_with_profile_key() {
        let root = tempdir().unwrap();
        let dir = root.path().join("st_76561198012345678");
        std::fs::create_dir(&dir).unwrap();

        let slot1 = ArchiveFiles::for_slot(&dir, ArchiveSlot(0));
        let slot3 = ArchiveFiles::for_slot(&dir, ArchiveSlot(2));
        std::fs::write(&slot1.document, b"{\"slot\":1}").unwrap();
        std::fs::write(&slot3.document, b"{\"slot\":3}").unwrap();

        let encode = FolderOptions {
            direction: Direction::Encode,
            ..Default::default()
        };
        let written = process_folder(&dir, &encode).unwrap();
        assert_eq!(written, vec![slot1.clone(), slot3.clone()]);

        std::fs::remove_file(&slot1.document).unwrap();
        std::fs::remove_file(&slot3.document).unwrap();

        let decoded = process_folder(&dir, &FolderOptions::default()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(std::fs::read(&slot1.document).unwrap(), b"{\"slot\":1}");
        assert_eq!(std::fs::read(&slot3.document).unwrap(), b"{\"slot\":3}");
    }

    #[test]
    fn test_folder_other_game_mode_is_empty() {
        let dir = tempdir().unwrap();
        let files = ArchiveFiles::for_slot(dir.path(), ArchiveSlot(0));
        std::fs::write(&files.document, b"{}").unwrap();

        let options = FolderOptions {
            direction: Direction::Encode,
            game_mode: GameMode::Survival,
            ..Default::default()
        };
        assert!(process_folder(dir.path(), &options).unwrap().is_empty());
    }

    #[test]
    fn test_folder_bad_profile_suffix() {
        let root = tempdir().unwrap();
        let dir = root.path().join("st_notanumber");
        std::fs::create_dir(&dir).unwrap();
        let err = process_folder(&dir, &FolderOptions::default()).unwrap_err();
        assert!(matches!(err, HgSaveError::InvalidProfileKey(_)));
    }
}
