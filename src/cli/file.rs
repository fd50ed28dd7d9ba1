use crate::archive::ArchiveFiles;
use crate::cli::decode::{decode_save, DecodeOptions};
use crate::cli::encode::{encode_save, EncodeOptions};
use crate::cli::folder::Direction;
use crate::container::CodecOptions;
use crate::error::Result;
use crate::header::{CodecMode, FormatConfig};
use crate::keying::ProfileKey;
use std::path::Path;
use tracing::info;

/// Options for the file command
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub direction: Direction,
    pub mode: CodecMode,
    pub config: FormatConfig,
}

/// Convert the archive that belongs to one document.
///
/// The slot is taken from the document's file name and the profile key from
/// its parent folder, the same way `process_folder` resolves them.
pub fn process_file(document: &Path, options: &FileOptions) -> Result<ArchiveFiles> {
    let files = ArchiveFiles::for_document(document);
    let parent = document.parent().unwrap_or_else(|| Path::new(""));
    let profile_key = ProfileKey::from_folder_name(&parent.to_string_lossy())?;
    let codec = CodecOptions::new(files.slot, profile_key).with_mode(options.mode);

    info!(
        document = %document.display(),
        slot = %files.slot,
        profile_key = ?profile_key.map(|k| k.0),
        direction = ?options.direction,
        "processing save file"
    );

    match options.direction {
        Direction::Decode => {
            let decode = DecodeOptions {
                codec,
                config: options.config.clone(),
            };
            decode_save(&files.metadata, &files.payload, &files.document, &decode)?;
        }
        Direction::Encode => {
            let encode = EncodeOptions {
                codec,
                config: options.config.clone(),
            };
            encode_save(&files.document, &files.metadata, &files.payload, &encode)?;
        }
    }
    Ok(files)
}
