use crate::error::{HgSaveError, Result};
use crate::keying::ArchiveSlot;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Group of archive slots belonging to one game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Normal,
    Survival,
    Creative,
    /// Every slot, as used by the older fully encrypted layout
    All,
}

impl GameMode {
    pub fn slots(self) -> Range<u32> {
        match self {
            Self::Normal => 0..3,
            Self::Survival => 3..6,
            Self::Creative => 6..9,
            Self::All => 0..9,
        }
    }
}

impl std::str::FromStr for GameMode {
    type Err = HgSaveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "survival" => Ok(Self::Survival),
            "creative" => Ok(Self::Creative),
            "all" => Ok(Self::All),
            _ => Err(HgSaveError::UnsupportedAlgorithm(format!("game mode: {}", s))),
        }
    }
}

/// File names of one archive slot inside a save folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFiles {
    pub slot: ArchiveSlot,
    /// Decoded JSON document
    pub document: PathBuf,
    /// `mf_` metadata file
    pub metadata: PathBuf,
    /// Chunked payload file
    pub payload: PathBuf,
}

impl ArchiveFiles {
    /// Slot 0 is `storage`, slot n is `storage{n+1}`
    pub fn for_slot(dir: &Path, slot: ArchiveSlot) -> Self {
        let stem = match slot.index() {
            0 => "storage".to_string(),
            n => format!("storage{}", n + 1),
        };
        Self {
            slot,
            document: dir.join(format!("{}.json", stem)),
            metadata: dir.join(format!("mf_{}.hg", stem)),
            payload: dir.join(format!("{}.hg", stem)),
        }
    }

    /// Archive files next to a single document.
    ///
    /// The slot comes from the first number in the file name and the `.hg`
    /// names from the name without its `.json` extension, so `storage5.json`
    /// is slot 4 stored as `mf_storage5.hg` and `storage5.hg`.
    pub fn for_document(path: &Path) -> Self {
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = name.strip_suffix(".json").unwrap_or(&name);
        Self {
            slot: ArchiveSlot::from_file_name(&name),
            document: path.to_path_buf(),
            metadata: dir.join(format!("mf_{}.hg", base)),
            payload: dir.join(format!("{}.hg", base)),
        }
    }

    /// Every slot of a game mode
    pub fn for_mode(dir: &Path, mode: GameMode) -> Vec<Self> {
        mode.slots()
            .map(|slot| Self::for_slot(dir, ArchiveSlot(slot)))
            .collect()
    }
}
