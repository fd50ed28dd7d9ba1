//! Cipher key derivation from an archive slot and an optional profile key.
//!
//! This is obfuscation, not cryptographic security: the key is a fixed
//! function of public inputs and is never stored in the archive.

use crate::error::{HgSaveError, Result};
use crate::header::FormatConfig;

/// 0-based index of one of the parallel save archives in a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ArchiveSlot(pub u32);

impl ArchiveSlot {
    pub fn index(self) -> u32 {
        self.0
    }

    /// Slot implied by a document or payload file name: the first run of
    /// digits `n` means slot `n - 1`, no digits means slot 0.
    ///
    /// `storage.json` -> 0, `storage3.json` -> 2
    pub fn from_file_name(name: &str) -> Self {
        let digits: String = name
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match digits.parse::<u32>() {
            Ok(n) => Self(n.saturating_sub(1)),
            Err(_) => Self(0),
        }
    }
}

impl std::fmt::Display for ArchiveSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-profile secret taken from the save folder name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileKey(pub u64);

impl ProfileKey {
    pub fn low(self) -> u32 {
        self.0 as u32
    }

    pub fn high(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Parse the trailing `_<digits>` suffix of a save folder name.
    ///
    /// Only the last path component is considered; both separator styles are
    /// accepted. A folder without `_` is the default profile and has no key.
    pub fn from_folder_name(name: &str) -> Result<Option<Self>> {
        let trimmed = name.trim_end_matches(['/', '\\']);
        let folder = trimmed
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(trimmed);

        match folder.rsplit_once('_') {
            None => Ok(None),
            Some((_, suffix)) => suffix
                .parse::<u64>()
                .map(|key| Some(Self(key)))
                .map_err(|e| HgSaveError::InvalidProfileKey(format!("{:?}: {}", folder, e))),
        }
    }
}

impl std::str::FromStr for ProfileKey {
    type Err = HgSaveError;
    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| HgSaveError::InvalidProfileKey(format!("{:?}: {}", s, e)))
    }
}

/// XXTEA key schedule input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherKey(pub [u32; 4]);

impl CipherKey {
    pub fn words(&self) -> &[u32; 4] {
        &self.0
    }

    /// Little-endian key bytes; also the secret for chunk checksums
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

const KEY_ROTATE: u32 = 13;
const KEY_MULTIPLIER: u32 = 5;
const KEY_INCREMENT: u32 = 0xE654_6B64;

/// Derive the working key for one archive.
///
/// `config.base_key` must be 16 bytes (`FormatConfig::validate`); shorter
/// keys are zero-extended.
pub fn derive_key(slot: ArchiveSlot, profile_key: Option<ProfileKey>, config: &FormatConfig) -> CipherKey {
    let mut base = [0u8; FormatConfig::KEY_SIZE];
    let src = config.base_key.as_bytes();
    let n = src.len().min(base.len());
    base[..n].copy_from_slice(&src[..n]);

    let mut key = [0u32; 4];
    for (word, chunk) in key.iter_mut().zip(base.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let mix = match profile_key {
        None => config.default_mix,
        Some(pk) => config.profile_mix ^ pk.low() ^ pk.high(),
    };

    key[0] = (slot.index() ^ mix)
        .rotate_left(KEY_ROTATE)
        .wrapping_mul(KEY_MULTIPLIER)
        .wrapping_add(KEY_INCREMENT);

    if let Some(pk) = profile_key {
        key[1] ^= pk.low();
        key[2] ^= pk.high();
    }

    CipherKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let config = FormatConfig::default();
        let a = derive_key(ArchiveSlot(2), Some(ProfileKey(76561198000000000)), &config);
        let b = derive_key(ArchiveSlot(2), Some(ProfileKey(76561198000000000)), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_slot_zero_default_profile() {
        let config = FormatConfig::default();
        let key = derive_key(ArchiveSlot(0), None, &config);
        let expected0 = 0x1422_CB8Cu32
            .rotate_left(13)
            .wrapping_mul(5)
            .wrapping_add(0xE654_6B64);
        assert_eq!(key.0[0], expected0);
        // Remaining words are the base key untouched
        assert_eq!(key.0[1], u32::from_le_bytes(*b"EVAD"));
        assert_eq!(key.0[2], u32::from_le_bytes(*b"NAYR"));
        assert_eq!(key.0[3], u32::from_le_bytes(*b"TNRG"));
    }

    #[test]
    fn test_inputs_change_key() {
        let config = FormatConfig::default();
        let base = derive_key(ArchiveSlot(0), None, &config);
        assert_ne!(base, derive_key(ArchiveSlot(1), None, &config));
        assert_ne!(base, derive_key(ArchiveSlot(0), Some(ProfileKey(0)), &config));
        assert_ne!(
            derive_key(ArchiveSlot(0), Some(ProfileKey(1)), &config),
            derive_key(ArchiveSlot(0), Some(ProfileKey(2)), &config)
        );
    }

    #[test]
    fn test_key_bytes_little_endian() {
        let key = CipherKey([0x0403_0201, 0, 0, 0x1110_0F0E]);
        let bytes = key.to_bytes();
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
        assert_eq!(&bytes[12..], &[0x0E, 0x0F, 0x10, 0x11]);
    }

    #[test]
    fn test_profile_key_from_folder() {
        assert_eq!(ProfileKey::from_folder_name("DefaultUser").unwrap(), None);
        assert_eq!(
            ProfileKey::from_folder_name("st_76561198012345678").unwrap(),
            Some(ProfileKey(76561198012345678))
        );
        assert_eq!(
            ProfileKey::from_folder_name("C:\\Users\\me\\HelloGames\\NMS\\st_42").unwrap(),
            Some(ProfileKey(42))
        );
        assert_eq!(
            ProfileKey::from_folder_name("/saves/st_7/").unwrap(),
            Some(ProfileKey(7))
        );
        // underscores in parent directories do not count
        assert_eq!(ProfileKey::from_folder_name("/my_saves/DefaultUser").unwrap(), None);
    }

    #[test]
    fn test_profile_key_bad_suffix() {
        assert!(matches!(
            ProfileKey::from_folder_name("st_abc"),
            Err(HgSaveError::InvalidProfileKey(_))
        ));
        assert!(ProfileKey::from_folder_name("st_").is_err());
    }

    #[test]
    fn test_slot_from_file_name() {
        assert_eq!(ArchiveSlot::from_file_name("storage.json"), ArchiveSlot(0));
        assert_eq!(ArchiveSlot::from_file_name("storage3.json"), ArchiveSlot(2));
        assert_eq!(ArchiveSlot::from_file_name("storage10.hg"), ArchiveSlot(9));
        assert_eq!(ArchiveSlot::from_file_name("save0.json"), ArchiveSlot(0));
    }
}
