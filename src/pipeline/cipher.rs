//! XXTEA (corrected block TEA) over little-endian 32-bit words.
//!
//! Chunks are zero-padded to a multiple of the configured cipher block size
//! before encryption. The metadata records the unpadded length, so decode
//! truncates after decryption and checks that the padding is still zero.

use crate::error::{HgSaveError, Result};
use crate::keying::CipherKey;

const DELTA: u32 = 0x9E37_79B9;

#[inline]
fn mx(sum: u32, y: u32, z: u32, p: usize, e: usize, k: &[u32; 4]) -> u32 {
    (((z >> 5) ^ (y << 2)).wrapping_add((y >> 3) ^ (z << 4)))
        ^ ((sum ^ y).wrapping_add(k[(p & 3) ^ e] ^ z))
}

fn rounds(n: usize) -> u32 {
    6 + 52 / n as u32
}

/// Encrypt words in place. Fewer than two words are left untouched
pub fn xxtea_encrypt(v: &mut [u32], key: &CipherKey) {
    let n = v.len();
    if n < 2 {
        return;
    }
    let k = key.words();
    let mut sum = 0u32;
    let mut z = v[n - 1];
    for _ in 0..rounds(n) {
        sum = sum.wrapping_add(DELTA);
        let e = ((sum >> 2) & 3) as usize;
        for p in 0..n - 1 {
            let y = v[p + 1];
            v[p] = v[p].wrapping_add(mx(sum, y, z, p, e, k));
            z = v[p];
        }
        let y = v[0];
        v[n - 1] = v[n - 1].wrapping_add(mx(sum, y, z, n - 1, e, k));
        z = v[n - 1];
    }
}

/// Decrypt words in place. Fewer than two words are left untouched
pub fn xxtea_decrypt(v: &mut [u32], key: &CipherKey) {
    let n = v.len();
    if n < 2 {
        return;
    }
    let k = key.words();
    let mut sum = rounds(n).wrapping_mul(DELTA);
    let mut y = v[0];
    while sum != 0 {
        let e = ((sum >> 2) & 3) as usize;
        for p in (1..n).rev() {
            let z = v[p - 1];
            v[p] = v[p].wrapping_sub(mx(sum, y, z, p, e, k));
            y = v[p];
        }
        let z = v[n - 1];
        v[0] = v[0].wrapping_sub(mx(sum, y, z, 0, e, k));
        y = v[0];
        sum = sum.wrapping_sub(DELTA);
    }
}

/// Padded length: next multiple of `block_size`, never less than one block
pub fn padded_len(len: usize, block_size: usize) -> usize {
    len.div_ceil(block_size).max(1) * block_size
}

/// Zero-fill to the cipher block size
pub fn pad_to_block(data: &[u8], block_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(padded_len(data.len(), block_size));
    out.extend_from_slice(data);
    out.resize(padded_len(data.len(), block_size), 0);
    out
}

fn to_words(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn to_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * 4);
    for word in words {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

/// Encrypt a padded chunk. Length must be a multiple of 4
pub fn encrypt_chunk(padded: &[u8], key: &CipherKey) -> Vec<u8> {
    debug_assert_eq!(padded.len() % 4, 0);
    let mut words = to_words(padded);
    xxtea_encrypt(&mut words, key);
    to_bytes(&words)
}

/// Decrypt a stored chunk and strip its padding down to `compressed_len`.
///
/// Nonzero padding means the chunk was not produced with this key or
/// convention and is reported as an integrity failure.
pub fn decrypt_chunk(stored: &[u8], compressed_len: usize, key: &CipherKey) -> Result<Vec<u8>> {
    if stored.len() % 4 != 0 || compressed_len > stored.len() {
        return Err(HgSaveError::UnsupportedLayout(format!(
            "stored chunk of {} bytes cannot hold {} compressed bytes",
            stored.len(),
            compressed_len
        )));
    }
    let mut words = to_words(stored);
    xxtea_decrypt(&mut words, key);
    let mut plain = to_bytes(&words);
    if plain[compressed_len..].iter().any(|&b| b != 0) {
        return Err(HgSaveError::IntegrityMismatch(
            "nonzero cipher padding".into(),
        ));
    }
    plain.truncate(compressed_len);
    Ok(plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: CipherKey = CipherKey([0x0123_4567, 0x89AB_CDEF, 0xFEDC_BA98, 0x7654_3210]);

    #[test]
    fn test_words_roundtrip() {
        let original: Vec<u32> = (0..26).map(|i| i * 0x0101_0101).collect();
        let mut words = original.clone();
        xxtea_encrypt(&mut words, &KEY);
        assert_ne!(words, original);
        xxtea_decrypt(&mut words, &KEY);
        assert_eq!(words, original);
    }

    #[test]
    fn test_two_word_minimum() {
        let mut single = vec![0xDEAD_BEEF];
        xxtea_encrypt(&mut single, &KEY);
        assert_eq!(single, vec![0xDEAD_BEEF]);

        let mut pair = vec![1, 2];
        xxtea_encrypt(&mut pair, &KEY);
        assert_ne!(pair, vec![1, 2]);
        xxtea_decrypt(&mut pair, &KEY);
        assert_eq!(pair, vec![1, 2]);
    }

    #[test]
    fn test_every_word_depends_on_key() {
        let other = CipherKey([0x0123_4567, 0x89AB_CDEF, 0xFEDC_BA98, 0x7654_3211]);
        let mut a = vec![0u32; 8];
        let mut b = vec![0u32; 8];
        xxtea_encrypt(&mut a, &KEY);
        xxtea_encrypt(&mut b, &other);
        assert!(a.iter().zip(&b).all(|(x, y)| x != y));
    }

    #[test]
    fn test_padding() {
        assert_eq!(padded_len(0, 8), 8);
        assert_eq!(padded_len(1, 8), 8);
        assert_eq!(padded_len(8, 8), 8);
        assert_eq!(padded_len(9, 8), 16);

        let padded = pad_to_block(b"abc", 8);
        assert_eq!(padded, b"abc\0\0\0\0\0");
    }

    #[test]
    fn test_chunk_roundtrip() {
        let data = b"compressed chunk bytes, not aligned";
        let stored = encrypt_chunk(&pad_to_block(data, 8), &KEY);
        assert_eq!(stored.len(), padded_len(data.len(), 8));
        let plain = decrypt_chunk(&stored, data.len(), &KEY).unwrap();
        assert_eq!(plain, data);
    }

    #[test]
    fn test_wrong_key_trips_padding_check() {
        let data = b"abc";
        let stored = encrypt_chunk(&pad_to_block(data, 8), &KEY);
        let wrong = CipherKey([1, 2, 3, 4]);
        let err = decrypt_chunk(&stored, data.len(), &wrong).unwrap_err();
        assert!(matches!(err, HgSaveError::IntegrityMismatch(_)));
    }

    #[test]
    fn test_bad_stored_length() {
        assert!(matches!(
            decrypt_chunk(&[0u8; 6], 2, &KEY),
            Err(HgSaveError::UnsupportedLayout(_))
        ));
        assert!(matches!(
            decrypt_chunk(&[0u8; 8], 9, &KEY),
            Err(HgSaveError::UnsupportedLayout(_))
        ));
    }
}
