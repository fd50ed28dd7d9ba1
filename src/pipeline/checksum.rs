use crate::header::HashAlgorithm;
use crate::metadata::{CHECKSUM_SIZE, DIGEST_SIZE};
use digest::Digest;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sha3::Sha3_256;

type HmacSha3_256 = Hmac<Sha3_256>;
type HmacSha256 = Hmac<Sha256>;

/// Keyed checksum of one chunk's on-disk bytes.
///
/// The secret is the archive's cipher key, so a chunk checked under the wrong
/// slot or profile key fails here before decryption is attempted.
pub fn chunk_checksum(data: &[u8], secret: &[u8], algorithm: HashAlgorithm) -> [u8; CHECKSUM_SIZE] {
    match algorithm {
        HashAlgorithm::Blake3 => {
            let key = derive_blake3_key(secret);
            truncate(blake3::keyed_hash(&key, data).as_bytes())
        }
        HashAlgorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
            mac.update(data);
            truncate(&mac.finalize().into_bytes())
        }
        HashAlgorithm::Sha3 => {
            let mut mac =
                HmacSha3_256::new_from_slice(secret).expect("HMAC can take key of any size");
            mac.update(data);
            truncate(&mac.finalize().into_bytes())
        }
    }
}

/// Compare a stored checksum in constant time
pub fn verify_chunk_checksum(
    data: &[u8],
    secret: &[u8],
    algorithm: HashAlgorithm,
    expected: &[u8; CHECKSUM_SIZE],
) -> bool {
    let actual = chunk_checksum(data, secret, algorithm);
    actual
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Unkeyed SHA-256 over the whole payload file
pub fn payload_digest(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Derive a 32-byte key for BLAKE3 from the cipher key bytes
fn derive_blake3_key(secret: &[u8]) -> [u8; 32] {
    *blake3::hash(secret).as_bytes()
}

fn truncate(mac: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&mac[..CHECKSUM_SIZE]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HashAlgorithm; 3] = [HashAlgorithm::Blake3, HashAlgorithm::Sha256, HashAlgorithm::Sha3];

    #[test]
    fn test_checksum_is_deterministic() {
        for alg in ALL {
            let a = chunk_checksum(b"chunk", b"0123456789abcdef", alg);
            let b = chunk_checksum(b"chunk", b"0123456789abcdef", alg);
            assert_eq!(a, b);
            assert!(verify_chunk_checksum(b"chunk", b"0123456789abcdef", alg, &a));
        }
    }

    #[test]
    fn test_checksum_depends_on_key_and_data() {
        for alg in ALL {
            let base = chunk_checksum(b"chunk", b"0123456789abcdef", alg);
            assert_ne!(base, chunk_checksum(b"chunk", b"0123456789abcdeF", alg));
            assert_ne!(base, chunk_checksum(b"chunK", b"0123456789abcdef", alg));
            assert!(!verify_chunk_checksum(b"chunK", b"0123456789abcdef", alg, &base));
        }
    }

    #[test]
    fn test_algorithms_differ() {
        let blake = chunk_checksum(b"x", b"k", HashAlgorithm::Blake3);
        let sha = chunk_checksum(b"x", b"k", HashAlgorithm::Sha256);
        let sha3 = chunk_checksum(b"x", b"k", HashAlgorithm::Sha3);
        assert_ne!(blake, sha);
        assert_ne!(sha, sha3);
    }

    #[test]
    fn test_payload_digest_known_value() {
        // SHA-256("abc")
        assert_eq!(
            hex::encode(payload_digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
