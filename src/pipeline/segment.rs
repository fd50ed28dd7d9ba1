/// Split a document into chunks of at most `max_chunk_size` bytes.
/// Every chunk but the last is full; an empty document yields one empty chunk
pub fn split_chunks(data: &[u8], max_chunk_size: usize) -> Vec<&[u8]> {
    if data.is_empty() || max_chunk_size == 0 {
        return vec![data];
    }
    data.chunks(max_chunk_size).collect()
}

/// Join decoded chunks back into the document
pub fn join_chunks(chunks: &[Vec<u8>]) -> Vec<u8> {
    let total = chunks.iter().map(Vec::len).sum();
    let mut result = Vec::with_capacity(total);
    for chunk in chunks {
        result.extend_from_slice(chunk);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact_fit() {
        let data = vec![1u8; 8192];
        let chunks = split_chunks(&data, 4096);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 4096));
    }

    #[test]
    fn test_split_remainder() {
        let data = vec![1u8; 5000];
        let chunks = split_chunks(&data, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    #[test]
    fn test_split_empty() {
        let chunks = split_chunks(&[], 4096);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
    }

    #[test]
    fn test_join_restores_order() {
        let original: Vec<u8> = (0..10000).map(|i| (i % 256) as u8).collect();
        let owned: Vec<Vec<u8>> = split_chunks(&original, 4096)
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();
        assert_eq!(join_chunks(&owned), original);
    }

    #[test]
    fn test_chunk_counts_at_boundaries() {
        for (size, expected) in [(0, 1), (1, 1), (4095, 1), (4096, 1), (4097, 2), (12288, 3), (12289, 4)] {
            assert_eq!(split_chunks(&vec![0u8; size], 4096).len(), expected, "size {}", size);
        }
    }
}
