//! Payload masking per RFC 6455 Section 5.3.

/// XOR `data` in place with the 4-byte key, cycling through the key.
///
/// Masking is its own inverse: applying the same key twice restores the
/// original bytes. Works word-at-a-time where the slice allows it.
pub fn apply_mask(data: &mut [u8], key: [u8; 4]) {
    let key_word = u32::from_ne_bytes(key);
    let mut chunks = data.chunks_exact_mut(4);
    for chunk in &mut chunks {
        let word = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ key_word;
        chunk.copy_from_slice(&word.to_ne_bytes());
    }
    // Tail starts at a multiple of 4, so key alignment carries over.
    for (i, byte) in chunks.into_remainder().iter_mut().enumerate() {
        *byte ^= key[i];
    }
}
