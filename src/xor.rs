use crate::error::{Error, Result};

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>> {
    if buf_a.len() != buf_b.len() {
        return Err(Error::MismatchedLengths);
    }
    Ok(buf_a.iter().zip(buf_b).map(|(a, b)| a ^ b).collect())
}

pub fn xor_with_byte(bytes: &[u8], key: u8) -> Vec<u8> {
    bytes.iter().map(|b| b ^ key).collect()
}

/// XOR a message with a key cycled to the message's length.
pub fn repeating_key_xor(message: &[u8], key: &[u8]) -> Vec<u8> {
    debug_assert!(!key.is_empty());
    message
        .iter()
        .zip(key.iter().cycle())
        .map(|(m, k)| m ^ k)
        .collect()
}

/// Number of differing bits between two equal-length byte sequences.
pub fn hamming_distance(buf_a: &[u8], buf_b: &[u8]) -> Result<u32> {
    if buf_a.len() != buf_b.len() {
        return Err(Error::MismatchedLengths);
    }
    Ok(buf_a
        .iter()
        .zip(buf_b)
        .map(|(a, b)| (a ^ b).count_ones())
        .sum())
}
