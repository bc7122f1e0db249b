use std::ops::Range;

use rayon::prelude::*;

use crate::english::score_english;
use crate::error::{Error, Result};
use crate::xor::{hamming_distance, repeating_key_xor, xor_with_byte};

pub struct CrackedXor {
    pub key: u8,
    pub plaintext: Vec<u8>,
    pub score: f64,
}

pub struct CrackedRepeatingXor {
    pub key: Vec<u8>,
    pub plaintext: Vec<u8>,
}

/// Try every single-byte key and keep the most English-looking plaintext.
pub fn break_single_byte_xor(ciphertext: &[u8]) -> CrackedXor {
    (0..=255u8)
        .into_par_iter()
        .map(|key| {
            let plaintext = xor_with_byte(ciphertext, key);
            let score = score_english(&plaintext);
            CrackedXor { key, plaintext, score }
        })
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .expect("one candidate per key byte")
}

/// Break a repeating-key XOR cipher.
///
/// Candidate key sizes are ranked by the normalized Hamming distance between
/// consecutive key-sized ciphertext blocks; for each of the best three, the
/// ciphertext is transposed into one column per key byte and every column is
/// solved as a single-byte XOR cipher. The key whose plaintext scores most
/// English-like wins.
pub fn break_repeating_key_xor(
    ciphertext: &[u8],
    key_sizes: Range<usize>,
) -> Result<CrackedRepeatingXor> {
    if ciphertext.is_empty() {
        return Err(Error::Empty);
    }

    let mut best: Option<(f64, CrackedRepeatingXor)> = None;
    for key_size in ranked_key_sizes(ciphertext, key_sizes).into_iter().take(3) {
        let key: Vec<u8> = (0..key_size)
            .map(|column| {
                let column_bytes: Vec<u8> = ciphertext
                    .iter()
                    .skip(column)
                    .step_by(key_size)
                    .copied()
                    .collect();
                break_single_byte_xor(&column_bytes).key
            })
            .collect();
        let plaintext = repeating_key_xor(ciphertext, &key);
        let score = score_english(&plaintext);
        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, CrackedRepeatingXor { key, plaintext }));
        }
    }
    best.map(|(_, cracked)| cracked).ok_or(Error::NotFound)
}

fn ranked_key_sizes(ciphertext: &[u8], key_sizes: Range<usize>) -> Vec<usize> {
    let mut ranked: Vec<(f64, usize)> = key_sizes
        .filter(|&key_size| key_size > 0)
        .map(|key_size| (mean_block_distance(ciphertext, key_size), key_size))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked.into_iter().map(|(_, key_size)| key_size).collect()
}

/// Mean bitwise distance between consecutive key-sized blocks, normalized by
/// the key size. The true key size tends to minimize this, as blocks XORed
/// with the same key bytes keep the low distance of English-to-English text.
fn mean_block_distance(ciphertext: &[u8], key_size: usize) -> f64 {
    let blocks: Vec<&[u8]> = ciphertext.chunks_exact(key_size).take(5).collect();
    let mut total = 0u32;
    let mut n_pairs = 0u32;
    for pair in blocks.windows(2) {
        if let Ok(distance) = hamming_distance(pair[0], pair[1]) {
            total += distance;
            n_pairs += 1;
        }
    }
    if n_pairs == 0 {
        return f64::INFINITY;
    }
    f64::from(total) / f64::from(n_pairs) / key_size as f64
}
