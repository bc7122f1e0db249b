// ECB gives itself away through ciphertext shape alone: equal plaintext
// blocks map to equal ciphertext blocks, so a probe of repeated bytes
// collapses to repeated blocks, while CBC chaining keeps every block
// distinct.

use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::modes::{encrypt_aes_128_cbc, encrypt_aes_128_ecb};
use crate::oracle::{random_bytes, random_bytes_vec, EncryptionOracle};
use crate::xor::hamming_distance;

pub(crate) const PROBE_BYTE: u8 = b'A';

/// Longest probe grown while waiting for the oracle's output length to jump.
const MAX_PROBE_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Unknown,
    Ecb,
    Cbc,
}

/// Infer the oracle's block size from the first jump in ciphertext length as
/// the probe grows one byte at a time.
pub fn detect_block_size(oracle: &impl EncryptionOracle) -> Result<usize> {
    let base_len = oracle.encrypt(&[])?.len();
    for n in 1..=MAX_PROBE_LEN {
        let len = oracle.encrypt(&vec![PROBE_BYTE; n])?.len();
        if len > base_len {
            let block_size = len - base_len;
            debug!(block_size, "detected oracle block size");
            return Ok(block_size);
        }
    }
    Err(Error::NotFound)
}

/// Classify a ciphertext as ECB or CBC from block repetition.
///
/// Only meaningful when the encrypted plaintext contained at least two
/// block's worth of identical bytes; returns [`Mode::Unknown`] when the
/// ciphertext holds fewer than two full blocks.
pub fn classify_mode(ciphertext: &[u8], block_size: usize) -> Mode {
    match min_pairwise_block_distance(ciphertext, block_size) {
        Some(0) => Mode::Ecb,
        Some(_) => Mode::Cbc,
        None => Mode::Unknown,
    }
}

/// Smallest Hamming distance over all pairs of distinct full blocks, or
/// `None` when there are fewer than two. A repeated plaintext block drives
/// this to zero under ECB.
fn min_pairwise_block_distance(ciphertext: &[u8], block_size: usize) -> Option<u32> {
    if block_size == 0 {
        return None;
    }
    let blocks: Vec<&[u8]> = ciphertext.chunks_exact(block_size).collect();
    let mut min_distance = None;
    for (i, block_a) in blocks.iter().enumerate() {
        for block_b in &blocks[i + 1..] {
            if let Ok(distance) = hamming_distance(block_a, block_b) {
                if min_distance.map_or(true, |min| distance < min) {
                    min_distance = Some(distance);
                }
            }
        }
    }
    min_distance
}

/// Pick, out of several ciphertexts, the one most likely to be
/// ECB-encrypted: the one whose blocks lie closest together.
pub fn find_ecb_ciphertext(candidates: &[Vec<u8>], block_size: usize) -> Result<usize> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(i, ct)| min_pairwise_block_distance(ct, block_size).map(|d| (d, i)))
        .min_by_key(|&(distance, _)| distance)
        .map(|(_, i)| i)
        .ok_or(Error::Empty)
}

/// Test fixture: encrypts under a coin-flip mode with a key picked at
/// construction, wrapping the input in 5 to 10 bytes of random junk on each
/// side.
pub struct MysteryModeOracle {
    key: [u8; 16],
    mode: Mode,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl MysteryModeOracle {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let mode = if rng.gen() { Mode::Ecb } else { Mode::Cbc };
        Self {
            key: random_bytes(),
            mode,
            prefix: random_bytes_vec(rng.gen_range(5..=10)),
            suffix: random_bytes_vec(rng.gen_range(5..=10)),
        }
    }

    /// The mode picked at construction, for checking a classification.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Default for MysteryModeOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionOracle for MysteryModeOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        let message = [self.prefix.as_slice(), input, &self.suffix].concat();
        match self.mode {
            Mode::Ecb => Ok(encrypt_aes_128_ecb(&message, &self.key)),
            _ => Ok(encrypt_aes_128_cbc(&message, &self.key, &random_bytes())),
        }
    }
}
