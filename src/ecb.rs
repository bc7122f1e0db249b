// Byte-at-a-time ECB suffix recovery.
//
// The oracle encrypts prefix || attacker-input || suffix under a fixed key.
// Shortening the attacker input by one byte drags the first unknown suffix
// byte into the last position of an attacker-chosen block; encrypting that
// block with all 256 possible final bytes builds a lookup table that maps
// the observed ciphertext block back to the plaintext byte. Repeating the
// trick once per position walks the whole suffix out of the oracle.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, trace};

use crate::detect::{classify_mode, detect_block_size, Mode, PROBE_BYTE};
use crate::error::{Error, Result};
use crate::modes::encrypt_aes_128_ecb;
use crate::oracle::{random_bytes, random_bytes_vec, EncryptionOracle};

const MARKER_BYTE: u8 = b'B';
const CONFIRM_BYTE: u8 = b'C';

/// How attacker input lines up behind an oracle's hidden prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixAlignment {
    /// Bytes of filler needed to pad the hidden prefix out to a block
    /// boundary.
    pub filler_len: usize,
    /// Index of the first ciphertext block wholly under attacker control
    /// once `filler_len` bytes of filler are supplied.
    pub first_controlled_block: usize,
}

/// Find how many filler bytes push the oracle's hidden prefix up to a block
/// boundary, and which block attacker data then starts at.
pub fn find_prefix_alignment(oracle: &impl EncryptionOracle) -> Result<PrefixAlignment> {
    let block_size = detect_block_size(oracle)?;
    align_attacker_input(oracle, block_size)
}

fn align_attacker_input(
    oracle: &impl EncryptionOracle,
    block_size: usize,
) -> Result<PrefixAlignment> {
    // Blocks before the first one the attacker can influence are pure
    // prefix; a repeated run found there is prefix content, not alignment.
    let c0 = oracle.encrypt(b"0")?;
    let c1 = oracle.encrypt(b"1")?;
    let influence_start = c0
        .chunks(block_size)
        .zip(c1.chunks(block_size))
        .position(|(a, b)| a != b)
        .ok_or(Error::NotFound)?;

    for filler_len in 0..block_size {
        let first =
            marker_run_start(oracle, block_size, filler_len, influence_start, MARKER_BYTE)?;
        if let Some(run_start) = first {
            // A suffix that begins with marker bytes can complete a run the
            // probe only started. A genuine marker pair shows up again under
            // a different marker byte; a suffix-completed one cannot match
            // both.
            let confirmed =
                marker_run_start(oracle, block_size, filler_len, influence_start, CONFIRM_BYTE)?;
            if confirmed == Some(run_start) {
                debug!(
                    filler_len,
                    first_controlled_block = run_start,
                    "aligned attacker input past oracle prefix"
                );
                return Ok(PrefixAlignment {
                    filler_len,
                    first_controlled_block: run_start,
                });
            }
        }
    }
    Err(Error::NotFound)
}

/// Probe with filler plus two blocks of `marker` and look for the identical
/// adjacent ciphertext blocks the markers produce when the filler lands them
/// on a block boundary. The prefix ends inside the first influenced block,
/// so an aligned marker run starts there or one block later; pairs outside
/// that window are prefix or suffix content.
fn marker_run_start(
    oracle: &impl EncryptionOracle,
    block_size: usize,
    filler_len: usize,
    influence_start: usize,
    marker: u8,
) -> Result<Option<usize>> {
    let mut probe = vec![PROBE_BYTE; filler_len];
    probe.resize(filler_len + 2 * block_size, marker);
    let ciphertext = oracle.encrypt(&probe)?;
    let blocks: Vec<&[u8]> = ciphertext.chunks_exact(block_size).collect();
    if blocks.len() < 2 {
        return Ok(None);
    }
    let last_start = (influence_start + 1).min(blocks.len() - 2);
    Ok((influence_start..=last_start).find(|&i| blocks[i] == blocks[i + 1]))
}

/// Recover the secret suffix an ECB oracle appends to attacker input.
///
/// Returns exactly the suffix bytes; the oracle's padding is measured and
/// excluded rather than decoded as data.
pub fn recover_ecb_suffix(oracle: &impl EncryptionOracle) -> Result<Vec<u8>> {
    let block_size = detect_block_size(oracle)?;

    // Three blocks of identical probe guarantee two aligned identical
    // blocks behind any prefix offset; anything but ECB keeps them distinct.
    let mode_probe = oracle.encrypt(&vec![PROBE_BYTE; 3 * block_size])?;
    if classify_mode(&mode_probe, block_size) != Mode::Ecb {
        return Err(Error::NotFound);
    }

    let alignment = align_attacker_input(oracle, block_size)?;
    let controlled_start = alignment.first_controlled_block * block_size;
    let filler = vec![PROBE_BYTE; alignment.filler_len];

    // With the prefix padded out to a block boundary the ciphertext is the
    // prefix blocks, the suffix, and 1..=block_size bytes of padding. The
    // input length at which the output length jumps reveals the padding
    // length, and with it the exact suffix length.
    let base_len = oracle.encrypt(&filler)?.len();
    let mut padding_len = None;
    for extra in 1..=block_size {
        let probe = vec![PROBE_BYTE; alignment.filler_len + extra];
        if oracle.encrypt(&probe)?.len() > base_len {
            padding_len = Some(extra);
            break;
        }
    }
    let padding_len = padding_len.ok_or(Error::NotFound)?;
    let suffix_len = base_len - controlled_start - padding_len;
    debug!(block_size, suffix_len, "recovering ecb suffix");

    let mut recovered = Vec::with_capacity(suffix_len);
    for position in 0..suffix_len {
        let byte = recover_suffix_byte(oracle, &alignment, block_size, &recovered)?;
        trace!(position, byte, "recovered suffix byte");
        recovered.push(byte);
    }
    Ok(recovered)
}

/// Recover the next suffix byte after `recovered`.
///
/// Builds the guess table for the target position: for each candidate final
/// byte, the oracle encrypts filler || window || candidate, and the
/// ciphertext block those bytes land in is recorded. The short probe then
/// shifts the real suffix byte into the same in-block position and the
/// observed block is looked up. A missing entry means the oracle changed
/// its secret between calls.
fn recover_suffix_byte(
    oracle: &impl EncryptionOracle,
    alignment: &PrefixAlignment,
    block_size: usize,
    recovered: &[u8],
) -> Result<u8> {
    let position = recovered.len();
    let controlled_start = alignment.first_controlled_block * block_size;
    let filler = vec![PROBE_BYTE; alignment.filler_len];

    // The block_size - 1 bytes that precede the target byte once the short
    // probe shifts it to the end of a block.
    let pad_len = block_size - 1 - (position % block_size);
    let mut window = vec![PROBE_BYTE; pad_len];
    window.extend_from_slice(recovered);
    let window = &window[window.len() - (block_size - 1)..];

    let mut guesses: HashMap<Vec<u8>, u8> = HashMap::with_capacity(256);
    for candidate in 0..=255u8 {
        let probe = [filler.as_slice(), window, &[candidate]].concat();
        let ciphertext = oracle.encrypt(&probe)?;
        let block = ciphertext
            .get(controlled_start..controlled_start + block_size)
            .ok_or(Error::NotFound)?;
        guesses.insert(block.to_vec(), candidate);
    }
    debug_assert_eq!(guesses.len(), 256);

    let short_probe = vec![PROBE_BYTE; alignment.filler_len + pad_len];
    let ciphertext = oracle.encrypt(&short_probe)?;
    let target_block = alignment.first_controlled_block + position / block_size;
    let block = ciphertext
        .get(target_block * block_size..(target_block + 1) * block_size)
        .ok_or(Error::NotFound)?;
    guesses.get(block).copied().ok_or(Error::NotFound)
}

/// Test fixture: ECB-encrypts prefix || attacker-input || suffix under a
/// key generated at construction.
pub struct EcbSuffixOracle {
    key: [u8; 16],
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl EcbSuffixOracle {
    pub fn new(suffix: Vec<u8>) -> Self {
        Self::with_prefix(Vec::new(), suffix)
    }

    pub fn with_prefix(prefix: Vec<u8>, suffix: Vec<u8>) -> Self {
        Self {
            key: random_bytes(),
            prefix,
            suffix,
        }
    }

    pub fn with_random_prefix(suffix: Vec<u8>) -> Self {
        let prefix_len = rand::thread_rng().gen_range(1..=255);
        Self::with_prefix(random_bytes_vec(prefix_len), suffix)
    }
}

impl EncryptionOracle for EcbSuffixOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        let message = [self.prefix.as_slice(), input, &self.suffix].concat();
        Ok(encrypt_aes_128_ecb(&message, &self.key))
    }
}
