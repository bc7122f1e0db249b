// CBC padding oracle attack.
//
// CBC decryption computes P_i = D(C_i) XOR C_{i-1}. An attacker who can
// submit ciphertexts and learn only whether the result was well padded can
// recover D(C_i) one byte at a time, and with it P_i.
//
// Prepend a chosen block F to the target block and feed F || C_i to the
// oracle. The final plaintext block of that message is D(C_i) XOR F.
// Varying the last byte of F until the oracle reports valid padding pins
// the last byte of D(C_i): valid padding almost always means the decryption
// ended in \x01, so D(C_i)[15] = F[15] XOR 1. Forcing the now-known tail to
// \x02 and scanning the next position pins D(C_i)[14], and so on back
// through the block. No key material is touched at any point.

use tracing::debug;

use crate::error::{Error, Result};
use crate::modes::{decrypt_aes_128_cbc, encrypt_aes_128_cbc};
use crate::oracle::{random_bytes, PaddingOracle};

/// Recover the plaintext of a CBC ciphertext from a padding oracle alone.
///
/// The returned plaintext still carries its PKCS#7 padding; strip it with
/// [`pkcs7_unpad`](crate::pkcs7_unpad) once recovered.
pub fn recover_cbc_plaintext(
    ciphertext: &[u8],
    iv: &[u8],
    block_size: usize,
    oracle: &impl PaddingOracle,
) -> Result<Vec<u8>> {
    debug_assert!(block_size > 0);
    if ciphertext.is_empty() {
        return Err(Error::Empty);
    }
    if iv.len() != block_size || ciphertext.len() % block_size != 0 {
        return Err(Error::MismatchedLengths);
    }

    let blocks: Vec<&[u8]> = std::iter::once(iv)
        .chain(ciphertext.chunks(block_size))
        .collect();
    debug!(blocks = blocks.len() - 1, "running cbc padding oracle attack");

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for (block_idx, window) in blocks.windows(2).enumerate() {
        let block = recover_block(window[0], window[1], oracle)?;
        debug!(block = block_idx, "recovered cbc block");
        plaintext.extend(block);
    }
    Ok(plaintext)
}

fn recover_block(prev: &[u8], target: &[u8], oracle: &impl PaddingOracle) -> Result<Vec<u8>> {
    let block_size = prev.len();
    let mut intermediate = vec![0u8; block_size];
    for padding_len in 1..=block_size {
        let position = block_size - padding_len;
        intermediate[position] =
            recover_intermediate_byte(prev, target, &intermediate, padding_len, oracle)?;
    }
    Ok(intermediate.iter().zip(prev).map(|(i, p)| i ^ p).collect())
}

/// Recover the intermediate byte at distance `padding_len` from the block
/// end, given the intermediate bytes after it.
fn recover_intermediate_byte(
    prev: &[u8],
    target: &[u8],
    intermediate: &[u8],
    padding_len: usize,
    oracle: &impl PaddingOracle,
) -> Result<u8> {
    let block_size = prev.len();
    let position = block_size - padding_len;
    let pad_byte = padding_len as u8;

    let mut forced = prev.to_vec();
    for j in position + 1..block_size {
        forced[j] = intermediate[j] ^ pad_byte;
    }

    if padding_len > 1 {
        // The forced tail pins every byte after `position` to the padding
        // value, so exactly one candidate can complete it.
        for candidate in 0..=255u8 {
            forced[position] = candidate;
            if oracle.padding_valid(&[forced.as_slice(), target].concat()) {
                return Ok(candidate ^ pad_byte);
            }
        }
        return Err(Error::NotFound);
    }

    // With no forced tail the oracle may accept a candidate because the
    // block's real plaintext happens to continue a longer padding run, not
    // because the final byte became \x01.
    let mut candidates = Vec::new();
    for candidate in 0..=255u8 {
        forced[position] = candidate;
        if oracle.padding_valid(&[forced.as_slice(), target].concat()) {
            candidates.push(candidate);
        }
    }
    match candidates.as_slice() {
        [] => Err(Error::NotFound),
        [only] => Ok(only ^ pad_byte),
        _ => Ok(disambiguate_final_byte(prev, target, &candidates, oracle)? ^ pad_byte),
    }
}

/// Pick, among final-byte candidates that all produced valid padding, the
/// one whose implied intermediate byte holds up under a forced padding of
/// two.
///
/// Re-force the last byte from the candidate's implied intermediate so the
/// decryption ends in \x02, then scan the second-to-last position. The
/// right candidate admits exactly one accepting value there. A coincidental
/// one admits every value (its re-forced last byte lands back on \x01) or
/// none at all.
fn disambiguate_final_byte(
    prev: &[u8],
    target: &[u8],
    candidates: &[u8],
    oracle: &impl PaddingOracle,
) -> Result<u8> {
    let block_size = prev.len();
    for &candidate in candidates {
        let claimed_intermediate = candidate ^ 1;
        let mut forced = prev.to_vec();
        forced[block_size - 1] = claimed_intermediate ^ 2;

        let mut accepted = 0;
        for probe in 0..=255u8 {
            forced[block_size - 2] = probe;
            if oracle.padding_valid(&[forced.as_slice(), target].concat()) {
                accepted += 1;
                if accepted > 1 {
                    break;
                }
            }
        }
        if accepted == 1 {
            return Ok(candidate);
        }
    }
    Err(Error::NotFound)
}

/// Test fixture: answers whether a ciphertext decrypts to validly padded
/// plaintext under a key and IV generated at construction.
pub struct CbcPaddingOracle {
    key: [u8; 16],
    iv: [u8; 16],
}

impl CbcPaddingOracle {
    pub fn new() -> Self {
        Self {
            key: random_bytes(),
            iv: random_bytes(),
        }
    }

    pub fn iv(&self) -> &[u8; 16] {
        &self.iv
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        encrypt_aes_128_cbc(plaintext, &self.key, &self.iv)
    }
}

impl Default for CbcPaddingOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl PaddingOracle for CbcPaddingOracle {
    fn padding_valid(&self, ciphertext: &[u8]) -> bool {
        decrypt_aes_128_cbc(ciphertext, &self.key, &self.iv).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::encoding::base64_decode;
    use crate::padding::pkcs7_unpad;

    const VERSES: [&str; 10] = [
        "MDAwMDAwTm93IHRoYXQgdGhlIHBhcnR5IGlzIGp1bXBpbmc=",
        "MDAwMDAxV2l0aCB0aGUgYmFzcyBraWNrZWQgaW4gYW5kIHRoZSBWZWdhJ3MgYXJlIHB1bXBpbic=",
        "MDAwMDAyUXVpY2sgdG8gdGhlIHBvaW50LCB0byB0aGUgcG9pbnQsIG5vIGZha2luZw==",
        "MDAwMDAzQ29va2luZyBNQydzIGxpa2UgYSBwb3VuZCBvZiBiYWNvbg==",
        "MDAwMDA0QnVybmluZyAnZW0sIGlmIHlvdSBhaW4ndCBxdWljayBhbmQgbmltYmxl",
        "MDAwMDA1SSBnbyBjcmF6eSB3aGVuIEkgaGVhciBhIGN5bWJhbA==",
        "MDAwMDA2QW5kIGEgaGlnaCBoYXQgd2l0aCBhIHNvdXBlZCB1cCB0ZW1wbw==",
        "MDAwMDA3SSdtIG9uIGEgcm9sbCwgaXQncyB0aW1lIHRvIGdvIHNvbG8=",
        "MDAwMDA4b2xsaW4nIGluIG15IGZpdmUgcG9pbnQgb2g=",
        "MDAwMDA5aXRoIG15IHJhZy10b3AgZG93biBzbyBteSBoYWlyIGNhbiBibG93",
    ];

    #[test]
    fn attack_recovers_every_verse() {
        for encoded in VERSES {
            let plaintext = base64_decode(encoded).unwrap();
            let oracle = CbcPaddingOracle::new();
            let ciphertext = oracle.encrypt(&plaintext);

            let mut recovered =
                recover_cbc_plaintext(&ciphertext, oracle.iv(), 16, &oracle).unwrap();
            pkcs7_unpad(&mut recovered, 16).unwrap();

            assert_eq!(
                String::from_utf8_lossy(&recovered),
                String::from_utf8_lossy(&plaintext)
            );
        }
    }

    #[test]
    fn recovered_plaintext_retains_its_padding() {
        let plaintext = b"exactly sixteen.";
        let oracle = CbcPaddingOracle::new();
        let ciphertext = oracle.encrypt(plaintext);

        let recovered = recover_cbc_plaintext(&ciphertext, oracle.iv(), 16, &oracle).unwrap();

        assert_eq!(recovered[..16], *plaintext);
        assert_eq!(recovered[16..], [16u8; 16]);
    }

    #[test]
    fn attack_resolves_an_ambiguous_final_byte() {
        // A \x02 in the second-to-last position makes two final-byte
        // candidates accept during the last scan of the first block.
        let mut plaintext = *b"YELLOW SUBMARINE";
        plaintext[14] = 0x02;
        let oracle = CbcPaddingOracle::new();
        let ciphertext = oracle.encrypt(&plaintext);

        let recovered = recover_cbc_plaintext(&ciphertext, oracle.iv(), 16, &oracle).unwrap();

        assert_eq!(recovered[..16], plaintext);
    }

    #[test]
    fn attack_resolves_a_longer_ambiguous_run() {
        let mut plaintext = *b"YELLOW SUBMARINE";
        plaintext[13] = 0x03;
        plaintext[14] = 0x03;
        let oracle = CbcPaddingOracle::new();
        let ciphertext = oracle.encrypt(&plaintext);

        let recovered = recover_cbc_plaintext(&ciphertext, oracle.iv(), 16, &oracle).unwrap();

        assert_eq!(recovered[..16], plaintext);
    }

    #[test]
    fn attack_gives_up_on_an_unhelpful_oracle() {
        let oracle = |_: &[u8]| false;

        assert_eq!(
            recover_cbc_plaintext(&[0; 32], &[0; 16], 16, &oracle),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn attack_rejects_malformed_inputs() {
        let oracle = |_: &[u8]| true;

        assert_eq!(
            recover_cbc_plaintext(&[], &[0; 16], 16, &oracle),
            Err(Error::Empty)
        );
        assert_eq!(
            recover_cbc_plaintext(&[0; 20], &[0; 16], 16, &oracle),
            Err(Error::MismatchedLengths)
        );
        assert_eq!(
            recover_cbc_plaintext(&[0; 32], &[0; 15], 16, &oracle),
            Err(Error::MismatchedLengths)
        );
    }
}
