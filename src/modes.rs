use crate::aes::{Aes128, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::padding::{pkcs7_pad, pkcs7_unpad};

pub fn encrypt_aes_128_ecb(plaintext: &[u8], key: &[u8; 16]) -> Vec<u8> {
    let cipher = Aes128::new(key);
    let padded = pkcs7_pad(plaintext, BLOCK_SIZE as u8);
    let mut ciphertext = Vec::with_capacity(padded.len());
    for block in padded.chunks_exact(BLOCK_SIZE) {
        let block: [u8; 16] = block.try_into().unwrap();
        ciphertext.extend_from_slice(&cipher.encrypt_block(&block));
    }
    ciphertext
}

pub fn decrypt_aes_128_ecb(ciphertext: &[u8], key: &[u8; 16]) -> Result<Vec<u8>> {
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::MismatchedLengths);
    }
    let cipher = Aes128::new(key);
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for block in ciphertext.chunks_exact(BLOCK_SIZE) {
        let block: [u8; 16] = block.try_into().unwrap();
        plaintext.extend_from_slice(&cipher.decrypt_block(&block));
    }
    pkcs7_unpad(&mut plaintext, BLOCK_SIZE as u8)?;
    Ok(plaintext)
}

pub fn encrypt_aes_128_cbc(plaintext: &[u8], key: &[u8; 16], iv: &[u8; 16]) -> Vec<u8> {
    let cipher = Aes128::new(key);
    let padded = pkcs7_pad(plaintext, BLOCK_SIZE as u8);
    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut last_block = *iv;
    for block in padded.chunks_exact(BLOCK_SIZE) {
        let mut block: [u8; 16] = block.try_into().unwrap();
        xor_into(&mut block, &last_block);
        last_block = cipher.encrypt_block(&block);
        ciphertext.extend_from_slice(&last_block);
    }
    ciphertext
}

pub fn decrypt_aes_128_cbc(ciphertext: &[u8], key: &[u8; 16], iv: &[u8; 16]) -> Result<Vec<u8>> {
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::MismatchedLengths);
    }
    let cipher = Aes128::new(key);
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    let mut last_block = *iv;
    for block in ciphertext.chunks_exact(BLOCK_SIZE) {
        let block: [u8; 16] = block.try_into().unwrap();
        let mut decrypted = cipher.decrypt_block(&block);
        xor_into(&mut decrypted, &last_block);
        plaintext.extend_from_slice(&decrypted);
        last_block = block;
    }
    pkcs7_unpad(&mut plaintext, BLOCK_SIZE as u8)?;
    Ok(plaintext)
}

fn xor_into(block: &mut [u8; 16], other: &[u8; 16]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::encoding::hex_to_bytes;

    const KEY: &[u8; 16] = b"YELLOW SUBMARINE";
    const IV: &[u8; 16] = &[0u8; 16];

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(15)]
    #[case(16)]
    #[case(17)]
    fn ecb_round_trips_across_block_boundaries(#[case] len: usize) {
        let plaintext: Vec<u8> = (0..len as u8).collect();

        let ciphertext = encrypt_aes_128_ecb(&plaintext, KEY);
        let round_trip = decrypt_aes_128_ecb(&ciphertext, KEY).unwrap();

        assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);
        assert!(ciphertext.len() > plaintext.len());
        assert_eq!(round_trip, plaintext);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(15)]
    #[case(16)]
    #[case(17)]
    fn cbc_round_trips_across_block_boundaries(#[case] len: usize) {
        let plaintext: Vec<u8> = (0..len as u8).collect();

        let ciphertext = encrypt_aes_128_cbc(&plaintext, KEY, IV);
        let round_trip = decrypt_aes_128_cbc(&ciphertext, KEY, IV).unwrap();

        assert_eq!(round_trip, plaintext);
    }

    #[test]
    fn ecb_repeats_ciphertext_blocks_for_repeated_plaintext_blocks() {
        let ciphertext = encrypt_aes_128_ecb(&[b'A'; 32], KEY);

        assert_eq!(ciphertext[..16], ciphertext[16..32]);
    }

    #[test]
    fn cbc_hides_repeated_plaintext_blocks() {
        let ciphertext = encrypt_aes_128_cbc(&[b'A'; 32], KEY, IV);

        assert_ne!(ciphertext[..16], ciphertext[16..32]);
    }

    #[test]
    fn cbc_encrypt_matches_known_vector() {
        let key: [u8; 16] = hex_to_bytes("6368616e676520746869732070617373")
            .unwrap()
            .try_into()
            .unwrap();

        let ciphertext = encrypt_aes_128_cbc(b"exampleplaintext", &key, IV);

        // First block of the ciphertext is independent of the padding that
        // fills the second.
        assert_eq!(ciphertext.len(), 32);
        assert_eq!(
            ciphertext[..16],
            hex_to_bytes("f42512e1e4039213bd449ba47faa1b74").unwrap()
        );
    }

    #[test]
    fn decrypt_rejects_ragged_ciphertext() {
        let ciphertext = encrypt_aes_128_ecb(b"hello", KEY);

        assert_eq!(
            decrypt_aes_128_ecb(&ciphertext[..15], KEY),
            Err(Error::MismatchedLengths)
        );
        assert_eq!(
            decrypt_aes_128_cbc(&ciphertext[..15], KEY, IV),
            Err(Error::MismatchedLengths)
        );
    }

    #[test]
    fn decrypt_rejects_ciphertext_missing_its_padding_block() {
        let ciphertext = encrypt_aes_128_cbc(b"exampleplaintext", KEY, IV);

        // Without the final block the last plaintext byte is 't', which is
        // not valid padding.
        assert_eq!(
            decrypt_aes_128_cbc(&ciphertext[..16], KEY, IV),
            Err(Error::InvalidPadding)
        );
    }
}
