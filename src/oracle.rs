use rand::RngCore;

use crate::error::Result;

/// A chosen-plaintext encryption capability under attack.
///
/// Implementors must hold their key and any hidden prefix/suffix fixed for
/// their whole lifetime; the attacks in this crate fail with
/// [`Error::NotFound`](crate::Error::NotFound) against oracles that rotate
/// secrets between calls.
pub trait EncryptionOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>>;
}

impl<F> EncryptionOracle for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>>,
{
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        self(input)
    }
}

/// A decryption capability that leaks a single bit: whether the decrypted
/// ciphertext carried valid PKCS#7 padding.
pub trait PaddingOracle {
    fn padding_valid(&self, ciphertext: &[u8]) -> bool;
}

impl<F> PaddingOracle for F
where
    F: Fn(&[u8]) -> bool,
{
    fn padding_valid(&self, ciphertext: &[u8]) -> bool {
        self(ciphertext)
    }
}

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

pub fn random_bytes_vec(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}
