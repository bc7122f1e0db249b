mod aes;
mod cbc;
mod detect;
mod ecb;
mod encoding;
mod english;
mod error;
mod modes;
mod oracle;
mod padding;
mod profile;
mod xor;
mod xor_break;

pub use aes::{Aes128, BLOCK_SIZE};
pub use cbc::{recover_cbc_plaintext, CbcPaddingOracle};
pub use detect::{classify_mode, detect_block_size, find_ecb_ciphertext, Mode, MysteryModeOracle};
pub use ecb::{find_prefix_alignment, recover_ecb_suffix, EcbSuffixOracle, PrefixAlignment};
pub use encoding::{base64_decode, base64_encode, bytes_to_hex, hex_to_base64, hex_to_bytes};
pub use english::score_english;
pub use error::{Error, Result};
pub use modes::{
    decrypt_aes_128_cbc, decrypt_aes_128_ecb, encrypt_aes_128_cbc, encrypt_aes_128_ecb,
};
pub use oracle::{random_bytes, random_bytes_vec, EncryptionOracle, PaddingOracle};
pub use padding::{pkcs7_pad, pkcs7_unpad};
pub use profile::{forge_admin_profile, ProfileOracle, UserProfile};
pub use xor::{hamming_distance, repeating_key_xor, xor_bytes, xor_with_byte};
pub use xor_break::{
    break_repeating_key_xor, break_single_byte_xor, CrackedRepeatingXor, CrackedXor,
};
