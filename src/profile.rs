// ECB cut-and-paste: forging an admin profile from an encrypting oracle.
//
// ECB encrypts equal blocks to equal ciphertext, independent of position.
// Any block an attacker can get encrypted once can be stitched into another
// ciphertext, so a service that encodes a profile and ECB-encrypts it will
// happily mint role=admin tokens it never issued.

use std::collections::HashMap;
use std::fmt::Display;

use crate::aes::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::modes::{decrypt_aes_128_ecb, encrypt_aes_128_ecb};
use crate::oracle::random_bytes;
use crate::padding::pkcs7_pad;

#[derive(Debug, PartialEq, Eq)]
pub struct UserProfile {
    email: String,
    uid: u64,
    role: String,
}

impl UserProfile {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            email: email.to_string(),
            uid: 10,
            role: role.to_string(),
        }
    }

    /// Build the profile the service serves for an email address.
    ///
    /// Encoding metacharacters are stripped from the email rather than
    /// rejected, so "&role=admin" cannot be smuggled in directly.
    pub fn profile_for(email: &str) -> Self {
        let sanitized: String = email.chars().filter(|&c| c != '&' && c != '=').collect();
        Self::new(&sanitized, "user")
    }
}

impl Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "email={}&uid={}&role={}", self.email, self.uid, self.role)
    }
}

impl TryFrom<&str> for UserProfile {
    type Error = Error;

    fn try_from(encoded: &str) -> Result<Self> {
        let parsed = parse_query(encoded);
        Ok(Self {
            email: parsed.get("email").ok_or(Error::NotFound)?.clone(),
            uid: parsed
                .get("uid")
                .ok_or(Error::NotFound)?
                .parse()
                .map_err(|_| Error::NotFound)?,
            role: parsed.get("role").ok_or(Error::NotFound)?.clone(),
        })
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Test fixture: a service that hands out encrypted profiles for any email
/// and decrypts submitted ones, all under a key generated at construction.
pub struct ProfileOracle {
    key: [u8; 16],
}

impl ProfileOracle {
    pub fn new() -> Self {
        Self {
            key: random_bytes(),
        }
    }

    pub fn profile_for(&self, email: &str) -> Vec<u8> {
        let profile = UserProfile::profile_for(email);
        encrypt_aes_128_ecb(profile.to_string().as_bytes(), &self.key)
    }

    pub fn decrypt_profile(&self, ciphertext: &[u8]) -> Result<UserProfile> {
        let encoded = decrypt_aes_128_ecb(ciphertext, &self.key)?;
        UserProfile::try_from(String::from_utf8_lossy(&encoded).as_ref())
    }
}

impl Default for ProfileOracle {
    fn default() -> Self {
        Self::new()
    }
}

/// Forge a ciphertext that decrypts to an admin profile, using only the
/// profile-encrypting side of the oracle.
///
/// Returns the email the forged profile is registered under and the
/// ciphertext.
pub fn forge_admin_profile(oracle: &ProfileOracle) -> (String, Vec<u8>) {
    // A profile is laid out as email=<email>&uid=10&role=<role>. "email="
    // is six bytes, so ten more fill the first block, and an email whose
    // next sixteen bytes are a PKCS#7-padded "admin" hands us the
    // ciphertext block of a message-final "admin".
    let cut_email = [
        b"AAAAAAAAAA".to_vec(),
        pkcs7_pad(b"admin", BLOCK_SIZE as u8),
        b"@x.com".to_vec(),
    ]
    .concat();
    let cut = oracle.profile_for(&String::from_utf8_lossy(&cut_email));

    // A thirteen-byte email makes email=<email>&uid=10&role= fill two
    // blocks exactly, leaving the role value alone in the final block.
    let paste_email = "hacker@ex.com";
    let paste = oracle.profile_for(paste_email);

    let forged = [&paste[..2 * BLOCK_SIZE], &cut[BLOCK_SIZE..2 * BLOCK_SIZE]].concat();
    (paste_email.to_string(), forged)
}
