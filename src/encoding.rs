use crate::error::{Error, Result};

const BASE64_CHARS: &[u8] =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/".as_bytes();

pub fn hex_to_base64(hex: &str) -> Result<String> {
    Ok(base64_encode(&hex_to_bytes(hex)?))
}

pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(Error::MismatchedLengths);
    }
    digits
        .chunks_exact(2)
        .map(|pair| Ok((hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?))
        .collect()
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_nibble(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(Error::NotFound),
    }
}

/// Encode bytes as base64, three input bytes per four output characters.
pub fn base64_encode(bytes: &[u8]) -> String {
    let mut b64 = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for group in bytes.chunks(3) {
        let mut word = 0u32;
        for (i, &byte) in group.iter().enumerate() {
            word |= (byte as u32) << (16 - 8 * i);
        }
        for i in 0..=group.len() {
            b64.push(BASE64_CHARS[(word >> (18 - 6 * i)) as usize & 0x3f] as char);
        }
        for _ in group.len()..3 {
            b64.push('=');
        }
    }
    b64
}

/// Decode base64, ignoring padding and embedded whitespace.
pub fn base64_decode(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(s.len() / 4 * 3);
    let mut word = 0u32;
    let mut n_chars = 0;
    for c in s.chars() {
        if c == '=' || c.is_ascii_whitespace() {
            continue;
        }
        word = (word << 6) | base64_index(c)? as u32;
        n_chars += 1;
        if n_chars == 4 {
            bytes.extend_from_slice(&[(word >> 16) as u8, (word >> 8) as u8, word as u8]);
            word = 0;
            n_chars = 0;
        }
    }
    match n_chars {
        0 => {}
        2 => bytes.push((word >> 4) as u8),
        3 => bytes.extend_from_slice(&[(word >> 10) as u8, (word >> 2) as u8]),
        _ => return Err(Error::MismatchedLengths),
    }
    Ok(bytes)
}

fn base64_index(c: char) -> Result<u8> {
    match c {
        'A'..='Z' => Ok(c as u8 - b'A'),
        'a'..='z' => Ok(c as u8 - b'a' + 26),
        '0'..='9' => Ok(c as u8 - b'0' + 52),
        '+' => Ok(62),
        '/' => Ok(63),
        _ => Err(Error::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn convert_hex_to_base64() {
        let hex = "49276d206b696c6c696e6720796f757220627261696e206c696b65206120706f69736f6e6f7573206d757368726f6f6d";

        assert_eq!(
            hex_to_base64(hex).unwrap(),
            "SSdtIGtpbGxpbmcgeW91ciBicmFpbiBsaWtlIGEgcG9pc29ub3VzIG11c2hyb29t"
        );
    }

    #[rstest]
    #[case("0A3F", &[0x0a, 0x3f])]
    #[case("0a3f", &[0x0a, 0x3f])]
    #[case("", &[])]
    fn hex_to_bytes_returns_expected_bytes(#[case] hex: &str, #[case] expected: &[u8]) {
        assert_eq!(hex_to_bytes(hex).unwrap(), expected);
    }

    #[test]
    fn hex_to_bytes_rejects_odd_length() {
        assert_eq!(hex_to_bytes("abc"), Err(Error::MismatchedLengths));
    }

    #[test]
    fn hex_to_bytes_rejects_non_hex_digit() {
        assert_eq!(hex_to_bytes("zz"), Err(Error::NotFound));
    }

    #[test]
    fn bytes_to_hex_round_trips() {
        let bytes: Vec<u8> = (0..=255).collect();

        assert_eq!(hex_to_bytes(&bytes_to_hex(&bytes)).unwrap(), bytes);
    }

    #[rstest]
    #[case(b"ABC", "QUJD")]
    #[case(&[66, 97, 115, 101, 54, 52], "QmFzZTY0")]
    #[case(&[79, 104, 32, 109, 121, 32, 103, 111, 115, 104], "T2ggbXkgZ29zaA==")]
    #[case(b"M", "TQ==")]
    #[case(b"", "")]
    fn base64_encode_returns_expected_string(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(base64_encode(bytes), expected);
    }

    #[rstest]
    #[case("QUJD", &"ABC".as_bytes())]
    #[case("QmFzZTY0", &[66, 97, 115, 101, 54, 52])]
    #[case("T2ggbXkgZ29zaA==", &[79, 104, 32, 109, 121, 32, 103, 111, 115, 104])]
    fn base64_decode_returns_expected_bytes(#[case] encoded: &str, #[case] expected: &[u8]) {
        let decoded = base64_decode(encoded).unwrap();

        assert_eq!(decoded, expected);
    }

    #[test]
    fn base64_decode_skips_embedded_newlines() {
        assert_eq!(base64_decode("QmFz\nZTY0").unwrap(), b"Base64");
    }

    #[test]
    fn base64_decode_rejects_unknown_char() {
        assert_eq!(base64_decode("QUJ*"), Err(Error::NotFound));
    }

    #[test]
    fn base64_round_trips_all_remainders() {
        for len in 0..8 {
            let bytes: Vec<u8> = (0..len).collect();

            assert_eq!(base64_decode(&base64_encode(&bytes)).unwrap(), bytes);
        }
    }
}
