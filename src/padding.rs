use crate::error::{Error, Result};

/// Append PKCS#7 padding; a message already on a block boundary gains a full
/// extra block, so there is always at least one padding byte.
pub fn pkcs7_pad(bytes: &[u8], block_size: u8) -> Vec<u8> {
    debug_assert!(block_size > 0);
    let n_pad = block_size - (bytes.len() % block_size as usize) as u8;
    let mut padded = Vec::with_capacity(bytes.len() + n_pad as usize);
    padded.extend_from_slice(bytes);
    padded.resize(padded.len() + n_pad as usize, n_pad);
    padded
}

/// Validate and strip PKCS#7 padding in place.
pub fn pkcs7_unpad(bytes: &mut Vec<u8>, block_size: u8) -> Result<()> {
    let n_pad = padding_len(bytes, block_size)?;
    bytes.truncate(bytes.len() - n_pad as usize);
    Ok(())
}

fn padding_len(bytes: &[u8], block_size: u8) -> Result<u8> {
    if bytes.is_empty() {
        return Err(Error::Empty);
    }
    if bytes.len() % block_size as usize != 0 {
        return Err(Error::InvalidPadding);
    }
    let n_pad = bytes[bytes.len() - 1];
    if n_pad == 0 || n_pad > block_size {
        return Err(Error::InvalidPadding);
    }
    let tail = &bytes[bytes.len() - n_pad as usize..];
    if tail.iter().any(|&b| b != n_pad) {
        return Err(Error::InvalidPadding);
    }
    Ok(n_pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("YELL", 4, "YELL\x04\x04\x04\x04")]
    #[case("YELLOWS!!!", 6, "YELLOWS!!!\x02\x02")]
    #[case("YELLOW SUBMARINE", 20, "YELLOW SUBMARINE\x04\x04\x04\x04")]
    #[case("", 4, "\x04\x04\x04\x04")]
    fn pkcs7_pad_pads_message(#[case] msg: &str, #[case] block_size: u8, #[case] expected: &str) {
        let padded = pkcs7_pad(msg.as_bytes(), block_size);

        assert_eq!(padded, expected.as_bytes());
    }

    #[test]
    fn pkcs7_unpad_unpads_message() {
        let mut msg = b"ICE ICE BABY\x04\x04\x04\x04".to_vec();

        pkcs7_unpad(&mut msg, 16).unwrap();

        assert_eq!(msg, b"ICE ICE BABY");
    }

    #[test]
    fn pkcs7_unpad_removes_a_whole_padding_block() {
        let mut msg = pkcs7_pad(b"SIXTEEN BYTES!!!", 16);
        assert_eq!(msg.len(), 32);

        pkcs7_unpad(&mut msg, 16).unwrap();

        assert_eq!(msg, b"SIXTEEN BYTES!!!");
    }

    #[rstest]
    #[case("ICE ICE BABY\x05\x05\x05\x05")]
    #[case("ICE ICE BABY\x01\x02\x03\x04")]
    #[case("ICE ICE BABY BA\x00")]
    #[case("seventeen bytes!!")]
    fn pkcs7_unpad_returns_err_given_invalid_padding(#[case] padded: &str) {
        let mut msg = padded.as_bytes().to_vec();

        assert_eq!(pkcs7_unpad(&mut msg, 16), Err(Error::InvalidPadding));
    }

    #[test]
    fn pkcs7_unpad_returns_err_given_empty_input() {
        assert_eq!(pkcs7_unpad(&mut Vec::new(), 16), Err(Error::Empty));
    }
}
