//! Binary encoding helpers shared by the envelope, fingerprint, and ledger code.
//!
//! Hex is always lowercase on output. Base64 is the standard alphabet with
//! padding, matching what browser `btoa` produces for legacy envelopes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{MedvaultError, MedvaultResult};

/// Encode bytes as lowercase hex (no prefix).
pub fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string. Accepts either case; rejects odd lengths.
pub fn hex_decode(s: &str) -> MedvaultResult<Vec<u8>> {
    hex::decode(s).map_err(|e| MedvaultError::InvalidInput(format!("hex decode: {e}")))
}

/// Decode a hex string that must hold exactly `N` bytes.
pub fn hex_decode_array<const N: usize>(s: &str) -> MedvaultResult<[u8; N]> {
    let bytes = hex_decode(s)?;
    to_array(&bytes, "hex")
}

/// Encode bytes as standard padded base64.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard padded base64.
pub fn base64_decode(s: &str) -> MedvaultResult<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|e| MedvaultError::InvalidInput(format!("base64 decode: {e}")))
}

/// Decode base64 that must hold exactly `N` bytes.
pub fn base64_decode_array<const N: usize>(s: &str) -> MedvaultResult<[u8; N]> {
    let bytes = base64_decode(s)?;
    to_array(&bytes, "base64")
}

fn to_array<const N: usize>(bytes: &[u8], what: &str) -> MedvaultResult<[u8; N]> {
    bytes.try_into().map_err(|_| {
        MedvaultError::InvalidInput(format!(
            "{what} value has {} bytes (expected {N})",
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_lowercase() {
        assert_eq!(hex_encode(&[0xAB, 0xCD, 0x01]), "abcd01");
    }

    #[test]
    fn test_hex_decode_accepts_uppercase() {
        assert_eq!(hex_decode("ABCD01").unwrap(), vec![0xAB, 0xCD, 0x01]);
    }

    #[test]
    fn test_hex_decode_rejects_odd_length() {
        assert!(matches!(
            hex_decode("abc"),
            Err(MedvaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_hex_decode_array_length_checked() {
        let ok: [u8; 2] = hex_decode_array("beef").unwrap();
        assert_eq!(ok, [0xBE, 0xEF]);

        let err = hex_decode_array::<4>("beef").unwrap_err();
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn test_base64_matches_browser_btoa() {
        // btoa(String.fromCharCode(0, 1, 2, 253, 254, 255))
        assert_eq!(base64_encode(&[0, 1, 2, 253, 254, 255]), "AAEC/f7/");
        assert_eq!(base64_encode(b""), "");
    }

    #[test]
    fn test_base64_decode_array() {
        let salt: [u8; 16] = base64_decode_array("AAAAAAAAAAAAAAAAAAAAAA==").unwrap();
        assert_eq!(salt, [0u8; 16]);
        assert!(base64_decode_array::<12>("AAAAAAAAAAAAAAAAAAAAAA==").is_err());
    }

    #[test]
    fn test_base64_rejects_garbage() {
        assert!(base64_decode("not base64!").is_err());
    }
}
