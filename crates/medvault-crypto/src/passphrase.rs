//! Passphrase generation
//!
//! Two forms of high-entropy passphrase for users who do not want to pick
//! their own: a base64 string for storage in a password manager, and a
//! 24-word BIP-39 phrase a patient can write down. Neither is ever stored
//! by medvault.

use bip39::Mnemonic;
use medvault_core::encoding::base64_encode;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretString;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};

/// Generate 256 random bits, base64-encoded.
pub fn generate_secure_key() -> SecretString {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let encoded = base64_encode(&bytes);
    bytes.zeroize();
    SecretString::from(encoded)
}

/// Generate a 24-word BIP-39 recovery phrase (256 bits of entropy).
pub fn generate_recovery_phrase() -> CryptoResult<SecretString> {
    let mut entropy = [0u8; 32];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::InvalidInput(format!("BIP-39 mnemonic generation failed: {e}")));
    entropy.zeroize();

    Ok(SecretString::from(mnemonic?.to_string()))
}

/// Check that `words` is a valid BIP-39 phrase (word list and checksum), so a
/// mistyped recovery phrase is reported as such instead of as a wrong key.
pub fn validate_recovery_phrase(words: &str) -> CryptoResult<()> {
    words
        .parse::<Mnemonic>()
        .map(|_| ())
        .map_err(|e| CryptoError::InvalidInput(format!("invalid BIP-39 phrase: {e}")))
}
