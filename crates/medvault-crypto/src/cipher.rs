//! AES-256-GCM encryption/decryption with a detached tag
//!
//! The nonce is drawn from `OsRng` inside [`encrypt`]; there is no way to pass
//! one in, so a caller cannot reuse a nonce under the same key. Associated data
//! is empty for documents today but is part of the signature.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::DerivedKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Output of a single AEAD pass
#[derive(Debug, Clone)]
pub struct SealedPayload {
    pub nonce: [u8; NONCE_SIZE],
    /// Same length as the plaintext
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> CryptoResult<SealedPayload> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, &mut buffer)
        .map_err(|e| {
            buffer.zeroize();
            CryptoError::Encryption(e.to_string())
        })?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(SealedPayload {
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate.
///
/// The tag is verified (in constant time) before any plaintext is produced;
/// on failure the scratch buffer is wiped and only `AuthenticationFailure`
/// is returned.
pub fn decrypt(
    key: &DerivedKey,
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "nonce is {} bytes (expected {NONCE_SIZE})",
            nonce.len()
        )));
    }
    if tag.len() != TAG_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "auth tag is {} bytes (expected {TAG_SIZE})",
            tag.len()
        )));
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let mut buffer = ciphertext.to_vec();

    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(nonce),
        aad,
        &mut buffer,
        Tag::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(CryptoError::AuthenticationFailure)
        }
    }
}
