//! Encrypted document envelope
//!
//! Binary layout (fixed order, no length prefixes):
//! ```text
//! [16 bytes: KDF salt][12 bytes: AES-GCM nonce][N bytes: ciphertext][16 bytes: tag]
//! ```
//! N equals the plaintext length, so the smallest valid envelope (empty
//! document) is 44 bytes.
//!
//! The JSON form mirrors the legacy web client record:
//! `{"encryptedContent", "iv", "salt", "authTag"}`, each standard base64.

use medvault_core::encoding::{base64_decode, base64_encode};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::cipher::{decrypt, encrypt};
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, KdfParams};
use crate::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Associated data bound into every document envelope
const ENVELOPE_AAD: &[u8] = b"";

/// One encrypted document. Immutable: every field is fixed at construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnvelopeJson", into = "EnvelopeJson")]
pub struct EncryptedEnvelope {
    salt: [u8; SALT_SIZE],
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_SIZE],
}

impl EncryptedEnvelope {
    /// Length of an envelope holding an empty document
    pub const MIN_ENCODED_LEN: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;

    /// Encrypt `plaintext` under a key derived from `passphrase` and a fresh
    /// random salt. The derived key is wiped before returning.
    pub fn seal(
        plaintext: &[u8],
        passphrase: &SecretString,
        params: &KdfParams,
    ) -> CryptoResult<Self> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let key = derive_key(passphrase, &salt, params)?;
        let sealed = encrypt(&key, plaintext, ENVELOPE_AAD)?;

        tracing::debug!(bytes = plaintext.len(), kdf = params.name(), "sealed envelope");
        Ok(Self {
            salt,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
            tag: sealed.tag,
        })
    }

    /// Re-derive the key from the stored salt and decrypt.
    ///
    /// Fails with `AuthenticationFailure` for a wrong passphrase, wrong KDF
    /// parameters, or any modification of the envelope.
    pub fn open(&self, passphrase: &SecretString, params: &KdfParams) -> CryptoResult<Vec<u8>> {
        let key = derive_key(passphrase, &self.salt, params)?;
        decrypt(&key, &self.nonce, &self.ciphertext, &self.tag, ENVELOPE_AAD)
    }

    /// Assemble an envelope from separately stored fields, checking lengths.
    pub fn from_parts(
        salt: &[u8],
        nonce: &[u8],
        ciphertext: Vec<u8>,
        tag: &[u8],
    ) -> CryptoResult<Self> {
        Ok(Self {
            salt: fixed(salt, "salt")?,
            nonce: fixed(nonce, "nonce")?,
            ciphertext,
            tag: fixed(tag, "auth tag")?,
        })
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8; TAG_SIZE] {
        &self.tag
    }

    /// Serialize to the binary layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::MIN_ENCODED_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse the binary layout
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        if data.len() < Self::MIN_ENCODED_LEN {
            return Err(CryptoError::InvalidInput(format!(
                "envelope too short: {} bytes (minimum {})",
                data.len(),
                Self::MIN_ENCODED_LEN
            )));
        }
        let (salt, rest) = data.split_at(SALT_SIZE);
        let (nonce, rest) = rest.split_at(NONCE_SIZE);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);
        Self::from_parts(salt, nonce, ciphertext.to_vec(), tag)
    }
}

impl std::fmt::Debug for EncryptedEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedEnvelope")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> CryptoResult<[u8; N]> {
    bytes.try_into().map_err(|_| {
        CryptoError::InvalidInput(format!("{what} is {} bytes (expected {N})", bytes.len()))
    })
}

/// Legacy JSON representation
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeJson {
    encrypted_content: String,
    iv: String,
    salt: String,
    auth_tag: String,
}

impl From<EncryptedEnvelope> for EnvelopeJson {
    fn from(env: EncryptedEnvelope) -> Self {
        Self {
            encrypted_content: base64_encode(&env.ciphertext),
            iv: base64_encode(&env.nonce),
            salt: base64_encode(&env.salt),
            auth_tag: base64_encode(&env.tag),
        }
    }
}

impl TryFrom<EnvelopeJson> for EncryptedEnvelope {
    type Error = CryptoError;

    fn try_from(json: EnvelopeJson) -> CryptoResult<Self> {
        Self::from_parts(
            &base64_decode(&json.salt)?,
            &base64_decode(&json.iv)?,
            base64_decode(&json.encrypted_content)?,
            &base64_decode(&json.auth_tag)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FAST: KdfParams = KdfParams::Pbkdf2Sha256 { iterations: 1_000 };

    fn pw(s: &str) -> SecretString {
        SecretString::from(s)
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let env = EncryptedEnvelope::seal(b"Hemoglobin 14.2 g/dL", &pw("correct-horse"), &FAST)
            .unwrap();
        let plaintext = env.open(&pw("correct-horse"), &FAST).unwrap();
        assert_eq!(plaintext, b"Hemoglobin 14.2 g/dL");
    }

    #[test]
    fn test_empty_document() {
        let env = EncryptedEnvelope::seal(b"", &pw("pw"), &FAST).unwrap();
        assert_eq!(env.to_bytes().len(), EncryptedEnvelope::MIN_ENCODED_LEN);
        assert_eq!(env.open(&pw("pw"), &FAST).unwrap(), b"");
    }

    #[test]
    fn test_wrong_passphrase() {
        let env = EncryptedEnvelope::seal(b"secret", &pw("k1"), &FAST).unwrap();
        assert!(matches!(
            env.open(&pw("k2"), &FAST),
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_wrong_kdf_params() {
        let env = EncryptedEnvelope::seal(b"secret", &pw("k1"), &FAST).unwrap();
        let other = KdfParams::Pbkdf2Sha256 { iterations: 1_001 };
        assert!(matches!(
            env.open(&pw("k1"), &other),
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert!(matches!(
            EncryptedEnvelope::seal(b"x", &pw(""), &FAST),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_fresh_salt_and_nonce_per_seal() {
        let a = EncryptedEnvelope::seal(b"same", &pw("pw"), &FAST).unwrap();
        let b = EncryptedEnvelope::seal(b"same", &pw("pw"), &FAST).unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.ciphertext(), b.ciphertext());
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let env = EncryptedEnvelope::seal(b"K+ 4.1 mmol/L", &pw("pw"), &FAST).unwrap();
        let bytes = env.to_bytes();

        // Salt flips change the derived key; nonce/ciphertext/tag flips break the tag.
        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[byte] ^= 1 << bit;
                let env = EncryptedEnvelope::from_bytes(&tampered).unwrap();
                assert!(
                    matches!(env.open(&pw("pw"), &FAST), Err(CryptoError::AuthenticationFailure)),
                    "flip of bit {bit} in byte {byte} went undetected"
                );
            }
        }
    }

    #[test]
    fn test_binary_layout() {
        let env = EncryptedEnvelope::seal(b"abc", &pw("pw"), &FAST).unwrap();
        let bytes = env.to_bytes();

        assert_eq!(bytes.len(), 16 + 12 + 3 + 16);
        assert_eq!(&bytes[..16], env.salt());
        assert_eq!(&bytes[16..28], env.nonce());
        assert_eq!(&bytes[28..31], env.ciphertext());
        assert_eq!(&bytes[31..], env.tag());
        assert_eq!(EncryptedEnvelope::from_bytes(&bytes).unwrap(), env);
    }

    #[test]
    fn test_from_bytes_too_short() {
        for len in [0, 1, 43] {
            assert!(matches!(
                EncryptedEnvelope::from_bytes(&vec![0u8; len]),
                Err(CryptoError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_from_parts_checks_lengths() {
        assert!(EncryptedEnvelope::from_parts(&[0; 16], &[0; 12], vec![], &[0; 16]).is_ok());
        assert!(EncryptedEnvelope::from_parts(&[0; 15], &[0; 12], vec![], &[0; 16]).is_err());
        assert!(EncryptedEnvelope::from_parts(&[0; 16], &[0; 16], vec![], &[0; 16]).is_err());
        assert!(EncryptedEnvelope::from_parts(&[0; 16], &[0; 12], vec![], &[0; 12]).is_err());
    }

    #[test]
    fn test_json_form_uses_legacy_field_names() {
        let env = EncryptedEnvelope::seal(b"Rx", &pw("pw"), &FAST).unwrap();
        let value: serde_json::Value = serde_json::to_value(&env).unwrap();

        for field in ["encryptedContent", "iv", "salt", "authTag"] {
            assert!(value.get(field).and_then(|v| v.as_str()).is_some(), "missing {field}");
        }

        let restored: EncryptedEnvelope = serde_json::from_value(value).unwrap();
        assert_eq!(restored.open(&pw("pw"), &FAST).unwrap(), b"Rx");
    }

    #[test]
    fn test_json_rejects_legacy_16_byte_iv() {
        // The legacy client generated 16-byte IVs; the 96-bit nonce is required here.
        let json = serde_json::json!({
            "encryptedContent": "",
            "iv": base64_encode(&[0u8; 16]),
            "salt": base64_encode(&[0u8; 16]),
            "authTag": base64_encode(&[0u8; 16]),
        });
        let err = serde_json::from_value::<EncryptedEnvelope>(json).unwrap_err();
        assert!(err.to_string().contains("nonce"));
    }

    #[test]
    fn test_debug_does_not_dump_ciphertext() {
        let env = EncryptedEnvelope::seal(b"private", &pw("pw"), &FAST).unwrap();
        let debug = format!("{env:?}");
        assert!(debug.contains("ciphertext_len: 7"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn roundtrip_any_plaintext(data in proptest::collection::vec(any::<u8>(), 0..=2048)) {
            let env = EncryptedEnvelope::seal(&data, &pw("prop-pw"), &FAST).unwrap();
            prop_assert_eq!(env.ciphertext().len(), data.len());
            prop_assert_eq!(env.open(&pw("prop-pw"), &FAST).unwrap(), data);
        }
    }
}
