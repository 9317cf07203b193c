//! Key derivation: passphrase + salt → 256-bit document key

use argon2::{Algorithm, Argon2, Params, Version};
use medvault_core::config::CryptoConfig;
use medvault_core::{MedvaultError, MedvaultResult};
use pbkdf2::pbkdf2_hmac;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, SALT_SIZE};

/// Default PBKDF2-HMAC-SHA256 work factor, the same as the legacy web client
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// Lowest PBKDF2 work factor accepted from configuration
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Lowest Argon2id memory cost accepted from configuration (8 MiB)
pub const MIN_ARGON2_MEM_COST_KIB: u32 = 8 * 1024;

/// A 256-bit key derived from a passphrase for a single envelope.
///
/// Zeroized on drop. Not `Clone`: exactly one operation owns it.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// KDF algorithm and work factor.
///
/// Not recorded in the envelope: encryption and decryption must be configured
/// with the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    /// PBKDF2-HMAC-SHA256
    Pbkdf2Sha256 { iterations: u32 },
    /// Argon2id v1.3
    Argon2id {
        /// Memory cost in KiB
        mem_cost_kib: u32,
        /// Time cost / iterations
        time_cost: u32,
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Build parameters from the `[crypto]` config section, enforcing the
    /// work-factor floors.
    pub fn from_config(config: &CryptoConfig) -> MedvaultResult<Self> {
        match config.kdf.as_str() {
            "pbkdf2-sha256" => {
                if config.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
                    return Err(MedvaultError::Config(format!(
                        "crypto.pbkdf2_iterations = {} is below the minimum of {MIN_PBKDF2_ITERATIONS}",
                        config.pbkdf2_iterations
                    )));
                }
                Ok(KdfParams::Pbkdf2Sha256 {
                    iterations: config.pbkdf2_iterations,
                })
            }
            "argon2id" => {
                if config.argon2_mem_cost_kib < MIN_ARGON2_MEM_COST_KIB {
                    return Err(MedvaultError::Config(format!(
                        "crypto.argon2_mem_cost_kib = {} is below the minimum of {MIN_ARGON2_MEM_COST_KIB}",
                        config.argon2_mem_cost_kib
                    )));
                }
                Params::new(
                    config.argon2_mem_cost_kib,
                    config.argon2_time_cost,
                    config.argon2_parallelism,
                    Some(KEY_SIZE),
                )
                .map_err(|e| MedvaultError::Config(format!("crypto.argon2_*: {e}")))?;
                Ok(KdfParams::Argon2id {
                    mem_cost_kib: config.argon2_mem_cost_kib,
                    time_cost: config.argon2_time_cost,
                    parallelism: config.argon2_parallelism,
                })
            }
            other => Err(MedvaultError::Config(format!(
                "unknown crypto.kdf '{other}' (expected pbkdf2-sha256 or argon2id)"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            KdfParams::Argon2id { .. } => "argon2id",
        }
    }
}

/// Derive a 256-bit key from a passphrase and a 16-byte salt.
///
/// Deterministic for the same `(passphrase, salt, params)`, which is what lets
/// decryption re-derive the key from the salt stored in the envelope.
pub fn derive_key(
    passphrase: &SecretString,
    salt: &[u8],
    params: &KdfParams,
) -> CryptoResult<DerivedKey> {
    let secret = passphrase.expose_secret();
    if secret.is_empty() {
        return Err(CryptoError::InvalidInput("passphrase is empty".into()));
    }
    if salt.len() != SALT_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "salt is {} bytes (expected {SALT_SIZE})",
            salt.len()
        )));
    }

    let mut key = [0u8; KEY_SIZE];
    match *params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            if iterations == 0 {
                return Err(CryptoError::InvalidInput(
                    "PBKDF2 iteration count must be positive".into(),
                ));
            }
            pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut key);
        }
        KdfParams::Argon2id {
            mem_cost_kib,
            time_cost,
            parallelism,
        } => {
            let argon2_params = Params::new(mem_cost_kib, time_cost, parallelism, Some(KEY_SIZE))
                .map_err(|e| CryptoError::Kdf(format!("invalid Argon2id params: {e}")))?;
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);
            argon2
                .hash_password_into(secret.as_bytes(), salt, &mut key)
                .map_err(|e| CryptoError::Kdf(format!("Argon2id KDF failed: {e}")))?;
        }
    }

    tracing::trace!(kdf = params.name(), "derived document key");
    let derived = DerivedKey::from_bytes(key);
    key.zeroize();
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Use fast params for testing
    const FAST_PBKDF2: KdfParams = KdfParams::Pbkdf2Sha256 { iterations: 1_000 };
    const FAST_ARGON2: KdfParams = KdfParams::Argon2id {
        mem_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    };

    #[test]
    fn test_kdf_deterministic() {
        let passphrase = SecretString::from("correct-horse");
        let salt = [1u8; 16];

        for params in [FAST_PBKDF2, FAST_ARGON2] {
            let key1 = derive_key(&passphrase, &salt, &params).unwrap();
            let key2 = derive_key(&passphrase, &salt, &params).unwrap();
            assert_eq!(key1.as_bytes(), key2.as_bytes(), "KDF must be deterministic");
        }
    }

    #[test]
    fn test_pbkdf2_known_answer() {
        // RFC 7914 §11 PBKDF2-HMAC-SHA256 vector, truncated to 32 bytes:
        // P = "passwd", S = "salt" (not 16 bytes, so call the primitive directly)
        let mut out = [0u8; 32];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut out);
        assert_eq!(
            medvault_core::encoding::hex_encode(&out),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_kdf_different_passphrases() {
        let salt = [1u8; 16];
        let key1 = derive_key(&SecretString::from("passphrase-a"), &salt, &FAST_PBKDF2).unwrap();
        let key2 = derive_key(&SecretString::from("passphrase-b"), &salt, &FAST_PBKDF2).unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different passphrases must produce different keys"
        );
    }

    #[test]
    fn test_kdf_different_salts() {
        let passphrase = SecretString::from("same-passphrase");
        let key1 = derive_key(&passphrase, &[1u8; 16], &FAST_PBKDF2).unwrap();
        let key2 = derive_key(&passphrase, &[2u8; 16], &FAST_PBKDF2).unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different salts must produce different keys"
        );
    }

    #[test]
    fn test_kdf_algorithms_differ() {
        let passphrase = SecretString::from("same-passphrase");
        let key1 = derive_key(&passphrase, &[7u8; 16], &FAST_PBKDF2).unwrap();
        let key2 = derive_key(&passphrase, &[7u8; 16], &FAST_ARGON2).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_kdf_rejects_empty_passphrase() {
        let result = derive_key(&SecretString::from(""), &[0u8; 16], &FAST_PBKDF2);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_kdf_rejects_wrong_salt_length() {
        let passphrase = SecretString::from("pw");
        for len in [0usize, 8, 15, 17, 32] {
            let salt = vec![0u8; len];
            let result = derive_key(&passphrase, &salt, &FAST_PBKDF2);
            assert!(
                matches!(result, Err(CryptoError::InvalidInput(_))),
                "salt of {len} bytes must be rejected"
            );
        }
    }

    #[test]
    fn test_kdf_rejects_zero_iterations() {
        let params = KdfParams::Pbkdf2Sha256 { iterations: 0 };
        let result = derive_key(&SecretString::from("pw"), &[0u8; 16], &params);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_kdf_bad_argon2_params() {
        let params = KdfParams::Argon2id {
            mem_cost_kib: 1,
            time_cost: 1,
            parallelism: 1,
        };
        let result = derive_key(&SecretString::from("pw"), &[0u8; 16], &params);
        assert!(matches!(result, Err(CryptoError::Kdf(_))));
    }

    #[test]
    fn test_derived_key_debug_redacted() {
        let key = DerivedKey::from_bytes([0x42u8; KEY_SIZE]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn test_params_from_config() {
        let default = KdfParams::from_config(&CryptoConfig::default()).unwrap();
        assert_eq!(default, KdfParams::default());

        let argon = CryptoConfig {
            kdf: "argon2id".into(),
            ..CryptoConfig::default()
        };
        assert!(matches!(
            KdfParams::from_config(&argon).unwrap(),
            KdfParams::Argon2id {
                mem_cost_kib: 65536,
                ..
            }
        ));
    }

    #[test]
    fn test_params_from_config_enforces_floors() {
        let weak_pbkdf2 = CryptoConfig {
            pbkdf2_iterations: 10_000,
            ..CryptoConfig::default()
        };
        assert!(matches!(
            KdfParams::from_config(&weak_pbkdf2),
            Err(MedvaultError::Config(_))
        ));

        let weak_argon = CryptoConfig {
            kdf: "argon2id".into(),
            argon2_mem_cost_kib: 1024,
            ..CryptoConfig::default()
        };
        assert!(KdfParams::from_config(&weak_argon).is_err());

        let unknown = CryptoConfig {
            kdf: "md5".into(),
            ..CryptoConfig::default()
        };
        assert!(KdfParams::from_config(&unknown).is_err());
    }

    #[test]
    fn test_params_from_config_rejects_zero_argon2_costs() {
        for (time_cost, parallelism) in [(0, 4), (3, 0)] {
            let cfg = CryptoConfig {
                kdf: "argon2id".into(),
                argon2_time_cost: time_cost,
                argon2_parallelism: parallelism,
                ..CryptoConfig::default()
            };
            assert!(
                matches!(KdfParams::from_config(&cfg), Err(MedvaultError::Config(_))),
                "time_cost={time_cost} parallelism={parallelism}"
            );
        }
    }
}
