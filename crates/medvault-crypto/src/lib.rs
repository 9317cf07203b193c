//! medvault-crypto: client-side document encryption for medvault
//!
//! Architecture: passphrase-derived key, one AEAD pass per document
//!
//! Pipeline: plaintext → KDF(passphrase, random salt) → AES-256-GCM(random nonce) → envelope
//!
//! ```text
//! Passphrase + 128-bit salt
//!   └── DerivedKey (256-bit, PBKDF2-HMAC-SHA256 ×100k or Argon2id)
//!         └── AES-256-GCM (nonce = random 96-bit, AAD = empty)
//!               └── EncryptedEnvelope: salt[16] || nonce[12] || ciphertext[N] || tag[16]
//!
//! Plaintext ──SHA-256──▶ ContentFingerprint ("0x" + 64 hex), anchored on a ledger
//! ```

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod fingerprint;
pub mod kdf;
pub mod passphrase;

pub use cipher::{decrypt, encrypt, SealedPayload};
pub use envelope::EncryptedEnvelope;
pub use error::{CryptoError, CryptoResult};
pub use fingerprint::fingerprint;
pub use kdf::{derive_key, DerivedKey, KdfParams};
pub use passphrase::{generate_recovery_phrase, generate_secure_key, validate_recovery_phrase};

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of a KDF salt in bytes (128-bit)
pub const SALT_SIZE: usize = 16;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;
