use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Malformed lengths or empty required fields. A caller bug; never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tag did not verify. Deliberately does not say whether the key was wrong
    /// or the data was altered.
    #[error("authentication failed: wrong passphrase or tampered data")]
    AuthenticationFailure,

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("encryption failed: {0}")]
    Encryption(String),
}

impl From<medvault_core::MedvaultError> for CryptoError {
    fn from(e: medvault_core::MedvaultError) -> Self {
        match e {
            medvault_core::MedvaultError::InvalidInput(msg) => CryptoError::InvalidInput(msg),
            other => CryptoError::InvalidInput(other.to_string()),
        }
    }
}
