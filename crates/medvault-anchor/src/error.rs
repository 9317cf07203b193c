use medvault_crypto::CryptoError;
use medvault_ledger::LedgerError;
use thiserror::Error;

pub type AnchorResult<T> = Result<T, AnchorError>;

#[derive(Debug, Error)]
pub enum AnchorError {
    /// Bad document id or malformed envelope. Nothing was sent to the ledger.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The envelope did not authenticate under the given passphrase.
    #[error("document was tampered with or the passphrase is wrong")]
    TamperedOrWrongKey,

    #[error(transparent)]
    Crypto(CryptoError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid state transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("crypto worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<CryptoError> for AnchorError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::AuthenticationFailure => AnchorError::TamperedOrWrongKey,
            CryptoError::InvalidInput(msg) => AnchorError::InvalidInput(msg),
            other => AnchorError::Crypto(other),
        }
    }
}

impl From<medvault_core::MedvaultError> for AnchorError {
    fn from(e: medvault_core::MedvaultError) -> Self {
        match e {
            medvault_core::MedvaultError::InvalidInput(msg) => AnchorError::InvalidInput(msg),
            medvault_core::MedvaultError::Config(msg) => AnchorError::Config(msg),
            other => AnchorError::Config(other.to_string()),
        }
    }
}
