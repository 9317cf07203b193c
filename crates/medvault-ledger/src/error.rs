use std::time::Duration;
use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport failure or unusable response. Safe to retry.
    #[error("ledger network error: {0}")]
    Network(String),

    /// The ledger refused the request. Not retried.
    #[error("ledger rejected request: {0}")]
    Rejected(String),

    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid ledger request: {0}")]
    InvalidInput(String),

    #[error("ledger config error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Network(_) | LedgerError::Timeout(_))
    }
}

impl From<medvault_core::MedvaultError> for LedgerError {
    fn from(e: medvault_core::MedvaultError) -> Self {
        match e {
            medvault_core::MedvaultError::InvalidInput(msg) => LedgerError::InvalidInput(msg),
            medvault_core::MedvaultError::Config(msg) => LedgerError::Config(msg),
            other => LedgerError::Network(other.to_string()),
        }
    }
}
