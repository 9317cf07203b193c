use thiserror::Error;

pub type MedvaultResult<T> = Result<T, MedvaultError>;

#[derive(Debug, Error)]
pub enum MedvaultError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
