pub mod config;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{MedvaultError, MedvaultResult};
pub use types::{validate_document_id, ContentFingerprint, Network};
