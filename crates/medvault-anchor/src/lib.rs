//! medvault-anchor: the anchoring protocol
//!
//! Write path: plaintext -> envelope + fingerprint -> ledger receipt.
//! Read path: envelope -> plaintext + fingerprint -> compare with the ledger.
//!
//! Crypto runs on the blocking pool; ledger calls are the only suspension
//! points and are bounded by a timeout with retries on transient failures.

pub mod error;
pub mod outcome;
pub mod protocol;
pub mod state;

pub use error::{AnchorError, AnchorResult};
pub use outcome::{
    AnchorFailure, AnchorOutcome, AnchorRecord, AnchorStatus, IndeterminateReason, VerifyOutcome,
    VerifyStatus,
};
pub use protocol::AnchorService;
pub use state::{Progress, ReadState, Stage, WriteState};
