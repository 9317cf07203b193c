//! Results handed back to callers of the anchoring protocol

use std::fmt;

use medvault_core::{ContentFingerprint, Network};
use medvault_crypto::EncryptedEnvelope;
use medvault_ledger::{LedgerError, LedgerRecord};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::state::{ReadState, WriteState};

/// A fingerprint the ledger has accepted for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    pub document_id: String,
    pub fingerprint: ContentFingerprint,
    pub network: Network,
    pub tx_id: String,
    pub block_number: u64,
    /// Unix seconds
    pub timestamp: u64,
}

/// Why a `store` did not produce a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnchorFailure {
    Timeout,
    Network(String),
    /// The ledger refused the fingerprint
    Rejected(String),
    /// The request never reached the ledger in a usable form
    InvalidRequest(String),
    /// The ledger client is misconfigured (e.g. wrong network behind the gateway)
    Misconfigured(String),
}

impl From<&LedgerError> for AnchorFailure {
    fn from(e: &LedgerError) -> Self {
        match e {
            LedgerError::Timeout(_) => AnchorFailure::Timeout,
            LedgerError::Network(msg) => AnchorFailure::Network(msg.clone()),
            LedgerError::Rejected(msg) => AnchorFailure::Rejected(msg.clone()),
            LedgerError::InvalidInput(msg) => AnchorFailure::InvalidRequest(msg.clone()),
            LedgerError::Config(msg) => AnchorFailure::Misconfigured(msg.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnchorStatus {
    Anchored(AnchorRecord),
    /// The envelope is still valid and must be stored; anchoring can be retried
    AnchoringFailed { reason: AnchorFailure },
}

impl AnchorStatus {
    pub fn is_anchored(&self) -> bool {
        matches!(self, AnchorStatus::Anchored(_))
    }
}

/// Result of `encrypt_and_anchor`. The envelope is present whether or not
/// anchoring succeeded.
#[derive(Debug, Clone)]
pub struct AnchorOutcome {
    pub envelope: EncryptedEnvelope,
    pub fingerprint: ContentFingerprint,
    pub status: AnchorStatus,
    pub state: WriteState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum IndeterminateReason {
    Timeout,
    Unreachable(String),
    /// The ledger holds no record for the document
    NotAnchored,
}

/// Tri-state comparison of a computed fingerprint against the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyStatus {
    Verified {
        record: LedgerRecord,
    },
    Mismatched {
        anchored: ContentFingerprint,
        computed: ContentFingerprint,
    },
    Indeterminate {
        reason: IndeterminateReason,
    },
}

impl VerifyStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyStatus::Verified { .. })
    }

    /// Terminal read state matching this result
    pub fn read_state(&self) -> ReadState {
        match self {
            VerifyStatus::Verified { .. } => ReadState::Verified,
            VerifyStatus::Mismatched { .. } => ReadState::Mismatched,
            VerifyStatus::Indeterminate {
                reason: IndeterminateReason::NotAnchored,
            } => ReadState::Unanchored,
            VerifyStatus::Indeterminate { .. } => ReadState::Unreachable,
        }
    }
}

/// Result of `decrypt_and_verify`. The plaintext is returned for every
/// `VerifyStatus`; it is wiped when the outcome is dropped.
pub struct VerifyOutcome {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub fingerprint: ContentFingerprint,
    pub status: VerifyStatus,
    pub state: ReadState,
}

impl fmt::Debug for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOutcome")
            .field("plaintext_len", &self.plaintext.len())
            .field("fingerprint", &self.fingerprint)
            .field("status", &self.status)
            .field("state", &self.state)
            .finish()
    }
}
