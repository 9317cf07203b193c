use medvault_core::{ContentFingerprint, Network};
use serde::{Deserialize, Serialize};

/// Proof that the ledger accepted a `store`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Transaction hash, `0x`-prefixed hex
    pub tx_id: String,
    pub block_number: u64,
    /// Unix seconds
    pub timestamp: u64,
}

/// What the ledger holds for a document id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub fingerprint: ContentFingerprint,
    /// Unix seconds at which the fingerprint was anchored
    pub timestamp: u64,
}

/// Head of the ledger network, as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network: Network,
    pub block_number: u64,
}
