//! Ledger capability trait

use async_trait::async_trait;
use medvault_core::{ContentFingerprint, Network};

use crate::error::LedgerResult;
use crate::types::{LedgerRecord, NetworkInfo, Receipt};

/// Append-only document-id → fingerprint oracle.
///
/// Implementations may be slow or unavailable; callers bound every call with
/// a timeout. Behavior of `store` on an id that already has a record is
/// implementation-defined (overwrite or reject).
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Network this client anchors on
    fn network(&self) -> Network;

    /// Anchor `fingerprint` under `document_id`.
    ///
    /// Fails with `Network` (retryable) or `Rejected` (not retryable).
    async fn store(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> LedgerResult<Receipt>;

    /// Fetch the record for `document_id`, `None` if nothing is anchored.
    async fn lookup(&self, document_id: &str) -> LedgerResult<Option<LedgerRecord>>;

    /// Whether `fingerprint` is what is anchored under `document_id`.
    /// Returns `false` both for a different fingerprint and for no record.
    async fn verify(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> LedgerResult<bool>;

    /// Current head of the network
    async fn network_info(&self) -> LedgerResult<NetworkInfo>;
}
