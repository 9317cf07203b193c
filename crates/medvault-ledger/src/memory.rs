//! In-memory ledger backend
//!
//! Thread-safe via `tokio::sync::RwLock`. Not persistent: records are lost on
//! drop. Faults can be injected to exercise timeout and outage handling.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use medvault_core::encoding::hex_encode;
use medvault_core::{ContentFingerprint, Network};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerClient;
use crate::types::{LedgerRecord, NetworkInfo, Receipt};

/// First block number handed out by a fresh ledger
const GENESIS_BLOCK: u64 = 1;

/// What `store` does for an id that already has a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Replace the previous record
    #[default]
    Overwrite,
    /// Refuse with `LedgerError::Rejected`
    Reject,
}

/// Injected failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every call fails with `LedgerError::Network`
    Offline,
    /// Every call sleeps this long before being served
    Latency(Duration),
    /// `store` fails with `LedgerError::Rejected`; reads are served
    RejectAll,
}

#[derive(Default)]
struct State {
    records: HashMap<String, LedgerRecord>,
    block_number: u64,
}

pub struct InMemoryLedger {
    network: Network,
    policy: DuplicatePolicy,
    state: RwLock<State>,
    fault: RwLock<Option<Fault>>,
}

impl InMemoryLedger {
    pub fn new(network: Network) -> Self {
        Self::with_policy(network, DuplicatePolicy::default())
    }

    pub fn with_policy(network: Network, policy: DuplicatePolicy) -> Self {
        Self {
            network,
            policy,
            state: RwLock::new(State {
                records: HashMap::new(),
                block_number: GENESIS_BLOCK - 1,
            }),
            fault: RwLock::new(None),
        }
    }

    /// Inject (or clear, with `None`) a failure mode
    pub async fn set_fault(&self, fault: Option<Fault>) {
        *self.fault.write().await = fault;
    }

    /// Number of anchored documents
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Apply the injected fault, if any. `Err` short-circuits the call.
    async fn apply_fault(&self, is_store: bool) -> LedgerResult<()> {
        let fault = *self.fault.read().await;
        match fault {
            None => Ok(()),
            Some(Fault::Offline) => Err(LedgerError::Network(format!(
                "{} ledger unreachable",
                self.network
            ))),
            Some(Fault::Latency(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(Fault::RejectAll) if is_store => Err(LedgerError::Rejected(
                "ledger is refusing new anchors".into(),
            )),
            Some(Fault::RejectAll) => Ok(()),
        }
    }

    fn tx_id(&self, document_id: &str, fingerprint: &ContentFingerprint, block: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.network.as_str().as_bytes());
        hasher.update(document_id.as_bytes());
        hasher.update(fingerprint.digest());
        hasher.update(block.to_be_bytes());
        format!("0x{}", hex_encode(&hasher.finalize()))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    fn network(&self) -> Network {
        self.network
    }

    async fn store(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> LedgerResult<Receipt> {
        self.apply_fault(true).await?;

        let mut state = self.state.write().await;
        if self.policy == DuplicatePolicy::Reject && state.records.contains_key(document_id) {
            return Err(LedgerError::Rejected(format!(
                "document '{document_id}' is already anchored"
            )));
        }

        state.block_number += 1;
        let block_number = state.block_number;
        let timestamp = unix_now();
        state.records.insert(
            document_id.to_string(),
            LedgerRecord {
                fingerprint: fingerprint.clone(),
                timestamp,
            },
        );

        Ok(Receipt {
            tx_id: self.tx_id(document_id, fingerprint, block_number),
            block_number,
            timestamp,
        })
    }

    async fn lookup(&self, document_id: &str) -> LedgerResult<Option<LedgerRecord>> {
        self.apply_fault(false).await?;
        Ok(self.state.read().await.records.get(document_id).cloned())
    }

    async fn verify(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> LedgerResult<bool> {
        self.apply_fault(false).await?;
        Ok(self
            .state
            .read()
            .await
            .records
            .get(document_id)
            .is_some_and(|r| &r.fingerprint == fingerprint))
    }

    async fn network_info(&self) -> LedgerResult<NetworkInfo> {
        self.apply_fault(false).await?;
        Ok(NetworkInfo {
            network: self.network,
            block_number: self.state.read().await.block_number,
        })
    }
}
