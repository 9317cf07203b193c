//! Ledger health check

use std::time::Duration;

use medvault_core::Network;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerClient;
use crate::types::NetworkInfo;

/// Reachability snapshot of a ledger network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerHealth {
    pub network: Network,
    pub reachable: bool,
    /// Head block, when reachable
    pub block_number: Option<u64>,
    /// Failure description, when unreachable
    pub error: Option<String>,
}

/// Ask the ledger for its head block, bounded by `timeout`
pub async fn check_health(
    ledger: &dyn LedgerClient,
    timeout: Duration,
) -> LedgerResult<NetworkInfo> {
    tokio::time::timeout(timeout, ledger.network_info())
        .await
        .map_err(|_| LedgerError::Timeout(timeout))?
}

/// Returns true if the ledger answers within `timeout` (non-panicking)
pub async fn is_healthy(ledger: &dyn LedgerClient, timeout: Duration) -> bool {
    check_health(ledger, timeout).await.is_ok()
}

/// Like `check_health`, but folds failures into the snapshot
pub async fn probe(ledger: &dyn LedgerClient, timeout: Duration) -> LedgerHealth {
    match check_health(ledger, timeout).await {
        Ok(info) => LedgerHealth {
            network: info.network,
            reachable: true,
            block_number: Some(info.block_number),
            error: None,
        },
        Err(e) => {
            tracing::warn!(network = %ledger.network(), "ledger health check failed: {e}");
            LedgerHealth {
                network: ledger.network(),
                reachable: false,
                block_number: None,
                error: Some(e.to_string()),
            }
        }
    }
}
