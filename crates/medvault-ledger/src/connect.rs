//! Ledger client factory

use std::sync::Arc;

use medvault_core::config::LedgerConfig;

use crate::error::LedgerResult;
use crate::http::HttpLedger;
use crate::traits::LedgerClient;

/// Build the ledger client for the configured network.
///
/// The network is fixed for the lifetime of the returned client; switching
/// networks means calling `connect` again with a different config.
pub fn connect(cfg: &LedgerConfig) -> LedgerResult<Arc<dyn LedgerClient>> {
    let url = cfg.rpc_url();
    tracing::info!(network = %cfg.network, url, "connecting to ledger gateway");
    Ok(Arc::new(HttpLedger::new(cfg.network, url)?))
}
