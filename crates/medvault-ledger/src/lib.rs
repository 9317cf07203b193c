//! medvault-ledger: the external ledger as an explicit capability
//!
//! The anchoring protocol only ever talks to an `Arc<dyn LedgerClient>`
//! chosen at construction time; there is no process-wide provider.
//!
//! Backends:
//! - `memory`: in-process ledger with fault injection (tests, offline use)
//! - `http`: JSON client for a ledger gateway fronting Polygon/Ethereum

pub mod connect;
pub mod error;
pub mod health;
pub mod http;
pub mod memory;
pub mod traits;
pub mod types;

pub use connect::connect;
pub use error::{LedgerError, LedgerResult};
pub use health::{check_health, is_healthy, probe, LedgerHealth};
pub use http::HttpLedger;
pub use memory::{DuplicatePolicy, Fault, InMemoryLedger};
pub use traits::LedgerClient;
pub use types::{LedgerRecord, NetworkInfo, Receipt};
