//! The anchoring service
//!
//! ```text
//! encrypt_and_anchor:  Created -> Encrypted -> Fingerprinted -> Submitted -> Anchored
//!                      (store failure keeps the envelope: AnchoringFailed)
//!
//! decrypt_and_verify:  Retrieved -> Decrypted -> Reverified -> Verified
//!                                                           | Mismatched
//!                                                           | Unreachable
//!                                                           | Unanchored
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use medvault_core::config::MedvaultConfig;
use medvault_core::{validate_document_id, ContentFingerprint, Network};
use medvault_crypto::{fingerprint, CryptoError, EncryptedEnvelope, KdfParams};
use medvault_ledger::{LedgerClient, LedgerError, LedgerHealth, LedgerRecord, LedgerResult};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::AnchorResult;
use crate::outcome::{
    AnchorFailure, AnchorOutcome, AnchorRecord, AnchorStatus, IndeterminateReason, VerifyOutcome,
    VerifyStatus,
};
use crate::state::{Progress, ReadState, WriteState};

const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Runs the anchoring protocol against one ledger network.
///
/// Holds no per-document state; one service can serve concurrent operations
/// on any number of documents.
#[derive(Clone)]
pub struct AnchorService {
    ledger: Arc<dyn LedgerClient>,
    kdf: KdfParams,
    ledger_timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl AnchorService {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            kdf: KdfParams::default(),
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Apply `[crypto]` and `[ledger]` settings to a caller-supplied ledger
    pub fn from_config(cfg: &MedvaultConfig, ledger: Arc<dyn LedgerClient>) -> AnchorResult<Self> {
        if ledger.network() != cfg.ledger.network {
            warn!(
                configured = %cfg.ledger.network,
                ledger = %ledger.network(),
                "ledger client network differs from configuration"
            );
        }
        Ok(Self::new(ledger)
            .with_kdf(KdfParams::from_config(&cfg.crypto)?)
            .with_ledger_timeout(Duration::from_millis(cfg.ledger.timeout_ms))
            .with_retries(
                cfg.ledger.max_retries,
                Duration::from_millis(cfg.ledger.retry_backoff_ms),
            ))
    }

    /// Build the configured HTTP ledger client and wrap it
    pub fn connect(cfg: &MedvaultConfig) -> AnchorResult<Self> {
        let ledger = medvault_ledger::connect(&cfg.ledger)?;
        Self::from_config(cfg, ledger)
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Deadline for each ledger step, retries and backoff included
    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = initial_backoff;
        self
    }

    pub fn network(&self) -> Network {
        self.ledger.network()
    }

    /// Encrypt `plaintext`, fingerprint it and anchor the fingerprint.
    ///
    /// Errors only when nothing useful was produced (bad input, crypto
    /// failure). A ledger failure still returns the envelope, with
    /// `AnchorStatus::AnchoringFailed`.
    pub async fn encrypt_and_anchor(
        &self,
        plaintext: &[u8],
        passphrase: &SecretString,
        document_id: &str,
    ) -> AnchorResult<AnchorOutcome> {
        let mut progress = Progress::start(WriteState::Created);
        validate_document_id(document_id)?;

        let plaintext = Zeroizing::new(plaintext.to_vec());
        let passphrase = clone_secret(passphrase);
        let kdf = self.kdf;
        let (envelope, fingerprint) = tokio::task::spawn_blocking(move || {
            let envelope = EncryptedEnvelope::seal(&plaintext, &passphrase, &kdf)?;
            Ok::<_, CryptoError>((envelope, fingerprint(&plaintext)))
        })
        .await??;
        progress.advance(WriteState::Encrypted)?;
        progress.advance(WriteState::Fingerprinted)?;
        debug!(document_id, %fingerprint, kdf = kdf.name(), "document sealed");

        progress.advance(WriteState::Submitted)?;
        let status = match self
            .call_ledger("store", || self.ledger.store(document_id, &fingerprint))
            .await
        {
            Ok(receipt) => {
                progress.advance(WriteState::Anchored)?;
                info!(
                    document_id,
                    network = %self.network(),
                    tx_id = %receipt.tx_id,
                    block = receipt.block_number,
                    "fingerprint anchored"
                );
                AnchorStatus::Anchored(AnchorRecord {
                    document_id: document_id.to_string(),
                    fingerprint: fingerprint.clone(),
                    network: self.network(),
                    tx_id: receipt.tx_id,
                    block_number: receipt.block_number,
                    timestamp: receipt.timestamp,
                })
            }
            Err(e) => {
                warn!(document_id, network = %self.network(), "anchoring failed: {e}");
                AnchorStatus::AnchoringFailed {
                    reason: AnchorFailure::from(&e),
                }
            }
        };

        Ok(AnchorOutcome {
            envelope,
            fingerprint,
            status,
            state: progress.current(),
        })
    }

    /// Decrypt `envelope` and compare the plaintext's fingerprint with the
    /// one anchored for `document_id`.
    ///
    /// A failed decryption is `AnchorError::TamperedOrWrongKey` and the
    /// ledger is never consulted. Otherwise the plaintext is returned with
    /// whatever the ledger comparison produced.
    pub async fn decrypt_and_verify(
        &self,
        envelope: &EncryptedEnvelope,
        passphrase: &SecretString,
        document_id: &str,
    ) -> AnchorResult<VerifyOutcome> {
        let mut progress = Progress::start(ReadState::Retrieved);
        validate_document_id(document_id)?;

        let envelope = envelope.clone();
        let passphrase = clone_secret(passphrase);
        let kdf = self.kdf;
        let (plaintext, computed) = tokio::task::spawn_blocking(move || {
            let plaintext = Zeroizing::new(envelope.open(&passphrase, &kdf)?);
            let computed = fingerprint(&plaintext);
            Ok::<_, CryptoError>((plaintext, computed))
        })
        .await?
        .inspect_err(|e| {
            if matches!(e, CryptoError::AuthenticationFailure) {
                warn!(document_id, "envelope failed authentication");
            }
        })?;
        progress.advance(ReadState::Decrypted)?;
        progress.advance(ReadState::Reverified)?;

        let status = self.compare_with_ledger(document_id, &computed).await;
        progress.advance(status.read_state())?;

        Ok(VerifyOutcome {
            plaintext,
            fingerprint: computed,
            status,
            state: progress.current(),
        })
    }

    /// Compare an already-known fingerprint with the ledger, without
    /// decrypting anything
    pub async fn verify_fingerprint(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> AnchorResult<VerifyStatus> {
        validate_document_id(document_id)?;
        Ok(self.compare_with_ledger(document_id, fingerprint).await)
    }

    /// Reachability and head block of the configured network
    pub async fn ledger_status(&self) -> LedgerHealth {
        medvault_ledger::probe(self.ledger.as_ref(), self.ledger_timeout).await
    }

    async fn compare_with_ledger(
        &self,
        document_id: &str,
        computed: &ContentFingerprint,
    ) -> VerifyStatus {
        let lookup = self
            .call_ledger("lookup", || self.ledger.lookup(document_id))
            .await;
        let status = classify(lookup, computed);
        match &status {
            VerifyStatus::Verified { .. } => {
                info!(document_id, %computed, "fingerprint verified")
            }
            VerifyStatus::Mismatched { anchored, .. } => {
                warn!(document_id, %anchored, %computed, "fingerprint mismatch")
            }
            VerifyStatus::Indeterminate { reason } => {
                warn!(document_id, ?reason, "verification indeterminate")
            }
        }
        status
    }

    /// Run a ledger call, retrying transient failures with doubling backoff.
    ///
    /// `ledger_timeout` bounds the whole step, attempts and sleeps included.
    async fn call_ledger<T, F, Fut>(&self, op: &'static str, mut call: F) -> LedgerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let attempts = async {
            let mut backoff = self.retry_backoff;
            let mut attempt = 0u32;
            loop {
                match call().await {
                    Err(e) if e.is_retryable() && attempt < self.max_retries => {
                        attempt += 1;
                        debug!(op, attempt, ?backoff, "retrying ledger call: {e}");
                        tokio::time::sleep(backoff).await;
                        backoff = backoff.saturating_mul(2);
                    }
                    other => return other,
                }
            }
        };

        match tokio::time::timeout(self.ledger_timeout, attempts).await {
            Ok(result) => result,
            Err(_) => {
                debug!(op, timeout = ?self.ledger_timeout, "ledger deadline elapsed");
                Err(LedgerError::Timeout(self.ledger_timeout))
            }
        }
    }
}

fn classify(
    lookup: LedgerResult<Option<LedgerRecord>>,
    computed: &ContentFingerprint,
) -> VerifyStatus {
    match lookup {
        Ok(Some(record)) if &record.fingerprint == computed => VerifyStatus::Verified { record },
        Ok(Some(record)) => VerifyStatus::Mismatched {
            anchored: record.fingerprint,
            computed: computed.clone(),
        },
        Ok(None) => VerifyStatus::Indeterminate {
            reason: IndeterminateReason::NotAnchored,
        },
        Err(LedgerError::Timeout(_)) => VerifyStatus::Indeterminate {
            reason: IndeterminateReason::Timeout,
        },
        Err(e) => VerifyStatus::Indeterminate {
            reason: IndeterminateReason::Unreachable(e.to_string()),
        },
    }
}

/// Owned copy for the blocking pool
fn clone_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}
