//! JSON-over-HTTP ledger client
//!
//! Talks to a ledger gateway that fronts a Polygon or Ethereum node:
//!
//! ```text
//! POST /documents/{id}                       {"fingerprint": "0x.."} -> Receipt
//! GET  /documents/{id}                       -> LedgerRecord | 404
//! GET  /documents/{id}/verify?fingerprint=.. -> {"verified": bool}
//! GET  /status                               -> NetworkInfo
//! ```
//!
//! Plain `http://` only; TLS is terminated by the gateway.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use medvault_core::{validate_document_id, ContentFingerprint, Network};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerClient;
use crate::types::{LedgerRecord, NetworkInfo, Receipt};

#[derive(Serialize)]
struct StoreRequest<'a> {
    fingerprint: &'a ContentFingerprint,
}

#[derive(Deserialize)]
struct VerifyResponse {
    verified: bool,
}

pub struct HttpLedger {
    network: Network,
    base_url: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpLedger {
    pub fn new(network: Network, base_url: &str) -> LedgerResult<Self> {
        if !base_url.starts_with("http://") {
            return Err(LedgerError::Config(format!(
                "ledger url must be http:// (got '{base_url}')"
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            network,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn document_url(&self, document_id: &str) -> LedgerResult<String> {
        validate_document_id(document_id)?;
        Ok(format!("{}/documents/{document_id}", self.base_url))
    }

    /// Send a request, returning the status and the full body
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> LedgerResult<(StatusCode, Bytes)> {
        let mut builder = Request::builder().method(method.clone()).uri(url);
        if body.is_some() {
            builder = builder.header(hyper::header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| LedgerError::InvalidInput(format!("building request: {e}")))?;

        tracing::debug!(%method, url, network = %self.network, "ledger request");

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| LedgerError::Network(format!("{method} {url}: {e}")))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| LedgerError::Network(format!("reading response body: {e}")))?
            .to_bytes();

        tracing::debug!(%status, len = bytes.len(), "ledger response");
        Ok((status, bytes))
    }
}

/// Map a non-success status to the matching error kind
fn status_error(status: StatusCode, body: &[u8]) -> LedgerError {
    let detail = String::from_utf8_lossy(body);
    let detail = detail.trim();
    if status.is_client_error() {
        LedgerError::Rejected(format!("{status}: {detail}"))
    } else {
        LedgerError::Network(format!("{status}: {detail}"))
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> LedgerResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| LedgerError::Network(format!("malformed ledger response: {e}")))
}

#[async_trait]
impl LedgerClient for HttpLedger {
    fn network(&self) -> Network {
        self.network
    }

    async fn store(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> LedgerResult<Receipt> {
        let url = self.document_url(document_id)?;
        let body = serde_json::to_vec(&StoreRequest { fingerprint })
            .map_err(|e| LedgerError::InvalidInput(e.to_string()))?;

        let (status, bytes) = self.send(Method::POST, &url, Some(body)).await?;
        match status {
            StatusCode::OK | StatusCode::CREATED => parse_json(&bytes),
            other => Err(status_error(other, &bytes)),
        }
    }

    async fn lookup(&self, document_id: &str) -> LedgerResult<Option<LedgerRecord>> {
        let url = self.document_url(document_id)?;
        let (status, bytes) = self.send(Method::GET, &url, None).await?;
        match status {
            StatusCode::OK => parse_json(&bytes).map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            other => Err(status_error(other, &bytes)),
        }
    }

    async fn verify(
        &self,
        document_id: &str,
        fingerprint: &ContentFingerprint,
    ) -> LedgerResult<bool> {
        let url = format!(
            "{}/verify?fingerprint={}",
            self.document_url(document_id)?,
            fingerprint
        );
        let (status, bytes) = self.send(Method::GET, &url, None).await?;
        match status {
            StatusCode::OK => parse_json::<VerifyResponse>(&bytes).map(|r| r.verified),
            other => Err(status_error(other, &bytes)),
        }
    }

    async fn network_info(&self) -> LedgerResult<NetworkInfo> {
        let url = format!("{}/status", self.base_url);
        let (status, bytes) = self.send(Method::GET, &url, None).await?;
        if status != StatusCode::OK {
            return Err(status_error(status, &bytes));
        }

        let info: NetworkInfo = parse_json(&bytes)?;
        if info.network != self.network {
            return Err(LedgerError::Config(format!(
                "gateway at {} serves {}, expected {}",
                self.base_url, info.network, self.network
            )));
        }
        Ok(info)
    }
}
