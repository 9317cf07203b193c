use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encoding::{hex_decode_array, hex_encode};
use crate::error::{MedvaultError, MedvaultResult};

/// Ledger networks a fingerprint can be anchored on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Default: lower fees
    #[default]
    Polygon,
    Ethereum,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Polygon => "polygon",
            Network::Ethereum => "ethereum",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = MedvaultError;

    fn from_str(s: &str) -> MedvaultResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polygon" => Ok(Network::Polygon),
            "ethereum" => Ok(Network::Ethereum),
            other => Err(MedvaultError::InvalidInput(format!(
                "unknown ledger network '{other}' (expected polygon or ethereum)"
            ))),
        }
    }
}

/// SHA-256 content fingerprint in its on-ledger form: `0x` + 64 lowercase hex chars.
///
/// Always computed over plaintext, so identical content yields an identical
/// fingerprint regardless of salt or nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentFingerprint {
    digest: [u8; 32],
    encoded: String,
}

impl ContentFingerprint {
    /// Algorithm tag preceding the hex digest
    pub const PREFIX: &'static str = "0x";
    /// Digest length in bytes (SHA-256)
    pub const DIGEST_LEN: usize = 32;
    /// Length of the full string form
    pub const ENCODED_LEN: usize = 2 + Self::DIGEST_LEN * 2;

    pub fn from_digest(digest: &[u8; Self::DIGEST_LEN]) -> Self {
        Self {
            digest: *digest,
            encoded: format!("{}{}", Self::PREFIX, hex_encode(digest)),
        }
    }

    /// Parse the string form. Uppercase hex is rejected so that string
    /// equality and digest equality coincide.
    pub fn parse(s: &str) -> MedvaultResult<Self> {
        let hex = s.strip_prefix(Self::PREFIX).ok_or_else(|| {
            MedvaultError::InvalidInput(format!(
                "fingerprint must start with '{}'",
                Self::PREFIX
            ))
        })?;
        if s.len() != Self::ENCODED_LEN {
            return Err(MedvaultError::InvalidInput(format!(
                "fingerprint has {} chars (expected {})",
                s.len(),
                Self::ENCODED_LEN
            )));
        }
        if !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(MedvaultError::InvalidInput(
                "fingerprint must be lowercase hex".into(),
            ));
        }
        Ok(Self {
            digest: hex_decode_array(hex)?,
            encoded: s.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Raw digest bytes
    pub fn digest(&self) -> &[u8; Self::DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for ContentFingerprint {
    type Err = MedvaultError;

    fn from_str(s: &str) -> MedvaultResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentFingerprint {
    type Error = MedvaultError;

    fn try_from(s: String) -> MedvaultResult<Self> {
        Self::parse(&s)
    }
}

impl From<ContentFingerprint> for String {
    fn from(fp: ContentFingerprint) -> Self {
        fp.encoded
    }
}

/// Maximum length of a caller-chosen document id
pub const DOCUMENT_ID_MAX_LEN: usize = 128;

/// Check that a document id is usable as a ledger key and URL path segment:
/// 1..=128 chars from `[A-Za-z0-9._-]`.
pub fn validate_document_id(id: &str) -> MedvaultResult<()> {
    if id.is_empty() {
        return Err(MedvaultError::InvalidInput("document id is empty".into()));
    }
    if id.len() > DOCUMENT_ID_MAX_LEN {
        return Err(MedvaultError::InvalidInput(format!(
            "document id is {} chars (max {DOCUMENT_ID_MAX_LEN})",
            id.len()
        )));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(MedvaultError::InvalidInput(format!(
            "document id contains invalid character {bad:?}"
        )));
    }
    Ok(())
}
