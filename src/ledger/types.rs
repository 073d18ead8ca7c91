// ABOUTME: Value types exchanged with the ledger - identities, raw post
// ABOUTME: records as stored by the contract, and transaction receipts.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConnectionError;

static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address pattern"));

/// A wallet address identifying a user.
///
/// Stored lowercased so identities compare equal regardless of checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Parse and normalize a `0x`-prefixed 20-byte hex address.
    pub fn parse(raw: &str) -> Result<Self, ConnectionError> {
        let trimmed = raw.trim();
        if !ADDRESS.is_match(trimmed) {
            return Err(ConnectionError::InvalidIdentity(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for compact display (`0x1234…abcd`).
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identity {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = ConnectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

/// A post record exactly as the contract stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    /// Ledger-assigned position in the append-only post array.
    pub index: u64,
    pub author: Identity,
    pub content: String,
    /// Unix seconds.
    pub created_at: u64,
    pub like_count: u64,
}

/// Outcome of a state-changing ledger request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Receipt {
    pub tx_hash: String,

    /// Index assigned by a `createPost` call, read from its `PostCreated` event.
    pub post_index: Option<u64>,

    /// Block timestamp in unix seconds, when the ledger reports one.
    pub timestamp: Option<u64>,
}
