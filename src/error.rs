// ABOUTME: Defines all error types for the feedsync library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under FeedError.

use std::time::Duration;

/// Top-level error type for the feedsync library.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the ledger transport itself.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    /// JSON-RPC code a wallet returns when the user declines a request.
    pub const USER_REJECTED: i64 = 4001;

    /// Returns true if the wallet reported the request as declined by the user.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, LedgerError::Rpc { code, .. } if *code == Self::USER_REJECTED)
    }
}

/// Errors establishing a session with an identity provider.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("No identity provider available")]
    NoProvider,

    #[error("Identity provider returned no accounts")]
    NoIdentity,

    #[error("Invalid identity '{0}'")]
    InvalidIdentity(String),

    #[error("Provider error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors reading from the ledger or the content gateway.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Ledger read failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid page number {0}")]
    InvalidPage(u64),

    #[error("Page {page} discarded after {fetched} posts: {source}")]
    PageDiscarded {
        page: u64,
        fetched: usize,
        #[source]
        source: Box<FetchError>,
    },

    #[error("Load of page {page} cancelled")]
    Cancelled { page: u64 },
}

/// Errors submitting a state-changing request to the ledger.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Ledger write failed: {0}")]
    Ledger(#[source] LedgerError),

    #[error("Transaction timed out after {0:?}")]
    Timeout(Duration),

    #[error("Post content is empty")]
    EmptyContent,

    #[error("Receipt did not report the new post index")]
    MissingPostIndex,

    #[error("Post {index} committed but could not be re-read: {source}")]
    Reconcile {
        index: u64,
        #[source]
        source: FetchError,
    },
}

impl From<LedgerError> for TransactionError {
    fn from(err: LedgerError) -> Self {
        if err.is_user_rejection() {
            TransactionError::Rejected(err.to_string())
        } else {
            TransactionError::Ledger(err)
        }
    }
}

/// Errors writing a share link to the clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
