// ABOUTME: Defines the traits for the external collaborators - the post ledger,
// ABOUTME: the profile registry, and the wallet-style identity provider.

use async_trait::async_trait;

use super::{Identity, RawPost, Receipt};
use crate::error::{ConnectionError, LedgerError};

/// The append-only post contract.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Number of posts ever created. Valid indices are `0..total_count`.
    async fn total_count(&self) -> Result<u64, LedgerError>;

    /// Read the post stored at `index`.
    async fn get_record(&self, index: u64) -> Result<RawPost, LedgerError>;

    /// Whether `identity` currently likes the post at `index`.
    async fn has_liked(&self, index: u64, identity: &Identity) -> Result<bool, LedgerError>;

    /// Like the post at `index` on behalf of `from`.
    async fn like(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError>;

    /// Withdraw a like from the post at `index`.
    async fn unlike(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError>;

    /// Append a new post. The receipt carries the assigned index.
    async fn create_post(&self, content: &str, from: &Identity) -> Result<Receipt, LedgerError>;
}

/// The user registry contract holding display names and avatar content ids.
#[async_trait]
pub trait ProfileRegistry: Send + Sync {
    /// Content id of the identity's avatar. Empty when none is registered.
    async fn avatar_cid(&self, identity: &Identity) -> Result<String, LedgerError>;

    /// Registered display name. Empty when none is registered.
    async fn username(&self, identity: &Identity) -> Result<String, LedgerError>;
}

/// Source of the single active identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Identity, ConnectionError>;
}

/// A fixed identity, e.g. one read from configuration.
#[async_trait]
impl IdentityProvider for Identity {
    async fn current_identity(&self) -> Result<Identity, ConnectionError> {
        Ok(self.clone())
    }
}
