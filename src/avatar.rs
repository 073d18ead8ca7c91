// ABOUTME: Avatar resolution - maps an identity to a content-addressed image URL
// ABOUTME: by looking up its CID in the profile registry and joining a gateway.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::ledger::{Identity, ProfileRegistry};

/// Resolves an identity to the URL of its avatar image.
///
/// `Ok(None)` means the identity never registered an avatar; `Err` is kept
/// for lookups that could not be answered.
#[async_trait]
pub trait AvatarResolver: Send + Sync {
    async fn resolve_avatar(&self, identity: &Identity) -> Result<Option<String>, FetchError>;
}

/// Builds `{gateway}/ipfs/{cid}` from the CID registered for an identity.
pub struct GatewayAvatarResolver {
    registry: Arc<dyn ProfileRegistry>,
    gateway_origin: String,
}

impl GatewayAvatarResolver {
    pub fn new(registry: Arc<dyn ProfileRegistry>, gateway_origin: impl Into<String>) -> Self {
        Self {
            registry,
            gateway_origin: gateway_origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Gateway URL for a content id.
    pub fn url_for(&self, cid: &str) -> String {
        gateway_url(&self.gateway_origin, cid)
    }
}

/// Join a gateway origin and a content id.
pub fn gateway_url(gateway_origin: &str, cid: &str) -> String {
    format!(
        "{}/ipfs/{}",
        gateway_origin.trim_end_matches('/'),
        urlencoding::encode(cid.trim())
    )
}

#[async_trait]
impl AvatarResolver for GatewayAvatarResolver {
    async fn resolve_avatar(&self, identity: &Identity) -> Result<Option<String>, FetchError> {
        let cid = self.registry.avatar_cid(identity).await?;
        if cid.trim().is_empty() {
            tracing::debug!(identity = %identity, "no avatar registered");
            return Ok(None);
        }
        Ok(Some(self.url_for(&cid)))
    }
}
