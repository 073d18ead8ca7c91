// ABOUTME: Session - the explicit context passed to every feed operation:
// ABOUTME: active identity plus handles to the ledger, registry and avatars.

use std::sync::Arc;

use crate::avatar::{AvatarResolver, GatewayAvatarResolver};
use crate::error::{ConnectionError, FetchError};
use crate::ledger::{Identity, IdentityProvider, Ledger, ProfileRegistry};

/// Display information for the connected user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub identity: Identity,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Connection state for one dashboard session.
#[derive(Clone)]
pub struct Session {
    identity: Identity,
    ledger: Arc<dyn Ledger>,
    registry: Arc<dyn ProfileRegistry>,
    avatars: Arc<dyn AvatarResolver>,
}

impl Session {
    /// Ask the provider for the active identity and bind it to the given services.
    pub async fn connect(
        provider: &dyn IdentityProvider,
        ledger: Arc<dyn Ledger>,
        registry: Arc<dyn ProfileRegistry>,
        avatars: Arc<dyn AvatarResolver>,
    ) -> Result<Self, ConnectionError> {
        let identity = provider.current_identity().await?;
        tracing::info!(identity = %identity, "session connected");
        Ok(Self::new(identity, ledger, registry, avatars))
    }

    /// Build a session for a known identity.
    pub fn new(
        identity: Identity,
        ledger: Arc<dyn Ledger>,
        registry: Arc<dyn ProfileRegistry>,
        avatars: Arc<dyn AvatarResolver>,
    ) -> Self {
        Self {
            identity,
            ledger,
            registry,
            avatars,
        }
    }

    /// Build a session whose avatars resolve through the registry and a gateway.
    pub fn with_gateway(
        identity: Identity,
        ledger: Arc<dyn Ledger>,
        registry: Arc<dyn ProfileRegistry>,
        gateway_origin: &str,
    ) -> Self {
        let avatars = Arc::new(GatewayAvatarResolver::new(registry.clone(), gateway_origin));
        Self::new(identity, ledger, registry, avatars)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn avatars(&self) -> &Arc<dyn AvatarResolver> {
        &self.avatars
    }

    /// Username and avatar of the connected identity.
    pub async fn profile(&self) -> Result<Profile, FetchError> {
        let username = self.registry.username(&self.identity).await?;
        let avatar_url = self.avatars.resolve_avatar(&self.identity).await?;
        Ok(Profile {
            identity: self.identity.clone(),
            username,
            avatar_url,
        })
    }
}
