use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::{AccessToken, Identity, RelayConfiguration};
use crate::domain::errors::UpstreamError;

// Port for the identity backend. Use cases depend on this trait, not the reqwest client.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_identity(&self) -> Result<Identity, UpstreamError>;

    // `expires_in` of None keeps the backend's default token lifetime.
    async fn issue_token(
        &self,
        identity: &Identity,
        scopes: &[&str],
        expires_in: Option<Duration>,
    ) -> Result<AccessToken, UpstreamError>;

    async fn revoke_tokens(&self, identity: &Identity) -> Result<(), UpstreamError>;
}

// Port for the relay (TURN/STUN) credential backend.
#[async_trait]
pub trait RelayProvider: Send + Sync {
    async fn relay_configuration(&self) -> Result<RelayConfiguration, UpstreamError>;
}
