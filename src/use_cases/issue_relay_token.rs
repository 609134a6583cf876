use std::time::Duration;

use crate::domain::{
    IdentityProvider, RelayProvider, RelayTokenBundle, RelayTokenError, VOIP_SCOPE,
};

// Default lifetime requested for the short-lived token.
pub const SHORT_LIVED_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

// Identity + tokens + relay credentials, built fresh for every request.
pub struct IssueRelayTokenUseCase<'a, I: ?Sized, R: ?Sized> {
    pub identity: &'a I,
    pub relay: &'a R,
    pub short_lived_ttl: Duration,
}

impl<I, R> IssueRelayTokenUseCase<'_, I, R>
where
    I: IdentityProvider + ?Sized,
    R: RelayProvider + ?Sized,
{
    pub async fn execute(&self) -> Result<RelayTokenBundle, RelayTokenError> {
        let identity = self.identity.create_identity().await?;
        tracing::info!(identity = %identity.id, "created identity.");

        // Both tokens only need the identity, so issue them together.
        let scopes = [VOIP_SCOPE];
        let (token, short_lived_token) = tokio::try_join!(
            self.identity.issue_token(&identity, &scopes, None),
            self.identity
                .issue_token(&identity, &scopes, Some(self.short_lived_ttl)),
        )?;
        tracing::info!(expires_on = %token.expires_on, "issued token.");
        tracing::info!(
            expires_on = %short_lived_token.expires_on,
            "issued short-lived token."
        );

        let relay = self.relay.relay_configuration().await?;
        for server in &relay.ice_servers {
            tracing::info!(urls = ?server.urls, "ice server.");
        }
        tracing::info!(
            ice_servers = relay.ice_servers.len(),
            expires_on = ?relay.expires_on,
            "fetched relay configuration."
        );

        Ok(RelayTokenBundle {
            identity,
            token,
            short_lived_token,
            relay,
        })
    }
}
