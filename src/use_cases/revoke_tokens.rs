use crate::domain::{Identity, IdentityProvider, RelayTokenError};

// Revokes every token previously issued for one identity.
pub struct RevokeTokensUseCase<'a, I: ?Sized> {
    pub identity: &'a I,
}

impl<I> RevokeTokensUseCase<'_, I>
where
    I: IdentityProvider + ?Sized,
{
    pub async fn execute(&self, identity_id: String) -> Result<(), RelayTokenError> {
        if identity_id.trim().is_empty() {
            return Err(RelayTokenError::InvalidIdentity);
        }

        let identity = Identity { id: identity_id };
        self.identity.revoke_tokens(&identity).await?;
        tracing::info!(identity = %identity.id, "revoked tokens.");

        Ok(())
    }
}
