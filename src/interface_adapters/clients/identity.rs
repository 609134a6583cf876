use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CommunicationClient, IDENTITY_API_VERSION, decode, json_body, malformed};
use crate::domain::{
    AccessToken, Identity, IdentityProvider, TokenSecret, UpstreamError, UpstreamService,
};

const SERVICE: UpstreamService = UpstreamService::Identity;

#[derive(Serialize)]
struct CreateIdentityRequest {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueTokenRequest<'a> {
    scopes: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in_minutes: Option<u64>,
}

#[derive(Deserialize)]
struct CreateIdentityResponse {
    identity: IdentityPayload,
}

#[derive(Deserialize)]
struct IdentityPayload {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenPayload {
    token: String,
    expires_on: DateTime<Utc>,
}

// Identity backend client: creates users, issues and revokes their tokens.
#[derive(Clone)]
pub struct IdentityClient {
    inner: CommunicationClient,
}

impl IdentityClient {
    pub fn new(inner: CommunicationClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn create_identity(&self) -> Result<Identity, UpstreamError> {
        let url = self.inner.url(&["identities"], IDENTITY_API_VERSION);
        let body = json_body(SERVICE, &CreateIdentityRequest {})?;
        let res = self.inner.post(SERVICE, url, body).await?;

        let payload: CreateIdentityResponse = decode(SERVICE, res).await?;
        if payload.identity.id.trim().is_empty() {
            return Err(malformed(SERVICE, "identity id is empty"));
        }

        Ok(Identity {
            id: payload.identity.id,
        })
    }

    async fn issue_token(
        &self,
        identity: &Identity,
        scopes: &[&str],
        expires_in: Option<Duration>,
    ) -> Result<AccessToken, UpstreamError> {
        let url = self.inner.url(
            &["identities", identity.id.as_str(), ":issueAccessToken"],
            IDENTITY_API_VERSION,
        );
        // Backend lifetimes are whole minutes, rounded up.
        let body = json_body(
            SERVICE,
            &IssueTokenRequest {
                scopes,
                expires_in_minutes: expires_in.map(|ttl| ttl.as_secs().div_ceil(60)),
            },
        )?;
        let res = self.inner.post(SERVICE, url, body).await?;

        let payload: AccessTokenPayload = decode(SERVICE, res).await?;
        if payload.token.is_empty() {
            return Err(malformed(SERVICE, "access token is empty"));
        }

        Ok(AccessToken {
            token: TokenSecret::new(payload.token),
            expires_on: payload.expires_on,
        })
    }

    async fn revoke_tokens(&self, identity: &Identity) -> Result<(), UpstreamError> {
        let url = self.inner.url(
            &["identities", identity.id.as_str(), ":revokeAccessTokens"],
            IDENTITY_API_VERSION,
        );
        self.inner.post(SERVICE, url, Vec::new()).await?;

        Ok(())
    }
}
