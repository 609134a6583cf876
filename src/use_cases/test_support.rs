use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AccessToken, IceServer, Identity, IdentityProvider, RelayConfiguration, RelayProvider,
    TokenSecret, UpstreamError, UpstreamErrorKind, UpstreamService,
};

// Fixed issue instant so expiry assertions are deterministic.
pub(crate) const ISSUED_AT: i64 = 1_700_000_000;
pub(crate) const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

pub(crate) fn issued_at() -> DateTime<Utc> {
    DateTime::from_timestamp(ISSUED_AT, 0).expect("valid fixed timestamp")
}

pub(crate) fn ice_server(url: &str, username: &str, credential: &str) -> IceServer {
    IceServer {
        urls: vec![url.to_string()],
        username: username.to_string(),
        credential: credential.to_string(),
        route_type: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IdentityCall {
    CreateIdentity,
    IssueToken {
        identity: String,
        scopes: Vec<String>,
        expires_in: Option<Duration>,
    },
    RevokeTokens {
        identity: String,
    },
}

#[derive(Clone, Default)]
pub(crate) struct IdentityFailures {
    pub create_identity: Option<UpstreamErrorKind>,
    pub issue_token: Option<UpstreamErrorKind>,
    pub revoke_tokens: Option<UpstreamErrorKind>,
}

// Identity backend double that records every call it receives.
#[derive(Clone, Default)]
pub(crate) struct FakeIdentityProvider {
    calls: Arc<Mutex<Vec<IdentityCall>>>,
    issued: Arc<AtomicUsize>,
    failures: IdentityFailures,
}

impl FakeIdentityProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failures(mut self, failures: IdentityFailures) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn calls(&self) -> Vec<IdentityCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: IdentityCall) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_identity(&self) -> Result<Identity, UpstreamError> {
        self.record(IdentityCall::CreateIdentity);
        if let Some(kind) = self.failures.create_identity.clone() {
            return Err(UpstreamError::new(UpstreamService::Identity, kind));
        }

        Ok(Identity {
            id: "8:acs:test_user".to_string(),
        })
    }

    async fn issue_token(
        &self,
        identity: &Identity,
        scopes: &[&str],
        expires_in: Option<Duration>,
    ) -> Result<AccessToken, UpstreamError> {
        self.record(IdentityCall::IssueToken {
            identity: identity.id.clone(),
            scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
            expires_in,
        });
        if let Some(kind) = self.failures.issue_token.clone() {
            return Err(UpstreamError::new(UpstreamService::Identity, kind));
        }

        // Every issuance gets a distinct token, like the real backend.
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let lifetime = expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let expires_on = issued_at()
            + chrono::Duration::from_std(lifetime).expect("lifetime fits chrono duration");

        Ok(AccessToken {
            token: TokenSecret::new(format!("token-{n}")),
            expires_on,
        })
    }

    async fn revoke_tokens(&self, identity: &Identity) -> Result<(), UpstreamError> {
        self.record(IdentityCall::RevokeTokens {
            identity: identity.id.clone(),
        });
        if let Some(kind) = self.failures.revoke_tokens.clone() {
            return Err(UpstreamError::new(UpstreamService::Identity, kind));
        }

        Ok(())
    }
}

// Relay backend double returning a canned server list.
#[derive(Clone, Default)]
pub(crate) struct FakeRelayProvider {
    servers: Vec<IceServer>,
    failure: Option<UpstreamErrorKind>,
    calls: Arc<AtomicUsize>,
}

impl FakeRelayProvider {
    pub(crate) fn with_servers(servers: Vec<IceServer>) -> Self {
        Self {
            servers,
            ..Self::default()
        }
    }

    pub(crate) fn failing(kind: UpstreamErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::default()
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayProvider for FakeRelayProvider {
    async fn relay_configuration(&self) -> Result<RelayConfiguration, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.failure.clone() {
            return Err(UpstreamError::new(UpstreamService::Relay, kind));
        }

        Ok(RelayConfiguration {
            ice_servers: self.servers.clone(),
            expires_on: Some(issued_at()),
        })
    }
}
