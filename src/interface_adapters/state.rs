use crate::domain::{IdentityProvider, RelayProvider};
use std::sync::Arc;
use std::time::Duration;

// Backend clients, built once at startup from the connection string.
#[derive(Clone)]
pub struct Backends {
    // We use Arc<dyn Trait> to hold any implementation (dependency injection).
    pub identity: Arc<dyn IdentityProvider>,
    pub relay: Arc<dyn RelayProvider>,
}

#[derive(Clone)]
pub struct AppState {
    // None when the connection string was missing or invalid at startup.
    pub backends: Option<Backends>,
    pub short_lived_token_ttl: Duration,
    // The revoke route has no caller authentication, so it is mounted only on request.
    pub revoke_route_enabled: bool,
}
