use chrono::{DateTime, Utc};
use std::fmt;

// Capability scope requested for every token this service issues.
pub const VOIP_SCOPE: &str = "voip";

// Opaque user handle issued by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
}

// Bearer credential wrapper; formatting never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);

impl TokenSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    // Callers must not log the returned value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
    }
}

impl fmt::Display for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

// Scoped token plus the instant the backend says it stops being valid.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: TokenSecret,
    pub expires_on: DateTime<Utc>,
}

// Relay routing preference understood by the relay backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Any,
    Nearest,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Any => "any",
            RouteType::Nearest => "nearest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(RouteType::Any),
            "nearest" => Some(RouteType::Nearest),
            _ => None,
        }
    }
}

// One relay endpoint with the credentials needed to use it.
#[derive(Clone, PartialEq, Eq)]
pub struct IceServer {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
    pub route_type: Option<RouteType>,
}

impl fmt::Debug for IceServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IceServer")
            .field("urls", &self.urls)
            .field("username", &self.username)
            .field("credential", &"<redacted>")
            .field("route_type", &self.route_type)
            .finish()
    }
}

// Relay servers in the order the backend returned them.
#[derive(Debug, Clone, Default)]
pub struct RelayConfiguration {
    pub ice_servers: Vec<IceServer>,
    pub expires_on: Option<DateTime<Utc>>,
}

// Everything one request hands back to the caller.
#[derive(Debug, Clone)]
pub struct RelayTokenBundle {
    pub identity: Identity,
    pub token: AccessToken,
    pub short_lived_token: AccessToken,
    pub relay: RelayConfiguration,
}
