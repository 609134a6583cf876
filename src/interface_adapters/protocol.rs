use serde::Serialize;

use crate::domain::{IceServer, RelayTokenBundle};

// Response payload for the ice server token endpoint. Holds secrets, so no Debug.
#[derive(Serialize)]
pub struct RelayTokenResponse {
    pub identity: String,
    pub token: String,
    pub short_lived_token: String,
    pub ice_servers: Vec<IceServerResponse>,
}

#[derive(Serialize)]
pub struct IceServerResponse {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
}

impl From<IceServer> for IceServerResponse {
    fn from(server: IceServer) -> Self {
        Self {
            urls: server.urls,
            username: server.username,
            credential: server.credential,
        }
    }
}

impl From<RelayTokenBundle> for RelayTokenResponse {
    fn from(bundle: RelayTokenBundle) -> Self {
        Self {
            identity: bundle.identity.id,
            token: bundle.token.token.into_inner(),
            short_lived_token: bundle.short_lived_token.token.into_inner(),
            ice_servers: bundle
                .relay
                .ice_servers
                .into_iter()
                .map(IceServerResponse::from)
                .collect(),
        }
    }
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    // Backend error code, when the backend supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_code: Option<String>,
}
