use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommunicationClient, RELAY_API_VERSION, decode, json_body, malformed};
use crate::domain::{
    IceServer, RelayConfiguration, RelayProvider, RouteType, UpstreamError, UpstreamService,
};

const SERVICE: UpstreamService = UpstreamService::Relay;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayConfigurationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    route_type: Option<&'static str>,
}

// `iceServers` is required; an empty list is valid, a missing key is not.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayConfigurationPayload {
    #[serde(default)]
    expires_on: Option<DateTime<Utc>>,
    ice_servers: Vec<IceServerPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IceServerPayload {
    #[serde(default)]
    route_type: Option<String>,
    urls: Vec<String>,
    username: String,
    credential: String,
}

impl IceServerPayload {
    fn into_ice_server(self) -> Result<IceServer, UpstreamError> {
        if self.urls.is_empty() || self.urls.iter().any(|url| url.is_empty()) {
            return Err(malformed(SERVICE, "ice server has no urls"));
        }
        if self.username.is_empty() || self.credential.is_empty() {
            return Err(malformed(SERVICE, "ice server is missing credentials"));
        }

        Ok(IceServer {
            route_type: self.route_type.as_deref().and_then(RouteType::parse),
            urls: self.urls,
            username: self.username,
            credential: self.credential,
        })
    }
}

// Relay backend client returning the account's current ICE servers.
#[derive(Clone)]
pub struct RelayClient {
    inner: CommunicationClient,
    route_type: Option<RouteType>,
}

impl RelayClient {
    pub fn new(inner: CommunicationClient, route_type: Option<RouteType>) -> Self {
        Self { inner, route_type }
    }
}

#[async_trait]
impl RelayProvider for RelayClient {
    async fn relay_configuration(&self) -> Result<RelayConfiguration, UpstreamError> {
        let url = self.inner.url(
            &["networktraversal", ":issueRelayConfiguration"],
            RELAY_API_VERSION,
        );
        let body = json_body(
            SERVICE,
            &RelayConfigurationRequest {
                route_type: self.route_type.map(RouteType::as_str),
            },
        )?;
        let res = self.inner.post(SERVICE, url, body).await?;

        let payload: RelayConfigurationPayload = decode(SERVICE, res).await?;
        let ice_servers = payload
            .ice_servers
            .into_iter()
            .map(IceServerPayload::into_ice_server)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RelayConfiguration {
            ice_servers,
            expires_on: payload.expires_on,
        })
    }
}
