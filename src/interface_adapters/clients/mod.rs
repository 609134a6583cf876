mod identity;
mod relay;

pub use identity::IdentityClient;
pub use relay::RelayClient;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::domain::{ConfigError, UpstreamError, UpstreamErrorKind, UpstreamService};
use crate::interface_adapters::connection_string::ConnectionString;
use crate::interface_adapters::signing::{CONTENT_HASH_HEADER, DATE_HEADER, HmacSigner};

pub const IDENTITY_API_VERSION: &str = "2023-10-01";
pub const RELAY_API_VERSION: &str = "2022-03-01-preview";

const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

// Error envelope returned by both backends on non-2xx responses.
#[derive(Debug, Deserialize)]
struct CommunicationErrorResponse {
    error: CommunicationErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CommunicationErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// Signed reqwest transport shared by the identity and relay clients.
#[derive(Clone)]
pub struct CommunicationClient {
    http: Client,
    endpoint: Url,
    signer: HmacSigner,
}

impl CommunicationClient {
    pub fn new(connection: &ConnectionString, timeout: Duration) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        let signer = HmacSigner::new(connection.access_key());

        Ok(Self {
            http,
            endpoint: connection.endpoint.clone(),
            signer,
        })
    }

    // Builds `{endpoint}/{segments...}?api-version=...`, percent-encoding each segment.
    fn url(&self, segments: &[&str], api_version: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", api_version);
        url
    }

    async fn post(
        &self,
        service: UpstreamService,
        url: Url,
        body: Vec<u8>,
    ) -> Result<Response, UpstreamError> {
        let signed = self.signer.sign("POST", &url, &body, Utc::now());
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%service, path = url.path(), %request_id, "calling backend.");

        let res = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(DATE_HEADER, signed.date)
            .header(CONTENT_HASH_HEADER, signed.content_hash)
            .header(CLIENT_REQUEST_ID_HEADER, request_id)
            .header(AUTHORIZATION, signed.authorization)
            .body(body)
            .send()
            .await
            .map_err(|err| transport_error(service, &err))?;
        let status = res.status();

        // Keep the upstream status and code so handlers can pick 502 vs 503.
        if !status.is_success() {
            let detail = res
                .json::<CommunicationErrorResponse>()
                .await
                .ok()
                .map(|payload| payload.error);
            let mut err = UpstreamError::new(service, UpstreamErrorKind::Status(status.as_u16()));
            if let Some(detail) = detail {
                err = err.with_code(detail.code);
                if let Some(message) = detail.message {
                    err = err.with_message(message);
                }
            }
            return Err(err);
        }

        Ok(res)
    }
}

fn json_body(service: UpstreamService, body: &impl Serialize) -> Result<Vec<u8>, UpstreamError> {
    serde_json::to_vec(body).map_err(|err| {
        UpstreamError::new(service, UpstreamErrorKind::Request).with_message(err.to_string())
    })
}

async fn decode<T: DeserializeOwned>(
    service: UpstreamService,
    res: Response,
) -> Result<T, UpstreamError> {
    res.json::<T>().await.map_err(|err| {
        // The client timeout also covers reading the body.
        if err.is_timeout() {
            transport_error(service, &err)
        } else {
            malformed(service, err.to_string())
        }
    })
}

fn malformed(service: UpstreamService, message: impl Into<String>) -> UpstreamError {
    UpstreamError::new(service, UpstreamErrorKind::MalformedResponse).with_message(message)
}

fn transport_error(service: UpstreamService, err: &reqwest::Error) -> UpstreamError {
    let kind = if err.is_timeout() {
        UpstreamErrorKind::Timeout
    } else {
        UpstreamErrorKind::Transport
    };
    UpstreamError::new(service, kind).with_message(err.to_string())
}
