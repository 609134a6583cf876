use std::fmt;
use thiserror::Error;

// Startup configuration failures. The source types are a dependency leak,
// kept so the startup log shows the full error chain.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ICE_CONNECTION_STRING is not set")]
    MissingConnectionString,
    #[error("connection string is malformed: {0}")]
    MalformedConnectionString(&'static str),
    #[error("connection string endpoint is not a valid url")]
    InvalidEndpoint(#[source] url::ParseError),
    #[error("connection string access key is not valid base64")]
    InvalidAccessKey(#[source] base64::DecodeError),
    #[error("http client could not be built")]
    HttpClient(#[source] reqwest::Error),
}

// Which backend a failed call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    Identity,
    Relay,
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamService::Identity => f.write_str("identity"),
            UpstreamService::Relay => f.write_str("relay"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    // Request body could not be encoded.
    Request,
    Transport,
    Timeout,
    Status(u16),
    MalformedResponse,
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamErrorKind::Request => f.write_str("request could not be built"),
            UpstreamErrorKind::Transport => f.write_str("transport error"),
            UpstreamErrorKind::Timeout => f.write_str("timed out"),
            UpstreamErrorKind::Status(status) => write!(f, "returned status {status}"),
            UpstreamErrorKind::MalformedResponse => f.write_str("returned a malformed response"),
        }
    }
}

// Failure reported by, or while talking to, one of the backends.
#[derive(Debug, Clone, Error)]
#[error("{service} service {kind}")]
pub struct UpstreamError {
    pub service: UpstreamService,
    pub kind: UpstreamErrorKind,
    // Machine-readable code from the backend error body, safe to forward.
    pub code: Option<String>,
    // Free-form detail for logs only.
    pub message: Option<String>,
}

impl UpstreamError {
    pub fn new(service: UpstreamService, kind: UpstreamErrorKind) -> Self {
        Self {
            service,
            kind,
            code: None,
            message: None,
        }
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    // True when the backend is overloaded or unreachable rather than rejecting the call.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self.kind,
            UpstreamErrorKind::Transport
                | UpstreamErrorKind::Timeout
                | UpstreamErrorKind::Status(429)
                | UpstreamErrorKind::Status(503)
        )
    }
}

// Errors surfaced by the relay token workflows.
#[derive(Debug, Error)]
pub enum RelayTokenError {
    #[error("service is not configured")]
    Configuration,
    #[error("identity is required")]
    InvalidIdentity,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("response could not be serialized")]
    Serialization(#[source] serde_json::Error),
}
