use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;
use url::Url;

use crate::domain::ConfigError;

// Parsed `endpoint=...;accesskey=...` secret shared by both backend clients.
#[derive(Clone)]
pub struct ConnectionString {
    pub endpoint: Url,
    access_key: Vec<u8>,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut endpoint = None;
        let mut access_key = None;

        for pair in raw.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
            // Split on the first '=' only; base64 keys end with padding.
            let (key, value) = pair
                .split_once('=')
                .ok_or(ConfigError::MalformedConnectionString("expected key=value pairs"))?;
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim()),
                "accesskey" => access_key = Some(value.trim()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MalformedConnectionString("missing endpoint"))?;
        let endpoint = Url::parse(endpoint).map_err(ConfigError::InvalidEndpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::MalformedConnectionString(
                "endpoint must be an http(s) url",
            ));
        }

        let access_key = access_key
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MalformedConnectionString("missing accesskey"))?;
        let access_key = STANDARD
            .decode(access_key)
            .map_err(ConfigError::InvalidAccessKey)?;

        Ok(Self {
            endpoint,
            access_key,
        })
    }

    pub fn access_key(&self) -> &[u8] {
        &self.access_key
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"<redacted>")
            .finish()
    }
}
