use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

pub const DATE_HEADER: &str = "x-ms-date";
pub const CONTENT_HASH_HEADER: &str = "x-ms-content-sha256";

// Header values that authenticate one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub date: String,
    pub content_hash: String,
    pub authorization: String,
}

// HMAC-SHA256 shared-key signer for the communication backends.
#[derive(Clone)]
pub struct HmacSigner {
    mac: HmacSha256,
}

impl HmacSigner {
    pub fn new(access_key: &[u8]) -> Self {
        // HMAC pads or hashes the key, so every length is accepted.
        let mac = HmacSha256::new_from_slice(access_key).expect("hmac accepts any key length");
        Self { mac }
    }

    pub fn sign(&self, method: &str, url: &Url, body: &[u8], now: DateTime<Utc>) -> SignedHeaders {
        let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_hash = STANDARD.encode(Sha256::digest(body));
        let string_to_sign = format!(
            "{method}\n{}\n{date};{};{content_hash}",
            path_and_query(url),
            host(url)
        );

        let mut mac = self.mac.clone();
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        SignedHeaders {
            authorization: format!(
                "HMAC-SHA256 SignedHeaders={DATE_HEADER};host;{CONTENT_HASH_HEADER}&Signature={signature}"
            ),
            date,
            content_hash,
        }
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

// Matches the Host header reqwest sends: the port only appears when non-default.
fn host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
