// Shared helpers that run the real server against a mocked provider.
#![allow(dead_code)]

use relay_token_server::Settings;
use std::collections::HashMap;

// base64("test-access-key")
pub const ACCESS_KEY: &str = "dGVzdC1hY2Nlc3Mta2V5";

pub fn connection_string(endpoint: &str) -> String {
    format!("endpoint={endpoint}/;accesskey={ACCESS_KEY}")
}

// Build settings from an explicit variable list instead of the process environment.
pub fn settings(vars: &[(&str, String)]) -> Settings {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    Settings::from_lookup(|key| vars.get(key).cloned())
}

// Spawn the server on an ephemeral port and return its base URL.
pub async fn spawn_server(settings: Settings) -> String {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    // The server lives as long as the test runtime.
    tokio::spawn(async move {
        relay_token_server::serve(listener, settings)
            .await
            .expect("server failed");
    });

    format!("http://{addr}")
}
