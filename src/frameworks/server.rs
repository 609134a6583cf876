use crate::domain::ConfigError;
use crate::frameworks::config::Settings;
use crate::interface_adapters::clients::{CommunicationClient, IdentityClient, RelayClient};
use crate::interface_adapters::connection_string::ConnectionString;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, Backends};
use std::sync::Arc;
use tokio::net::TcpListener;

// Compact output by default, JSON lines when LOG_FORMAT=json.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().with_current_span(true).init(),
        _ => builder.compact().init(),
    }

    // Panics are logged as tracing errors.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "handler panicked");
    }));
}

fn connect(connection: &ConnectionString, settings: &Settings) -> Result<Backends, ConfigError> {
    let client = CommunicationClient::new(connection, settings.upstream_timeout)?;
    Ok(Backends {
        identity: Arc::new(IdentityClient::new(client.clone())),
        relay: Arc::new(RelayClient::new(client, settings.relay_route_type)),
    })
}

// Build the shared state. Config errors are logged here and answered with 500 per request.
pub fn build_state(settings: &Settings) -> AppState {
    let backends = match &settings.connection {
        Ok(connection) => {
            tracing::debug!(endpoint = %connection.endpoint, "backend clients configured.");
            match connect(connection, settings) {
                Ok(backends) => Some(backends),
                Err(e) => {
                    tracing::error!(error = %e, "failed to build backend clients");
                    None
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "relay token service is not configured");
            None
        }
    };

    AppState {
        backends,
        short_lived_token_ttl: settings.short_lived_token_ttl,
        revoke_route_enabled: settings.revoke_route_enabled,
    }
}

// Serve the app on an already-bound listener.
pub async fn serve(listener: TcpListener, settings: Settings) -> std::io::Result<()> {
    let state = Arc::new(build_state(&settings));
    let app = routes::app(state);
    axum::serve(listener, app).await
}

pub async fn run() {
    // A local .env is optional; hosted deployments set real variables.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env();
    let addr = settings.socket_addr();

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "could not bind relay token listener");
            return;
        }
    };
    tracing::info!(%addr, "relay token server listening");

    if let Err(e) = serve(listener, settings).await {
        tracing::error!(error = %e, "relay token server stopped");
    }
}
