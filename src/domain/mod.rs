mod entities;
mod errors;
mod ports;

// Re-export the domain boundary types and ports.
pub use entities::{
    AccessToken, IceServer, Identity, RelayConfiguration, RelayTokenBundle, RouteType,
    TokenSecret, VOIP_SCOPE,
};
pub use errors::{ConfigError, RelayTokenError, UpstreamError, UpstreamErrorKind, UpstreamService};
pub use ports::{IdentityProvider, RelayProvider};
