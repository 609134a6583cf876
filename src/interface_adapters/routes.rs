use crate::interface_adapters::handlers::{get_ice_server_token, revoke_tokens};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{any, post},
};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the HTTP routes to their handlers.
    let mut router = Router::new().route("/api/getIceServerToken", any(get_ice_server_token));
    if state.revoke_route_enabled {
        router = router.route("/api/identities/{identity}/revokeTokens", post(revoke_tokens));
    }
    router.with_state(state)
}
