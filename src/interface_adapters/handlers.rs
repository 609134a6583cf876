use crate::domain::{RelayTokenError, UpstreamError};
use crate::interface_adapters::protocol::{ErrorResponse, RelayTokenResponse};
use crate::interface_adapters::state::AppState;
use crate::use_cases::issue_relay_token::IssueRelayTokenUseCase;
use crate::use_cases::revoke_tokens::RevokeTokensUseCase;
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

type HandlerError = (StatusCode, Json<ErrorResponse>);

// Upstream codes longer than this, or with unexpected characters, are dropped.
const MAX_UPSTREAM_CODE_LEN: usize = 64;

// Handler for issuing an identity, two tokens and relay credentials.
// Request method, query and body are ignored.
#[tracing::instrument(
    name = "get_ice_server_token",
    skip_all,
    fields(request_id = %uuid::Uuid::new_v4())
)]
pub async fn get_ice_server_token(
    State(state): State<Arc<AppState>>,
) -> Result<Response, HandlerError> {
    // Never reach for a backend when startup config was rejected.
    let Some(backends) = state.backends.as_ref() else {
        return Err(map_relay_token_error(RelayTokenError::Configuration));
    };

    let use_case = IssueRelayTokenUseCase {
        identity: backends.identity.as_ref(),
        relay: backends.relay.as_ref(),
        short_lived_ttl: state.short_lived_token_ttl,
    };
    let bundle = use_case.execute().await.map_err(map_relay_token_error)?;

    let body = serde_json::to_vec(&RelayTokenResponse::from(bundle))
        .map_err(|err| map_relay_token_error(RelayTokenError::Serialization(err)))?;

    tracing::info!("relay token issued successfully.");
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

// Handler for revoking every token of an identity.
#[tracing::instrument(name = "revoke_tokens", skip_all, fields(identity = %identity))]
pub async fn revoke_tokens(
    State(state): State<Arc<AppState>>,
    Path(identity): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let Some(backends) = state.backends.as_ref() else {
        return Err(map_relay_token_error(RelayTokenError::Configuration));
    };

    let use_case = RevokeTokensUseCase {
        identity: backends.identity.as_ref(),
    };
    use_case
        .execute(identity)
        .await
        .map_err(map_relay_token_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// Helper to build a JSON error response.
fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    upstream_code: Option<String>,
) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
            upstream_code,
        }),
    )
}

fn map_relay_token_error(err: RelayTokenError) -> HandlerError {
    match err {
        RelayTokenError::Configuration => {
            tracing::error!("request rejected: service is not configured.");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "service is not configured",
                None,
            )
        }
        RelayTokenError::InvalidIdentity => {
            tracing::warn!("request rejected: identity is blank.");
            error_response(StatusCode::BAD_REQUEST, "identity is required", None)
        }
        RelayTokenError::Upstream(err) => map_upstream_error(err),
        RelayTokenError::Serialization(err) => {
            tracing::error!(error = %err, "failed to serialize response.");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error", None)
        }
    }
}

// 503 when the backend is throttling or unreachable, 502 when it answered badly.
fn map_upstream_error(err: UpstreamError) -> HandlerError {
    tracing::error!(
        error = %err,
        code = ?err.code,
        detail = ?err.message,
        "backend call failed."
    );

    let unavailable = err.is_unavailable();
    let code = err.code.filter(|code| is_safe_code(code));
    if unavailable {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} service unavailable", err.service),
            code,
        )
    } else {
        error_response(
            StatusCode::BAD_GATEWAY,
            format!("{} service error", err.service),
            code,
        )
    }
}

fn is_safe_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_UPSTREAM_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
