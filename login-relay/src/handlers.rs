use axum::extract::{Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use tracing::{error, warn};

use common_keys::PublicJwk;

use crate::providers::ExchangeError;
use crate::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

/// HTTP-facing failure. Messages stay generic; the underlying error is
/// logged where the failure happens, never returned to the caller.
#[derive(Debug)]
pub struct RelayError {
    status: StatusCode,
    body: ErrorResponse,
}

impl RelayError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    fn unknown_provider(provider: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "UNKNOWN_PROVIDER",
            format!("No identity provider named '{provider}' is configured."),
        )
    }

    fn login_rejected() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "LOGIN_REJECTED",
            "The identity provider did not complete the login.",
        )
    }

    fn exchange_failed() -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            "EXCHANGE_FAILED",
            "Could not complete the login with the identity provider.",
        )
    }

    fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVER_ERROR",
            "Login could not be completed.",
        )
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Unauthenticated discovery endpoint: the public half of every
/// signature-usage key, as a JSON array.
pub async fn public_keys(State(state): State<AppState>) -> Json<Vec<PublicJwk>> {
    Json(state.key_store.export_public())
}

pub async fn provider_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, RelayError> {
    match state.exchange.authorize_url(&provider) {
        Some(url) => Ok(Redirect::temporary(&url)),
        None => Err(RelayError::unknown_provider(&provider)),
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
}

/// Callback orchestration: complete the provider login, mint a token over
/// the resulting identity, deliver it as a cookie, redirect onward.
pub async fn provider_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, RelayError> {
    if let Some(reason) = query.error {
        warn!(%provider, %reason, "provider reported a failed login");
        state.metrics.login_attempt(&provider, "rejected");
        return Err(RelayError::login_rejected());
    }
    let code = query.code.ok_or_else(|| {
        warn!(%provider, "callback arrived without an authorization code");
        RelayError::login_rejected()
    })?;

    let identity = state
        .exchange
        .complete_login(&provider, &code)
        .await
        .map_err(|err| {
            warn!(error = %err, %provider, "login exchange failed");
            state.metrics.login_attempt(&provider, "exchange_failed");
            match err {
                ExchangeError::UnknownProvider(_) => RelayError::unknown_provider(&provider),
                _ => RelayError::exchange_failed(),
            }
        })?;

    let mut claims = Map::new();
    claims.insert("provider".to_string(), json!(identity.provider));
    claims.insert("id".to_string(), json!(identity.id));

    let token = state.issuer.issue(claims).map_err(|err| {
        error!(error = %err, %provider, "token issuance failed");
        state.metrics.login_attempt(&provider, "issue_failed");
        RelayError::internal_error()
    })?;

    state.metrics.login_attempt(&provider, "success");
    state.metrics.token_issued();

    let cookie = state.config.cookie.header_value(&token);
    Ok((
        [(SET_COOKIE, cookie)],
        Redirect::to(&state.config.redirect_after_login),
    )
        .into_response())
}
