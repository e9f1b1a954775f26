use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;

use common_keys::KeyStore;

use crate::config::RelayConfig;
use crate::handlers::{health, metrics, provider_callback, provider_login, public_keys};
use crate::metrics::RelayMetrics;
use crate::providers::IdentityExchange;
use crate::tokens::TokenIssuer;

/// Shared application state. The key store is fully initialized before the
/// router is built, so every handler sees a READY store.
#[derive(Clone)]
pub struct AppState {
    pub key_store: Arc<KeyStore>,
    pub issuer: Arc<TokenIssuer>,
    pub exchange: Arc<dyn IdentityExchange>,
    pub config: Arc<RelayConfig>,
    pub metrics: Arc<RelayMetrics>,
}

impl FromRef<AppState> for Arc<KeyStore> {
    fn from_ref(state: &AppState) -> Self {
        state.key_store.clone()
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.issuer.clone()
    }
}

impl FromRef<AppState> for Arc<RelayConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route("/keys", get(public_keys))
        .route("/oauth/:provider/login", get(provider_login))
        .route("/oauth/:provider/callback", get(provider_callback))
        .with_state(state)
}
