use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};
use serde_json::{json, Map, Value};

use common_keys::{KeyError, KeyResult, KeyStore};

use crate::config::TokenConfig;

/// Stateless token issuance over the shared key store. Reads the store,
/// never mutates it; safe to call from any number of handlers at once.
pub struct TokenIssuer {
    store: Arc<KeyStore>,
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(store: Arc<KeyStore>, config: TokenConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Sign the supplied claims into a compact RS256 token.
    ///
    /// Registered claims are written after the caller's, so `iss`, `sub`,
    /// `iat` and `exp` cannot be overridden by custom claims.
    pub fn issue(&self, custom_claims: Map<String, Value>) -> KeyResult<String> {
        let key = self.store.first_signing_key()?;

        let issued_at = Utc::now().timestamp();
        let expires_at = issued_at + self.config.ttl_seconds;

        let mut claims = custom_claims;
        claims.insert("iss".to_string(), json!(self.config.issuer));
        claims.insert("sub".to_string(), json!(self.config.subject));
        claims.insert("iat".to_string(), json!(issued_at));
        claims.insert("exp".to_string(), json!(expires_at));

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key.kid().to_string());

        encode(&header, &Value::Object(claims), key.encoding_key())
            .map_err(|err| KeyError::Signing(err.to_string()))
    }
}
