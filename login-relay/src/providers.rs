use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::config::ProviderConfig;

/// Stable external identity extracted from a completed provider login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub provider: String,
    pub id: String,
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("unknown identity provider '{0}'")]
    UnknownProvider(String),
    #[error("provider '{provider}' login exchange failed: {reason}")]
    Exchange { provider: String, reason: String },
    #[error("provider '{provider}' profile response missing field '{field}'")]
    MissingId { provider: String, field: String },
}

/// Boundary to the identity providers. The relay core only ever sees the
/// authorization redirect target and the resulting `ProviderIdentity`.
#[async_trait]
pub trait IdentityExchange: Send + Sync {
    /// Authorization URL to redirect the user to, if the provider is known.
    fn authorize_url(&self, provider: &str) -> Option<String>;

    /// Complete a callback: trade the authorization code for the
    /// provider-scoped user id.
    async fn complete_login(
        &self,
        provider: &str,
        code: &str,
    ) -> Result<ProviderIdentity, ExchangeError>;
}

/// Config-driven implementation: a generic code -> token -> userinfo
/// exchange with per-provider endpoints and credentials.
pub struct HttpIdentityExchange {
    client: Client,
    providers: HashMap<String, ProviderConfig>,
}

impl HttpIdentityExchange {
    pub fn new(providers: HashMap<String, ProviderConfig>) -> Self {
        Self {
            client: Client::new(),
            providers,
        }
    }

    pub fn with_client(client: Client, providers: HashMap<String, ProviderConfig>) -> Self {
        Self { client, providers }
    }

    fn provider(&self, name: &str) -> Result<&ProviderConfig, ExchangeError> {
        self.providers
            .get(name)
            .ok_or_else(|| ExchangeError::UnknownProvider(name.to_string()))
    }

    fn exchange_error(provider: &str, reason: impl Into<String>) -> ExchangeError {
        ExchangeError::Exchange {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl IdentityExchange for HttpIdentityExchange {
    fn authorize_url(&self, provider: &str) -> Option<String> {
        let config = self.providers.get(provider)?;
        let mut url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}",
            config.auth_url,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.redirect_uri)
        );
        if let Some(scope) = &config.scope {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(scope));
        }
        Some(url)
    }

    async fn complete_login(
        &self,
        provider: &str,
        code: &str,
    ) -> Result<ProviderIdentity, ExchangeError> {
        let config = self.provider(provider)?;

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code", code),
        ];
        if let Some(secret) = &config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let token_response = self
            .client
            .post(&config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| Self::exchange_error(provider, err.to_string()))?;
        if !token_response.status().is_success() {
            return Err(Self::exchange_error(
                provider,
                format!("HTTP {} from token endpoint", token_response.status()),
            ));
        }
        let token_body: Value = token_response
            .json()
            .await
            .map_err(|err| Self::exchange_error(provider, err.to_string()))?;
        let access_token = token_body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| Self::exchange_error(provider, "token response missing access_token"))?;

        let profile_response = self
            .client
            .get(&config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| Self::exchange_error(provider, err.to_string()))?;
        if !profile_response.status().is_success() {
            return Err(Self::exchange_error(
                provider,
                format!("HTTP {} from userinfo endpoint", profile_response.status()),
            ));
        }
        let profile: Value = profile_response
            .json()
            .await
            .map_err(|err| Self::exchange_error(provider, err.to_string()))?;

        // Kakao returns a numeric id, Google a string; both become strings.
        let id = match profile.get(&config.id_field) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => {
                return Err(ExchangeError::MissingId {
                    provider: provider.to_string(),
                    field: config.id_field.clone(),
                })
            }
        };

        Ok(ProviderIdentity {
            provider: provider.to_string(),
            id,
        })
    }
}
