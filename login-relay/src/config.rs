use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSameSite {
    Lax,
    Strict,
    None,
}

impl CookieSameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookieSameSite::Lax => "Lax",
            CookieSameSite::Strict => "Strict",
            CookieSameSite::None => "None",
        }
    }
}

/// Registered-claim configuration for issued tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Issuer claim (iss) identifying this relay.
    pub issuer: String,
    /// Fixed subject claim (sub); not a per-user identity.
    pub subject: String,
    /// Validity window in seconds (exp = iat + ttl).
    pub ttl_seconds: i64,
}

/// Delivery cookie for the issued token. The 60 second default max age is
/// far shorter than the token's own validity window; both knobs are
/// deliberate configuration rather than a reconciled value.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub max_age_seconds: i64,
    pub secure: bool,
    pub same_site: CookieSameSite,
}

impl CookieConfig {
    pub fn header_value(&self, token: &str) -> String {
        let mut value = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite={}",
            self.name,
            token,
            self.max_age_seconds,
            self.same_site.as_str()
        );
        if self.secure {
            value.push_str("; Secure");
        }
        value
    }
}

/// Endpoints and credentials for one identity provider. The exchange
/// plumbing is generic; providers differ only in this data.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Field of the userinfo response holding the provider-scoped user id.
    pub id_field: String,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub token: TokenConfig,
    pub cookie: CookieConfig,
    pub key_store_path: PathBuf,
    pub rsa_bits: usize,
    pub redirect_after_login: String,
    pub providers: HashMap<String, ProviderConfig>,
}

const PROVIDER_NAMES: &[&str] = &["kakao", "google"];

pub fn load_relay_config() -> Result<RelayConfig> {
    let issuer = env::var("RELAY_ISSUER").unwrap_or_else(|_| "login-relay".to_string());
    let subject = env::var("RELAY_SUBJECT").unwrap_or_else(|_| "auth".to_string());
    let ttl_seconds = int_from_env("RELAY_TOKEN_TTL_SECONDS")?.unwrap_or(86_400);

    let cookie_name = env::var("RELAY_COOKIE_NAME").unwrap_or_else(|_| "token".to_string());
    let cookie_max_age = int_from_env("RELAY_COOKIE_MAX_AGE_SECONDS")?.unwrap_or(60);
    let cookie_secure = bool_from_env("RELAY_COOKIE_SECURE").unwrap_or(false);
    let cookie_same_site = env::var("RELAY_COOKIE_SAMESITE")
        .ok()
        .map(|value| parse_same_site(&value))
        .transpose()
        .context("Failed to parse RELAY_COOKIE_SAMESITE")?
        .unwrap_or(CookieSameSite::Lax);

    let key_store_path = env::var("RELAY_KEY_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("keys.json"));
    let rsa_bits = int_from_env("RELAY_RSA_BITS")?
        .map(usize::try_from)
        .transpose()
        .map_err(|_| anyhow!("RELAY_RSA_BITS must be a positive integer"))?
        .unwrap_or(2048);

    let redirect_after_login =
        env::var("RELAY_REDIRECT_AFTER_LOGIN").unwrap_or_else(|_| "/".to_string());

    let mut providers = HashMap::new();
    for name in PROVIDER_NAMES {
        if let Some(provider) = load_provider_config(name)? {
            providers.insert(provider.name.clone(), provider);
        }
    }

    Ok(RelayConfig {
        token: TokenConfig {
            issuer,
            subject,
            ttl_seconds,
        },
        cookie: CookieConfig {
            name: cookie_name,
            max_age_seconds: cookie_max_age,
            secure: cookie_secure,
            same_site: cookie_same_site,
        },
        key_store_path,
        rsa_bits,
        redirect_after_login,
        providers,
    })
}

/// A provider is registered only when its client id is configured.
fn load_provider_config(name: &str) -> Result<Option<ProviderConfig>> {
    let prefix = name.to_ascii_uppercase();
    let client_id = match env::var(format!("{prefix}_CLIENT_ID"))
        .ok()
        .and_then(|value| normalize_optional(&value))
    {
        Some(value) => value,
        None => return Ok(None),
    };

    let defaults = provider_defaults(name)
        .ok_or_else(|| anyhow!("No endpoint defaults for provider '{name}'"))?;

    let redirect_uri = env::var(format!("{prefix}_REDIRECT_URI"))
        .with_context(|| format!("{prefix}_REDIRECT_URI must be set when {prefix}_CLIENT_ID is"))?;
    let client_secret = env::var(format!("{prefix}_CLIENT_SECRET"))
        .ok()
        .and_then(|value| normalize_optional(&value));
    let scope = env::var(format!("{prefix}_SCOPE"))
        .ok()
        .and_then(|value| normalize_optional(&value))
        .or_else(|| defaults.scope.map(str::to_string));

    Ok(Some(ProviderConfig {
        name: name.to_string(),
        client_id,
        client_secret,
        redirect_uri,
        scope,
        auth_url: env::var(format!("{prefix}_AUTH_URL"))
            .unwrap_or_else(|_| defaults.auth_url.to_string()),
        token_url: env::var(format!("{prefix}_TOKEN_URL"))
            .unwrap_or_else(|_| defaults.token_url.to_string()),
        userinfo_url: env::var(format!("{prefix}_USERINFO_URL"))
            .unwrap_or_else(|_| defaults.userinfo_url.to_string()),
        id_field: env::var(format!("{prefix}_ID_FIELD"))
            .unwrap_or_else(|_| defaults.id_field.to_string()),
    }))
}

struct ProviderDefaults {
    auth_url: &'static str,
    token_url: &'static str,
    userinfo_url: &'static str,
    id_field: &'static str,
    scope: Option<&'static str>,
}

fn provider_defaults(name: &str) -> Option<ProviderDefaults> {
    match name {
        "kakao" => Some(ProviderDefaults {
            auth_url: "https://kauth.kakao.com/oauth/authorize",
            token_url: "https://kauth.kakao.com/oauth/token",
            userinfo_url: "https://kapi.kakao.com/v2/user/me",
            id_field: "id",
            scope: None,
        }),
        "google" => Some(ProviderDefaults {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
            token_url: "https://oauth2.googleapis.com/token",
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo",
            id_field: "sub",
            scope: Some("openid"),
        }),
        _ => None,
    }
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn int_from_env(key: &str) -> Result<Option<i64>> {
    env::var(key)
        .ok()
        .map(|value| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|err| anyhow!("Invalid value for {key}: {err}"))
        })
        .transpose()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_same_site(value: &str) -> Result<CookieSameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(CookieSameSite::Lax),
        "strict" => Ok(CookieSameSite::Strict),
        "none" => Ok(CookieSameSite::None),
        other => Err(anyhow!(
            "Unsupported cookie same-site policy '{other}'. Use Lax, Strict, or None."
        )),
    }
}
