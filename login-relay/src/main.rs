use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use common_keys::{KeyStore, KeyStoreFile};
use login_relay::config::load_relay_config;
use login_relay::metrics::RelayMetrics;
use login_relay::providers::HttpIdentityExchange;
use login_relay::tokens::TokenIssuer;
use login_relay::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_relay_config()?;
    if config.rsa_bits < 2048 {
        warn!(
            bits = config.rsa_bits,
            "configured RSA key size is below 2048 bits"
        );
    }
    if config.providers.is_empty() {
        warn!("no identity providers configured; only /keys will be useful");
    }

    // Key material must be ready before the listener binds: no request
    // handler may ever observe an uninitialized store.
    let store_file = KeyStoreFile::new(&config.key_store_path);
    let key_store = Arc::new(KeyStore::bootstrap(&store_file, config.rsa_bits)?);

    let issuer = Arc::new(TokenIssuer::new(key_store.clone(), config.token.clone()));
    let exchange = Arc::new(HttpIdentityExchange::new(config.providers.clone()));
    let metrics = Arc::new(RelayMetrics::new()?);
    let state = AppState {
        key_store,
        issuer,
        exchange,
        config: Arc::new(config),
        metrics,
    };

    // /keys is meant for cross-origin verifiers.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let app = router(state).layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));

    println!("starting login-relay on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
