use std::sync::Arc;

use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Map, Value};
use tempfile::tempdir;

use common_keys::{KeyStore, KeyStoreFile};
use login_relay::config::TokenConfig;
use login_relay::tokens::TokenIssuer;

fn token_config() -> TokenConfig {
    TokenConfig {
        issuer: "login-relay".to_string(),
        subject: "auth".to_string(),
        ttl_seconds: 86_400,
    }
}

fn decoding_key_for(store: &KeyStore) -> Result<DecodingKey> {
    let public = store.export_public();
    assert_eq!(public.len(), 1);
    Ok(DecodingKey::from_rsa_components(
        &public[0].n,
        &public[0].e,
    )?)
}

/// A token issued after a process restart must verify against the public
/// material the first process exposed, and vice versa.
#[test]
fn tokens_survive_a_restart_of_the_key_store() -> Result<()> {
    let dir = tempdir()?;
    let file = KeyStoreFile::new(dir.path().join("keys.json"));

    let first_boot = Arc::new(KeyStore::bootstrap(&file, 2048)?);
    let second_boot = Arc::new(KeyStore::bootstrap(&file, 2048)?);

    let mut custom = Map::new();
    custom.insert("provider".to_string(), json!("google"));
    custom.insert("id".to_string(), json!("user-7"));
    let token = TokenIssuer::new(second_boot.clone(), token_config()).issue(custom)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&["login-relay"]);

    let against_first = decode::<Value>(&token, &decoding_key_for(&first_boot)?, &validation)?;
    assert_eq!(against_first.claims["provider"], "google");
    assert_eq!(against_first.claims["id"], "user-7");
    assert_eq!(against_first.claims["sub"], "auth");

    let against_second = decode::<Value>(&token, &decoding_key_for(&second_boot)?, &validation)?;
    assert_eq!(against_second.claims["sub"], "auth");

    Ok(())
}

#[test]
fn corrupted_store_regenerates_and_new_tokens_verify() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("keys.json");
    std::fs::write(&path, b"\"keys\": half a document")?;

    let file = KeyStoreFile::new(&path);
    let store = Arc::new(KeyStore::bootstrap(&file, 2048)?);

    let token = TokenIssuer::new(store.clone(), token_config()).issue(Map::new())?;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&["login-relay"]);
    let decoded = decode::<Value>(&token, &decoding_key_for(&store)?, &validation)?;
    assert_eq!(decoded.claims["iss"], "login-relay");

    // The rewritten file restores cleanly on the next boot.
    let rebooted = KeyStore::bootstrap(&file, 2048)?;
    assert_eq!(rebooted.export_public().len(), 1);

    Ok(())
}
