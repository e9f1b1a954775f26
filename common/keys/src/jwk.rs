use serde::{Deserialize, Serialize};

/// Usage tag carried by keys intended for token signatures.
pub const USE_SIGNATURE: &str = "sig";

/// The only signing algorithm the relay issues tokens with.
pub const ALG_RS256: &str = "RS256";

/// Public half of a signing key, shaped for a JWKS consumer.
#[derive(Clone, Serialize)]
pub struct PublicJwk {
    pub kty: &'static str,
    #[serde(rename = "use")]
    pub use_: &'static str,
    pub kid: String,
    pub alg: String,
    pub n: String,
    pub e: String,
}

/// Persisted form of one signing key, private material included.
///
/// The `n`/`e` components are derived from the PEM and stored alongside it
/// so the file doubles as a readable record of the public material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredKey {
    pub kid: String,
    pub kty: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub alg: String,
    pub n: String,
    pub e: String,
    pub private_pem: String,
}

/// Full serialized key store. Never leaves the persistence boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySetDocument {
    pub keys: Vec<StoredKey>,
}
