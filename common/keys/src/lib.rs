pub mod error;
pub mod jwk;
pub mod persistence;
pub mod store;

pub use error::{KeyError, KeyResult};
pub use jwk::{KeySetDocument, PublicJwk, StoredKey, ALG_RS256, USE_SIGNATURE};
pub use persistence::KeyStoreFile;
pub use store::{KeyStore, SigningKey};
