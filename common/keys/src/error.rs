use std::path::PathBuf;

use thiserror::Error;

pub type KeyResult<T> = Result<T, KeyError>;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to generate RSA signing key: {0}")]
    Generation(String),
    #[error("failed to decode persisted key set: {0}")]
    Deserialization(String),
    #[error("no persisted key set at '{}'", .0.display())]
    NotFound(PathBuf),
    #[error("failed to persist key set to '{}': {}", .path.display(), .reason)]
    Persistence { path: PathBuf, reason: String },
    #[error("key store holds no signing key")]
    NoSigningKey,
    #[error("token signing failed: {0}")]
    Signing(String),
}
