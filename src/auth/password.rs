use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use error_stack::{Report, Result, ResultExt};
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::task::spawn_blocking;

use crate::util::Sensitive;

static CONTEXT: Lazy<Argon2<'static>> = Lazy::new(|| {
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::default(),
    )
});

#[derive(Debug, Error)]
#[error("Failed to generate password hash")]
pub struct HashPasswordError;

/// Hashes `password` with Argon2id and a random salt, returning the
/// PHC string (`$argon2id$v=19$...`).
pub fn hash(password: &[u8]) -> Result<String, HashPasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = CONTEXT
        .hash_password(password, &salt)
        .map_err(|e| Report::new(HashPasswordError).attach_printable(e.to_string()))?;

    Ok(password_hash.to_string())
}

#[derive(Debug, Error)]
#[error("Failed to verify password")]
pub struct VerifyPasswordError;

/// Compares `password` against a PHC string. The comparison itself is
/// constant-time.
pub fn verify(password: &[u8], hash: &str) -> Result<bool, VerifyPasswordError> {
    let hash = PasswordHash::new(hash).map_err(|e| {
        Report::new(VerifyPasswordError)
            .attach_printable(e.to_string())
            .attach_printable("could not parse password hash")
    })?;

    match CONTEXT.verify_password(password, &hash) {
        Ok(..) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => Err(Report::new(VerifyPasswordError).attach_printable(error.to_string())),
    }
}

/// Runs [`hash`] on the blocking thread pool.
#[tracing::instrument(skip_all, name = "auth.password.hash")]
pub async fn hash_blocking(password: Sensitive<String>) -> Result<Sensitive<String>, HashPasswordError> {
    spawn_blocking(move || hash(password.as_bytes()).map(Sensitive::new))
        .await
        .change_context(HashPasswordError)?
}

/// Runs [`verify`] on the blocking thread pool.
#[tracing::instrument(skip_all, name = "auth.password.verify")]
pub async fn verify_blocking(
    password: Sensitive<String>,
    hash: Sensitive<String>,
) -> Result<bool, VerifyPasswordError> {
    spawn_blocking(move || verify(password.as_bytes(), hash.as_str()))
        .await
        .change_context(VerifyPasswordError)?
}
