use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a password into an argon2 PHC string with a fresh salt.
#[tracing::instrument(name = "Hashing user password", skip(password))]
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("failed to hash password: {}", err))?;

    Ok(hash.to_string())
}

#[tracing::instrument(name = "Verifying user password", skip(hash, password))]
pub fn verify_password(hash: &str, password: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Argon2::default().verify_password(password.as_bytes(), &parsed_hash)
}

/// [`hash_password`] on the blocking pool, so request workers are not stuck
/// behind argon2.
pub async fn spawn_hash_password(password: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool. `Ok(false)` means the password
/// does not match; errors are reserved for unusable hashes.
pub async fn spawn_verify_password(hash: String, password: String) -> anyhow::Result<bool> {
    match tokio::task::spawn_blocking(move || verify_password(&hash, &password)).await? {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(anyhow::anyhow!("failed to verify password: {}", err)),
    }
}
