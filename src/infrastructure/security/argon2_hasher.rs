use argon2::password_hash::SaltString;
use argon2::{
  Algorithm, Argon2, Params, Version,
  password_hash::{
    PasswordHash as Argon2PasswordHash, PasswordHasher as Argon2PasswordHasherTrait,
    PasswordVerifier,
  },
};
use async_trait::async_trait;

use crate::domain::auth::errors::HashError;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::value_objects::Password;

/// Argon2id password hasher implementation
///
/// Uses the Argon2id algorithm with secure parameters:
/// - Memory cost: 19 MiB (19456 KiB)
/// - Time cost: 2 iterations
/// - Parallelism: 1 thread
pub struct Argon2PasswordHasher {
  argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
  /// Creates a new Argon2PasswordHasher with the standard parameters
  pub fn new() -> Result<Self, HashError> {
    let memory_cost = 19456; // KiB
    let time_cost = 2;
    let parallelism = 1;
    let output_len = Some(32);

    let params = Params::new(memory_cost, time_cost, parallelism, output_len)
      .map_err(|e| HashError::HashingFailed(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    Ok(Self { argon2 })
  }
}

impl Default for Argon2PasswordHasher {
  fn default() -> Self {
    Self::new().expect("Failed to create default Argon2PasswordHasher")
  }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
  /// Hashes a plain text password into a PHC-format Argon2id string
  async fn hash(&self, password: &Password) -> Result<String, HashError> {
    // Random salt from the OS's cryptographically secure RNG
    let salt = SaltString::generate(&mut rand::rngs::OsRng);

    let hash = self
      .argon2
      .hash_password(password.as_str().as_bytes(), &salt)
      .map_err(|e| HashError::HashingFailed(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
  }

  /// Verifies a plain text password against a stored hash
  ///
  /// The underlying verify_password performs a constant-time comparison.
  async fn verify(&self, password: &Password, password_hash: &str) -> Result<bool, HashError> {
    let parsed_hash = Argon2PasswordHash::new(password_hash)
      .map_err(|_| HashError::InvalidFormat)?;

    match self
      .argon2
      .verify_password(password.as_str().as_bytes(), &parsed_hash)
    {
      Ok(_) => Ok(true),
      Err(argon2::password_hash::Error::Password) => Ok(false),
      Err(e) => Err(HashError::VerificationFailed(format!(
        "Password verification failed: {}",
        e
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_hash_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("TestPassword123").unwrap();

    let hash = hasher.hash(&password).await.unwrap();
    assert!(hash.starts_with("$argon2id$"));
  }

  #[tokio::test]
  async fn test_verify_correct_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("TestPassword123").unwrap();

    let hash = hasher.hash(&password).await.unwrap();
    assert!(hasher.verify(&password, &hash).await.unwrap());
  }

  #[tokio::test]
  async fn test_verify_incorrect_password() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("TestPassword123").unwrap();
    let wrong_password = Password::new("WrongPassword123").unwrap();

    let hash = hasher.hash(&password).await.unwrap();
    assert!(!hasher.verify(&wrong_password, &hash).await.unwrap());
  }

  #[tokio::test]
  async fn test_hash_produces_different_salts() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("TestPassword123").unwrap();

    let hash1 = hasher.hash(&password).await.unwrap();
    let hash2 = hasher.hash(&password).await.unwrap();

    // Same password, different salt, different hash
    assert_ne!(hash1, hash2);

    assert!(hasher.verify(&password, &hash1).await.unwrap());
    assert!(hasher.verify(&password, &hash2).await.unwrap());
  }

  #[tokio::test]
  async fn test_verify_invalid_hash_format() {
    let hasher = Argon2PasswordHasher::new().unwrap();
    let password = Password::new("TestPassword123").unwrap();

    let result = hasher.verify(&password, "not-a-phc-hash").await;
    assert!(matches!(result, Err(HashError::InvalidFormat)));
  }
}
