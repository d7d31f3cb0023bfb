use rand::RngCore;

use crate::domain::auth::ports::TokenGenerator;

/// Token generator backed by the OS's cryptographically secure RNG
///
/// Produces 256-bit tokens encoded as 64 lowercase hex characters, used
/// for activation tokens.
pub struct SecureTokenGenerator;

impl SecureTokenGenerator {
  pub fn new() -> Self {
    Self
  }
}

impl Default for SecureTokenGenerator {
  fn default() -> Self {
    Self::new()
  }
}

impl TokenGenerator for SecureTokenGenerator {
  fn generate(&self) -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_generates_hex_tokens() {
    let generator = SecureTokenGenerator::new();
    let token = generator.generate();

    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn test_tokens_are_unique() {
    let generator = SecureTokenGenerator::new();
    let a = generator.generate();
    let b = generator.generate();

    assert_ne!(a, b);
  }
}
