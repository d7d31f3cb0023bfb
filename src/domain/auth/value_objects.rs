use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::ValidateEmail;
use zeroize::Zeroize;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ValueObjectError {
  #[error("Invalid email format: {0}")]
  InvalidEmail(String),

  #[error("Email is too long (maximum 255 characters)")]
  EmailTooLong,

  #[error("Password is too short (minimum 8 characters)")]
  PasswordTooShort,

  #[error("Password is too long (maximum 128 characters)")]
  PasswordTooLong,

  #[error(
    "Password must contain at least one uppercase letter, one lowercase letter and one digit"
  )]
  PasswordTooWeak,

  #[error("Name must not be empty")]
  NameEmpty,

  #[error("Name is too long (maximum 100 characters)")]
  NameTooLong,

  #[error("Name may only contain letters, spaces, hyphens and apostrophes")]
  NameInvalidCharacters,

  #[error("Invalid token format")]
  InvalidToken,
}

// ============================================================================
// Email Value Object
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
  const MAX_LENGTH: usize = 255;

  /// Creates a new Email after validation, normalized to lowercase
  pub fn new(email: impl Into<String>) -> Result<Self, ValueObjectError> {
    let email = email.into();

    if email.len() > Self::MAX_LENGTH {
      return Err(ValueObjectError::EmailTooLong);
    }

    if !email.validate_email() {
      return Err(ValueObjectError::InvalidEmail(email));
    }

    Ok(Self(email.to_lowercase()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl AsRef<str> for Email {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

// ============================================================================
// Password Value Object (Plain Password - Never Stored)
// ============================================================================

#[derive(Clone)]
pub struct Password(String);

impl Password {
  const MIN_LENGTH: usize = 8;
  const MAX_LENGTH: usize = 128;

  /// Creates a new Password after validating the complexity rules:
  /// 8-128 characters with at least one uppercase letter, one lowercase
  /// letter and one digit.
  pub fn new(password: impl Into<String>) -> Result<Self, ValueObjectError> {
    let password = password.into();

    if password.len() < Self::MIN_LENGTH {
      return Err(ValueObjectError::PasswordTooShort);
    }

    if password.len() > Self::MAX_LENGTH {
      return Err(ValueObjectError::PasswordTooLong);
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
      return Err(ValueObjectError::PasswordTooWeak);
    }

    Ok(Self(password))
  }

  /// Returns the password as a string slice (use with caution)
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

// Never expose the password in logs
impl fmt::Debug for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Password(***)")
  }
}

impl fmt::Display for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("***")
  }
}

// Wipe the plain password from memory on drop
impl Drop for Password {
  fn drop(&mut self) {
    self.0.zeroize();
  }
}

// ============================================================================
// PersonName Value Object (first/last names)
// ============================================================================

lazy_static! {
  static ref NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z \-']+$").expect("valid name regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName(String);

impl PersonName {
  const MAX_LENGTH: usize = 100;

  /// Creates a new PersonName after validation.
  ///
  /// Names are limited to ASCII letters, spaces, hyphens and apostrophes.
  pub fn new(name: impl Into<String>) -> Result<Self, ValueObjectError> {
    let name = name.into();

    if name.is_empty() {
      return Err(ValueObjectError::NameEmpty);
    }

    if name.len() > Self::MAX_LENGTH {
      return Err(ValueObjectError::NameTooLong);
    }

    if !NAME_PATTERN.is_match(&name) {
      return Err(ValueObjectError::NameInvalidCharacters);
    }

    Ok(Self(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for PersonName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ============================================================================
// SessionToken Value Object (Random Secure Token)
// ============================================================================

#[derive(Clone)]
pub struct SessionToken(String);

impl SessionToken {
  const TOKEN_LENGTH: usize = 32; // 32 bytes = 256 bits

  /// Generates a new random session token (256-bit hex)
  pub fn generate() -> Self {
    use rand::RngCore;

    let mut bytes = [0u8; Self::TOKEN_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut bytes);

    Self(hex::encode(bytes))
  }

  /// Creates a SessionToken from an existing token string
  pub fn from_string(token: impl Into<String>) -> Result<Self, ValueObjectError> {
    let token = token.into();

    if token.len() != Self::TOKEN_LENGTH * 2 {
      return Err(ValueObjectError::InvalidToken);
    }

    if !token.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(ValueObjectError::InvalidToken);
    }

    Ok(Self(token))
  }

  /// Creates a SHA-256 hash of this token for storage
  pub fn hash(&self) -> TokenHash {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(self.0.as_bytes());
    let result = hasher.finalize();

    TokenHash(hex::encode(result))
  }

  /// Returns the token as a string slice (use with caution)
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0.clone()
  }
}

// Never expose the token in logs
impl fmt::Debug for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionToken(***)")
  }
}

impl fmt::Display for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("***")
  }
}

// ============================================================================
// TokenHash Value Object (SHA-256 Hash of Token)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHash(String);

impl TokenHash {
  /// Creates a TokenHash from an existing hash string
  pub fn from_hash(hash: impl Into<String>) -> Result<Self, ValueObjectError> {
    let hash = hash.into();

    // SHA-256 produces 64 hex characters
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(ValueObjectError::InvalidToken);
    }

    Ok(Self(hash))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for TokenHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_email_validation() {
    assert!(Email::new("test@example.com").is_ok());
    assert!(Email::new("user.name@domain.co.uk").is_ok());

    assert!(Email::new("invalid").is_err());
    assert!(Email::new("@example.com").is_err());
    assert!(Email::new("test@").is_err());
    assert!(Email::new("").is_err());
  }

  #[test]
  fn test_email_normalization() {
    let email = Email::new("Test@Example.COM").unwrap();
    assert_eq!(email.as_str(), "test@example.com");
  }

  #[test]
  fn test_email_max_length() {
    let local = "a".repeat(250);
    let long = format!("{}@example.com", local);
    assert!(matches!(
      Email::new(long),
      Err(ValueObjectError::EmailTooLong)
    ));
  }

  #[test]
  fn test_password_validation() {
    assert!(Password::new("Password123").is_ok());

    assert!(matches!(
      Password::new("Pw1"),
      Err(ValueObjectError::PasswordTooShort)
    ));

    let long_password = format!("Aa1{}", "a".repeat(126));
    assert!(matches!(
      Password::new(long_password),
      Err(ValueObjectError::PasswordTooLong)
    ));
  }

  #[test]
  fn test_password_complexity() {
    // Missing digit
    assert!(matches!(
      Password::new("Passwording"),
      Err(ValueObjectError::PasswordTooWeak)
    ));
    // Missing uppercase
    assert!(matches!(
      Password::new("password123"),
      Err(ValueObjectError::PasswordTooWeak)
    ));
    // Missing lowercase
    assert!(matches!(
      Password::new("PASSWORD123"),
      Err(ValueObjectError::PasswordTooWeak)
    ));
  }

  #[test]
  fn test_person_name_validation() {
    assert!(PersonName::new("John").is_ok());
    assert!(PersonName::new("Mary-Jane O'Neil").is_ok());

    assert!(matches!(
      PersonName::new(""),
      Err(ValueObjectError::NameEmpty)
    ));
    assert!(matches!(
      PersonName::new("a".repeat(101)),
      Err(ValueObjectError::NameTooLong)
    ));
    assert!(matches!(
      PersonName::new("John42"),
      Err(ValueObjectError::NameInvalidCharacters)
    ));
    // ASCII-only rule rejects accented letters
    assert!(matches!(
      PersonName::new("Jürgen"),
      Err(ValueObjectError::NameInvalidCharacters)
    ));
  }

  #[test]
  fn test_session_token_generation() {
    let token1 = SessionToken::generate();
    let token2 = SessionToken::generate();

    assert_ne!(token1.as_str(), token2.as_str());

    // 32 bytes = 64 hex characters
    assert_eq!(token1.as_str().len(), 64);
    assert!(token1.as_str().chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn test_session_token_round_trip() {
    let token = SessionToken::generate();
    let parsed = SessionToken::from_string(token.as_str()).unwrap();
    assert_eq!(parsed.as_str(), token.as_str());

    assert!(SessionToken::from_string("not-hex").is_err());
    assert!(SessionToken::from_string("abcd").is_err());
  }

  #[test]
  fn test_token_hashing_is_stable() {
    let token = SessionToken::generate();
    let hash1 = token.hash();
    let hash2 = token.hash();

    assert_eq!(hash1, hash2);
    assert_eq!(hash1.as_str().len(), 64);

    let other = SessionToken::generate();
    assert_ne!(hash1, other.hash());
  }

  #[test]
  fn test_token_hash_from_hash() {
    let token = SessionToken::generate();
    let hash = token.hash();

    let parsed = TokenHash::from_hash(hash.as_str()).unwrap();
    assert_eq!(parsed, hash);

    assert!(TokenHash::from_hash("short").is_err());
  }
}
