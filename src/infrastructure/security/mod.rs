pub mod argon2_hasher;
pub mod token_generator;

pub use argon2_hasher::Argon2PasswordHasher;
pub use token_generator::SecureTokenGenerator;
