pub mod entities;
pub mod errors;
pub mod events;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use entities::{ActivationToken, User, UserStatus};
pub use errors::UserError;
pub use events::{DomainEvent, EventPayload};
pub use services::{UserChanges, UserService, UserServiceConfig};
