pub mod config;
pub mod events;
pub mod persistence;
pub mod security;
