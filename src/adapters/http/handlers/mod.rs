//! HTTP request handlers
//!
//! Thin translation layer: validate the DTO, build the command, run the
//! use case, map the result back to a response DTO.

pub mod auth;
pub mod maintenance;
pub mod users;
