//! HTTP adapter: DTOs, error mapping, middleware, handlers and routing.

pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
