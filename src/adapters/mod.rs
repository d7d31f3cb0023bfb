//! Inbound adapters. HTTP is the only one.

pub mod http;
