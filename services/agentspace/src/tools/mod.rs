//! Shared tooling for the admin agents
//!
//! - `gcp_auth`: bearer tokens for Google REST APIs

pub mod gcp_auth;

pub use gcp_auth::{TokenProvider, TokenSource};
