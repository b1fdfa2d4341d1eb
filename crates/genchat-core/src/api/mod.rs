//! HTTP client module for the generation backend.
//!
//! This module provides the `ApiClient` for the login, register and generate
//! endpoints. Generate requests carry the stored token as a bearer token.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthState};
pub use error::ApiError;
