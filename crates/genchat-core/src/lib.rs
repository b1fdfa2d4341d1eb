//! Core library for genchat.
//!
//! This crate provides:
//! - `auth`: the single-slot token store and its pluggable storage backends
//! - `api`: the HTTP client for the login, register and generate endpoints
//! - `models`: request/response types shared with the backend
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthState};
pub use auth::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StoreError, Token, TokenStore};
pub use config::{Config, TokenBackend};
pub use models::{Confirmation, Credentials};
