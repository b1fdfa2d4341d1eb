//! Authentication state for the client.
//!
//! This module provides:
//! - `TokenStore`: holds at most one bearer token under a fixed key
//! - `KeyValueStore`: the durable storage capability the token store writes to,
//!   with in-memory, file and OS keychain implementations
//!
//! A present token means the client is treated as logged in; an absent one
//! means it is not.

pub mod storage;
pub mod token;

pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StoreError};
pub use token::{Token, TokenStore, TOKEN_KEY};
