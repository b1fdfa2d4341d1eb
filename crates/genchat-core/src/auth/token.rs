use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::{KeyValueStore, MemoryStore, StoreError};

/// Storage key holding the raw token string
pub const TOKEN_KEY: &str = "auth_token";

/// Opaque bearer token issued by the backend on login.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Single-slot holder for the current token.
///
/// The store does not inspect the token. Each operation is one backend call,
/// so concurrent writers resolve last-write-wins.
/// Clone is cheap; clones share the same backend.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Token store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Get the current token, if any. An empty stored value counts as absent.
    pub fn get(&self) -> Result<Option<Token>, StoreError> {
        let value = self.backend.get(TOKEN_KEY)?;
        Ok(value.filter(|v| !v.is_empty()).map(Token))
    }

    /// Store a token, replacing any existing one
    pub fn set(&self, token: &Token) -> Result<(), StoreError> {
        self.backend.set(TOKEN_KEY, token.as_str())?;
        debug!("Token stored");
        Ok(())
    }

    /// Remove the token. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove(TOKEN_KEY)?;
        debug!("Token cleared");
        Ok(())
    }

    /// Check whether a token is present
    pub fn has_token(&self) -> bool {
        match self.get() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read token from storage");
                false
            }
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.has_token())
            .finish()
    }
}
