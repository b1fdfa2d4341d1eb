//! API client for the generation backend.
//!
//! `ApiClient` covers the account endpoints (login, register) and the
//! authenticated generate endpoint. The bearer token lives in a `TokenStore`
//! that the client writes on login and clears on logout or on a 401.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{Token, TokenStore};
use crate::config::Config;
use crate::models::{
    Confirmation, Credentials, ErrorBody, GenerateRequest, GenerateResponse, LoginResponse,
    RegisterResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";
const GENERATE_PATH: &str = "/generate";

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const GENERATE_FAILED: &str = "Generation failed";

/// Whether the client currently holds a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// API client for the generation backend.
/// Clone is cheap - reqwest::Client and TokenStore are both shared handles.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a client with no request timeout
    pub fn new(base_url: &str, tokens: TokenStore) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, tokens, None)
    }

    /// Create a client whose requests fail after `timeout` if given
    pub fn with_timeout(
        base_url: &str,
        tokens: TokenStore,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Create a client from the persisted configuration
    pub fn from_config(config: &Config, tokens: TokenStore) -> Result<Self, ApiError> {
        Self::with_timeout(&config.api_base_url, tokens, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store this client reads and writes
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn auth_state(&self) -> AuthState {
        if self.tokens.has_token() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_state() == AuthState::Authenticated
    }

    // =========================================================================
    // Account endpoints
    // =========================================================================

    /// Log in and store the returned token.
    ///
    /// Username and password are sent exactly as given.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let credentials = Credentials::new(username, password);
        debug!(username, "Sending login request");

        let response = self.post_json(LOGIN_PATH, &credentials, None).await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response, LOGIN_FAILED).await);
        }

        let body: LoginResponse = Self::parse(response).await?;
        let token = Token::from(body.token);
        self.tokens.set(&token)?;

        info!(username, "Login successful");
        Ok(token)
    }

    /// Create an account. Does not log in and never touches the token store.
    pub async fn register(&self, username: &str, password: &str) -> Result<Confirmation, ApiError> {
        let credentials = Credentials::new(username, password);
        debug!(username, "Sending register request");

        let response = self.post_json(REGISTER_PATH, &credentials, None).await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response, REGISTER_FAILED).await);
        }

        let body: RegisterResponse = Self::parse(response).await?;
        info!(username, "Registration successful");
        Ok(body.into())
    }

    /// Forget the stored token
    pub fn logout(&self) -> Result<(), ApiError> {
        self.tokens.clear()?;
        info!("Logged out");
        Ok(())
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Send a prompt and return the backend's reply verbatim.
    ///
    /// Fails with `NotAuthenticated` before any request is made when no token
    /// is stored. A 401 clears the stored token and fails with `SessionExpired`.
    pub async fn generate(&self, text: &str) -> Result<String, ApiError> {
        let token = self.tokens.get()?.ok_or(ApiError::NotAuthenticated)?;

        let request = GenerateRequest {
            text: text.to_string(),
        };
        debug!(chars = text.chars().count(), "Sending generate request");

        let response = self.post_json(GENERATE_PATH, &request, Some(&token)).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Token rejected by server, clearing session");
            if let Err(e) = self.tokens.clear() {
                warn!(error = %e, "Failed to clear rejected token");
            }
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            return Err(Self::rejection(response, GENERATE_FAILED).await);
        }

        let body: GenerateResponse = Self::parse(response).await?;
        Ok(body.response)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&Token>,
    ) -> Result<Response, ApiError> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        debug!(path, status = %response.status(), "Response received");
        Ok(response)
    }

    /// Turn a non-success response into `ApiError::Auth`, preferring the
    /// server's `detail` message over `fallback`.
    async fn rejection(response: Response, fallback: &str) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %ApiError::truncate_body(&body), "Request rejected");

        let message = ErrorBody::detail_from(&body).unwrap_or_else(|| fallback.to_string());
        ApiError::Auth(message)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("{}: {}", e, ApiError::truncate_body(&body)))
        })
    }
}
