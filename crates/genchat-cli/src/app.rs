//! Application state and logic.
//!
//! `App` owns the API client and the chat transcript, and decides which
//! screen is shown: the login/register form or the chat.

use genchat_core::{ApiClient, ApiError, Config};
use tracing::{error, info, warn};

use crate::chat::Transcript;
use crate::input::{parse_chat_line, validate_credentials, ChatCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn toggle(&self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Sign in",
            AuthMode::Register => "Create account",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth(AuthMode),
    Chat,
    Quitting,
}

/// Result of submitting the login/register form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    LoggedIn { username: String },
    Registered { message: String },
    /// Rejected by the form checks or the server
    Failed(String),
}

/// Result of one line typed on the chat screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Ignored,
    Reply(String),
    /// Generation failed; the session is still usable
    Failed(String),
    Cleared,
    Help,
    LoggedOut,
    /// The token is gone and the user has to log in again
    SessionEnded(String),
    Quit,
}

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub transcript: Transcript,
    pub screen: Screen,
}

impl App {
    /// Start on the chat if a token survived from a previous run
    pub fn new(config: Config, api: ApiClient) -> Self {
        let screen = if api.is_authenticated() {
            info!("Found stored token, resuming session");
            Screen::Chat
        } else {
            Screen::Auth(AuthMode::Login)
        };

        Self {
            config,
            api,
            transcript: Transcript::new(),
            screen,
        }
    }

    pub fn auth_mode(&self) -> Option<AuthMode> {
        match self.screen {
            Screen::Auth(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn toggle_auth_mode(&mut self) {
        if let Screen::Auth(mode) = self.screen {
            self.screen = Screen::Auth(mode.toggle());
        }
    }

    pub fn quit(&mut self) {
        self.screen = Screen::Quitting;
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the form in the current mode
    pub async fn submit_auth(&mut self, username: &str, password: &str) -> AuthOutcome {
        let Some(mode) = self.auth_mode() else {
            return AuthOutcome::Failed("Already signed in".to_string());
        };

        if let Err(msg) = validate_credentials(username, password) {
            return AuthOutcome::Failed(msg);
        }

        match mode {
            AuthMode::Login => match self.api.login(username, password).await {
                Ok(_) => {
                    self.config.last_username = Some(username.to_string());
                    self.transcript.clear();
                    self.screen = Screen::Chat;
                    AuthOutcome::LoggedIn {
                        username: username.to_string(),
                    }
                }
                Err(e) => {
                    error!(error = %e, "Login failed");
                    AuthOutcome::Failed(Self::user_message(&e))
                }
            },
            AuthMode::Register => match self.api.register(username, password).await {
                Ok(confirmation) => {
                    self.config.last_username = Some(username.to_string());
                    self.screen = Screen::Auth(AuthMode::Login);
                    AuthOutcome::Registered {
                        message: confirmation.message,
                    }
                }
                Err(e) => {
                    error!(error = %e, "Registration failed");
                    AuthOutcome::Failed(Self::user_message(&e))
                }
            },
        }
    }

    // =========================================================================
    // Chat
    // =========================================================================

    pub async fn handle_chat_line(&mut self, line: &str) -> ChatOutcome {
        match parse_chat_line(line) {
            ChatCommand::Empty => ChatOutcome::Ignored,
            ChatCommand::Help => ChatOutcome::Help,
            ChatCommand::Quit => {
                self.quit();
                ChatOutcome::Quit
            }
            ChatCommand::NewChat => {
                self.transcript.clear();
                ChatOutcome::Cleared
            }
            ChatCommand::Logout => {
                if let Err(e) = self.api.logout() {
                    warn!(error = %e, "Failed to clear token on logout");
                }
                self.transcript.clear();
                self.screen = Screen::Auth(AuthMode::Login);
                ChatOutcome::LoggedOut
            }
            ChatCommand::Send(text) => self.send(text).await,
        }
    }

    async fn send(&mut self, text: String) -> ChatOutcome {
        let result = self.api.generate(&text).await;

        match result {
            Ok(reply) => {
                self.transcript.push_user(text);
                self.transcript.push_assistant(reply.clone());
                ChatOutcome::Reply(reply)
            }
            Err(e) if e.requires_login() => {
                warn!(error = %e, "Session ended");
                self.screen = Screen::Auth(AuthMode::Login);
                ChatOutcome::SessionEnded(e.to_string())
            }
            Err(e) => {
                let message = Self::user_message(&e);
                self.transcript.push_user(text);
                self.transcript.push_error(message.clone());
                ChatOutcome::Failed(message)
            }
        }
    }

    /// Short message for display; server messages are passed through
    fn user_message(e: &ApiError) -> String {
        match e {
            ApiError::Auth(message) => message.clone(),
            ApiError::Network(err) if err.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check that the backend is running.".to_string()
            }
            other => other.to_string(),
        }
    }
}
