//! Command-line flags, chat commands and login form checks.

use anyhow::Result;

/// Minimum password length accepted by the login form
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum username length accepted by the login form
pub const MAX_USERNAME_LEN: usize = 50;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub register: bool,
    pub logout: bool,
    pub ephemeral: bool,
    pub help: bool,
}

impl CliOptions {
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        for arg in args {
            match arg.as_ref() {
                "--register" => opts.register = true,
                "--logout" => opts.logout = true,
                "--ephemeral" => opts.ephemeral = true,
                "-h" | "--help" => opts.help = true,
                other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
            }
        }
        Ok(opts)
    }
}

pub const USAGE: &str = "\
Usage: genchat [OPTIONS]

Options:
  --register    Start on the account creation form
  --logout      Forget the stored token and exit
  --ephemeral   Keep the token in memory only
  -h, --help    Show this help

Environment:
  GENCHAT_API_URL        Backend base URL (default http://localhost:8000)
  GENCHAT_TOKEN_BACKEND  file | keyring | memory
  GENCHAT_USERNAME       Prefilled username
  RUST_LOG               Log filter for the log file";

pub const CHAT_HELP: &str = "\
Commands:
  /new      Start a new chat
  /logout   Log out
  /quit     Exit
  /help     Show this help";

/// A line typed on the chat screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Send(String),
    NewChat,
    Logout,
    Quit,
    Help,
    /// Blank input
    Empty,
}

pub fn parse_chat_line(line: &str) -> ChatCommand {
    let trimmed = line.trim();
    match trimmed {
        "" => ChatCommand::Empty,
        "/new" => ChatCommand::NewChat,
        "/logout" => ChatCommand::Logout,
        "/quit" | "/exit" => ChatCommand::Quit,
        "/help" => ChatCommand::Help,
        text => ChatCommand::Send(text.to_string()),
    }
}

/// Check the username field on its own, before the password is asked for
pub fn validate_username(username: &str) -> std::result::Result<(), String> {
    if username.is_empty() {
        return Err("Username required".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LEN));
    }
    if username.chars().any(|c| c.is_control()) {
        return Err("Username contains invalid characters".to_string());
    }
    Ok(())
}

/// Check the login form before anything is sent
pub fn validate_credentials(username: &str, password: &str) -> std::result::Result<(), String> {
    if username.is_empty() || password.is_empty() {
        return Err("Username and password required".to_string());
    }
    validate_username(username)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    Ok(())
}
