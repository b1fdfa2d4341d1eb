//! genchat - a terminal chat client for a text generation backend.
//!
//! Signs in against the backend, keeps the session token between runs and
//! sends each chat line to the generate endpoint.

mod app;
mod chat;
mod input;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use genchat_core::{ApiClient, Config, TokenBackend};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AuthOutcome, ChatOutcome, Screen};
use input::{validate_username, CliOptions, CHAT_HELP, USAGE};

/// Log file name inside the cache directory
const LOG_FILE: &str = "genchat.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file in the cache directory so they do not interleave with
/// the chat. Falls back to stderr when that directory is unavailable.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok());
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let opts = CliOptions::parse(std::env::args().skip(1))?;
    if opts.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config_result = Config::load();
    let mut config = config_result.as_ref().cloned().unwrap_or_default();
    if opts.ephemeral {
        config.token_backend = TokenBackend::Memory;
    }

    let cache_dir = Config::cache_dir().ok();
    let _guard = init_tracing(cache_dir.as_deref());
    if let Err(e) = &config_result {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(api = %config.api_base_url, backend = ?config.token_backend, "genchat starting");

    let tokens = config.token_store().context("Failed to open token storage")?;
    let api = ApiClient::from_config(&config, tokens)?;

    if opts.logout {
        api.logout()?;
        println!("Logged out.");
        return Ok(());
    }

    let mut app = App::new(config, api);
    if opts.register {
        app.toggle_auth_mode();
    }

    let result = run_app(&mut app).await;
    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }

    info!("genchat shutting down");
    result
}

async fn run_app(app: &mut App) -> Result<()> {
    loop {
        match app.screen {
            Screen::Auth(_) => auth_screen(app).await?,
            Screen::Chat => chat_screen(app).await?,
            Screen::Quitting => return Ok(()),
        }
    }
}

/// Print a prompt and read one line. `None` on end of input.
fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

async fn auth_screen(app: &mut App) -> Result<()> {
    let Some(mode) = app.auth_mode() else {
        return Ok(());
    };

    println!("\n=== genchat: {} ===", mode.title());
    println!("(type /switch to toggle sign in / create account, /quit to exit)\n");

    let username_prompt = match app.config.last_username {
        Some(ref last) => format!("Username [{}]: ", last),
        None => "Username: ".to_string(),
    };
    let Some(input) = prompt_line(&username_prompt)? else {
        app.quit();
        return Ok(());
    };

    let command = input.trim().to_string();
    let username = match command.as_str() {
        "/quit" | "/exit" => {
            app.quit();
            return Ok(());
        }
        "/switch" => {
            app.toggle_auth_mode();
            return Ok(());
        }
        "" => app.config.last_username.clone().unwrap_or_default(),
        _ => input,
    };

    if let Err(message) = validate_username(&username) {
        println!("Error: {}", message);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;

    println!("\nContacting {}...", app.api.base_url());
    match app.submit_auth(&username, &password).await {
        AuthOutcome::LoggedIn { username } => {
            if let Err(e) = app.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Signed in as {}.", username);
            println!("How can I help you today? (/help for commands)\n");
        }
        AuthOutcome::Registered { message } => {
            println!("{}", message);
            println!("Registration successful! You can now sign in.");
        }
        AuthOutcome::Failed(message) => println!("Error: {}", message),
    }
    Ok(())
}

async fn chat_screen(app: &mut App) -> Result<()> {
    let Some(line) = prompt_line("> ")? else {
        app.quit();
        return Ok(());
    };

    match app.handle_chat_line(&line).await {
        ChatOutcome::Ignored | ChatOutcome::Quit => {}
        ChatOutcome::Reply(_) | ChatOutcome::Failed(_) => {
            if let Some(message) = app.transcript.messages().last() {
                println!("{}\n", message.render());
            }
        }
        ChatOutcome::Cleared => println!("Started a new chat.\n"),
        ChatOutcome::Help => println!("{}\n", CHAT_HELP),
        ChatOutcome::LoggedOut => println!("Logged out."),
        ChatOutcome::SessionEnded(message) => println!("{}", message),
    }
    Ok(())
}
