use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use cinedash::api::ApiClient;
use cinedash::app::{App, AppEvent};
use cinedash::commands::{self, MovieCommand, PasswordSource};
use cinedash::config::{Config, SERVER_ENV};
use cinedash::session::SessionStore;
use cinedash::ui;

/// Get the config directory path (~/.config/cinedash/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("cinedash"))
}

/// Create the config directory if needed and restrict it to the current user.
fn prepare_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

/// Route logs to a file while the TUI owns the terminal, to stderr otherwise.
fn init_tracing(config_dir: &Path, tui: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());

    if tui {
        let log_path = config_dir.join("cinedash.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        builder.with_writer(Mutex::new(file)).with_ansi(false).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "cinedash",
    version,
    about = "Browse and manage a movie catalog from the terminal"
)]
struct Args {
    /// Catalog server URL (overrides config and CINEDASH_SERVER)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Config file to use instead of ~/.config/cinedash/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the catalog with infinite scrolling (default)
    Browse,
    /// Start a session and store its token
    Login {
        /// Defaults to `email` from the config file
        #[arg(long)]
        email: Option<String>,
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password_stdin: bool,
    },
    /// End the session and forget its token
    Logout,
    /// Change the password of the logged-in account
    Passwd {
        #[arg(long)]
        password_stdin: bool,
    },
    /// Administer movies
    #[command(subcommand)]
    Movie(MovieCommand),
    /// Show the movie audit log
    Logs,
    /// List the genres known to the server
    Genres,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Browse);

    let config_dir = get_config_dir()?;
    prepare_config_dir(&config_dir)?;
    init_tracing(&config_dir, matches!(command, Command::Browse))?;

    let config_path = args
        .config
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    config.apply_overrides(std::env::var(SERVER_ENV).ok(), args.server);

    let store = SessionStore::new(config_dir.join("session.toml"));
    let session = match store.load() {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable session file");
            None
        }
    };

    let mut client = ApiClient::new(config.server()?, config.request_timeout())
        .context("Failed to create HTTP client")?;
    if let Some(session) = session {
        tracing::debug!(email = ?session.email, "Using stored session");
        client = client.with_token(session.token);
    }

    let mut out = std::io::stdout();
    match command {
        Command::Browse => {
            let mut app = App::new(client, &config);
            let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
            ui::run(&mut app, event_tx, event_rx).await?;
        }
        Command::Login {
            email,
            password_stdin,
        } => {
            let email = email.or_else(|| config.email.clone()).context(
                "No email given: pass --email or set `email` in config.toml",
            )?;
            let password = commands::read_password(
                PasswordSource::from_flag(password_stdin),
                std::io::stdin().lock(),
            )?;
            commands::login(&client, &store, &email, &password, &mut out).await?;
        }
        Command::Register {
            name,
            email,
            password_stdin,
        } => {
            let password = commands::read_password(
                PasswordSource::from_flag(password_stdin),
                std::io::stdin().lock(),
            )?;
            commands::register(&client, &name, &email, &password, &mut out).await?;
        }
        Command::Logout => commands::logout(&client, &store, &mut out).await?,
        Command::Passwd { password_stdin } => {
            let password = commands::read_password(
                PasswordSource::from_flag(password_stdin),
                std::io::stdin().lock(),
            )?;
            commands::change_password(&client, &password, &mut out).await?;
        }
        Command::Movie(movie) => commands::movie(&client, movie, &mut out).await?,
        Command::Logs => commands::logs(&client, &mut out).await?,
        Command::Genres => commands::genres(&client, &mut out).await?,
    }

    Ok(())
}
