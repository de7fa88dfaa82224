//! Non-interactive subcommands: account management and catalog administration.
//!
//! Each handler writes its human-readable output to `out` and returns an
//! `anyhow::Result`, so `main` only has to map errors to a non-zero exit.

use crate::api::{ApiClient, ApiError, MovieInput, MovieSummary};
use crate::session::{Session, SessionStore};
use crate::util::strip_control_chars;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use secrecy::SecretString;
use std::io::{BufRead, Read, Write};

/// Environment variable read for passwords when `--password-stdin` is absent.
pub const PASSWORD_ENV: &str = "CINEDASH_PASSWORD";

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Subcommand)]
pub enum MovieCommand {
    /// Add a movie to the catalog
    Add(NewMovie),
    /// Show a single movie
    Show { id: i64 },
    /// Change fields of a movie
    Update {
        id: i64,
        #[command(flatten)]
        fields: MovieFields,
    },
    /// Remove a movie from the catalog
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct NewMovie {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub director: String,
    #[arg(long, default_value_t = 0.0)]
    pub popularity: f64,
    #[arg(long, default_value_t = 0.0)]
    pub imdb_score: f64,
    /// Genre name, repeat for several
    #[arg(long = "genre")]
    pub genres: Vec<String>,
}

impl From<NewMovie> for MovieInput {
    fn from(movie: NewMovie) -> Self {
        MovieInput {
            name: Some(movie.name),
            director: Some(movie.director),
            popularity: Some(movie.popularity),
            imdb_score: Some(movie.imdb_score),
            genres: Some(normalize_genres(movie.genres)),
        }
    }
}

#[derive(Debug, Args)]
pub struct MovieFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub director: Option<String>,
    #[arg(long)]
    pub popularity: Option<f64>,
    #[arg(long)]
    pub imdb_score: Option<f64>,
    /// Replaces the genre list. Repeat for several.
    #[arg(long = "genre")]
    pub genres: Vec<String>,
}

impl MovieFields {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.director.is_none()
            && self.popularity.is_none()
            && self.imdb_score.is_none()
            && self.genres.is_empty()
    }

    /// Full record for a PUT: given fields override `current`.
    ///
    /// The server replaces the genre list on every update, so the current
    /// genres are sent back when `--genre` is absent.
    fn merge_into(self, current: MovieSummary) -> MovieInput {
        let genres = if self.genres.is_empty() {
            current.genres
        } else {
            normalize_genres(self.genres)
        };
        MovieInput {
            name: Some(self.name.unwrap_or(current.name)),
            director: Some(self.director.unwrap_or(current.director)),
            popularity: Some(self.popularity.unwrap_or(current.popularity)),
            imdb_score: Some(self.imdb_score.unwrap_or(current.imdb_score)),
            genres: Some(genres),
        }
    }
}

/// Trim a genre and capitalize it: `" sCI-fi "` becomes `"Sci-fi"`.
/// Blank entries yield `None`.
pub fn normalize_genre(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    Some(
        first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
    )
}

fn normalize_genres(raw: Vec<String>) -> Vec<String> {
    raw.iter().filter_map(|g| normalize_genre(g)).collect()
}

/// Where a password is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource {
    /// First line of standard input.
    Stdin,
    /// The `CINEDASH_PASSWORD` environment variable.
    Env,
}

impl PasswordSource {
    pub fn from_flag(password_stdin: bool) -> Self {
        if password_stdin {
            PasswordSource::Stdin
        } else {
            PasswordSource::Env
        }
    }
}

/// Read a password without echoing it into shell history or argv.
pub fn read_password(source: PasswordSource, stdin: impl BufRead) -> Result<SecretString> {
    let password = match source {
        PasswordSource::Stdin => {
            let mut line = String::new();
            stdin
                .take(4096)
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
        PasswordSource::Env => std::env::var(PASSWORD_ENV).with_context(|| {
            format!("No password given: set {PASSWORD_ENV} or pass --password-stdin")
        })?,
    };
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(SecretString::from(password))
}

// ============================================================================
// Account
// ============================================================================

/// Log in and persist the returned session token.
pub async fn login(
    client: &ApiClient,
    store: &SessionStore,
    email: &str,
    password: &SecretString,
    out: &mut impl Write,
) -> Result<()> {
    let token = client
        .login(email, password)
        .await
        .context("Login failed")?;
    store
        .save(&Session {
            email: Some(email.to_string()),
            token,
        })
        .with_context(|| format!("Failed to save session to {}", store.path().display()))?;
    tracing::info!(email, "Logged in");
    writeln!(out, "Logged in as {email}")?;
    Ok(())
}

pub async fn register(
    client: &ApiClient,
    name: &str,
    email: &str,
    password: &SecretString,
    out: &mut impl Write,
) -> Result<()> {
    let message = client
        .register(name, email, password)
        .await
        .context("Registration failed")?;
    writeln!(out, "{}", strip_control_chars(&message))?;
    writeln!(out, "Run `cinedash login --email {email}` to start a session")?;
    Ok(())
}

/// End the session on the server and forget the local token.
///
/// The local session is removed even when the server call fails, since a
/// token the user wants gone should not survive a network error.
pub async fn logout(client: &ApiClient, store: &SessionStore, out: &mut impl Write) -> Result<()> {
    if !client.has_token() {
        store.clear()?;
        writeln!(out, "Not logged in")?;
        return Ok(());
    }

    let result = client.logout().await;
    store
        .clear()
        .with_context(|| format!("Failed to remove {}", store.path().display()))?;

    match result {
        Ok(message) => writeln!(out, "{}", strip_control_chars(&message))?,
        Err(e) => {
            tracing::warn!(error = %e, "Server logout failed, local session removed anyway");
            writeln!(out, "Local session removed (server said: {e})")?;
        }
    }
    Ok(())
}

pub async fn change_password(
    client: &ApiClient,
    new_password: &SecretString,
    out: &mut impl Write,
) -> Result<()> {
    require_login(client)?;
    let message = client
        .change_password(new_password)
        .await
        .context("Password change failed")?;
    writeln!(out, "{}", strip_control_chars(&message))?;
    Ok(())
}

// ============================================================================
// Catalog
// ============================================================================

pub async fn movie(client: &ApiClient, command: MovieCommand, out: &mut impl Write) -> Result<()> {
    match command {
        MovieCommand::Add(new) => {
            require_login(client)?;
            let input = MovieInput::from(new);
            check_scores(&input)?;
            let message = client
                .create_movie(&input)
                .await
                .context("Failed to add movie")?;
            writeln!(out, "{}", strip_control_chars(&message))?;
        }
        MovieCommand::Show { id } => {
            require_login(client)?;
            let movie = client
                .get_movie(id)
                .await
                .with_context(|| format!("Failed to fetch movie {id}"))?;
            write_movie(&movie, out)?;
        }
        MovieCommand::Update { id, fields } => {
            require_login(client)?;
            if fields.is_empty() {
                bail!("Nothing to update: pass at least one of --name, --director, --popularity, --imdb-score, --genre");
            }
            let current = client
                .get_movie(id)
                .await
                .with_context(|| format!("Failed to fetch movie {id}"))?;
            let input = fields.merge_into(current);
            check_scores(&input)?;
            let message = client
                .update_movie(id, &input)
                .await
                .with_context(|| format!("Failed to update movie {id}"))?;
            writeln!(out, "{}", strip_control_chars(&message))?;
        }
        MovieCommand::Delete { id } => {
            require_login(client)?;
            let message = client
                .delete_movie(id)
                .await
                .with_context(|| format!("Failed to delete movie {id}"))?;
            writeln!(out, "{}", strip_control_chars(&message))?;
        }
    }
    Ok(())
}

/// Print the audit log, newest entries as the server orders them.
pub async fn logs(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    require_login(client)?;
    let entries = client
        .movie_logs()
        .await
        .context("Failed to fetch movie logs")?;
    if entries.is_empty() {
        writeln!(out, "No log entries")?;
        return Ok(());
    }
    writeln!(out, "{:<19}  {:<7}  MOVIE", "TIME", "ACTION")?;
    for entry in &entries {
        writeln!(
            out,
            "{:<19}  {:<7}  {}",
            entry.local_timestamp().format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            strip_control_chars(&entry.movie_name)
        )?;
    }
    Ok(())
}

pub async fn genres(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    let genres = client
        .get_genres()
        .await
        .context("Failed to fetch genres")?;
    for genre in genres.iter().filter(|g| !g.trim().is_empty()) {
        writeln!(out, "{}", strip_control_chars(genre))?;
    }
    Ok(())
}

fn write_movie(movie: &MovieSummary, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "#{} {}", movie.id, strip_control_chars(&movie.name))?;
    writeln!(out, "  Director:   {}", strip_control_chars(&movie.director))?;
    writeln!(out, "  IMDb score: {:.1}", movie.imdb_score)?;
    writeln!(out, "  Popularity: {:.1}", movie.popularity)?;
    writeln!(
        out,
        "  Genres:     {}",
        strip_control_chars(&movie.genres.join(", "))
    )
}

/// Fail early instead of letting the server answer 401.
fn require_login(client: &ApiClient) -> Result<()> {
    if client.has_token() {
        Ok(())
    } else {
        Err(ApiError::Unauthorized).context("Run `cinedash login` first")
    }
}

fn check_scores(input: &MovieInput) -> Result<()> {
    if let Some(score) = input.imdb_score {
        if !(0.0..=10.0).contains(&score) {
            bail!("IMDb score must be between 0 and 10, got {score}");
        }
    }
    if let Some(popularity) = input.popularity {
        if !popularity.is_finite() || popularity < 0.0 {
            bail!("Popularity must be a non-negative number, got {popularity}");
        }
    }
    Ok(())
}
