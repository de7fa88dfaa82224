//! Persisted login session (~/.config/cinedash/session.toml).
//!
//! Holds the token returned by `POST /auth/login` so that later invocations
//! can send it as the `auth_token` cookie. The file is written with
//! user-only permissions on Unix.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    email: Option<String>,
    auth_token: String,
}

/// A logged-in session.
pub struct Session {
    pub email: Option<String>,
    pub token: SecretString,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing file means "not logged in".
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = toml::from_str(&content)?;
        if file.auth_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Session {
            email: file.email,
            token: SecretString::from(file.auth_token),
        }))
    }

    /// Write the session, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let file = SessionFile {
            email: session.email.clone(),
            auth_token: session.token.expose_secret().to_string(),
        };
        let content = toml::to_string(&file)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut out = options.open(&self.path)?;
        out.write_all(content.as_bytes())?;
        out.sync_all()?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the session file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
