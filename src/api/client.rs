use super::types::{
    GenreList, MessageEnvelope, MovieInput, MovieLog, MovieLogList, MoviePage, MovieQuery,
    MovieSummary, StatusEnvelope,
};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Name of the session cookie the server reads the token from.
const SESSION_COOKIE: &str = "auth_token";

/// Errors from talking to the catalog server.
///
/// Split into two families: network failures (the request never produced a
/// usable response) and application failures (the server answered, but not
/// with what we asked for). See [`ApiError::is_network`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Endpoint URL could not be built from the base URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Session missing or expired (HTTP 401)
    #[error("Not logged in or session expired")]
    Unauthorized,
    /// Non-2xx response, with the server's message when it sent one
    #[error("HTTP error {status}: {}", message.as_deref().unwrap_or("no message"))]
    HttpStatus { status: u16, message: Option<String> },
    /// `{status: "fail", message}` payload
    #[error("{message}")]
    Rejected { message: String },
    /// Body was not the JSON shape we expected
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the failure happened before the server produced a response.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::Timeout | ApiError::ResponseTooLarge
        )
    }
}

/// HTTP client for the movie catalog REST API.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted and
/// the session token is shared behind an `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
    token: Option<Arc<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Build a client rooted at `base`.
    ///
    /// A trailing slash is added to the base path so that a server mounted
    /// under a prefix (`https://host/catalog`) keeps its prefix when endpoint
    /// paths are joined.
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self, ApiError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base,
            timeout,
            token: None,
        })
    }

    /// Attach a session token that is sent as the `auth_token` cookie.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(Arc::new(token));
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    /// `GET /api/get_movies` with the given filter and page.
    pub async fn get_movies(&self, query: &MovieQuery) -> Result<MoviePage, ApiError> {
        let mut url = self.endpoint("api/get_movies")?;
        query.apply_to(&mut url);
        tracing::debug!(url = %url, "Fetching movie page");
        let (status, body) = self.send(self.http.get(url)).await?;
        decode_json(status, &body)
    }

    /// `GET /api/get_genres`
    pub async fn get_genres(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("api/get_genres")?;
        let (status, body) = self.send(self.http.get(url)).await?;
        let list: GenreList = decode_json(status, &body)?;
        Ok(list.genres)
    }

    /// `POST /api/movies`. Admin only.
    pub async fn create_movie(&self, movie: &MovieInput) -> Result<String, ApiError> {
        let url = self.endpoint("api/movies")?;
        let (status, body) = self.send(json_body(self.http.post(url), movie)?).await?;
        decode_message(status, &body)
    }

    /// `GET /api/movies/{id}`. Admin only.
    pub async fn get_movie(&self, id: i64) -> Result<MovieSummary, ApiError> {
        let url = self.endpoint(&format!("api/movies/{id}"))?;
        let (status, body) = self.send(self.http.get(url)).await?;
        decode_json(status, &body)
    }

    /// `PUT /api/movies/{id}`. Admin only.
    pub async fn update_movie(&self, id: i64, movie: &MovieInput) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("api/movies/{id}"))?;
        let (status, body) = self.send(json_body(self.http.put(url), movie)?).await?;
        decode_message(status, &body)
    }

    /// `DELETE /api/movies/{id}`. Admin only.
    pub async fn delete_movie(&self, id: i64) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("api/movies/{id}"))?;
        let (status, body) = self.send(self.http.delete(url)).await?;
        decode_message(status, &body)
    }

    /// `GET /api/movie_logs`. Admin only.
    pub async fn movie_logs(&self) -> Result<Vec<MovieLog>, ApiError> {
        let url = self.endpoint("api/movie_logs")?;
        let (status, body) = self.send(self.http.get(url)).await?;
        let list: MovieLogList = decode_json(status, &body)?;
        Ok(list.logs)
    }

    // ------------------------------------------------------------------------
    // Auth / Account
    // ------------------------------------------------------------------------

    /// `POST /auth/login` with form-encoded credentials. Returns the session token.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, ApiError> {
        let url = self.endpoint("auth/login")?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .append_pair("password", password.expose_secret())
            .finish();
        let (status, body) = self.send(form_body(self.http.post(url), form)).await?;
        let envelope = decode_status(status, &body)?;
        envelope
            .auth_token
            .map(SecretString::from)
            .ok_or_else(|| ApiError::Decode("login response carried no auth_token".into()))
    }

    /// `POST /auth/register` with form-encoded account details.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<String, ApiError> {
        let url = self.endpoint("auth/register")?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", name)
            .append_pair("email", email)
            .append_pair("password", password.expose_secret())
            .finish();
        let (status, body) = self.send(form_body(self.http.post(url), form)).await?;
        let envelope = decode_status(status, &body)?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "Successfully registered.".into()))
    }

    /// `POST /auth/logout`. The server blacklists the current token.
    pub async fn logout(&self) -> Result<String, ApiError> {
        let url = self.endpoint("auth/logout")?;
        let (status, body) = self.send(self.http.post(url)).await?;
        decode_message(status, &body)
    }

    /// `PUT /edit-account` with `{new_password}`.
    pub async fn change_password(&self, new_password: &SecretString) -> Result<String, ApiError> {
        #[derive(Serialize)]
        struct PasswordChange<'a> {
            new_password: &'a str,
        }

        let url = self.endpoint("edit-account")?;
        let payload = PasswordChange {
            new_password: new_password.expose_secret(),
        };
        let (status, body) = self.send(json_body(self.http.put(url), &payload)?).await?;
        let envelope = decode_status(status, &body)?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "Password updated successfully.".into()))
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let builder = builder.header(ACCEPT, "application/json");
        let builder = match &self.token {
            Some(token) => builder.header(
                COOKIE,
                format!("{SESSION_COOKIE}={}", token.expose_secret()),
            ),
            None => builder,
        };

        let response = tokio::time::timeout(self.timeout, builder.send())
            .await
            .map_err(|_| ApiError::Timeout)??;

        let status = response.status();
        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        tracing::trace!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok((status, body))
    }
}

fn json_body<T: Serialize>(builder: RequestBuilder, payload: &T) -> Result<RequestBuilder, ApiError> {
    let bytes = serde_json::to_vec(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(builder.header(CONTENT_TYPE, "application/json").body(bytes))
}

fn form_body(builder: RequestBuilder, form: String) -> RequestBuilder {
    builder
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(form)
}

/// Map a non-2xx response to an error, keeping the server's `message` if present.
fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }
    let message = serde_json::from_slice::<MessageEnvelope>(body)
        .ok()
        .and_then(|m| m.message);
    ApiError::HttpStatus {
        status: status.as_u16(),
        message,
    }
}

fn decode_json<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_message(status: StatusCode, body: &[u8]) -> Result<String, ApiError> {
    let envelope: MessageEnvelope = decode_json(status, body)?;
    Ok(envelope.message.unwrap_or_default())
}

/// Decode a `{status, message}` envelope.
///
/// The auth endpoints report failures both through HTTP status and the
/// `status` field, so a parseable `fail` envelope wins over the bare status code.
fn decode_status(status: StatusCode, body: &[u8]) -> Result<StatusEnvelope, ApiError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    match serde_json::from_slice::<StatusEnvelope>(body) {
        Ok(envelope) if envelope.is_success() && status.is_success() => Ok(envelope),
        Ok(envelope) if envelope.status.is_some() => Err(ApiError::Rejected {
            message: envelope
                .message
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16())),
        }),
        Ok(_) | Err(_) if !status.is_success() => Err(status_error(status, body)),
        Ok(_) => Err(ApiError::Decode("response carried no status field".into())),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
