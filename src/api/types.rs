use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

// ============================================================================
// Sorting
// ============================================================================

/// Server-side sort key for the movie list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Director,
    Popularity,
    #[default]
    ImdbScore,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Name,
        SortField::Director,
        SortField::Popularity,
        SortField::ImdbScore,
    ];

    /// Wire value for the `sort` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Director => "director",
            SortField::Popularity => "popularity",
            SortField::ImdbScore => "imdb_score",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Director => "Director",
            SortField::Popularity => "Popularity",
            SortField::ImdbScore => "IMDb Score",
        }
    }

    /// Next field in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Server-side sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

// ============================================================================
// Movies
// ============================================================================

/// Display projection of a movie as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub name: String,
    pub director: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub imdb_score: f64,
    #[serde(rename = "genre", default)]
    pub genres: Vec<String>,
}

/// One page of `GET /api/get_movies`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoviePage {
    pub movies: Vec<MovieSummary>,
    /// Reported by the server but not used for pagination; an empty page ends the feed.
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenreList {
    pub genres: Vec<String>,
}

/// Parameters for a single list query.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieQuery {
    pub page: u32,
    pub genre: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    /// Already lowercased by the caller.
    pub search: String,
}

impl MovieQuery {
    /// Append the query parameters to `url`.
    ///
    /// Every parameter is always present; an unset genre is sent as `genre=`,
    /// which the server treats as "all genres".
    pub fn apply_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .clear()
            .append_pair("page", &self.page.to_string())
            .append_pair("genre", self.genre.as_deref().unwrap_or(""))
            .append_pair("sort", self.sort.as_str())
            .append_pair("order", self.order.as_str())
            .append_pair("search", &self.search);
    }
}

/// Body for create and update requests.
///
/// Absent fields are omitted from the JSON. The server replaces the genre
/// list on update and treats a missing `genre` as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovieInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_score: Option<f64>,
    #[serde(rename = "genre", skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

// ============================================================================
// Audit Log
// ============================================================================

/// Action recorded in the movie audit log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogAction {
    Added,
    Updated,
    Deleted,
    #[serde(other)]
    Other,
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogAction::Added => "ADDED",
            LogAction::Updated => "UPDATED",
            LogAction::Deleted => "DELETED",
            LogAction::Other => "OTHER",
        };
        f.pad(s)
    }
}

/// Entry of `GET /api/movie_logs`.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieLog {
    pub id: i64,
    pub movie_id: Option<i64>,
    pub movie_name: String,
    pub action: LogAction,
    /// UTC instant. The server formats it without an offset.
    #[serde(with = "server_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl MovieLog {
    /// Timestamp converted to the viewer's local time zone.
    pub fn local_timestamp(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MovieLogList {
    pub logs: Vec<MovieLog>,
}

mod server_timestamp {
    use super::*;
    use serde::Deserializer;

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("bad timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, FORMAT) {
            return Some(Utc.from_utc_datetime(&naive));
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ============================================================================
// Auth / Account
// ============================================================================

/// Envelope used by the auth and account endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatusEnvelope {
    pub status: Option<String>,
    pub message: Option<String>,
    pub auth_token: Option<String>,
    #[allow(dead_code)] // Browser redirect target; the terminal client stays put
    pub redirect: Option<String>,
}

impl StatusEnvelope {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Bare `{message}` body used by CRUD and logout responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MessageEnvelope {
    pub message: Option<String>,
}
