//! REST client for the movie catalog server.
//!
//! - [`client`] - `ApiClient` with one method per endpoint, and `ApiError`
//! - [`types`] - wire types (`MovieSummary`, `MovieQuery`, `MovieLog`, ...)
//!
//! Every request carries the session token as the `auth_token` cookie when
//! one is attached with [`ApiClient::with_token`].

mod client;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{
    LogAction, MovieInput, MovieLog, MoviePage, MovieQuery, MovieSummary, SortField, SortOrder,
};
