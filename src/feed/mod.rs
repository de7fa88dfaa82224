//! The movie feed: paginated, filtered, sorted infinite scroll.
//!
//! - [`controller`] - `FeedController`, the pagination state machine
//! - [`filters`] - the active filter set and query building
//! - [`display`] - the displayed movie list and the scroll trigger
//! - [`genres`] - options of the genre selector
//! - [`fetcher`] - runs page and genre requests against the API
//!
//! # Example
//!
//! ```ignore
//! let mut feed = FeedController::default();
//! if let Some(request) = feed.load_next_page() {
//!     let response = fetch_page(&client, request).await;
//!     feed.complete(response);
//! }
//! ```

mod controller;
mod display;
mod fetcher;
mod filters;
mod genres;

pub use controller::{Exhaustion, FeedController, FeedState, PageOutcome, PageRequest, PageResponse};
pub use display::{DisplayList, ScrollPosition, DEFAULT_SCROLL_THRESHOLD};
pub use fetcher::{fetch_page, load_genres};
pub use filters::FeedFilters;
pub use genres::{GenreOption, GenreOptions, ALL_GENRES};
