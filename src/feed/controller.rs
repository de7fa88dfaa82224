use super::display::{DisplayList, ScrollPosition};
use super::filters::FeedFilters;
use crate::api::{ApiError, MovieQuery, MovieSummary, SortField, SortOrder};
use serde::Deserialize;

/// What the feed does once the server has returned an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    /// Stop requesting pages until the filters change.
    #[default]
    Stop,
    /// Keep requesting the next page on every trigger, for catalogs that grow
    /// while being browsed.
    KeepPolling,
}

/// Explicit pagination state of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    /// Page that the next request asks for. Starts at 1.
    pub current_page: u32,
    /// True while exactly one request is outstanding.
    pub is_loading: bool,
    pub filters: FeedFilters,
    /// Bumped on every filter change or reset. Responses tagged with an
    /// older generation are discarded.
    pub generation: u64,
    /// The last response for this generation was an empty page.
    pub exhausted: bool,
}

impl FeedState {
    fn new(filters: FeedFilters) -> Self {
        Self {
            current_page: 1,
            is_loading: false,
            filters,
            generation: 0,
            exhausted: false,
        }
    }

    /// More pages may exist for the current filter set.
    pub fn has_more(&self) -> bool {
        !self.exhausted
    }
}

/// A list query to run on behalf of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub generation: u64,
    pub query: MovieQuery,
}

/// The outcome of running a [`PageRequest`], handed back to [`FeedController::complete`].
#[derive(Debug)]
pub struct PageResponse {
    pub generation: u64,
    pub page: u32,
    pub result: Result<Vec<MovieSummary>, ApiError>,
}

/// What [`FeedController::complete`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Items were appended and the page counter advanced.
    Appended { page: u32, count: usize },
    /// The page was empty. The page counter still advanced.
    Exhausted { page: u32 },
    /// The request failed; state is unchanged apart from the loading flag.
    Failed { page: u32, error: String },
    /// The response belonged to an older filter generation and was dropped.
    Stale { generation: u64 },
}

/// Drives infinite-scroll pagination over the movie list endpoint.
///
/// The controller never performs I/O. [`load_next_page`](Self::load_next_page)
/// and the filter setters hand out a [`PageRequest`]; the caller runs it
/// (see [`fetch_page`](super::fetch_page)) and feeds the [`PageResponse`]
/// back through [`complete`](Self::complete). At most one request of the
/// current generation is outstanding at any time.
#[derive(Debug, Clone)]
pub struct FeedController {
    state: FeedState,
    movies: DisplayList,
    defaults: FeedFilters,
    exhaustion: Exhaustion,
}

impl FeedController {
    /// Create a controller whose filters (and reset target) use the given sort.
    pub fn new(sort: SortField, order: SortOrder, exhaustion: Exhaustion) -> Self {
        let defaults = FeedFilters::with_sort(sort, order);
        Self {
            state: FeedState::new(defaults.clone()),
            movies: DisplayList::new(),
            defaults,
            exhaustion,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn filters(&self) -> &FeedFilters {
        &self.state.filters
    }

    pub fn movies(&self) -> &DisplayList {
        &self.movies
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn exhaustion(&self) -> Exhaustion {
        self.exhaustion
    }

    /// Request the next page, unless a request is already outstanding or the
    /// feed is exhausted under [`Exhaustion::Stop`].
    pub fn load_next_page(&mut self) -> Option<PageRequest> {
        if self.state.is_loading {
            tracing::trace!(page = self.state.current_page, "Load skipped, request in flight");
            return None;
        }
        if self.state.exhausted && self.exhaustion == Exhaustion::Stop {
            tracing::trace!(page = self.state.current_page, "Load skipped, feed exhausted");
            return None;
        }
        Some(self.issue())
    }

    /// Return to page 1 with an empty list and request it.
    ///
    /// Any request still in flight becomes stale: its response will be
    /// discarded by [`complete`](Self::complete).
    pub fn reset_and_load(&mut self) -> PageRequest {
        self.state.generation = self.state.generation.wrapping_add(1);
        self.state.current_page = 1;
        self.state.is_loading = false;
        self.state.exhausted = false;
        self.movies.clear();
        tracing::debug!(generation = self.state.generation, "Feed reset");
        self.issue()
    }

    /// Infinite-scroll trigger. Loads the next page once the viewport is
    /// within `threshold` rows of the content bottom.
    pub fn on_scroll_near_bottom(
        &mut self,
        position: ScrollPosition,
        threshold: usize,
    ) -> Option<PageRequest> {
        if position.is_near_bottom(threshold) {
            self.load_next_page()
        } else {
            None
        }
    }

    pub fn set_genre(&mut self, genre: Option<String>) -> PageRequest {
        self.state.filters.genre = genre;
        self.reset_and_load()
    }

    pub fn set_sort(&mut self, sort: SortField) -> PageRequest {
        self.state.filters.sort = sort;
        self.reset_and_load()
    }

    pub fn set_order(&mut self, order: SortOrder) -> PageRequest {
        self.state.filters.order = order;
        self.reset_and_load()
    }

    /// Submit search text, from a search action or Enter in the search box.
    pub fn submit_search(&mut self, text: impl Into<String>) -> PageRequest {
        self.state.filters.search = text.into();
        self.reset_and_load()
    }

    /// Restore the default filters and reload.
    pub fn reset_filters(&mut self) -> PageRequest {
        self.state.filters = self.defaults.clone();
        self.reset_and_load()
    }

    /// Give up on the outstanding request of `generation` without a response,
    /// e.g. when the task running it died. Page and list stay as they were.
    pub fn abandon(&mut self, generation: u64, page: u32) -> bool {
        if generation == self.state.generation
            && page == self.state.current_page
            && self.state.is_loading
        {
            self.state.is_loading = false;
            tracing::warn!(page, generation, "Page request abandoned");
            true
        } else {
            false
        }
    }

    /// Apply the response to a previously issued request.
    pub fn complete(&mut self, response: PageResponse) -> PageOutcome {
        if response.generation != self.state.generation
            || !self.state.is_loading
            || response.page != self.state.current_page
        {
            tracing::debug!(
                generation = response.generation,
                current = self.state.generation,
                page = response.page,
                "Discarding stale page response"
            );
            return PageOutcome::Stale {
                generation: response.generation,
            };
        }

        self.state.is_loading = false;
        let page = self.state.current_page;

        match response.result {
            Ok(movies) => {
                if page == 1 {
                    self.movies.clear();
                }
                let count = movies.len();
                self.movies.append(movies);
                self.state.current_page = page.saturating_add(1);
                self.state.exhausted = count == 0;

                if count == 0 {
                    tracing::debug!(page, "Empty page, feed exhausted");
                    PageOutcome::Exhausted { page }
                } else {
                    tracing::debug!(page, count, total = self.movies.len(), "Page appended");
                    PageOutcome::Appended { page, count }
                }
            }
            Err(e) => {
                tracing::warn!(
                    page,
                    network = e.is_network(),
                    error = %e,
                    "Failed to load movies"
                );
                PageOutcome::Failed {
                    page,
                    error: e.to_string(),
                }
            }
        }
    }

    fn issue(&mut self) -> PageRequest {
        self.state.is_loading = true;
        let request = PageRequest {
            generation: self.state.generation,
            query: self.state.filters.to_query(self.state.current_page),
        };
        tracing::debug!(
            page = request.query.page,
            generation = request.generation,
            "Requesting movie page"
        );
        request
    }
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(SortField::default(), SortOrder::default(), Exhaustion::default())
    }
}
