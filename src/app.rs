use crate::api::ApiClient;
use crate::config::Config;
use crate::feed::{
    FeedController, GenreOptions, PageOutcome, PageRequest, PageResponse, ScrollPosition,
};
use std::borrow::Cow;
use std::time::Instant;

/// Rows taken by one movie card in the list (5 lines of text + 1 spacer).
pub const CARD_HEIGHT: usize = 6;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Input Mode
// ============================================================================

/// What keystrokes are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation and filter shortcuts.
    Browse,
    /// Typing into the search box.
    Search,
}

// ============================================================================
// Events
// ============================================================================

/// Events from background tasks.
pub enum AppEvent {
    /// A page request finished, successfully or not.
    PageLoaded(PageResponse),
    /// The page task died before producing a response.
    PageAbandoned {
        generation: u64,
        page: u32,
        error: String,
    },
    /// Genre selector options are ready (degraded to "All Genres" on failure).
    GenresLoaded(GenreOptions),
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "page_load")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central state of the browse view.
///
/// The feed controller is the source of truth; rendering is a projection of it.
pub struct App {
    pub client: ApiClient,
    pub feed: FeedController,

    /// Options of the genre selector and the index currently shown.
    pub genres: GenreOptions,
    pub selected_genre: usize,

    /// Cursor position in the movie list.
    pub selected: usize,
    /// First visible row of the movie list, kept in step with the cursor.
    pub scroll_offset: usize,
    /// Visible rows of the movie list, updated on every render.
    pub viewport_rows: usize,
    /// Rows from the bottom at which the next page is requested.
    pub scroll_threshold: usize,

    pub mode: InputMode,
    /// Search box contents while editing. Committed on Enter.
    pub search_input: String,

    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Whether the help overlay is displayed.
    pub show_help: bool,

    /// Skip frame renders when nothing changed.
    pub needs_redraw: bool,

    /// Handle of the page task in flight, aborted when a reset supersedes it.
    pub page_handle: Option<tokio::task::JoinHandle<()>>,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(client: ApiClient, config: &Config) -> Self {
        Self {
            client,
            feed: FeedController::new(
                config.default_sort,
                config.default_order,
                config.exhaustion,
            ),
            genres: GenreOptions::default(),
            selected_genre: 0,
            selected: 0,
            scroll_offset: 0,
            viewport_rows: 0,
            scroll_threshold: config.scroll_threshold,
            mode: InputMode::Browse,
            search_input: String::new(),
            status_message: None,
            show_help: false,
            needs_redraw: true,
            page_handle: None,
            spinner_frame: 0,
        }
    }

    /// Set a status message shown in the status bar for a few seconds.
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn nav_down(&mut self) {
        let len = self.feed.movies().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
        self.follow_cursor();
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.follow_cursor();
    }

    pub fn page_down(&mut self) {
        let step = (self.viewport_rows / CARD_HEIGHT).max(1);
        let len = self.feed.movies().len();
        self.selected = (self.selected + step).min(len.saturating_sub(1));
        self.follow_cursor();
    }

    pub fn page_up(&mut self) {
        let step = (self.viewport_rows / CARD_HEIGHT).max(1);
        self.selected = self.selected.saturating_sub(step);
        self.follow_cursor();
    }

    pub fn nav_top(&mut self) {
        self.selected = 0;
        self.follow_cursor();
    }

    /// Scroll so the selected card is fully visible.
    fn follow_cursor(&mut self) {
        let top = self.selected * CARD_HEIGHT;
        let bottom = top + CARD_HEIGHT;
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if self.viewport_rows > 0 && bottom > self.scroll_offset + self.viewport_rows {
            self.scroll_offset = bottom.saturating_sub(self.viewport_rows);
        }
    }

    /// Where the viewport sits within the rendered list.
    pub fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition {
            offset: self.scroll_offset,
            viewport: self.viewport_rows,
            content: self.feed.movies().len() * CARD_HEIGHT,
        }
    }

    /// Keep the cursor inside the list after it shrank.
    pub fn clamp_selection(&mut self) {
        let len = self.feed.movies().len();
        self.selected = if len == 0 {
            0
        } else {
            self.selected.min(len - 1)
        };
        if len == 0 {
            self.scroll_offset = 0;
        }
    }

    // ------------------------------------------------------------------------
    // Feed
    // ------------------------------------------------------------------------

    /// Infinite-scroll check, run after every cursor move.
    pub fn scroll_trigger(&mut self) -> Option<PageRequest> {
        let position = self.scroll_position();
        self.feed.on_scroll_near_bottom(position, self.scroll_threshold)
    }

    /// Cursor and viewport go back to the top; used whenever the feed resets.
    pub fn rewind(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Apply a finished page request and report it in the status bar.
    pub fn apply_page(&mut self, response: PageResponse) -> PageOutcome {
        let outcome = self.feed.complete(response);
        match &outcome {
            PageOutcome::Appended { .. } => {}
            PageOutcome::Exhausted { page } => {
                if *page == 1 {
                    self.set_status("No movies match these filters");
                } else {
                    self.set_status("End of results");
                }
            }
            PageOutcome::Failed { error, .. } => {
                self.set_status(format!("Failed to load movies: {}", error));
            }
            PageOutcome::Stale { .. } => {}
        }
        self.clamp_selection();
        outcome
    }

    /// Install freshly loaded genre options, keeping the active filter selected.
    pub fn set_genres(&mut self, genres: GenreOptions) {
        self.selected_genre = genres
            .position_of(self.feed.filters().genre.as_deref())
            .unwrap_or(0);
        self.genres = genres;
    }

    /// Move the genre selector to the next option and return its value.
    pub fn cycle_genre(&mut self) -> Option<String> {
        if self.genres.is_empty() {
            return None;
        }
        self.selected_genre = (self.selected_genre + 1) % self.genres.len();
        self.genres
            .get(self.selected_genre)
            .and_then(|o| o.value.clone())
    }
}
