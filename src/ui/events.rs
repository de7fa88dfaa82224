//! Application event handling.
//!
//! Applies results of background page and genre loads to the app state.

use crate::app::{App, AppEvent};
use crate::feed::PageOutcome;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::PageLoaded(response) => match app.apply_page(response) {
            PageOutcome::Appended { page, count } => {
                tracing::debug!(page, count, total = app.feed.movies().len(), "Page appended");
            }
            PageOutcome::Stale { generation } => {
                tracing::debug!(generation, "Ignored page from superseded filters");
            }
            PageOutcome::Exhausted { .. } | PageOutcome::Failed { .. } => {}
        },
        AppEvent::PageAbandoned {
            generation,
            page,
            error,
        } => {
            tracing::error!(page, generation, error = %error, "Page load task panicked");
            if app.feed.abandon(generation, page) {
                app.set_status(format!("Failed to load movies: {}", error));
            }
        }
        AppEvent::GenresLoaded(options) => {
            tracing::debug!(count = options.len(), "Genre selector ready");
            app.set_genres(options);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}
