//! Background task helpers shared by input and event handling.

use crate::app::{App, AppEvent};
use crate::feed::{fetch_page, load_genres, PageRequest};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Maximum accepted search text length.
pub(super) const MAX_SEARCH_LENGTH: usize = 256;

/// Execute a future and catch any panic, returning the panic message as an error.
///
/// Spawned tasks report their result over the event channel; a panic would
/// otherwise vanish silently and leave the UI waiting forever.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}

/// Run a page request in the background.
///
/// The previous page task, if still running, belongs to an older generation
/// (the controller only issues a new request once the last one completed or
/// was superseded by a reset), so it is aborted.
pub(super) fn spawn_page_load(
    app: &mut App,
    request: PageRequest,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if let Some(handle) = app.page_handle.take() {
        if !handle.is_finished() {
            handle.abort();
            tracing::debug!("Aborted superseded page load");
        }
    }

    let client = app.client.clone();
    let tx = event_tx.clone();
    let generation = request.generation;
    let page = request.query.page;

    app.page_handle = Some(tokio::spawn(async move {
        let event = match catch_task_panic(fetch_page(&client, request)).await {
            Ok(response) => AppEvent::PageLoaded(response),
            Err(error) => AppEvent::PageAbandoned {
                generation,
                page,
                error,
            },
        };
        if tx.send(event).await.is_err() {
            tracing::debug!(page, "Page result dropped, UI has exited");
        }
    }));
}

/// Load genre selector options in the background.
pub(super) fn spawn_genre_load(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let event = match catch_task_panic(load_genres(&client)).await {
            Ok(options) => AppEvent::GenresLoaded(options),
            Err(error) => AppEvent::TaskPanicked {
                task: "genre_load",
                error,
            },
        };
        let _ = tx.send(event).await;
    });
}

/// Start over from page 1 after a filter change and fetch it.
pub(super) fn restart_feed(app: &mut App, request: PageRequest, event_tx: &mpsc::Sender<AppEvent>) {
    app.rewind();
    spawn_page_load(app, request, event_tx);
}
