//! Input handling for the TUI.
//!
//! Keys are routed by input mode: the help overlay captures everything while
//! visible, search mode edits the search box, browse mode drives the feed.

use crate::app::{App, AppEvent, InputMode};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{restart_feed, spawn_page_load, MAX_SEARCH_LENGTH};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return Action::Continue;
    }

    match app.mode {
        InputMode::Search => {
            handle_search_input(app, code, event_tx);
            Action::Continue
        }
        InputMode::Browse => handle_browse_input(app, code, modifiers, event_tx),
    }
}

fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('?') => app.show_help = true,

        KeyCode::Char('j') | KeyCode::Down => {
            app.nav_down();
            load_if_near_bottom(app, event_tx);
        }
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::PageDown => {
            app.page_down();
            load_if_near_bottom(app, event_tx);
        }
        KeyCode::Char('d') if ctrl => {
            app.page_down();
            load_if_near_bottom(app, event_tx);
        }
        KeyCode::PageUp => app.page_up(),
        KeyCode::Char('u') if ctrl => app.page_up(),
        KeyCode::Home => app.nav_top(),

        KeyCode::Char('g') => {
            let genre = app.cycle_genre();
            let label = app
                .genres
                .get(app.selected_genre)
                .map(|o| o.label.clone())
                .unwrap_or_default();
            let request = app.feed.set_genre(genre);
            restart_feed(app, request, event_tx);
            app.set_status(format!("Genre: {}", label));
        }
        KeyCode::Char('s') => {
            let sort = app.feed.filters().sort.next();
            let request = app.feed.set_sort(sort);
            restart_feed(app, request, event_tx);
            app.set_status(format!("Sorted by {}", sort.label()));
        }
        KeyCode::Char('o') => {
            let order = app.feed.filters().order.toggle();
            let request = app.feed.set_order(order);
            restart_feed(app, request, event_tx);
        }
        KeyCode::Char('/') => {
            app.search_input = app.feed.filters().search.clone();
            app.mode = InputMode::Search;
        }
        KeyCode::Char('x') => {
            let request = app.feed.reset_filters();
            app.selected_genre = 0;
            restart_feed(app, request, event_tx);
            app.set_status("Filters reset");
        }
        _ => {}
    }
    Action::Continue
}

fn handle_search_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Enter => {
            app.mode = InputMode::Browse;
            let text = std::mem::take(&mut app.search_input);
            let request = app.feed.submit_search(text);
            restart_feed(app, request, event_tx);
        }
        KeyCode::Esc => {
            app.mode = InputMode::Browse;
            app.search_input.clear();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if app.search_input.chars().count() >= MAX_SEARCH_LENGTH {
                app.set_status(format!(
                    "Search query too long (max {} chars)",
                    MAX_SEARCH_LENGTH
                ));
            } else {
                app.search_input.push(c);
            }
        }
        _ => {}
    }
}

/// Infinite-scroll trigger, run after cursor moves toward the end of the list.
fn load_if_near_bottom(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.scroll_trigger() {
        tracing::debug!(page = request.query.page, "Scroll reached threshold, loading next page");
        spawn_page_load(app, request, event_tx);
    }
}
