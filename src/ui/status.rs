use crate::app::{App, InputMode};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const SPINNER: [&str; super::loop_runner::SPINNER_FRAMES] =
    ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if app.feed.is_loading() {
        Cow::Owned(format!(
            "{} Loading page {}...",
            SPINNER[app.spinner_frame % SPINNER.len()],
            app.feed.state().current_page
        ))
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.mode {
            InputMode::Search => Cow::Borrowed("Type to search | ENTER apply | ESC cancel"),
            InputMode::Browse => Cow::Borrowed(
                "[j/k]move [g]enre [s]ort [o]rder [/]search [x]reset [?]help [q]uit",
            ),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
