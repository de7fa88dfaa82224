use crate::api::SortOrder;
use crate::app::{App, InputMode};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the filter bar: genre, sort field and direction, search text.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let filters = app.feed.filters();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().add_modifier(Modifier::BOLD);
    let sep = Span::styled("  │  ", label);

    let genre = app
        .genres
        .get(app.selected_genre)
        .map(|o| o.label.as_str())
        .unwrap_or_default();
    let arrow = match filters.order {
        SortOrder::Asc => "↑",
        SortOrder::Desc => "↓",
    };

    let search = match app.mode {
        InputMode::Search => Span::styled(
            format!("{}_", app.search_input),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        InputMode::Browse if filters.search.is_empty() => Span::styled("-", label),
        InputMode::Browse => Span::styled(filters.search.clone(), value),
    };

    let line = Line::from(vec![
        Span::styled("Genre ", label),
        Span::styled(
            truncate_to_width(&strip_control_chars(genre), 24).into_owned(),
            value,
        ),
        sep.clone(),
        Span::styled("Sort ", label),
        Span::styled(format!("{} {}", filters.sort.label(), arrow), value),
        sep,
        Span::styled("Search ", label),
        search,
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" cinedash · {} ", app.client.base_url())),
    );
    f.render_widget(paragraph, area);
}
