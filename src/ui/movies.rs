use crate::api::MovieSummary;
use crate::app::{App, CARD_HEIGHT};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Marker drawn in front of the selected card.
const CURSOR: &str = "▌ ";
const GUTTER: &str = "  ";

/// Render the movie card list.
///
/// Only cards intersecting the viewport are built. The list height is
/// written back to `app.viewport_rows` for the scroll trigger.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title(app));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 1 || inner.height < 1 {
        return;
    }
    app.viewport_rows = inner.height as usize;

    let movies = app.feed.movies();
    if movies.is_empty() {
        let text = if app.feed.is_loading() {
            "Loading movies..."
        } else if app.feed.state().exhausted {
            "No movies found"
        } else {
            ""
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let first = app.scroll_offset / CARD_HEIGHT;
    let skip = app.scroll_offset % CARD_HEIGHT;
    let visible = inner.height as usize / CARD_HEIGHT + 2;
    let width = inner.width.saturating_sub(GUTTER.len() as u16) as usize;

    let mut lines: Vec<Line> = Vec::with_capacity(visible * CARD_HEIGHT + 1);
    for (i, movie) in movies.iter().enumerate().skip(first).take(visible) {
        lines.extend(card_lines(movie, i == app.selected, width));
    }

    if first + visible >= movies.len() {
        if app.feed.is_loading() {
            lines.push(Line::from(Span::styled(
                format!("{}Loading more...", GUTTER),
                Style::default().fg(Color::DarkGray),
            )));
        } else if app.feed.state().exhausted {
            lines.push(Line::from(Span::styled(
                format!("{}End of results", GUTTER),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    f.render_widget(Paragraph::new(lines).scroll((skip as u16, 0)), inner);
}

fn title(app: &App) -> String {
    let count = app.feed.movies().len();
    match count {
        0 => " Movies ".to_string(),
        1 => " Movies (1) ".to_string(),
        n => format!(" Movies ({}) ", n),
    }
}

/// Lines of a single card, exactly `CARD_HEIGHT` of them.
fn card_lines(movie: &MovieSummary, selected: bool, width: usize) -> Vec<Line<'static>> {
    let gutter = if selected { CURSOR } else { GUTTER };
    let gutter_style = Style::default().fg(Color::Cyan);

    let name_style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let meta = Style::default().fg(Color::Gray);
    let dim = Style::default().fg(Color::DarkGray);

    let field = |text: String| -> String {
        let clean = strip_control_chars(&text).replace(['\n', '\r', '\t'], " ");
        truncate_to_width(&clean, width).into_owned()
    };

    let genres = if movie.genres.is_empty() {
        "No genre".to_string()
    } else {
        movie.genres.join(", ")
    };

    let rows = [
        (field(movie.name.clone()), name_style),
        (field(format!("Directed by {}", movie.director)), meta),
        (
            field(format!(
                "IMDb {:.1}   Popularity {:.0}",
                movie.imdb_score, movie.popularity
            )),
            meta,
        ),
        (field(genres), Style::default().fg(Color::Yellow)),
        (field(format!("#{}", movie.id)), dim),
    ];

    let mut lines: Vec<Line<'static>> = rows
        .into_iter()
        .map(|(text, style)| {
            Line::from(vec![
                Span::styled(gutter, gutter_style),
                Span::styled(text, style),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    debug_assert_eq!(lines.len(), CARD_HEIGHT);
    lines
}
