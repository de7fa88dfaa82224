//! Help overlay listing the key bindings of the browse view.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const BINDINGS: [(&str, &str); 14] = [
    ("j / Down", "Next movie"),
    ("k / Up", "Previous movie"),
    ("PgDn / Ctrl+d", "Page down"),
    ("PgUp / Ctrl+u", "Page up"),
    ("Home", "First movie"),
    ("g", "Cycle genre"),
    ("s", "Cycle sort field"),
    ("o", "Toggle ascending / descending"),
    ("/", "Edit search"),
    ("Enter", "Apply search"),
    ("Esc", "Cancel search"),
    ("x", "Reset filters"),
    ("?", "Toggle this help"),
    ("q / Ctrl+c", "Quit"),
];

/// Render the help overlay on top of the browse view.
pub fn render(f: &mut Frame) {
    let overlay = centered_rect(60, 70, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let rows = BINDINGS
        .iter()
        .map(|(key, action)| Row::new(vec![format!("  {}", key), action.to_string()]));

    let table = Table::new(rows, [Constraint::Length(18), Constraint::Min(10)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
