use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Overlay};
use crate::views::common::centered_rect;

/// Source picker popup: one checkbox per catalog entry.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(Overlay::Sources { cursor }) = &app.overlay else {
        return;
    };
    let Some(feed) = app.feed() else {
        return;
    };

    let theme = &app.theme;

    let popup_height = app.catalog.len() as u16 + 3;
    let popup_area = centered_rect(44, popup_height, area);
    frame.render_widget(Clear, popup_area);

    let chunks = Layout::vertical([
        Constraint::Min(0),    // Source list
        Constraint::Length(1), // Help line
    ])
    .split(popup_area);

    let items: Vec<ListItem> = app
        .catalog
        .sources()
        .iter()
        .map(|source| {
            let checked = feed.filters().is_selected(&source.key);
            let mark = if checked { "[x] " } else { "[ ] " };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(theme.primary)),
                Span::styled(source.name.clone(), Style::default().fg(theme.foreground)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(format!(
                    "Sources ({}/{})",
                    feed.filters().selected().len(),
                    app.catalog.len()
                )),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(*cursor));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let help = Paragraph::new("j/k:select  Space:toggle  Esc:close").style(theme.dim_style());
    frame.render_widget(help, chunks[1]);
}
