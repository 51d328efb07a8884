use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

/// Render an error message in a bordered block.
pub fn render_error(frame: &mut Frame, error: &str, theme: &Theme, area: Rect) {
    let widget = Paragraph::new(error)
        .style(theme.error_style())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title("Error"),
        );
    frame.render_widget(widget, area);
}

/// Render a dimmed message inside a bordered block, for empty and loading states.
pub fn render_notice(frame: &mut Frame, title: &str, message: &str, theme: &Theme, area: Rect) {
    let widget = Paragraph::new(message)
        .style(theme.dim_style())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title.to_string()),
        );
    frame.render_widget(widget, area);
}

/// Replaces the home screen when the first page could not be fetched.
pub fn render_unavailable(
    frame: &mut Frame,
    message: &str,
    retrying: bool,
    theme: &Theme,
    area: Rect,
) {
    let hint = if retrying {
        Line::styled("Retrying...", Style::default().fg(theme.spinner))
    } else {
        Line::styled("Press r to retry, q to quit", theme.dim_style())
    };
    let lines = vec![
        Line::styled("Backend unavailable", theme.headline_style()),
        Line::from(""),
        Line::styled(message.to_string(), theme.error_style()),
        Line::from(""),
        hint,
    ];
    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(" dispatches "),
    );
    frame.render_widget(widget, area);
}

/// Cuts `text` to at most `max_width` terminal columns, ending in `…` when shortened.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// A `width`x`height` rect centered in `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
