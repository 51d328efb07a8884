use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::api::StoryDetail;
use crate::app::{App, Message};
use crate::detail::{DetailStatus, DetailView};
use crate::keys::{detail_keymap, hint};
use crate::views::common::{render_error, render_notice, truncate};
use crate::views::status_bar::StatusBar;

/// Render the story detail view
pub fn render(frame: &mut Frame, app: &App, view: &DetailView, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Min(0),    // Body
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    match &view.status {
        DetailStatus::Loading => {
            render_notice(frame, "Story", "Loading story...", &app.theme, chunks[0])
        }
        DetailStatus::NotFound => render_notice(
            frame,
            "Story",
            "Story not found. It may have been removed.",
            &app.theme,
            chunks[0],
        ),
        DetailStatus::Failed(message) => render_error(frame, message, &app.theme, chunks[0]),
        DetailStatus::Ready(detail) => render_detail(frame, app, view, detail, chunks[0]),
    }

    render_status_bar(frame, app, view, chunks[1]);
}

fn render_detail(frame: &mut Frame, app: &App, view: &DetailView, detail: &StoryDetail, area: Rect) {
    let theme = &app.theme;
    let wrap_width = area.width.saturating_sub(4).max(10) as usize;

    let mut lines: Vec<Line> = textwrap::wrap(&detail.display_headline(), wrap_width)
        .into_iter()
        .map(|l| Line::styled(l.into_owned(), theme.headline_style()))
        .collect();
    lines.push(Line::styled(
        format!("Updated {}", app.format_date(&detail.latest_ref_article_at)),
        Style::default().fg(theme.date),
    ));

    let image_count = detail.cover_images.len();
    if image_count > 0 {
        let active = view.active_image.min(image_count - 1);
        lines.push(Line::from(vec![
            Span::styled(
                format!("Image {}/{} ", active + 1, image_count),
                Style::default().fg(theme.source),
            ),
            Span::styled(
                truncate(&detail.cover_images[active], wrap_width.saturating_sub(12)),
                theme.dim_style(),
            ),
        ]));
    }
    lines.push(Line::from(""));

    for bullet in detail.summary_bullets() {
        for (i, part) in textwrap::wrap(bullet, wrap_width.saturating_sub(2))
            .into_iter()
            .enumerate()
        {
            let marker = if i == 0 { "• " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.primary)),
                Span::styled(part.into_owned(), Style::default().fg(theme.foreground)),
            ]));
        }
    }

    // Summary takes what it needs, up to two thirds of the body
    let summary_height = (lines.len() as u16 + 2).min(area.height.saturating_mul(2) / 3);
    let chunks = Layout::vertical([
        Constraint::Length(summary_height),
        Constraint::Min(0),
    ])
    .split(area);

    let summary = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title("Story"),
    );
    frame.render_widget(summary, chunks[0]);

    render_references(frame, app, view, detail, chunks[1]);
}

fn render_references(
    frame: &mut Frame,
    app: &App,
    view: &DetailView,
    detail: &StoryDetail,
    area: Rect,
) {
    let theme = &app.theme;
    let title = format!("References ({})", detail.ref_articles.len());

    if detail.ref_articles.is_empty() {
        render_notice(frame, &title, "No reference articles.", theme, area);
        return;
    }

    let max_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = detail
        .ref_articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let mut meta = vec![Span::styled(
                article.display_source(),
                Style::default().fg(theme.source),
            )];
            if let Some(published) = article.published_at() {
                meta.push(Span::styled("  ·  ", theme.dim_style()));
                meta.push(Span::styled(
                    app.format_date(published),
                    Style::default().fg(theme.date),
                ));
            }
            ListItem::new(vec![
                Line::styled(
                    truncate(&article.display_title(i), max_width),
                    Style::default().fg(theme.foreground),
                ),
                Line::from(meta),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(view.selected_ref));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(frame: &mut Frame, app: &App, view: &DetailView, area: Rect) {
    let help_text = if app.show_help {
        hint(
            &detail_keymap(),
            &[
                (Message::SelectNext, "next ref"),
                (Message::SelectPrev, "prev ref"),
                (Message::OpenLink, "open"),
                (Message::NextImage, "image"),
                (Message::Refresh, "reload"),
                (Message::Back, "back"),
            ],
        ) + "  q:quit  ?:hide"
    } else {
        "Enter:open  Esc:back  ?:help".to_string()
    };

    let mut bar = StatusBar::new(&app.theme)
        .label("Story")
        .help(&help_text)
        .flash(app.flash.as_deref());
    match &view.status {
        DetailStatus::Loading => bar = bar.loading("Loading..."),
        DetailStatus::Ready(detail) if !detail.ref_articles.is_empty() => {
            bar = bar.position(view.selected_ref + 1, detail.ref_articles.len());
        }
        _ => {}
    }
    bar.render(frame, area);
}
