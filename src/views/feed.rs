use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::api::StoryItem;
use crate::app::{App, Message};
use crate::feed::FeedStore;
use crate::keys::{feed_keymap, hint};
use crate::views::common::{render_notice, truncate};
use crate::views::status_bar::StatusBar;

const NO_SOURCES: &str = "No dispatches available. Please select at least one source.";
const EMPTY_RESPONSE: &str = "No stories available. Backend returned an empty response.";
const LOADING: &str = "Loading dispatches...";
const END_OF_FEED: &str = "— End of dispatches —";

pub fn render(frame: &mut Frame, app: &App, feed: &FeedStore, area: Rect) {
    let footer = footer_lines(app, feed);
    let chunks = Layout::vertical([
        Constraint::Length(1),                          // Header
        Constraint::Min(0),                             // Story list
        Constraint::Length(footer.len().max(1) as u16), // Footer
        Constraint::Length(1),                          // Status bar
    ])
    .split(area);

    render_header(frame, app, feed, chunks[0]);
    render_story_list(frame, app, feed, chunks[1]);
    frame.render_widget(Paragraph::new(footer).centered(), chunks[2]);
    render_status_bar(frame, app, feed, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, feed: &FeedStore, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(
            "◆ Latest dispatches",
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Sources ({})", feed.filters().selected().len()),
            Style::default().fg(theme.source),
        ),
    ];

    if let Some(search) = feed.filters().search() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Search: \"{}\"", search),
            Style::default().fg(theme.foreground),
        ));
    }

    if feed.is_refreshing() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "⟳ Refreshing",
            Style::default().fg(theme.spinner),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_story_list(frame: &mut Frame, app: &App, feed: &FeedStore, area: Rect) {
    let theme = &app.theme;

    if feed.items().is_empty() {
        let message = if feed.filters().selects_nothing() {
            NO_SOURCES
        } else if feed.is_loading() {
            LOADING
        } else {
            EMPTY_RESPONSE
        };
        render_notice(frame, "Stories", message, theme, area);
        return;
    }

    // Borders plus the highlight symbol
    let content_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = feed
        .items()
        .iter()
        .map(|story| story_to_list_item(app, feed, story, content_width))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(format!("Stories ({})", feed.items().len())),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn story_to_list_item(
    app: &App,
    feed: &FeedStore,
    story: &StoryItem,
    max_width: usize,
) -> ListItem<'static> {
    let theme = &app.theme;
    let headline = truncate(&story.display_headline(), max_width);

    let mut meta = vec![Span::styled(
        app.format_date(&story.latest_ref_article_at),
        Style::default().fg(theme.date),
    )];
    let image_count = story.cover_images.len();
    if image_count > 0 {
        let active = feed.active_image(&story.id).min(image_count - 1);
        meta.push(Span::styled("  ·  ", theme.dim_style()));
        meta.push(Span::styled(
            format!("image {}/{}", active + 1, image_count),
            Style::default().fg(theme.source),
        ));
    }

    ListItem::new(vec![
        Line::from(Span::styled(headline, theme.headline_style())),
        Line::from(meta),
    ])
}

/// Pagination state, then the last load error on its own line.
fn footer_lines(app: &App, feed: &FeedStore) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let mut lines = Vec::new();

    if !feed.items().is_empty() {
        lines.push(if feed.is_loading() {
            Line::styled("Loading more...", Style::default().fg(theme.spinner))
        } else if feed.has_next() {
            Line::styled("m: Load more", theme.dim_style())
        } else {
            Line::styled(END_OF_FEED, theme.dim_style())
        });
    }
    if let Some(err) = feed.load_error() {
        lines.push(Line::styled(format!("⚠ {}", err), theme.error_style()));
    }
    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, feed: &FeedStore, area: Rect) {
    let keymap = feed_keymap();
    let help_text = if app.show_help {
        hint(
            &keymap,
            &[
                (Message::SelectNext, "down"),
                (Message::SelectPrev, "up"),
                (Message::OpenStory, "open"),
                (Message::NextImage, "image"),
                (Message::OpenLink, "view image"),
                (Message::LoadMore, "more"),
                (Message::Refresh, "refresh"),
                (Message::OpenSources, "sources"),
                (Message::StartSearch, "search"),
                (Message::ClearSearch, "clear search"),
            ],
        ) + "  `:debug  q:quit  ?:hide"
    } else {
        "s:sources  /:search  ?:help  q:quit".to_string()
    };

    let loading = if feed.is_refreshing() {
        Some("Refreshing...")
    } else if feed.is_loading() {
        Some("Loading...")
    } else {
        None
    };

    let mut bar = StatusBar::new(&app.theme)
        .label("Feed")
        .help(&help_text)
        .flash(app.flash.as_deref());
    if let Some(text) = loading {
        bar = bar.loading(text);
    }
    if !feed.items().is_empty() {
        bar = bar.position(app.selected_index + 1, feed.items().len());
    }
    bar.render(frame, area);
}
