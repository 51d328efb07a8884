use std::collections::VecDeque;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::api::{ApiError, CacheMode, NewsClient, StoriesQuery, StoriesResponse, StoryDetail};
use crate::detail::{DetailStatus, DetailView};
use crate::feed::{Completion, FeedStore, FetchKind, FetchTicket};
use crate::sources::SourceCatalog;
use crate::theme::Theme;
use crate::time::{TimeDisplay, format_date_with};

/// Rows from the end of the list at which scrolling pulls the next page.
const LOAD_MORE_THRESHOLD: usize = 3;
const PAGE_JUMP: usize = 10;

pub enum AsyncResult {
    Stories {
        ticket: FetchTicket,
        task_id: u64,
        result: Result<StoriesResponse, ApiError>,
    },
    Detail {
        story_id: String,
        task_id: u64,
        result: Result<StoryDetail, ApiError>,
    },
    Home {
        task_id: u64,
        result: Result<StoriesResponse, ApiError>,
    },
}

#[derive(Debug)]
pub struct TaskInfo {
    pub id: u64,
    pub description: String,
    pub started_at: Instant,
}

#[derive(Debug)]
pub struct LogEntry {
    pub message: String,
}

/// Debug panel state: task tracking and log messages.
#[derive(Debug, Default)]
pub struct DebugState {
    pub visible: bool,
    pub running_tasks: Vec<TaskInfo>,
    pub log: VecDeque<LogEntry>,
    next_task_id: u64,
}

impl DebugState {
    const MAX_LOG_ENTRIES: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, msg: impl Into<String>) {
        self.log.push_back(LogEntry {
            message: msg.into(),
        });
        if self.log.len() > Self::MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }

    pub fn start_task(&mut self, description: impl Into<String>) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        let desc = description.into();
        self.log(format!("Started: {}", desc));
        self.running_tasks.push(TaskInfo {
            id,
            description: desc,
            started_at: Instant::now(),
        });
        id
    }

    pub fn end_task(&mut self, id: u64, outcome: &str) {
        if let Some(pos) = self.running_tasks.iter().position(|t| t.id == id) {
            let task = self.running_tasks.remove(pos);
            let elapsed = task.started_at.elapsed();
            tracing::debug!(task = %task.description, outcome, ?elapsed, "task finished");
            self.log(format!("{} {}: {:.2?}", task.description, outcome, elapsed));
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

/// What the home screen shows: the feed, or the panel that replaces it when
/// the very first fetch failed.
#[derive(Debug)]
pub enum Home {
    Feed(FeedStore),
    Unavailable { message: String, retrying: bool },
}

impl Home {
    pub fn from_first_page(catalog: &SourceCatalog, result: Result<StoriesResponse, ApiError>) -> Self {
        match result {
            Ok(page) => Home::Feed(FeedStore::new(catalog.clone(), page)),
            Err(e) => {
                tracing::error!(error = %e, status = ?e.status(), "initial feed fetch failed");
                Home::Unavailable {
                    message: e.user_message(),
                    retrying: false,
                }
            }
        }
    }
}

/// Fetches the first page with no filters and builds the home screen from it.
pub async fn load_home(client: &NewsClient, catalog: &SourceCatalog) -> Home {
    let result = client
        .fetch_stories(&StoriesQuery::first_page(), CacheMode::Default)
        .await;
    Home::from_first_page(catalog, result)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Feed,
    Detail(DetailView),
}

/// Popups drawn over the feed that capture input while open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Sources { cursor: usize },
    Search { input: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    PageDown,
    PageUp,
    OpenStory,
    OpenLink,
    Back,
    LoadMore,
    Refresh,
    NextImage,
    PrevImage,
    OpenSources,
    StartSearch,
    ClearSearch,
    CloseOverlay,
    OverlayUp,
    OverlayDown,
    ToggleSource,
    SearchInput(char),
    SearchBackspace,
    SubmitSearch,
    ToggleHelp,
    ToggleDebug,
    Quit,
}

pub struct App {
    pub home: Home,
    pub view: View,
    pub overlay: Option<Overlay>,
    pub selected_index: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub flash: Option<String>,
    pub client: NewsClient,
    pub catalog: SourceCatalog,
    pub theme: Theme,
    pub time_display: TimeDisplay,
    // Async task management
    pub result_tx: mpsc::Sender<AsyncResult>,
    pub result_rx: mpsc::Receiver<AsyncResult>,
    // Debug pane
    pub debug: DebugState,
}

impl App {
    pub fn new(
        home: Home,
        client: NewsClient,
        catalog: SourceCatalog,
        theme: Theme,
        time_display: TimeDisplay,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(16);
        Self {
            home,
            view: View::default(),
            overlay: None,
            selected_index: 0,
            should_quit: false,
            show_help: false,
            flash: None,
            client,
            catalog,
            theme,
            time_display,
            result_tx,
            result_rx,
            debug: DebugState::new(),
        }
    }

    pub fn feed(&self) -> Option<&FeedStore> {
        match &self.home {
            Home::Feed(feed) => Some(feed),
            Home::Unavailable { .. } => None,
        }
    }

    fn feed_mut(&mut self) -> Option<&mut FeedStore> {
        match &mut self.home {
            Home::Feed(feed) => Some(feed),
            Home::Unavailable { .. } => None,
        }
    }

    pub fn format_date(&self, value: &str) -> String {
        format_date_with(value, self.time_display)
    }

    pub fn selected_story_id(&self) -> Option<String> {
        self.feed()?
            .items()
            .get(self.selected_index)
            .map(|s| s.id.clone())
    }

    pub fn handle_async_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::Stories {
                ticket,
                task_id,
                result,
            } => {
                let Some(feed) = self.feed_mut() else {
                    self.debug.end_task(task_id, "discarded (no feed)");
                    return;
                };
                let outcome = feed.complete(&ticket, result);
                let item_count = feed.items().len();
                self.debug.end_task(task_id, outcome.label());

                if outcome == Completion::Applied && ticket.kind != FetchKind::LoadMore {
                    self.selected_index = 0;
                }
                self.selected_index = self.selected_index.min(item_count.saturating_sub(1));
            }
            AsyncResult::Detail {
                story_id,
                task_id,
                result,
            } => {
                let View::Detail(detail) = &mut self.view else {
                    self.debug.end_task(task_id, "discarded (wrong view)");
                    return;
                };
                if !detail.complete(&story_id, result) {
                    self.debug.end_task(task_id, "discarded (wrong view)");
                    return;
                }
                let outcome = match detail.status {
                    DetailStatus::Ready(_) => "completed",
                    DetailStatus::NotFound => "not found",
                    _ => "failed",
                };
                self.debug.end_task(task_id, outcome);
            }
            AsyncResult::Home { task_id, result } => {
                let outcome = if result.is_ok() { "completed" } else { "failed" };
                self.debug.end_task(task_id, outcome);
                self.home = Home::from_first_page(&self.catalog, result);
                self.selected_index = 0;
            }
        }
    }

    pub fn update(&mut self, msg: Message) {
        self.flash = None;

        match msg {
            Message::Quit => {
                self.should_quit = true;
                return;
            }
            Message::ToggleDebug => {
                self.debug.toggle();
                return;
            }
            Message::ToggleHelp => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        if let Home::Unavailable { retrying, .. } = &self.home {
            if msg == Message::Refresh && !*retrying {
                self.spawn_home_fetch();
            }
            return;
        }

        if self.overlay.is_some() {
            self.update_overlay(msg);
            return;
        }

        match self.view {
            View::Feed => self.update_feed(msg),
            View::Detail(_) => self.update_detail(msg),
        }
    }

    fn update_feed(&mut self, msg: Message) {
        match msg {
            Message::SelectNext => {
                self.select_next();
                self.load_more_if_near_end();
            }
            Message::SelectPrev => self.selected_index = self.selected_index.saturating_sub(1),
            Message::SelectFirst => self.selected_index = 0,
            Message::SelectLast => {
                self.selected_index = self.item_count().saturating_sub(1);
                self.load_more_if_near_end();
            }
            Message::PageDown => {
                self.selected_index =
                    (self.selected_index + PAGE_JUMP).min(self.item_count().saturating_sub(1));
                self.load_more_if_near_end();
            }
            Message::PageUp => self.selected_index = self.selected_index.saturating_sub(PAGE_JUMP),
            Message::OpenStory => self.open_story(),
            Message::OpenLink => self.open_cover_image(),
            Message::LoadMore => self.load_more(),
            Message::Refresh => {
                if let Some(ticket) = self.feed_mut().and_then(FeedStore::refresh) {
                    self.spawn_stories_fetch(ticket);
                }
            }
            Message::NextImage => self.cycle_feed_image(1),
            Message::PrevImage => self.cycle_feed_image(-1),
            Message::OpenSources => self.overlay = Some(Overlay::Sources { cursor: 0 }),
            Message::StartSearch => {
                let input = self
                    .feed()
                    .and_then(|f| f.filters().search())
                    .unwrap_or_default()
                    .to_string();
                self.overlay = Some(Overlay::Search { input });
            }
            Message::ClearSearch => {
                let Some(feed) = self.feed() else { return };
                if feed.filters().search().is_some() {
                    let filters = feed.filters().with_search("");
                    self.apply_filters(filters);
                }
            }
            _ => {}
        }
    }

    fn update_detail(&mut self, msg: Message) {
        let View::Detail(detail) = &mut self.view else {
            return;
        };
        match msg {
            Message::SelectNext => detail.select_next(),
            Message::SelectPrev => detail.select_prev(),
            Message::NextImage => detail.cycle_image(1),
            Message::PrevImage => detail.cycle_image(-1),
            Message::OpenLink => {
                let link = detail.selected_article().and_then(|a| {
                    let key = a.list_key(&detail.story_id, detail.selected_ref);
                    tracing::debug!(story = %detail.story_id, reference = %key, "opening reference");
                    a.link().map(str::to_string)
                });
                match link {
                    Some(url) => self.open_url(&url),
                    None => self.flash = Some("No link for this reference".into()),
                }
            }
            // At most one detail fetch in flight.
            Message::Refresh if detail.is_loading() => {}
            Message::Refresh => {
                let story_id = detail.story_id.clone();
                *detail = DetailView::loading(story_id.clone());
                self.spawn_detail_fetch(story_id);
            }
            Message::Back => self.view = View::Feed,
            _ => {}
        }
    }

    fn update_overlay(&mut self, msg: Message) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        match (overlay, msg) {
            (_, Message::CloseOverlay) => self.overlay = None,
            (Overlay::Sources { cursor }, Message::OverlayUp) => {
                *cursor = cursor.saturating_sub(1);
            }
            (Overlay::Sources { cursor }, Message::OverlayDown) => {
                if *cursor + 1 < self.catalog.len() {
                    *cursor += 1;
                }
            }
            (Overlay::Sources { cursor }, Message::ToggleSource) => {
                let cursor = *cursor;
                let Some(key) = self.catalog.get(cursor).map(|s| s.key.clone()) else {
                    return;
                };
                let Some(feed) = self.feed() else { return };
                let filters = feed.filters().toggled(&key);
                self.apply_filters(filters);
            }
            (Overlay::Search { input }, Message::SearchInput(c)) => input.push(c),
            (Overlay::Search { input }, Message::SearchBackspace) => {
                input.pop();
            }
            (Overlay::Search { input }, Message::SubmitSearch) => {
                let query = std::mem::take(input);
                self.overlay = None;
                let Some(feed) = self.feed() else { return };
                let filters = feed.filters().with_search(&query);
                self.apply_filters(filters);
            }
            _ => {}
        }
    }

    fn apply_filters(&mut self, filters: crate::sources::FilterState) {
        let Some(feed) = self.feed_mut() else { return };
        let ticket = feed.set_filters(filters);
        self.selected_index = 0;
        if let Some(ticket) = ticket {
            self.spawn_stories_fetch(ticket);
        } else {
            self.debug.log("Filters cleared: no sources selected");
        }
    }

    fn item_count(&self) -> usize {
        self.feed().map_or(0, |f| f.items().len())
    }

    fn select_next(&mut self) {
        let count = self.item_count();
        if count > 0 && self.selected_index < count - 1 {
            self.selected_index += 1;
        }
    }

    fn load_more_if_near_end(&mut self) {
        let count = self.item_count();
        if count > 0 && self.selected_index + LOAD_MORE_THRESHOLD >= count {
            self.load_more();
        }
    }

    fn load_more(&mut self) {
        if let Some(ticket) = self.feed_mut().and_then(FeedStore::load_more) {
            self.spawn_stories_fetch(ticket);
        }
    }

    fn cycle_feed_image(&mut self, delta: isize) {
        if let Some(id) = self.selected_story_id()
            && let Some(feed) = self.feed_mut()
        {
            feed.cycle_image(&id, delta);
        }
    }

    fn open_story(&mut self) {
        if let Some(id) = self.selected_story_id() {
            self.view = View::Detail(DetailView::loading(id.clone()));
            self.spawn_detail_fetch(id);
        }
    }

    fn open_cover_image(&mut self) {
        let url = self.feed().and_then(|feed| {
            let story = feed.items().get(self.selected_index)?;
            let index = feed
                .active_image(&story.id)
                .min(story.cover_images.len().saturating_sub(1));
            story.cover_images.get(index).cloned()
        });
        match url {
            Some(url) => self.open_url(&url),
            None => self.flash = Some("No cover image".into()),
        }
    }

    fn open_url(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::warn!(%url, error = %e, "failed to open link");
            self.flash = Some(format!("Could not open link: {e}"));
        }
    }

    /// Spawn an async task running a feed fetch described by `ticket`.
    fn spawn_stories_fetch(&mut self, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task(format!(
            "{} page {} (gen {})",
            ticket.kind.label(),
            ticket.query.page,
            ticket.generation
        ));
        tracing::debug!(
            kind = ticket.kind.label(),
            query = %ticket.query.to_query_string(),
            generation = ticket.generation,
            "spawning stories fetch"
        );

        tokio::spawn(async move {
            let result = client.fetch_stories(&ticket.query, ticket.cache).await;
            let _ = tx
                .send(AsyncResult::Stories {
                    ticket,
                    task_id,
                    result,
                })
                .await;
        });
    }

    fn spawn_detail_fetch(&mut self, story_id: String) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task(format!("Load story {}", story_id));

        tokio::spawn(async move {
            let result = client.fetch_story_detail(&story_id).await;
            let _ = tx
                .send(AsyncResult::Detail {
                    story_id,
                    task_id,
                    result,
                })
                .await;
        });
    }

    fn spawn_home_fetch(&mut self) {
        if let Home::Unavailable { retrying, .. } = &mut self.home {
            *retrying = true;
        }
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let task_id = self.debug.start_task("Load home feed");

        tokio::spawn(async move {
            let result = client
                .fetch_stories(&StoriesQuery::first_page(), CacheMode::NoStore)
                .await;
            let _ = tx.send(AsyncResult::Home { task_id, result }).await;
        });
    }
}
