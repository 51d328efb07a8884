//! Test data builders for state and view testing.

use std::time::Duration;

use url::Url;

use crate::api::{
    DEFAULT_CACHE_TTL, NewsClient, Pagination, RefArticle, StoriesResponse, StoryDetail, StoryItem,
};
use crate::app::{App, Home, Overlay, View};
use crate::feed::FeedStore;
use crate::sources::{FilterState, SourceCatalog};
use crate::theme::Theme;
use crate::time::TimeDisplay;

/// Fixed timestamp used by sample data; renders as "Feb 23, 2026 at 12:49 PM" in UTC.
pub const TEST_DATE: &str = "2026-02-23T12:49:00Z";

pub struct StoryBuilder {
    id: String,
    headline: String,
    at: String,
    images: usize,
}

impl Default for StoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl StoryBuilder {
    pub fn new() -> Self {
        Self {
            id: "story-1".to_string(),
            headline: "Test Story".to_string(),
            at: TEST_DATE.to_string(),
            images: 0,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn headline(mut self, headline: &str) -> Self {
        self.headline = headline.to_string();
        self
    }

    pub fn at(mut self, at: &str) -> Self {
        self.at = at.to_string();
        self
    }

    pub fn images(mut self, count: usize) -> Self {
        self.images = count;
        self
    }

    pub fn build(self) -> StoryItem {
        let cover_images = (0..self.images)
            .map(|i| format!("https://img.example.com/{}/{}.jpg", self.id, i))
            .collect();
        StoryItem {
            id: self.id,
            headline: self.headline,
            latest_ref_article_at: self.at,
            cover_images,
        }
    }

    pub fn page(items: Vec<StoryItem>, page: u32, has_next: bool) -> StoriesResponse {
        let page_size = items.len() as u32;
        StoriesResponse {
            pagination: Pagination {
                page,
                page_size,
                total: u64::from(page * page_size) + u64::from(has_next),
                has_next,
            },
            items,
        }
    }
}

/// A page whose stories carry the given ids and headlines "Story <id>".
pub fn stories_page(ids: &[&str], page: u32, has_next: bool) -> StoriesResponse {
    let items = ids
        .iter()
        .map(|id| {
            StoryBuilder::new()
                .id(id)
                .headline(&format!("Story {id}"))
                .build()
        })
        .collect();
    StoryBuilder::page(items, page, has_next)
}

/// Wire form of [`stories_page`] for mock servers.
pub fn page_json(ids: &[&str], page: u32, has_next: bool) -> serde_json::Value {
    serde_json::to_value(stories_page(ids, page, has_next)).unwrap()
}

pub fn sample_stories() -> Vec<StoryItem> {
    vec![
        StoryBuilder::new()
            .id("s1")
            .headline("Singapore unveils new semiconductor push")
            .images(3)
            .build(),
        StoryBuilder::new()
            .id("s2")
            .headline("MRT line disruption eases after &quot;signal fault&quot;")
            .at("2026-02-22T08:05:00Z")
            .images(1)
            .build(),
        StoryBuilder::new()
            .id("s3")
            .headline("Hawker centre revamp draws crowds")
            .at("not a date")
            .build(),
    ]
}

pub fn sample_detail(id: &str) -> StoryDetail {
    StoryDetail {
        id: id.to_string(),
        headline: "Singapore unveils new semiconductor push".to_string(),
        summary: vec![
            "The plan targets advanced packaging.".to_string(),
            "   ".to_string(),
            "Investment will be phased over five years.".to_string(),
        ],
        cover_images: vec![
            "https://img.example.com/a.jpg".to_string(),
            "https://img.example.com/b.jpg".to_string(),
        ],
        latest_ref_article_at: TEST_DATE.to_string(),
        ref_articles: vec![
            RefArticle {
                article_id: "r1".to_string(),
                url: "https://www.straitstimes.com/chips".to_string(),
                title: "Chip plan unveiled".to_string(),
                update_date: TEST_DATE.to_string(),
                source: "The Straits Times".to_string(),
            },
            RefArticle {
                article_id: String::new(),
                url: "https://mothership.sg/chips".to_string(),
                title: String::new(),
                update_date: String::new(),
                source: String::new(),
            },
        ],
    }
}

/// Client pointed at a mock server, with caching disabled.
pub fn mock_client(server: &wiremock::MockServer) -> NewsClient {
    let base = Url::parse(&server.uri()).unwrap();
    NewsClient::new(base, Duration::from_secs(5), Duration::ZERO).unwrap()
}

/// Like [`mock_client`], but keeps stories pages for the default TTL.
pub fn caching_mock_client(server: &wiremock::MockServer) -> NewsClient {
    let base = Url::parse(&server.uri()).unwrap();
    NewsClient::new(base, Duration::from_secs(5), DEFAULT_CACHE_TTL).unwrap()
}

/// Client pointed at a port nobody listens on; for tests that never fetch.
pub fn offline_client() -> NewsClient {
    let base = Url::parse("http://127.0.0.1:9").unwrap();
    NewsClient::new(base, Duration::from_secs(1), Duration::ZERO).unwrap()
}

pub struct TestAppBuilder {
    page: StoriesResponse,
    filters: Option<FilterState>,
    unavailable: Option<String>,
    view: View,
    overlay: Option<Overlay>,
    selected_index: usize,
    show_help: bool,
    client: Option<NewsClient>,
    catalog: SourceCatalog,
    theme: Theme,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            page: stories_page(&[], 1, false),
            filters: None,
            unavailable: None,
            view: View::Feed,
            overlay: None,
            selected_index: 0,
            show_help: false,
            client: None,
            catalog: SourceCatalog::default(),
            theme: Theme::dark(),
        }
    }

    pub fn with_page(mut self, page: StoriesResponse) -> Self {
        self.page = page;
        self
    }

    pub fn with_sample_stories(self) -> Self {
        self.with_page(StoryBuilder::page(sample_stories(), 1, true))
    }

    pub fn filters(mut self, filters: FilterState) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn unavailable(mut self, message: &str) -> Self {
        self.unavailable = Some(message.to_string());
        self
    }

    pub fn view(mut self, view: View) -> Self {
        self.view = view;
        self
    }

    pub fn overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn show_help(mut self) -> Self {
        self.show_help = true;
        self
    }

    pub fn client(mut self, client: NewsClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn build(self) -> App {
        let home = match self.unavailable {
            Some(message) => Home::Unavailable {
                message,
                retrying: false,
            },
            None => {
                let filters = self
                    .filters
                    .unwrap_or_else(|| FilterState::all(&self.catalog));
                Home::Feed(FeedStore::with_filters(
                    self.catalog.clone(),
                    filters,
                    self.page,
                ))
            }
        };
        let client = self.client.unwrap_or_else(offline_client);

        let mut app = App::new(home, client, self.catalog, self.theme, TimeDisplay::Utc);
        app.view = self.view;
        app.overlay = self.overlay;
        app.selected_index = self.selected_index;
        app.show_help = self.show_help;
        app
    }
}
