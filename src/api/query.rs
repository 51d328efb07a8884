use url::form_urlencoded;

use crate::sources::{FilterState, SourceCatalog};

pub const STORIES_PATH: &str = "/api/stories";
pub const STORY_PATH: &str = "/api/story";

/// Parameters for one `GET /api/stories` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoriesQuery {
    pub page: u32,
    /// Empty means no collection filter (all sources).
    pub collections: Vec<String>,
    pub search: Option<String>,
}

impl StoriesQuery {
    /// First page, no filters.
    pub fn first_page() -> Self {
        Self {
            page: 1,
            collections: Vec::new(),
            search: None,
        }
    }

    /// Builds the query for `page` under `filters`.
    ///
    /// A selection covering the whole catalog is sent without any
    /// `collections` parameter. Callers must not build a query for an empty
    /// selection: that would read as "all sources" to the backend.
    pub fn build(page: u32, filters: &FilterState, catalog: &SourceCatalog) -> Self {
        let collections = if catalog.is_full_selection(filters.selected()) {
            Vec::new()
        } else {
            filters.selected().iter().cloned().collect()
        };
        Self {
            page: page.max(1),
            collections,
            search: filters.search().map(str::to_string),
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("page", &self.page.to_string());
        for collection in &self.collections {
            serializer.append_pair("collections", collection);
        }
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            serializer.append_pair("search", search);
        }
        serializer.finish()
    }

    /// Path plus query, as sent to the backend.
    pub fn path(&self) -> String {
        format!("{}?{}", STORIES_PATH, self.to_query_string())
    }
}

/// Query string for `page` under `filters`.
pub fn build_stories_query(page: u32, filters: &FilterState, catalog: &SourceCatalog) -> String {
    StoriesQuery::build(page, filters, catalog).to_query_string()
}
