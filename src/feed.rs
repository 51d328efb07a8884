//! Feed synchronization and pagination.
//!
//! [`FeedStore`] owns everything the feed view shows. Its operations decide
//! whether a fetch is needed and hand back a [`FetchTicket`] describing it;
//! whoever runs the fetch passes the ticket back to [`FeedStore::complete`]
//! along with the result. Tickets carry the generation they were issued
//! under, and a filter change starts a new generation, so results from
//! superseded fetches are dropped no matter when they arrive.

use std::collections::{HashMap, HashSet};

use crate::api::{ApiError, CacheMode, StoriesQuery, StoriesResponse, StoryItem};
use crate::sources::{FilterState, SourceCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    LoadMore,
    Refresh,
    Filter,
}

impl FetchKind {
    pub fn label(self) -> &'static str {
        match self {
            FetchKind::LoadMore => "Load more",
            FetchKind::Refresh => "Refresh",
            FetchKind::Filter => "Filter",
        }
    }
}

/// One issued stories fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub generation: u64,
    pub kind: FetchKind,
    pub query: StoriesQuery,
    pub cache: CacheMode,
}

/// What [`FeedStore::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// Issued under an older generation; state untouched.
    Discarded,
}

impl Completion {
    pub fn label(self) -> &'static str {
        match self {
            Completion::Applied => "completed",
            Completion::Failed => "failed",
            Completion::Discarded => "discarded (stale)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStore {
    catalog: SourceCatalog,
    filters: FilterState,
    items: Vec<StoryItem>,
    page: u32,
    has_next: bool,
    load_error: Option<String>,
    active_images: HashMap<String, usize>,
    generation: u64,
    next_ticket: u64,
    // Ticket ids occupying each in-flight slot. Filter fetches share the
    // loading slot with load-more.
    loading: Option<u64>,
    refreshing: Option<u64>,
}

impl FeedStore {
    /// Seeds the feed from an already fetched first page with every source
    /// selected. No fetch is issued.
    pub fn new(catalog: SourceCatalog, seed: StoriesResponse) -> Self {
        let filters = FilterState::all(&catalog);
        Self::with_filters(catalog, filters, seed)
    }

    pub fn with_filters(catalog: SourceCatalog, filters: FilterState, seed: StoriesResponse) -> Self {
        let mut store = Self {
            catalog,
            filters,
            items: Vec::new(),
            page: seed.pagination.page.max(1),
            has_next: seed.pagination.has_next,
            load_error: None,
            active_images: HashMap::new(),
            generation: 0,
            next_ticket: 0,
            loading: None,
            refreshing: None,
        };
        store.append_unique(seed.items);
        store
    }

    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.is_some()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the filters. An empty selection clears the feed on the spot;
    /// anything else refetches page 1 and supersedes in-flight fetches.
    pub fn set_filters(&mut self, filters: FilterState) -> Option<FetchTicket> {
        self.filters = filters;
        self.generation += 1;

        if self.filters.selects_nothing() {
            self.clear_for_empty_selection();
            self.loading = None;
            return None;
        }

        self.load_error = None;
        let ticket = self.issue(FetchKind::Filter, 1, CacheMode::NoStore);
        self.loading = Some(ticket.id);
        Some(ticket)
    }

    /// Fetches the next page, unless something is in flight, there is no
    /// next page, or no source is selected. Ignored calls change nothing.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if self.is_loading()
            || self.is_refreshing()
            || !self.has_next
            || self.filters.selects_nothing()
        {
            return None;
        }
        // No page follows u32::MAX.
        let next_page = self.page.checked_add(1)?;

        self.load_error = None;
        let ticket = self.issue(FetchKind::LoadMore, next_page, CacheMode::Default);
        self.loading = Some(ticket.id);
        Some(ticket)
    }

    /// Refetches page 1 bypassing caches, to replace the feed wholesale.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        if self.is_refreshing() || self.is_loading() {
            return None;
        }

        if self.filters.selects_nothing() {
            self.clear_for_empty_selection();
            return None;
        }

        self.load_error = None;
        let ticket = self.issue(FetchKind::Refresh, 1, CacheMode::NoStore);
        self.refreshing = Some(ticket.id);
        Some(ticket)
    }

    /// Applies the outcome of a fetch issued by this store.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<StoriesResponse, ApiError>,
    ) -> Completion {
        let slot = match ticket.kind {
            FetchKind::LoadMore | FetchKind::Filter => &mut self.loading,
            FetchKind::Refresh => &mut self.refreshing,
        };
        if *slot == Some(ticket.id) {
            *slot = None;
        }

        if ticket.generation != self.generation {
            return Completion::Discarded;
        }

        match result {
            Ok(response) => {
                match ticket.kind {
                    FetchKind::LoadMore => self.append_unique(response.items),
                    FetchKind::Refresh | FetchKind::Filter => {
                        self.items.clear();
                        self.append_unique(response.items);
                        self.active_images.clear();
                    }
                }
                self.page = response.pagination.page.max(1);
                self.has_next = response.pagination.has_next;
                Completion::Applied
            }
            Err(err) => {
                self.load_error = Some(err.user_message());
                Completion::Failed
            }
        }
    }

    /// Carousel position for a story; stories never cycled sit at 0.
    pub fn active_image(&self, story_id: &str) -> usize {
        self.active_images.get(story_id).copied().unwrap_or(0)
    }

    /// Moves a story's carousel by `delta`, wrapping around its images.
    pub fn cycle_image(&mut self, story_id: &str, delta: isize) {
        let Some(count) = self
            .items
            .iter()
            .find(|s| s.id == story_id)
            .map(|s| s.cover_images.len())
            .filter(|&n| n > 1)
        else {
            return;
        };
        let current = self.active_image(story_id).min(count - 1) as isize;
        let next = (current + delta).rem_euclid(count as isize) as usize;
        self.active_images.insert(story_id.to_string(), next);
    }

    fn issue(&mut self, kind: FetchKind, page: u32, cache: CacheMode) -> FetchTicket {
        self.next_ticket += 1;
        FetchTicket {
            id: self.next_ticket,
            generation: self.generation,
            kind,
            query: StoriesQuery::build(page, &self.filters, &self.catalog),
            cache,
        }
    }

    fn clear_for_empty_selection(&mut self) {
        self.items.clear();
        self.has_next = false;
        self.load_error = None;
        self.active_images.clear();
    }

    fn append_unique(&mut self, incoming: Vec<StoryItem>) {
        let mut seen: HashSet<String> = self.items.iter().map(|s| s.id.clone()).collect();
        self.items
            .extend(incoming.into_iter().filter(|s| seen.insert(s.id.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StoryBuilder, stories_page};

    fn ids(store: &FeedStore) -> Vec<&str> {
        store.items().iter().map(|s| s.id.as_str()).collect()
    }

    fn store_with(ids: &[&str], page: u32, has_next: bool) -> FeedStore {
        FeedStore::new(SourceCatalog::default(), stories_page(ids, page, has_next))
    }

    fn failure() -> ApiError {
        ApiError::RequestFailed {
            path: "/api/stories?page=2".into(),
            status: 500,
        }
    }

    #[test]
    fn seeding_issues_nothing_and_keeps_order() {
        let store = store_with(&["a", "b", "a"], 1, true);
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.page(), 1);
        assert!(store.has_next());
        assert!(!store.is_loading());
        assert!(!store.is_refreshing());
        assert_eq!(store.filters(), &FilterState::all(&SourceCatalog::default()));
    }

    #[test]
    fn load_more_appends_only_unseen_ids() {
        let mut store = store_with(&["A", "B"], 1, true);

        let ticket = store.load_more().unwrap();
        assert_eq!(ticket.query.page, 2);
        assert!(store.is_loading());

        let outcome = store.complete(&ticket, Ok(stories_page(&["B", "C"], 2, true)));

        assert_eq!(outcome, Completion::Applied);
        assert_eq!(ids(&store), vec!["A", "B", "C"]);
        assert_eq!(store.page(), 2);
        assert!(!store.is_loading());
    }

    #[test]
    fn repeated_appends_never_duplicate() {
        let mut store = store_with(&["a", "b"], 1, true);
        let pages: [&[&str]; 4] = [&["b", "c", "d"], &["a", "e"], &["e", "e", "f"], &["c"]];
        for (i, page_ids) in pages.iter().enumerate() {
            let ticket = store.load_more().unwrap();
            store.complete(&ticket, Ok(stories_page(page_ids, i as u32 + 2, true)));
        }

        let all = ids(&store);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn load_more_is_noop_without_next_page() {
        let mut store = store_with(&["a"], 1, false);
        let before = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn load_more_is_noop_while_loading() {
        let mut store = store_with(&["a"], 1, true);
        let _first = store.load_more().unwrap();
        let before = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn load_more_is_noop_while_refreshing() {
        let mut store = store_with(&["a"], 1, true);
        let _refresh = store.refresh().unwrap();
        let before = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn load_more_is_noop_with_no_sources() {
        let catalog = SourceCatalog::default();
        let mut store = FeedStore::with_filters(
            catalog,
            FilterState::new(Vec::<String>::new(), None),
            stories_page(&["a"], 1, true),
        );
        let before = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn failed_load_more_keeps_items() {
        let mut store = store_with(&["a", "b"], 1, true);
        let ticket = store.load_more().unwrap();

        let outcome = store.complete(&ticket, Err(failure()));

        assert_eq!(outcome, Completion::Failed);
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.page(), 1);
        assert!(store.has_next());
        assert!(!store.is_loading());
        assert!(!store.load_error().unwrap_or_default().is_empty());
    }

    #[test]
    fn next_operation_clears_previous_error() {
        let mut store = store_with(&["a"], 1, true);
        let ticket = store.load_more().unwrap();
        store.complete(&ticket, Err(failure()));
        assert!(store.load_error().is_some());

        store.load_more().unwrap();
        assert_eq!(store.load_error(), None);
    }

    #[test]
    fn refresh_replaces_items_and_resets_carousels() {
        let mut store = FeedStore::new(
            SourceCatalog::default(),
            StoryBuilder::page(
                vec![StoryBuilder::new().id("a").images(3).build()],
                3,
                true,
            ),
        );
        store.cycle_image("a", 1);
        assert_eq!(store.active_image("a"), 1);

        let ticket = store.refresh().unwrap();
        assert_eq!(ticket.query.page, 1);
        assert_eq!(ticket.cache, CacheMode::NoStore);
        assert!(store.is_refreshing());

        store.complete(&ticket, Ok(stories_page(&["x", "a"], 1, false)));

        assert_eq!(ids(&store), vec!["x", "a"]);
        assert_eq!(store.page(), 1);
        assert!(!store.has_next());
        assert_eq!(store.active_image("a"), 0);
        assert!(!store.is_refreshing());
    }

    #[test]
    fn refresh_is_noop_while_busy() {
        let mut store = store_with(&["a"], 1, true);
        let _more = store.load_more().unwrap();
        assert!(store.refresh().is_none());

        let mut store = store_with(&["a"], 1, true);
        let _refresh = store.refresh().unwrap();
        let before = store.clone();
        assert!(store.refresh().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn failed_refresh_keeps_last_known_good() {
        let mut store = store_with(&["a", "b"], 2, true);
        let ticket = store.refresh().unwrap();

        assert_eq!(store.complete(&ticket, Err(failure())), Completion::Failed);
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.page(), 2);
        assert!(store.load_error().is_some());
    }

    #[test]
    fn refresh_with_no_sources_clears_without_fetching() {
        let mut store = FeedStore::with_filters(
            SourceCatalog::default(),
            FilterState::new(Vec::<String>::new(), None),
            StoryBuilder::page(
                vec![
                    StoryBuilder::new().id("a").images(3).build(),
                    StoryBuilder::new().id("b").build(),
                ],
                1,
                true,
            ),
        );
        store.cycle_image("a", 1);
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert!(store.has_next());
        assert_eq!(store.active_image("a"), 1);
        let generation = store.generation();

        assert!(store.refresh().is_none());

        assert!(store.items().is_empty());
        assert!(!store.has_next());
        assert_eq!(store.active_image("a"), 0);
        assert_eq!(store.load_error(), None);
        assert!(!store.is_refreshing());
        assert_eq!(store.generation(), generation);
    }

    #[test]
    fn load_more_stops_at_last_representable_page() {
        let mut store = store_with(&["a"], u32::MAX, true);
        let before = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn empty_selection_clears_immediately() {
        let mut store = FeedStore::new(
            SourceCatalog::default(),
            StoryBuilder::page(
                vec![StoryBuilder::new().id("a").images(2).build()],
                1,
                true,
            ),
        );
        store.cycle_image("a", 1);
        let ticket = store.load_more().unwrap();
        store.complete(&ticket, Err(failure()));

        let ticket = store.set_filters(FilterState::new(Vec::<String>::new(), None));

        assert!(ticket.is_none());
        assert!(store.items().is_empty());
        assert!(!store.has_next());
        assert_eq!(store.load_error(), None);
        assert_eq!(store.active_image("a"), 0);
        assert!(!store.is_loading());
    }

    #[test]
    fn filter_change_fetches_page_one_under_new_filters() {
        let mut store = store_with(&["a"], 3, true);
        let only = FilterState::new(["mothership"], Some(" chips "));

        let ticket = store.set_filters(only).unwrap();

        assert_eq!(ticket.kind, FetchKind::Filter);
        assert_eq!(ticket.query.page, 1);
        assert_eq!(ticket.query.collections, vec!["mothership".to_string()]);
        assert_eq!(ticket.query.search.as_deref(), Some("chips"));
        assert_eq!(ticket.cache, CacheMode::NoStore);
        assert!(store.is_loading());

        store.complete(&ticket, Ok(stories_page(&["m1", "m2"], 1, true)));
        assert_eq!(ids(&store), vec!["m1", "m2"]);
        assert_eq!(store.page(), 1);
    }

    #[test]
    fn superseded_filter_fetch_loses_when_it_arrives_last() {
        let mut store = store_with(&["a"], 1, true);
        let all = store.filters().clone();

        let first = store.set_filters(all.toggled("mothership")).unwrap();
        let second = store.set_filters(all.toggled("straits_times")).unwrap();

        assert_eq!(
            store.complete(&second, Ok(stories_page(&["second"], 1, false))),
            Completion::Applied
        );
        assert_eq!(
            store.complete(&first, Ok(stories_page(&["first"], 1, true))),
            Completion::Discarded
        );

        assert_eq!(ids(&store), vec!["second"]);
        assert!(!store.has_next());
        assert!(!store.is_loading());
    }

    #[test]
    fn superseded_filter_fetch_loses_when_it_arrives_first() {
        let mut store = store_with(&["a"], 1, true);
        let all = store.filters().clone();

        let first = store.set_filters(all.toggled("mothership")).unwrap();
        let second = store.set_filters(all.toggled("straits_times")).unwrap();

        assert_eq!(
            store.complete(&first, Err(failure())),
            Completion::Discarded
        );
        // The newer fetch still owns the loading flag and no error leaked.
        assert!(store.is_loading());
        assert_eq!(store.load_error(), None);

        store.complete(&second, Ok(stories_page(&["second"], 1, true)));
        assert_eq!(ids(&store), vec!["second"]);
        assert!(!store.is_loading());
    }

    #[test]
    fn filter_change_discards_in_flight_load_more() {
        let mut store = store_with(&["a"], 1, true);
        let more = store.load_more().unwrap();
        let filter = store.set_filters(store.filters().toggled("mothership")).unwrap();

        assert_eq!(
            store.complete(&more, Ok(stories_page(&["old-page-2"], 2, true))),
            Completion::Discarded
        );
        assert!(store.is_loading());

        store.complete(&filter, Ok(stories_page(&["new"], 1, false)));
        assert_eq!(ids(&store), vec!["new"]);
    }

    #[test]
    fn filter_change_discards_in_flight_refresh_and_releases_flag() {
        let mut store = store_with(&["a"], 1, true);
        let refresh = store.refresh().unwrap();
        let filter = store.set_filters(store.filters().toggled("mothership")).unwrap();

        assert_eq!(
            store.complete(&refresh, Ok(stories_page(&["stale"], 1, true))),
            Completion::Discarded
        );
        assert!(!store.is_refreshing());

        store.complete(&filter, Ok(stories_page(&["fresh"], 1, true)));
        assert_eq!(ids(&store), vec!["fresh"]);
    }

    #[test]
    fn clearing_selection_discards_pending_filter_fetch() {
        let mut store = store_with(&["a"], 1, true);
        let pending = store.set_filters(store.filters().toggled("mothership")).unwrap();
        store.set_filters(FilterState::new(Vec::<String>::new(), None));

        assert_eq!(
            store.complete(&pending, Ok(stories_page(&["late"], 1, true))),
            Completion::Discarded
        );
        assert!(store.items().is_empty());
    }

    #[test]
    fn load_more_keeps_carousel_positions() {
        let mut store = FeedStore::new(
            SourceCatalog::default(),
            StoryBuilder::page(
                vec![StoryBuilder::new().id("a").images(3).build()],
                1,
                true,
            ),
        );
        store.cycle_image("a", -1);
        assert_eq!(store.active_image("a"), 2);

        let ticket = store.load_more().unwrap();
        store.complete(&ticket, Ok(stories_page(&["b"], 2, false)));

        assert_eq!(store.active_image("a"), 2);
        assert_eq!(store.active_image("b"), 0);
    }

    #[test]
    fn cycling_ignores_single_image_and_unknown_stories() {
        let mut store = FeedStore::new(
            SourceCatalog::default(),
            StoryBuilder::page(
                vec![StoryBuilder::new().id("a").images(1).build()],
                1,
                true,
            ),
        );
        store.cycle_image("a", 1);
        store.cycle_image("missing", 1);
        assert_eq!(store.active_image("a"), 0);
        assert_eq!(store.active_image("missing"), 0);
    }

    #[test]
    fn has_next_comes_from_response_not_totals() {
        let mut store = store_with(&["a"], 1, true);
        let ticket = store.load_more().unwrap();
        let mut page = stories_page(&["b"], 2, true);
        page.pagination.total = 2;
        page.pagination.page_size = 1;
        store.complete(&ticket, Ok(page));
        assert!(store.has_next());
    }
}
