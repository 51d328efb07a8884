//! News source catalog and the user's filter selection over it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A news source: display name plus the backend collection key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub key: String,
}

impl Source {
    pub fn new(name: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
        }
    }
}

/// Every source the backend knows about, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCatalog {
    sources: Vec<Source>,
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::new(vec![
            Source::new("Channel News Asia", "channel_news_asia"),
            Source::new("Mothership", "mothership"),
            Source::new("The Straits Times", "straits_times"),
        ])
    }
}

impl SourceCatalog {
    /// Builds a catalog, dropping entries whose key repeats an earlier one.
    pub fn new(sources: Vec<Source>) -> Self {
        let mut seen = BTreeSet::new();
        let sources = sources
            .into_iter()
            .filter(|s| seen.insert(s.key.clone()))
            .collect();
        Self { sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.key.as_str())
    }

    pub fn get(&self, index: usize) -> Option<&Source> {
        self.sources.get(index)
    }

    pub fn name_for(&self, key: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.name.as_str())
    }

    /// True when `selected` names every source in the catalog, which the
    /// backend treats the same as no collection filter at all.
    pub fn is_full_selection(&self, selected: &BTreeSet<String>) -> bool {
        self.keys().all(|key| selected.contains(key))
    }
}

/// Which sources to show and what to search for.
///
/// An empty selection means "show nothing", not "show everything".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    selected: BTreeSet<String>,
    search: Option<String>,
}

impl FilterState {
    pub fn new<I, S>(selected: I, search: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
            search: normalize_search(search),
        }
    }

    /// Every catalog source selected, no search.
    pub fn all(catalog: &SourceCatalog) -> Self {
        Self::new(catalog.keys(), None)
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn selects_nothing(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    /// Copy with `key` flipped in or out of the selection.
    pub fn toggled(&self, key: &str) -> Self {
        let mut next = self.clone();
        if !next.selected.remove(key) {
            next.selected.insert(key.to_string());
        }
        next
    }

    /// Copy with a new search query; blank queries clear the search.
    pub fn with_search(&self, query: &str) -> Self {
        Self {
            selected: self.selected.clone(),
            search: normalize_search(Some(query)),
        }
    }
}

fn normalize_search(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}
