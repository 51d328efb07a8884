use serde::{Deserialize, Deserializer, Serialize};

/// Reads a JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trim and decode HTML entities left behind by scrapers.
pub fn clean_text(raw: &str) -> String {
    html_escape::decode_html_entities(raw.trim()).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_ref_article_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_images: Vec<String>,
}

impl StoryItem {
    pub fn display_headline(&self) -> String {
        clean_text(&self.headline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub has_next: bool,
}

impl Pagination {
    /// Number of stories on the pages before this one.
    pub fn offset(&self) -> usize {
        let skipped = self.page.saturating_sub(1) as usize;
        skipped.saturating_mul(self.page_size as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoriesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<StoryItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefArticle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
}

impl RefArticle {
    /// Title for display; falls back to "Reference N" (1-based).
    pub fn display_title(&self, index: usize) -> String {
        let title = clean_text(&self.title);
        if title.is_empty() {
            format!("Reference {}", index + 1)
        } else {
            title
        }
    }

    pub fn display_source(&self) -> String {
        let source = clean_text(&self.source);
        if source.is_empty() {
            "Unknown source".into()
        } else {
            source
        }
    }

    pub fn published_at(&self) -> Option<&str> {
        Some(self.update_date.trim()).filter(|s| !s.is_empty())
    }

    pub fn link(&self) -> Option<&str> {
        Some(self.url.trim()).filter(|s| !s.is_empty())
    }

    /// Stable identity for list rendering: article id, then url, then position.
    pub fn list_key(&self, story_id: &str, index: usize) -> String {
        let article_id = self.article_id.trim();
        if !article_id.is_empty() {
            return article_id.to_string();
        }
        if let Some(url) = self.link() {
            return url.to_string();
        }
        format!("{story_id}-{index}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDetail {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_ref_article_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ref_articles: Vec<RefArticle>,
}

impl StoryDetail {
    /// Summary sentences that still have content after trimming.
    pub fn summary_bullets(&self) -> impl Iterator<Item = &str> {
        self.summary
            .iter()
            .map(|sentence| sentence.trim())
            .filter(|sentence| !sentence.is_empty())
    }

    pub fn display_headline(&self) -> String {
        clean_text(&self.headline)
    }
}
