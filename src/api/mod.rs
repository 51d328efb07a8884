mod client;
mod error;
mod query;
mod types;

pub use client::{CacheMode, DEFAULT_CACHE_TTL, DEFAULT_TIMEOUT, NewsClient};
pub use error::ApiError;
pub use query::{StoriesQuery, build_stories_query};
pub use types::{Pagination, RefArticle, StoriesResponse, StoryDetail, StoryItem};
