//! State for a single story's detail page.

use crate::api::{ApiError, RefArticle, StoryDetail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailStatus {
    Loading,
    Ready(StoryDetail),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub story_id: String,
    pub status: DetailStatus,
    pub selected_ref: usize,
    pub active_image: usize,
}

impl DetailView {
    pub fn loading(story_id: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            status: DetailStatus::Loading,
            selected_ref: 0,
            active_image: 0,
        }
    }

    /// Applies a fetch result. Results for another story are ignored and
    /// `false` is returned.
    pub fn complete(&mut self, story_id: &str, result: Result<StoryDetail, ApiError>) -> bool {
        if story_id != self.story_id {
            return false;
        }
        self.status = match result {
            Ok(detail) => DetailStatus::Ready(detail),
            Err(e) if e.is_not_found() => DetailStatus::NotFound,
            Err(e) => DetailStatus::Failed(e.user_message()),
        };
        self.selected_ref = 0;
        self.active_image = 0;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.status == DetailStatus::Loading
    }

    pub fn detail(&self) -> Option<&StoryDetail> {
        match &self.status {
            DetailStatus::Ready(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn selected_article(&self) -> Option<&RefArticle> {
        self.detail()?.ref_articles.get(self.selected_ref)
    }

    pub fn select_next(&mut self) {
        let count = self.detail().map_or(0, |d| d.ref_articles.len());
        if count > 0 && self.selected_ref < count - 1 {
            self.selected_ref += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_ref = self.selected_ref.saturating_sub(1);
    }

    pub fn cycle_image(&mut self, delta: isize) {
        let count = self.detail().map_or(0, |d| d.cover_images.len());
        if count > 1 {
            let current = self.active_image.min(count - 1) as isize;
            self.active_image = (current + delta).rem_euclid(count as isize) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_detail;

    #[test]
    fn found_story_becomes_ready() {
        let mut view = DetailView::loading("s1");
        assert!(view.complete("s1", Ok(sample_detail("s1"))));
        assert_eq!(view.detail().map(|d| d.id.as_str()), Some("s1"));
    }

    #[test]
    fn not_found_is_its_own_outcome() {
        let mut view = DetailView::loading("gone");
        view.complete(
            "gone",
            Err(ApiError::NotFound {
                path: "/api/story/gone".into(),
            }),
        );
        assert_eq!(view.status, DetailStatus::NotFound);
    }

    #[test]
    fn other_failures_keep_message() {
        let mut view = DetailView::loading("s1");
        view.complete(
            "s1",
            Err(ApiError::RequestFailed {
                path: "/api/story/s1".into(),
                status: 500,
            }),
        );
        assert_eq!(
            view.status,
            DetailStatus::Failed("Request failed: /api/story/s1 (500)".into())
        );
    }

    #[test]
    fn results_for_other_stories_are_ignored() {
        let mut view = DetailView::loading("s2");
        assert!(!view.complete("s1", Ok(sample_detail("s1"))));
        assert_eq!(view.status, DetailStatus::Loading);
    }

    #[test]
    fn reference_selection_is_clamped() {
        let mut view = DetailView::loading("s1");
        view.complete("s1", Ok(sample_detail("s1")));
        let count = view.detail().unwrap().ref_articles.len();

        for _ in 0..count + 3 {
            view.select_next();
        }
        assert_eq!(view.selected_ref, count - 1);

        for _ in 0..count + 3 {
            view.select_prev();
        }
        assert_eq!(view.selected_ref, 0);
    }

    #[test]
    fn image_cycling_wraps() {
        let mut view = DetailView::loading("s1");
        view.complete("s1", Ok(sample_detail("s1")));
        let count = view.detail().unwrap().cover_images.len();
        assert!(count > 1);

        view.cycle_image(-1);
        assert_eq!(view.active_image, count - 1);
        view.cycle_image(1);
        assert_eq!(view.active_image, 0);
    }
}
