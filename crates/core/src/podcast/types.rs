//! Catalog entities and operation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::UserId;

pub type PodcastId = i64;
pub type EpisodeId = i64;
pub type ReviewId = i64;

/// Rating given to a podcast that has never been rated.
pub const DEFAULT_PODCAST_RATING: i32 = 0;

/// Bounds accepted by `update_podcast` for `rating`.
pub const PODCAST_RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// Bounds enforced on every stored review.
pub const REVIEW_RATING_RANGE: std::ops::RangeInclusive<i32> = 0..=5;

/// Allowed review comment length, in characters.
pub const REVIEW_COMMENT_LENGTH: std::ops::RangeInclusive<usize> = 5..=255;

/// Fixed page size for title search.
pub const SEARCH_PAGE_SIZE: u32 = 25;

/// A podcast show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podcast {
    pub id: PodcastId,
    pub title: String,
    pub category: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Episodes, only present when requested through [`PodcastRelations`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Vec<Episode>>,
    /// Reviews, only present when requested through [`PodcastRelations`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}

impl Podcast {
    /// Apply a partial update. Fields absent from the payload are left unchanged.
    pub fn apply_update(&mut self, payload: &UpdatePodcastPayload) {
        if let Some(ref title) = payload.title {
            self.title = title.clone();
        }
        if let Some(ref category) = payload.category {
            self.category = category.clone();
        }
        if let Some(rating) = payload.rating {
            self.rating = rating;
        }
    }
}

/// An episode, always owned by exactly one podcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub podcast_id: PodcastId,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Episode {
    /// Apply a partial update. Fields absent from the payload are left unchanged.
    pub fn apply_update(&mut self, fields: &UpdateEpisodeFields) {
        if let Some(ref title) = fields.title {
            self.title = title.clone();
        }
        if let Some(ref category) = fields.category {
            self.category = category.clone();
        }
    }
}

/// A listener's review of a podcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub podcast_id: PodcastId,
    pub created_by: UserId,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which relations to load alongside a podcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PodcastRelations {
    #[serde(default = "default_true")]
    pub episodes: bool,
    #[serde(default = "default_true")]
    pub reviews: bool,
}

fn default_true() -> bool {
    true
}

impl PodcastRelations {
    pub const ALL: Self = Self {
        episodes: true,
        reviews: true,
    };

    pub const NONE: Self = Self {
        episodes: false,
        reviews: false,
    };
}

impl Default for PodcastRelations {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePodcastInput {
    pub title: String,
    pub category: String,
}

/// Partial podcast update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePodcastPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEpisodeInput {
    pub title: String,
    pub category: String,
}

/// Partial episode update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEpisodeFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewInput {
    pub rating: i32,
    pub comment: String,
}

impl CreateReviewInput {
    /// Entity-level bounds for a review.
    ///
    /// Note the rating range here is `0..=5`, wider than the `1..=5`
    /// accepted by podcast updates.
    pub fn validate(&self) -> Result<(), String> {
        if !REVIEW_RATING_RANGE.contains(&self.rating) {
            return Err(format!(
                "Rating must be between {} and {}.",
                REVIEW_RATING_RANGE.start(),
                REVIEW_RATING_RANGE.end()
            ));
        }
        let length = self.comment.chars().count();
        if !REVIEW_COMMENT_LENGTH.contains(&length) {
            return Err(format!(
                "Comment must be between {} and {} characters.",
                REVIEW_COMMENT_LENGTH.start(),
                REVIEW_COMMENT_LENGTH.end()
            ));
        }
        Ok(())
    }
}

/// One page of title search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub podcasts: Vec<Podcast>,
    pub total_results: u64,
    pub total_pages: u64,
}

impl SearchPage {
    /// Number of pages needed for `total_results` at `page_size` per page.
    pub fn page_count(total_results: u64, page_size: u32) -> u64 {
        total_results.div_ceil(u64::from(page_size))
    }
}

/// Row counts across the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub podcasts: u64,
    pub episodes: u64,
    pub reviews: u64,
    pub users: u64,
}
