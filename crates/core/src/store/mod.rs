//! Catalog Store: durable storage for podcasts, episodes, reviews and users.
//!
//! Operations return a [`StoreError`] whose kind tells callers whether a row
//! was missing, a constraint was violated, or the backend itself failed.

mod sqlite;

pub use sqlite::SqliteCatalogStore;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::account::{User, UserId, UserRole};
use crate::podcast::{
    CatalogStats, Episode, EpisodeId, Podcast, PodcastId, PodcastRelations, Review,
};

/// Errors for catalog store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for catalog storage backends.
pub trait CatalogStore: Send + Sync {
    // Podcasts

    /// Insert a podcast with the default rating.
    fn create_podcast(&self, title: &str, category: &str) -> Result<Podcast, StoreError>;

    /// Get a podcast by ID, loading the requested relations.
    fn find_podcast(
        &self,
        id: PodcastId,
        relations: PodcastRelations,
    ) -> Result<Option<Podcast>, StoreError>;

    /// List all podcasts, without relations.
    fn list_podcasts(&self) -> Result<Vec<Podcast>, StoreError>;

    /// Case-sensitive substring match on title.
    ///
    /// Returns one page of podcasts plus the total number of matches.
    fn search_podcasts(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Podcast>, u64), StoreError>;

    /// Persist the scalar fields of an existing podcast.
    fn save_podcast(&self, podcast: &Podcast) -> Result<Podcast, StoreError>;

    /// Delete a podcast. Episodes, reviews and relation rows go with it.
    fn delete_podcast(&self, id: PodcastId) -> Result<(), StoreError>;

    // Episodes

    fn create_episode(
        &self,
        podcast_id: PodcastId,
        title: &str,
        category: &str,
    ) -> Result<Episode, StoreError>;

    fn find_episode(&self, id: EpisodeId) -> Result<Option<Episode>, StoreError>;

    fn list_episodes(&self, podcast_id: PodcastId) -> Result<Vec<Episode>, StoreError>;

    fn save_episode(&self, episode: &Episode) -> Result<Episode, StoreError>;

    fn delete_episode(&self, id: EpisodeId) -> Result<(), StoreError>;

    // Reviews

    fn create_review(
        &self,
        author: UserId,
        podcast_id: PodcastId,
        rating: i32,
        comment: &str,
    ) -> Result<Review, StoreError>;

    fn list_reviews(&self, podcast_id: PodcastId) -> Result<Vec<Review>, StoreError>;

    // Users

    /// Insert a user. Fails with [`StoreError::Conflict`] if the email is taken.
    fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError>;

    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    // Subscriptions

    fn subscription_ids(&self, user_id: UserId) -> Result<BTreeSet<PodcastId>, StoreError>;

    /// Add or remove a podcast from the user's subscription set.
    fn set_subscribed(
        &self,
        user_id: UserId,
        podcast_id: PodcastId,
        subscribed: bool,
    ) -> Result<(), StoreError>;

    fn list_subscriptions(&self, user_id: UserId) -> Result<Vec<Podcast>, StoreError>;

    // Watched episodes

    fn watched_episode_ids(&self, user_id: UserId) -> Result<BTreeSet<EpisodeId>, StoreError>;

    /// Add an episode to the user's watched set. Adding twice is a no-op.
    fn add_watched_episode(&self, user_id: UserId, episode_id: EpisodeId)
        -> Result<(), StoreError>;

    fn list_watched_episodes(&self, user_id: UserId) -> Result<Vec<Episode>, StoreError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, StoreError>;
}
