//! Test doubles for the catalog store.

use std::collections::BTreeSet;

use crate::account::{User, UserId, UserRole};
use crate::podcast::{
    CatalogStats, Episode, EpisodeId, Podcast, PodcastId, PodcastRelations, Review,
};
use crate::store::{CatalogStore, StoreError};

/// A store whose backend is down: every call fails with [`StoreError::Database`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

fn down<T>() -> Result<T, StoreError> {
    Err(StoreError::Database("database is locked".to_string()))
}

impl CatalogStore for UnavailableStore {
    fn create_podcast(&self, _title: &str, _category: &str) -> Result<Podcast, StoreError> {
        down()
    }

    fn find_podcast(
        &self,
        _id: PodcastId,
        _relations: PodcastRelations,
    ) -> Result<Option<Podcast>, StoreError> {
        down()
    }

    fn list_podcasts(&self) -> Result<Vec<Podcast>, StoreError> {
        down()
    }

    fn search_podcasts(
        &self,
        _query: &str,
        _limit: i64,
        _offset: i64,
    ) -> Result<(Vec<Podcast>, u64), StoreError> {
        down()
    }

    fn save_podcast(&self, _podcast: &Podcast) -> Result<Podcast, StoreError> {
        down()
    }

    fn delete_podcast(&self, _id: PodcastId) -> Result<(), StoreError> {
        down()
    }

    fn create_episode(
        &self,
        _podcast_id: PodcastId,
        _title: &str,
        _category: &str,
    ) -> Result<Episode, StoreError> {
        down()
    }

    fn find_episode(&self, _id: EpisodeId) -> Result<Option<Episode>, StoreError> {
        down()
    }

    fn list_episodes(&self, _podcast_id: PodcastId) -> Result<Vec<Episode>, StoreError> {
        down()
    }

    fn save_episode(&self, _episode: &Episode) -> Result<Episode, StoreError> {
        down()
    }

    fn delete_episode(&self, _id: EpisodeId) -> Result<(), StoreError> {
        down()
    }

    fn create_review(
        &self,
        _author: UserId,
        _podcast_id: PodcastId,
        _rating: i32,
        _comment: &str,
    ) -> Result<Review, StoreError> {
        down()
    }

    fn list_reviews(&self, _podcast_id: PodcastId) -> Result<Vec<Review>, StoreError> {
        down()
    }

    fn create_user(
        &self,
        _email: &str,
        _password_hash: &str,
        _role: UserRole,
    ) -> Result<User, StoreError> {
        down()
    }

    fn find_user(&self, _id: UserId) -> Result<Option<User>, StoreError> {
        down()
    }

    fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        down()
    }

    fn subscription_ids(&self, _user_id: UserId) -> Result<BTreeSet<PodcastId>, StoreError> {
        down()
    }

    fn set_subscribed(
        &self,
        _user_id: UserId,
        _podcast_id: PodcastId,
        _subscribed: bool,
    ) -> Result<(), StoreError> {
        down()
    }

    fn list_subscriptions(&self, _user_id: UserId) -> Result<Vec<Podcast>, StoreError> {
        down()
    }

    fn watched_episode_ids(&self, _user_id: UserId) -> Result<BTreeSet<EpisodeId>, StoreError> {
        down()
    }

    fn add_watched_episode(
        &self,
        _user_id: UserId,
        _episode_id: EpisodeId,
    ) -> Result<(), StoreError> {
        down()
    }

    fn list_watched_episodes(&self, _user_id: UserId) -> Result<Vec<Episode>, StoreError> {
        down()
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        down()
    }
}
