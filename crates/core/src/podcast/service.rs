//! Operation layer over the catalog store.
//!
//! Every public method returns a typed [`PodcastError`] on failure. Store
//! errors are logged here and converted, so callers never see storage detail.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::{
    CatalogStats, CreateEpisodeInput, CreatePodcastInput, CreateReviewInput, Episode, EpisodeId,
    Podcast, PodcastError, PodcastId, PodcastRelations, ReviewId, SearchPage,
    UpdateEpisodeFields, UpdatePodcastPayload, PODCAST_RATING_RANGE, SEARCH_PAGE_SIZE,
};
use crate::account::{User, UserId};
use crate::store::{CatalogStore, StoreError};

/// Podcast, episode, review and subscription operations.
#[derive(Clone)]
pub struct PodcastService {
    store: Arc<dyn CatalogStore>,
}

impl PodcastService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------------
    // Podcasts
    // ------------------------------------------------------------------------

    pub fn list_podcasts(&self) -> Result<Vec<Podcast>, PodcastError> {
        self.store
            .list_podcasts()
            .map_err(|e| internal("list_podcasts", e))
    }

    pub fn create_podcast(&self, input: &CreatePodcastInput) -> Result<PodcastId, PodcastError> {
        let podcast = self
            .store
            .create_podcast(&input.title, &input.category)
            .map_err(|e| internal("create_podcast", e))?;

        info!(podcast_id = podcast.id, title = %podcast.title, "Created podcast");
        Ok(podcast.id)
    }

    /// Get a podcast with the requested relations loaded.
    pub fn get_podcast(
        &self,
        id: PodcastId,
        relations: PodcastRelations,
    ) -> Result<Podcast, PodcastError> {
        match self.store.find_podcast(id, relations) {
            Ok(Some(podcast)) => Ok(podcast),
            Ok(None) => Err(podcast_not_found(id)),
            Err(e) => Err(internal("get_podcast", e)),
        }
    }

    /// Delete a podcast along with its episodes and reviews.
    pub fn delete_podcast(&self, id: PodcastId) -> Result<(), PodcastError> {
        self.get_podcast(id, PodcastRelations::NONE)?;

        self.store.delete_podcast(id).map_err(|e| match e {
            StoreError::NotFound(_) => podcast_not_found(id),
            e => internal("delete_podcast", e),
        })?;

        info!(podcast_id = id, "Deleted podcast");
        Ok(())
    }

    /// Merge `payload` over the stored podcast.
    ///
    /// A rating outside `1..=5` is rejected before anything is written.
    pub fn update_podcast(
        &self,
        id: PodcastId,
        payload: &UpdatePodcastPayload,
    ) -> Result<(), PodcastError> {
        let mut podcast = self.get_podcast(id, PodcastRelations::NONE)?;

        if let Some(rating) = payload.rating {
            if !PODCAST_RATING_RANGE.contains(&rating) {
                return Err(PodcastError::Validation(format!(
                    "Rating must be between {} and {}.",
                    PODCAST_RATING_RANGE.start(),
                    PODCAST_RATING_RANGE.end()
                )));
            }
        }

        podcast.apply_update(payload);

        self.store.save_podcast(&podcast).map_err(|e| match e {
            StoreError::NotFound(_) => podcast_not_found(id),
            e => internal("update_podcast", e),
        })?;

        debug!(podcast_id = id, "Updated podcast");
        Ok(())
    }

    /// Case-sensitive title search, 25 results per page. Pages start at 1.
    pub fn search_podcasts_by_title(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage, PodcastError> {
        if page < 1 {
            return Err(PodcastError::Validation(
                "Page must be 1 or greater.".to_string(),
            ));
        }

        let offset = i64::from(page - 1) * i64::from(SEARCH_PAGE_SIZE);
        let (podcasts, total_results) = self
            .store
            .search_podcasts(query, i64::from(SEARCH_PAGE_SIZE), offset)
            .map_err(|e| {
                operation_failed(
                    "search_podcasts_by_title",
                    "Could not search for podcasts",
                    e,
                )
            })?;

        Ok(SearchPage {
            podcasts,
            total_results,
            total_pages: SearchPage::page_count(total_results, SEARCH_PAGE_SIZE),
        })
    }

    // ------------------------------------------------------------------------
    // Episodes
    // ------------------------------------------------------------------------

    pub fn get_episodes(&self, podcast_id: PodcastId) -> Result<Vec<Episode>, PodcastError> {
        let podcast = self.get_podcast(
            podcast_id,
            PodcastRelations {
                episodes: true,
                reviews: false,
            },
        )?;
        Ok(podcast.episodes.unwrap_or_default())
    }

    /// Get an episode, which must belong to `podcast_id`.
    pub fn get_episode(
        &self,
        podcast_id: PodcastId,
        episode_id: EpisodeId,
    ) -> Result<Episode, PodcastError> {
        self.get_episodes(podcast_id)?
            .into_iter()
            .find(|episode| episode.id == episode_id)
            .ok_or_else(|| {
                PodcastError::NotFound(format!(
                    "Episode with id {} not found in podcast with id {}",
                    episode_id, podcast_id
                ))
            })
    }

    pub fn create_episode(
        &self,
        podcast_id: PodcastId,
        input: &CreateEpisodeInput,
    ) -> Result<EpisodeId, PodcastError> {
        self.get_podcast(podcast_id, PodcastRelations::NONE)?;

        let episode = self
            .store
            .create_episode(podcast_id, &input.title, &input.category)
            .map_err(|e| match e {
                // Podcast deleted between the check and the insert
                StoreError::Conflict(_) => podcast_not_found(podcast_id),
                e => internal("create_episode", e),
            })?;

        info!(podcast_id, episode_id = episode.id, "Created episode");
        Ok(episode.id)
    }

    pub fn update_episode(
        &self,
        podcast_id: PodcastId,
        episode_id: EpisodeId,
        fields: &UpdateEpisodeFields,
    ) -> Result<(), PodcastError> {
        let mut episode = self.get_episode(podcast_id, episode_id)?;
        episode.apply_update(fields);

        self.store.save_episode(&episode).map_err(|e| match e {
            StoreError::NotFound(_) => episode_not_found(podcast_id, episode_id),
            e => internal("update_episode", e),
        })?;

        debug!(podcast_id, episode_id, "Updated episode");
        Ok(())
    }

    pub fn delete_episode(
        &self,
        podcast_id: PodcastId,
        episode_id: EpisodeId,
    ) -> Result<(), PodcastError> {
        let episode = self.get_episode(podcast_id, episode_id)?;

        self.store.delete_episode(episode.id).map_err(|e| match e {
            StoreError::NotFound(_) => episode_not_found(podcast_id, episode_id),
            e => internal("delete_episode", e),
        })?;

        info!(podcast_id, episode_id, "Deleted episode");
        Ok(())
    }

    /// Add an episode to the user's watched set. Marking twice is a no-op.
    pub fn mark_episode_as_played(
        &self,
        user: &User,
        episode_id: EpisodeId,
    ) -> Result<(), PodcastError> {
        const FAILURE: &str = "Could not mark episode as played";

        let episode = match self.store.find_episode(episode_id) {
            Ok(Some(episode)) => episode,
            Ok(None) => return Err(PodcastError::NotFound("Episode not found".to_string())),
            Err(e) => return Err(operation_failed("mark_episode_as_played", FAILURE, e)),
        };

        let watched = self
            .store
            .watched_episode_ids(user.id)
            .map_err(|e| operation_failed("mark_episode_as_played", FAILURE, e))?;

        if !watched.contains(&episode.id) {
            self.store
                .add_watched_episode(user.id, episode.id)
                .map_err(|e| operation_failed("mark_episode_as_played", FAILURE, e))?;
        }

        Ok(())
    }

    pub fn see_watched_episodes(&self, user_id: UserId) -> Result<Vec<Episode>, PodcastError> {
        const FAILURE: &str = "Could not get watched episodes";

        self.require_user(user_id, "see_watched_episodes", FAILURE)?;
        self.store
            .list_watched_episodes(user_id)
            .map_err(|e| operation_failed("see_watched_episodes", FAILURE, e))
    }

    // ------------------------------------------------------------------------
    // Reviews and subscriptions
    // ------------------------------------------------------------------------

    pub fn review_podcast(
        &self,
        author: &User,
        podcast_id: PodcastId,
        input: &CreateReviewInput,
    ) -> Result<ReviewId, PodcastError> {
        const FAILURE: &str = "Could not create review";

        match self.store.find_podcast(podcast_id, PodcastRelations::NONE) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(PodcastError::NotFound("Podcast not found".to_string())),
            Err(e) => return Err(operation_failed("review_podcast", FAILURE, e)),
        }

        input.validate().map_err(PodcastError::Validation)?;

        let review = self
            .store
            .create_review(author.id, podcast_id, input.rating, &input.comment)
            .map_err(|e| operation_failed("review_podcast", FAILURE, e))?;

        info!(podcast_id, review_id = review.id, author = author.id, "Created review");
        Ok(review.id)
    }

    /// Toggle the podcast in the user's subscriptions.
    ///
    /// Returns whether the user is subscribed afterwards.
    pub fn subscribe_to_podcast(
        &self,
        user: &User,
        podcast_id: PodcastId,
    ) -> Result<bool, PodcastError> {
        const FAILURE: &str = "Could not subscribe podcast";

        match self.store.find_podcast(podcast_id, PodcastRelations::NONE) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(PodcastError::NotFound("Podcast not found".to_string())),
            Err(e) => return Err(operation_failed("subscribe_to_podcast", FAILURE, e)),
        }

        let subscribed = self
            .store
            .subscription_ids(user.id)
            .map_err(|e| operation_failed("subscribe_to_podcast", FAILURE, e))?
            .contains(&podcast_id);

        self.store
            .set_subscribed(user.id, podcast_id, !subscribed)
            .map_err(|e| operation_failed("subscribe_to_podcast", FAILURE, e))?;

        debug!(user_id = user.id, podcast_id, subscribed = !subscribed, "Toggled subscription");
        Ok(!subscribed)
    }

    pub fn see_subscriptions(&self, user_id: UserId) -> Result<Vec<Podcast>, PodcastError> {
        const FAILURE: &str = "Could not get subscriptions";

        self.require_user(user_id, "see_subscriptions", FAILURE)?;
        self.store
            .list_subscriptions(user_id)
            .map_err(|e| operation_failed("see_subscriptions", FAILURE, e))
    }

    pub fn stats(&self) -> Result<CatalogStats, PodcastError> {
        self.store.stats().map_err(|e| internal("stats", e))
    }

    fn require_user(
        &self,
        user_id: UserId,
        operation: &'static str,
        failure: &str,
    ) -> Result<User, PodcastError> {
        match self.store.find_user(user_id) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(PodcastError::NotFound("User not found".to_string())),
            Err(e) => Err(operation_failed(operation, failure, e)),
        }
    }
}

fn podcast_not_found(id: PodcastId) -> PodcastError {
    PodcastError::NotFound(format!("Podcast with id {} not found", id))
}

fn episode_not_found(podcast_id: PodcastId, episode_id: EpisodeId) -> PodcastError {
    PodcastError::NotFound(format!(
        "Episode with id {} not found in podcast with id {}",
        episode_id, podcast_id
    ))
}

fn internal(operation: &'static str, e: StoreError) -> PodcastError {
    error!(operation, error = %e, "Catalog store failure");
    PodcastError::Internal
}

fn operation_failed(operation: &'static str, message: &str, e: StoreError) -> PodcastError {
    error!(operation, error = %e, "Catalog store failure");
    PodcastError::Operation(message.to_string())
}
