//! Episode API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use podcatalog_core::{
    CreateEpisodeInput, Episode, EpisodeId, PodcastId, UpdateEpisodeFields, UserRole,
};

use super::extract::{ApiJson, ApiPath};
use super::middleware::AuthUser;
use super::output::{tracked, ApiError, CoreOutput, CreatedId, Empty};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EpisodeList {
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeBody {
    pub episode: Episode,
}

pub async fn get_episodes(
    State(state): State<Arc<AppState>>,
    ApiPath(podcast_id): ApiPath<PodcastId>,
) -> Result<Json<CoreOutput<EpisodeList>>, ApiError> {
    let episodes = tracked("get_episodes", state.podcasts().get_episodes(podcast_id))?;
    Ok(CoreOutput::success(EpisodeList { episodes }))
}

pub async fn create_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(podcast_id): ApiPath<PodcastId>,
    ApiJson(body): ApiJson<CreateEpisodeInput>,
) -> Result<(StatusCode, Json<CoreOutput<CreatedId>>), ApiError> {
    user.require(UserRole::Host)?;
    let id = tracked(
        "create_episode",
        state.podcasts().create_episode(podcast_id, &body),
    )?;
    Ok((StatusCode::CREATED, CoreOutput::success(CreatedId { id })))
}

pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    ApiPath((podcast_id, episode_id)): ApiPath<(PodcastId, EpisodeId)>,
) -> Result<Json<CoreOutput<EpisodeBody>>, ApiError> {
    let episode = tracked(
        "get_episode",
        state.podcasts().get_episode(podcast_id, episode_id),
    )?;
    Ok(CoreOutput::success(EpisodeBody { episode }))
}

pub async fn update_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath((podcast_id, episode_id)): ApiPath<(PodcastId, EpisodeId)>,
    ApiJson(fields): ApiJson<UpdateEpisodeFields>,
) -> Result<Json<CoreOutput<Empty>>, ApiError> {
    user.require(UserRole::Host)?;
    tracked(
        "update_episode",
        state
            .podcasts()
            .update_episode(podcast_id, episode_id, &fields),
    )?;
    Ok(CoreOutput::success(Empty {}))
}

pub async fn delete_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath((podcast_id, episode_id)): ApiPath<(PodcastId, EpisodeId)>,
) -> Result<Json<CoreOutput<Empty>>, ApiError> {
    user.require(UserRole::Host)?;
    tracked(
        "delete_episode",
        state.podcasts().delete_episode(podcast_id, episode_id),
    )?;
    Ok(CoreOutput::success(Empty {}))
}

/// Add an episode to the caller's watched set.
pub async fn mark_played(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(episode_id): ApiPath<EpisodeId>,
) -> Result<Json<CoreOutput<Empty>>, ApiError> {
    let listener = user.require(UserRole::Listener)?;
    tracked(
        "mark_episode_as_played",
        state
            .podcasts()
            .mark_episode_as_played(&listener, episode_id),
    )?;
    Ok(CoreOutput::success(Empty {}))
}
