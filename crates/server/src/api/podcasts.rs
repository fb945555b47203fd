//! Podcast API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use podcatalog_core::{
    CreatePodcastInput, CreateReviewInput, Podcast, PodcastId, PodcastRelations, SearchPage,
    UpdatePodcastPayload, UserRole,
};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::middleware::AuthUser;
use super::output::{tracked, ApiError, CoreOutput, CreatedId, Empty};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for title search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Case-sensitive substring of the title
    pub query: String,
    /// 1-based page number
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct PodcastList {
    pub podcasts: Vec<Podcast>,
}

#[derive(Debug, Serialize)]
pub struct PodcastBody {
    pub podcast: Podcast,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionState {
    pub subscribed: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_podcasts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CoreOutput<PodcastList>>, ApiError> {
    let podcasts = tracked("list_podcasts", state.podcasts().list_podcasts())?;
    Ok(CoreOutput::success(PodcastList { podcasts }))
}

pub async fn create_podcast(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreatePodcastInput>,
) -> Result<(StatusCode, Json<CoreOutput<CreatedId>>), ApiError> {
    user.require(UserRole::Host)?;
    let id = tracked("create_podcast", state.podcasts().create_podcast(&body))?;
    Ok((StatusCode::CREATED, CoreOutput::success(CreatedId { id })))
}

/// Get a podcast; `?episodes=false` / `?reviews=false` skip relations.
pub async fn get_podcast(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<PodcastId>,
    ApiQuery(relations): ApiQuery<PodcastRelations>,
) -> Result<Json<CoreOutput<PodcastBody>>, ApiError> {
    let podcast = tracked("get_podcast", state.podcasts().get_podcast(id, relations))?;
    Ok(CoreOutput::success(PodcastBody { podcast }))
}

pub async fn update_podcast(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<PodcastId>,
    ApiJson(payload): ApiJson<UpdatePodcastPayload>,
) -> Result<Json<CoreOutput<Empty>>, ApiError> {
    user.require(UserRole::Host)?;
    tracked("update_podcast", state.podcasts().update_podcast(id, &payload))?;
    Ok(CoreOutput::success(Empty {}))
}

pub async fn delete_podcast(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<PodcastId>,
) -> Result<Json<CoreOutput<Empty>>, ApiError> {
    user.require(UserRole::Host)?;
    tracked("delete_podcast", state.podcasts().delete_podcast(id))?;
    Ok(CoreOutput::success(Empty {}))
}

pub async fn search_podcasts(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<CoreOutput<SearchPage>>, ApiError> {
    let page = tracked(
        "search_podcasts_by_title",
        state
            .podcasts()
            .search_podcasts_by_title(&params.query, params.page),
    )?;
    Ok(CoreOutput::success(page))
}

pub async fn review_podcast(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<PodcastId>,
    ApiJson(body): ApiJson<CreateReviewInput>,
) -> Result<(StatusCode, Json<CoreOutput<CreatedId>>), ApiError> {
    let author = user.require(UserRole::Listener)?;
    let review_id = tracked(
        "review_podcast",
        state.podcasts().review_podcast(&author, id, &body),
    )?;
    Ok((
        StatusCode::CREATED,
        CoreOutput::success(CreatedId { id: review_id }),
    ))
}

/// Toggle the caller's subscription to a podcast.
pub async fn toggle_subscription(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<PodcastId>,
) -> Result<Json<CoreOutput<SubscriptionState>>, ApiError> {
    let listener = user.require(UserRole::Listener)?;
    let subscribed = tracked(
        "subscribe_to_podcast",
        state.podcasts().subscribe_to_podcast(&listener, id),
    )?;
    Ok(CoreOutput::success(SubscriptionState { subscribed }))
}
