//! Account and per-user listing handlers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use podcatalog_core::{CreateAccountInput, Episode, Podcast, User, UserId, UserRole};

use super::extract::{ApiJson, ApiPath};
use super::middleware::AuthUser;
use super::output::{tracked, ApiError, CoreOutput, CreatedId};
use crate::metrics::record_operation;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct Subscriptions {
    pub podcasts: Vec<Podcast>,
}

#[derive(Debug, Serialize)]
pub struct Watched {
    pub episodes: Vec<Episode>,
}

/// Register a new account. Open to anonymous callers.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateAccountInput>,
) -> Result<(StatusCode, Json<CoreOutput<CreatedId>>), ApiError> {
    match state.accounts().create_account(&body) {
        Ok(id) => {
            record_operation("create_account", "ok");
            info!(user_id = id, "Account registered over API");
            Ok((StatusCode::CREATED, CoreOutput::success(CreatedId { id })))
        }
        Err(e) => {
            record_operation("create_account", "rejected");
            Err(e.into())
        }
    }
}

pub async fn see_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<CoreOutput<Profile>>, ApiError> {
    let user = state.accounts().see_profile(user.id)?;
    Ok(CoreOutput::success(Profile { user }))
}

pub async fn see_watched_episodes(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<CoreOutput<Watched>>, ApiError> {
    let listener = user.require(UserRole::Listener)?;
    let episodes = tracked(
        "see_watched_episodes",
        state.podcasts().see_watched_episodes(listener.id),
    )?;
    Ok(CoreOutput::success(Watched { episodes }))
}

pub async fn see_subscriptions(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<CoreOutput<Subscriptions>>, ApiError> {
    let podcasts = tracked(
        "see_subscriptions",
        state.podcasts().see_subscriptions(user_id),
    )?;
    Ok(CoreOutput::success(Subscriptions { podcasts }))
}
