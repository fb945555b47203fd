use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{episodes, handlers, podcasts, users};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Accounts
        .route("/users", post(users::create_account))
        .route("/users/me", get(users::see_profile))
        .route("/users/me/watched", get(users::see_watched_episodes))
        .route("/users/{id}/subscriptions", get(users::see_subscriptions))
        // Podcasts
        .route(
            "/podcasts",
            get(podcasts::list_podcasts).post(podcasts::create_podcast),
        )
        .route("/podcasts/search", get(podcasts::search_podcasts))
        .route(
            "/podcasts/{id}",
            get(podcasts::get_podcast)
                .patch(podcasts::update_podcast)
                .delete(podcasts::delete_podcast),
        )
        .route("/podcasts/{id}/reviews", post(podcasts::review_podcast))
        .route(
            "/podcasts/{id}/subscription",
            post(podcasts::toggle_subscription),
        )
        // Episodes
        .route(
            "/podcasts/{id}/episodes",
            get(episodes::get_episodes).post(episodes::create_episode),
        )
        .route(
            "/podcasts/{id}/episodes/{episode_id}",
            get(episodes::get_episode)
                .patch(episodes::update_episode)
                .delete(episodes::delete_episode),
        )
        .route("/episodes/{episode_id}/played", post(episodes::mark_played))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
