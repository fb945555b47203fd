//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use podcatalog_core::{AuthError, AuthRequest, Identity, User, UserRole};

use super::output::ApiError;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware that resolves the caller's identity.
///
/// Requests without credentials continue as anonymous so public routes stay
/// reachable; handlers that need an actor reject them through [`AuthUser`].
/// Credentials that are present but wrong are rejected here with 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let authenticator = state.authenticator();

    if authenticator.method_name() == "none" {
        request.extensions_mut().insert(Identity::anonymous());
        return Ok(next.run(request).await);
    }

    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    // Get source IP (default to localhost if not available)
    let source_ip = request
        .extensions()
        .get::<std::net::SocketAddr>()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));

    let auth_request = AuthRequest { headers, source_ip };

    let identity = match authenticator.authenticate(&auth_request).await {
        Ok(identity) => identity,
        Err(AuthError::NotAuthenticated) => Identity::anonymous(),
        Err(AuthError::InvalidCredentials(message)) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            debug!("Rejected credentials: {}", message);
            return Err(ApiError::Unauthorized {
                realm: state.realm().to_string(),
                message,
            });
        }
        Err(e) => {
            AUTH_FAILURES_TOTAL.with_label_values(&[e.reason()]).inc();
            warn!("Authentication failed: {}", e);
            return Err(ApiError::Unavailable);
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extractor for the signed-in user.
///
/// Rejects anonymous callers with 401 and a `WWW-Authenticate` challenge.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// Require the user to act under `role`, 403 otherwise.
    pub fn require(self, role: UserRole) -> Result<User, ApiError> {
        if self.0.role == role {
            Ok(self.0)
        } else {
            AUTH_FAILURES_TOTAL.with_label_values(&["forbidden"]).inc();
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let user = parts
            .extensions
            .get::<Identity>()
            .and_then(|identity| identity.user.clone());

        let result = match user {
            Some(user) => Ok(AuthUser(user)),
            None => {
                AUTH_FAILURES_TOTAL
                    .with_label_values(&["not_authenticated"])
                    .inc();
                Err(ApiError::Unauthorized {
                    realm: state.realm().to_string(),
                    message: "Authentication required".to_string(),
                })
            }
        };
        std::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use podcatalog_core::{
        basic_authorization, create_authenticator, AccountService, AuthConfig, AuthMethod,
        Config, CreateAccountInput, DatabaseConfig, PodcastService, ServerConfig,
        SqliteCatalogStore,
    };
    use tower::ServiceExt;

    async fn public_handler() -> &'static str {
        "OK"
    }

    async fn user_handler(AuthUser(user): AuthUser) -> String {
        user.email
    }

    async fn host_handler(user: AuthUser) -> Result<String, ApiError> {
        Ok(user.require(UserRole::Host)?.email)
    }

    fn create_test_state(method: AuthMethod) -> Arc<AppState> {
        let store = Arc::new(SqliteCatalogStore::in_memory().unwrap());
        let accounts = AccountService::new(store.clone());
        accounts
            .create_account(&CreateAccountInput {
                email: "host@example.com".to_string(),
                password: "secret".to_string(),
                role: UserRole::Host,
            })
            .unwrap();
        accounts
            .create_account(&CreateAccountInput {
                email: "fan@example.com".to_string(),
                password: "secret".to_string(),
                role: UserRole::Listener,
            })
            .unwrap();

        let auth = AuthConfig {
            method,
            realm: "test-realm".to_string(),
        };
        let authenticator = create_authenticator(&auth, accounts.clone()).unwrap();

        Arc::new(AppState::new(
            Config {
                auth,
                server: ServerConfig::default(),
                database: DatabaseConfig::default(),
            },
            Arc::from(authenticator),
            PodcastService::new(store),
            accounts,
        ))
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/public", get(public_handler))
            .route("/me", get(user_handler))
            .route("/host", get(host_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    fn request(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_none_auth_allows_public() {
        let app = app(create_test_state(AuthMethod::None));
        let response = app.oneshot(request("/public", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_none_auth_rejects_actor_routes() {
        let app = app(create_test_state(AuthMethod::None));
        let response = app.oneshot(request("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"test-realm\""
        );
    }

    #[tokio::test]
    async fn test_basic_auth_without_credentials_is_anonymous() {
        let app = app(create_test_state(AuthMethod::Basic));
        let response = app.oneshot(request("/public", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_basic_auth_valid() {
        let app = app(create_test_state(AuthMethod::Basic));
        let authorization = basic_authorization("fan@example.com", "secret");

        let response = app
            .oneshot(request("/me", Some(&authorization)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "fan@example.com");
    }

    #[tokio::test]
    async fn test_basic_auth_invalid_rejected_even_on_public_route() {
        let app = app(create_test_state(AuthMethod::Basic));
        let authorization = basic_authorization("fan@example.com", "wrong");

        let response = app
            .oneshot(request("/public", Some(&authorization)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let app = app(create_test_state(AuthMethod::Basic));
        let authorization = basic_authorization("fan@example.com", "secret");

        let response = app
            .oneshot(request("/host", Some(&authorization)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_matching_role_passes() {
        let app = app(create_test_state(AuthMethod::Basic));
        let authorization = basic_authorization("host@example.com", "secret");

        let response = app
            .oneshot(request("/host", Some(&authorization)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "host@example.com");
    }
}
