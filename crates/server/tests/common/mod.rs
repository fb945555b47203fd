//! Common test utilities for in-process API testing.
//!
//! The fixture builds the full router over a file-backed SQLite catalog in a
//! temporary directory and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use podcatalog_core::{
    basic_authorization, create_authenticator, AccountService, AuthConfig, AuthMethod,
    CatalogStore, Config, CreateAccountInput, DatabaseConfig, PodcastService, ServerConfig,
    SqliteCatalogStore, UserId, UserRole,
};
use podcatalog_server::{api::create_router, state::AppState};

/// Email and password of an account created through the fixture.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: UserId,
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn header(&self) -> String {
        basic_authorization(&self.email, &self.password)
    }
}

/// Test fixture with an in-process server.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_create_podcast() {
///     let fixture = TestFixture::new();
///     let host = fixture.host();
///
///     let response = fixture.post_as(&host, "/api/v1/podcasts", json!({
///         "title": "Morning Show",
///         "category": "News"
///     })).await;
///
///     assert_eq!(response.status, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Direct access to catalog operations for setup
    pub podcasts: PodcastService,
    /// Direct access to accounts for setup
    pub accounts: AccountService,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestFixture {
    /// Fixture using HTTP Basic authentication.
    pub fn new() -> Self {
        Self::with_auth(AuthMethod::Basic)
    }

    pub fn with_auth(method: AuthMethod) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let store: Arc<dyn CatalogStore> =
            Arc::new(SqliteCatalogStore::new(&db_path).expect("Failed to create store"));
        Self::with_store(method, store, temp_dir)
    }

    /// Fixture over a caller-supplied store, e.g. one that always fails.
    pub fn with_store(method: AuthMethod, store: Arc<dyn CatalogStore>, temp_dir: TempDir) -> Self {
        let config = Config {
            auth: AuthConfig {
                method,
                realm: "podcatalog-test".to_string(),
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
        };

        let accounts = AccountService::new(Arc::clone(&store));
        let podcasts = PodcastService::new(store);
        let authenticator = create_authenticator(&config.auth, accounts.clone())
            .expect("Failed to create authenticator");

        let state = Arc::new(AppState::new(
            config,
            Arc::from(authenticator),
            podcasts.clone(),
            accounts.clone(),
        ));

        Self {
            router: create_router(state),
            podcasts,
            accounts,
            temp_dir,
        }
    }

    /// Create an account directly and return its credentials.
    pub fn account(&self, email: &str, role: UserRole) -> Credentials {
        let password = "correct horse".to_string();
        let id = self
            .accounts
            .create_account(&CreateAccountInput {
                email: email.to_string(),
                password: password.clone(),
                role,
            })
            .expect("Failed to create account");
        Credentials {
            id,
            email: email.to_string(),
            password,
        }
    }

    pub fn host(&self) -> Credentials {
        self.account("host@example.com", UserRole::Host)
    }

    pub fn listener(&self) -> Credentials {
        self.account("listener@example.com", UserRole::Listener)
    }

    /// Send an anonymous GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send an anonymous POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    pub async fn get_as(&self, user: &Credentials, path: &str) -> TestResponse {
        self.request("GET", path, None, Some(user.header())).await
    }

    pub async fn post_as(&self, user: &Credentials, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), Some(user.header()))
            .await
    }

    pub async fn patch_as(&self, user: &Credentials, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body), Some(user.header()))
            .await
    }

    pub async fn delete_as(&self, user: &Credentials, path: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(user.header())).await
    }

    /// Send a request with an explicit Authorization header value.
    pub async fn get_with_authorization(&self, path: &str, authorization: &str) -> TestResponse {
        self.request("GET", path, None, Some(authorization.to_string()))
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw_as(&self, user: &Credentials, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, user.header())
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        authorization: Option<String>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(value) = authorization {
            request_builder = request_builder.header(header::AUTHORIZATION, value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
