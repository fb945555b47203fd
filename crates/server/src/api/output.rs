//! Response envelope and error mapping shared by all handlers.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use podcatalog_core::{AccountError, PodcastError, INTERNAL_ERROR_MESSAGE};

use crate::metrics::record_operation;

/// Every operation responds with `{ "ok": bool, "error"?: string, ...payload }`.
#[derive(Debug, Serialize)]
pub struct CoreOutput<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> CoreOutput<T> {
    pub fn success(payload: T) -> Json<Self> {
        Json(Self {
            ok: true,
            error: None,
            payload,
        })
    }
}

impl CoreOutput<Empty> {
    pub fn failure(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            ok: false,
            error: Some(error.into()),
            payload: Empty {},
        })
    }
}

/// Payload for operations that return nothing beyond success.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

/// Payload for create operations.
#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: i64,
}

/// Handler failure, rendered as a `CoreOutput` with `ok: false`.
#[derive(Debug)]
pub enum ApiError {
    Podcast(PodcastError),
    Account(AccountError),
    /// No usable credentials; carries the realm for the challenge header.
    Unauthorized { realm: String, message: String },
    /// Signed in, but under the wrong role.
    Forbidden,
    /// Credentials could not be checked.
    Unavailable,
    /// Body, query string or path segments could not be extracted.
    Malformed { status: StatusCode, message: String },
}

impl From<PodcastError> for ApiError {
    fn from(e: PodcastError) -> Self {
        ApiError::Podcast(e)
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        ApiError::Account(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Podcast(e) => match e {
                PodcastError::NotFound(_) => StatusCode::NOT_FOUND,
                PodcastError::Validation(_) => StatusCode::BAD_REQUEST,
                PodcastError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                PodcastError::Operation(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Account(e) => match e {
                AccountError::InvalidEmail(_) | AccountError::EmptyPassword => {
                    StatusCode::BAD_REQUEST
                }
                AccountError::EmailTaken => StatusCode::CONFLICT,
                AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AccountError::NotFound => StatusCode::NOT_FOUND,
                AccountError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Malformed { status, .. } => *status,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Podcast(e) => e.to_string(),
            ApiError::Account(AccountError::Internal) => INTERNAL_ERROR_MESSAGE.to_string(),
            ApiError::Account(e) => e.to_string(),
            ApiError::Unauthorized { message, .. } => message.clone(),
            ApiError::Forbidden => "Your role does not allow this operation".to_string(),
            ApiError::Unavailable => "Authentication service unavailable".to_string(),
            ApiError::Malformed { message, .. } => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, CoreOutput::failure(self.message())).into_response();

        if let ApiError::Unauthorized { realm, .. } = &self {
            match HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
                Ok(value) => {
                    response
                        .headers_mut()
                        .insert(header::WWW_AUTHENTICATE, value);
                }
                Err(e) => warn!("Realm is not a valid header value: {}", e),
            }
        }

        response
    }
}

/// Record the outcome of a catalog operation and lift its error.
pub fn tracked<T>(operation: &str, result: Result<T, PodcastError>) -> Result<T, ApiError> {
    match result {
        Ok(value) => {
            record_operation(operation, "ok");
            Ok(value)
        }
        Err(e) => {
            record_operation(operation, e.kind());
            Err(ApiError::Podcast(e))
        }
    }
}
