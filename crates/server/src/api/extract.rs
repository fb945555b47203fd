//! Extractors whose rejections render as a `CoreOutput` failure.
//!
//! axum's own `Json`, `Query` and `Path` reject with a plain-text body;
//! these wrappers keep the `{ "ok": false, "error": ... }` shape.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};

use super::output::ApiError;

/// JSON request body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

/// Query string parameters.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

/// Path segments.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Review {
        rating: u8,
    }

    #[derive(Debug, Deserialize)]
    struct Page {
        page: u32,
    }

    async fn review(ApiJson(body): ApiJson<Review>) -> String {
        body.rating.to_string()
    }

    async fn page(ApiQuery(params): ApiQuery<Page>) -> String {
        params.page.to_string()
    }

    async fn podcast(ApiPath(id): ApiPath<i64>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/reviews", post(review))
            .route("/search", get(page))
            .route("/podcasts/{id}", get(podcast))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn json_post(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/reviews")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_extraction_passes_through() {
        let response = app().oneshot(json_post(r#"{"rating": 4}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"4");
    }

    #[tokio::test]
    async fn test_syntax_error_body_is_enveloped() {
        let (status, body) = send(json_post("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_field_is_enveloped() {
        let (status, body) = send(json_post("{}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_enveloped() {
        let request = Request::builder()
            .method("POST")
            .uri("/reviews")
            .body(Body::from(r#"{"rating": 4}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_bad_query_is_enveloped() {
        let (status, body) = send(get_request("/search?page=-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_bad_path_is_enveloped() {
        let (status, body) = send(get_request("/podcasts/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }
}
