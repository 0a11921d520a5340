//! Request handling.
//!
//! # Responsibilities
//! - Generate or propagate a unique request ID (UUID v4)
//! - Buffer the body and capture route parameters for one dispatch
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body is buffered with a size limit before the controller runs

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use axum::response::Response;
use serde::de::DeserializeOwned;
use tower::{Layer, Service};
use uuid::Uuid;

use crate::error::DispatchError;

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Access to the request ID on anything carrying extensions.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.extensions().get::<RequestId>().map(|id| id.0.as_str())
    }
}

/// Layer that assigns every request an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request> for RequestIdService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let id = req
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            req.headers_mut().insert(X_REQUEST_ID.clone(), value);
        }
        req.extensions_mut().insert(RequestId(id.clone()));

        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut response = fut.await?;
            if let Ok(value) = HeaderValue::from_str(&id) {
                response.headers_mut().insert(X_REQUEST_ID.clone(), value);
            }
            Ok(response)
        })
    }
}

/// The request half of an [`Exchange`](crate::http::Exchange).
#[derive(Debug, Default)]
pub struct RequestData {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub params: HashMap<String, String>,
    pub body: Bytes,
    pub extensions: Extensions,
}

impl RequestData {
    /// Buffer `request` into owned data, up to `body_limit` bytes.
    pub async fn from_request(
        request: Request,
        params: HashMap<String, String>,
        body_limit: usize,
    ) -> Result<Self, DispatchError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, body_limit)
            .await
            .map_err(DispatchError::Body)?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            params,
            body,
            extensions: parts.extensions,
        })
    }

    /// A captured route parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The `:id` parameter of member routes.
    pub fn id(&self) -> Option<&str> {
        self.param("id")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.extensions.get::<RequestId>().map(|id| id.0.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/json"))
    }

    /// Deserialize the buffered body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Build from a plain request without going through a router.
    pub fn from_parts(method: Method, uri: Uri, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            uri,
            body: body.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_request_id_generated() {
        let app = Router::new()
            .route("/", get(|req: Request| async move { req.request_id().unwrap_or("").to_string() }))
            .layer(RequestIdLayer);

        let res = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = res.headers().get(&X_REQUEST_ID).unwrap().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&header).is_ok());

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, header.as_bytes());
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(RequestIdLayer);

        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers().get(&X_REQUEST_ID).unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/notes")
            .body(Body::from("x".repeat(64)))
            .unwrap();
        let err = RequestData::from_request(req, HashMap::new(), 16).await.unwrap_err();
        assert!(matches!(err, DispatchError::Body(_)));
    }

    #[tokio::test]
    async fn test_from_request() {
        let req = HttpRequest::builder()
            .method("PUT")
            .uri("/notes/7")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title":"hi"}"#))
            .unwrap();
        let params = HashMap::from([("id".to_string(), "7".to_string())]);
        let data = RequestData::from_request(req, params, 1024).await.unwrap();

        assert_eq!(data.method, Method::PUT);
        assert_eq!(data.id(), Some("7"));
        assert!(data.is_json());
        let value: serde_json::Value = data.json().unwrap();
        assert_eq!(value["title"], "hi");
    }
}
