//! Response building.
//!
//! # Responsibilities
//! - Collect status, headers and body written by filters and actions
//! - Track whether the response was finalized (`end`, `send_*`, `redirect`)
//! - Hold view locals for the rendering dispatcher
//!
//! # Design Decisions
//! - Writes after finalization are dropped, the first finalizer wins
//! - Nothing is emitted until the dispatch completes

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::routing::naming::routify;

/// The response half of an [`Exchange`](crate::http::Exchange).
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    locals: Map<String, Value>,
    finalized: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            locals: Map::new(),
            finalized: false,
        }
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        if !self.finalized {
            self.status = status;
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        if !self.finalized {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append to the body without finalizing.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> &mut Self {
        if self.finalized {
            tracing::debug!("Write after response was finalized ignored");
        } else {
            self.body.extend_from_slice(chunk.as_ref());
        }
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finalize the response.
    pub fn end(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Replace the body with `value` as JSON and finalize.
    pub fn send_json<T: Serialize>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        self.send(
            HeaderValue::from_static("application/json"),
            bytes,
        );
        Ok(())
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.send(
            HeaderValue::from_static("text/plain; charset=utf-8"),
            text.into().into_bytes(),
        );
    }

    pub fn send_html(&mut self, html: impl Into<String>) {
        self.send(
            HeaderValue::from_static("text/html; charset=utf-8"),
            html.into().into_bytes(),
        );
    }

    fn send(&mut self, content_type: HeaderValue, body: Vec<u8>) {
        if self.finalized {
            tracing::debug!("Send after response was finalized ignored");
            return;
        }
        self.headers.insert(CONTENT_TYPE, content_type);
        self.body = body;
        self.finalized = true;
    }

    /// Redirect with `302 Found` and finalize.
    pub fn redirect(&mut self, location: &str) -> Result<(), axum::http::header::InvalidHeaderValue> {
        let value = HeaderValue::from_str(location)?;
        self.status(StatusCode::FOUND).header(LOCATION, value);
        self.finalized = true;
        Ok(())
    }

    /// Redirect to the root route of the controller named `controller_name`.
    pub fn redirect_to_controller(
        &mut self,
        controller_name: &str,
    ) -> Result<(), axum::http::header::InvalidHeaderValue> {
        self.redirect(&format!("/{}", routify(controller_name)))
    }

    /// Merge values into the view locals.
    pub fn set(&mut self, locals: impl IntoIterator<Item = (String, Value)>) -> &mut Self {
        self.locals.extend(locals);
        self
    }

    pub fn local(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.locals.insert(key.into(), value.into());
        self
    }

    pub fn locals(&self) -> &Map<String, Value> {
        &self.locals
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
