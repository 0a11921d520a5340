//! Error types and the upstream error channel.
//!
//! # Data Flow
//! ```text
//! RouteTable::build
//!     → RouteError (fatal, no partial table)
//!
//! dispatch (init → lookup → before → action → after)
//!     → DispatchError
//!     → ErrorHandler::handle (single upstream channel)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Filter and action failures are carried verbatim as the error source
//! - The dispatcher never formats or logs; `ErrorHandler` owns the response
//! - `HttpError` is the only error the default handler inspects for a status

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::actions::Verb;

/// Boxed error used for anything raised by controllers, filters and views.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure while building the route table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Attempted to register colliding controllers {first} and {second}")]
    NamingCollision {
        first: &'static str,
        second: &'static str,
    },

    #[error("controller registered at `{path_name}` is named {actual}, expected {expected}")]
    ControllerName {
        path_name: String,
        expected: String,
        actual: &'static str,
    },

    #[error("invalid controller path-name `{0}`")]
    InvalidPathName(String),

    #[error("a controller is already mounted at `{0}`")]
    DuplicatePathName(String),
}

/// Failure while dispatching a single request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The resolved action is not exposed by the controller instance.
    #[error("Method Not Allowed: {verb}")]
    MethodNotAllowed { verb: Verb },

    /// A view controller has no method for the requested action.
    #[error("Not Found")]
    NotFound,

    #[error("failed to read request body")]
    Body(#[source] axum::Error),

    #[error("controller initialization failed: {0}")]
    Init(#[source] BoxError),

    #[error("filter aborted the request: {0}")]
    FilterAborted(#[source] BoxError),

    #[error("action failed: {0}")]
    ActionFailure(#[source] BoxError),

    #[error("view rendering failed: {0}")]
    Render(#[source] BoxError),
}

impl DispatchError {
    /// The error raised by user code, if this failure wraps one.
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            DispatchError::Init(e)
            | DispatchError::FilterAborted(e)
            | DispatchError::ActionFailure(e)
            | DispatchError::Render(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Unwrap the error raised by user code.
    pub fn into_inner(self) -> Option<BoxError> {
        match self {
            DispatchError::Init(e)
            | DispatchError::FilterAborted(e)
            | DispatchError::ActionFailure(e)
            | DispatchError::Render(e) => Some(e),
            _ => None,
        }
    }

    /// Status code the default error handler answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::NotFound => StatusCode::NOT_FOUND,
            DispatchError::Body(_) => StatusCode::BAD_REQUEST,
            _ => self
                .inner()
                .and_then(|e| e.downcast_ref::<HttpError>())
                .map(|e| e.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// An error that carries the status code it should be answered with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// The upstream channel every dispatch failure is forwarded to.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, error: DispatchError) -> Response;
}

impl<F> ErrorHandler for F
where
    F: Fn(DispatchError) -> Response + Send + Sync + 'static,
{
    fn handle(&self, error: DispatchError) -> Response {
        self(error)
    }
}

/// Answers with the status from [`DispatchError::status`] and a plain-text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, error: DispatchError) -> Response {
        let status = error.status();
        if status.is_server_error() {
            tracing::error!(error = %error, "Request failed");
        } else {
            tracing::debug!(error = %error, status = status.as_u16(), "Request rejected");
        }

        let body = match error.inner().and_then(|e| e.downcast_ref::<HttpError>()) {
            Some(http) => http.message.clone(),
            None if status.is_server_error() => "Internal Server Error".to_string(),
            None => error.to_string(),
        };
        (status, body).into_response()
    }
}
