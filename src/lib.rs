//! Resourceful: conventional resource controllers on axum.
//!
//! A map of path-names to controller types is turned into a route table at
//! startup. Each request gets a fresh controller instance, runs its
//! before-filters, the action and its after-filters, and any failure is
//! forwarded to a single error handler.
//!
//! ```text
//! ControllerMap ──▶ routing::RouteTable ──▶ axum::Router ──▶ http::HttpServer
//!                                                │
//!                       request ─────────────────┘
//!                          │
//!                          ▼
//!            dispatch: init → lookup → before → action → after
//!                          │
//!                          ▼
//!                 Response | ErrorHandler
//! ```

// Core
pub mod actions;
pub mod controller;
pub mod dispatch;
pub mod filters;
pub mod routing;

// Serving
pub mod config;
pub mod error;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use actions::{ActionMapFlavor, ActionName, Verb};
pub use config::ServerConfig;
pub use controller::{resource, view, ActionFuture, ActionSet, Controller, ControllerHandle};
pub use dispatch::view::{LocalsRenderer, ViewRenderer};
pub use error::{BoxError, DefaultErrorHandler, DispatchError, ErrorHandler, HttpError, RouteError};
pub use filters::{ContinuationFuture, Filter, FilterFuture, FilterList, Proceed};
pub use http::{Exchange, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{mount_controller, mount_controllers, ControllerMap, RouteTable};
