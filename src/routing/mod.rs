//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     ControllerMap (path-name → controller type)
//!     → order.rs (validate names, reject index collisions, sort by depth)
//!     → table.rs (expand each controller's action map into routes)
//!     → axum::Router (immutable from here on)
//!
//! Incoming Request (method, path)
//!     → axum::Router (earliest mounted route for the pattern)
//!     → dispatch (controller instance, filters, action)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: the same controller map always yields the same table
//! - Deeper path-names mount first; the first mount of a pattern wins
//! - Any naming error aborts the whole build
//! - A request never falls through to a shallower mount: a verb missing on a
//!   matched pattern is `NotFound`, so `PATCH /nested/sibling` does not reach
//!   `nested`'s `update` with id `sibling`

pub mod naming;
pub mod order;
pub mod registry;
pub mod table;

pub use naming::{controllerize, routify};
pub use order::{compare_path_names, mount_order, validate_index_names};
pub use registry::ControllerMap;
pub use table::{mount_controller, mount_controllers, MountOptions, MountedRoute, RouteTable};
