//! Resource action vocabulary.
//!
//! # Data Flow
//! ```text
//! Controller::SINGLETON
//!     → ActionMapFlavor (Normal | Singleton)
//!     → map.rs (static ActionEntry table)
//!     → one route per (segment, verb) at mount time
//! ```
//!
//! # Design Decisions
//! - Tables are `static` slices, built once, never mutated
//! - `update` is listed twice (PATCH and PUT) on the same segment
//! - The full action set is taken from the Normal flavor

pub mod map;

use std::fmt;
use std::str::FromStr;

use axum::http::Method;

pub use map::{ActionMapFlavor, ALL_ACTIONS, NORMAL_ACTION_MAP, SINGLETON_ACTION_MAP};

/// A conventional resource action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionName {
    Index,
    New,
    Create,
    Show,
    Edit,
    Update,
    Destroy,
}

impl ActionName {
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionName::Index => "index",
            ActionName::New => "new",
            ActionName::Create => "create",
            ActionName::Show => "show",
            ActionName::Edit => "edit",
            ActionName::Update => "update",
            ActionName::Destroy => "destroy",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a resource action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a resource action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for ActionName {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Returns true if `raw` names one of the resource actions.
pub fn is_route_action(raw: &str) -> bool {
    raw.parse::<ActionName>().is_ok()
}

/// HTTP verbs used by the action maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path segment appended to a controller's mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `/`
    Root,
    /// `/:id`
    Id,
    /// `/new`
    New,
    /// `/edit`
    Edit,
    /// `/:id/edit`
    IdEdit,
}

impl Segment {
    /// The segment as written in the action map.
    pub const fn as_str(self) -> &'static str {
        match self {
            Segment::Root => "/",
            Segment::Id => "/:id",
            Segment::New => "/new",
            Segment::Edit => "/edit",
            Segment::IdEdit => "/:id/edit",
        }
    }

    /// The segment in the router's capture syntax.
    pub const fn pattern(self) -> &'static str {
        match self {
            Segment::Root => "/",
            Segment::Id => "/{id}",
            Segment::New => "/new",
            Segment::Edit => "/edit",
            Segment::IdEdit => "/{id}/edit",
        }
    }

    pub const fn has_id(self) -> bool {
        matches!(self, Segment::Id | Segment::IdEdit)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of an action map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEntry {
    pub action: ActionName,
    pub segment: Segment,
    pub verb: Verb,
}
