//! Controllers served by the `resourceful` binary.
//!
//! # Data Flow
//! ```text
//! "index"   → HomeController (view, rendered through LocalsRenderer)
//! "notes"   → NotesController (plural resource over a shared NoteStore)
//! "session" → SessionController (singleton resource)
//! ```
//!
//! The note store reaches controllers through request extensions, so every
//! instance stays request-scoped while the data is shared.

pub mod home;
pub mod notes;
pub mod session;

use std::sync::Arc;

use crate::controller::{resource, view};
use crate::dispatch::view::LocalsRenderer;
use crate::routing::ControllerMap;

pub use home::HomeController;
pub use notes::{Note, NoteStore, NotesController};
pub use session::SessionController;

/// The demo controller map.
pub fn controllers() -> ControllerMap {
    ControllerMap::new()
        .with("index", view::<HomeController>(Arc::new(LocalsRenderer)))
        .with("notes", resource::<NotesController>())
        .with("session", resource::<SessionController>())
}
