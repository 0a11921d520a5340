//! Controller contract.
//!
//! # Data Flow
//! ```text
//! ControllerMap entry (path-name → ControllerHandle)
//!     → registration.rs (type-erased Controller + dispatch variant)
//!     → per request: Controller::init(&mut Exchange)
//!     → Controller::actions() on the instance (presence checked per request)
//!     → Controller::before_action() / after_action() filter lists
//! ```
//!
//! # Design Decisions
//! - Actions are looked up on the instance, so they may depend on its state
//! - One instance per request, dropped with the dispatch
//! - `SINGLETON` selects the action map at mount time

pub mod registration;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::actions::{ActionMapFlavor, ActionName};
use crate::error::BoxError;
use crate::filters::FilterList;
use crate::http::Exchange;

pub use registration::{resource, view, ControllerHandle, ControllerType};

/// Future returned by an action.
pub type ActionFuture<'a> = BoxFuture<'a, Result<(), BoxError>>;

type ActionFn<C> = dyn for<'a> Fn(&'a mut C, &'a mut Exchange) -> ActionFuture<'a> + Send + Sync;

/// A resource controller.
///
/// ```ignore
/// struct NotesController;
///
/// impl Controller for NotesController {
///     const NAME: &'static str = "NotesController";
///
///     async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
///         Ok(NotesController)
///     }
///
///     fn actions(&self) -> ActionSet<Self> {
///         ActionSet::new().with(ActionName::Show, Self::show)
///     }
/// }
/// ```
pub trait Controller: Send + Sized + 'static {
    /// Type name used in collision errors, strict-name checks and view paths.
    const NAME: &'static str;

    /// Mount with the singleton action map (no `index`, no `:id`).
    const SINGLETON: bool = false;

    /// Build the instance for one request.
    fn init(exchange: &mut Exchange) -> impl Future<Output = Result<Self, BoxError>> + Send;

    /// Actions this instance exposes.
    fn actions(&self) -> ActionSet<Self>;

    fn before_action(&self) -> FilterList<Self> {
        Vec::new()
    }

    fn after_action(&self) -> FilterList<Self> {
        Vec::new()
    }

    fn flavor() -> ActionMapFlavor {
        ActionMapFlavor::from_singleton(Self::SINGLETON)
    }
}

/// An action method bound at dispatch time to a controller instance.
pub struct Action<C>(Arc<ActionFn<C>>);

impl<C> Action<C> {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a mut Exchange) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        Action(Arc::new(f))
    }

    pub fn call<'a>(&self, controller: &'a mut C, exchange: &'a mut Exchange) -> ActionFuture<'a> {
        (self.0)(controller, exchange)
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        Action(Arc::clone(&self.0))
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

/// The actions one controller instance exposes, keyed by name.
pub struct ActionSet<C> {
    actions: HashMap<ActionName, Action<C>>,
}

impl<C> ActionSet<C> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<F>(mut self, name: ActionName, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a mut Exchange) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        self.insert(name, Action::new(f));
        self
    }

    pub fn insert(&mut self, name: ActionName, action: Action<C>) -> Option<Action<C>> {
        self.actions.insert(name, action)
    }

    pub fn remove(&mut self, name: ActionName) -> Option<Action<C>> {
        self.actions.remove(&name)
    }

    pub fn get(&self, name: ActionName) -> Option<&Action<C>> {
        self.actions.get(&name)
    }

    pub fn contains(&self, name: ActionName) -> bool {
        self.actions.contains_key(&name)
    }

    pub fn names(&self) -> impl Iterator<Item = ActionName> + '_ {
        self.actions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Add every action from `other` that this set does not define yet.
    pub fn merge(mut self, other: ActionSet<C>) -> Self {
        for (name, action) in other.actions {
            self.actions.entry(name).or_insert(action);
        }
        self
    }
}

impl<C> Default for ActionSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ActionSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort();
        f.debug_tuple("ActionSet").field(&names).finish()
    }
}
