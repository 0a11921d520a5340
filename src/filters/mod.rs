//! Before/after action filters.
//!
//! # Data Flow
//! ```text
//! Controller::before_action() / after_action()
//!     → FilterList (declaration order)
//!     → chain.rs apply_filters(list, action, controller, exchange)
//!         - skip entries not scoped to `action`
//!         - Direct: await the returned future
//!         - WithContinuation: await the returned future, then the Proceed signal
//!     → Ok(()) or the first error raised
//! ```
//!
//! # Design Decisions
//! - The calling convention is chosen when the filter is declared, never inferred
//! - A bare filter applies to every action
//! - Filters run strictly one after another on the same controller/exchange

pub mod chain;

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::actions::{ActionName, ALL_ACTIONS};
use crate::error::BoxError;
use crate::http::Exchange;

pub use chain::{apply_filters, ContinuationDropped};

/// Future returned by a [`Filter::Direct`] filter.
pub type FilterFuture<'a> = BoxFuture<'a, Result<(), BoxError>>;

/// Future returned by a [`Filter::WithContinuation`] filter.
///
/// It may await before calling [`Proceed`], or hand the `Proceed` to a task
/// that calls it later.
pub type ContinuationFuture<'a> = BoxFuture<'a, ()>;

type DirectFn<C> = dyn for<'a> Fn(&'a mut C, &'a mut Exchange) -> FilterFuture<'a> + Send + Sync;
type ContinuationFn<C> =
    dyn for<'a> Fn(&'a mut C, &'a mut Exchange, Proceed) -> ContinuationFuture<'a> + Send + Sync;

/// A unit of cross-cutting logic run before or after an action.
pub enum Filter<C> {
    /// Completes when its returned future resolves.
    Direct(Arc<DirectFn<C>>),
    /// Completes when it calls the supplied [`Proceed`].
    WithContinuation(Arc<ContinuationFn<C>>),
}

impl<C> Filter<C> {
    pub fn direct<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a mut Exchange) -> FilterFuture<'a> + Send + Sync + 'static,
    {
        Filter::Direct(Arc::new(f))
    }

    pub fn with_continuation<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, &'a mut Exchange, Proceed) -> ContinuationFuture<'a> + Send + Sync + 'static,
    {
        Filter::WithContinuation(Arc::new(f))
    }

    /// Scope this filter to `only` the given actions.
    pub fn only(self, only: impl Into<Only>) -> FilterEntry<C> {
        FilterEntry {
            filter: self,
            only: only.into(),
        }
    }
}

impl<C> Clone for Filter<C> {
    fn clone(&self) -> Self {
        match self {
            Filter::Direct(f) => Filter::Direct(Arc::clone(f)),
            Filter::WithContinuation(f) => Filter::WithContinuation(Arc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for Filter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Direct(_) => f.write_str("Filter::Direct"),
            Filter::WithContinuation(_) => f.write_str("Filter::WithContinuation"),
        }
    }
}

/// Continuation handed to a [`Filter::WithContinuation`] filter.
///
/// Consuming it resumes the chain; dropping it without a call aborts the
/// chain with [`ContinuationDropped`].
#[derive(Debug)]
pub struct Proceed {
    tx: oneshot::Sender<Result<(), BoxError>>,
}

impl Proceed {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Result<(), BoxError>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Continue with the next filter.
    pub fn next(self) {
        self.call(None);
    }

    /// Abort the chain with `error`.
    pub fn fail(self, error: impl Into<BoxError>) {
        self.call(Some(error.into()));
    }

    /// Continue on `None`, abort on `Some(error)`.
    pub fn call(self, error: Option<BoxError>) {
        let _ = self.tx.send(error.map_or(Ok(()), Err));
    }
}

/// The set of actions a filter entry applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Only(Vec<ActionName>);

impl Only {
    pub fn all() -> Self {
        Only(ALL_ACTIONS.to_vec())
    }

    pub fn contains(&self, action: ActionName) -> bool {
        self.0.contains(&action)
    }
}

impl From<ActionName> for Only {
    fn from(action: ActionName) -> Self {
        Only(vec![action])
    }
}

impl From<Vec<ActionName>> for Only {
    fn from(actions: Vec<ActionName>) -> Self {
        Only(actions)
    }
}

impl<const N: usize> From<[ActionName; N]> for Only {
    fn from(actions: [ActionName; N]) -> Self {
        Only(actions.to_vec())
    }
}

impl From<&[ActionName]> for Only {
    fn from(actions: &[ActionName]) -> Self {
        Only(actions.to_vec())
    }
}

/// A filter together with its action scope.
pub struct FilterEntry<C> {
    pub filter: Filter<C>,
    pub only: Only,
}

impl<C> Clone for FilterEntry<C> {
    fn clone(&self) -> Self {
        FilterEntry {
            filter: self.filter.clone(),
            only: self.only.clone(),
        }
    }
}

impl<C> fmt::Debug for FilterEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("filter", &self.filter)
            .field("only", &self.only)
            .finish()
    }
}

impl<C> FilterEntry<C> {
    pub fn applies_to(&self, action: ActionName) -> bool {
        self.only.contains(action)
    }
}

impl<C> From<Filter<C>> for FilterEntry<C> {
    fn from(filter: Filter<C>) -> Self {
        FilterEntry {
            filter,
            only: Only::all(),
        }
    }
}

/// Ordered filters declared by a controller.
pub type FilterList<C> = Vec<FilterEntry<C>>;
