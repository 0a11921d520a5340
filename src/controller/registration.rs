//! Type-erased controller registration.
//!
//! A [`ControllerHandle`] is what the route table stores per path-name: the
//! controller's static metadata plus the dispatch variant it is served with.

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::actions::{ActionMapFlavor, ActionName, Verb};
use crate::controller::Controller;
use crate::dispatch::{self, view::ViewRenderer};
use crate::error::DispatchError;
use crate::http::Exchange;

/// A registered controller type.
pub trait ControllerType: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn flavor(&self) -> ActionMapFlavor;

    /// Run the full pipeline for `action` on a fresh instance.
    fn dispatch(
        &self,
        action: ActionName,
        verb: Verb,
        exchange: Exchange,
    ) -> BoxFuture<'static, Result<Exchange, DispatchError>>;
}

pub type ControllerHandle = Arc<dyn ControllerType>;

struct Resource<C>(PhantomData<fn() -> C>);

impl<C: Controller> ControllerType for Resource<C> {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn flavor(&self) -> ActionMapFlavor {
        C::flavor()
    }

    fn dispatch(
        &self,
        action: ActionName,
        verb: Verb,
        exchange: Exchange,
    ) -> BoxFuture<'static, Result<Exchange, DispatchError>> {
        Box::pin(dispatch::dispatch::<C>(action, verb, exchange))
    }
}

struct View<C> {
    renderer: Arc<dyn ViewRenderer>,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> ControllerType for View<C> {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn flavor(&self) -> ActionMapFlavor {
        C::flavor()
    }

    fn dispatch(
        &self,
        action: ActionName,
        _verb: Verb,
        exchange: Exchange,
    ) -> BoxFuture<'static, Result<Exchange, DispatchError>> {
        let renderer = Arc::clone(&self.renderer);
        Box::pin(async move { dispatch::view::dispatch::<C>(action, renderer.as_ref(), exchange).await })
    }
}

/// Register `C` as a plain resource controller.
pub fn resource<C: Controller>() -> ControllerHandle {
    Arc::new(Resource::<C>(PhantomData))
}

/// Register `C` as a view controller rendered through `renderer`.
pub fn view<C: Controller>(renderer: Arc<dyn ViewRenderer>) -> ControllerHandle {
    Arc::new(View::<C> {
        renderer,
        _controller: PhantomData,
    })
}
