//! Per-request dispatch pipeline.
//!
//! # Data Flow
//! ```text
//! route handler (action, verb resolved from the action map)
//!     → init        C::init(&mut Exchange)
//!     → lookup      instance.actions()[action] or MethodNotAllowed(verb)
//!     → before      apply_filters(before_action)
//!     → invoke      action(&mut instance, &mut Exchange)
//!     → after       apply_filters(after_action)
//!     → Ok(Exchange) | Err(DispatchError) to the error channel
//! ```
//!
//! # Design Decisions
//! - One pass, no retries, no logging: failures are returned, never swallowed
//! - Each stage finishes before the next starts
//! - `view.rs` is the rendering variant; it reuses the stages below

pub mod view;

use crate::actions::{ActionName, Verb};
use crate::controller::{Action, Controller};
use crate::error::DispatchError;
use crate::filters::{apply_filters, FilterList};
use crate::http::Exchange;

/// Dispatch `action` to a fresh `C` bound to `exchange`.
pub async fn dispatch<C: Controller>(
    action: ActionName,
    verb: Verb,
    mut exchange: Exchange,
) -> Result<Exchange, DispatchError> {
    let mut controller = init::<C>(&mut exchange).await?;

    let method = controller
        .actions()
        .remove(action)
        .ok_or(DispatchError::MethodNotAllowed { verb })?;

    let before = controller.before_action();
    run_filters(&before, action, &mut controller, &mut exchange).await?;

    invoke(&method, &mut controller, &mut exchange).await?;

    let after = controller.after_action();
    run_filters(&after, action, &mut controller, &mut exchange).await?;

    Ok(exchange)
}

pub(crate) async fn init<C: Controller>(exchange: &mut Exchange) -> Result<C, DispatchError> {
    C::init(exchange).await.map_err(DispatchError::Init)
}

pub(crate) async fn run_filters<C: Controller>(
    filters: &FilterList<C>,
    action: ActionName,
    controller: &mut C,
    exchange: &mut Exchange,
) -> Result<(), DispatchError> {
    apply_filters(filters, action, controller, exchange)
        .await
        .map_err(DispatchError::FilterAborted)
}

pub(crate) async fn invoke<C: Controller>(
    method: &Action<C>,
    controller: &mut C,
    exchange: &mut Exchange,
) -> Result<(), DispatchError> {
    method
        .call(controller, exchange)
        .await
        .map_err(DispatchError::ActionFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ActionFuture, ActionSet};
    use crate::error::{BoxError, HttpError};
    use crate::filters::{Filter, FilterFuture, Proceed};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    static INVOCATIONS: AtomicUsize = AtomicUsize::new(0);

    /// Before: `a` on create only, `b` everywhere. After: `z` everywhere.
    struct Filtered;

    impl Filtered {
        fn create<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
            Box::pin(async move {
                ex.response.write("c");
                Ok(())
            })
        }

        fn show<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
            Box::pin(async move {
                ex.response.write("s");
                Ok(())
            })
        }

        fn mark<'a>(marker: &'static str, ex: &'a mut Exchange) -> FilterFuture<'a> {
            Box::pin(async move {
                ex.response.write(marker);
                Ok(())
            })
        }
    }

    impl Controller for Filtered {
        const NAME: &'static str = "FilteredController";

        async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
            Ok(Filtered)
        }

        fn actions(&self) -> ActionSet<Self> {
            ActionSet::new()
                .with(ActionName::Create, Self::create)
                .with(ActionName::Show, Self::show)
        }

        fn before_action(&self) -> FilterList<Self> {
            vec![
                Filter::<Self>::direct(|_, ex| Self::mark("a", ex)).only(ActionName::Create),
                Filter::<Self>::direct(|_, ex| Self::mark("b", ex)).into(),
            ]
        }

        fn after_action(&self) -> FilterList<Self> {
            vec![Filter::<Self>::direct(|_, ex| Self::mark("z", ex)).into()]
        }
    }

    /// Rejects everything in a before-filter.
    struct Guarded;

    impl Guarded {
        fn index<'a>(&'a mut self, _ex: &'a mut Exchange) -> ActionFuture<'a> {
            INVOCATIONS.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }
    }

    impl Controller for Guarded {
        const NAME: &'static str = "GuardedController";

        async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
            Ok(Guarded)
        }

        fn actions(&self) -> ActionSet<Self> {
            ActionSet::new().with(ActionName::Index, Self::index)
        }

        fn before_action(&self) -> FilterList<Self> {
            vec![Filter::<Self>::with_continuation(|_, _, next: Proceed| {
                next.fail(HttpError::unauthorized("sign in first"));
                Box::pin(async {})
            })
            .into()]
        }

        fn after_action(&self) -> FilterList<Self> {
            vec![Filter::<Self>::direct(|_, _| {
                INVOCATIONS.fetch_add(100, Ordering::SeqCst);
                Box::pin(async { Ok(()) })
            })
            .into()]
        }
    }

    /// Fails in its action; counts after-filter runs.
    struct Failing {
        after_runs: Arc<AtomicUsize>,
    }

    static FAILING_AFTER_RUNS: std::sync::OnceLock<Arc<AtomicUsize>> = std::sync::OnceLock::new();

    impl Failing {
        fn destroy<'a>(&'a mut self, _ex: &'a mut Exchange) -> ActionFuture<'a> {
            Box::pin(async {
                Err(BoxError::from(HttpError::new(
                    axum::http::StatusCode::CONFLICT,
                    "in use",
                )))
            })
        }
    }

    impl Controller for Failing {
        const NAME: &'static str = "FailingController";

        async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
            Ok(Failing {
                after_runs: Arc::clone(FAILING_AFTER_RUNS.get_or_init(Default::default)),
            })
        }

        fn actions(&self) -> ActionSet<Self> {
            ActionSet::new().with(ActionName::Destroy, Self::destroy)
        }

        fn after_action(&self) -> FilterList<Self> {
            vec![Filter::<Self>::direct(|c, _| {
                c.after_runs.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(()) })
            })
            .into()]
        }
    }

    static AFTER_MARKS: AtomicUsize = AtomicUsize::new(0);
    static UPDATES: AtomicUsize = AtomicUsize::new(0);

    /// After-filters `[fail, mark]`.
    struct AfterGuarded;

    #[derive(Debug, thiserror::Error)]
    #[error("audit log unavailable")]
    struct AuditUnavailable;

    impl AfterGuarded {
        fn update<'a>(&'a mut self, _ex: &'a mut Exchange) -> ActionFuture<'a> {
            UPDATES.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }
    }

    impl Controller for AfterGuarded {
        const NAME: &'static str = "AfterGuardedController";

        async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
            Ok(AfterGuarded)
        }

        fn actions(&self) -> ActionSet<Self> {
            ActionSet::new().with(ActionName::Update, Self::update)
        }

        fn after_action(&self) -> FilterList<Self> {
            vec![
                Filter::<Self>::direct(|_, _| Box::pin(async { Err(BoxError::from(AuditUnavailable)) })).into(),
                Filter::<Self>::direct(|_, _| {
                    AFTER_MARKS.fetch_add(1, Ordering::SeqCst);
                    Box::pin(async { Ok(()) })
                })
                .into(),
            ]
        }
    }

    /// Refuses to be constructed.
    struct Unbuildable;

    impl Controller for Unbuildable {
        const NAME: &'static str = "UnbuildableController";

        async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
            Err(HttpError::forbidden("no access").into())
        }

        fn actions(&self) -> ActionSet<Self> {
            ActionSet::new()
        }
    }

    #[tokio::test]
    async fn test_filters_wrap_action_in_order() {
        let ex = dispatch::<Filtered>(ActionName::Create, Verb::Post, Exchange::default())
            .await
            .unwrap();
        assert_eq!(ex.response.body(), b"abcz");

        let ex = dispatch::<Filtered>(ActionName::Show, Verb::Get, Exchange::default())
            .await
            .unwrap();
        assert_eq!(ex.response.body(), b"bsz");
    }

    #[tokio::test]
    async fn test_missing_action_is_method_not_allowed() {
        for (action, verb) in [
            (ActionName::Index, Verb::Get),
            (ActionName::New, Verb::Get),
            (ActionName::Edit, Verb::Get),
            (ActionName::Update, Verb::Put),
            (ActionName::Update, Verb::Patch),
            (ActionName::Destroy, Verb::Delete),
        ] {
            let err = dispatch::<Filtered>(action, verb, Exchange::default())
                .await
                .unwrap_err();
            match err {
                DispatchError::MethodNotAllowed { verb: got } => assert_eq!(got, verb),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_missing_create_is_method_not_allowed_for_post() {
        INVOCATIONS.store(0, Ordering::SeqCst);
        let err = dispatch::<Guarded>(ActionName::Create, Verb::Post, Exchange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MethodNotAllowed { verb: Verb::Post }));
        assert_eq!(err.to_string(), "Method Not Allowed: post");
        assert_eq!(err.status(), axum::http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(INVOCATIONS.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_after_filter_failure_stops_remaining_after_filters() {
        let err = dispatch::<AfterGuarded>(ActionName::Update, Verb::Patch, Exchange::default())
            .await
            .unwrap_err();

        assert_eq!(UPDATES.load(Ordering::SeqCst), 1);
        assert_eq!(AFTER_MARKS.load(Ordering::SeqCst), 0);
        let DispatchError::FilterAborted(inner) = err else {
            panic!("expected FilterAborted");
        };
        assert!(inner.downcast_ref::<AuditUnavailable>().is_some());
        assert_eq!(inner.to_string(), "audit log unavailable");
    }

    #[tokio::test]
    async fn test_before_filter_failure_skips_action_and_after() {
        INVOCATIONS.store(0, Ordering::SeqCst);
        let err = dispatch::<Guarded>(ActionName::Index, Verb::Get, Exchange::default())
            .await
            .unwrap_err();

        assert_eq!(INVOCATIONS.load(Ordering::SeqCst), 0);
        let DispatchError::FilterAborted(inner) = err else {
            panic!("expected FilterAborted");
        };
        let http = inner.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http.message, "sign in first");
    }

    #[tokio::test]
    async fn test_action_failure_skips_after_filters() {
        let err = dispatch::<Failing>(ActionName::Destroy, Verb::Delete, Exchange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::ActionFailure(_)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
        assert_eq!(
            FAILING_AFTER_RUNS.get().unwrap().load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_init_failure() {
        let err = dispatch::<Unbuildable>(ActionName::Show, Verb::Get, Exchange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Init(_)));
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_dispatches_are_independent() {
        let first = dispatch::<Filtered>(ActionName::Show, Verb::Get, Exchange::default());
        let second = dispatch::<Filtered>(ActionName::Create, Verb::Post, Exchange::default());
        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap().response.body(), b"bsz");
        assert_eq!(second.unwrap().response.body(), b"abcz");
    }
}
