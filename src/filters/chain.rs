//! Filter chain execution.

use thiserror::Error;

use crate::actions::ActionName;
use crate::error::BoxError;
use crate::filters::{Filter, FilterEntry, Proceed};
use crate::http::Exchange;

/// A continuation-style filter dropped its [`Proceed`] without calling it.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("filter dropped its continuation without calling it")]
pub struct ContinuationDropped;

/// Run every filter in `filters` scoped to `action`, in declaration order.
///
/// Stops at the first failure and returns it unchanged. An empty list
/// succeeds immediately.
pub async fn apply_filters<C>(
    filters: &[FilterEntry<C>],
    action: ActionName,
    controller: &mut C,
    exchange: &mut Exchange,
) -> Result<(), BoxError> {
    for entry in filters.iter().filter(|entry| entry.applies_to(action)) {
        match &entry.filter {
            Filter::Direct(filter) => filter(&mut *controller, &mut *exchange).await?,
            Filter::WithContinuation(filter) => {
                let (proceed, signal) = Proceed::channel();
                filter(&mut *controller, &mut *exchange, proceed).await;
                signal
                    .await
                    .map_err(|_| Box::new(ContinuationDropped) as BoxError)??;
            }
        }
    }
    Ok(())
}
