//! Rendering dispatch variant.
//!
//! Same stages as the plain dispatcher, with two differences:
//! - a missing action is reported as `NotFound` once the before-filters ran
//! - after a successful action the view `<routified controller>/<action>` is
//!   rendered with the response locals, unless the action finalized the
//!   response itself

use serde_json::{json, Map, Value};

use crate::actions::ActionName;
use crate::controller::Controller;
use crate::error::{BoxError, DispatchError};
use crate::http::Exchange;
use crate::routing::naming::routify;

/// Turns a view name and locals into an HTML body.
pub trait ViewRenderer: Send + Sync + 'static {
    fn render(&self, view: &str, locals: &Map<String, Value>) -> Result<String, BoxError>;
}

impl<F> ViewRenderer for F
where
    F: Fn(&str, &Map<String, Value>) -> Result<String, BoxError> + Send + Sync + 'static,
{
    fn render(&self, view: &str, locals: &Map<String, Value>) -> Result<String, BoxError> {
        self(view, locals)
    }
}

/// Renders the view name and locals as a JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalsRenderer;

impl ViewRenderer for LocalsRenderer {
    fn render(&self, view: &str, locals: &Map<String, Value>) -> Result<String, BoxError> {
        Ok(json!({ "view": view, "locals": locals }).to_string())
    }
}

/// View rendered for `action` of the controller named `controller_name`.
pub fn view_name(controller_name: &str, action: ActionName) -> String {
    format!("{}/{}", routify(controller_name), action)
}

/// Dispatch `action` to a fresh `C`, rendering its view on success.
pub async fn dispatch<C: Controller>(
    action: ActionName,
    renderer: &dyn ViewRenderer,
    mut exchange: Exchange,
) -> Result<Exchange, DispatchError> {
    let mut controller = super::init::<C>(&mut exchange).await?;
    let method = controller.actions().remove(action);

    let before = controller.before_action();
    super::run_filters(&before, action, &mut controller, &mut exchange).await?;

    let method = method.ok_or(DispatchError::NotFound)?;
    super::invoke(&method, &mut controller, &mut exchange).await?;

    if !exchange.response.is_finalized() {
        let view = view_name(C::NAME, action);
        tracing::info!(view = %view, "Rendering view");
        let html = renderer
            .render(&view, exchange.response.locals())
            .map_err(DispatchError::Render)?;
        exchange.response.send_html(html);
    }

    let after = controller.after_action();
    super::run_filters(&after, action, &mut controller, &mut exchange).await?;

    Ok(exchange)
}
