//! Landing page.

use crate::actions::ActionName;
use crate::controller::{ActionFuture, ActionSet, Controller};
use crate::error::BoxError;
use crate::http::Exchange;

pub struct HomeController;

impl HomeController {
    fn index<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            ex.response
                .local("title", "resourceful")
                .local("resources", vec!["notes", "session"]);
            Ok(())
        })
    }
}

impl Controller for HomeController {
    const NAME: &'static str = "IndexController";

    async fn init(_exchange: &mut Exchange) -> Result<Self, BoxError> {
        Ok(HomeController)
    }

    fn actions(&self) -> ActionSet<Self> {
        ActionSet::new().with(ActionName::Index, Self::index)
    }
}
