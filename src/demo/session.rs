//! Session: a singleton resource identified by the `x-user` header.

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::actions::ActionName;
use crate::controller::{ActionFuture, ActionSet, Controller};
use crate::error::{BoxError, HttpError};
use crate::filters::{ContinuationFuture, Filter, FilterList, Proceed};
use crate::http::Exchange;

const USER_HEADER: &str = "x-user";

#[derive(Debug, Deserialize)]
struct SignIn {
    user: String,
}

pub struct SessionController {
    user: Option<String>,
}

impl SessionController {
    fn show<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            ex.response.send_json(&json!({ "user": self.user }))?;
            Ok(())
        })
    }

    fn create<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            let sign_in: SignIn = ex
                .request
                .json()
                .map_err(|e| HttpError::bad_request(format!("invalid sign-in: {e}")))?;
            ex.response
                .status(StatusCode::CREATED)
                .send_json(&json!({ "user": sign_in.user }))?;
            Ok(())
        })
    }

    fn destroy<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            self.user = None;
            ex.response.status(StatusCode::NO_CONTENT).end();
            Ok(())
        })
    }

    fn require_user<'a>(&'a mut self, _ex: &'a mut Exchange, next: Proceed) -> ContinuationFuture<'a> {
        Box::pin(async move {
            if self.user.is_some() {
                next.next();
            } else {
                next.fail(HttpError::unauthorized("sign in first"));
            }
        })
    }
}

impl Controller for SessionController {
    const NAME: &'static str = "SessionController";
    const SINGLETON: bool = true;

    async fn init(exchange: &mut Exchange) -> Result<Self, BoxError> {
        Ok(SessionController {
            user: exchange.request.header(USER_HEADER).map(str::to_string),
        })
    }

    fn actions(&self) -> ActionSet<Self> {
        ActionSet::new()
            .with(ActionName::Show, Self::show)
            .with(ActionName::Create, Self::create)
            .with(ActionName::Destroy, Self::destroy)
    }

    fn before_action(&self) -> FilterList<Self> {
        vec![Filter::with_continuation(Self::require_user).only([ActionName::Show, ActionName::Destroy])]
    }
}
