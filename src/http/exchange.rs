//! The request/response pair owned by one dispatch.

use std::collections::HashMap;

use axum::extract::Request;
use axum::response::Response;

use crate::error::DispatchError;
use crate::http::request::RequestData;
use crate::http::response::ResponseWriter;

/// Input and output channels of a single request.
///
/// Created by the route handler, moved into the dispatcher, and turned back
/// into an HTTP response once the pipeline finishes. It is never shared
/// between requests.
#[derive(Debug, Default)]
pub struct Exchange {
    pub request: RequestData,
    pub response: ResponseWriter,
}

impl Exchange {
    pub fn new(request: RequestData) -> Self {
        Self {
            request,
            response: ResponseWriter::new(),
        }
    }

    pub async fn from_request(
        request: Request,
        params: HashMap<String, String>,
        body_limit: usize,
    ) -> Result<Self, DispatchError> {
        RequestData::from_request(request, params, body_limit)
            .await
            .map(Self::new)
    }

    pub fn into_response(self) -> Response {
        self.response.into_response()
    }
}
