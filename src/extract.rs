//! Request extractors that reject malformed input with the crate's [Error].
//!
//! axum's own extractors respond with plain text and `422 Unprocessable Entity`
//! for bodies that do not deserialize. These wrappers respond with
//! `400 Bad Request` and a JSON error body like every other validation error.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// A JSON request body or response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let Self(value) = self;
        axum::Json(value).into_response()
    }
}

/// Parameters taken from the request path, e.g. the ID in `/expenses/{expense_id}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Parameters taken from the request query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);
