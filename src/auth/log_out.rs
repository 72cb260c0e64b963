//! Log-out route handler.

use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::User;

/// Acknowledge a log out request.
///
/// Access tokens are not stored on the server, so logging out is up to the
/// client discarding its token. The token stays valid until it expires.
pub async fn log_out(Extension(user): Extension<User>) -> Json<Value> {
    tracing::debug!("User {} logged out", user.id);

    Json(json!({ "message": "Successfully logged out" }))
}
