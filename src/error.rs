//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request contained a value that is malformed or out of range, e.g.
    /// a date string that is not in the format `YYYY-MM-DD`.
    ///
    /// The string should describe what is wrong in terms the client can fix.
    #[error("{0}")]
    Validation(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email is already registered to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The phone number is already registered to another user.
    #[error("the phone number is already registered")]
    DuplicatePhoneNumber,

    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a usable bearer token, the token could not be
    /// decoded or has expired, or it refers to a user that no longer exists.
    ///
    /// A wrong old password on change-password is also reported this way.
    #[error("could not validate credentials")]
    Unauthenticated,

    /// The requested resource was not found.
    ///
    /// Records that exist but belong to another user are reported with this
    /// same error so that clients cannot probe for other users' data.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A signed token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// A report could not be rendered into the requested file format.
    #[error("could not render report: {0}")]
    ReportRendering(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.phone_number") =>
            {
                Error::DuplicatePhoneNumber
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) | Error::TooWeak(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail | Error::DuplicatePhoneNumber => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An unexpected error occurred, check the server logs for more details.",
                    })),
                )
                    .into_response();
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{
        body::to_bytes,
        http::{StatusCode, header::WWW_AUTHENTICATE},
        response::IntoResponse,
    };
    use serde_json::Value;

    use super::Error;

    async fn get_body_json(error: Error) -> (StatusCode, Option<String>, Value) {
        let response = error.into_response();
        let status = response.status();
        let www_authenticate = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .map(|value| value.to_str().unwrap().to_owned());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, www_authenticate, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_bad_request() {
        let (status, _, body) =
            get_body_json(Error::Validation("Invalid date format.".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid date format.");
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let (status, _, _) = get_body_json(Error::DuplicateEmail).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unauthenticated_asks_for_bearer_token() {
        let (status, www_authenticate, _) = get_body_json(Error::Unauthenticated).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(www_authenticate.as_deref(), Some("Bearer"));
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, _, body) =
            get_body_json(Error::HashingError("secret details".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("secret details"));
    }
}
