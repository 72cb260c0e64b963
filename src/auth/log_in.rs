//! The route for exchanging an email and password for an access token.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{TokenKeys, issue_token},
    extract::Json,
    password::waste_verification_time,
    user::{get_user_by_email, parse_email},
};

/// The state needed to log in a user.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The keys for signing access tokens.
    pub token_keys: TokenKeys,
    /// How long a new access token is valid for.
    pub token_duration: Duration,
    /// The bcrypt cost of new password hashes.
    pub password_cost: u32,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            token_duration: state.token_duration,
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials entered during log in.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// Email entered during log in.
    pub email: String,
    /// Password entered during log in.
    pub password: String,
}

/// The token type of every access token.
pub const TOKEN_TYPE: &str = "bearer";

/// The response to a successful log in.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed access token to send in the `Authorization` header.
    pub access_token: String,
    /// Always [TOKEN_TYPE].
    pub token_type: String,
}

/// Handler for log in requests.
///
/// # Errors
///
/// Responds with [Error::InvalidCredentials] if the email is not registered or
/// the password is wrong, the two cases are not distinguished.
pub async fn log_in(
    State(state): State<LogInState>,
    Json(log_in_data): Json<LogInData>,
) -> Result<Json<TokenResponse>, Error> {
    let user = match parse_email(&log_in_data.email) {
        Ok(email) => {
            let connection = lock_connection(&state.db_connection)?;

            match get_user_by_email(&email, &connection) {
                Ok(user) => Some(user),
                Err(Error::NotFound) => None,
                Err(error) => return Err(error),
            }
        }
        Err(_) => None,
    };

    let Some(user) = user else {
        waste_verification_time(&log_in_data.password, state.password_cost);
        return Err(Error::InvalidCredentials);
    };

    let is_password_valid = user
        .password_hash
        .verify(&log_in_data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let access_token = issue_token(user.id, state.token_duration, &state.token_keys)?;
    tracing::debug!("Issued access token for user {}", user.id);

    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_owned(),
    }))
}
