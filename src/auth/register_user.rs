//! The route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    extract::Json,
    user::{NewUser, UserResponse, create_user, parse_email, require_text},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost for hashing the new user's password.
    pub password_cost: u32,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details entered during registration.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    /// The user's display name.
    pub name: String,
    /// The user's phone number.
    #[serde(alias = "phonenumber")]
    pub phone_number: String,
    /// The user's email address.
    pub email: String,
    /// The user's password in plain text.
    pub password: String,
    /// The user's postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// A reference to the user's profile picture.
    #[serde(default, alias = "profileimage")]
    pub profile_image: Option<String>,
}

/// A route handler for creating a new user.
///
/// Responds with `201 Created` and the new user, without their password hash.
///
/// # Errors
///
/// Responds with an error if a field is invalid, the password is too weak,
/// or the email or phone number is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    let name = require_text(&form.name, "name")?;
    let phone_number = require_text(&form.phone_number, "phone_number")?;
    let email = parse_email(&form.email)?;
    let password_hash = PasswordHash::from_raw_password(&form.password, state.password_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(
        NewUser {
            name,
            phone_number,
            email,
            password_hash,
            profile_image: form.profile_image,
            address: form.address,
        },
        &connection,
    )?;

    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}
