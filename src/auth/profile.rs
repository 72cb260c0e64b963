//! Route handlers for the authenticated user's own account: profile, password and deletion.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, PasswordHash, User,
    app_state::lock_connection,
    extract::Json,
    user::{
        ProfileUpdate, UserResponse, delete_user, parse_email, require_text, update_password,
        update_user_profile,
    },
};

/// The state needed to manage the user's account.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of a profile update, absent or null fields are left unchanged.
#[derive(Clone, Default, Deserialize)]
pub struct ProfileForm {
    /// The new display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The new phone number.
    #[serde(default, alias = "phonenumber")]
    pub phone_number: Option<String>,
    /// The new email address.
    #[serde(default)]
    pub email: Option<String>,
    /// The new reference to the user's profile picture.
    #[serde(default, alias = "profileimage")]
    pub profile_image: Option<String>,
    /// The new postal address.
    #[serde(default)]
    pub address: Option<String>,
}

impl ProfileForm {
    fn validate(self) -> Result<ProfileUpdate, Error> {
        Ok(ProfileUpdate {
            name: self
                .name
                .map(|name| require_text(&name, "name"))
                .transpose()?,
            phone_number: self
                .phone_number
                .map(|phone_number| require_text(&phone_number, "phone_number"))
                .transpose()?,
            email: self.email.map(|email| parse_email(&email)).transpose()?,
            profile_image: self.profile_image,
            address: self.address,
        })
    }
}

/// The old and new passwords entered when changing password.
#[derive(Clone, Deserialize)]
pub struct ChangePasswordForm {
    /// The user's current password.
    pub old_password: String,
    /// The password to replace it with.
    pub new_password: String,
}

/// A route handler for getting the authenticated user's profile.
pub async fn get_profile(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// A route handler for updating some or all of the authenticated user's profile.
///
/// # Errors
///
/// Responds with an error if a field is invalid or if the new email or phone
/// number is registered to another user.
pub async fn update_profile(
    State(state): State<ProfileState>,
    Extension(user): Extension<User>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<UserResponse>, Error> {
    let update = form.validate()?;

    let mut connection = lock_connection(&state.db_connection)?;
    let updated_user = update_user_profile(user.id, update, &mut connection)?;

    Ok(Json(UserResponse::from(&updated_user)))
}

/// A route handler for changing the authenticated user's password.
///
/// # Errors
///
/// Responds with [Error::Unauthenticated] if the old password is wrong, or
/// [Error::TooWeak] if the new password is too easy to guess.
pub async fn change_password(
    State(state): State<ProfileState>,
    Extension(user): Extension<User>,
    Json(form): Json<ChangePasswordForm>,
) -> Result<Json<Value>, Error> {
    let is_old_password_valid = user
        .password_hash
        .verify(&form.old_password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_old_password_valid {
        return Err(Error::Unauthenticated);
    }

    let password_hash = PasswordHash::from_raw_password(&form.new_password, state.password_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    update_password(user.id, &password_hash, &connection)?;

    tracing::info!("Changed password for user {}", user.id);

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// A route handler for deleting the authenticated user along with everything they own.
pub async fn delete_account(
    State(state): State<ProfileState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_user(user.id, &connection)?;

    tracing::info!("Deleted user {}", user.id);

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}
