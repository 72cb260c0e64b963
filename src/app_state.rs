//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_TOKEN_DURATION, TokenKeys},
    db::initialize,
    password::PasswordHash,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys for signing and verifying access tokens.
    pub token_keys: TokenKeys,

    /// How long an access token is valid for after it is issued.
    pub token_duration: Duration,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Access tokens are signed with a key derived from `token_secret`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, token_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_keys: TokenKeys::new(token_secret),
            token_duration: DEFAULT_TOKEN_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Set how long access tokens are valid for.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }

    /// Set the bcrypt cost for hashing new passwords.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }
}

/// Lock the shared database connection.
///
/// # Errors
///
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub(crate) fn lock_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
