//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The user owns every income, expense, bill reminder and category that was
/// created with their ID, and deleting the user deletes all of those records.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's phone number, unique across all users.
    pub phone_number: String,
    /// The user's email address, unique across all users.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// A reference (e.g., URL) to the user's profile picture.
    pub profile_image: Option<String>,
    /// The user's postal address.
    pub address: Option<String>,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// The data needed to create a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The user's phone number.
    pub phone_number: String,
    /// The user's email address.
    pub email: EmailAddress,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
    /// A reference to the user's profile picture.
    pub profile_image: Option<String>,
    /// The user's postal address.
    pub address: Option<String>,
}

/// The public view of a [User], the password hash is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// The user's ID.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's phone number.
    pub phone_number: String,
    /// The user's email address.
    pub email: String,
    /// A reference to the user's profile picture.
    pub profile_image: Option<String>,
    /// The user's postal address.
    pub address: Option<String>,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.to_string(),
            profile_image: user.profile_image.clone(),
            address: user.address.clone(),
            created_at: user.created_at,
        }
    }
}

/// A partial update of a user's profile.
///
/// Fields that are `None` are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    /// The new display name.
    pub name: Option<String>,
    /// The new phone number.
    pub phone_number: Option<String>,
    /// The new email address.
    pub email: Option<EmailAddress>,
    /// The new reference to the user's profile picture.
    pub profile_image: Option<String>,
    /// The new postal address.
    pub address: Option<String>,
}

/// Parse and validate an email address supplied by a client.
///
/// # Errors
///
/// Returns [Error::Validation] if `raw_email` is not a valid email address.
pub fn parse_email(raw_email: &str) -> Result<EmailAddress, Error> {
    EmailAddress::from_str(raw_email.trim())
        .map_err(|error| Error::Validation(format!("invalid email address: {error}")))
}

/// Check that a required text field is not blank and return it trimmed.
///
/// # Errors
///
/// Returns [Error::Validation] naming `field` if `value` is empty or only whitespace.
pub fn require_text(value: &str, field: &str) -> Result<String, Error> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} cannot be empty")));
    }

    Ok(trimmed.to_owned())
}

/// Create the user table.
///
/// Emails are compared case-insensitively so that two accounts cannot differ only by case.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                phone_number TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password TEXT NOT NULL,
                profile_image TEXT,
                address TEXT,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

const SELECT_USER_COLUMNS: &str =
    "SELECT id, name, phone_number, email, password, profile_image, address, created_at FROM user";

/// Create and insert a new user into the database.
///
/// The insert and the read back of the stored user happen in a single transaction.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::DuplicatePhoneNumber] if the phone number is already registered,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    let transaction = connection.unchecked_transaction()?;
    transaction.execute(
        "INSERT INTO user (name, phone_number, email, password, profile_image, address, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &new_user.name,
            &new_user.phone_number,
            new_user.email.as_str(),
            new_user.password_hash.as_ref(),
            &new_user.profile_image,
            &new_user.address,
            created_at,
        ),
    )?;

    let id = UserID::new(transaction.last_insert_rowid());
    let user = get_user_by_id(id, &transaction)?;
    transaction.commit()?;

    Ok(user)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER_COLUMNS} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database that has the specified `email` address.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no user with the specified email or
/// [Error::SqlError] if there are SQL related errors.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER_COLUMNS} WHERE email = :email"))?
        .query_row(&[(":email", &email.as_str())], map_row)
        .map_err(|error| error.into())
}

/// Apply a partial profile update to the user with `user_id` and return the updated user.
///
/// The read and write happen in a single transaction, so a failed update leaves the user unchanged.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if the user does not exist,
/// - [Error::DuplicateEmail] or [Error::DuplicatePhoneNumber] if the new email or phone
///   number belongs to another user,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn update_user_profile(
    user_id: UserID,
    update: ProfileUpdate,
    connection: &mut Connection,
) -> Result<User, Error> {
    let transaction = connection.transaction()?;
    let current = get_user_by_id(user_id, &transaction)?;

    let name = update.name.unwrap_or(current.name);
    let phone_number = update.phone_number.unwrap_or(current.phone_number);
    let email = update.email.unwrap_or(current.email);
    let profile_image = update.profile_image.or(current.profile_image);
    let address = update.address.or(current.address);

    transaction.execute(
        "UPDATE user
        SET name = ?1, phone_number = ?2, email = ?3, profile_image = ?4, address = ?5
        WHERE id = ?6",
        (
            &name,
            &phone_number,
            email.as_str(),
            &profile_image,
            &address,
            user_id.as_i64(),
        ),
    )?;

    let user = get_user_by_id(user_id, &transaction)?;
    transaction.commit()?;

    Ok(user)
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist or [Error::SqlError] if
/// some other SQL related error occurred.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the user with `user_id`.
///
/// All of the user's incomes, expenses, bill reminders and categories are
/// deleted with them by the database's cascading foreign keys.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist or [Error::SqlError] if
/// some other SQL related error occurred.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM user WHERE id = ?1", [user_id.as_i64()])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let phone_number = row.get(2)?;
    let raw_email: String = row.get(3)?;
    let raw_password_hash: String = row.get(4)?;
    let profile_image = row.get(5)?;
    let address = row.get(6)?;
    let created_at = row.get(7)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        phone_number,
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        profile_image,
        address,
        created_at,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, initialize_db,
        user::{
            NewUser, ProfileUpdate, UserID, count_users, create_user, delete_user,
            get_user_by_email, get_user_by_id, parse_email, update_password,
            update_user_profile,
        },
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize_db(&conn).expect("Could not initialize database");

        conn
    }

    fn new_user(email: &str, phone_number: &str) -> NewUser {
        NewUser {
            name: "Jane Doe".to_owned(),
            phone_number: phone_number.to_owned(),
            email: parse_email(email).unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            profile_image: None,
            address: Some("1 Example Street".to_owned()),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let want = new_user("foo@bar.baz", "0211234567");

        let inserted_user = create_user(want.clone(), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.name, want.name);
        assert_eq!(inserted_user.phone_number, want.phone_number);
        assert_eq!(inserted_user.email, want.email);
        assert_eq!(inserted_user.password_hash, want.password_hash);
        assert_eq!(inserted_user.profile_image, None);
        assert_eq!(inserted_user.address, want.address);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        let result = create_user(new_user("foo@bar.baz", "0217654321"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn insert_user_commits_and_failed_insert_rolls_back() {
        let db_connection = get_db_connection();

        create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();
        assert!(db_connection.is_autocommit());

        let result = create_user(new_user("foo@bar.baz", "0217654321"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert!(db_connection.is_autocommit());
        assert_eq!(count_users(&db_connection), Ok(1));
    }

    #[test]
    fn insert_user_fails_on_duplicate_email_with_different_case() {
        let db_connection = get_db_connection();
        create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        let result = create_user(new_user("FOO@bar.baz", "0217654321"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn insert_user_fails_on_duplicate_phone_number() {
        let db_connection = get_db_connection();
        create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        let result = create_user(new_user("bar@bar.baz", "0211234567"), &db_connection);

        assert_eq!(result, Err(Error::DuplicatePhoneNumber));
    }

    #[test]
    fn insert_users_with_distinct_details_succeeds() {
        let db_connection = get_db_connection();

        create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();
        create_user(new_user("bar@bar.baz", "0217654321"), &db_connection).unwrap();

        assert_eq!(count_users(&db_connection), Ok(2));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        let retrieved_user = get_user_by_email(&test_user.email, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_fails_with_unknown_email() {
        let db_connection = get_db_connection();

        let result = get_user_by_email(&parse_email("nobody@bar.baz").unwrap(), &db_connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_profile_changes_only_given_fields() {
        let mut db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        let updated_user = update_user_profile(
            test_user.id,
            ProfileUpdate {
                name: Some("John Doe".to_owned()),
                profile_image: Some("https://example.com/me.png".to_owned()),
                ..Default::default()
            },
            &mut db_connection,
        )
        .unwrap();

        assert_eq!(updated_user.name, "John Doe");
        assert_eq!(
            updated_user.profile_image.as_deref(),
            Some("https://example.com/me.png")
        );
        assert_eq!(updated_user.email, test_user.email);
        assert_eq!(updated_user.phone_number, test_user.phone_number);
        assert_eq!(updated_user.address, test_user.address);
        assert_eq!(updated_user.created_at, test_user.created_at);
    }

    #[test]
    fn update_profile_fails_on_taken_email_and_leaves_user_unchanged() {
        let mut db_connection = get_db_connection();
        create_user(new_user("taken@bar.baz", "0211234567"), &db_connection).unwrap();
        let test_user = create_user(new_user("foo@bar.baz", "0217654321"), &db_connection).unwrap();

        let result = update_user_profile(
            test_user.id,
            ProfileUpdate {
                name: Some("Changed".to_owned()),
                email: Some(parse_email("taken@bar.baz").unwrap()),
                ..Default::default()
            },
            &mut db_connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(get_user_by_id(test_user.id, &db_connection), Ok(test_user));
    }

    #[test]
    fn update_password_replaces_hash() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();
        let new_hash = PasswordHash::new_unchecked("hunter3");

        update_password(test_user.id, &new_hash, &db_connection).unwrap();

        let got = get_user_by_id(test_user.id, &db_connection).unwrap();
        assert_eq!(got.password_hash, new_hash);
    }

    #[test]
    fn delete_user_removes_user() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "0211234567"), &db_connection).unwrap();

        delete_user(test_user.id, &db_connection).unwrap();

        assert_eq!(
            get_user_by_id(test_user.id, &db_connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_user(test_user.id, &db_connection),
            Err(Error::NotFound)
        );
    }
}
