#![allow(missing_docs)]

pub(crate) mod http;

use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, PasswordHash, User, ValidatedPassword, build_router, endpoints, initialize_db,
    user::{NewUser, create_user, parse_email},
};

pub(crate) use http::{assert_attachment, assert_content_type};

pub(crate) const TEST_TOKEN_SECRET: &str = "nafstenoas";
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";
/// The lowest cost bcrypt accepts, keeps the tests fast.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize_db(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user whose password is [TEST_PASSWORD].
///
/// The phone number is derived from `email` so that users with distinct emails never clash.
pub(crate) fn create_test_user(connection: &Connection, email: &str) -> User {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_PASSWORD_COST,
    )
    .expect("Could not hash test password");

    create_user(
        NewUser {
            name: "Test User".to_owned(),
            phone_number: format!("phone:{email}"),
            email: parse_email(email).expect("Invalid test email"),
            password_hash,
            profile_image: None,
            address: None,
        },
        connection,
    )
    .expect("Could not create test user")
}

pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(connection, TEST_TOKEN_SECRET)
        .expect("Could not create app state")
        .with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_state())).expect("Could not create test server.")
}

/// Register a user through the API with [TEST_PASSWORD], log them in and return their access token.
pub(crate) async fn register_and_log_in(
    server: &TestServer,
    email: &str,
    phone_number: &str,
) -> String {
    server
        .post(endpoints::REGISTER)
        .json(&json!({
            "name": "Test User",
            "phone_number": phone_number,
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    log_in(server, email, TEST_PASSWORD).await
}

/// Log in through the API and return the access token.
pub(crate) async fn log_in(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({
            "email": email,
            "password": password,
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    body["access_token"]
        .as_str()
        .expect("access_token missing from log in response")
        .to_owned()
}
