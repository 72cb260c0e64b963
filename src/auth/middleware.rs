//! Authentication middleware that resolves the bearer token on a request to a user.

use std::sync::{Arc, Mutex};

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{TokenKeys, decode_token},
    user::get_user_by_id,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys for verifying access tokens.
    pub token_keys: TokenKeys,
    /// The database connection for looking up the token's user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The token's user is placed into the request and then the request executed
/// normally if the token is valid, otherwise a `401 Unauthorized` response is returned.
/// A token for a user that has since been deleted is treated as invalid.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn auth_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::Unauthenticated)?;

    let user_id = decode_token(bearer.token(), &state.token_keys)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                tracing::debug!("Rejected access token for missing user {user_id}");
                return Err(Error::Unauthenticated);
            }
            Err(error) => return Err(error),
        }
    };

    parts.extensions.insert(user);
    let request = Request::from_parts(parts, body);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use time::Duration;

    use crate::{
        AppState, User,
        auth::{auth_guard, issue_token},
        test_utils::{create_test_user, get_test_state},
        user::delete_user,
    };

    const TEST_PROTECTED_ROUTE: &str = "/protected";

    async fn test_handler(Extension(user): Extension<User>) -> String {
        user.email.to_string()
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_user() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "foo@bar.baz");
        let token = issue_token(user.id, Duration::minutes(5), &state.token_keys).unwrap();
        let server = get_test_server(state);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_text("foo@bar.baz");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let server = get_test_server(get_test_state());

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_unauthorized();
        assert_eq!(response.header("www-authenticate"), "Bearer");
    }

    #[tokio::test]
    async fn malformed_authorization_header_is_unauthorized() {
        let server = get_test_server(get_test_state());

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization("Basic Zm9vOmJhcg==")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let server = get_test_server(get_test_state());

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer("definitely.not.valid")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "foo@bar.baz");
        let token = issue_token(user.id, Duration::seconds(-1), &state.token_keys).unwrap();
        let server = get_test_server(state);

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_unauthorized() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "foo@bar.baz");
        let token = issue_token(user.id, Duration::minutes(5), &state.token_keys).unwrap();
        delete_user(user.id, &state.db_connection.lock().unwrap()).unwrap();
        let server = get_test_server(state);

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(&token)
            .await
            .assert_status_unauthorized();
    }
}
