//! Issues and verifies the signed bearer tokens that clients use to authenticate.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// How long an access token is valid for if not configured otherwise.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::minutes(30);

/// The keys for signing and verifying access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Create a signing key from a `secret` string.
    pub fn new(secret: &str) -> Self {
        let hash = Sha512::digest(secret);

        Self {
            encoding: EncodingKey::from_secret(&hash),
            decoding: DecodingKey::from_secret(&hash),
        }
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
}

/// Issue a token for `user_id` that expires after `duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn issue_token(user_id: UserID, duration: Duration, keys: &TokenKeys) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.unix_timestamp(),
        exp: (now + duration).unix_timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify `token` and return the ID of the user it was issued to.
///
/// Expired tokens are rejected as soon as their expiry time has passed.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the token is malformed, was not signed
/// with `keys`, or has expired.
pub fn decode_token(token: &str, keys: &TokenKeys) -> Result<UserID, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|error| {
        tracing::debug!("Rejected access token: {error}");
        Error::Unauthenticated
    })?;

    token_data
        .claims
        .sub
        .parse()
        .map(UserID::new)
        .map_err(|_| Error::Unauthenticated)
}

#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{Error, UserID};

    use super::{Claims, TokenKeys, decode_token, issue_token};

    fn get_keys() -> TokenKeys {
        TokenKeys::new("nafstenoas")
    }

    #[test]
    fn decode_recovers_user_id() {
        let keys = get_keys();
        let user_id = UserID::new(42);

        let token = issue_token(user_id, Duration::minutes(5), &keys).unwrap();

        assert_eq!(decode_token(&token, &keys), Ok(user_id));
    }

    #[test]
    fn decode_fails_after_expiry() {
        let keys = get_keys();

        let token = issue_token(UserID::new(1), Duration::seconds(-1), &keys).unwrap();

        assert_eq!(decode_token(&token, &keys), Err(Error::Unauthenticated));
    }

    #[test]
    fn decode_fails_with_different_secret() {
        let token = issue_token(UserID::new(1), Duration::minutes(5), &get_keys()).unwrap();

        let result = decode_token(&token, &TokenKeys::new("a different secret"));

        assert_eq!(result, Err(Error::Unauthenticated));
    }

    #[test]
    fn decode_fails_on_tampered_payload() {
        let keys = get_keys();
        let token = issue_token(UserID::new(1), Duration::minutes(5), &keys).unwrap();
        let other_token = issue_token(UserID::new(2), Duration::minutes(5), &keys).unwrap();

        // Combine the header and payload of one token with the signature of another.
        let (payload, _) = other_token.rsplit_once('.').unwrap();
        let (_, signature) = token.rsplit_once('.').unwrap();
        let tampered_token = format!("{payload}.{signature}");

        assert_eq!(
            decode_token(&tampered_token, &keys),
            Err(Error::Unauthenticated)
        );
    }

    #[test]
    fn decode_fails_on_garbage() {
        assert_eq!(
            decode_token("not.a.token", &get_keys()),
            Err(Error::Unauthenticated)
        );
        assert_eq!(decode_token("", &get_keys()), Err(Error::Unauthenticated));
    }

    #[test]
    fn decode_fails_on_non_numeric_subject() {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: "foo@bar.baz".to_owned(),
            iat: now.unix_timestamp(),
            exp: (now + Duration::minutes(5)).unix_timestamp(),
        };
        let hash = Sha512::digest("nafstenoas");
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(&hash)).unwrap();

        assert_eq!(
            decode_token(&token, &get_keys()),
            Err(Error::Unauthenticated)
        );
    }
}
