//! Signed session tokens and the cookie that carries them.

use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use inkwell_types::api::{Claims, Identity};

pub const SESSION_COOKIE: &str = "inkwell_session";

/// Token and cookie lifetime: 24 hours.
pub const SESSION_TTL_SECS: u64 = 60 * 60 * 24;

/// Every verification failure collapses into this one outcome, so a caller
/// cannot tell a forged token from an expired one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    InvalidOrExpired,
}

pub fn issue(
    identity: &Identity,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        user_id: identity.user_id,
        username: identity.username.clone(),
        exp: now_secs() + ttl_secs,
    };
    sign(&claims, secret)
}

/// Sign claims as given, including whatever `exp` they carry.
pub fn sign(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| TokenError::InvalidOrExpired)?;

    // Valid only strictly before `exp`.
    if data.claims.exp <= now_secs() {
        return Err(TokenError::InvalidOrExpired);
    }

    Ok(data.claims)
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(cookie::time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Removal cookie; the path must match the one the session was set with.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn alice() -> Identity {
        Identity {
            user_id: 1,
            username: "alice01".into(),
        }
    }

    #[test]
    fn issue_then_verify() {
        let token = issue(&alice(), SECRET, SESSION_TTL_SECS).unwrap();
        let claims = verify(&token, SECRET).unwrap();

        assert_eq!(Identity::from(claims.clone()), alice());
        assert!(claims.exp > now_secs());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&alice(), SECRET, SESSION_TTL_SECS).unwrap();
        assert_eq!(verify(&token, "other-secret"), Err(TokenError::InvalidOrExpired));
    }

    #[test]
    fn expired_token_is_rejected_even_when_signed_correctly() {
        let claims = Claims {
            user_id: 1,
            username: "alice01".into(),
            exp: now_secs() - 1,
        };
        let token = sign(&claims, SECRET).unwrap();
        assert_eq!(verify(&token, SECRET), Err(TokenError::InvalidOrExpired));
    }

    #[test]
    fn spliced_and_garbage_tokens_are_rejected() {
        let alice_token = issue(&alice(), SECRET, SESSION_TTL_SECS).unwrap();
        let bob = Identity {
            user_id: 2,
            username: "bob001".into(),
        };
        let bob_token = issue(&bob, SECRET, SESSION_TTL_SECS).unwrap();

        // bob's claims under alice's signature
        let a: Vec<&str> = alice_token.split('.').collect();
        let b: Vec<&str> = bob_token.split('.').collect();
        let spliced = format!("{}.{}.{}", a[0], b[1], a[2]);

        assert_eq!(verify(&spliced, SECRET), Err(TokenError::InvalidOrExpired));
        assert_eq!(verify("", SECRET), Err(TokenError::InvalidOrExpired));
        assert_eq!(verify("a.b.c", SECRET), Err(TokenError::InvalidOrExpired));
    }

    #[test]
    fn cookie_attributes() {
        let session = session_cookie("t".into());
        assert_eq!(session.name(), SESSION_COOKIE);
        assert_eq!(session.http_only(), Some(true));
        assert_eq!(session.secure(), Some(true));
        assert_eq!(session.same_site(), Some(SameSite::Strict));
        assert_eq!(session.path(), Some("/"));
        assert_eq!(
            session.max_age(),
            Some(cookie::time::Duration::seconds(86_400))
        );
    }
}
