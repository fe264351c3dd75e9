//! Authenticated request state extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use derive_more::Deref;

use super::{AuthClaims, AuthKeys};
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind};

/// Authenticated user state.
///
/// Extraction succeeds only when the request carries a bearer token with
/// a valid signature and unexpired claims. The contained [`AuthClaims`]
/// identify the user for the duration of the request.
///
/// # Usage
///
/// ```rust,ignore
/// async fn handler(AuthState(claims): AuthState) -> String {
///     claims.subject().to_string()
/// }
/// ```
#[derive(Debug, Clone, Deref)]
pub struct AuthState(pub AuthClaims);

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = AuthKeys::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ErrorKind::MissingAuthToken.into_error())?;

        let header = header.to_str().map_err(|_| {
            ErrorKind::MalformedAuthToken
                .with_message("Authorization header contains invalid characters")
                .into_static()
        })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ErrorKind::MalformedAuthToken
                .with_message("Authorization header must use the Bearer scheme")
                .into_static()
        })?;

        let claims = keys.decode(token).map_err(|err| {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %err,
                "Rejected bearer token"
            );
            ErrorKind::Forbidden.into_error()
        })?;

        Ok(AuthState(claims))
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::get;
    use axum_test::TestServer;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    #[derive(Clone, FromRef)]
    struct TestState {
        auth_keys: AuthKeys,
    }

    async fn whoami(AuthState(claims): AuthState) -> String {
        claims.subject().to_string()
    }

    fn test_server(secret: &[u8]) -> TestServer {
        let state = TestState {
            auth_keys: AuthKeys::from_secret(secret),
        };
        let router = Router::new()
            .route("/whoami", get(whoami))
            .with_state(state);
        TestServer::new(router).unwrap()
    }

    fn token_for(sub: &str, secret: &[u8]) -> String {
        let claims = AuthClaims {
            sub: sub.to_string(),
            exp: 4_102_444_800,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[tokio::test]
    async fn valid_token_extracts_subject() {
        let server = test_server(b"secret");
        let token = token_for("user-1", b"secret");

        let response = server
            .get("/whoami")
            .add_header("authorization", format!("Bearer {}", token))
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "user-1");
    }

    #[tokio::test]
    async fn missing_header_is_forbidden() {
        let server = test_server(b"secret");

        let response = server.get("/whoami").await;
        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_forbidden() {
        let server = test_server(b"secret");

        let response = server
            .get("/whoami")
            .add_header("authorization", "Basic dXNlcjpwYXNz")
            .await;
        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn invalid_signature_is_forbidden() {
        let server = test_server(b"secret");
        let token = token_for("user-1", b"other-secret");

        let response = server
            .get("/whoami")
            .add_header("authorization", format!("Bearer {}", token))
            .await;
        response.assert_status_forbidden();
    }
}
