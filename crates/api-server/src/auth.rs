use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use domain::{AuthTokens, Claims, DomainError};

use crate::error::ApiError;

/// Extractor for the authenticated caller. Handlers taking `AuthUser` answer
/// 401 when the bearer token is missing, malformed or expired; ownership and
/// role checks stay in the handlers, next to the endpoints they guard.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthTokens: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = AuthTokens::from_ref(state);

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError(DomainError::InvalidToken))?;

        let claims = tokens.verify_bearer(header)?;
        Ok(AuthUser(claims))
    }
}
