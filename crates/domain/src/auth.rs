//! JWT issuance and verification shared by every service.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::entities::{User, UserRole};
use crate::errors::DomainError;

/// Claims carried in every access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// HS256 token mint/verifier around the shared `JWT_SECRET`.
#[derive(Clone)]
pub struct AuthTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl AuthTokens {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        let user_id = user
            .id
            .clone()
            .ok_or_else(|| DomainError::Validation("User ID is required for tokens".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| DomainError::InvalidToken)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| DomainError::InvalidToken)
    }

    /// Pulls the claims out of an `Authorization: Bearer …` header value.
    pub fn verify_bearer(&self, header: &str) -> Result<Claims, DomainError> {
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(DomainError::InvalidToken)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let mut user = User::new(
            "a@example.com".to_string(),
            "hash".to_string(),
            "Alice".to_string(),
            UserRole::Admin,
        );
        user.id = Some("u-1".to_string());
        user
    }

    #[test]
    fn issued_tokens_verify_with_same_secret() {
        let tokens = AuthTokens::new("test-secret", 3600);
        let token = tokens.issue(&sample_user()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.is_staff());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let mint = AuthTokens::new("secret-a", 3600);
        let other = AuthTokens::new("secret-b", 3600);

        let token = mint.issue(&sample_user()).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        let tokens = AuthTokens::new("test-secret", 3600);
        let token = tokens.issue(&sample_user()).unwrap();

        assert!(tokens.verify_bearer(&format!("Bearer {}", token)).is_ok());
        assert!(tokens.verify_bearer(&token).is_err());
    }

    #[test]
    fn unsaved_user_cannot_get_token() {
        let tokens = AuthTokens::new("test-secret", 3600);
        let mut user = sample_user();
        user.id = None;
        assert!(tokens.issue(&user).is_err());
    }
}
