use std::sync::Arc;

use crate::auth::AuthTokens;
use crate::entities::{User, UserAddress, UserPreferences, UserRole};
use crate::errors::DomainError;
use crate::repositories::UserRepository;
use crate::validation;

const MIN_PASSWORD_LEN: usize = 8;

/// Registration input as accepted by the register endpoint.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub addresses: Option<Vec<UserAddress>>,
    pub preferences: Option<UserPreferences>,
}

/// A successful registration or login: the user plus a fresh token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// User Service - registration, login and profile management
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: AuthTokens,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: AuthTokens) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, registration: Registration) -> Result<Authenticated, DomainError> {
        validation::validate_email(&registration.email)?;
        if registration.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.users.email_exists(&registration.email).await? {
            return Err(DomainError::EmailAlreadyRegistered(registration.email));
        }

        let password_hash = bcrypt::hash(&registration.password, bcrypt::DEFAULT_COST)
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        let mut user = User::new(
            registration.email,
            password_hash,
            registration.name,
            registration.role,
        );
        user.phone = registration.phone;
        user.validate()?;

        let saved = self.users.save(&user).await?;
        let token = self.tokens.issue(&saved)?;
        Ok(Authenticated { user: saved, token })
    }

    /// Invalid email, wrong password and deactivated accounts all answer
    /// with the same error so login probing reveals nothing.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .filter(|user| user.is_active)
            .ok_or(DomainError::InvalidCredentials)?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        if !matches {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok(Authenticated { user, token })
    }

    pub async fn profile(&self, user_id: &str) -> Result<User, DomainError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => Err(DomainError::UserNotFound(user_id.to_string())),
        }
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<User, DomainError> {
        let mut user = self.profile(user_id).await?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(addresses) = update.addresses {
            user.addresses = addresses;
        }
        if let Some(preferences) = update.preferences {
            user.preferences = preferences;
        }
        user.updated_at = chrono::Utc::now();
        user.validate()?;

        self.users.update(&user).await
    }

    pub async fn deactivate(&self, user_id: &str) -> Result<(), DomainError> {
        let mut user = self.profile(user_id).await?;
        user.is_active = false;
        user.updated_at = chrono::Utc::now();
        self.users.update(&user).await?;
        Ok(())
    }
}
