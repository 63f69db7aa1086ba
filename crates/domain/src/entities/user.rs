use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    RestaurantOwner,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "CUSTOMER",
            UserRole::RestaurantOwner => "RESTAURANT_OWNER",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Staff roles bypass per-resource ownership checks on orders.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::RestaurantOwner)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(UserRole::Customer),
            "RESTAURANT_OWNER" => Ok(UserRole::RestaurantOwner),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(DomainError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Account record. The password never leaves this struct as anything but
/// a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(default)]
    pub addresses: Vec<UserAddress>,
    #[serde(default)]
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            email,
            password_hash,
            name,
            phone: None,
            role,
            is_active: true,
            addresses: Vec::new(),
            preferences: UserPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validation::require_non_blank(&self.name, "Name")?;
        validation::validate_email(&self.email)?;
        if let Some(phone) = &self.phone {
            validation::validate_phone(phone)?;
        }
        Ok(())
    }
}

/// Saved address embedded on the user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    pub preferred_delivery_time: Option<String>,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub language: String,
    pub currency: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            cuisine_preferences: Vec::new(),
            dietary_restrictions: Vec::new(),
            preferred_delivery_time: None,
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            language: "en".to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_are_active_customers_by_default_role() {
        let user = User::new(
            "a@example.com".to_string(),
            "hash".to_string(),
            "Alice".to_string(),
            UserRole::Customer,
        );
        assert!(user.is_active);
        assert!(user.addresses.is_empty());
        assert_eq!(user.preferences.language, "en");
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let user = User::new(
            "not-an-email".to_string(),
            "hash".to_string(),
            "Alice".to_string(),
            UserRole::Customer,
        );
        assert!(user.validate().is_err());
    }

    #[test]
    fn staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::RestaurantOwner.is_staff());
        assert!(!UserRole::Customer.is_staff());
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(
            "restaurant_owner".parse::<UserRole>().unwrap(),
            UserRole::RestaurantOwner
        );
        assert!("superuser".parse::<UserRole>().is_err());
    }
}
