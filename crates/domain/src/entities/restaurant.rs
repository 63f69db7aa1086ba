use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::validation;

/// Core Restaurant entity - a catalog listing with its embedded value objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Option<String>, // None for new restaurants before persistence
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    pub opening_hours: Option<OpeningHours>,
    pub delivery_info: Option<DeliveryInfo>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn new(name: String, address: Address) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            description: None,
            image_url: None,
            address,
            phone: None,
            email: None,
            website: None,
            cuisine_types: Vec::new(),
            opening_hours: None,
            delivery_info: None,
            rating: None,
            review_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validation::require_non_blank(&self.name, "Name")?;

        if let Some(phone) = &self.phone {
            validation::validate_phone(phone)?;
        }
        if let Some(email) = &self.email {
            validation::validate_email(email)?;
        }
        self.address.validate()?;

        Ok(())
    }

    /// Copies the caller-editable fields from `changes`, leaving identity,
    /// rating and lifecycle state untouched.
    pub fn apply_update(&mut self, changes: Restaurant) {
        self.name = changes.name;
        self.description = changes.description;
        self.image_url = changes.image_url;
        self.address = changes.address;
        self.phone = changes.phone;
        self.email = changes.email;
        self.website = changes.website;
        self.cuisine_types = changes.cuisine_types;
        if changes.opening_hours.is_some() {
            self.opening_hours = changes.opening_hours;
        }
        if changes.delivery_info.is_some() {
            self.delivery_info = changes.delivery_info;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Address {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.zip_code.is_empty() {
            validation::validate_zip_code(&self.zip_code)?;
        }
        Ok(())
    }
}

/// Free-form schedule per weekday, e.g. "09:00-22:00" or "closed"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub delivery_time_minutes: Option<i32>,
    pub delivery_fee: Option<f64>,
    pub minimum_order_amount: Option<f64>,
    pub max_delivery_distance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_address() -> Address {
        Address {
            street: "1 Market St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip_code: "94105".to_string(),
            country: "USA".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn new_restaurant_is_active_with_zero_reviews() {
        let restaurant = Restaurant::new("Pasta Place".to_string(), sample_address());
        assert!(restaurant.is_active);
        assert_eq!(restaurant.review_count, 0);
        assert!(restaurant.id.is_none());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let restaurant = Restaurant::new("   ".to_string(), sample_address());
        assert!(restaurant.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_phone() {
        let mut restaurant = Restaurant::new("Pasta Place".to_string(), sample_address());
        restaurant.phone = Some("phone-home".to_string());
        assert!(restaurant.validate().is_err());

        restaurant.phone = Some("+14155552671".to_string());
        assert!(restaurant.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_zip() {
        let mut restaurant = Restaurant::new("Pasta Place".to_string(), sample_address());
        restaurant.address.zip_code = "941".to_string();
        assert!(restaurant.validate().is_err());
    }

    #[test]
    fn apply_update_keeps_lifecycle_fields() {
        let mut restaurant = Restaurant::new("Pasta Place".to_string(), sample_address());
        restaurant.rating = Some(4.5);
        restaurant.review_count = 12;

        let mut changes = Restaurant::new("Pasta Palace".to_string(), sample_address());
        changes.rating = None;
        changes.review_count = 0;
        restaurant.apply_update(changes);

        assert_eq!(restaurant.name, "Pasta Palace");
        assert_eq!(restaurant.rating, Some(4.5));
        assert_eq!(restaurant.review_count, 12);
        assert!(restaurant.is_active);
    }
}
