use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::validation;

/// Menu item belonging to a restaurant, referenced by id only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Option<String>,
    pub restaurant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergen_info: Vec<String>,
    pub nutritional_info: Option<NutritionalInfo>,
    /// Running count of ordered units, maintained from order-created events
    #[serde(default)]
    pub popularity: i64,
}

impl MenuItem {
    pub fn new(restaurant_id: String, name: String, price: f64) -> Self {
        Self {
            id: None,
            restaurant_id,
            name,
            description: None,
            price,
            category: None,
            image_url: None,
            is_available: true,
            ingredients: Vec::new(),
            allergen_info: Vec::new(),
            nutritional_info: None,
            popularity: 0,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validation::require_non_blank(&self.name, "Name")?;
        validation::require_non_blank(&self.restaurant_id, "Restaurant ID")?;
        validation::require_positive(self.price, "Price")?;
        Ok(())
    }

    pub fn contains_allergen(&self, allergen: &str) -> bool {
        self.allergen_info
            .iter()
            .any(|a| a.eq_ignore_ascii_case(allergen))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionalInfo {
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}
