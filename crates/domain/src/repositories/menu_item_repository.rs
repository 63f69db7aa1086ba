use crate::entities::MenuItem;
use crate::errors::DomainError;
use async_trait::async_trait;

/// Search filters for menu items; all fields optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct MenuItemQuery {
    pub category: Option<String>,
    pub max_price: Option<f64>,
    /// Items listing this allergen are excluded.
    pub exclude_allergen: Option<String>,
}

#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<MenuItem>, DomainError>;
    async fn save(&self, item: &MenuItem) -> Result<MenuItem, DomainError>;
    async fn update(&self, item: &MenuItem) -> Result<MenuItem, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    async fn find_by_restaurant(
        &self,
        restaurant_id: &str,
        only_available: bool,
    ) -> Result<Vec<MenuItem>, DomainError>;
    async fn search(&self, query: &MenuItemQuery) -> Result<Vec<MenuItem>, DomainError>;
    /// Adds `by` ordered units to the item's popularity counter.
    async fn bump_popularity(&self, id: &str, by: i64) -> Result<(), DomainError>;
}
