use crate::entities::Restaurant;
use crate::errors::DomainError;
use async_trait::async_trait;

/// Repository trait - defines what the catalog needs from persistence
/// This is a PORT in hexagonal architecture
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>, DomainError>;
    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, DomainError>;
    async fn update(&self, restaurant: &Restaurant) -> Result<Restaurant, DomainError>;
    /// Active restaurants ordered by name, with offset/limit paging.
    async fn find_active(&self, offset: i64, limit: i64) -> Result<Vec<Restaurant>, DomainError>;
    /// Case-insensitive substring match over name and description.
    async fn search(&self, term: &str) -> Result<Vec<Restaurant>, DomainError>;
    async fn find_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>, DomainError>;
    async fn find_by_city(&self, city: &str) -> Result<Vec<Restaurant>, DomainError>;
    async fn find_by_min_rating(&self, min_rating: f64) -> Result<Vec<Restaurant>, DomainError>;
    async fn find_by_cuisines(&self, cuisines: &[String]) -> Result<Vec<Restaurant>, DomainError>;
}
