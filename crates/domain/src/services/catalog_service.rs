use std::sync::Arc;

use crate::entities::{MenuItem, Restaurant};
use crate::errors::DomainError;
use crate::events::{
    routing, EventEnvelope, EventPublisher, MenuItemCreated, OrderCreated, RestaurantCreated,
    RestaurantDeactivated, CATALOG_TOPIC,
};
use crate::repositories::{MenuItemQuery, MenuItemRepository, RestaurantRepository};

/// Catalog Service - restaurant and menu item logic
pub struct CatalogService {
    restaurants: Arc<dyn RestaurantRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl CatalogService {
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        menu_items: Arc<dyn MenuItemRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            restaurants,
            menu_items,
            publisher,
        }
    }

    pub async fn create_restaurant(
        &self,
        restaurant: Restaurant,
    ) -> Result<Restaurant, DomainError> {
        restaurant.validate()?;
        let saved = self.restaurants.save(&restaurant).await?;

        let event = RestaurantCreated {
            restaurant_id: saved.id.clone().unwrap_or_default(),
            name: saved.name.clone(),
        };
        self.publisher.publish(
            CATALOG_TOPIC,
            EventEnvelope::new(routing::RESTAURANT_CREATED, &event)?,
        )?;

        Ok(saved)
    }

    pub async fn get_restaurant(&self, id: &str) -> Result<Restaurant, DomainError> {
        match self.restaurants.find_by_id(id).await? {
            Some(restaurant) => Ok(restaurant),
            None => Err(DomainError::RestaurantNotFound(id.to_string())),
        }
    }

    pub async fn update_restaurant(
        &self,
        id: &str,
        changes: Restaurant,
    ) -> Result<Restaurant, DomainError> {
        changes.validate()?;
        let mut restaurant = self.get_restaurant(id).await?;
        restaurant.apply_update(changes);
        self.restaurants.update(&restaurant).await
    }

    /// Delete is a soft deactivate; the listing queries filter on the flag.
    pub async fn deactivate_restaurant(&self, id: &str) -> Result<(), DomainError> {
        let mut restaurant = self.get_restaurant(id).await?;
        restaurant.is_active = false;
        restaurant.updated_at = chrono::Utc::now();
        self.restaurants.update(&restaurant).await?;

        let event = RestaurantDeactivated {
            restaurant_id: id.to_string(),
        };
        self.publisher.publish(
            CATALOG_TOPIC,
            EventEnvelope::new(routing::RESTAURANT_DEACTIVATED, &event)?,
        )?;

        Ok(())
    }

    pub async fn list_active(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Restaurant>, DomainError> {
        self.restaurants.find_active(offset, limit).await
    }

    pub async fn search_restaurants(&self, term: &str) -> Result<Vec<Restaurant>, DomainError> {
        self.restaurants.search(term).await
    }

    pub async fn restaurants_by_cuisine(
        &self,
        cuisine: &str,
    ) -> Result<Vec<Restaurant>, DomainError> {
        self.restaurants.find_by_cuisine(cuisine).await
    }

    pub async fn restaurants_by_city(&self, city: &str) -> Result<Vec<Restaurant>, DomainError> {
        self.restaurants.find_by_city(city).await
    }

    pub async fn restaurants_by_min_rating(
        &self,
        min_rating: f64,
    ) -> Result<Vec<Restaurant>, DomainError> {
        self.restaurants.find_by_min_rating(min_rating).await
    }

    pub async fn restaurants_by_cuisines(
        &self,
        cuisines: &[String],
    ) -> Result<Vec<Restaurant>, DomainError> {
        self.restaurants.find_by_cuisines(cuisines).await
    }

    pub async fn add_menu_item(&self, item: MenuItem) -> Result<MenuItem, DomainError> {
        item.validate()?;
        // The referenced restaurant must exist before a menu item can hang off it
        self.get_restaurant(&item.restaurant_id).await?;
        let saved = self.menu_items.save(&item).await?;

        let event = MenuItemCreated {
            menu_item_id: saved.id.clone().unwrap_or_default(),
            restaurant_id: saved.restaurant_id.clone(),
            name: saved.name.clone(),
        };
        self.publisher.publish(
            CATALOG_TOPIC,
            EventEnvelope::new(routing::MENU_ITEM_CREATED, &event)?,
        )?;

        Ok(saved)
    }

    pub async fn get_menu_item(&self, id: &str) -> Result<MenuItem, DomainError> {
        match self.menu_items.find_by_id(id).await? {
            Some(item) => Ok(item),
            None => Err(DomainError::MenuItemNotFound(id.to_string())),
        }
    }

    pub async fn update_menu_item(
        &self,
        id: &str,
        mut changes: MenuItem,
    ) -> Result<MenuItem, DomainError> {
        let existing = self.get_menu_item(id).await?;
        changes.id = existing.id;
        changes.restaurant_id = existing.restaurant_id;
        changes.popularity = existing.popularity;
        changes.validate()?;
        self.menu_items.update(&changes).await
    }

    pub async fn remove_menu_item(&self, id: &str) -> Result<(), DomainError> {
        self.get_menu_item(id).await?;
        self.menu_items.delete(id).await
    }

    pub async fn menu_for_restaurant(
        &self,
        restaurant_id: &str,
        only_available: bool,
    ) -> Result<Vec<MenuItem>, DomainError> {
        self.get_restaurant(restaurant_id).await?;
        self.menu_items
            .find_by_restaurant(restaurant_id, only_available)
            .await
    }

    pub async fn search_menu_items(
        &self,
        query: &MenuItemQuery,
    ) -> Result<Vec<MenuItem>, DomainError> {
        self.menu_items.search(query).await
    }

    /// Consumes an order-created event and bumps each referenced item's
    /// popularity counter by the ordered quantity. Unknown item references
    /// are skipped rather than failing the whole delivery.
    pub async fn apply_order_created(&self, event: &OrderCreated) -> Result<(), DomainError> {
        for line in &event.items {
            if self
                .menu_items
                .find_by_id(&line.menu_item_id)
                .await?
                .is_some()
            {
                self.menu_items
                    .bump_popularity(&line.menu_item_id, line.quantity as i64)
                    .await?;
            }
        }
        Ok(())
    }
}
