//! In-memory repository implementations.
//!
//! Same contracts as the SQLite repositories, backed by `RwLock`ed maps.
//! Used by the test suites and anywhere a throwaway store is good enough.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    DomainError, MenuItem, MenuItemQuery, MenuItemRepository, Order, OrderAuditEvent,
    OrderCounts, OrderRepository, OrderStatus, Payment, PaymentMethodRepository,
    PaymentRepository, PaymentStatus, Refund, Restaurant, RestaurantRepository,
    SavedPaymentMethod, User, UserRepository,
};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Default)]
pub struct MemoryRestaurantRepository {
    rows: RwLock<HashMap<String, Restaurant>>,
}

impl MemoryRestaurantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> Vec<Restaurant> {
        let mut rows: Vec<Restaurant> = self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }
}

#[async_trait]
impl RestaurantRepository for MemoryRestaurantRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>, DomainError> {
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, DomainError> {
        let mut restaurant = restaurant.clone();
        let id = new_id();
        restaurant.id = Some(id.clone());
        self.rows.write().unwrap().insert(id, restaurant.clone());
        Ok(restaurant)
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<Restaurant, DomainError> {
        let id = restaurant.id.clone().ok_or_else(|| {
            DomainError::Validation("Restaurant ID is required for updates".to_string())
        })?;
        self.rows.write().unwrap().insert(id, restaurant.clone());
        Ok(restaurant.clone())
    }

    async fn find_active(&self, offset: i64, limit: i64) -> Result<Vec<Restaurant>, DomainError> {
        Ok(self
            .active()
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Restaurant>, DomainError> {
        let term = term.to_lowercase();
        Ok(self
            .active()
            .into_iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&term)
                    || r.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&term))
                        .unwrap_or(false)
            })
            .collect())
    }

    async fn find_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>, DomainError> {
        Ok(self
            .active()
            .into_iter()
            .filter(|r| {
                r.cuisine_types
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(cuisine))
            })
            .collect())
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<Restaurant>, DomainError> {
        Ok(self
            .active()
            .into_iter()
            .filter(|r| r.address.city.eq_ignore_ascii_case(city))
            .collect())
    }

    async fn find_by_min_rating(&self, min_rating: f64) -> Result<Vec<Restaurant>, DomainError> {
        Ok(self
            .active()
            .into_iter()
            .filter(|r| r.rating.map(|rating| rating >= min_rating).unwrap_or(false))
            .collect())
    }

    async fn find_by_cuisines(&self, cuisines: &[String]) -> Result<Vec<Restaurant>, DomainError> {
        Ok(self
            .active()
            .into_iter()
            .filter(|r| {
                r.cuisine_types.iter().any(|have| {
                    cuisines.iter().any(|want| want.eq_ignore_ascii_case(have))
                })
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryMenuItemRepository {
    rows: RwLock<HashMap<String, MenuItem>>,
}

impl MemoryMenuItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuItemRepository for MemoryMenuItemRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn save(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let mut item = item.clone();
        let id = new_id();
        item.id = Some(id.clone());
        self.rows.write().unwrap().insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let id = item.id.clone().ok_or_else(|| {
            DomainError::Validation("Menu item ID is required for updates".to_string())
        })?;
        self.rows.write().unwrap().insert(id, item.clone());
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.rows.write().unwrap().remove(id);
        Ok(())
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: &str,
        only_available: bool,
    ) -> Result<Vec<MenuItem>, DomainError> {
        let mut items: Vec<MenuItem> = self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|item| item.restaurant_id == restaurant_id)
            .filter(|item| !only_available || item.is_available)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn search(&self, query: &MenuItemQuery) -> Result<Vec<MenuItem>, DomainError> {
        let mut items: Vec<MenuItem> = self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|item| item.is_available)
            .filter(|item| {
                query
                    .category
                    .as_deref()
                    .map(|c| item.category.as_deref() == Some(c))
                    .unwrap_or(true)
            })
            .filter(|item| query.max_price.map(|p| item.price <= p).unwrap_or(true))
            .filter(|item| {
                query
                    .exclude_allergen
                    .as_deref()
                    .map(|a| !item.contains_allergen(a))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn bump_popularity(&self, id: &str, by: i64) -> Result<(), DomainError> {
        if let Some(item) = self.rows.write().unwrap().get_mut(id) {
            item.popularity += by;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOrderRepository {
    rows: RwLock<HashMap<String, Order>>,
    events: RwLock<HashMap<String, Vec<OrderAuditEvent>>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn save(&self, order: &Order) -> Result<Order, DomainError> {
        let mut order = order.clone();
        let id = new_id();
        order.id = Some(id.clone());
        for item in &mut order.items {
            item.id = Some(new_id());
        }
        self.rows.write().unwrap().insert(id, order.clone());
        Ok(order)
    }

    async fn update(&self, order: &Order) -> Result<Order, DomainError> {
        let id = order.id.clone().ok_or_else(|| {
            DomainError::Validation("Order ID is required for updates".to_string())
        })?;
        self.rows.write().unwrap().insert(id, order.clone());
        Ok(order.clone())
    }

    async fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(Self::sorted_desc(
            self.rows.read().unwrap().values().cloned().collect(),
        ))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        Ok(Self::sorted_desc(
            self.rows
                .read()
                .unwrap()
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<Order>, DomainError> {
        Ok(Self::sorted_desc(
            self.rows
                .read()
                .unwrap()
                .values()
                .filter(|o| o.restaurant_id == restaurant_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        Ok(Self::sorted_desc(
            self.rows
                .read()
                .unwrap()
                .values()
                .filter(|o| o.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>, DomainError> {
        Ok(Self::sorted_desc(
            self.rows
                .read()
                .unwrap()
                .values()
                .filter(|o| o.created_at >= since)
                .cloned()
                .collect(),
        ))
    }

    async fn counts(&self) -> Result<OrderCounts, DomainError> {
        let rows = self.rows.read().unwrap();
        let count_status = |status: OrderStatus| -> i64 {
            rows.values().filter(|o| o.status == status).count() as i64
        };
        Ok(OrderCounts {
            total: rows.len() as i64,
            pending: count_status(OrderStatus::Pending),
            confirmed: count_status(OrderStatus::Confirmed),
            delivered: count_status(OrderStatus::Delivered),
        })
    }

    async fn append_event(
        &self,
        order_id: &str,
        event: &OrderAuditEvent,
    ) -> Result<(), DomainError> {
        let mut event = event.clone();
        event.id = Some(new_id());
        self.events
            .write()
            .unwrap()
            .entry(order_id.to_string())
            .or_default()
            .push(event);
        Ok(())
    }

    async fn events_for(&self, order_id: &str) -> Result<Vec<OrderAuditEvent>, DomainError> {
        Ok(self
            .events
            .read()
            .unwrap()
            .get(order_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryPaymentRepository {
    rows: RwLock<HashMap<String, Payment>>,
    refunds: RwLock<HashMap<String, Vec<Refund>>>,
}

impl MemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, DomainError> {
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .find(|p| p.transaction_id == transaction_id)
            .cloned())
    }

    async fn find_captured_by_order(
        &self,
        order_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .find(|p| {
                p.order_id == order_id
                    && matches!(
                        p.status,
                        PaymentStatus::Completed | PaymentStatus::PartiallyRefunded
                    )
            })
            .cloned())
    }

    async fn save(&self, payment: &Payment) -> Result<Payment, DomainError> {
        let mut payment = payment.clone();
        let id = new_id();
        payment.id = Some(id.clone());
        self.rows.write().unwrap().insert(id, payment.clone());
        Ok(payment)
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, DomainError> {
        let id = payment.id.clone().ok_or_else(|| {
            DomainError::Validation("Payment ID is required for updates".to_string())
        })?;
        self.rows.write().unwrap().insert(id, payment.clone());
        Ok(payment.clone())
    }

    async fn add_refund(&self, refund: &Refund) -> Result<Refund, DomainError> {
        let mut refund = refund.clone();
        if refund.id.is_none() {
            refund.id = Some(new_id());
        }
        self.refunds
            .write()
            .unwrap()
            .entry(refund.payment_id.clone())
            .or_default()
            .push(refund.clone());
        Ok(refund)
    }

    async fn refunds_for(&self, payment_id: &str) -> Result<Vec<Refund>, DomainError> {
        Ok(self
            .refunds
            .read()
            .unwrap()
            .get(payment_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryPaymentMethodRepository {
    rows: RwLock<HashMap<String, SavedPaymentMethod>>,
}

impl MemoryPaymentMethodRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentMethodRepository for MemoryPaymentMethodRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<SavedPaymentMethod>, DomainError> {
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn save(
        &self,
        method: &SavedPaymentMethod,
    ) -> Result<SavedPaymentMethod, DomainError> {
        let mut method = method.clone();
        let id = new_id();
        method.id = Some(id.clone());
        self.rows.write().unwrap().insert(id, method.clone());
        Ok(method)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<SavedPaymentMethod>, DomainError> {
        let mut methods: Vec<SavedPaymentMethod> = self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        methods.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(methods)
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.rows.write().unwrap().remove(id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn save(&self, user: &User) -> Result<User, DomainError> {
        let mut user = user.clone();
        let id = new_id();
        user.id = Some(id.clone());
        self.rows.write().unwrap().insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let id = user
            .id
            .clone()
            .ok_or_else(|| DomainError::Validation("User ID is required for updates".to_string()))?;
        self.rows.write().unwrap().insert(id, user.clone());
        Ok(user.clone())
    }
}
