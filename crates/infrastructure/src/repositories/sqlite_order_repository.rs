use crate::database::{order_events, order_items, orders, SqlitePool};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use domain::{
    DeliveryAddress, DomainError, Order, OrderAuditEvent, OrderCounts, OrderItem,
    OrderRepository, OrderStatus,
};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct OrderModel {
    id: String,
    user_id: String,
    restaurant_id: String,
    status: String,
    total_amount: f64,
    delivery_fee: f64,
    tax_amount: f64,
    delivery_address: Option<String>,
    special_instructions: Option<String>,
    estimated_delivery_time: Option<NaiveDateTime>,
    actual_delivery_time: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct OrderItemModel {
    id: String,
    order_id: String,
    menu_item_id: String,
    name: String,
    description: Option<String>,
    price: f64,
    quantity: i32,
    special_instructions: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = order_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct OrderEventModel {
    id: String,
    order_id: String,
    event_type: String,
    description: String,
    metadata: Option<String>,
    created_at: NaiveDateTime,
}

fn order_from_models(
    model: OrderModel,
    items: Vec<OrderItemModel>,
) -> Result<Order, DomainError> {
    let status: OrderStatus = model.status.parse()?;
    let delivery_address: Option<DeliveryAddress> = model
        .delivery_address
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    Ok(Order {
        id: Some(model.id),
        user_id: model.user_id,
        restaurant_id: model.restaurant_id,
        status,
        total_amount: model.total_amount,
        delivery_fee: model.delivery_fee,
        tax_amount: model.tax_amount,
        delivery_address,
        special_instructions: model.special_instructions,
        estimated_delivery_time: model.estimated_delivery_time.map(|t| t.and_utc()),
        actual_delivery_time: model.actual_delivery_time.map(|t| t.and_utc()),
        items: items
            .into_iter()
            .map(|item| OrderItem {
                id: Some(item.id),
                menu_item_id: item.menu_item_id,
                name: item.name,
                description: item.description,
                price: item.price,
                quantity: item.quantity,
                special_instructions: item.special_instructions,
            })
            .collect(),
        created_at: model.created_at.and_utc(),
        updated_at: model.updated_at.and_utc(),
    })
}

fn to_order_model(order: &Order, id: String) -> Result<OrderModel, DomainError> {
    Ok(OrderModel {
        id,
        user_id: order.user_id.clone(),
        restaurant_id: order.restaurant_id.clone(),
        status: order.status.as_str().to_string(),
        total_amount: order.total_amount,
        delivery_fee: order.delivery_fee,
        tax_amount: order.tax_amount,
        delivery_address: order
            .delivery_address
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        special_instructions: order.special_instructions.clone(),
        estimated_delivery_time: order.estimated_delivery_time.map(|t| t.naive_utc()),
        actual_delivery_time: order.actual_delivery_time.map(|t| t.naive_utc()),
        created_at: order.created_at.naive_utc(),
        updated_at: order.updated_at.naive_utc(),
    })
}

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<
        diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>,
        DomainError,
    > {
        self.pool
            .get()
            .map_err(|e| DomainError::Repository(e.to_string()))
    }

    /// Loads the line items for each order header in one follow-up query.
    async fn hydrate(&self, models: Vec<OrderModel>) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let items = tokio::task::spawn_blocking(move || {
            order_items::table
                .filter(order_items::order_id.eq_any(ids))
                .select(OrderItemModel::as_select())
                .load::<OrderItemModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let mut by_order: std::collections::HashMap<String, Vec<OrderItemModel>> =
            std::collections::HashMap::new();
        for item in items {
            by_order.entry(item.order_id.clone()).or_default().push(item);
        }

        models
            .into_iter()
            .map(|model| {
                let items = by_order.remove(&model.id).unwrap_or_default();
                order_from_models(model, items)
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let order = orders::table
                .filter(orders::id.eq(&id))
                .select(OrderModel::as_select())
                .first::<OrderModel>(&mut conn)
                .optional()?;

            match order {
                Some(order) => {
                    let items = order_items::table
                        .filter(order_items::order_id.eq(&id))
                        .select(OrderItemModel::as_select())
                        .load::<OrderItemModel>(&mut conn)?;
                    Ok(Some((order, items)))
                }
                None => diesel::QueryResult::Ok(None),
            }
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result
            .map(|(order, items)| order_from_models(order, items))
            .transpose()
    }

    async fn save(&self, order: &Order) -> Result<Order, DomainError> {
        let mut conn = self.conn()?;

        let order_id = uuid::Uuid::new_v4().to_string();
        let model = to_order_model(order, order_id.clone())?;
        let item_models: Vec<OrderItemModel> = order
            .items
            .iter()
            .map(|item| OrderItemModel {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                menu_item_id: item.menu_item_id.clone(),
                name: item.name.clone(),
                description: item.description.clone(),
                price: item.price,
                quantity: item.quantity,
                special_instructions: item.special_instructions.clone(),
            })
            .collect();

        let result = tokio::task::spawn_blocking(move || {
            conn.transaction(|conn| {
                diesel::insert_into(orders::table)
                    .values(&model)
                    .execute(conn)?;
                diesel::insert_into(order_items::table)
                    .values(&item_models)
                    .execute(conn)?;

                let order = orders::table
                    .filter(orders::id.eq(&order_id))
                    .select(OrderModel::as_select())
                    .first::<OrderModel>(conn)?;
                let items = order_items::table
                    .filter(order_items::order_id.eq(&order_id))
                    .select(OrderItemModel::as_select())
                    .load::<OrderItemModel>(conn)?;
                diesel::QueryResult::Ok((order, items))
            })
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let (order, items) = result;
        order_from_models(order, items)
    }

    async fn update(&self, order: &Order) -> Result<Order, DomainError> {
        let id = order.id.clone().ok_or_else(|| {
            DomainError::Validation("Order ID is required for updates".to_string())
        })?;

        let mut conn = self.conn()?;
        let model = to_order_model(order, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::update(orders::table.filter(orders::id.eq(&id)))
                .set(&model)
                .execute(&mut conn)?;

            let order = orders::table
                .filter(orders::id.eq(&id))
                .select(OrderModel::as_select())
                .first::<OrderModel>(&mut conn)?;
            let items = order_items::table
                .filter(order_items::order_id.eq(&id))
                .select(OrderItemModel::as_select())
                .load::<OrderItemModel>(&mut conn)?;
            diesel::QueryResult::Ok((order, items))
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let (order, items) = result;
        order_from_models(order, items)
    }

    async fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;

        let models = tokio::task::spawn_blocking(move || {
            orders::table
                .order(orders::created_at.desc())
                .select(OrderModel::as_select())
                .load::<OrderModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        self.hydrate(models).await
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;

        let user_id = user_id.to_string();
        let models = tokio::task::spawn_blocking(move || {
            orders::table
                .filter(orders::user_id.eq(user_id))
                .order(orders::created_at.desc())
                .select(OrderModel::as_select())
                .load::<OrderModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        self.hydrate(models).await
    }

    async fn find_by_restaurant(&self, restaurant_id: &str) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;

        let restaurant_id = restaurant_id.to_string();
        let models = tokio::task::spawn_blocking(move || {
            orders::table
                .filter(orders::restaurant_id.eq(restaurant_id))
                .order(orders::created_at.desc())
                .select(OrderModel::as_select())
                .load::<OrderModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        self.hydrate(models).await
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;

        let status = status.as_str().to_string();
        let models = tokio::task::spawn_blocking(move || {
            orders::table
                .filter(orders::status.eq(status))
                .order(orders::created_at.desc())
                .select(OrderModel::as_select())
                .load::<OrderModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        self.hydrate(models).await
    }

    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.conn()?;

        let since = since.naive_utc();
        let models = tokio::task::spawn_blocking(move || {
            orders::table
                .filter(orders::created_at.ge(since))
                .order(orders::created_at.desc())
                .select(OrderModel::as_select())
                .load::<OrderModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        self.hydrate(models).await
    }

    async fn counts(&self) -> Result<OrderCounts, DomainError> {
        let mut conn = self.conn()?;

        let counts = tokio::task::spawn_blocking(move || {
            let total: i64 = orders::table.count().get_result(&mut conn)?;
            let pending: i64 = orders::table
                .filter(orders::status.eq(OrderStatus::Pending.as_str()))
                .count()
                .get_result(&mut conn)?;
            let confirmed: i64 = orders::table
                .filter(orders::status.eq(OrderStatus::Confirmed.as_str()))
                .count()
                .get_result(&mut conn)?;
            let delivered: i64 = orders::table
                .filter(orders::status.eq(OrderStatus::Delivered.as_str()))
                .count()
                .get_result(&mut conn)?;
            diesel::QueryResult::Ok(OrderCounts {
                total,
                pending,
                confirmed,
                delivered,
            })
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(counts)
    }

    async fn append_event(
        &self,
        order_id: &str,
        event: &OrderAuditEvent,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn()?;

        let model = OrderEventModel {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            event_type: event.event_type.as_str().to_string(),
            description: event.description.clone(),
            metadata: event.metadata.clone(),
            created_at: event.created_at.naive_utc(),
        };

        tokio::task::spawn_blocking(move || {
            diesel::insert_into(order_events::table)
                .values(&model)
                .execute(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn events_for(&self, order_id: &str) -> Result<Vec<OrderAuditEvent>, DomainError> {
        let mut conn = self.conn()?;

        let order_id = order_id.to_string();
        let models = tokio::task::spawn_blocking(move || {
            order_events::table
                .filter(order_events::order_id.eq(order_id))
                .order(order_events::created_at.asc())
                .select(OrderEventModel::as_select())
                .load::<OrderEventModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models
            .into_iter()
            .map(|model| {
                Ok(OrderAuditEvent {
                    id: Some(model.id),
                    event_type: model.event_type.parse()?,
                    description: model.description,
                    metadata: model.metadata,
                    created_at: model.created_at.and_utc(),
                })
            })
            .collect()
    }
}
