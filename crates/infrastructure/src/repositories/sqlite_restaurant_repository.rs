use crate::database::{restaurants, SqlitePool};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use domain::{Address, DomainError, Restaurant, RestaurantRepository};

// Database model - separate from domain entity. Embedded value objects
// (address, opening hours, delivery info) are stored as JSON documents.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct RestaurantModel {
    id: String,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    address: String,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    cuisine_types: String,
    opening_hours: Option<String>,
    delivery_info: Option<String>,
    rating: Option<f64>,
    review_count: i32,
    is_active: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<RestaurantModel> for Restaurant {
    type Error = DomainError;

    fn try_from(model: RestaurantModel) -> Result<Self, Self::Error> {
        let address: Address = serde_json::from_str(&model.address)?;
        let cuisine_types: Vec<String> = serde_json::from_str(&model.cuisine_types)?;
        let opening_hours = model
            .opening_hours
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let delivery_info = model
            .delivery_info
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Restaurant {
            id: Some(model.id),
            name: model.name,
            description: model.description,
            image_url: model.image_url,
            address,
            phone: model.phone,
            email: model.email,
            website: model.website,
            cuisine_types,
            opening_hours,
            delivery_info,
            rating: model.rating,
            review_count: model.review_count,
            is_active: model.is_active,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }
}

fn to_model(restaurant: &Restaurant, id: String) -> Result<RestaurantModel, DomainError> {
    Ok(RestaurantModel {
        id,
        name: restaurant.name.clone(),
        description: restaurant.description.clone(),
        image_url: restaurant.image_url.clone(),
        address: serde_json::to_string(&restaurant.address)?,
        phone: restaurant.phone.clone(),
        email: restaurant.email.clone(),
        website: restaurant.website.clone(),
        cuisine_types: serde_json::to_string(&restaurant.cuisine_types)?,
        opening_hours: restaurant
            .opening_hours
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        delivery_info: restaurant
            .delivery_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        rating: restaurant.rating,
        review_count: restaurant.review_count,
        is_active: restaurant.is_active,
        created_at: restaurant.created_at.naive_utc(),
        updated_at: restaurant.updated_at.naive_utc(),
    })
}

pub struct SqliteRestaurantRepository {
    pool: SqlitePool,
}

impl SqliteRestaurantRepository {
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

    /// Active restaurants, loaded for the queries that filter on embedded
    /// JSON documents in Rust.
    async fn load_active(&self) -> Result<Vec<Restaurant>, DomainError> {
        let mut conn = self.conn()?;

        let models = tokio::task::spawn_blocking(move || {
            restaurants::table
                .filter(restaurants::is_active.eq(true))
                .select(RestaurantModel::as_select())
                .load::<RestaurantModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl RestaurantRepository for SqliteRestaurantRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>, DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            restaurants::table
                .filter(restaurants::id.eq(id))
                .select(RestaurantModel::as_select())
                .first::<RestaurantModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, DomainError> {
        let mut conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let model = to_model(restaurant, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::insert_into(restaurants::table)
                .values(&model)
                .execute(&mut conn)?;

            restaurants::table
                .filter(restaurants::id.eq(id))
                .select(RestaurantModel::as_select())
                .first::<RestaurantModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<Restaurant, DomainError> {
        let id = restaurant.id.clone().ok_or_else(|| {
            DomainError::Validation("Restaurant ID is required for updates".to_string())
        })?;

        let mut conn = self.conn()?;
        let model = to_model(restaurant, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::update(restaurants::table.filter(restaurants::id.eq(&id)))
                .set(&model)
                .execute(&mut conn)?;

            restaurants::table
                .filter(restaurants::id.eq(&id))
                .select(RestaurantModel::as_select())
                .first::<RestaurantModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn find_active(&self, offset: i64, limit: i64) -> Result<Vec<Restaurant>, DomainError> {
        let mut conn = self.conn()?;

        let models = tokio::task::spawn_blocking(move || {
            restaurants::table
                .filter(restaurants::is_active.eq(true))
                .order(restaurants::name.asc())
                .offset(offset)
                .limit(limit)
                .select(RestaurantModel::as_select())
                .load::<RestaurantModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    async fn search(&self, term: &str) -> Result<Vec<Restaurant>, DomainError> {
        let mut conn = self.conn()?;

        let pattern = format!("%{}%", term);
        let models = tokio::task::spawn_blocking(move || {
            restaurants::table
                .filter(restaurants::is_active.eq(true))
                .filter(
                    restaurants::name
                        .like(pattern.clone())
                        .or(restaurants::description.like(pattern)),
                )
                .select(RestaurantModel::as_select())
                .load::<RestaurantModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>, DomainError> {
        // cuisine_types lives inside the JSON document, so filter after load
        let restaurants = self.load_active().await?;
        Ok(restaurants
            .into_iter()
            .filter(|r| {
                r.cuisine_types
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(cuisine))
            })
            .collect())
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<Restaurant>, DomainError> {
        let restaurants = self.load_active().await?;
        Ok(restaurants
            .into_iter()
            .filter(|r| r.address.city.eq_ignore_ascii_case(city))
            .collect())
    }

    async fn find_by_min_rating(&self, min_rating: f64) -> Result<Vec<Restaurant>, DomainError> {
        let mut conn = self.conn()?;

        let models = tokio::task::spawn_blocking(move || {
            restaurants::table
                .filter(restaurants::is_active.eq(true))
                .filter(restaurants::rating.ge(min_rating))
                .select(RestaurantModel::as_select())
                .load::<RestaurantModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_cuisines(&self, cuisines: &[String]) -> Result<Vec<Restaurant>, DomainError> {
        let restaurants = self.load_active().await?;
        Ok(restaurants
            .into_iter()
            .filter(|r| {
                r.cuisine_types.iter().any(|have| {
                    cuisines.iter().any(|want| want.eq_ignore_ascii_case(have))
                })
            })
            .collect())
    }
}
