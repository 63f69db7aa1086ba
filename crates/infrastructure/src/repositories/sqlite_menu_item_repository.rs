use crate::database::{menu_items, SqlitePool};
use async_trait::async_trait;
use diesel::prelude::*;
use domain::{DomainError, MenuItem, MenuItemQuery, MenuItemRepository};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct MenuItemModel {
    id: String,
    restaurant_id: String,
    name: String,
    description: Option<String>,
    price: f64,
    category: Option<String>,
    image_url: Option<String>,
    is_available: bool,
    ingredients: String,
    allergen_info: String,
    nutritional_info: Option<String>,
    popularity: i64,
}

impl TryFrom<MenuItemModel> for MenuItem {
    type Error = DomainError;

    fn try_from(model: MenuItemModel) -> Result<Self, Self::Error> {
        Ok(MenuItem {
            id: Some(model.id),
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
            is_available: model.is_available,
            ingredients: serde_json::from_str(&model.ingredients)?,
            allergen_info: serde_json::from_str(&model.allergen_info)?,
            nutritional_info: model
                .nutritional_info
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            popularity: model.popularity,
        })
    }
}

fn to_model(item: &MenuItem, id: String) -> Result<MenuItemModel, DomainError> {
    Ok(MenuItemModel {
        id,
        restaurant_id: item.restaurant_id.clone(),
        name: item.name.clone(),
        description: item.description.clone(),
        price: item.price,
        category: item.category.clone(),
        image_url: item.image_url.clone(),
        is_available: item.is_available,
        ingredients: serde_json::to_string(&item.ingredients)?,
        allergen_info: serde_json::to_string(&item.allergen_info)?,
        nutritional_info: item
            .nutritional_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        popularity: item.popularity,
    })
}

pub struct SqliteMenuItemRepository {
    pool: SqlitePool,
}

impl SqliteMenuItemRepository {
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
}

#[async_trait]
impl MenuItemRepository for SqliteMenuItemRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<MenuItem>, DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            menu_items::table
                .filter(menu_items::id.eq(id))
                .select(MenuItemModel::as_select())
                .first::<MenuItemModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn save(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let mut conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let model = to_model(item, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::insert_into(menu_items::table)
                .values(&model)
                .execute(&mut conn)?;

            menu_items::table
                .filter(menu_items::id.eq(id))
                .select(MenuItemModel::as_select())
                .first::<MenuItemModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn update(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let id = item.id.clone().ok_or_else(|| {
            DomainError::Validation("Menu item ID is required for updates".to_string())
        })?;

        let mut conn = self.conn()?;
        let model = to_model(item, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::update(menu_items::table.filter(menu_items::id.eq(&id)))
                .set(&model)
                .execute(&mut conn)?;

            menu_items::table
                .filter(menu_items::id.eq(&id))
                .select(MenuItemModel::as_select())
                .first::<MenuItemModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            diesel::delete(menu_items::table.filter(menu_items::id.eq(id))).execute(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: &str,
        only_available: bool,
    ) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.conn()?;

        let restaurant_id = restaurant_id.to_string();
        let models = tokio::task::spawn_blocking(move || {
            let mut query = menu_items::table
                .filter(menu_items::restaurant_id.eq(restaurant_id))
                .into_boxed();
            if only_available {
                query = query.filter(menu_items::is_available.eq(true));
            }
            query
                .order(menu_items::name.asc())
                .select(MenuItemModel::as_select())
                .load::<MenuItemModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    async fn search(&self, query: &MenuItemQuery) -> Result<Vec<MenuItem>, DomainError> {
        let mut conn = self.conn()?;

        let category = query.category.clone();
        let max_price = query.max_price;
        let models = tokio::task::spawn_blocking(move || {
            let mut sql = menu_items::table
                .filter(menu_items::is_available.eq(true))
                .into_boxed();
            if let Some(category) = category {
                sql = sql.filter(menu_items::category.eq(category));
            }
            if let Some(max_price) = max_price {
                sql = sql.filter(menu_items::price.le(max_price));
            }
            sql.order(menu_items::name.asc())
                .select(MenuItemModel::as_select())
                .load::<MenuItemModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        let items: Result<Vec<MenuItem>, DomainError> =
            models.into_iter().map(TryInto::try_into).collect();
        let mut items = items?;

        // Allergens live inside the JSON document, so exclusion is applied
        // after load.
        if let Some(allergen) = &query.exclude_allergen {
            items.retain(|item| !item.contains_allergen(allergen));
        }
        Ok(items)
    }

    async fn bump_popularity(&self, id: &str, by: i64) -> Result<(), DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            diesel::update(menu_items::table.filter(menu_items::id.eq(id)))
                .set(menu_items::popularity.eq(menu_items::popularity + by))
                .execute(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}
