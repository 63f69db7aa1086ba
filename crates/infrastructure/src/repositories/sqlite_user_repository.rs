use crate::database::{users, SqlitePool};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use domain::{DomainError, User, UserRepository};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct UserModel {
    id: String,
    email: String,
    password_hash: String,
    name: String,
    phone: Option<String>,
    role: String,
    is_active: bool,
    addresses: String,
    preferences: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: Some(model.id),
            email: model.email,
            password_hash: model.password_hash,
            name: model.name,
            phone: model.phone,
            role: model.role.parse()?,
            is_active: model.is_active,
            addresses: serde_json::from_str(&model.addresses)?,
            preferences: serde_json::from_str(&model.preferences)?,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }
}

fn to_model(user: &User, id: String) -> Result<UserModel, DomainError> {
    Ok(UserModel {
        id,
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        role: user.role.as_str().to_string(),
        is_active: user.is_active,
        addresses: serde_json::to_string(&user.addresses)?,
        preferences: serde_json::to_string(&user.preferences)?,
        created_at: user.created_at.naive_utc(),
        updated_at: user.updated_at.naive_utc(),
    })
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
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
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::id.eq(id))
                .select(UserModel::as_select())
                .first::<UserModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.conn()?;

        let email = email.to_string();
        let result = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::email.eq(email))
                .select(UserModel::as_select())
                .first::<UserModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn()?;

        let email = email.to_string();
        let count: i64 = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::email.eq(email))
                .count()
                .get_result(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn save(&self, user: &User) -> Result<User, DomainError> {
        let mut conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let model = to_model(user, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::insert_into(users::table)
                .values(&model)
                .execute(&mut conn)?;

            users::table
                .filter(users::id.eq(id))
                .select(UserModel::as_select())
                .first::<UserModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let id = user
            .id
            .clone()
            .ok_or_else(|| DomainError::Validation("User ID is required for updates".to_string()))?;

        let mut conn = self.conn()?;
        let model = to_model(user, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::update(users::table.filter(users::id.eq(&id)))
                .set(&model)
                .execute(&mut conn)?;

            users::table
                .filter(users::id.eq(&id))
                .select(UserModel::as_select())
                .first::<UserModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }
}
