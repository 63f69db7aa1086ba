use crate::database::{payment_methods, payments, refunds, SqlitePool};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use domain::{
    DomainError, Payment, PaymentMethodRepository, PaymentRepository, PaymentStatus, Refund,
    SavedPaymentMethod,
};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct PaymentModel {
    id: String,
    order_id: String,
    user_id: String,
    amount: f64,
    currency: String,
    status: String,
    method: String,
    transaction_id: String,
    gateway_metadata: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<PaymentModel> for Payment {
    type Error = DomainError;

    fn try_from(model: PaymentModel) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: Some(model.id),
            order_id: model.order_id,
            user_id: model.user_id,
            amount: model.amount,
            currency: model.currency,
            status: model.status.parse()?,
            method: model.method.parse()?,
            transaction_id: model.transaction_id,
            gateway_metadata: model
                .gateway_metadata
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }
}

fn to_payment_model(payment: &Payment, id: String) -> Result<PaymentModel, DomainError> {
    Ok(PaymentModel {
        id,
        order_id: payment.order_id.clone(),
        user_id: payment.user_id.clone(),
        amount: payment.amount,
        currency: payment.currency.clone(),
        status: payment.status.as_str().to_string(),
        method: payment.method.as_str().to_string(),
        transaction_id: payment.transaction_id.clone(),
        gateway_metadata: payment
            .gateway_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        created_at: payment.created_at.naive_utc(),
        updated_at: payment.updated_at.naive_utc(),
    })
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = refunds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct RefundModel {
    id: String,
    payment_id: String,
    amount: f64,
    reason: Option<String>,
    status: String,
    created_at: NaiveDateTime,
}

impl TryFrom<RefundModel> for Refund {
    type Error = DomainError;

    fn try_from(model: RefundModel) -> Result<Self, Self::Error> {
        Ok(Refund {
            id: Some(model.id),
            payment_id: model.payment_id,
            amount: model.amount,
            reason: model.reason,
            status: model.status.parse()?,
            created_at: model.created_at.and_utc(),
        })
    }
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = payment_methods)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct PaymentMethodModel {
    id: String,
    user_id: String,
    kind: String,
    label: Option<String>,
    last_four: Option<String>,
    is_default: bool,
    created_at: NaiveDateTime,
}

impl TryFrom<PaymentMethodModel> for SavedPaymentMethod {
    type Error = DomainError;

    fn try_from(model: PaymentMethodModel) -> Result<Self, Self::Error> {
        Ok(SavedPaymentMethod {
            id: Some(model.id),
            user_id: model.user_id,
            kind: model.kind.parse()?,
            label: model.label,
            last_four: model.last_four,
            is_default: model.is_default,
            created_at: model.created_at.and_utc(),
        })
    }
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
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
impl PaymentRepository for SqlitePaymentRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            payments::table
                .filter(payments::id.eq(id))
                .select(PaymentModel::as_select())
                .first::<PaymentModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let mut conn = self.conn()?;

        let transaction_id = transaction_id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            payments::table
                .filter(payments::transaction_id.eq(transaction_id))
                .select(PaymentModel::as_select())
                .first::<PaymentModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn find_captured_by_order(
        &self,
        order_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let mut conn = self.conn()?;

        let order_id = order_id.to_string();
        let captured = vec![
            PaymentStatus::Completed.as_str().to_string(),
            PaymentStatus::PartiallyRefunded.as_str().to_string(),
        ];
        let result = tokio::task::spawn_blocking(move || {
            payments::table
                .filter(payments::order_id.eq(order_id))
                .filter(payments::status.eq_any(captured))
                .select(PaymentModel::as_select())
                .first::<PaymentModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn save(&self, payment: &Payment) -> Result<Payment, DomainError> {
        let mut conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let model = to_payment_model(payment, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::insert_into(payments::table)
                .values(&model)
                .execute(&mut conn)?;

            payments::table
                .filter(payments::id.eq(id))
                .select(PaymentModel::as_select())
                .first::<PaymentModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, DomainError> {
        let id = payment.id.clone().ok_or_else(|| {
            DomainError::Validation("Payment ID is required for updates".to_string())
        })?;

        let mut conn = self.conn()?;
        let model = to_payment_model(payment, id.clone())?;

        let result = tokio::task::spawn_blocking(move || {
            diesel::update(payments::table.filter(payments::id.eq(&id)))
                .set(&model)
                .execute(&mut conn)?;

            payments::table
                .filter(payments::id.eq(&id))
                .select(PaymentModel::as_select())
                .first::<PaymentModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn add_refund(&self, refund: &Refund) -> Result<Refund, DomainError> {
        let mut conn = self.conn()?;

        let id = refund
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let model = RefundModel {
            id: id.clone(),
            payment_id: refund.payment_id.clone(),
            amount: refund.amount,
            reason: refund.reason.clone(),
            status: refund.status.as_str().to_string(),
            created_at: refund.created_at.naive_utc(),
        };

        let result = tokio::task::spawn_blocking(move || {
            diesel::insert_into(refunds::table)
                .values(&model)
                .execute(&mut conn)?;

            refunds::table
                .filter(refunds::id.eq(id))
                .select(RefundModel::as_select())
                .first::<RefundModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn refunds_for(&self, payment_id: &str) -> Result<Vec<Refund>, DomainError> {
        let mut conn = self.conn()?;

        let payment_id = payment_id.to_string();
        let models = tokio::task::spawn_blocking(move || {
            refunds::table
                .filter(refunds::payment_id.eq(payment_id))
                .order(refunds::created_at.asc())
                .select(RefundModel::as_select())
                .load::<RefundModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }
}

pub struct SqlitePaymentMethodRepository {
    pool: SqlitePool,
}

impl SqlitePaymentMethodRepository {
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
impl PaymentMethodRepository for SqlitePaymentMethodRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<SavedPaymentMethod>, DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || {
            payment_methods::table
                .filter(payment_methods::id.eq(id))
                .select(PaymentMethodModel::as_select())
                .first::<PaymentMethodModel>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.map(TryInto::try_into).transpose()
    }

    async fn save(
        &self,
        method: &SavedPaymentMethod,
    ) -> Result<SavedPaymentMethod, DomainError> {
        let mut conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let model = PaymentMethodModel {
            id: id.clone(),
            user_id: method.user_id.clone(),
            kind: method.kind.as_str().to_string(),
            label: method.label.clone(),
            last_four: method.last_four.clone(),
            is_default: method.is_default,
            created_at: method.created_at.naive_utc(),
        };

        let result = tokio::task::spawn_blocking(move || {
            diesel::insert_into(payment_methods::table)
                .values(&model)
                .execute(&mut conn)?;

            payment_methods::table
                .filter(payment_methods::id.eq(id))
                .select(PaymentMethodModel::as_select())
                .first::<PaymentMethodModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        result.try_into()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<SavedPaymentMethod>, DomainError> {
        let mut conn = self.conn()?;

        let user_id = user_id.to_string();
        let models = tokio::task::spawn_blocking(move || {
            payment_methods::table
                .filter(payment_methods::user_id.eq(user_id))
                .order(payment_methods::created_at.asc())
                .select(PaymentMethodModel::as_select())
                .load::<PaymentMethodModel>(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn()?;

        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            diesel::delete(payment_methods::table.filter(payment_methods::id.eq(id)))
                .execute(&mut conn)
        })
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}
