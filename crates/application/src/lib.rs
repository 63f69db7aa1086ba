//! Per-service application wiring.
//!
//! Each app builds its repositories over its own database, hands them to the
//! domain services, and (where the service consumes cross-service events)
//! spawns the consumer loops against the broker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::*;
use infrastructure::*;
use tracing::{error, warn};

/// Deliveries are retried this many times before being dropped with a log
/// line. Dropping silently on first failure loses events.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Processes every delivery that is queued right now; requeued failures are
/// picked up on a later call. Returns how many deliveries were handled.
pub async fn drain<F, Fut>(subscription: &Subscription, handler: &F) -> usize
where
    F: Fn(EventEnvelope) -> Fut,
    Fut: Future<Output = Result<(), DomainError>>,
{
    let batch = subscription.len();
    let mut handled = 0;

    for _ in 0..batch {
        let Some(delivery) = subscription.try_next() else {
            break;
        };
        let attempt = delivery.attempt;
        let routing_key = delivery.event.routing_key.clone();

        match handler(delivery.event.clone()).await {
            Ok(()) => handled += 1,
            Err(e) if attempt < MAX_DELIVERY_ATTEMPTS => {
                warn!(
                    queue = subscription.name(),
                    routing_key, attempt, "event handler failed, requeueing: {}", e
                );
                subscription.requeue(delivery);
            }
            Err(e) => {
                error!(
                    queue = subscription.name(),
                    routing_key,
                    attempt,
                    "dropping event after {} attempts: {}",
                    MAX_DELIVERY_ATTEMPTS,
                    e
                );
            }
        }
    }
    handled
}

/// Runs `handler` against a bound queue for the lifetime of the process.
pub fn spawn_consumer<F, Fut>(
    subscription: Subscription,
    handler: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn(EventEnvelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send,
{
    tokio::spawn(async move {
        loop {
            if drain(&subscription, &handler).await == 0 {
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        }
    })
}

/// Catalog Application - restaurants, menu items and the popularity consumer
pub struct CatalogApp {
    pub catalog_service: Arc<CatalogService>,
}

impl CatalogApp {
    pub fn new(database_path: &str, publisher: Arc<dyn EventPublisher>) -> Self {
        // Infrastructure layer - database setup
        let database = Database::new(database_path);
        let pool = database.get_pool().clone();

        let restaurant_repository: Arc<dyn RestaurantRepository> =
            Arc::new(SqliteRestaurantRepository::new(pool.clone()));
        let menu_item_repository: Arc<dyn MenuItemRepository> =
            Arc::new(SqliteMenuItemRepository::new(pool));

        let catalog_service = Arc::new(CatalogService::new(
            restaurant_repository,
            menu_item_repository,
            publisher,
        ));

        Self { catalog_service }
    }

    /// Binds `catalog.popularity` to order-created events and bumps menu
    /// item popularity counters by the ordered quantities.
    pub fn start_popularity_consumer(
        &self,
        broker: &InMemoryBroker,
    ) -> tokio::task::JoinHandle<()> {
        let subscription =
            broker.bind_queue(ORDER_TOPIC, "catalog.popularity", routing::ORDER_CREATED);
        let service = Arc::clone(&self.catalog_service);

        spawn_consumer(subscription, move |envelope| {
            let service = Arc::clone(&service);
            async move {
                let event: OrderCreated = envelope.decode()?;
                service.apply_order_created(&event).await
            }
        })
    }
}

/// Order Application - order lifecycle plus the payment-events consumer
pub struct OrderApp {
    pub order_service: Arc<OrderService>,
}

impl OrderApp {
    pub fn new(database_path: &str, publisher: Arc<dyn EventPublisher>) -> Self {
        let database = Database::new(database_path);
        let pool = database.get_pool().clone();

        let order_repository: Arc<dyn OrderRepository> =
            Arc::new(SqliteOrderRepository::new(pool));

        let order_service = Arc::new(OrderService::new(order_repository, publisher));

        Self { order_service }
    }

    /// Binds `order.payments` to `payment.*`: captures confirm pending
    /// orders, refunds flip them to REFUNDED.
    pub fn start_payment_consumer(&self, broker: &InMemoryBroker) -> tokio::task::JoinHandle<()> {
        let subscription = broker.bind_queue(ORDER_TOPIC, "order.payments", "payment.*");
        let service = Arc::clone(&self.order_service);

        spawn_consumer(subscription, move |envelope| {
            let service = Arc::clone(&service);
            async move {
                match envelope.routing_key.as_str() {
                    routing::PAYMENT_COMPLETED => {
                        let event: PaymentCompleted = envelope.decode()?;
                        service.apply_payment_completed(&event).await
                    }
                    routing::PAYMENT_REFUNDED => {
                        let event: PaymentRefunded = envelope.decode()?;
                        service.apply_payment_refunded(&event).await
                    }
                    _ => Ok(()),
                }
            }
        })
    }
}

/// Payment Application
pub struct PaymentApp {
    pub payment_service: Arc<PaymentService>,
}

impl PaymentApp {
    pub fn new(database_path: &str, publisher: Arc<dyn EventPublisher>) -> Self {
        let database = Database::new(database_path);
        let pool = database.get_pool().clone();

        let payment_repository: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(pool.clone()));
        let method_repository: Arc<dyn PaymentMethodRepository> =
            Arc::new(SqlitePaymentMethodRepository::new(pool));

        let payment_service = Arc::new(PaymentService::new(
            payment_repository,
            method_repository,
            publisher,
        ));

        Self { payment_service }
    }
}

/// User Application
pub struct UserApp {
    pub user_service: Arc<UserService>,
}

impl UserApp {
    pub fn new(database_path: &str, tokens: AuthTokens) -> Self {
        let database = Database::new(database_path);
        let pool = database.get_pool().clone();

        let user_repository: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(pool));

        let user_service = Arc::new(UserService::new(user_repository, tokens));

        Self { user_service }
    }
}
