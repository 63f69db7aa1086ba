//! Cross-service event flow, driven through the in-memory broker exactly the
//! way the service binaries wire it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use application::{drain, MAX_DELIVERY_ATTEMPTS};
use domain::*;
use infrastructure::*;

fn sample_address() -> Address {
    Address {
        street: "1 Market St".to_string(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        zip_code: "94105".to_string(),
        country: "USA".to_string(),
        latitude: None,
        longitude: None,
    }
}

fn catalog_service(broker: &Arc<InMemoryBroker>) -> Arc<CatalogService> {
    Arc::new(CatalogService::new(
        Arc::new(MemoryRestaurantRepository::new()),
        Arc::new(MemoryMenuItemRepository::new()),
        Arc::clone(broker) as Arc<dyn EventPublisher>,
    ))
}

fn order_service(broker: &Arc<InMemoryBroker>) -> Arc<OrderService> {
    Arc::new(OrderService::new(
        Arc::new(MemoryOrderRepository::new()),
        Arc::clone(broker) as Arc<dyn EventPublisher>,
    ))
}

fn payment_service(broker: &Arc<InMemoryBroker>) -> Arc<PaymentService> {
    Arc::new(PaymentService::new(
        Arc::new(MemoryPaymentRepository::new()),
        Arc::new(MemoryPaymentMethodRepository::new()),
        Arc::clone(broker) as Arc<dyn EventPublisher>,
    ))
}

#[tokio::test]
async fn order_created_event_bumps_popularity_by_quantity() {
    let broker = Arc::new(InMemoryBroker::new());
    let subscription =
        broker.bind_queue(ORDER_TOPIC, "catalog.popularity", routing::ORDER_CREATED);

    let catalog = catalog_service(&broker);
    let restaurant = catalog
        .create_restaurant(Restaurant::new("Noodle Bar".to_string(), sample_address()))
        .await
        .unwrap();
    let restaurant_id = restaurant.id.unwrap();

    let ramen = catalog
        .add_menu_item(MenuItem::new(
            restaurant_id.clone(),
            "Ramen".to_string(),
            12.0,
        ))
        .await
        .unwrap();
    let gyoza = catalog
        .add_menu_item(MenuItem::new(
            restaurant_id.clone(),
            "Gyoza".to_string(),
            6.0,
        ))
        .await
        .unwrap();

    let orders = order_service(&broker);
    let mut order = Order::new("u-1".to_string(), restaurant_id, 42.0);
    order.items.push(OrderItem::new(
        ramen.id.clone().unwrap(),
        "Ramen".to_string(),
        12.0,
        3,
    ));
    order.items.push(OrderItem::new(
        gyoza.id.clone().unwrap(),
        "Gyoza".to_string(),
        6.0,
        1,
    ));
    orders.create_order(order).await.unwrap();

    let consumer = Arc::clone(&catalog);
    let handler = move |envelope: EventEnvelope| {
        let consumer = Arc::clone(&consumer);
        async move {
            let event: OrderCreated = envelope.decode()?;
            consumer.apply_order_created(&event).await
        }
    };
    assert_eq!(drain(&subscription, &handler).await, 1);

    let ramen = catalog.get_menu_item(&ramen.id.unwrap()).await.unwrap();
    let gyoza = catalog.get_menu_item(&gyoza.id.unwrap()).await.unwrap();
    assert_eq!(ramen.popularity, 3);
    assert_eq!(gyoza.popularity, 1);
}

#[tokio::test]
async fn payment_completed_event_confirms_pending_order() {
    let broker = Arc::new(InMemoryBroker::new());
    let subscription = broker.bind_queue(ORDER_TOPIC, "order.payments", "payment.*");

    let orders = order_service(&broker);
    let mut order = Order::new("u-1".to_string(), "r-1".to_string(), 30.0);
    order.items.push(OrderItem::new(
        "m-1".to_string(),
        "Ramen".to_string(),
        15.0,
        2,
    ));
    let order = orders.create_order(order).await.unwrap();
    let order_id = order.id.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let payments = payment_service(&broker);
    payments
        .process_payment(Payment::new(
            order_id.clone(),
            "u-1".to_string(),
            30.0,
            PaymentMethodKind::CreditCard,
            String::new(),
        ))
        .await
        .unwrap();

    let consumer = Arc::clone(&orders);
    let handler = move |envelope: EventEnvelope| {
        let consumer = Arc::clone(&consumer);
        async move {
            match envelope.routing_key.as_str() {
                routing::PAYMENT_COMPLETED => {
                    let event: PaymentCompleted = envelope.decode()?;
                    consumer.apply_payment_completed(&event).await
                }
                routing::PAYMENT_REFUNDED => {
                    let event: PaymentRefunded = envelope.decode()?;
                    consumer.apply_payment_refunded(&event).await
                }
                _ => Ok(()),
            }
        }
    };
    assert_eq!(drain(&subscription, &handler).await, 1);

    let order = orders.get_order(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);

    let events = orders.events_for(&order_id).await.unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type == OrderEventType::PaymentProcessed));
}

#[tokio::test]
async fn failing_handler_is_retried_then_dropped() {
    let broker = Arc::new(InMemoryBroker::new());
    let subscription = broker.bind_queue(ORDER_TOPIC, "order.payments", "payment.*");

    let payments = payment_service(&broker);
    payments
        .process_payment(Payment::new(
            "o-1".to_string(),
            "u-1".to_string(),
            10.0,
            PaymentMethodKind::Paypal,
            String::new(),
        ))
        .await
        .unwrap();

    let attempts = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&attempts);
    let handler = move |_envelope: EventEnvelope| {
        let seen = Arc::clone(&seen);
        async move {
            seen.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Repository("store offline".to_string()))
        }
    };

    // One drain per redelivery; the event dies on the final attempt.
    for _ in 0..MAX_DELIVERY_ATTEMPTS {
        assert_eq!(drain(&subscription, &handler).await, 0);
    }

    assert_eq!(attempts.load(Ordering::SeqCst), MAX_DELIVERY_ATTEMPTS);
    assert!(subscription.is_empty());
}
