//! In-process topic broker for single-process deployments and tests.
//!
//! Mirrors the shape of an AMQP topic exchange: publishers address a topic
//! with a routing key, queues bind to a topic with a routing-key pattern
//! (`*` matches exactly one dot-separated segment, `#` matches the rest),
//! and every matching queue receives its own copy of the event.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use domain::{DomainError, EventEnvelope, EventPublisher};

/// A delivered event plus how many times it has been handed out.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: EventEnvelope,
    pub attempt: u32,
}

struct QueueInner {
    name: String,
    messages: Mutex<VecDeque<Delivery>>,
}

struct Binding {
    pattern: String,
    queue: Arc<QueueInner>,
}

#[derive(Default)]
pub struct InMemoryBroker {
    topics: RwLock<HashMap<String, Vec<Binding>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a queue bound to `topic` with a routing-key `pattern` and
    /// returns the consumer handle. Binding the same queue name twice
    /// creates an independent queue; consumers own their subscriptions.
    pub fn bind_queue(&self, topic: &str, queue: &str, pattern: &str) -> Subscription {
        let inner = Arc::new(QueueInner {
            name: queue.to_string(),
            messages: Mutex::new(VecDeque::new()),
        });

        let mut topics = self.topics.write().unwrap();
        topics.entry(topic.to_string()).or_default().push(Binding {
            pattern: pattern.to_string(),
            queue: Arc::clone(&inner),
        });

        Subscription { queue: inner }
    }
}

impl EventPublisher for InMemoryBroker {
    fn publish(&self, topic: &str, event: EventEnvelope) -> Result<(), DomainError> {
        let topics = self
            .topics
            .read()
            .map_err(|_| DomainError::Publish("broker lock poisoned".to_string()))?;

        if let Some(bindings) = topics.get(topic) {
            for binding in bindings {
                if matches_routing_key(&binding.pattern, &event.routing_key) {
                    binding
                        .queue
                        .messages
                        .lock()
                        .map_err(|_| DomainError::Publish("queue lock poisoned".to_string()))?
                        .push_back(Delivery {
                            event: event.clone(),
                            attempt: 1,
                        });
                }
            }
        }
        // Publishing to a topic with no matching binding simply drops the
        // event, as a topic exchange would.
        Ok(())
    }
}

/// Consumer handle for a bound queue.
pub struct Subscription {
    queue: Arc<QueueInner>,
}

impl Subscription {
    pub fn name(&self) -> &str {
        &self.queue.name
    }

    /// Pops the next delivery without blocking.
    pub fn try_next(&self) -> Option<Delivery> {
        self.queue.messages.lock().unwrap().pop_front()
    }

    /// Puts a failed delivery back at the tail with its attempt count bumped.
    pub fn requeue(&self, mut delivery: Delivery) {
        delivery.attempt += 1;
        self.queue.messages.lock().unwrap().push_back(delivery);
    }

    pub fn len(&self) -> usize {
        self.queue.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.messages.lock().unwrap().is_empty()
    }
}

/// AMQP-style topic matching over dot-separated routing keys.
fn matches_routing_key(pattern: &str, routing_key: &str) -> bool {
    fn matches(pattern: &[&str], key: &[&str]) -> bool {
        match (pattern.split_first(), key.split_first()) {
            (None, None) => true,
            (Some((&"#", rest)), _) => {
                // '#' absorbs zero or more segments
                rest.is_empty()
                    || (0..=key.len()).any(|skip| matches(rest, &key[skip..]))
            }
            (Some((&"*", p_rest)), Some((_, k_rest))) => matches(p_rest, k_rest),
            (Some((&p, p_rest)), Some((&k, k_rest))) if p == k => matches(p_rest, k_rest),
            _ => false,
        }
    }

    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = routing_key.split('.').collect();
    matches(&pattern, &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(routing_key: &str) -> EventEnvelope {
        EventEnvelope::new(routing_key, &json!({"n": 1})).unwrap()
    }

    #[test]
    fn star_matches_exactly_one_segment() {
        assert!(matches_routing_key("order.*", "order.created"));
        assert!(matches_routing_key("order.*", "order.cancelled"));
        assert!(!matches_routing_key("order.*", "order"));
        assert!(!matches_routing_key("order.*", "order.status.changed"));
        assert!(!matches_routing_key("order.*", "payment.completed"));
    }

    #[test]
    fn hash_matches_any_tail() {
        assert!(matches_routing_key("#", "order.created"));
        assert!(matches_routing_key("order.#", "order.created"));
        assert!(matches_routing_key("order.#", "order.status.changed"));
        assert!(!matches_routing_key("payment.#", "order.created"));
    }

    #[test]
    fn exact_patterns_require_exact_keys() {
        assert!(matches_routing_key("payment.completed", "payment.completed"));
        assert!(!matches_routing_key("payment.completed", "payment.refunded"));
    }

    #[test]
    fn publish_fans_out_to_matching_queues() {
        let broker = InMemoryBroker::new();
        let orders = broker.bind_queue("order_events", "q.orders", "order.*");
        let payments = broker.bind_queue("order_events", "q.payments", "payment.*");
        let firehose = broker.bind_queue("order_events", "q.all", "#");

        broker
            .publish("order_events", envelope("order.created"))
            .unwrap();
        broker
            .publish("order_events", envelope("payment.completed"))
            .unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(payments.len(), 1);
        assert_eq!(firehose.len(), 2);
        assert_eq!(
            orders.try_next().unwrap().event.routing_key,
            "order.created"
        );
    }

    #[test]
    fn unmatched_topic_drops_event() {
        let broker = InMemoryBroker::new();
        let queue = broker.bind_queue("order_events", "q", "order.*");

        broker
            .publish("catalog_events", envelope("order.created"))
            .unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn requeue_bumps_attempt_count() {
        let broker = InMemoryBroker::new();
        let queue = broker.bind_queue("order_events", "q", "#");
        broker
            .publish("order_events", envelope("order.created"))
            .unwrap();

        let first = queue.try_next().unwrap();
        assert_eq!(first.attempt, 1);
        queue.requeue(first);

        let second = queue.try_next().unwrap();
        assert_eq!(second.attempt, 2);
        assert!(queue.is_empty());
    }
}
