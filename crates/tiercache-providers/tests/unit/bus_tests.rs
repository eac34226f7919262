//! Invalidation bus tests

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{InvalidationBus, InvalidationHandler};
use tiercache_domain::{CacheKey, InvalidationMessage, NodeId};
use tiercache_providers::{NullInvalidationBus, TokioInvalidationBus};
use tokio::sync::Mutex;

#[derive(Default)]
struct Recorder {
    received: Mutex<Vec<InvalidationMessage>>,
}

#[async_trait]
impl InvalidationHandler for Recorder {
    async fn on_message(&self, message: InvalidationMessage) -> Result<()> {
        self.received.lock().await.push(message);
        Ok(())
    }
}

/// Fails on `bad`, panics on `boom`, records everything else
#[derive(Default)]
struct Flaky {
    handled: AtomicUsize,
}

#[async_trait]
impl InvalidationHandler for Flaky {
    async fn on_message(&self, message: InvalidationMessage) -> Result<()> {
        match message.cache_names.first().map(String::as_str) {
            Some("bad") => Err(Error::internal("handler failure")),
            Some("boom") => panic!("handler panic"),
            _ => {
                self.handled.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

fn message(namespace: &str) -> InvalidationMessage {
    InvalidationMessage::new(
        NodeId::new("node-a"),
        vec![namespace.to_string()],
        Some(CacheKey::from("123")),
    )
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_tokio_bus_delivers_to_every_subscriber() {
    let bus = TokioInvalidationBus::new();
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());

    let _s1 = bus.subscribe(first.clone()).await.unwrap();
    let _s2 = bus.subscribe(second.clone()).await.unwrap();
    assert_eq!(bus.subscriber_count(), 2);

    let receivers = bus.publish(&message("orders")).await.unwrap();
    assert_eq!(receivers, 2);
    settle().await;

    assert_eq!(first.received.lock().await.as_slice(), &[message("orders")]);
    assert_eq!(second.received.lock().await.as_slice(), &[message("orders")]);
}

#[tokio::test]
async fn test_tokio_bus_survives_handler_errors_and_panics() {
    let bus = TokioInvalidationBus::new();
    let handler = Arc::new(Flaky::default());
    let _subscription = bus.subscribe(handler.clone()).await.unwrap();

    bus.publish(&message("bad")).await.unwrap();
    bus.publish(&message("boom")).await.unwrap();
    bus.publish(&message("orders")).await.unwrap();
    settle().await;

    assert_eq!(handler.handled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_subscription_stops_delivery() {
    let bus = TokioInvalidationBus::new();
    let recorder = Arc::new(Recorder::default());
    let subscription = bus.subscribe(recorder.clone()).await.unwrap();
    assert!(subscription.is_active());
    assert!(subscription.id().starts_with("tokio-"));

    subscription.cancel();
    settle().await;
    bus.publish(&message("orders")).await.unwrap();
    settle().await;

    assert!(recorder.received.lock().await.is_empty());
}

#[tokio::test]
async fn test_publish_without_subscribers() {
    let bus = TokioInvalidationBus::with_capacity(4).with_channel("test-channel");
    assert_eq!(bus.publish(&message("orders")).await.unwrap(), 0);
    assert_eq!(bus.channel(), "test-channel");
}

#[tokio::test]
async fn test_null_bus_discards() {
    let bus = NullInvalidationBus::new();
    let recorder = Arc::new(Recorder::default());
    let _subscription = bus.subscribe(recorder.clone()).await.unwrap();

    assert_eq!(bus.publish(&message("orders")).await.unwrap(), 0);
    settle().await;
    assert!(recorder.received.lock().await.is_empty());
    assert_eq!(bus.provider_name(), "null");
}

#[tokio::test]
async fn test_undecodable_payload_is_skipped() {
    let handler = Flaky::default();
    tiercache_providers::events::deliver_payload(&handler, b"{not json", "test").await;
    tiercache_providers::events::deliver_payload(
        &handler,
        &message("orders").encode().unwrap(),
        "test",
    )
    .await;
    assert_eq!(handler.handled.load(Ordering::SeqCst), 1);
}
