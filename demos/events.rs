//! Event surfaces - pub/sub subscription and input-binding example.
//!
//! This example demonstrates:
//! - Registering a topic handler under a [`Subscription`]
//! - Registering an input-binding handler
//! - The acknowledgement semantics of topic delivery (never a retry)
//!
//! Run with: `cargo run --example events`

use serde::{Deserialize, Serialize};
use servwire::{BindingEvent, InvocationContext, Payload, Service, Subscription, TopicEvent};

#[derive(Serialize, Deserialize, Default, Debug)]
struct OrderPlaced {
    order_id: u64,
    item: String,
}

impl Payload for OrderPlaced {}

#[derive(Serialize, Deserialize, Default, Debug)]
struct Receipt {
    order_id: u64,
    status: String,
}

impl Payload for Receipt {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut service = Service::new();

    service.register_subscribe(
        Subscription::new("orders-pubsub", "orders").with_metadata("rawPayload", "true"),
        |_ctx: InvocationContext, order: OrderPlaced| async move {
            println!("subscribe: order {} for {:?}", order.order_id, order.item);
            Ok(())
        },
    )?;

    service.register_input(
        "warehouse-queue",
        |_ctx: InvocationContext, order: OrderPlaced| async move {
            Ok(Receipt {
                order_id: order.order_id,
                status: "stored".to_string(),
            })
        },
    )?;

    // The host establishes the registered subscriptions:
    for sub in service.subscriptions() {
        println!("subscription: {}/{}", sub.pubsub_name, sub.topic);
    }

    // A topic delivery; the returned flag never asks for a redelivery.
    let topic_event = TopicEvent::new(&br#"{"order_id": 1, "item": "bolt"}"#[..]);
    let retry = service
        .deliver_topic_event(
            "orders-pubsub",
            "orders",
            InvocationContext::new(),
            &topic_event,
        )
        .await?;
    println!("retry requested: {retry}");

    // A binding delivery returns response bytes.
    let binding_event = BindingEvent::new(&br#"{"order_id": 2, "item": "nut"}"#[..]);
    let bytes = service
        .deliver_binding_event("warehouse-queue", InvocationContext::new(), &binding_event)
        .await?;
    println!("binding reply: {}", String::from_utf8_lossy(&bytes));

    Ok(())
}
