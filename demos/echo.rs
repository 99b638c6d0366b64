//! Echo service - simple request/response example.
//!
//! This example demonstrates:
//! - Registering a typed RPC handler on a [`Service`]
//! - How a host-delivered invocation event travels through the adapter
//! - Query-string and body fields merging into one request record
//!
//! Run with: `cargo run --example echo`

use serde::{Deserialize, Serialize};
use servwire::{InvocationContext, InvocationEvent, Payload, Service};

/// Input record for the echo method.
#[derive(Serialize, Deserialize, Default, Debug)]
struct EchoRequest {
    message: String,
    repeat: u32,
}

impl Payload for EchoRequest {}

/// Output record for the echo method.
#[derive(Serialize, Deserialize, Default, Debug)]
struct EchoReply {
    echo: String,
}

impl Payload for EchoReply {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut service = Service::new();

    service.register_rpc("echo", |_ctx: InvocationContext, req: EchoRequest| async move {
        let times = req.repeat.max(1) as usize;
        Ok(EchoReply {
            echo: req.message.repeat(times),
        })
    })?;

    // What a host delivery looks like: the body carries the message, the
    // query string carries the repeat count.
    let event = InvocationEvent::new(&br#"{"message": "hello "}"#[..], "application/json")
        .with_query_string("repeat=3");

    let content = service
        .invoke_rpc("echo", InvocationContext::new(), &event)
        .await?;

    println!("content-type: {}", content.content_type);
    println!("body: {}", String::from_utf8_lossy(&content.data));
    Ok(())
}
