//! Handler module - typed handler adapters and dispatch.
//!
//! Provides:
//! - [`HandlerRegistry`] - maps routes, subscriptions and bindings to
//!   their adapted handlers
//! - [`InvocationContext`] - host context forwarded to every handler
//! - [`HandlerDescriptor`] - what registration captured about a handler
//!
//! # Example
//!
//! ```ignore
//! use servwire::handler::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//!
//! // Register a request/response handler
//! registry.register_rpc("echo", |_ctx, req: EchoRequest| async move {
//!     Ok(EchoReply { echo: req.message })
//! })?;
//!
//! // Register a topic handler
//! registry.register_topic("pubsub", "orders", |_ctx, order: Order| async move {
//!     println!("got order {}", order.id);
//!     Ok(())
//! })?;
//! ```

mod context;
mod registry;

pub use context::InvocationContext;
pub use registry::{
    BindingHandler, BoxFuture, HandlerDescriptor, HandlerRegistry, HandlerResult, RpcHandler,
    TopicHandler,
};
