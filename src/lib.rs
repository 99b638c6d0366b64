//! # servwire
//!
//! Typed handler adapters for generic invocation surfaces.
//!
//! A host (sidecar, broker bridge, test harness) delivers raw events -
//! RPC requests with a query string and body, pub/sub topic messages,
//! input-binding events. servwire lets you register ordinary typed
//! handlers against those surfaces and does the adapting: it decodes the
//! raw material into the handler's declared request record, invokes the
//! handler, and encodes the result back into the shape the surface
//! expects.
//!
//! ## Architecture
//!
//! - **Service** - registration surface and per-event delivery entry
//!   points, one per invocation flavor
//! - **Handler layer** - type-erased adapters built at registration, so
//!   dispatch never inspects types
//! - **Codec** - per-payload-type wire format: generic JSON or the JSON
//!   projection of schema-defined messages
//! - **Binder** - query-string parameters merged into request fields by
//!   serde name
//!
//! ## Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use servwire::{InvocationContext, InvocationEvent, Payload, Service};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct EchoRequest {
//!     message: String,
//! }
//! impl Payload for EchoRequest {}
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct EchoReply {
//!     echo: String,
//! }
//! impl Payload for EchoReply {}
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> servwire::Result<()> {
//! let mut service = Service::new();
//! service.register_rpc("echo", |_ctx: InvocationContext, req: EchoRequest| async move {
//!     Ok(EchoReply { echo: req.message })
//! })?;
//!
//! // the host delivers an inbound event:
//! let event = InvocationEvent::new(&br#"{"message": "hello"}"#[..], "application/json");
//! let content = service.invoke_rpc("echo", InvocationContext::new(), &event).await?;
//! assert!(!content.data.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod bind;
pub mod codec;
pub mod error;
pub mod event;
pub mod handler;
mod service;

pub use bind::bind;
pub use codec::{Payload, WireFormat};
pub use error::{BoxError, Result, ServwireError};
pub use event::{
    content_data, BindingEvent, Content, InvocationEvent, Subscription, TopicEvent,
};
pub use handler::{HandlerResult, InvocationContext};
pub use service::Service;
