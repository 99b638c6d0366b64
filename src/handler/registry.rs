//! Handler registry - typed adapters and dispatch per invocation surface.
//!
//! Registration is generic over the handler's request and response record
//! types. It builds a type-erased adapter (the [`RpcHandler`],
//! [`TopicHandler`] and [`BindingHandler`] traits) that decodes the raw
//! event into the declared payload type, invokes the handler, and encodes
//! the result back, so dispatch never inspects types at runtime.
//!
//! # Example
//!
//! ```ignore
//! use servwire::handler::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//!
//! registry.register_rpc("echo", |_ctx, req: EchoRequest| async move {
//!     Ok(EchoReply { echo: req.message })
//! })?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use crate::codec::{self, InboundRequest, Payload, WireFormat};
use crate::error::{BoxError, Result, ServwireError};
use crate::event::{BindingEvent, Content, InvocationEvent, TopicEvent};
use crate::handler::InvocationContext;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for handler functions.
pub type HandlerResult<T> = std::result::Result<T, BoxError>;

/// What registration captured about one handler: its route, the short
/// name of its payload type, and the payload's wire format.
///
/// Immutable after registration; its `Display` form is the handler's
/// diagnostic name.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    route: String,
    payload_type: &'static str,
    format: WireFormat,
}

impl HandlerDescriptor {
    /// Validate the payload type of a handler being registered under
    /// `route` and capture its descriptor.
    ///
    /// Generic-JSON payloads must serialize to a record: anything else
    /// cannot take query/body field merging and is rejected here, at
    /// registration time, rather than on first delivery.
    fn inspect<T: Payload>(route: &str) -> Result<Self> {
        if matches!(T::FORMAT, WireFormat::Json) {
            let probe = serde_json::to_value(T::default())?;
            if !probe.is_object() {
                return Err(ServwireError::PayloadShape {
                    handler: route.to_string(),
                    payload: short_type_name::<T>(),
                });
            }
        }
        Ok(Self {
            route: route.to_string(),
            payload_type: short_type_name::<T>(),
            format: T::FORMAT,
        })
    }

    /// Route, topic or binding name the handler serves.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Short name of the request payload type.
    pub fn payload_type(&self) -> &'static str {
        self.payload_type
    }

    /// Wire format of the request payload type.
    pub fn format(&self) -> WireFormat {
        self.format
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.route, self.payload_type)
    }
}

/// Strip the module path (and any generic arguments) from a type name.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let end = full.find('<').unwrap_or(full.len());
    let start = full[..end].rfind("::").map(|i| i + 2).unwrap_or(0);
    &full[start..end]
}

/// Adapted request/response handler: raw invocation event in, content out.
pub trait RpcHandler: Send + Sync + 'static {
    /// Descriptor captured at registration.
    fn descriptor(&self) -> &HandlerDescriptor;

    /// Decode the event, invoke the handler, encode its response.
    fn call(
        &self,
        ctx: InvocationContext,
        event: &InvocationEvent,
    ) -> BoxFuture<'static, Result<Content>>;
}

/// Adapted topic handler: raw topic event in, nothing out.
pub trait TopicHandler: Send + Sync + 'static {
    /// Descriptor captured at registration.
    fn descriptor(&self) -> &HandlerDescriptor;

    /// Decode the event and invoke the handler.
    fn call(&self, ctx: InvocationContext, event: &TopicEvent) -> BoxFuture<'static, Result<()>>;
}

/// Adapted input-binding handler: raw binding event in, response bytes out.
pub trait BindingHandler: Send + Sync + 'static {
    /// Descriptor captured at registration.
    fn descriptor(&self) -> &HandlerDescriptor;

    /// Decode the event, invoke the handler, encode its response.
    fn call(
        &self,
        ctx: InvocationContext,
        event: &BindingEvent,
    ) -> BoxFuture<'static, Result<Vec<u8>>>;
}

/// Wrapper adapting a typed request/response handler to [`RpcHandler`].
struct TypedRpcHandler<F, T, R, Fut> {
    handler: F,
    descriptor: HandlerDescriptor,
    _phantom: PhantomData<fn(T) -> (R, Fut)>,
}

impl<F, T, R, Fut> RpcHandler for TypedRpcHandler<F, T, R, Fut>
where
    F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
    T: Payload,
    R: Payload,
    Fut: Future<Output = HandlerResult<R>> + Send + 'static,
{
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        ctx: InvocationContext,
        event: &InvocationEvent,
    ) -> BoxFuture<'static, Result<Content>> {
        let request: T = match codec::decode_request(InboundRequest {
            query: &event.query_string,
            body: &event.data,
        }) {
            Ok(request) => request,
            // fail fast: the handler never sees a partially decoded request
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        let name = self.descriptor.to_string();
        let content_type = event.content_type.clone();
        let fut = (self.handler)(ctx, request);
        Box::pin(async move {
            match fut.await {
                Ok(response) => Ok(Content {
                    data: codec::encode_response(&response)?.into(),
                    content_type,
                }),
                Err(source) => Err(ServwireError::Handler {
                    handler: name,
                    source,
                }),
            }
        })
    }
}

/// Wrapper adapting a typed topic handler to [`TopicHandler`].
struct TypedTopicHandler<F, T, Fut> {
    handler: F,
    descriptor: HandlerDescriptor,
    _phantom: PhantomData<fn(T) -> Fut>,
}

impl<F, T, Fut> TopicHandler for TypedTopicHandler<F, T, Fut>
where
    F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
    T: Payload,
    Fut: Future<Output = HandlerResult<()>> + Send + 'static,
{
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn call(&self, ctx: InvocationContext, event: &TopicEvent) -> BoxFuture<'static, Result<()>> {
        let request: T = match codec::decode_request(InboundRequest {
            query: "",
            body: &event.raw_data,
        }) {
            Ok(request) => request,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        let name = self.descriptor.to_string();
        let fut = (self.handler)(ctx, request);
        Box::pin(async move {
            fut.await.map_err(|source| ServwireError::Handler {
                handler: name,
                source,
            })
        })
    }
}

/// Wrapper adapting a typed input-binding handler to [`BindingHandler`].
struct TypedBindingHandler<F, T, R, Fut> {
    handler: F,
    descriptor: HandlerDescriptor,
    _phantom: PhantomData<fn(T) -> (R, Fut)>,
}

impl<F, T, R, Fut> BindingHandler for TypedBindingHandler<F, T, R, Fut>
where
    F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
    T: Payload,
    R: Payload,
    Fut: Future<Output = HandlerResult<R>> + Send + 'static,
{
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        ctx: InvocationContext,
        event: &BindingEvent,
    ) -> BoxFuture<'static, Result<Vec<u8>>> {
        let request: T = match codec::decode_request(InboundRequest {
            query: "",
            body: &event.data,
        }) {
            Ok(request) => request,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        let name = self.descriptor.to_string();
        let fut = (self.handler)(ctx, request);
        Box::pin(async move {
            match fut.await {
                Ok(response) => codec::encode_response(&response),
                Err(source) => Err(ServwireError::Handler {
                    handler: name,
                    source,
                }),
            }
        })
    }
}

/// Registry mapping routes, subscriptions and bindings to their adapted
/// handlers.
///
/// Registration takes `&mut self`; dispatch takes `&self`. A populated
/// registry is immutable and safe to share across concurrent deliveries.
#[derive(Default)]
pub struct HandlerRegistry {
    rpc: HashMap<String, Box<dyn RpcHandler>>,
    topics: HashMap<String, Box<dyn TopicHandler>>,
    bindings: HashMap<String, Box<dyn BindingHandler>>,
}

/// Key for a topic handler: pub/sub component plus topic name.
fn topic_key(pubsub_name: &str, topic: &str) -> String {
    format!("{pubsub_name}/{topic}")
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request/response handler under `route`.
    ///
    /// # Errors
    ///
    /// Empty route, duplicate route, or a payload type that is not a
    /// record.
    pub fn register_rpc<F, T, R, Fut>(&mut self, route: &str, handler: F) -> Result<()>
    where
        F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
        T: Payload,
        R: Payload,
        Fut: Future<Output = HandlerResult<R>> + Send + 'static,
    {
        if route.is_empty() {
            return Err(ServwireError::EmptyRoute);
        }
        if self.rpc.contains_key(route) {
            return Err(ServwireError::DuplicateHandler(route.to_string()));
        }
        let descriptor = HandlerDescriptor::inspect::<T>(route)?;
        tracing::debug!(handler = %descriptor, "registered RPC handler");
        self.rpc.insert(
            route.to_string(),
            Box::new(TypedRpcHandler {
                handler,
                descriptor,
                _phantom: PhantomData,
            }),
        );
        Ok(())
    }

    /// Register a topic handler for a pub/sub component and topic.
    ///
    /// # Errors
    ///
    /// Empty component or topic name, duplicate subscription, or a
    /// payload type that is not a record.
    pub fn register_topic<F, T, Fut>(
        &mut self,
        pubsub_name: &str,
        topic: &str,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
        T: Payload,
        Fut: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        if pubsub_name.is_empty() || topic.is_empty() {
            return Err(ServwireError::EmptyRoute);
        }
        let key = topic_key(pubsub_name, topic);
        if self.topics.contains_key(&key) {
            return Err(ServwireError::DuplicateHandler(key));
        }
        let descriptor = HandlerDescriptor::inspect::<T>(&key)?;
        tracing::debug!(handler = %descriptor, "registered topic handler");
        self.topics.insert(
            key,
            Box::new(TypedTopicHandler {
                handler,
                descriptor,
                _phantom: PhantomData,
            }),
        );
        Ok(())
    }

    /// Register an input-binding handler under `route`.
    ///
    /// # Errors
    ///
    /// Empty route, duplicate route, or a payload type that is not a
    /// record.
    pub fn register_binding<F, T, R, Fut>(&mut self, route: &str, handler: F) -> Result<()>
    where
        F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
        T: Payload,
        R: Payload,
        Fut: Future<Output = HandlerResult<R>> + Send + 'static,
    {
        if route.is_empty() {
            return Err(ServwireError::EmptyRoute);
        }
        if self.bindings.contains_key(route) {
            return Err(ServwireError::DuplicateHandler(route.to_string()));
        }
        let descriptor = HandlerDescriptor::inspect::<T>(route)?;
        tracing::debug!(handler = %descriptor, "registered input-binding handler");
        self.bindings.insert(
            route.to_string(),
            Box::new(TypedBindingHandler {
                handler,
                descriptor,
                _phantom: PhantomData,
            }),
        );
        Ok(())
    }

    /// Dispatch a request/response invocation.
    ///
    /// A handler error surfaces as [`ServwireError::Handler`] and no
    /// content is produced.
    pub async fn invoke_rpc(
        &self,
        route: &str,
        ctx: InvocationContext,
        event: &InvocationEvent,
    ) -> Result<Content> {
        let handler = self
            .rpc
            .get(route)
            .ok_or_else(|| ServwireError::HandlerNotFound(route.to_string()))?;
        handler.call(ctx, event).await
    }

    /// Deliver a topic event to its subscription handler.
    ///
    /// Returns the retry flag for the host's acknowledgement. Decode and
    /// handler failures are logged and then discarded; the flag is fixed
    /// to `false`, the host is never asked to redeliver.
    pub async fn deliver_topic_event(
        &self,
        pubsub_name: &str,
        topic: &str,
        ctx: InvocationContext,
        event: &TopicEvent,
    ) -> Result<bool> {
        let key = topic_key(pubsub_name, topic);
        let handler = self
            .topics
            .get(&key)
            .ok_or(ServwireError::HandlerNotFound(key))?;

        if let Err(error) = handler.call(ctx, event).await {
            tracing::error!(handler = %handler.descriptor(), %error, "topic delivery failed");
        }
        Ok(false)
    }

    /// Deliver an input-binding event to its handler.
    ///
    /// A handler error surfaces as the adapter's own error; on success
    /// the encoded response bytes are returned to the host.
    pub async fn deliver_binding_event(
        &self,
        route: &str,
        ctx: InvocationContext,
        event: &BindingEvent,
    ) -> Result<Vec<u8>> {
        let handler = self
            .bindings
            .get(route)
            .ok_or_else(|| ServwireError::HandlerNotFound(route.to_string()))?;
        handler.call(ctx, event).await
    }

    /// Routes with a registered RPC handler.
    pub fn rpc_routes(&self) -> impl Iterator<Item = &str> {
        self.rpc.keys().map(String::as_str)
    }

    /// Routes with a registered input-binding handler.
    pub fn binding_routes(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct EchoRequest {
        message: String,
    }

    impl Payload for EchoRequest {}

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct EchoReply {
        echo: String,
    }

    impl Payload for EchoReply {}

    // serializes to a bare number, not a record
    #[derive(Serialize, Deserialize, Default)]
    struct NotARecord(i32);

    impl Payload for NotARecord {}

    #[test]
    fn test_register_rpc() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_rpc("echo", |_ctx, req: EchoRequest| async move {
                Ok(EchoReply { echo: req.message })
            })
            .unwrap();

        assert!(registry.rpc_routes().any(|r| r == "echo"));
    }

    #[test]
    fn test_register_empty_route_fails() {
        let mut registry = HandlerRegistry::new();
        let err = registry
            .register_rpc("", |_ctx, req: EchoRequest| async move {
                Ok(EchoReply { echo: req.message })
            })
            .unwrap_err();
        assert!(matches!(err, ServwireError::EmptyRoute));
    }

    #[test]
    fn test_register_duplicate_route_fails() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_rpc("echo", |_ctx, req: EchoRequest| async move {
                Ok(EchoReply { echo: req.message })
            })
            .unwrap();

        let err = registry
            .register_rpc("echo", |_ctx, req: EchoRequest| async move {
                Ok(EchoReply { echo: req.message })
            })
            .unwrap_err();
        assert!(matches!(err, ServwireError::DuplicateHandler(_)));
    }

    #[test]
    fn test_register_non_record_payload_fails() {
        let mut registry = HandlerRegistry::new();
        let err = registry
            .register_rpc("bad", |_ctx, _req: NotARecord| async move {
                Ok(EchoReply::default())
            })
            .unwrap_err();
        assert!(matches!(err, ServwireError::PayloadShape { .. }));
    }

    #[tokio::test]
    async fn test_invoke_rpc_round_trip() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_rpc("echo", |_ctx, req: EchoRequest| async move {
                Ok(EchoReply { echo: req.message })
            })
            .unwrap();

        let event = InvocationEvent::new(&br#"{"message": "hi"}"#[..], "application/json");
        let content = registry
            .invoke_rpc("echo", InvocationContext::new(), &event)
            .await
            .unwrap();

        assert_eq!(content.content_type, "application/json");
        let reply: EchoReply = serde_json::from_slice(&content.data).unwrap();
        assert_eq!(reply.echo, "hi");
    }

    #[tokio::test]
    async fn test_invoke_rpc_handler_error_surfaces() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_rpc("fail", |_ctx, _req: EchoRequest| async move {
                Err::<EchoReply, _>("boom".into())
            })
            .unwrap();

        let event = InvocationEvent::new(&b"{}"[..], "application/json");
        let err = registry
            .invoke_rpc("fail", InvocationContext::new(), &event)
            .await
            .unwrap_err();
        assert!(matches!(err, ServwireError::Handler { .. }));
    }

    #[tokio::test]
    async fn test_invoke_rpc_decode_error_skips_handler() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let invoked = Arc::new(AtomicBool::new(false));
        let seen = invoked.clone();

        let mut registry = HandlerRegistry::new();
        registry
            .register_rpc("echo", move |_ctx, req: EchoRequest| {
                seen.store(true, Ordering::SeqCst);
                async move { Ok(EchoReply { echo: req.message }) }
            })
            .unwrap();

        let event = InvocationEvent::new(&b"{broken"[..], "application/json");
        let err = registry
            .invoke_rpc("echo", InvocationContext::new(), &event)
            .await
            .unwrap_err();

        assert!(matches!(err, ServwireError::Json(_)));
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_invoke_rpc_unknown_route() {
        let registry = HandlerRegistry::new();
        let event = InvocationEvent::new(&b"{}"[..], "application/json");
        let err = registry
            .invoke_rpc("missing", InvocationContext::new(), &event)
            .await
            .unwrap_err();
        assert!(matches!(err, ServwireError::HandlerNotFound(_)));
    }

    #[tokio::test]
    async fn test_topic_event_never_asks_for_retry() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_topic("ps", "orders", |_ctx, _req: EchoRequest| async move {
                Err("handler failed".into())
            })
            .unwrap();

        let event = TopicEvent::new(&b"{}"[..]);
        let retry = registry
            .deliver_topic_event("ps", "orders", InvocationContext::new(), &event)
            .await
            .unwrap();
        assert!(!retry);
    }

    #[tokio::test]
    async fn test_binding_event_returns_response_bytes() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_binding("ingest", |_ctx, req: EchoRequest| async move {
                Ok(EchoReply { echo: req.message })
            })
            .unwrap();

        let event = BindingEvent::new(&br#"{"message": "in"}"#[..]);
        let bytes = registry
            .deliver_binding_event("ingest", InvocationContext::new(), &event)
            .await
            .unwrap();

        let reply: EchoReply = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reply.echo, "in");
    }

    #[tokio::test]
    async fn test_binding_handler_error_surfaces() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_binding("ingest", |_ctx, _req: EchoRequest| async move {
                Err::<EchoReply, _>("rejected".into())
            })
            .unwrap();

        let event = BindingEvent::new(&b"{}"[..]);
        let err = registry
            .deliver_binding_event("ingest", InvocationContext::new(), &event)
            .await
            .unwrap_err();
        assert!(matches!(err, ServwireError::Handler { .. }));
    }

    #[test]
    fn test_descriptor_display() {
        let descriptor = HandlerDescriptor::inspect::<EchoRequest>("echo").unwrap();
        assert_eq!(descriptor.to_string(), "echo[EchoRequest]");
        assert_eq!(descriptor.route(), "echo");
        assert_eq!(descriptor.payload_type(), "EchoRequest");
        assert_eq!(descriptor.format(), WireFormat::Json);
    }

    #[test]
    fn test_short_type_name_strips_path() {
        assert_eq!(short_type_name::<EchoRequest>(), "EchoRequest");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }
}
