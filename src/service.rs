//! Service surface - the registration and delivery boundary.
//!
//! A [`Service`] is what the embedding host talks to: handlers are
//! registered on it before the host starts delivering, then the host
//! calls one delivery method per inbound event. The host owns transport,
//! scheduling and retries; the service owns decoding, dispatch and
//! response encoding.
//!
//! # Example
//!
//! ```ignore
//! use servwire::{Service, Subscription};
//!
//! let mut service = Service::new();
//!
//! service.register_rpc("echo", |_ctx, req: EchoRequest| async move {
//!     Ok(EchoReply { echo: req.message })
//! })?;
//!
//! service.register_subscribe(
//!     Subscription::new("orders-pubsub", "orders"),
//!     |_ctx, order: Order| async move {
//!         println!("order {}", order.id);
//!         Ok(())
//!     },
//! )?;
//!
//! // the host then drives deliveries:
//! // service.invoke_rpc("echo", ctx, &event).await
//! ```

use std::future::Future;

use crate::codec::Payload;
use crate::error::Result;
use crate::event::{BindingEvent, Content, InvocationEvent, Subscription, TopicEvent};
use crate::handler::{HandlerRegistry, HandlerResult, InvocationContext};

/// Registration and delivery surface for the three invocation flavors.
#[derive(Default)]
pub struct Service {
    registry: HandlerRegistry,
    subscriptions: Vec<Subscription>,
}

impl Service {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request/response RPC handler under `route`.
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
        self.registry.register_rpc(route, handler)
    }

    /// Register a topic handler for `subscription`.
    ///
    /// The subscription is kept and exposed through
    /// [`Service::subscriptions`] so the host can establish it.
    ///
    /// # Errors
    ///
    /// Empty component/topic name, duplicate subscription, or a payload
    /// type that is not a record.
    pub fn register_subscribe<F, T, Fut>(
        &mut self,
        subscription: Subscription,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
        T: Payload,
        Fut: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        self.registry
            .register_topic(&subscription.pubsub_name, &subscription.topic, handler)?;
        self.subscriptions.push(subscription);
        Ok(())
    }

    /// Register an input-binding handler under `route`.
    ///
    /// # Errors
    ///
    /// Empty route, duplicate route, or a payload type that is not a
    /// record.
    pub fn register_input<F, T, R, Fut>(&mut self, route: &str, handler: F) -> Result<()>
    where
        F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
        T: Payload,
        R: Payload,
        Fut: Future<Output = HandlerResult<R>> + Send + 'static,
    {
        self.registry.register_binding(route, handler)
    }

    /// Deliver one RPC invocation. Called by the host per inbound
    /// request.
    pub async fn invoke_rpc(
        &self,
        route: &str,
        ctx: InvocationContext,
        event: &InvocationEvent,
    ) -> Result<Content> {
        self.registry.invoke_rpc(route, ctx, event).await
    }

    /// Deliver one topic event. Called by the host per inbound message;
    /// the returned flag tells the host whether to redeliver (it is
    /// fixed to `false`).
    pub async fn deliver_topic_event(
        &self,
        pubsub_name: &str,
        topic: &str,
        ctx: InvocationContext,
        event: &TopicEvent,
    ) -> Result<bool> {
        self.registry
            .deliver_topic_event(pubsub_name, topic, ctx, event)
            .await
    }

    /// Deliver one input-binding event. Called by the host per inbound
    /// event; returns the encoded response bytes.
    pub async fn deliver_binding_event(
        &self,
        route: &str,
        ctx: InvocationContext,
        event: &BindingEvent,
    ) -> Result<Vec<u8>> {
        self.registry.deliver_binding_event(route, ctx, event).await
    }

    /// Subscriptions registered so far, for the host to establish.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Routes with a registered RPC handler.
    pub fn rpc_routes(&self) -> impl Iterator<Item = &str> {
        self.registry.rpc_routes()
    }

    /// Routes with a registered input-binding handler.
    pub fn binding_routes(&self) -> impl Iterator<Item = &str> {
        self.registry.binding_routes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct Ping {
        seq: u64,
    }

    impl Payload for Ping {}

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct Pong {
        seq: u64,
    }

    impl Payload for Pong {}

    #[test]
    fn test_registration_bookkeeping() {
        let mut service = Service::new();

        service
            .register_rpc("ping", |_ctx, req: Ping| async move {
                Ok(Pong { seq: req.seq })
            })
            .unwrap();
        service
            .register_subscribe(
                Subscription::new("ps", "beats").with_metadata("rawPayload", "true"),
                |_ctx, _beat: Ping| async move { Ok(()) },
            )
            .unwrap();
        service
            .register_input("pulse", |_ctx, req: Ping| async move {
                Ok(Pong { seq: req.seq })
            })
            .unwrap();

        assert!(service.rpc_routes().any(|r| r == "ping"));
        assert!(service.binding_routes().any(|r| r == "pulse"));
        assert_eq!(service.subscriptions().len(), 1);
        assert_eq!(service.subscriptions()[0].topic, "beats");
    }

    #[tokio::test]
    async fn test_rpc_delivery_through_service() {
        let mut service = Service::new();
        service
            .register_rpc("ping", |_ctx, req: Ping| async move {
                Ok(Pong { seq: req.seq + 1 })
            })
            .unwrap();

        let event = InvocationEvent::new(&b""[..], "application/json").with_query_string("seq=41");
        let content = service
            .invoke_rpc("ping", InvocationContext::new(), &event)
            .await
            .unwrap();

        let pong: Pong = serde_json::from_slice(&content.data).unwrap();
        assert_eq!(pong.seq, 42);
    }

    #[test]
    fn test_duplicate_subscription_not_recorded() {
        let mut service = Service::new();
        service
            .register_subscribe(Subscription::new("ps", "t"), |_ctx, _e: Ping| async move {
                Ok(())
            })
            .unwrap();

        let err = service
            .register_subscribe(Subscription::new("ps", "t"), |_ctx, _e: Ping| async move {
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, crate::error::ServwireError::DuplicateHandler(_)));
        assert_eq!(service.subscriptions().len(), 1);
    }
}
