//! Host boundary shapes - inbound events and outbound responses.
//!
//! These are the types exchanged with the embedding host: it builds one
//! inbound event per delivery and consumes the response the dispatch
//! surface returns. All of them are transient, owned by a single
//! invocation.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Inbound request/response invocation, as delivered by the host.
#[derive(Debug, Clone, Default)]
pub struct InvocationEvent {
    /// Raw request body, possibly empty.
    pub data: Bytes,
    /// Content type of the body; mirrored onto the response.
    pub content_type: String,
    /// URL-encoded query string, without the leading `?`.
    pub query_string: String,
}

impl InvocationEvent {
    /// Create an invocation event with a body and content type.
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            query_string: String::new(),
        }
    }

    /// Attach a query string.
    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }
}

/// Outbound RPC response content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    /// Serialized response body.
    pub data: Bytes,
    /// Content type, mirrored from the inbound event.
    pub content_type: String,
}

/// Response body bytes of an optional [`Content`], empty when absent.
pub fn content_data(content: Option<&Content>) -> &[u8] {
    content.map(|c| c.data.as_ref()).unwrap_or(&[])
}

/// Inbound topic event from a pub/sub subscription.
#[derive(Debug, Clone, Default)]
pub struct TopicEvent {
    /// Raw event payload.
    pub raw_data: Bytes,
}

impl TopicEvent {
    /// Create a topic event from raw payload bytes.
    pub fn new(raw_data: impl Into<Bytes>) -> Self {
        Self {
            raw_data: raw_data.into(),
        }
    }
}

/// Inbound event from an input binding.
#[derive(Debug, Clone, Default)]
pub struct BindingEvent {
    /// Raw event payload.
    pub data: Bytes,
}

impl BindingEvent {
    /// Create a binding event from raw payload bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

/// A pub/sub subscription a topic handler is registered under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Name of the pub/sub component the messages come from.
    #[serde(rename = "pubsubname")]
    pub pubsub_name: String,
    /// Topic name.
    pub topic: String,
    /// Subscription metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Subscription {
    /// Create a subscription for a pub/sub component and topic.
    pub fn new(pubsub_name: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            pubsub_name: pubsub_name.into(),
            topic: topic.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
