//! Codec module - serialization/deserialization for payloads.
//!
//! Every request/response record implements [`Payload`], which fixes the
//! type's wire format once:
//!
//! - [`WireFormat::Json`] - generic JSON via [`JsonCodec`], composed with
//!   the query-string binder for RPC requests
//! - [`WireFormat::SchemaJson`] - the JSON projection of a schema-defined
//!   message type, via [`SchemaJsonCodec`]
//!
//! # Design
//!
//! The format is an associated constant, not a per-call parameter: a
//! payload type is either a plain serde record or a schema message, never
//! both, and the choice is made exactly once per type. [`decode_request`]
//! and [`encode_response`] dispatch on it.
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use servwire::codec::{decode_request, InboundRequest, Payload};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Greeting {
//!     name: String,
//!     count: u32,
//! }
//!
//! impl Payload for Greeting {}
//!
//! let request = InboundRequest {
//!     query: "name=world",
//!     body: br#"{"count": 3}"#,
//! };
//! let greeting: Greeting = decode_request(request).unwrap();
//! assert_eq!(greeting.name, "world");
//! assert_eq!(greeting.count, 3);
//! ```

mod json;
mod schema;

pub use json::JsonCodec;
pub use schema::SchemaJsonCodec;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::bind;
use crate::error::{Result, ServwireError};

/// Wire format of a payload type, fixed per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Generic JSON; RPC requests also merge query-string parameters.
    Json,
    /// Schema JSON projection of a schema-defined message type.
    SchemaJson,
}

/// A record a handler can receive or return.
///
/// Plain serde records implement this with the defaults:
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// # use servwire::codec::Payload;
/// #[derive(Serialize, Deserialize, Default)]
/// struct Ping {
///     seq: u64,
/// }
///
/// impl Payload for Ping {}
/// ```
///
/// Message types generated from a wire schema override [`Payload::FORMAT`]
/// and the two projection hooks; see [`SchemaJsonCodec`] for the
/// projection convention.
pub trait Payload: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Wire format of this type. Defaults to generic JSON.
    const FORMAT: WireFormat = WireFormat::Json;

    /// Decode the schema JSON projection of `bytes` into `self`.
    ///
    /// Only consulted when [`Payload::FORMAT`] is
    /// [`WireFormat::SchemaJson`].
    fn merge_schema_json(&mut self, _bytes: &[u8]) -> Result<()> {
        Err(ServwireError::SchemaProjection(format!(
            "{} does not provide a schema projection",
            std::any::type_name::<Self>()
        )))
    }

    /// Encode `self` as its schema JSON projection.
    ///
    /// Only consulted when [`Payload::FORMAT`] is
    /// [`WireFormat::SchemaJson`].
    fn to_schema_json(&self) -> Result<Vec<u8>> {
        Err(ServwireError::SchemaProjection(format!(
            "{} does not provide a schema projection",
            std::any::type_name::<Self>()
        )))
    }
}

/// One inbound request's raw material, as handed over by the host.
///
/// Transient: built per invocation, discarded after the call completes.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    /// URL-encoded query string, empty when the surface carries none.
    pub query: &'a str,
    /// Raw body bytes, empty when the event has no body.
    pub body: &'a [u8],
}

/// Materialize a typed request value from raw query/body material.
///
/// Schema payloads decode the body through their projection. Generic JSON
/// payloads start from `Default`, take query-string fields first
/// (best-effort), then merge the body JSON on top - body values win for
/// any field present in both.
///
/// Fails on malformed body bytes; query-string problems never fail the
/// decode.
pub fn decode_request<T: Payload>(request: InboundRequest<'_>) -> Result<T> {
    match T::FORMAT {
        WireFormat::SchemaJson => SchemaJsonCodec::decode(request.body),
        WireFormat::Json => {
            let mut payload = T::default();
            if !request.query.is_empty() {
                // best effort: field-level problems never abort the decode
                let _ = bind::bind(request.query, &mut payload);
            }
            if !request.body.is_empty() {
                payload = JsonCodec::decode_onto(payload, request.body)?;
            }
            Ok(payload)
        }
    }
}

/// Serialize a handler's response value with its type's wire format.
pub fn encode_response<T: Payload>(value: &T) -> Result<Vec<u8>> {
    match T::FORMAT {
        WireFormat::SchemaJson => SchemaJsonCodec::encode(value),
        WireFormat::Json => JsonCodec::encode(value),
    }
}
