//! Error types for servwire.

use thiserror::Error;

/// Boxed error returned by user handlers.
///
/// Handlers report failures as any `std::error::Error`; the adapter layer
/// wraps them in [`ServwireError::Handler`] before surfacing them to the
/// host.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all servwire operations.
#[derive(Debug, Error)]
pub enum ServwireError {
    /// JSON serialization/deserialization error (generic JSON payloads).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema JSON projection error reported by a schema-generated payload
    /// type, or a payload type that declares the schema format without
    /// providing the projection.
    #[error("schema projection error: {0}")]
    SchemaProjection(String),

    /// Query-string bind target does not serialize to a record.
    #[error("bind target must be a record, got {0}")]
    BindTarget(&'static str),

    /// Registration with an empty route or topic name.
    #[error("handler registered with empty route")]
    EmptyRoute,

    /// A handler is already registered for this route or subscription.
    #[error("handler already registered for {0:?}")]
    DuplicateHandler(String),

    /// Payload type rejected at registration time.
    #[error("handler {handler:?}: payload type {payload} is not a record")]
    PayloadShape {
        handler: String,
        payload: &'static str,
    },

    /// No handler registered for the given route, topic or binding.
    #[error("no handler registered for {0:?}")]
    HandlerNotFound(String),

    /// Error reported by the user handler itself.
    #[error("handler {handler:?} failed: {source}")]
    Handler {
        handler: String,
        #[source]
        source: BoxError,
    },
}

/// Result type alias using ServwireError.
pub type Result<T> = std::result::Result<T, ServwireError>;
