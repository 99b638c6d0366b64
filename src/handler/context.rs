//! Invocation context for handlers.
//!
//! The host builds one [`InvocationContext`] per delivery and the adapter
//! layer forwards it to the handler unchanged. It carries host metadata
//! (for example trace headers) and a cancellation flag the host may trip;
//! the adapter itself never inspects either and never enforces timeouts.
//!
//! # Example
//!
//! ```ignore
//! async fn order_handler(ctx: InvocationContext, req: OrderRequest) -> HandlerResult<OrderReply> {
//!     if ctx.is_cancelled() {
//!         return Err("cancelled".into());
//!     }
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Context passed to every handler invocation.
///
/// # Thread Safety
///
/// `InvocationContext` is `Clone` and can be shared across tasks; clones
/// observe the same cancellation flag.
#[derive(Clone, Default)]
pub struct InvocationContext {
    /// Host-supplied metadata for this delivery.
    metadata: HashMap<String, String>,
    /// Shared cancellation flag, tripped by the host.
    cancelled: Arc<AtomicBool>,
}

impl InvocationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context carrying host metadata.
    pub fn with_metadata(metadata: HashMap<String, String>) -> Self {
        Self {
            metadata,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Metadata attached by the host.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Whether the host has cancelled this invocation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Trip the cancellation flag. Called by the host; handlers observe
    /// it through [`InvocationContext::is_cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("metadata", &self.metadata)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
