//! Schema JSON projection - the JSON face of schema-defined messages.
//!
//! Message types generated from a wire schema carry a fixed JSON
//! projection: unknown fields are discarded on decode, enums are written
//! as numbers and fields under their schema names on encode. The
//! convention is not configurable per call.
//!
//! The projection itself lives in the generated types (they implement the
//! [`Payload`] hooks and set `FORMAT` to `SchemaJson`); this codec is the
//! call site the adapter layer goes through, so the two wire formats have
//! the same shape at the point of use.

use crate::codec::Payload;
use crate::error::Result;

/// Codec for payload types with a schema JSON projection.
pub struct SchemaJsonCodec;

impl SchemaJsonCodec {
    /// Decode projection bytes into a fresh value.
    ///
    /// # Errors
    ///
    /// Returns error when the type's projection rejects the bytes, or
    /// when the type declares the schema format without providing a
    /// projection.
    pub fn decode<T: Payload>(bytes: &[u8]) -> Result<T> {
        let mut value = T::default();
        value.merge_schema_json(bytes)?;
        Ok(value)
    }

    /// Encode a value as its schema JSON projection.
    #[inline]
    pub fn encode<T: Payload>(value: &T) -> Result<Vec<u8>> {
        value.to_schema_json()
    }
}
