//! Generic JSON codec using `serde_json`.
//!
//! This is the default wire format for plain serde records. RPC request
//! decoding additionally merges body JSON *onto* an already-populated
//! value ([`JsonCodec::decode_onto`]), which is how body fields overwrite
//! query-string fields.
//!
//! # Example
//!
//! ```
//! use servwire::codec::JsonCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message {
//!     id: u32,
//!     content: String,
//! }
//!
//! let msg = Message { id: 42, content: "hello".to_string() };
//! let encoded = JsonCodec::encode(&msg).unwrap();
//! let decoded: Message = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Generic JSON codec for plain serde records.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode JSON bytes on top of an existing value.
    ///
    /// Fields present in `bytes` overwrite the corresponding fields of
    /// `base`; nested records merge recursively; fields absent from
    /// `bytes` keep their prior values. Unknown fields in `bytes` are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns error on malformed JSON, or when a body value has the
    /// wrong shape for its field.
    pub fn decode_onto<T>(base: T, bytes: &[u8]) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut doc = serde_json::to_value(&base)?;
        let overlay: Value = serde_json::from_slice(bytes)?;
        merge(&mut doc, overlay);
        Ok(serde_json::from_value(doc)?)
    }
}

/// Recursive JSON merge: records merge key-wise, everything else replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay,
    }
}
