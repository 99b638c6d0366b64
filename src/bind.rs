//! Query-string binder - decodes URL query parameters into record fields.
//!
//! [`bind`] takes a `key=value` query string and merges it into an existing
//! record by serde field name. Field naming follows the usual serde
//! attributes:
//!
//! - `#[serde(rename = "...")]` sets the external parameter name
//! - `#[serde(skip)]` removes a field from binding entirely
//! - `#[serde(flatten)]` merges an embedded record's fields into the same
//!   namespace (later same-named fields win, declaration order matters)
//!
//! Binding is per-field best effort: a pair that fails percent decoding,
//! does not parse as the field's kind, or does not fit the field's
//! declared width is dropped and the field keeps its prior value. Only
//! free-form string, boolean, integer and floating-point fields are
//! bound; everything else - sequences, nested records, options, and
//! kinds that merely serialize as strings such as chars or unit enum
//! variants - is left untouched. The returned error is reserved for
//! structural problems (the target does not serialize to a record).
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Page {
//!     limit: u32,
//!     #[serde(rename = "q")]
//!     term: String,
//! }
//!
//! let mut page = Page::default();
//! servwire::bind("limit=25&q=rust", &mut page).unwrap();
//! assert_eq!(page.limit, 25);
//! assert_eq!(page.term, "rust");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{Result, ServwireError};

/// Probe value only a free-form string field deserializes; chars, unit
/// enum variants and parsed newtypes all reject it.
const FREEFORM_PROBE: &str = "\u{1}servwire\u{1}probe\u{1}";

/// Bind a URL-encoded query string onto `target`.
///
/// Pairs are separated by `&` or `;`, both keys and values are
/// percent-decoded with `+` read as space. Pairs with an empty key or an
/// empty value are skipped - an absent parameter never zeroes a field.
/// Unknown keys are ignored.
pub fn bind<T>(query: &str, target: &mut T) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut doc = serde_json::to_value(&*target)?;
    if !doc.is_object() {
        return Err(ServwireError::BindTarget(value_kind(&doc)));
    }

    let mut rest = query;
    while !rest.is_empty() {
        let pair;
        match rest.find(['&', ';']) {
            Some(i) => {
                pair = &rest[..i];
                rest = &rest[i + 1..];
            }
            None => {
                pair = rest;
                rest = "";
            }
        }
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_val) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        if raw_val.is_empty() {
            continue;
        }

        let (key, val) = match (decode_component(raw_key), decode_component(raw_val)) {
            (Some(k), Some(v)) => (k, v),
            // malformed escape: drop this one pair, keep going
            _ => continue,
        };

        bind_field::<T>(&mut doc, &key, &val);
    }

    *target = serde_json::from_value(doc)?;
    Ok(())
}

/// Bind one decoded pair into its field slot, keeping the record
/// deserializable throughout: a value the field's declared type cannot
/// hold reverts the slot and drops only this pair.
fn bind_field<T: DeserializeOwned>(doc: &mut Value, key: &str, val: &str) {
    let slot = match doc.get_mut(key) {
        Some(slot) => slot,
        None => return,
    };
    let prior = slot.clone();

    if matches!(prior, Value::String(_)) {
        // kinds that merely serialize as strings (char, unit enum
        // variant, parsed newtype) reject the probe and stay untouched
        *slot = Value::String(FREEFORM_PROBE.to_owned());
        let freeform = T::deserialize(&*doc).is_ok();
        if let Some(slot) = doc.get_mut(key) {
            *slot = if freeform {
                Value::String(val.to_owned())
            } else {
                prior
            };
        }
        return;
    }

    if !coerce_scalar(slot, val) {
        return;
    }
    // parsed 64-bit wide; a narrower field rejects it here
    if T::deserialize(&*doc).is_err() {
        if let Some(slot) = doc.get_mut(key) {
            *slot = prior;
        }
    }
}

/// Percent-decode one key or value, treating `+` as space.
///
/// Returns `None` for malformed escapes (incomplete or non-hex `%`
/// sequences) and for byte sequences that do not decode to UTF-8.
fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|cow| cow.into_owned())
}

/// Coerce a decoded string into a boolean or numeric slot, reporting
/// whether the slot was written. Strings are gated by the caller's
/// free-form probe; non-scalar slots (arrays, nested records, null) are
/// never written.
fn coerce_scalar(slot: &mut Value, raw: &str) -> bool {
    match slot {
        Value::Bool(b) => match parse_bool(raw) {
            Some(parsed) => {
                *b = parsed;
                true
            }
            None => false,
        },
        Value::Number(n) => {
            if n.is_f64() {
                match raw.parse::<f64>().ok().and_then(Number::from_f64) {
                    Some(parsed) => {
                        *slot = Value::Number(parsed);
                        true
                    }
                    None => false,
                }
            } else if let Ok(parsed) = raw.parse::<i64>() {
                *slot = Value::Number(parsed.into());
                true
            } else if let Ok(parsed) = raw.parse::<u64>() {
                *slot = Value::Number(parsed.into());
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Lenient boolean parsing, the accepted spellings of query toggles.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "record",
    }
}
