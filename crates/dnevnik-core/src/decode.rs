//! Structural decoding of JSON responses into typed records.
//!
//! Every record declares its fields through `serde::Deserialize`; nested
//! record fields are decoded recursively and everything else is taken as is.
//! Failures carry the short name of the target type.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decode `raw` into `T`.
pub fn decode<T: DeserializeOwned>(raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|source| Error::Decode {
        type_name: short_type_name::<T>(),
        source,
    })
}

/// Decode the value stored under `key` of a response object.
///
/// A missing key fails the same way a missing record field does.
pub fn decode_field<T: DeserializeOwned>(mut raw: Value, key: &str) -> Result<T> {
    let field = raw
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| Error::Decode {
            type_name: short_type_name::<T>(),
            source: serde::de::Error::custom(format_args!("missing field `{}`", key)),
        })?;
    decode(field)
}

/// `alloc::vec::Vec<dnevnik_core::models::Period>` -> `Vec<Period>`
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let outer = full.split('<').next().unwrap_or(full);
    match outer.rsplit("::").next() {
        Some(name) if outer.len() == full.len() => name,
        _ => full
            .rsplit_once('<')
            .and_then(|(_, inner)| inner.trim_end_matches('>').rsplit("::").next())
            .unwrap_or(full),
    }
}
