//! Response envelope normalisation.
//!
//! The API answers either with the bare payload or with `{"data": payload}`.
//! Both shapes decode into the same value here, so nothing above the client
//! ever sees the envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a response body, unwrapping `{"data": ...}` when present.
///
/// An object carrying a `data` key is first read as an envelope; if the
/// payload does not fit, the whole object is tried as a bare value.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)?
    };

    let envelope_payload = value.as_object().and_then(|object| object.get("data")).cloned();
    match envelope_payload {
        Some(data) => T::deserialize(data)
            .or_else(|envelope_err| T::deserialize(value).map_err(|_| envelope_err)),
        None => T::deserialize(value),
    }
}
