//! Adapters for emitting masked values through `slog`.
//!
//! [`MaskedJson`] is a `slog::Value` that serializes an already masked value
//! as structured JSON via `slog`'s nested-value support. The logged
//! representation is always derived from the masked value, never from the
//! original.
//!
//! Logging stays infallible: serialization failures are represented as a
//! placeholder string rather than propagated to `slog`.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{mask, MaskPolicy, Maskable};

const SERIALIZE_FAILED: &str = "Failed to serialize masked value";

/// A `slog::Value` that emits an owned masked payload as structured JSON.
pub struct MaskedJson {
    value: JsonValue,
}

impl MaskedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The JSON payload that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for MaskedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their masked form as JSON.
///
/// ```ignore
/// use obscura::slog::IntoMaskedJson;
///
/// info!(logger, "signup"; "customer" => customer.into_masked_json());
/// ```
pub trait IntoMaskedJson: Maskable + Serialize + Sized {
    /// Masks declared fields of `self` and captures the result as JSON.
    fn into_masked_json(self) -> MaskedJson {
        masked_json(self, None)
    }

    /// Like [`into_masked_json`](Self::into_masked_json), with `fallback`
    /// applied to undeclared text.
    fn into_masked_json_or(self, fallback: &MaskPolicy) -> MaskedJson {
        masked_json(self, Some(fallback))
    }
}

impl<T> IntoMaskedJson for T where T: Maskable + Serialize {}

fn masked_json<T: Maskable + Serialize>(mut value: T, fallback: Option<&MaskPolicy>) -> MaskedJson {
    mask(&mut value, fallback);
    let json = serde_json::to_value(&value)
        .unwrap_or_else(|_| JsonValue::String(SERIALIZE_FAILED.to_string()));
    MaskedJson::new(json)
}
