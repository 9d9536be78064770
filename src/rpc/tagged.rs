//! Codec for the tracker's `__jsonclass__` tagged-value envelope.
//!
//! The tracker wraps non-primitive scalars in a two-element envelope so
//! they survive JSON transport:
//!
//! ```json
//! {"__jsonclass__": ["datetime", "2020-01-01T00:00:00"]}
//! {"__jsonclass__": ["binary", "aGVsbG8="]}
//! ```
//!
//! Payload interpretation depends entirely on the tag. An unrecognized tag
//! is carried through opaquely, never silently coerced.

use crate::error::{Result, TracError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Envelope tag for date/time payloads.
pub const TAG_DATETIME: &str = "datetime";
/// Envelope tag for base64-encoded binary payloads.
pub const TAG_BINARY: &str = "binary";

/// Wire shape of the envelope: a two-element `[tag, payload]` array under
/// the `__jsonclass__` key. The tuple enforces the arity on decode.
#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "__jsonclass__")]
    parts: (String, Value),
}

/// A decoded `__jsonclass__` value.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// A `datetime` payload, kept as opaque text; parsing into a real date
    /// type is the caller's concern. Numeric payloads are rendered to
    /// their decimal text form.
    DateTime(String),
    /// A `binary` payload, base64-decoded into raw bytes.
    Binary(Vec<u8>),
    /// Any tag this client does not know; payload passed through untouched.
    Unknown {
        /// The unrecognized tag.
        tag: String,
        /// The raw payload, exactly as received.
        payload: Value,
    },
}

impl TaggedValue {
    /// Wraps raw bytes into a `binary` tagged value.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Decodes a tagged value out of a raw response element.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| TracError::protocol(format!("invalid tagged value: {}", e)))
    }

    /// Returns the payload text of a `datetime` value.
    pub fn datetime_text(&self) -> Result<&str> {
        match self {
            Self::DateTime(text) => Ok(text),
            Self::Binary(_) => Err(TracError::protocol("expected datetime tag, got binary")),
            Self::Unknown { tag, .. } => Err(TracError::protocol(format!(
                "expected datetime tag, got '{}'",
                tag
            ))),
        }
    }

    /// Consumes a `binary` value into its raw bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Binary(bytes) => Ok(bytes),
            Self::DateTime(_) => Err(TracError::protocol("expected binary tag, got datetime")),
            Self::Unknown { tag, .. } => Err(TracError::protocol(format!(
                "expected binary tag, got '{}'",
                tag
            ))),
        }
    }
}

impl Serialize for TaggedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let parts = match self {
            Self::DateTime(text) => (TAG_DATETIME.to_string(), Value::String(text.clone())),
            Self::Binary(bytes) => (TAG_BINARY.to_string(), Value::String(STANDARD.encode(bytes))),
            Self::Unknown { tag, payload } => (tag.clone(), payload.clone()),
        };
        Envelope { parts }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaggedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let Envelope {
            parts: (tag, payload),
        } = Envelope::deserialize(deserializer)?;

        match tag.as_str() {
            TAG_DATETIME => match payload {
                Value::String(text) => Ok(Self::DateTime(text)),
                Value::Number(number) => Ok(Self::DateTime(number.to_string())),
                other => Err(D::Error::custom(format!(
                    "unsupported datetime payload: {}",
                    other
                ))),
            },
            TAG_BINARY => {
                let text = payload
                    .as_str()
                    .ok_or_else(|| D::Error::custom("binary payload must be a base64 string"))?;
                let bytes = STANDARD
                    .decode(text)
                    .map_err(|e| D::Error::custom(format!("invalid base64 payload: {}", e)))?;
                Ok(Self::Binary(bytes))
            }
            _ => Ok(Self::Unknown { tag, payload }),
        }
    }
}
