//! Body deserializers and the registry that picks one for a response.
//!
//! A [`Deserializer`] turns a decoded body into a `serde_json::Value` tree.
//! The tree is both what `path` queries run against and what typed results are
//! built from (via `serde_json::from_value`), so every format only needs to know
//! how to produce a tree.
//!
//! Three formats are built in:
//! - [`JsonDeserializer`]: `application/json`, `text/json`, `application/*+json`
//! - [`FormDeserializer`]: `application/x-www-form-urlencoded`
//! - [`TextDeserializer`]: `text/*`, the body as a single string
//!
//! See [`DeserializerRegistry`] for how a deserializer is chosen.
//!
//! ## Example: custom deserializer
//! ```rust
//! use restcheck::deserializer::{Deserializer, DeserializerRegistry, Format};
//! use serde_json::Value;
//!
//! struct Csv;
//!
//! impl Deserializer for Csv {
//!     fn name(&self) -> &str { "csv" }
//!     fn format(&self) -> Format { Format::Text }
//!     fn deserialize(&self, body: &str) -> anyhow::Result<Value> {
//!         Ok(body.lines().map(|l| Value::from(l.split(',').collect::<Vec<_>>())).collect())
//!     }
//! }
//!
//! let mut registry = DeserializerRegistry::with_defaults();
//! registry.register("text/csv", Csv);
//!
//! let csv = registry.deserializer_for(Some("text/csv"), None).unwrap();
//! assert_eq!(csv.name(), "csv");
//! // A text hint still means plain text
//! let text = registry.deserializer_for(Some("text/csv"), Some(Format::Text)).unwrap();
//! assert_eq!(text.name(), "text");
//! ```

mod form;
mod json;
mod pattern;
mod registry;
mod text;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

pub use form::FormDeserializer;
pub use json::JsonDeserializer;
pub use pattern::MimePattern;
pub use registry::DeserializerRegistry;
pub use text::TextDeserializer;

/// Explicit format hint. A hint always wins over the declared content type.
///
/// A hint means "parse as if served as [`Format::mime_type`]": registrations
/// for other types, such as a custom `text/csv`, do not change what a hint
/// selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
    Json,
    Form,
    Text,
}

impl Format {
    /// MIME type a body of this format is served as. A hint resolves to the
    /// deserializer registered for this type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Form => "application/x-www-form-urlencoded",
            Format::Text => "text/plain",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Form => write!(f, "form"),
            Format::Text => write!(f, "text"),
        }
    }
}

/// Turns a decoded body into a value tree.
///
/// Implementations must either return the complete tree or fail; a partial
/// tree must never be returned. Failures are reported to callers as
/// [`ResponseError::Deserialization`](crate::ResponseError::Deserialization)
/// with the returned error as source.
pub trait Deserializer: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Format this deserializer handles. Used to resolve explicit hints.
    fn format(&self) -> Format;

    fn deserialize(&self, body: &str) -> anyhow::Result<Value>;
}

/// Shared, type-erased deserializer.
pub type DeserializerHandle = Arc<dyn Deserializer>;

/// Built-in deserializer for `format`.
pub fn builtin(format: Format) -> DeserializerHandle {
    match format {
        Format::Json => Arc::new(JsonDeserializer),
        Format::Form => Arc::new(FormDeserializer),
        Format::Text => Arc::new(TextDeserializer),
    }
}
