use serde_json::Value;

use crate::deserializer::{Deserializer, Format};

/// Plain text: the whole body becomes one string value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDeserializer;

impl Deserializer for TextDeserializer {
    fn name(&self) -> &str {
        "text"
    }

    fn format(&self) -> Format {
        Format::Text
    }

    fn deserialize(&self, body: &str) -> anyhow::Result<Value> {
        Ok(Value::String(body.to_string()))
    }
}
