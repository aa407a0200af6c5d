use serde_json::Value;

use crate::deserializer::{Deserializer, Format};

/// JSON bodies, parsed with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl Deserializer for JsonDeserializer {
    fn name(&self) -> &str {
        "json"
    }

    fn format(&self) -> Format {
        Format::Json
    }

    fn deserialize(&self, body: &str) -> anyhow::Result<Value> {
        Ok(serde_json::from_str(body)?)
    }
}
