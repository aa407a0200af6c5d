use serde_json::{Map, Value};

use crate::deserializer::{Deserializer, Format};

/// `application/x-www-form-urlencoded` bodies.
///
/// Produces an object of string values. A key that occurs more than once maps
/// to an array of its values in body order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDeserializer;

impl Deserializer for FormDeserializer {
    fn name(&self) -> &str {
        "form"
    }

    fn format(&self) -> Format {
        Format::Form
    }

    fn deserialize(&self, body: &str) -> anyhow::Result<Value> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body.trim())?;

        let mut map = Map::new();
        for (key, value) in pairs {
            match map.get_mut(&key) {
                Some(Value::Array(values)) => values.push(Value::String(value)),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value)]);
                }
                None => {
                    map.insert(key, Value::String(value));
                }
            }
        }

        Ok(Value::Object(map))
    }
}
