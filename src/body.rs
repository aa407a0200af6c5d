//! Response body: raw bytes plus memoized views over them.
//!
//! The raw bytes are kept for the whole lifetime of the response and never
//! consumed. Every derived view is computed on first use and cached:
//!
//! | View                 | Cache key                    | Error                            |
//! |----------------------|------------------------------|----------------------------------|
//! | decoded string       | -                            | `Encoding`                       |
//! | typed value          | `(TypeId, Option<Format>)`   | `UnsupportedContentType`, `Deserialization` |
//! | path tree            | -                            | `PathEvaluation`                 |
//!
//! Failures are not cached; a later call simply tries again.

mod path;

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use encoding_rs::Encoding;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cell::{OnceMap, TryOnce};
use crate::config::ResponseConfig;
use crate::content_type::ContentType;
use crate::deserializer::Format;
use crate::errors::{ResponseError, Result};
use path::Path;

type TypedCache = OnceMap<(TypeId, Option<Format>), Arc<dyn Any + Send + Sync>>;

pub struct ResponseBody {
    bytes: Vec<u8>,
    raw_content_type: Option<String>,
    config: Arc<ResponseConfig>,

    content_type: OnceLock<ContentType>,
    text: TryOnce<String>,
    tree: TryOnce<Value>,
    typed: TypedCache,
}

impl ResponseBody {
    pub(crate) fn new(
        bytes: Vec<u8>,
        raw_content_type: Option<String>,
        config: Arc<ResponseConfig>,
    ) -> Self {
        Self {
            bytes,
            raw_content_type,
            config,
            content_type: OnceLock::new(),
            text: TryOnce::new(),
            tree: TryOnce::new(),
            typed: OnceMap::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parsed `Content-Type` of the response this body belongs to.
    pub fn content_type(&self) -> &ContentType {
        self.content_type
            .get_or_init(|| ContentType::resolve(self.raw_content_type.as_deref()))
    }

    /// Body decoded with the declared charset, or the configured default
    /// charset when none is declared. A byte order mark overrides both.
    pub fn as_string(&self) -> Result<&str> {
        self.text
            .get_or_try_init(|| {
                let label = self
                    .content_type()
                    .charset()
                    .unwrap_or(&self.config.default_charset);
                decode(&self.bytes, label)
            })
            .map(String::as_str)
    }

    /// Deserializes the body into `T`, picking the deserializer from the
    /// content type.
    ///
    /// The result is cached per target type; calling again with the same `T`
    /// returns an equal value without deserializing again.
    pub fn as_type<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.typed_value(None)
    }

    /// Like [`as_type`](Self::as_type), but deserializes as `format` whatever
    /// the declared content type is.
    pub fn as_type_with<T>(&self, format: Format) -> Result<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.typed_value(Some(format))
    }

    /// Evaluates a path expression against the body tree. `Ok(None)` means the
    /// expression is valid but selects nothing.
    pub fn path_value(&self, expression: &str) -> Result<Option<Value>> {
        let path = Path::parse(expression)?;
        Ok(path.evaluate(self.tree()?))
    }

    /// Evaluates a path expression and converts the selected value into `T`.
    pub fn path<T: DeserializeOwned>(&self, expression: &str) -> Result<Option<T>> {
        self.path_value(expression)?
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    ResponseError::PathEvaluation(format!(
                        "value at {expression:?} has unexpected shape: {e}"
                    ))
                })
            })
            .transpose()
    }

    /// Logs the decoded body and returns it.
    pub fn print(&self) -> Result<&str> {
        let text = self.as_string()?;
        log::info!("{}", text);
        Ok(text)
    }

    /// Logs the body, re-indented when it is JSON, and returns what was logged.
    pub fn pretty_print(&self) -> Result<String> {
        let text = self.as_string()?;
        let pretty = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
            .unwrap_or_else(|| text.to_string());
        log::info!("{}", pretty);
        Ok(pretty)
    }

    fn typed_value<T>(&self, hint: Option<Format>) -> Result<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let key = (TypeId::of::<T>(), hint);
        let value = self.typed.get_or_try_init(key, || {
            let deserializer = self
                .config
                .registry
                .deserializer_for(self.content_type().mime_type(), hint)?;
            let text = self.as_string()?;

            let failed = |source: anyhow::Error| ResponseError::Deserialization {
                deserializer: deserializer.name().to_string(),
                source,
            };
            let tree = deserializer.deserialize(text).map_err(failed)?;
            let typed: T = serde_json::from_value(tree).map_err(|e| failed(e.into()))?;

            Ok::<_, ResponseError>(Arc::new(typed) as Arc<dyn Any + Send + Sync>)
        })?;

        log::trace!("Typed body {} available", std::any::type_name::<T>());
        value.downcast_ref::<T>().cloned().ok_or_else(|| {
            ResponseError::Deserialization {
                deserializer: "cache".to_string(),
                source: anyhow::anyhow!(
                    "cached body is not a {}",
                    std::any::type_name::<T>()
                ),
            }
        })
    }

    fn tree(&self) -> Result<&Value> {
        self.tree.get_or_try_init(|| {
            let mime_type = self.content_type().mime_type();
            let deserializer = self
                .config
                .registry
                .deserializer_for(mime_type, None)
                .map_err(|e| ResponseError::PathEvaluation(e.to_string()))?;
            let text = self.as_string()?;

            deserializer.deserialize(text).map_err(|e| {
                ResponseError::PathEvaluation(format!(
                    "cannot parse body as {}: {e}",
                    deserializer.name()
                ))
            })
        })
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody")
            .field("len", &self.bytes.len())
            .field("content_type", &self.raw_content_type)
            .field("cached_types", &self.typed.len())
            .finish()
    }
}

fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let (encoding, bytes) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                ResponseError::Encoding {
                    charset: label.to_string(),
                    reason: "unknown charset".to_string(),
                }
            })?;
            (encoding, bytes)
        }
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| ResponseError::Encoding {
            charset: encoding.name().to_string(),
            reason: "malformed byte sequence".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserializer::DeserializerRegistry;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Greeting {
        message: String,
        count: u32,
    }

    fn body(bytes: &[u8], content_type: Option<&str>) -> ResponseBody {
        ResponseBody::new(
            bytes.to_vec(),
            content_type.map(str::to_string),
            Arc::new(ResponseConfig::default()),
        )
    }

    #[test]
    fn decodes_declared_charset() {
        let b = body(b"caf\xe9", Some("text/plain; charset=ISO-8859-1"));
        assert_eq!(b.as_string().unwrap(), "café");
        assert_eq!(b.as_bytes(), b"caf\xe9");
    }

    #[test]
    fn invalid_utf8_is_encoding_error() {
        let b = body(b"caf\xe9", Some("text/plain"));
        assert!(matches!(b.as_string(), Err(ResponseError::Encoding { .. })));
        // bytes stay readable
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn unknown_charset_is_encoding_error() {
        let b = body(b"x", Some("text/plain; charset=klingon"));
        assert!(matches!(
            b.as_string(),
            Err(ResponseError::Encoding { charset, .. }) if charset == "klingon"
        ));
    }

    #[test]
    fn configured_default_charset_without_declared_one() {
        let config = Arc::new(ResponseConfig::default().default_charset("windows-1252"));
        let b = ResponseBody::new(b"a\xff".to_vec(), Some("text/plain".into()), config.clone());
        assert_eq!(b.as_string().unwrap(), "a\u{ff}");

        // A declared charset still wins over the configured one
        let b = ResponseBody::new(
            b"a\xc3\xbf".to_vec(),
            Some("text/plain; charset=utf-8".into()),
            config,
        );
        assert_eq!(b.as_string().unwrap(), "a\u{ff}");
    }

    #[test]
    fn bom_wins_over_declared_charset() {
        let b = body(b"\xef\xbb\xbf{\"a\":1}", Some("application/json; charset=ISO-8859-1"));
        assert_eq!(b.as_string().unwrap(), "{\"a\":1}");
        assert_eq!(b.as_type::<Value>().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn typed_json() {
        let b = body(br#"{"message":"hi","count":2}"#, Some("application/json"));
        let expected = Greeting {
            message: "hi".into(),
            count: 2,
        };
        assert_eq!(b.as_type::<Greeting>().unwrap(), expected);
        assert_eq!(b.as_type::<Greeting>().unwrap(), expected);
        assert_eq!(b.as_type::<Value>().unwrap()["count"], json!(2));
    }

    #[test]
    fn wrong_shape_is_deserialization_error_and_not_fatal() {
        let b = body(br#"{"message":"hi"}"#, Some("application/json"));
        assert!(matches!(
            b.as_type::<Greeting>(),
            Err(ResponseError::Deserialization { .. })
        ));
        assert_eq!(b.as_type::<Value>().unwrap(), json!({"message": "hi"}));
    }

    #[test]
    fn hint_overrides_content_type() {
        let b = body(br#"{"message":"hi","count":1}"#, Some("text/plain"));
        assert_eq!(b.as_type::<String>().unwrap(), r#"{"message":"hi","count":1}"#);
        assert_eq!(b.as_type_with::<Greeting>(Format::Json).unwrap().count, 1);
    }

    #[test]
    fn unsupported_content_type() {
        let b = body(b"\x89PNG", Some("image/png"));
        assert!(matches!(
            b.as_type::<Value>(),
            Err(ResponseError::UnsupportedContentType(_))
        ));
        assert!(matches!(
            b.path_value("a"),
            Err(ResponseError::PathEvaluation(_))
        ));
    }

    #[test]
    fn path_queries() {
        let b = body(
            br#"{"items":[{"id":1},{"id":2}],"next":null}"#,
            Some("application/vnd.api+json"),
        );
        assert_eq!(b.path::<u32>("items[1].id").unwrap(), Some(2));
        assert_eq!(b.path::<Vec<u32>>("items.id").unwrap(), Some(vec![1, 2]));
        assert_eq!(b.path_value("next").unwrap(), Some(Value::Null));
        assert_eq!(b.path_value("missing").unwrap(), None);
        assert!(matches!(b.path::<String>("items"), Err(ResponseError::PathEvaluation(_))));
        assert!(matches!(b.path_value("items[x]"), Err(ResponseError::PathEvaluation(_))));
    }

    #[test]
    fn unparseable_tree_is_path_error() {
        let b = body(b"{not json", Some("application/json"));
        assert!(matches!(b.path_value("a"), Err(ResponseError::PathEvaluation(_))));
    }

    #[test]
    fn default_format_applies_without_content_type() {
        let config = ResponseConfig::default()
            .registry(DeserializerRegistry::with_defaults().with_default_format(Format::Json));
        let b = ResponseBody::new(br#"{"a":1}"#.to_vec(), None, Arc::new(config));
        assert_eq!(b.path::<i32>("a").unwrap(), Some(1));
    }

    #[test]
    fn pretty_print_json() {
        let b = body(br#"{"a":[1]}"#, Some("application/json"));
        assert_eq!(b.pretty_print().unwrap(), "{\n  \"a\": [\n    1\n  ]\n}");
        assert_eq!(b.print().unwrap(), r#"{"a":[1]}"#);

        let b = body(b"plain", Some("text/plain"));
        assert_eq!(b.pretty_print().unwrap(), "plain");
    }
}
