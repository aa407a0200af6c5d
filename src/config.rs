use std::sync::Arc;

use crate::deserializer::DeserializerRegistry;

/// Name of the session cookie used by servlet containers.
pub const DEFAULT_SESSION_ID_NAME: &str = "JSESSIONID";

/// Charset used when the response does not declare one.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Settings a [`Response`](crate::Response) reads but never changes.
///
/// A single config is usually shared between all responses of a test run,
/// so responses keep it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ResponseConfig {
    /// Cookie that carries the session id
    pub session_id_name: String,
    /// Charset label used to decode bodies without a declared charset
    pub default_charset: String,
    /// Deserializers used by `as_type` and `path`
    pub registry: Arc<DeserializerRegistry>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            session_id_name: DEFAULT_SESSION_ID_NAME.to_string(),
            default_charset: DEFAULT_CHARSET.to_string(),
            registry: Arc::new(DeserializerRegistry::with_defaults()),
        }
    }
}

impl ResponseConfig {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the name of the session cookie (default is `JSESSIONID`)
    pub fn session_id_name(mut self, name: impl Into<String>) -> Self {
        self.session_id_name = name.into();
        self
    }

    /// Sets the charset for bodies that declare none (default is `UTF-8`)
    pub fn default_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_charset = charset.into();
        self
    }

    /// Replaces the deserializer registry
    pub fn registry(mut self, registry: DeserializerRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }
}
