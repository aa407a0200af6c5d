use std::sync::Arc;

use crate::deserializer::{builtin, Deserializer, DeserializerHandle, Format, MimePattern};
use crate::errors::{ResponseError, Result};

/// Maps MIME patterns and format hints to deserializers.
///
/// ### Resolution order
/// 1. An explicit [`Format`] hint always wins: the most recently registered
///    deserializer of that format whose pattern covers
///    [`Format::mime_type`], else the default if it has that format, else
///    the built-in one.
/// 2. An exact MIME type registration.
/// 3. A pattern registration (`application/*+json`, `text/*`, `*/*`).
/// 4. The default deserializer, if one is configured.
/// 5. Otherwise [`ResponseError::UnsupportedContentType`].
///
/// Within steps 1 to 3 the most recent registration wins, so callers can
/// override the built-in registrations.
#[derive(Clone, Default)]
pub struct DeserializerRegistry {
    entries: Vec<(MimePattern, DeserializerHandle)>,
    default: Option<DeserializerHandle>,
}

impl DeserializerRegistry {
    /// Creates a registry with no registrations and no default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in JSON, form and text registrations
    /// and no default.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register_handle("application/json", builtin(Format::Json))
            .register_handle("text/json", builtin(Format::Json))
            .register_handle("application/*+json", builtin(Format::Json))
            .register_handle("application/x-www-form-urlencoded", builtin(Format::Form))
            .register_handle("text/*", builtin(Format::Text));
        registry
    }

    /// Registers `deserializer` for `pattern`, taking precedence over earlier
    /// registrations that match the same types.
    pub fn register(
        &mut self,
        pattern: impl Into<MimePattern>,
        deserializer: impl Deserializer + 'static,
    ) -> &mut Self {
        self.register_handle(pattern, Arc::new(deserializer))
    }

    pub fn register_handle(
        &mut self,
        pattern: impl Into<MimePattern>,
        deserializer: DeserializerHandle,
    ) -> &mut Self {
        let pattern = pattern.into();
        log::debug!("Registering {} deserializer for {}", deserializer.name(), pattern);
        self.entries.push((pattern, deserializer));
        self
    }

    /// Sets the deserializer used when nothing matches the content type.
    pub fn set_default(&mut self, deserializer: impl Deserializer + 'static) -> &mut Self {
        self.default = Some(Arc::new(deserializer));
        self
    }

    /// Uses the built-in deserializer for `format` as default.
    pub fn with_default_format(mut self, format: Format) -> Self {
        self.default = Some(builtin(format));
        self
    }

    pub fn without_default(mut self) -> Self {
        self.default = None;
        self
    }

    pub fn default_deserializer(&self) -> Option<&DeserializerHandle> {
        self.default.as_ref()
    }

    /// Picks the deserializer for a body with the given (lower-cased) MIME
    /// type and optional explicit hint.
    pub fn deserializer_for(
        &self,
        mime_type: Option<&str>,
        hint: Option<Format>,
    ) -> Result<DeserializerHandle> {
        if let Some(format) = hint {
            let deserializer = self.for_format(format);
            log::debug!(
                "Using {} deserializer for explicit {} hint",
                deserializer.name(),
                format
            );
            return Ok(deserializer);
        }

        if let Some(mime_type) = mime_type {
            if let Some((pattern, deserializer)) = self.lookup(mime_type, |_| true) {
                log::debug!(
                    "Using {} deserializer for {} (registered as {})",
                    deserializer.name(),
                    mime_type,
                    pattern
                );
                return Ok(deserializer.clone());
            }
        }

        match &self.default {
            Some(deserializer) => {
                log::debug!(
                    "Using default {} deserializer for {}",
                    deserializer.name(),
                    mime_type.unwrap_or("<no content type>")
                );
                Ok(deserializer.clone())
            }
            None => Err(ResponseError::UnsupportedContentType(
                mime_type.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Newest deserializer of `format` registered for the format's own MIME
    /// type, then the default if it has that format, then the built-in one.
    fn for_format(&self, format: Format) -> DeserializerHandle {
        self.lookup(format.mime_type(), |d| d.format() == format)
            .map(|(_, d)| d)
            .or_else(|| self.default.as_ref().filter(|d| d.format() == format))
            .cloned()
            .unwrap_or_else(|| builtin(format))
    }

    /// Newest exact registration for `mime_type` accepted by `accept`, else
    /// the newest such pattern registration.
    fn lookup(
        &self,
        mime_type: &str,
        accept: impl Fn(&DeserializerHandle) -> bool,
    ) -> Option<&(MimePattern, DeserializerHandle)> {
        let accept = &accept;
        let newest_first = move || {
            self.entries
                .iter()
                .rev()
                .filter(move |(p, d)| p.matches(mime_type) && accept(d))
        };
        newest_first()
            .find(|(p, _)| p.is_exact())
            .or_else(|| newest_first().find(|(p, _)| !p.is_exact()))
    }
}

impl std::fmt::Debug for DeserializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializerRegistry")
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|(p, d)| format!("{p} => {}", d.name()))
                    .collect::<Vec<_>>(),
            )
            .field("default", &self.default.as_ref().map(|d| d.name()))
            .finish()
    }
}
