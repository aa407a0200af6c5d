use serde::Serialize;

/// MIME type and charset taken from a `Content-Type` header.
///
/// Both fields are `None` when the header is absent or empty. An unknown MIME
/// type is not an error; deserializer lookup falls back to the configured
/// default instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentType {
    mime_type: Option<String>,
    charset: Option<String>,
}

impl ContentType {
    /// Parses a raw `Content-Type` value such as
    /// `application/json; charset=ISO-8859-1`.
    ///
    /// The MIME type is trimmed and lower-cased. The charset keeps its case,
    /// with surrounding quotes removed.
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let mut tokens = raw.split(';');
        let mime_type = tokens
            .next()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty());

        let charset = tokens
            .filter_map(|t| t.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty());

        Self { mime_type, charset }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }
}
