/// Errors raised while building or reading a [`Response`](crate::Response).
///
/// Construction-time variants (`MalformedHeader`, `MalformedCookie`,
/// `MalformedStatusLine`) fail the whole response. The remaining variants are
/// raised lazily by body accessors and only affect the call that produced them.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Malformed cookie: {0}")]
    MalformedCookie(String),

    #[error("Malformed status line: {0}")]
    MalformedStatusLine(String),

    #[error("Cannot decode body as {charset}: {reason}")]
    Encoding { charset: String, reason: String },

    #[error("No deserializer for content type {0}")]
    UnsupportedContentType(String),

    #[error("Deserialization with {deserializer} failed: {source}")]
    Deserialization {
        deserializer: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Path evaluation error: {0}")]
    PathEvaluation(String),
}

pub type Result<T> = std::result::Result<T, ResponseError>;
