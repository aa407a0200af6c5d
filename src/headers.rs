//! Response headers in network arrival order.
//!
//! [`Headers`] is an ordered multi-map: the same name may appear several times
//! (`Set-Cookie`, `Vary`, ...) and every occurrence is kept. Name lookups are
//! ASCII case-insensitive. Single-value lookups return the first occurrence;
//! [`Headers::get_all`] returns every occurrence in the order received.

use http::{HeaderName, HeaderValue};
use serde::Serialize;

use crate::errors::{ResponseError, Result};

/// A single `name: value` header as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    /// Creates a header, validating the name as an HTTP token and the value as
    /// a legal field value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let value = value.into();

        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ResponseError::MalformedHeader(format!("invalid header name {name:?}")))?;
        HeaderValue::from_str(&value).map_err(|_| {
            ResponseError::MalformedHeader(format!("invalid value for header {name:?}"))
        })?;

        Ok(Self {
            name,
            value: value.trim().to_string(),
        })
    }

    /// Parses a raw `Name: value` header line.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some((name, value)) = line.split_once(':') else {
            return Err(ResponseError::MalformedHeader(format!(
                "missing ':' in header line {line:?}"
            )));
        };
        Self::new(name, value.trim())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if this header is called `name`, ignoring ASCII case.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// All headers of a response, in the order they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headers {
    headers: Vec<Header>,
}

impl Headers {
    pub fn new(headers: Vec<Header>) -> Self {
        Self { headers }
    }

    /// Builds a collection from `(name, value)` pairs, failing on the first
    /// invalid pair.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Result<Self>
    where
        N: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| Header::new(name, value))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Value of the first header called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_header(name).map(Header::value)
    }

    /// First header called `name`.
    pub fn get_header(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.has_name(name))
    }

    /// Values of every header called `name`, in arrival order. Empty if there
    /// is none.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| h.has_name(name))
            .map(Header::value)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
