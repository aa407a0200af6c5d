//! The read surface of a completed HTTP exchange.
//!
//! A [`Response`] is built once by [`ResponseBuilder`] after the transport has
//! received status, headers and body, and is immutable afterwards. Derived
//! values (parsed content type, session id, decoded and deserialized body) are
//! computed on first access and cached, so a response can be shared between
//! threads and read concurrently.
//!
//! ## Notes
//! - Lookups of absent headers or cookies return `None`; errors are reserved
//!   for malformed input and failed conversions.
//! - Body shortcuts (`as_type`, `path`, ...) delegate to [`ResponseBody`].

mod builder;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use builder::ResponseBuilder;

use crate::body::ResponseBody;
use crate::config::ResponseConfig;
use crate::content_type::ContentType;
use crate::cookies::{Cookie, Cookies};
use crate::deserializer::Format;
use crate::errors::Result;
use crate::headers::Headers;

#[derive(Debug)]
pub struct Response {
    status_code: u16,
    status_line: String,
    headers: Headers,
    cookies: Cookies,
    body: ResponseBody,
    config: Arc<ResponseConfig>,
    session_id: OnceLock<Option<String>>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Returns the same response; lets call chains end on a response.
    pub fn and_return(&self) -> &Self {
        self
    }

    /// Returns the same response; lets call chains end on a response.
    pub fn then_return(&self) -> &Self {
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Status line as received, e.g. `HTTP/1.1 200 OK`.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Reason phrase from the status line, if it has one.
    pub fn reason_phrase(&self) -> Option<&str> {
        let mut parts = self.status_line.splitn(3, ' ');
        parts.nth(2).map(str::trim).filter(|r| !r.is_empty())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of the header called `name` (case-insensitive). Use
    /// [`Headers::get_all`] for every value of a repeated header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Cookies as `name -> value`. When a name was set more than once the
    /// first value is used; see [`detailed_cookies`](Self::detailed_cookies)
    /// for all of them.
    pub fn cookies(&self) -> HashMap<String, String> {
        self.cookies.as_simple_map()
    }

    pub fn detailed_cookies(&self) -> &Cookies {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.value(name)
    }

    pub fn detailed_cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Raw `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// `Content-Type` split into MIME type and charset.
    pub fn parsed_content_type(&self) -> &ContentType {
        self.body.content_type()
    }

    /// Value of the session cookie named by
    /// [`ResponseConfig::session_id_name`].
    pub fn session_id(&self) -> Option<&str> {
        self.session_id
            .get_or_init(|| {
                self.cookies
                    .value(&self.config.session_id_name)
                    .map(str::to_string)
            })
            .as_deref()
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    pub fn as_string(&self) -> Result<&str> {
        self.body.as_string()
    }

    pub fn as_type<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.body.as_type()
    }

    pub fn as_type_with<T>(&self, format: Format) -> Result<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.body.as_type_with(format)
    }

    pub fn path<T: DeserializeOwned>(&self, expression: &str) -> Result<Option<T>> {
        self.body.path(expression)
    }

    pub fn path_value(&self, expression: &str) -> Result<Option<Value>> {
        self.body.path_value(expression)
    }
}
