use std::sync::{Arc, OnceLock};

use http::StatusCode;

use crate::body::ResponseBody;
use crate::config::ResponseConfig;
use crate::cookies::Cookies;
use crate::errors::{ResponseError, Result};
use crate::headers::{Header, Headers};
use crate::response::Response;

/// Assembles a [`Response`] from what the transport received.
///
/// Setters never fail; the first invalid input is remembered and returned by
/// [`build`](Self::build), so no partially valid response is ever produced.
///
/// ```rust
/// use restcheck::Response;
///
/// let response = Response::builder()
///     .status_line("HTTP/1.1 201 Created")
///     .header("Content-Type", "application/json")
///     .header("Set-Cookie", "JSESSIONID=abc; Path=/")
///     .body(r#"{"id":7}"#)
///     .build()
///     .unwrap();
///
/// assert_eq!(response.status_code(), 201);
/// assert_eq!(response.session_id(), Some("abc"));
/// assert_eq!(response.path::<u32>("id").unwrap(), Some(7));
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    inner: Result<Parts>,
}

#[derive(Debug, Default)]
struct Parts {
    status: Option<u16>,
    status_line: Option<String>,
    headers: Vec<Header>,
    set_cookies: Option<Vec<String>>,
    body: Vec<u8>,
    config: Option<Arc<ResponseConfig>>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self {
            inner: Ok(Parts::default()),
        }
    }

    /// Numeric status code. When no status line is given one is synthesized
    /// from the canonical reason phrase.
    pub fn status(self, status: u16) -> Self {
        self.and_then(|mut parts| {
            parts.status = Some(status);
            Ok(parts)
        })
    }

    /// Full status line, e.g. `HTTP/1.1 404 Not Found`. The status code is
    /// taken from it when [`status`](Self::status) is not set; when both are
    /// set they must agree.
    pub fn status_line(self, line: impl Into<String>) -> Self {
        let line: String = line.into();
        self.and_then(|mut parts| {
            parts.status_line = Some(line.trim_end_matches(['\r', '\n']).to_string());
            Ok(parts)
        })
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.and_then(|mut parts| {
            parts.headers.push(Header::new(name, value)?);
            Ok(parts)
        })
    }

    /// Adds a header from a raw `Name: value` line.
    pub fn raw_header(self, line: &str) -> Self {
        self.and_then(|mut parts| {
            parts.headers.push(Header::parse(line)?);
            Ok(parts)
        })
    }

    /// Reads a raw HTTP/1.x response head: the status line followed by header
    /// lines, up to the first empty line.
    pub fn raw_head(self, head: &str) -> Self {
        let mut lines = head.lines();
        let mut builder = match lines.next() {
            Some(status_line) => self.status_line(status_line),
            None => self,
        };
        for line in lines.take_while(|l| !l.trim().is_empty()) {
            builder = builder.raw_header(line);
        }
        builder
    }

    /// `Set-Cookie` values already separated by the transport. When given,
    /// they are used instead of the `Set-Cookie` headers.
    pub fn set_cookies<S: Into<String>>(self, values: impl IntoIterator<Item = S>) -> Self {
        self.and_then(|mut parts| {
            parts.set_cookies = Some(values.into_iter().map(Into::into).collect());
            Ok(parts)
        })
    }

    pub fn body(self, body: impl Into<Vec<u8>>) -> Self {
        self.and_then(|mut parts| {
            parts.body = body.into();
            Ok(parts)
        })
    }

    /// Shared configuration. Defaults to [`ResponseConfig::default`].
    pub fn config(self, config: impl Into<Arc<ResponseConfig>>) -> Self {
        self.and_then(|mut parts| {
            parts.config = Some(config.into());
            Ok(parts)
        })
    }

    pub fn build(self) -> Result<Response> {
        let parts = self.inner?;
        let (status_code, status_line) = resolve_status(parts.status, parts.status_line)?;

        let headers = Headers::new(parts.headers);
        let cookies = match &parts.set_cookies {
            Some(values) => Cookies::parse(values.iter().map(String::as_str))?,
            None => Cookies::parse(headers.get_all("set-cookie"))?,
        };

        let config = parts.config.unwrap_or_default();
        let content_type = headers.get("content-type").map(str::to_string);
        let body = ResponseBody::new(parts.body, content_type, config.clone());

        log::debug!(
            "Built response {:?}: {} headers, {} cookies, {} body bytes",
            status_line,
            headers.len(),
            cookies.len(),
            body.len()
        );

        Ok(Response {
            status_code,
            status_line,
            headers,
            cookies,
            body,
            config,
            session_id: OnceLock::new(),
        })
    }

    fn and_then(self, f: impl FnOnce(Parts) -> Result<Parts>) -> Self {
        Self {
            inner: self.inner.and_then(f),
        }
    }
}

fn resolve_status(status: Option<u16>, line: Option<String>) -> Result<(u16, String)> {
    let malformed = |reason: String| ResponseError::MalformedStatusLine(reason);

    let code = match (status, line.as_deref().map(code_from_line)) {
        (Some(code), Some(from_line)) => {
            let from_line = from_line?;
            if from_line != code {
                return Err(malformed(format!(
                    "status {code} contradicts status line {:?}",
                    line.as_deref().unwrap_or_default()
                )));
            }
            code
        }
        (Some(code), None) => code,
        (None, Some(from_line)) => from_line?,
        (None, None) => return Err(malformed("no status code or status line".to_string())),
    };

    let status = StatusCode::from_u16(code)
        .map_err(|_| malformed(format!("{code} is not a valid status code")))?;

    let line = line.unwrap_or_else(|| {
        format!(
            "HTTP/1.1 {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string()
    });

    Ok((code, line))
}

/// Status code of an `HTTP/x.y <code> [reason]` line.
fn code_from_line(line: &str) -> Result<u16> {
    let mut tokens = line.split_whitespace();
    let version = tokens.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(ResponseError::MalformedStatusLine(format!(
            "{line:?} does not start with HTTP/"
        )));
    }
    tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| ResponseError::MalformedStatusLine(format!("{line:?} has no status code")))
}
