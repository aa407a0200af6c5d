//! A single cookie and the `Set-Cookie` parser.
//!
//! Parsing follows the minimal grammar of RFC 6265: the first `;`-separated
//! part must be `name=value` with a non-empty name, otherwise the whole line is
//! rejected with [`ResponseError::MalformedCookie`]. Attributes are lenient. A
//! `Max-Age` or `Expires` value that cannot be parsed leaves that attribute
//! unset, and unknown attributes are ignored.

use serde::Serialize;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::errors::{ResponseError, Result};

/// A cookie as sent by the server in a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: Option<String>,
    max_age: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    expires: Option<OffsetDateTime>,
    secure: bool,
    http_only: bool,
    version: Option<u32>,
    comment: Option<String>,
    same_site: Option<String>,
}

impl Cookie {
    /// Creates a cookie with only a name and a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            max_age: None,
            expires: None,
            secure: false,
            http_only: false,
            version: None,
            comment: None,
            same_site: None,
        }
    }

    /// Parses the value of one `Set-Cookie` header.
    pub fn parse(set_cookie: &str) -> Result<Self> {
        let mut parts = set_cookie.split(';');
        let pair = parts.next().unwrap_or_default();

        let Some((name, value)) = pair.split_once('=') else {
            return Err(ResponseError::MalformedCookie(format!(
                "expected name=value in {set_cookie:?}"
            )));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ResponseError::MalformedCookie(format!(
                "empty cookie name in {set_cookie:?}"
            )));
        }

        let mut cookie = Cookie::new(name, value.trim());

        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.split_once('=') {
                Some((key, val)) => {
                    let val = val.trim();
                    match key.trim().to_ascii_lowercase().as_str() {
                        "domain" => {
                            cookie.domain = Some(val.trim_start_matches('.').to_string())
                        }
                        "path" => cookie.path = Some(val.to_string()),
                        "max-age" => match val.parse::<i64>() {
                            Ok(seconds) => cookie.max_age = Some(seconds),
                            Err(_) => log::warn!(
                                "Cookie {}: ignoring unparseable Max-Age {:?}",
                                cookie.name,
                                val
                            ),
                        },
                        "expires" => match parse_cookie_date(val) {
                            Some(date) => cookie.expires = Some(date),
                            None => log::warn!(
                                "Cookie {}: ignoring unparseable Expires {:?}",
                                cookie.name,
                                val
                            ),
                        },
                        "version" => cookie.version = val.parse().ok(),
                        "comment" => cookie.comment = Some(val.to_string()),
                        "samesite" => cookie.same_site = Some(normalize_same_site(val)),
                        _ => {}
                    }
                }
                None => {
                    if part.eq_ignore_ascii_case("secure") {
                        cookie.secure = true;
                    } else if part.eq_ignore_ascii_case("httponly") {
                        cookie.http_only = true;
                    }
                }
            }
        }

        Ok(cookie)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// `Max-Age` in seconds. Zero or negative means the cookie is expired.
    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.expires
    }

    pub fn has_expiry_date(&self) -> bool {
        self.expires.is_some()
    }

    pub fn is_secured(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// `SameSite` policy, normalized to `Strict`, `Lax` or `None` when recognized.
    pub fn same_site(&self) -> Option<&str> {
        self.same_site.as_deref()
    }
}

impl std::fmt::Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn normalize_same_site(val: &str) -> String {
    if val.eq_ignore_ascii_case("lax") {
        "Lax".to_string()
    } else if val.eq_ignore_ascii_case("strict") {
        "Strict".to_string()
    } else if val.eq_ignore_ascii_case("none") {
        "None".to_string()
    } else {
        val.to_string()
    }
}

/// Parses an `Expires` date in IMF-fixdate form or the older dashed form
/// (`Wed, 21-Oct-2015 07:28:00 GMT`). Dates are always GMT.
fn parse_cookie_date(val: &str) -> Option<OffsetDateTime> {
    let imf_fixdate = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let dashed = format_description!(
        "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
    );

    PrimitiveDateTime::parse(val, imf_fixdate)
        .or_else(|_| PrimitiveDateTime::parse(val, dashed))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
