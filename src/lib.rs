//! Typed read surface over a completed HTTP response.
//!
//! The transport hands over status, headers and body once; [`Response`]
//! exposes them through case-insensitive header lookups, first-wins cookie
//! lookups, session id resolution, and body deserialization that picks a
//! parser from the content type.
//!
//! ```rust
//! use restcheck::Response;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, PartialEq, Deserialize)]
//! struct Lotto { id: u32, numbers: Vec<u8> }
//!
//! let response = Response::builder()
//!     .status(200)
//!     .header("Content-Type", "application/json; charset=utf-8")
//!     .body(r#"{"id": 5, "numbers": [52, 3, 12]}"#)
//!     .build()
//!     .unwrap();
//!
//! let lotto: Lotto = response.as_type().unwrap();
//! assert_eq!(lotto.numbers, vec![52, 3, 12]);
//! assert_eq!(response.path::<u8>("numbers[-1]").unwrap(), Some(12));
//! ```

pub mod body;
pub mod cell;
pub mod config;
pub mod content_type;
pub mod cookies;
pub mod deserializer;
pub mod errors;
pub mod headers;
pub mod response;

pub use body::ResponseBody;
pub use config::ResponseConfig;
pub use content_type::ContentType;
pub use cookies::{Cookie, Cookies};
pub use deserializer::{Deserializer, DeserializerRegistry, Format};
pub use errors::{ResponseError, Result};
pub use headers::{Header, Headers};
pub use response::{Response, ResponseBuilder};
