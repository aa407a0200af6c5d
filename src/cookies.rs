//! Cookies: [`Cookie`] and the [`Cookies`] collection of a response.
//!
//! A response may set the same cookie name more than once. [`Cookies`] keeps
//! every occurrence in the order received. Single-value lookups and the simple
//! `name -> value` projection use the first occurrence.

mod cookie;

use std::collections::HashMap;

use serde::Serialize;

pub use cookie::Cookie;

use crate::errors::Result;

/// All cookies set by a response, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cookies {
    cookies: Vec<Cookie>,
}

impl Cookies {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }

    /// Parses every `Set-Cookie` value, failing on the first malformed one.
    pub fn parse<'a>(set_cookies: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        set_cookies
            .into_iter()
            .map(Cookie::parse)
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Value of the first cookie called `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(Cookie::value)
    }

    /// First cookie called `name`, with all its attributes.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    /// Every cookie called `name`, in arrival order.
    pub fn get_all(&self, name: &str) -> Vec<&Cookie> {
        self.cookies.iter().filter(|c| c.name() == name).collect()
    }

    /// Values of every cookie called `name`, in arrival order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.cookies
            .iter()
            .filter(|c| c.name() == name)
            .map(Cookie::value)
            .collect()
    }

    /// Projects the collection to `name -> value`. When a name occurs more than
    /// once the first value wins.
    pub fn as_simple_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(self.cookies.len());
        for cookie in &self.cookies {
            map.entry(cookie.name().to_string())
                .or_insert_with(|| cookie.value().to_string());
        }
        map
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cookie> {
        self.cookies.iter()
    }
}

impl<'a> IntoIterator for &'a Cookies {
    type Item = &'a Cookie;
    type IntoIter = std::slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
