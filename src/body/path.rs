//! Path expressions over a parsed body tree.
//!
//! Grammar:
//! - `$` or the empty string selects the whole tree
//! - `a.b.c` walks object keys
//! - `a[0]`, `a[-1]` index arrays, negative indices count from the end
//! - `a["key.with.dots"]` or `a['key']` quote keys that are not plain words
//!
//! A key applied to an array is applied to every element and the matches are
//! collected into a new array, so `items.id` lists the `id` of every item.

use serde_json::Value;

use crate::errors::{ResponseError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub(crate) fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            ResponseError::PathEvaluation(format!("invalid path {expression:?}: {reason}"))
        };

        let mut rest = expression.trim();
        if let Some(stripped) = rest.strip_prefix('$') {
            rest = stripped.strip_prefix('.').unwrap_or(stripped);
            if stripped.starts_with('.') && rest.is_empty() {
                return Err(invalid("trailing '.'"));
            }
        }

        let mut segments = Vec::new();
        let mut expect_key = !rest.is_empty() && !rest.starts_with('[');

        while !rest.is_empty() || expect_key {
            if let Some(after) = rest.strip_prefix('[') {
                let Some(end) = closing_bracket(after) else {
                    return Err(invalid("unclosed '['"));
                };
                segments.push(bracket_segment(after[..end].trim()).ok_or_else(|| {
                    invalid("bracket must hold an integer or a quoted key")
                })?);
                rest = &after[end + 1..];
            } else if expect_key {
                let end = rest.find(['.', '[']).unwrap_or(rest.len());
                let key = &rest[..end];
                if key.is_empty() {
                    return Err(invalid("empty key"));
                }
                if key.contains(']') {
                    return Err(invalid("unexpected ']'"));
                }
                segments.push(Segment::Key(key.to_string()));
                rest = &rest[end..];
            } else {
                return Err(invalid("expected '.' or '['"));
            }

            expect_key = false;
            if let Some(after) = rest.strip_prefix('.') {
                rest = after;
                expect_key = true;
            }
        }

        Ok(Self { segments })
    }

    pub(crate) fn evaluate(&self, tree: &Value) -> Option<Value> {
        select(tree, &self.segments)
    }
}

/// Offset of the `]` that closes a bracket opened just before `after`. A
/// quoted key may itself contain `]`.
fn closing_bracket(after: &str) -> Option<usize> {
    let content = after.trim_start();
    let mut key_end = after.len() - content.len();
    if let Some(quote) = content.chars().next().filter(|c| matches!(*c, '"' | '\'')) {
        key_end += 1 + content[1..].find(quote)? + 1;
    }
    after[key_end..].find(']').map(|i| key_end + i)
}

fn bracket_segment(inner: &str) -> Option<Segment> {
    for quote in ['"', '\''] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return Some(Segment::Key(key.to_string()));
        }
    }
    inner.parse().ok().map(Segment::Index)
}

fn select(value: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get(key).and_then(|v| select(v, rest)),
        (Segment::Key(_), Value::Array(items)) => Some(Value::Array(
            items.iter().filter_map(|item| select(item, segments)).collect(),
        )),
        (Segment::Index(index), Value::Array(items)) => {
            let len = items.len() as i64;
            let index = if *index < 0 { len + index } else { *index };
            if (0..len).contains(&index) {
                select(&items[index as usize], rest)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(expression: &str, tree: &Value) -> Option<Value> {
        Path::parse(expression).unwrap().evaluate(tree)
    }

    fn sample() -> Value {
        json!({
            "store": {
                "name": "corner",
                "items": [
                    {"id": 1, "tags": ["a", "b"]},
                    {"id": 2, "tags": []},
                    {"id": 3}
                ]
            },
            "dotted.key": true
        })
    }

    #[test]
    fn root() {
        let tree = sample();
        assert_eq!(eval("", &tree), Some(tree.clone()));
        assert_eq!(eval("$", &tree), Some(tree.clone()));
    }

    #[test]
    fn keys_and_indices() {
        let tree = sample();
        assert_eq!(eval("store.name", &tree), Some(json!("corner")));
        assert_eq!(eval("$.store.name", &tree), Some(json!("corner")));
        assert_eq!(eval("store.items[0].id", &tree), Some(json!(1)));
        assert_eq!(eval("store.items[-1].id", &tree), Some(json!(3)));
        assert_eq!(eval("store.items[0].tags[1]", &tree), Some(json!("b")));
        assert_eq!(eval("['dotted.key']", &tree), Some(json!(true)));
        assert_eq!(eval("store[\"name\"]", &tree), Some(json!("corner")));
    }

    #[test]
    fn quoted_keys_may_hold_brackets() {
        let tree = json!({"a]b": {"[x]": 1}, "list": [{"k]": "v"}]});
        assert_eq!(eval("[\"a]b\"]['[x]']", &tree), Some(json!(1)));
        assert_eq!(eval("list[0][\"k]\"]", &tree), Some(json!("v")));
        assert!(Path::parse("[\"a]b]").is_err());
    }

    #[test]
    fn key_spreads_over_arrays() {
        let tree = sample();
        assert_eq!(eval("store.items.id", &tree), Some(json!([1, 2, 3])));
    }

    #[test]
    fn misses_are_none() {
        let tree = sample();
        assert_eq!(eval("store.missing", &tree), None);
        assert_eq!(eval("store.items[3]", &tree), None);
        assert_eq!(eval("store.items[-4]", &tree), None);
        assert_eq!(eval("store.name.first", &tree), None);
        assert_eq!(eval("store[0]", &tree), None);
    }

    #[test]
    fn malformed_expressions() {
        for expression in ["a..b", "a.", "$.", "a[1", "a[x]", "a]b", "a[0]b", ".", "['open]"] {
            assert!(
                matches!(Path::parse(expression), Err(ResponseError::PathEvaluation(_))),
                "{expression:?} should be rejected"
            );
        }
    }
}
