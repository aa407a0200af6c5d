/// MIME pattern a deserializer is registered under.
///
/// | Pattern              | Matches                                    |
/// |----------------------|--------------------------------------------|
/// | `application/json`   | exactly that type                          |
/// | `application/*+json` | `application/<name>+json`, name non-empty  |
/// | `*/*+json`           | any type with a subtype ending `+json`     |
/// | `text/*`             | any `text/` subtype                        |
/// | `*/*` or `*`         | everything                                 |
///
/// Patterns are matched against MIME types that are already lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimePattern {
    Exact(String),
    Suffix { top: String, suffix: String },
    Type(String),
    Any,
}

impl MimePattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim().to_ascii_lowercase();
        if pattern == "*" || pattern == "*/*" {
            return MimePattern::Any;
        }

        if let Some((top, sub)) = pattern.split_once('/') {
            if sub == "*" {
                return MimePattern::Type(top.to_string());
            }
            if let Some(suffix) = sub.strip_prefix("*+") {
                return MimePattern::Suffix {
                    top: top.to_string(),
                    suffix: suffix.to_string(),
                };
            }
        }

        MimePattern::Exact(pattern)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, MimePattern::Exact(_))
    }

    pub fn matches(&self, mime_type: &str) -> bool {
        let (top, sub) = mime_type.split_once('/').unwrap_or((mime_type, ""));

        match self {
            MimePattern::Exact(exact) => exact == mime_type,
            MimePattern::Suffix { top: t, suffix } => {
                (t == "*" || t == top)
                    && sub
                        .strip_suffix(suffix.as_str())
                        .and_then(|rest| rest.strip_suffix('+'))
                        .is_some_and(|name| !name.is_empty())
            }
            MimePattern::Type(t) => t == top,
            MimePattern::Any => true,
        }
    }
}

impl From<&str> for MimePattern {
    fn from(pattern: &str) -> Self {
        MimePattern::parse(pattern)
    }
}

impl std::fmt::Display for MimePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MimePattern::Exact(exact) => write!(f, "{exact}"),
            MimePattern::Suffix { top, suffix } => write!(f, "{top}/*+{suffix}"),
            MimePattern::Type(top) => write!(f, "{top}/*"),
            MimePattern::Any => write!(f, "*/*"),
        }
    }
}
