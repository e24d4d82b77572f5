//! Structural selectors: a tag name with an optional id.

use std::fmt;
use std::str::FromStr;

/// Exact-match lookup key for the dispatch table.
///
/// Tag names are stored lowercased; the id is compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorKey {
    tag: String,
    id: Option<String>,
}

impl SelectorKey {
    /// Selector matching every element with this tag.
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
        }
    }

    /// Selector matching elements with this tag and id.
    pub fn tag_with_id(tag: &str, id: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: Some(id.to_string()),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}#{}", self.tag, id),
            None => f.write_str(&self.tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector {0:?}: expected `tag` or `tag#id`")]
pub struct SelectorParseError(String);

impl FromStr for SelectorKey {
    type Err = SelectorParseError;

    /// Parses `tag` or `tag#id`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, id) = match s.split_once('#') {
            Some((tag, id)) => (tag, Some(id)),
            None => (s, None),
        };

        let valid_tag = !tag.is_empty()
            && tag.starts_with(|c: char| c.is_ascii_alphabetic())
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        let valid_id = id.is_none_or(|id| !id.is_empty() && !id.contains(char::is_whitespace));

        if !valid_tag || !valid_id {
            return Err(SelectorParseError(s.to_string()));
        }

        Ok(match id {
            Some(id) => Self::tag_with_id(tag, id),
            None => Self::tag(tag),
        })
    }
}
