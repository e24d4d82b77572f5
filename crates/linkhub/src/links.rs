//! The link registry rendered on the hub page and served at `/links`.

use serde::{Deserialize, Serialize};

/// A single outbound link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Visible anchor text.
    pub name: String,
    /// Anchor target. Emitted as-is, even if it is not a valid absolute URL.
    pub url: String,
}

impl LinkEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Ordered list of links. Order defines both render order and JSON order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkRegistry {
    entries: Vec<LinkEntry>,
}

/// Built-in links served by the hub.
const DEFAULT_LINKS: &[(&str, &str)] = &[
    ("Cloudflare", "https://cloudflare.com"),
    ("GitHub", "https://github.com"),
    ("Rust", "https://rust-lang.org"),
    ("Docker", "https://docker.com"),
    ("DuckDuckGo", "https://duckduckgo.com"),
    ("DigitalOcean", "https://digitalocean.com"),
];

impl LinkRegistry {
    pub fn new(entries: Vec<LinkEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinkEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a JSON array of `{"name", "url"}` objects.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for LinkRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_LINKS
                .iter()
                .map(|(name, url)| LinkEntry::new(*name, *url))
                .collect(),
        )
    }
}

impl FromIterator<LinkEntry> for LinkRegistry {
    fn from_iter<I: IntoIterator<Item = LinkEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LinkRegistry {
    type Item = &'a LinkEntry;
    type IntoIter = std::slice::Iter<'a, LinkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_single_entry() {
        let registry = LinkRegistry::new(vec![LinkEntry::new("A", "http://a")]);
        assert_eq!(
            registry.to_json().unwrap(),
            r#"[{"name":"A","url":"http://a"}]"#
        );
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let registry = LinkRegistry::default();
        let json = registry.to_json().unwrap();
        let parsed: LinkRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, registry);
        assert_eq!(parsed.entries()[0].name, "Cloudflare");
        assert_eq!(parsed.entries()[5].name, "DigitalOcean");
    }

    #[test]
    fn json_empty_registry() {
        let registry = LinkRegistry::new(Vec::new());
        assert!(registry.is_empty());
        assert_eq!(registry.to_json().unwrap(), "[]");
    }

    #[test]
    fn malformed_entries_kept_as_is() {
        let registry: LinkRegistry = [LinkEntry::new("", "not a url")].into_iter().collect();
        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json().unwrap()).unwrap();
        assert_eq!(parsed[0]["name"], "");
        assert_eq!(parsed[0]["url"], "not a url");
    }

    #[test]
    fn default_registry_has_six_links() {
        assert_eq!(LinkRegistry::default().len(), 6);
    }
}
