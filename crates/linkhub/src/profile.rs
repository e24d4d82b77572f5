//! Profile constants and the markup fragments rendered from them.
//!
//! Fragments are built with maud so link names and URLs are escaped before
//! they are spliced into the upstream document as raw markup.

use maud::{Markup, PreEscaped, html};

use crate::links::LinkRegistry;

/// GitHub mark (simpleicons.org).
pub const ICON_GITHUB: &str = r#"<svg role="img" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg"><title>GitHub icon</title><path d="M12 .297c-6.63 0-12 5.373-12 12 0 5.303 3.438 9.8 8.205 11.385.6.113.82-.258.82-.577 0-.285-.01-1.04-.015-2.04-3.338.724-4.042-1.61-4.042-1.61C4.422 18.07 3.633 17.7 3.633 17.7c-1.087-.744.084-.729.084-.729 1.205.084 1.838 1.236 1.838 1.236 1.07 1.835 2.809 1.305 3.495.998.108-.776.417-1.305.76-1.605-2.665-.3-5.466-1.332-5.466-5.93 0-1.31.465-2.38 1.235-3.22-.135-.303-.54-1.523.105-3.176 0 0 1.005-.322 3.3 1.23.96-.267 1.98-.399 3-.405 1.02.006 2.04.138 3 .405 2.28-1.552 3.285-1.23 3.285-1.23.645 1.653.24 2.873.12 3.176.765.84 1.23 1.91 1.23 3.22 0 4.61-2.805 5.625-5.475 5.92.42.36.81 1.096.81 2.22 0 1.606-.015 2.896-.015 3.286 0 .315.21.69.825.57C20.565 22.092 24 17.592 24 12.297c0-6.627-5.373-12-12-12"/></svg>"#;

/// Fixed data bound into the element handlers at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Replaces the text of `h1#name`.
    pub display_name: String,
    /// Written to `img#avatar[src]`.
    pub avatar_url: String,
    /// Target of the anchor placed in `div#social`.
    pub social_url: String,
    /// `alt` text of the social anchor.
    pub social_label: String,
    /// Raw SVG (or other markup) placed inside the social anchor.
    pub social_icon: String,
    /// Replaces the text of `<title>`.
    pub title: String,
    /// Written to `body[class]`.
    pub background_class: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: "nnazo".to_string(),
            avatar_url: "https://avatars0.githubusercontent.com/u/6753860?s=460&v=4".to_string(),
            social_url: "https://github.com/nnazo".to_string(),
            social_label: "GitHub Profile".to_string(),
            social_icon: ICON_GITHUB.to_string(),
            title: "Jacob Curtis".to_string(),
            background_class: "bg-gray-700".to_string(),
        }
    }
}

impl Profile {
    /// Anchor placed inside the social container.
    pub fn social_anchor(&self) -> Markup {
        html! {
            a href=(self.social_url) alt=(self.social_label) {
                (PreEscaped(&self.social_icon))
            }
        }
    }
}

/// One anchor per link, in registry order.
pub fn link_anchors(links: &LinkRegistry) -> Vec<Markup> {
    links
        .iter()
        .map(|link| {
            html! {
                a href=(link.url) { (link.name) }
            }
        })
        .collect()
}
