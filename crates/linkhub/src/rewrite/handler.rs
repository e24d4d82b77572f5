//! Element handlers: one mutation each, bound to fixed data at construction.

use crate::error::MutationError;

use super::element::{ContentType, ElementView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementHandler {
    /// Clear the inner content and insert `content`.
    ContentReplace {
        content: String,
        content_type: ContentType,
    },
    /// Insert `content` after the existing content.
    ContentAppend {
        content: String,
        content_type: ContentType,
    },
    AttributeSet { name: String, value: String },
    /// Remove an attribute if present.
    AttributeRemove { name: String },
    /// Apply each handler in order.
    Composite(Vec<ElementHandler>),
}

impl ElementHandler {
    pub fn replace_text(text: impl Into<String>) -> Self {
        Self::ContentReplace {
            content: text.into(),
            content_type: ContentType::Text,
        }
    }

    pub fn replace_html(markup: impl Into<String>) -> Self {
        Self::ContentReplace {
            content: markup.into(),
            content_type: ContentType::Html,
        }
    }

    pub fn append_html(markup: impl Into<String>) -> Self {
        Self::ContentAppend {
            content: markup.into(),
            content_type: ContentType::Html,
        }
    }

    pub fn set_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeSet {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn remove_attribute(name: impl Into<String>) -> Self {
        Self::AttributeRemove { name: name.into() }
    }

    /// Apply this handler to a matched element.
    ///
    /// A failing composite stops at the first error; the caller discards the
    /// view so no partial mutation is written.
    pub fn apply(&self, element: &mut ElementView<'_>) -> Result<(), MutationError> {
        match self {
            Self::ContentReplace {
                content,
                content_type,
            } => element.set_inner_content(content, *content_type),
            Self::ContentAppend {
                content,
                content_type,
            } => element.append(content, *content_type),
            Self::AttributeSet { name, value } => element.set_attribute(name, value),
            Self::AttributeRemove { name } => {
                element.remove_attribute(name);
                Ok(())
            }
            Self::Composite(handlers) => handlers.iter().try_for_each(|h| h.apply(element)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::token::{RewriteEvent, StartTag, Tokenizer};

    fn start_tag(source: &str) -> StartTag {
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed(source.as_bytes());
        match tokenizer.next_event(true) {
            Some(RewriteEvent::ElementOpen(tag)) => tag,
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn composite_clear_then_append() {
        let tag = start_tag(r#"<div id="links">"#);
        let mut view = ElementView::new(&tag);
        let handler = ElementHandler::Composite(vec![
            ElementHandler::replace_html(""),
            ElementHandler::append_html(r#"<a href="http://a">A</a>"#),
            ElementHandler::append_html(r#"<a href="http://b">B</a>"#),
        ]);
        handler.apply(&mut view).unwrap();

        let edit = view.finish();
        assert_eq!(edit.start_tag, None);
        assert_eq!(edit.inner.as_deref(), Some(""));
        assert_eq!(
            edit.appended,
            r#"<a href="http://a">A</a><a href="http://b">B</a>"#
        );
    }

    #[test]
    fn replace_is_idempotent() {
        let tag = start_tag(r#"<h1 id="name">"#);
        let handler = ElementHandler::replace_text("nnazo");

        let mut once = ElementView::new(&tag);
        handler.apply(&mut once).unwrap();

        let mut twice = ElementView::new(&tag);
        handler.apply(&mut twice).unwrap();
        handler.apply(&mut twice).unwrap();

        assert_eq!(once.finish(), twice.finish());
    }

    #[test]
    fn append_is_not_idempotent() {
        let tag = start_tag("<ul>");
        let handler = ElementHandler::append_html("<li>x</li>");
        let mut view = ElementView::new(&tag);
        handler.apply(&mut view).unwrap();
        handler.apply(&mut view).unwrap();
        assert_eq!(view.finish().appended, "<li>x</li><li>x</li>");
    }

    #[test]
    fn remove_absent_attribute_is_total() {
        let tag = start_tag("<div>");
        let mut view = ElementView::new(&tag);
        assert!(ElementHandler::remove_attribute("style").apply(&mut view).is_ok());
    }

    #[test]
    fn composite_stops_at_first_error() {
        let tag = start_tag(r#"<img id="avatar">"#);
        let mut view = ElementView::new(&tag);
        let handler = ElementHandler::Composite(vec![
            ElementHandler::replace_text("x"),
            ElementHandler::set_attribute("src", "a.png"),
        ]);
        assert_eq!(
            handler.apply(&mut view),
            Err(MutationError::ContentOnVoidElement("img".to_string()))
        );
        assert!(view.get_attribute("src").is_none());
    }
}
