//! Mutable view over a matched element.

use crate::error::MutationError;

use super::token::{Attribute, StartTag};

/// How a content string is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Escaped before insertion.
    Text,
    /// Inserted as markup.
    Html,
}

/// Mutations gathered for one element, ready to be written out.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ElementEdit {
    /// Re-serialized start tag, `None` if the original bytes can be reused.
    pub start_tag: Option<Vec<u8>>,
    /// Replacement inner content, `None` to keep the original.
    pub inner: Option<String>,
    /// Content emitted right before the end tag.
    pub appended: String,
}

/// What a handler sees of a matched element.
///
/// Attribute access covers the start tag; content operations cover
/// everything up to the matching end tag.
#[derive(Debug)]
pub struct ElementView<'a> {
    tag: &'a StartTag,
    attributes: Vec<Attribute>,
    attributes_changed: bool,
    inner: Option<String>,
    appended: String,
    has_content: bool,
}

impl<'a> ElementView<'a> {
    pub fn new(tag: &'a StartTag) -> Self {
        Self {
            tag,
            attributes: tag.attributes.clone(),
            attributes_changed: false,
            inner: None,
            appended: String::new(),
            has_content: tag.has_content(false),
        }
    }

    /// Treat the element as SVG or MathML content, where `/>` ends it.
    pub fn in_foreign_content(mut self, foreign: bool) -> Self {
        self.has_content = self.tag.has_content(foreign);
        self
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    /// Set or overwrite an attribute.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), MutationError> {
        if !is_valid_attribute_name(name) {
            return Err(MutationError::InvalidAttributeName(name.to_string()));
        }

        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => {
                attr.value = value.to_string();
                attr.source = None;
            }
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
                source: None,
            }),
        }
        self.attributes_changed = true;
        Ok(())
    }

    /// Remove an attribute. Removing one that is absent is a no-op.
    pub fn remove_attribute(&mut self, name: &str) {
        let before = self.attributes.len();
        self.attributes
            .retain(|attr| !attr.name.eq_ignore_ascii_case(name));
        if self.attributes.len() != before {
            self.attributes_changed = true;
        }
    }

    /// Replace the inner content, discarding any content appended so far.
    pub fn set_inner_content(
        &mut self,
        content: &str,
        content_type: ContentType,
    ) -> Result<(), MutationError> {
        self.ensure_has_content()?;
        self.inner = Some(encode(content, content_type));
        self.appended.clear();
        Ok(())
    }

    /// Add content after the existing content.
    pub fn append(
        &mut self,
        content: &str,
        content_type: ContentType,
    ) -> Result<(), MutationError> {
        self.ensure_has_content()?;
        self.appended.push_str(&encode(content, content_type));
        Ok(())
    }

    fn ensure_has_content(&self) -> Result<(), MutationError> {
        if self.has_content {
            Ok(())
        } else {
            Err(MutationError::ContentOnVoidElement(self.tag.name.clone()))
        }
    }

    pub fn finish(self) -> ElementEdit {
        ElementEdit {
            start_tag: self
                .attributes_changed
                .then(|| serialize_start_tag(self.tag, &self.attributes)),
            inner: self.inner,
            appended: self.appended,
        }
    }
}

fn encode(content: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::Html => content.to_string(),
        ContentType::Text => html_escape::encode_text(content).into_owned(),
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}

fn serialize_start_tag(tag: &StartTag, attributes: &[Attribute]) -> Vec<u8> {
    let mut out = String::with_capacity(tag.raw.len() + 32);
    out.push('<');
    out.push_str(&tag.source_name);
    for attr in attributes {
        out.push(' ');
        match &attr.source {
            Some(source) => out.push_str(source),
            None => {
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
                out.push('"');
            }
        }
    }
    if tag.self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out.into_bytes()
}
