//! The streaming rewrite engine.
//!
//! [`Rewriter`] is push based: feed it chunks with [`Rewriter::write`] and it
//! returns whatever output is final so far. [`rewrite_stream`] wraps it around
//! a byte stream, pulling the next input chunk only when the consumer asks
//! for more output.
//!
//! The engine keeps a stack of open elements so that a matched element ends
//! where an HTML parser would end it: at its own end tag, at the end tag of
//! an ancestor, or at a start tag that implies its end (a `<div>` ends an
//! open `<p>`, a `<li>` ends the previous `<li>`). An implied end writes no
//! end tag, keeping the output faithful to the source bytes.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{BoxError, MutationError, RewriteError};

use super::dispatch::DispatchTable;
use super::element::ElementView;
use super::selector::SelectorKey;
use super::token::{EndTag, RewriteEvent, StartTag, Tokenizer, is_foreign_root};

/// Failures kept per document; later ones are only counted.
pub const MAX_RECORDED_FAILURES: usize = 16;

/// Start tags that end an open `p`.
const P_CLOSING_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol", "p",
    "plaintext", "pre", "search", "section", "summary", "table", "ul", "xmp",
];

/// Elements that hide an open `p` from the start tags above.
const P_SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "math", "object", "svg", "table", "td",
    "template", "th",
];

/// Inline elements a new list item can end through.
const PHRASING_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "big", "cite", "code", "data", "dfn", "em", "font", "i",
    "kbd", "label", "mark", "nobr", "q", "s", "samp", "small", "span", "strike", "strong", "sub",
    "sup", "time", "tt", "u", "var",
];

/// A handler that failed against an element. The element was left unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub selector: SelectorKey,
    pub tag: String,
    pub error: MutationError,
}

/// A matched element that is still open.
#[derive(Debug)]
struct Scope {
    /// Position of the element in the open-element stack.
    depth: usize,
    /// Emitted when the element ends.
    appended: String,
    /// Original inner content is being dropped.
    skipping: bool,
}

#[derive(Debug)]
pub struct Rewriter {
    table: Arc<DispatchTable>,
    tokenizer: Tokenizer,
    /// Lowercased names of the elements currently open.
    open: Vec<String>,
    scopes: Vec<Scope>,
    failures: Vec<MutationFailure>,
    failure_count: usize,
}

impl Rewriter {
    pub fn new(table: Arc<DispatchTable>) -> Self {
        Self {
            table,
            tokenizer: Tokenizer::new(),
            open: Vec::new(),
            scopes: Vec::new(),
            failures: Vec::new(),
            failure_count: 0,
        }
    }

    /// Feed a chunk, returning the output that can be flushed.
    pub fn write(&mut self, chunk: &[u8]) -> Vec<u8> {
        self.tokenizer.feed(chunk);
        let mut out = Vec::with_capacity(chunk.len());
        while let Some(event) = self.tokenizer.next_event(false) {
            self.handle(event, &mut out);
        }
        out
    }

    /// Signal end of input, returning the remaining output.
    ///
    /// Elements still open get their appended content flushed.
    pub fn end(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(event) = self.tokenizer.next_event(true) {
            self.handle(event, &mut out);
        }
        self.pop_open(0, &mut out);
        out
    }

    /// The first [`MAX_RECORDED_FAILURES`] handler failures.
    pub fn failures(&self) -> &[MutationFailure] {
        &self.failures
    }

    /// Every handler failure so far, recorded or not.
    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    fn skipping(&self) -> bool {
        self.scopes.last().is_some_and(|scope| scope.skipping)
    }

    fn in_foreign(&self) -> bool {
        self.open.iter().any(|name| is_foreign_root(name))
    }

    fn handle(&mut self, event: RewriteEvent, out: &mut Vec<u8>) {
        match event {
            RewriteEvent::Text(bytes) | RewriteEvent::Verbatim(bytes) => {
                if !self.skipping() {
                    out.extend_from_slice(&bytes);
                }
            }
            RewriteEvent::ElementOpen(tag) => self.open(tag, out),
            RewriteEvent::ElementClose(tag) => self.close(tag, out),
        }
    }

    fn open(&mut self, tag: StartTag, out: &mut Vec<u8>) {
        if let Some(index) = self.implied_end(&tag.name) {
            self.pop_open(index, out);
        }

        let foreign = self.in_foreign();
        let has_content = tag.has_content(foreign);

        if self.skipping() {
            if has_content {
                self.open.push(tag.name);
            }
            return;
        }

        let table = Arc::clone(&self.table);
        let matches = table.matches(&tag.name, tag.id());
        if matches.is_empty() {
            out.extend_from_slice(&tag.raw);
            if has_content {
                self.open.push(tag.name);
            }
            return;
        }

        let outcome = {
            let mut view = ElementView::new(&tag).in_foreign_content(foreign);
            match matches
                .iter()
                .find_map(|m| m.handler.apply(&mut view).err().map(|err| (m.selector, err)))
            {
                Some(failed) => Err(failed),
                None => Ok(view.finish()),
            }
        };

        let edit = match outcome {
            Ok(edit) => edit,
            Err((selector, error)) => {
                tracing::warn!(
                    selector = %selector,
                    tag = %tag.name,
                    error = %error,
                    "element handler failed, passing element through"
                );
                self.record_failure(MutationFailure {
                    selector: selector.clone(),
                    tag: tag.name.clone(),
                    error,
                });
                out.extend_from_slice(&tag.raw);
                if has_content {
                    self.open.push(tag.name);
                }
                return;
            }
        };

        out.extend_from_slice(edit.start_tag.as_deref().unwrap_or(tag.raw.as_slice()));

        if !has_content {
            return;
        }

        let depth = self.open.len();
        self.open.push(tag.name);
        match edit.inner {
            Some(inner) => {
                out.extend_from_slice(inner.as_bytes());
                self.scopes.push(Scope {
                    depth,
                    appended: edit.appended,
                    skipping: true,
                });
            }
            None if !edit.appended.is_empty() => self.scopes.push(Scope {
                depth,
                appended: edit.appended,
                skipping: false,
            }),
            None => {}
        }
    }

    fn close(&mut self, tag: EndTag, out: &mut Vec<u8>) {
        let skipped_from = self
            .scopes
            .last()
            .filter(|scope| scope.skipping)
            .map(|scope| scope.depth);

        // An end tag with nothing open to close is stray markup.
        let Some(index) = self.open.iter().rposition(|name| *name == tag.name) else {
            if skipped_from.is_none() {
                out.extend_from_slice(&tag.raw);
            }
            return;
        };

        self.pop_open(index, out);
        if skipped_from.is_none_or(|depth| index <= depth) {
            out.extend_from_slice(&tag.raw);
        }
    }

    /// Close every open element from `index` up, flushing the appended
    /// content of matched elements innermost first.
    fn pop_open(&mut self, index: usize, out: &mut Vec<u8>) {
        self.open.truncate(index);
        while self.scopes.last().is_some_and(|scope| scope.depth >= index) {
            if let Some(scope) = self.scopes.pop() {
                out.extend_from_slice(scope.appended.as_bytes());
            }
        }
    }

    /// Stack index of the open element that a start tag named `name` ends.
    fn implied_end(&self, name: &str) -> Option<usize> {
        let list_item = |open: &str| {
            matches!(open, "address" | "div" | "p") || PHRASING_ELEMENTS.contains(&open)
        };

        let ended = match name {
            "li" => self.find_open(&["li"], list_item),
            "dd" | "dt" => self.find_open(&["dd", "dt"], list_item),
            "td" | "th" => self.find_open(&["td", "th"], |open| {
                !matches!(open, "tr" | "table")
            }),
            "tr" => self.find_open(&["tr"], |open| {
                !matches!(open, "table" | "tbody" | "thead" | "tfoot")
            }),
            "option" => self.find_open(&["option"], |_| false),
            "optgroup" => self
                .find_open(&["optgroup"], |open| open == "option")
                .or_else(|| self.find_open(&["option"], |_| false)),
            _ => None,
        };

        ended.or_else(|| {
            P_CLOSING_TAGS
                .contains(&name)
                .then(|| self.find_open(&["p"], |open| !P_SCOPE_BOUNDARIES.contains(&open)))
                .flatten()
        })
    }

    /// Nearest open element named in `targets`, looking down the stack only
    /// through elements for which `through` holds.
    fn find_open(&self, targets: &[&str], through: impl Fn(&str) -> bool) -> Option<usize> {
        for (index, name) in self.open.iter().enumerate().rev() {
            if targets.contains(&name.as_str()) {
                return Some(index);
            }
            if !through(name.as_str()) {
                return None;
            }
        }
        None
    }

    fn record_failure(&mut self, failure: MutationFailure) {
        self.failure_count += 1;
        if self.failures.len() < MAX_RECORDED_FAILURES {
            self.failures.push(failure);
        }
    }
}

/// Rewrite a byte stream through `table`.
///
/// Input is read only as fast as output is consumed, and dropping the
/// returned stream drops the input. An input error is yielded as a final
/// [`RewriteError::StreamTerminated`] after all output produced so far.
pub fn rewrite_stream<S, E>(
    input: S,
    table: Arc<DispatchTable>,
) -> impl Stream<Item = Result<Bytes, RewriteError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Into<BoxError> + Send + 'static,
{
    enum State<S> {
        Streaming { input: S, rewriter: Rewriter },
        Done,
    }

    let initial = State::Streaming {
        input,
        rewriter: Rewriter::new(table),
    };

    stream::unfold(initial, |state| async move {
        let State::Streaming {
            mut input,
            mut rewriter,
        } = state
        else {
            return None;
        };

        loop {
            match input.next().await {
                Some(Ok(chunk)) => {
                    let out = rewriter.write(&chunk);
                    if !out.is_empty() {
                        let next = State::Streaming { input, rewriter };
                        return Some((Ok(Bytes::from(out)), next));
                    }
                }
                Some(Err(err)) => {
                    let err = RewriteError::StreamTerminated(err.into());
                    tracing::error!(error = %err, "template stream ended abnormally");
                    return Some((Err(err), State::Done));
                }
                None => {
                    let out = rewriter.end();
                    if rewriter.failure_count() > 0 {
                        tracing::warn!(
                            failures = rewriter.failure_count(),
                            "document rewritten with skipped elements"
                        );
                    }
                    if out.is_empty() {
                        return None;
                    }
                    return Some((Ok(Bytes::from(out)), State::Done));
                }
            }
        }
    })
}
