//! Incremental HTML tokenizer.
//!
//! Bytes are fed in arbitrary chunks and come out as [`RewriteEvent`]s that
//! carry their exact source bytes, so unmatched markup can be re-emitted
//! byte-for-byte. Only the bytes of a token that straddles a chunk boundary
//! are retained between calls, up to [`MAX_PENDING`].

/// Most bytes held back for one unfinished token. Past this, the held bytes
/// are released as text (an unterminated comment or an unbalanced quote
/// would otherwise hold the rest of the document).
pub const MAX_PENDING: usize = 64 * 1024;

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Elements that switch the parser into foreign content.
pub fn is_foreign_root(name: &str) -> bool {
    matches!(name, "svg" | "math")
}

fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// One node of the structural stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteEvent {
    ElementOpen(StartTag),
    Text(Vec<u8>),
    ElementClose(EndTag),
    /// Comments, doctypes and processing instructions.
    Verbatim(Vec<u8>),
}

/// A parsed attribute together with its original source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Value with character references decoded.
    pub value: String,
    /// Source text (`name="value"`), `None` once the attribute was rewritten.
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased tag name.
    pub name: String,
    /// Tag name as written in the source.
    pub source_name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    pub raw: Vec<u8>,
}

impl StartTag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Whether the element can hold content and will be followed by an end tag.
    ///
    /// `/>` only ends an element in foreign (SVG or MathML) content; on an
    /// HTML element it is ignored. `svg` and `math` start foreign content
    /// themselves.
    pub fn has_content(&self, in_foreign: bool) -> bool {
        if is_void_element(&self.name) {
            return false;
        }
        let foreign = in_foreign || is_foreign_root(&self.name);
        !(foreign && self.self_closing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTag {
    /// Lowercased tag name.
    pub name: String,
    pub raw: Vec<u8>,
}

/// Result of scanning a token that starts with `<`.
#[derive(Debug, PartialEq, Eq)]
enum Scan {
    StartTag(usize),
    EndTag(usize),
    Verbatim(usize),
    Text(usize),
    Incomplete,
}

/// Result of searching for the end tag of a raw text element.
#[derive(Debug, PartialEq, Eq)]
enum RawTextEnd {
    Found(usize),
    /// A prefix of the end tag starts here but the buffer ends before it completes.
    Partial(usize),
    Missing,
}

#[derive(Debug)]
pub struct Tokenizer {
    buf: Vec<u8>,
    pos: usize,
    raw_text: Option<String>,
    max_pending: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::with_max_pending(MAX_PENDING)
    }

    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            raw_text: None,
            max_pending,
        }
    }

    /// Append a chunk of input.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Number of bytes held back waiting for the rest of a token.
    pub fn pending(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Next complete event, or `None` if more input is needed.
    ///
    /// With `eof` set, whatever remains is flushed as text.
    pub fn next_event(&mut self, eof: bool) -> Option<RewriteEvent> {
        loop {
            let rest = &self.buf[self.pos..];
            if rest.is_empty() {
                return None;
            }

            if let Some(tag) = self.raw_text.as_deref() {
                match find_raw_text_end(rest, tag) {
                    RawTextEnd::Found(0) => {
                        self.raw_text = None;
                        continue;
                    }
                    RawTextEnd::Found(n) | RawTextEnd::Partial(n) if n > 0 => {
                        return Some(RewriteEvent::Text(self.take(n)));
                    }
                    RawTextEnd::Partial(_) if !eof => return None,
                    RawTextEnd::Missing if !eof => {
                        let n = rest.len();
                        return Some(RewriteEvent::Text(self.take(n)));
                    }
                    _ => {
                        self.raw_text = None;
                        let n = rest.len();
                        return Some(RewriteEvent::Text(self.take(n)));
                    }
                }
            }

            if rest[0] != b'<' {
                let n = rest.iter().position(|&b| b == b'<').unwrap_or(rest.len());
                return Some(RewriteEvent::Text(self.take(n)));
            }

            return match scan_markup(rest) {
                Scan::Text(n) => Some(RewriteEvent::Text(self.take(n))),
                Scan::Verbatim(n) => Some(RewriteEvent::Verbatim(self.take(n))),
                Scan::EndTag(n) => {
                    let raw = self.take(n);
                    Some(RewriteEvent::ElementClose(parse_end_tag(raw)))
                }
                Scan::StartTag(n) => {
                    let raw = self.take(n);
                    let tag = parse_start_tag(raw);
                    if is_raw_text_element(&tag.name) {
                        self.raw_text = Some(tag.name.clone());
                    }
                    Some(RewriteEvent::ElementOpen(tag))
                }
                Scan::Incomplete if eof || rest.len() > self.max_pending => {
                    let n = rest.len();
                    Some(RewriteEvent::Text(self.take(n)))
                }
                Scan::Incomplete => None,
            };
        }
    }

    fn take(&mut self, n: usize) -> Vec<u8> {
        let out = self.buf[self.pos..self.pos + n].to_vec();
        self.pos += n;
        out
    }
}

fn find_byte(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

fn find_seq(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Classify the token at the start of `rest`, which begins with `<`.
fn scan_markup(rest: &[u8]) -> Scan {
    let Some(&next) = rest.get(1) else {
        return Scan::Incomplete;
    };

    let until_gt = |from: usize| match find_byte(rest, from, b'>') {
        Some(i) => Scan::Verbatim(i + 1),
        None => Scan::Incomplete,
    };

    match next {
        b'!' => {
            if rest.starts_with(b"<!--") {
                match find_seq(rest, 4, b"-->") {
                    Some(i) => Scan::Verbatim(i + 3),
                    None => Scan::Incomplete,
                }
            } else if b"<!--".starts_with(rest) {
                Scan::Incomplete
            } else {
                until_gt(2)
            }
        }
        b'?' => until_gt(2),
        b'/' => match rest.get(2) {
            None => Scan::Incomplete,
            Some(b'>') => Scan::Verbatim(3),
            Some(c) if c.is_ascii_alphabetic() => match find_byte(rest, 3, b'>') {
                Some(i) => Scan::EndTag(i + 1),
                None => Scan::Incomplete,
            },
            Some(_) => until_gt(2),
        },
        c if c.is_ascii_alphabetic() => match find_tag_end(rest) {
            Some(n) => Scan::StartTag(n),
            None => Scan::Incomplete,
        },
        _ => Scan::Text(1),
    }
}

/// Length of a start tag including the closing `>`, skipping `>` inside quoted values.
fn find_tag_end(rest: &[u8]) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for (i, &b) in rest.iter().enumerate().skip(1) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'>' => return Some(i + 1),
            b'=' => {
                after_equals = true;
                continue;
            }
            b'"' | b'\'' if after_equals => quote = Some(b),
            b if b.is_ascii_whitespace() => continue,
            _ => {}
        }
        after_equals = false;
    }
    None
}

fn find_raw_text_end(rest: &[u8], tag: &str) -> RawTextEnd {
    let pattern_len = tag.len() + 2;
    let matches_pattern = |candidate: &[u8]| {
        candidate
            .iter()
            .zip(b"</".iter().chain(tag.as_bytes()))
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    };

    let mut from = 0;
    while let Some(i) = find_byte(rest, from, b'<') {
        let candidate = &rest[i..];
        if candidate.len() <= pattern_len {
            if matches_pattern(candidate) {
                return RawTextEnd::Partial(i);
            }
        } else if matches_pattern(&candidate[..pattern_len])
            && matches!(
                candidate[pattern_len],
                b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c'
            )
        {
            return RawTextEnd::Found(i);
        }
        from = i + 1;
    }
    RawTextEnd::Missing
}

fn parse_end_tag(raw: Vec<u8>) -> EndTag {
    let name: String = raw[2..]
        .iter()
        .take_while(|b| !b.is_ascii_whitespace() && **b != b'/' && **b != b'>')
        .map(|b| b.to_ascii_lowercase() as char)
        .collect();
    EndTag { name, raw }
}

fn parse_start_tag(raw: Vec<u8>) -> StartTag {
    let text = String::from_utf8_lossy(&raw).into_owned();
    let inner = &text[1..text.len() - 1];
    let bytes = inner.as_bytes();
    let len = bytes.len();

    let name_end = bytes
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'/')
        .unwrap_or(len);
    let source_name = inner[..name_end].to_string();

    let mut attributes = Vec::new();
    let mut self_closing = false;
    let mut i = name_end;

    loop {
        while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            if bytes[i] == b'/' && i == len - 1 {
                self_closing = true;
            }
            i += 1;
        }
        if i >= len {
            break;
        }

        let start = i;
        i += 1;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        let name = inner[start..i].to_ascii_lowercase();

        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let mut value = "";
        if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < len && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let value_start = j + 1;
                let value_end = find_byte(bytes, value_start, bytes[j]).unwrap_or(len);
                value = &inner[value_start..value_end];
                i = (value_end + 1).min(len);
            } else {
                let value_start = j;
                while j < len && !bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                value = &inner[value_start..j];
                i = j;
            }
        }

        attributes.push(Attribute {
            name,
            value: html_escape::decode_html_entities(value).into_owned(),
            source: Some(inner[start..i].to_string()),
        });
    }

    StartTag {
        name: source_name.to_ascii_lowercase(),
        source_name,
        attributes,
        self_closing,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_chunks(chunks: &[&str]) -> Vec<RewriteEvent> {
        let mut tokenizer = Tokenizer::new();
        let mut events = Vec::new();
        for chunk in chunks {
            tokenizer.feed(chunk.as_bytes());
            while let Some(event) = tokenizer.next_event(false) {
                events.push(event);
            }
        }
        while let Some(event) = tokenizer.next_event(true) {
            events.push(event);
        }
        events
    }

    fn concat_raw(events: &[RewriteEvent]) -> String {
        let mut out = Vec::new();
        for event in events {
            match event {
                RewriteEvent::ElementOpen(tag) => out.extend_from_slice(&tag.raw),
                RewriteEvent::ElementClose(tag) => out.extend_from_slice(&tag.raw),
                RewriteEvent::Text(bytes) | RewriteEvent::Verbatim(bytes) => {
                    out.extend_from_slice(bytes)
                }
            }
        }
        String::from_utf8(out).unwrap()
    }

    fn start_tag(events: &[RewriteEvent], index: usize) -> &StartTag {
        match &events[index] {
            RewriteEvent::ElementOpen(tag) => tag,
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    const DOC: &str = "<!DOCTYPE html>\n<html>\n<head><title>Links <b></title>\
        <script>if (a < b) { x = '</div>'; }</script></head>\n\
        <body class=\"bg\">\n  <!-- a > b -->\n  \
        <div id=\"links\" data-x='a>b'>\n    <a href=/x>X</a>\n  </div>\n\
        <img id=avatar src=\"\" />\n</body>\n</html>\n";

    #[test]
    fn test_concatenated_raw_is_byte_identical() {
        let events = tokenize_chunks(&[DOC]);
        assert_eq!(concat_raw(&events), DOC);
    }

    #[test]
    fn test_every_split_point_is_byte_identical() {
        for split in 0..=DOC.len() {
            let (a, b) = DOC.split_at(split);
            let events = tokenize_chunks(&[a, b]);
            assert_eq!(concat_raw(&events), DOC, "split at {split}");
        }
    }

    #[test]
    fn test_single_byte_chunks_produce_same_tags() {
        let whole = tokenize_chunks(&[DOC]);
        let chunks: Vec<String> = DOC.chars().map(|c| c.to_string()).collect();
        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let split = tokenize_chunks(&refs);

        let tags = |events: &[RewriteEvent]| -> Vec<String> {
            events
                .iter()
                .filter_map(|e| match e {
                    RewriteEvent::ElementOpen(t) => Some(format!("<{}", t.name)),
                    RewriteEvent::ElementClose(t) => Some(format!("</{}", t.name)),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(tags(&whole), tags(&split));
        assert_eq!(concat_raw(&split), DOC);
    }

    #[test]
    fn test_parse_attributes() {
        let events = tokenize_chunks(&[r#"<DIV ID="links" data-x='a>b' hidden class=c>"#]);
        let tag = start_tag(&events, 0);
        assert_eq!(tag.name, "div");
        assert_eq!(tag.source_name, "DIV");
        assert_eq!(tag.id(), Some("links"));
        assert_eq!(tag.attribute("data-x"), Some("a>b"));
        assert_eq!(tag.attribute("hidden"), Some(""));
        assert_eq!(tag.attribute("class"), Some("c"));
        assert_eq!(tag.attributes[0].source.as_deref(), Some(r#"ID="links""#));
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_attribute_entities_decoded() {
        let events = tokenize_chunks(&[r#"<a href="/?a=1&amp;b=2">"#]);
        assert_eq!(start_tag(&events, 0).attribute("href"), Some("/?a=1&b=2"));
    }

    #[test]
    fn test_self_closing_and_void() {
        let events = tokenize_chunks(&["<img id=avatar src=\"\" /><br><path d=\"M0\"/>"]);
        let img = start_tag(&events, 0);
        assert!(img.self_closing);
        assert!(!img.has_content(false));
        assert!(!start_tag(&events, 1).has_content(false));
        let path = start_tag(&events, 2);
        assert!(path.self_closing);
        assert!(!path.has_content(true));
        assert_eq!(path.attribute("d"), Some("M0"));
    }

    #[test]
    fn test_self_closing_ignored_on_html_elements() {
        let events = tokenize_chunks(&[r#"<div id="links"/><svg/><svg>"#]);
        let div = start_tag(&events, 0);
        assert!(div.self_closing);
        assert!(div.has_content(false));
        assert!(!start_tag(&events, 1).has_content(false));
        assert!(start_tag(&events, 2).has_content(false));
    }

    #[test]
    fn test_unquoted_value_with_slash_is_not_self_closing() {
        let events = tokenize_chunks(&["<a href=/x/>"]);
        let tag = start_tag(&events, 0);
        assert_eq!(tag.attribute("href"), Some("/x/"));
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_title_is_raw_text() {
        let events = tokenize_chunks(&["<title>a <b> c</title>"]);
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], RewriteEvent::Text(b"a <b> c".to_vec()));
        assert!(matches!(&events[2], RewriteEvent::ElementClose(t) if t.name == "title"));
    }

    #[test]
    fn test_script_end_tag_split_across_chunks() {
        let events = tokenize_chunks(&["<script>x</scr", "ipt><p>"]);
        assert!(matches!(
            &events[events.len() - 2],
            RewriteEvent::ElementClose(t) if t.name == "script"
        ));
        assert!(matches!(
            &events[events.len() - 1],
            RewriteEvent::ElementOpen(t) if t.name == "p"
        ));
    }

    #[test]
    fn test_script_ignores_other_end_tags() {
        let events = tokenize_chunks(&["<script>'</div>'</SCRIPT >"]);
        assert_eq!(events[1], RewriteEvent::Text(b"'</div>'".to_vec()));
        assert!(matches!(&events[2], RewriteEvent::ElementClose(t) if t.name == "script"));
    }

    #[test]
    fn test_comment_passes_verbatim() {
        let events = tokenize_chunks(&["<!-- <div id=\"links\"> -->"]);
        assert_eq!(
            events,
            vec![RewriteEvent::Verbatim(b"<!-- <div id=\"links\"> -->".to_vec())]
        );
    }

    #[test]
    fn test_stray_less_than_is_text() {
        let events = tokenize_chunks(&["a < b"]);
        assert!(events.iter().all(|e| matches!(e, RewriteEvent::Text(_))));
        assert_eq!(concat_raw(&events), "a < b");
    }

    #[test]
    fn test_unterminated_tag_flushed_as_text_at_eof() {
        let events = tokenize_chunks(&["<p>hi</p><div id=\"x"]);
        assert_eq!(
            events.last(),
            Some(&RewriteEvent::Text(b"<div id=\"x".to_vec()))
        );
    }

    #[test]
    fn test_pending_is_bounded_to_partial_token() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed(b"<p>some text</p><div id=\"li");
        while tokenizer.next_event(false).is_some() {}
        assert_eq!(tokenizer.pending(), b"<div id=\"li".len());
    }

    #[test]
    fn test_unterminated_comment_released_past_cap() {
        let mut tokenizer = Tokenizer::with_max_pending(16);
        tokenizer.feed(b"<p>a</p><!-- never closed");
        let mut events = Vec::new();
        while let Some(event) = tokenizer.next_event(false) {
            events.push(event);
        }
        assert_eq!(tokenizer.pending(), 0);
        assert_eq!(
            events.last(),
            Some(&RewriteEvent::Text(b"<!-- never closed".to_vec()))
        );

        tokenizer.feed(b" still open -->");
        assert_eq!(
            tokenizer.next_event(false),
            Some(RewriteEvent::Text(b" still open -->".to_vec()))
        );
    }

    #[test]
    fn test_unbalanced_quote_released_past_cap() {
        let mut tokenizer = Tokenizer::with_max_pending(32);
        tokenizer.feed(b"<div title=\"oops>");
        assert_eq!(tokenizer.next_event(false), None);
        tokenizer.feed(&[b'x'; 40]);
        assert!(matches!(tokenizer.next_event(false), Some(RewriteEvent::Text(_))));
        assert_eq!(tokenizer.pending(), 0);
    }
}
