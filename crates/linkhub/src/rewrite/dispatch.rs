//! Selector dispatch table.

use std::collections::{HashMap, HashSet};

use super::handler::ElementHandler;
use super::selector::SelectorKey;

#[derive(Debug, Clone)]
struct Registration {
    seq: usize,
    selector: SelectorKey,
    handler: ElementHandler,
}

/// A handler matched for one element, with the selector that matched it.
#[derive(Debug, Clone, Copy)]
pub struct Match<'t> {
    pub selector: &'t SelectorKey,
    pub handler: &'t ElementHandler,
}

/// Maps selectors to their handlers.
///
/// Built once, then shared read-only. An element with tag `t` and id `i`
/// matches both `t` and `t#i`; handlers run in registration order across
/// both keys.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<SelectorKey, Vec<Registration>>,
    tags: HashSet<String>,
    next_seq: usize,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, builder style.
    pub fn on(mut self, selector: SelectorKey, handler: ElementHandler) -> Self {
        self.register(selector, handler);
        self
    }

    pub fn register(&mut self, selector: SelectorKey, handler: ElementHandler) {
        let registration = Registration {
            seq: self.next_seq,
            selector: selector.clone(),
            handler,
        };
        self.next_seq += 1;
        self.tags.insert(selector.tag_name().to_string());
        self.handlers.entry(selector).or_default().push(registration);
    }

    pub fn len(&self) -> usize {
        self.next_seq
    }

    pub fn is_empty(&self) -> bool {
        self.next_seq == 0
    }

    /// Handlers for an element, in registration order.
    ///
    /// `tag` must already be lowercased.
    pub fn matches(&self, tag: &str, id: Option<&str>) -> Vec<Match<'_>> {
        if !self.tags.contains(tag) {
            return Vec::new();
        }

        let by_tag = self.handlers.get(&SelectorKey::tag(tag));
        let by_id = id.and_then(|id| self.handlers.get(&SelectorKey::tag_with_id(tag, id)));

        let mut found: Vec<&Registration> = by_tag
            .into_iter()
            .chain(by_id)
            .flat_map(|regs| regs.iter())
            .collect();
        found.sort_by_key(|reg| reg.seq);

        found
            .into_iter()
            .map(|reg| Match {
                selector: &reg.selector,
                handler: &reg.handler,
            })
            .collect()
    }
}
