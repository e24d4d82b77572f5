//! Selective streaming HTML rewriting.
//!
//! The input is tokenized into [`RewriteEvent`]s in a single forward pass.
//! Each start tag is looked up in a [`DispatchTable`] by tag name and id, and
//! the matching [`ElementHandler`]s mutate an [`ElementView`] of that element.
//! Everything no handler touches is written back byte-for-byte.
//!
//! Memory is bounded by [`token::MAX_PENDING`], the depth of open elements
//! and the content queued for open matched elements, never by document size.

pub mod dispatch;
pub mod element;
pub mod engine;
pub mod handler;
pub mod selector;
pub mod token;

pub use dispatch::DispatchTable;
pub use element::{ContentType, ElementView};
pub use engine::{MutationFailure, Rewriter, rewrite_stream};
pub use handler::ElementHandler;
pub use selector::SelectorKey;
pub use token::RewriteEvent;
