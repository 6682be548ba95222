//! Depth-first traversal of TxtAST trees.
//!
//! - [`Visitor`]: typed, read-only traversal with `enter_node`/`exit_node` hooks
//! - [`walk_node`] / [`walk_children`]: dispatch helpers used by the default
//!   `Visitor` methods
//! - [`walk_with_ancestors`]: closure-based traversal that hands every node its
//!   ancestor chain, for rules that need to know where a node sits
//!
//! All traversals run in document order and support early termination through
//! [`std::ops::ControlFlow`].
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use lintel_ast::{AstArena, NodeType, Span, TxtNode};
//! use lintel_ast::visitor::{VisitResult, Visitor, walk_node};
//!
//! struct TextCollector<'a> {
//!     texts: Vec<&'a str>,
//! }
//!
//! impl<'a> Visitor<'a> for TextCollector<'a> {
//!     fn visit_str(&mut self, node: &TxtNode<'a>) -> VisitResult {
//!         if let Some(text) = node.value {
//!             self.texts.push(text);
//!         }
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let arena = AstArena::new();
//! let src = arena.alloc_str("hello");
//! let text = TxtNode::new_text(NodeType::Str, Span::new(0, 5), src, src);
//! let children = arena.alloc_slice_copy(&[text]);
//! let doc = TxtNode::new_parent(NodeType::Document, Span::new(0, 5), src, children);
//!
//! let mut collector = TextCollector { texts: Vec::new() };
//! let _ = walk_node(&mut collector, &doc);
//! assert_eq!(collector.texts, vec!["hello"]);
//! ```

mod visit;
mod walk;

pub use visit::{VisitResult, Visitor};
pub use walk::{walk_children, walk_node, walk_with_ancestors};
