//! # lintel_ast
//!
//! Document model for Lintel.
//!
//! This crate provides the syntax tree types every format plugin produces and
//! every rule inspects:
//!
//! - [`TxtNode`]: an arena-allocated node that keeps the exact source slice it
//!   covers, so a tree can always be serialized back to its source text
//! - [`AstArena`]: `bumpalo` arena owning all nodes of one parsed document
//! - [`Visitor`] and the `walk_*` functions for depth-first, document-order traversal
//! - [`LineIndex`]: the offset ⇄ line/column range map
//! - [`Document`]: id, kind, source, tree and range map bundled together
//!
//! ## Example
//!
//! ```rust
//! use lintel_ast::{AstArena, NodeType, Span, TxtNode};
//!
//! let arena = AstArena::new();
//! let source = arena.alloc_str("Hello");
//!
//! let text = TxtNode::new_text(NodeType::Str, Span::new(0, 5), source, source);
//! let children = arena.alloc_slice_copy(&[text]);
//! let root = TxtNode::new_parent(NodeType::Document, Span::new(0, 5), source, children);
//!
//! assert_eq!(root.to_source(), "Hello");
//! ```

mod arena;
mod document;
mod line_index;
mod node;
mod node_type;
mod span;
pub mod visitor;

pub use arena::AstArena;
pub use document::Document;
pub use line_index::LineIndex;
pub use node::{LinkData, NodeData, TxtNode};
pub use node_type::NodeType;
pub use span::{Location, Position, Span};

pub use visitor::{VisitResult, Visitor};
