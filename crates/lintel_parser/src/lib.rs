//! # lintel_parser
//!
//! Format plugins for Lintel.
//!
//! This crate provides:
//! - The [`FormatPlugin`] trait every document-format parser implements
//! - Built-in [`MarkdownPlugin`] using `markdown-rs` (GFM)
//! - Built-in [`PlainTextPlugin`]
//!
//! A format plugin turns source text of one or more document kinds into a
//! TxtAST and serializes a tree back to text. For every text a plugin accepts,
//! `serialize(parse(text)) == text`.
//!
//! ## Example
//!
//! ```rust
//! use lintel_ast::AstArena;
//! use lintel_parser::{FormatPlugin, MarkdownPlugin};
//!
//! let arena = AstArena::new();
//! let plugin = MarkdownPlugin::new();
//! let source = "# Hello\n\nThis is a paragraph.\n";
//!
//! let tree = plugin.parse(&arena, source).unwrap();
//! assert_eq!(plugin.serialize(&tree), source);
//! ```

mod error;
mod markdown;
mod text;
mod traits;

pub use error::ParseError;
pub use markdown::MarkdownPlugin;
pub use text::PlainTextPlugin;
pub use traits::{FormatPlugin, source_len};
