//! Format plugin trait definition.

use lintel_ast::{AstArena, TxtNode};

use crate::ParseError;

/// A parser/serializer pair for one or more document kinds.
///
/// Plugins are registered once per process and shared read-only between
/// worker threads, so implementations must not rely on interior mutation
/// during `parse` or `serialize`.
///
/// # Example
///
/// ```rust,ignore
/// use lintel_ast::{AstArena, NodeType, Span, TxtNode};
/// use lintel_parser::{FormatPlugin, ParseError};
///
/// struct CsvPlugin;
///
/// impl FormatPlugin for CsvPlugin {
///     fn name(&self) -> &str {
///         "csv"
///     }
///
///     fn kinds(&self) -> &[&str] {
///         &["csv"]
///     }
///
///     fn parse<'a>(&self, arena: &'a AstArena, source: &str) -> Result<TxtNode<'a>, ParseError> {
///         let src = arena.alloc_str(source);
///         Ok(TxtNode::new_leaf(NodeType::Document, Span::new(0, src.len() as u32), src))
///     }
/// }
/// ```
pub trait FormatPlugin: Send + Sync {
    /// Returns the plugin identifier (e.g. `"markdown"`).
    fn name(&self) -> &str;

    /// Returns the document kinds this plugin claims.
    ///
    /// Kinds are format tags or file extensions without the leading dot
    /// (e.g., `["markdown", "md"]`).
    fn kinds(&self) -> &[&str];

    /// Returns true if this plugin handles the given document kind.
    fn matches(&self, kind: &str) -> bool {
        self.kinds().iter().any(|k| k.eq_ignore_ascii_case(kind))
    }

    /// Parses source text into a TxtAST allocated in `arena`.
    ///
    /// The returned root must span the whole source. Sources that do not fit
    /// `u32` offsets are rejected with [`source_len`].
    fn parse<'a>(&self, arena: &'a AstArena, source: &str) -> Result<TxtNode<'a>, ParseError>;

    /// Serializes a tree produced by [`FormatPlugin::parse`] back to text.
    fn serialize(&self, tree: &TxtNode<'_>) -> String {
        tree.to_source()
    }
}

/// Byte length of `source` as a span offset.
///
/// Spans carry `u32` offsets, so a source of 4 GiB or more is rejected.
pub fn source_len(source: &str) -> Result<u32, ParseError> {
    span_offset(source.len())
}

fn span_offset(len: usize) -> Result<u32, ParseError> {
    u32::try_from(len)
        .map_err(|_| ParseError::invalid_source(format!("source of {len} bytes is too large")))
}
