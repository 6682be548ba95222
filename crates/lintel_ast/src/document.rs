//! Parsed document.

use crate::visitor::{VisitResult, Visitor, walk_node, walk_with_ancestors};
use crate::{LineIndex, Location, Position, Span, TxtNode};

/// A parsed document: identity, source text, syntax tree and range map.
///
/// A `Document` is immutable. Applying fixes produces new text which is parsed
/// into a new `Document`; the previous one is simply dropped.
#[derive(Debug)]
pub struct Document<'a> {
    id: &'a str,
    kind: &'a str,
    source: &'a str,
    tree: TxtNode<'a>,
    lines: LineIndex,
}

impl<'a> Document<'a> {
    /// Creates a document from its parsed tree.
    ///
    /// `tree` must have been produced from `source`.
    pub fn new(id: &'a str, kind: &'a str, source: &'a str, tree: TxtNode<'a>) -> Self {
        Self {
            id,
            kind,
            source,
            tree,
            lines: LineIndex::new(source),
        }
    }

    /// Stable identifier of the document (usually a path).
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Format tag the document was parsed with.
    pub fn kind(&self) -> &'a str {
        self.kind
    }

    /// Source text of this document version.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Root node of the syntax tree.
    pub fn tree(&self) -> &TxtNode<'a> {
        &self.tree
    }

    /// Range map for this document version.
    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Returns the source slice for `span`, or `None` if the span is not valid
    /// for this document.
    pub fn slice(&self, span: Span) -> Option<&'a str> {
        span.is_valid_for(self.source)
            .then(|| &self.source[span.to_range()])
    }

    /// Converts a byte offset to a line/column position.
    pub fn position(&self, offset: u32) -> Position {
        self.lines.position(self.source, offset)
    }

    /// Converts a span to a line/column location.
    pub fn location(&self, span: Span) -> Location {
        self.lines.location(self.source, span)
    }

    /// Walks the tree depth-first in document order.
    pub fn walk<V: Visitor<'a>>(&self, visitor: &mut V) -> VisitResult {
        walk_node(visitor, &self.tree)
    }

    /// Walks the tree depth-first in document order, passing each node with
    /// its ancestors (root first).
    pub fn walk_with_ancestors<F>(&self, f: F) -> VisitResult
    where
        F: FnMut(&TxtNode<'a>, &[&TxtNode<'a>]) -> VisitResult,
    {
        walk_with_ancestors(&self.tree, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AstArena, NodeType};

    #[test]
    fn test_document_accessors() {
        let arena = AstArena::new();
        let src = arena.alloc_str("a\nbc");
        let tree = TxtNode::new_leaf(NodeType::Document, Span::new(0, 4), src);
        let doc = Document::new("notes.txt", "text", src, tree);

        assert_eq!(doc.id(), "notes.txt");
        assert_eq!(doc.kind(), "text");
        assert_eq!(doc.slice(Span::new(2, 4)), Some("bc"));
        assert_eq!(doc.slice(Span::new(2, 9)), None);
        assert_eq!(doc.position(3), Position::new(2, 1));
        assert_eq!(doc.tree().node_type, NodeType::Document);
    }
}
