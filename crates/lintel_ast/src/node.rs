//! TxtNode definition.
//!
//! The core syntax tree node type shared by format plugins and rules.

use serde::Serialize;

use crate::{NodeType, Span};

/// A node in the TxtAST.
///
/// Every node keeps `raw`, the exact slice of source text its span covers.
/// Plugins allocate the source once in the arena and slice it, so `raw` costs
/// no extra copy. Keeping `raw` on every node is what lets
/// [`TxtNode::to_source`] rebuild the original text from the tree alone.
///
/// # Lifetime
///
/// The `'a` lifetime parameter ties this node to its arena allocator,
/// ensuring that all child references remain valid.
#[derive(Debug, Clone, Copy)]
pub struct TxtNode<'a> {
    /// The type of this node.
    pub node_type: NodeType,

    /// Byte span in the source text.
    pub span: Span,

    /// Source text covered by `span`.
    pub raw: &'a str,

    /// Child nodes in document order (for parent nodes).
    pub children: &'a [TxtNode<'a>],

    /// Semantic text value (for text nodes like Str, Code, CodeBlock).
    ///
    /// This may differ from `raw`: a code block's value excludes its fences.
    pub value: Option<&'a str>,

    /// Additional node-specific data.
    pub data: NodeData<'a>,
}

/// Node-specific payload.
#[derive(Debug, Clone, Copy, Default)]
pub enum NodeData<'a> {
    #[default]
    None,
    /// Heading depth (1-6).
    Header(u8),
    /// Whether a list is ordered.
    List(bool),
    /// Code block language.
    CodeBlock(Option<&'a str>),
    /// Link or image target.
    Link(LinkData<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct LinkData<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
}

impl<'a> TxtNode<'a> {
    /// Creates a new parent node with children.
    #[inline]
    pub const fn new_parent(
        node_type: NodeType,
        span: Span,
        raw: &'a str,
        children: &'a [TxtNode<'a>],
    ) -> Self {
        Self {
            node_type,
            span,
            raw,
            children,
            value: None,
            data: NodeData::None,
        }
    }

    /// Creates a new text node with a value.
    #[inline]
    pub const fn new_text(node_type: NodeType, span: Span, raw: &'a str, value: &'a str) -> Self {
        Self {
            node_type,
            span,
            raw,
            children: &[],
            value: Some(value),
            data: NodeData::None,
        }
    }

    /// Creates a new leaf node (no children, no value).
    #[inline]
    pub const fn new_leaf(node_type: NodeType, span: Span, raw: &'a str) -> Self {
        Self {
            node_type,
            span,
            raw,
            children: &[],
            value: None,
            data: NodeData::None,
        }
    }

    /// Sets node-specific data.
    #[inline]
    pub const fn with_data(mut self, data: NodeData<'a>) -> Self {
        self.data = data;
        self
    }

    /// Returns true if this node has children.
    #[inline]
    pub const fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the text value of this node, if it is a text node.
    #[inline]
    pub const fn text(&self) -> Option<&'a str> {
        self.value
    }

    /// Rebuilds the source text covered by this node from the tree.
    ///
    /// Text between children (markup such as `# ` or `**`) is taken from this
    /// node's `raw`; each child contributes its own reconstruction. Children
    /// must be ordered, non-overlapping and inside the parent span; a node
    /// violating that falls back to its own `raw` for the whole subtree.
    pub fn to_source(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        self.write_source(&mut out);
        out
    }

    fn write_source(&self, out: &mut String) {
        if self.children.is_empty() || !self.children_are_well_formed() {
            out.push_str(self.raw);
            return;
        }

        let base = self.span.start;
        let mut cursor = self.span.start;
        for child in self.children {
            out.push_str(&self.raw[(cursor - base) as usize..(child.span.start - base) as usize]);
            child.write_source(out);
            cursor = child.span.end;
        }
        out.push_str(&self.raw[(cursor - base) as usize..]);
    }

    fn children_are_well_formed(&self) -> bool {
        if self.raw.len() != self.span.len() as usize {
            return false;
        }
        let mut cursor = self.span.start;
        for child in self.children {
            if child.span.start < cursor
                || child.span.end > self.span.end
                || child.span.start > child.span.end
            {
                return false;
            }
            let local_start = (child.span.start - self.span.start) as usize;
            let local_end = (child.span.end - self.span.start) as usize;
            if !self.raw.is_char_boundary(local_start) || !self.raw.is_char_boundary(local_end) {
                return false;
            }
            cursor = child.span.end;
        }
        true
    }
}

impl<'a> Serialize for TxtNode<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let has_children = self.node_type.is_parent() || !self.children.is_empty();
        let mut len = 3; // type, range, raw
        if has_children {
            len += 1;
        }
        if self.value.is_some() {
            len += 1;
        }
        len += self.data.present_field_count();

        let mut state = serializer.serialize_struct("TxtNode", len)?;
        state.serialize_field("type", &self.node_type)?;
        state.serialize_field("range", &[self.span.start, self.span.end])?;
        state.serialize_field("raw", self.raw)?;
        if has_children {
            state.serialize_field("children", &self.children)?;
        }
        if let Some(value) = &self.value {
            state.serialize_field("value", value)?;
        }
        self.data.serialize_fields(&mut state)?;
        state.end()
    }
}

impl<'a> NodeData<'a> {
    /// Returns the number of present (non-None) fields for serialization.
    fn present_field_count(&self) -> usize {
        match self {
            NodeData::None => 0,
            NodeData::Header(_) | NodeData::List(_) => 1,
            NodeData::CodeBlock(lang) => usize::from(lang.is_some()),
            NodeData::Link(link) => 1 + usize::from(link.title.is_some()),
        }
    }

    fn serialize_fields<S: serde::ser::SerializeStruct>(
        &self,
        state: &mut S,
    ) -> Result<(), S::Error> {
        match self {
            NodeData::None => {}
            NodeData::Header(depth) => state.serialize_field("depth", depth)?,
            NodeData::List(ordered) => state.serialize_field("ordered", ordered)?,
            NodeData::CodeBlock(lang) => {
                if let Some(l) = lang {
                    state.serialize_field("lang", l)?;
                }
            }
            NodeData::Link(link) => {
                state.serialize_field("url", link.url)?;
                if let Some(title) = link.title {
                    state.serialize_field("title", title)?;
                }
            }
        }
        Ok(())
    }

    /// Creates node data for a header.
    #[inline]
    pub const fn header(depth: u8) -> Self {
        Self::Header(depth)
    }

    /// Creates node data for a link.
    #[inline]
    pub const fn link(url: &'a str, title: Option<&'a str>) -> Self {
        Self::Link(LinkData { url, title })
    }

    /// Creates node data for a code block.
    #[inline]
    pub const fn code_block(lang: Option<&'a str>) -> Self {
        Self::CodeBlock(lang)
    }

    /// Creates node data for a list.
    #[inline]
    pub const fn list(ordered: bool) -> Self {
        Self::List(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AstArena;
    use pretty_assertions::assert_eq;

    /// Builds `# Hi **you**` by hand.
    fn heading<'a>(arena: &'a AstArena) -> TxtNode<'a> {
        let src = arena.alloc_str("# Hi **you**");
        let you = TxtNode::new_text(NodeType::Str, Span::new(7, 10), &src[7..10], &src[7..10]);
        let strong_children = arena.alloc_slice_copy(&[you]);
        let strong = TxtNode::new_parent(NodeType::Strong, Span::new(5, 12), &src[5..12], strong_children);
        let hi = TxtNode::new_text(NodeType::Str, Span::new(2, 5), &src[2..5], &src[2..5]);
        let children = arena.alloc_slice_copy(&[hi, strong]);
        TxtNode::new_parent(NodeType::Header, Span::new(0, 12), src, children)
            .with_data(NodeData::header(1))
    }

    #[test]
    fn test_to_source_rebuilds_markup_between_children() {
        let arena = AstArena::new();
        let node = heading(&arena);
        assert_eq!(node.to_source(), "# Hi **you**");
    }

    #[test]
    fn test_to_source_falls_back_on_overlapping_children() {
        let arena = AstArena::new();
        let src = arena.alloc_str("abcdef");
        let a = TxtNode::new_leaf(NodeType::Str, Span::new(0, 4), &src[0..4]);
        let b = TxtNode::new_leaf(NodeType::Str, Span::new(2, 6), &src[2..6]);
        let children = arena.alloc_slice_copy(&[a, b]);
        let node = TxtNode::new_parent(NodeType::Paragraph, Span::new(0, 6), src, children);
        assert_eq!(node.to_source(), "abcdef");
    }

    #[test]
    fn test_new_text() {
        let node = TxtNode::new_text(NodeType::Str, Span::new(0, 5), "hello", "hello");

        assert_eq!(node.text(), Some("hello"));
        assert!(!node.has_children());
    }

    #[test]
    fn test_node_data_link() {
        match NodeData::link("https://example.com", Some("Example")) {
            NodeData::Link(link_data) => {
                assert_eq!(link_data.url, "https://example.com");
                assert_eq!(link_data.title, Some("Example"));
            }
            _ => panic!("Expected Link variant"),
        }
    }

    #[test]
    fn test_serialize_header() {
        let arena = AstArena::new();
        let node = heading(&arena);
        let json = serde_json::to_value(node).unwrap();

        assert_eq!(json["type"], "Header");
        assert_eq!(json["depth"], 1);
        assert_eq!(json["range"], serde_json::json!([0, 12]));
        assert_eq!(json["children"][1]["type"], "Strong");
    }
}
