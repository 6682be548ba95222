//! Markdown format plugin built on markdown-rs.
//!
//! The mdast produced by `markdown-rs` is converted to TxtAST. The source is
//! copied into the arena once and every node's `raw` is a slice of that copy,
//! which keeps serialization exact for any input the parser accepts.

use lintel_ast::{AstArena, NodeData, NodeType, Span, TxtNode};
use markdown::mdast::Node;
use markdown::{ParseOptions, to_mdast};

use crate::{FormatPlugin, ParseError, source_len};

/// Markdown plugin (CommonMark + GFM).
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownPlugin;

impl MarkdownPlugin {
    /// Creates a new Markdown plugin.
    pub fn new() -> Self {
        Self
    }
}

impl FormatPlugin for MarkdownPlugin {
    fn name(&self) -> &str {
        "markdown"
    }

    fn kinds(&self) -> &[&str] {
        &["markdown", "md", "mdown", "mkdn", "mkd"]
    }

    fn parse<'a>(&self, arena: &'a AstArena, source: &str) -> Result<TxtNode<'a>, ParseError> {
        let len = source_len(source)?;
        let options = ParseOptions::gfm();
        let mdast =
            to_mdast(source, &options).map_err(|e| ParseError::invalid_source(e.to_string()))?;

        let src = arena.alloc_str(source);
        let converter = Converter { arena, src };
        let mut root = converter.convert(&mdast);

        // mdast omits trailing whitespace from the root position.
        root.span = Span::new(0, len);
        root.raw = src;
        Ok(root)
    }
}

struct Converter<'a> {
    arena: &'a AstArena,
    src: &'a str,
}

impl<'a> Converter<'a> {
    fn convert(&self, node: &Node) -> TxtNode<'a> {
        match node {
            Node::Root(_) => self.parent(node, NodeType::Document),
            Node::Paragraph(_) => self.parent(node, NodeType::Paragraph),
            Node::Heading(heading) => self
                .parent(node, NodeType::Header)
                .with_data(NodeData::header(heading.depth)),
            Node::Blockquote(_) => self.parent(node, NodeType::BlockQuote),
            Node::List(list) => self
                .parent(node, NodeType::List)
                .with_data(NodeData::list(list.ordered)),
            Node::ListItem(_) => self.parent(node, NodeType::ListItem),
            Node::Emphasis(_) => self.parent(node, NodeType::Emphasis),
            Node::Strong(_) => self.parent(node, NodeType::Strong),
            Node::Delete(_) => self.parent(node, NodeType::Delete),
            Node::Link(link) => {
                let data = NodeData::link(
                    self.arena.alloc_str(&link.url),
                    link.title.as_deref().map(|t| self.arena.alloc_str(t)),
                );
                self.parent(node, NodeType::Link).with_data(data)
            }
            Node::LinkReference(_) => self.parent(node, NodeType::LinkReference),
            Node::Table(_) => self.parent(node, NodeType::Table),
            Node::TableRow(_) => self.parent(node, NodeType::TableRow),
            Node::TableCell(_) => self.parent(node, NodeType::TableCell),
            Node::FootnoteDefinition(_) => self.parent(node, NodeType::FootnoteDefinition),

            Node::Text(text) => self.text(node, &text.value, NodeType::Str),
            Node::InlineCode(code) => self.text(node, &code.value, NodeType::Code),
            Node::Code(code) => {
                let lang = code.lang.as_deref().map(|l| self.arena.alloc_str(l));
                self.text(node, &code.value, NodeType::CodeBlock)
                    .with_data(NodeData::code_block(lang))
            }
            Node::Html(html) => self.text(node, &html.value, NodeType::Html),

            Node::Image(image) => {
                let data = NodeData::link(
                    self.arena.alloc_str(&image.url),
                    image.title.as_deref().map(|t| self.arena.alloc_str(t)),
                );
                self.leaf(node, NodeType::Image).with_data(data)
            }
            Node::ImageReference(_) => self.leaf(node, NodeType::ImageReference),
            Node::Definition(_) => self.leaf(node, NodeType::Definition),
            Node::FootnoteReference(_) => self.leaf(node, NodeType::FootnoteReference),
            Node::ThematicBreak(_) => self.leaf(node, NodeType::HorizontalRule),
            Node::Break(_) => self.leaf(node, NodeType::Break),

            // Frontmatter, math and MDX constructs are kept as opaque raw text.
            _ => {
                let (span, raw) = self.locate(node);
                TxtNode::new_text(NodeType::Html, span, raw, raw)
            }
        }
    }

    fn locate(&self, node: &Node) -> (Span, &'a str) {
        let span = node
            .position()
            .map(|pos| Span::new(pos.start.offset as u32, pos.end.offset as u32))
            .unwrap_or(Span::empty(0));
        let raw = self.src.get(span.to_range()).unwrap_or("");
        (span, raw)
    }

    fn parent(&self, node: &Node, node_type: NodeType) -> TxtNode<'a> {
        let (span, raw) = self.locate(node);
        let children = match node.children() {
            Some(children) => self
                .arena
                .alloc_slice_fill_iter(children.iter().map(|child| self.convert(child))),
            None => &[],
        };
        TxtNode::new_parent(node_type, span, raw, children)
    }

    fn text(&self, node: &Node, value: &str, node_type: NodeType) -> TxtNode<'a> {
        let (span, raw) = self.locate(node);
        // Reuse the source slice when the value is verbatim.
        let value = if raw == value {
            raw
        } else {
            self.arena.alloc_str(value)
        };
        TxtNode::new_text(node_type, span, raw, value)
    }

    fn leaf(&self, node: &Node, node_type: NodeType) -> TxtNode<'a> {
        let (span, raw) = self.locate(node);
        TxtNode::new_leaf(node_type, span, raw)
    }
}
