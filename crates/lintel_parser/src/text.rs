//! Plain text format plugin.
//!
//! Paragraphs are runs of non-blank lines. Inside a paragraph each line
//! becomes a `Str` node and each line terminator a `Break` node.

use lintel_ast::{AstArena, NodeType, Span, TxtNode};

use crate::{FormatPlugin, ParseError, source_len};

/// Plain text plugin.
pub struct PlainTextPlugin;

impl PlainTextPlugin {
    /// Creates a new plain text plugin.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatPlugin for PlainTextPlugin {
    fn name(&self) -> &str {
        "text"
    }

    fn kinds(&self) -> &[&str] {
        &["text", "txt"]
    }

    fn parse<'a>(&self, arena: &'a AstArena, source: &str) -> Result<TxtNode<'a>, ParseError> {
        let len = source_len(source)?;
        let src = arena.alloc_str(source);
        let mut paragraphs: Vec<TxtNode<'a>> = Vec::new();
        let mut current: Vec<TxtNode<'a>> = Vec::new();
        let mut offset = 0usize;

        for line in src.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();

            let content = line.trim_end_matches(['\n', '\r']);
            if content.trim().is_empty() {
                flush_paragraph(arena, src, &mut current, &mut paragraphs);
                continue;
            }

            // The terminator of the previous line stays inside the paragraph.
            if let Some(last) = current.last() {
                let span = Span::new(last.span.end, line_start as u32);
                current.push(TxtNode::new_leaf(NodeType::Break, span, &src[span.to_range()]));
            }

            let span = Span::new(line_start as u32, (line_start + content.len()) as u32);
            current.push(TxtNode::new_text(NodeType::Str, span, content, content));
        }
        flush_paragraph(arena, src, &mut current, &mut paragraphs);

        let children = arena.alloc_slice_copy(&paragraphs);
        Ok(TxtNode::new_parent(
            NodeType::Document,
            Span::new(0, len),
            src,
            children,
        ))
    }
}

fn flush_paragraph<'a>(
    arena: &'a AstArena,
    src: &'a str,
    current: &mut Vec<TxtNode<'a>>,
    paragraphs: &mut Vec<TxtNode<'a>>,
) {
    let (Some(first), Some(last)) = (current.first(), current.last()) else {
        return;
    };
    let span = Span::new(first.span.start, last.span.end);
    let children = arena.alloc_slice_copy(current);
    paragraphs.push(TxtNode::new_parent(
        NodeType::Paragraph,
        span,
        &src[span.to_range()],
        children,
    ));
    current.clear();
}
