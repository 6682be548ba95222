//! Walk functions for AST traversal.

use std::ops::ControlFlow;

use crate::{NodeType, TxtNode};

use super::visit::{VisitResult, Visitor};

/// Walks a node: `enter_node`, the type-specific `visit_*` method, then
/// `exit_node`.
pub fn walk_node<'a, V>(visitor: &mut V, node: &TxtNode<'a>) -> VisitResult
where
    V: Visitor<'a>,
{
    visitor.enter_node(node)?;

    let result = match node.node_type {
        NodeType::Document => visitor.visit_document(node),
        NodeType::Paragraph => visitor.visit_paragraph(node),
        NodeType::Header => visitor.visit_header(node),
        NodeType::BlockQuote => visitor.visit_block_quote(node),
        NodeType::List => visitor.visit_list(node),
        NodeType::ListItem => visitor.visit_list_item(node),
        NodeType::CodeBlock => visitor.visit_code_block(node),
        NodeType::HorizontalRule => visitor.visit_horizontal_rule(node),
        NodeType::Html => visitor.visit_html(node),

        NodeType::Str => visitor.visit_str(node),
        NodeType::Break => visitor.visit_break(node),
        NodeType::Emphasis => visitor.visit_emphasis(node),
        NodeType::Strong => visitor.visit_strong(node),
        NodeType::Delete => visitor.visit_delete(node),
        NodeType::Code => visitor.visit_code(node),
        NodeType::Link => visitor.visit_link(node),
        NodeType::Image => visitor.visit_image(node),

        NodeType::LinkReference => visitor.visit_link_reference(node),
        NodeType::ImageReference => visitor.visit_image_reference(node),
        NodeType::Definition => visitor.visit_definition(node),

        NodeType::Table => visitor.visit_table(node),
        NodeType::TableRow => visitor.visit_table_row(node),
        NodeType::TableCell => visitor.visit_table_cell(node),

        NodeType::FootnoteDefinition => visitor.visit_footnote_definition(node),
        NodeType::FootnoteReference => visitor.visit_footnote_reference(node),
    };

    result?;

    visitor.exit_node(node)
}

/// Walks all children of a node in order.
#[inline]
pub fn walk_children<'a, V>(visitor: &mut V, node: &TxtNode<'a>) -> VisitResult
where
    V: Visitor<'a>,
{
    for child in node.children {
        walk_node(visitor, child)?;
    }
    ControlFlow::Continue(())
}

/// Walks `root` and its descendants depth-first in document order.
///
/// The callback receives each node together with its ancestors, ordered from
/// the root down to the direct parent. The root itself has no ancestors.
pub fn walk_with_ancestors<'a, F>(root: &TxtNode<'a>, mut f: F) -> VisitResult
where
    F: FnMut(&TxtNode<'a>, &[&TxtNode<'a>]) -> VisitResult,
{
    let mut ancestors = Vec::new();
    walk_ancestors_inner(root, &mut ancestors, &mut f)
}

fn walk_ancestors_inner<'n, 'a, F>(
    node: &'n TxtNode<'a>,
    ancestors: &mut Vec<&'n TxtNode<'a>>,
    f: &mut F,
) -> VisitResult
where
    F: FnMut(&TxtNode<'a>, &[&TxtNode<'a>]) -> VisitResult,
{
    f(node, ancestors.as_slice())?;

    ancestors.push(node);
    let mut result = ControlFlow::Continue(());
    for child in node.children {
        result = walk_ancestors_inner(child, ancestors, f);
        if result.is_break() {
            break;
        }
    }
    ancestors.pop();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AstArena, Span};
    use pretty_assertions::assert_eq;

    /// Builds `Document -> Paragraph -> [Str "first", Str "second"]`.
    fn sample<'a>(arena: &'a AstArena) -> TxtNode<'a> {
        let src = arena.alloc_str("first second");
        let first = TxtNode::new_text(NodeType::Str, Span::new(0, 5), &src[0..5], &src[0..5]);
        let second = TxtNode::new_text(NodeType::Str, Span::new(6, 12), &src[6..12], &src[6..12]);
        let para_children = arena.alloc_slice_copy(&[first, second]);
        let para = TxtNode::new_parent(NodeType::Paragraph, Span::new(0, 12), src, para_children);
        let doc_children = arena.alloc_slice_copy(&[para]);
        TxtNode::new_parent(NodeType::Document, Span::new(0, 12), src, doc_children)
    }

    struct HookTracker {
        events: Vec<String>,
    }

    impl<'a> Visitor<'a> for HookTracker {
        fn enter_node(&mut self, node: &TxtNode<'a>) -> VisitResult {
            self.events.push(format!("enter:{}", node.node_type));
            ControlFlow::Continue(())
        }

        fn exit_node(&mut self, node: &TxtNode<'a>) -> VisitResult {
            self.events.push(format!("exit:{}", node.node_type));
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn walk_node_calls_hooks_in_document_order() {
        let arena = AstArena::new();
        let doc = sample(&arena);

        let mut tracker = HookTracker { events: Vec::new() };
        let result = walk_node(&mut tracker, &doc);

        assert!(result.is_continue());
        assert_eq!(
            tracker.events,
            vec![
                "enter:Document",
                "enter:Paragraph",
                "enter:Str",
                "exit:Str",
                "enter:Str",
                "exit:Str",
                "exit:Paragraph",
                "exit:Document",
            ]
        );
    }

    struct FirstStrFinder<'a> {
        found: Option<&'a str>,
    }

    impl<'a> Visitor<'a> for FirstStrFinder<'a> {
        fn visit_str(&mut self, node: &TxtNode<'a>) -> VisitResult {
            self.found = node.value;
            ControlFlow::Break(())
        }
    }

    #[test]
    fn walk_node_supports_early_termination() {
        let arena = AstArena::new();
        let doc = sample(&arena);

        let mut finder = FirstStrFinder { found: None };
        let result = walk_node(&mut finder, &doc);

        assert!(result.is_break());
        assert_eq!(finder.found, Some("first"));
    }

    #[test]
    fn walk_with_ancestors_reports_parent_chain() {
        let arena = AstArena::new();
        let doc = sample(&arena);

        let mut seen = Vec::new();
        let result = walk_with_ancestors(&doc, |node, ancestors| {
            let chain: Vec<String> = ancestors.iter().map(|a| a.node_type.to_string()).collect();
            seen.push((node.raw.to_string(), chain.join(">")));
            ControlFlow::Continue(())
        });

        assert!(result.is_continue());
        assert_eq!(
            seen,
            vec![
                ("first second".to_string(), "".to_string()),
                ("first second".to_string(), "Document".to_string()),
                ("first".to_string(), "Document>Paragraph".to_string()),
                ("second".to_string(), "Document>Paragraph".to_string()),
            ]
        );
    }

    #[test]
    fn walk_with_ancestors_stops_on_break() {
        let arena = AstArena::new();
        let doc = sample(&arena);

        let mut visited = 0;
        let result = walk_with_ancestors(&doc, |node, _| {
            visited += 1;
            if node.node_type == NodeType::Str {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert!(result.is_break());
        assert_eq!(visited, 3);
    }
}
