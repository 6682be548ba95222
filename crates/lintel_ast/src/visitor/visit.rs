//! Visitor trait for traversing TxtAST nodes.
//!
//! Each `visit_*` method has a default implementation that walks children,
//! so implementors override only the node types they care about.

use std::ops::ControlFlow;

use crate::TxtNode;

use super::walk::{walk_children, walk_node};

/// Result type for visitor methods to control traversal.
///
/// - `ControlFlow::Continue(())` - continue visiting
/// - `ControlFlow::Break(())` - stop traversal early
pub type VisitResult = ControlFlow<()>;

/// Visitor trait for traversing TxtAST nodes without modification.
///
/// The `'a` lifetime ties visited nodes to their arena allocator, so a
/// visitor may keep `&'a str` slices of the nodes it sees.
pub trait Visitor<'a>: Sized {
    /// Called before visiting any node.
    #[inline]
    fn enter_node(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Called after visiting a node and all its children.
    #[inline]
    fn exit_node(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Visits any node by dispatching to the type-specific method.
    #[inline]
    fn visit_node(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_node(self, node)
    }

    // === Block-level node visitors ===

    fn visit_document(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_paragraph(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_header(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_block_quote(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_list(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_list_item(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_code_block(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_horizontal_rule(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_html(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    // === Inline-level node visitors ===

    fn visit_str(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_break(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_emphasis(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_strong(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_delete(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    /// Visit an inline Code node.
    fn visit_code(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_link(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_image(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    // === Reference node visitors ===

    fn visit_link_reference(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_image_reference(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_definition(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }

    // === Table node visitors (GFM) ===

    fn visit_table(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_table_row(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_table_cell(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    // === Footnote node visitors ===

    fn visit_footnote_definition(&mut self, node: &TxtNode<'a>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_footnote_reference(&mut self, _node: &TxtNode<'a>) -> VisitResult {
        ControlFlow::Continue(())
    }
}
