//! The node arena.
//!
//! Parse-tree nodes are added with `add_node*` (they keep their source range
//! and get parent links). Transforms create nodes through the factory
//! methods in `factory.rs`, which mark them `SYNTHESIZED` and parenthesize
//! their operands. Both paths compute transform flags bottom-up at
//! allocation time.

use crate::emit_node::{EmitNode, SynthesizedComment, TextRange};
use crate::flags::{EmitFlags, ModifierFlags, NodeFlags, TransformFlags};
use crate::node::{IdentifierData, Node, NodeData, NodeIndex, SourceFileData};
use crate::syntax_kind::SyntaxKind;
use crate::transform_flags::compute_own_transform_flags;
use rustc_hash::FxHashMap;
use tsemit_common::comments::CommentKind;
use tsemit_common::{EmitError, EmitResult, NO_POS};

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    /// Parent links for parse-tree nodes. Synthesized nodes have none.
    parents: Vec<NodeIndex>,
    emit_nodes: FxHashMap<NodeIndex, EmitNode>,
    next_auto_generate_id: u32,
}

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 5_000_000;

    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        let capacity = capacity.min(Self::MAX_NODE_PREALLOC);
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
            ..NodeArena::default()
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get_mut(index.0 as usize)
    }

    /// Like `get`, but a missing node is an internal error.
    pub fn node(&self, index: NodeIndex) -> EmitResult<&Node> {
        self.get(index)
            .ok_or_else(|| EmitError::internal(format!("node {} is not in the arena", index.0)))
    }

    pub fn data(&self, index: NodeIndex) -> EmitResult<&NodeData> {
        Ok(&self.node(index)?.data)
    }

    /// Kind of a node, `None` for NONE or out-of-range indices.
    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<SyntaxKind> {
        self.get(index).map(Node::kind)
    }

    #[inline]
    pub fn is_kind(&self, index: NodeIndex, kind: SyntaxKind) -> bool {
        self.kind(index) == Some(kind)
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        if index.is_none() {
            return NodeIndex::NONE;
        }
        self.parents.get(index.0 as usize).copied().unwrap_or(NodeIndex::NONE)
    }

    pub fn modifiers(&self, index: NodeIndex) -> ModifierFlags {
        self.get(index).map_or(ModifierFlags::NONE, |n| n.modifiers)
    }

    pub fn has_modifier(&self, index: NodeIndex, flag: ModifierFlags) -> bool {
        self.modifiers(index).intersects(flag)
    }

    pub fn node_flags(&self, index: NodeIndex) -> NodeFlags {
        self.get(index).map_or(NodeFlags::NONE, |n| n.flags)
    }

    pub fn transform_flags(&self, index: NodeIndex) -> TransformFlags {
        self.get(index).map_or(TransformFlags::NONE, |n| n.transform_flags)
    }

    /// Identifier payload, if `index` is an identifier.
    pub fn identifier(&self, index: NodeIndex) -> Option<&IdentifierData> {
        self.get(index).and_then(|n| n.data.as_identifier())
    }

    /// Source text of an identifier (the base text for generated names).
    pub fn identifier_text(&self, index: NodeIndex) -> &str {
        self.identifier(index).map_or("", |id| id.text.as_str())
    }

    pub fn is_generated_identifier(&self, index: NodeIndex) -> bool {
        self.identifier(index).is_some_and(|id| id.auto_generate.is_some())
    }

    pub fn source_file(&self, index: NodeIndex) -> EmitResult<&SourceFileData> {
        match self.data(index)? {
            NodeData::SourceFile(sf) => Ok(sf),
            other => Err(EmitError::UnexpectedNode {
                kind: format!("{:?}", other.kind()),
                pos: self.get(index).map_or(NO_POS, |n| n.pos),
                context: "source_file",
            }),
        }
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    fn alloc(&mut self, mut node: Node) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        node.transform_flags = self.compute_transform_flags(&node);
        self.nodes.push(node);
        self.parents.push(NodeIndex::NONE);
        index
    }

    /// Add a parse-tree node. Children must already be in the arena.
    pub fn add_node(&mut self, data: NodeData, pos: u32, end: u32) -> NodeIndex {
        self.add_node_with(data, pos, end, NodeFlags::NONE, ModifierFlags::NONE)
    }

    pub fn add_node_with(
        &mut self,
        data: NodeData,
        pos: u32,
        end: u32,
        flags: NodeFlags,
        modifiers: ModifierFlags,
    ) -> NodeIndex {
        let children = data.children();
        let index = self.alloc(Node {
            pos,
            end,
            flags: flags - NodeFlags::SYNTHESIZED,
            modifiers,
            transform_flags: TransformFlags::NONE,
            emit_flags: EmitFlags::NONE,
            original: NodeIndex::NONE,
            data,
        });
        for child in children {
            if let Some(slot) = self.parents.get_mut(child.0 as usize) {
                *slot = index;
            }
        }
        index
    }

    /// Allocate a synthesized node with no range and no parenthesization.
    pub(crate) fn alloc_synthesized(
        &mut self,
        data: NodeData,
        flags: NodeFlags,
        modifiers: ModifierFlags,
    ) -> NodeIndex {
        self.alloc(Node {
            pos: NO_POS,
            end: NO_POS,
            flags: flags | NodeFlags::SYNTHESIZED,
            modifiers,
            transform_flags: TransformFlags::NONE,
            emit_flags: EmitFlags::NONE,
            original: NodeIndex::NONE,
            data,
        })
    }

    /// Id for a new generated identifier. Unique within this arena.
    pub fn next_auto_generate_id(&mut self) -> u32 {
        self.next_auto_generate_id += 1;
        self.next_auto_generate_id
    }

    // =========================================================================
    // Transform flags
    // =========================================================================

    fn compute_transform_flags(&self, node: &Node) -> TransformFlags {
        let mut flags = compute_own_transform_flags(self, node);
        node.data.for_each_child(&mut |child| {
            flags |= self.transform_flags(child).facts();
        });
        flags | TransformFlags::HAS_COMPUTED_FLAGS
    }

    /// Recompute the flags of a subtree bottom-up and return the root's flags.
    pub fn aggregate_transform_flags(&mut self, index: NodeIndex) -> TransformFlags {
        let Some(node) = self.get(index) else {
            return TransformFlags::NONE;
        };
        for child in node.data.children() {
            self.aggregate_transform_flags(child);
        }
        let Some(node) = self.get(index) else {
            return TransformFlags::NONE;
        };
        let flags = self.compute_transform_flags(node);
        if let Some(node) = self.get_mut(index) {
            node.transform_flags = flags;
        }
        flags
    }

    // =========================================================================
    // Original links and ranges
    // =========================================================================

    pub fn original(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.original)
    }

    /// Follow `original` links to the node the parser produced.
    pub fn get_parse_tree_node(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(node) = self.get(index) {
            if node.is_parse_tree_node() {
                return index;
            }
            index = node.original;
        }
        NodeIndex::NONE
    }

    /// Record `original` as the node `index` replaces, inheriting its emit data.
    pub fn set_original(&mut self, index: NodeIndex, original: NodeIndex) {
        if index.is_none() || original.is_none() || index == original {
            return;
        }
        let inherited_flags = self.get(original).map_or(EmitFlags::NONE, |n| n.emit_flags);
        let inherited = self.emit_nodes.get(&original).cloned();
        if let Some(node) = self.get_mut(index) {
            node.original = original;
            node.emit_flags |= inherited_flags;
        }
        if let Some(source) = inherited {
            self.emit_nodes.entry(index).or_default().merge_from(&source);
        }
    }

    pub fn set_text_range(&mut self, index: NodeIndex, pos: u32, end: u32) {
        if let Some(node) = self.get_mut(index) {
            node.pos = pos;
            node.end = end;
        }
    }

    /// Copy the source range of `from` onto `index`.
    pub fn set_text_range_from(&mut self, index: NodeIndex, from: NodeIndex) {
        if let Some(&Node { pos, end, .. }) = self.get(from) {
            self.set_text_range(index, pos, end);
        }
    }

    pub fn range(&self, index: NodeIndex) -> TextRange {
        self.get(index).map_or(TextRange::NONE, |n| TextRange::new(n.pos, n.end))
    }

    // =========================================================================
    // Emit data
    // =========================================================================

    pub fn emit_flags(&self, index: NodeIndex) -> EmitFlags {
        self.get(index).map_or(EmitFlags::NONE, |n| n.emit_flags)
    }

    pub fn add_emit_flags(&mut self, index: NodeIndex, flags: EmitFlags) {
        if let Some(node) = self.get_mut(index) {
            node.emit_flags |= flags;
        }
    }

    pub fn emit_node(&self, index: NodeIndex) -> Option<&EmitNode> {
        self.emit_nodes.get(&index)
    }

    fn emit_node_mut(&mut self, index: NodeIndex) -> &mut EmitNode {
        self.emit_nodes.entry(index).or_default()
    }

    /// Range used for comment emission: the explicit comment range or the node's own.
    pub fn comment_range(&self, index: NodeIndex) -> TextRange {
        self.emit_nodes
            .get(&index)
            .and_then(|e| e.comment_range)
            .unwrap_or_else(|| self.range(index))
    }

    pub fn set_comment_range(&mut self, index: NodeIndex, range: TextRange) {
        self.emit_node_mut(index).comment_range = Some(range);
    }

    pub fn source_map_range(&self, index: NodeIndex) -> TextRange {
        self.emit_nodes
            .get(&index)
            .and_then(|e| e.source_map_range)
            .unwrap_or_else(|| self.range(index))
    }

    pub fn set_source_map_range(&mut self, index: NodeIndex, range: TextRange) {
        self.emit_node_mut(index).source_map_range = Some(range);
    }

    pub fn starts_on_new_line(&self, index: NodeIndex) -> bool {
        self.emit_nodes.get(&index).is_some_and(|e| e.starts_on_new_line)
    }

    pub fn set_starts_on_new_line(&mut self, index: NodeIndex) {
        self.emit_node_mut(index).starts_on_new_line = true;
    }

    pub fn add_synthetic_leading_comment(
        &mut self,
        index: NodeIndex,
        kind: CommentKind,
        text: &str,
        has_trailing_new_line: bool,
    ) {
        self.emit_node_mut(index)
            .leading_comments
            .push(SynthesizedComment::new(kind, text, has_trailing_new_line));
    }

    pub fn add_synthetic_trailing_comment(
        &mut self,
        index: NodeIndex,
        kind: CommentKind,
        text: &str,
        has_trailing_new_line: bool,
    ) {
        self.emit_node_mut(index)
            .trailing_comments
            .push(SynthesizedComment::new(kind, text, has_trailing_new_line));
    }

    pub fn synthetic_leading_comments(&self, index: NodeIndex) -> &[SynthesizedComment] {
        self.emit_nodes.get(&index).map_or(&[], |e| e.leading_comments.as_slice())
    }

    pub fn synthetic_trailing_comments(&self, index: NodeIndex) -> &[SynthesizedComment] {
        self.emit_nodes.get(&index).map_or(&[], |e| e.trailing_comments.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AutoGenerate;

    fn ident(arena: &mut NodeArena, text: &str, pos: u32) -> NodeIndex {
        arena.add_node(
            NodeData::Identifier(IdentifierData {
                text: text.to_string(),
                auto_generate: None,
            }),
            pos,
            pos + text.len() as u32,
        )
    }

    #[test]
    fn test_parent_links_for_parse_nodes() {
        let mut arena = NodeArena::new();
        let left = ident(&mut arena, "a", 0);
        let right = ident(&mut arena, "b", 4);
        let binary = arena.add_node(
            NodeData::BinaryExpression {
                left,
                operator: SyntaxKind::PlusToken,
                right,
            },
            0,
            5,
        );
        assert_eq!(arena.parent(left), binary);
        assert_eq!(arena.parent(right), binary);
        assert!(arena.parent(binary).is_none());
        assert!(arena.get(binary).is_some_and(Node::is_parse_tree_node));
    }

    #[test]
    fn test_parse_tree_node_follows_original() {
        let mut arena = NodeArena::new();
        let parsed = ident(&mut arena, "x", 0);
        let synthesized = arena.create_identifier("x");
        assert!(arena.get_parse_tree_node(synthesized).is_none());
        arena.set_original(synthesized, parsed);
        assert_eq!(arena.get_parse_tree_node(synthesized), parsed);
    }

    #[test]
    fn test_set_original_inherits_emit_data() {
        let mut arena = NodeArena::new();
        let parsed = ident(&mut arena, "x", 0);
        arena.add_emit_flags(parsed, EmitFlags::NO_COMMENTS);
        arena.add_synthetic_leading_comment(parsed, CommentKind::MultiLine, "* @class ", false);
        let replacement = arena.create_identifier("y");
        arena.set_original(replacement, parsed);
        assert!(arena.emit_flags(replacement).contains(EmitFlags::NO_COMMENTS));
        assert_eq!(arena.synthetic_leading_comments(replacement).len(), 1);
    }

    #[test]
    fn test_auto_generate_ids_are_distinct() {
        let mut arena = NodeArena::new();
        let a = arena.create_temp_variable();
        let b = arena.create_temp_variable();
        let id = |arena: &NodeArena, i| {
            arena
                .identifier(i)
                .and_then(|d: &IdentifierData| d.auto_generate)
                .map(|g: AutoGenerate| g.id)
        };
        assert_ne!(id(&arena, a), id(&arena, b));
    }

    #[test]
    fn test_missing_node_is_internal_error() {
        let arena = NodeArena::new();
        let err = arena.node(NodeIndex(7)).map(|_| ()).unwrap_err();
        assert!(err.is_internal());
    }
}
