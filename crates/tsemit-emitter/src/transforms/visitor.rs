//! Generic child traversal shared by the lowering passes.
//!
//! A pass implements `Visitor::visit`, returning zero, one or several
//! replacement nodes for a node. `visit_each_child` rebuilds a node with each
//! child passed through the pass, going through `NodeArena::update_node` so
//! an untouched subtree keeps its identity.

use smallvec::SmallVec;
use tsemit_ast::{ChildMapper, EmitFlags, NodeArena, NodeData, NodeIndex, NodeList};
use tsemit_ast::utilities::is_prologue_directive;
use tsemit_common::{EmitError, EmitResult};

/// Replacement nodes for one visited node.
pub type VisitResult = SmallVec<[NodeIndex; 1]>;

pub fn single(node: NodeIndex) -> VisitResult {
    let mut out = VisitResult::new();
    if node.is_some() {
        out.push(node);
    }
    out
}

pub fn elided() -> VisitResult {
    VisitResult::new()
}

pub fn many(nodes: impl IntoIterator<Item = NodeIndex>) -> VisitResult {
    nodes.into_iter().filter(|n| n.is_some()).collect()
}

pub trait Visitor {
    fn arena(&mut self) -> &mut NodeArena;

    fn visit(&mut self, node: NodeIndex) -> EmitResult<VisitResult>;
}

struct ChildVisitor<'v, V: ?Sized> {
    visitor: &'v mut V,
}

impl<V: Visitor + ?Sized> ChildMapper for ChildVisitor<'_, V> {
    fn node(&mut self, child: NodeIndex) -> EmitResult<NodeIndex> {
        if child.is_none() {
            return Ok(NodeIndex::NONE);
        }
        let out = self.visitor.visit(child)?;
        match out.as_slice() {
            [] => Ok(NodeIndex::NONE),
            [one] => Ok(*one),
            _ => {
                let kind = self.visitor.arena().kind(child);
                Err(EmitError::internal(format!(
                    "visitor produced {} nodes for a single {:?} child",
                    out.len(),
                    kind
                )))
            }
        }
    }

    fn statement(&mut self, child: NodeIndex) -> EmitResult<NodeIndex> {
        if child.is_none() {
            return Ok(NodeIndex::NONE);
        }
        let out = self.visitor.visit(child)?;
        let arena = self.visitor.arena();
        Ok(match out.as_slice() {
            [] => arena.create_empty_statement(),
            [one] => *one,
            several => arena.create_block(several.to_vec(), true),
        })
    }

    fn list(&mut self, list: NodeList) -> EmitResult<NodeList> {
        let mut nodes = Vec::with_capacity(list.len());
        for child in list.iter() {
            nodes.extend(self.visitor.visit(child)?);
        }
        if nodes == list.nodes {
            return Ok(list);
        }
        Ok(list.with_nodes(nodes))
    }
}

/// Rebuild `node` with every child visited.
pub fn visit_each_child<V: Visitor + ?Sized>(visitor: &mut V, node: NodeIndex) -> EmitResult<NodeIndex> {
    let data = visitor.arena().data(node)?.clone();
    visit_data(visitor, node, data)
}

/// Rebuild `node` from `data` (usually its own payload with some slots
/// cleared) with every remaining child visited.
pub fn visit_data<V: Visitor + ?Sized>(visitor: &mut V, node: NodeIndex, data: NodeData) -> EmitResult<NodeIndex> {
    let mapped = data.map_children(&mut ChildVisitor { visitor: &mut *visitor })?;
    Ok(visitor.arena().update_node(node, mapped))
}

/// Visit every node of a list, flattening the results.
pub fn visit_nodes<V: Visitor + ?Sized>(visitor: &mut V, nodes: &[NodeIndex]) -> EmitResult<Vec<NodeIndex>> {
    let mut out = Vec::with_capacity(nodes.len());
    for &node in nodes {
        out.extend(visitor.visit(node)?);
    }
    Ok(out)
}

/// Visit a single node that must produce exactly one node (or none for NONE).
pub fn visit_node<V: Visitor + ?Sized>(visitor: &mut V, node: NodeIndex) -> EmitResult<NodeIndex> {
    ChildVisitor { visitor }.node(node)
}

/// Visit an embedded statement, lifting several results into a block.
pub fn visit_statement<V: Visitor + ?Sized>(visitor: &mut V, node: NodeIndex) -> EmitResult<NodeIndex> {
    ChildVisitor { visitor }.statement(node)
}

/// Number of leading statements that must stay first: prologue directives
/// and statements a pass marked as custom prologue.
pub fn prologue_count(arena: &NodeArena, statements: &[NodeIndex]) -> usize {
    statements
        .iter()
        .take_while(|&&s| is_prologue_directive(arena, s) || arena.emit_flags(s).contains(EmitFlags::CUSTOM_PROLOGUE))
        .count()
}

/// Insert hoisted declarations after the prologue of `statements`.
pub fn merge_lexical_environment(arena: &NodeArena, mut statements: Vec<NodeIndex>, declarations: Vec<NodeIndex>) -> Vec<NodeIndex> {
    if declarations.is_empty() {
        return statements;
    }
    let at = prologue_count(arena, &statements);
    statements.splice(at..at, declarations);
    statements
}

/// Statements of a block-like node (block, module block, source file, clause).
pub fn statements_of(arena: &NodeArena, node: NodeIndex) -> EmitResult<NodeList> {
    match arena.data(node)? {
        NodeData::Block { statements, .. }
        | NodeData::ModuleBlock { statements }
        | NodeData::CaseClause { statements, .. }
        | NodeData::DefaultClause { statements } => Ok(statements.clone()),
        NodeData::SourceFile(sf) => Ok(sf.statements.clone()),
        other => Err(EmitError::UnexpectedNode {
            kind: format!("{:?}", other.kind()),
            pos: arena.range(node).pos,
            context: "statements_of",
        }),
    }
}

/// `node` unchanged except for its statements.
pub fn update_statements(arena: &mut NodeArena, node: NodeIndex, statements: Vec<NodeIndex>) -> EmitResult<NodeIndex> {
    let data = match arena.data(node)?.clone() {
        NodeData::Block { statements: old, multi_line } => NodeData::Block {
            statements: old.with_nodes(statements),
            multi_line,
        },
        NodeData::ModuleBlock { statements: old } => NodeData::ModuleBlock {
            statements: old.with_nodes(statements),
        },
        NodeData::CaseClause { expression, statements: old } => NodeData::CaseClause {
            expression,
            statements: old.with_nodes(statements),
        },
        NodeData::DefaultClause { statements: old } => NodeData::DefaultClause {
            statements: old.with_nodes(statements),
        },
        NodeData::SourceFile(mut sf) => {
            sf.statements = sf.statements.with_nodes(statements);
            NodeData::SourceFile(sf)
        }
        other => {
            return Err(EmitError::UnexpectedNode {
                kind: format!("{:?}", other.kind()),
                pos: arena.range(node).pos,
                context: "update_statements",
            });
        }
    };
    Ok(arena.update_node(node, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsemit_ast::SyntaxKind;

    /// Drops every `debugger;` and duplicates every empty statement.
    struct Shuffle<'a> {
        arena: &'a mut NodeArena,
    }

    impl Visitor for Shuffle<'_> {
        fn arena(&mut self) -> &mut NodeArena {
            self.arena
        }

        fn visit(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
            match self.arena.kind(node) {
                Some(SyntaxKind::DebuggerStatement) => Ok(elided()),
                Some(SyntaxKind::EmptyStatement) => Ok(many([node, node])),
                _ => Ok(single(visit_each_child(self, node)?)),
            }
        }
    }

    #[test]
    fn test_lists_flatten_results() {
        let mut arena = NodeArena::new();
        let debugger = arena.create_node(NodeData::DebuggerStatement);
        let empty = arena.create_empty_statement();
        let block = arena.create_block(vec![debugger, empty], true);
        let mut visitor = Shuffle { arena: &mut arena };
        let visited = visit_each_child(&mut visitor, block).unwrap();
        let statements = statements_of(&arena, visited).unwrap();
        assert_eq!(statements.nodes, vec![empty, empty]);
    }

    #[test]
    fn test_embedded_statement_is_lifted_into_block() {
        let mut arena = NodeArena::new();
        let empty = arena.create_empty_statement();
        let cond = arena.create_true();
        let while_stmt = arena.create_while(cond, empty);
        let mut visitor = Shuffle { arena: &mut arena };
        let visited = visit_each_child(&mut visitor, while_stmt).unwrap();
        let Ok(NodeData::WhileStatement { statement, .. }) = arena.data(visited).cloned() else {
            panic!("expected while");
        };
        assert!(arena.is_kind(statement, SyntaxKind::Block));
    }

    #[test]
    fn test_unchanged_subtree_keeps_identity() {
        let mut arena = NodeArena::new();
        let x = arena.create_identifier("x");
        let ret = arena.create_return(x);
        let block = arena.create_block(vec![ret], true);
        let mut visitor = Shuffle { arena: &mut arena };
        assert_eq!(visit_each_child(&mut visitor, block).unwrap(), block);
    }

    #[test]
    fn test_hoisted_declarations_follow_prologue() {
        let mut arena = NodeArena::new();
        let use_strict = arena.create_string_literal("use strict");
        let directive = arena.create_expression_statement(use_strict);
        let x = arena.create_identifier("x");
        let ret = arena.create_return(x);
        let hoisted = arena.create_empty_statement();
        let merged = merge_lexical_environment(&arena, vec![directive, ret], vec![hoisted]);
        assert_eq!(merged, vec![directive, hoisted, ret]);
    }
}
