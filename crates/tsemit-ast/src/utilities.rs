//! Tree queries shared by the passes and the printer.

use crate::arena::NodeArena;
use crate::flags::{ModifierFlags, NodeFlags};
use crate::node::{NodeData, NodeIndex};
use crate::syntax_kind::SyntaxKind;
use tsemit_common::skip_trivia;

/// A file is a module when it has a top-level import or export.
pub fn is_external_module(arena: &NodeArena, source_file: NodeIndex) -> bool {
    if arena.node_flags(source_file).contains(NodeFlags::EXTERNAL_MODULE) {
        return true;
    }
    let Ok(sf) = arena.source_file(source_file) else {
        return false;
    };
    sf.statements.iter().any(|stmt| {
        if arena.has_modifier(stmt, ModifierFlags::EXPORT) {
            return true;
        }
        match arena.get(stmt).map(|n| &n.data) {
            Some(
                NodeData::ImportDeclaration { .. }
                | NodeData::ExportDeclaration { .. }
                | NodeData::ExportAssignment { .. },
            ) => true,
            Some(NodeData::ImportEqualsDeclaration { module_reference, .. }) => {
                arena.is_kind(*module_reference, SyntaxKind::ExternalModuleReference)
            }
            _ => false,
        }
    })
}

/// `"use strict";` and other string-literal expression statements.
pub fn is_prologue_directive(arena: &NodeArena, statement: NodeIndex) -> bool {
    match arena.get(statement).map(|n| &n.data) {
        Some(NodeData::ExpressionStatement { expression }) => arena.is_kind(*expression, SyntaxKind::StringLiteral),
        _ => false,
    }
}

/// `super(...)` as a statement.
pub fn is_super_call_statement(arena: &NodeArena, statement: NodeIndex) -> bool {
    match arena.get(statement).map(|n| &n.data) {
        Some(NodeData::ExpressionStatement { expression }) => is_super_call(arena, *expression),
        _ => false,
    }
}

pub fn is_super_call(arena: &NodeArena, expression: NodeIndex) -> bool {
    match arena.get(expression).map(|n| &n.data) {
        Some(NodeData::CallExpression { expression, .. }) => arena.is_kind(*expression, SyntaxKind::SuperKeyword),
        _ => false,
    }
}

pub fn is_block_scoped_list(arena: &NodeArena, list: NodeIndex) -> bool {
    arena.is_kind(list, SyntaxKind::VariableDeclarationList)
        && arena.node_flags(list).intersects(NodeFlags::BLOCK_SCOPED)
}

pub fn is_binding_pattern(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(node),
        Some(SyntaxKind::ObjectBindingPattern | SyntaxKind::ArrayBindingPattern)
    )
}

/// `left = right` where `left` is an object or array literal.
pub fn is_destructuring_assignment(arena: &NodeArena, node: NodeIndex) -> bool {
    match arena.get(node).map(|n| &n.data) {
        Some(NodeData::BinaryExpression { left, operator: SyntaxKind::EqualsToken, .. }) => matches!(
            arena.kind(*left),
            Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::ArrayLiteralExpression)
        ),
        _ => false,
    }
}

/// Literals and non-generated identifiers: the value can be inlined as-is.
pub fn is_simple_inlineable_expression(arena: &NodeArena, node: NodeIndex) -> bool {
    (arena.is_kind(node, SyntaxKind::Identifier) && !arena.is_generated_identifier(node))
        || matches!(
            arena.kind(node),
            Some(
                SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::NoSubstitutionTemplateLiteral
                    | SyntaxKind::TrueKeyword
                    | SyntaxKind::FalseKeyword
                    | SyntaxKind::NullKeyword
            )
        )
}

/// Source text of a parse-tree node, without leading trivia.
pub fn get_text_of_node<'a>(arena: &NodeArena, source_text: &'a str, node: NodeIndex) -> &'a str {
    let Some(n) = arena.get(node) else {
        return "";
    };
    if n.is_synthesized() {
        return "";
    }
    let start = skip_trivia(source_text, n.pos) as usize;
    let end = (n.end as usize).min(source_text.len());
    source_text.get(start..end).unwrap_or("")
}

/// True when `node` is the `name` of its parse-tree parent declaration.
pub fn is_declaration_name(arena: &NodeArena, node: NodeIndex) -> bool {
    let parent = arena.parent(node);
    parent.is_some() && arena.declaration_name_node(parent) == node
}

/// Name text for identifiers and string/numeric literal property names.
pub fn get_property_name_text(arena: &NodeArena, name: NodeIndex) -> Option<String> {
    match arena.get(name).map(|n| &n.data) {
        Some(NodeData::Identifier(id)) => Some(id.text.clone()),
        Some(NodeData::StringLiteral { text, .. } | NodeData::NumericLiteral { text }) => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{IdentifierData, NodeList, SourceFileData};
    use std::sync::Arc;

    #[test]
    fn test_is_external_module_detects_export_modifier() {
        let mut arena = NodeArena::new();
        let name = arena.add_node(
            NodeData::Identifier(IdentifierData {
                text: "x".into(),
                auto_generate: None,
            }),
            11,
            12,
        );
        let decl = arena.add_node(
            NodeData::VariableDeclaration {
                name,
                exclamation: false,
                type_node: NodeIndex::NONE,
                initializer: NodeIndex::NONE,
            },
            11,
            12,
        );
        let list = arena.add_node(
            NodeData::VariableDeclarationList {
                declarations: NodeList::with_range(vec![decl], 11, 12),
            },
            6,
            12,
        );
        let stmt = arena.add_node_with(
            NodeData::VariableStatement { declaration_list: list },
            0,
            13,
            NodeFlags::NONE,
            ModifierFlags::EXPORT,
        );
        let sf = arena.add_node(
            NodeData::SourceFile(SourceFileData {
                file_name: "a.ts".into(),
                text: Arc::from("export var x;"),
                statements: NodeList::with_range(vec![stmt], 0, 13),
                is_declaration_file: false,
            }),
            0,
            13,
        );
        assert!(is_external_module(&arena, sf));
        assert!(is_declaration_name(&arena, name));
        assert_eq!(get_text_of_node(&arena, "export var x;", list), "var x");
    }
}
