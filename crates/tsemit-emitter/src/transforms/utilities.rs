//! Small tree helpers shared by both passes.

use tsemit_ast::{EmitFlags, FunctionData, ModifierFlags, NodeArena, NodeData, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::{EmitError, EmitResult};

/// Modifiers that survive into JavaScript.
pub fn strip_typescript_modifiers(modifiers: ModifierFlags) -> ModifierFlags {
    modifiers - ModifierFlags::TYPESCRIPT_MODIFIER
}

pub fn is_static(arena: &NodeArena, node: NodeIndex) -> bool {
    arena.has_modifier(node, ModifierFlags::STATIC)
}

/// Every identifier a binding name declares, in source order.
pub fn collect_binding_names(arena: &NodeArena, name: NodeIndex, out: &mut Vec<NodeIndex>) {
    match arena.get(name).map(|n| &n.data) {
        Some(NodeData::Identifier(_)) => out.push(name),
        Some(NodeData::ObjectBindingPattern { elements } | NodeData::ArrayBindingPattern { elements }) => {
            for element in elements.iter() {
                if let Some(NodeData::BindingElement { name, .. }) = arena.get(element).map(|n| &n.data) {
                    collect_binding_names(arena, *name, out);
                }
            }
        }
        _ => {}
    }
}

/// Fresh reference to an identifier: same text, no comments or source map
/// of its own, no substitution.
pub fn create_reference_clone(arena: &mut NodeArena, name: NodeIndex) -> EmitResult<NodeIndex> {
    let clone = arena.get_synthesized_clone(name)?;
    arena.add_emit_flags(clone, EmitFlags::NO_COMMENTS | EmitFlags::NO_SOURCE_MAP);
    Ok(clone)
}

/// Turn a binding pattern into the equivalent assignment pattern, with
/// each bound identifier replaced by `target(name)`.
///
/// `{ a, b: [c] }` with `target = N.x` becomes `{ a: N.a, b: [N.c] }`.
pub fn binding_pattern_to_assignment_pattern(
    arena: &mut NodeArena,
    pattern: NodeIndex,
    target: &mut dyn FnMut(&mut NodeArena, NodeIndex) -> EmitResult<NodeIndex>,
) -> EmitResult<NodeIndex> {
    match arena.data(pattern)?.clone() {
        NodeData::Identifier(_) => target(arena, pattern),
        NodeData::ObjectBindingPattern { elements } => {
            let mut properties = Vec::with_capacity(elements.len());
            for element in elements.iter() {
                let NodeData::BindingElement {
                    dot_dot_dot,
                    property_name,
                    name,
                    initializer,
                } = arena.data(element)?.clone()
                else {
                    continue;
                };
                let value = binding_element_target(arena, name, initializer, target)?;
                let property = if dot_dot_dot {
                    arena.create_node(NodeData::SpreadAssignment { expression: value })
                } else {
                    let key = if property_name.is_some() {
                        arena.get_synthesized_clone(property_name)?
                    } else {
                        arena.get_synthesized_clone(name)?
                    };
                    arena.create_property_assignment(key, value)
                };
                properties.push(arena.set_original_and_range(property, element));
            }
            Ok(arena.create_object_literal(properties, false))
        }
        NodeData::ArrayBindingPattern { elements } => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements.iter() {
                let item = match arena.data(element)?.clone() {
                    NodeData::BindingElement {
                        dot_dot_dot,
                        name,
                        initializer,
                        ..
                    } => {
                        let value = binding_element_target(arena, name, initializer, target)?;
                        if dot_dot_dot { arena.create_spread(value) } else { value }
                    }
                    _ => arena.create_omitted_expression(),
                };
                items.push(item);
            }
            Ok(arena.create_array_literal(items, false))
        }
        _ => Ok(pattern),
    }
}

fn binding_element_target(
    arena: &mut NodeArena,
    name: NodeIndex,
    initializer: NodeIndex,
    target: &mut dyn FnMut(&mut NodeArena, NodeIndex) -> EmitResult<NodeIndex>,
) -> EmitResult<NodeIndex> {
    let value = binding_pattern_to_assignment_pattern(arena, name, target)?;
    if initializer.is_some() {
        Ok(arena.create_assignment(value, initializer))
    } else {
        Ok(value)
    }
}

/// Statements of a block body; empty for a concise or missing body.
pub fn function_body_statements(arena: &NodeArena, body: NodeIndex) -> NodeList {
    match arena.get(body).map(|n| &n.data) {
        Some(NodeData::Block { statements, .. }) => statements.clone(),
        _ => NodeList::default(),
    }
}

/// `true` for `this` parameters (`function f(this: Foo)`).
pub fn is_this_parameter(arena: &NodeArena, parameter: NodeIndex) -> bool {
    match arena.get(parameter).map(|n| &n.data) {
        Some(NodeData::Parameter { name, .. }) => {
            arena.is_kind(*name, SyntaxKind::Identifier) && arena.identifier_text(*name) == "this"
        }
        _ => false,
    }
}

/// Rewrap a function payload in the node kind it came from.
pub fn function_data_of_kind(kind: SyntaxKind, f: FunctionData) -> EmitResult<NodeData> {
    Ok(match kind {
        SyntaxKind::FunctionDeclaration => NodeData::FunctionDeclaration(f),
        SyntaxKind::FunctionExpression => NodeData::FunctionExpression(f),
        SyntaxKind::ArrowFunction => NodeData::ArrowFunction(f),
        SyntaxKind::MethodDeclaration => NodeData::MethodDeclaration(f),
        SyntaxKind::Constructor => NodeData::Constructor(f),
        SyntaxKind::GetAccessor => NodeData::GetAccessor(f),
        SyntaxKind::SetAccessor => NodeData::SetAccessor(f),
        other => return Err(EmitError::internal(format!("{other:?} does not carry a function body"))),
    })
}

pub fn is_statement_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Block
            | SyntaxKind::EmptyStatement
            | SyntaxKind::VariableStatement
            | SyntaxKind::ExpressionStatement
            | SyntaxKind::IfStatement
            | SyntaxKind::DoStatement
            | SyntaxKind::WhileStatement
            | SyntaxKind::ForStatement
            | SyntaxKind::ForInStatement
            | SyntaxKind::ForOfStatement
            | SyntaxKind::ContinueStatement
            | SyntaxKind::BreakStatement
            | SyntaxKind::ReturnStatement
            | SyntaxKind::SwitchStatement
            | SyntaxKind::LabeledStatement
            | SyntaxKind::ThrowStatement
            | SyntaxKind::TryStatement
            | SyntaxKind::DebuggerStatement
            | SyntaxKind::FunctionDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::TypeAliasDeclaration
            | SyntaxKind::EnumDeclaration
            | SyntaxKind::ModuleDeclaration
            | SyntaxKind::ImportEqualsDeclaration
            | SyntaxKind::ImportDeclaration
            | SyntaxKind::ExportAssignment
            | SyntaxKind::ExportDeclaration
            | SyntaxKind::NotEmittedStatement
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(arena: &mut NodeArena, property: Option<&str>, name: NodeIndex) -> NodeIndex {
        let property_name = match property {
            Some(text) => arena.create_identifier(text),
            None => NodeIndex::NONE,
        };
        arena.create_node(NodeData::BindingElement {
            dot_dot_dot: false,
            property_name,
            name,
            initializer: NodeIndex::NONE,
        })
    }

    #[test]
    fn test_collect_binding_names_is_source_ordered() {
        let mut arena = NodeArena::new();
        let a = arena.create_identifier("a");
        let c = arena.create_identifier("c");
        let d = arena.create_identifier("d");
        let ec = binding(&mut arena, None, c);
        let ed = binding(&mut arena, None, d);
        let inner = arena.create_node(NodeData::ArrayBindingPattern {
            elements: NodeList::new(vec![ec, ed]),
        });
        let ea = binding(&mut arena, None, a);
        let eb = binding(&mut arena, Some("b"), inner);
        let pattern = arena.create_node(NodeData::ObjectBindingPattern {
            elements: NodeList::new(vec![ea, eb]),
        });
        let mut names = Vec::new();
        collect_binding_names(&arena, pattern, &mut names);
        assert_eq!(names, vec![a, c, d]);
    }

    #[test]
    fn test_strip_typescript_modifiers_keeps_export_and_static() {
        let modifiers = ModifierFlags::EXPORT | ModifierFlags::STATIC | ModifierFlags::PRIVATE | ModifierFlags::READONLY;
        assert_eq!(
            strip_typescript_modifiers(modifiers),
            ModifierFlags::EXPORT | ModifierFlags::STATIC
        );
    }
}
