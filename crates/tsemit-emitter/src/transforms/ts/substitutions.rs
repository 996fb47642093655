//! Print-time rewrites left behind by the TypeScript pass.
//!
//! - references to exported namespace members print as `N.x`
//! - references to a decorated class from inside its body print as the
//!   class alias (`C_1`)
//! - constant enum member accesses print as their value, `0 /* A */`

use crate::hooks::{EmitHint, EmitHook, HookContext};
use crate::resolver::{ConstantValue, EmitResolver, NodeCheckFlags, resolver_key};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use tsemit_ast::{EmitFlags, NodeArena, NodeData, NodeIndex, SyntaxKind};
use tsemit_common::EmitResult;
use tsemit_common::comments::CommentKind;

#[derive(Debug, Default)]
pub struct TypeScriptHook {
    remove_comments: bool,
    /// Namespace declarations that were turned into IIFEs.
    transformed_containers: FxHashSet<NodeIndex>,
    /// Decorated classes that refer to themselves, and their alias.
    class_aliases: FxHashMap<NodeIndex, NodeIndex>,
    /// How many transformed namespace bodies are being printed.
    container_depth: usize,
}

impl TypeScriptHook {
    pub fn new(remove_comments: bool) -> Self {
        TypeScriptHook {
            remove_comments,
            ..TypeScriptHook::default()
        }
    }

    pub fn add_transformed_container(&mut self, container: NodeIndex) {
        self.transformed_containers.insert(container);
    }

    pub fn add_class_alias(&mut self, class: NodeIndex, alias: NodeIndex) {
        self.class_aliases.insert(class, alias);
    }

    /// Identifiers only need looking at when a namespace or a class alias
    /// was produced.
    pub fn substitutes_identifiers(&self) -> bool {
        !self.transformed_containers.is_empty() || !self.class_aliases.is_empty()
    }

    fn is_transformed_container_statement(&self, arena: &NodeArena, node: NodeIndex) -> bool {
        arena.is_kind(node, SyntaxKind::ExpressionStatement)
            && arena.emit_flags(node).contains(EmitFlags::ADVISE_ON_EMIT_NODE)
            && self.transformed_containers.contains(&resolver_key(arena, node))
    }

    fn substitute_expression_identifier(
        &self,
        arena: &mut NodeArena,
        resolver: &dyn EmitResolver,
        node: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        if arena.is_generated_identifier(node)
            || arena
                .emit_flags(node)
                .intersects(EmitFlags::LOCAL_NAME | EmitFlags::EXPORT_NAME | EmitFlags::HELPER_NAME)
        {
            return Ok(node);
        }
        let key = resolver_key(arena, node);

        if !self.class_aliases.is_empty()
            && resolver
                .get_node_check_flags(key)
                .contains(NodeCheckFlags::CONSTRUCTOR_REFERENCE_IN_CLASS)
        {
            if let Some(alias) = resolver
                .get_referenced_value_declaration(key)
                .and_then(|declaration| self.class_aliases.get(&declaration))
            {
                let clone = arena.get_synthesized_clone(*alias)?;
                arena.set_text_range_from(clone, node);
                return Ok(clone);
            }
        }

        if self.container_depth > 0 {
            if let Some(container) = resolver.get_referenced_export_container(key) {
                if self.transformed_containers.contains(&container) {
                    return create_container_qualified_name(arena, container, node);
                }
            }
        }
        Ok(node)
    }

    /// `0 /* A */` for `E.A` when `E.A` is a compile-time constant.
    fn substitute_constant_value(
        &self,
        arena: &mut NodeArena,
        resolver: &dyn EmitResolver,
        node: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        let Some(value) = resolver.get_constant_value(resolver_key(arena, node)) else {
            return Ok(node);
        };
        let literal = match &value {
            ConstantValue::Number(n) if *n < 0.0 => {
                let positive = arena.create_number(-n);
                arena.create_prefix(SyntaxKind::MinusToken, positive)
            }
            ConstantValue::Number(n) => arena.create_number(*n),
            ConstantValue::String(text) => arena.create_string_literal(text),
        };
        if !self.remove_comments {
            if let Some(name) = accessed_property_text(arena, node) {
                let text = format!(" {} ", name.replace("*/", "*_/"));
                arena.add_synthetic_trailing_comment(literal, CommentKind::MultiLine, &text, false);
            }
        }
        trace!(?value, "inlining constant member access");
        Ok(literal)
    }
}

impl EmitHook for TypeScriptHook {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn substitute_node(&mut self, cx: &mut HookContext<'_>, hint: EmitHint, node: NodeIndex) -> EmitResult<NodeIndex> {
        let Some(kind) = cx.arena.kind(node) else {
            return Ok(node);
        };
        match kind {
            SyntaxKind::Identifier if hint == EmitHint::Expression => {
                self.substitute_expression_identifier(cx.arena, cx.resolver, node)
            }
            SyntaxKind::PropertyAccessExpression | SyntaxKind::ElementAccessExpression => {
                self.substitute_constant_value(cx.arena, cx.resolver, node)
            }
            SyntaxKind::ShorthandPropertyAssignment => self.substitute_shorthand_property(cx, node),
            _ => Ok(node),
        }
    }

    fn on_emit_node_enter(&mut self, cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        if self.is_transformed_container_statement(cx.arena, node) {
            self.container_depth += 1;
        }
        Ok(())
    }

    fn on_emit_node_exit(&mut self, cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        if self.is_transformed_container_statement(cx.arena, node) {
            self.container_depth = self.container_depth.saturating_sub(1);
        }
        Ok(())
    }
}

impl TypeScriptHook {
    /// `{ x }` for an exported namespace member `x` becomes `{ x: N.x }`.
    fn substitute_shorthand_property(&mut self, cx: &mut HookContext<'_>, node: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::ShorthandPropertyAssignment {
            name,
            object_assignment_initializer,
        } = cx.arena.data(node)?.clone()
        else {
            return Ok(node);
        };
        let value = self.substitute_expression_identifier(cx.arena, cx.resolver, name)?;
        if value == name {
            return Ok(node);
        }
        let value = if object_assignment_initializer.is_some() {
            cx.arena.create_assignment(value, object_assignment_initializer)
        } else {
            value
        };
        let key = cx.arena.get_synthesized_clone(name)?;
        let property = cx.arena.create_property_assignment(key, value);
        Ok(cx.arena.set_original_and_range(property, node))
    }
}

/// `N.x` for a reference `x` to a member exported from `container`.
fn create_container_qualified_name(arena: &mut NodeArena, container: NodeIndex, node: NodeIndex) -> EmitResult<NodeIndex> {
    let qualifier = arena.get_generated_name_for_node(container);
    let member = arena.get_synthesized_clone(node)?;
    arena.add_emit_flags(member, EmitFlags::NO_SUBSTITUTION);
    let access = arena.create_property_access(qualifier, member);
    arena.set_text_range_from(access, node);
    arena.add_emit_flags(access, EmitFlags::NO_SUBSTITUTION);
    Ok(access)
}

/// `A` for `E.A`, `"A"` for `E["A"]`.
fn accessed_property_text(arena: &NodeArena, node: NodeIndex) -> Option<String> {
    match arena.get(node).map(|n| &n.data)? {
        NodeData::PropertyAccessExpression { name, .. } => Some(arena.identifier_text(*name).to_string()),
        NodeData::ElementAccessExpression { argument, .. } => match arena.get(*argument).map(|n| &n.data)? {
            NodeData::StringLiteral { text, .. } => Some(format!("\"{text}\"")),
            NodeData::NumericLiteral { text } => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PrecomputedResolver;

    #[test]
    fn test_constant_access_becomes_literal_with_comment() {
        let mut arena = NodeArena::new();
        let e = arena.create_identifier("E");
        let access = arena.create_property_access_str(e, "A");
        let mut resolver = PrecomputedResolver::new();
        resolver.set_constant_value(access, ConstantValue::Number(2.0));
        let mut hook = TypeScriptHook::new(false);
        let mut cx = HookContext {
            arena: &mut arena,
            resolver: &resolver,
        };
        let out = hook.substitute_node(&mut cx, EmitHint::Expression, access).unwrap();
        assert!(matches!(arena.data(out).unwrap(), NodeData::NumericLiteral { text } if text == "2"));
        let comments = arena.synthetic_trailing_comments(out);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, " A ");
    }

    #[test]
    fn test_identifiers_outside_containers_are_left_alone() {
        let mut arena = NodeArena::new();
        let x = arena.create_identifier("x");
        let container = arena.create_identifier("N");
        let mut resolver = PrecomputedResolver::new();
        resolver.export_containers.insert(x, container);
        let mut hook = TypeScriptHook::new(false);
        hook.add_transformed_container(container);
        let mut cx = HookContext {
            arena: &mut arena,
            resolver: &resolver,
        };
        let out = hook.substitute_node(&mut cx, EmitHint::Expression, x).unwrap();
        assert_eq!(out, x);
    }
}
