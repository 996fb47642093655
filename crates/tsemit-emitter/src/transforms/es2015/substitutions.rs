//! Print-time rewrites left behind by the ES2015 pass.
//!
//! - `this` inside a function marked `CAPTURES_THIS` prints as `_this`
//! - a block-scoped declaration whose name collides once it becomes a `var`
//!   prints under a generated name, and so do references to it

use crate::hooks::{EmitHint, EmitHook, HookContext};
use crate::resolver::resolver_key;
use tracing::trace;
use tsemit_ast::{EmitFlags, NodeArena, NodeData, NodeIndex, SyntaxKind};
use tsemit_common::EmitResult;

#[derive(Debug, Default)]
pub struct Es2015Hook {
    captured_this: bool,
    block_scoped_bindings: bool,
    /// One entry per function-like node being printed: does it capture `this`.
    this_stack: Vec<bool>,
}

impl Es2015Hook {
    pub fn enable_captured_this(&mut self) {
        self.captured_this = true;
    }

    pub fn enable_block_scoped_bindings(&mut self) {
        self.block_scoped_bindings = true;
    }

    pub fn substitutes_this(&self) -> bool {
        self.captured_this
    }

    pub fn substitutes_block_scoped_bindings(&self) -> bool {
        self.block_scoped_bindings
    }

    fn in_function_capturing_this(&self) -> bool {
        self.this_stack.last().copied().unwrap_or(false)
    }

    fn substitute_this(&self, arena: &mut NodeArena, node: NodeIndex) -> NodeIndex {
        if !self.captured_this
            || arena.emit_flags(node).contains(EmitFlags::NO_SUBSTITUTION)
            || !self.in_function_capturing_this()
        {
            return node;
        }
        let name = arena.create_file_level_unique_name("_this");
        arena.set_text_range_from(name, node);
        name
    }

    fn substitute_identifier(&self, cx: &mut HookContext<'_>, hint: EmitHint, node: NodeIndex) -> NodeIndex {
        let arena = &mut *cx.arena;
        if !self.block_scoped_bindings
            || arena.is_generated_identifier(node)
            || arena.emit_flags(node).intersects(
                EmitFlags::HELPER_NAME | EmitFlags::LOCAL_NAME | EmitFlags::EXPORT_NAME | EmitFlags::NO_SUBSTITUTION,
            )
        {
            return node;
        }

        let original = arena.get_parse_tree_node(node);
        if original.is_some() {
            let parent = arena.parent(original);
            if is_renamable_declaration(arena, parent)
                && arena.declaration_name_node(parent) == original
                && cx.resolver.is_declaration_with_colliding_name(resolver_key(arena, parent))
            {
                trace!(name = arena.identifier_text(original), "renaming colliding declaration");
                let renamed = arena.get_generated_name_for_node(original);
                arena.set_text_range_from(renamed, node);
                return renamed;
            }
        }

        if hint != EmitHint::Expression {
            return node;
        }
        let Some(declaration) = cx
            .resolver
            .get_referenced_declaration_with_colliding_name(resolver_key(arena, node))
        else {
            return node;
        };
        let name = arena.declaration_name_node(declaration);
        if name.is_none() {
            return node;
        }
        let renamed = arena.get_generated_name_for_node(name);
        arena.set_text_range_from(renamed, node);
        renamed
    }
}

/// Declarations that keep a block scope only through renaming.
fn is_renamable_declaration(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(node),
        Some(
            SyntaxKind::VariableDeclaration
                | SyntaxKind::BindingElement
                | SyntaxKind::ClassDeclaration
                | SyntaxKind::EnumDeclaration
        )
    )
}

impl EmitHook for Es2015Hook {
    fn name(&self) -> &'static str {
        "es2015"
    }

    fn substitute_node(&mut self, cx: &mut HookContext<'_>, hint: EmitHint, node: NodeIndex) -> EmitResult<NodeIndex> {
        Ok(match cx.arena.get(node).map(|n| &n.data) {
            Some(NodeData::ThisKeyword) if hint == EmitHint::Expression => self.substitute_this(cx.arena, node),
            Some(NodeData::Identifier(_)) => self.substitute_identifier(cx, hint, node),
            _ => node,
        })
    }

    fn on_emit_node_enter(&mut self, cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        if cx.arena.kind(node).is_some_and(|kind| kind.is_function_like()) {
            let captures = cx.arena.emit_flags(node).contains(EmitFlags::CAPTURES_THIS);
            self.this_stack.push(captures);
        }
        Ok(())
    }

    fn on_emit_node_exit(&mut self, cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        if cx.arena.kind(node).is_some_and(|kind| kind.is_function_like()) {
            self.this_stack.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PrecomputedResolver;
    use tsemit_ast::GeneratedIdentifierKind;

    fn arrow_capturing_this(arena: &mut NodeArena) -> NodeIndex {
        let body = arena.create_block(Vec::new(), false);
        let function = arena.create_function_expression(NodeIndex::NONE, Vec::new(), body);
        arena.add_emit_flags(function, EmitFlags::CAPTURES_THIS);
        function
    }

    #[test]
    fn test_this_inside_capturing_function_prints_as_captured_name() {
        let mut arena = NodeArena::new();
        let function = arrow_capturing_this(&mut arena);
        let this = arena.create_this();
        let resolver = PrecomputedResolver::new();
        let mut hook = Es2015Hook::default();
        hook.enable_captured_this();
        let mut cx = HookContext {
            arena: &mut arena,
            resolver: &resolver,
        };

        hook.on_emit_node_enter(&mut cx, EmitHint::Expression, function).unwrap();
        let inside = hook.substitute_node(&mut cx, EmitHint::Expression, this).unwrap();
        hook.on_emit_node_exit(&mut cx, EmitHint::Expression, function).unwrap();
        let outside = hook.substitute_node(&mut cx, EmitHint::Expression, this).unwrap();

        assert_ne!(inside, this);
        assert_eq!(arena.identifier_text(inside), "_this");
        assert_eq!(outside, this);
    }

    #[test]
    fn test_actual_this_is_never_substituted() {
        let mut arena = NodeArena::new();
        let function = arrow_capturing_this(&mut arena);
        let this = arena.create_this();
        arena.add_emit_flags(this, EmitFlags::NO_SUBSTITUTION);
        let resolver = PrecomputedResolver::new();
        let mut hook = Es2015Hook::default();
        hook.enable_captured_this();
        let mut cx = HookContext {
            arena: &mut arena,
            resolver: &resolver,
        };
        hook.on_emit_node_enter(&mut cx, EmitHint::Expression, function).unwrap();
        assert_eq!(hook.substitute_node(&mut cx, EmitHint::Expression, this).unwrap(), this);
    }

    #[test]
    fn test_reference_to_colliding_declaration_gets_generated_name() {
        let mut arena = NodeArena::new();
        let declared = arena.create_identifier("x");
        let declaration = arena.create_variable_declaration(declared, NodeIndex::NONE);
        let reference = arena.create_identifier("x");
        let mut resolver = PrecomputedResolver::new();
        resolver.colliding_references.insert(reference, declaration);
        let mut hook = Es2015Hook::default();
        hook.enable_block_scoped_bindings();
        let mut cx = HookContext {
            arena: &mut arena,
            resolver: &resolver,
        };

        let out = hook.substitute_node(&mut cx, EmitHint::Expression, reference).unwrap();
        let generated = arena.identifier(out).and_then(|id| id.auto_generate).unwrap();
        assert_eq!(generated.kind, GeneratedIdentifierKind::Node);
        assert_eq!(generated.node, declared);
    }
}
