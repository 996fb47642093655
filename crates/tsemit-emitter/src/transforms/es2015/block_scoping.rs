//! `let`/`const` to `var`, and `var` inside a moved loop body.

use super::Es2015Transformer;
use crate::hierarchy_facts::{HierarchyFacts, enter_subtree, exit_subtree};
use crate::resolver::NodeCheckFlags;
use crate::transforms::utilities::collect_binding_names;
use crate::transforms::visitor::{VisitResult, elided, single, visit_each_child, visit_node};
use tsemit_ast::utilities::is_binding_pattern;
use tsemit_ast::{ModifierFlags, NodeData, NodeFlags, NodeIndex, TextRange, TransformFlags};
use tsemit_common::EmitResult;

impl Es2015Transformer<'_, '_> {
    pub(super) fn visit_variable_statement(&mut self, node: NodeIndex, declaration_list: NodeIndex) -> EmitResult<VisitResult> {
        let include = if self.arena.has_modifier(node, ModifierFlags::EXPORT) {
            HierarchyFacts::EXPORTED_VARIABLE_STATEMENT
        } else {
            HierarchyFacts::NONE
        };
        let ancestor = enter_subtree(&mut self.hierarchy_facts, HierarchyFacts::NONE, include);
        let result = if self.converted_loop_state.is_some()
            && !self.arena.node_flags(declaration_list).intersects(NodeFlags::BLOCK_SCOPED)
        {
            self.hoist_variable_statement_out_of_converted_loop(node, declaration_list)
        } else {
            visit_each_child(self, node).map(single)
        };
        exit_subtree(&mut self.hierarchy_facts, ancestor, HierarchyFacts::NONE, HierarchyFacts::NONE);
        result
    }

    /// `var x = 1, { y } = o;` inside a moved loop body: the names are
    /// declared outside the body function and the initializers become
    /// assignments, so the values survive across iterations.
    fn hoist_variable_statement_out_of_converted_loop(
        &mut self,
        node: NodeIndex,
        declaration_list: NodeIndex,
    ) -> EmitResult<VisitResult> {
        let NodeData::VariableDeclarationList { declarations } = self.arena.data(declaration_list)?.clone() else {
            return Ok(single(node));
        };
        let mut assignments = Vec::new();
        for declaration in declarations.iter() {
            let NodeData::VariableDeclaration { name, initializer, .. } = self.arena.data(declaration)?.clone() else {
                continue;
            };
            let mut names = Vec::new();
            collect_binding_names(self.arena, name, &mut names);
            if let Some(state) = self.converted_loop_state.as_mut() {
                state.hoisted_local_variables.extend(names);
            }
            if initializer.is_none() {
                continue;
            }
            let assignment = if is_binding_pattern(self.arena, name) {
                self.flatten_destructuring_assignment(declaration, false)?
            } else {
                let value = visit_node(self, initializer)?;
                let assignment = self.arena.create_assignment(name, value);
                self.arena.set_text_range_from(assignment, declaration);
                assignment
            };
            assignments.push(assignment);
        }
        let Some(expression) = self.arena.inline_expressions(&assignments) else {
            return Ok(elided());
        };
        let statement = self.arena.create_expression_statement(expression);
        self.arena.set_text_range_from(statement, node);
        Ok(single(statement))
    }

    pub(super) fn visit_variable_declaration_list(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let flags = self.arena.node_flags(node);
        let transform_flags = self.arena.transform_flags(node);
        if !flags.intersects(NodeFlags::BLOCK_SCOPED) && !transform_flags.contains(TransformFlags::CONTAINS_BINDING_PATTERN) {
            return visit_each_child(self, node);
        }
        if flags.intersects(NodeFlags::BLOCK_SCOPED) {
            self.hook.enable_block_scoped_bindings();
        }
        let NodeData::VariableDeclarationList { declarations } = self.arena.data(node)?.clone() else {
            return Ok(node);
        };

        let mut visited = Vec::with_capacity(declarations.len());
        for declaration in declarations.iter() {
            if flags.contains(NodeFlags::LET) {
                visited.extend(self.visit_variable_declaration_in_let_list(declaration)?);
            } else {
                visited.extend(self.visit_variable_declaration(declaration)?);
            }
        }

        let pattern_at_edge = [declarations.first(), declarations.last()].into_iter().flatten().any(|d| {
            let name = self.arena.declaration_name_node(d);
            is_binding_pattern(self.arena, name)
        });
        let source_map_range = match (visited.first(), visited.last()) {
            (Some(&first), Some(&last)) if pattern_at_edge => {
                Some(TextRange::new(self.arena.range(first).pos, self.arena.range(last).end))
            }
            _ => None,
        };

        let list = self.arena.create_variable_declaration_list(visited, NodeFlags::NONE);
        let list = self.arena.set_original_and_range(list, node);
        let comment_range = self.arena.range(node);
        self.arena.set_comment_range(list, comment_range);
        if let Some(range) = source_map_range {
            self.arena.set_source_map_range(list, range);
        }
        Ok(list)
    }

    pub(super) fn visit_variable_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let ancestor = enter_subtree(
            &mut self.hierarchy_facts,
            HierarchyFacts::EXPORTED_VARIABLE_STATEMENT,
            HierarchyFacts::NONE,
        );
        let name = self.arena.declaration_name_node(node);
        let result = if is_binding_pattern(self.arena, name) {
            let hoist_temps = ancestor.contains(HierarchyFacts::EXPORTED_VARIABLE_STATEMENT);
            self.flatten_destructuring_binding(node, NodeIndex::NONE, hoist_temps)
                .map(|declarations| declarations.into_iter().collect())
        } else {
            visit_each_child(self, node).map(single)
        };
        exit_subtree(&mut self.hierarchy_facts, ancestor, HierarchyFacts::NONE, HierarchyFacts::NONE);
        result
    }

    /// A `let` without initializer gets `= void 0` where turning it into a
    /// `var` would otherwise let it keep the previous iteration's value.
    fn visit_variable_declaration_in_let_list(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let NodeData::VariableDeclaration {
            name,
            exclamation,
            type_node,
            initializer,
        } = self.arena.data(node)?.clone()
        else {
            return Ok(single(node));
        };
        if is_binding_pattern(self.arena, name) {
            return self.visit_variable_declaration(node);
        }
        if initializer.is_none() && self.should_emit_explicit_initializer_for_let_declaration(node) {
            let void_zero = self.arena.create_void_zero();
            let clone = self.arena.create_node(NodeData::VariableDeclaration {
                name,
                exclamation,
                type_node,
                initializer: void_zero,
            });
            return Ok(single(self.arena.set_original_and_range(clone, node)));
        }
        Ok(single(visit_each_child(self, node)?))
    }

    fn should_emit_explicit_initializer_for_let_declaration(&self, node: NodeIndex) -> bool {
        let resolver = self.context.resolver;
        let key = self.key(node);
        let flags = resolver.get_node_check_flags(key);
        let captured_in_function = flags.contains(NodeCheckFlags::CAPTURED_BLOCK_SCOPED_BINDING);
        let declared_in_loop = flags.contains(NodeCheckFlags::BLOCK_SCOPED_BINDING_IN_LOOP);
        let facts = self.hierarchy_facts;

        let emitted_as_top_level = facts.contains(HierarchyFacts::TOP_LEVEL)
            || (captured_in_function && declared_in_loop && facts.contains(HierarchyFacts::ITERATION_STATEMENT_BLOCK));
        !emitted_as_top_level
            && !facts.contains(HierarchyFacts::FOR_IN_OR_FOR_OF_STATEMENT)
            && (!resolver.is_declaration_with_colliding_name(key)
                || (declared_in_loop
                    && !captured_in_function
                    && !facts.intersects(HierarchyFacts::FOR_STATEMENT | HierarchyFacts::FOR_IN_OR_FOR_OF_STATEMENT)))
    }
}
