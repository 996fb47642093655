//! `for..of` lowering.
//!
//! Without `downlevelIteration` the loop indexes the value as an array:
//!
//! ```text
//! for (var _i = 0, xs_1 = xs; _i < xs_1.length; _i++) { var x = xs_1[_i]; }
//! ```
//!
//! With it the value is walked through its iterator (`__values`), and the
//! iterator is closed in a `finally` when the loop exits early.

use super::Es2015Transformer;
use crate::helpers::{VALUES_HELPER, create_helper_name};
use crate::hierarchy_facts::HierarchyFacts;
use crate::transforms::visitor::{statements_of, update_statements, visit_node, visit_statement};
use tracing::trace;
use tsemit_ast::utilities::is_binding_pattern;
use tsemit_ast::{EmitFlags, ModifierFlags, NodeData, NodeFlags, NodeIndex, SyntaxKind, TextRange};
use tsemit_common::EmitResult;

impl Es2015Transformer<'_, '_> {
    /// Lower a `for..of`, with `converted_body` standing in for the body when
    /// it was moved into a per-iteration function.
    pub(super) fn convert_for_of_statement(
        &mut self,
        node: NodeIndex,
        outermost_label: NodeIndex,
        converted_body: Option<Vec<NodeIndex>>,
        ancestor_facts: HierarchyFacts,
    ) -> EmitResult<NodeIndex> {
        if self.context.options.downlevel_iteration {
            self.convert_for_of_statement_for_iterable(node, outermost_label, converted_body, ancestor_facts)
        } else {
            self.convert_for_of_statement_for_array(node, outermost_label, converted_body)
        }
    }

    fn for_of_expression(&self, node: NodeIndex) -> EmitResult<NodeIndex> {
        match self.arena.data(node)? {
            NodeData::ForOfStatement { expression, .. } => Ok(*expression),
            _ => Err(tsemit_common::EmitError::internal("for..of conversion reached a non-for..of node")),
        }
    }

    fn convert_for_of_statement_for_array(
        &mut self,
        node: NodeIndex,
        outermost_label: NodeIndex,
        converted_body: Option<Vec<NodeIndex>>,
    ) -> EmitResult<NodeIndex> {
        let original_expression = self.for_of_expression(node)?;
        let expression = visit_node(self, original_expression)?;
        let counter = self.arena.create_loop_variable();
        let rhs_reference = if self.arena.is_kind(expression, SyntaxKind::Identifier) {
            self.arena.get_generated_name_for_node(expression)
        } else {
            self.arena.create_temp_variable()
        };
        self.arena.add_emit_flags(expression, EmitFlags::NO_SOURCE_MAP);
        let expression_range = self.arena.range(original_expression);

        let zero = self.arena.create_numeric_literal("0");
        let counter_declaration = self.arena.create_variable_declaration(counter, zero);
        self.arena
            .set_text_range(counter_declaration, expression_range.pos.saturating_sub(1), expression_range.end);
        let rhs_declaration = self.arena.create_variable_declaration(rhs_reference, expression);
        self.arena.set_text_range_from(rhs_declaration, original_expression);
        let list = self
            .arena
            .create_variable_declaration_list(vec![counter_declaration, rhs_declaration], NodeFlags::NONE);
        self.arena.set_text_range_from(list, original_expression);
        self.arena.add_emit_flags(list, EmitFlags::NO_HOISTING);

        let length = self.arena.create_property_access_str(rhs_reference, "length");
        let condition = self.arena.create_less_than(counter, length);
        self.arena.set_text_range_from(condition, original_expression);
        let incrementor = self.arena.create_postfix(counter, SyntaxKind::PlusPlusToken);
        self.arena.set_text_range_from(incrementor, original_expression);

        let bound_value = self.arena.create_element_access(rhs_reference, counter);
        let body = self.convert_for_of_statement_head(node, bound_value, converted_body)?;
        let for_statement = self.arena.create_for(list, condition, incrementor, body);
        self.arena.set_text_range_from(for_statement, node);
        self.restore_enclosing_label(for_statement, outermost_label)
    }

    fn convert_for_of_statement_for_iterable(
        &mut self,
        node: NodeIndex,
        outermost_label: NodeIndex,
        converted_body: Option<Vec<NodeIndex>>,
        ancestor_facts: HierarchyFacts,
    ) -> EmitResult<NodeIndex> {
        let original_expression = self.for_of_expression(node)?;
        let expression = visit_node(self, original_expression)?;
        let named_after_expression = self.arena.is_kind(expression, SyntaxKind::Identifier);
        let iterator = if named_after_expression {
            self.arena.get_generated_name_for_node(expression)
        } else {
            self.arena.create_temp_variable()
        };
        let result = if named_after_expression {
            self.arena.get_generated_name_for_node(iterator)
        } else {
            self.arena.create_temp_variable()
        };
        let error_record = self.arena.create_unique_name("e");
        let catch_variable = self.arena.get_generated_name_for_node(error_record);
        let return_method = self.arena.create_temp_variable();
        trace!("lowering for..of through the iterator protocol");

        self.context.request_emit_helper(&VALUES_HELPER);
        let helper = create_helper_name(self.arena, "__values");
        let values = self.arena.create_call(helper, vec![expression]);
        self.arena.set_text_range_from(values, original_expression);
        let next_callee = self.arena.create_property_access_str(iterator, "next");
        let next = self.arena.create_call(next_callee, Vec::new());
        self.hoist_variable(error_record)?;
        self.hoist_variable(return_method)?;

        // Inside another loop the error record is reset on every entry.
        let initializer = if ancestor_facts.contains(HierarchyFacts::ITERATION_CONTAINER) {
            let void_zero = self.arena.create_void_zero();
            let reset = self.arena.create_assignment(error_record, void_zero);
            self.arena.create_comma(reset, values)
        } else {
            values
        };

        let iterator_declaration = self.arena.create_variable_declaration(iterator, initializer);
        self.arena.set_text_range_from(iterator_declaration, original_expression);
        let result_declaration = self.arena.create_variable_declaration(result, next);
        let list = self
            .arena
            .create_variable_declaration_list(vec![iterator_declaration, result_declaration], NodeFlags::NONE);
        self.arena.set_text_range_from(list, original_expression);
        self.arena.add_emit_flags(list, EmitFlags::NO_HOISTING);

        let done = self.arena.create_property_access_str(result, "done");
        let condition = self.arena.create_logical_not(done);
        let next_again = self.arena.create_call(next_callee, Vec::new());
        let incrementor = self.arena.create_assignment(result, next_again);
        let bound_value = self.arena.create_property_access_str(result, "value");
        let body = self.convert_for_of_statement_head(node, bound_value, converted_body)?;
        let for_statement = self.arena.create_for(list, condition, incrementor, body);
        self.arena.set_text_range_from(for_statement, node);
        let labeled = self.restore_enclosing_label(for_statement, outermost_label)?;
        let try_block = self.arena.create_block(vec![labeled], true);

        // catch (e_1_1) { e_1 = { error: e_1_1 }; }
        let error_property = self.arena.create_property_assignment_str("error", catch_variable);
        let error_object = self.arena.create_object_literal(vec![error_property], false);
        let record = self.arena.create_assignment(error_record, error_object);
        let record = self.arena.create_expression_statement(record);
        let catch_block = self.arena.create_block(vec![record], true);
        self.arena.add_emit_flags(catch_block, EmitFlags::SINGLE_LINE);
        let catch_clause = self.arena.create_catch_clause(catch_variable, catch_block);

        // if (r && !r.done && (_a = it.return)) _a.call(it);
        let done = self.arena.create_property_access_str(result, "done");
        let not_done = self.arena.create_logical_not(done);
        let unfinished = self.arena.create_logical_and(result, not_done);
        let return_access = self.arena.create_property_access_str(iterator, "return");
        let has_return = self.arena.create_assignment(return_method, return_access);
        let close_condition = self.arena.create_logical_and(unfinished, has_return);
        let close_call = self.arena.create_function_call(return_method, iterator, Vec::new());
        let close_call = self.arena.create_expression_statement(close_call);
        let close = self.arena.create_if(close_condition, close_call, NodeIndex::NONE);
        self.arena.add_emit_flags(close, EmitFlags::SINGLE_LINE);
        let inner_try_block = self.arena.create_block(vec![close], true);

        // finally { if (e_1) throw e_1.error; }
        let error = self.arena.create_property_access_str(error_record, "error");
        let rethrow = self.arena.create_throw(error);
        let rethrow = self.arena.create_if(error_record, rethrow, NodeIndex::NONE);
        self.arena.add_emit_flags(rethrow, EmitFlags::SINGLE_LINE);
        let inner_finally = self.arena.create_block(vec![rethrow], true);
        self.arena.add_emit_flags(inner_finally, EmitFlags::SINGLE_LINE);

        let inner_try = self.arena.create_try(inner_try_block, NodeIndex::NONE, inner_finally);
        let finally_block = self.arena.create_block(vec![inner_try], true);
        Ok(self.arena.create_try(try_block, catch_clause, finally_block))
    }

    /// The loop body: the binding of the current value, then the original
    /// (or converted) body statements.
    fn convert_for_of_statement_head(
        &mut self,
        node: NodeIndex,
        bound_value: NodeIndex,
        converted_body: Option<Vec<NodeIndex>>,
    ) -> EmitResult<NodeIndex> {
        let NodeData::ForOfStatement {
            initializer, statement, ..
        } = self.arena.data(node)?.clone()
        else {
            return Ok(node);
        };
        let mut statements = Vec::new();

        if self.arena.is_kind(initializer, SyntaxKind::VariableDeclarationList) {
            if self.arena.node_flags(initializer).intersects(NodeFlags::BLOCK_SCOPED) {
                self.hook.enable_block_scoped_bindings();
            }
            let first = match self.arena.data(initializer)? {
                NodeData::VariableDeclarationList { declarations } => declarations.first(),
                _ => None,
            };
            let first_name = first.map(|declaration| self.arena.declaration_name_node(declaration));
            match (first, first_name) {
                (Some(declaration), Some(name)) if is_binding_pattern(self.arena, name) => {
                    let declarations = self.flatten_destructuring_binding(declaration, bound_value, false)?;
                    let range = match (declarations.first(), declarations.last()) {
                        (Some(&first), Some(&last)) => {
                            TextRange::new(self.arena.range(first).pos, self.arena.range(last).end)
                        }
                        _ => TextRange::NONE,
                    };
                    let list = self.arena.create_variable_declaration_list(declarations, NodeFlags::NONE);
                    self.arena.set_text_range_from(list, initializer);
                    self.arena.set_original(list, initializer);
                    self.arena.set_source_map_range(list, range);
                    statements.push(self.arena.create_variable_statement_from_list(list, ModifierFlags::NONE));
                }
                _ => {
                    let name = match first_name {
                        Some(name) => name,
                        None => self.arena.create_temp_variable(),
                    };
                    let declaration = self.arena.create_variable_declaration(name, bound_value);
                    let list = self.arena.create_variable_declaration_list(vec![declaration], NodeFlags::NONE);
                    let range = self.arena.range(initializer);
                    self.arena.set_text_range(list, range.pos.saturating_sub(1), range.end);
                    self.arena.set_original(list, initializer);
                    let variable = self.arena.create_variable_statement_from_list(list, ModifierFlags::NONE);
                    self.arena.set_text_range(variable, range.pos, range.end.saturating_sub(1));
                    statements.push(variable);
                }
            }
        } else {
            let destructuring = matches!(
                self.arena.kind(initializer),
                Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::ArrayLiteralExpression)
            );
            let expression = if destructuring {
                let assignment = self.arena.create_assignment(initializer, bound_value);
                self.visit_binary_expression(assignment, true)?
            } else {
                let target = visit_node(self, initializer)?;
                let assignment = self.arena.create_assignment(target, bound_value);
                let range = self.arena.range(initializer);
                self.arena.set_text_range(assignment, range.pos, range.end);
                assignment
            };
            let statement = self.arena.create_expression_statement(expression);
            let range = self.arena.range(initializer);
            self.arena.set_text_range(statement, range.pos, range.end.saturating_sub(1));
            statements.push(statement);
        }

        if let Some(converted) = converted_body {
            statements.extend(converted);
            return Ok(self.create_synthetic_block_for_converted_statements(statements));
        }
        let visited = visit_statement(self, statement)?;
        if self.arena.is_kind(visited, SyntaxKind::Block) {
            statements.extend(statements_of(self.arena, visited)?.nodes);
            update_statements(self.arena, visited, statements)
        } else {
            statements.push(visited);
            Ok(self.create_synthetic_block_for_converted_statements(statements))
        }
    }

    fn create_synthetic_block_for_converted_statements(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        let block = self.arena.create_block(statements, true);
        self.arena.add_emit_flags(block, EmitFlags::NO_SOURCE_MAP);
        block
    }
}
