//! Spread arguments and elements, and calls through `super`.
//!
//! ```text
//! f(...xs)           f.apply(void 0, xs)
//! o.m(a, ...xs)      o.m.apply(o, [a].concat(xs))
//! new C(...xs)       new (C.bind.apply(C, [void 0].concat(xs)))()
//! super.m(x)         _super.prototype.m.call(this, x)
//! ```

use super::Es2015Transformer;
use crate::helpers::{SPREAD_HELPER, create_helper_name};
use crate::transforms::visitor::{visit_each_child, visit_node, visit_nodes};
use tracing::trace;
use tsemit_ast::{EmitFlags, NodeArena, NodeData, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::EmitResult;

/// `target` is what gets `.call`/`.apply`; `this_arg` is its receiver.
struct CallBinding {
    target: NodeIndex,
    this_arg: NodeIndex,
}

impl Es2015Transformer<'_, '_> {
    pub(super) fn visit_call_expression(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::CallExpression {
            expression, arguments, ..
        } = self.arena.data(node)?.clone()
        else {
            return Ok(node);
        };
        if needs_call_binding(self.arena, expression, &arguments) {
            return self.visit_call_with_captured_this_assignment(node, true);
        }
        let callee = self.visit_callee(expression)?;
        let arguments = visit_nodes(self, &arguments.nodes)?;
        let NodeData::CallExpression {
            type_arguments,
            arguments: old_arguments,
            ..
        } = self.arena.data(node)?.clone()
        else {
            return Ok(node);
        };
        Ok(self.arena.update_node(
            node,
            NodeData::CallExpression {
                expression: callee,
                type_arguments,
                arguments: old_arguments.with_nodes(arguments),
            },
        ))
    }

    /// A bare `super` as a callee is the base constructor itself.
    fn visit_callee(&mut self, expression: NodeIndex) -> EmitResult<NodeIndex> {
        if self.arena.is_kind(expression, SyntaxKind::SuperKeyword) {
            Ok(self.visit_super_keyword(true))
        } else {
            visit_node(self, expression)
        }
    }

    /// Calls that need an explicit receiver: spread arguments, `super(...)`
    /// and `super.m(...)`. A `super(...)` call also yields `this` when the
    /// base constructor returns nothing, and is assigned to `_this` when
    /// `assign_to_captured_this` is set.
    pub(super) fn visit_call_with_captured_this_assignment(
        &mut self,
        node: NodeIndex,
        assign_to_captured_this: bool,
    ) -> EmitResult<NodeIndex> {
        let NodeData::CallExpression {
            expression, arguments, ..
        } = self.arena.data(node)?.clone()
        else {
            return visit_each_child(self, node);
        };
        if !needs_call_binding(self.arena, expression, &arguments) {
            return visit_each_child(self, node);
        }

        let is_super_call = self.arena.is_kind(expression, SyntaxKind::SuperKeyword);
        let binding = self.create_call_binding(expression)?;
        let target = self.visit_callee(binding.target)?;
        let this_arg = if is_super_call {
            self.arena.add_emit_flags(binding.this_arg, EmitFlags::NO_SUBSTITUTION);
            binding.this_arg
        } else {
            visit_node(self, binding.this_arg)?
        };

        let mut call = if has_spread(self.arena, &arguments) {
            let spread = self.transform_and_spread_elements(&arguments, false, false)?;
            self.arena.create_function_apply(target, this_arg, spread)
        } else {
            let arguments = visit_nodes(self, &arguments.nodes)?;
            let call = self.arena.create_function_call(target, this_arg, arguments);
            self.arena.set_text_range_from(call, node);
            call
        };

        if is_super_call {
            let this = self.create_actual_this();
            let initializer = self.arena.create_logical_or(call, this);
            call = if assign_to_captured_this {
                let captured = self.create_captured_this_name();
                self.arena.create_assignment(captured, initializer)
            } else {
                initializer
            };
        }
        self.arena.set_original(call, node);
        Ok(call)
    }

    /// Split a callee into the function to invoke and its receiver, caching a
    /// receiver with side effects in a temp: `(_a = f()).m` with `this_arg`
    /// `_a`.
    fn create_call_binding(&mut self, expression: NodeIndex) -> EmitResult<CallBinding> {
        let callee = self.arena.skip_outer_expressions(expression);
        if is_super_property(self.arena, callee) {
            let this_arg = self.arena.create_this();
            return Ok(CallBinding { target: callee, this_arg });
        }
        if self.arena.is_kind(callee, SyntaxKind::SuperKeyword) {
            let this_arg = self.arena.create_this();
            let target = self.create_super_name();
            self.arena.set_text_range_from(target, callee);
            return Ok(CallBinding { target, this_arg });
        }
        if self.arena.emit_flags(callee).contains(EmitFlags::HELPER_NAME) {
            let this_arg = self.arena.create_void_zero();
            let target = self.arena.parenthesize_for_access(callee);
            return Ok(CallBinding { target, this_arg });
        }

        match self.arena.data(callee)?.clone() {
            NodeData::PropertyAccessExpression { expression: object, name } => {
                if should_be_captured_in_temp(self.arena, object) {
                    let this_arg = self.arena.create_temp_variable();
                    self.hoist_variable(this_arg)?;
                    let capture = self.arena.create_assignment(this_arg, object);
                    self.arena.set_text_range_from(capture, object);
                    let capture = self.arena.create_paren(capture);
                    let target = self.arena.create_property_access(capture, name);
                    self.arena.set_text_range_from(target, callee);
                    Ok(CallBinding { target, this_arg })
                } else {
                    Ok(CallBinding {
                        target: callee,
                        this_arg: object,
                    })
                }
            }
            NodeData::ElementAccessExpression {
                expression: object,
                argument,
            } => {
                if should_be_captured_in_temp(self.arena, object) {
                    let this_arg = self.arena.create_temp_variable();
                    self.hoist_variable(this_arg)?;
                    let capture = self.arena.create_assignment(this_arg, object);
                    self.arena.set_text_range_from(capture, object);
                    let capture = self.arena.create_paren(capture);
                    let target = self.arena.create_element_access(capture, argument);
                    self.arena.set_text_range_from(target, callee);
                    Ok(CallBinding { target, this_arg })
                } else {
                    Ok(CallBinding {
                        target: callee,
                        this_arg: object,
                    })
                }
            }
            _ => {
                let this_arg = self.arena.create_void_zero();
                let target = self.arena.parenthesize_for_access(expression);
                Ok(CallBinding { target, this_arg })
            }
        }
    }

    pub(super) fn visit_new_expression(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::NewExpression {
            expression, arguments, ..
        } = self.arena.data(node)?.clone()
        else {
            return Ok(node);
        };
        let arguments = arguments.unwrap_or_default();
        if !has_spread(self.arena, &arguments) {
            return visit_each_child(self, node);
        }
        trace!("lowering spread in new expression");
        let bind = self.arena.create_property_access_str(expression, "bind");
        let binding = self.create_call_binding(bind)?;
        let target = visit_node(self, binding.target)?;
        let mut elements = vec![self.arena.create_void_zero()];
        elements.extend(arguments.iter());
        let spread = self.transform_and_spread_elements(&NodeList::new(elements), false, false)?;
        let apply = self.arena.create_function_apply(target, binding.this_arg, spread);
        let callee = self.arena.parenthesize_for_new(apply);
        let result = self.arena.create_new(callee, Some(Vec::new()));
        Ok(self.arena.set_original_and_range(result, node))
    }

    pub(super) fn visit_array_literal_expression(
        &mut self,
        node: NodeIndex,
        elements: NodeList,
        multi_line: bool,
    ) -> EmitResult<NodeIndex> {
        if !has_spread(self.arena, &elements) {
            return visit_each_child(self, node);
        }
        self.transform_and_spread_elements(&elements, true, multi_line)
    }

    /// Runs of plain elements become array literals and spreads contribute
    /// their operand; the pieces are joined with `concat` (or `__spread`
    /// under `downlevelIteration`). `needs_unique_copy` forces a fresh array
    /// when the result would otherwise alias a spread operand.
    pub(super) fn transform_and_spread_elements(
        &mut self,
        elements: &NodeList,
        needs_unique_copy: bool,
        multi_line: bool,
    ) -> EmitResult<NodeIndex> {
        let count = elements.len();
        let mut segments = Vec::new();
        let mut chunk: Vec<NodeIndex> = Vec::new();
        for (i, element) in elements.iter().enumerate() {
            if let Some(NodeData::SpreadElement { expression }) = self.arena.get(element).map(|n| &n.data) {
                let expression = *expression;
                if !chunk.is_empty() {
                    let literal = self.visit_span_of_non_spreads(std::mem::take(&mut chunk), multi_line, false)?;
                    segments.push(literal);
                }
                segments.push(visit_node(self, expression)?);
            } else {
                chunk.push(element);
            }
            if i + 1 == count && !chunk.is_empty() {
                let literal =
                    self.visit_span_of_non_spreads(std::mem::take(&mut chunk), multi_line, elements.has_trailing_comma)?;
                segments.push(literal);
            }
        }

        if self.context.options.downlevel_iteration {
            if let [only] = segments[..] {
                if is_call_to_helper(self.arena, only, "__spread") {
                    return Ok(only);
                }
            }
            self.context.request_emit_helper(&SPREAD_HELPER);
            let helper = create_helper_name(self.arena, "__spread");
            return Ok(self.arena.create_call(helper, segments));
        }

        let mut segments = segments.into_iter();
        let Some(first) = segments.next() else {
            return Ok(self.arena.create_array_literal(Vec::new(), multi_line));
        };
        let rest: Vec<NodeIndex> = segments.collect();
        if rest.is_empty() {
            let first_element_spreads_non_literal = elements.first().is_some_and(|e| {
                matches!(
                    self.arena.get(e).map(|n| &n.data),
                    Some(NodeData::SpreadElement { expression })
                        if !self.arena.is_kind(*expression, SyntaxKind::ArrayLiteralExpression)
                )
            });
            if needs_unique_copy && first_element_spreads_non_literal {
                let slice = self.arena.create_property_access_str(first, "slice");
                return Ok(self.arena.create_call(slice, Vec::new()));
            }
            return Ok(first);
        }
        Ok(self.arena.create_array_concat(first, rest))
    }

    fn visit_span_of_non_spreads(
        &mut self,
        chunk: Vec<NodeIndex>,
        multi_line: bool,
        has_trailing_comma: bool,
    ) -> EmitResult<NodeIndex> {
        let visited = visit_nodes(self, &chunk)?;
        let mut list = NodeList::new(visited);
        list.has_trailing_comma = has_trailing_comma;
        Ok(self.arena.create_node(NodeData::ArrayLiteralExpression {
            elements: list,
            multi_line,
        }))
    }
}

fn has_spread(arena: &NodeArena, list: &NodeList) -> bool {
    list.iter().any(|e| arena.is_kind(e, SyntaxKind::SpreadElement))
}

fn is_super_property(arena: &NodeArena, node: NodeIndex) -> bool {
    match arena.get(node).map(|n| &n.data) {
        Some(
            NodeData::PropertyAccessExpression { expression, .. } | NodeData::ElementAccessExpression { expression, .. },
        ) => arena.is_kind(*expression, SyntaxKind::SuperKeyword),
        _ => false,
    }
}

fn needs_call_binding(arena: &NodeArena, callee: NodeIndex, arguments: &NodeList) -> bool {
    has_spread(arena, arguments)
        || arena.is_kind(callee, SyntaxKind::SuperKeyword)
        || is_super_property(arena, arena.skip_outer_expressions(callee))
}

/// Receivers that can be evaluated twice without observable difference.
fn should_be_captured_in_temp(arena: &NodeArena, node: NodeIndex) -> bool {
    let mut target = node;
    while let Some(NodeData::ParenthesizedExpression { expression }) = arena.get(target).map(|n| &n.data) {
        target = *expression;
    }
    match arena.get(target).map(|n| &n.data) {
        Some(NodeData::Identifier(_)) => false,
        Some(NodeData::ThisKeyword | NodeData::NumericLiteral { .. } | NodeData::StringLiteral { .. }) => false,
        Some(NodeData::ArrayLiteralExpression { elements, .. }) => !elements.is_empty(),
        Some(NodeData::ObjectLiteralExpression { properties, .. }) => !properties.is_empty(),
        _ => true,
    }
}

fn is_call_to_helper(arena: &NodeArena, node: NodeIndex, name: &str) -> bool {
    match arena.get(node).map(|n| &n.data) {
        Some(NodeData::CallExpression { expression, .. }) => {
            arena.emit_flags(*expression).contains(EmitFlags::HELPER_NAME) && arena.identifier_text(*expression) == name
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receivers_worth_caching() {
        let mut arena = NodeArena::new();
        let identifier = arena.create_identifier("o");
        let this = arena.create_this();
        let empty = arena.create_array_literal(Vec::new(), false);
        let callee = arena.create_identifier("f");
        let call = arena.create_call(callee, Vec::new());
        assert!(!should_be_captured_in_temp(&arena, identifier));
        assert!(!should_be_captured_in_temp(&arena, this));
        assert!(!should_be_captured_in_temp(&arena, empty));
        assert!(should_be_captured_in_temp(&arena, call));
    }

    #[test]
    fn test_super_member_call_needs_binding() {
        let mut arena = NodeArena::new();
        let sup = arena.create_super();
        let member = arena.create_property_access_str(sup, "m");
        let plain = arena.create_identifier("f");
        assert!(needs_call_binding(&arena, member, &NodeList::default()));
        assert!(!needs_call_binding(&arena, plain, &NodeList::default()));

        let xs = arena.create_identifier("xs");
        let spread = arena.create_spread(xs);
        assert!(needs_call_binding(&arena, plain, &NodeList::new(vec![spread])));
    }
}
