//! Object literals with computed members, and shorthand properties.
//!
//! Members up to the first computed name stay in the literal; the rest are
//! assigned one by one onto a temp:
//!
//! ```text
//! var o = (_a = { a: 1 }, _a[k] = 2, _a.m = function () { }, _a);
//! ```

use super::Es2015Transformer;
use super::classes::accessor_pair;
use crate::transforms::visitor::{visit_each_child, visit_node, visit_nodes};
use tracing::trace;
use tsemit_ast::{EmitFlags, NodeData, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::{EmitError, EmitResult};

impl Es2015Transformer<'_, '_> {
    pub(super) fn visit_object_literal_expression(
        &mut self,
        node: NodeIndex,
        properties: NodeList,
        multi_line: bool,
    ) -> EmitResult<NodeIndex> {
        let first_computed = properties.iter().position(|property| {
            let name = self.arena.declaration_name_node(property);
            self.arena.is_kind(name, SyntaxKind::ComputedPropertyName)
        });
        let Some(initial) = first_computed else {
            return visit_each_child(self, node);
        };
        trace!(initial, total = properties.len(), "splitting object literal at computed member");

        let temp = self.arena.create_temp_variable();
        self.hoist_variable(temp)?;
        let initial_properties = visit_nodes(self, &properties.nodes[..initial])?;
        let literal = self.arena.create_object_literal(initial_properties, multi_line);
        self.arena.add_emit_flags(literal, EmitFlags::INDENTED);
        let assignment = self.arena.create_assignment(temp, literal);
        if multi_line {
            self.arena.set_starts_on_new_line(assignment);
        }

        let mut expressions = vec![assignment];
        self.add_object_literal_members(&mut expressions, &properties, temp, initial, multi_line)?;
        let result = if multi_line {
            let copy = self.arena.get_mutable_clone(temp)?;
            self.arena.set_starts_on_new_line(copy);
            copy
        } else {
            temp
        };
        expressions.push(result);
        self.arena
            .inline_expressions(&expressions)
            .ok_or_else(|| EmitError::internal("object literal produced no expressions"))
    }

    fn add_object_literal_members(
        &mut self,
        expressions: &mut Vec<NodeIndex>,
        properties: &NodeList,
        receiver: NodeIndex,
        start: usize,
        multi_line: bool,
    ) -> EmitResult<()> {
        for &property in &properties.nodes[start..] {
            let expression = match self.arena.data(property)?.clone() {
                NodeData::GetAccessor(_) | NodeData::SetAccessor(_) => {
                    let pair = accessor_pair(self.arena, properties, property);
                    if pair.first != property {
                        continue;
                    }
                    self.transform_accessors_to_expression(receiver, &pair, false, multi_line)?
                }
                NodeData::MethodDeclaration(f) => {
                    let target = self.member_access_for_visited_name(receiver, f.name)?;
                    let function = self.transform_function_like_to_expression(
                        property,
                        SyntaxKind::MethodDeclaration,
                        &f,
                        NodeIndex::NONE,
                        false,
                    )?;
                    self.arena.create_assignment(target, function)
                }
                NodeData::PropertyAssignment { name, initializer } => {
                    let target = self.member_access_for_visited_name(receiver, name)?;
                    let value = visit_node(self, initializer)?;
                    self.arena.create_assignment(target, value)
                }
                NodeData::ShorthandPropertyAssignment { name, .. } => {
                    let target = self.member_access_for_visited_name(receiver, name)?;
                    let clone = self.arena.get_synthesized_clone(name)?;
                    let value = self.visit_identifier(clone);
                    self.arena.create_assignment(target, value)
                }
                NodeData::SpreadAssignment { .. } => {
                    return Err(EmitError::unsupported(
                        "object spread after a computed property name requires an ES2018 downlevel pass",
                    ));
                }
                other => {
                    return Err(EmitError::UnexpectedNode {
                        kind: format!("{:?}", other.kind()),
                        pos: self.arena.range(property).pos,
                        context: "object literal member",
                    });
                }
            };
            if !self.arena.is_kind(property, SyntaxKind::GetAccessor) && !self.arena.is_kind(property, SyntaxKind::SetAccessor) {
                self.arena.set_text_range_from(expression, property);
                if multi_line {
                    self.arena.set_starts_on_new_line(expression);
                }
            }
            expressions.push(expression);
        }
        Ok(())
    }

    fn member_access_for_visited_name(&mut self, receiver: NodeIndex, name: NodeIndex) -> EmitResult<NodeIndex> {
        let name = visit_node(self, name)?;
        self.arena.create_member_access_for_property_name(receiver, name)
    }

    /// `{ x }` becomes `{ x: x }`.
    pub(super) fn visit_shorthand_property_assignment(&mut self, node: NodeIndex, name: NodeIndex) -> EmitResult<NodeIndex> {
        let clone = self.arena.get_synthesized_clone(name)?;
        let value = self.visit_identifier(clone);
        let assignment = self.arena.create_property_assignment(name, value);
        self.arena.set_text_range_from(assignment, node);
        Ok(assignment)
    }
}
