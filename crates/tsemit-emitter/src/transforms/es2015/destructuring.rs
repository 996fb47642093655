//! Destructuring flattened into plain reads and writes.
//!
//! Both forms share one walk over "elements":
//!
//! - binding: `var { a, b: [c] = d } = e;` becomes a list of declarations
//! - assignment: `({ a, b: [c] = d } = e);` becomes a comma expression
//!
//! An element is anything that can appear inside a pattern: a declaration,
//! a binding element, a property or shorthand assignment, a spread, or an
//! assignment with a default. The accessors at the bottom of this file give
//! its target, default value, property name and rest marker uniformly.

use super::Es2015Transformer;
use crate::helpers::{READ_HELPER, REST_HELPER, create_helper_name};
use crate::transforms::visitor::visit_node;
use tracing::trace;
use tsemit_ast::utilities::{get_property_name_text, is_destructuring_assignment};
use tsemit_ast::{EmitFlags, NodeArena, NodeData, NodeIndex, SyntaxKind};
use tsemit_common::EmitResult;

/// A declaration produced by the binding form, not yet created.
#[derive(Debug)]
struct PendingDeclaration {
    name: NodeIndex,
    value: NodeIndex,
    location: NodeIndex,
    original: NodeIndex,
}

#[derive(Debug, Default)]
struct Flattener {
    /// Binding form: produce declarations rather than assignments.
    binding: bool,
    /// Temps go through the enclosing scope's hoisted `var` instead of
    /// being declared in place. Always true for the assignment form.
    hoist_temps: bool,
    expressions: Vec<NodeIndex>,
    declarations: Vec<PendingDeclaration>,
}

impl Es2015Transformer<'_, '_> {
    /// Flatten `pattern = value`, or a pattern-named declaration visited as an
    /// assignment. With `needs_value` the result evaluates to the assigned
    /// value.
    pub(super) fn flatten_destructuring_assignment(&mut self, node: NodeIndex, needs_value: bool) -> EmitResult<NodeIndex> {
        let mut node = node;
        let mut location = node;
        let mut value = NodeIndex::NONE;

        if let Some((mut left, mut right)) = assignment_parts(self.arena, node) {
            // `{} = [] = x` assigns nothing
            while is_empty_pattern_literal(self.arena, left) {
                if !is_destructuring_assignment(self.arena, right) {
                    return visit_node(self, right);
                }
                node = right;
                location = right;
                (left, right) = assignment_parts(self.arena, right).unwrap_or((left, NodeIndex::NONE));
            }
            value = right;
        }

        let mut flattener = Flattener {
            hoist_temps: true,
            ..Flattener::default()
        };
        if value.is_some() {
            value = visit_node(self, value)?;
            let reassigns_source = self.arena.is_kind(value, SyntaxKind::Identifier)
                && element_assigns_to_name(self.arena, node, self.arena.identifier_text(value));
            if reassigns_source || element_contains_non_literal_computed_name(self.arena, node) {
                value = self.ensure_identifier(&mut flattener, value, false, location)?;
            } else if needs_value {
                value = self.ensure_identifier(&mut flattener, value, true, location)?;
            } else if self.arena.node(node)?.is_synthesized() {
                location = value;
            }
        }

        let skip_initializer = is_destructuring_assignment(self.arena, node);
        self.flatten_element(&mut flattener, node, value, location, skip_initializer)?;

        let mut expressions = flattener.expressions;
        if value.is_some() && needs_value {
            if expressions.is_empty() {
                return Ok(value);
            }
            expressions.push(value);
        }
        Ok(match self.arena.inline_expressions(&expressions) {
            Some(expression) => expression,
            None => self.arena.create_omitted_expression(),
        })
    }

    /// Flatten a pattern-named declaration, parameter or catch variable into
    /// declarations, reading from `rval` when given (else the initializer).
    pub(super) fn flatten_destructuring_binding(
        &mut self,
        node: NodeIndex,
        rval: NodeIndex,
        hoist_temps: bool,
    ) -> EmitResult<Vec<NodeIndex>> {
        let mut flattener = Flattener {
            binding: true,
            hoist_temps,
            ..Flattener::default()
        };
        let mut element = node;

        if let NodeData::VariableDeclaration {
            name,
            exclamation,
            type_node,
            initializer,
        } = self.arena.data(node)?.clone()
        {
            let reassigns_source = initializer.is_some()
                && self.arena.is_kind(initializer, SyntaxKind::Identifier)
                && element_assigns_to_name(self.arena, node, self.arena.identifier_text(initializer));
            if reassigns_source || element_contains_non_literal_computed_name(self.arena, node) {
                let visited = visit_node(self, initializer)?;
                let temp = self.ensure_identifier(&mut flattener, visited, false, initializer)?;
                element = self.arena.update_node(
                    node,
                    NodeData::VariableDeclaration {
                        name,
                        exclamation,
                        type_node,
                        initializer: temp,
                    },
                );
            }
        }

        self.flatten_element(&mut flattener, element, rval, node, false)?;

        if !flattener.expressions.is_empty() {
            let temp = self.arena.create_temp_variable();
            let pending = std::mem::take(&mut flattener.expressions);
            if flattener.hoist_temps {
                let value = self.arena.inline_expressions(&pending).unwrap_or(temp);
                self.emit_binding_or_assignment(&mut flattener, temp, value, NodeIndex::NONE, NodeIndex::NONE)?;
            } else if let Some(last) = flattener.declarations.last_mut() {
                self.context.hoist_variable_declaration(temp)?;
                let capture = self.arena.create_assignment(temp, last.value);
                let mut expressions = vec![capture];
                expressions.extend(pending);
                expressions.push(temp);
                last.value = self.arena.inline_expressions(&expressions).unwrap_or(temp);
            }
        }

        let mut declarations = Vec::with_capacity(flattener.declarations.len());
        for pending in flattener.declarations {
            let declaration = self.arena.create_variable_declaration(pending.name, pending.value);
            if pending.original.is_some() {
                self.arena.set_original(declaration, pending.original);
            }
            if pending.location.is_some() {
                self.arena.set_text_range_from(declaration, pending.location);
            }
            if self.arena.is_kind(pending.name, SyntaxKind::Identifier) {
                self.arena.add_emit_flags(declaration, EmitFlags::NO_NESTED_SOURCE_MAPS);
            }
            declarations.push(declaration);
        }
        trace!(count = declarations.len(), "flattened binding pattern");
        Ok(declarations)
    }

    // =========================================================================
    // The walk
    // =========================================================================

    fn flatten_element(
        &mut self,
        flattener: &mut Flattener,
        element: NodeIndex,
        value: NodeIndex,
        location: NodeIndex,
        skip_initializer: bool,
    ) -> EmitResult<()> {
        let mut value = value;
        if !skip_initializer {
            let initializer = visit_node(self, element_initializer(self.arena, element))?;
            if initializer.is_some() {
                value = if value.is_some() {
                    self.create_default_value_check(flattener, value, initializer, location)?
                } else {
                    initializer
                };
            } else if value.is_none() {
                value = self.arena.create_void_zero();
            }
        }

        let target = element_target(self.arena, element);
        match self.arena.kind(target) {
            Some(SyntaxKind::ObjectBindingPattern | SyntaxKind::ObjectLiteralExpression) => {
                self.flatten_object_pattern(flattener, element, target, value, location)
            }
            Some(SyntaxKind::ArrayBindingPattern | SyntaxKind::ArrayLiteralExpression) => {
                self.flatten_array_pattern(flattener, element, target, value, location)
            }
            _ => self.emit_binding_or_assignment(flattener, target, value, location, element),
        }
    }

    fn flatten_object_pattern(
        &mut self,
        flattener: &mut Flattener,
        parent: NodeIndex,
        pattern: NodeIndex,
        value: NodeIndex,
        location: NodeIndex,
    ) -> EmitResult<()> {
        let elements = pattern_elements(self.arena, pattern);
        let mut value = value;
        if elements.len() != 1 {
            let reuse_identifier = !is_declaration_binding_element(self.arena, parent) || !elements.is_empty();
            value = self.ensure_identifier(flattener, value, reuse_identifier, location)?;
        }

        let mut computed_temps = Vec::new();
        for (i, &element) in elements.iter().enumerate() {
            if !is_rest_element(self.arena, element) {
                let property_name = element_property_name(self.arena, element);
                let (access, computed) = self.create_destructuring_property_access(flattener, value, property_name)?;
                if let Some(temp) = computed {
                    computed_temps.push(temp);
                }
                self.flatten_element(flattener, element, access, element, false)?;
            } else if i == elements.len() - 1 {
                let rest = self.create_rest_call(value, &elements, &computed_temps, pattern)?;
                self.flatten_element(flattener, element, rest, element, false)?;
            }
        }
        Ok(())
    }

    fn flatten_array_pattern(
        &mut self,
        flattener: &mut Flattener,
        parent: NodeIndex,
        pattern: NodeIndex,
        value: NodeIndex,
        location: NodeIndex,
    ) -> EmitResult<()> {
        let elements = pattern_elements(self.arena, pattern);
        let count = elements.len();
        let mut value = value;

        if self.context.options.downlevel_iteration {
            // __read(value, n) materializes only the elements being read.
            let has_rest = elements.last().is_some_and(|&last| is_rest_element(self.arena, last));
            self.context.request_emit_helper(&READ_HELPER);
            let helper = create_helper_name(self.arena, "__read");
            let mut arguments = vec![value];
            if !has_rest {
                arguments.push(self.arena.create_number(count as f64));
            }
            let read = self.arena.create_call(helper, arguments);
            if location.is_some() {
                self.arena.set_text_range_from(read, location);
            }
            value = self.ensure_identifier(flattener, read, false, location)?;
        } else if count != 1 || elements.iter().all(|&e| self.arena.is_kind(e, SyntaxKind::OmittedExpression)) {
            let reuse_identifier = !is_declaration_binding_element(self.arena, parent) || count != 0;
            value = self.ensure_identifier(flattener, value, reuse_identifier, location)?;
        }

        for (i, &element) in elements.iter().enumerate() {
            if self.arena.is_kind(element, SyntaxKind::OmittedExpression) {
                continue;
            }
            let index = self.arena.create_number(i as f64);
            if !is_rest_element(self.arena, element) {
                let access = self.arena.create_element_access(value, index);
                self.flatten_element(flattener, element, access, element, false)?;
            } else if i == count - 1 {
                let slice = self.arena.create_property_access_str(value, "slice");
                let rest = self.arena.create_call(slice, vec![index]);
                self.flatten_element(flattener, element, rest, element, false)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Pieces
    // =========================================================================

    fn emit_binding_or_assignment(
        &mut self,
        flattener: &mut Flattener,
        target: NodeIndex,
        value: NodeIndex,
        location: NodeIndex,
        original: NodeIndex,
    ) -> EmitResult<()> {
        if flattener.binding {
            let mut value = value;
            if !flattener.expressions.is_empty() {
                let mut expressions = std::mem::take(&mut flattener.expressions);
                expressions.push(value);
                value = self.arena.inline_expressions(&expressions).unwrap_or(value);
            }
            flattener.declarations.push(PendingDeclaration {
                name: target,
                value,
                location,
                original,
            });
            return Ok(());
        }
        let target = visit_node(self, target)?;
        let assignment = self.arena.create_assignment(target, value);
        if location.is_some() {
            self.arena.set_text_range_from(assignment, location);
        }
        flattener.expressions.push(assignment);
        Ok(())
    }

    /// `value` when it is an identifier that may be read twice, else a temp
    /// assigned from it.
    fn ensure_identifier(
        &mut self,
        flattener: &mut Flattener,
        value: NodeIndex,
        reuse_identifier: bool,
        location: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        if reuse_identifier && self.arena.is_kind(value, SyntaxKind::Identifier) {
            return Ok(value);
        }
        let temp = self.arena.create_temp_variable();
        if flattener.hoist_temps {
            self.hoist_variable(temp)?;
            let assignment = self.arena.create_assignment(temp, value);
            if location.is_some() {
                self.arena.set_text_range_from(assignment, location);
            }
            flattener.expressions.push(assignment);
        } else {
            self.emit_binding_or_assignment(flattener, temp, value, location, NodeIndex::NONE)?;
        }
        Ok(temp)
    }

    /// `value === void 0 ? default : value`
    fn create_default_value_check(
        &mut self,
        flattener: &mut Flattener,
        value: NodeIndex,
        default_value: NodeIndex,
        location: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        let value = self.ensure_identifier(flattener, value, true, location)?;
        let void_zero = self.arena.create_void_zero();
        let is_undefined = self.arena.create_strict_equality(value, void_zero);
        Ok(self.arena.create_conditional(is_undefined, default_value, value))
    }

    /// `value.name`, `value["name"]` or `value[_a]`; a computed key is
    /// evaluated once into a temp, also returned for the rest exclusion list.
    fn create_destructuring_property_access(
        &mut self,
        flattener: &mut Flattener,
        value: NodeIndex,
        property_name: NodeIndex,
    ) -> EmitResult<(NodeIndex, Option<NodeIndex>)> {
        match self.arena.data(property_name)?.clone() {
            NodeData::ComputedPropertyName { expression } => {
                let key = visit_node(self, expression)?;
                let key = self.ensure_identifier(flattener, key, false, property_name)?;
                Ok((self.arena.create_element_access(value, key), Some(key)))
            }
            NodeData::StringLiteral { .. } | NodeData::NumericLiteral { .. } => {
                let key = self.arena.get_synthesized_clone(property_name)?;
                Ok((self.arena.create_element_access(value, key), None))
            }
            _ => {
                let text = self.arena.identifier_text(property_name).to_string();
                let name = self.arena.create_identifier(&text);
                Ok((self.arena.create_property_access(value, name), None))
            }
        }
    }

    /// `__rest(value, ["a", "b"])`, excluding the properties read before the rest.
    fn create_rest_call(
        &mut self,
        value: NodeIndex,
        elements: &[NodeIndex],
        computed_temps: &[NodeIndex],
        location: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        self.context.request_emit_helper(&REST_HELPER);
        let mut computed = computed_temps.iter().copied();
        let mut names = Vec::new();
        for &element in &elements[..elements.len().saturating_sub(1)] {
            let property_name = element_property_name(self.arena, element);
            if property_name.is_none() {
                continue;
            }
            if self.arena.is_kind(property_name, SyntaxKind::ComputedPropertyName) {
                let Some(temp) = computed.next() else {
                    continue;
                };
                // typeof _a === "symbol" ? _a : _a + ""
                let is_symbol = self.arena.create_type_check(temp, "symbol");
                let empty = self.arena.create_string_literal("");
                let as_string = self.arena.create_add(temp, empty);
                names.push(self.arena.create_conditional(is_symbol, temp, as_string));
            } else if let Some(text) = get_property_name_text(self.arena, property_name) {
                names.push(self.arena.create_string_literal(&text));
            }
        }
        let excluded = self.arena.create_array_literal(names, false);
        self.arena.set_text_range_from(excluded, location);
        let helper = create_helper_name(self.arena, "__rest");
        Ok(self.arena.create_call(helper, vec![value, excluded]))
    }
}

// =============================================================================
// Element accessors
// =============================================================================

fn assignment_parts(arena: &NodeArena, node: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
    match arena.get(node).map(|n| &n.data) {
        Some(NodeData::BinaryExpression {
            left,
            operator: SyntaxKind::EqualsToken,
            right,
        }) => Some((*left, *right)),
        _ => None,
    }
}

fn is_empty_pattern_literal(arena: &NodeArena, node: NodeIndex) -> bool {
    match arena.get(node).map(|n| &n.data) {
        Some(NodeData::ObjectLiteralExpression { properties, .. }) => properties.is_empty(),
        Some(NodeData::ArrayLiteralExpression { elements, .. }) => elements.is_empty(),
        _ => false,
    }
}

fn is_declaration_binding_element(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(node),
        Some(SyntaxKind::VariableDeclaration | SyntaxKind::Parameter | SyntaxKind::BindingElement)
    )
}

/// The default value of an element: `d` in `a = d`, `{ a = d }`, `[a = d]`.
fn element_initializer(arena: &NodeArena, element: NodeIndex) -> NodeIndex {
    match arena.get(element).map(|n| &n.data) {
        Some(
            NodeData::VariableDeclaration { initializer, .. }
            | NodeData::Parameter { initializer, .. }
            | NodeData::BindingElement { initializer, .. },
        ) => *initializer,
        Some(NodeData::PropertyAssignment { initializer, .. }) => {
            assignment_parts(arena, *initializer).map_or(NodeIndex::NONE, |(_, right)| right)
        }
        Some(NodeData::ShorthandPropertyAssignment {
            object_assignment_initializer,
            ..
        }) => *object_assignment_initializer,
        Some(NodeData::BinaryExpression {
            operator: SyntaxKind::EqualsToken,
            right,
            ..
        }) => *right,
        Some(NodeData::SpreadElement { expression } | NodeData::SpreadAssignment { expression }) => {
            element_initializer(arena, *expression)
        }
        _ => NodeIndex::NONE,
    }
}

/// What an element writes to: a name, a property access, or a nested pattern.
fn element_target(arena: &NodeArena, element: NodeIndex) -> NodeIndex {
    match arena.get(element).map(|n| &n.data) {
        Some(
            NodeData::VariableDeclaration { name, .. }
            | NodeData::Parameter { name, .. }
            | NodeData::BindingElement { name, .. }
            | NodeData::ShorthandPropertyAssignment { name, .. },
        ) => *name,
        Some(NodeData::PropertyAssignment { initializer, .. }) => element_target(arena, *initializer),
        Some(NodeData::SpreadElement { expression } | NodeData::SpreadAssignment { expression }) => {
            element_target(arena, *expression)
        }
        Some(NodeData::BinaryExpression {
            left,
            operator: SyntaxKind::EqualsToken,
            ..
        }) => element_target(arena, *left),
        _ => element,
    }
}

/// The key an object pattern element reads.
fn element_property_name(arena: &NodeArena, element: NodeIndex) -> NodeIndex {
    match arena.get(element).map(|n| &n.data) {
        Some(NodeData::BindingElement { property_name, .. }) if property_name.is_some() => return *property_name,
        Some(
            NodeData::PropertyAssignment { name, .. } | NodeData::ShorthandPropertyAssignment { name, .. },
        ) => return *name,
        Some(NodeData::SpreadAssignment { .. } | NodeData::SpreadElement { .. }) => return NodeIndex::NONE,
        _ => {}
    }
    let target = element_target(arena, element);
    match arena.kind(target) {
        Some(
            SyntaxKind::Identifier
            | SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::ComputedPropertyName,
        ) => target,
        _ => NodeIndex::NONE,
    }
}

fn is_rest_element(arena: &NodeArena, element: NodeIndex) -> bool {
    match arena.get(element).map(|n| &n.data) {
        Some(NodeData::BindingElement { dot_dot_dot, .. }) => *dot_dot_dot,
        Some(NodeData::SpreadElement { .. } | NodeData::SpreadAssignment { .. }) => true,
        _ => false,
    }
}

fn pattern_elements(arena: &NodeArena, pattern: NodeIndex) -> Vec<NodeIndex> {
    match arena.get(pattern).map(|n| &n.data) {
        Some(NodeData::ObjectBindingPattern { elements } | NodeData::ArrayBindingPattern { elements }) => {
            elements.nodes.clone()
        }
        Some(NodeData::ObjectLiteralExpression { properties, .. }) => properties.nodes.clone(),
        Some(NodeData::ArrayLiteralExpression { elements, .. }) => elements.nodes.clone(),
        _ => Vec::new(),
    }
}

fn is_pattern(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(node),
        Some(
            SyntaxKind::ObjectBindingPattern
                | SyntaxKind::ArrayBindingPattern
                | SyntaxKind::ObjectLiteralExpression
                | SyntaxKind::ArrayLiteralExpression
        )
    )
}

/// Whether flattening `element` writes to a variable named `name`, in which
/// case the source must be read into a temp first.
fn element_assigns_to_name(arena: &NodeArena, element: NodeIndex, name: &str) -> bool {
    let target = element_target(arena, element);
    if is_pattern(arena, target) {
        return pattern_elements(arena, target)
            .into_iter()
            .any(|e| element_assigns_to_name(arena, e, name));
    }
    arena.is_kind(target, SyntaxKind::Identifier) && arena.identifier_text(target) == name
}

fn element_contains_non_literal_computed_name(arena: &NodeArena, element: NodeIndex) -> bool {
    let property_name = element_property_name(arena, element);
    if let Some(NodeData::ComputedPropertyName { expression }) = arena.get(property_name).map(|n| &n.data) {
        if !matches!(
            arena.kind(*expression),
            Some(SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral)
        ) {
            return true;
        }
    }
    let target = element_target(arena, element);
    is_pattern(arena, target)
        && pattern_elements(arena, target)
            .into_iter()
            .any(|e| element_contains_non_literal_computed_name(arena, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsemit_ast::NodeList;

    fn binding_element(arena: &mut NodeArena, property_name: NodeIndex, name: NodeIndex, dot_dot_dot: bool) -> NodeIndex {
        arena.create_node(NodeData::BindingElement {
            dot_dot_dot,
            property_name,
            name,
            initializer: NodeIndex::NONE,
        })
    }

    #[test]
    fn test_property_name_falls_back_to_binding_name() {
        let mut arena = NodeArena::new();
        let a = arena.create_identifier("a");
        let shorthand = binding_element(&mut arena, NodeIndex::NONE, a, false);
        assert_eq!(element_property_name(&arena, shorthand), a);

        let key = arena.create_identifier("key");
        let b = arena.create_identifier("b");
        let renamed = binding_element(&mut arena, key, b, false);
        assert_eq!(element_property_name(&arena, renamed), key);
        assert_eq!(element_target(&arena, renamed), b);
    }

    #[test]
    fn test_assignment_element_with_default() {
        let mut arena = NodeArena::new();
        let target = arena.create_identifier("x");
        let default = arena.create_number(1.0);
        let element = arena.create_assignment(target, default);
        assert_eq!(element_target(&arena, element), target);
        assert_eq!(element_initializer(&arena, element), default);
    }

    #[test]
    fn test_assigns_to_name_looks_through_nested_patterns() {
        let mut arena = NodeArena::new();
        let inner_name = arena.create_identifier("value");
        let inner = binding_element(&mut arena, NodeIndex::NONE, inner_name, false);
        let nested = arena.create_node(NodeData::ArrayBindingPattern {
            elements: NodeList::new(vec![inner]),
        });
        let key = arena.create_identifier("list");
        let outer = binding_element(&mut arena, key, nested, false);
        let pattern = arena.create_node(NodeData::ObjectBindingPattern {
            elements: NodeList::new(vec![outer]),
        });
        let declaration = arena.create_variable_declaration(pattern, NodeIndex::NONE);

        assert!(element_assigns_to_name(&arena, declaration, "value"));
        assert!(!element_assigns_to_name(&arena, declaration, "list"));
    }

    #[test]
    fn test_computed_key_with_identifier_is_non_literal() {
        let mut arena = NodeArena::new();
        let key_expression = arena.create_identifier("k");
        let key = arena.create_computed_property_name(key_expression);
        let name = arena.create_identifier("v");
        let element = binding_element(&mut arena, key, name, false);
        assert!(element_contains_non_literal_computed_name(&arena, element));

        let literal = arena.create_string_literal("k");
        let literal_key = arena.create_computed_property_name(literal);
        let element = binding_element(&mut arena, literal_key, name, false);
        assert!(!element_contains_non_literal_computed_name(&arena, element));
    }

    #[test]
    fn test_rest_marker() {
        let mut arena = NodeArena::new();
        let name = arena.create_identifier("rest");
        let rest = binding_element(&mut arena, NodeIndex::NONE, name, true);
        let spread = arena.create_spread(name);
        assert!(is_rest_element(&arena, rest));
        assert!(is_rest_element(&arena, spread));
        assert_eq!(element_property_name(&arena, spread), NodeIndex::NONE);
    }
}
