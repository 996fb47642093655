//! Namespaces and enums.
//!
//! Both become a `var` (skipped when an earlier declaration in the same
//! scope already introduced the name) followed by an IIFE that fills the
//! object in:
//!
//! ```text
//! var E;
//! (function (E) {
//!     E[E["A"] = 0] = "A";
//! })(E || (E = {}));
//! ```

use super::TypeScriptTransformer;
use crate::resolver::{ConstantValue, resolver_key};
use crate::transforms::visitor::{VisitResult, elided, many, merge_lexical_environment, single, visit_node, visit_nodes};
use tracing::trace;
use tsemit_ast::{EmitFlags, ModifierFlags, NodeArena, NodeData, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::{EmitError, EmitResult};

impl TypeScriptTransformer<'_, '_> {
    pub(super) fn visit_module_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        if !is_instantiated_module(self.arena, node, self.context.options.preserve_const_enums) {
            return Ok(single(self.arena.create_not_emitted_statement(node)));
        }
        let NodeData::ModuleDeclaration { body, .. } = self.arena.data(node)?.clone() else {
            return Ok(single(node));
        };
        trace!(name = self.arena.identifier_text(self.arena.declaration_name_node(node)), "lowering namespace");

        let mut statements = Vec::with_capacity(2);
        let emitted_var = self.add_var_for_enum_or_module_declaration(&mut statements, node)?;
        let argument = self.create_container_argument(node)?;

        self.namespace_stack.push(node);
        let block = self.transform_module_body(node, body);
        self.namespace_stack.pop();
        let block = block?;

        let iife = self.create_container_iife(node, block, argument);
        let mut flags = EmitFlags::ADVISE_ON_EMIT_NODE;
        if emitted_var {
            flags |= EmitFlags::NO_LEADING_COMMENTS;
        }
        self.arena.add_emit_flags(iife, flags);
        let key = resolver_key(self.arena, node);
        self.hook.add_transformed_container(key);
        statements.push(iife);
        Ok(many(statements))
    }

    /// Statements of a namespace body, with hoisted temps first.
    fn transform_module_body(&mut self, node: NodeIndex, body: NodeIndex) -> EmitResult<NodeIndex> {
        let is_nested_declaration = self.arena.is_kind(body, SyntaxKind::ModuleDeclaration);
        let (statements, hoisted) = self.in_lexical_environment(|this| {
            this.with_declaration_scope(|this| match this.arena.data(body)?.clone() {
                NodeData::ModuleBlock { statements } => visit_nodes(this, &statements.nodes),
                NodeData::ModuleDeclaration { .. } => Ok(this.visit_module_declaration(body)?.into_vec()),
                _ => Ok(Vec::new()),
            })
        })?;
        let statements = merge_lexical_environment(self.arena, statements, hoisted);
        let block = self.arena.create_block(statements, true);
        if is_nested_declaration {
            self.arena.add_emit_flags(block, EmitFlags::NO_COMMENTS);
        } else if body.is_some() {
            self.arena.set_text_range_from(block, body);
        }
        self.arena.set_original(block, node);
        Ok(block)
    }

    // =========================================================================
    // Enums
    // =========================================================================

    pub(super) fn visit_enum_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let is_const = self.arena.has_modifier(node, ModifierFlags::CONST);
        if is_const && !self.context.options.preserve_const_enums {
            return Ok(single(self.arena.create_not_emitted_statement(node)));
        }
        let NodeData::EnumDeclaration { members, .. } = self.arena.data(node)?.clone() else {
            return Ok(elided());
        };

        let mut statements = Vec::with_capacity(2);
        let emitted_var = self.add_var_for_enum_or_module_declaration(&mut statements, node)?;
        let argument = self.create_container_argument(node)?;

        let (member_statements, hoisted) = self.in_lexical_environment(|this| {
            let mut out = Vec::with_capacity(members.len());
            let mut next = Some(0.0);
            for member in members.iter() {
                out.push(this.transform_enum_member(node, member, &mut next)?);
            }
            Ok(out)
        })?;
        let mut body = hoisted;
        body.extend(member_statements);
        let block = self.arena.create_block(body, true);
        self.arena.set_text_range_from(block, node);

        let iife = self.create_container_iife(node, block, argument);
        if emitted_var {
            self.arena.add_emit_flags(iife, EmitFlags::NO_LEADING_COMMENTS);
        }
        statements.push(iife);
        Ok(many(statements))
    }

    /// `E[E["A"] = 0] = "A";`, or `E["S"] = "s";` for a string member.
    /// `next` carries the auto-increment value; `None` once a member's
    /// value is only known at runtime.
    fn transform_enum_member(
        &mut self,
        enum_node: NodeIndex,
        member: NodeIndex,
        next: &mut Option<f64>,
    ) -> EmitResult<NodeIndex> {
        let NodeData::EnumMember { name, initializer } = self.arena.data(member)?.clone() else {
            return Err(EmitError::internal("enum member without EnumMember payload"));
        };
        let key = self.arena.create_expression_for_property_name(name)?;
        let key = match self.arena.data(key)? {
            NodeData::Identifier(_) | NodeData::StringLiteral { .. } | NodeData::NumericLiteral { .. } => key,
            _ => visit_node(self, key)?,
        };

        let constant = self
            .context
            .resolver
            .get_constant_value(resolver_key(self.arena, member))
            .or_else(|| syntactic_constant(self.arena, initializer));
        let (value, is_string) = match constant {
            Some(ConstantValue::Number(value)) => {
                *next = Some(value + 1.0);
                (create_constant_literal(self.arena, value), false)
            }
            Some(ConstantValue::String(text)) => {
                *next = None;
                (self.arena.create_string_literal(&text), true)
            }
            None if initializer.is_some() => {
                *next = None;
                let value = visit_node(self, initializer)?;
                let is_string = self.arena.is_kind(self.arena.skip_outer_expressions(value), SyntaxKind::StringLiteral);
                (value, is_string)
            }
            None => {
                let Some(value) = *next else {
                    let text = self.arena.identifier_text(name).to_string();
                    return Err(EmitError::unsupported(format!(
                        "enum member '{text}' needs an initializer after a computed member"
                    )));
                };
                *next = Some(value + 1.0);
                (create_constant_literal(self.arena, value), false)
            }
        };

        let container = self.arena.get_generated_name_for_node(enum_node);
        let inner = self.arena.create_element_access(container, key);
        let assignment = self.arena.create_assignment(inner, value);
        let expression = if is_string {
            assignment
        } else {
            let outer_container = self.arena.get_generated_name_for_node(enum_node);
            let outer = self.arena.create_element_access(outer_container, assignment);
            let reverse_name = self.arena.create_expression_for_property_name(name)?;
            let reverse_name = match self.arena.data(reverse_name)? {
                NodeData::Identifier(_) => reverse_name,
                NodeData::StringLiteral { .. } => self.arena.get_synthesized_clone(reverse_name)?,
                _ => {
                    let text = self.property_name_text(name).unwrap_or_default();
                    self.arena.create_string_literal(&text)
                }
            };
            self.arena.create_assignment(outer, reverse_name)
        };
        let statement = self.arena.create_expression_statement(expression);
        Ok(self.arena.set_original_and_range(statement, member))
    }

    // =========================================================================
    // Shared
    // =========================================================================

    /// Push `var N;` (or a merge marker) for an enum or namespace. Returns
    /// whether a `var` was emitted.
    fn add_var_for_enum_or_module_declaration(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        node: NodeIndex,
    ) -> EmitResult<bool> {
        if !self.record_declaration_name(node) {
            let marker = self.arena.create_not_emitted_statement(node);
            self.arena.add_emit_flags(marker, EmitFlags::NO_COMMENTS);
            statements.push(marker);
            return Ok(false);
        }

        let name = self.arena.get_local_name(node)?;
        let declaration = self.arena.create_variable_declaration(name, NodeIndex::NONE);
        let flags = if self.in_source_file_scope() {
            NodeFlags::NONE
        } else {
            NodeFlags::LET
        };
        let list = self.arena.create_variable_declaration_list(vec![declaration], flags);
        let modifiers = self.emitted_modifiers(node);
        let statement = self.arena.create_variable_statement_from_list(list, modifiers);
        self.arena.set_original(statement, node);

        let range = self.arena.range(node);
        if self.arena.is_kind(node, SyntaxKind::EnumDeclaration) {
            self.arena.set_source_map_range(list, range);
        } else {
            self.arena.set_source_map_range(statement, range);
        }
        self.arena.set_comment_range(statement, range);
        self.arena.add_emit_flags(statement, EmitFlags::NO_TRAILING_COMMENTS);
        statements.push(statement);
        Ok(true)
    }

    /// `N || (N = {})`, or `N = Outer.N || (Outer.N = {})` for a namespace
    /// member. Computed before the declaration is pushed on the namespace
    /// stack, so `Outer` is the enclosing namespace.
    fn create_container_argument(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let is_member = !self.namespace_stack.is_empty()
            && (self.arena.has_modifier(node, ModifierFlags::EXPORT)
                || self.arena.node_flags(node).contains(NodeFlags::NESTED_NAMESPACE));
        let name_node = self.arena.declaration_name_node(node);

        let target = if is_member {
            self.namespace_member_name(name_node)?
        } else {
            self.arena.get_local_name(node)?
        };
        let assigned_target = if is_member {
            self.namespace_member_name(name_node)?
        } else {
            self.arena.get_local_name(node)?
        };
        let empty = self.arena.create_object_literal(Vec::new(), false);
        let assignment = self.arena.create_assignment(assigned_target, empty);
        let fallback = self.arena.create_logical_or(target, assignment);
        if !is_member {
            return Ok(fallback);
        }
        let local = self.arena.get_local_name(node)?;
        Ok(self.arena.create_assignment(local, fallback))
    }

    /// `(function (N) { body })(argument);`
    fn create_container_iife(&mut self, node: NodeIndex, block: NodeIndex, argument: NodeIndex) -> NodeIndex {
        let parameter_name = self.arena.get_generated_name_for_node(node);
        let parameter = self.arena.create_parameter(parameter_name);
        let function = self.arena.create_function_expression(NodeIndex::NONE, vec![parameter], block);
        let call = self.arena.create_call(function, vec![argument]);
        let statement = self.arena.create_expression_statement(call);
        self.arena.set_original_and_range(statement, node)
    }
}

/// Whether a namespace produces any runtime code.
pub(super) fn is_instantiated_module(arena: &NodeArena, node: NodeIndex, preserve_const_enums: bool) -> bool {
    let Some(n) = arena.get(node) else {
        return false;
    };
    if n.modifiers.contains(ModifierFlags::AMBIENT) {
        return false;
    }
    match &n.data {
        NodeData::ModuleDeclaration { body, .. } => body.is_some() && is_instantiated_module(arena, *body, preserve_const_enums),
        NodeData::ModuleBlock { statements } => statements
            .iter()
            .any(|s| is_instantiated_module(arena, s, preserve_const_enums)),
        NodeData::InterfaceDeclaration { .. } | NodeData::TypeAliasDeclaration { .. } => false,
        NodeData::ImportDeclaration { .. } | NodeData::ImportEqualsDeclaration { .. } => {
            n.modifiers.contains(ModifierFlags::EXPORT)
        }
        NodeData::EnumDeclaration { .. } => !n.modifiers.contains(ModifierFlags::CONST) || preserve_const_enums,
        NodeData::NotEmittedStatement => false,
        _ => true,
    }
}

/// The value of an enum initializer that is a plain literal.
fn syntactic_constant(arena: &NodeArena, initializer: NodeIndex) -> Option<ConstantValue> {
    let expression = arena.skip_outer_expressions(initializer);
    match arena.get(expression).map(|n| &n.data)? {
        NodeData::NumericLiteral { text } => parse_numeric_literal(text).map(ConstantValue::Number),
        NodeData::StringLiteral { text, .. } => Some(ConstantValue::String(text.clone())),
        NodeData::NoSubstitutionTemplateLiteral(t) => Some(ConstantValue::String(t.cooked.clone())),
        NodeData::PrefixUnaryExpression { operator, operand } => {
            let operand = arena.skip_outer_expressions(*operand);
            let NodeData::NumericLiteral { text } = arena.get(operand).map(|n| &n.data)? else {
                return None;
            };
            let value = parse_numeric_literal(text)?;
            match operator {
                SyntaxKind::MinusToken => Some(ConstantValue::Number(-value)),
                SyntaxKind::PlusToken => Some(ConstantValue::Number(value)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_numeric_literal(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return cleaned.parse::<f64>().ok(),
    };
    u64::from_str_radix(&lower[2..], radix).ok().map(|v| v as f64)
}

/// A numeric literal, with a prefix minus for negative values.
fn create_constant_literal(arena: &mut NodeArena, value: f64) -> NodeIndex {
    if value < 0.0 || (value == 0.0 && value.is_sign_negative()) {
        let literal = arena.create_number(-value);
        return arena.create_prefix(SyntaxKind::MinusToken, literal);
    }
    arena.create_number(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_literal_radixes() {
        assert_eq!(parse_numeric_literal("0x1F"), Some(31.0));
        assert_eq!(parse_numeric_literal("0b101"), Some(5.0));
        assert_eq!(parse_numeric_literal("1_000"), Some(1000.0));
        assert_eq!(parse_numeric_literal("2.5"), Some(2.5));
    }

    #[test]
    fn test_namespace_of_types_only_is_not_instantiated() {
        let mut arena = NodeArena::new();
        let name = arena.create_identifier("I");
        let interface = arena.create_node(NodeData::InterfaceDeclaration {
            name,
            type_parameters: None,
            heritage_clauses: Default::default(),
            members: Default::default(),
        });
        let block = arena.create_node(NodeData::ModuleBlock {
            statements: vec![interface].into(),
        });
        let ns_name = arena.create_identifier("N");
        let module = arena.create_node(NodeData::ModuleDeclaration { name: ns_name, body: block });
        assert!(!is_instantiated_module(&arena, module, false));
    }
}
