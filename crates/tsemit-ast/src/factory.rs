//! Node factory.
//!
//! Every `create_*` method allocates a synthesized node (no source range,
//! `NodeFlags::SYNTHESIZED`) and parenthesizes operands so that the printed
//! text parses back to the same tree. `update_node` is the single entry point
//! for rebuilding a node with new children: it returns the original index
//! when nothing changed, and otherwise copies the source range and records
//! the `original` link.

use crate::arena::NodeArena;
use crate::flags::{EmitFlags, ModifierFlags, NodeFlags};
use crate::node::{
    AutoGenerate, FunctionData, GeneratedIdentifierFlags, GeneratedIdentifierKind, IdentifierData, NodeData,
    NodeIndex, NodeList,
};
use crate::syntax_kind::SyntaxKind;
use tsemit_common::{EmitError, EmitResult};

impl NodeArena {
    // =========================================================================
    // Core
    // =========================================================================

    pub fn create_node(&mut self, data: NodeData) -> NodeIndex {
        self.create_node_with(data, NodeFlags::NONE, ModifierFlags::NONE)
    }

    pub fn create_node_with(&mut self, data: NodeData, flags: NodeFlags, modifiers: ModifierFlags) -> NodeIndex {
        let data = self.parenthesize_children(data);
        self.alloc_synthesized(data, flags, modifiers)
    }

    /// Rebuild `original` with `data`, keeping its range, flags and modifiers.
    pub fn update_node(&mut self, original: NodeIndex, data: NodeData) -> NodeIndex {
        let modifiers = self.modifiers(original);
        self.update_node_with_modifiers(original, data, modifiers)
    }

    pub fn update_node_with_modifiers(
        &mut self,
        original: NodeIndex,
        data: NodeData,
        modifiers: ModifierFlags,
    ) -> NodeIndex {
        let Some(node) = self.get(original) else {
            return self.create_node_with(data, NodeFlags::NONE, modifiers);
        };
        if node.data == data && node.modifiers == modifiers {
            return original;
        }
        let (pos, end, flags) = (node.pos, node.end, node.flags);
        let data = self.parenthesize_children(data);
        let updated = self.alloc_synthesized(data, flags, modifiers);
        self.set_text_range(updated, pos, end);
        self.set_original(updated, original);
        updated
    }

    /// Copy of a node with no source range. Comments and source maps still
    /// resolve through the `original` link.
    pub fn get_synthesized_clone(&mut self, index: NodeIndex) -> EmitResult<NodeIndex> {
        let node = self.node(index)?;
        let (data, flags, modifiers) = (node.data.clone(), node.flags, node.modifiers);
        let clone = self.alloc_synthesized(data, flags, modifiers);
        self.set_original(clone, index);
        Ok(clone)
    }

    /// Copy of a node that keeps its source range.
    pub fn get_mutable_clone(&mut self, index: NodeIndex) -> EmitResult<NodeIndex> {
        let clone = self.get_synthesized_clone(index)?;
        self.set_text_range_from(clone, index);
        Ok(clone)
    }

    /// Set `original` and the source range of `index` from `from`.
    pub fn set_original_and_range(&mut self, index: NodeIndex, from: NodeIndex) -> NodeIndex {
        self.set_original(index, from);
        self.set_text_range_from(index, from);
        index
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn create_identifier(&mut self, text: &str) -> NodeIndex {
        self.create_node(NodeData::Identifier(IdentifierData {
            text: text.to_string(),
            auto_generate: None,
        }))
    }

    fn create_generated_name(
        &mut self,
        kind: GeneratedIdentifierKind,
        text: &str,
        flags: GeneratedIdentifierFlags,
        node: NodeIndex,
    ) -> NodeIndex {
        let id = self.next_auto_generate_id();
        self.create_node(NodeData::Identifier(IdentifierData {
            text: text.to_string(),
            auto_generate: Some(AutoGenerate { kind, id, flags, node }),
        }))
    }

    /// `_a`, `_b`, ... The caller hoists the declaration.
    pub fn create_temp_variable(&mut self) -> NodeIndex {
        self.create_generated_name(GeneratedIdentifierKind::Auto, "", GeneratedIdentifierFlags::NONE, NodeIndex::NONE)
    }

    /// `_i`, then `_a`, ... for loop counters.
    pub fn create_loop_variable(&mut self) -> NodeIndex {
        self.create_generated_name(GeneratedIdentifierKind::Loop, "", GeneratedIdentifierFlags::NONE, NodeIndex::NONE)
    }

    /// `text_1`, `text_2`, ... unique within the file.
    pub fn create_unique_name(&mut self, text: &str) -> NodeIndex {
        self.create_generated_name(GeneratedIdentifierKind::Unique, text, GeneratedIdentifierFlags::NONE, NodeIndex::NONE)
    }

    /// `text` itself when free, otherwise `text_1`, ...
    pub fn create_optimistic_unique_name(&mut self, text: &str) -> NodeIndex {
        self.create_generated_name(
            GeneratedIdentifierKind::Unique,
            text,
            GeneratedIdentifierFlags::OPTIMISTIC,
            NodeIndex::NONE,
        )
    }

    /// Like `create_optimistic_unique_name`, checked only against file-level names.
    pub fn create_file_level_unique_name(&mut self, text: &str) -> NodeIndex {
        self.create_generated_name(
            GeneratedIdentifierKind::Unique,
            text,
            GeneratedIdentifierFlags::OPTIMISTIC | GeneratedIdentifierFlags::FILE_LEVEL,
            NodeIndex::NONE,
        )
    }

    /// A name derived from `node` (its own name when that is free).
    pub fn get_generated_name_for_node(&mut self, node: NodeIndex) -> NodeIndex {
        let text = self.identifier_text(self.declaration_name_node(node)).to_string();
        let generated = self.create_generated_name(GeneratedIdentifierKind::Node, &text, GeneratedIdentifierFlags::NONE, node);
        if let Some(name) = self.get_mut(generated) {
            name.original = node;
        }
        generated
    }

    /// The `name` child of a declaration, or the node itself for identifiers.
    pub fn declaration_name_node(&self, node: NodeIndex) -> NodeIndex {
        match self.get(node).map(|n| &n.data) {
            Some(NodeData::Identifier(_)) => node,
            Some(data) => {
                if let Some(f) = data.as_function() {
                    return f.name;
                }
                if let Some(c) = data.as_class() {
                    return c.name;
                }
                match data {
                    NodeData::EnumDeclaration { name, .. }
                    | NodeData::ModuleDeclaration { name, .. }
                    | NodeData::VariableDeclaration { name, .. }
                    | NodeData::Parameter { name, .. }
                    | NodeData::PropertyDeclaration { name, .. }
                    | NodeData::ImportEqualsDeclaration { name, .. }
                    | NodeData::BindingElement { name, .. }
                    | NodeData::EnumMember { name, .. } => *name,
                    _ => NodeIndex::NONE,
                }
            }
            None => NodeIndex::NONE,
        }
    }

    /// Clone of a declaration's name for use as a reference.
    ///
    /// Comments and source maps of the name are suppressed unless allowed.
    /// Anonymous declarations get a generated name.
    pub fn get_declaration_name_with(
        &mut self,
        node: NodeIndex,
        allow_comments: bool,
        allow_source_maps: bool,
        extra: EmitFlags,
    ) -> EmitResult<NodeIndex> {
        let name = self.declaration_name_node(node);
        let name = if name.is_some() && self.is_kind(name, SyntaxKind::Identifier) && !self.is_generated_identifier(name) {
            let clone = self.get_mutable_clone(name)?;
            let mut flags = extra;
            if !allow_source_maps {
                flags |= EmitFlags::NO_SOURCE_MAP;
            }
            if !allow_comments {
                flags |= EmitFlags::NO_COMMENTS;
            }
            self.add_emit_flags(clone, flags);
            clone
        } else if name.is_some() && self.is_generated_identifier(name) {
            name
        } else {
            self.get_generated_name_for_node(node)
        };
        Ok(name)
    }

    pub fn get_declaration_name(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        self.get_declaration_name_with(node, false, false, EmitFlags::NONE)
    }

    /// The name of a declaration as seen from inside its own body.
    pub fn get_local_name(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        self.get_declaration_name_with(node, false, false, EmitFlags::LOCAL_NAME)
    }

    // =========================================================================
    // Literals and keywords
    // =========================================================================

    pub fn create_numeric_literal(&mut self, text: &str) -> NodeIndex {
        self.create_node(NodeData::NumericLiteral { text: text.to_string() })
    }

    pub fn create_number(&mut self, value: f64) -> NodeIndex {
        let text = format_js_number(value);
        self.create_numeric_literal(&text)
    }

    pub fn create_string_literal(&mut self, text: &str) -> NodeIndex {
        self.create_node(NodeData::StringLiteral {
            text: text.to_string(),
            single_quote: false,
        })
    }

    pub fn create_true(&mut self) -> NodeIndex {
        self.create_node(NodeData::TrueKeyword)
    }

    pub fn create_false(&mut self) -> NodeIndex {
        self.create_node(NodeData::FalseKeyword)
    }

    pub fn create_null(&mut self) -> NodeIndex {
        self.create_node(NodeData::NullKeyword)
    }

    pub fn create_this(&mut self) -> NodeIndex {
        self.create_node(NodeData::ThisKeyword)
    }

    pub fn create_super(&mut self) -> NodeIndex {
        self.create_node(NodeData::SuperKeyword)
    }

    pub fn create_omitted_expression(&mut self) -> NodeIndex {
        self.create_node(NodeData::OmittedExpression)
    }

    /// `void 0`
    pub fn create_void_zero(&mut self) -> NodeIndex {
        let zero = self.create_numeric_literal("0");
        self.create_void(zero)
    }

    pub fn create_computed_property_name(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ComputedPropertyName { expression })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn create_paren(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ParenthesizedExpression { expression })
    }

    pub fn create_property_access(&mut self, expression: NodeIndex, name: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::PropertyAccessExpression { expression, name })
    }

    pub fn create_property_access_str(&mut self, expression: NodeIndex, name: &str) -> NodeIndex {
        let name = self.create_identifier(name);
        self.create_property_access(expression, name)
    }

    pub fn create_element_access(&mut self, expression: NodeIndex, argument: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ElementAccessExpression { expression, argument })
    }

    pub fn create_call(&mut self, expression: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.create_node(NodeData::CallExpression {
            expression,
            type_arguments: None,
            arguments: NodeList::new(arguments),
        })
    }

    pub fn create_new(&mut self, expression: NodeIndex, arguments: Option<Vec<NodeIndex>>) -> NodeIndex {
        self.create_node(NodeData::NewExpression {
            expression,
            type_arguments: None,
            arguments: arguments.map(NodeList::new),
        })
    }

    pub fn create_array_literal(&mut self, elements: Vec<NodeIndex>, multi_line: bool) -> NodeIndex {
        self.create_node(NodeData::ArrayLiteralExpression {
            elements: NodeList::new(elements),
            multi_line,
        })
    }

    pub fn create_object_literal(&mut self, properties: Vec<NodeIndex>, multi_line: bool) -> NodeIndex {
        self.create_node(NodeData::ObjectLiteralExpression {
            properties: NodeList::new(properties),
            multi_line,
        })
    }

    pub fn create_property_assignment(&mut self, name: NodeIndex, initializer: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::PropertyAssignment { name, initializer })
    }

    pub fn create_property_assignment_str(&mut self, name: &str, initializer: NodeIndex) -> NodeIndex {
        let name = self.create_identifier(name);
        self.create_property_assignment(name, initializer)
    }

    pub fn create_function_expression(
        &mut self,
        name: NodeIndex,
        parameters: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> NodeIndex {
        self.create_node(NodeData::FunctionExpression(FunctionData {
            name,
            parameters: NodeList::new(parameters),
            body,
            ..FunctionData::default()
        }))
    }

    pub fn create_arrow_function(&mut self, parameters: Vec<NodeIndex>, body: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ArrowFunction(FunctionData {
            parameters: NodeList::new(parameters),
            body,
            ..FunctionData::default()
        }))
    }

    pub fn create_binary(&mut self, left: NodeIndex, operator: SyntaxKind, right: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::BinaryExpression { left, operator, right })
    }

    pub fn create_assignment(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::EqualsToken, right)
    }

    pub fn create_comma(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::CommaToken, right)
    }

    pub fn create_strict_equality(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::EqualsEqualsEqualsToken, right)
    }

    pub fn create_strict_inequality(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::ExclamationEqualsEqualsToken, right)
    }

    pub fn create_logical_and(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::AmpersandAmpersandToken, right)
    }

    pub fn create_logical_or(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::BarBarToken, right)
    }

    pub fn create_less_than(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::LessThanToken, right)
    }

    pub fn create_add(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::PlusToken, right)
    }

    pub fn create_subtract(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.create_binary(left, SyntaxKind::MinusToken, right)
    }

    /// Left fold of `expressions` with `,`. `None` when empty.
    pub fn inline_expressions(&mut self, expressions: &[NodeIndex]) -> Option<NodeIndex> {
        let (&first, rest) = expressions.split_first()?;
        Some(rest.iter().fold(first, |acc, &next| self.create_comma(acc, next)))
    }

    pub fn create_conditional(&mut self, condition: NodeIndex, when_true: NodeIndex, when_false: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ConditionalExpression {
            condition,
            when_true,
            when_false,
        })
    }

    pub fn create_prefix(&mut self, operator: SyntaxKind, operand: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::PrefixUnaryExpression { operator, operand })
    }

    pub fn create_postfix(&mut self, operand: NodeIndex, operator: SyntaxKind) -> NodeIndex {
        self.create_node(NodeData::PostfixUnaryExpression { operand, operator })
    }

    pub fn create_logical_not(&mut self, operand: NodeIndex) -> NodeIndex {
        self.create_prefix(SyntaxKind::ExclamationToken, operand)
    }

    pub fn create_typeof(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::TypeOfExpression { expression })
    }

    pub fn create_void(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::VoidExpression { expression })
    }

    pub fn create_spread(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::SpreadElement { expression })
    }

    /// Wraps an expression whose outer syntax was dropped, keeping `original` for trivia.
    pub fn create_partially_emitted(&mut self, expression: NodeIndex, original: NodeIndex) -> NodeIndex {
        let node = self.create_node(NodeData::PartiallyEmittedExpression { expression });
        self.set_original_and_range(node, original)
    }

    /// `typeof value === "tag"`
    pub fn create_type_check(&mut self, value: NodeIndex, tag: &str) -> NodeIndex {
        let type_of = self.create_typeof(value);
        let tag = self.create_string_literal(tag);
        self.create_strict_equality(type_of, tag)
    }

    /// `target.call(this_arg, ...arguments)`
    pub fn create_function_call(&mut self, target: NodeIndex, this_arg: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.create_property_access_str(target, "call");
        let mut args = Vec::with_capacity(arguments.len() + 1);
        args.push(this_arg);
        args.extend(arguments);
        self.create_call(callee, args)
    }

    /// `target.apply(this_arg, arguments_expression)`
    pub fn create_function_apply(&mut self, target: NodeIndex, this_arg: NodeIndex, arguments_expression: NodeIndex) -> NodeIndex {
        let callee = self.create_property_access_str(target, "apply");
        self.create_call(callee, vec![this_arg, arguments_expression])
    }

    /// `array.concat(values...)`
    pub fn create_array_concat(&mut self, array: NodeIndex, values: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.create_property_access_str(array, "concat");
        self.create_call(callee, values)
    }

    /// The runtime value of a property name: `"x"` for `x`, the expression for `[x]`.
    pub fn create_expression_for_property_name(&mut self, name: NodeIndex) -> EmitResult<NodeIndex> {
        let data = self.data(name)?.clone();
        let expr = match data {
            NodeData::Identifier(id) => {
                let literal = self.create_string_literal(&id.text);
                self.set_original_and_range(literal, name)
            }
            NodeData::StringLiteral { .. } | NodeData::NumericLiteral { .. } => self.get_synthesized_clone(name)?,
            NodeData::ComputedPropertyName { expression } => expression,
            other => {
                return Err(EmitError::UnexpectedNode {
                    kind: format!("{:?}", other.kind()),
                    pos: self.range(name).pos,
                    context: "property name",
                });
            }
        };
        Ok(expr)
    }

    /// `target.name` or `target[expr]` for a property name.
    pub fn create_member_access_for_property_name(&mut self, target: NodeIndex, member_name: NodeIndex) -> EmitResult<NodeIndex> {
        let access = match self.data(member_name)?.clone() {
            NodeData::Identifier(_) => {
                let name = self.get_synthesized_clone(member_name)?;
                self.create_property_access(target, name)
            }
            NodeData::ComputedPropertyName { expression } => self.create_element_access(target, expression),
            _ => {
                let key = self.get_synthesized_clone(member_name)?;
                self.create_element_access(target, key)
            }
        };
        Ok(self.set_original_and_range(access, member_name))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn create_block(&mut self, statements: Vec<NodeIndex>, multi_line: bool) -> NodeIndex {
        self.create_node(NodeData::Block {
            statements: NodeList::new(statements),
            multi_line,
        })
    }

    pub fn create_empty_statement(&mut self) -> NodeIndex {
        self.create_node(NodeData::EmptyStatement)
    }

    pub fn create_expression_statement(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ExpressionStatement { expression })
    }

    pub fn create_variable_declaration(&mut self, name: NodeIndex, initializer: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::VariableDeclaration {
            name,
            exclamation: false,
            type_node: NodeIndex::NONE,
            initializer,
        })
    }

    pub fn create_variable_declaration_list(&mut self, declarations: Vec<NodeIndex>, flags: NodeFlags) -> NodeIndex {
        self.create_node_with(
            NodeData::VariableDeclarationList {
                declarations: NodeList::new(declarations),
            },
            flags,
            ModifierFlags::NONE,
        )
    }

    /// `var a, b = ...;`
    pub fn create_variable_statement(&mut self, declarations: Vec<NodeIndex>) -> NodeIndex {
        let list = self.create_variable_declaration_list(declarations, NodeFlags::NONE);
        self.create_variable_statement_from_list(list, ModifierFlags::NONE)
    }

    pub fn create_variable_statement_from_list(&mut self, declaration_list: NodeIndex, modifiers: ModifierFlags) -> NodeIndex {
        self.create_node_with(NodeData::VariableStatement { declaration_list }, NodeFlags::NONE, modifiers)
    }

    pub fn create_if(&mut self, expression: NodeIndex, then_statement: NodeIndex, else_statement: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::IfStatement {
            expression,
            then_statement,
            else_statement,
        })
    }

    pub fn create_for(
        &mut self,
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    ) -> NodeIndex {
        self.create_node(NodeData::ForStatement {
            initializer,
            condition,
            incrementor,
            statement,
        })
    }

    pub fn create_while(&mut self, expression: NodeIndex, statement: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::WhileStatement { expression, statement })
    }

    pub fn create_return(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ReturnStatement { expression })
    }

    pub fn create_break(&mut self, label: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::BreakStatement { label })
    }

    pub fn create_continue(&mut self, label: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ContinueStatement { label })
    }

    pub fn create_throw(&mut self, expression: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::ThrowStatement { expression })
    }

    pub fn create_switch(&mut self, expression: NodeIndex, clauses: Vec<NodeIndex>) -> NodeIndex {
        let case_block = self.create_node(NodeData::CaseBlock {
            clauses: NodeList::new(clauses),
        });
        self.create_node(NodeData::SwitchStatement { expression, case_block })
    }

    pub fn create_case_clause(&mut self, expression: NodeIndex, statements: Vec<NodeIndex>) -> NodeIndex {
        self.create_node(NodeData::CaseClause {
            expression,
            statements: NodeList::new(statements),
        })
    }

    pub fn create_try(&mut self, try_block: NodeIndex, catch_clause: NodeIndex, finally_block: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::TryStatement {
            try_block,
            catch_clause,
            finally_block,
        })
    }

    pub fn create_catch_clause(&mut self, name: NodeIndex, block: NodeIndex) -> NodeIndex {
        let variable_declaration = if name.is_some() {
            self.create_variable_declaration(name, NodeIndex::NONE)
        } else {
            NodeIndex::NONE
        };
        self.create_node(NodeData::CatchClause {
            variable_declaration,
            block,
        })
    }

    pub fn create_function_declaration(
        &mut self,
        name: NodeIndex,
        parameters: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> NodeIndex {
        self.create_node(NodeData::FunctionDeclaration(FunctionData {
            name,
            parameters: NodeList::new(parameters),
            body,
            ..FunctionData::default()
        }))
    }

    pub fn create_parameter(&mut self, name: NodeIndex) -> NodeIndex {
        self.create_parameter_with(name, false, NodeIndex::NONE)
    }

    pub fn create_parameter_with(&mut self, name: NodeIndex, dot_dot_dot: bool, initializer: NodeIndex) -> NodeIndex {
        self.create_node(NodeData::Parameter {
            decorators: NodeList::default(),
            dot_dot_dot,
            name,
            question: false,
            type_node: NodeIndex::NONE,
            initializer,
        })
    }

    /// A statement that prints nothing but keeps the trivia of `original`.
    pub fn create_not_emitted_statement(&mut self, original: NodeIndex) -> NodeIndex {
        let node = self.create_node(NodeData::NotEmittedStatement);
        self.set_original_and_range(node, original)
    }
}

/// Number text the way a JavaScript engine would print it.
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == value.trunc() && value.abs() < 1e21 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}
