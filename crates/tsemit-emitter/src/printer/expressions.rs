//! Expression emitters.

use super::{ListFormat, Printer};
use crate::hooks::EmitHint;
use crate::resolver::{ConstantValue, resolver_key};
use tsemit_ast::{EmitFlags, NodeData, NodeIndex, NodeList, SyntaxKind, TextRange};
use tsemit_common::{EmitResult, NO_POS, ScriptTarget};

impl<'a> Printer<'a> {
    // =========================================================================
    // Names
    // =========================================================================

    pub(super) fn emit_qualified_name(&mut self, left: NodeIndex, right: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, left)?;
        self.write_punctuation(".");
        self.print(EmitHint::Unspecified, right)
    }

    pub(super) fn emit_computed_property_name(&mut self, expression: NodeIndex) -> EmitResult<()> {
        self.write_punctuation("[");
        self.print_expression(expression)?;
        self.write_punctuation("]");
        Ok(())
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub(super) fn emit_array_literal(&mut self, node: NodeIndex, elements: &NodeList, multi_line: bool) -> EmitResult<()> {
        let prefer_new_line = if multi_line {
            ListFormat::PREFER_NEW_LINE
        } else {
            ListFormat::NONE
        };
        self.emit_expression_list(
            node,
            Some(elements),
            ListFormat::ARRAY_LITERAL_EXPRESSION_ELEMENTS | prefer_new_line,
        )
    }

    pub(super) fn emit_object_literal(&mut self, node: NodeIndex, properties: &NodeList, multi_line: bool) -> EmitResult<()> {
        for property in properties.iter() {
            self.generate_member_names(property)?;
        }
        let indented = self.arena.emit_flags(node).contains(EmitFlags::INDENTED);
        if indented {
            self.increase_indent();
        }
        let mut format = ListFormat::OBJECT_LITERAL_EXPRESSION_PROPERTIES;
        if multi_line {
            format |= ListFormat::PREFER_NEW_LINE;
        }
        if self.options.target >= ScriptTarget::ES5 {
            format |= ListFormat::ALLOW_TRAILING_COMMA;
        }
        let result = self.emit_list(node, Some(properties), format);
        if indented {
            self.decrease_indent();
        }
        result
    }

    pub(super) fn emit_property_assignment(&mut self, name: NodeIndex, initializer: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, name)?;
        self.write_punctuation(":");
        self.write_space();
        // `{ id: /*c*/ f }`: the comment trails the colon, not the initializer.
        if !self
            .arena
            .emit_flags(initializer)
            .contains(EmitFlags::NO_LEADING_COMMENTS)
        {
            let pos = self.arena.comment_range(initializer).pos;
            self.emit_trailing_comments_of_position(pos, false);
        }
        self.print_expression(initializer)
    }

    pub(super) fn emit_shorthand_property_assignment(&mut self, name: NodeIndex, initializer: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, name)?;
        if initializer.is_some() {
            self.write_space();
            self.write_punctuation("=");
            self.write_space();
            self.print_expression(initializer)?;
        }
        Ok(())
    }

    // =========================================================================
    // Member access and calls
    // =========================================================================

    pub(super) fn emit_property_access(&mut self, node: NodeIndex, expression: NodeIndex, name: NodeIndex) -> EmitResult<()> {
        let mut indent_before_dot = false;
        let mut indent_after_dot = false;
        if !self.arena.emit_flags(node).contains(EmitFlags::NO_INDENTATION) {
            let dot = self.token_range_after(expression, ".");
            indent_before_dot = self.needs_indentation(node, self.arena.range(expression), dot, false);
            indent_after_dot =
                self.needs_indentation(node, dot, self.arena.range(name), self.arena.starts_on_new_line(name));
        }

        self.print_expression(expression)?;
        self.increase_indent_if(indent_before_dot, None);
        let dot_text = if !indent_before_dot && self.needs_dot_dot(expression) {
            ".."
        } else {
            "."
        };
        let dot_pos = self.arena.range(expression).end;
        self.emit_token_with_comment(dot_text, dot_pos, node, false);
        self.increase_indent_if(indent_after_dot, None);
        self.print(EmitHint::IdentifierName, name)?;
        self.decrease_indent_if(indent_before_dot, indent_after_dot);
        Ok(())
    }

    /// `1..toString()`: an integer literal needs a second dot so the first
    /// one is not read as a decimal point.
    fn needs_dot_dot(&self, expression: NodeIndex) -> bool {
        let expression = self.arena.skip_partially_emitted(expression);
        match self.arena.get(expression).map(|n| &n.data) {
            Some(NodeData::NumericLiteral { text }) => {
                let source = tsemit_ast::utilities::get_text_of_node(self.arena, &self.source_text, expression);
                let text = if source.is_empty() { text.as_str() } else { source };
                !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
            }
            Some(NodeData::PropertyAccessExpression { .. } | NodeData::ElementAccessExpression { .. }) => {
                // A constant enum access is printed as its value; without the
                // trailing `/* A.B */` comment nothing separates the dot.
                self.options.remove_comments
                    && matches!(
                        self.resolver.get_constant_value(resolver_key(self.arena, expression)),
                        Some(ConstantValue::Number(value)) if value.is_finite() && value.fract() == 0.0
                    )
            }
            _ => false,
        }
    }

    pub(super) fn emit_element_access(&mut self, node: NodeIndex, expression: NodeIndex, argument: NodeIndex) -> EmitResult<()> {
        self.print_expression(expression)?;
        let expression_end = self.arena.range(expression).end;
        self.emit_token_with_comment("[", expression_end, node, false);
        self.print_expression(argument)?;
        let argument_end = self.arena.range(argument).end;
        self.emit_token_with_comment("]", argument_end, node, false);
        Ok(())
    }

    pub(super) fn emit_call(
        &mut self,
        node: NodeIndex,
        expression: NodeIndex,
        type_arguments: Option<&NodeList>,
        arguments: &NodeList,
    ) -> EmitResult<()> {
        self.print_expression(expression)?;
        self.emit_type_arguments(node, type_arguments)?;
        self.emit_expression_list(node, Some(arguments), ListFormat::CALL_EXPRESSION_ARGUMENTS)
    }

    pub(super) fn emit_new(
        &mut self,
        node: NodeIndex,
        expression: NodeIndex,
        type_arguments: Option<&NodeList>,
        arguments: Option<&NodeList>,
    ) -> EmitResult<()> {
        self.emit_token_with_comment("new", self.arena.range(node).pos, node, false);
        self.write_space();
        self.print_expression(expression)?;
        self.emit_type_arguments(node, type_arguments)?;
        self.emit_expression_list(node, arguments, ListFormat::NEW_EXPRESSION_ARGUMENTS)
    }

    pub(super) fn emit_tagged_template(
        &mut self,
        node: NodeIndex,
        tag: NodeIndex,
        type_arguments: Option<&NodeList>,
        template: NodeIndex,
    ) -> EmitResult<()> {
        self.print_expression(tag)?;
        self.emit_type_arguments(node, type_arguments)?;
        self.write_space();
        self.print_expression(template)
    }

    pub(super) fn emit_meta_property(&mut self, keyword: SyntaxKind, name: NodeIndex) -> EmitResult<()> {
        self.write_keyword(keyword.token_text().unwrap_or("new"));
        self.write_punctuation(".");
        self.print(EmitHint::IdentifierName, name)
    }

    // =========================================================================
    // Type syntax inside expressions
    // =========================================================================

    pub(super) fn emit_type_assertion(&mut self, type_node: NodeIndex, expression: NodeIndex) -> EmitResult<()> {
        self.write_punctuation("<");
        self.print(EmitHint::Unspecified, type_node)?;
        self.write_punctuation(">");
        self.print_expression(expression)
    }

    pub(super) fn emit_as_expression(&mut self, expression: NodeIndex, type_node: NodeIndex) -> EmitResult<()> {
        self.print_expression(expression)?;
        if type_node.is_some() {
            self.write_space();
            self.write_keyword("as");
            self.write_space();
            self.print(EmitHint::Unspecified, type_node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Operators
    // =========================================================================

    pub(super) fn emit_parenthesized_expression(&mut self, node: NodeIndex, expression: NodeIndex) -> EmitResult<()> {
        let open_end = self.emit_token_with_comment("(", self.arena.range(node).pos, node, false);
        self.print_expression(expression)?;
        let expression_end = self.arena.range(expression).end;
        let close_pos = if expression_end == NO_POS { open_end } else { expression_end };
        self.emit_token_with_comment(")", close_pos, node, false);
        Ok(())
    }

    /// `delete x`, `typeof x`, `void x`.
    pub(super) fn emit_keyword_unary(&mut self, node: NodeIndex, keyword: &str, expression: NodeIndex) -> EmitResult<()> {
        self.emit_token_with_comment(keyword, self.arena.range(node).pos, node, false);
        self.write_space();
        self.print_expression(expression)
    }

    pub(super) fn emit_prefix_unary(&mut self, operator: SyntaxKind, operand: NodeIndex) -> EmitResult<()> {
        self.write_operator(operator.token_text().unwrap_or_default());
        // `+ +x` and `- --x` must not fuse into `++x` and `---x`.
        if let Some(NodeData::PrefixUnaryExpression { operator: inner, .. }) = self.arena.get(operand).map(|n| &n.data) {
            let fuses = matches!(
                (operator, *inner),
                (SyntaxKind::PlusToken, SyntaxKind::PlusToken | SyntaxKind::PlusPlusToken)
                    | (SyntaxKind::MinusToken, SyntaxKind::MinusToken | SyntaxKind::MinusMinusToken)
            );
            if fuses {
                self.write_space();
            }
        }
        self.print_expression(operand)
    }

    pub(super) fn emit_postfix_unary(&mut self, operand: NodeIndex, operator: SyntaxKind) -> EmitResult<()> {
        self.print_expression(operand)?;
        self.write_operator(operator.token_text().unwrap_or_default());
        Ok(())
    }

    pub(super) fn emit_binary(
        &mut self,
        node: NodeIndex,
        left: NodeIndex,
        operator: SyntaxKind,
        right: NodeIndex,
    ) -> EmitResult<()> {
        let operator_text = operator.token_text().unwrap_or_default();
        let operator_range = self.token_range_after(left, operator_text);
        let indent_before = self.needs_indentation(node, self.arena.range(left), operator_range, false);
        let indent_after = self.needs_indentation(
            node,
            operator_range,
            self.arena.range(right),
            self.arena.starts_on_new_line(right),
        );
        let is_comma = operator == SyntaxKind::CommaToken;

        self.print_expression(left)?;
        self.increase_indent_if(indent_before, if is_comma { None } else { Some(" ") });
        let operator_pos = if operator_range.is_synthesized() {
            NO_POS
        } else {
            self.token_start(operator_range.pos)
        };
        self.write_token_text(operator_text, operator_pos);
        self.increase_indent_if(indent_after, Some(" "));
        self.print_expression(right)?;
        self.decrease_indent_if(indent_before, indent_after);
        Ok(())
    }

    pub(super) fn emit_conditional(
        &mut self,
        node: NodeIndex,
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    ) -> EmitResult<()> {
        let question = self.token_range_after(condition, "?");
        let colon = self.token_range_after(when_true, ":");
        let indent_before_question = self.needs_indentation(node, self.arena.range(condition), question, false);
        let indent_after_question = self.needs_indentation(
            node,
            question,
            self.arena.range(when_true),
            self.arena.starts_on_new_line(when_true),
        );
        let indent_before_colon = self.needs_indentation(node, self.arena.range(when_true), colon, false);
        let indent_after_colon = self.needs_indentation(
            node,
            colon,
            self.arena.range(when_false),
            self.arena.starts_on_new_line(when_false),
        );

        self.print_expression(condition)?;
        self.increase_indent_if(indent_before_question, Some(" "));
        self.write_punctuation("?");
        self.increase_indent_if(indent_after_question, Some(" "));
        self.print_expression(when_true)?;
        self.decrease_indent_if(indent_before_question, indent_after_question);

        self.increase_indent_if(indent_before_colon, Some(" "));
        self.write_punctuation(":");
        self.increase_indent_if(indent_after_colon, Some(" "));
        self.print_expression(when_false)?;
        self.decrease_indent_if(indent_before_colon, indent_after_colon);
        Ok(())
    }

    // =========================================================================
    // Line breaks inside expressions
    // =========================================================================

    /// Source range of `token` following `node`: from the node end (with
    /// trivia) to the end of the token.
    fn token_range_after(&self, node: NodeIndex, token: &str) -> TextRange {
        let end = self.arena.range(node).end;
        if end == NO_POS {
            return TextRange::NONE;
        }
        let start = self.token_start(end);
        TextRange::new(end, start + token.len() as u32)
    }

    /// Whether the source breaks the line between `first` and `second`
    /// (or `second` was explicitly moved to a new line).
    pub(super) fn needs_indentation(
        &self,
        parent: NodeIndex,
        first: TextRange,
        second: TextRange,
        second_starts_on_new_line: bool,
    ) -> bool {
        if second_starts_on_new_line {
            return true;
        }
        !self.arena.range(parent).is_synthesized()
            && !first.is_synthesized()
            && !second.is_synthesized()
            && self.line_of(first.end) != self.line_of(self.token_start(second.pos))
    }
}
