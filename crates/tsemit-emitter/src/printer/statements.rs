//! Statement emitters.

use super::{ListFormat, Printer};
use crate::hooks::EmitHint;
use tsemit_ast::{EmitFlags, NodeFlags, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::EmitResult;

impl<'a> Printer<'a> {
    // =========================================================================
    // Blocks
    // =========================================================================

    pub(super) fn emit_block(&mut self, node: NodeIndex, statements: &NodeList, multi_line: bool) -> EmitResult<()> {
        let force_single_line = !multi_line && statements.is_empty();
        self.emit_token_with_comment("{", self.arena.range(node).pos, node, false);
        let format = if force_single_line || self.arena.emit_flags(node).contains(EmitFlags::SINGLE_LINE) {
            ListFormat::SINGLE_LINE_BLOCK_STATEMENTS
        } else {
            ListFormat::MULTI_LINE_BLOCK_STATEMENTS
        };
        self.emit_list(node, Some(statements), format)?;
        self.emit_token_with_comment("}", statements.end, node, format.contains(ListFormat::MULTI_LINE));
        Ok(())
    }

    /// Body of `if`, loops and `else`: a block stays on the same line,
    /// anything else moves to an indented line of its own.
    pub(super) fn emit_embedded_statement(&mut self, parent: NodeIndex, statement: NodeIndex) -> EmitResult<()> {
        let is_block = self.arena.is_kind(statement, SyntaxKind::Block);
        if is_block || self.arena.emit_flags(parent).contains(EmitFlags::SINGLE_LINE) {
            self.write_space();
            self.print(EmitHint::Unspecified, statement)
        } else {
            self.write_line();
            self.increase_indent();
            let result = self.print(EmitHint::Unspecified, statement);
            self.decrease_indent();
            result
        }
    }

    // =========================================================================
    // Simple statements
    // =========================================================================

    pub(super) fn emit_variable_statement(&mut self, node: NodeIndex, declaration_list: NodeIndex) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.print(EmitHint::Unspecified, declaration_list)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_variable_declaration_list(&mut self, node: NodeIndex, declarations: &NodeList) -> EmitResult<()> {
        let flags = self.arena.node_flags(node);
        let keyword = if flags.contains(NodeFlags::LET) {
            "let"
        } else if flags.contains(NodeFlags::CONST) {
            "const"
        } else {
            "var"
        };
        self.write_keyword(keyword);
        self.write_space();
        self.emit_list(node, Some(declarations), ListFormat::VARIABLE_DECLARATION_LIST)
    }

    pub(super) fn emit_variable_declaration(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        type_node: NodeIndex,
        initializer: NodeIndex,
    ) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, name)?;
        self.emit_type_annotation(type_node)?;
        let equals_pos = if type_node.is_some() {
            self.arena.range(type_node).end
        } else {
            self.arena.range(name).end
        };
        self.emit_initializer(node, initializer, equals_pos)
    }

    /// ` = initializer`, with comments around the `=` when `container` was parsed.
    pub(super) fn emit_initializer(&mut self, container: NodeIndex, initializer: NodeIndex, equals_pos: u32) -> EmitResult<()> {
        if initializer.is_none() {
            return Ok(());
        }
        self.write_space();
        self.emit_token_with_comment("=", equals_pos, container, false);
        self.write_space();
        self.print_expression(initializer)
    }

    /// `return x;` and `throw x;`.
    pub(super) fn emit_keyword_statement(&mut self, node: NodeIndex, keyword: &str, expression: NodeIndex) -> EmitResult<()> {
        self.emit_token_with_comment(keyword, self.arena.range(node).pos, node, false);
        if expression.is_some() {
            self.write_space();
            self.print_expression(expression)?;
        }
        self.write_trailing_semicolon();
        Ok(())
    }

    /// `break label;` and `continue label;`.
    pub(super) fn emit_jump(&mut self, node: NodeIndex, keyword: &str, label: NodeIndex) -> EmitResult<()> {
        self.emit_token_with_comment(keyword, self.arena.range(node).pos, node, false);
        if label.is_some() {
            self.write_space();
            self.print(EmitHint::Unspecified, label)?;
        }
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_labeled_statement(&mut self, node: NodeIndex, label: NodeIndex, statement: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, label)?;
        let label_end = self.arena.range(label).end;
        self.emit_token_with_comment(":", label_end, node, false);
        self.write_space();
        self.print(EmitHint::Unspecified, statement)
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    pub(super) fn emit_if_statement(
        &mut self,
        node: NodeIndex,
        expression: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_keyword_and_condition(node, "if", self.arena.range(node).pos, expression)?;
        self.emit_embedded_statement(node, then_statement)?;
        if else_statement.is_some() {
            self.write_line_or_space(node);
            let then_end = self.arena.range(then_statement).end;
            self.emit_token_with_comment("else", then_end, node, false);
            if self.arena.is_kind(else_statement, SyntaxKind::IfStatement) {
                self.write_space();
                self.print(EmitHint::Unspecified, else_statement)?;
            } else {
                self.emit_embedded_statement(node, else_statement)?;
            }
        }
        Ok(())
    }

    /// `keyword (expression)` with the parentheses as tokens.
    fn emit_keyword_and_condition(
        &mut self,
        node: NodeIndex,
        keyword: &str,
        keyword_pos: u32,
        expression: NodeIndex,
    ) -> EmitResult<()> {
        let open_paren_pos = self.emit_token_with_comment(keyword, keyword_pos, node, false);
        self.write_space();
        self.emit_token_with_comment("(", open_paren_pos, node, false);
        self.print_expression(expression)?;
        let expression_end = self.arena.range(expression).end;
        self.emit_token_with_comment(")", expression_end, node, false);
        Ok(())
    }

    pub(super) fn emit_while_clause(&mut self, node: NodeIndex, expression: NodeIndex, start_pos: u32) -> EmitResult<()> {
        self.emit_keyword_and_condition(node, "while", start_pos, expression)
    }

    pub(super) fn emit_do_statement(&mut self, node: NodeIndex, statement: NodeIndex, expression: NodeIndex) -> EmitResult<()> {
        self.emit_token_with_comment("do", self.arena.range(node).pos, node, false);
        self.emit_embedded_statement(node, statement)?;
        if self.arena.is_kind(statement, SyntaxKind::Block) {
            self.write_space();
        } else {
            self.write_line_or_space(node);
        }
        let statement_end = self.arena.range(statement).end;
        self.emit_while_clause(node, expression, statement_end)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_for_statement(
        &mut self,
        node: NodeIndex,
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    ) -> EmitResult<()> {
        let open_paren_pos = self.emit_token_with_comment("for", self.arena.range(node).pos, node, false);
        self.write_space();
        let mut pos = self.emit_token_with_comment("(", open_paren_pos, node, false);
        self.emit_for_binding(initializer)?;
        pos = self.emit_token_with_comment(";", self.end_or(initializer, pos), node, false);
        self.emit_expression_with_leading_space(condition)?;
        pos = self.emit_token_with_comment(";", self.end_or(condition, pos), node, false);
        self.emit_expression_with_leading_space(incrementor)?;
        self.emit_token_with_comment(")", self.end_or(incrementor, pos), node, false);
        self.emit_embedded_statement(node, statement)
    }

    pub(super) fn emit_for_in_or_of(
        &mut self,
        node: NodeIndex,
        keyword: &str,
        initializer: NodeIndex,
        expression: NodeIndex,
        statement: NodeIndex,
    ) -> EmitResult<()> {
        let open_paren_pos = self.emit_token_with_comment("for", self.arena.range(node).pos, node, false);
        self.write_space();
        self.emit_token_with_comment("(", open_paren_pos, node, false);
        self.emit_for_binding(initializer)?;
        self.write_space();
        let initializer_end = self.arena.range(initializer).end;
        self.emit_token_with_comment(keyword, initializer_end, node, false);
        self.write_space();
        self.print_expression(expression)?;
        let expression_end = self.arena.range(expression).end;
        self.emit_token_with_comment(")", expression_end, node, false);
        self.emit_embedded_statement(node, statement)
    }

    fn emit_for_binding(&mut self, node: NodeIndex) -> EmitResult<()> {
        if self.arena.is_kind(node, SyntaxKind::VariableDeclarationList) {
            self.print(EmitHint::Unspecified, node)
        } else {
            self.print_expression(node)
        }
    }

    fn emit_expression_with_leading_space(&mut self, node: NodeIndex) -> EmitResult<()> {
        if node.is_some() {
            self.write_space();
            self.print_expression(node)?;
        }
        Ok(())
    }

    /// End of `node`, or `fallback` when it is absent.
    fn end_or(&self, node: NodeIndex, fallback: u32) -> u32 {
        if node.is_some() {
            self.arena.range(node).end
        } else {
            fallback
        }
    }

    // =========================================================================
    // switch
    // =========================================================================

    pub(super) fn emit_switch_statement(&mut self, node: NodeIndex, expression: NodeIndex, case_block: NodeIndex) -> EmitResult<()> {
        self.emit_keyword_and_condition(node, "switch", self.arena.range(node).pos, expression)?;
        self.write_space();
        self.print(EmitHint::Unspecified, case_block)
    }

    pub(super) fn emit_case_block(&mut self, node: NodeIndex, clauses: &NodeList) -> EmitResult<()> {
        self.emit_token_with_comment("{", self.arena.range(node).pos, node, false);
        self.emit_list(node, Some(clauses), ListFormat::CASE_BLOCK_CLAUSES)?;
        self.emit_token_with_comment("}", clauses.end, node, true);
        Ok(())
    }

    pub(super) fn emit_case_clause(&mut self, node: NodeIndex, expression: NodeIndex, statements: &NodeList) -> EmitResult<()> {
        self.emit_token_with_comment("case", self.arena.range(node).pos, node, false);
        self.write_space();
        self.print_expression(expression)?;
        let colon_pos = self.arena.range(expression).end;
        self.emit_case_or_default_clause_rest(node, statements, colon_pos)
    }

    pub(super) fn emit_default_clause(&mut self, node: NodeIndex, statements: &NodeList) -> EmitResult<()> {
        let colon_pos = self.emit_token_with_comment("default", self.arena.range(node).pos, node, false);
        self.emit_case_or_default_clause_rest(node, statements, colon_pos)
    }

    /// `: statements`. A lone statement on the clause's own line stays there.
    fn emit_case_or_default_clause_rest(&mut self, node: NodeIndex, statements: &NodeList, colon_pos: u32) -> EmitResult<()> {
        let single_statement = statements.len() == 1 && {
            let parent_range = self.arena.range(node);
            let statement_range = self.arena.range(statements.nodes[0]);
            parent_range.is_synthesized()
                || statement_range.is_synthesized()
                || self.line_of(self.token_start(parent_range.pos)) == self.line_of(self.token_start(statement_range.pos))
        };
        let mut format = ListFormat::CASE_OR_DEFAULT_CLAUSE_STATEMENTS;
        if single_statement {
            self.write_token(":", colon_pos, node);
            self.write_space();
            format.remove(ListFormat::MULTI_LINE | ListFormat::INDENTED);
        } else {
            self.emit_token_with_comment(":", colon_pos, node, false);
        }
        self.emit_list(node, Some(statements), format)
    }

    // =========================================================================
    // try
    // =========================================================================

    pub(super) fn emit_try_statement(
        &mut self,
        node: NodeIndex,
        try_block: NodeIndex,
        catch_clause: NodeIndex,
        finally_block: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_token_with_comment("try", self.arena.range(node).pos, node, false);
        self.write_space();
        self.print(EmitHint::Unspecified, try_block)?;
        if catch_clause.is_some() {
            self.write_line_or_space(node);
            self.print(EmitHint::Unspecified, catch_clause)?;
        }
        if finally_block.is_some() {
            self.write_line_or_space(node);
            let before = if catch_clause.is_some() { catch_clause } else { try_block };
            let before_end = self.arena.range(before).end;
            self.emit_token_with_comment("finally", before_end, node, false);
            self.write_space();
            self.print(EmitHint::Unspecified, finally_block)?;
        }
        Ok(())
    }

    pub(super) fn emit_catch_clause(&mut self, node: NodeIndex, variable_declaration: NodeIndex, block: NodeIndex) -> EmitResult<()> {
        let open_paren_pos = self.emit_token_with_comment("catch", self.arena.range(node).pos, node, false);
        self.write_space();
        if variable_declaration.is_some() {
            self.emit_token_with_comment("(", open_paren_pos, node, false);
            self.print(EmitHint::Unspecified, variable_declaration)?;
            let declaration_end = self.arena.range(variable_declaration).end;
            self.emit_token_with_comment(")", declaration_end, node, false);
            self.write_space();
        }
        self.print(EmitHint::Unspecified, block)
    }

    /// `: type` when a type annotation is present.
    pub(super) fn emit_type_annotation(&mut self, type_node: NodeIndex) -> EmitResult<()> {
        if type_node.is_none() {
            return Ok(());
        }
        self.write_punctuation(":");
        self.write_space();
        self.print(EmitHint::Unspecified, type_node)
    }
}
