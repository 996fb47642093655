//! Type nodes. Only reached when printing declaration files; the JavaScript
//! transforms remove every type before printing.

use super::{ListFormat, Printer};
use crate::hooks::EmitHint;
use tsemit_ast::{EmitFlags, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::{EmitError, EmitResult};

impl<'a> Printer<'a> {
    pub(super) fn emit_type_parameters(&mut self, node: NodeIndex, type_parameters: Option<&NodeList>) -> EmitResult<()> {
        self.emit_list(node, type_parameters, ListFormat::TYPE_PARAMETERS)
    }

    pub(super) fn emit_type_arguments(&mut self, node: NodeIndex, type_arguments: Option<&NodeList>) -> EmitResult<()> {
        self.emit_list(node, type_arguments, ListFormat::TYPE_ARGUMENTS)
    }

    pub(super) fn emit_type_parameter(&mut self, name: NodeIndex, constraint: NodeIndex, default: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, name)?;
        if constraint.is_some() {
            self.write_space();
            self.write_keyword("extends");
            self.write_space();
            self.print(EmitHint::Unspecified, constraint)?;
        }
        if default.is_some() {
            self.write_space();
            self.write_operator("=");
            self.write_space();
            self.print(EmitHint::Unspecified, default)?;
        }
        Ok(())
    }

    pub(super) fn emit_keyword_type(&mut self, keyword: SyntaxKind) -> EmitResult<()> {
        let text = keyword
            .token_text()
            .ok_or_else(|| EmitError::internal(format!("no text for type keyword {keyword:?}")))?;
        self.write_keyword(text);
        Ok(())
    }

    pub(super) fn emit_type_reference(
        &mut self,
        node: NodeIndex,
        type_name: NodeIndex,
        type_arguments: Option<&NodeList>,
    ) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, type_name)?;
        self.emit_type_arguments(node, type_arguments)
    }

    /// `(a: T) => U` or `new (a: T) => U`.
    pub(super) fn emit_function_type(
        &mut self,
        node: NodeIndex,
        is_constructor: bool,
        type_parameters: Option<&NodeList>,
        parameters: &NodeList,
        type_node: NodeIndex,
    ) -> EmitResult<()> {
        if is_constructor {
            self.write_keyword("new");
            self.write_space();
        }
        self.emit_type_parameters(node, type_parameters)?;
        self.emit_parameters(node, parameters)?;
        self.write_space();
        self.write_punctuation("=>");
        self.write_space();
        self.print(EmitHint::Unspecified, type_node)
    }

    pub(super) fn emit_type_query(&mut self, expr_name: NodeIndex) -> EmitResult<()> {
        self.write_keyword("typeof");
        self.write_space();
        self.print(EmitHint::Unspecified, expr_name)
    }

    pub(super) fn emit_type_literal(&mut self, node: NodeIndex, members: &NodeList) -> EmitResult<()> {
        self.write_punctuation("{");
        let format = if self.arena.emit_flags(node).contains(EmitFlags::SINGLE_LINE) {
            ListFormat::SINGLE_LINE_TYPE_LITERAL_MEMBERS
        } else {
            ListFormat::MULTI_LINE_TYPE_LITERAL_MEMBERS
        };
        self.emit_list(node, Some(members), format | ListFormat::NO_SPACE_IF_EMPTY)?;
        self.write_punctuation("}");
        Ok(())
    }

    pub(super) fn emit_array_type(&mut self, element_type: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, element_type)?;
        self.write_punctuation("[]");
        Ok(())
    }

    pub(super) fn emit_tuple_type(&mut self, node: NodeIndex, element_types: &NodeList) -> EmitResult<()> {
        self.write_punctuation("[");
        self.emit_list(node, Some(element_types), ListFormat::TUPLE_TYPE_ELEMENTS)?;
        self.write_punctuation("]");
        Ok(())
    }

    pub(super) fn emit_parenthesized_type(&mut self, type_node: NodeIndex) -> EmitResult<()> {
        self.write_punctuation("(");
        self.print(EmitHint::Unspecified, type_node)?;
        self.write_punctuation(")");
        Ok(())
    }

    /// `keyof T`, `unique symbol`, `readonly T[]`.
    pub(super) fn emit_type_operator(&mut self, operator: SyntaxKind, type_node: NodeIndex) -> EmitResult<()> {
        let text = operator
            .token_text()
            .ok_or_else(|| EmitError::internal(format!("no text for type operator {operator:?}")))?;
        self.write_keyword(text);
        self.write_space();
        self.print(EmitHint::Unspecified, type_node)
    }
}
