//! Declarations, class members, signatures and module syntax.

use super::{ListFormat, Printer};
use crate::hooks::EmitHint;
use tsemit_ast::{ClassData, EmitFlags, FunctionData, ModifierFlags, NodeData, NodeFlags, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::EmitResult;

/// Modifier keywords in the order they are written.
const MODIFIER_KEYWORDS: &[(ModifierFlags, &str)] = &[
    (ModifierFlags::EXPORT, "export"),
    (ModifierFlags::DEFAULT, "default"),
    (ModifierFlags::AMBIENT, "declare"),
    (ModifierFlags::PUBLIC, "public"),
    (ModifierFlags::PRIVATE, "private"),
    (ModifierFlags::PROTECTED, "protected"),
    (ModifierFlags::STATIC, "static"),
    (ModifierFlags::ABSTRACT, "abstract"),
    (ModifierFlags::READONLY, "readonly"),
    (ModifierFlags::ASYNC, "async"),
    (ModifierFlags::CONST, "const"),
];

impl<'a> Printer<'a> {
    // =========================================================================
    // Modifiers and decorators
    // =========================================================================

    pub(super) fn emit_modifiers(&mut self, node: NodeIndex) {
        let modifiers = self.arena.modifiers(node);
        for &(flag, keyword) in MODIFIER_KEYWORDS {
            if modifiers.contains(flag) {
                self.write_keyword(keyword);
                self.write_space();
            }
        }
    }

    pub(super) fn emit_decorators(&mut self, node: NodeIndex, decorators: &NodeList) -> EmitResult<()> {
        if decorators.is_empty() {
            return Ok(());
        }
        self.emit_list(node, Some(decorators), ListFormat::DECORATORS)
    }

    pub(super) fn emit_decorator(&mut self, expression: NodeIndex) -> EmitResult<()> {
        self.write_punctuation("@");
        self.print_expression(expression)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    pub(super) fn emit_function_declaration_or_expression(&mut self, node: NodeIndex, f: &FunctionData) -> EmitResult<()> {
        self.emit_decorators(node, &f.decorators)?;
        self.emit_modifiers(node);
        self.write_keyword("function");
        if f.asterisk {
            self.write_punctuation("*");
        }
        self.write_space();
        self.print(EmitHint::Unspecified, f.name)?;
        self.emit_signature_and_body(node, f, false)
    }

    pub(super) fn emit_arrow_function(&mut self, node: NodeIndex, f: &FunctionData) -> EmitResult<()> {
        self.emit_decorators(node, &f.decorators)?;
        self.emit_modifiers(node);
        self.emit_signature_and_body(node, f, true)
    }

    pub(super) fn emit_method_declaration(&mut self, node: NodeIndex, f: &FunctionData) -> EmitResult<()> {
        self.emit_decorators(node, &f.decorators)?;
        self.emit_modifiers(node);
        if f.asterisk {
            self.write_punctuation("*");
        }
        self.print(EmitHint::Unspecified, f.name)?;
        if f.question {
            self.write_punctuation("?");
        }
        self.emit_signature_and_body(node, f, false)
    }

    pub(super) fn emit_constructor(&mut self, node: NodeIndex, f: &FunctionData) -> EmitResult<()> {
        self.emit_decorators(node, &f.decorators)?;
        self.emit_modifiers(node);
        self.write_keyword("constructor");
        self.emit_signature_and_body(node, f, false)
    }

    pub(super) fn emit_accessor(&mut self, node: NodeIndex, keyword: &str, f: &FunctionData) -> EmitResult<()> {
        self.emit_decorators(node, &f.decorators)?;
        self.emit_modifiers(node);
        self.write_keyword(keyword);
        self.write_space();
        self.print(EmitHint::Unspecified, f.name)?;
        self.emit_signature_and_body(node, f, false)
    }

    /// Parameters, return type and body. Block bodies open a new scope for
    /// generated names.
    fn emit_signature_and_body(&mut self, node: NodeIndex, f: &FunctionData, arrow: bool) -> EmitResult<()> {
        let body = f.body;
        if body.is_none() {
            self.emit_signature_head(node, f, arrow)?;
            self.write_trailing_semicolon();
            return Ok(());
        }
        if !self.arena.is_kind(body, SyntaxKind::Block) {
            self.emit_signature_head(node, f, arrow)?;
            self.write_space();
            return self.print_expression(body);
        }

        let indented = self.arena.emit_flags(node).contains(EmitFlags::INDENTED);
        if indented {
            self.increase_indent();
        }
        let pushed = self.push_name_generation_scope(node);
        let result = self.emit_scoped_signature_and_block(node, f, arrow);
        self.pop_name_generation_scope(pushed);
        if indented {
            self.decrease_indent();
        }
        result
    }

    fn emit_scoped_signature_and_block(&mut self, node: NodeIndex, f: &FunctionData, arrow: bool) -> EmitResult<()> {
        for parameter in f.parameters.iter() {
            self.generate_names(parameter)?;
        }
        self.generate_names(f.body)?;
        self.emit_signature_head(node, f, arrow)?;
        let body = f.body;
        self.emit_with_notification(EmitHint::Unspecified, body, |printer| printer.emit_block_function_body(body))
    }

    fn emit_signature_head(&mut self, node: NodeIndex, f: &FunctionData, arrow: bool) -> EmitResult<()> {
        self.emit_type_parameters(node, f.type_parameters.as_ref())?;
        if arrow && self.can_emit_simple_arrow_head(node, f) {
            self.emit_list(node, Some(&f.parameters), ListFormat::PARAMETERS - ListFormat::PARENTHESIS)?;
        } else {
            self.emit_parameters(node, &f.parameters)?;
        }
        self.emit_type_annotation(f.return_type)?;
        if arrow {
            self.write_space();
            self.write_punctuation("=>");
        }
        Ok(())
    }

    /// `x => ...` without parentheses, as written in the source.
    fn can_emit_simple_arrow_head(&self, node: NodeIndex, f: &FunctionData) -> bool {
        let [parameter] = f.parameters.nodes.as_slice() else {
            return false;
        };
        let Some(NodeData::Parameter {
            decorators,
            dot_dot_dot,
            name,
            question,
            type_node,
            initializer,
        }) = self.arena.get(*parameter).map(|n| &n.data)
        else {
            return false;
        };
        self.arena.range(*parameter).pos == self.arena.range(node).pos
            && f.return_type.is_none()
            && f.decorators.is_empty()
            && self.arena.modifiers(node).is_empty()
            && f.type_parameters.as_ref().is_none_or(NodeList::is_empty)
            && decorators.is_empty()
            && self.arena.modifiers(*parameter).is_empty()
            && !dot_dot_dot
            && !question
            && type_node.is_none()
            && initializer.is_none()
            && self.arena.is_kind(*name, SyntaxKind::Identifier)
    }

    pub(super) fn emit_block_function_body(&mut self, body: NodeIndex) -> EmitResult<()> {
        let statements = match self.arena.data(body)? {
            NodeData::Block { statements, .. } => statements.clone(),
            _ => return self.print(EmitHint::Unspecified, body),
        };
        self.write_space();
        self.write_punctuation("{");
        self.increase_indent();
        let single_line = self.should_emit_block_function_body_on_single_line(body, &statements);
        let range = tsemit_ast::TextRange::new(statements.pos, statements.end);
        let result = self.emit_body_with_detached_comments(body, range, |printer| {
            printer.emit_block_function_body_worker(body, &statements, single_line)
        });
        self.decrease_indent();
        self.write_token("}", statements.end, body);
        result
    }

    fn emit_block_function_body_worker(&mut self, body: NodeIndex, statements: &NodeList, single_line: bool) -> EmitResult<()> {
        let offset = self.emit_prologue_directives(statements)?;
        if offset == 0 && single_line {
            self.decrease_indent();
            let result = self.emit_list(body, Some(statements), ListFormat::SINGLE_LINE_FUNCTION_BODY_STATEMENTS);
            self.increase_indent();
            result
        } else {
            self.emit_list_from(body, statements, ListFormat::MULTI_LINE_FUNCTION_BODY_STATEMENTS, offset)
        }
    }

    fn should_emit_block_function_body_on_single_line(&self, body: NodeIndex, statements: &NodeList) -> bool {
        if self.arena.emit_flags(body).contains(EmitFlags::SINGLE_LINE) {
            return true;
        }
        if matches!(self.arena.get(body).map(|n| &n.data), Some(NodeData::Block { multi_line: true, .. })) {
            return false;
        }
        let range = self.arena.range(body);
        if !range.is_synthesized() && !self.range_is_on_single_line(range) {
            return false;
        }
        if self.leading_line_terminator_count(body, statements.first(), ListFormat::PRESERVE_LINES) > 0
            || self.closing_line_terminator_count(body, statements.last(), ListFormat::PRESERVE_LINES) > 0
        {
            return false;
        }
        statements
            .nodes
            .windows(2)
            .all(|pair| self.separating_line_terminator_count(pair[0], pair[1], ListFormat::PRESERVE_LINES) == 0)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub(super) fn emit_parameters(&mut self, node: NodeIndex, parameters: &NodeList) -> EmitResult<()> {
        self.emit_list(node, Some(parameters), ListFormat::PARAMETERS)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn emit_parameter(
        &mut self,
        node: NodeIndex,
        decorators: &NodeList,
        dot_dot_dot: bool,
        name: NodeIndex,
        question: bool,
        type_node: NodeIndex,
        initializer: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_decorators(node, decorators)?;
        self.emit_modifiers(node);
        if dot_dot_dot {
            self.write_punctuation("...");
        }
        self.print(EmitHint::Unspecified, name)?;
        if question {
            self.write_punctuation("?");
        }
        self.emit_type_annotation(type_node)?;
        let equals_pos = if type_node.is_some() {
            self.arena.range(type_node).end
        } else {
            self.arena.range(name).end
        };
        self.emit_initializer(node, initializer, equals_pos)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(super) fn emit_class_declaration_or_expression(&mut self, node: NodeIndex, c: &ClassData) -> EmitResult<()> {
        for member in c.members.iter() {
            self.generate_member_names(member)?;
        }
        self.emit_decorators(node, &c.decorators)?;
        self.emit_modifiers(node);
        self.write_keyword("class");
        if c.name.is_some() {
            self.write_space();
            self.print(EmitHint::Unspecified, c.name)?;
        }
        let indented = self.arena.emit_flags(node).contains(EmitFlags::INDENTED);
        if indented {
            self.increase_indent();
        }
        self.emit_type_parameters(node, c.type_parameters.as_ref())?;
        self.emit_list(node, Some(&c.heritage_clauses), ListFormat::CLASS_HERITAGE_CLAUSES)?;
        self.write_space();
        self.write_punctuation("{");
        self.emit_list(node, Some(&c.members), ListFormat::CLASS_MEMBERS)?;
        self.write_punctuation("}");
        if indented {
            self.decrease_indent();
        }
        Ok(())
    }

    /// ` extends A` / ` implements B, C`.
    pub(super) fn emit_heritage_clause(&mut self, node: NodeIndex, token: SyntaxKind, types: &NodeList) -> EmitResult<()> {
        self.write_space();
        self.write_keyword(token.token_text().unwrap_or("extends"));
        self.write_space();
        self.emit_list(node, Some(types), ListFormat::HERITAGE_CLAUSE_TYPES)
    }

    pub(super) fn emit_property_declaration(
        &mut self,
        node: NodeIndex,
        decorators: &NodeList,
        name: NodeIndex,
        question: bool,
        type_node: NodeIndex,
        initializer: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_decorators(node, decorators)?;
        self.emit_modifiers(node);
        self.print(EmitHint::Unspecified, name)?;
        if question {
            self.write_punctuation("?");
        }
        self.emit_type_annotation(type_node)?;
        if initializer.is_some() {
            self.write_space();
            self.write_operator("=");
            self.write_space();
            self.print_expression(initializer)?;
        }
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_property_signature(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        question: bool,
        type_node: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.print(EmitHint::Unspecified, name)?;
        if question {
            self.write_punctuation("?");
        }
        self.emit_type_annotation(type_node)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_method_signature(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        question: bool,
        type_parameters: Option<&NodeList>,
        parameters: &NodeList,
        type_node: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.print(EmitHint::Unspecified, name)?;
        if question {
            self.write_punctuation("?");
        }
        self.emit_type_parameters(node, type_parameters)?;
        self.emit_parameters(node, parameters)?;
        self.emit_type_annotation(type_node)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_index_signature(&mut self, node: NodeIndex, parameters: &NodeList, type_node: NodeIndex) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.emit_list(node, Some(parameters), ListFormat::INDEX_SIGNATURE_PARAMETERS)?;
        self.emit_type_annotation(type_node)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    // =========================================================================
    // Binding patterns
    // =========================================================================

    pub(super) fn emit_object_binding_pattern(&mut self, node: NodeIndex, elements: &NodeList) -> EmitResult<()> {
        self.write_punctuation("{");
        self.emit_list(node, Some(elements), ListFormat::OBJECT_BINDING_PATTERN_ELEMENTS)?;
        self.write_punctuation("}");
        Ok(())
    }

    pub(super) fn emit_array_binding_pattern(&mut self, node: NodeIndex, elements: &NodeList) -> EmitResult<()> {
        self.write_punctuation("[");
        self.emit_list(node, Some(elements), ListFormat::ARRAY_BINDING_PATTERN_ELEMENTS)?;
        self.write_punctuation("]");
        Ok(())
    }

    pub(super) fn emit_binding_element(
        &mut self,
        node: NodeIndex,
        dot_dot_dot: bool,
        property_name: NodeIndex,
        name: NodeIndex,
        initializer: NodeIndex,
    ) -> EmitResult<()> {
        if property_name.is_some() {
            self.print(EmitHint::Unspecified, property_name)?;
            self.write_punctuation(":");
            self.write_space();
        }
        if dot_dot_dot {
            self.write_punctuation("...");
        }
        self.print(EmitHint::Unspecified, name)?;
        let equals_pos = self.arena.range(name).end;
        self.emit_initializer(node, initializer, equals_pos)
    }

    // =========================================================================
    // Type-only declarations
    // =========================================================================

    pub(super) fn emit_interface_declaration(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        type_parameters: Option<&NodeList>,
        heritage_clauses: &NodeList,
        members: &NodeList,
    ) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.write_keyword("interface");
        self.write_space();
        self.print(EmitHint::Unspecified, name)?;
        self.emit_type_parameters(node, type_parameters)?;
        self.emit_list(node, Some(heritage_clauses), ListFormat::CLASS_HERITAGE_CLAUSES)?;
        self.write_space();
        self.write_punctuation("{");
        self.emit_list(node, Some(members), ListFormat::INTERFACE_MEMBERS)?;
        self.write_punctuation("}");
        Ok(())
    }

    pub(super) fn emit_type_alias_declaration(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        type_parameters: Option<&NodeList>,
        type_node: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.write_keyword("type");
        self.write_space();
        self.print(EmitHint::Unspecified, name)?;
        self.emit_type_parameters(node, type_parameters)?;
        self.write_space();
        self.write_operator("=");
        self.write_space();
        self.print(EmitHint::Unspecified, type_node)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_enum_declaration(&mut self, node: NodeIndex, name: NodeIndex, members: &NodeList) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.write_keyword("enum");
        self.write_space();
        self.print(EmitHint::Unspecified, name)?;
        self.write_space();
        self.write_punctuation("{");
        self.emit_list(node, Some(members), ListFormat::ENUM_MEMBERS)?;
        self.write_punctuation("}");
        Ok(())
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    pub(super) fn emit_module_declaration(&mut self, node: NodeIndex, name: NodeIndex, body: NodeIndex) -> EmitResult<()> {
        self.emit_modifiers(node);
        if !self.arena.node_flags(node).contains(NodeFlags::GLOBAL_AUGMENTATION) {
            let keyword = if self.arena.is_kind(name, SyntaxKind::StringLiteral) {
                "module"
            } else {
                "namespace"
            };
            self.write_keyword(keyword);
            self.write_space();
        }
        self.print(EmitHint::Unspecified, name)?;

        let mut body = body;
        while let Some(&NodeData::ModuleDeclaration { name, body: inner }) = self.arena.get(body).map(|n| &n.data) {
            self.write_punctuation(".");
            self.print(EmitHint::Unspecified, name)?;
            body = inner;
        }
        if body.is_none() {
            self.write_trailing_semicolon();
            return Ok(());
        }
        self.write_space();
        self.print(EmitHint::Unspecified, body)
    }

    pub(super) fn emit_module_block(&mut self, node: NodeIndex, statements: &NodeList) -> EmitResult<()> {
        let pushed = self.push_name_generation_scope(node);
        let result = statements
            .iter()
            .try_for_each(|statement| self.generate_names(statement))
            .and_then(|()| self.emit_block(node, statements, false));
        self.pop_name_generation_scope(pushed);
        result
    }

    // =========================================================================
    // Imports and exports
    // =========================================================================

    pub(super) fn emit_import_equals_declaration(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        module_reference: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.write_keyword("import");
        self.write_space();
        self.print(EmitHint::Unspecified, name)?;
        self.write_space();
        self.write_operator("=");
        self.write_space();
        self.print(EmitHint::Unspecified, module_reference)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_import_declaration(
        &mut self,
        node: NodeIndex,
        import_clause: NodeIndex,
        module_specifier: NodeIndex,
    ) -> EmitResult<()> {
        self.emit_modifiers(node);
        self.write_keyword("import");
        self.write_space();
        if import_clause.is_some() {
            self.print(EmitHint::Unspecified, import_clause)?;
            self.write_space();
            self.write_keyword("from");
            self.write_space();
        }
        self.print_expression(module_specifier)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_import_clause(&mut self, _node: NodeIndex, name: NodeIndex, named_bindings: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Unspecified, name)?;
        if name.is_some() && named_bindings.is_some() {
            self.write_punctuation(",");
            self.write_space();
        }
        self.print(EmitHint::Unspecified, named_bindings)
    }

    pub(super) fn emit_namespace_import(&mut self, _node: NodeIndex, name: NodeIndex) -> EmitResult<()> {
        self.write_punctuation("*");
        self.write_space();
        self.write_keyword("as");
        self.write_space();
        self.print(EmitHint::Unspecified, name)
    }

    pub(super) fn emit_import_or_export_specifier(
        &mut self,
        _node: NodeIndex,
        property_name: NodeIndex,
        name: NodeIndex,
    ) -> EmitResult<()> {
        if property_name.is_some() {
            self.print(EmitHint::Unspecified, property_name)?;
            self.write_space();
            self.write_keyword("as");
            self.write_space();
        }
        self.print(EmitHint::Unspecified, name)
    }

    pub(super) fn emit_export_assignment(&mut self, node: NodeIndex, is_export_equals: bool, expression: NodeIndex) -> EmitResult<()> {
        let next_pos = self.emit_token_with_comment("export", self.arena.range(node).pos, node, false);
        self.write_space();
        if is_export_equals {
            self.emit_token_with_comment("=", next_pos, node, false);
        } else {
            self.emit_token_with_comment("default", next_pos, node, false);
        }
        self.write_space();
        self.print_expression(expression)?;
        self.write_trailing_semicolon();
        Ok(())
    }

    pub(super) fn emit_export_declaration(
        &mut self,
        _node: NodeIndex,
        export_clause: NodeIndex,
        module_specifier: NodeIndex,
    ) -> EmitResult<()> {
        self.write_keyword("export");
        self.write_space();
        if export_clause.is_some() {
            self.print(EmitHint::Unspecified, export_clause)?;
        } else {
            self.write_punctuation("*");
        }
        if module_specifier.is_some() {
            self.write_space();
            self.write_keyword("from");
            self.write_space();
            self.print_expression(module_specifier)?;
        }
        self.write_trailing_semicolon();
        Ok(())
    }
}
