//! JavaScript (and declaration) printer.
//!
//! The printer walks a transformed tree and writes output text. Every node
//! goes through the same pipeline:
//!
//! 1. substitution hooks (`EmitHooks::substitute`)
//! 2. emit notification hooks, bracketing the rest of the pipeline
//! 3. leading and trailing comments (only for nodes with a real range)
//! 4. source map positions (only for nodes with a real range)
//! 5. the kind-specific emitter
//!
//! Submodules split the emitters by node family; they all extend
//! `Printer` with `pub(super)` methods.

mod comments;
mod declarations;
mod expressions;
mod list_format;
mod literals;
mod names;
mod source_maps;
mod statements;
mod tokens;
mod types;
mod writer;

pub use list_format::ListFormat;
pub(crate) use source_maps::relative_path;
pub use writer::SourceWriter;

use crate::helpers::{EmitHelper, HELPER_MODULE, HelperText, compare_emit_helpers};
use crate::hooks::{EmitHint, EmitHooks, HookContext};
use crate::resolver::EmitResolver;
use crate::transform_context::TransformOutput;
use comments::CommentState;
use names::NameGenerator;
use rustc_hash::FxHashSet;
use source_maps::SourceMapState;
use std::sync::Arc;
use tracing::{debug, trace};
use tsemit_ast::utilities::{is_external_module, is_prologue_directive};
use tsemit_ast::{NodeArena, NodeData, NodeIndex, TextRange};
use tsemit_common::source_map::SourceMapGenerator;
use tsemit_common::{CompilerOptions, EmitError, EmitResult, LineMap};

/// Text (and source map) produced by one printer.
#[derive(Debug)]
pub struct PrintOutput {
    pub text: String,
    pub source_map: Option<SourceMapGenerator>,
}

pub struct Printer<'a> {
    arena: &'a mut NodeArena,
    resolver: &'a dyn EmitResolver,
    options: &'a CompilerOptions,
    hooks: EmitHooks,
    writer: SourceWriter,

    // Current source file
    source_file: NodeIndex,
    source_text: Arc<str>,
    line_map: LineMap,

    names: NameGenerator,
    comments: CommentState,
    source_map: Option<SourceMapState>,

    /// Helpers requested for the file being printed.
    helpers: Vec<&'static EmitHelper>,
    /// Non-scoped helpers already written to this output.
    written_helpers: FxHashSet<&'static str>,
    /// Set while the helpers of a bundle are written once at its top.
    in_bundle: bool,
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a mut NodeArena, resolver: &'a dyn EmitResolver, options: &'a CompilerOptions) -> Self {
        Printer {
            arena,
            resolver,
            options,
            hooks: EmitHooks::new(),
            writer: SourceWriter::new(options.new_line.as_str()),
            source_file: NodeIndex::NONE,
            source_text: Arc::from(""),
            line_map: LineMap::default(),
            names: NameGenerator::default(),
            comments: CommentState::new(options.remove_comments),
            source_map: None,
            helpers: Vec::new(),
            written_helpers: FxHashSet::default(),
            in_bundle: false,
        }
    }

    /// Forget everything printed so far: output, generated names, comment
    /// and source map state. Hooks are dropped too.
    pub fn reset(&mut self) {
        self.writer.clear();
        self.hooks = EmitHooks::new();
        self.source_file = NodeIndex::NONE;
        self.source_text = Arc::from("");
        self.line_map = LineMap::default();
        self.names.reset();
        self.comments = CommentState::new(self.options.remove_comments);
        self.source_map = None;
        self.helpers.clear();
        self.written_helpers.clear();
        self.in_bundle = false;
    }

    /// Make `root` the file whose text positions and comments are consulted.
    pub fn set_source_file(&mut self, root: NodeIndex) -> EmitResult<()> {
        let text = Arc::clone(&self.arena.source_file(root)?.text);
        self.line_map = LineMap::build(&text);
        self.source_text = text;
        self.source_file = root;
        self.comments.reset_for_file();
        self.collect_file_identifiers(root);
        Ok(())
    }

    /// Hooks registered by the passes that produced the tree.
    pub fn set_hooks(&mut self, hooks: EmitHooks) {
        self.hooks = hooks;
    }

    /// Print one transformed file with its helpers.
    pub fn write_file(&mut self, root: NodeIndex, output: TransformOutput) -> EmitResult<()> {
        let file_name = self.arena.source_file(root)?.file_name.clone();
        debug!(file = %file_name, helpers = output.helpers.len(), hooks = ?output.hooks.handler_names(), "printing file");
        self.hooks = output.hooks;
        self.helpers = output.helpers;
        self.set_source_file(root)?;
        self.add_source_map_source(&file_name);
        self.print(EmitHint::SourceFile, root)
    }

    /// Print several files into one output. Helpers of every file are
    /// written once, at the top.
    pub fn write_bundle(&mut self, files: Vec<(NodeIndex, TransformOutput)>) -> EmitResult<()> {
        debug!(files = files.len(), "printing bundle");
        let mut helpers: Vec<&'static EmitHelper> = Vec::new();
        for (_, output) in &files {
            for &helper in &output.helpers {
                if !helpers.iter().any(|h| h.name == helper.name) {
                    helpers.push(helper);
                }
            }
        }
        helpers.sort_by(|a, b| compare_emit_helpers(a, b));
        if let Some((first, _)) = files.first() {
            self.set_source_file(*first)?;
        }
        self.emit_helper_texts(&helpers, false);
        self.in_bundle = true;
        let result = files.into_iter().try_for_each(|(root, output)| self.write_file(root, output));
        self.in_bundle = false;
        result
    }

    /// Print a single node of the file `source_file` (tests and declaration output).
    pub fn write_node(&mut self, hint: EmitHint, node: NodeIndex, source_file: NodeIndex) -> EmitResult<()> {
        if source_file.is_some() && source_file != self.source_file {
            self.set_source_file(source_file)?;
        }
        self.print(hint, node)
    }

    pub fn text(&self) -> &str {
        self.writer.text()
    }

    pub fn finish(self) -> PrintOutput {
        PrintOutput {
            text: self.writer.into_text(),
            source_map: self.source_map.map(|state| state.generator),
        }
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Print `node` through the whole pipeline. Absent nodes print nothing.
    pub(super) fn print(&mut self, hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        if node.is_none() {
            return Ok(());
        }
        let node = self.hooks.substitute(
            &mut HookContext {
                arena: &mut *self.arena,
                resolver: self.resolver,
            },
            hint,
            node,
        )?;
        self.emit_with_notification(hint, node, |printer| printer.print_with_comments(hint, node))
    }

    /// Run `emit` bracketed by the emit notification hooks for `node`.
    pub(super) fn emit_with_notification(
        &mut self,
        hint: EmitHint,
        node: NodeIndex,
        emit: impl FnOnce(&mut Self) -> EmitResult<()>,
    ) -> EmitResult<()> {
        if !self.hooks.is_emit_notification_enabled(self.arena, node) {
            return emit(self);
        }
        let entered = self.hooks.enter_emit_node(
            &mut HookContext {
                arena: &mut *self.arena,
                resolver: self.resolver,
            },
            hint,
            node,
        )?;
        let result = emit(self);
        let exited = self.hooks.exit_emit_node(
            &mut HookContext {
                arena: &mut *self.arena,
                resolver: self.resolver,
            },
            hint,
            node,
            entered,
        );
        result.and(exited)
    }

    pub(super) fn print_expression(&mut self, node: NodeIndex) -> EmitResult<()> {
        self.print(EmitHint::Expression, node)
    }

    /// Kind dispatch. Every node kind is listed; kinds that have no output
    /// in JavaScript or declaration text print nothing.
    fn emit_node(&mut self, hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        trace!(node = node.0, ?hint, kind = ?self.arena.kind(node), "emit");
        let data = self.arena.data(node)?.clone();
        match data {
            // Names and literals
            NodeData::Identifier(_) => self.emit_identifier(node),
            NodeData::NumericLiteral { text } => self.emit_numeric_literal(node, &text),
            NodeData::StringLiteral { text, single_quote } => self.emit_string_literal(node, &text, single_quote),
            NodeData::RegularExpressionLiteral { text } => self.emit_literal_source_text(node, &text),
            NodeData::NoSubstitutionTemplateLiteral(text) => self.emit_template_piece(node, "`", &text.raw, "`"),
            NodeData::TemplateHead(text) => self.emit_template_piece(node, "`", &text.raw, "${"),
            NodeData::TemplateMiddle(text) => self.emit_template_piece(node, "}", &text.raw, "${"),
            NodeData::TemplateTail(text) => self.emit_template_piece(node, "}", &text.raw, "`"),
            NodeData::ThisKeyword => self.emit_keyword_token("this"),
            NodeData::SuperKeyword => self.emit_keyword_token("super"),
            NodeData::NullKeyword => self.emit_keyword_token("null"),
            NodeData::TrueKeyword => self.emit_keyword_token("true"),
            NodeData::FalseKeyword => self.emit_keyword_token("false"),
            NodeData::QualifiedName { left, right } => self.emit_qualified_name(left, right),
            NodeData::ComputedPropertyName { expression } => self.emit_computed_property_name(expression),

            // Signature elements and class members
            NodeData::TypeParameter {
                name,
                constraint,
                default,
            } => self.emit_type_parameter(name, constraint, default),
            NodeData::Parameter {
                decorators,
                dot_dot_dot,
                name,
                question,
                type_node,
                initializer,
            } => self.emit_parameter(node, &decorators, dot_dot_dot, name, question, type_node, initializer),
            NodeData::Decorator { expression } => self.emit_decorator(expression),
            NodeData::PropertySignature {
                name,
                question,
                type_node,
            } => self.emit_property_signature(node, name, question, type_node),
            NodeData::PropertyDeclaration {
                decorators,
                name,
                question,
                type_node,
                initializer,
            } => self.emit_property_declaration(node, &decorators, name, question, type_node, initializer),
            NodeData::MethodSignature {
                name,
                question,
                type_parameters,
                parameters,
                type_node,
            } => self.emit_method_signature(node, name, question, type_parameters.as_ref(), &parameters, type_node),
            NodeData::MethodDeclaration(f) => self.emit_method_declaration(node, &f),
            NodeData::Constructor(f) => self.emit_constructor(node, &f),
            NodeData::GetAccessor(f) => self.emit_accessor(node, "get", &f),
            NodeData::SetAccessor(f) => self.emit_accessor(node, "set", &f),
            NodeData::IndexSignature { parameters, type_node } => self.emit_index_signature(node, &parameters, type_node),
            NodeData::SemicolonClassElement => {
                self.write_trailing_semicolon();
                Ok(())
            }

            // Types
            NodeData::KeywordType { keyword } => self.emit_keyword_type(keyword),
            NodeData::TypeReference {
                type_name,
                type_arguments,
            } => self.emit_type_reference(node, type_name, type_arguments.as_ref()),
            NodeData::FunctionType {
                type_parameters,
                parameters,
                type_node,
            } => self.emit_function_type(node, false, type_parameters.as_ref(), &parameters, type_node),
            NodeData::ConstructorType {
                type_parameters,
                parameters,
                type_node,
            } => self.emit_function_type(node, true, type_parameters.as_ref(), &parameters, type_node),
            NodeData::TypeQuery { expr_name } => self.emit_type_query(expr_name),
            NodeData::TypeLiteral { members } => self.emit_type_literal(node, &members),
            NodeData::ArrayType { element_type } => self.emit_array_type(element_type),
            NodeData::TupleType { element_types } => self.emit_tuple_type(node, &element_types),
            NodeData::UnionType { types } => self.emit_list(node, Some(&types), ListFormat::UNION_TYPE_CONSTITUENTS),
            NodeData::IntersectionType { types } => {
                self.emit_list(node, Some(&types), ListFormat::INTERSECTION_TYPE_CONSTITUENTS)
            }
            NodeData::ParenthesizedType { type_node } => self.emit_parenthesized_type(type_node),
            NodeData::ThisType => {
                self.write_keyword("this");
                Ok(())
            }
            NodeData::TypeOperator { operator, type_node } => self.emit_type_operator(operator, type_node),
            NodeData::LiteralType { literal } => self.print_expression(literal),

            // Binding patterns
            NodeData::ObjectBindingPattern { elements } => self.emit_object_binding_pattern(node, &elements),
            NodeData::ArrayBindingPattern { elements } => self.emit_array_binding_pattern(node, &elements),
            NodeData::BindingElement {
                dot_dot_dot,
                property_name,
                name,
                initializer,
            } => self.emit_binding_element(node, dot_dot_dot, property_name, name, initializer),

            // Expressions
            NodeData::ArrayLiteralExpression { elements, multi_line } => {
                self.emit_array_literal(node, &elements, multi_line)
            }
            NodeData::ObjectLiteralExpression { properties, multi_line } => {
                self.emit_object_literal(node, &properties, multi_line)
            }
            NodeData::PropertyAccessExpression { expression, name } => {
                self.emit_property_access(node, expression, name)
            }
            NodeData::ElementAccessExpression { expression, argument } => {
                self.emit_element_access(node, expression, argument)
            }
            NodeData::CallExpression {
                expression,
                type_arguments,
                arguments,
            } => self.emit_call(node, expression, type_arguments.as_ref(), &arguments),
            NodeData::NewExpression {
                expression,
                type_arguments,
                arguments,
            } => self.emit_new(node, expression, type_arguments.as_ref(), arguments.as_ref()),
            NodeData::TaggedTemplateExpression {
                tag,
                type_arguments,
                template,
            } => self.emit_tagged_template(node, tag, type_arguments.as_ref(), template),
            NodeData::TypeAssertionExpression { type_node, expression } => {
                self.emit_type_assertion(type_node, expression)
            }
            NodeData::ParenthesizedExpression { expression } => self.emit_parenthesized_expression(node, expression),
            NodeData::FunctionExpression(f) => self.emit_function_declaration_or_expression(node, &f),
            NodeData::ArrowFunction(f) => self.emit_arrow_function(node, &f),
            NodeData::DeleteExpression { expression } => self.emit_keyword_unary(node, "delete", expression),
            NodeData::TypeOfExpression { expression } => self.emit_keyword_unary(node, "typeof", expression),
            NodeData::VoidExpression { expression } => self.emit_keyword_unary(node, "void", expression),
            NodeData::PrefixUnaryExpression { operator, operand } => self.emit_prefix_unary(operator, operand),
            NodeData::PostfixUnaryExpression { operand, operator } => self.emit_postfix_unary(operand, operator),
            NodeData::BinaryExpression { left, operator, right } => self.emit_binary(node, left, operator, right),
            NodeData::ConditionalExpression {
                condition,
                when_true,
                when_false,
            } => self.emit_conditional(node, condition, when_true, when_false),
            NodeData::TemplateExpression { head, template_spans } => {
                self.print(EmitHint::Unspecified, head)?;
                self.emit_list(node, Some(&template_spans), ListFormat::TEMPLATE_EXPRESSION_SPANS)
            }
            NodeData::TemplateSpan { expression, literal } => {
                self.print_expression(expression)?;
                self.print(EmitHint::Unspecified, literal)
            }
            NodeData::SpreadElement { expression } | NodeData::SpreadAssignment { expression } => {
                self.write_punctuation("...");
                self.print_expression(expression)
            }
            NodeData::ClassExpression(c) => self.emit_class_declaration_or_expression(node, &c),
            NodeData::OmittedExpression => Ok(()),
            NodeData::ExpressionWithTypeArguments {
                expression,
                type_arguments,
            } => {
                self.print_expression(expression)?;
                self.emit_type_arguments(node, type_arguments.as_ref())
            }
            NodeData::AsExpression { expression, type_node } => self.emit_as_expression(expression, type_node),
            NodeData::NonNullExpression { expression } => {
                self.print_expression(expression)?;
                self.write_operator("!");
                Ok(())
            }
            NodeData::MetaProperty { keyword, name } => self.emit_meta_property(keyword, name),

            // Statements
            NodeData::Block { statements, multi_line } => self.emit_block(node, &statements, multi_line),
            NodeData::EmptyStatement => {
                self.write_punctuation(";");
                Ok(())
            }
            NodeData::VariableStatement { declaration_list } => self.emit_variable_statement(node, declaration_list),
            NodeData::ExpressionStatement { expression } => {
                self.print_expression(expression)?;
                self.write_trailing_semicolon();
                Ok(())
            }
            NodeData::IfStatement {
                expression,
                then_statement,
                else_statement,
            } => self.emit_if_statement(node, expression, then_statement, else_statement),
            NodeData::DoStatement { statement, expression } => self.emit_do_statement(node, statement, expression),
            NodeData::WhileStatement { expression, statement } => {
                self.emit_while_clause(node, expression, self.arena.range(node).pos)?;
                self.emit_embedded_statement(node, statement)
            }
            NodeData::ForStatement {
                initializer,
                condition,
                incrementor,
                statement,
            } => self.emit_for_statement(node, initializer, condition, incrementor, statement),
            NodeData::ForInStatement {
                initializer,
                expression,
                statement,
            } => self.emit_for_in_or_of(node, "in", initializer, expression, statement),
            NodeData::ForOfStatement {
                initializer,
                expression,
                statement,
            } => self.emit_for_in_or_of(node, "of", initializer, expression, statement),
            NodeData::ContinueStatement { label } => self.emit_jump(node, "continue", label),
            NodeData::BreakStatement { label } => self.emit_jump(node, "break", label),
            NodeData::ReturnStatement { expression } => self.emit_keyword_statement(node, "return", expression),
            NodeData::ThrowStatement { expression } => self.emit_keyword_statement(node, "throw", expression),
            NodeData::SwitchStatement { expression, case_block } => {
                self.emit_switch_statement(node, expression, case_block)
            }
            NodeData::LabeledStatement { label, statement } => self.emit_labeled_statement(node, label, statement),
            NodeData::TryStatement {
                try_block,
                catch_clause,
                finally_block,
            } => self.emit_try_statement(node, try_block, catch_clause, finally_block),
            NodeData::DebuggerStatement => {
                self.emit_token_with_comment("debugger", self.arena.range(node).pos, node, false);
                self.write_trailing_semicolon();
                Ok(())
            }
            NodeData::VariableDeclaration {
                name,
                type_node,
                initializer,
                ..
            } => self.emit_variable_declaration(node, name, type_node, initializer),
            NodeData::VariableDeclarationList { declarations } => {
                self.emit_variable_declaration_list(node, &declarations)
            }

            // Declarations
            NodeData::FunctionDeclaration(f) => self.emit_function_declaration_or_expression(node, &f),
            NodeData::ClassDeclaration(c) => self.emit_class_declaration_or_expression(node, &c),
            NodeData::InterfaceDeclaration {
                name,
                type_parameters,
                heritage_clauses,
                members,
            } => self.emit_interface_declaration(node, name, type_parameters.as_ref(), &heritage_clauses, &members),
            NodeData::TypeAliasDeclaration {
                name,
                type_parameters,
                type_node,
            } => self.emit_type_alias_declaration(node, name, type_parameters.as_ref(), type_node),
            NodeData::EnumDeclaration { name, members } => self.emit_enum_declaration(node, name, &members),
            NodeData::ModuleDeclaration { name, body } => self.emit_module_declaration(node, name, body),
            NodeData::ModuleBlock { statements } => self.emit_module_block(node, &statements),
            NodeData::CaseBlock { clauses } => self.emit_case_block(node, &clauses),
            NodeData::ImportEqualsDeclaration { name, module_reference } => {
                self.emit_import_equals_declaration(node, name, module_reference)
            }
            NodeData::ImportDeclaration {
                import_clause,
                module_specifier,
            } => self.emit_import_declaration(node, import_clause, module_specifier),
            NodeData::ImportClause { name, named_bindings } => self.emit_import_clause(node, name, named_bindings),
            NodeData::NamespaceImport { name } => self.emit_namespace_import(node, name),
            NodeData::NamedImports { elements } | NodeData::NamedExports { elements } => {
                self.write_punctuation("{");
                self.emit_list(node, Some(&elements), ListFormat::NAMED_IMPORTS_OR_EXPORTS_ELEMENTS)?;
                self.write_punctuation("}");
                Ok(())
            }
            NodeData::ImportSpecifier { property_name, name } | NodeData::ExportSpecifier { property_name, name } => {
                self.emit_import_or_export_specifier(node, property_name, name)
            }
            NodeData::ExportAssignment {
                is_export_equals,
                expression,
            } => self.emit_export_assignment(node, is_export_equals, expression),
            NodeData::ExportDeclaration {
                export_clause,
                module_specifier,
            } => self.emit_export_declaration(node, export_clause, module_specifier),
            NodeData::ExternalModuleReference { expression } => {
                self.write_keyword("require");
                self.write_punctuation("(");
                self.print_expression(expression)?;
                self.write_punctuation(")");
                Ok(())
            }

            // Clauses and object literal members
            NodeData::CaseClause { expression, statements } => self.emit_case_clause(node, expression, &statements),
            NodeData::DefaultClause { statements } => self.emit_default_clause(node, &statements),
            NodeData::HeritageClause { token, types } => self.emit_heritage_clause(node, token, &types),
            NodeData::CatchClause {
                variable_declaration,
                block,
            } => self.emit_catch_clause(node, variable_declaration, block),
            NodeData::PropertyAssignment { name, initializer } => self.emit_property_assignment(name, initializer),
            NodeData::ShorthandPropertyAssignment {
                name,
                object_assignment_initializer,
            } => self.emit_shorthand_property_assignment(name, object_assignment_initializer),
            NodeData::EnumMember { name, initializer } => {
                self.print(EmitHint::Unspecified, name)?;
                self.emit_initializer(node, initializer, self.arena.range(name).end)
            }

            // Top level and synthesized-only nodes
            NodeData::SourceFile(_) => self.emit_source_file(node),
            NodeData::NotEmittedStatement => Ok(()),
            NodeData::PartiallyEmittedExpression { expression } => self.print_expression(expression),
            NodeData::CommaListExpression { elements } => {
                self.emit_expression_list(node, Some(&elements), ListFormat::COMMA_LIST_ELEMENTS)
            }
        }
    }

    // =========================================================================
    // Source files
    // =========================================================================

    fn emit_source_file(&mut self, node: NodeIndex) -> EmitResult<()> {
        let statements = self.arena.source_file(node)?.statements.clone();
        self.write_line();
        self.emit_shebang_if_needed();
        let should_emit_detached_comments = match statements.first() {
            None => true,
            Some(first) => !is_prologue_directive(self.arena, first) || self.arena.range(first).is_synthesized(),
        };
        if should_emit_detached_comments {
            let range = TextRange::new(statements.pos, statements.end);
            self.emit_body_with_detached_comments(node, range, |printer| {
                printer.emit_source_file_worker(node, &statements)
            })
        } else {
            self.emit_source_file_worker(node, &statements)
        }
    }

    fn emit_source_file_worker(&mut self, node: NodeIndex, statements: &tsemit_ast::NodeList) -> EmitResult<()> {
        let pushed = self.push_name_generation_scope(node);
        for statement in statements.iter() {
            self.generate_names(statement)?;
        }
        let offset = self.emit_prologue_directives(statements)?;
        self.emit_helpers()?;
        self.emit_list_from(node, statements, ListFormat::MULTI_LINE, offset)?;
        self.pop_name_generation_scope(pushed);
        Ok(())
    }

    /// `"use strict"` and friends, each on its own line. Returns how many
    /// statements were prologue directives.
    pub(super) fn emit_prologue_directives(&mut self, statements: &tsemit_ast::NodeList) -> EmitResult<usize> {
        for (index, statement) in statements.iter().enumerate() {
            if !is_prologue_directive(self.arena, statement) {
                return Ok(index);
            }
            self.write_line();
            self.print(EmitHint::Unspecified, statement)?;
        }
        Ok(statements.len())
    }

    fn emit_shebang_if_needed(&mut self) {
        let source = Arc::clone(&self.source_text);
        if let Some(rest) = source.strip_prefix("#!") {
            let end = rest.find(['\r', '\n']).map_or(source.len(), |i| i + 2);
            self.writer.write(&source[..end]);
            self.writer.write_line();
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Helpers of the current file, or an import of them from the helper
    /// library under `importHelpers` in a module.
    fn emit_helpers(&mut self) -> EmitResult<()> {
        if self.in_bundle || self.helpers.is_empty() {
            return Ok(());
        }
        let mut helpers = std::mem::take(&mut self.helpers);
        helpers.sort_by(|a, b| compare_emit_helpers(a, b));

        let parse_root = self.arena.get_parse_tree_node(self.source_file);
        if self.options.import_helpers && is_external_module(self.arena, parse_root) {
            let names: Vec<&'static str> = helpers.iter().filter_map(|h| h.import_name()).collect();
            if !names.is_empty() {
                trace!(?names, "importing helpers");
                self.write_line();
                self.writer
                    .write(&format!("import {{ {} }} from \"{HELPER_MODULE}\";", names.join(", ")));
            }
            let scoped: Vec<&'static EmitHelper> = helpers.iter().copied().filter(|h| h.scoped).collect();
            self.emit_helper_texts(&scoped, true);
        } else {
            self.emit_helper_texts(&helpers, true);
        }
        self.helpers = helpers;
        Ok(())
    }

    fn emit_helper_texts(&mut self, helpers: &[&'static EmitHelper], deduplicate: bool) {
        for &helper in helpers {
            if !helper.scoped {
                if self.options.no_emit_helpers {
                    continue;
                }
                if !self.written_helpers.insert(helper.name) && deduplicate {
                    continue;
                }
            }
            trace!(helper = helper.name, "writing helper");
            match helper.text {
                HelperText::Static(text) => self.writer.write_lines(text),
                HelperText::Generated(build) => {
                    let text = build(&mut |base: &str| self.make_helper_unique_name(base));
                    self.writer.write_lines(&text);
                }
            }
        }
    }
}

/// Print one transformed file to a string with the hooks and helpers the
/// passes left behind.
pub fn print_file(
    arena: &mut NodeArena,
    resolver: &dyn EmitResolver,
    options: &CompilerOptions,
    root: NodeIndex,
    output: TransformOutput,
) -> EmitResult<String> {
    if !arena.is_kind(root, tsemit_ast::SyntaxKind::SourceFile) {
        return Err(EmitError::internal("print_file expects a source file"));
    }
    let mut printer = Printer::new(arena, resolver, options);
    printer.write_file(root, output)?;
    Ok(printer.finish().text)
}
