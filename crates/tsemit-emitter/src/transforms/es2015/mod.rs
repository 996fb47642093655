//! ES2015 lowering.
//!
//! The second pass, run when the target is ES5 or ES3. It rewrites the
//! ES2015 syntax the TypeScript pass leaves in place:
//!
//! - classes become an IIFE over a constructor function (`__extends` for
//!   derived classes)
//! - arrow functions become function expressions that print `this` as `_this`
//! - default, rest and destructured parameters move into the body
//! - `let`/`const` become `var`; loops whose bindings are captured by a
//!   closure get their body moved into a per-iteration `_loop` function
//! - destructuring, spread, templates, `for..of`, shorthand and computed
//!   object members are expanded
//!
//! Context that depends on the ancestors of a node (inside an arrow, inside
//! a loop body, inside a derived constructor) lives in `HierarchyFacts`.

mod block_scoping;
mod classes;
mod destructuring;
mod for_of;
mod functions;
mod loops;
mod object_literals;
mod spread;
mod substitutions;
mod templates;

pub use substitutions::Es2015Hook;

use crate::hierarchy_facts::{HierarchyFacts, HierarchyScoped, with_subtree};
use crate::resolver::resolver_key;
use crate::transform_context::TransformContext;
use crate::transforms::visitor::{
    Visitor, VisitResult, merge_lexical_environment, single, statements_of, update_statements, visit_each_child,
    visit_node, visit_nodes,
};
use loops::ConvertedLoopState;
use tracing::{debug, trace};
use tsemit_ast::utilities::{is_external_module, is_prologue_directive};
use tsemit_ast::{EmitFlags, NodeArena, NodeData, NodeFlags, NodeIndex, SyntaxKind, TransformFlags};
use tsemit_common::EmitResult;

pub struct Es2015Transformer<'t, 'a> {
    arena: &'t mut NodeArena,
    context: &'t mut TransformContext<'a>,
    hierarchy_facts: HierarchyFacts,
    is_external_module: bool,
    /// State of the innermost loop whose body is being moved into a function.
    /// Reset to `None` inside every function boundary.
    converted_loop_state: Option<ConvertedLoopState>,
    /// `templateObject_1`, ... declared at the end of a module.
    tagged_template_declarations: Vec<NodeIndex>,
    hook: Es2015Hook,
}

impl<'t, 'a> Es2015Transformer<'t, 'a> {
    pub fn new(arena: &'t mut NodeArena, context: &'t mut TransformContext<'a>) -> Self {
        Es2015Transformer {
            arena,
            context,
            hierarchy_facts: HierarchyFacts::NONE,
            is_external_module: false,
            converted_loop_state: None,
            tagged_template_declarations: Vec::new(),
            hook: Es2015Hook::default(),
        }
    }

    pub fn transform_source_file(mut self, source_file: NodeIndex) -> EmitResult<NodeIndex> {
        if self.arena.source_file(source_file)?.is_declaration_file {
            return Ok(source_file);
        }
        self.is_external_module = is_external_module(self.arena, source_file);
        let statements = statements_of(self.arena, source_file)?;

        let root = with_subtree(
            &mut self,
            HierarchyFacts::SOURCE_FILE_EXCLUDES,
            HierarchyFacts::SOURCE_FILE_INCLUDES,
            HierarchyFacts::NONE,
            HierarchyFacts::NONE,
            |this| {
                let directives = statements
                    .iter()
                    .take_while(|&s| is_prologue_directive(this.arena, s))
                    .count();
                let (mut visited, hoisted) = this.in_lexical_environment(|this| {
                    let mut out = statements.nodes[..directives].to_vec();
                    out.extend(visit_nodes(this, &statements.nodes[directives..])?);
                    Ok(out)
                })?;
                if !this.tagged_template_declarations.is_empty() {
                    let declarations = std::mem::take(&mut this.tagged_template_declarations)
                        .into_iter()
                        .map(|name| this.arena.create_variable_declaration(name, NodeIndex::NONE))
                        .collect();
                    visited.push(this.arena.create_variable_statement(declarations));
                }
                let mut statements = merge_lexical_environment(this.arena, visited, hoisted);
                this.insert_capture_this_if_needed(&mut statements, source_file)?;
                update_statements(this.arena, source_file, statements)
            },
        )?;

        if self.hook.substitutes_this() {
            self.context.enable_substitution(SyntaxKind::ThisKeyword);
            for kind in FUNCTION_LIKE_KINDS {
                self.context.enable_emit_notification(kind);
            }
        }
        if self.hook.substitutes_block_scoped_bindings() {
            self.context.enable_substitution(SyntaxKind::Identifier);
        }
        debug!(external_module = self.is_external_module, "es2015 pass done");
        self.context.register_hook(Box::new(self.hook));
        Ok(root)
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    fn in_lexical_environment<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EmitResult<T>,
    ) -> EmitResult<(T, Vec<NodeIndex>)> {
        self.context.start_lexical_environment();
        let result = f(self);
        let hoisted = self.context.end_lexical_environment(self.arena);
        Ok((result?, hoisted?))
    }

    /// Run `f` with no converted loop in scope, as inside any function.
    fn outside_converted_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.converted_loop_state.take();
        let result = f(self);
        self.converted_loop_state = saved;
        result
    }

    fn hoist_variable(&mut self, name: NodeIndex) -> EmitResult<()> {
        self.context.hoist_variable_declaration(name)
    }

    fn key(&self, node: NodeIndex) -> NodeIndex {
        resolver_key(self.arena, node)
    }

    /// `this` that prints as `this` even where `_this` is substituted.
    fn create_actual_this(&mut self) -> NodeIndex {
        let this = self.arena.create_this();
        self.arena.add_emit_flags(this, EmitFlags::NO_SUBSTITUTION);
        this
    }

    fn create_captured_this_name(&mut self) -> NodeIndex {
        self.hook.enable_captured_this();
        self.arena.create_file_level_unique_name("_this")
    }

    fn create_super_name(&mut self) -> NodeIndex {
        self.arena.create_file_level_unique_name("_super")
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn should_visit(&self, node: NodeIndex, kind: SyntaxKind, flags: TransformFlags) -> bool {
        if flags.intersects(TransformFlags::CONTAINS_ES2015) || self.converted_loop_state.is_some() {
            return true;
        }
        if flags.contains(TransformFlags::CONTAINS_LEXICAL_THIS)
            && self.hierarchy_facts.contains(HierarchyFacts::ARROW_FUNCTION)
        {
            return true;
        }
        if self
            .hierarchy_facts
            .contains(HierarchyFacts::CONSTRUCTOR_WITH_CAPTURED_SUPER)
            && flags.intersects(TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION)
        {
            return true;
        }
        kind.is_iteration_statement() && self.should_convert_iteration_statement(node)
    }

    fn visit_javascript(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let (kind, flags) = {
            let n = self.arena.node(node)?;
            (n.kind(), n.transform_flags)
        };
        if !self.should_visit(node, kind, flags) {
            return Ok(single(node));
        }

        let data = self.arena.data(node)?.clone();
        trace!(?kind, "visiting es2015 node");
        match data {
            NodeData::ClassDeclaration(_) => self.visit_class_declaration(node),
            NodeData::ClassExpression(_) => Ok(single(self.visit_class_expression(node)?)),

            NodeData::ArrowFunction(f) => Ok(single(self.visit_arrow_function(node, f)?)),
            NodeData::FunctionExpression(f) => Ok(single(self.visit_function_expression(node, f)?)),
            NodeData::FunctionDeclaration(f) => Ok(single(self.visit_function_declaration(node, f)?)),
            NodeData::GetAccessor(f) | NodeData::SetAccessor(f) => {
                Ok(single(self.visit_accessor_declaration(node, kind, f)?))
            }
            NodeData::MethodDeclaration(f) => Ok(single(self.visit_object_literal_method(node, f)?)),

            NodeData::VariableStatement { declaration_list } => self.visit_variable_statement(node, declaration_list),
            NodeData::VariableDeclarationList { .. } => Ok(single(self.visit_variable_declaration_list(node)?)),
            NodeData::VariableDeclaration { .. } => self.visit_variable_declaration(node),

            NodeData::LabeledStatement { .. } => self.visit_labeled_statement(node),
            NodeData::DoStatement { .. } | NodeData::WhileStatement { .. } => {
                self.visit_do_or_while_statement(node, NodeIndex::NONE)
            }
            NodeData::ForStatement { .. } => self.visit_for_statement(node, NodeIndex::NONE),
            NodeData::ForInStatement { .. } => self.visit_for_in_statement(node, NodeIndex::NONE),
            NodeData::ForOfStatement { .. } => self.visit_for_of_statement(node, NodeIndex::NONE),
            NodeData::BreakStatement { label } => self.visit_break_or_continue_statement(node, true, label),
            NodeData::ContinueStatement { label } => self.visit_break_or_continue_statement(node, false, label),
            NodeData::ReturnStatement { expression } => self.visit_return_statement(node, expression),
            NodeData::SwitchStatement { .. } => self.visit_switch_statement(node),
            NodeData::Block { .. } => Ok(single(self.visit_block(node)?)),
            NodeData::CatchClause {
                variable_declaration,
                block,
            } => Ok(single(self.visit_catch_clause(node, variable_declaration, block)?)),

            NodeData::ExpressionStatement { expression } => Ok(single(self.visit_expression_statement(node, expression)?)),
            NodeData::ParenthesizedExpression { expression } => {
                Ok(single(self.visit_parenthesized_expression(node, expression, false)?))
            }
            NodeData::BinaryExpression { .. } => Ok(single(self.visit_binary_expression(node, false)?)),

            NodeData::ObjectLiteralExpression { properties, multi_line } => {
                Ok(single(self.visit_object_literal_expression(node, properties, multi_line)?))
            }
            NodeData::ShorthandPropertyAssignment { name, .. } => {
                Ok(single(self.visit_shorthand_property_assignment(node, name)?))
            }
            NodeData::ComputedPropertyName { .. } => Ok(single(self.visit_computed_property_name(node)?)),
            NodeData::ArrayLiteralExpression { elements, multi_line } => {
                Ok(single(self.visit_array_literal_expression(node, elements, multi_line)?))
            }
            NodeData::CallExpression { .. } => Ok(single(self.visit_call_expression(node)?)),
            NodeData::NewExpression { .. } => Ok(single(self.visit_new_expression(node)?)),

            NodeData::NoSubstitutionTemplateLiteral(text) => {
                Ok(single(self.visit_no_substitution_template(node, &text.cooked)))
            }
            NodeData::TemplateExpression { .. } => Ok(single(self.visit_template_expression(node)?)),
            NodeData::TaggedTemplateExpression { .. } => Ok(single(self.visit_tagged_template_expression(node)?)),

            NodeData::ThisKeyword => Ok(single(self.visit_this_keyword(node))),
            NodeData::SuperKeyword => Ok(single(self.visit_super_keyword(false))),
            NodeData::Identifier(_) => Ok(single(self.visit_identifier(node))),
            NodeData::MetaProperty { .. } => Ok(single(self.visit_meta_property(node))),

            _ => Ok(single(visit_each_child(self, node)?)),
        }
    }

    // =========================================================================
    // Statements and expressions
    // =========================================================================

    fn visit_block(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let (exclude, include) = if self.hierarchy_facts.contains(HierarchyFacts::ITERATION_STATEMENT) {
            (
                HierarchyFacts::ITERATION_STATEMENT_BLOCK_EXCLUDES,
                HierarchyFacts::ITERATION_STATEMENT_BLOCK_INCLUDES,
            )
        } else {
            (HierarchyFacts::BLOCK_EXCLUDES, HierarchyFacts::BLOCK_INCLUDES)
        };
        with_subtree(self, exclude, include, HierarchyFacts::NONE, HierarchyFacts::NONE, |this| {
            visit_each_child(this, node)
        })
    }

    fn visit_expression_statement(&mut self, node: NodeIndex, expression: NodeIndex) -> EmitResult<NodeIndex> {
        let visited = self.visit_expression_with_unused_result(expression)?;
        Ok(self
            .arena
            .update_node(node, NodeData::ExpressionStatement { expression: visited }))
    }

    /// Visit an expression whose value is discarded: destructuring
    /// assignments then need not produce the assigned value.
    fn visit_expression_with_unused_result(&mut self, expression: NodeIndex) -> EmitResult<NodeIndex> {
        if expression.is_none() {
            return Ok(expression);
        }
        let Some(kind) = self.arena.kind(expression) else {
            return Ok(expression);
        };
        if !self.should_visit(expression, kind, self.arena.transform_flags(expression)) {
            return Ok(expression);
        }
        match self.arena.data(expression)?.clone() {
            NodeData::ParenthesizedExpression { expression: inner } => {
                self.visit_parenthesized_expression(expression, inner, true)
            }
            NodeData::BinaryExpression { .. } => self.visit_binary_expression(expression, true),
            _ => visit_node(self, expression),
        }
    }

    fn visit_parenthesized_expression(
        &mut self,
        node: NodeIndex,
        expression: NodeIndex,
        result_is_unused: bool,
    ) -> EmitResult<NodeIndex> {
        let visited = if result_is_unused {
            self.visit_expression_with_unused_result(expression)?
        } else {
            visit_node(self, expression)?
        };
        Ok(self
            .arena
            .update_node(node, NodeData::ParenthesizedExpression { expression: visited }))
    }

    fn visit_binary_expression(&mut self, node: NodeIndex, result_is_unused: bool) -> EmitResult<NodeIndex> {
        let NodeData::BinaryExpression { left, operator, right } = self.arena.data(node)?.clone() else {
            return Ok(node);
        };
        if operator == SyntaxKind::EqualsToken
            && matches!(
                self.arena.kind(left),
                Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::ArrayLiteralExpression)
            )
        {
            return self.flatten_destructuring_assignment(node, !result_is_unused);
        }
        if operator == SyntaxKind::CommaToken && result_is_unused {
            let left = self.visit_expression_with_unused_result(left)?;
            let right = self.visit_expression_with_unused_result(right)?;
            return Ok(self
                .arena
                .update_node(node, NodeData::BinaryExpression { left, operator, right }));
        }
        visit_each_child(self, node)
    }

    /// `new.target` is captured per function as `_newTarget`.
    fn visit_meta_property(&mut self, node: NodeIndex) -> NodeIndex {
        let is_new_target = matches!(
            self.arena.get(node).map(|n| &n.data),
            Some(NodeData::MetaProperty { keyword: SyntaxKind::NewKeyword, name })
                if self.arena.identifier_text(*name) == "target"
        );
        if !is_new_target {
            return node;
        }
        if self.hierarchy_facts.contains(HierarchyFacts::COMPUTED_PROPERTY_NAME) {
            self.hierarchy_facts |= HierarchyFacts::NEW_TARGET_IN_COMPUTED_PROPERTY_NAME;
        } else {
            self.hierarchy_facts |= HierarchyFacts::NEW_TARGET;
        }
        let name = self.arena.create_file_level_unique_name("_newTarget");
        self.arena.set_text_range_from(name, node);
        name
    }

    /// A computed name is evaluated in the enclosing function, so a
    /// `new.target` inside it belongs to that function.
    fn visit_computed_property_name(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let ancestor = crate::hierarchy_facts::enter_subtree(
            &mut self.hierarchy_facts,
            HierarchyFacts::COMPUTED_PROPERTY_NAME_EXCLUDES,
            HierarchyFacts::COMPUTED_PROPERTY_NAME_INCLUDES,
        );
        let result = visit_each_child(self, node);
        let include = if self
            .hierarchy_facts
            .contains(HierarchyFacts::NEW_TARGET_IN_COMPUTED_PROPERTY_NAME)
        {
            HierarchyFacts::NEW_TARGET
        } else {
            HierarchyFacts::NONE
        };
        crate::hierarchy_facts::exit_subtree(
            &mut self.hierarchy_facts,
            ancestor,
            HierarchyFacts::NEW_TARGET_IN_COMPUTED_PROPERTY_NAME,
            include,
        );
        result
    }

    /// `catch ({ message })` binds a temp and destructures it in the block.
    fn visit_catch_clause(
        &mut self,
        node: NodeIndex,
        variable_declaration: NodeIndex,
        block: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        let name = match self.arena.get(variable_declaration).map(|n| &n.data) {
            Some(NodeData::VariableDeclaration { name, .. }) => *name,
            _ => NodeIndex::NONE,
        };
        if name.is_none() || !tsemit_ast::utilities::is_binding_pattern(self.arena, name) {
            return visit_each_child(self, node);
        }
        let temp = self.arena.create_temp_variable();
        let declarations = self.flatten_destructuring_binding(variable_declaration, temp, false)?;
        let list = self.arena.create_variable_declaration_list(declarations, NodeFlags::NONE);
        self.arena.set_text_range_from(list, variable_declaration);
        let statement = self
            .arena
            .create_variable_statement_from_list(list, tsemit_ast::ModifierFlags::NONE);
        let block = self.visit_block(block)?;
        let mut statements = vec![statement];
        statements.extend(statements_of(self.arena, block)?.nodes);
        let block = update_statements(self.arena, block, statements)?;
        let catch_variable = self.arena.create_variable_declaration(temp, NodeIndex::NONE);
        self.arena.set_text_range_from(catch_variable, variable_declaration);
        Ok(self.arena.update_node(
            node,
            NodeData::CatchClause {
                variable_declaration: catch_variable,
                block,
            },
        ))
    }
}

impl HierarchyScoped for Es2015Transformer<'_, '_> {
    fn hierarchy_facts_mut(&mut self) -> &mut HierarchyFacts {
        &mut self.hierarchy_facts
    }
}

impl Visitor for Es2015Transformer<'_, '_> {
    fn arena(&mut self) -> &mut NodeArena {
        self.arena
    }

    fn visit(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        self.visit_javascript(node)
    }
}

/// Kinds whose emission decides how `this` prints inside them.
const FUNCTION_LIKE_KINDS: [SyntaxKind; 7] = [
    SyntaxKind::FunctionDeclaration,
    SyntaxKind::FunctionExpression,
    SyntaxKind::ArrowFunction,
    SyntaxKind::MethodDeclaration,
    SyntaxKind::GetAccessor,
    SyntaxKind::SetAccessor,
    SyntaxKind::Constructor,
];
