//! TypeScript syntax removal.
//!
//! The first pass over every file. It erases type annotations and
//! declarations that only exist at compile time, and rewrites the
//! TypeScript-only runtime constructs into plain ES2015:
//!
//! - parameter properties and property initializers move into the constructor
//! - decorators become `__decorate` calls after the class
//! - namespaces and enums become IIFEs over a `var`
//! - unused import aliases are elided
//!
//! Subtrees whose transform flags carry no TypeScript facts are returned
//! untouched.

mod classes;
mod decorators;
mod imports;
mod namespaces;
mod substitutions;

pub use substitutions::TypeScriptHook;

use crate::transform_context::TransformContext;
use crate::transforms::utilities::{
    binding_pattern_to_assignment_pattern, function_data_of_kind, is_statement_kind, is_this_parameter,
    strip_typescript_modifiers,
};
use crate::transforms::visitor::{
    Visitor, VisitResult, elided, many, merge_lexical_environment, single, statements_of, update_statements,
    visit_data, visit_each_child, visit_node, visit_nodes,
};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};
use tsemit_ast::utilities::{get_property_name_text, is_binding_pattern, is_external_module};
use tsemit_ast::{
    EmitFlags, FunctionData, ModifierFlags, NodeArena, NodeData, NodeIndex, NodeList, SyntaxKind, TextRange,
    TransformFlags,
};
use tsemit_common::{EmitResult, NO_POS};

/// Transform facts that make a subtree worth visiting.
const TYPESCRIPT_FACTS: TransformFlags = TransformFlags::CONTAINS_TYPESCRIPT
    .union(TransformFlags::CONTAINS_DECORATORS)
    .union(TransformFlags::CONTAINS_PARAMETER_PROPERTY)
    .union(TransformFlags::CONTAINS_PROPERTY_INITIALIZER);

pub struct TypeScriptTransformer<'t, 'a> {
    arena: &'t mut NodeArena,
    context: &'t mut TransformContext<'a>,
    is_external_module: bool,
    /// Names already declared in each open block-like scope, innermost last.
    /// A namespace or enum whose name is already there merges with it and
    /// gets no `var` of its own.
    declared_names: Vec<FxHashSet<String>>,
    /// Namespace declarations being transformed, innermost last.
    namespace_stack: Vec<NodeIndex>,
    hook: TypeScriptHook,
}

impl<'t, 'a> TypeScriptTransformer<'t, 'a> {
    pub fn new(arena: &'t mut NodeArena, context: &'t mut TransformContext<'a>) -> Self {
        let remove_comments = context.options.remove_comments;
        TypeScriptTransformer {
            arena,
            context,
            is_external_module: false,
            declared_names: Vec::new(),
            namespace_stack: Vec::new(),
            hook: TypeScriptHook::new(remove_comments),
        }
    }

    pub fn transform_source_file(mut self, source_file: NodeIndex) -> EmitResult<NodeIndex> {
        if self.arena.source_file(source_file)?.is_declaration_file {
            return Ok(source_file);
        }
        self.is_external_module = is_external_module(self.arena, source_file);
        let statements = statements_of(self.arena, source_file)?;

        let (visited, hoisted) = self.in_lexical_environment(|this| {
            this.with_declaration_scope(|this| visit_nodes(this, &statements.nodes))
        })?;
        let statements = merge_lexical_environment(self.arena, visited, hoisted);
        let root = update_statements(self.arena, source_file, statements)?;

        self.context.enable_substitution(SyntaxKind::PropertyAccessExpression);
        self.context.enable_substitution(SyntaxKind::ElementAccessExpression);
        if self.hook.substitutes_identifiers() {
            self.context.enable_substitution(SyntaxKind::Identifier);
            self.context.enable_substitution(SyntaxKind::ShorthandPropertyAssignment);
        }
        debug!(external_module = self.is_external_module, "typescript pass done");
        self.context.register_hook(Box::new(self.hook));
        Ok(root)
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Run `f` in a fresh lexical environment, returning the hoisted statements.
    fn in_lexical_environment<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EmitResult<T>,
    ) -> EmitResult<(T, Vec<NodeIndex>)> {
        self.context.start_lexical_environment();
        let result = f(self);
        let hoisted = self.context.end_lexical_environment(self.arena);
        Ok((result?, hoisted?))
    }

    fn with_declaration_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> EmitResult<T>) -> EmitResult<T> {
        self.declared_names.push(FxHashSet::default());
        let result = f(self);
        self.declared_names.pop();
        result
    }

    /// Record the name `declaration` introduces. Returns `false` when the
    /// scope already declares that name.
    fn record_declaration_name(&mut self, declaration: NodeIndex) -> bool {
        let name = self.arena.declaration_name_node(declaration);
        if name.is_none() {
            return true;
        }
        let text = self.arena.identifier_text(name).to_string();
        match self.declared_names.last_mut() {
            Some(scope) => scope.insert(text),
            None => true,
        }
    }

    fn in_source_file_scope(&self) -> bool {
        self.declared_names.len() <= 1 && self.namespace_stack.is_empty()
    }

    fn is_namespace_export(&self, node: NodeIndex) -> bool {
        !self.namespace_stack.is_empty() && self.arena.has_modifier(node, ModifierFlags::EXPORT)
    }

    /// Modifiers a declaration keeps: TypeScript-only ones go, and so does
    /// `export` inside a namespace (the namespace assigns its exports).
    fn emitted_modifiers(&self, node: NodeIndex) -> ModifierFlags {
        let mut modifiers = strip_typescript_modifiers(self.arena.modifiers(node));
        if !self.namespace_stack.is_empty() {
            modifiers -= ModifierFlags::EXPORT | ModifierFlags::DEFAULT;
        }
        modifiers
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn visit_typescript(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let (kind, flags, modifiers) = {
            let n = self.arena.node(node)?;
            (n.kind(), n.transform_flags, n.modifiers)
        };

        if kind.is_type_node() && kind != SyntaxKind::ExpressionWithTypeArguments {
            return Ok(elided());
        }
        if modifiers.contains(ModifierFlags::AMBIENT) {
            return Ok(if is_statement_kind(kind) {
                single(self.arena.create_not_emitted_statement(node))
            } else {
                elided()
            });
        }
        if matches!(kind, SyntaxKind::ClassDeclaration | SyntaxKind::FunctionDeclaration) {
            self.record_declaration_name(node);
        }
        if !flags.intersects(TYPESCRIPT_FACTS) && !self.is_namespace_export(node) {
            return Ok(single(node));
        }

        let data = self.arena.data(node)?.clone();
        trace!(?kind, "visiting typescript node");
        match data {
            NodeData::InterfaceDeclaration { .. } | NodeData::TypeAliasDeclaration { .. } => {
                Ok(single(self.arena.create_not_emitted_statement(node)))
            }
            NodeData::PropertySignature { .. }
            | NodeData::MethodSignature { .. }
            | NodeData::IndexSignature { .. }
            | NodeData::TypeParameter { .. }
            | NodeData::Decorator { .. }
            | NodeData::PropertyDeclaration { .. } => Ok(elided()),

            NodeData::HeritageClause { token, .. } if token == SyntaxKind::ImplementsKeyword => Ok(elided()),
            NodeData::ExpressionWithTypeArguments { expression, .. } => Ok(single(visit_data(
                self,
                node,
                NodeData::ExpressionWithTypeArguments {
                    expression,
                    type_arguments: None,
                },
            )?)),

            NodeData::ClassDeclaration(class) => self.visit_class_declaration(node, class),
            NodeData::ClassExpression(class) => self.visit_class_expression(node, class),

            NodeData::FunctionDeclaration(f)
            | NodeData::FunctionExpression(f)
            | NodeData::ArrowFunction(f)
            | NodeData::MethodDeclaration(f)
            | NodeData::GetAccessor(f)
            | NodeData::SetAccessor(f)
            | NodeData::Constructor(f) => {
                let name = visit_node(self, f.name)?;
                self.visit_function_like(node, kind, f, name)
            }
            NodeData::Parameter { .. } => self.visit_parameter(node),

            NodeData::VariableStatement { declaration_list } if self.is_namespace_export(node) => {
                self.visit_exported_variable_statement(node, declaration_list)
            }
            NodeData::VariableDeclaration { name, initializer, .. } => Ok(single(visit_data(
                self,
                node,
                NodeData::VariableDeclaration {
                    name,
                    exclamation: false,
                    type_node: NodeIndex::NONE,
                    initializer,
                },
            )?)),

            NodeData::CallExpression { expression, arguments, .. } => Ok(single(visit_data(
                self,
                node,
                NodeData::CallExpression {
                    expression,
                    type_arguments: None,
                    arguments,
                },
            )?)),
            NodeData::NewExpression { expression, arguments, .. } => Ok(single(visit_data(
                self,
                node,
                NodeData::NewExpression {
                    expression,
                    type_arguments: None,
                    arguments,
                },
            )?)),
            NodeData::TaggedTemplateExpression { tag, template, .. } => Ok(single(visit_data(
                self,
                node,
                NodeData::TaggedTemplateExpression {
                    tag,
                    type_arguments: None,
                    template,
                },
            )?)),

            NodeData::AsExpression { expression, .. }
            | NodeData::TypeAssertionExpression { expression, .. }
            | NodeData::NonNullExpression { expression } => {
                let expression = visit_node(self, expression)?;
                Ok(single(self.arena.create_partially_emitted(expression, node)))
            }
            NodeData::ParenthesizedExpression { expression } => self.visit_parenthesized_expression(node, expression),

            NodeData::EnumDeclaration { .. } => self.visit_enum_declaration(node),
            NodeData::ModuleDeclaration { .. } => self.visit_module_declaration(node),

            NodeData::ImportDeclaration { .. } => self.visit_import_declaration(node),
            NodeData::ImportEqualsDeclaration { .. } => self.visit_import_equals_declaration(node),
            NodeData::ExportDeclaration { .. } => self.visit_export_declaration(node),
            NodeData::ExportAssignment { .. } => self.visit_export_assignment(node),

            NodeData::Block { .. } | NodeData::ModuleBlock { .. } | NodeData::CaseBlock { .. } => {
                Ok(single(self.with_declaration_scope(|this| visit_each_child(this, node))?))
            }

            _ => Ok(single(visit_each_child(self, node)?)),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// `(<T>x).y` loses its parentheses along with the assertion; the parent
    /// re-parenthesizes when precedence requires it.
    fn visit_parenthesized_expression(&mut self, node: NodeIndex, expression: NodeIndex) -> EmitResult<VisitResult> {
        if is_assertion(self.arena, expression) {
            let expression = visit_node(self, expression)?;
            return Ok(single(self.arena.create_partially_emitted(expression, node)));
        }
        Ok(single(visit_each_child(self, node)?))
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Function-likes lose type parameters, return types, `this` parameters
    /// and TypeScript modifiers. Overloads (no body) disappear.
    fn visit_function_like(
        &mut self,
        node: NodeIndex,
        kind: SyntaxKind,
        f: FunctionData,
        name: NodeIndex,
    ) -> EmitResult<VisitResult> {
        if f.body.is_none() {
            return Ok(if kind == SyntaxKind::FunctionDeclaration {
                single(self.arena.create_not_emitted_statement(node))
            } else {
                elided()
            });
        }

        let parameters = self.visit_parameter_list(&f.parameters)?;
        let body = if self.arena.is_kind(f.body, SyntaxKind::Block) {
            self.visit_function_body(f.body)?
        } else {
            visit_node(self, f.body)?
        };
        let data = function_data_of_kind(
            kind,
            FunctionData {
                decorators: NodeList::default(),
                asterisk: f.asterisk,
                question: false,
                name,
                type_parameters: None,
                parameters,
                return_type: NodeIndex::NONE,
                body,
            },
        )?;

        let exported_from_namespace = kind == SyntaxKind::FunctionDeclaration && self.is_namespace_export(node);
        let modifiers = self.emitted_modifiers(node);
        let updated = self.arena.update_node_with_modifiers(node, data, modifiers);
        if exported_from_namespace {
            let export = self.create_namespace_export_statement(node)?;
            return Ok(many([updated, export]));
        }
        Ok(single(updated))
    }

    fn visit_parameter_list(&mut self, parameters: &NodeList) -> EmitResult<NodeList> {
        let mut out = Vec::with_capacity(parameters.len());
        for parameter in parameters.iter() {
            if is_this_parameter(self.arena, parameter) {
                continue;
            }
            out.extend(self.visit_parameter(parameter)?);
        }
        if out == parameters.nodes {
            return Ok(parameters.clone());
        }
        Ok(parameters.with_nodes(out))
    }

    fn visit_parameter(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        if is_this_parameter(self.arena, node) {
            return Ok(elided());
        }
        let NodeData::Parameter {
            dot_dot_dot,
            name,
            initializer,
            ..
        } = self.arena.data(node)?.clone()
        else {
            return Ok(single(node));
        };
        let name = visit_node(self, name)?;
        let initializer = visit_node(self, initializer)?;
        let data = NodeData::Parameter {
            decorators: NodeList::default(),
            dot_dot_dot,
            name,
            question: false,
            type_node: NodeIndex::NONE,
            initializer,
        };
        Ok(single(self.arena.update_node_with_modifiers(node, data, ModifierFlags::NONE)))
    }

    fn visit_function_body(&mut self, body: NodeIndex) -> EmitResult<NodeIndex> {
        let statements = statements_of(self.arena, body)?;
        let saved_namespaces = std::mem::take(&mut self.namespace_stack);
        let result = self.in_lexical_environment(|this| {
            this.with_declaration_scope(|this| visit_nodes(this, &statements.nodes))
        });
        self.namespace_stack = saved_namespaces;
        let (visited, hoisted) = result?;
        let statements = merge_lexical_environment(self.arena, visited, hoisted);
        update_statements(self.arena, body, statements)
    }

    // =========================================================================
    // Namespace exports
    // =========================================================================

    /// `N.name`, where `N` is the innermost namespace's parameter.
    fn namespace_member_name(&mut self, name: NodeIndex) -> EmitResult<NodeIndex> {
        let Some(&namespace) = self.namespace_stack.last() else {
            return self.arena.get_synthesized_clone(name);
        };
        let container = self.arena.get_generated_name_for_node(namespace);
        let member = self.arena.get_synthesized_clone(name)?;
        self.arena.add_emit_flags(member, EmitFlags::NO_COMMENTS | EmitFlags::NO_SOURCE_MAP);
        let access = self.arena.create_property_access(container, member);
        self.arena.set_text_range_from(access, name);
        Ok(access)
    }

    /// `N.f = f;` after an exported declaration inside a namespace.
    fn create_namespace_export_statement(&mut self, declaration: NodeIndex) -> EmitResult<NodeIndex> {
        let name = self.arena.declaration_name_node(declaration);
        let target = if name.is_some() {
            self.namespace_member_name(name)?
        } else {
            let generated = self.arena.get_generated_name_for_node(declaration);
            self.namespace_member_name(generated)?
        };
        let local = self.arena.get_local_name(declaration)?;
        let assignment = self.arena.create_assignment(target, local);
        let statement = self.arena.create_expression_statement(assignment);
        let end = self.arena.range(declaration).end;
        self.arena.set_source_map_range(statement, TextRange { pos: NO_POS, end });
        Ok(statement)
    }

    /// `export var x = 1, y;` inside a namespace becomes `N.x = 1;`.
    /// Declarations without an initializer only declare the export.
    fn visit_exported_variable_statement(&mut self, node: NodeIndex, list: NodeIndex) -> EmitResult<VisitResult> {
        let NodeData::VariableDeclarationList { declarations } = self.arena.data(list)?.clone() else {
            return Ok(single(node));
        };
        let mut expressions = Vec::new();
        for declaration in declarations.iter() {
            let NodeData::VariableDeclaration { name, initializer, .. } = self.arena.data(declaration)?.clone() else {
                continue;
            };
            if initializer.is_none() {
                continue;
            }
            let value = visit_node(self, initializer)?;
            let target = if is_binding_pattern(self.arena, name) {
                let namespace = self.namespace_stack.last().copied().unwrap_or(NodeIndex::NONE);
                binding_pattern_to_assignment_pattern(self.arena, name, &mut |arena, id| {
                    let container = arena.get_generated_name_for_node(namespace);
                    let member = arena.get_synthesized_clone(id)?;
                    Ok(arena.create_property_access(container, member))
                })?
            } else {
                self.namespace_member_name(name)?
            };
            let assignment = self.arena.create_assignment(target, value);
            expressions.push(self.arena.set_original_and_range(assignment, declaration));
        }
        let Some(expression) = self.arena.inline_expressions(&expressions) else {
            return Ok(elided());
        };
        let statement = self.arena.create_expression_statement(expression);
        Ok(single(self.arena.set_original_and_range(statement, node)))
    }

    /// Text of a member or declaration name, when it has a static one.
    fn property_name_text(&self, name: NodeIndex) -> Option<String> {
        get_property_name_text(self.arena, name)
    }
}

impl Visitor for TypeScriptTransformer<'_, '_> {
    fn arena(&mut self) -> &mut NodeArena {
        self.arena
    }

    fn visit(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        self.visit_typescript(node)
    }
}

/// A type assertion, possibly under further assertions or partial emits.
fn is_assertion(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(node),
        Some(
            SyntaxKind::AsExpression
                | SyntaxKind::TypeAssertionExpression
                | SyntaxKind::NonNullExpression
                | SyntaxKind::PartiallyEmittedExpression
        )
    )
}
