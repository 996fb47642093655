//! Declaration file (`.d.ts`) output.
//!
//! `DeclarationTransformer` rewrites a parse tree into its declaration
//! shape, which the ordinary printer then writes:
//!
//! ```typescript
//! // input.ts
//! export function add(a: number, b = 1) { return a + b; }
//! export class Calculator {
//!     private value = 0;
//!     constructor(readonly base: number) {}
//! }
//! ```
//!
//! ```typescript
//! // input.d.ts
//! export declare function add(a: number, b?: number): number;
//! export declare class Calculator {
//!     private value;
//!     readonly base: number;
//!     constructor(base: number);
//! }
//! ```
//!
//! Missing annotations are filled from `EmitResolver::serialize_type_of_declaration`,
//! falling back to `any`. Every declaration that ends up in the output is
//! handed to the `DeclarationDiagnosticsProvider`; its diagnostics are
//! collected and never stop emission.

use crate::resolver::{
    ConstantValue, DeclarationDiagnosticsProvider, EmitResolver, VisibilityDiagnostic, resolver_key,
};
use crate::transforms::utilities::{collect_binding_names, create_reference_clone};
use crate::transforms::visitor::{statements_of, update_statements};
use rustc_hash::FxHashSet;
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};
use tsemit_ast::utilities::{get_property_name_text, is_binding_pattern, is_external_module};
use tsemit_ast::{
    ClassData, FunctionData, ModifierFlags, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList, SyntaxKind,
};
use tsemit_common::{EmitError, EmitResult};

type Statements = SmallVec<[NodeIndex; 2]>;

/// Modifiers a top-level declaration keeps in declaration text.
const DECLARATION_MODIFIERS: ModifierFlags = ModifierFlags::EXPORT
    .union(ModifierFlags::DEFAULT)
    .union(ModifierFlags::AMBIENT)
    .union(ModifierFlags::CONST)
    .union(ModifierFlags::ABSTRACT);

/// Modifiers a class member keeps.
const MEMBER_MODIFIERS: ModifierFlags = ModifierFlags::ACCESSIBILITY_MODIFIER
    .union(ModifierFlags::STATIC)
    .union(ModifierFlags::READONLY)
    .union(ModifierFlags::ABSTRACT);

/// The declaration tree of one file plus what the diagnostics provider reported.
#[derive(Debug)]
pub struct DeclarationOutput {
    pub root: NodeIndex,
    pub diagnostics: Vec<VisibilityDiagnostic>,
}

pub struct DeclarationTransformer<'t, 'a> {
    arena: &'t mut NodeArena,
    resolver: &'a dyn EmitResolver,
    diagnostics_provider: &'a dyn DeclarationDiagnosticsProvider,
    diagnostics: Vec<VisibilityDiagnostic>,
    /// Only exported declarations are visible in the current scope
    /// (module top level, non-ambient namespace bodies).
    exports_only: bool,
    namespace_depth: u32,
}

impl<'t, 'a> DeclarationTransformer<'t, 'a> {
    pub fn new(
        arena: &'t mut NodeArena,
        resolver: &'a dyn EmitResolver,
        diagnostics_provider: &'a dyn DeclarationDiagnosticsProvider,
    ) -> Self {
        DeclarationTransformer {
            arena,
            resolver,
            diagnostics_provider,
            diagnostics: Vec::new(),
            exports_only: false,
            namespace_depth: 0,
        }
    }

    pub fn transform_source_file(mut self, source_file: NodeIndex) -> EmitResult<DeclarationOutput> {
        if self.arena.source_file(source_file)?.is_declaration_file {
            return Ok(DeclarationOutput {
                root: source_file,
                diagnostics: Vec::new(),
            });
        }
        let is_module = is_external_module(self.arena, source_file);
        self.exports_only = is_module;
        let statements = statements_of(self.arena, source_file)?;
        let mut result = self.visit_statements(&statements)?;

        // A module whose exports were all elided must stay a module.
        if is_module && !result.iter().any(|&statement| self.is_module_indicator(statement)) {
            result.push(self.create_empty_export());
        }
        let root = update_statements(self.arena, source_file, result)?;
        debug!(
            external_module = is_module,
            diagnostics = self.diagnostics.len(),
            "declaration pass done"
        );
        Ok(DeclarationOutput {
            root,
            diagnostics: self.diagnostics,
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn visit_statements(&mut self, statements: &NodeList) -> EmitResult<Vec<NodeIndex>> {
        let mut result = Vec::with_capacity(statements.len());
        let mut overloads = OverloadTracker::default();
        for statement in statements.iter() {
            if overloads.is_implementation(self.arena, statement) {
                continue;
            }
            result.extend(self.visit_statement(statement)?);
        }
        Ok(result)
    }

    fn visit_statement(&mut self, node: NodeIndex) -> EmitResult<Statements> {
        let data = self.arena.data(node)?.clone();
        match data {
            NodeData::ImportDeclaration { .. }
            | NodeData::ImportEqualsDeclaration { .. }
            | NodeData::ExportDeclaration { .. } => Ok(smallvec![node]),
            NodeData::ExportAssignment {
                is_export_equals,
                expression,
            } => self.visit_export_assignment(node, is_export_equals, expression),
            _ if !self.is_visible_declaration(node) => {
                trace!(kind = ?self.arena.kind(node), "declaration not visible");
                Ok(Statements::new())
            }
            NodeData::VariableStatement { declaration_list } => self.visit_variable_statement(node, declaration_list),
            NodeData::FunctionDeclaration(f) => {
                self.check_visibility(node);
                let f = self.visit_signature(node, f, true)?;
                let modifiers = self.declaration_modifiers(node, true);
                Ok(smallvec![self.arena.update_node_with_modifiers(
                    node,
                    NodeData::FunctionDeclaration(f),
                    modifiers
                )])
            }
            NodeData::ClassDeclaration(c) => Ok(smallvec![self.visit_class_declaration(node, c)?]),
            NodeData::InterfaceDeclaration { .. } | NodeData::TypeAliasDeclaration { .. } => {
                self.check_visibility(node);
                let modifiers = self.declaration_modifiers(node, false);
                Ok(smallvec![self.arena.update_node_with_modifiers(node, data, modifiers)])
            }
            NodeData::EnumDeclaration { name, members } => Ok(smallvec![self.visit_enum_declaration(node, name, &members)?]),
            NodeData::ModuleDeclaration { name, body } => Ok(smallvec![self.visit_module_declaration(node, name, body)?]),
            _ => Ok(Statements::new()),
        }
    }

    fn is_visible_declaration(&self, node: NodeIndex) -> bool {
        let key = resolver_key(self.arena, node);
        if !self.resolver.is_declaration_visible(key) {
            return false;
        }
        if !self.exports_only || self.arena.has_modifier(node, ModifierFlags::EXPORT) {
            return true;
        }
        // `declare module "x"` and `declare global` augment from inside a module.
        match self.arena.get(node).map(|n| &n.data) {
            Some(NodeData::ModuleDeclaration { name, .. }) => {
                self.namespace_depth == 0
                    && (self.arena.is_kind(*name, SyntaxKind::StringLiteral)
                        || self.arena.node_flags(node).contains(NodeFlags::GLOBAL_AUGMENTATION))
            }
            _ => false,
        }
    }

    /// Modifiers of a declaration statement. Top-level values gain `declare`;
    /// namespace members are implicitly exported and ambient.
    fn declaration_modifiers(&self, node: NodeIndex, is_value: bool) -> ModifierFlags {
        let mut modifiers = self.arena.modifiers(node) & DECLARATION_MODIFIERS;
        if self.namespace_depth > 0 {
            modifiers -= ModifierFlags::EXPORT | ModifierFlags::DEFAULT | ModifierFlags::AMBIENT;
        } else if is_value && !modifiers.contains(ModifierFlags::DEFAULT) {
            modifiers |= ModifierFlags::AMBIENT;
        }
        modifiers
    }

    fn is_module_indicator(&self, statement: NodeIndex) -> bool {
        if self.arena.has_modifier(statement, ModifierFlags::EXPORT) {
            return true;
        }
        match self.arena.get(statement).map(|n| &n.data) {
            Some(
                NodeData::ImportDeclaration { .. }
                | NodeData::ExportDeclaration { .. }
                | NodeData::ExportAssignment { .. },
            ) => true,
            Some(NodeData::ImportEqualsDeclaration { module_reference, .. }) => {
                self.arena.is_kind(*module_reference, SyntaxKind::ExternalModuleReference)
            }
            _ => false,
        }
    }

    /// `export {};`
    fn create_empty_export(&mut self) -> NodeIndex {
        let export_clause = self.arena.create_node(NodeData::NamedExports {
            elements: NodeList::default(),
        });
        self.arena.create_node(NodeData::ExportDeclaration {
            export_clause,
            module_specifier: NodeIndex::NONE,
        })
    }

    /// `export default <expr>` only survives for plain names; anything else
    /// goes through a typed `_default` constant.
    fn visit_export_assignment(
        &mut self,
        node: NodeIndex,
        is_export_equals: bool,
        expression: NodeIndex,
    ) -> EmitResult<Statements> {
        if self.arena.is_kind(expression, SyntaxKind::Identifier) {
            return Ok(smallvec![node]);
        }
        self.check_visibility(node);
        let name = self.arena.create_identifier("_default");
        let type_node = self.inferred_type(node, false);
        let declaration = self.arena.create_node(NodeData::VariableDeclaration {
            name,
            exclamation: false,
            type_node,
            initializer: NodeIndex::NONE,
        });
        let list = self.arena.create_variable_declaration_list(vec![declaration], NodeFlags::CONST);
        let statement = self.arena.create_variable_statement_from_list(list, ModifierFlags::AMBIENT);
        let reference = self.arena.create_identifier("_default");
        let assignment = self.arena.update_node(
            node,
            NodeData::ExportAssignment {
                is_export_equals,
                expression: reference,
            },
        );
        Ok(smallvec![statement, assignment])
    }

    // =========================================================================
    // Variables
    // =========================================================================

    fn visit_variable_statement(&mut self, node: NodeIndex, declaration_list: NodeIndex) -> EmitResult<Statements> {
        let NodeData::VariableDeclarationList { declarations } = self.arena.data(declaration_list)?.clone() else {
            return Err(EmitError::internal("variable statement without a declaration list"));
        };
        let is_const = self.arena.node_flags(declaration_list).contains(NodeFlags::CONST);
        let mut visited = Vec::with_capacity(declarations.len());
        for declaration in declarations.iter() {
            self.visit_variable_declaration(declaration, is_const, &mut visited)?;
        }
        if visited.is_empty() {
            return Ok(Statements::new());
        }
        let list = self.arena.update_node(
            declaration_list,
            NodeData::VariableDeclarationList {
                declarations: declarations.with_nodes(visited),
            },
        );
        let modifiers = self.declaration_modifiers(node, true);
        Ok(smallvec![self.arena.update_node_with_modifiers(
            node,
            NodeData::VariableStatement { declaration_list: list },
            modifiers
        )])
    }

    fn visit_variable_declaration(&mut self, node: NodeIndex, is_const: bool, out: &mut Vec<NodeIndex>) -> EmitResult<()> {
        let NodeData::VariableDeclaration {
            name,
            type_node,
            initializer,
            ..
        } = self.arena.data(node)?.clone()
        else {
            return Err(EmitError::internal("expected a variable declaration"));
        };

        // `const { a, b } = f();` declares `a` and `b` separately.
        if is_binding_pattern(self.arena, name) {
            let mut names = Vec::new();
            collect_binding_names(self.arena, name, &mut names);
            for bound in names {
                let element = self.arena.parent(bound);
                let declaration_node = if element.is_some() { element } else { bound };
                self.check_visibility(declaration_node);
                let name = create_reference_clone(self.arena, bound)?;
                let type_node = self.inferred_type(declaration_node, false);
                let declaration = self.arena.create_node(NodeData::VariableDeclaration {
                    name,
                    exclamation: false,
                    type_node,
                    initializer: NodeIndex::NONE,
                });
                out.push(declaration);
            }
            return Ok(());
        }

        self.check_visibility(node);
        let (type_node, initializer) = if is_const && type_node.is_none() && self.is_literal_initializer(initializer) {
            (NodeIndex::NONE, initializer)
        } else {
            (self.type_or_inferred(type_node, node, false), NodeIndex::NONE)
        };
        out.push(self.arena.update_node(
            node,
            NodeData::VariableDeclaration {
                name,
                exclamation: false,
                type_node,
                initializer,
            },
        ));
        Ok(())
    }

    /// Literals a `const` or `readonly` declaration may keep as its initializer.
    fn is_literal_initializer(&self, initializer: NodeIndex) -> bool {
        match self.arena.get(initializer).map(|n| &n.data) {
            Some(
                NodeData::NumericLiteral { .. }
                | NodeData::StringLiteral { .. }
                | NodeData::TrueKeyword
                | NodeData::FalseKeyword,
            ) => true,
            Some(NodeData::PrefixUnaryExpression { operator, operand }) => {
                *operator == SyntaxKind::MinusToken && self.arena.is_kind(*operand, SyntaxKind::NumericLiteral)
            }
            _ => false,
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Drop the body, type every parameter and (when `has_return_type`)
    /// the result.
    fn visit_signature(&mut self, node: NodeIndex, mut f: FunctionData, has_return_type: bool) -> EmitResult<FunctionData> {
        let mut parameters = Vec::with_capacity(f.parameters.len());
        for parameter in f.parameters.iter() {
            parameters.push(self.visit_parameter(parameter)?);
        }
        f.parameters = f.parameters.with_nodes(parameters);
        f.decorators = NodeList::default();
        f.asterisk = false;
        f.body = NodeIndex::NONE;
        if has_return_type && f.return_type.is_none() {
            f.return_type = self.inferred_type(node, false);
        } else if !has_return_type {
            f.return_type = NodeIndex::NONE;
        }
        Ok(f)
    }

    fn visit_parameter(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::Parameter {
            dot_dot_dot,
            name,
            question,
            type_node,
            initializer,
            ..
        } = self.arena.data(node)?.clone()
        else {
            return Err(EmitError::internal("expected a parameter"));
        };
        self.check_visibility(node);
        let type_node = self.type_or_inferred(type_node, node, dot_dot_dot);
        let name = self.strip_binding_initializers(name)?;
        Ok(self.arena.update_node_with_modifiers(
            node,
            NodeData::Parameter {
                decorators: NodeList::default(),
                dot_dot_dot,
                name,
                question: question || (initializer.is_some() && !dot_dot_dot),
                type_node,
                initializer: NodeIndex::NONE,
            },
            ModifierFlags::NONE,
        ))
    }

    /// `{ a = 1, b: [c = 2] }` becomes `{ a, b: [c] }`.
    fn strip_binding_initializers(&mut self, name: NodeIndex) -> EmitResult<NodeIndex> {
        let data = self.arena.data(name)?.clone();
        let (elements, is_object) = match data {
            NodeData::ObjectBindingPattern { elements } => (elements, true),
            NodeData::ArrayBindingPattern { elements } => (elements, false),
            _ => return Ok(name),
        };
        let mut visited = Vec::with_capacity(elements.len());
        for element in elements.iter() {
            let updated = match self.arena.data(element)?.clone() {
                NodeData::BindingElement {
                    dot_dot_dot,
                    property_name,
                    name,
                    ..
                } => {
                    let name = self.strip_binding_initializers(name)?;
                    self.arena.update_node(
                        element,
                        NodeData::BindingElement {
                            dot_dot_dot,
                            property_name,
                            name,
                            initializer: NodeIndex::NONE,
                        },
                    )
                }
                _ => element,
            };
            visited.push(updated);
        }
        let elements = elements.with_nodes(visited);
        let data = if is_object {
            NodeData::ObjectBindingPattern { elements }
        } else {
            NodeData::ArrayBindingPattern { elements }
        };
        Ok(self.arena.update_node(name, data))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn visit_class_declaration(&mut self, node: NodeIndex, c: ClassData) -> EmitResult<NodeIndex> {
        self.check_visibility(node);
        let mut members = Vec::with_capacity(c.members.len());
        let mut overloads = OverloadTracker::default();
        let mut private_names = FxHashSet::default();
        for member in c.members.iter() {
            if overloads.is_implementation(self.arena, member) {
                continue;
            }
            self.visit_class_member(member, &mut members, &mut private_names)?;
        }
        let data = ClassData {
            decorators: NodeList::default(),
            members: c.members.with_nodes(members),
            ..c
        };
        let modifiers = self.declaration_modifiers(node, true);
        Ok(self
            .arena
            .update_node_with_modifiers(node, NodeData::ClassDeclaration(data), modifiers))
    }

    fn visit_class_member(
        &mut self,
        member: NodeIndex,
        out: &mut Vec<NodeIndex>,
        private_names: &mut FxHashSet<String>,
    ) -> EmitResult<()> {
        let modifiers = self.arena.modifiers(member) & MEMBER_MODIFIERS;
        let data = self.arena.data(member)?.clone();

        // Private members keep only their name: `private x;`.
        if modifiers.contains(ModifierFlags::PRIVATE) && !matches!(data, NodeData::Constructor(_)) {
            let name = self.arena.declaration_name_node(member);
            if name.is_none() {
                return Ok(());
            }
            if let Some(text) = get_property_name_text(self.arena, name)
                && !private_names.insert(text)
            {
                return Ok(());
            }
            let property = self.arena.create_node_with(
                NodeData::PropertyDeclaration {
                    decorators: NodeList::default(),
                    name,
                    question: false,
                    type_node: NodeIndex::NONE,
                    initializer: NodeIndex::NONE,
                },
                NodeFlags::NONE,
                modifiers - ModifierFlags::ABSTRACT,
            );
            out.push(self.arena.set_original_and_range(property, member));
            return Ok(());
        }

        match data {
            NodeData::PropertyDeclaration {
                name,
                question,
                type_node,
                initializer,
                ..
            } => {
                self.check_visibility(member);
                let keep_initializer = modifiers.contains(ModifierFlags::READONLY)
                    && type_node.is_none()
                    && self.is_literal_initializer(initializer);
                let (type_node, initializer) = if keep_initializer {
                    (NodeIndex::NONE, initializer)
                } else {
                    (self.type_or_inferred(type_node, member, false), NodeIndex::NONE)
                };
                out.push(self.arena.update_node_with_modifiers(
                    member,
                    NodeData::PropertyDeclaration {
                        decorators: NodeList::default(),
                        name,
                        question,
                        type_node,
                        initializer,
                    },
                    modifiers,
                ));
            }
            NodeData::MethodDeclaration(f) => {
                self.check_visibility(member);
                let f = self.visit_signature(member, f, true)?;
                out.push(
                    self.arena
                        .update_node_with_modifiers(member, NodeData::MethodDeclaration(f), modifiers),
                );
            }
            NodeData::Constructor(f) => {
                for parameter in f.parameters.iter() {
                    if let Some(property) = self.parameter_property(parameter)? {
                        out.push(property);
                    }
                }
                self.check_visibility(member);
                let f = self.visit_signature(member, f, false)?;
                out.push(
                    self.arena
                        .update_node_with_modifiers(member, NodeData::Constructor(f), modifiers),
                );
            }
            NodeData::GetAccessor(f) => {
                self.check_visibility(member);
                let f = self.visit_signature(member, f, true)?;
                out.push(
                    self.arena
                        .update_node_with_modifiers(member, NodeData::GetAccessor(f), modifiers),
                );
            }
            NodeData::SetAccessor(f) => {
                self.check_visibility(member);
                let f = self.visit_signature(member, f, false)?;
                out.push(
                    self.arena
                        .update_node_with_modifiers(member, NodeData::SetAccessor(f), modifiers),
                );
            }
            NodeData::IndexSignature { .. } => out.push(member),
            _ => {}
        }
        Ok(())
    }

    /// `constructor(private readonly x: T)` declares the property `x`.
    fn parameter_property(&mut self, parameter: NodeIndex) -> EmitResult<Option<NodeIndex>> {
        let modifiers = self.arena.modifiers(parameter) & ModifierFlags::PARAMETER_PROPERTY_MODIFIER;
        if modifiers.is_empty() {
            return Ok(None);
        }
        let NodeData::Parameter {
            name,
            question,
            type_node,
            ..
        } = self.arena.data(parameter)?.clone()
        else {
            return Ok(None);
        };
        if !self.arena.is_kind(name, SyntaxKind::Identifier) {
            return Ok(None);
        }
        let type_node = if modifiers.contains(ModifierFlags::PRIVATE) {
            NodeIndex::NONE
        } else {
            self.type_or_inferred(type_node, parameter, false)
        };
        let name = create_reference_clone(self.arena, name)?;
        let property = self.arena.create_node_with(
            NodeData::PropertyDeclaration {
                decorators: NodeList::default(),
                name,
                question,
                type_node,
                initializer: NodeIndex::NONE,
            },
            NodeFlags::NONE,
            modifiers,
        );
        self.arena.set_original(property, parameter);
        Ok(Some(property))
    }

    // =========================================================================
    // Enums and namespaces
    // =========================================================================

    fn visit_enum_declaration(&mut self, node: NodeIndex, name: NodeIndex, members: &NodeList) -> EmitResult<NodeIndex> {
        self.check_visibility(node);
        let mut visited = Vec::with_capacity(members.len());
        for member in members.iter() {
            let NodeData::EnumMember { name, .. } = self.arena.data(member)?.clone() else {
                continue;
            };
            let key = resolver_key(self.arena, member);
            let initializer = match self.resolver.get_constant_value(key) {
                Some(ConstantValue::Number(value)) if value < 0.0 => {
                    let operand = self.arena.create_number(-value);
                    self.arena.create_prefix(SyntaxKind::MinusToken, operand)
                }
                Some(ConstantValue::Number(value)) => self.arena.create_number(value),
                Some(ConstantValue::String(text)) => self.arena.create_string_literal(&text),
                None => NodeIndex::NONE,
            };
            visited.push(self.arena.update_node(member, NodeData::EnumMember { name, initializer }));
        }
        let modifiers = self.declaration_modifiers(node, true);
        Ok(self.arena.update_node_with_modifiers(
            node,
            NodeData::EnumDeclaration {
                name,
                members: members.with_nodes(visited),
            },
            modifiers,
        ))
    }

    fn visit_module_declaration(&mut self, node: NodeIndex, name: NodeIndex, body: NodeIndex) -> EmitResult<NodeIndex> {
        self.check_visibility(node);
        let ambient = self.arena.has_modifier(node, ModifierFlags::AMBIENT) || (!self.exports_only && self.namespace_depth > 0);
        let modifiers = self.declaration_modifiers(node, true);
        let body = self.visit_module_body(body, ambient)?;
        Ok(self
            .arena
            .update_node_with_modifiers(node, NodeData::ModuleDeclaration { name, body }, modifiers))
    }

    fn visit_module_body(&mut self, body: NodeIndex, ambient: bool) -> EmitResult<NodeIndex> {
        match self.arena.data(body)?.clone() {
            // `namespace A.B { }`
            NodeData::ModuleDeclaration { name, body: inner } => {
                let inner = self.visit_module_body(inner, ambient)?;
                Ok(self.arena.update_node(body, NodeData::ModuleDeclaration { name, body: inner }))
            }
            NodeData::ModuleBlock { statements } => {
                let saved = (self.exports_only, self.namespace_depth);
                self.exports_only = !ambient;
                self.namespace_depth += 1;
                let visited = self.visit_statements(&statements);
                (self.exports_only, self.namespace_depth) = saved;
                update_statements(self.arena, body, visited?)
            }
            _ => Ok(body),
        }
    }

    // =========================================================================
    // Types and diagnostics
    // =========================================================================

    fn type_or_inferred(&mut self, declared: NodeIndex, declaration: NodeIndex, rest: bool) -> NodeIndex {
        if declared.is_some() {
            declared
        } else {
            self.inferred_type(declaration, rest)
        }
    }

    /// The resolver's type text for `declaration`, or `any` (`any[]` for rest
    /// parameters).
    fn inferred_type(&mut self, declaration: NodeIndex, rest: bool) -> NodeIndex {
        let key = resolver_key(self.arena, declaration);
        if let Some(text) = self.resolver.serialize_type_of_declaration(key) {
            let type_name = self.arena.create_identifier(&text);
            return self.arena.create_node(NodeData::TypeReference {
                type_name,
                type_arguments: None,
            });
        }
        let any = self.arena.create_node(NodeData::KeywordType {
            keyword: SyntaxKind::AnyKeyword,
        });
        if rest {
            self.arena.create_node(NodeData::ArrayType { element_type: any })
        } else {
            any
        }
    }

    fn check_visibility(&mut self, node: NodeIndex) {
        let key = resolver_key(self.arena, node);
        if let Some(diagnostic) = self.diagnostics_provider.check_declaration(self.arena, key) {
            trace!(code = diagnostic.code, "declaration visibility diagnostic");
            self.diagnostics.push(diagnostic);
        }
    }
}

/// Recognizes the implementation that follows overload signatures; the
/// signatures already describe it.
#[derive(Default)]
struct OverloadTracker {
    signature_name: Option<String>,
}

impl OverloadTracker {
    fn is_implementation(&mut self, arena: &NodeArena, node: NodeIndex) -> bool {
        let (name, body) = match arena.get(node).map(|n| &n.data) {
            Some(NodeData::FunctionDeclaration(f) | NodeData::MethodDeclaration(f)) => {
                (get_property_name_text(arena, f.name), f.body)
            }
            Some(NodeData::Constructor(f)) => (Some("constructor".to_string()), f.body),
            _ => {
                self.signature_name = None;
                return false;
            }
        };
        if body.is_none() {
            self.signature_name = name;
            return false;
        }
        let is_implementation = name.is_some() && self.signature_name == name;
        self.signature_name = None;
        is_implementation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overload_tracker_skips_implementation_after_signatures() {
        let mut arena = NodeArena::new();
        let name = arena.create_identifier("f");
        let signature = arena.create_function_declaration(name, Vec::new(), NodeIndex::NONE);
        let body = arena.create_block(Vec::new(), false);
        let name = arena.create_identifier("f");
        let implementation = arena.create_function_declaration(name, Vec::new(), body);
        let name = arena.create_identifier("g");
        let other = arena.create_function_declaration(name, Vec::new(), body);

        let mut tracker = OverloadTracker::default();
        assert!(!tracker.is_implementation(&arena, signature));
        assert!(tracker.is_implementation(&arena, implementation));
        assert!(!tracker.is_implementation(&arena, other));
    }

    #[test]
    fn test_lone_implementation_is_kept() {
        let mut arena = NodeArena::new();
        let name = arena.create_identifier("f");
        let body = arena.create_block(Vec::new(), false);
        let function = arena.create_function_declaration(name, Vec::new(), body);
        let mut tracker = OverloadTracker::default();
        assert!(!tracker.is_implementation(&arena, function));
    }
}
