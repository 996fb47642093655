//! Class declarations and expressions.
//!
//! Classes stay ES2015 classes here. What changes is the member list:
//! property declarations disappear, their initializers move into the
//! constructor (instance) or after the class (static), parameter properties
//! become `this.x = x;` after the initial `super(...)` call, and decorated
//! classes become `let C = class C {}` so the decorators can replace the
//! binding.

use super::TypeScriptTransformer;
use crate::resolver::{NodeCheckFlags, resolver_key};
use crate::transforms::utilities::{is_static, is_this_parameter};
use crate::transforms::visitor::{
    Visitor, VisitResult, many, merge_lexical_environment, single, statements_of, update_statements, visit_node,
    visit_nodes,
};
use tracing::trace;
use tsemit_ast::utilities::{is_prologue_directive, is_simple_inlineable_expression, is_super_call_statement};
use tsemit_ast::{
    ClassData, EmitFlags, FunctionData, ModifierFlags, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList,
    SyntaxKind,
};
use tsemit_common::EmitResult;

impl TypeScriptTransformer<'_, '_> {
    pub(super) fn visit_class_declaration(&mut self, node: NodeIndex, class: ClassData) -> EmitResult<VisitResult> {
        let has_extends = has_extends_clause(self.arena, &class);
        let static_properties = initialized_properties(self.arena, &class, true);
        let is_decorated = should_emit_decorate_call_for_class(self.arena, &class);
        let name = if class.name.is_none() && (is_decorated || !static_properties.is_empty()) {
            self.arena.get_generated_name_for_node(node)
        } else {
            class.name
        };
        trace!(decorated = is_decorated, statics = static_properties.len(), "transforming class declaration");

        let mut pending = Vec::new();
        let heritage_clauses = self.visit_heritage_clauses(&class.heritage_clauses)?;
        let members = self.transform_class_members(node, &class, has_extends, &mut pending)?;

        let mut statements = Vec::new();
        let class_alias = if is_decorated { self.create_class_alias(node)? } else { None };
        let class_statement = if is_decorated {
            self.create_decorated_class_head(node, name, heritage_clauses, members, class_alias)?
        } else {
            let data = NodeData::ClassDeclaration(ClassData {
                decorators: NodeList::default(),
                name,
                type_parameters: None,
                heritage_clauses,
                members,
            });
            let modifiers = self.emitted_modifiers(node);
            let updated = self.arena.update_node_with_modifiers(node, data, modifiers);
            if !static_properties.is_empty() {
                self.arena.add_emit_flags(updated, EmitFlags::NO_TRAILING_SOURCE_MAP);
            }
            updated
        };
        statements.push(class_statement);

        if let Some(expression) = self.arena.inline_expressions(&pending) {
            statements.push(self.arena.create_expression_statement(expression));
        }
        for property in static_properties {
            let receiver = self.arena.get_declaration_name(node)?;
            statements.push(self.transform_initialized_property_statement(property, receiver)?);
        }

        self.add_class_element_decoration_statements(&mut statements, node, &class, false)?;
        self.add_class_element_decoration_statements(&mut statements, node, &class, true)?;
        self.add_constructor_decoration_statement(&mut statements, node, &class, class_alias)?;

        if self.is_namespace_export(node) {
            statements.push(self.create_namespace_export_statement(node)?);
        } else if is_decorated && self.namespace_stack.is_empty() && self.arena.has_modifier(node, ModifierFlags::EXPORT) {
            statements.push(self.create_external_module_export(node)?);
        }
        Ok(many(statements))
    }

    /// A class expression with static initializers becomes
    /// `(_a = class {}, _a.x = 1, _a)`.
    pub(super) fn visit_class_expression(&mut self, node: NodeIndex, class: ClassData) -> EmitResult<VisitResult> {
        let has_extends = has_extends_clause(self.arena, &class);
        let static_properties = initialized_properties(self.arena, &class, true);

        let mut pending = Vec::new();
        let heritage_clauses = self.visit_heritage_clauses(&class.heritage_clauses)?;
        let members = self.transform_class_members(node, &class, has_extends, &mut pending)?;
        let data = NodeData::ClassExpression(ClassData {
            decorators: NodeList::default(),
            name: class.name,
            type_parameters: None,
            heritage_clauses,
            members,
        });
        let class_expression = self.arena.update_node_with_modifiers(node, data, ModifierFlags::NONE);
        if static_properties.is_empty() && pending.is_empty() {
            return Ok(single(class_expression));
        }

        let temp = self.arena.create_temp_variable();
        self.context.hoist_variable_declaration(temp)?;
        let key = resolver_key(self.arena, node);
        if self
            .context
            .resolver
            .get_node_check_flags(key)
            .contains(NodeCheckFlags::CLASS_WITH_CONSTRUCTOR_REFERENCE)
        {
            self.hook.add_class_alias(key, temp);
        }

        let mut expressions = Vec::with_capacity(static_properties.len() + pending.len() + 2);
        let target = self.arena.get_synthesized_clone(temp)?;
        let assignment = self.arena.create_assignment(target, class_expression);
        self.arena.set_starts_on_new_line(assignment);
        expressions.push(assignment);
        for expression in pending {
            self.arena.set_starts_on_new_line(expression);
            expressions.push(expression);
        }
        for property in static_properties {
            let receiver = self.arena.get_synthesized_clone(temp)?;
            let expression = self.transform_initialized_property(property, receiver)?;
            self.arena.set_starts_on_new_line(expression);
            expressions.push(expression);
        }
        let result = self.arena.get_synthesized_clone(temp)?;
        self.arena.set_starts_on_new_line(result);
        expressions.push(result);

        match self.arena.inline_expressions(&expressions) {
            Some(expression) => Ok(single(expression)),
            None => Ok(single(class_expression)),
        }
    }

    fn visit_heritage_clauses(&mut self, clauses: &NodeList) -> EmitResult<NodeList> {
        let visited = visit_nodes(self, &clauses.nodes)?;
        if visited == clauses.nodes {
            return Ok(clauses.clone());
        }
        Ok(clauses.with_nodes(visited))
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// The constructor (when one is needed) first, then every member that
    /// survives into JavaScript.
    fn transform_class_members(
        &mut self,
        node: NodeIndex,
        class: &ClassData,
        has_extends: bool,
        pending: &mut Vec<NodeIndex>,
    ) -> EmitResult<NodeList> {
        let mut members = Vec::with_capacity(class.members.len() + 1);
        if let Some(constructor) = self.transform_constructor(node, class, has_extends)? {
            members.push(constructor);
        }
        for member in class.members.iter() {
            match self.arena.kind(member) {
                Some(SyntaxKind::Constructor | SyntaxKind::IndexSignature) => {}
                Some(SyntaxKind::PropertyDeclaration) => self.relocate_property_name(member, pending)?,
                Some(SyntaxKind::MethodDeclaration | SyntaxKind::GetAccessor | SyntaxKind::SetAccessor) => {
                    members.extend(self.visit_class_method(member)?);
                }
                _ => members.extend(self.visit(member)?),
            }
        }
        Ok(class.members.with_nodes(members))
    }

    fn visit_class_method(&mut self, member: NodeIndex) -> EmitResult<VisitResult> {
        let Some(f) = self.arena.data(member)?.as_function().cloned() else {
            return Ok(single(member));
        };
        if f.body.is_none() {
            return Ok(VisitResult::new());
        }
        let kind = self.arena.node(member)?.kind();
        let decorated = !f.decorators.is_empty() || f.parameters.iter().any(|p| has_parameter_decorators(self.arena, p));
        let name = self.visit_property_name_of_class_element(f.name, decorated)?;
        self.visit_function_like(member, kind, f, name)
    }

    /// A computed name that the decorators will need again is captured in
    /// a hoisted temp: `[_a = key()]() {}`.
    fn visit_property_name_of_class_element(&mut self, name: NodeIndex, hoist: bool) -> EmitResult<NodeIndex> {
        let NodeData::ComputedPropertyName { expression } = self.arena.data(name)?.clone() else {
            return visit_node(self, name);
        };
        let visited = visit_node(self, expression)?;
        let expression = if hoist && !is_simple_computed_name(self.arena, expression) {
            let temp = self.arena.get_generated_name_for_node(name);
            self.context.hoist_variable_declaration(temp)?;
            let target = self.arena.get_generated_name_for_node(name);
            self.arena.create_assignment(target, visited)
        } else {
            visited
        };
        Ok(self.arena.update_node(name, NodeData::ComputedPropertyName { expression }))
    }

    /// A removed property's computed name still has to run, once, where the
    /// class is defined. Its value is kept in a temp when an initializer or
    /// a decorator refers to it later.
    fn relocate_property_name(&mut self, member: NodeIndex, pending: &mut Vec<NodeIndex>) -> EmitResult<()> {
        let NodeData::PropertyDeclaration {
            decorators,
            name,
            initializer,
            ..
        } = self.arena.data(member)?.clone()
        else {
            return Ok(());
        };
        let NodeData::ComputedPropertyName { expression } = self.arena.data(name)?.clone() else {
            return Ok(());
        };
        if is_simple_computed_name(self.arena, expression) {
            return Ok(());
        }
        let value = visit_node(self, expression)?;
        if initializer.is_some() || !decorators.is_empty() {
            let temp = self.arena.get_generated_name_for_node(name);
            self.context.hoist_variable_declaration(temp)?;
            let target = self.arena.get_generated_name_for_node(name);
            pending.push(self.arena.create_assignment(target, value));
        } else {
            pending.push(value);
        }
        Ok(())
    }

    /// The property name an initializer assigns through: the relocated temp
    /// for a non-simple computed name.
    fn property_name_for_initializer(&mut self, name: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::ComputedPropertyName { expression } = self.arena.data(name)?.clone() else {
            return Ok(name);
        };
        let key = if is_simple_computed_name(self.arena, expression) {
            visit_node(self, expression)?
        } else {
            self.arena.get_generated_name_for_node(name)
        };
        Ok(self.arena.create_computed_property_name(key))
    }

    /// `receiver.name = initializer`
    fn transform_initialized_property(&mut self, property: NodeIndex, receiver: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::PropertyDeclaration { name, initializer, .. } = self.arena.data(property)?.clone() else {
            return Ok(NodeIndex::NONE);
        };
        let member_name = self.property_name_for_initializer(name)?;
        let access = self.arena.create_member_access_for_property_name(receiver, member_name)?;
        let value = visit_node(self, initializer)?;
        Ok(self.arena.create_assignment(access, value))
    }

    fn transform_initialized_property_statement(
        &mut self,
        property: NodeIndex,
        receiver: NodeIndex,
    ) -> EmitResult<NodeIndex> {
        let assignment = self.transform_initialized_property(property, receiver)?;
        let statement = self.arena.create_expression_statement(assignment);
        Ok(self.arena.set_original_and_range(statement, property))
    }

    // =========================================================================
    // Constructor
    // =========================================================================

    /// The constructor with parameter properties and instance initializers
    /// folded in. A class without a constructor gets one only when it has
    /// instance initializers.
    fn transform_constructor(
        &mut self,
        node: NodeIndex,
        class: &ClassData,
        has_extends: bool,
    ) -> EmitResult<Option<NodeIndex>> {
        let constructor = first_constructor_with_body(self.arena, class);
        let has_instance_properties = !initialized_properties(self.arena, class, false).is_empty();
        let has_parameter_properties = constructor.is_some_and(|c| !parameter_properties(self.arena, c).is_empty());

        if !has_instance_properties && !has_parameter_properties {
            return match constructor {
                Some(constructor) => {
                    let Some(f) = self.arena.data(constructor)?.as_function().cloned() else {
                        return Ok(None);
                    };
                    let out = self.visit_function_like(constructor, SyntaxKind::Constructor, f, NodeIndex::NONE)?;
                    Ok(out.first().copied())
                }
                None => Ok(None),
            };
        }

        let parameters = match constructor.and_then(|c| self.arena.get(c)).and_then(|n| n.data.as_function()) {
            Some(f) => {
                let parameters = f.parameters.clone();
                self.visit_parameter_list(&parameters)?
            }
            None => NodeList::default(),
        };
        let body = self.transform_constructor_body(class, constructor, has_extends)?;
        let data = NodeData::Constructor(FunctionData {
            parameters,
            body,
            ..FunctionData::default()
        });
        let updated = match constructor {
            Some(constructor) => self.arena.update_node_with_modifiers(constructor, data, ModifierFlags::NONE),
            None => {
                let created = self.arena.create_node(data);
                self.arena.set_original(created, node);
                created
            }
        };
        self.arena.set_starts_on_new_line(updated);
        Ok(Some(updated))
    }

    fn transform_constructor_body(
        &mut self,
        class: &ClassData,
        constructor: Option<NodeIndex>,
        has_extends: bool,
    ) -> EmitResult<NodeIndex> {
        let body = constructor
            .and_then(|c| self.arena.get(c))
            .and_then(|n| n.data.as_function())
            .map_or(NodeIndex::NONE, |f| f.body);
        let body_statements = if body.is_some() {
            statements_of(self.arena, body)?.nodes
        } else {
            Vec::new()
        };
        let parameter_properties = constructor.map_or_else(Vec::new, |c| parameter_properties(self.arena, c));
        let instance_properties = initialized_properties(self.arena, class, false);

        let saved_namespaces = std::mem::take(&mut self.namespace_stack);
        let result = self.in_lexical_environment(|this| {
            this.with_declaration_scope(|this| {
                let mut statements = Vec::new();
                let mut index = 0;
                if constructor.is_some() {
                    while index < body_statements.len() && is_prologue_directive(this.arena, body_statements[index]) {
                        statements.push(body_statements[index]);
                        index += 1;
                    }
                    if index < body_statements.len() && is_super_call_statement(this.arena, body_statements[index]) {
                        statements.extend(this.visit(body_statements[index])?);
                        index += 1;
                    }
                    for parameter in &parameter_properties {
                        if let Some(statement) = this.create_parameter_property_assignment(*parameter)? {
                            statements.push(statement);
                        }
                    }
                } else if has_extends {
                    statements.push(create_default_super_call(this.arena));
                }
                for property in &instance_properties {
                    let receiver = this.arena.create_this();
                    statements.push(this.transform_initialized_property_statement(*property, receiver)?);
                }
                statements.extend(visit_nodes(this, &body_statements[index..])?);
                Ok(statements)
            })
        });
        self.namespace_stack = saved_namespaces;
        let (statements, hoisted) = result?;
        let statements = merge_lexical_environment(self.arena, statements, hoisted);
        if body.is_some() {
            update_statements(self.arena, body, statements)
        } else {
            Ok(self.arena.create_block(statements, true))
        }
    }

    /// `this.x = x;` for a parameter property.
    fn create_parameter_property_assignment(&mut self, parameter: NodeIndex) -> EmitResult<Option<NodeIndex>> {
        let NodeData::Parameter { name, .. } = self.arena.data(parameter)?.clone() else {
            return Ok(None);
        };
        if !self.arena.is_kind(name, SyntaxKind::Identifier) {
            return Ok(None);
        }
        let property_name = self.arena.get_mutable_clone(name)?;
        self.arena
            .add_emit_flags(property_name, EmitFlags::NO_COMMENTS | EmitFlags::NO_SOURCE_MAP);
        let local_name = self.arena.get_mutable_clone(name)?;
        self.arena.add_emit_flags(local_name, EmitFlags::NO_COMMENTS);

        let this = self.arena.create_this();
        let access = self.arena.create_property_access(this, property_name);
        self.arena.set_text_range_from(access, name);
        let assignment = self.arena.create_assignment(access, local_name);
        let statement = self.arena.create_expression_statement(assignment);
        self.arena.set_original_and_range(statement, parameter);
        self.arena.add_emit_flags(statement, EmitFlags::NO_COMMENTS);
        self.arena.set_starts_on_new_line(statement);
        Ok(Some(statement))
    }

    // =========================================================================
    // Decorated classes
    // =========================================================================

    /// `C_1` for a decorated class that refers to itself, so references in
    /// the body still see the undecorated class.
    fn create_class_alias(&mut self, node: NodeIndex) -> EmitResult<Option<NodeIndex>> {
        let key = resolver_key(self.arena, node);
        if !self
            .context
            .resolver
            .get_node_check_flags(key)
            .contains(NodeCheckFlags::CLASS_WITH_CONSTRUCTOR_REFERENCE)
        {
            return Ok(None);
        }
        let name = self.arena.declaration_name_node(node);
        let text = match self.arena.identifier_text(name) {
            "" => "default".to_string(),
            text => text.to_string(),
        };
        let alias = self.arena.create_unique_name(&text);
        let declared = self.arena.get_synthesized_clone(alias)?;
        self.context.hoist_variable_declaration(declared)?;
        self.hook.add_class_alias(key, alias);
        Ok(Some(alias))
    }

    /// `let C = class C {};` (or `let C = C_1 = class C {};`).
    fn create_decorated_class_head(
        &mut self,
        node: NodeIndex,
        name: NodeIndex,
        heritage_clauses: NodeList,
        members: NodeList,
        class_alias: Option<NodeIndex>,
    ) -> EmitResult<NodeIndex> {
        let class_expression = self.arena.create_node(NodeData::ClassExpression(ClassData {
            decorators: NodeList::default(),
            name,
            type_parameters: None,
            heritage_clauses,
            members,
        }));
        self.arena.set_original(class_expression, node);
        let initializer = match class_alias {
            Some(alias) => {
                let target = self.arena.get_synthesized_clone(alias)?;
                self.arena.create_assignment(target, class_expression)
            }
            None => class_expression,
        };
        let declaration_name = self.arena.get_local_name(node)?;
        let declaration = self.arena.create_variable_declaration(declaration_name, initializer);
        self.arena.set_original(declaration, node);
        let list = self.arena.create_variable_declaration_list(vec![declaration], NodeFlags::LET);
        let statement = self.arena.create_variable_statement_from_list(list, ModifierFlags::NONE);
        Ok(self.arena.set_original_and_range(statement, node))
    }

    /// `export { C };` or `export default C;` after a decorated class.
    fn create_external_module_export(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let local = self.arena.get_local_name(node)?;
        if self.arena.has_modifier(node, ModifierFlags::DEFAULT) {
            return Ok(self.arena.create_node(NodeData::ExportAssignment {
                is_export_equals: false,
                expression: local,
            }));
        }
        let specifier = self.arena.create_node(NodeData::ExportSpecifier {
            property_name: NodeIndex::NONE,
            name: local,
        });
        let clause = self.arena.create_node(NodeData::NamedExports {
            elements: NodeList::new(vec![specifier]),
        });
        Ok(self.arena.create_node(NodeData::ExportDeclaration {
            export_clause: clause,
            module_specifier: NodeIndex::NONE,
        }))
    }
}

/// `super(...arguments);` for a derived class that gains a constructor.
fn create_default_super_call(arena: &mut NodeArena) -> NodeIndex {
    let callee = arena.create_super();
    let arguments = arena.create_identifier("arguments");
    let spread = arena.create_spread(arguments);
    let call = arena.create_call(callee, vec![spread]);
    arena.create_expression_statement(call)
}

pub(super) fn has_extends_clause(arena: &NodeArena, class: &ClassData) -> bool {
    class.heritage_clauses.iter().any(|clause| {
        matches!(
            arena.get(clause).map(|n| &n.data),
            Some(NodeData::HeritageClause { token: SyntaxKind::ExtendsKeyword, types }) if !types.is_empty()
        )
    })
}

/// Property declarations with an initializer, static or instance.
pub(super) fn initialized_properties(arena: &NodeArena, class: &ClassData, want_static: bool) -> Vec<NodeIndex> {
    class
        .members
        .iter()
        .filter(|&member| {
            matches!(
                arena.get(member).map(|n| &n.data),
                Some(NodeData::PropertyDeclaration { initializer, .. }) if initializer.is_some()
            ) && is_static(arena, member) == want_static
                && !arena.has_modifier(member, ModifierFlags::AMBIENT)
        })
        .collect()
}

pub(super) fn first_constructor_with_body(arena: &NodeArena, class: &ClassData) -> Option<NodeIndex> {
    class.members.iter().find(|&member| {
        matches!(
            arena.get(member).map(|n| &n.data),
            Some(NodeData::Constructor(f)) if f.body.is_some()
        )
    })
}

fn parameter_properties(arena: &NodeArena, constructor: NodeIndex) -> Vec<NodeIndex> {
    let Some(f) = arena.get(constructor).and_then(|n| n.data.as_function()) else {
        return Vec::new();
    };
    f.parameters
        .iter()
        .filter(|&p| {
            arena.has_modifier(p, ModifierFlags::PARAMETER_PROPERTY_MODIFIER) && !is_this_parameter(arena, p)
        })
        .collect()
}

pub(super) fn has_parameter_decorators(arena: &NodeArena, parameter: NodeIndex) -> bool {
    matches!(
        arena.get(parameter).map(|n| &n.data),
        Some(NodeData::Parameter { decorators, .. }) if !decorators.is_empty()
    )
}

pub(super) fn should_emit_decorate_call_for_class(arena: &NodeArena, class: &ClassData) -> bool {
    if !class.decorators.is_empty() {
        return true;
    }
    first_constructor_with_body(arena, class)
        .and_then(|c| arena.get(c))
        .and_then(|n| n.data.as_function())
        .is_some_and(|f| f.parameters.iter().any(|p| has_parameter_decorators(arena, p)))
}

/// A computed name whose expression can be evaluated twice.
pub(super) fn is_simple_computed_name(arena: &NodeArena, expression: NodeIndex) -> bool {
    is_simple_inlineable_expression(arena, arena.skip_outer_expressions(expression))
}
