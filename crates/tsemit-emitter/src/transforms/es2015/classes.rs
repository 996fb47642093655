//! Classes as an IIFE over a constructor function.
//!
//! ```text
//! var C = /** @class */ (function (_super) {
//!     __extends(C, _super);
//!     function C() {
//!         return _super !== null && _super.apply(this, arguments) || this;
//!     }
//!     C.prototype.m = function () { };
//!     return C;
//! }(B));
//! ```
//!
//! Static property initializers were already moved after the class by the
//! TypeScript pass, so they land after the IIFE.

use super::Es2015Transformer;
use crate::helpers::{EXTENDS_HELPER, create_helper_name};
use crate::hierarchy_facts::{HierarchyFacts, with_subtree};
use crate::transforms::utilities::{function_body_statements, is_static};
use crate::transforms::visitor::{VisitResult, many, merge_lexical_environment, prologue_count, visit_node, visit_nodes};
use tracing::trace;
use tsemit_ast::utilities::{get_property_name_text, is_prologue_directive, is_super_call};
use tsemit_ast::{ClassData, EmitFlags, FunctionData, ModifierFlags, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList, SyntaxKind, TransformFlags};
use tsemit_common::comments::CommentKind;
use tsemit_common::{EmitError, EmitResult};

/// The `extends` clause of a class: the heritage element and its expression.
#[derive(Clone, Copy)]
struct ExtendsClause {
    element: NodeIndex,
    expression: NodeIndex,
}

/// A get/set pair sharing one property name.
pub(super) struct AccessorPair {
    pub(super) first: NodeIndex,
    pub(super) get: NodeIndex,
    pub(super) set: NodeIndex,
}

impl Es2015Transformer<'_, '_> {
    // =========================================================================
    // Declarations and expressions
    // =========================================================================

    pub(super) fn visit_class_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let local_name = self
            .arena
            .get_declaration_name_with(node, true, false, EmitFlags::LOCAL_NAME)?;
        let class = self.transform_class_like_to_expression(node)?;
        let variable = self.arena.create_variable_declaration(local_name, class);
        self.arena.set_original(variable, node);
        let list = self.arena.create_variable_declaration_list(vec![variable], NodeFlags::NONE);
        let statement = self.arena.create_variable_statement_from_list(list, ModifierFlags::NONE);
        self.arena.set_original_and_range(statement, node);
        self.arena.set_starts_on_new_line(statement);

        let mut statements = vec![statement];
        if self.arena.has_modifier(node, ModifierFlags::EXPORT) {
            let name = self.arena.get_local_name(node)?;
            let export = if self.arena.has_modifier(node, ModifierFlags::DEFAULT) {
                self.arena.create_node(NodeData::ExportAssignment {
                    is_export_equals: false,
                    expression: name,
                })
            } else {
                let specifier = self.arena.create_node(NodeData::ExportSpecifier {
                    property_name: NodeIndex::NONE,
                    name,
                });
                let clause = self.arena.create_node(NodeData::NamedExports {
                    elements: NodeList::new(vec![specifier]),
                });
                self.arena.create_node(NodeData::ExportDeclaration {
                    export_clause: clause,
                    module_specifier: NodeIndex::NONE,
                })
            };
            statements.push(export);
        }
        Ok(many(statements))
    }

    pub(super) fn visit_class_expression(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        self.transform_class_like_to_expression(node)
    }

    fn transform_class_like_to_expression(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let class = self
            .arena
            .data(node)?
            .as_class()
            .cloned()
            .ok_or_else(|| EmitError::internal("class lowering reached a non-class node"))?;
        if class.name.is_some() {
            self.hook.enable_block_scoped_bindings();
        }
        let extends = self.extends_clause(&class)?;
        trace!(derived = extends.is_some(), "lowering class");

        let parameters = match extends {
            Some(_) => {
                let super_name = self.create_super_name();
                vec![self.arena.create_parameter(super_name)]
            }
            None => Vec::new(),
        };
        let body = self.transform_class_body(node, &class, extends)?;
        let function = self.arena.create_function_expression(NodeIndex::NONE, parameters, body);
        let indented = self.arena.emit_flags(node) & EmitFlags::INDENTED;
        self.arena
            .add_emit_flags(function, indented | EmitFlags::REUSE_TEMP_VARIABLE_SCOPE | EmitFlags::NO_COMMENTS);

        let arguments = match extends {
            Some(clause) => vec![visit_node(self, clause.expression)?],
            None => Vec::new(),
        };
        let call = self.arena.create_call(function, arguments);
        let result = self.arena.create_paren(call);
        self.arena
            .add_synthetic_leading_comment(result, CommentKind::MultiLine, "* @class ", false);
        Ok(result)
    }

    fn extends_clause(&self, class: &ClassData) -> EmitResult<Option<ExtendsClause>> {
        for clause in class.heritage_clauses.iter() {
            let NodeData::HeritageClause { token, types } = self.arena.data(clause)? else {
                continue;
            };
            if *token != SyntaxKind::ExtendsKeyword {
                continue;
            }
            let Some(element) = types.first() else {
                continue;
            };
            let expression = match self.arena.data(element)? {
                NodeData::ExpressionWithTypeArguments { expression, .. } => *expression,
                _ => element,
            };
            return Ok(Some(ExtendsClause { element, expression }));
        }
        Ok(None)
    }

    /// `C` as seen from inside the IIFE; a generated name for anonymous classes.
    fn class_internal_name(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        self.arena
            .get_declaration_name_with(node, false, false, EmitFlags::LOCAL_NAME | EmitFlags::INTERNAL_NAME)
    }

    fn transform_class_body(
        &mut self,
        node: NodeIndex,
        class: &ClassData,
        extends: Option<ExtendsClause>,
    ) -> EmitResult<NodeIndex> {
        let (statements, hoisted) = self.in_lexical_environment(|this| {
            let mut statements = Vec::new();
            if let Some(clause) = extends {
                this.context.request_emit_helper(&EXTENDS_HELPER);
                let helper = create_helper_name(this.arena, "__extends");
                let name = this.class_internal_name(node)?;
                let super_name = this.create_super_name();
                let call = this.arena.create_call(helper, vec![name, super_name]);
                let statement = this.arena.create_expression_statement(call);
                this.arena.set_text_range_from(statement, clause.element);
                statements.push(statement);
            }
            this.add_constructor(&mut statements, node, class, extends)?;
            this.add_class_members(&mut statements, node, &class.members)?;
            Ok(statements)
        })?;

        let mut statements = merge_lexical_environment(self.arena, statements, hoisted);
        let name = self.class_internal_name(node)?;
        let statement = self.arena.create_return(name);
        self.arena.add_emit_flags(statement, EmitFlags::NO_COMMENTS);
        statements.push(statement);

        let block = self.arena.create_block(statements, true);
        self.arena
            .set_text_range(block, class.members.pos, class.members.end);
        self.arena.add_emit_flags(block, EmitFlags::NO_COMMENTS);
        Ok(block)
    }

    // =========================================================================
    // Constructor
    // =========================================================================

    fn add_constructor(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        node: NodeIndex,
        class: &ClassData,
        extends: Option<ExtendsClause>,
    ) -> EmitResult<()> {
        let constructor = class.members.iter().find(|&member| {
            matches!(
                self.arena.get(member).map(|n| &n.data),
                Some(NodeData::Constructor(f)) if f.body.is_some()
            )
        });
        let constructor_data = match constructor {
            Some(ctor) => self.arena.data(ctor)?.as_function().cloned(),
            None => None,
        };
        let name = self.class_internal_name(node)?;

        let function = self.outside_converted_loop(|this| {
            with_subtree(
                this,
                HierarchyFacts::CONSTRUCTOR_EXCLUDES,
                HierarchyFacts::CONSTRUCTOR_INCLUDES,
                HierarchyFacts::FUNCTION_SUBTREE_EXCLUDES,
                HierarchyFacts::NONE,
                |this| {
                    let has_synthesized_super =
                        this.has_synthesized_default_super_call(constructor_data.as_ref(), extends.is_some());
                    let parameters = match &constructor_data {
                        Some(f) if !has_synthesized_super => this.visit_parameter_list(&f.parameters)?,
                        _ => Vec::new(),
                    };
                    let body = match (constructor, &constructor_data) {
                        (Some(ctor), Some(f)) => {
                            this.transform_constructor_body(ctor, f, extends, has_synthesized_super)?
                        }
                        _ => this.create_default_constructor_body(node, &class.members, extends)?,
                    };
                    let function = this.arena.create_function_declaration(name, parameters, body);
                    match constructor {
                        Some(ctor) => {
                            this.arena.set_original_and_range(function, ctor);
                        }
                        None => this.arena.set_text_range_from(function, node),
                    }
                    if extends.is_some() {
                        this.arena.add_emit_flags(function, EmitFlags::CAPTURES_THIS);
                    }
                    Ok::<_, EmitError>(function)
                },
            )
        })?;
        statements.push(function);
        Ok(())
    }

    /// The TypeScript pass gives a derived class without a constructor a
    /// synthesized `constructor() { super(...arguments); }`.
    fn has_synthesized_default_super_call(&self, constructor: Option<&FunctionData>, has_extends: bool) -> bool {
        let Some(f) = constructor else {
            return false;
        };
        if !has_extends || !f.parameters.is_empty() {
            return false;
        }
        let synthesized = |node: NodeIndex| self.arena.get(node).is_some_and(|n| n.is_synthesized());
        let Some(first) = function_body_statements(self.arena, f.body).first() else {
            return false;
        };
        if !synthesized(first) {
            return false;
        }
        let Some(NodeData::ExpressionStatement { expression }) = self.arena.get(first).map(|n| &n.data) else {
            return false;
        };
        if !synthesized(*expression) {
            return false;
        }
        let Some(NodeData::CallExpression { expression: callee, arguments, .. }) =
            self.arena.get(*expression).map(|n| &n.data)
        else {
            return false;
        };
        if !synthesized(*callee) || !self.arena.is_kind(*callee, SyntaxKind::SuperKeyword) || arguments.len() != 1 {
            return false;
        }
        let Some(argument) = arguments.first() else {
            return false;
        };
        match self.arena.get(argument).map(|n| &n.data) {
            Some(NodeData::SpreadElement { expression }) => {
                synthesized(argument) && self.arena.identifier_text(*expression) == "arguments"
            }
            _ => false,
        }
    }

    fn is_derived(&self, extends: Option<ExtendsClause>) -> bool {
        extends.is_some_and(|clause| {
            let target = self.arena.skip_outer_expressions(clause.expression);
            !self.arena.is_kind(target, SyntaxKind::NullKeyword)
        })
    }

    fn transform_constructor_body(
        &mut self,
        constructor: NodeIndex,
        f: &FunctionData,
        extends: Option<ExtendsClause>,
        has_synthesized_super: bool,
    ) -> EmitResult<NodeIndex> {
        let is_derived = self.is_derived(extends);
        let body_statements = function_body_statements(self.arena, f.body).nodes;

        let ((directives, mut statements, super_call, statement_offset), hoisted) =
            self.in_lexical_environment(|this| {
                let mut directives = Vec::new();
                let mut statements = Vec::new();
                let mut offset = 0;
                if !has_synthesized_super {
                    offset = body_statements
                        .iter()
                        .take_while(|&&s| is_prologue_directive(this.arena, s))
                        .count();
                    directives.extend_from_slice(&body_statements[..offset]);
                }
                this.add_default_value_assignments(&mut statements, &f.parameters)?;
                this.add_rest_parameter(&mut statements, &f.parameters, has_synthesized_super)?;
                if !has_synthesized_super {
                    let custom = prologue_count(this.arena, &body_statements[offset..]);
                    statements.extend(visit_nodes(this, &body_statements[offset..offset + custom])?);
                    offset += custom;
                }

                let mut super_call = NodeIndex::NONE;
                if has_synthesized_super {
                    super_call = this.create_default_super_call_or_this();
                } else if is_derived && offset < body_statements.len() {
                    if let NodeData::ExpressionStatement { expression } = this.arena.data(body_statements[offset])? {
                        let expression = *expression;
                        if is_super_call(this.arena, expression) {
                            super_call = this.visit_call_with_captured_this_assignment(expression, false)?;
                        }
                    }
                }
                if super_call.is_some() {
                    this.hierarchy_facts |= HierarchyFacts::CONSTRUCTOR_WITH_CAPTURED_SUPER;
                    offset += 1;
                }
                let rest = &body_statements[offset.min(body_statements.len())..];
                statements.extend(visit_nodes(this, rest)?);
                Ok((directives, statements, super_call, offset))
            })?;

        let mut prologue = merge_lexical_environment(self.arena, directives, hoisted);
        self.insert_capture_new_target_if_needed(&mut prologue, constructor, SyntaxKind::Constructor)?;

        if is_derived {
            let super_call_is_whole_body = super_call.is_some()
                && statement_offset >= body_statements.len()
                && !self
                    .arena
                    .transform_flags(f.body)
                    .contains(TransformFlags::CONTAINS_LEXICAL_THIS);
            if super_call_is_whole_body {
                // return _super.call(this, ...) || this;
                let statement = self.arena.create_return(super_call);
                if let Some(&first) = body_statements.get(statement_offset.saturating_sub(1)) {
                    let range = self.arena.comment_range(first);
                    self.arena.set_comment_range(statement, range);
                }
                statements.push(statement);
            } else {
                let initializer = if super_call.is_some() {
                    super_call
                } else {
                    self.create_actual_this()
                };
                self.insert_capture_this(&mut statements, constructor, initializer);
                if !is_covered_by_return_statements(self.arena, f.body) {
                    let this = self.create_captured_this_name();
                    statements.push(self.arena.create_return(this));
                }
            }
        } else {
            self.insert_capture_this_if_needed(&mut prologue, constructor)?;
        }

        prologue.extend(statements);
        let block = self.arena.create_block(prologue, true);
        self.arena.set_text_range_from(block, f.body);
        Ok(block)
    }

    /// Body of the constructor of a class that declared none.
    fn create_default_constructor_body(
        &mut self,
        node: NodeIndex,
        members: &NodeList,
        extends: Option<ExtendsClause>,
    ) -> EmitResult<NodeIndex> {
        let mut statements = Vec::new();
        if self.is_derived(extends) {
            let value = self.create_default_super_call_or_this();
            statements.push(self.arena.create_return(value));
        }
        let block = self.arena.create_block(statements, true);
        if members.is_synthesized() {
            self.arena.set_text_range_from(block, node);
        } else {
            self.arena.set_text_range(block, members.pos, members.end);
        }
        self.arena.add_emit_flags(block, EmitFlags::NO_COMMENTS);
        Ok(block)
    }

    /// `_super !== null && _super.apply(this, arguments) || this`
    fn create_default_super_call_or_this(&mut self) -> NodeIndex {
        let super_name = self.create_super_name();
        let null = self.arena.create_null();
        let not_null = self.arena.create_strict_inequality(super_name, null);
        let super_name = self.create_super_name();
        let this = self.create_actual_this();
        let arguments = self.arena.create_identifier("arguments");
        let apply = self.arena.create_function_apply(super_name, this, arguments);
        let call = self.arena.create_logical_and(not_null, apply);
        let this = self.create_actual_this();
        self.arena.create_logical_or(call, this)
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn add_class_members(&mut self, statements: &mut Vec<NodeIndex>, node: NodeIndex, members: &NodeList) -> EmitResult<()> {
        for member in members.iter() {
            let Some(kind) = self.arena.kind(member) else {
                continue;
            };
            match kind {
                SyntaxKind::SemicolonClassElement => {
                    let statement = self.arena.create_empty_statement();
                    statements.push(self.arena.set_original_and_range(statement, member));
                }
                SyntaxKind::MethodDeclaration => {
                    if let Some(statement) = self.transform_class_method_to_statement(node, member)? {
                        statements.push(statement);
                    }
                }
                SyntaxKind::GetAccessor | SyntaxKind::SetAccessor => {
                    let pair = accessor_pair(self.arena, members, member);
                    if pair.first == member {
                        let receiver = self.class_member_prefix(node, member)?;
                        let expression = self.transform_accessors_to_expression(receiver, &pair, true, false)?;
                        let statement = self.arena.create_expression_statement(expression);
                        self.arena.add_emit_flags(statement, EmitFlags::NO_COMMENTS);
                        let range = self.arena.source_map_range(member);
                        self.arena.set_source_map_range(statement, range);
                        statements.push(statement);
                    }
                }
                SyntaxKind::Constructor => {}
                other => {
                    return Err(EmitError::UnexpectedNode {
                        kind: format!("{other:?}"),
                        pos: self.arena.range(member).pos,
                        context: "class member lowering",
                    });
                }
            }
        }
        Ok(())
    }

    /// `C` for static members, `C.prototype` for instance members.
    fn class_member_prefix(&mut self, node: NodeIndex, member: NodeIndex) -> EmitResult<NodeIndex> {
        let name = self.class_internal_name(node)?;
        if is_static(self.arena, member) {
            Ok(name)
        } else {
            Ok(self.arena.create_property_access_str(name, "prototype"))
        }
    }

    /// `C.prototype.m = function () { ... };`
    fn transform_class_method_to_statement(&mut self, node: NodeIndex, member: NodeIndex) -> EmitResult<Option<NodeIndex>> {
        let Some(f) = self.arena.data(member)?.as_function().cloned() else {
            return Ok(None);
        };
        if f.body.is_none() {
            return Ok(None);
        }
        let receiver = self.class_member_prefix(node, member)?;
        let comment_range = self.arena.comment_range(member);
        let source_map_range = self.arena.source_map_range(member);
        let non_static = !is_static(self.arena, member);
        let function = self.transform_function_like_to_expression(
            member,
            SyntaxKind::MethodDeclaration,
            &f,
            NodeIndex::NONE,
            non_static,
        )?;
        let name = visit_node(self, f.name)?;
        let target = self.arena.create_member_access_for_property_name(receiver, name)?;
        self.arena.set_text_range_from(target, f.name);
        self.arena.add_emit_flags(function, EmitFlags::NO_COMMENTS);
        self.arena.set_source_map_range(function, source_map_range);

        let assignment = self.arena.create_assignment(target, function);
        let statement = self.arena.create_expression_statement(assignment);
        self.arena.set_original_and_range(statement, member);
        self.arena.set_comment_range(statement, comment_range);
        self.arena.add_emit_flags(statement, EmitFlags::NO_SOURCE_MAP);
        Ok(Some(statement))
    }

    /// `Object.defineProperty(receiver, "x", { get: ..., set: ..., enumerable: false, configurable: true })`
    pub(super) fn transform_accessors_to_expression(
        &mut self,
        receiver: NodeIndex,
        pair: &AccessorPair,
        in_class: bool,
        starts_on_new_line: bool,
    ) -> EmitResult<NodeIndex> {
        self.arena
            .add_emit_flags(receiver, EmitFlags::NO_COMMENTS | EmitFlags::NO_TRAILING_SOURCE_MAP);
        let first_name = self.arena.declaration_name_node(pair.first);
        let visited_name = visit_node(self, first_name)?;
        let property_name = self.arena.create_expression_for_property_name(visited_name)?;
        self.arena
            .add_emit_flags(property_name, EmitFlags::NO_COMMENTS | EmitFlags::NO_LEADING_SOURCE_MAP);
        let range = self.arena.range(first_name);
        self.arena.set_source_map_range(property_name, range);

        let mut properties = Vec::with_capacity(4);
        for (accessor, key, kind) in [
            (pair.get, "get", SyntaxKind::GetAccessor),
            (pair.set, "set", SyntaxKind::SetAccessor),
        ] {
            if accessor.is_none() {
                continue;
            }
            let Some(f) = self.arena.data(accessor)?.as_function().cloned() else {
                continue;
            };
            let non_static = in_class && !is_static(self.arena, accessor);
            let function = self.transform_function_like_to_expression(accessor, kind, &f, NodeIndex::NONE, non_static)?;
            let range = self.arena.source_map_range(accessor);
            self.arena.set_source_map_range(function, range);
            self.arena.add_emit_flags(function, EmitFlags::NO_LEADING_COMMENTS);
            let property = self.arena.create_property_assignment_str(key, function);
            let range = self.arena.comment_range(accessor);
            self.arena.set_comment_range(property, range);
            properties.push(property);
        }
        let enumerable = self.arena.create_false();
        properties.push(self.arena.create_property_assignment_str("enumerable", enumerable));
        let configurable = self.arena.create_true();
        properties.push(self.arena.create_property_assignment_str("configurable", configurable));

        let descriptor = self.arena.create_object_literal(properties, true);
        let object = self.arena.create_identifier("Object");
        let define_property = self.arena.create_property_access_str(object, "defineProperty");
        let call = self
            .arena
            .create_call(define_property, vec![receiver, property_name, descriptor]);
        if starts_on_new_line {
            self.arena.set_starts_on_new_line(call);
        }
        Ok(call)
    }

    // =========================================================================
    // super
    // =========================================================================

    /// `_super.prototype` inside instance members, `_super` elsewhere.
    pub(super) fn visit_super_keyword(&mut self, is_expression_of_call: bool) -> NodeIndex {
        let super_name = self.create_super_name();
        if self
            .hierarchy_facts
            .contains(HierarchyFacts::NON_STATIC_CLASS_ELEMENT)
            && !is_expression_of_call
        {
            self.arena.create_property_access_str(super_name, "prototype")
        } else {
            super_name
        }
    }
}

/// The get and set accessors sharing the name (and staticness) of `accessor`.
pub(super) fn accessor_pair(arena: &NodeArena, members: &NodeList, accessor: NodeIndex) -> AccessorPair {
    let name_of = |member: NodeIndex| get_property_name_text(arena, arena.declaration_name_node(member));
    let text = name_of(accessor);
    let wanted_static = is_static(arena, accessor);
    let mut pair = AccessorPair {
        first: NodeIndex::NONE,
        get: NodeIndex::NONE,
        set: NodeIndex::NONE,
    };
    for member in members.iter() {
        let kind = arena.kind(member);
        if !matches!(kind, Some(SyntaxKind::GetAccessor | SyntaxKind::SetAccessor)) {
            continue;
        }
        let same = if member == accessor {
            true
        } else {
            text.is_some() && name_of(member) == text && is_static(arena, member) == wanted_static
        };
        if !same {
            continue;
        }
        if pair.first.is_none() {
            pair.first = member;
        }
        if kind == Some(SyntaxKind::GetAccessor) && pair.get.is_none() {
            pair.get = member;
        } else if kind == Some(SyntaxKind::SetAccessor) && pair.set.is_none() {
            pair.set = member;
        }
    }
    pair
}

/// Every path through `statement` ends in a `return`.
fn is_covered_by_return_statements(arena: &NodeArena, statement: NodeIndex) -> bool {
    match arena.get(statement).map(|n| &n.data) {
        Some(NodeData::ReturnStatement { .. }) => true,
        Some(NodeData::IfStatement {
            then_statement,
            else_statement,
            ..
        }) => {
            else_statement.is_some()
                && is_covered_by_return_statements(arena, *then_statement)
                && is_covered_by_return_statements(arena, *else_statement)
        }
        Some(NodeData::Block { statements, .. }) => statements
            .last()
            .is_some_and(|last| is_covered_by_return_statements(arena, last)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_pair_matches_by_name_and_staticness() {
        let mut arena = NodeArena::new();
        let get_name = arena.create_identifier("x");
        let get = arena.create_node(NodeData::GetAccessor(FunctionData {
            name: get_name,
            ..FunctionData::default()
        }));
        let set_name = arena.create_identifier("x");
        let set = arena.create_node(NodeData::SetAccessor(FunctionData {
            name: set_name,
            ..FunctionData::default()
        }));
        let other_name = arena.create_identifier("y");
        let other = arena.create_node(NodeData::GetAccessor(FunctionData {
            name: other_name,
            ..FunctionData::default()
        }));
        let members = NodeList::new(vec![get, other, set]);

        let pair = accessor_pair(&arena, &members, set);
        assert_eq!(pair.first, get);
        assert_eq!(pair.get, get);
        assert_eq!(pair.set, set);

        let lone = accessor_pair(&arena, &members, other);
        assert_eq!(lone.first, other);
        assert!(lone.set.is_none());
    }

    #[test]
    fn test_if_without_else_is_not_covered_by_returns() {
        let mut arena = NodeArena::new();
        let ret = arena.create_return(NodeIndex::NONE);
        let condition = arena.create_true();
        let if_only = arena.create_if(condition, ret, NodeIndex::NONE);
        assert!(!is_covered_by_return_statements(&arena, if_only));

        let other = arena.create_return(NodeIndex::NONE);
        let condition = arena.create_true();
        let both = arena.create_if(condition, ret, other);
        let block = arena.create_block(vec![both], true);
        assert!(is_covered_by_return_statements(&arena, block));
    }
}
