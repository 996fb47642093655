//! `__decorate` calls for decorated classes and members.

use super::TypeScriptTransformer;
use super::classes::{first_constructor_with_body, has_parameter_decorators, is_simple_computed_name};
use crate::helpers::{DECORATE_HELPER, METADATA_HELPER, PARAM_HELPER, create_helper_name};
use crate::resolver::TypeReferenceSerializationKind;
use crate::transforms::utilities::{is_static, is_this_parameter};
use crate::transforms::visitor::visit_node;
use tsemit_ast::{ClassData, EmitFlags, NodeData, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::{EmitResult, ScriptTarget};

/// Decorators of one class element, with the parameter decorators that
/// belong to it.
#[derive(Debug, Default)]
struct AllDecorators {
    decorators: Vec<NodeIndex>,
    /// Parameter offset (not counting `this`) and that parameter's decorators.
    parameters: Vec<(usize, Vec<NodeIndex>)>,
}

impl AllDecorators {
    fn is_empty(&self) -> bool {
        self.decorators.is_empty() && self.parameters.is_empty()
    }
}

impl TypeScriptTransformer<'_, '_> {
    /// One `__decorate([...], C.prototype, "m", null);` per decorated
    /// member, instance members first.
    pub(super) fn add_class_element_decoration_statements(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        class_node: NodeIndex,
        class: &ClassData,
        want_static: bool,
    ) -> EmitResult<()> {
        for member in class.members.iter() {
            if is_static(self.arena, member) != want_static {
                continue;
            }
            let Some(all) = self.all_decorators_of_member(class, member)? else {
                continue;
            };
            let expression = self.create_member_decorate_call(class_node, member, all)?;
            let statement = self.arena.create_expression_statement(expression);
            self.arena.add_emit_flags(statement, EmitFlags::NO_COMMENTS);
            statements.push(statement);
        }
        Ok(())
    }

    /// `C = C_1 = __decorate([...], C);` for a decorated class.
    pub(super) fn add_constructor_decoration_statement(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        class_node: NodeIndex,
        class: &ClassData,
        class_alias: Option<NodeIndex>,
    ) -> EmitResult<()> {
        let mut all = AllDecorators {
            decorators: class.decorators.nodes.clone(),
            parameters: Vec::new(),
        };
        if let Some(constructor) = first_constructor_with_body(self.arena, class) {
            all.parameters = parameter_decorators(self.arena, constructor);
        }
        if all.is_empty() {
            return Ok(());
        }

        let mut expressions = self.transform_all_decorators(&all)?;
        if self.context.options.emit_decorator_metadata {
            if let Some(constructor) = first_constructor_with_body(self.arena, class) {
                let parameters = self.function_parameters(constructor);
                let types = self.serialize_parameter_types(&parameters)?;
                expressions.push(self.create_metadata("design:paramtypes", types));
            }
        }

        self.context.request_emit_helper(&DECORATE_HELPER);
        let helper = create_helper_name(self.arena, "__decorate");
        let array = self.arena.create_array_literal(expressions, false);
        let target = self.arena.get_local_name(class_node)?;
        let call = self.arena.create_call(helper, vec![array, target]);
        self.arena.add_emit_flags(call, EmitFlags::NO_COMMENTS);

        let value = match class_alias {
            Some(alias) => {
                let alias = self.arena.get_synthesized_clone(alias)?;
                self.arena.create_assignment(alias, call)
            }
            None => call,
        };
        let binding = self.arena.get_local_name(class_node)?;
        let assignment = self.arena.create_assignment(binding, value);
        let statement = self.arena.create_expression_statement(assignment);
        self.arena.add_emit_flags(statement, EmitFlags::NO_COMMENTS);
        let range = self.arena.range(class_node);
        self.arena.set_source_map_range(statement, range);
        statements.push(statement);
        Ok(())
    }

    /// Decorators a member contributes. An accessor pair is decorated once,
    /// through whichever accessor comes first and carries decorators.
    fn all_decorators_of_member(&mut self, class: &ClassData, member: NodeIndex) -> EmitResult<Option<AllDecorators>> {
        let kind = self.arena.node(member)?.kind();
        let all = match self.arena.data(member)? {
            NodeData::PropertyDeclaration { decorators, .. } => AllDecorators {
                decorators: decorators.nodes.clone(),
                parameters: Vec::new(),
            },
            NodeData::MethodDeclaration(f) => {
                if f.body.is_none() {
                    return Ok(None);
                }
                AllDecorators {
                    decorators: f.decorators.nodes.clone(),
                    parameters: parameter_decorators(self.arena, member),
                }
            }
            NodeData::GetAccessor(_) | NodeData::SetAccessor(_) => {
                let (first, setter) = accessor_pair(self.arena, class, member);
                if first != Some(member) {
                    return Ok(None);
                }
                let mut decorators = Vec::new();
                for accessor in [Some(member), self.other_accessor(class, member, kind)].into_iter().flatten() {
                    if let Some(f) = self.arena.data(accessor)?.as_function() {
                        decorators.extend(f.decorators.iter());
                    }
                }
                AllDecorators {
                    decorators,
                    parameters: setter.map_or_else(Vec::new, |s| parameter_decorators(self.arena, s)),
                }
            }
            _ => return Ok(None),
        };
        Ok(if all.is_empty() { None } else { Some(all) })
    }

    fn other_accessor(&self, class: &ClassData, member: NodeIndex, kind: SyntaxKind) -> Option<NodeIndex> {
        let other_kind = if kind == SyntaxKind::GetAccessor {
            SyntaxKind::SetAccessor
        } else {
            SyntaxKind::GetAccessor
        };
        let name = member_name_text(self.arena, member)?;
        let want_static = is_static(self.arena, member);
        class.members.iter().find(|&m| {
            self.arena.is_kind(m, other_kind)
                && is_static(self.arena, m) == want_static
                && member_name_text(self.arena, m).as_deref() == Some(name.as_str())
        })
    }

    fn create_member_decorate_call(
        &mut self,
        class_node: NodeIndex,
        member: NodeIndex,
        all: AllDecorators,
    ) -> EmitResult<NodeIndex> {
        let mut expressions = self.transform_all_decorators(&all)?;
        if self.context.options.emit_decorator_metadata {
            self.add_member_metadata(&mut expressions, member)?;
        }

        let prefix = self.class_member_prefix(class_node, member)?;
        let key = self.member_key(member)?;
        let mut arguments = Vec::with_capacity(4);
        arguments.push(self.arena.create_array_literal(expressions, false));
        arguments.push(prefix);
        arguments.push(key);
        if self.context.options.target > ScriptTarget::ES3 {
            let descriptor = if self.arena.is_kind(member, SyntaxKind::PropertyDeclaration) {
                self.arena.create_void_zero()
            } else {
                self.arena.create_null()
            };
            arguments.push(descriptor);
        }

        self.context.request_emit_helper(&DECORATE_HELPER);
        let helper = create_helper_name(self.arena, "__decorate");
        let call = self.arena.create_call(helper, arguments);
        self.arena.add_emit_flags(call, EmitFlags::NO_COMMENTS);
        Ok(call)
    }

    /// `C` for static members, `C.prototype` otherwise.
    fn class_member_prefix(&mut self, class_node: NodeIndex, member: NodeIndex) -> EmitResult<NodeIndex> {
        let name = self.arena.get_declaration_name(class_node)?;
        if is_static(self.arena, member) {
            return Ok(name);
        }
        Ok(self.arena.create_property_access_str(name, "prototype"))
    }

    /// The property key argument: the relocated temp for a computed name
    /// that cannot be evaluated twice.
    fn member_key(&mut self, member: NodeIndex) -> EmitResult<NodeIndex> {
        let name = self.arena.declaration_name_node(member);
        let key = match self.arena.data(name)?.clone() {
            NodeData::ComputedPropertyName { expression } => {
                if is_simple_computed_name(self.arena, expression) {
                    visit_node(self, expression)?
                } else {
                    self.arena.get_generated_name_for_node(name)
                }
            }
            _ => self.arena.create_expression_for_property_name(name)?,
        };
        self.arena.add_emit_flags(key, EmitFlags::NO_COMMENTS | EmitFlags::NO_SOURCE_MAP);
        Ok(key)
    }

    /// `__param(i, dec)` entries first, then the member's own decorators.
    fn transform_all_decorators(&mut self, all: &AllDecorators) -> EmitResult<Vec<NodeIndex>> {
        let mut expressions = Vec::new();
        for (index, decorators) in &all.parameters {
            for &decorator in decorators {
                let NodeData::Decorator { expression } = self.arena.data(decorator)?.clone() else {
                    continue;
                };
                let value = visit_node(self, expression)?;
                self.context.request_emit_helper(&PARAM_HELPER);
                let helper = create_helper_name(self.arena, "__param");
                let index = self.arena.create_number(*index as f64);
                let call = self.arena.create_call(helper, vec![index, value]);
                self.arena.set_text_range_from(call, expression);
                self.arena.add_emit_flags(call, EmitFlags::NO_COMMENTS);
                expressions.push(call);
            }
        }
        for &decorator in &all.decorators {
            let NodeData::Decorator { expression } = self.arena.data(decorator)?.clone() else {
                continue;
            };
            let value = visit_node(self, expression)?;
            expressions.push(value);
        }
        Ok(expressions)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    fn add_member_metadata(&mut self, expressions: &mut Vec<NodeIndex>, member: NodeIndex) -> EmitResult<()> {
        let kind = self.arena.node(member)?.kind();
        if matches!(
            kind,
            SyntaxKind::MethodDeclaration
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::PropertyDeclaration
        ) {
            let serialized = self.serialize_type_of_member(member, kind)?;
            expressions.push(self.create_metadata("design:type", serialized));
        }
        if matches!(kind, SyntaxKind::MethodDeclaration | SyntaxKind::SetAccessor) {
            let parameters = self.function_parameters(member);
            let types = self.serialize_parameter_types(&parameters)?;
            expressions.push(self.create_metadata("design:paramtypes", types));
        }
        if kind == SyntaxKind::MethodDeclaration {
            let return_type = self
                .arena
                .data(member)?
                .as_function()
                .map_or(NodeIndex::NONE, |f| f.return_type);
            let serialized = if return_type.is_some() {
                self.serialize_type_node(return_type)?
            } else {
                self.arena.create_void_zero()
            };
            expressions.push(self.create_metadata("design:returntype", serialized));
        }
        Ok(())
    }

    fn create_metadata(&mut self, key: &str, value: NodeIndex) -> NodeIndex {
        self.context.request_emit_helper(&METADATA_HELPER);
        let helper = create_helper_name(self.arena, "__metadata");
        let key = self.arena.create_string_literal(key);
        self.arena.create_call(helper, vec![key, value])
    }

    fn serialize_type_of_member(&mut self, member: NodeIndex, kind: SyntaxKind) -> EmitResult<NodeIndex> {
        let type_node = match self.arena.data(member)? {
            NodeData::PropertyDeclaration { type_node, .. } => *type_node,
            NodeData::GetAccessor(f) => f.return_type,
            NodeData::SetAccessor(f) => f
                .parameters
                .iter()
                .find(|&p| !is_this_parameter(self.arena, p))
                .and_then(|p| match self.arena.get(p).map(|n| &n.data) {
                    Some(NodeData::Parameter { type_node, .. }) => Some(*type_node),
                    _ => None,
                })
                .unwrap_or(NodeIndex::NONE),
            _ => NodeIndex::NONE,
        };
        if kind == SyntaxKind::MethodDeclaration {
            return Ok(self.arena.create_identifier("Function"));
        }
        if type_node.is_none() {
            return Ok(self.arena.create_identifier("Object"));
        }
        self.serialize_type_node(type_node)
    }

    fn function_parameters(&self, function: NodeIndex) -> Vec<NodeIndex> {
        self.arena
            .get(function)
            .and_then(|n| n.data.as_function())
            .map(|f| f.parameters.iter().filter(|&p| !is_this_parameter(self.arena, p)).collect())
            .unwrap_or_default()
    }

    /// `[String, Number]`; a rest parameter contributes its element type.
    fn serialize_parameter_types(&mut self, parameters: &[NodeIndex]) -> EmitResult<NodeIndex> {
        let mut types = Vec::with_capacity(parameters.len());
        for &parameter in parameters {
            let NodeData::Parameter {
                dot_dot_dot, type_node, ..
            } = self.arena.data(parameter)?.clone()
            else {
                continue;
            };
            let type_node = if dot_dot_dot {
                match self.arena.data(type_node).ok() {
                    Some(NodeData::ArrayType { element_type }) => *element_type,
                    _ => type_node,
                }
            } else {
                type_node
            };
            let serialized = if type_node.is_some() {
                self.serialize_type_node(type_node)?
            } else {
                self.arena.create_identifier("Object")
            };
            types.push(serialized);
        }
        Ok(self.arena.create_array_literal(types, false))
    }

    /// The runtime constructor a type annotation stands for.
    fn serialize_type_node(&mut self, type_node: NodeIndex) -> EmitResult<NodeIndex> {
        let data = self.arena.data(type_node)?.clone();
        Ok(match data {
            NodeData::KeywordType { keyword } => match keyword {
                SyntaxKind::VoidKeyword | SyntaxKind::UndefinedKeyword | SyntaxKind::NeverKeyword => {
                    self.arena.create_void_zero()
                }
                SyntaxKind::BooleanKeyword => self.arena.create_identifier("Boolean"),
                SyntaxKind::StringKeyword => self.arena.create_identifier("String"),
                SyntaxKind::NumberKeyword => self.arena.create_identifier("Number"),
                SyntaxKind::SymbolKeyword => self.serialize_symbol(),
                SyntaxKind::BigIntKeyword => self.global_or_object("BigInt"),
                _ => self.arena.create_identifier("Object"),
            },
            NodeData::NullKeyword => self.arena.create_void_zero(),
            NodeData::ParenthesizedType { type_node } => self.serialize_type_node(type_node)?,
            NodeData::FunctionType { .. } | NodeData::ConstructorType { .. } => self.arena.create_identifier("Function"),
            NodeData::ArrayType { .. } | NodeData::TupleType { .. } => self.arena.create_identifier("Array"),
            NodeData::LiteralType { literal } => match self.arena.data(literal)? {
                NodeData::StringLiteral { .. } | NodeData::NoSubstitutionTemplateLiteral(_) => {
                    self.arena.create_identifier("String")
                }
                NodeData::NumericLiteral { .. } | NodeData::PrefixUnaryExpression { .. } => {
                    self.arena.create_identifier("Number")
                }
                NodeData::TrueKeyword | NodeData::FalseKeyword => self.arena.create_identifier("Boolean"),
                NodeData::NullKeyword => self.arena.create_void_zero(),
                _ => self.arena.create_identifier("Object"),
            },
            NodeData::TypeOperator { operator, type_node } => {
                if operator == SyntaxKind::KeyOfKeyword {
                    self.arena.create_identifier("String")
                } else {
                    self.serialize_type_node(type_node)?
                }
            }
            NodeData::UnionType { types } | NodeData::IntersectionType { types } => {
                self.serialize_union_or_intersection(&types)?
            }
            NodeData::TypeReference { type_name, .. } => self.serialize_type_reference(type_name)?,
            _ => self.arena.create_identifier("Object"),
        })
    }

    /// The common constructor of every constituent, `Object` when they
    /// differ. `null`, `undefined` and `never` don't count.
    fn serialize_union_or_intersection(&mut self, types: &NodeList) -> EmitResult<NodeIndex> {
        let mut serialized_text: Option<String> = None;
        let mut serialized: Option<NodeIndex> = None;
        for constituent in types.iter() {
            let constituent = skip_parenthesized_types(self.arena, constituent);
            if is_nullish_type(self.arena, constituent) {
                continue;
            }
            let value = self.serialize_type_node(constituent)?;
            let text = serialized_identifier_text(self.arena, value);
            if text.as_deref() == Some("Object") {
                return Ok(value);
            }
            match (&serialized_text, text) {
                (None, text) if serialized.is_none() => {
                    serialized_text = text;
                    serialized = Some(value);
                }
                (Some(previous), Some(text)) if *previous == text => {}
                _ => return Ok(self.arena.create_identifier("Object")),
            }
        }
        Ok(match serialized {
            Some(value) => value,
            None => self.arena.create_void_zero(),
        })
    }

    fn serialize_type_reference(&mut self, type_name: NodeIndex) -> EmitResult<NodeIndex> {
        use TypeReferenceSerializationKind as Kind;
        let kind = self.context.resolver.get_type_reference_serialization_kind(type_name);
        Ok(match kind {
            Kind::Unknown => {
                let check = self.serialize_entity_name_as_expression_fallback(type_name)?;
                let value = self.serialize_entity_name(type_name)?;
                let object = self.arena.create_identifier("Object");
                self.arena.create_conditional(check, object, value)
            }
            Kind::TypeWithConstructSignatureAndValue => self.serialize_entity_name(type_name)?,
            Kind::VoidNullableOrNeverType => self.arena.create_void_zero(),
            Kind::BooleanType => self.arena.create_identifier("Boolean"),
            Kind::NumberLikeType => self.arena.create_identifier("Number"),
            Kind::BigIntLikeType => self.global_or_object("BigInt"),
            Kind::StringLikeType => self.arena.create_identifier("String"),
            Kind::ArrayLikeType => self.arena.create_identifier("Array"),
            Kind::ESSymbolType => self.serialize_symbol(),
            Kind::TypeWithCallSignature => self.arena.create_identifier("Function"),
            Kind::Promise => self.arena.create_identifier("Promise"),
            Kind::ObjectType => self.arena.create_identifier("Object"),
        })
    }

    /// `typeof A === "undefined"`, or for `A.B`:
    /// `typeof (_a = typeof A !== "undefined" && A.B) === "undefined"`
    /// written without temps as a chain of `||` checks.
    fn serialize_entity_name_as_expression_fallback(&mut self, type_name: NodeIndex) -> EmitResult<NodeIndex> {
        match self.arena.data(type_name)?.clone() {
            NodeData::QualifiedName { left, .. } => {
                let left_check = self.serialize_entity_name_as_expression_fallback(left)?;
                let whole = self.serialize_entity_name(type_name)?;
                let whole_check = self.undefined_check(whole);
                Ok(self.arena.create_logical_or(left_check, whole_check))
            }
            _ => {
                let value = self.serialize_entity_name(type_name)?;
                Ok(self.undefined_check(value))
            }
        }
    }

    fn undefined_check(&mut self, value: NodeIndex) -> NodeIndex {
        self.arena.create_type_check(value, "undefined")
    }

    /// Fresh identifiers (or property accesses) spelling an entity name.
    fn serialize_entity_name(&mut self, name: NodeIndex) -> EmitResult<NodeIndex> {
        match self.arena.data(name)?.clone() {
            NodeData::QualifiedName { left, right } => {
                let left = self.serialize_entity_name(left)?;
                let right_text = self.arena.identifier_text(right).to_string();
                Ok(self.arena.create_property_access_str(left, &right_text))
            }
            _ => {
                let text = self.arena.identifier_text(name).to_string();
                let id = self.arena.create_identifier(&text);
                self.arena.set_original(id, name);
                Ok(id)
            }
        }
    }

    fn serialize_symbol(&mut self) -> NodeIndex {
        if self.context.options.target < ScriptTarget::ES2015 {
            self.global_or_object("Symbol")
        } else {
            self.arena.create_identifier("Symbol")
        }
    }

    /// `typeof Symbol === "function" ? Symbol : Object`
    fn global_or_object(&mut self, name: &str) -> NodeIndex {
        let subject = self.arena.create_identifier(name);
        let check = self.arena.create_type_check(subject, "function");
        let value = self.arena.create_identifier(name);
        let object = self.arena.create_identifier("Object");
        self.arena.create_conditional(check, value, object)
    }
}

/// The first accessor of `member`'s pair that has decorators, and the
/// setter of the pair.
fn accessor_pair(
    arena: &tsemit_ast::NodeArena,
    class: &ClassData,
    member: NodeIndex,
) -> (Option<NodeIndex>, Option<NodeIndex>) {
    let name = member_name_text(arena, member);
    let want_static = is_static(arena, member);
    let mut first = None;
    let mut setter = None;
    for candidate in class.members.iter() {
        if !matches!(arena.kind(candidate), Some(SyntaxKind::GetAccessor | SyntaxKind::SetAccessor))
            || is_static(arena, candidate) != want_static
            || member_name_text(arena, candidate) != name
        {
            continue;
        }
        let has_decorators = arena
            .get(candidate)
            .and_then(|n| n.data.as_function())
            .is_some_and(|f| !f.decorators.is_empty());
        let has_parameter_decorators = arena.is_kind(candidate, SyntaxKind::SetAccessor)
            && !parameter_decorators(arena, candidate).is_empty();
        if first.is_none() && (has_decorators || has_parameter_decorators) {
            first = Some(candidate);
        }
        if arena.is_kind(candidate, SyntaxKind::SetAccessor) {
            setter = Some(candidate);
        }
    }
    (first, setter)
}

fn member_name_text(arena: &tsemit_ast::NodeArena, member: NodeIndex) -> Option<String> {
    let name = arena.declaration_name_node(member);
    match arena.get(name).map(|n| &n.data) {
        Some(NodeData::Identifier(id)) => Some(id.text.clone()),
        Some(NodeData::StringLiteral { text, .. } | NodeData::NumericLiteral { text }) => Some(text.clone()),
        _ => None,
    }
}

/// Decorated parameters of a function-like, by offset past any `this`
/// parameter.
fn parameter_decorators(arena: &tsemit_ast::NodeArena, function: NodeIndex) -> Vec<(usize, Vec<NodeIndex>)> {
    let Some(f) = arena.get(function).and_then(|n| n.data.as_function()) else {
        return Vec::new();
    };
    f.parameters
        .iter()
        .filter(|&p| !is_this_parameter(arena, p))
        .enumerate()
        .filter(|&(_, p)| has_parameter_decorators(arena, p))
        .filter_map(|(index, p)| match arena.get(p).map(|n| &n.data) {
            Some(NodeData::Parameter { decorators, .. }) => Some((index, decorators.nodes.clone())),
            _ => None,
        })
        .collect()
}

fn skip_parenthesized_types(arena: &tsemit_ast::NodeArena, mut node: NodeIndex) -> NodeIndex {
    while let Some(NodeData::ParenthesizedType { type_node }) = arena.get(node).map(|n| &n.data) {
        node = *type_node;
    }
    node
}

fn is_nullish_type(arena: &tsemit_ast::NodeArena, node: NodeIndex) -> bool {
    match arena.get(node).map(|n| &n.data) {
        Some(NodeData::KeywordType { keyword }) => matches!(
            keyword,
            SyntaxKind::NeverKeyword | SyntaxKind::NullKeyword | SyntaxKind::UndefinedKeyword
        ),
        Some(NodeData::NullKeyword) => true,
        Some(NodeData::LiteralType { literal }) => arena.is_kind(*literal, SyntaxKind::NullKeyword),
        _ => false,
    }
}

/// `Some("String")` for a plain identifier result, `None` for compound ones.
fn serialized_identifier_text(arena: &tsemit_ast::NodeArena, node: NodeIndex) -> Option<String> {
    match arena.get(node).map(|n| &n.data) {
        Some(NodeData::Identifier(id)) => Some(id.text.clone()),
        _ => None,
    }
}
