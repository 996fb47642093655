//! Functions, arrow functions and their parameter lists.

use super::Es2015Transformer;
use crate::hierarchy_facts::{HierarchyFacts, with_subtree};
use crate::transforms::utilities::function_data_of_kind;
use crate::transforms::visitor::{
    VisitResult, merge_lexical_environment, prologue_count, single, visit_each_child, visit_node, visit_nodes,
};
use tracing::trace;
use tsemit_ast::utilities::{is_binding_pattern, is_prologue_directive};
use tsemit_ast::{EmitFlags, FunctionData, NodeData, NodeFlags, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::EmitResult;

impl Es2015Transformer<'_, '_> {
    // =========================================================================
    // Function-like nodes
    // =========================================================================

    /// `(x) => x * 2` becomes `function (x) { return x * 2; }`, printed with
    /// `this` as `_this`.
    pub(super) fn visit_arrow_function(&mut self, node: NodeIndex, f: FunctionData) -> EmitResult<NodeIndex> {
        self.outside_converted_loop(|this| {
            with_subtree(
                this,
                HierarchyFacts::ARROW_FUNCTION_EXCLUDES,
                HierarchyFacts::ARROW_FUNCTION_INCLUDES,
                HierarchyFacts::ARROW_FUNCTION_SUBTREE_EXCLUDES,
                HierarchyFacts::NONE,
                |this| {
                    let parameters = this.visit_parameter_list(&f.parameters)?;
                    let body = this.transform_function_body(node, SyntaxKind::ArrowFunction, &f)?;
                    let function = this.arena.create_function_expression(NodeIndex::NONE, parameters, body);
                    this.arena.set_original_and_range(function, node);
                    this.arena.add_emit_flags(function, EmitFlags::CAPTURES_THIS);
                    Ok(function)
                },
            )
        })
    }

    pub(super) fn visit_function_expression(&mut self, node: NodeIndex, f: FunctionData) -> EmitResult<NodeIndex> {
        self.visit_function(node, SyntaxKind::FunctionExpression, f)
    }

    pub(super) fn visit_function_declaration(&mut self, node: NodeIndex, f: FunctionData) -> EmitResult<NodeIndex> {
        self.visit_function(node, SyntaxKind::FunctionDeclaration, f)
    }

    fn visit_function(&mut self, node: NodeIndex, kind: SyntaxKind, f: FunctionData) -> EmitResult<NodeIndex> {
        self.outside_converted_loop(|this| {
            with_subtree(
                this,
                HierarchyFacts::FUNCTION_EXCLUDES,
                HierarchyFacts::FUNCTION_INCLUDES,
                HierarchyFacts::FUNCTION_SUBTREE_EXCLUDES,
                HierarchyFacts::NONE,
                |this| {
                    let parameters = this.visit_parameter_list(&f.parameters)?;
                    let body = this.transform_function_body(node, kind, &f)?;
                    // `_newTarget` compares against the function, so it needs a name.
                    let name = if this.hierarchy_facts.contains(HierarchyFacts::NEW_TARGET) {
                        this.arena.get_local_name(node)?
                    } else {
                        f.name
                    };
                    let data = function_data_of_kind(
                        kind,
                        FunctionData {
                            name,
                            parameters: f.parameters.with_nodes(parameters),
                            type_parameters: None,
                            return_type: NodeIndex::NONE,
                            body,
                            ..f
                        },
                    )?;
                    Ok(this.arena.update_node(node, data))
                },
            )
        })
    }

    /// Accessors of an object literal keep their accessor form.
    pub(super) fn visit_accessor_declaration(
        &mut self,
        node: NodeIndex,
        kind: SyntaxKind,
        f: FunctionData,
    ) -> EmitResult<NodeIndex> {
        self.outside_converted_loop(|this| {
            with_subtree(
                this,
                HierarchyFacts::FUNCTION_EXCLUDES,
                HierarchyFacts::FUNCTION_INCLUDES,
                HierarchyFacts::FUNCTION_SUBTREE_EXCLUDES,
                HierarchyFacts::NONE,
                |this| {
                    let name = visit_node(this, f.name)?;
                    let parameters = this.visit_parameter_list(&f.parameters)?;
                    let body = this.transform_function_body(node, kind, &f)?;
                    let data = function_data_of_kind(
                        kind,
                        FunctionData {
                            name,
                            parameters: f.parameters.with_nodes(parameters),
                            type_parameters: None,
                            return_type: NodeIndex::NONE,
                            body,
                            ..f
                        },
                    )?;
                    Ok(this.arena.update_node(node, data))
                },
            )
        })
    }

    /// `m() {}` in an object literal becomes `m: function () {}`.
    pub(super) fn visit_object_literal_method(&mut self, node: NodeIndex, f: FunctionData) -> EmitResult<NodeIndex> {
        let name = visit_node(self, f.name)?;
        let function =
            self.transform_function_like_to_expression(node, SyntaxKind::MethodDeclaration, &f, NodeIndex::NONE, false)?;
        self.arena.add_emit_flags(function, EmitFlags::NO_LEADING_COMMENTS);
        let property = self.arena.create_property_assignment(name, function);
        Ok(self.arena.set_original_and_range(property, node))
    }

    /// A method, accessor or constructor body as a plain function expression.
    pub(super) fn transform_function_like_to_expression(
        &mut self,
        node: NodeIndex,
        kind: SyntaxKind,
        f: &FunctionData,
        name: NodeIndex,
        non_static_class_element: bool,
    ) -> EmitResult<NodeIndex> {
        let include = if non_static_class_element {
            HierarchyFacts::FUNCTION_INCLUDES | HierarchyFacts::NON_STATIC_CLASS_ELEMENT
        } else {
            HierarchyFacts::FUNCTION_INCLUDES
        };
        self.outside_converted_loop(|this| {
            with_subtree(
                this,
                HierarchyFacts::FUNCTION_EXCLUDES,
                include,
                HierarchyFacts::FUNCTION_SUBTREE_EXCLUDES,
                HierarchyFacts::NONE,
                |this| {
                    let parameters = this.visit_parameter_list(&f.parameters)?;
                    let body = this.transform_function_body(node, kind, f)?;
                    let function = this.arena.create_function_expression(name, parameters, body);
                    Ok(this.arena.set_original_and_range(function, node))
                },
            )
        })
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Rest parameters disappear, destructured ones become a generated name,
    /// initializers move into the body.
    pub(super) fn visit_parameter_list(&mut self, parameters: &NodeList) -> EmitResult<Vec<NodeIndex>> {
        let mut out = Vec::with_capacity(parameters.len());
        for parameter in parameters.iter() {
            let NodeData::Parameter {
                dot_dot_dot,
                name,
                initializer,
                ..
            } = self.arena.data(parameter)?.clone()
            else {
                out.push(parameter);
                continue;
            };
            if dot_dot_dot {
                continue;
            }
            if is_binding_pattern(self.arena, name) {
                let generated = self.arena.get_generated_name_for_node(parameter);
                let lowered = self.arena.create_parameter(generated);
                out.push(self.arena.set_original_and_range(lowered, parameter));
            } else if initializer.is_some() {
                let lowered = self.arena.create_parameter(name);
                out.push(self.arena.set_original_and_range(lowered, parameter));
            } else {
                out.push(parameter);
            }
        }
        Ok(out)
    }

    /// `if (x === void 0) { x = 1; }` per defaulted parameter, and the
    /// destructuring of pattern parameters. True when anything was added.
    pub(super) fn add_default_value_assignments(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        parameters: &NodeList,
    ) -> EmitResult<bool> {
        let mut added = false;
        for parameter in parameters.iter() {
            let NodeData::Parameter {
                dot_dot_dot,
                name,
                initializer,
                ..
            } = self.arena.data(parameter)?.clone()
            else {
                continue;
            };
            if dot_dot_dot {
                continue;
            }
            if is_binding_pattern(self.arena, name) {
                added |= self.insert_default_value_for_binding_pattern(statements, parameter, name, initializer)?;
            } else if initializer.is_some() {
                self.insert_default_value_for_initializer(statements, parameter, name, initializer)?;
                added = true;
            }
        }
        Ok(added)
    }

    fn insert_default_value_for_binding_pattern(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        parameter: NodeIndex,
        name: NodeIndex,
        initializer: NodeIndex,
    ) -> EmitResult<bool> {
        let has_elements = match self.arena.data(name)? {
            NodeData::ObjectBindingPattern { elements } | NodeData::ArrayBindingPattern { elements } => {
                !elements.is_empty()
            }
            _ => false,
        };
        let temp = self.arena.get_generated_name_for_node(parameter);
        let statement = if has_elements {
            let declarations = self.flatten_destructuring_binding(parameter, temp, false)?;
            self.arena.create_variable_statement(declarations)
        } else if initializer.is_some() {
            let value = visit_node(self, initializer)?;
            let assignment = self.arena.create_assignment(temp, value);
            self.arena.create_expression_statement(assignment)
        } else {
            return Ok(false);
        };
        self.arena.add_emit_flags(statement, EmitFlags::CUSTOM_PROLOGUE);
        statements.push(statement);
        Ok(true)
    }

    fn insert_default_value_for_initializer(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        parameter: NodeIndex,
        name: NodeIndex,
        initializer: NodeIndex,
    ) -> EmitResult<()> {
        let value = visit_node(self, initializer)?;
        self.arena
            .add_emit_flags(value, EmitFlags::NO_SOURCE_MAP | EmitFlags::NO_COMMENTS);

        let checked = self.arena.get_synthesized_clone(name)?;
        let void_zero = self.arena.create_void_zero();
        let condition = self.arena.create_strict_equality(checked, void_zero);

        let target = self.arena.get_mutable_clone(name)?;
        self.arena.add_emit_flags(target, EmitFlags::NO_SOURCE_MAP);
        let assignment = self.arena.create_assignment(target, value);
        self.arena.set_text_range_from(assignment, parameter);
        self.arena.add_emit_flags(assignment, EmitFlags::NO_COMMENTS);
        let assignment = self.arena.create_expression_statement(assignment);

        let block = self.arena.create_block(vec![assignment], false);
        self.arena.set_text_range_from(block, parameter);
        self.arena.add_emit_flags(
            block,
            EmitFlags::SINGLE_LINE | EmitFlags::NO_TRAILING_SOURCE_MAP | EmitFlags::NO_COMMENTS,
        );

        let statement = self.arena.create_if(condition, block, NodeIndex::NONE);
        self.arena.set_text_range_from(statement, parameter);
        self.arena.set_starts_on_new_line(statement);
        self.arena.add_emit_flags(
            statement,
            EmitFlags::NO_TRAILING_SOURCE_MAP | EmitFlags::CUSTOM_PROLOGUE | EmitFlags::NO_COMMENTS,
        );
        statements.push(statement);
        Ok(())
    }

    /// `var rest = []; for (var _i = N; _i < arguments.length; _i++) { rest[_i - N] = arguments[_i]; }`
    ///
    /// Skipped for the synthesized constructor of a derived class, which
    /// forwards `arguments` as a whole.
    pub(super) fn add_rest_parameter(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        parameters: &NodeList,
        in_constructor_with_synthesized_super: bool,
    ) -> EmitResult<bool> {
        let Some(last) = parameters.last() else {
            return Ok(false);
        };
        let NodeData::Parameter {
            dot_dot_dot: true,
            name,
            ..
        } = self.arena.data(last)?.clone()
        else {
            return Ok(false);
        };
        if in_constructor_with_synthesized_super {
            return Ok(false);
        }

        let is_identifier = self.arena.is_kind(name, SyntaxKind::Identifier);
        let declaration_name = if is_identifier {
            self.arena.get_mutable_clone(name)?
        } else {
            self.arena.create_temp_variable()
        };
        self.arena.add_emit_flags(declaration_name, EmitFlags::NO_SOURCE_MAP);
        let expression_name = if is_identifier {
            self.arena.get_synthesized_clone(name)?
        } else {
            declaration_name
        };
        let rest_index = parameters.len() - 1;
        let temp = self.arena.create_loop_variable();

        let empty = self.arena.create_array_literal(Vec::new(), false);
        let declaration = self.arena.create_variable_declaration(declaration_name, empty);
        let statement = self.arena.create_variable_statement(vec![declaration]);
        self.arena.set_text_range_from(statement, last);
        self.arena.add_emit_flags(statement, EmitFlags::CUSTOM_PROLOGUE);
        statements.push(statement);

        let start = self.arena.create_number(rest_index as f64);
        let counter = self.arena.create_variable_declaration(temp, start);
        let initializer = self
            .arena
            .create_variable_declaration_list(vec![counter], NodeFlags::NONE);
        self.arena.set_text_range_from(initializer, last);

        let arguments = self.arena.create_identifier("arguments");
        let length = self.arena.create_property_access_str(arguments, "length");
        let condition = self.arena.create_less_than(temp, length);
        self.arena.set_text_range_from(condition, last);
        let incrementor = self.arena.create_postfix(temp, SyntaxKind::PlusPlusToken);
        self.arena.set_text_range_from(incrementor, last);

        let index = if rest_index == 0 {
            temp
        } else {
            let offset = self.arena.create_number(rest_index as f64);
            self.arena.create_subtract(temp, offset)
        };
        let target = self.arena.create_element_access(expression_name, index);
        let arguments = self.arena.create_identifier("arguments");
        let source = self.arena.create_element_access(arguments, temp);
        let copy = self.arena.create_assignment(target, source);
        let copy = self.arena.create_expression_statement(copy);
        self.arena.set_text_range_from(copy, last);
        let body = self.arena.create_block(vec![copy], true);

        let for_statement = self.arena.create_for(initializer, condition, incrementor, body);
        self.arena.add_emit_flags(for_statement, EmitFlags::CUSTOM_PROLOGUE);
        self.arena.set_starts_on_new_line(for_statement);
        statements.push(for_statement);

        if !is_identifier {
            let declarations = self.flatten_destructuring_binding(last, expression_name, false)?;
            let statement = self.arena.create_variable_statement(declarations);
            self.arena.add_emit_flags(statement, EmitFlags::CUSTOM_PROLOGUE);
            statements.push(statement);
        }
        trace!(rest_index, "lowered rest parameter");
        Ok(true)
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// The lowered body of a function-like node: directives, hoisted
    /// declarations, `_newTarget`/`_this` captures, parameter prologue, then
    /// the visited statements. A concise arrow body becomes `return expr;`.
    pub(super) fn transform_function_body(
        &mut self,
        node: NodeIndex,
        kind: SyntaxKind,
        f: &FunctionData,
    ) -> EmitResult<NodeIndex> {
        let body = f.body;
        let (block_statements, block_multi_line) = match self.arena.data(body)? {
            NodeData::Block { statements, multi_line } => (Some(statements.clone()), *multi_line),
            _ => (None, false),
        };

        let ((directives, statements, mut multi_line, single_line), hoisted) = self.in_lexical_environment(|this| {
            let mut directives = Vec::new();
            let mut statements = Vec::new();
            let mut multi_line = false;
            let mut single_line = false;
            let mut offset = 0;
            if let Some(list) = &block_statements {
                offset = prologue_count(this.arena, &list.nodes);
                for &statement in &list.nodes[..offset] {
                    if is_prologue_directive(this.arena, statement) {
                        directives.push(statement);
                    } else {
                        statements.extend(visit_nodes(this, &[statement])?);
                    }
                }
            }
            multi_line |= this.add_default_value_assignments(&mut statements, &f.parameters)?;
            multi_line |= this.add_rest_parameter(&mut statements, &f.parameters, false)?;
            match &block_statements {
                Some(list) => {
                    statements.extend(visit_nodes(this, &list.nodes[offset..])?);
                    multi_line |= block_multi_line;
                }
                None => {
                    let expression = visit_node(this, body)?;
                    let statement = this.arena.create_return(expression);
                    this.arena.set_text_range_from(statement, body);
                    this.arena.add_emit_flags(
                        statement,
                        EmitFlags::NO_TRAILING_SOURCE_MAP | EmitFlags::NO_TRAILING_COMMENTS,
                    );
                    statements.push(statement);
                    single_line = true;
                }
            }
            Ok((directives, statements, multi_line, single_line))
        })?;

        let mut prologue = merge_lexical_environment(self.arena, directives, hoisted);
        self.insert_capture_new_target_if_needed(&mut prologue, node, kind)?;
        self.insert_capture_this_if_needed(&mut prologue, node)?;
        if !prologue.is_empty() {
            multi_line = true;
        }
        prologue.extend(statements);

        if let Some(list) = &block_statements {
            if prologue == list.nodes {
                return Ok(body);
            }
        }
        let block = self.arena.create_block(prologue, multi_line);
        self.arena.set_original_and_range(block, body);
        if !multi_line && single_line {
            self.arena.add_emit_flags(block, EmitFlags::SINGLE_LINE);
        }
        Ok(block)
    }

    /// `var _this = this;` after the prologue when an arrow below used `this`.
    pub(super) fn insert_capture_this_if_needed(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        node: NodeIndex,
    ) -> EmitResult<bool> {
        if !self.hierarchy_facts.contains(HierarchyFacts::CAPTURED_LEXICAL_THIS)
            || self.arena.is_kind(node, SyntaxKind::ArrowFunction)
        {
            return Ok(false);
        }
        let this = self.create_actual_this();
        self.insert_capture_this(statements, node, this);
        Ok(true)
    }

    /// `var _this = <initializer>;` after the prologue of `statements`.
    pub(super) fn insert_capture_this(&mut self, statements: &mut Vec<NodeIndex>, node: NodeIndex, initializer: NodeIndex) {
        let name = self.create_captured_this_name();
        let declaration = self.arena.create_variable_declaration(name, initializer);
        let statement = self.arena.create_variable_statement(vec![declaration]);
        self.arena
            .add_emit_flags(statement, EmitFlags::NO_COMMENTS | EmitFlags::CUSTOM_PROLOGUE);
        let range = self.arena.range(node);
        self.arena.set_source_map_range(statement, range);
        let at = prologue_count(self.arena, statements);
        statements.insert(at, statement);
    }

    /// `var _newTarget = ...;` when the body referred to `new.target`.
    pub(super) fn insert_capture_new_target_if_needed(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        node: NodeIndex,
        kind: SyntaxKind,
    ) -> EmitResult<()> {
        if !self.hierarchy_facts.contains(HierarchyFacts::NEW_TARGET) {
            return Ok(());
        }
        let value = match kind {
            SyntaxKind::MethodDeclaration | SyntaxKind::GetAccessor | SyntaxKind::SetAccessor => {
                self.arena.create_void_zero()
            }
            SyntaxKind::Constructor => {
                let this = self.create_actual_this();
                self.arena.create_property_access_str(this, "constructor")
            }
            SyntaxKind::FunctionDeclaration | SyntaxKind::FunctionExpression => {
                // this && this instanceof F ? this.constructor : void 0
                let this = self.create_actual_this();
                let instance = self.create_actual_this();
                let local_name = self.arena.get_local_name(node)?;
                let instance_of = self
                    .arena
                    .create_binary(instance, SyntaxKind::InstanceOfKeyword, local_name);
                let condition = self.arena.create_logical_and(this, instance_of);
                let this = self.create_actual_this();
                let constructor = self.arena.create_property_access_str(this, "constructor");
                let void_zero = self.arena.create_void_zero();
                self.arena.create_conditional(condition, constructor, void_zero)
            }
            _ => return Ok(()),
        };
        let name = self.arena.create_file_level_unique_name("_newTarget");
        let declaration = self.arena.create_variable_declaration(name, value);
        let statement = self.arena.create_variable_statement(vec![declaration]);
        self.arena
            .add_emit_flags(statement, EmitFlags::NO_COMMENTS | EmitFlags::CUSTOM_PROLOGUE);
        let at = prologue_count(self.arena, statements);
        statements.insert(at, statement);
        Ok(())
    }

    // =========================================================================
    // Returns
    // =========================================================================

    /// In a converted loop body `return x;` becomes `return { value: x };`;
    /// in a derived constructor that captured `_this`, `return;` returns it.
    pub(super) fn visit_return_statement(&mut self, node: NodeIndex, expression: NodeIndex) -> EmitResult<VisitResult> {
        let returns_captured_this = expression.is_none()
            && self
                .hierarchy_facts
                .contains(HierarchyFacts::CONSTRUCTOR_WITH_CAPTURED_SUPER);

        if self.converted_loop_state.is_some() {
            let value = if returns_captured_this {
                self.create_captured_this_name()
            } else if expression.is_some() {
                visit_node(self, expression)?
            } else {
                self.arena.create_void_zero()
            };
            if let Some(state) = self.converted_loop_state.as_mut() {
                state.non_local_jumps |= super::loops::Jump::RETURN;
            }
            let property = self.arena.create_property_assignment_str("value", value);
            let object = self.arena.create_object_literal(vec![property], false);
            let statement = self.arena.create_return(object);
            return Ok(single(self.arena.set_original_and_range(statement, node)));
        }

        if returns_captured_this {
            let this = self.create_captured_this_name();
            let statement = self.arena.create_return(this);
            return Ok(single(self.arena.set_original_and_range(statement, node)));
        }
        Ok(single(visit_each_child(self, node)?))
    }
}

