//! Loops, labels and the per-iteration closure conversion.
//!
//! A loop whose block-scoped bindings are captured by a closure gets its
//! body moved into a function called once per iteration, so that every
//! iteration sees its own copy of the bindings:
//!
//! ```text
//! var _loop_1 = function (i) {
//!     fns.push(function () { return i; });
//! };
//! for (var i = 0; i < 3; i++) {
//!     _loop_1(i);
//! }
//! ```
//!
//! Jumps that leave the moved body come back as the function's result:
//! `"break"`, `"continue-L"`, or `{ value: x }` for a `return`, and are
//! dispatched right after the call.

use super::Es2015Transformer;
use crate::hierarchy_facts::{HierarchyFacts, enter_subtree, exit_subtree};
use crate::resolver::NodeCheckFlags;
use crate::transforms::visitor::{
    VisitResult, merge_lexical_environment, single, statements_of, visit_each_child, visit_node, visit_statement,
};
use bitflags::bitflags;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsemit_ast::utilities::{is_binding_pattern, is_block_scoped_list};
use tsemit_ast::{EmitFlags, ModifierFlags, NodeArena, NodeData, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::{EmitError, EmitResult};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(super) struct Jump: u8 {
        const BREAK = 1 << 1;
        const CONTINUE = 1 << 2;
        const RETURN = 1 << 3;
    }
}

/// A loop binding assigned inside the moved body, copied back out after
/// every call: `out_i_1 = i` inside, `i = out_i_1` outside.
#[derive(Clone, Copy, Debug)]
struct LoopOutParameter {
    original_name: NodeIndex,
    out_param_name: NodeIndex,
}

#[derive(Debug, Default)]
pub(super) struct ConvertedLoopState {
    /// Labels visible inside the moved body. `true` while the labeled
    /// statement itself is inside the body, so a jump to it stays local.
    labels: FxHashMap<String, bool>,
    /// Label text to the marker string returned for it.
    labeled_non_local_breaks: IndexMap<String, String>,
    labeled_non_local_continues: IndexMap<String, String>,
    pub(super) non_local_jumps: Jump,
    allowed_non_labeled_jumps: Jump,
    /// Names of the loop bindings, passed to the body function.
    loop_parameters: Vec<NodeIndex>,
    loop_out_parameters: Vec<LoopOutParameter>,
    /// `this_1`, aliasing `this` of the enclosing function.
    this_name: Option<NodeIndex>,
    /// `arguments_1`, aliasing `arguments` of the enclosing function.
    arguments_name: Option<NodeIndex>,
    /// `var` names declared in the body, declared again outside it.
    pub(super) hoisted_local_variables: Vec<NodeIndex>,
    contains_lexical_this: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum LoopConversion {
    Plain,
    ForOf,
}

impl Es2015Transformer<'_, '_> {
    pub(super) fn should_convert_iteration_statement(&self, node: NodeIndex) -> bool {
        self.context
            .resolver
            .get_node_check_flags(self.key(node))
            .contains(NodeCheckFlags::LOOP_WITH_CAPTURED_BLOCK_SCOPED_BINDING)
    }

    // =========================================================================
    // Labels
    // =========================================================================

    pub(super) fn visit_labeled_statement(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let mut labels = Vec::new();
        let mut statement = node;
        while let NodeData::LabeledStatement { label, statement: inner } = self.arena.data(statement)? {
            labels.push(self.arena.identifier_text(*label).to_string());
            statement = *inner;
        }
        self.set_labels(&labels, true);

        let result = match self.arena.kind(statement) {
            Some(SyntaxKind::DoStatement | SyntaxKind::WhileStatement) => {
                self.visit_do_or_while_statement(statement, node)
            }
            Some(SyntaxKind::ForStatement) => self.visit_for_statement(statement, node),
            Some(SyntaxKind::ForInStatement) => self.visit_for_in_statement(statement, node),
            Some(SyntaxKind::ForOfStatement) => self.visit_for_of_statement(statement, node),
            _ => {
                let visited = visit_statement(self, statement)?;
                Ok(single(self.restore_enclosing_label(visited, node)?))
            }
        };
        self.set_labels(&labels, false);
        result
    }

    fn set_labels(&mut self, labels: &[String], in_body: bool) {
        if let Some(state) = self.converted_loop_state.as_mut() {
            for label in labels {
                state.labels.insert(label.clone(), in_body);
            }
        }
    }

    /// Put `node` back under the label chain starting at `outermost_label`.
    pub(super) fn restore_enclosing_label(&mut self, node: NodeIndex, outermost_label: NodeIndex) -> EmitResult<NodeIndex> {
        if outermost_label.is_none() {
            return Ok(node);
        }
        let NodeData::LabeledStatement { label, statement } = self.arena.data(outermost_label)?.clone() else {
            return Ok(node);
        };
        let statement = if self.arena.is_kind(statement, SyntaxKind::LabeledStatement) {
            self.restore_enclosing_label(node, statement)?
        } else {
            node
        };
        Ok(self
            .arena
            .update_node(outermost_label, NodeData::LabeledStatement { label, statement }))
    }

    // =========================================================================
    // Iteration statements
    // =========================================================================

    pub(super) fn visit_do_or_while_statement(&mut self, node: NodeIndex, outermost_label: NodeIndex) -> EmitResult<VisitResult> {
        self.visit_iteration_statement_with_facts(
            HierarchyFacts::DO_OR_WHILE_STATEMENT_EXCLUDES,
            HierarchyFacts::DO_OR_WHILE_STATEMENT_INCLUDES,
            node,
            outermost_label,
            LoopConversion::Plain,
        )
    }

    pub(super) fn visit_for_statement(&mut self, node: NodeIndex, outermost_label: NodeIndex) -> EmitResult<VisitResult> {
        self.visit_iteration_statement_with_facts(
            HierarchyFacts::FOR_STATEMENT_EXCLUDES,
            HierarchyFacts::FOR_STATEMENT_INCLUDES,
            node,
            outermost_label,
            LoopConversion::Plain,
        )
    }

    pub(super) fn visit_for_in_statement(&mut self, node: NodeIndex, outermost_label: NodeIndex) -> EmitResult<VisitResult> {
        self.visit_iteration_statement_with_facts(
            HierarchyFacts::FOR_IN_OR_FOR_OF_STATEMENT_EXCLUDES,
            HierarchyFacts::FOR_IN_OR_FOR_OF_STATEMENT_INCLUDES,
            node,
            outermost_label,
            LoopConversion::Plain,
        )
    }

    pub(super) fn visit_for_of_statement(&mut self, node: NodeIndex, outermost_label: NodeIndex) -> EmitResult<VisitResult> {
        self.visit_iteration_statement_with_facts(
            HierarchyFacts::FOR_IN_OR_FOR_OF_STATEMENT_EXCLUDES,
            HierarchyFacts::FOR_IN_OR_FOR_OF_STATEMENT_INCLUDES,
            node,
            outermost_label,
            LoopConversion::ForOf,
        )
    }

    fn visit_iteration_statement_with_facts(
        &mut self,
        exclude: HierarchyFacts,
        include: HierarchyFacts,
        node: NodeIndex,
        outermost_label: NodeIndex,
        conversion: LoopConversion,
    ) -> EmitResult<VisitResult> {
        let ancestor = enter_subtree(&mut self.hierarchy_facts, exclude, include);
        let result = self.convert_iteration_statement_body_if_necessary(node, outermost_label, ancestor, conversion);
        exit_subtree(&mut self.hierarchy_facts, ancestor, HierarchyFacts::NONE, HierarchyFacts::NONE);
        result
    }

    fn convert_iteration_statement_body_if_necessary(
        &mut self,
        node: NodeIndex,
        outermost_label: NodeIndex,
        ancestor_facts: HierarchyFacts,
        conversion: LoopConversion,
    ) -> EmitResult<VisitResult> {
        if !self.should_convert_iteration_statement(node) {
            let saved = self
                .converted_loop_state
                .as_mut()
                .map(|state| std::mem::replace(&mut state.allowed_non_labeled_jumps, Jump::BREAK | Jump::CONTINUE));
            let result = match conversion {
                LoopConversion::ForOf => self.convert_for_of_statement(node, outermost_label, None, ancestor_facts),
                LoopConversion::Plain => self
                    .convert_iteration_statement_core(node, None)
                    .and_then(|updated| self.restore_enclosing_label(updated, outermost_label)),
            };
            if let (Some(state), Some(saved)) = (self.converted_loop_state.as_mut(), saved) {
                state.allowed_non_labeled_jumps = saved;
            }
            return Ok(single(result?));
        }

        let mut outer_state = self.converted_loop_state.take();
        let state = self.create_converted_loop_state(node, outer_state.as_mut())?;
        debug!(
            parameters = state.loop_parameters.len(),
            out_parameters = state.loop_out_parameters.len(),
            "moving loop body into a function"
        );
        self.converted_loop_state = Some(state);
        let body = self.visit_converted_loop_body(node);
        let state = self.converted_loop_state.take();
        let (body, state) = match (body, state) {
            (Ok(body), Some(state)) => (body, state),
            (Err(err), _) => {
                self.converted_loop_state = outer_state;
                return Err(err);
            }
            (Ok(_), None) => return Err(EmitError::internal("converted loop state lost while visiting the loop body")),
        };

        let mut statements = Vec::new();
        let function_name = self.arena.create_unique_name("_loop");
        statements.push(self.create_loop_body_function(function_name, body, &state));
        let part = self.generate_call_to_converted_loop(function_name, &state, outer_state.as_mut());
        self.add_extra_declarations_for_converted_loop(&mut statements, state, outer_state.as_mut());
        self.converted_loop_state = outer_state;

        let block = self.arena.create_block(part, true);
        let loop_statement = match conversion {
            LoopConversion::ForOf => {
                let part = statements_of(self.arena, block)?.nodes;
                self.convert_for_of_statement(node, outermost_label, Some(part), ancestor_facts)?
            }
            LoopConversion::Plain => {
                let updated = self.convert_iteration_statement_core(node, Some(block))?;
                self.restore_enclosing_label(updated, outermost_label)?
            }
        };
        statements.push(loop_statement);
        Ok(statements.into())
    }

    /// Rebuild a `for`, `for..in`, `do` or `while` with its parts visited and
    /// `body` (or the visited original body) as the statement.
    fn convert_iteration_statement_core(&mut self, node: NodeIndex, body: Option<NodeIndex>) -> EmitResult<NodeIndex> {
        let data = match self.arena.data(node)?.clone() {
            NodeData::ForStatement {
                initializer,
                condition,
                incrementor,
                statement,
            } => {
                let initializer = self.visit_for_initializer(initializer)?;
                let condition = visit_node(self, condition)?;
                let incrementor = self.visit_expression_with_unused_result(incrementor)?;
                let statement = self.loop_statement(statement, body)?;
                NodeData::ForStatement {
                    initializer,
                    condition,
                    incrementor,
                    statement,
                }
            }
            NodeData::ForInStatement {
                initializer,
                expression,
                statement,
            } => {
                let initializer = self.visit_for_initializer(initializer)?;
                let expression = visit_node(self, expression)?;
                let statement = self.loop_statement(statement, body)?;
                NodeData::ForInStatement {
                    initializer,
                    expression,
                    statement,
                }
            }
            NodeData::DoStatement { statement, expression } => {
                let statement = self.loop_statement(statement, body)?;
                let expression = visit_node(self, expression)?;
                NodeData::DoStatement { statement, expression }
            }
            NodeData::WhileStatement { expression, statement } => {
                let expression = visit_node(self, expression)?;
                let statement = self.loop_statement(statement, body)?;
                NodeData::WhileStatement { expression, statement }
            }
            _ => return visit_each_child(self, node),
        };
        Ok(self.arena.update_node(node, data))
    }

    fn loop_statement(&mut self, statement: NodeIndex, body: Option<NodeIndex>) -> EmitResult<NodeIndex> {
        match body {
            Some(body) => Ok(body),
            None => visit_statement(self, statement),
        }
    }

    fn visit_for_initializer(&mut self, initializer: NodeIndex) -> EmitResult<NodeIndex> {
        if self.arena.is_kind(initializer, SyntaxKind::VariableDeclarationList) {
            visit_node(self, initializer)
        } else {
            self.visit_expression_with_unused_result(initializer)
        }
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    fn create_converted_loop_state(
        &mut self,
        node: NodeIndex,
        outer: Option<&mut ConvertedLoopState>,
    ) -> EmitResult<ConvertedLoopState> {
        let initializer = match self.arena.data(node)? {
            NodeData::ForStatement { initializer, .. }
            | NodeData::ForInStatement { initializer, .. }
            | NodeData::ForOfStatement { initializer, .. } => *initializer,
            _ => NodeIndex::NONE,
        };
        let mut state = ConvertedLoopState::default();
        if self.arena.is_kind(initializer, SyntaxKind::VariableDeclarationList)
            && is_block_scoped_list(self.arena, initializer)
        {
            if let NodeData::VariableDeclarationList { declarations } = self.arena.data(initializer)?.clone() {
                for declaration in declarations.iter() {
                    self.process_loop_variable_declaration(declaration, &mut state)?;
                }
            }
        }
        if let Some(outer) = outer {
            state.arguments_name = outer.arguments_name;
            state.this_name = outer.this_name;
            state.hoisted_local_variables = std::mem::take(&mut outer.hoisted_local_variables);
        }
        Ok(state)
    }

    fn process_loop_variable_declaration(&mut self, declaration: NodeIndex, state: &mut ConvertedLoopState) -> EmitResult<()> {
        let name = self.arena.declaration_name_node(declaration);
        if is_binding_pattern(self.arena, name) {
            let elements = match self.arena.data(name)? {
                NodeData::ObjectBindingPattern { elements } | NodeData::ArrayBindingPattern { elements } => {
                    elements.clone()
                }
                _ => return Ok(()),
            };
            for element in elements.iter() {
                if !self.arena.is_kind(element, SyntaxKind::OmittedExpression) {
                    self.process_loop_variable_declaration(element, state)?;
                }
            }
            return Ok(());
        }
        state.loop_parameters.push(name);
        let flags = self.context.resolver.get_node_check_flags(self.key(declaration));
        if flags.contains(NodeCheckFlags::NEEDS_LOOP_OUT_PARAMETER) {
            let text = format!("out_{}", self.arena.identifier_text(name));
            let out_param_name = self.arena.create_unique_name(&text);
            state.loop_out_parameters.push(LoopOutParameter {
                original_name: name,
                out_param_name,
            });
        }
        Ok(())
    }

    /// The loop body visited in its own lexical environment, as statements.
    fn visit_converted_loop_body(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let statement = match self.arena.data(node)? {
            NodeData::ForStatement { statement, .. }
            | NodeData::ForInStatement { statement, .. }
            | NodeData::ForOfStatement { statement, .. }
            | NodeData::DoStatement { statement, .. }
            | NodeData::WhileStatement { statement, .. } => *statement,
            _ => return Err(EmitError::internal("loop conversion reached a non-loop node")),
        };
        let (visited, hoisted) = self.in_lexical_environment(|this| visit_statement(this, statement))?;
        let mut statements = if self.arena.is_kind(visited, SyntaxKind::Block) {
            statements_of(self.arena, visited)?.nodes
        } else {
            vec![visited]
        };
        if let Some(state) = &self.converted_loop_state {
            let out_parameters = state.loop_out_parameters.clone();
            copy_out_parameters(self.arena, &out_parameters, CopyDirection::ToOutParameter, &mut statements);
        }
        let statements = merge_lexical_environment(self.arena, statements, hoisted);
        let body = self.arena.create_block(statements, true);
        if self.arena.is_kind(visited, SyntaxKind::Block) {
            self.arena.set_original(body, visited);
        }
        Ok(body)
    }

    /// `var _loop_1 = function (i) { ... };`
    fn create_loop_body_function(
        &mut self,
        function_name: NodeIndex,
        body: NodeIndex,
        state: &ConvertedLoopState,
    ) -> NodeIndex {
        let parameters = state
            .loop_parameters
            .iter()
            .map(|&name| self.arena.create_parameter(name))
            .collect();
        let function = self.arena.create_function_expression(NodeIndex::NONE, parameters, body);
        let mut flags = EmitFlags::REUSE_TEMP_VARIABLE_SCOPE;
        if state.contains_lexical_this {
            flags |= EmitFlags::CAPTURES_THIS;
        }
        self.arena.add_emit_flags(function, flags);
        let declaration = self.arena.create_variable_declaration(function_name, function);
        let list = self
            .arena
            .create_variable_declaration_list(vec![declaration], NodeFlags::NONE);
        self.arena.add_emit_flags(list, EmitFlags::NO_HOISTING);
        self.arena.create_variable_statement_from_list(list, ModifierFlags::NONE)
    }

    /// The statements that call the body function and act on its result.
    fn generate_call_to_converted_loop(
        &mut self,
        function_name: NodeIndex,
        state: &ConvertedLoopState,
        mut outer: Option<&mut ConvertedLoopState>,
    ) -> Vec<NodeIndex> {
        let mut statements = Vec::new();
        let is_simple_loop = (state.non_local_jumps - Jump::CONTINUE).is_empty()
            && state.labeled_non_local_breaks.is_empty()
            && state.labeled_non_local_continues.is_empty();
        let call = self.arena.create_call(function_name, state.loop_parameters.clone());

        if is_simple_loop {
            statements.push(self.arena.create_expression_statement(call));
            copy_out_parameters(self.arena, &state.loop_out_parameters, CopyDirection::ToOriginal, &mut statements);
            return statements;
        }

        let result_name = self.arena.create_unique_name("state");
        let declaration = self.arena.create_variable_declaration(result_name, call);
        statements.push(self.arena.create_variable_statement(vec![declaration]));
        copy_out_parameters(self.arena, &state.loop_out_parameters, CopyDirection::ToOriginal, &mut statements);

        if state.non_local_jumps.contains(Jump::RETURN) {
            let returned = match outer.as_deref_mut() {
                Some(outer) => {
                    outer.non_local_jumps |= Jump::RETURN;
                    self.arena.create_return(result_name)
                }
                None => {
                    let value = self.arena.create_property_access_str(result_name, "value");
                    self.arena.create_return(value)
                }
            };
            let check = self.arena.create_type_check(result_name, "object");
            statements.push(self.arena.create_if(check, returned, NodeIndex::NONE));
        }
        if state.non_local_jumps.contains(Jump::BREAK) {
            let marker = self.arena.create_string_literal("break");
            let check = self.arena.create_strict_equality(result_name, marker);
            let jump = self.arena.create_break(NodeIndex::NONE);
            statements.push(self.arena.create_if(check, jump, NodeIndex::NONE));
        }
        if !state.labeled_non_local_breaks.is_empty() || !state.labeled_non_local_continues.is_empty() {
            let mut clauses = Vec::new();
            self.process_labeled_jumps(&state.labeled_non_local_breaks, true, result_name, outer.as_deref_mut(), &mut clauses);
            self.process_labeled_jumps(&state.labeled_non_local_continues, false, result_name, outer.as_deref_mut(), &mut clauses);
            statements.push(self.arena.create_switch(result_name, clauses));
        }
        statements
    }

    /// One `case "break-L":` per labeled jump: jump directly when the label is
    /// reachable from here, otherwise hand the marker to the outer loop.
    fn process_labeled_jumps(
        &mut self,
        table: &IndexMap<String, String>,
        is_break: bool,
        result_name: NodeIndex,
        mut outer: Option<&mut ConvertedLoopState>,
        clauses: &mut Vec<NodeIndex>,
    ) {
        for (label_text, marker) in table {
            let statement = match outer.as_deref_mut() {
                Some(outer) if !outer.labels.get(label_text).copied().unwrap_or(false) => {
                    set_labeled_jump(outer, is_break, label_text, marker);
                    self.arena.create_return(result_name)
                }
                _ => {
                    let label = self.arena.create_identifier(label_text);
                    if is_break {
                        self.arena.create_break(label)
                    } else {
                        self.arena.create_continue(label)
                    }
                }
            };
            let marker = self.arena.create_string_literal(marker);
            clauses.push(self.arena.create_case_clause(marker, vec![statement]));
        }
    }

    /// `var this_1 = this, arguments_1 = arguments, x, out_i_1;` before the
    /// loop, or handed to the enclosing converted loop.
    fn add_extra_declarations_for_converted_loop(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        state: ConvertedLoopState,
        outer: Option<&mut ConvertedLoopState>,
    ) {
        let mut declarations = Vec::new();
        match outer {
            Some(outer) => {
                if state.arguments_name.is_some() {
                    outer.arguments_name = state.arguments_name;
                }
                if state.this_name.is_some() {
                    outer.this_name = state.this_name;
                }
                outer.hoisted_local_variables = state.hoisted_local_variables;
            }
            None => {
                if let Some(name) = state.arguments_name {
                    let arguments = self.arena.create_identifier("arguments");
                    declarations.push(self.arena.create_variable_declaration(name, arguments));
                }
                if let Some(name) = state.this_name {
                    let this = self.arena.create_this();
                    declarations.push(self.arena.create_variable_declaration(name, this));
                }
                for name in state.hoisted_local_variables {
                    declarations.push(self.arena.create_variable_declaration(name, NodeIndex::NONE));
                }
            }
        }
        for parameter in &state.loop_out_parameters {
            declarations.push(
                self.arena
                    .create_variable_declaration(parameter.out_param_name, NodeIndex::NONE),
            );
        }
        if !declarations.is_empty() {
            statements.push(self.arena.create_variable_statement(declarations));
        }
    }

    // =========================================================================
    // Jumps
    // =========================================================================

    /// A jump that would leave the moved body becomes `return "<marker>";`.
    pub(super) fn visit_break_or_continue_statement(
        &mut self,
        node: NodeIndex,
        is_break: bool,
        label: NodeIndex,
    ) -> EmitResult<VisitResult> {
        let label_text = label.is_some().then(|| self.arena.identifier_text(label).to_string());
        let Some(state) = self.converted_loop_state.as_mut() else {
            return Ok(single(visit_each_child(self, node)?));
        };
        let jump = if is_break { Jump::BREAK } else { Jump::CONTINUE };
        let can_jump_locally = match &label_text {
            Some(text) => state.labels.get(text).copied().unwrap_or(false),
            None => state.allowed_non_labeled_jumps.contains(jump),
        };
        if can_jump_locally {
            return Ok(single(node));
        }

        let marker = match &label_text {
            None => {
                state.non_local_jumps |= jump;
                if is_break { "break".to_string() } else { "continue".to_string() }
            }
            Some(text) => {
                let marker = if is_break {
                    format!("break-{text}")
                } else {
                    format!("continue-{text}")
                };
                set_labeled_jump(state, is_break, text, &marker);
                marker
            }
        };
        trace!(%marker, "non-local jump out of converted loop");
        let out_parameters = state.loop_out_parameters.clone();

        let mut expression = self.arena.create_string_literal(&marker);
        if !out_parameters.is_empty() {
            let mut copies = out_parameters
                .iter()
                .map(|parameter| copy_out_parameter(self.arena, parameter, CopyDirection::ToOutParameter))
                .collect::<Vec<_>>();
            copies.push(expression);
            if let Some(inlined) = self.arena.inline_expressions(&copies) {
                expression = inlined;
            }
        }
        let statement = self.arena.create_return(expression);
        Ok(single(self.arena.set_original_and_range(statement, node)))
    }

    /// An unlabeled `break` inside a `switch` leaves the switch, not the body.
    pub(super) fn visit_switch_statement(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let Some(state) = self.converted_loop_state.as_mut() else {
            return Ok(single(visit_each_child(self, node)?));
        };
        let saved = state.allowed_non_labeled_jumps;
        state.allowed_non_labeled_jumps |= Jump::BREAK;
        let result = visit_each_child(self, node);
        if let Some(state) = self.converted_loop_state.as_mut() {
            state.allowed_non_labeled_jumps = saved;
        }
        Ok(single(result?))
    }

    // =========================================================================
    // this and arguments
    // =========================================================================

    /// Inside an arrow `this` is left for the printer to substitute; inside a
    /// moved loop body it is aliased as `this_1`.
    pub(super) fn visit_this_keyword(&mut self, node: NodeIndex) -> NodeIndex {
        let in_arrow = self.hierarchy_facts.contains(HierarchyFacts::ARROW_FUNCTION);
        if in_arrow {
            self.hierarchy_facts |= HierarchyFacts::CAPTURED_LEXICAL_THIS;
        }
        let Some(state) = self.converted_loop_state.as_mut() else {
            return node;
        };
        if in_arrow {
            state.contains_lexical_this = true;
            return node;
        }
        match state.this_name {
            Some(name) => name,
            None => {
                let name = self.arena.create_unique_name("this");
                if let Some(state) = self.converted_loop_state.as_mut() {
                    state.this_name = Some(name);
                }
                name
            }
        }
    }

    pub(super) fn visit_identifier(&mut self, node: NodeIndex) -> NodeIndex {
        if self.converted_loop_state.is_none() || self.arena.identifier_text(node) != "arguments" {
            return node;
        }
        if !self.context.resolver.is_arguments_local_binding(self.key(node)) {
            return node;
        }
        if let Some(name) = self.converted_loop_state.as_ref().and_then(|state| state.arguments_name) {
            return name;
        }
        let name = self.arena.create_unique_name("arguments");
        if let Some(state) = self.converted_loop_state.as_mut() {
            state.arguments_name = Some(name);
        }
        name
    }
}

fn set_labeled_jump(state: &mut ConvertedLoopState, is_break: bool, label_text: &str, marker: &str) {
    let table = if is_break {
        &mut state.labeled_non_local_breaks
    } else {
        &mut state.labeled_non_local_continues
    };
    table.insert(label_text.to_string(), marker.to_string());
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CopyDirection {
    ToOriginal,
    ToOutParameter,
}

fn copy_out_parameter(arena: &mut NodeArena, parameter: &LoopOutParameter, direction: CopyDirection) -> NodeIndex {
    let (target, source) = match direction {
        CopyDirection::ToOriginal => (parameter.original_name, parameter.out_param_name),
        CopyDirection::ToOutParameter => (parameter.out_param_name, parameter.original_name),
    };
    arena.create_assignment(target, source)
}

fn copy_out_parameters(
    arena: &mut NodeArena,
    parameters: &[LoopOutParameter],
    direction: CopyDirection,
    statements: &mut Vec<NodeIndex>,
) {
    for parameter in parameters {
        let copy = copy_out_parameter(arena, parameter, direction);
        statements.push(arena.create_expression_statement(copy));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_jump_markers_are_recorded_per_kind() {
        let mut state = ConvertedLoopState::default();
        set_labeled_jump(&mut state, true, "outer", "break-outer");
        set_labeled_jump(&mut state, false, "outer", "continue-outer");
        assert_eq!(state.labeled_non_local_breaks.get("outer").map(String::as_str), Some("break-outer"));
        assert_eq!(
            state.labeled_non_local_continues.get("outer").map(String::as_str),
            Some("continue-outer")
        );
    }

    #[test]
    fn test_copy_out_direction() {
        let mut arena = NodeArena::new();
        let original_name = arena.create_identifier("i");
        let out_param_name = arena.create_unique_name("out_i");
        let parameter = LoopOutParameter {
            original_name,
            out_param_name,
        };
        let copy = copy_out_parameter(&mut arena, &parameter, CopyDirection::ToOutParameter);
        let NodeData::BinaryExpression { left, right, .. } = arena.data(copy).unwrap().clone() else {
            panic!("expected an assignment");
        };
        assert_eq!(left, out_param_name);
        assert_eq!(right, original_name);
    }
}
