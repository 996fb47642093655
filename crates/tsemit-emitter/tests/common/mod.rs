//! Shared fixtures for the emitter integration tests.
//!
//! There is no parser in this workspace, so tests build parse trees by hand
//! with `TreeBuilder`: each token is located in the source text after a
//! cursor, which gives every node a real range (full start including
//! leading trivia, as a parser would record it).

#![allow(dead_code)]

use std::io::Write as _;
use std::process::Command;
use std::sync::Arc;
use tsemit_ast::{
    ClassData, FunctionData, IdentifierData, ModifierFlags, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList,
    SourceFileData, SyntaxKind, TemplateText,
};
use tsemit_common::CompilerOptions;
use tsemit_emitter::transforms::transform_source_file;
use tsemit_emitter::{EmitResolver, TransformContext, print_file};

pub struct TreeBuilder {
    pub arena: NodeArena,
    text: String,
    cursor: u32,
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl TreeBuilder {
    pub fn new(text: &str) -> Self {
        TreeBuilder {
            arena: NodeArena::new(),
            text: text.to_string(),
            cursor: 0,
        }
    }

    /// Continue building in an arena that already holds other files.
    pub fn with_arena(arena: NodeArena, text: &str) -> Self {
        TreeBuilder {
            arena,
            text: text.to_string(),
            cursor: 0,
        }
    }

    pub fn mark(&self) -> u32 {
        self.cursor
    }

    /// Move the cursor past the next `token`. Returns its full start (the
    /// cursor before the move) and its end.
    pub fn token(&mut self, token: &str) -> (u32, u32) {
        let start = self.cursor as usize;
        let found = self.text[start..]
            .find(token)
            .unwrap_or_else(|| panic!("`{token}` not found after offset {start} in {:?}", self.text));
        let end = start + found + token.len();
        self.cursor = end as u32;
        (start as u32, end as u32)
    }

    /// Like `token`, but only matches `word` as a whole identifier.
    fn word(&mut self, word: &str) -> (u32, u32) {
        let start = self.cursor as usize;
        let mut from = start;
        loop {
            let found = self.text[from..]
                .find(word)
                .map(|i| from + i)
                .unwrap_or_else(|| panic!("word `{word}` not found after offset {start} in {:?}", self.text));
            let end = found + word.len();
            let before_ok = self.text[..found].chars().next_back().is_none_or(|c| !is_identifier_char(c));
            let after_ok = self.text[end..].chars().next().is_none_or(|c| !is_identifier_char(c));
            if before_ok && after_ok {
                self.cursor = end as u32;
                return (start as u32, end as u32);
            }
            from = end;
        }
    }

    /// Add a node spanning from `pos` to the cursor.
    pub fn node(&mut self, data: NodeData, pos: u32) -> NodeIndex {
        self.arena.add_node(data, pos, self.cursor)
    }

    pub fn node_with(&mut self, data: NodeData, pos: u32, flags: NodeFlags, modifiers: ModifierFlags) -> NodeIndex {
        self.arena.add_node_with(data, pos, self.cursor, flags, modifiers)
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    pub fn ident(&mut self, text: &str) -> NodeIndex {
        let (pos, end) = self.word(text);
        self.arena.add_node(
            NodeData::Identifier(IdentifierData {
                text: text.to_string(),
                auto_generate: None,
            }),
            pos,
            end,
        )
    }

    pub fn number(&mut self, text: &str) -> NodeIndex {
        let (pos, end) = self.word(text);
        self.arena.add_node(NodeData::NumericLiteral { text: text.to_string() }, pos, end)
    }

    /// A double-quoted string literal with `text` as its value.
    pub fn string(&mut self, text: &str) -> NodeIndex {
        let (pos, end) = self.token(&format!("\"{text}\""));
        self.arena.add_node(
            NodeData::StringLiteral {
                text: text.to_string(),
                single_quote: false,
            },
            pos,
            end,
        )
    }

    pub fn this(&mut self) -> NodeIndex {
        let (pos, end) = self.word("this");
        self.arena.add_node(NodeData::ThisKeyword, pos, end)
    }

    pub fn keyword_type(&mut self, keyword: SyntaxKind) -> NodeIndex {
        let text = keyword.token_text().unwrap_or_else(|| panic!("no text for {keyword:?}"));
        let (pos, end) = self.word(text);
        self.arena.add_node(NodeData::KeywordType { keyword }, pos, end)
    }

    pub fn type_reference(&mut self, name: &str) -> NodeIndex {
        let pos = self.mark();
        let type_name = self.ident(name);
        self.node(
            NodeData::TypeReference {
                type_name,
                type_arguments: None,
            },
            pos,
        )
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// `left <op> right`; `right` is built by the closure after the operator.
    pub fn binary(
        &mut self,
        left: NodeIndex,
        operator: SyntaxKind,
        right: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.arena.range(left).pos;
        let text = operator.token_text().unwrap_or_else(|| panic!("no text for {operator:?}"));
        self.token(text);
        let right = right(self);
        self.node(NodeData::BinaryExpression { left, operator, right }, pos)
    }

    pub fn property_access(&mut self, expression: NodeIndex, name: &str) -> NodeIndex {
        let pos = self.arena.range(expression).pos;
        self.token(".");
        let name = self.ident(name);
        self.node(NodeData::PropertyAccessExpression { expression, name }, pos)
    }

    /// `callee(args)`; the closure builds the arguments after `(`.
    pub fn call(&mut self, expression: NodeIndex, arguments: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.arena.range(expression).pos;
        let (_, open) = self.token("(");
        let arguments = arguments(self);
        self.token(")");
        let list = NodeList::with_range(arguments, open, self.cursor - 1);
        self.node(
            NodeData::CallExpression {
                expression,
                type_arguments: None,
                arguments: list,
            },
            pos,
        )
    }

    /// `(params) => body`; the closures build the parameters and the body.
    pub fn arrow(
        &mut self,
        parameters: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
        body: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.mark();
        let (_, open) = self.token("(");
        let parameters = parameters(self);
        let (close, _) = self.token(")");
        let parameters = NodeList::with_range(parameters, open, close);
        self.token("=>");
        let body = body(self);
        self.node(
            NodeData::ArrowFunction(FunctionData {
                parameters,
                body,
                ..FunctionData::default()
            }),
            pos,
        )
    }

    pub fn parameter(&mut self, name: &str, type_node: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        self.parameter_with(name, ModifierFlags::NONE, type_node)
    }

    pub fn parameter_with(
        &mut self,
        name: &str,
        modifiers: ModifierFlags,
        type_node: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        self.decorated_parameter(&[], name, modifiers, type_node)
    }

    /// `@dec name[: type]` as a parameter.
    pub fn decorated_parameter(
        &mut self,
        decorators: &[&str],
        name: &str,
        modifiers: ModifierFlags,
        type_node: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.mark();
        let decorators = self.decorators(decorators);
        let name = self.ident(name);
        let type_node = type_node(self);
        self.node_with(
            NodeData::Parameter {
                decorators,
                dot_dot_dot: false,
                name,
                question: false,
                type_node,
                initializer: NodeIndex::NONE,
            },
            pos,
            NodeFlags::NONE,
            modifiers,
        )
    }

    /// `name = init` as a parameter.
    pub fn parameter_default(&mut self, name: &str, initializer: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let name = self.ident(name);
        self.token("=");
        let initializer = initializer(self);
        self.node(
            NodeData::Parameter {
                decorators: NodeList::default(),
                dot_dot_dot: false,
                name,
                question: false,
                type_node: NodeIndex::NONE,
                initializer,
            },
            pos,
        )
    }

    /// `` `head${expr}tail` `` with one substitution.
    pub fn template(&mut self, head: &str, expression: impl FnOnce(&mut Self) -> NodeIndex, tail: &str) -> NodeIndex {
        let pos = self.mark();
        let (head_pos, _) = self.token(&format!("`{head}${{"));
        let head = self.node(
            NodeData::TemplateHead(TemplateText {
                cooked: head.to_string(),
                raw: head.to_string(),
            }),
            head_pos,
        );
        let span_pos = self.mark();
        let expression = expression(self);
        let (tail_pos, _) = self.token(&format!("}}{tail}`"));
        let literal = self.node(
            NodeData::TemplateTail(TemplateText {
                cooked: tail.to_string(),
                raw: tail.to_string(),
            }),
            tail_pos,
        );
        let span = self.node(NodeData::TemplateSpan { expression, literal }, span_pos);
        let spans = NodeList::with_range(vec![span], span_pos, self.cursor);
        self.node(
            NodeData::TemplateExpression {
                head,
                template_spans: spans,
            },
            pos,
        )
    }

    /// `[elements]`
    pub fn array(&mut self, elements: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.mark();
        let (_, open) = self.token("[");
        let elements = elements(self);
        let list = NodeList::with_range(elements, open, self.cursor);
        self.token("]");
        self.node(
            NodeData::ArrayLiteralExpression {
                elements: list,
                multi_line: false,
            },
            pos,
        )
    }

    /// `...expr` inside an array literal or argument list.
    pub fn spread(&mut self, expression: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        self.token("...");
        let expression = expression(self);
        self.node(NodeData::SpreadElement { expression }, pos)
    }

    /// `new Name()`
    pub fn new_expression(&mut self, name: &str) -> NodeIndex {
        let pos = self.mark();
        self.word("new");
        let expression = self.ident(name);
        let (_, open) = self.token("(");
        let (close, _) = self.token(")");
        self.node(
            NodeData::NewExpression {
                expression,
                type_arguments: None,
                arguments: Some(NodeList::with_range(vec![], open, close)),
            },
            pos,
        )
    }

    /// `` tag`head${expr}tail` ``
    pub fn tagged_template(
        &mut self,
        tag: &str,
        head: &str,
        expression: impl FnOnce(&mut Self) -> NodeIndex,
        tail: &str,
    ) -> NodeIndex {
        let tag = self.ident(tag);
        let pos = self.arena.range(tag).pos;
        let template = self.template(head, expression, tail);
        self.node(
            NodeData::TaggedTemplateExpression {
                tag,
                type_arguments: None,
                template,
            },
            pos,
        )
    }

    /// `operand++`
    pub fn increment(&mut self, operand: NodeIndex) -> NodeIndex {
        let pos = self.arena.range(operand).pos;
        self.token("++");
        self.node(
            NodeData::PostfixUnaryExpression {
                operand,
                operator: SyntaxKind::PlusPlusToken,
            },
            pos,
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// `{ statements }` with the braces located in the text.
    pub fn block(&mut self, statements: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.mark();
        let (_, open) = self.token("{");
        let statements = statements(self);
        let list = NodeList::with_range(statements, open, self.cursor);
        self.token("}");
        self.node(
            NodeData::Block {
                statements: list,
                multi_line: true,
            },
            pos,
        )
    }

    /// `<keyword> name[: type] = init;` for one declaration.
    pub fn variable_statement(
        &mut self,
        flags: NodeFlags,
        modifiers: ModifierFlags,
        name: &str,
        type_node: impl FnOnce(&mut Self) -> NodeIndex,
        initializer: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.mark();
        let list_pos = self.mark();
        self.word(declaration_keyword(flags));
        let declaration_pos = self.mark();
        let name = self.ident(name);
        let type_node = type_node(self);
        let initializer = if self.text[self.cursor as usize..].trim_start().starts_with('=') {
            self.token("=");
            initializer(self)
        } else {
            NodeIndex::NONE
        };
        let declaration = self.node(
            NodeData::VariableDeclaration {
                name,
                exclamation: false,
                type_node,
                initializer,
            },
            declaration_pos,
        );
        let declarations = NodeList::with_range(vec![declaration], declaration_pos, self.cursor);
        let list = self.node_with(
            NodeData::VariableDeclarationList { declarations },
            list_pos,
            flags,
            ModifierFlags::NONE,
        );
        self.token(";");
        self.node_with(
            NodeData::VariableStatement { declaration_list: list },
            pos,
            NodeFlags::NONE,
            modifiers,
        )
    }

    pub fn expression_statement(&mut self, expression: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let expression = expression(self);
        self.token(";");
        self.node(NodeData::ExpressionStatement { expression }, pos)
    }

    pub fn return_statement(&mut self, expression: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        self.word("return");
        let expression = expression(self);
        self.token(";");
        self.node(NodeData::ReturnStatement { expression }, pos)
    }

    /// `for (let name = init; cond; incr) body`. Returns the statement and
    /// the declaration, which resolver tables are keyed on.
    pub fn for_let_statement(
        &mut self,
        name: &str,
        initializer: impl FnOnce(&mut Self) -> NodeIndex,
        condition: impl FnOnce(&mut Self) -> NodeIndex,
        incrementor: impl FnOnce(&mut Self) -> NodeIndex,
        body: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> (NodeIndex, NodeIndex) {
        self.for_statement(NodeFlags::LET, name, initializer, condition, incrementor, body)
    }

    /// `for (<keyword> name = init; cond; incr) body`.
    pub fn for_statement(
        &mut self,
        flags: NodeFlags,
        name: &str,
        initializer: impl FnOnce(&mut Self) -> NodeIndex,
        condition: impl FnOnce(&mut Self) -> NodeIndex,
        incrementor: impl FnOnce(&mut Self) -> NodeIndex,
        body: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> (NodeIndex, NodeIndex) {
        let pos = self.mark();
        self.word("for");
        self.token("(");
        let (list, declaration) = self.loop_declaration(flags, name, Some(initializer));
        self.token(";");
        let condition = condition(self);
        self.token(";");
        let incrementor = incrementor(self);
        self.token(")");
        let statement = body(self);
        let node = self.node(
            NodeData::ForStatement {
                initializer: list,
                condition,
                incrementor,
                statement,
            },
            pos,
        );
        (node, declaration)
    }

    /// `for (<keyword> name of expr) body`. Returns the statement and the
    /// declaration.
    pub fn for_of_statement(
        &mut self,
        flags: NodeFlags,
        name: &str,
        expression: impl FnOnce(&mut Self) -> NodeIndex,
        body: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> (NodeIndex, NodeIndex) {
        let pos = self.mark();
        self.word("for");
        self.token("(");
        let (list, declaration) = self.loop_declaration(flags, name, None::<fn(&mut Self) -> NodeIndex>);
        self.word("of");
        let expression = expression(self);
        self.token(")");
        let statement = body(self);
        let node = self.node(
            NodeData::ForOfStatement {
                initializer: list,
                expression,
                statement,
            },
            pos,
        );
        (node, declaration)
    }

    /// The one-declaration list at the head of a `for` or `for..of`.
    fn loop_declaration(
        &mut self,
        flags: NodeFlags,
        name: &str,
        initializer: Option<impl FnOnce(&mut Self) -> NodeIndex>,
    ) -> (NodeIndex, NodeIndex) {
        let list_pos = self.mark();
        self.word(declaration_keyword(flags));
        let declaration_pos = self.mark();
        let name = self.ident(name);
        let initializer = match initializer {
            Some(initializer) => {
                self.token("=");
                initializer(self)
            }
            None => NodeIndex::NONE,
        };
        let declaration = self.node(
            NodeData::VariableDeclaration {
                name,
                exclamation: false,
                type_node: NodeIndex::NONE,
                initializer,
            },
            declaration_pos,
        );
        let declarations = NodeList::with_range(vec![declaration], declaration_pos, self.cursor);
        let list = self.node_with(
            NodeData::VariableDeclarationList { declarations },
            list_pos,
            flags,
            ModifierFlags::NONE,
        );
        (list, declaration)
    }

    /// `if (cond) then` with no `else`.
    pub fn if_statement(
        &mut self,
        condition: impl FnOnce(&mut Self) -> NodeIndex,
        then_statement: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("if");
        self.token("(");
        let expression = condition(self);
        self.token(")");
        let then_statement = then_statement(self);
        self.node(
            NodeData::IfStatement {
                expression,
                then_statement,
                else_statement: NodeIndex::NONE,
            },
            pos,
        )
    }

    /// `break [label];`
    pub fn break_statement(&mut self, label: Option<&str>) -> NodeIndex {
        let pos = self.mark();
        self.word("break");
        let label = label.map_or(NodeIndex::NONE, |label| self.ident(label));
        self.token(";");
        self.node(NodeData::BreakStatement { label }, pos)
    }

    /// `continue [label];`
    pub fn continue_statement(&mut self, label: Option<&str>) -> NodeIndex {
        let pos = self.mark();
        self.word("continue");
        let label = label.map_or(NodeIndex::NONE, |label| self.ident(label));
        self.token(";");
        self.node(NodeData::ContinueStatement { label }, pos)
    }

    /// `label: statement`
    pub fn labeled_statement(&mut self, label: &str, statement: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let label = self.ident(label);
        self.token(":");
        let statement = statement(self);
        self.node(NodeData::LabeledStatement { label, statement }, pos)
    }

    /// `switch (expr) { clauses }`
    pub fn switch_statement(
        &mut self,
        expression: impl FnOnce(&mut Self) -> NodeIndex,
        clauses: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("switch");
        self.token("(");
        let expression = expression(self);
        self.token(")");
        let block_pos = self.mark();
        let (_, open) = self.token("{");
        let clauses = clauses(self);
        let clauses = NodeList::with_range(clauses, open, self.cursor);
        self.token("}");
        let case_block = self.node(NodeData::CaseBlock { clauses }, block_pos);
        self.node(NodeData::SwitchStatement { expression, case_block }, pos)
    }

    /// `case expr: statements`
    pub fn case_clause(
        &mut self,
        expression: impl FnOnce(&mut Self) -> NodeIndex,
        statements: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("case");
        let expression = expression(self);
        let (_, colon) = self.token(":");
        let statements = statements(self);
        let statements = NodeList::with_range(statements, colon, self.cursor);
        self.node(NodeData::CaseClause { expression, statements }, pos)
    }

    /// `default: statements`
    pub fn default_clause(&mut self, statements: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.mark();
        self.word("default");
        let (_, colon) = self.token(":");
        let statements = statements(self);
        let statements = NodeList::with_range(statements, colon, self.cursor);
        self.node(NodeData::DefaultClause { statements }, pos)
    }

    /// `<keyword> pattern = init;` with a destructuring pattern as the name.
    pub fn destructuring_statement(
        &mut self,
        flags: NodeFlags,
        pattern: impl FnOnce(&mut Self) -> NodeIndex,
        initializer: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word(declaration_keyword(flags));
        let declaration_pos = self.mark();
        let name = pattern(self);
        self.token("=");
        let initializer = initializer(self);
        let declaration = self.node(
            NodeData::VariableDeclaration {
                name,
                exclamation: false,
                type_node: NodeIndex::NONE,
                initializer,
            },
            declaration_pos,
        );
        let declarations = NodeList::with_range(vec![declaration], declaration_pos, self.cursor);
        let list = self.node_with(
            NodeData::VariableDeclarationList { declarations },
            pos,
            flags,
            ModifierFlags::NONE,
        );
        self.token(";");
        self.node(NodeData::VariableStatement { declaration_list: list }, pos)
    }

    // =========================================================================
    // Binding patterns
    // =========================================================================

    /// `{ elements }` as a binding name.
    pub fn object_binding(&mut self, elements: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.mark();
        let (_, open) = self.token("{");
        let elements = elements(self);
        let elements = NodeList::with_range(elements, open, self.cursor);
        self.token("}");
        self.node(NodeData::ObjectBindingPattern { elements }, pos)
    }

    /// `[elements]` as a binding name.
    pub fn array_binding(&mut self, elements: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.mark();
        let (_, open) = self.token("[");
        let elements = elements(self);
        let elements = NodeList::with_range(elements, open, self.cursor);
        self.token("]");
        self.node(NodeData::ArrayBindingPattern { elements }, pos)
    }

    /// `name [= init]` inside a binding pattern.
    pub fn binding_element(&mut self, name: &str, initializer: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let name = self.ident(name);
        let initializer = if self.text[self.cursor as usize..].trim_start().starts_with('=') {
            self.token("=");
            initializer(self)
        } else {
            NodeIndex::NONE
        };
        self.node(
            NodeData::BindingElement {
                dot_dot_dot: false,
                property_name: NodeIndex::NONE,
                name,
                initializer,
            },
            pos,
        )
    }

    /// `property: pattern` inside an object binding pattern.
    pub fn binding_property(&mut self, property: &str, pattern: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let property_name = self.ident(property);
        self.token(":");
        let name = pattern(self);
        self.node(
            NodeData::BindingElement {
                dot_dot_dot: false,
                property_name,
                name,
                initializer: NodeIndex::NONE,
            },
            pos,
        )
    }

    /// `function name(params) { body }`.
    pub fn function_declaration(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        parameters: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
        return_type: impl FnOnce(&mut Self) -> NodeIndex,
        body: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("function");
        let name = self.ident(name);
        let (_, open) = self.token("(");
        let parameters = parameters(self);
        let (close, _) = self.token(")");
        let parameters = NodeList::with_range(parameters, open, close);
        let return_type = return_type(self);
        let body = self.block(body);
        self.node_with(
            NodeData::FunctionDeclaration(FunctionData {
                name,
                parameters,
                return_type,
                body,
                ..FunctionData::default()
            }),
            pos,
            NodeFlags::NONE,
            modifiers,
        )
    }

    /// `class Name [extends Base] { members }`.
    pub fn class_declaration(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        base: Option<&str>,
        members: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        self.decorated_class(&[], modifiers, name, base, members)
    }

    /// `@dec class Name [extends Base] { members }`.
    pub fn decorated_class(
        &mut self,
        decorators: &[&str],
        modifiers: ModifierFlags,
        name: &str,
        base: Option<&str>,
        members: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        let decorators = self.decorators(decorators);
        self.word("class");
        let name = self.ident(name);
        let heritage_clauses = match base {
            Some(base) => {
                let clause_pos = self.mark();
                self.word("extends");
                let type_pos = self.mark();
                let expression = self.ident(base);
                let type_node = self.node(
                    NodeData::ExpressionWithTypeArguments {
                        expression,
                        type_arguments: None,
                    },
                    type_pos,
                );
                let types = NodeList::with_range(vec![type_node], type_pos, self.cursor);
                let clause = self.node(
                    NodeData::HeritageClause {
                        token: SyntaxKind::ExtendsKeyword,
                        types,
                    },
                    clause_pos,
                );
                NodeList::with_range(vec![clause], clause_pos, self.cursor)
            }
            None => NodeList::default(),
        };
        let (_, open) = self.token("{");
        let members = members(self);
        let members = NodeList::with_range(members, open, self.cursor);
        self.token("}");
        self.node_with(
            NodeData::ClassDeclaration(ClassData {
                decorators,
                name,
                heritage_clauses,
                members,
                ..ClassData::default()
            }),
            pos,
            NodeFlags::NONE,
            modifiers,
        )
    }

    /// `[const] enum Name { members }`.
    pub fn enum_declaration(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        members: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("enum");
        let name = self.ident(name);
        let (_, open) = self.token("{");
        let members = members(self);
        let members = NodeList::with_range(members, open, self.cursor);
        self.token("}");
        self.node_with(NodeData::EnumDeclaration { name, members }, pos, NodeFlags::NONE, modifiers)
    }

    /// `Name [= init]` inside an enum body, consuming a trailing comma.
    pub fn enum_member(&mut self, name: &str, initializer: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let name = self.ident(name);
        let initializer = if self.text[self.cursor as usize..].trim_start().starts_with('=') {
            self.token("=");
            initializer(self)
        } else {
            NodeIndex::NONE
        };
        let member = self.node(NodeData::EnumMember { name, initializer }, pos);
        if self.text[self.cursor as usize..].trim_start().starts_with(',') {
            self.token(",");
        }
        member
    }

    /// `namespace Name { statements }`.
    pub fn namespace_declaration(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        statements: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("namespace");
        let name = self.ident(name);
        let block_pos = self.mark();
        let (_, open) = self.token("{");
        let statements = statements(self);
        let statements = NodeList::with_range(statements, open, self.cursor);
        self.token("}");
        let body = self.node(NodeData::ModuleBlock { statements }, block_pos);
        self.node_with(NodeData::ModuleDeclaration { name, body }, pos, NodeFlags::NONE, modifiers)
    }

    /// `interface Name { members }`.
    pub fn interface_declaration(&mut self, name: &str, members: impl FnOnce(&mut Self) -> Vec<NodeIndex>) -> NodeIndex {
        let pos = self.mark();
        self.word("interface");
        let name = self.ident(name);
        let (_, open) = self.token("{");
        let members = members(self);
        let members = NodeList::with_range(members, open, self.cursor);
        self.token("}");
        self.node(
            NodeData::InterfaceDeclaration {
                name,
                type_parameters: None,
                heritage_clauses: NodeList::default(),
                members,
            },
            pos,
        )
    }

    /// `name: type;` inside an interface.
    pub fn property_signature(&mut self, name: &str, type_node: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        let name = self.ident(name);
        let type_node = type_node(self);
        self.token(";");
        self.node(
            NodeData::PropertySignature {
                name,
                question: false,
                type_node,
            },
            pos,
        )
    }

    /// `type Name = type;`
    pub fn type_alias(&mut self, name: &str, type_node: impl FnOnce(&mut Self) -> NodeIndex) -> NodeIndex {
        let pos = self.mark();
        self.word("type");
        let name = self.ident(name);
        self.token("=");
        let type_node = type_node(self);
        self.token(";");
        self.node(
            NodeData::TypeAliasDeclaration {
                name,
                type_parameters: None,
                type_node,
            },
            pos,
        )
    }

    /// `[modifiers] name[: type] [= init];` inside a class body.
    pub fn property_declaration(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_node: impl FnOnce(&mut Self) -> NodeIndex,
        initializer: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        self.decorated_property(&[], modifiers, name, type_node, initializer)
    }

    /// `@dec name[: type] [= init];` inside a class body.
    pub fn decorated_property(
        &mut self,
        decorators: &[&str],
        modifiers: ModifierFlags,
        name: &str,
        type_node: impl FnOnce(&mut Self) -> NodeIndex,
        initializer: impl FnOnce(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let pos = self.mark();
        let decorators = self.decorators(decorators);
        let name = self.ident(name);
        let type_node = type_node(self);
        let initializer = if self.text[self.cursor as usize..].trim_start().starts_with('=') {
            self.token("=");
            initializer(self)
        } else {
            NodeIndex::NONE
        };
        self.token(";");
        self.node_with(
            NodeData::PropertyDeclaration {
                decorators,
                name,
                question: false,
                type_node,
                initializer,
            },
            pos,
            NodeFlags::NONE,
            modifiers,
        )
    }

    /// `constructor(params) { body }`.
    pub fn constructor(
        &mut self,
        parameters: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
        body: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        self.word("constructor");
        let (_, open) = self.token("(");
        let parameters = parameters(self);
        let (close, _) = self.token(")");
        let parameters = NodeList::with_range(parameters, open, close);
        let body = self.block(body);
        self.node(
            NodeData::Constructor(FunctionData {
                parameters,
                body,
                ..FunctionData::default()
            }),
            pos,
        )
    }

    /// `name(params) { body }` inside a class body.
    pub fn method_declaration(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        parameters: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
        body: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        self.decorated_method(&[], modifiers, name, parameters, |_| NodeIndex::NONE, body)
    }

    /// `@dec name(params)[: type] { body }` inside a class body.
    pub fn decorated_method(
        &mut self,
        decorators: &[&str],
        modifiers: ModifierFlags,
        name: &str,
        parameters: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
        return_type: impl FnOnce(&mut Self) -> NodeIndex,
        body: impl FnOnce(&mut Self) -> Vec<NodeIndex>,
    ) -> NodeIndex {
        let pos = self.mark();
        let decorators = self.decorators(decorators);
        let name = self.ident(name);
        let (_, open) = self.token("(");
        let parameters = parameters(self);
        let (close, _) = self.token(")");
        let parameters = NodeList::with_range(parameters, open, close);
        let return_type = return_type(self);
        let body = self.block(body);
        self.node_with(
            NodeData::MethodDeclaration(FunctionData {
                decorators,
                name,
                parameters,
                return_type,
                body,
                ..FunctionData::default()
            }),
            pos,
            NodeFlags::NONE,
            modifiers,
        )
    }

    /// `@name` for each entry, as a decorator list.
    fn decorators(&mut self, names: &[&str]) -> NodeList {
        let start = self.mark();
        let decorators = names
            .iter()
            .map(|name| {
                let pos = self.mark();
                self.token("@");
                let expression = self.ident(name);
                self.node(NodeData::Decorator { expression }, pos)
            })
            .collect::<Vec<_>>();
        if decorators.is_empty() {
            return NodeList::default();
        }
        NodeList::with_range(decorators, start, self.cursor)
    }

    /// Close the file over `statements`.
    pub fn finish(mut self, file_name: &str, statements: Vec<NodeIndex>) -> (NodeArena, NodeIndex) {
        let end = self.text.len() as u32;
        let root = self.arena.add_node(
            NodeData::SourceFile(SourceFileData {
                file_name: file_name.to_string(),
                text: Arc::from(self.text.as_str()),
                statements: NodeList::with_range(statements, 0, end),
                is_declaration_file: false,
            }),
            0,
            end,
        );
        (self.arena, root)
    }
}

fn declaration_keyword(flags: NodeFlags) -> &'static str {
    if flags.contains(NodeFlags::CONST) {
        "const"
    } else if flags.contains(NodeFlags::LET) {
        "let"
    } else {
        "var"
    }
}

/// Transform and print one file the way `emit_files` does for JavaScript.
pub fn emit_js(
    arena: &mut NodeArena,
    resolver: &dyn EmitResolver,
    options: &CompilerOptions,
    root: NodeIndex,
) -> String {
    tsemit_common::tracing_config::init_tracing();
    let mut context = TransformContext::new(resolver, options);
    let transformed = transform_source_file(arena, &mut context, root).expect("transform");
    let output = context.finish().expect("balanced transform context");
    print_file(arena, resolver, options, transformed, output).expect("print")
}

/// Collapse every run of whitespace into one space.
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Run `text` followed by `check` under Node. `None` when Node is not
/// installed.
pub fn run_in_node(text: &str, check: &str) -> Option<String> {
    let version = Command::new("node").arg("--version").output().ok()?;
    if !version.status.success() {
        return None;
    }
    let mut script = tempfile::Builder::new().suffix(".js").tempfile().expect("temp file");
    script.write_all(text.as_bytes()).expect("write script");
    writeln!(script, "{check}").expect("write check");
    let output = Command::new("node").arg(script.path()).output().expect("run node");
    assert!(output.status.success(), "{}\n{text}", String::from_utf8_lossy(&output.stderr));
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
