//! Text for generated identifiers.
//!
//! A generated identifier has no text of its own until it is first printed.
//! The text is cached by autogenerate id (or, for names derived from a node,
//! by that node) so every reference to the same name prints the same text.
//!
//! Temporaries are `_a` .. `_z`, then `_0`, `_1`, ...; `_i` and `_n` are
//! never handed out as plain temporaries. Temporaries are scoped: each
//! function starts counting again, except functions that share their
//! parent's temporaries (`EmitFlags::REUSE_TEMP_VARIABLE_SCOPE`).

use super::Printer;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use tsemit_ast::{EmitFlags, GeneratedIdentifierFlags, GeneratedIdentifierKind, NodeData, NodeIndex, SyntaxKind};
use tsemit_common::EmitResult;

/// Per-scope temporary allocation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TempFlags(u32);

impl TempFlags {
    const COUNT_MASK: u32 = 0x0FFF_FFFF;
    /// `_i` is taken.
    const LOOP: u32 = 0x1000_0000;

    fn count(self) -> u32 {
        self.0 & Self::COUNT_MASK
    }
}

#[derive(Debug, Default)]
pub(super) struct NameGenerator {
    /// Identifier texts of the parse tree of the current file.
    file_identifiers: FxHashSet<String>,
    /// Unique names handed out so far (shared by every file of a bundle).
    generated_names: FxHashSet<String>,
    by_id: FxHashMap<u32, String>,
    by_node: FxHashMap<NodeIndex, String>,
    temp_flags: TempFlags,
    temp_flags_stack: Vec<TempFlags>,
    /// Names nested scopes must not reuse, one set per open scope.
    reserved_names: Vec<FxHashSet<String>>,
}

impl NameGenerator {
    pub(super) fn reset(&mut self) {
        *self = NameGenerator::default();
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|scope| scope.contains(name))
    }

    fn reserve_in_nested_scopes(&mut self, name: &str) {
        if let Some(scope) = self.reserved_names.last_mut() {
            scope.insert(name.to_string());
        }
    }
}

/// Text of the temporary at `count`, or `None` for the skipped `_i` and `_n` slots.
fn temp_name_for_count(count: u32) -> Option<String> {
    match count {
        8 | 13 => None,
        0..26 => Some(format!("_{}", char::from(b'a' + count as u8))),
        _ => Some(format!("_{}", count - 26)),
    }
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Scopes
    // =========================================================================

    /// Open a temporary-name scope for `node`. Returns whether one was pushed.
    pub(super) fn push_name_generation_scope(&mut self, node: NodeIndex) -> bool {
        if node.is_some() && self.arena.emit_flags(node).contains(EmitFlags::REUSE_TEMP_VARIABLE_SCOPE) {
            return false;
        }
        let names = &mut self.names;
        names.temp_flags_stack.push(names.temp_flags);
        names.temp_flags = TempFlags::default();
        names.reserved_names.push(FxHashSet::default());
        true
    }

    pub(super) fn pop_name_generation_scope(&mut self, pushed: bool) {
        if !pushed {
            return;
        }
        let names = &mut self.names;
        names.temp_flags = names.temp_flags_stack.pop().unwrap_or_default();
        names.reserved_names.pop();
    }

    /// Record the identifier texts of the parse tree behind `root`.
    pub(super) fn collect_file_identifiers(&mut self, root: NodeIndex) {
        self.names.file_identifiers.clear();
        let mut stack = vec![self.arena.get_parse_tree_node(root)];
        while let Some(index) = stack.pop() {
            let Some(node) = self.arena.get(index) else {
                continue;
            };
            if let NodeData::Identifier(id) = &node.data {
                if node.is_parse_tree_node() && id.auto_generate.is_none() && !id.text.is_empty() {
                    self.names.file_identifiers.insert(id.text.clone());
                }
                continue;
            }
            node.data.for_each_child(&mut |child| {
                if child.is_some() {
                    stack.push(child);
                }
            });
        }
    }

    // =========================================================================
    // Pre-pass over declarations
    // =========================================================================

    /// Fix the text of generated names declared by `node` in the scope that
    /// declares them, before any nested scope can take the same text.
    pub(super) fn generate_names(&mut self, node: NodeIndex) -> EmitResult<()> {
        if node.is_none() {
            return Ok(());
        }
        match self.arena.data(node)?.clone() {
            NodeData::Block { statements, .. }
            | NodeData::CaseClause { statements, .. }
            | NodeData::DefaultClause { statements } => {
                for statement in statements.iter() {
                    self.generate_names(statement)?;
                }
            }
            NodeData::LabeledStatement { statement, .. }
            | NodeData::DoStatement { statement, .. }
            | NodeData::WhileStatement { statement, .. } => self.generate_names(statement)?,
            NodeData::IfStatement {
                then_statement,
                else_statement,
                ..
            } => {
                self.generate_names(then_statement)?;
                self.generate_names(else_statement)?;
            }
            NodeData::ForStatement {
                initializer, statement, ..
            }
            | NodeData::ForInStatement {
                initializer, statement, ..
            }
            | NodeData::ForOfStatement {
                initializer, statement, ..
            } => {
                self.generate_names(initializer)?;
                self.generate_names(statement)?;
            }
            NodeData::SwitchStatement { case_block, .. } => self.generate_names(case_block)?,
            NodeData::CaseBlock { clauses } => {
                for clause in clauses.iter() {
                    self.generate_names(clause)?;
                }
            }
            NodeData::TryStatement {
                try_block,
                catch_clause,
                finally_block,
            } => {
                self.generate_names(try_block)?;
                self.generate_names(catch_clause)?;
                self.generate_names(finally_block)?;
            }
            NodeData::CatchClause {
                variable_declaration,
                block,
            } => {
                self.generate_names(variable_declaration)?;
                self.generate_names(block)?;
            }
            NodeData::VariableStatement { declaration_list } => self.generate_names(declaration_list)?,
            NodeData::VariableDeclarationList { declarations } => {
                for declaration in declarations.iter() {
                    self.generate_names(declaration)?;
                }
            }
            NodeData::VariableDeclaration { name, .. }
            | NodeData::Parameter { name, .. }
            | NodeData::BindingElement { name, .. } => self.generate_name_if_needed(name)?,
            NodeData::ClassDeclaration(class) => self.generate_name_if_needed(class.name)?,
            NodeData::FunctionDeclaration(function) => {
                self.generate_name_if_needed(function.name)?;
                if self.arena.emit_flags(node).contains(EmitFlags::REUSE_TEMP_VARIABLE_SCOPE) {
                    for parameter in function.parameters.iter() {
                        self.generate_names(parameter)?;
                    }
                    self.generate_names(function.body)?;
                }
            }
            NodeData::ObjectBindingPattern { elements } | NodeData::ArrayBindingPattern { elements } => {
                for element in elements.iter() {
                    self.generate_names(element)?;
                }
            }
            NodeData::ImportDeclaration { import_clause, .. } => self.generate_names(import_clause)?,
            NodeData::ImportClause { name, named_bindings } => {
                self.generate_name_if_needed(name)?;
                self.generate_names(named_bindings)?;
            }
            NodeData::NamespaceImport { name } => self.generate_name_if_needed(name)?,
            NodeData::NamedImports { elements } => {
                for element in elements.iter() {
                    self.generate_names(element)?;
                }
            }
            NodeData::ImportSpecifier { property_name, name } => {
                self.generate_name_if_needed(if property_name.is_some() { property_name } else { name })?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Same for the names of class members and object literal members.
    pub(super) fn generate_member_names(&mut self, node: NodeIndex) -> EmitResult<()> {
        let name = match self.arena.data(node)? {
            NodeData::PropertyAssignment { name, .. }
            | NodeData::ShorthandPropertyAssignment { name, .. }
            | NodeData::PropertyDeclaration { name, .. } => *name,
            NodeData::MethodDeclaration(f) | NodeData::GetAccessor(f) | NodeData::SetAccessor(f) => f.name,
            _ => return Ok(()),
        };
        self.generate_name_if_needed(name)
    }

    fn generate_name_if_needed(&mut self, name: NodeIndex) -> EmitResult<()> {
        if name.is_none() {
            return Ok(());
        }
        if self.arena.is_generated_identifier(name) {
            self.generated_name_text(name)?;
        } else if matches!(
            self.arena.kind(name),
            Some(SyntaxKind::ObjectBindingPattern | SyntaxKind::ArrayBindingPattern)
        ) {
            self.generate_names(name)?;
        }
        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Text of an identifier, resolving generated names.
    pub(super) fn identifier_text_of(&mut self, node: NodeIndex) -> EmitResult<String> {
        match self.arena.identifier(node) {
            Some(id) if id.auto_generate.is_some() => self.generated_name_text(node),
            Some(id) => Ok(id.text.clone()),
            None => Ok(String::new()),
        }
    }

    pub(super) fn generated_name_text(&mut self, name: NodeIndex) -> EmitResult<String> {
        let Some(id) = self.arena.identifier(name) else {
            return Ok(String::new());
        };
        let Some(auto) = id.auto_generate else {
            return Ok(id.text.clone());
        };
        if auto.kind == GeneratedIdentifierKind::Node {
            let node = self.node_for_generated_name(name, auto.id);
            return self.generate_name_cached(node, auto.flags);
        }
        if let Some(text) = self.names.by_id.get(&auto.id) {
            return Ok(text.clone());
        }
        let base = id.text.clone();
        let reserved = auto.flags.contains(GeneratedIdentifierFlags::RESERVED_IN_NESTED_SCOPES);
        let text = match auto.kind {
            GeneratedIdentifierKind::Auto => self.make_temp_variable_name(0, reserved),
            GeneratedIdentifierKind::Loop => self.make_temp_variable_name(TempFlags::LOOP, reserved),
            _ => self.make_unique_name(
                &base,
                auto.flags.contains(GeneratedIdentifierFlags::FILE_LEVEL),
                auto.flags.contains(GeneratedIdentifierFlags::OPTIMISTIC),
                reserved,
            ),
        };
        trace!(id = auto.id, name = %text, "generated name");
        self.names.by_id.insert(auto.id, text.clone());
        Ok(text)
    }

    /// The node a `Node`-kind name is derived from: the far end of its
    /// `original` chain, so every copy of a declaration maps to one name.
    fn node_for_generated_name(&self, name: NodeIndex, id: u32) -> NodeIndex {
        let mut node = name;
        let mut original = self.arena.original(node);
        while original.is_some() {
            node = original;
            if let Some(ident) = self.arena.identifier(node)
                && let Some(auto) = ident.auto_generate
                && auto.kind == GeneratedIdentifierKind::Node
                && auto.id != id
            {
                break;
            }
            original = self.arena.original(node);
        }
        node
    }

    fn generate_name_cached(&mut self, node: NodeIndex, flags: GeneratedIdentifierFlags) -> EmitResult<String> {
        if let Some(text) = self.names.by_node.get(&node) {
            return Ok(text.clone());
        }
        let text = self.generate_name_for_node(node, flags)?;
        trace!(node = node.0, name = %text, "generated name for node");
        self.names.by_node.insert(node, text.clone());
        Ok(text)
    }

    fn generate_name_for_node(&mut self, node: NodeIndex, flags: GeneratedIdentifierFlags) -> EmitResult<String> {
        let text = match self.arena.kind(node) {
            Some(SyntaxKind::Identifier) => {
                let text = self.identifier_text_of(node)?;
                self.make_unique_name(
                    &text,
                    false,
                    flags.contains(GeneratedIdentifierFlags::OPTIMISTIC),
                    flags.contains(GeneratedIdentifierFlags::RESERVED_IN_NESTED_SCOPES),
                )
            }
            Some(SyntaxKind::ModuleDeclaration | SyntaxKind::EnumDeclaration) => {
                let text = self.identifier_text_of(self.arena.declaration_name_node(node))?;
                if self.is_unique_local_name(&text, node) {
                    text
                } else {
                    self.make_unique_name(&text, false, false, false)
                }
            }
            Some(SyntaxKind::FunctionDeclaration | SyntaxKind::ClassDeclaration | SyntaxKind::ExportAssignment) => {
                self.make_unique_name("default", false, false, false)
            }
            Some(SyntaxKind::ClassExpression) => self.make_unique_name("class", false, false, false),
            Some(SyntaxKind::MethodDeclaration | SyntaxKind::GetAccessor | SyntaxKind::SetAccessor) => {
                let name = self.arena.declaration_name_node(node);
                if self.arena.is_kind(name, SyntaxKind::Identifier) {
                    self.generate_name_cached(name, GeneratedIdentifierFlags::NONE)?
                } else {
                    self.make_temp_variable_name(0, false)
                }
            }
            Some(SyntaxKind::ComputedPropertyName) => self.make_temp_variable_name(0, true),
            _ => self.make_temp_variable_name(0, false),
        };
        Ok(text)
    }

    // =========================================================================
    // Uniqueness
    // =========================================================================

    fn is_file_level_unique_name(&self, name: &str) -> bool {
        !self.resolver.has_global_name(name) && !self.names.file_identifiers.contains(name)
    }

    fn is_unique_name(&self, name: &str) -> bool {
        self.is_file_level_unique_name(name) && !self.names.generated_names.contains(name) && !self.names.is_reserved(name)
    }

    /// Whether no declaration inside the body of `container` already uses `name`.
    fn is_unique_local_name(&self, name: &str, container: NodeIndex) -> bool {
        let body = match self.arena.data(container) {
            Ok(NodeData::ModuleDeclaration { body, .. }) => *body,
            _ => return true,
        };
        let mut stack = vec![body];
        while let Some(index) = stack.pop() {
            let Some(node) = self.arena.get(index) else {
                continue;
            };
            let declares_name = matches!(
                node.data,
                NodeData::VariableDeclaration { .. }
                    | NodeData::FunctionDeclaration(_)
                    | NodeData::ClassDeclaration(_)
                    | NodeData::EnumDeclaration { .. }
                    | NodeData::ModuleDeclaration { .. }
                    | NodeData::ImportEqualsDeclaration { .. }
                    | NodeData::Parameter { .. }
                    | NodeData::BindingElement { .. }
            );
            if declares_name {
                let declared = self.arena.declaration_name_node(index);
                if self
                    .arena
                    .identifier(declared)
                    .is_some_and(|id| id.auto_generate.is_none() && id.text == name)
                {
                    return false;
                }
            }
            node.data.for_each_child(&mut |child| {
                if child.is_some() {
                    stack.push(child);
                }
            });
        }
        true
    }

    fn make_temp_variable_name(&mut self, flags: u32, reserved_in_nested_scopes: bool) -> String {
        if flags & TempFlags::LOOP != 0 && self.names.temp_flags.0 & TempFlags::LOOP == 0 && self.is_unique_name("_i") {
            self.names.temp_flags.0 |= TempFlags::LOOP;
            if reserved_in_nested_scopes {
                self.names.reserve_in_nested_scopes("_i");
            }
            return "_i".to_string();
        }
        loop {
            let count = self.names.temp_flags.count();
            self.names.temp_flags.0 += 1;
            let Some(name) = temp_name_for_count(count) else {
                continue;
            };
            if self.is_unique_name(&name) {
                if reserved_in_nested_scopes {
                    self.names.reserve_in_nested_scopes(&name);
                }
                return name;
            }
        }
    }

    /// `base` when optimistic and free, otherwise `base_1`, `base_2`, ...
    /// File-level names are checked against file identifiers and globals
    /// only, so every request for the same base text gets the same answer.
    fn make_unique_name(&mut self, base: &str, file_level: bool, optimistic: bool, reserved_in_nested_scopes: bool) -> String {
        let is_free = |printer: &Self, name: &str| {
            if file_level {
                printer.is_file_level_unique_name(name)
            } else {
                printer.is_unique_name(name)
            }
        };
        let name = if optimistic && is_free(self, base) {
            base.to_string()
        } else {
            let prefix = if base.ends_with('_') {
                base.to_string()
            } else {
                format!("{base}_")
            };
            let mut i = 1u32;
            loop {
                let candidate = format!("{prefix}{i}");
                if is_free(self, &candidate) {
                    break candidate;
                }
                i += 1;
            }
        };
        if reserved_in_nested_scopes {
            self.names.reserve_in_nested_scopes(&name);
        } else {
            self.names.generated_names.insert(name.clone());
        }
        name
    }

    /// A name free in the current file for text built around it (generated helpers).
    pub(super) fn make_helper_unique_name(&mut self, base: &str) -> String {
        self.make_unique_name(base, true, true, false)
    }
}
