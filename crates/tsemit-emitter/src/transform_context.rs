//! Services shared by the lowering passes of one file.
//!
//! One `TransformContext` is created per file and threaded through the
//! ordered passes. It owns:
//! - the lexical-environment stack (hoisted `var` names and function
//!   declarations of the nearest function or module scope),
//! - the set of requested runtime helpers,
//! - the emit hooks the passes register for the printer.

use crate::helpers::{EmitHelper, compare_emit_helpers};
use crate::hooks::{EmitHook, EmitHooks};
use crate::resolver::EmitResolver;
use tracing::trace;
use tsemit_ast::{EmitFlags, ModifierFlags, NodeArena, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::{CompilerOptions, EmitError, EmitResult};

#[derive(Debug, Default)]
struct LexicalEnvironment {
    variables: Vec<NodeIndex>,
    functions: Vec<NodeIndex>,
}

pub struct TransformContext<'a> {
    pub resolver: &'a dyn EmitResolver,
    pub options: &'a CompilerOptions,
    lexical_environments: Vec<LexicalEnvironment>,
    helpers: Vec<&'static EmitHelper>,
    hooks: EmitHooks,
}

/// What the passes leave behind for the printer.
#[derive(Debug, Default)]
pub struct TransformOutput {
    /// Requested helpers in emit order.
    pub helpers: Vec<&'static EmitHelper>,
    pub hooks: EmitHooks,
}

impl<'a> TransformContext<'a> {
    pub fn new(resolver: &'a dyn EmitResolver, options: &'a CompilerOptions) -> Self {
        TransformContext {
            resolver,
            options,
            lexical_environments: Vec::new(),
            helpers: Vec::new(),
            hooks: EmitHooks::new(),
        }
    }

    // =========================================================================
    // Lexical environment
    // =========================================================================

    pub fn start_lexical_environment(&mut self) {
        self.lexical_environments.push(LexicalEnvironment::default());
    }

    /// Declare `name` with `var` at the top of the current scope.
    pub fn hoist_variable_declaration(&mut self, name: NodeIndex) -> EmitResult<()> {
        let env = self
            .lexical_environments
            .last_mut()
            .ok_or(EmitError::UnbalancedStack("hoist_variable_declaration outside a lexical environment"))?;
        env.variables.push(name);
        Ok(())
    }

    /// Move a function declaration to the top of the current scope.
    pub fn hoist_function_declaration(&mut self, declaration: NodeIndex) -> EmitResult<()> {
        let env = self
            .lexical_environments
            .last_mut()
            .ok_or(EmitError::UnbalancedStack("hoist_function_declaration outside a lexical environment"))?;
        env.functions.push(declaration);
        Ok(())
    }

    /// Pop the current scope: a `var` statement with the hoisted names (when
    /// any), followed by the hoisted function declarations.
    pub fn end_lexical_environment(&mut self, arena: &mut NodeArena) -> EmitResult<Vec<NodeIndex>> {
        let env = self
            .lexical_environments
            .pop()
            .ok_or(EmitError::UnbalancedStack("end_lexical_environment without start"))?;
        let mut statements = Vec::with_capacity(env.functions.len() + 1);
        if !env.variables.is_empty() {
            let declarations = env
                .variables
                .into_iter()
                .map(|name| arena.create_variable_declaration(name, NodeIndex::NONE))
                .collect();
            let list = arena.create_variable_declaration_list(declarations, NodeFlags::NONE);
            let statement = arena.create_variable_statement_from_list(list, ModifierFlags::NONE);
            arena.add_emit_flags(statement, EmitFlags::CUSTOM_PROLOGUE);
            statements.push(statement);
        }
        statements.extend(env.functions);
        Ok(statements)
    }

    /// Run `visit` inside a fresh scope and return its result together with
    /// the hoisted statements. The scope is popped on every path.
    pub fn with_lexical_environment<T>(
        &mut self,
        arena: &mut NodeArena,
        visit: impl FnOnce(&mut Self, &mut NodeArena) -> EmitResult<T>,
    ) -> EmitResult<(T, Vec<NodeIndex>)> {
        self.start_lexical_environment();
        let result = visit(self, arena);
        let hoisted = self.end_lexical_environment(arena);
        Ok((result?, hoisted?))
    }

    pub fn lexical_environment_depth(&self) -> usize {
        self.lexical_environments.len()
    }

    /// Every pass must leave the stack empty.
    pub fn assert_balanced(&self, pass: &'static str) -> EmitResult<()> {
        if self.lexical_environments.is_empty() {
            Ok(())
        } else {
            Err(EmitError::UnbalancedStack(pass))
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Request a runtime helper (and the helpers it calls). Idempotent by name.
    pub fn request_emit_helper(&mut self, helper: &'static EmitHelper) {
        for dependency in helper.dependencies {
            self.request_emit_helper(dependency);
        }
        if self.helpers.iter().any(|h| h.name == helper.name) {
            return;
        }
        trace!(helper = helper.name, "requesting emit helper");
        self.helpers.push(helper);
    }

    /// Requested helpers in emit order: priority, then request order.
    pub fn emit_helpers(&self) -> Vec<&'static EmitHelper> {
        let mut helpers = self.helpers.clone();
        helpers.sort_by(|a, b| compare_emit_helpers(a, b));
        helpers
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    pub fn register_hook(&mut self, hook: Box<dyn EmitHook>) {
        self.hooks.register(hook);
    }

    pub fn enable_substitution(&mut self, kind: SyntaxKind) {
        self.hooks.enable_substitution(kind);
    }

    pub fn enable_emit_notification(&mut self, kind: SyntaxKind) {
        self.hooks.enable_emit_notification(kind);
    }

    pub fn hooks(&self) -> &EmitHooks {
        &self.hooks
    }

    pub fn finish(self) -> EmitResult<TransformOutput> {
        self.assert_balanced("transform context")?;
        let helpers = self.emit_helpers();
        Ok(TransformOutput {
            helpers,
            hooks: self.hooks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{DECORATE_HELPER, EXTENDS_HELPER, PARAM_HELPER, SPREAD_HELPER};
    use crate::resolver::PrecomputedResolver;
    use tsemit_ast::NodeData;

    #[test]
    fn test_end_without_start_is_error() {
        let resolver = PrecomputedResolver::new();
        let options = CompilerOptions::default();
        let mut context = TransformContext::new(&resolver, &options);
        let mut arena = NodeArena::new();
        let err = context.end_lexical_environment(&mut arena).unwrap_err();
        assert!(matches!(err, EmitError::UnbalancedStack(_)));
    }

    #[test]
    fn test_hoisted_names_become_one_var_statement() {
        let resolver = PrecomputedResolver::new();
        let options = CompilerOptions::default();
        let mut context = TransformContext::new(&resolver, &options);
        let mut arena = NodeArena::new();
        context.start_lexical_environment();
        let a = arena.create_temp_variable();
        let b = arena.create_temp_variable();
        context.hoist_variable_declaration(a).unwrap();
        context.hoist_variable_declaration(b).unwrap();
        let statements = context.end_lexical_environment(&mut arena).unwrap();
        assert_eq!(statements.len(), 1);
        let Ok(NodeData::VariableStatement { declaration_list }) = arena.data(statements[0]).cloned() else {
            panic!("expected variable statement");
        };
        let Ok(NodeData::VariableDeclarationList { declarations }) = arena.data(declaration_list).cloned() else {
            panic!("expected declaration list");
        };
        assert_eq!(declarations.len(), 2);
        assert!(arena.emit_flags(statements[0]).contains(EmitFlags::CUSTOM_PROLOGUE));
        assert!(context.assert_balanced("test").is_ok());
    }

    #[test]
    fn test_with_lexical_environment_pops_on_error() {
        let resolver = PrecomputedResolver::new();
        let options = CompilerOptions::default();
        let mut context = TransformContext::new(&resolver, &options);
        let mut arena = NodeArena::new();
        let result: EmitResult<((), Vec<NodeIndex>)> =
            context.with_lexical_environment(&mut arena, |_, _| Err(EmitError::internal("boom")));
        assert!(result.is_err());
        assert_eq!(context.lexical_environment_depth(), 0);
    }

    #[test]
    fn test_helpers_are_deduplicated_and_ordered() {
        let resolver = PrecomputedResolver::new();
        let options = CompilerOptions::default();
        let mut context = TransformContext::new(&resolver, &options);
        context.request_emit_helper(&PARAM_HELPER);
        context.request_emit_helper(&DECORATE_HELPER);
        context.request_emit_helper(&PARAM_HELPER);
        context.request_emit_helper(&EXTENDS_HELPER);
        context.request_emit_helper(&SPREAD_HELPER);
        let names: Vec<_> = context.emit_helpers().iter().map(|h| h.name).collect();
        assert_eq!(names, ["__extends", "__decorate", "__param", "__read", "__spread"]);
    }
}
