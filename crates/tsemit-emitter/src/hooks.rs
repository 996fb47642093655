//! Printer-time hooks registered by the lowering passes.
//!
//! A pass that must influence how nodes print after it has finished (renaming
//! a colliding `let`, qualifying a namespace export, replacing `this` with
//! `_this`) registers an `EmitHook`. All hooks of one file live in a single
//! ordered `EmitHooks` list that the printer consults through one dispatcher:
//!
//! - substitution folds a node through every handler in registration order,
//!   so a later pass always sees (and cannot drop) an earlier pass's result;
//! - emit notifications are bracketed: `on_emit_node_enter` runs
//!   latest-registered first, `on_emit_node_exit` runs in the opposite order,
//!   and every entered handler is exited even when emission fails.

use crate::resolver::EmitResolver;
use rustc_hash::FxHashSet;
use tracing::trace;
use tsemit_ast::{EmitFlags, NodeArena, NodeIndex, SyntaxKind};
use tsemit_common::EmitResult;

/// Syntactic position a node is printed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmitHint {
    SourceFile,
    Expression,
    /// A name that is not a reference (`x` in `a.x`, a property key).
    IdentifierName,
    MappedTypeParameter,
    Unspecified,
}

/// What a hook may touch while the printer runs.
pub struct HookContext<'a> {
    pub arena: &'a mut NodeArena,
    pub resolver: &'a dyn EmitResolver,
}

pub trait EmitHook {
    fn name(&self) -> &'static str;

    /// Replace `node` before it prints. Return `node` to leave it alone.
    fn substitute_node(&mut self, _cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<NodeIndex> {
        Ok(node)
    }

    fn on_emit_node_enter(&mut self, _cx: &mut HookContext<'_>, _hint: EmitHint, _node: NodeIndex) -> EmitResult<()> {
        Ok(())
    }

    fn on_emit_node_exit(&mut self, _cx: &mut HookContext<'_>, _hint: EmitHint, _node: NodeIndex) -> EmitResult<()> {
        Ok(())
    }
}

/// Handlers entered for one node; hand back to `EmitHooks::exit_emit_node`.
#[must_use]
#[derive(Debug)]
pub struct EnteredHooks {
    first: usize,
}

#[derive(Default)]
pub struct EmitHooks {
    handlers: Vec<Box<dyn EmitHook>>,
    substitution_kinds: FxHashSet<SyntaxKind>,
    notification_kinds: FxHashSet<SyntaxKind>,
}

impl std::fmt::Debug for EmitHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitHooks")
            .field("handlers", &self.handler_names())
            .field("substitution_kinds", &self.substitution_kinds)
            .field("notification_kinds", &self.notification_kinds)
            .finish()
    }
}

impl EmitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Box<dyn EmitHook>) {
        trace!(hook = hook.name(), "registering emit hook");
        self.handlers.push(hook);
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Ask the hooks about nodes of `kind`. Never turned off again.
    pub fn enable_substitution(&mut self, kind: SyntaxKind) {
        self.substitution_kinds.insert(kind);
    }

    pub fn enable_emit_notification(&mut self, kind: SyntaxKind) {
        self.notification_kinds.insert(kind);
    }

    pub fn is_substitution_enabled(&self, arena: &NodeArena, node: NodeIndex) -> bool {
        !self.handlers.is_empty()
            && arena.kind(node).is_some_and(|k| self.substitution_kinds.contains(&k))
            && !arena.emit_flags(node).contains(EmitFlags::NO_SUBSTITUTION)
    }

    pub fn is_emit_notification_enabled(&self, arena: &NodeArena, node: NodeIndex) -> bool {
        !self.handlers.is_empty()
            && (arena.kind(node).is_some_and(|k| self.notification_kinds.contains(&k))
                || arena.emit_flags(node).contains(EmitFlags::ADVISE_ON_EMIT_NODE))
    }

    /// Fold `node` through every handler, earliest registered first.
    pub fn substitute(&mut self, cx: &mut HookContext<'_>, hint: EmitHint, node: NodeIndex) -> EmitResult<NodeIndex> {
        if !self.is_substitution_enabled(cx.arena, node) {
            return Ok(node);
        }
        let mut current = node;
        for handler in &mut self.handlers {
            current = handler.substitute_node(cx, hint, current)?;
        }
        Ok(current)
    }

    /// Run the enter handlers, latest registered first.
    ///
    /// When one fails, the handlers already entered are exited before the
    /// error is returned.
    pub fn enter_emit_node(
        &mut self,
        cx: &mut HookContext<'_>,
        hint: EmitHint,
        node: NodeIndex,
    ) -> EmitResult<EnteredHooks> {
        let count = self.handlers.len();
        for index in (0..count).rev() {
            if let Err(err) = self.handlers[index].on_emit_node_enter(cx, hint, node) {
                // Handlers index+1.. were entered; unwind them.
                let _ = self.exit_emit_node(cx, hint, node, EnteredHooks { first: index + 1 });
                return Err(err);
            }
        }
        Ok(EnteredHooks { first: 0 })
    }

    /// Run the exit handlers in the opposite order of entry. Every entered
    /// handler runs; the first error is returned.
    pub fn exit_emit_node(
        &mut self,
        cx: &mut HookContext<'_>,
        hint: EmitHint,
        node: NodeIndex,
        entered: EnteredHooks,
    ) -> EmitResult<()> {
        let mut first_error = None;
        for handler in self.handlers.iter_mut().skip(entered.first) {
            if let Err(err) = handler.on_emit_node_exit(cx, hint, node) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// `emit` bracketed by the enter and exit handlers.
    pub fn with_emit_notification<R>(
        &mut self,
        cx: &mut HookContext<'_>,
        hint: EmitHint,
        node: NodeIndex,
        emit: impl FnOnce(&mut HookContext<'_>) -> EmitResult<R>,
    ) -> EmitResult<R> {
        let entered = self.enter_emit_node(cx, hint, node)?;
        let result = emit(cx);
        let exited = self.exit_emit_node(cx, hint, node, entered);
        let value = result?;
        exited?;
        Ok(value)
    }
}
