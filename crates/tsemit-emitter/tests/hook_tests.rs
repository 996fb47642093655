//! Ordering and unwinding of the emit hook chain.

use std::cell::RefCell;
use std::rc::Rc;
use tsemit_ast::{EmitFlags, NodeArena, NodeIndex, SyntaxKind};
use tsemit_common::{EmitError, EmitResult};
use tsemit_emitter::{EmitHint, EmitHook, EmitHooks, HookContext, PrecomputedResolver};

type Log = Rc<RefCell<Vec<String>>>;

/// Logs every call and optionally fails on enter or exit.
struct Recorder {
    name: &'static str,
    log: Log,
    fail_enter: bool,
    fail_exit: bool,
}

impl Recorder {
    fn new(name: &'static str, log: &Log) -> Box<Self> {
        Box::new(Recorder {
            name,
            log: Rc::clone(log),
            fail_enter: false,
            fail_exit: false,
        })
    }
}

impl EmitHook for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn substitute_node(&mut self, cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<NodeIndex> {
        let text = cx.arena.identifier_text(node).to_string();
        self.log.borrow_mut().push(format!("{}:substitute:{text}", self.name));
        Ok(cx.arena.create_identifier(&format!("{text}{}", self.name)))
    }

    fn on_emit_node_enter(&mut self, _cx: &mut HookContext<'_>, _hint: EmitHint, _node: NodeIndex) -> EmitResult<()> {
        self.log.borrow_mut().push(format!("{}:enter", self.name));
        if self.fail_enter {
            return Err(EmitError::internal("enter failed"));
        }
        Ok(())
    }

    fn on_emit_node_exit(&mut self, _cx: &mut HookContext<'_>, _hint: EmitHint, _node: NodeIndex) -> EmitResult<()> {
        self.log.borrow_mut().push(format!("{}:exit", self.name));
        if self.fail_exit {
            return Err(EmitError::internal("exit failed"));
        }
        Ok(())
    }
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn test_substitution_folds_in_registration_order() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    hooks.register(Recorder::new("A", &log));
    hooks.register(Recorder::new("B", &log));
    hooks.enable_substitution(SyntaxKind::Identifier);
    assert_eq!(hooks.handler_names(), vec!["A", "B"]);

    let mut arena = NodeArena::new();
    let resolver = PrecomputedResolver::new();
    let x = arena.create_identifier("x");
    let mut cx = HookContext {
        arena: &mut arena,
        resolver: &resolver,
    };
    let result = hooks.substitute(&mut cx, EmitHint::Expression, x).expect("substitute");
    assert_eq!(arena.identifier_text(result), "xAB");
    assert_eq!(entries(&log), vec!["A:substitute:x", "B:substitute:xA"]);
}

#[test]
fn test_substitution_respects_kind_and_no_substitution_flag() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    hooks.register(Recorder::new("A", &log));
    hooks.enable_substitution(SyntaxKind::Identifier);

    let mut arena = NodeArena::new();
    let resolver = PrecomputedResolver::new();
    let this = arena.create_this();
    let helper = arena.create_identifier("__extends");
    arena.add_emit_flags(helper, EmitFlags::NO_SUBSTITUTION);

    assert!(!hooks.is_substitution_enabled(&arena, this));
    assert!(!hooks.is_substitution_enabled(&arena, helper));
    let mut cx = HookContext {
        arena: &mut arena,
        resolver: &resolver,
    };
    assert_eq!(hooks.substitute(&mut cx, EmitHint::Expression, this).expect("this"), this);
    assert_eq!(hooks.substitute(&mut cx, EmitHint::Expression, helper).expect("helper"), helper);
    assert!(entries(&log).is_empty());
}

#[test]
fn test_empty_chain_never_substitutes() {
    let mut hooks = EmitHooks::new();
    hooks.enable_substitution(SyntaxKind::Identifier);
    let mut arena = NodeArena::new();
    let x = arena.create_identifier("x");
    assert!(hooks.is_empty());
    assert!(!hooks.is_substitution_enabled(&arena, x));
}

#[test]
fn test_notifications_are_bracketed() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    hooks.register(Recorder::new("A", &log));
    hooks.register(Recorder::new("B", &log));
    hooks.enable_emit_notification(SyntaxKind::FunctionExpression);

    let mut arena = NodeArena::new();
    let resolver = PrecomputedResolver::new();
    let body = arena.create_block(vec![], false);
    let function = arena.create_function_expression(NodeIndex::NONE, vec![], body);
    assert!(hooks.is_emit_notification_enabled(&arena, function));
    assert!(!hooks.is_emit_notification_enabled(&arena, body));

    let mut cx = HookContext {
        arena: &mut arena,
        resolver: &resolver,
    };
    let inner_log = Rc::clone(&log);
    let value = hooks
        .with_emit_notification(&mut cx, EmitHint::Expression, function, |_| {
            inner_log.borrow_mut().push("emit".to_string());
            Ok(7)
        })
        .expect("emit");
    assert_eq!(value, 7);
    assert_eq!(entries(&log), vec!["B:enter", "A:enter", "emit", "A:exit", "B:exit"]);
}

#[test]
fn test_advise_flag_enables_notification_for_any_kind() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    hooks.register(Recorder::new("A", &log));
    let mut arena = NodeArena::new();
    let block = arena.create_block(vec![], false);
    assert!(!hooks.is_emit_notification_enabled(&arena, block));
    arena.add_emit_flags(block, EmitFlags::ADVISE_ON_EMIT_NODE);
    assert!(hooks.is_emit_notification_enabled(&arena, block));
}

#[test]
fn test_failed_enter_unwinds_entered_handlers() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    let mut failing = Recorder::new("A", &log);
    failing.fail_enter = true;
    hooks.register(failing);
    hooks.register(Recorder::new("B", &log));

    let mut arena = NodeArena::new();
    let resolver = PrecomputedResolver::new();
    let x = arena.create_identifier("x");
    let mut cx = HookContext {
        arena: &mut arena,
        resolver: &resolver,
    };
    let result = hooks.with_emit_notification(&mut cx, EmitHint::Expression, x, |_| Ok(()));
    assert!(result.is_err());
    // B entered first (latest registered), A failed: only B is exited.
    assert_eq!(entries(&log), vec!["B:enter", "A:enter", "B:exit"]);
}

#[test]
fn test_failed_emit_still_exits_every_handler() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    hooks.register(Recorder::new("A", &log));
    hooks.register(Recorder::new("B", &log));

    let mut arena = NodeArena::new();
    let resolver = PrecomputedResolver::new();
    let x = arena.create_identifier("x");
    let mut cx = HookContext {
        arena: &mut arena,
        resolver: &resolver,
    };
    let result: EmitResult<()> =
        hooks.with_emit_notification(&mut cx, EmitHint::Expression, x, |_| Err(EmitError::internal("emit failed")));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("emit failed"), "{err}");
    assert_eq!(entries(&log), vec!["B:enter", "A:enter", "A:exit", "B:exit"]);
}

#[test]
fn test_failed_exit_reports_first_error_after_running_all() {
    let log = Log::default();
    let mut hooks = EmitHooks::new();
    let mut failing = Recorder::new("A", &log);
    failing.fail_exit = true;
    hooks.register(failing);
    hooks.register(Recorder::new("B", &log));

    let mut arena = NodeArena::new();
    let resolver = PrecomputedResolver::new();
    let x = arena.create_identifier("x");
    let mut cx = HookContext {
        arena: &mut arena,
        resolver: &resolver,
    };
    let entered = hooks.enter_emit_node(&mut cx, EmitHint::Expression, x).expect("enter");
    let err = hooks.exit_emit_node(&mut cx, EmitHint::Expression, x, entered).unwrap_err();
    assert!(err.to_string().contains("exit failed"), "{err}");
    assert_eq!(entries(&log), vec!["B:enter", "A:enter", "A:exit", "B:exit"]);
}
