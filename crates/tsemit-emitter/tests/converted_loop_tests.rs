//! Loops whose `let` bindings are captured by closures get their body moved
//! into a per-iteration function.

mod common;

use common::{TreeBuilder, emit_js, run_in_node, squash};
use tsemit_ast::{ModifierFlags, NodeArena, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::CompilerOptions;
use tsemit_emitter::{NodeCheckFlags, PrecomputedResolver};

const SOURCE: &str = "var fns = [];\nfor (let i = 0; i < 3; i++) {\n    fns.push(() => i);\n    i++;\n}\n";

struct CapturedLoop {
    arena: NodeArena,
    root: NodeIndex,
    loop_node: NodeIndex,
    declaration: NodeIndex,
}

/// `SOURCE`, optionally without the `i++;` in the body.
fn captured_loop(with_body_increment: bool) -> CapturedLoop {
    let source = if with_body_increment {
        SOURCE.to_string()
    } else {
        SOURCE.replace("    i++;\n", "")
    };
    let mut b = TreeBuilder::new(&source);
    let fns = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "fns", |_| NodeIndex::NONE, |b| {
        b.array(|_| vec![])
    });
    let (loop_node, declaration) = b.for_let_statement(
        "i",
        |b| b.number("0"),
        |b| {
            let i = b.ident("i");
            b.binary(i, SyntaxKind::LessThanToken, |b| b.number("3"))
        },
        |b| {
            let i = b.ident("i");
            b.increment(i)
        },
        |b| {
            b.block(|b| {
                let push = b.expression_statement(|b| {
                    let fns = b.ident("fns");
                    let callee = b.property_access(fns, "push");
                    b.call(callee, |b| vec![b.arrow(|_| vec![], |b| b.ident("i"))])
                });
                let mut statements = vec![push];
                if with_body_increment {
                    statements.push(b.expression_statement(|b| {
                        let i = b.ident("i");
                        b.increment(i)
                    }));
                }
                statements
            })
        },
    );
    let (arena, root) = b.finish("loop.ts", vec![fns, loop_node]);
    CapturedLoop {
        arena,
        root,
        loop_node,
        declaration,
    }
}

fn captured_resolver(fixture: &CapturedLoop, needs_out_parameter: bool) -> PrecomputedResolver {
    let mut resolver = PrecomputedResolver::new();
    resolver.add_check_flags(fixture.loop_node, NodeCheckFlags::LOOP_WITH_CAPTURED_BLOCK_SCOPED_BINDING);
    let mut declaration_flags =
        NodeCheckFlags::CAPTURED_BLOCK_SCOPED_BINDING | NodeCheckFlags::BLOCK_SCOPED_BINDING_IN_LOOP;
    if needs_out_parameter {
        declaration_flags |= NodeCheckFlags::NEEDS_LOOP_OUT_PARAMETER;
    }
    resolver.add_check_flags(fixture.declaration, declaration_flags);
    resolver
}

#[test]
fn test_captured_binding_moves_body_into_loop_function() {
    let mut fixture = captured_loop(false);
    let resolver = captured_resolver(&fixture, false);
    let text = emit_js(&mut fixture.arena, &resolver, &CompilerOptions::default().es5(), fixture.root);
    let squashed = squash(&text);
    assert!(
        squashed.contains("var _loop_1 = function (i) { fns.push(function () { return i; }); };"),
        "{text}"
    );
    assert!(squashed.contains("for (var i = 0; i < 3; i++) { _loop_1(i); }"), "{text}");
    assert!(text.find("var _loop_1").expect("loop function") < text.find("for (").expect("loop"));
}

#[test]
fn test_uncaptured_loop_is_only_rescoped() {
    let mut fixture = captured_loop(false);
    let text = emit_js(
        &mut fixture.arena,
        &PrecomputedResolver::new(),
        &CompilerOptions::default().es5(),
        fixture.root,
    );
    assert!(!text.contains("_loop"), "{text}");
    assert!(squash(&text).contains("for (var i = 0; i < 3; i++) {"), "{text}");
}

#[test]
fn test_assigned_binding_is_copied_back_out() {
    let mut fixture = captured_loop(true);
    let resolver = captured_resolver(&fixture, true);
    let text = emit_js(&mut fixture.arena, &resolver, &CompilerOptions::default().es5(), fixture.root);
    let squashed = squash(&text);
    assert!(squashed.contains("out_i_1 = i;"), "{text}");
    assert!(squashed.contains("i = out_i_1;"), "{text}");
}

const PRINT_FNS: &str = "console.log(fns.map(function (f) { return f(); }).join(\",\"));";

/// Each closure must see its own iteration's value.
#[test]
fn test_lowered_loop_runs_with_per_iteration_bindings() {
    let mut fixture = captured_loop(false);
    let resolver = captured_resolver(&fixture, false);
    let text = emit_js(&mut fixture.arena, &resolver, &CompilerOptions::default().es5(), fixture.root);
    let Some(stdout) = run_in_node(&text, PRINT_FNS) else {
        eprintln!("node not installed; skipping");
        return;
    };
    assert_eq!(stdout, "0,1,2");
}

/// Flag a loop and its `let` declaration as captured by a closure.
fn capture(resolver: &mut PrecomputedResolver, loop_node: NodeIndex, declaration: NodeIndex) {
    resolver.add_check_flags(loop_node, NodeCheckFlags::LOOP_WITH_CAPTURED_BLOCK_SCOPED_BINDING);
    resolver.add_check_flags(
        declaration,
        NodeCheckFlags::CAPTURED_BLOCK_SCOPED_BINDING | NodeCheckFlags::BLOCK_SCOPED_BINDING_IN_LOOP,
    );
}

fn var_fns(b: &mut TreeBuilder) -> NodeIndex {
    b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "fns", |_| NodeIndex::NONE, |b| {
        b.array(|_| vec![])
    })
}

/// `name < limit`
fn less_than(b: &mut TreeBuilder, name: &str, limit: &str) -> NodeIndex {
    let left = b.ident(name);
    b.binary(left, SyntaxKind::LessThanToken, |b| b.number(limit))
}

/// `name === value`
fn equals(b: &mut TreeBuilder, name: &str, value: &str) -> NodeIndex {
    let left = b.ident(name);
    b.binary(left, SyntaxKind::EqualsEqualsEqualsToken, |b| b.number(value))
}

fn increment(b: &mut TreeBuilder, name: &str) -> NodeIndex {
    let operand = b.ident(name);
    b.increment(operand)
}

/// `fns.push(() => <value>);`
fn push_closure(b: &mut TreeBuilder, value: impl FnOnce(&mut TreeBuilder) -> NodeIndex) -> NodeIndex {
    b.expression_statement(|b| {
        let fns = b.ident("fns");
        let callee = b.property_access(fns, "push");
        b.call(callee, |b| vec![b.arrow(|_| vec![], value)])
    })
}

/// `i * 10 + k`
fn pair_value(b: &mut TreeBuilder) -> NodeIndex {
    let i = b.ident("i");
    let tens = b.binary(i, SyntaxKind::AsteriskToken, |b| b.number("10"));
    b.binary(tens, SyntaxKind::PlusToken, |b| b.ident("k"))
}

#[test]
fn test_break_and_continue_leave_the_loop_function_as_markers() {
    let source = "var fns = [];\nfor (let i = 0; i < 5; i++) {\n    if (i === 1) continue;\n    if (i === 3) break;\n    fns.push(() => i);\n}\n";
    let mut b = TreeBuilder::new(source);
    let fns = var_fns(&mut b);
    let (loop_node, declaration) = b.for_let_statement(
        "i",
        |b| b.number("0"),
        |b| less_than(b, "i", "5"),
        |b| increment(b, "i"),
        |b| {
            b.block(|b| {
                vec![
                    b.if_statement(|b| equals(b, "i", "1"), |b| b.continue_statement(None)),
                    b.if_statement(|b| equals(b, "i", "3"), |b| b.break_statement(None)),
                    push_closure(b, |b| b.ident("i")),
                ]
            })
        },
    );
    let (mut arena, root) = b.finish("loop.ts", vec![fns, loop_node]);
    let mut resolver = PrecomputedResolver::new();
    capture(&mut resolver, loop_node, declaration);
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(squashed.contains("if (i === 1) return \"continue\";"), "{text}");
    assert!(squashed.contains("if (i === 3) return \"break\";"), "{text}");
    assert!(
        squashed.contains("var state_1 = _loop_1(i); if (state_1 === \"break\") break; }"),
        "{text}"
    );
    assert!(!squashed.contains("=== \"continue\""), "{text}");

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,2");
    }
}

#[test]
fn test_break_inside_switch_stays_local() {
    let source = "var fns = [];\nfor (let i = 0; i < 3; i++) {\n    switch (i) {\n        case 1:\n            break;\n        default:\n            fns.push(() => i);\n    }\n}\n";
    let mut b = TreeBuilder::new(source);
    let fns = var_fns(&mut b);
    let (loop_node, declaration) = b.for_let_statement(
        "i",
        |b| b.number("0"),
        |b| less_than(b, "i", "3"),
        |b| increment(b, "i"),
        |b| {
            b.block(|b| {
                vec![b.switch_statement(
                    |b| b.ident("i"),
                    |b| {
                        vec![
                            b.case_clause(|b| b.number("1"), |b| vec![b.break_statement(None)]),
                            b.default_clause(|b| vec![push_closure(b, |b| b.ident("i"))]),
                        ]
                    },
                )]
            })
        },
    );
    let (mut arena, root) = b.finish("loop.ts", vec![fns, loop_node]);
    let mut resolver = PrecomputedResolver::new();
    capture(&mut resolver, loop_node, declaration);
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(squashed.contains("case 1: break;"), "{text}");
    assert!(!squashed.contains("return \"break\""), "{text}");
    assert!(!text.contains("state_"), "{text}");
    assert!(squashed.contains("_loop_1(i); }"), "{text}");

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,2");
    }
}

/// `function find() { var fns = []; <loops>; return fns; }` and a top-level
/// `var fns = find();`.
fn find_function(
    b: &mut TreeBuilder,
    loops: impl FnOnce(&mut TreeBuilder) -> NodeIndex,
) -> (NodeIndex, NodeIndex) {
    let find = b.function_declaration(
        ModifierFlags::NONE,
        "find",
        |_| vec![],
        |_| NodeIndex::NONE,
        |b| {
            let fns = var_fns(b);
            let loops = loops(b);
            let done = b.return_statement(|b| b.ident("fns"));
            vec![fns, loops, done]
        },
    );
    let call = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "fns", |_| NodeIndex::NONE, |b| {
        let find = b.ident("find");
        b.call(find, |_| vec![])
    });
    (find, call)
}

#[test]
fn test_return_inside_loop_function_is_boxed() {
    let source = "function find() {\n    var fns = [];\n    for (let i = 0; i < 5; i++) {\n        fns.push(() => i);\n        if (i === 2) return fns;\n    }\n    return fns;\n}\nvar fns = find();\n";
    let mut b = TreeBuilder::new(source);
    let mut flagged = (NodeIndex::NONE, NodeIndex::NONE);
    let (find, call) = find_function(&mut b, |b| {
        let (loop_node, declaration) = b.for_let_statement(
            "i",
            |b| b.number("0"),
            |b| less_than(b, "i", "5"),
            |b| increment(b, "i"),
            |b| {
                b.block(|b| {
                    vec![
                        push_closure(b, |b| b.ident("i")),
                        b.if_statement(|b| equals(b, "i", "2"), |b| b.return_statement(|b| b.ident("fns"))),
                    ]
                })
            },
        );
        flagged = (loop_node, declaration);
        loop_node
    });
    let (mut arena, root) = b.finish("loop.ts", vec![find, call]);
    let mut resolver = PrecomputedResolver::new();
    capture(&mut resolver, flagged.0, flagged.1);
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(squashed.contains("if (i === 2) return { value: fns };"), "{text}");
    assert!(
        squashed.contains("var state_1 = _loop_1(i); if (typeof state_1 === \"object\") return state_1.value; }"),
        "{text}"
    );

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,1,2");
    }
}

#[test]
fn test_return_from_nested_loop_functions_is_handed_outward() {
    let source = "function find() {\n    var fns = [];\n    for (let i = 0; i < 2; i++) {\n        for (let k = 0; k < 3; k++) {\n            fns.push(() => i * 10 + k);\n            if (i === 1) return fns;\n        }\n    }\n    return fns;\n}\nvar fns = find();\n";
    let mut b = TreeBuilder::new(source);
    let mut flagged = Vec::new();
    let (find, call) = find_function(&mut b, |b| {
        let (outer, outer_declaration) = b.for_let_statement(
            "i",
            |b| b.number("0"),
            |b| less_than(b, "i", "2"),
            |b| increment(b, "i"),
            |b| {
                b.block(|b| {
                    let (inner, inner_declaration) = b.for_let_statement(
                        "k",
                        |b| b.number("0"),
                        |b| less_than(b, "k", "3"),
                        |b| increment(b, "k"),
                        |b| {
                            b.block(|b| {
                                vec![
                                    push_closure(b, pair_value),
                                    b.if_statement(
                                        |b| equals(b, "i", "1"),
                                        |b| b.return_statement(|b| b.ident("fns")),
                                    ),
                                ]
                            })
                        },
                    );
                    flagged.push((inner, inner_declaration));
                    vec![inner]
                })
            },
        );
        flagged.push((outer, outer_declaration));
        outer
    });
    let (mut arena, root) = b.finish("loop.ts", vec![find, call]);
    let mut resolver = PrecomputedResolver::new();
    for (loop_node, declaration) in flagged {
        capture(&mut resolver, loop_node, declaration);
    }
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(squashed.contains("if (i === 1) return { value: fns };"), "{text}");
    assert!(
        squashed.contains("var state_2 = _loop_2(k); if (typeof state_2 === \"object\") return state_2; }"),
        "{text}"
    );
    assert!(
        squashed.contains("var state_1 = _loop_1(i); if (typeof state_1 === \"object\") return state_1.value; }"),
        "{text}"
    );

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,1,2,10");
    }
}

#[test]
fn test_labeled_jumps_to_a_plain_outer_loop_are_taken_after_the_call() {
    let source = "var fns = [];\nouter: for (var j = 0; j < 3; j++) {\n    for (let i = 0; i < 3; i++) {\n        if (i === 1) continue outer;\n        if (j === 2) break outer;\n        fns.push(() => i);\n    }\n}\n";
    let mut b = TreeBuilder::new(source);
    let fns = var_fns(&mut b);
    let mut flagged = (NodeIndex::NONE, NodeIndex::NONE);
    let labeled = b.labeled_statement("outer", |b| {
        let (outer, _) = b.for_statement(
            NodeFlags::NONE,
            "j",
            |b| b.number("0"),
            |b| less_than(b, "j", "3"),
            |b| increment(b, "j"),
            |b| {
                b.block(|b| {
                    let (inner, declaration) = b.for_let_statement(
                        "i",
                        |b| b.number("0"),
                        |b| less_than(b, "i", "3"),
                        |b| increment(b, "i"),
                        |b| {
                            b.block(|b| {
                                vec![
                                    b.if_statement(|b| equals(b, "i", "1"), |b| b.continue_statement(Some("outer"))),
                                    b.if_statement(|b| equals(b, "j", "2"), |b| b.break_statement(Some("outer"))),
                                    push_closure(b, |b| b.ident("i")),
                                ]
                            })
                        },
                    );
                    flagged = (inner, declaration);
                    vec![inner]
                })
            },
        );
        outer
    });
    let (mut arena, root) = b.finish("loop.ts", vec![fns, labeled]);
    let mut resolver = PrecomputedResolver::new();
    capture(&mut resolver, flagged.0, flagged.1);
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(squashed.contains("if (i === 1) return \"continue-outer\";"), "{text}");
    assert!(squashed.contains("if (j === 2) return \"break-outer\";"), "{text}");
    assert!(
        squashed.contains(
            "var state_1 = _loop_1(i); switch (state_1) { case \"break-outer\": break outer; case \"continue-outer\": continue outer; }"
        ),
        "{text}"
    );
    assert!(squashed.contains("outer: for (var j = 0; j < 3; j++) {"), "{text}");

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,0");
    }
}

#[test]
fn test_labeled_jumps_past_a_converted_outer_loop_are_handed_outward() {
    let source = "var fns = [];\nouter: for (let i = 0; i < 3; i++) {\n    for (let k = 0; k < 3; k++) {\n        if (k === 1) continue outer;\n        if (i === 2) break outer;\n        fns.push(() => i * 10 + k);\n    }\n}\n";
    let mut b = TreeBuilder::new(source);
    let fns = var_fns(&mut b);
    let mut flagged = Vec::new();
    let labeled = b.labeled_statement("outer", |b| {
        let (outer, outer_declaration) = b.for_let_statement(
            "i",
            |b| b.number("0"),
            |b| less_than(b, "i", "3"),
            |b| increment(b, "i"),
            |b| {
                b.block(|b| {
                    let (inner, inner_declaration) = b.for_let_statement(
                        "k",
                        |b| b.number("0"),
                        |b| less_than(b, "k", "3"),
                        |b| increment(b, "k"),
                        |b| {
                            b.block(|b| {
                                vec![
                                    b.if_statement(|b| equals(b, "k", "1"), |b| b.continue_statement(Some("outer"))),
                                    b.if_statement(|b| equals(b, "i", "2"), |b| b.break_statement(Some("outer"))),
                                    push_closure(b, pair_value),
                                ]
                            })
                        },
                    );
                    flagged.push((inner, inner_declaration));
                    vec![inner]
                })
            },
        );
        flagged.push((outer, outer_declaration));
        outer
    });
    let (mut arena, root) = b.finish("loop.ts", vec![fns, labeled]);
    let mut resolver = PrecomputedResolver::new();
    for (loop_node, declaration) in flagged {
        capture(&mut resolver, loop_node, declaration);
    }
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(
        squashed.contains(
            "switch (state_2) { case \"break-outer\": return state_2; case \"continue-outer\": return state_2; }"
        ),
        "{text}"
    );
    assert!(
        squashed.contains(
            "switch (state_1) { case \"break-outer\": break outer; case \"continue-outer\": continue outer; }"
        ),
        "{text}"
    );

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,10");
    }
}

#[test]
fn test_labeled_jump_to_a_loop_inside_the_same_body_is_taken_directly() {
    let source = "var fns = [];\nfor (let i = 0; i < 2; i++) {\n    inner: for (let k = 0; k < 3; k++) {\n        if (k === 2) break inner;\n        fns.push(() => i * 10 + k);\n    }\n}\n";
    let mut b = TreeBuilder::new(source);
    let fns = var_fns(&mut b);
    let mut flagged = Vec::new();
    let (outer, outer_declaration) = b.for_let_statement(
        "i",
        |b| b.number("0"),
        |b| less_than(b, "i", "2"),
        |b| increment(b, "i"),
        |b| {
            b.block(|b| {
                let labeled = b.labeled_statement("inner", |b| {
                    let (inner, inner_declaration) = b.for_let_statement(
                        "k",
                        |b| b.number("0"),
                        |b| less_than(b, "k", "3"),
                        |b| increment(b, "k"),
                        |b| {
                            b.block(|b| {
                                vec![
                                    b.if_statement(|b| equals(b, "k", "2"), |b| b.break_statement(Some("inner"))),
                                    push_closure(b, pair_value),
                                ]
                            })
                        },
                    );
                    flagged.push((inner, inner_declaration));
                    inner
                });
                vec![labeled]
            })
        },
    );
    flagged.push((outer, outer_declaration));
    let (mut arena, root) = b.finish("loop.ts", vec![fns, outer]);
    let mut resolver = PrecomputedResolver::new();
    for (loop_node, declaration) in flagged {
        capture(&mut resolver, loop_node, declaration);
    }
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(squashed.contains("if (k === 2) return \"break-inner\";"), "{text}");
    assert!(squashed.contains("case \"break-inner\": break inner;"), "{text}");
    assert!(squashed.contains("inner: for (var k = 0; k < 3; k++) {"), "{text}");
    assert!(!squashed.contains("return state_"), "{text}");
    assert!(squashed.contains("_loop_1(i); }"), "{text}");

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "0,1,10,11");
    }
}

#[test]
fn test_for_of_with_captured_binding() {
    let source = "var fns = [];\nfor (let i of [1, 2, 3]) {\n    fns.push(() => i);\n}\n";
    let mut b = TreeBuilder::new(source);
    let fns = var_fns(&mut b);
    let (loop_node, declaration) = b.for_of_statement(
        NodeFlags::LET,
        "i",
        |b| b.array(|b| vec![b.number("1"), b.number("2"), b.number("3")]),
        |b| b.block(|b| vec![push_closure(b, |b| b.ident("i"))]),
    );
    let (mut arena, root) = b.finish("loop.ts", vec![fns, loop_node]);
    let mut resolver = PrecomputedResolver::new();
    capture(&mut resolver, loop_node, declaration);
    let text = emit_js(&mut arena, &resolver, &CompilerOptions::default().es5(), root);
    let squashed = squash(&text);

    assert!(
        squashed.contains("var _loop_1 = function (i) { fns.push(function () { return i; }); };"),
        "{text}"
    );
    assert!(
        squashed.contains("for (var _i = 0, _a = [1, 2, 3]; _i < _a.length; _i++) { var i = _a[_i]; _loop_1(i); }"),
        "{text}"
    );

    if let Some(stdout) = run_in_node(&text, PRINT_FNS) {
        assert_eq!(stdout, "1,2,3");
    }
}

#[test]
fn test_converted_output_is_deterministic() {
    let emit = || {
        let mut fixture = captured_loop(true);
        let resolver = captured_resolver(&fixture, true);
        emit_js(&mut fixture.arena, &resolver, &CompilerOptions::default().es5(), fixture.root)
    };
    assert_eq!(emit(), emit());
}
