//! Downlevel lowering to ES5: arrows, block scoping, classes, templates and
//! default parameters.

mod common;

use common::{TreeBuilder, emit_js, run_in_node, squash};
use tsemit_ast::{ModifierFlags, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::CompilerOptions;
use tsemit_emitter::PrecomputedResolver;

fn es5_output(b: TreeBuilder, statements: Vec<NodeIndex>) -> String {
    let (mut arena, root) = b.finish("a.ts", statements);
    emit_js(&mut arena, &PrecomputedResolver::new(), &CompilerOptions::default().es5(), root)
}

#[test]
fn test_arrow_using_this_captures_it() {
    let mut b = TreeBuilder::new("let f = () => this;\n");
    let f = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "f", |_| NodeIndex::NONE, |b| {
        b.arrow(|_| vec![], |b| b.this())
    });
    let text = es5_output(b, vec![f]);
    let squashed = squash(&text);
    assert!(squashed.starts_with("var _this = this;"), "{text}");
    assert!(squashed.contains("var f = function () { return _this; };"), "{text}");
    assert!(!text.contains("=>"), "{text}");
}

#[test]
fn test_arrow_without_this_needs_no_capture() {
    let mut b = TreeBuilder::new("let g = (x) => x;\n");
    let g = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "g", |_| NodeIndex::NONE, |b| {
        b.arrow(|b| vec![b.parameter("x", |_| NodeIndex::NONE)], |b| b.ident("x"))
    });
    let text = es5_output(b, vec![g]);
    assert!(!text.contains("_this"), "{text}");
    assert!(squash(&text).contains("var g = function (x) { return x; };"), "{text}");
}

#[test]
fn test_let_and_const_become_var() {
    let mut b = TreeBuilder::new("let a = 1;\nconst b = a;\n");
    let a = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "a", |_| NodeIndex::NONE, |b| b.number("1"));
    let c = b.variable_statement(NodeFlags::CONST, ModifierFlags::NONE, "b", |_| NodeIndex::NONE, |b| b.ident("a"));
    let text = es5_output(b, vec![a, c]);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    assert_eq!(lines, vec!["var a = 1;", "var b = a;"]);
}

#[test]
fn test_class_becomes_iife_with_prototype_methods() {
    let mut b = TreeBuilder::new("class A {\n    m() { return 1; }\n}\n");
    let class = b.class_declaration(ModifierFlags::NONE, "A", None, |b| {
        vec![b.method_declaration(
            ModifierFlags::NONE,
            "m",
            |_| vec![],
            |b| vec![b.return_statement(|b| b.number("1"))],
        )]
    });
    let text = es5_output(b, vec![class]);
    let squashed = squash(&text);
    assert!(squashed.starts_with("var A = /** @class */ (function () {"), "{text}");
    assert!(squashed.contains("function A() { }"), "{text}");
    assert!(squashed.contains("A.prototype.m = function () { return 1; };"), "{text}");
    assert!(squashed.contains("return A; }());"), "{text}");
    assert!(!text.contains("__extends"), "{text}");
}

#[test]
fn test_derived_class_uses_extends_helper() {
    let mut b = TreeBuilder::new("class B extends A { }\n");
    let class = b.class_declaration(ModifierFlags::NONE, "B", Some("A"), |_| vec![]);
    let text = es5_output(b, vec![class]);
    let squashed = squash(&text);
    let helper_at = text.find("var __extends").expect("helper emitted");
    let class_at = text.find("var B =").expect("class emitted");
    assert!(helper_at < class_at, "{text}");
    assert!(squashed.contains("(function (_super) { __extends(B, _super);"), "{text}");
    assert!(
        squashed.contains("return _super !== null && _super.apply(this, arguments) || this;"),
        "{text}"
    );
    assert!(squashed.contains("}(A));"), "{text}");
}

#[test]
fn test_parameter_property_lands_in_constructor_function() {
    let mut b = TreeBuilder::new("class P {\n    constructor(private x: number) { }\n}\n");
    let class = b.class_declaration(ModifierFlags::NONE, "P", None, |b| {
        vec![b.constructor(
            |b| vec![b.parameter_with("x", ModifierFlags::PRIVATE, |b| b.keyword_type(SyntaxKind::NumberKeyword))],
            |_| vec![],
        )]
    });
    let text = es5_output(b, vec![class]);
    assert!(squash(&text).contains("function P(x) { this.x = x; }"), "{text}");
    assert!(!text.contains("private"), "{text}");
}

#[test]
fn test_template_becomes_concatenation() {
    let mut b = TreeBuilder::new("let s = `a${x}b`;\n");
    let s = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "s", |_| NodeIndex::NONE, |b| {
        b.template("a", |b| b.ident("x"), "b")
    });
    let text = es5_output(b, vec![s]);
    assert_eq!(text.trim(), "var s = \"a\" + x + \"b\";");
}

#[test]
fn test_default_parameter_moves_into_body() {
    let mut b = TreeBuilder::new("function f(x = 1) { return x; }\n");
    let f = b.function_declaration(
        ModifierFlags::NONE,
        "f",
        |b| vec![b.parameter_default("x", |b| b.number("1"))],
        |_| NodeIndex::NONE,
        |b| vec![b.return_statement(|b| b.ident("x"))],
    );
    let text = es5_output(b, vec![f]);
    let squashed = squash(&text);
    assert!(
        squashed.contains("function f(x) { if (x === void 0) { x = 1; } return x; }"),
        "{text}"
    );
}

#[test]
fn test_es2015_target_leaves_syntax_alone() {
    let mut b = TreeBuilder::new("let f = () => this;\n");
    let f = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "f", |_| NodeIndex::NONE, |b| {
        b.arrow(|_| vec![], |b| b.this())
    });
    let (mut arena, root) = b.finish("a.ts", vec![f]);
    let options = CompilerOptions::default().with_target(tsemit_common::ScriptTarget::ES2015);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &options, root);
    assert_eq!(text.trim(), "let f = () => this;");
}

#[test]
fn test_spread_elements_and_arguments() {
    let mut b = TreeBuilder::new("var x = [a, ...b, c, ...d];\nf(...xs);\no.m(a, ...xs);\n");
    let x = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "x", |_| NodeIndex::NONE, |b| {
        b.array(|b| {
            vec![
                b.ident("a"),
                b.spread(|b| b.ident("b")),
                b.ident("c"),
                b.spread(|b| b.ident("d")),
            ]
        })
    });
    let call = b.expression_statement(|b| {
        let f = b.ident("f");
        b.call(f, |b| vec![b.spread(|b| b.ident("xs"))])
    });
    let method_call = b.expression_statement(|b| {
        let o = b.ident("o");
        let callee = b.property_access(o, "m");
        b.call(callee, |b| vec![b.ident("a"), b.spread(|b| b.ident("xs"))])
    });
    let text = es5_output(b, vec![x, call, method_call]);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    assert_eq!(
        lines,
        vec![
            "var x = [a].concat(b, [c], d);",
            "f.apply(void 0, xs);",
            "o.m.apply(o, [a].concat(xs));",
        ]
    );
}

#[test]
fn test_nested_destructuring_declares_in_source_order() {
    let mut b = TreeBuilder::new("const {a, b: [c, d = 5]} = obj();\n");
    let statement = b.destructuring_statement(
        NodeFlags::CONST,
        |b| {
            b.object_binding(|b| {
                vec![
                    b.binding_element("a", |_| NodeIndex::NONE),
                    b.binding_property("b", |b| {
                        b.array_binding(|b| {
                            vec![
                                b.binding_element("c", |_| NodeIndex::NONE),
                                b.binding_element("d", |b| b.number("5")),
                            ]
                        })
                    }),
                ]
            })
        },
        |b| {
            let obj = b.ident("obj");
            b.call(obj, |_| vec![])
        },
    );
    let text = es5_output(b, vec![statement]);
    assert_eq!(
        text.trim(),
        "var _a = obj(), a = _a.a, _b = _a.b, c = _b[0], _c = _b[1], d = _c === void 0 ? 5 : _c;"
    );

    let prelude = "function obj() { return { a: 1, b: [2] }; }\n";
    if let Some(stdout) = run_in_node(&format!("{prelude}{text}"), "console.log([a, c, d].join(\",\"));") {
        assert_eq!(stdout, "1,2,5");
    }
}

#[test]
fn test_tagged_template_in_module_caches_strings_object() {
    let mut b = TreeBuilder::new("export var s = tag`a${b}c`;\n");
    let s = b.variable_statement(NodeFlags::NONE, ModifierFlags::EXPORT, "s", |_| NodeIndex::NONE, |b| {
        b.tagged_template("tag", "a", |b| b.ident("b"), "c")
    });
    let text = es5_output(b, vec![s]);
    let squashed = squash(&text);
    assert!(
        squashed.contains(
            "s = tag(templateObject_1 || (templateObject_1 = __makeTemplateObject([\"a\", \"c\"], [\"a\", \"c\"])), b);"
        ),
        "{text}"
    );
    assert_eq!(text.lines().map(str::trim).filter(|l| !l.is_empty()).last(), Some("var templateObject_1;"));
    assert!(text.find("var __makeTemplateObject").expect("helper") < text.find("tag(").expect("call"));
}

#[test]
fn test_tagged_template_in_script_calls_helper_inline() {
    let mut b = TreeBuilder::new("var s = tag`a${b}c`;\n");
    let s = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "s", |_| NodeIndex::NONE, |b| {
        b.tagged_template("tag", "a", |b| b.ident("b"), "c")
    });
    let text = es5_output(b, vec![s]);
    assert!(
        squash(&text).contains("var s = tag(__makeTemplateObject([\"a\", \"c\"], [\"a\", \"c\"]), b);"),
        "{text}"
    );
    assert!(!text.contains("templateObject_"), "{text}");
}

#[test]
fn test_for_of_with_downlevel_iteration_closes_the_iterator() {
    let source = "var xs = \"abc\";\nvar out = [];\nfor (const x of xs) {\n    if (x === \"c\") break;\n    out.push(x);\n}\n";
    let mut b = TreeBuilder::new(source);
    let xs = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "xs", |_| NodeIndex::NONE, |b| {
        b.string("abc")
    });
    let out = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "out", |_| NodeIndex::NONE, |b| {
        b.array(|_| vec![])
    });
    let (for_of, _) = b.for_of_statement(
        NodeFlags::CONST,
        "x",
        |b| b.ident("xs"),
        |b| {
            b.block(|b| {
                let check = b.if_statement(
                    |b| {
                        let x = b.ident("x");
                        b.binary(x, SyntaxKind::EqualsEqualsEqualsToken, |b| b.string("c"))
                    },
                    |b| b.break_statement(None),
                );
                let push = b.expression_statement(|b| {
                    let out = b.ident("out");
                    let callee = b.property_access(out, "push");
                    b.call(callee, |b| vec![b.ident("x")])
                });
                vec![check, push]
            })
        },
    );
    let (mut arena, root) = b.finish("a.ts", vec![xs, out, for_of]);
    let options = CompilerOptions {
        downlevel_iteration: true,
        ..CompilerOptions::default().es5()
    };
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &options, root);
    let squashed = squash(&text);

    assert!(squashed.contains("var e_1, _a;"), "{text}");
    assert!(
        squashed.contains(
            "try { for (var xs_1 = __values(xs), xs_1_1 = xs_1.next(); !xs_1_1.done; xs_1_1 = xs_1.next()) { var x = xs_1_1.value;"
        ),
        "{text}"
    );
    assert!(squashed.contains("catch (e_1_1) { e_1 = { error: e_1_1 }; }"), "{text}");
    assert!(
        squashed.contains(
            "finally { try { if (xs_1_1 && !xs_1_1.done && (_a = xs_1.return)) _a.call(xs_1); } finally { if (e_1) throw e_1.error; } }"
        ),
        "{text}"
    );
    assert!(text.find("var __values").expect("helper") < text.find("try {").expect("loop"));

    if let Some(stdout) = run_in_node(&text, "console.log(out.join(\",\"));") {
        assert_eq!(stdout, "a,b");
    }
}
