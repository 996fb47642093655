//! TypeScript syntax removal, printed at an ES2015 target so no downlevel
//! pass runs afterwards.

mod common;

use common::{TreeBuilder, emit_js, squash};
use tsemit_ast::{ModifierFlags, NodeData, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::{CompilerOptions, ScriptTarget};
use tsemit_emitter::{ConstantValue, NodeCheckFlags, PrecomputedResolver};

fn es2015() -> CompilerOptions {
    CompilerOptions::default().with_target(ScriptTarget::ES2015)
}

fn trimmed_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

#[test]
fn test_enum_becomes_var_and_iife() {
    let mut b = TreeBuilder::new("enum E { A, B = 5, C }\n");
    let declaration = b.enum_declaration(ModifierFlags::NONE, "E", |b| {
        vec![
            b.enum_member("A", |_| NodeIndex::NONE),
            b.enum_member("B", |b| b.number("5")),
            b.enum_member("C", |_| NodeIndex::NONE),
        ]
    });
    let (mut arena, root) = b.finish("a.ts", vec![declaration]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    assert_eq!(
        trimmed_lines(&text),
        vec![
            "var E;",
            "(function (E) {",
            "E[E[\"A\"] = 0] = \"A\";",
            "E[E[\"B\"] = 5] = \"B\";",
            "E[E[\"C\"] = 6] = \"C\";",
            "})(E || (E = {}));",
        ]
    );
}

#[test]
fn test_enum_uses_resolver_constant_values() {
    let mut b = TreeBuilder::new("enum E { A = f(), B }\n");
    let mut first = NodeIndex::NONE;
    let declaration = b.enum_declaration(ModifierFlags::NONE, "E", |b| {
        first = b.enum_member("A", |b| {
            let f = b.ident("f");
            b.call(f, |_| vec![])
        });
        vec![first, b.enum_member("B", |_| NodeIndex::NONE)]
    });
    let (mut arena, root) = b.finish("a.ts", vec![declaration]);
    let mut resolver = PrecomputedResolver::new();
    resolver.set_constant_value(first, ConstantValue::Number(3.0));
    let text = emit_js(&mut arena, &resolver, &es2015(), root);
    let squashed = squash(&text);
    assert!(squashed.contains("E[E[\"A\"] = 3] = \"A\";"), "{text}");
    assert!(squashed.contains("E[E[\"B\"] = 4] = \"B\";"), "{text}");
    assert!(!squashed.contains("f()"), "{text}");
}

#[test]
fn test_string_enum_member_has_no_reverse_mapping() {
    let mut b = TreeBuilder::new("enum S { Up = \"UP\" }\n");
    let declaration = b.enum_declaration(ModifierFlags::NONE, "S", |b| vec![b.enum_member("Up", |b| b.string("UP"))]);
    let (mut arena, root) = b.finish("a.ts", vec![declaration]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    assert!(squash(&text).contains("S[\"Up\"] = \"UP\";"), "{text}");
    assert!(!text.contains("S[S["), "{text}");
}

fn const_enum() -> (tsemit_ast::NodeArena, NodeIndex) {
    let mut b = TreeBuilder::new("const enum F { X }\nlet y = 1;\n");
    let declaration = b.enum_declaration(ModifierFlags::CONST, "F", |b| vec![b.enum_member("X", |_| NodeIndex::NONE)]);
    let after = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "y", |_| NodeIndex::NONE, |b| b.number("1"));
    b.finish("a.ts", vec![declaration, after])
}

#[test]
fn test_const_enum_is_elided() {
    let (mut arena, root) = const_enum();
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    assert_eq!(trimmed_lines(&text), vec!["let y = 1;"]);
}

#[test]
fn test_preserve_const_enums_keeps_the_iife() {
    let (mut arena, root) = const_enum();
    let options = CompilerOptions {
        preserve_const_enums: true,
        ..es2015()
    };
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &options, root);
    let squashed = squash(&text);
    assert!(squashed.starts_with("var F;"), "{text}");
    assert!(squashed.contains("F[F[\"X\"] = 0] = \"X\";"), "{text}");
    assert!(squashed.ends_with("let y = 1;"), "{text}");
}

#[test]
fn test_namespace_exports_are_assigned_on_the_container() {
    let mut b = TreeBuilder::new("namespace N {\n    export var x = 1;\n    export function f() { }\n}\n");
    let namespace = b.namespace_declaration(ModifierFlags::NONE, "N", |b| {
        let x = b.variable_statement(NodeFlags::NONE, ModifierFlags::EXPORT, "x", |_| NodeIndex::NONE, |b| {
            b.number("1")
        });
        let f = b.function_declaration(ModifierFlags::EXPORT, "f", |_| vec![], |_| NodeIndex::NONE, |_| vec![]);
        vec![x, f]
    });
    let (mut arena, root) = b.finish("a.ts", vec![namespace]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    let lines = trimmed_lines(&text);
    assert_eq!(lines.first(), Some(&"var N;"), "{text}");
    assert_eq!(lines.get(1), Some(&"(function (N) {"), "{text}");
    assert!(lines.contains(&"N.x = 1;"), "{text}");
    assert!(lines.contains(&"N.f = f;"), "{text}");
    assert_eq!(lines.last(), Some(&"})(N || (N = {}));"), "{text}");
    assert!(!text.contains("export"), "{text}");
}

#[test]
fn test_namespace_of_types_only_emits_nothing() {
    let mut b = TreeBuilder::new("namespace T {\n    interface I { a: string; }\n}\n");
    let namespace = b.namespace_declaration(ModifierFlags::NONE, "T", |b| {
        vec![b.interface_declaration("I", |b| {
            vec![b.property_signature("a", |b| b.keyword_type(SyntaxKind::StringKeyword))]
        })]
    });
    let (mut arena, root) = b.finish("a.ts", vec![namespace]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    assert!(text.trim().is_empty(), "{text}");
}

#[test]
fn test_type_annotations_and_declarations_are_removed() {
    let source = "interface I { a: string; }\ntype T = number;\nlet a: number = 1;\nfunction f(x: string): void { return; }\n";
    let mut b = TreeBuilder::new(source);
    let interface = b.interface_declaration("I", |b| {
        vec![b.property_signature("a", |b| b.keyword_type(SyntaxKind::StringKeyword))]
    });
    let alias = b.type_alias("T", |b| b.keyword_type(SyntaxKind::NumberKeyword));
    let a = b.variable_statement(
        NodeFlags::LET,
        ModifierFlags::NONE,
        "a",
        |b| b.keyword_type(SyntaxKind::NumberKeyword),
        |b| b.number("1"),
    );
    let f = b.function_declaration(
        ModifierFlags::NONE,
        "f",
        |b| vec![b.parameter("x", |b| b.keyword_type(SyntaxKind::StringKeyword))],
        |b| b.keyword_type(SyntaxKind::VoidKeyword),
        |b| vec![b.return_statement(|_| NodeIndex::NONE)],
    );
    let (mut arena, root) = b.finish("a.ts", vec![interface, alias, a, f]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    let squashed = squash(&text);
    assert!(squashed.starts_with("let a = 1;"), "{text}");
    assert!(squashed.contains("function f(x) {"), "{text}");
    for erased in ["interface", "type T", "number", "string", "void"] {
        assert!(!text.contains(erased), "`{erased}` left in {text}");
    }
}

#[test]
fn test_ambient_declarations_are_not_emitted() {
    let mut b = TreeBuilder::new("declare var x: number;\nlet y = x;\n");
    let ambient = b.variable_statement(
        NodeFlags::NONE,
        ModifierFlags::AMBIENT,
        "x",
        |b| b.keyword_type(SyntaxKind::NumberKeyword),
        |_| NodeIndex::NONE,
    );
    let y = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "y", |_| NodeIndex::NONE, |b| b.ident("x"));
    let (mut arena, root) = b.finish("a.ts", vec![ambient, y]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    assert_eq!(trimmed_lines(&text), vec!["let y = x;"]);
}

#[test]
fn test_parameter_property_is_assigned_in_constructor() {
    let mut b = TreeBuilder::new("class C {\n    constructor(public x: number) { }\n}\n");
    let class = b.class_declaration(ModifierFlags::NONE, "C", None, |b| {
        vec![b.constructor(
            |b| vec![b.parameter_with("x", ModifierFlags::PUBLIC, |b| b.keyword_type(SyntaxKind::NumberKeyword))],
            |_| vec![],
        )]
    });
    let (mut arena, root) = b.finish("a.ts", vec![class]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    let squashed = squash(&text);
    assert!(squashed.contains("constructor(x) { this.x = x; }"), "{text}");
    assert!(!text.contains("public"), "{text}");
    assert!(!text.contains("number"), "{text}");
}

#[test]
fn test_property_initializers_move_into_constructor() {
    let mut b = TreeBuilder::new("class P {\n    x: number = 1;\n    static s = 2;\n}\n");
    let class = b.class_declaration(ModifierFlags::NONE, "P", None, |b| {
        vec![
            b.property_declaration(
                ModifierFlags::NONE,
                "x",
                |b| b.keyword_type(SyntaxKind::NumberKeyword),
                |b| b.number("1"),
            ),
            b.property_declaration(ModifierFlags::STATIC, "s", |_| NodeIndex::NONE, |b| b.number("2")),
        ]
    });
    let (mut arena, root) = b.finish("a.ts", vec![class]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    let squashed = squash(&text);
    assert!(squashed.contains("class P { constructor() { this.x = 1; } }"), "{text}");
    assert!(squashed.ends_with("P.s = 2;"), "{text}");
}

#[test]
fn test_namespace_merged_with_earlier_declaration_declares_once() {
    let source = "namespace N {\n    export var x = 1;\n}\nnamespace N {\n    export var y = 2;\n}\nenum E { A }\nnamespace E {\n    export var b = 1;\n}\n";
    let mut b = TreeBuilder::new(source);
    let namespace = |b: &mut TreeBuilder, name: &str, member: &str, value: &str| {
        b.namespace_declaration(ModifierFlags::NONE, name, |b| {
            vec![b.variable_statement(NodeFlags::NONE, ModifierFlags::EXPORT, member, |_| NodeIndex::NONE, |b| {
                b.number(value)
            })]
        })
    };
    let first = namespace(&mut b, "N", "x", "1");
    let second = namespace(&mut b, "N", "y", "2");
    let enum_e = b.enum_declaration(ModifierFlags::NONE, "E", |b| vec![b.enum_member("A", |_| NodeIndex::NONE)]);
    let merged = namespace(&mut b, "E", "b", "1");
    let (mut arena, root) = b.finish("a.ts", vec![first, second, enum_e, merged]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &es2015(), root);
    assert_eq!(
        trimmed_lines(&text),
        vec![
            "var N;",
            "(function (N) {",
            "N.x = 1;",
            "})(N || (N = {}));",
            "(function (N) {",
            "N.y = 2;",
            "})(N || (N = {}));",
            "var E;",
            "(function (E) {",
            "E[E[\"A\"] = 0] = \"A\";",
            "})(E || (E = {}));",
            "(function (E) {",
            "E.b = 1;",
            "})(E || (E = {}));",
        ]
    );
}

fn with_decorators(metadata: bool) -> CompilerOptions {
    CompilerOptions {
        experimental_decorators: true,
        emit_decorator_metadata: metadata,
        ..es2015()
    }
}

/// `class C { @dec method(@pdec x) { } }`
fn decorated_member_class() -> (tsemit_ast::NodeArena, NodeIndex) {
    let mut b = TreeBuilder::new("class C {\n    @dec\n    method(@pdec x) { }\n}\n");
    let class = b.class_declaration(ModifierFlags::NONE, "C", None, |b| {
        vec![b.decorated_method(
            &["dec"],
            ModifierFlags::NONE,
            "method",
            |b| vec![b.decorated_parameter(&["pdec"], "x", ModifierFlags::NONE, |_| NodeIndex::NONE)],
            |_| NodeIndex::NONE,
            |_| vec![],
        )]
    });
    b.finish("a.ts", vec![class])
}

#[test]
fn test_parameter_decorators_come_before_member_decorators() {
    let (mut arena, root) = decorated_member_class();
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &with_decorators(false), root);
    let squashed = squash(&text);
    assert!(squashed.contains("class C { method(x) {"), "{text}");
    assert!(
        squashed.contains("__decorate([__param(0, pdec), dec], C.prototype, \"method\", null);"),
        "{text}"
    );
    assert!(text.find("var __decorate").expect("decorate helper") < text.find("class C").expect("class"));
    assert!(text.contains("var __param"), "{text}");
    assert!(!text.contains("@"), "{text}");
}

#[test]
fn test_member_decorators_survive_es5_class_lowering() {
    let (mut arena, root) = decorated_member_class();
    let options = CompilerOptions {
        experimental_decorators: true,
        ..CompilerOptions::default().es5()
    };
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &options, root);
    let squashed = squash(&text);
    assert!(squashed.contains("C.prototype.method = function (x) {"), "{text}");
    assert!(
        squashed.contains("__decorate([__param(0, pdec), dec], C.prototype, \"method\", null);"),
        "{text}"
    );
}

#[test]
fn test_decorator_metadata_follows_the_decorators() {
    let source = "class C {\n    @dec\n    prop: string;\n    @dec\n    method(@pdec x: number): string { }\n}\n";
    let mut b = TreeBuilder::new(source);
    let class = b.class_declaration(ModifierFlags::NONE, "C", None, |b| {
        vec![
            b.decorated_property(
                &["dec"],
                ModifierFlags::NONE,
                "prop",
                |b| b.keyword_type(SyntaxKind::StringKeyword),
                |_| NodeIndex::NONE,
            ),
            b.decorated_method(
                &["dec"],
                ModifierFlags::NONE,
                "method",
                |b| {
                    vec![b.decorated_parameter(&["pdec"], "x", ModifierFlags::NONE, |b| {
                        b.keyword_type(SyntaxKind::NumberKeyword)
                    })]
                },
                |b| b.keyword_type(SyntaxKind::StringKeyword),
                |_| vec![],
            ),
        ]
    });
    let (mut arena, root) = b.finish("a.ts", vec![class]);
    let text = emit_js(&mut arena, &PrecomputedResolver::new(), &with_decorators(true), root);
    let squashed = squash(&text);

    let property = "__decorate([dec, __metadata(\"design:type\", String)], C.prototype, \"prop\", void 0);";
    let method = concat!(
        "__decorate([__param(0, pdec), dec, __metadata(\"design:type\", Function), ",
        "__metadata(\"design:paramtypes\", [Number]), __metadata(\"design:returntype\", String)], ",
        "C.prototype, \"method\", null);"
    );
    assert!(squashed.contains(property), "{text}");
    assert!(squashed.contains(method), "{text}");
    assert!(squashed.find(property) < squashed.find(method), "{text}");
    assert!(text.contains("var __metadata"), "{text}");
}

#[test]
fn test_decorated_class_referring_to_itself_uses_an_alias() {
    let mut b = TreeBuilder::new("@dec\nclass C {\n    static create() { return new C(); }\n}\n");
    let mut reference = NodeIndex::NONE;
    let class = b.decorated_class(&["dec"], ModifierFlags::NONE, "C", None, |b| {
        vec![b.decorated_method(
            &[],
            ModifierFlags::STATIC,
            "create",
            |_| vec![],
            |_| NodeIndex::NONE,
            |b| {
                vec![b.return_statement(|b| {
                    let created = b.new_expression("C");
                    if let NodeData::NewExpression { expression, .. } = b.arena.data(created).expect("data") {
                        reference = *expression;
                    }
                    created
                })]
            },
        )]
    });
    let (mut arena, root) = b.finish("a.ts", vec![class]);
    let mut resolver = PrecomputedResolver::new();
    resolver.add_check_flags(class, NodeCheckFlags::CLASS_WITH_CONSTRUCTOR_REFERENCE);
    resolver.add_check_flags(reference, NodeCheckFlags::CONSTRUCTOR_REFERENCE_IN_CLASS);
    resolver.value_declarations.insert(reference, class);

    let text = emit_js(&mut arena, &resolver, &with_decorators(false), root);
    let squashed = squash(&text);
    assert!(squashed.contains("var C_1;"), "{text}");
    assert!(squashed.contains("let C = C_1 = class C {"), "{text}");
    assert!(squashed.contains("static create() { return new C_1(); }"), "{text}");
    assert!(!squashed.contains("new C()"), "{text}");
    assert!(squashed.contains("C = C_1 = __decorate([dec], C);"), "{text}");
}
