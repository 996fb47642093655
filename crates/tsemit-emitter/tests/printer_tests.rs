//! Printer tests: comments, generated names, parenthesization, source maps,
//! hooks and helper placement.

mod common;

use common::TreeBuilder;
use serde_json::Value;
use tsemit_ast::{ModifierFlags, NodeArena, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::{CompilerOptions, EmitResult};
use tsemit_emitter::helpers::EXTENDS_HELPER;
use tsemit_emitter::transforms::visitor::update_statements;
use tsemit_emitter::{
    EmitHint, EmitHook, EmitHooks, HookContext, PrecomputedResolver, Printer, TransformOutput, print_file,
};

fn lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// `let a = 1;\n// keep me\nlet b = a + 2;\n`
fn two_lets() -> (NodeArena, NodeIndex) {
    let mut b = TreeBuilder::new("let a = 1;\n// keep me\nlet b = a + 2;\n");
    let first = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "a", |_| NodeIndex::NONE, |b| b.number("1"));
    let second = b.variable_statement(
        NodeFlags::LET,
        ModifierFlags::NONE,
        "b",
        |_| NodeIndex::NONE,
        |b| {
            let a = b.ident("a");
            b.binary(a, SyntaxKind::PlusToken, |b| b.number("2"))
        },
    );
    b.finish("a.ts", vec![first, second])
}

#[test]
fn test_prints_statements_with_leading_comment() {
    let (mut arena, root) = two_lets();
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let text = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    assert_eq!(lines(&text), vec!["let a = 1;", "// keep me", "let b = a + 2;"]);
}

#[test]
fn test_remove_comments_drops_source_comments() {
    let (mut arena, root) = two_lets();
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions {
        remove_comments: true,
        ..CompilerOptions::default()
    };
    let text = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    assert!(!text.contains("keep me"), "{text}");
    assert_eq!(lines(&text), vec!["let a = 1;", "let b = a + 2;"]);
}

#[test]
fn test_print_file_rejects_non_file_root() {
    let mut arena = NodeArena::new();
    let x = arena.create_identifier("x");
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let err = print_file(&mut arena, &resolver, &options, x, TransformOutput::default()).unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn test_temp_names_skip_names_used_in_file() {
    let mut b = TreeBuilder::new("var _a = 1;\n");
    let existing = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "_a", |_| NodeIndex::NONE, |b| b.number("1"));
    let (mut arena, root) = b.finish("a.ts", vec![existing]);

    let temp = arena.create_temp_variable();
    let loop_var = arena.create_loop_variable();
    let reference = arena.create_identifier("_a");
    let first = arena.create_variable_declaration(temp, reference);
    let zero = arena.create_number(0.0);
    let second = arena.create_variable_declaration(loop_var, zero);
    let statement = arena.create_variable_statement(vec![first, second]);
    let root = update_statements(&mut arena, root, vec![existing, statement]).expect("update");

    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let text = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    assert_eq!(lines(&text), vec!["var _a = 1;", "var _b = _a, _i = 0;"]);
}

#[test]
fn test_same_generated_name_prints_same_text() {
    let (mut arena, root) = TreeBuilder::new("").finish("a.ts", vec![]);
    let temp = arena.create_temp_variable();
    let declaration = arena.create_variable_declaration(temp, NodeIndex::NONE);
    let statement = arena.create_variable_statement(vec![declaration]);
    let reference = arena.get_synthesized_clone(temp).expect("clone");
    let one = arena.create_number(1.0);
    let assignment = arena.create_assignment(reference, one);
    let use_statement = arena.create_expression_statement(assignment);
    let root = update_statements(&mut arena, root, vec![statement, use_statement]).expect("update");

    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let text = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    assert_eq!(lines(&text), vec!["var _a;", "_a = 1;"]);
}

#[test]
fn test_printing_twice_gives_identical_text() {
    let mut b = TreeBuilder::new("var _a = 1;\n");
    let existing = b.variable_statement(NodeFlags::NONE, ModifierFlags::NONE, "_a", |_| NodeIndex::NONE, |b| b.number("1"));
    let (mut arena, root) = b.finish("a.ts", vec![existing]);
    let declarations = (0..3)
        .map(|_| {
            let temp = arena.create_temp_variable();
            arena.create_variable_declaration(temp, NodeIndex::NONE)
        })
        .collect();
    let statement = arena.create_variable_statement(declarations);
    let root = update_statements(&mut arena, root, vec![existing, statement]).expect("update");

    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let first = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    let second = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    assert_eq!(first, second);
    assert_eq!(lines(&first), vec!["var _a = 1;", "var _b, _c, _d;"]);
}

#[test]
fn test_write_node_parenthesizes_synthesized_operands() {
    let (mut arena, root) = TreeBuilder::new("").finish("a.ts", vec![]);
    let f = arena.create_identifier("f");
    let call = arena.create_call(f, vec![]);
    let new = arena.create_new(call, Some(vec![]));
    let a = arena.create_identifier("a");
    let b = arena.create_identifier("b");
    let sum = arena.create_add(a, b);
    let c = arena.create_identifier("c");
    let product = arena.create_binary(sum, SyntaxKind::AsteriskToken, c);

    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let mut printer = Printer::new(&mut arena, &resolver, &options);
    printer.write_node(EmitHint::Expression, new, root).expect("print new");
    assert_eq!(printer.text(), "new (f())()");

    printer.reset();
    printer.write_node(EmitHint::Expression, product, root).expect("print product");
    assert_eq!(printer.text(), "(a + b) * c");
}

#[test]
fn test_string_literals_are_escaped() {
    let (mut arena, root) = TreeBuilder::new("").finish("a.ts", vec![]);
    let literal = arena.create_string_literal("say \"hi\"\n");
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let mut printer = Printer::new(&mut arena, &resolver, &options);
    printer.write_node(EmitHint::Expression, literal, root).expect("print");
    assert_eq!(printer.text(), "\"say \\\"hi\\\"\\n\"");
}

#[test]
fn test_source_map_has_sources_and_names() {
    let (mut arena, root) = two_lets();
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions {
        source_map: true,
        ..CompilerOptions::default()
    };
    let mut printer = Printer::new(&mut arena, &resolver, &options);
    printer.enable_source_map("a.js", "");
    printer.write_file(root, TransformOutput::default()).expect("print");
    let output = printer.finish();
    let map = output.source_map.expect("source map enabled");
    assert!(map.mapping_count() > 0);

    let json: Value = serde_json::from_str(&map.to_json()).expect("valid json");
    assert_eq!(json["file"], "a.js");
    assert_eq!(json["sources"][0], "a.ts");
    let names: Vec<&str> = json["names"].as_array().expect("names").iter().filter_map(Value::as_str).collect();
    assert!(names.contains(&"a"), "{names:?}");
    assert!(names.contains(&"b"), "{names:?}");
}

#[test]
fn test_synthesized_nodes_get_no_mappings() {
    let (mut arena, root) = TreeBuilder::new("").finish("a.ts", vec![]);
    let x = arena.create_identifier("x");
    let statement = arena.create_expression_statement(x);
    let root = update_statements(&mut arena, root, vec![statement]).expect("update");

    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let mut printer = Printer::new(&mut arena, &resolver, &options);
    printer.enable_source_map("a.js", "");
    printer.write_file(root, TransformOutput::default()).expect("print");
    let output = printer.finish();
    assert_eq!(output.text.trim(), "x;");
    assert_eq!(output.source_map.expect("map").mapping_count(), 0);
}

/// Renames every identifier `from` to `to`.
struct Rename {
    from: &'static str,
    to: &'static str,
}

impl EmitHook for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn substitute_node(&mut self, cx: &mut HookContext<'_>, _hint: EmitHint, node: NodeIndex) -> EmitResult<NodeIndex> {
        if cx.arena.identifier_text(node) == self.from {
            return Ok(cx.arena.create_identifier(self.to));
        }
        Ok(node)
    }
}

#[test]
fn test_substitution_hooks_fold_in_registration_order() {
    let (mut arena, root) = two_lets();
    let mut hooks = EmitHooks::new();
    hooks.register(Box::new(Rename { from: "a", to: "x" }));
    hooks.register(Box::new(Rename { from: "x", to: "y" }));
    hooks.enable_substitution(SyntaxKind::Identifier);

    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let mut printer = Printer::new(&mut arena, &resolver, &options);
    printer.set_source_file(root).expect("source file");
    printer.set_hooks(hooks);
    printer.write_node(EmitHint::SourceFile, root, NodeIndex::NONE).expect("print");
    let text = printer.finish().text;
    assert!(text.contains("let y = 1;"), "{text}");
    assert!(text.contains("let b = y + 2;"), "{text}");
}

#[test]
fn test_bundle_writes_shared_helper_once() {
    let mut first = TreeBuilder::new("class A {}\n");
    let class_a = first.class_declaration(ModifierFlags::NONE, "A", None, |_| vec![]);
    let (arena, root_a) = first.finish("a.ts", vec![class_a]);
    let mut second = TreeBuilder::with_arena(arena, "class B {}\n");
    let class_b = second.class_declaration(ModifierFlags::NONE, "B", None, |_| vec![]);
    let (mut arena, root_b) = second.finish("b.ts", vec![class_b]);

    let with_helper = || TransformOutput {
        helpers: vec![&EXTENDS_HELPER],
        ..TransformOutput::default()
    };
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let mut printer = Printer::new(&mut arena, &resolver, &options);
    printer
        .write_bundle(vec![(root_a, with_helper()), (root_b, with_helper())])
        .expect("print bundle");
    let text = printer.finish().text;
    assert_eq!(text.matches("var __extends").count(), 1, "{text}");
    let helper_at = text.find("var __extends").expect("helper");
    assert!(helper_at < text.find("class A").expect("class A"));
    assert!(text.find("class A").expect("class A") < text.find("class B").expect("class B"));
}

#[test]
fn test_no_emit_helpers_suppresses_helper_text() {
    let mut b = TreeBuilder::new("class A {}\n");
    let class_a = b.class_declaration(ModifierFlags::NONE, "A", None, |_| vec![]);
    let (mut arena, root) = b.finish("a.ts", vec![class_a]);
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions {
        no_emit_helpers: true,
        ..CompilerOptions::default()
    };
    let output = TransformOutput {
        helpers: vec![&EXTENDS_HELPER],
        ..TransformOutput::default()
    };
    let text = print_file(&mut arena, &resolver, &options, root, output).expect("print");
    assert!(!text.contains("__extends"), "{text}");
    assert!(text.contains("class A {"), "{text}");
}

#[test]
fn test_class_with_heritage_and_empty_body() {
    let mut b = TreeBuilder::new("class B extends A {}\n");
    let class_b = b.class_declaration(ModifierFlags::NONE, "B", Some("A"), |_| vec![]);
    let (mut arena, root) = b.finish("a.ts", vec![class_b]);
    let resolver = PrecomputedResolver::new();
    let options = CompilerOptions::default();
    let text = print_file(&mut arena, &resolver, &options, root, TransformOutput::default()).expect("print");
    assert_eq!(lines(&text), vec!["class B extends A {", "}"]);
}
