//! The emit driver: output paths, source map files and trailers,
//! declaration output, bundles and host failures.

mod common;

use common::TreeBuilder;
use serde_json::Value;
use std::path::Path;
use tsemit_ast::{ModifierFlags, NodeArena, NodeFlags, NodeIndex, SyntaxKind};
use tsemit_common::{CompilerOptions, EmitError, ScriptTarget};
use tsemit_emitter::{
    EmitHost, InMemoryHost, NoVisibilityDiagnostics, PrecomputedResolver, VisibilityDiagnostic, emit_files,
    get_output_paths,
};

/// `let a = 1;` in a file of the given name, appended to `arena`.
fn simple_file(arena: NodeArena, file_name: &str, name: &str) -> (NodeArena, NodeIndex) {
    let text = format!("let {name} = 1;\n");
    let mut b = TreeBuilder::with_arena(arena, &text);
    let statement =
        b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, name, |_| NodeIndex::NONE, |b| b.number("1"));
    b.finish(file_name, vec![statement])
}

fn es2015() -> CompilerOptions {
    tsemit_common::tracing_config::init_tracing();
    CompilerOptions::default().with_target(ScriptTarget::ES2015)
}

#[test]
fn test_source_map_file_and_trailer() {
    let (mut arena, root) = simple_file(NodeArena::new(), "src/a.ts", "a");
    let options = CompilerOptions {
        source_map: true,
        ..es2015()
    };
    let mut host = InMemoryHost::new();
    let output = emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &options,
        &[root],
        &mut host,
    );
    assert!(!output.emit_skipped(), "{:?}", output.errors);
    assert_eq!(output.emitted_files, vec!["src/a.js.map", "src/a.js"]);

    let js = host.get("src/a.js").expect("js output");
    assert!(js.starts_with("let a = 1;"), "{js}");
    assert!(js.ends_with("//# sourceMappingURL=a.js.map"), "{js}");

    let map: Value = serde_json::from_str(host.get("src/a.js.map").expect("map output")).expect("map json");
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "a.js");
    assert_eq!(map["sources"][0], "a.ts");
    assert!(!map["mappings"].as_str().unwrap_or_default().is_empty());
}

#[test]
fn test_map_root_prefixes_the_trailer_url() {
    let (mut arena, root) = simple_file(NodeArena::new(), "a.ts", "a");
    let options = CompilerOptions {
        source_map: true,
        map_root: Some("https://example.com/maps/".to_string()),
        ..es2015()
    };
    let mut host = InMemoryHost::new();
    emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &options,
        &[root],
        &mut host,
    );
    let js = host.get("a.js").expect("js output");
    assert!(js.ends_with("//# sourceMappingURL=https://example.com/maps/a.js.map"), "{js}");
}

#[test]
fn test_inline_source_map_writes_no_map_file() {
    let (mut arena, root) = simple_file(NodeArena::new(), "a.ts", "a");
    let options = CompilerOptions {
        source_map: true,
        inline_source_map: true,
        ..es2015()
    };
    let mut host = InMemoryHost::new();
    let output = emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &options,
        &[root],
        &mut host,
    );
    assert_eq!(output.emitted_files, vec!["a.js"]);
    let js = host.get("a.js").expect("js output");
    assert!(js.contains("//# sourceMappingURL=data:application/json;base64,"), "{js}");
}

/// `export function f(x: number): number { return x; }` followed by a
/// non-exported `let hidden = 1;`.
fn module_file() -> (NodeArena, NodeIndex, NodeIndex) {
    let mut b = TreeBuilder::new("export function f(x: number): number { return x; }\nlet hidden = 1;\n");
    let f = b.function_declaration(
        ModifierFlags::EXPORT,
        "f",
        |b| vec![b.parameter("x", |b| b.keyword_type(SyntaxKind::NumberKeyword))],
        |b| b.keyword_type(SyntaxKind::NumberKeyword),
        |b| vec![b.return_statement(|b| b.ident("x"))],
    );
    let hidden = b.variable_statement(NodeFlags::LET, ModifierFlags::NONE, "hidden", |_| NodeIndex::NONE, |b| {
        b.number("1")
    });
    let (arena, root) = b.finish("m.ts", vec![f, hidden]);
    (arena, root, f)
}

#[test]
fn test_declaration_output_keeps_exported_signatures() {
    let (mut arena, root, _) = module_file();
    let options = CompilerOptions {
        declaration: true,
        ..es2015()
    };
    let mut host = InMemoryHost::new();
    let output = emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &options,
        &[root],
        &mut host,
    );
    assert!(!output.emit_skipped(), "{:?}", output.errors);
    assert_eq!(output.emitted_files, vec!["m.d.ts", "m.js"]);

    let dts = host.get("m.d.ts").expect("declaration output");
    assert_eq!(dts.trim(), "export declare function f(x: number): number;");
    let js = host.get("m.js").expect("js output");
    assert!(js.contains("export function f(x) {"), "{js}");
    assert!(js.contains("let hidden = 1;"), "{js}");
}

#[test]
fn test_visibility_diagnostics_are_reported_without_stopping_emit() {
    let (mut arena, root, f) = module_file();
    let options = CompilerOptions {
        declaration: true,
        ..es2015()
    };
    let provider = move |_: &NodeArena, node: NodeIndex| {
        (node == f).then(|| VisibilityDiagnostic {
            message: "Return type of exported function has or is using private name '{0}'.".to_string(),
            code: 4060,
            error_node: f,
            type_name: Some("Secret".to_string()),
        })
    };
    let mut host = InMemoryHost::new();
    let output = emit_files(&mut arena, &PrecomputedResolver::new(), &provider, &options, &[root], &mut host);

    assert_eq!(output.diagnostics.len(), 1);
    let diagnostic = &output.diagnostics[0];
    assert_eq!(diagnostic.code, 4060);
    assert_eq!(diagnostic.file, "m.ts");
    assert_eq!(
        diagnostic.message_text,
        "Return type of exported function has or is using private name 'Secret'."
    );
    assert_eq!(diagnostic.start, 0);
    assert!(host.get("m.d.ts").is_some());
    assert!(host.get("m.js").is_some());
}

#[test]
fn test_script_declarations_take_resolver_types() {
    let (mut arena, root) = simple_file(NodeArena::new(), "s.ts", "a");
    let mut resolver = PrecomputedResolver::new();
    let declaration = {
        let statement = arena.source_file(root).expect("file").statements.nodes[0];
        let tsemit_ast::NodeData::VariableStatement { declaration_list } = arena.data(statement).expect("data").clone()
        else {
            panic!("expected a variable statement");
        };
        let tsemit_ast::NodeData::VariableDeclarationList { declarations } =
            arena.data(declaration_list).expect("data").clone()
        else {
            panic!("expected a declaration list");
        };
        declarations.nodes[0]
    };
    resolver.declaration_types.insert(declaration, "number".to_string());
    let options = CompilerOptions {
        declaration: true,
        ..es2015()
    };
    let mut host = InMemoryHost::new();
    emit_files(&mut arena, &resolver, &NoVisibilityDiagnostics, &options, &[root], &mut host);
    assert_eq!(host.get("s.d.ts").map(str::trim), Some("declare let a: number;"));
}

#[test]
fn test_out_file_bundles_every_file_in_order() {
    let (arena, first) = simple_file(NodeArena::new(), "a.ts", "a");
    let (mut arena, second) = simple_file(arena, "b.ts", "b");
    let options = CompilerOptions {
        out_file: Some("out/bundle.js".to_string()),
        ..es2015()
    };
    let mut host = InMemoryHost::new();
    let output = emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &options,
        &[first, second],
        &mut host,
    );
    assert_eq!(output.emitted_files, vec!["out/bundle.js"]);
    let lines: Vec<&str> = host
        .get("out/bundle.js")
        .expect("bundle")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    assert_eq!(lines, vec!["let a = 1;", "let b = 1;"]);
}

/// Fails every write whose path ends with `failing`.
struct FlakyHost {
    failing: &'static str,
    inner: InMemoryHost,
}

impl EmitHost for FlakyHost {
    fn write_file(&mut self, path: &str, text: &str, source_files: &[NodeIndex]) -> std::io::Result<()> {
        if path.ends_with(self.failing) {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.inner.write_file(path, text, source_files)
    }
}

#[test]
fn test_failed_write_is_reported_and_other_files_still_emit() {
    let (arena, first) = simple_file(NodeArena::new(), "a.ts", "a");
    let (mut arena, second) = simple_file(arena, "b.ts", "b");
    let mut host = FlakyHost {
        failing: "a.js",
        inner: InMemoryHost::new(),
    };
    let output = emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &es2015(),
        &[first, second],
        &mut host,
    );
    assert!(output.emit_skipped());
    assert_eq!(output.errors.len(), 1);
    let (file, err) = &output.errors[0];
    assert_eq!(file, "a.ts");
    assert!(matches!(err, EmitError::WriteFile { path, .. } if path == "a.js"), "{err}");
    assert!(!err.is_internal());
    assert_eq!(output.emitted_files, vec!["b.js"]);
    assert_eq!(host.inner.get("b.js").map(str::trim), Some("let b = 1;"));
}

#[test]
fn test_out_dir_output_paths_mirror_sources() {
    let options = CompilerOptions::from_json(r#"{ "outDir": "dist", "sourceMap": true, "declaration": true }"#)
        .expect("valid options");
    let paths = get_output_paths("src/nested/x.ts", &options, Path::new("src"));
    assert_eq!(paths.js, "dist/nested/x.js");
    assert_eq!(paths.source_map.as_deref(), Some("dist/nested/x.js.map"));
    assert_eq!(paths.declaration.as_deref(), Some("dist/nested/x.d.ts"));
    assert_eq!(paths.declaration_map, None);
}

#[test]
fn test_disk_host_writes_below_its_root() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut arena, root) = simple_file(NodeArena::new(), "src/a.ts", "a");
    let options = CompilerOptions {
        out_dir: Some("dist".to_string()),
        ..es2015()
    };
    let mut host = tsemit_emitter::DiskHost::new(dir.path());
    let output = emit_files(
        &mut arena,
        &PrecomputedResolver::new(),
        &NoVisibilityDiagnostics,
        &options,
        &[root],
        &mut host,
    );
    assert_eq!(output.emitted_files, vec!["dist/a.js"]);
    let written = std::fs::read_to_string(dir.path().join("dist/a.js")).expect("written file");
    assert_eq!(written.trim(), "let a = 1;");
}

#[test]
fn test_options_parse_from_tsconfig_json() {
    let options = CompilerOptions::from_json(
        r#"{ "target": "ES2015", "removeComments": true, "outFile": "out.js", "newLine": "crlf" }"#,
    )
    .expect("valid options");
    assert_eq!(options.target, ScriptTarget::ES2015);
    assert!(options.remove_comments);
    assert_eq!(options.out_file.as_deref(), Some("out.js"));
    assert_eq!(options.new_line, tsemit_common::NewLineKind::CarriageReturnLineFeed);
    assert!(CompilerOptions::from_json(r#"{ "target": "es1999" }"#).is_err());
}
