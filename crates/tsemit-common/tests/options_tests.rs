use tsemit_common::{CompilerOptions, ConfigError, NewLineKind, ScriptTarget};

#[test]
fn reads_nested_compiler_options() {
    let options = CompilerOptions::from_json(
        r#"{
            "compilerOptions": {
                "target": "ES5",
                "sourceMap": true,
                "experimentalDecorators": true,
                "newLine": "crlf",
                "strict": true
            },
            "include": ["src"]
        }"#,
    )
    .expect("valid options");
    assert_eq!(options.target, ScriptTarget::ES5);
    assert!(options.source_map);
    assert!(options.experimental_decorators);
    assert_eq!(options.new_line, NewLineKind::CarriageReturnLineFeed);
    assert!(!options.declaration);
}

#[test]
fn reads_bare_options_object() {
    let options = CompilerOptions::from_json(r#"{"target": "es2015", "outFile": "out.js"}"#)
        .expect("valid options");
    assert_eq!(options.target, ScriptTarget::ES2015);
    assert_eq!(options.out_file.as_deref(), Some("out.js"));
}

#[test]
fn rejects_bad_target() {
    let err = CompilerOptions::from_json(r#"{"target": "es1"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)), "{err}");
    assert!(err.to_string().contains("unknown target"));
}

#[test]
fn rejects_non_object_compiler_options() {
    let err = CompilerOptions::from_json(r#"{"compilerOptions": 3}"#).unwrap_err();
    assert!(matches!(err, ConfigError::NotAnObject));
}
