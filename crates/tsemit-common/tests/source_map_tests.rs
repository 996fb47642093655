use serde_json::Value;
use tsemit_common::source_map::{SourceMapGenerator, base64_encode, vlq};

#[test]
fn test_vlq_encode_positive() {
    assert_eq!(vlq::encode(0), "A");
    assert_eq!(vlq::encode(1), "C");
    assert_eq!(vlq::encode(15), "e");
    assert_eq!(vlq::encode(16), "gB");
}

#[test]
fn test_vlq_encode_negative() {
    assert_eq!(vlq::encode(-1), "D");
    assert_eq!(vlq::encode(-15), "f");
}

#[test]
fn test_vlq_decode() {
    assert_eq!(vlq::decode("A"), Some((0, 1)));
    assert_eq!(vlq::decode("gBC"), Some((16, 2)));
    assert_eq!(vlq::decode("D"), Some((-1, 1)));
    assert_eq!(vlq::decode("g"), None);
    assert_eq!(vlq::decode("!"), None);
}

#[test]
fn test_source_map_simple() {
    let mut generator = SourceMapGenerator::new("output.js".to_string());
    let source_idx = generator.add_source("input.ts".to_string());

    generator.add_simple_mapping(0, 0, source_idx, 0, 0);
    generator.add_simple_mapping(0, 10, source_idx, 0, 5);
    generator.add_simple_mapping(2, 0, source_idx, 1, 0);

    let json = generator.to_json();
    let map: Value = serde_json::from_str(&json).expect("parse source map");
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "output.js");
    assert_eq!(map["sources"][0], "input.ts");
    assert_eq!(map["mappings"], "AAAA,UAAK;;AACL");
    assert!(map.get("sourcesContent").is_none());
}

#[test]
fn test_source_map_with_content_and_names() {
    let mut generator = SourceMapGenerator::new("output.js".to_string());
    generator.add_source_with_content("input.ts".to_string(), "const x = 1;".to_string());
    let name = generator.add_name("x".to_string());
    assert_eq!(generator.add_name("x".to_string()), name);

    generator.add_named_mapping(0, 4, 0, 0, 6, name);

    let map: Value = serde_json::from_str(&generator.to_json()).expect("parse source map");
    assert_eq!(map["sourcesContent"][0], "const x = 1;");
    assert_eq!(map["names"][0], "x");
    assert_eq!(map["mappings"], "IAAMA");
}

#[test]
fn test_duplicate_generated_position_keeps_first_mapping() {
    let mut generator = SourceMapGenerator::new("out.js".to_string());
    generator.add_source("a.ts".to_string());
    generator.add_simple_mapping(0, 0, 0, 0, 0);
    generator.add_simple_mapping(0, 0, 0, 3, 3);
    assert_eq!(generator.mapping_count(), 1);
    assert_eq!(generator.serialize_mappings(), "AAAA");
}

#[test]
fn test_inline_source_map() {
    let mut generator = SourceMapGenerator::new("output.js".to_string());
    generator.add_source("input.ts".to_string());
    generator.add_simple_mapping(0, 0, 0, 0, 0);

    let inline = generator.to_inline_comment();
    assert!(inline.starts_with("//# sourceMappingURL=data:application/json;base64,"));
}

#[test]
fn test_base64_encode() {
    assert_eq!(base64_encode(b""), "");
    assert_eq!(base64_encode(b"f"), "Zg==");
    assert_eq!(base64_encode(b"fo"), "Zm8=");
    assert_eq!(base64_encode(b"foo"), "Zm9v");
    assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
}
