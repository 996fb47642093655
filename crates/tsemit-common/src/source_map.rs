//! Source map v3 generation.
//!
//! The printer reports (generated line/column -> original line/column) pairs
//! as it writes; this module accumulates them and serializes the map with
//! base64 VLQ encoded `mappings`.

use serde::Serialize;

/// Base64 VLQ encoding used by the `mappings` field.
pub mod vlq {
    const BASE64_CHARS: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    const VLQ_BASE_SHIFT: u32 = 5;
    const VLQ_BASE: i64 = 1 << VLQ_BASE_SHIFT;
    const VLQ_BASE_MASK: i64 = VLQ_BASE - 1;
    const VLQ_CONTINUATION_BIT: i64 = VLQ_BASE;

    pub fn encode(value: i64) -> String {
        let mut out = String::new();
        encode_into(&mut out, value);
        out
    }

    pub fn encode_into(out: &mut String, value: i64) {
        let mut vlq = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
        loop {
            let mut digit = vlq & VLQ_BASE_MASK;
            vlq >>= VLQ_BASE_SHIFT;
            if vlq > 0 {
                digit |= VLQ_CONTINUATION_BIT;
            }
            out.push(BASE64_CHARS[digit as usize] as char);
            if vlq == 0 {
                break;
            }
        }
    }

    fn base64_value(byte: u8) -> Option<i64> {
        let value = match byte {
            b'A'..=b'Z' => byte - b'A',
            b'a'..=b'z' => byte - b'a' + 26,
            b'0'..=b'9' => byte - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => return None,
        };
        Some(i64::from(value))
    }

    /// Decode one VLQ value, returning it with the number of bytes consumed.
    pub fn decode(input: &str) -> Option<(i64, usize)> {
        let mut result = 0i64;
        let mut shift = 0u32;
        for (index, byte) in input.bytes().enumerate() {
            let digit = base64_value(byte)?;
            result += (digit & VLQ_BASE_MASK) << shift;
            if digit & VLQ_CONTINUATION_BIT == 0 {
                let negative = result & 1 == 1;
                let magnitude = result >> 1;
                return Some((if negative { -magnitude } else { magnitude }, index + 1));
            }
            shift += VLQ_BASE_SHIFT;
            if shift > 60 {
                return None;
            }
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Mapping {
    generated_line: u32,
    generated_column: u32,
    source_index: u32,
    original_line: u32,
    original_column: u32,
    name_index: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap<'a> {
    version: u32,
    file: &'a str,
    source_root: &'a str,
    sources: &'a [String],
    names: &'a [String],
    mappings: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_content: Option<Vec<Option<&'a str>>>,
}

#[derive(Clone, Debug, Default)]
pub struct SourceMapGenerator {
    file: String,
    source_root: String,
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    mappings: Vec<Mapping>,
}

impl SourceMapGenerator {
    pub fn new(file: String) -> Self {
        SourceMapGenerator {
            file,
            ..Default::default()
        }
    }

    pub fn set_source_root(&mut self, root: impl Into<String>) {
        self.source_root = root.into();
    }

    /// Register a source file; registering the same path twice returns the same index.
    pub fn add_source(&mut self, path: String) -> u32 {
        if let Some(index) = self.sources.iter().position(|s| *s == path) {
            return index as u32;
        }
        self.sources.push(path);
        self.sources_content.push(None);
        (self.sources.len() - 1) as u32
    }

    pub fn add_source_with_content(&mut self, path: String, content: String) -> u32 {
        let index = self.add_source(path);
        self.sources_content[index as usize] = Some(content);
        index
    }

    pub fn add_name(&mut self, name: String) -> u32 {
        if let Some(index) = self.names.iter().position(|n| *n == name) {
            return index as u32;
        }
        self.names.push(name);
        (self.names.len() - 1) as u32
    }

    pub fn add_simple_mapping(
        &mut self,
        generated_line: u32,
        generated_column: u32,
        source_index: u32,
        original_line: u32,
        original_column: u32,
    ) {
        self.add_mapping(
            generated_line,
            generated_column,
            source_index,
            original_line,
            original_column,
            None,
        );
    }

    pub fn add_named_mapping(
        &mut self,
        generated_line: u32,
        generated_column: u32,
        source_index: u32,
        original_line: u32,
        original_column: u32,
        name_index: u32,
    ) {
        self.add_mapping(
            generated_line,
            generated_column,
            source_index,
            original_line,
            original_column,
            Some(name_index),
        );
    }

    /// Record a mapping. A second mapping at an already mapped generated
    /// position is dropped unless it adds a name.
    pub fn add_mapping(
        &mut self,
        generated_line: u32,
        generated_column: u32,
        source_index: u32,
        original_line: u32,
        original_column: u32,
        name_index: Option<u32>,
    ) {
        let mapping = Mapping {
            generated_line,
            generated_column,
            source_index,
            original_line,
            original_column,
            name_index,
        };
        if let Some(last) = self.mappings.last_mut() {
            if last.generated_line == generated_line && last.generated_column == generated_column {
                if last.name_index.is_none() && name_index.is_some() {
                    *last = mapping;
                }
                return;
            }
        }
        self.mappings.push(mapping);
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn serialize_mappings(&self) -> String {
        let mut out = String::new();
        let mut line = 0u32;
        let mut prev_column = 0i64;
        let mut prev_source = 0i64;
        let mut prev_original_line = 0i64;
        let mut prev_original_column = 0i64;
        let mut prev_name = 0i64;
        let mut first_in_line = true;

        for mapping in &self.mappings {
            while line < mapping.generated_line {
                out.push(';');
                line += 1;
                prev_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                out.push(',');
            }
            first_in_line = false;

            let column = i64::from(mapping.generated_column);
            vlq::encode_into(&mut out, column - prev_column);
            prev_column = column;

            let source = i64::from(mapping.source_index);
            vlq::encode_into(&mut out, source - prev_source);
            prev_source = source;

            let original_line = i64::from(mapping.original_line);
            vlq::encode_into(&mut out, original_line - prev_original_line);
            prev_original_line = original_line;

            let original_column = i64::from(mapping.original_column);
            vlq::encode_into(&mut out, original_column - prev_original_column);
            prev_original_column = original_column;

            if let Some(name) = mapping.name_index {
                let name = i64::from(name);
                vlq::encode_into(&mut out, name - prev_name);
                prev_name = name;
            }
        }
        out
    }

    pub fn to_json(&self) -> String {
        let has_content = self.sources_content.iter().any(Option::is_some);
        let raw = RawSourceMap {
            version: 3,
            file: &self.file,
            source_root: &self.source_root,
            sources: &self.sources,
            names: &self.names,
            mappings: self.serialize_mappings(),
            sources_content: has_content
                .then(|| self.sources_content.iter().map(Option::as_deref).collect()),
        };
        // Serializing plain strings and numbers cannot fail.
        serde_json::to_string(&raw).unwrap_or_default()
    }

    pub fn to_inline_comment(&self) -> String {
        format!(
            "//# sourceMappingURL=data:application/json;base64,{}",
            base64_encode(self.to_json().as_bytes())
        )
    }
}

pub fn base64_encode(input: &[u8]) -> String {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity(input.len().div_ceil(3) * 4);
    for chunk in input.chunks(3) {
        let b0 = u32::from(chunk[0]);
        let b1 = u32::from(chunk.get(1).copied().unwrap_or(0));
        let b2 = u32::from(chunk.get(2).copied().unwrap_or(0));
        let triple = (b0 << 16) | (b1 << 8) | b2;
        out.push(TABLE[(triple >> 18) as usize & 63] as char);
        out.push(TABLE[(triple >> 12) as usize & 63] as char);
        if chunk.len() > 1 {
            out.push(TABLE[(triple >> 6) as usize & 63] as char);
        } else {
            out.push('=');
        }
        if chunk.len() > 2 {
            out.push(TABLE[triple as usize & 63] as char);
        } else {
            out.push('=');
        }
    }
    out
}
