//! Identifiers and literals.
//!
//! Literals from the parse tree are copied from the source text so their
//! original spelling survives (`0xFF`, `'single'`, escapes). Synthesized
//! literals are printed from their value.

use super::Printer;
use std::fmt::Write as _;
use std::sync::Arc;
use tsemit_ast::utilities::get_text_of_node;
use tsemit_ast::{EmitFlags, NodeIndex};
use tsemit_common::EmitResult;

impl<'a> Printer<'a> {
    pub(super) fn emit_identifier(&mut self, node: NodeIndex) -> EmitResult<()> {
        let text = self.identifier_text_of(node)?;
        self.write(&text);
        Ok(())
    }

    /// Source text of `node` when it was parsed rather than synthesized.
    fn parsed_literal_text(&self, node: NodeIndex) -> Option<String> {
        let parsed = self.arena.get(node)?;
        if !parsed.is_parse_tree_node() {
            return None;
        }
        let source = Arc::clone(&self.source_text);
        let text = get_text_of_node(self.arena, &source, node);
        (!text.is_empty()).then(|| text.to_string())
    }

    pub(super) fn emit_numeric_literal(&mut self, node: NodeIndex, text: &str) -> EmitResult<()> {
        let text = self.parsed_literal_text(node).unwrap_or_else(|| text.to_string());
        self.write(&text);
        Ok(())
    }

    pub(super) fn emit_string_literal(&mut self, node: NodeIndex, text: &str, single_quote: bool) -> EmitResult<()> {
        let literal = match self.parsed_literal_text(node) {
            Some(source) => source,
            None => {
                let quote = if single_quote { '\'' } else { '"' };
                let ascii_only = !self.arena.emit_flags(node).contains(EmitFlags::NO_ASCII_ESCAPING);
                quote_string(text, quote, ascii_only)
            }
        };
        self.write(&literal);
        Ok(())
    }

    /// Regular expressions keep their text as written.
    pub(super) fn emit_literal_source_text(&mut self, node: NodeIndex, text: &str) -> EmitResult<()> {
        let text = self.parsed_literal_text(node).unwrap_or_else(|| text.to_string());
        self.write(&text);
        Ok(())
    }

    /// One piece of a template: `` `raw${ ``, `}raw${`, `` }raw` `` or `` `raw` ``.
    pub(super) fn emit_template_piece(&mut self, node: NodeIndex, open: &str, raw: &str, close: &str) -> EmitResult<()> {
        match self.parsed_literal_text(node) {
            Some(source) => self.write(&source),
            None => {
                self.write(open);
                self.write(raw);
                self.write(close);
            }
        }
        Ok(())
    }
}

/// Quote and escape `text` as a JavaScript string literal.
pub(crate) fn quote_string(text: &str, quote: char, ascii_only: bool) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\0' => {
                // `\0` followed by a digit would read as an octal escape.
                if chars.peek().is_some_and(char::is_ascii_digit) {
                    out.push_str("\\x00");
                } else {
                    out.push_str("\\0");
                }
            }
            '\t' => out.push_str("\\t"),
            '\u{000B}' => out.push_str("\\v"),
            '\u{000C}' => out.push_str("\\f"),
            '\u{0008}' => out.push_str("\\b"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '\u{0085}' => out.push_str("\\u0085"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c if ascii_only && !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::quote_string;

    #[test]
    fn escapes_control_and_quote_characters() {
        assert_eq!(quote_string("a\"b\n\tc\\", '"', true), r#""a\"b\n\tc\\""#);
        assert_eq!(quote_string("it's", '\'', true), r"'it\'s'");
        assert_eq!(quote_string("\u{1}", '"', true), r#""\u0001""#);
    }

    #[test]
    fn nul_before_digit_uses_hex_escape() {
        assert_eq!(quote_string("\u{0}1", '"', true), r#""\x001""#);
        assert_eq!(quote_string("\u{0}a", '"', true), r#""\0a""#);
    }

    #[test]
    fn non_ascii_is_escaped_per_utf16_unit() {
        assert_eq!(quote_string("\u{e9}", '"', true), r#""\u00E9""#);
        assert_eq!(quote_string("\u{1F600}", '"', true), r#""\uD83D\uDE00""#);
        assert_eq!(quote_string("\u{e9}", '"', false), "\"\u{e9}\"");
        assert_eq!(quote_string("\u{2028}", '"', false), r#""\u2028""#);
    }
}
