//! Token and whitespace writing.

use super::Printer;
use tsemit_ast::{EmitFlags, NodeIndex};
use tsemit_common::{EmitResult, NO_POS};

impl<'a> Printer<'a> {
    pub(super) fn write(&mut self, text: &str) {
        self.writer.write(text);
    }

    pub(super) fn write_punctuation(&mut self, text: &str) {
        self.writer.write(text);
    }

    pub(super) fn write_keyword(&mut self, text: &str) {
        self.writer.write(text);
    }

    pub(super) fn write_operator(&mut self, text: &str) {
        self.writer.write(text);
    }

    pub(super) fn write_space(&mut self) {
        self.writer.write_space();
    }

    pub(super) fn write_line(&mut self) {
        self.writer.write_line();
    }

    pub(super) fn write_trailing_semicolon(&mut self) {
        self.writer.write(";");
    }

    pub(super) fn increase_indent(&mut self) {
        self.writer.increase_indent();
    }

    pub(super) fn decrease_indent(&mut self) {
        self.writer.decrease_indent();
    }

    /// A line break, or a space when `node` is flagged to print on one line.
    pub(super) fn write_line_or_space(&mut self, node: NodeIndex) {
        if self.arena.emit_flags(node).contains(EmitFlags::SINGLE_LINE) {
            self.write_space();
        } else {
            self.write_line();
        }
    }

    /// Start a new indented line when `indent` is set, else write `otherwise`.
    pub(super) fn increase_indent_if(&mut self, indent: bool, otherwise: Option<&str>) {
        if indent {
            self.increase_indent();
            self.writer.write_line();
        } else if let Some(text) = otherwise {
            self.writer.write(text);
        }
    }

    pub(super) fn decrease_indent_if(&mut self, first: bool, second: bool) {
        if first {
            self.decrease_indent();
        }
        if second {
            self.decrease_indent();
        }
    }

    /// Write `token` mapped to source position `pos`; returns the source
    /// position just past the token.
    pub(super) fn write_token_text(&mut self, token: &str, pos: u32) -> u32 {
        if pos == NO_POS {
            self.writer.write(token);
            return NO_POS;
        }
        self.emit_pos(pos);
        self.writer.write(token);
        let end = pos + token.len() as u32;
        self.emit_pos(end);
        end
    }

    /// Write `token` mapped to its source position, without comments.
    pub(super) fn write_token(&mut self, token: &str, pos: u32, context: NodeIndex) -> u32 {
        let flags = self.arena.emit_flags(context);
        if pos == NO_POS || flags.contains(EmitFlags::NO_SOURCE_MAP) {
            self.writer.write(token);
            return pos;
        }
        let pos = self.token_start(pos);
        self.write_token_text(token, pos)
    }

    /// Keyword-like leaf nodes (`this`, `null`, ...).
    pub(super) fn emit_keyword_token(&mut self, text: &str) -> EmitResult<()> {
        self.write_keyword(text);
        Ok(())
    }
}
