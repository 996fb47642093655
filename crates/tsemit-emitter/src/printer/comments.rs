//! Comment emission.
//!
//! Source comments are rescanned from the text around each node's comment
//! range. A container position/end pair tracks the node being printed so a
//! child that starts (or ends) at the same position as its parent does not
//! print the same comments twice.

use super::Printer;
use crate::hooks::EmitHint;
use std::sync::Arc;
use tsemit_ast::{EmitFlags, NodeIndex, SyntaxKind, SynthesizedComment, TextRange};
use tsemit_common::comments::{get_leading_comment_ranges, get_trailing_comment_ranges, reindent_multi_line_comment};
use tsemit_common::{CommentKind, CommentRange, EmitResult, NO_POS};

#[derive(Clone, Copy, Debug)]
struct DetachedCommentInfo {
    node_pos: u32,
    detached_comment_end_pos: u32,
}

#[derive(Debug)]
pub(super) struct CommentState {
    /// No comments at all, except pinned comments at the top of a file.
    disabled: bool,
    container_pos: u32,
    container_end: u32,
    declaration_list_container_end: u32,
    has_written_comment: bool,
    detached: Vec<DetachedCommentInfo>,
}

impl CommentState {
    pub(super) fn new(remove_comments: bool) -> Self {
        CommentState {
            disabled: remove_comments,
            container_pos: NO_POS,
            container_end: NO_POS,
            declaration_list_container_end: NO_POS,
            has_written_comment: false,
            detached: Vec::new(),
        }
    }

    pub(super) fn reset_for_file(&mut self) {
        self.container_pos = NO_POS;
        self.container_end = NO_POS;
        self.declaration_list_container_end = NO_POS;
        self.has_written_comment = false;
        self.detached.clear();
    }
}

impl<'a> Printer<'a> {
    pub(super) fn print_with_comments(&mut self, hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        if hint == EmitHint::SourceFile {
            return self.emit_node(hint, node);
        }
        if self.comments.disabled {
            return self.print_with_source_map(hint, node);
        }

        let TextRange { pos, end } = self.arena.comment_range(node);
        let flags = self.arena.emit_flags(node);
        let kind = self.arena.kind(node);
        let is_emitted = kind != Some(SyntaxKind::NotEmittedStatement);
        let skip_leading = pos == NO_POS || flags.contains(EmitFlags::NO_LEADING_COMMENTS);
        let skip_trailing = end == NO_POS || flags.contains(EmitFlags::NO_TRAILING_COMMENTS);

        if !skip_leading {
            self.emit_leading_comments(pos, is_emitted);
        }

        let saved = (
            self.comments.container_pos,
            self.comments.container_end,
            self.comments.declaration_list_container_end,
        );
        // An explicit NO_LEADING/NO_TRAILING still claims the position for
        // the children.
        if pos != NO_POS {
            self.comments.container_pos = pos;
        }
        if end != NO_POS {
            self.comments.container_end = end;
            if kind == Some(SyntaxKind::VariableDeclarationList) {
                self.comments.declaration_list_container_end = end;
            }
        }

        self.emit_synthesized_leading_comments(node);
        let result = if flags.contains(EmitFlags::NO_NESTED_COMMENTS) {
            self.comments.disabled = true;
            let result = self.print_with_source_map(hint, node);
            self.comments.disabled = false;
            result
        } else {
            self.print_with_source_map(hint, node)
        };
        self.emit_synthesized_trailing_comments(node);

        (
            self.comments.container_pos,
            self.comments.container_end,
            self.comments.declaration_list_container_end,
        ) = saved;

        if !skip_trailing {
            self.emit_trailing_comments(end);
        }
        result
    }

    // =========================================================================
    // Source comments
    // =========================================================================

    fn emit_leading_comments(&mut self, pos: u32, is_emitted: bool) {
        self.comments.has_written_comment = false;
        if is_emitted {
            self.for_each_leading_comment(pos, false);
        } else if pos == 0 {
            // A removed first statement still carries the file's
            // `/// <reference />` directives.
            self.for_each_leading_comment(pos, true);
        }
    }

    fn for_each_leading_comment(&mut self, pos: u32, triple_slash_only: bool) {
        if self.comments.container_pos != NO_POS && pos == self.comments.container_pos {
            return;
        }
        let scan_pos = match self.comments.detached.last() {
            Some(info) if info.node_pos == pos => {
                let end = info.detached_comment_end_pos;
                self.comments.detached.pop();
                end
            }
            _ => pos,
        };
        let text = Arc::clone(&self.source_text);
        for comment in get_leading_comment_ranges(&text, scan_pos) {
            if triple_slash_only && !comment.is_triple_slash_directive(&text) {
                continue;
            }
            self.emit_leading_comment(&comment, pos);
        }
    }

    fn emit_leading_comment(&mut self, comment: &CommentRange, range_pos: u32) {
        if !self.comments.has_written_comment {
            if range_pos != comment.pos && self.line_of(range_pos) != self.line_of(comment.pos) {
                self.writer.write_line();
            }
            self.comments.has_written_comment = true;
        }
        self.write_comment(comment);
        if comment.has_trailing_new_line {
            self.writer.write_line();
        } else if comment.kind == CommentKind::MultiLine {
            self.writer.write_space();
        }
    }

    fn emit_trailing_comments(&mut self, pos: u32) {
        let state = &self.comments;
        if state.container_end != NO_POS
            && (pos == state.container_end || pos == state.declaration_list_container_end)
        {
            return;
        }
        let text = Arc::clone(&self.source_text);
        for comment in get_trailing_comment_ranges(&text, pos) {
            self.emit_trailing_comment(&comment);
        }
    }

    fn emit_trailing_comment(&mut self, comment: &CommentRange) {
        if !self.writer.is_at_start_of_line() {
            self.writer.write_space();
        }
        self.write_comment(comment);
        if comment.has_trailing_new_line {
            self.writer.write_line();
        }
    }

    /// Comments following a token (rather than a node) at `pos`.
    pub(super) fn emit_trailing_comments_of_position(&mut self, pos: u32, prefix_space: bool) {
        if self.comments.disabled || pos == NO_POS {
            return;
        }
        let text = Arc::clone(&self.source_text);
        for comment in get_trailing_comment_ranges(&text, pos) {
            if prefix_space {
                self.emit_trailing_comment(&comment);
            } else {
                self.write_comment(&comment);
                if comment.has_trailing_new_line {
                    self.writer.write_line();
                } else {
                    self.writer.write_space();
                }
            }
        }
    }

    pub(super) fn emit_leading_comments_of_position(&mut self, pos: u32) {
        if self.comments.disabled || pos == NO_POS {
            return;
        }
        self.emit_leading_comments(pos, true);
    }

    fn write_comment(&mut self, comment: &CommentRange) {
        self.emit_pos(comment.pos);
        let text = Arc::clone(&self.source_text);
        let comment_text = comment.text(&text);
        match comment.kind {
            CommentKind::SingleLine => self.writer.write(comment_text),
            CommentKind::MultiLine => {
                let line_start = self.line_map.line_start(self.line_of(comment.pos));
                let column = comment.pos.saturating_sub(line_start) as usize;
                let mut reindented = reindent_multi_line_comment(comment_text, column, &self.writer.indent_text());
                if self.writer.new_line() != "\n" {
                    reindented = reindented.replace('\n', self.writer.new_line());
                }
                self.writer.write_raw(&reindented);
            }
        }
        self.emit_pos(comment.end);
    }

    // =========================================================================
    // Synthesized comments
    // =========================================================================

    fn emit_synthesized_leading_comments(&mut self, node: NodeIndex) {
        let comments = self.arena.synthetic_leading_comments(node).to_vec();
        for comment in &comments {
            if comment.kind == CommentKind::SingleLine {
                self.writer.write_line();
            }
            self.write_synthesized_comment(comment);
            if comment.has_trailing_new_line || comment.kind == CommentKind::SingleLine {
                self.writer.write_line();
            } else {
                self.writer.write_space();
            }
        }
    }

    fn emit_synthesized_trailing_comments(&mut self, node: NodeIndex) {
        let comments = self.arena.synthetic_trailing_comments(node).to_vec();
        for comment in &comments {
            if !self.writer.is_at_start_of_line() {
                self.writer.write_space();
            }
            self.write_synthesized_comment(comment);
            if comment.has_trailing_new_line {
                self.writer.write_line();
            }
        }
    }

    fn write_synthesized_comment(&mut self, comment: &SynthesizedComment) {
        match comment.kind {
            CommentKind::SingleLine => {
                self.writer.write("//");
                self.writer.write(&comment.text);
            }
            CommentKind::MultiLine => {
                let text = format!("/*{}*/", comment.text);
                for (index, line) in text.split('\n').enumerate() {
                    if index > 0 {
                        self.writer.force_write_line();
                    }
                    self.writer.write(line.trim_end_matches('\r'));
                }
            }
        }
    }

    // =========================================================================
    // Detached comments
    // =========================================================================

    /// Print a body (file or function) whose first comments may be detached
    /// from its first statement: a comment block separated from the code by a
    /// blank line belongs to the body, not to the statement.
    pub(super) fn emit_body_with_detached_comments(
        &mut self,
        node: NodeIndex,
        range: TextRange,
        emit: impl FnOnce(&mut Self) -> EmitResult<()>,
    ) -> EmitResult<()> {
        let flags = self.arena.emit_flags(node);
        let skip_leading = range.pos == NO_POS || flags.contains(EmitFlags::NO_LEADING_COMMENTS);
        let skip_trailing =
            self.comments.disabled || range.end == NO_POS || flags.contains(EmitFlags::NO_TRAILING_COMMENTS);

        if !skip_leading {
            self.emit_detached_comments(range);
        }

        let result = if flags.contains(EmitFlags::NO_NESTED_COMMENTS) && !self.comments.disabled {
            self.comments.disabled = true;
            let result = emit(self);
            self.comments.disabled = false;
            result
        } else {
            emit(self)
        };

        if !skip_trailing {
            self.emit_leading_comments(range.end, true);
            if self.comments.has_written_comment && !self.writer.is_at_start_of_line() {
                self.writer.write_line();
            }
        }
        result
    }

    fn emit_detached_comments(&mut self, range: TextRange) {
        let text = Arc::clone(&self.source_text);
        let leading: Vec<CommentRange> = if self.comments.disabled {
            if range.pos != 0 {
                return;
            }
            get_leading_comment_ranges(&text, range.pos)
                .into_iter()
                .filter(|comment| comment.is_pinned(&text))
                .collect()
        } else {
            get_leading_comment_ranges(&text, range.pos)
        };

        let mut detached: Vec<CommentRange> = Vec::new();
        for comment in &leading {
            if let Some(last) = detached.last()
                && self.line_of(comment.pos) >= self.line_of(last.end) + 2
            {
                break;
            }
            detached.push(*comment);
        }
        let Some(last) = detached.last().copied() else {
            return;
        };
        let node_line = self.line_of(self.token_start(range.pos));
        if node_line < self.line_of(last.end) + 2 {
            return;
        }

        if let Some(first) = leading.first()
            && range.pos != first.pos
            && self.line_of(range.pos) != self.line_of(first.pos)
        {
            self.writer.write_line();
        }
        let mut needs_separator = false;
        for comment in &detached {
            if needs_separator {
                self.writer.write_space();
                needs_separator = false;
            }
            self.write_comment(comment);
            if comment.has_trailing_new_line {
                self.writer.write_line();
            } else {
                needs_separator = true;
            }
        }
        if needs_separator {
            self.writer.write_space();
        }

        self.comments.detached.push(DetachedCommentInfo {
            node_pos: range.pos,
            detached_comment_end_pos: last.end,
        });
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Write `token` at source position `pos`, with the comments around it
    /// when `context` comes from the parse tree. Returns the end position of
    /// the token in the source.
    pub(super) fn emit_token_with_comment(
        &mut self,
        token: &str,
        pos: u32,
        context: NodeIndex,
        indent_leading: bool,
    ) -> u32 {
        let parse_node = self.arena.get_parse_tree_node(context);
        let is_similar = parse_node.is_some() && self.arena.kind(parse_node) == self.arena.kind(context);
        let start_pos = pos;
        let pos = if is_similar { self.token_start(pos) } else { pos };

        if is_similar && self.arena.range(context).pos != start_pos {
            let needs_indent = indent_leading && self.line_of(start_pos) != self.line_of(pos);
            if needs_indent {
                self.writer.increase_indent();
            }
            self.emit_leading_comments_of_position(start_pos);
            if needs_indent {
                self.writer.decrease_indent();
            }
        }

        let end = self.write_token_text(token, pos);
        if is_similar && self.arena.range(context).end != end {
            self.emit_trailing_comments_of_position(end, false);
        }
        end
    }
}
