//! Child list emission.
//!
//! Every child array is printed through `emit_list`, driven by a
//! `ListFormat`: which brackets surround the list, the delimiter between
//! elements, and where line breaks go. Line breaks for parse-tree children
//! follow the source layout; synthesized children fall back to their
//! `starts_on_new_line` hint.

use super::Printer;
use crate::hooks::EmitHint;
use bitflags::bitflags;
use tsemit_ast::{EmitFlags, NodeIndex, NodeList, TextRange};
use tsemit_common::EmitResult;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ListFormat: u32 {
        const NONE = 0;

        // Line separators
        const SINGLE_LINE = 0;
        const MULTI_LINE = 1 << 0;
        const PRESERVE_LINES = 1 << 1;
        const LINES_MASK = Self::MULTI_LINE.bits() | Self::PRESERVE_LINES.bits();

        // Delimiters
        const NOT_DELIMITED = 0;
        const BAR_DELIMITED = 1 << 2;
        const AMPERSAND_DELIMITED = 1 << 3;
        const COMMA_DELIMITED = 1 << 4;
        const DELIMITERS_MASK =
            Self::BAR_DELIMITED.bits() | Self::AMPERSAND_DELIMITED.bits() | Self::COMMA_DELIMITED.bits();

        const ALLOW_TRAILING_COMMA = 1 << 5;

        // Whitespace
        const INDENTED = 1 << 6;
        const SPACE_BETWEEN_BRACES = 1 << 7;
        const SPACE_BETWEEN_SIBLINGS = 1 << 8;

        // Brackets
        const BRACES = 1 << 9;
        const PARENTHESIS = 1 << 10;
        const ANGLE_BRACKETS = 1 << 11;
        const SQUARE_BRACKETS = 1 << 12;
        const BRACKETS_MASK =
            Self::BRACES.bits() | Self::PARENTHESIS.bits() | Self::ANGLE_BRACKETS.bits() | Self::SQUARE_BRACKETS.bits();

        const OPTIONAL_IF_UNDEFINED = 1 << 13;
        const OPTIONAL_IF_EMPTY = 1 << 14;
        const OPTIONAL = Self::OPTIONAL_IF_UNDEFINED.bits() | Self::OPTIONAL_IF_EMPTY.bits();

        // Other
        const PREFER_NEW_LINE = 1 << 15;
        const NO_TRAILING_NEW_LINE = 1 << 16;
        const NO_INTERVENING_COMMENTS = 1 << 17;
        const NO_SPACE_IF_EMPTY = 1 << 18;
        const SINGLE_ELEMENT = 1 << 19;

        // Presets
        const CLASS_HERITAGE_CLAUSES = 0;
        const SINGLE_LINE_TYPE_LITERAL_MEMBERS =
            Self::SINGLE_LINE.bits() | Self::SPACE_BETWEEN_BRACES.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits();
        const MULTI_LINE_TYPE_LITERAL_MEMBERS = Self::MULTI_LINE.bits() | Self::INDENTED.bits() | Self::OPTIONAL_IF_EMPTY.bits();
        const TUPLE_TYPE_ELEMENTS =
            Self::COMMA_DELIMITED.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const UNION_TYPE_CONSTITUENTS =
            Self::BAR_DELIMITED.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const INTERSECTION_TYPE_CONSTITUENTS =
            Self::AMPERSAND_DELIMITED.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const OBJECT_BINDING_PATTERN_ELEMENTS = Self::SINGLE_LINE.bits()
            | Self::ALLOW_TRAILING_COMMA.bits()
            | Self::SPACE_BETWEEN_BRACES.bits()
            | Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::NO_SPACE_IF_EMPTY.bits();
        const ARRAY_BINDING_PATTERN_ELEMENTS = Self::SINGLE_LINE.bits()
            | Self::ALLOW_TRAILING_COMMA.bits()
            | Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::NO_SPACE_IF_EMPTY.bits();
        const OBJECT_LITERAL_EXPRESSION_PROPERTIES = Self::PRESERVE_LINES.bits()
            | Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::SPACE_BETWEEN_BRACES.bits()
            | Self::INDENTED.bits()
            | Self::BRACES.bits()
            | Self::NO_SPACE_IF_EMPTY.bits();
        const ARRAY_LITERAL_EXPRESSION_ELEMENTS = Self::PRESERVE_LINES.bits()
            | Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::ALLOW_TRAILING_COMMA.bits()
            | Self::INDENTED.bits()
            | Self::SQUARE_BRACKETS.bits();
        const COMMA_LIST_ELEMENTS =
            Self::COMMA_DELIMITED.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const CALL_EXPRESSION_ARGUMENTS = Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::SINGLE_LINE.bits()
            | Self::PARENTHESIS.bits();
        const NEW_EXPRESSION_ARGUMENTS = Self::CALL_EXPRESSION_ARGUMENTS.bits() | Self::OPTIONAL_IF_UNDEFINED.bits();
        const TEMPLATE_EXPRESSION_SPANS = Self::SINGLE_LINE.bits() | Self::NO_INTERVENING_COMMENTS.bits();
        const SINGLE_LINE_BLOCK_STATEMENTS =
            Self::SPACE_BETWEEN_BRACES.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const MULTI_LINE_BLOCK_STATEMENTS = Self::INDENTED.bits() | Self::MULTI_LINE.bits();
        const VARIABLE_DECLARATION_LIST =
            Self::COMMA_DELIMITED.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const SINGLE_LINE_FUNCTION_BODY_STATEMENTS =
            Self::SINGLE_LINE.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SPACE_BETWEEN_BRACES.bits();
        const MULTI_LINE_FUNCTION_BODY_STATEMENTS = Self::MULTI_LINE.bits();
        const CLASS_MEMBERS = Self::INDENTED.bits() | Self::MULTI_LINE.bits();
        const INTERFACE_MEMBERS = Self::INDENTED.bits() | Self::MULTI_LINE.bits();
        const ENUM_MEMBERS = Self::COMMA_DELIMITED.bits() | Self::INDENTED.bits() | Self::MULTI_LINE.bits();
        const CASE_BLOCK_CLAUSES = Self::INDENTED.bits() | Self::MULTI_LINE.bits();
        const NAMED_IMPORTS_OR_EXPORTS_ELEMENTS = Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::ALLOW_TRAILING_COMMA.bits()
            | Self::SINGLE_LINE.bits()
            | Self::SPACE_BETWEEN_BRACES.bits()
            | Self::NO_SPACE_IF_EMPTY.bits();
        const CASE_OR_DEFAULT_CLAUSE_STATEMENTS = Self::INDENTED.bits()
            | Self::MULTI_LINE.bits()
            | Self::NO_TRAILING_NEW_LINE.bits()
            | Self::OPTIONAL_IF_EMPTY.bits();
        const HERITAGE_CLAUSE_TYPES =
            Self::COMMA_DELIMITED.bits() | Self::SPACE_BETWEEN_SIBLINGS.bits() | Self::SINGLE_LINE.bits();
        const DECORATORS = Self::MULTI_LINE.bits() | Self::OPTIONAL.bits();
        const TYPE_ARGUMENTS = Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::SINGLE_LINE.bits()
            | Self::ANGLE_BRACKETS.bits()
            | Self::OPTIONAL.bits();
        const TYPE_PARAMETERS = Self::TYPE_ARGUMENTS.bits();
        const PARAMETERS = Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::SINGLE_LINE.bits()
            | Self::PARENTHESIS.bits();
        const INDEX_SIGNATURE_PARAMETERS = Self::COMMA_DELIMITED.bits()
            | Self::SPACE_BETWEEN_SIBLINGS.bits()
            | Self::SINGLE_LINE.bits()
            | Self::INDENTED.bits()
            | Self::SQUARE_BRACKETS.bits();
    }
}

impl ListFormat {
    fn brackets(self) -> Option<(&'static str, &'static str)> {
        if self.contains(ListFormat::BRACES) {
            Some(("{", "}"))
        } else if self.contains(ListFormat::PARENTHESIS) {
            Some(("(", ")"))
        } else if self.contains(ListFormat::ANGLE_BRACKETS) {
            Some(("<", ">"))
        } else if self.contains(ListFormat::SQUARE_BRACKETS) {
            Some(("[", "]"))
        } else {
            None
        }
    }
}

impl<'a> Printer<'a> {
    // =========================================================================
    // List emission
    // =========================================================================

    pub(super) fn emit_list(&mut self, parent: NodeIndex, children: Option<&NodeList>, format: ListFormat) -> EmitResult<()> {
        let len = children.map_or(0, NodeList::len);
        self.emit_list_range(parent, children, format, EmitHint::Unspecified, 0, len)
    }

    pub(super) fn emit_expression_list(
        &mut self,
        parent: NodeIndex,
        children: Option<&NodeList>,
        format: ListFormat,
    ) -> EmitResult<()> {
        let len = children.map_or(0, NodeList::len);
        self.emit_list_range(parent, children, format, EmitHint::Expression, 0, len)
    }

    pub(super) fn emit_list_from(
        &mut self,
        parent: NodeIndex,
        children: &NodeList,
        format: ListFormat,
        start: usize,
    ) -> EmitResult<()> {
        let count = children.len().saturating_sub(start);
        self.emit_list_range(parent, Some(children), format, EmitHint::Unspecified, start, count)
    }

    fn emit_list_range(
        &mut self,
        parent: NodeIndex,
        children: Option<&NodeList>,
        format: ListFormat,
        hint: EmitHint,
        start: usize,
        count: usize,
    ) -> EmitResult<()> {
        if children.is_none() && format.contains(ListFormat::OPTIONAL_IF_UNDEFINED) {
            return Ok(());
        }
        let items: &[NodeIndex] = match children {
            Some(list) if start < list.len() => {
                let end = (start + count).min(list.len());
                &list.nodes[start..end]
            }
            _ => &[],
        };
        let is_empty = items.is_empty();
        if is_empty && format.contains(ListFormat::OPTIONAL_IF_EMPTY) {
            return Ok(());
        }

        let brackets = format.brackets();
        if let Some((open, _)) = brackets {
            self.write_punctuation(open);
            if is_empty && let Some(list) = children {
                self.emit_trailing_comments_of_position(list.pos, true);
            }
        }

        if is_empty {
            if format.contains(ListFormat::MULTI_LINE) {
                self.write_line();
            } else if format.contains(ListFormat::SPACE_BETWEEN_BRACES) && !format.contains(ListFormat::NO_SPACE_IF_EMPTY) {
                self.write_space();
            }
        } else {
            let may_emit_intervening_comments = !format.contains(ListFormat::NO_INTERVENING_COMMENTS);
            let mut should_emit_intervening_comments = may_emit_intervening_comments;
            if self.leading_line_terminator_count(parent, items.first().copied(), format) > 0 {
                self.write_line();
                should_emit_intervening_comments = false;
            } else if format.contains(ListFormat::SPACE_BETWEEN_BRACES) {
                self.write_space();
            }

            if format.contains(ListFormat::INDENTED) {
                self.increase_indent();
            }

            let parent_end = self.arena.range(parent).end;
            let mut previous: Option<NodeIndex> = None;
            let mut should_decrease_indent_after_emit = false;
            for &child in items {
                if let Some(prev) = previous {
                    if format.intersects(ListFormat::DELIMITERS_MASK) {
                        let prev_end = self.arena.range(prev).end;
                        if prev_end != parent_end && !self.arena.emit_flags(prev).contains(EmitFlags::NO_TRAILING_COMMENTS) {
                            self.emit_leading_comments_of_position(prev_end);
                        }
                        self.write_delimiter(format);
                    }
                    if self.separating_line_terminator_count(prev, child, format) > 0 {
                        if (format & (ListFormat::LINES_MASK | ListFormat::INDENTED)) == ListFormat::SINGLE_LINE {
                            self.increase_indent();
                            should_decrease_indent_after_emit = true;
                        }
                        self.write_line();
                        should_emit_intervening_comments = false;
                    } else if format.contains(ListFormat::SPACE_BETWEEN_SIBLINGS) {
                        self.write_space();
                    }
                }

                if should_emit_intervening_comments {
                    let pos = self.arena.comment_range(child).pos;
                    self.emit_trailing_comments_of_position(pos, false);
                } else {
                    should_emit_intervening_comments = may_emit_intervening_comments;
                }

                self.print(hint, child)?;

                if should_decrease_indent_after_emit {
                    self.decrease_indent();
                    should_decrease_indent_after_emit = false;
                }
                previous = Some(child);
            }

            let has_trailing_comma = children.is_some_and(|list| list.has_trailing_comma);
            if format.contains(ListFormat::COMMA_DELIMITED) && format.contains(ListFormat::ALLOW_TRAILING_COMMA) && has_trailing_comma {
                self.write_punctuation(",");
            }

            if let Some(prev) = previous
                && format.intersects(ListFormat::DELIMITERS_MASK)
            {
                let prev_end = self.arena.range(prev).end;
                if prev_end != parent_end && !self.arena.emit_flags(prev).contains(EmitFlags::NO_TRAILING_COMMENTS) {
                    self.emit_leading_comments_of_position(prev_end);
                }
            }

            if format.contains(ListFormat::INDENTED) {
                self.decrease_indent();
            }

            if self.closing_line_terminator_count(parent, items.last().copied(), format) > 0 {
                self.write_line();
            } else if format.contains(ListFormat::SPACE_BETWEEN_BRACES) {
                self.write_space();
            }
        }

        if let Some((_, close)) = brackets {
            if is_empty && let Some(list) = children {
                self.emit_leading_comments_of_position(list.end);
            }
            self.write_punctuation(close);
        }
        Ok(())
    }

    fn write_delimiter(&mut self, format: ListFormat) {
        if format.contains(ListFormat::COMMA_DELIMITED) {
            self.write_punctuation(",");
        } else if format.contains(ListFormat::BAR_DELIMITED) {
            self.write_space();
            self.write_punctuation("|");
        } else if format.contains(ListFormat::AMPERSAND_DELIMITED) {
            self.write_space();
            self.write_punctuation("&");
        }
    }

    // =========================================================================
    // Line terminator decisions
    // =========================================================================

    pub(super) fn leading_line_terminator_count(&self, parent: NodeIndex, first: Option<NodeIndex>, format: ListFormat) -> u32 {
        if format.contains(ListFormat::PRESERVE_LINES) {
            if format.contains(ListFormat::PREFER_NEW_LINE) {
                return 1;
            }
            let parent_range = self.arena.range(parent);
            let Some(first) = first else {
                return u32::from(!self.range_is_on_single_line(parent_range));
            };
            let first_range = self.arena.range(first);
            if !parent_range.is_synthesized() && !first_range.is_synthesized() {
                return u32::from(!self.range_start_positions_are_on_same_line(parent_range, first_range));
            }
            if self.synthesized_node_starts_on_new_line(first, format) {
                return 1;
            }
        }
        u32::from(format.contains(ListFormat::MULTI_LINE))
    }

    pub(super) fn separating_line_terminator_count(&self, previous: NodeIndex, next: NodeIndex, format: ListFormat) -> u32 {
        if format.contains(ListFormat::PRESERVE_LINES) {
            let previous_range = self.arena.range(previous);
            let next_range = self.arena.range(next);
            if !previous_range.is_synthesized() && !next_range.is_synthesized() {
                return u32::from(!self.range_end_is_on_same_line_as_range_start(previous_range, next_range));
            }
            if self.synthesized_node_starts_on_new_line(previous, format)
                || self.synthesized_node_starts_on_new_line(next, format)
            {
                return 1;
            }
        } else if self.arena.starts_on_new_line(next) {
            return 1;
        }
        u32::from(format.contains(ListFormat::MULTI_LINE))
    }

    pub(super) fn closing_line_terminator_count(&self, parent: NodeIndex, last: Option<NodeIndex>, format: ListFormat) -> u32 {
        if format.contains(ListFormat::PRESERVE_LINES) {
            if format.contains(ListFormat::PREFER_NEW_LINE) {
                return 1;
            }
            let parent_range = self.arena.range(parent);
            let Some(last) = last else {
                return u32::from(!self.range_is_on_single_line(parent_range));
            };
            let last_range = self.arena.range(last);
            if !parent_range.is_synthesized() && !last_range.is_synthesized() {
                return u32::from(!self.range_end_positions_are_on_same_line(parent_range, last_range));
            }
            if self.synthesized_node_starts_on_new_line(last, format) {
                return 1;
            }
        }
        u32::from(format.contains(ListFormat::MULTI_LINE) && !format.contains(ListFormat::NO_TRAILING_NEW_LINE))
    }

    fn synthesized_node_starts_on_new_line(&self, node: NodeIndex, format: ListFormat) -> bool {
        if self.arena.range(node).is_synthesized() && self.arena.starts_on_new_line(node) {
            return true;
        }
        format.contains(ListFormat::PREFER_NEW_LINE)
    }

    // =========================================================================
    // Source line queries
    // =========================================================================

    /// Line of `pos` in the current source; synthesized positions count as line 0.
    pub(super) fn line_of(&self, pos: u32) -> u32 {
        if pos == tsemit_common::NO_POS {
            0
        } else {
            self.line_map.line_of(pos)
        }
    }

    pub(super) fn token_start(&self, pos: u32) -> u32 {
        tsemit_common::skip_trivia(&self.source_text, pos)
    }

    pub(super) fn range_is_on_single_line(&self, range: TextRange) -> bool {
        self.line_of(self.token_start(range.pos)) == self.line_of(range.end)
    }

    fn range_start_positions_are_on_same_line(&self, a: TextRange, b: TextRange) -> bool {
        self.line_of(self.token_start(a.pos)) == self.line_of(self.token_start(b.pos))
    }

    fn range_end_is_on_same_line_as_range_start(&self, a: TextRange, b: TextRange) -> bool {
        self.line_of(a.end) == self.line_of(self.token_start(b.pos))
    }

    fn range_end_positions_are_on_same_line(&self, a: TextRange, b: TextRange) -> bool {
        self.line_of(a.end) == self.line_of(b.end)
    }
}
