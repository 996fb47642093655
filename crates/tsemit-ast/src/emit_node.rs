//! Rarely-present emit data kept in a side table of the arena.

use tsemit_common::NO_POS;
use tsemit_common::comments::CommentKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRange {
    pub pos: u32,
    pub end: u32,
}

impl TextRange {
    pub const NONE: TextRange = TextRange { pos: NO_POS, end: NO_POS };

    pub const fn new(pos: u32, end: u32) -> Self {
        TextRange { pos, end }
    }

    pub const fn is_synthesized(self) -> bool {
        self.pos == NO_POS
    }
}

/// A comment that exists only in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesizedComment {
    pub kind: CommentKind,
    /// Text between the delimiters (`//` or `/*` `*/`).
    pub text: String,
    pub has_trailing_new_line: bool,
}

impl SynthesizedComment {
    pub fn new(kind: CommentKind, text: &str, has_trailing_new_line: bool) -> Self {
        SynthesizedComment {
            kind,
            text: text.to_string(),
            has_trailing_new_line,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitNode {
    pub leading_comments: Vec<SynthesizedComment>,
    pub trailing_comments: Vec<SynthesizedComment>,
    pub comment_range: Option<TextRange>,
    pub source_map_range: Option<TextRange>,
    pub starts_on_new_line: bool,
}

impl EmitNode {
    /// Fill unset fields from `source`. Data already on `self` wins.
    pub fn merge_from(&mut self, source: &EmitNode) {
        if self.leading_comments.is_empty() {
            self.leading_comments = source.leading_comments.clone();
        }
        if self.trailing_comments.is_empty() {
            self.trailing_comments = source.trailing_comments.clone();
        }
        self.comment_range = self.comment_range.or(source.comment_range);
        self.source_map_range = self.source_map_range.or(source.source_map_range);
        self.starts_on_new_line |= source.starts_on_new_line;
    }
}
