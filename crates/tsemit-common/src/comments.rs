//! Comment range scanning.
//!
//! Comments are not part of the tree, so the printer rescans the source text
//! around a node's range to find the comments that belong to it: leading
//! comments sit between the previous token and the node start (possibly on
//! earlier lines), trailing comments follow the node end on the same line.

/// Kind of comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    SingleLine, // // comment
    MultiLine,  // /* comment */
}

/// A comment in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRange {
    pub pos: u32,
    pub end: u32,
    pub kind: CommentKind,
    pub has_trailing_new_line: bool,
}

impl CommentRange {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.pos as usize..self.end as usize).unwrap_or("")
    }

    /// `/*! ... */` comments survive `removeComments`.
    pub fn is_pinned(&self, source: &str) -> bool {
        self.kind == CommentKind::MultiLine && self.text(source).starts_with("/*!")
    }

    /// `/// <reference ... />` style directives.
    pub fn is_triple_slash_directive(&self, source: &str) -> bool {
        self.kind == CommentKind::SingleLine && self.text(source).starts_with("///")
    }
}

fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r' || ch == '\u{2028}' || ch == '\u{2029}'
}

fn is_whitespace_single_line(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\u{000B}' || ch == '\u{000C}' || ch == '\u{00A0}' || ch == '\u{FEFF}'
}

fn char_at(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|rest| rest.chars().next())
}

/// Scan one comment starting at `start` (which must point at `/`).
/// Returns the range and whether a multi-line comment contained a line break.
fn scan_comment(text: &str, start: usize) -> Option<(CommentRange, bool)> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'/') {
        return None;
    }
    match bytes.get(start + 1) {
        Some(b'/') => {
            let mut i = start + 2;
            while let Some(c) = char_at(text, i) {
                if is_line_break(c) {
                    break;
                }
                i += c.len_utf8();
            }
            Some((
                CommentRange {
                    pos: start as u32,
                    end: i as u32,
                    kind: CommentKind::SingleLine,
                    has_trailing_new_line: false,
                },
                false,
            ))
        }
        Some(b'*') => {
            let mut i = start + 2;
            let mut spans_lines = false;
            let mut closed = false;
            while let Some(c) = char_at(text, i) {
                if c == '*' && bytes.get(i + 1) == Some(&b'/') {
                    i += 2;
                    closed = true;
                    break;
                }
                if is_line_break(c) {
                    spans_lines = true;
                }
                i += c.len_utf8();
            }
            if !closed {
                i = text.len();
            }
            Some((
                CommentRange {
                    pos: start as u32,
                    end: i as u32,
                    kind: CommentKind::MultiLine,
                    has_trailing_new_line: false,
                },
                spans_lines,
            ))
        }
        _ => None,
    }
}

/// Comments that precede the token at or after `pos`.
///
/// Away from the start of the file, comments on the same line as `pos`
/// belong to the previous token and are skipped. At the start of the file a
/// shebang line is skipped.
pub fn get_leading_comment_ranges(text: &str, pos: u32) -> Vec<CommentRange> {
    let mut comments = Vec::new();
    let len = text.len();
    let mut i = pos as usize;
    if i >= len {
        return comments;
    }
    let mut collecting = i == 0;

    if i == 0 && text.starts_with("#!") {
        while let Some(c) = char_at(text, i) {
            if is_line_break(c) {
                break;
            }
            i += c.len_utf8();
        }
    }

    let mut pending: Option<CommentRange> = None;
    while let Some(ch) = char_at(text, i) {
        if is_whitespace_single_line(ch) {
            i += ch.len_utf8();
            continue;
        }
        if is_line_break(ch) {
            i += ch.len_utf8();
            if ch == '\r' && text.as_bytes().get(i) == Some(&b'\n') {
                i += 1;
            }
            collecting = true;
            if let Some(mut comment) = pending.take() {
                comment.has_trailing_new_line = true;
                comments.push(comment);
            }
            continue;
        }
        match scan_comment(text, i) {
            Some((comment, _)) => {
                i = comment.end as usize;
                if !collecting {
                    continue;
                }
                if let Some(previous) = pending.take() {
                    comments.push(previous);
                }
                pending = Some(comment);
            }
            None => break,
        }
    }
    if let Some(comment) = pending {
        comments.push(comment);
    }
    comments
}

/// Comments on the same line after `pos`, stopping at the first line break.
pub fn get_trailing_comment_ranges(text: &str, pos: u32) -> Vec<CommentRange> {
    let mut comments = Vec::new();
    let mut i = pos as usize;
    if i >= text.len() {
        return comments;
    }
    while let Some(ch) = char_at(text, i) {
        if is_whitespace_single_line(ch) {
            i += ch.len_utf8();
            continue;
        }
        if is_line_break(ch) {
            if let Some(last) = comments.last_mut() {
                last.has_trailing_new_line = true;
            }
            break;
        }
        match scan_comment(text, i) {
            Some((comment, spans_lines)) => {
                i = comment.end as usize;
                comments.push(comment);
                if spans_lines {
                    break;
                }
            }
            None => break,
        }
    }
    comments
}

/// Re-indent the continuation lines of a multi-line comment.
///
/// The first line keeps its position; every following line has the
/// indentation of the original first line stripped and `indent` prepended.
pub fn reindent_multi_line_comment(comment_text: &str, original_column: usize, indent: &str) -> String {
    let mut lines = comment_text.split('\n');
    let mut result = String::with_capacity(comment_text.len());
    if let Some(first) = lines.next() {
        result.push_str(first.trim_end_matches('\r'));
    }
    for line in lines {
        result.push('\n');
        let line = line.trim_end_matches('\r');
        let leading = line.len() - line.trim_start_matches([' ', '\t']).len();
        let strip = leading.min(original_column);
        let rest = &line[strip..];
        if !rest.is_empty() {
            result.push_str(indent);
        }
        result.push_str(rest);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_comments_span_lines() {
        let text = "// one\n/* two */ x";
        let comments = get_leading_comment_ranges(text, 0);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text(text), "// one");
        assert!(comments[0].has_trailing_new_line);
        assert_eq!(comments[1].kind, CommentKind::MultiLine);
        assert!(!comments[1].has_trailing_new_line);
    }

    #[test]
    fn leading_comments_skip_the_previous_line_tail() {
        let text = "x; // tail\n/* lead */ y";
        let comments = get_leading_comment_ranges(text, 2);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text(text), "/* lead */");
    }

    #[test]
    fn trailing_comments_stop_at_newline() {
        let text = "x; // tail\n// next";
        let comments = get_trailing_comment_ranges(text, 2);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text(text), "// tail");
    }

    #[test]
    fn shebang_is_not_a_comment() {
        let text = "#!/usr/bin/env node\n/*!keep*/\nx";
        let comments = get_leading_comment_ranges(text, 0);
        assert_eq!(comments.len(), 1);
        assert!(comments[0].is_pinned(text));
    }

    #[test]
    fn reindent_strips_original_indentation() {
        let text = "/**\n         * doc\n         */";
        assert_eq!(reindent_multi_line_comment(text, 8, "    "), "/**\n     * doc\n     */");
    }
}
