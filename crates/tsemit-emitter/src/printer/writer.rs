//! Indentation-aware output buffer.
//!
//! Indentation is written lazily: the first `write` on a fresh line emits
//! the indent, so `write_line` followed by `decrease_indent` still lines the
//! next token up correctly. Line and column are tracked in UTF-16 units so
//! source map positions can be taken at any point.

const INDENT: &str = "    ";

#[derive(Debug)]
pub struct SourceWriter {
    output: String,
    new_line: &'static str,
    indent: u32,
    line_start: bool,
    line: u32,
    /// UTF-16 column of the text written on the current line.
    column: u32,
}

impl SourceWriter {
    pub fn new(new_line: &'static str) -> Self {
        SourceWriter {
            output: String::new(),
            new_line,
            indent: 0,
            line_start: true,
            line: 0,
            column: 0,
        }
    }

    pub fn new_line(&self) -> &'static str {
        self.new_line
    }

    pub fn clear(&mut self) {
        self.output.clear();
        self.indent = 0;
        self.line_start = true;
        self.line = 0;
        self.column = 0;
    }

    fn write_indent_if_needed(&mut self) {
        if self.line_start {
            for _ in 0..self.indent {
                self.output.push_str(INDENT);
            }
            self.column = self.indent * INDENT.len() as u32;
            self.line_start = false;
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.write_indent_if_needed();
        self.output.push_str(text);
        self.advance(text);
    }

    /// Write text that may contain line breaks (multi-line comments).
    pub fn write_raw(&mut self, text: &str) {
        self.write(text);
    }

    pub fn write_space(&mut self) {
        self.write(" ");
    }

    /// End the current line. Does nothing at the start of a line.
    pub fn write_line(&mut self) {
        if !self.line_start {
            self.force_write_line();
        }
    }

    pub fn force_write_line(&mut self) {
        self.output.push_str(self.new_line);
        self.line += 1;
        self.column = 0;
        self.line_start = true;
    }

    /// Write a block of text line by line at the current indentation,
    /// stripping the indentation common to all of its lines.
    pub fn write_lines(&mut self, text: &str) {
        let lines: Vec<&str> = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
        let indentation = guess_indentation(&lines);
        for line in lines {
            let line = line.get(indentation..).unwrap_or(line);
            if !line.is_empty() {
                self.write_line();
                self.write(line);
            }
        }
    }

    fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last) => {
                self.line += text.matches('\n').count() as u32;
                self.column = text[last + 1..].encode_utf16().count() as u32;
            }
            None => self.column += text.encode_utf16().count() as u32,
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Text of the current indentation.
    pub fn indent_text(&self) -> String {
        INDENT.repeat(self.indent as usize)
    }

    pub fn is_at_start_of_line(&self) -> bool {
        self.line_start
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Column where the next token will start.
    pub fn column(&self) -> u32 {
        if self.line_start {
            self.indent * INDENT.len() as u32
        } else {
            self.column
        }
    }

    pub fn text(&self) -> &str {
        &self.output
    }

    pub fn into_text(self) -> String {
        self.output
    }
}

/// Smallest leading whitespace among the non-blank lines.
fn guess_indentation(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0)
}
