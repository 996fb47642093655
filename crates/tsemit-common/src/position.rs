//! Line/column lookup for byte offsets in source text.

use crate::NO_POS;

/// Zero-based line and column (column counted in UTF-16 code units, as source maps expect).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineAndColumn {
    pub line: u32,
    pub column: u32,
}

/// Line start table for one source text.
#[derive(Clone, Debug, Default)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0u32];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        i += 1;
                    }
                    line_starts.push((i + 1) as u32);
                }
                b'\n' => line_starts.push((i + 1) as u32),
                // U+2028 / U+2029 are E2 80 A8 / E2 80 A9
                0xE2 if i + 2 < bytes.len()
                    && bytes[i + 1] == 0x80
                    && (bytes[i + 2] == 0xA8 || bytes[i + 2] == 0xA9) =>
                {
                    i += 2;
                    line_starts.push((i + 1) as u32);
                }
                _ => {}
            }
            i += 1;
        }
        LineMap { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based line containing `pos`.
    pub fn line_of(&self, pos: u32) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(next) => next.saturating_sub(1) as u32,
        }
    }

    pub fn line_start(&self, line: u32) -> u32 {
        self.line_starts.get(line as usize).copied().unwrap_or(0)
    }

    pub fn line_and_column_of(&self, text: &str, pos: u32) -> LineAndColumn {
        let line = self.line_of(pos);
        let start = self.line_start(line) as usize;
        let end = (pos as usize).min(text.len());
        let column = text
            .get(start..end)
            .map(|slice| slice.encode_utf16().count() as u32)
            .unwrap_or((end.saturating_sub(start)) as u32);
        LineAndColumn { line, column }
    }
}

/// Skip whitespace and comments starting at `pos`, returning the first token position.
pub fn skip_trivia(text: &str, pos: u32) -> u32 {
    if pos == NO_POS {
        return pos;
    }
    let bytes = text.as_bytes();
    let mut i = pos as usize;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C => i += 1,
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                match memchr::memmem::find(&bytes[i..], b"*/") {
                    Some(offset) => i += offset + 2,
                    None => i = bytes.len(),
                }
            }
            b'#' if i == 0 && bytes.get(1) == Some(&b'!') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            _ => break,
        }
    }
    i as u32
}
