//! Document access for providers
//!
//! LSP positions count UTF-16 code units; everything internal works on byte
//! offsets. Conversions live here and nowhere else.

use regex::Regex;
use std::path::{Path, PathBuf};
use tower_lsp::lsp_types::{Position, Range};

/// An open component document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    path: PathBuf,
    text: String,
    version: i32,
    line_starts: Vec<usize>,
}

impl TextDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, version: i32) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            path: path.into(),
            text,
            version,
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of line `line` (0-based) without its terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\r'))
    }

    /// Byte offset of an LSP position, clamped to its line
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line = self.line(position.line as usize)?;
        let start = self.line_starts[position.line as usize];
        Some(start + utf16_to_byte(line, position.character))
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let start = self.line_starts[line];
        let character = self.text[start..offset].encode_utf16().count() as u32;
        Position::new(line as u32, character)
    }

    pub fn range_of(&self, start: usize, end: usize) -> Range {
        Range::new(self.position_at(start), self.position_at(end))
    }

    /// Byte span of the `pattern` match covering `position`
    pub fn word_range_at(&self, position: Position, pattern: &Regex) -> Option<(usize, usize)> {
        let line_no = position.line as usize;
        let line = self.line(line_no)?;
        let column = utf16_to_byte(line, position.character);
        let line_start = self.line_starts[line_no];

        pattern
            .find_iter(line)
            .find(|m| m.start() <= column && column <= m.end())
            .map(|m| (line_start + m.start(), line_start + m.end()))
    }
}

/// Byte column of a UTF-16 column, clamped to the end of `line`
pub fn utf16_to_byte(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= character {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}
