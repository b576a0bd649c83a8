use std::fmt::Display;

use once_cell::unsync::OnceCell;

use crate::span::Span;

/// Human readable location, both fields are one-based.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Position {
    pub line: u32,
    /// Unicode scalar values from the start of the line
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Position {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The immutable input text shared by a lexer and every token it produces.
pub struct Source {
    text: Box<str>,
    /// Byte offsets of the start of each line, built on the first position query.
    lines: OnceCell<Vec<u32>>,
}

impl Source {
    pub fn new(text: impl Into<Box<str>>) -> Source {
        let text = text.into();
        assert!(
            text.len() <= u32::MAX as usize,
            "Source text is too large to be addressed by u32 offsets"
        );
        Self {
            text,
            lines: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[track_caller]
    pub fn substring(&self, start: u32, end: u32) -> &str {
        Span::new(start, end).as_str(&self.text)
    }

    pub fn char_at(&self, offset: u32) -> Option<char> {
        self.text.get(offset as usize..)?.chars().next()
    }

    fn line_starts(&self) -> &[u32] {
        self.lines.get_or_init(|| {
            let mut lines = vec![0];
            // '\n' never occurs inside a multibyte sequence, bytes are fine here
            for (i, b) in self.text.bytes().enumerate() {
                if b == b'\n' {
                    lines.push(i as u32 + 1);
                }
            }
            lines
        })
    }

    /// Converts a byte offset into a one-based line and column. The offset is clamped to the end of the text.
    pub fn position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len());
        let lines = self.line_starts();

        // the first line always starts at 0 so this never underflows
        let line = lines.partition_point(|&start| start <= offset) - 1;
        let line_start = lines[line];

        let column = self
            .text
            .get(line_start as usize..offset as usize)
            .map_or(offset - line_start, |prefix| prefix.chars().count() as u32);

        Position {
            line: line as u32 + 1,
            column: column + 1,
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("len", &self.text.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let src = Source::new("ab\ncd\n\nef");
        assert_eq!(src.position(0), Position::new(1, 1));
        assert_eq!(src.position(1), Position::new(1, 2));
        assert_eq!(src.position(2), Position::new(1, 3));
        assert_eq!(src.position(3), Position::new(2, 1));
        assert_eq!(src.position(6), Position::new(3, 1));
        assert_eq!(src.position(7), Position::new(4, 1));
        assert_eq!(src.position(9), Position::new(4, 3));
    }

    #[test]
    fn position_is_clamped_and_stable() {
        let src = Source::new("x\ny");
        let end = src.position(100);
        assert_eq!(end, Position::new(2, 2));
        assert_eq!(src.position(100), end);
    }

    #[test]
    fn columns_count_characters() {
        let src = Source::new("é = x");
        // 'é' is two bytes
        assert_eq!(src.position(3), Position::new(1, 3));
    }

    #[test]
    fn substring_and_char_at() {
        let src = Source::new("grammar G");
        assert_eq!(src.substring(0, 7), "grammar");
        assert_eq!(src.char_at(8), Some('G'));
        assert_eq!(src.char_at(9), None);
    }
}
