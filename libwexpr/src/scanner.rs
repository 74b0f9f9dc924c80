//! Parse cursor
//!
//! The scanner owns the remaining source text and the line/column of its
//! first character. It also skips the whitespace and comments that may
//! appear between expressions:
//! - whitespace is space, tab, carriage return, and newline
//! - `;` starts a line comment that runs to the next newline
//! - `;(--` starts a block comment that runs through the next `--)`

use crate::error::Position;
use crate::reference::ReferenceTable;

const BLOCK_COMMENT_START: &str = ";(--";
const BLOCK_COMMENT_END: &str = "--)";

/// Whitespace between expressions. Carriage return counts as a column, not a line.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Characters that end a bareword and force quoting when writing.
pub fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '*' | '#' | '@' | '(' | ')' | '[' | ']' | '^' | '<' | '>' | '"' | ';'
    ) || is_whitespace(c)
}

/// State of one parse call.
pub struct ParseState<'a, 'r> {
    rest: &'a str,
    line: usize,
    column: usize,
    /// Definitions seen so far in this document.
    pub internal: ReferenceTable,
    /// Caller supplied fallback for lookups. Never modified.
    pub external: Option<&'r ReferenceTable>,
}

impl<'a, 'r> ParseState<'a, 'r> {
    pub fn new(source: &'a str, external: Option<&'r ReferenceTable>) -> Self {
        Self {
            rest: source,
            line: 1,
            column: 1,
            internal: ReferenceTable::new(),
            external,
        }
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest.starts_with(prefix)
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Consume `len` bytes, updating line and column for every character.
    pub fn advance(&mut self, len: usize) {
        let (consumed, rest) = self.rest.split_at(len);
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.rest = rest;
    }

    /// Skip whitespace and comments. Unterminated comments run to end of input.
    pub fn skip_trivia(&mut self) {
        loop {
            let Some(first) = self.rest.chars().next() else {
                return;
            };

            if is_whitespace(first) {
                self.advance(first.len_utf8());
            } else if first == ';' {
                let len = if self.rest.starts_with(BLOCK_COMMENT_START) {
                    let body = &self.rest[BLOCK_COMMENT_START.len()..];
                    match body.find(BLOCK_COMMENT_END) {
                        Some(i) => BLOCK_COMMENT_START.len() + i + BLOCK_COMMENT_END.len(),
                        None => self.rest.len(),
                    }
                } else {
                    self.rest.find('\n').unwrap_or(self.rest.len())
                };
                self.advance(len);
            } else {
                return;
            }
        }
    }
}
