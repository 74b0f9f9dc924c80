//! Error types for Wexpr parsing, writing, and binary decoding.

use std::fmt;

use thiserror::Error;

use crate::expression::ExpressionType;

/// Result type for Wexpr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A location in Wexpr source text. Both fields are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a position from a line and column.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Error type for Wexpr operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Nothing to parse.
    #[error("Empty input at {0}")]
    EmptyInput(Position),

    /// A bareword with no characters.
    #[error("Empty string at {0}")]
    EmptyString(Position),

    /// Input remained after the root expression.
    #[error("Extra data after root expression at {0}")]
    ExtraData(Position),

    /// Quoted string without its closing quote.
    #[error("String missing ending quote at {0}")]
    MissingEndQuote(Position),

    /// Unsupported character after a backslash.
    #[error("Invalid escape \"\\{1}\" in string at {0}")]
    InvalidEscape(Position, char),

    /// `#(` without a closing `)`.
    #[error("Array missing end paren at {0}")]
    ArrayMissingEndParen(Position),

    /// `@(` without a closing `)`.
    #[error("Map missing end paren at {0}")]
    MapMissingEndParen(Position),

    /// A map key parsed to something other than a value.
    #[error("Map key must be a value at {0}")]
    MapKeyMustBeValue(Position),

    /// A map key ran out of input before its value.
    #[error("Map key has no value at {0}")]
    MapNoValue(Position),

    /// `[name` without a closing `]`.
    #[error("Reference definition missing end bracket at {0}")]
    ReferenceMissingEndBracket(Position),

    /// `*[name` without a closing `]`.
    #[error("Reference insert missing end bracket at {0}")]
    ReferenceUseMissingEndBracket(Position),

    /// A reference definition whose name is not an identifier.
    #[error("Invalid reference name \"{1}\" at {0}")]
    InvalidReferenceName(Position, String),

    /// `*[name]` where `name` is in neither reference table.
    #[error("Unknown reference \"{1}\" at {0}")]
    UnknownReference(Position, String),

    /// `<` without a closing `>`.
    #[error("No ending bracket for binary data at {0}")]
    BinaryDataMissingEnd(Position),

    /// Binary data literal that is not valid Base64.
    #[error("Invalid base64 in binary data at {0}")]
    InvalidBase64(Position),

    /// A typed accessor was used on an expression of another type.
    #[error("Expected {expected} expression, found {found}")]
    TypeMismatch {
        expected: ExpressionType,
        found: ExpressionType,
    },

    /// An `Invalid` expression cannot be written.
    #[error("Cannot write an invalid expression")]
    InvalidExpression,

    /// Buffer too short to hold a chunk header.
    #[error("Chunk not big enough")]
    ChunkNotBigEnough,

    /// A chunk declared more payload than the buffer holds.
    #[error("Chunk size {size} is bigger than the {available} bytes of data remaining")]
    ChunkBiggerThanData { size: u64, available: usize },

    /// A chunk type byte that is not an expression type.
    #[error("Unknown chunk type 0x{0:02x}")]
    UnknownChunkType(u8),

    /// A binary data chunk with an unsupported compression method.
    #[error("Unknown compression method 0x{0:02x}")]
    UnknownCompression(u8),

    /// A value chunk whose payload is not UTF-8.
    #[error("Invalid UTF-8 in value chunk")]
    InvalidUtf8,

    /// A map chunk whose key chunk is not a value.
    #[error("Map chunk key must be a value chunk")]
    ChunkMapKeyNotValue,

    /// Malformed binary file header.
    #[error("Invalid binary header - {0}")]
    InvalidHeader(&'static str),

    /// Binary file written by an unsupported format version.
    #[error("Invalid binary header - unknown version 0x{0:08x}")]
    UnknownVersion(u32),

    /// More than one expression chunk in a binary file.
    #[error("Found multiple expression chunks")]
    MultipleExpressions,

    /// No expression chunk in a binary file.
    #[error("No expression chunk found")]
    NoExpression,
}

impl Error {
    /// The source position of the error, if it came from text.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::EmptyInput(pos)
            | Error::EmptyString(pos)
            | Error::ExtraData(pos)
            | Error::MissingEndQuote(pos)
            | Error::InvalidEscape(pos, _)
            | Error::ArrayMissingEndParen(pos)
            | Error::MapMissingEndParen(pos)
            | Error::MapKeyMustBeValue(pos)
            | Error::MapNoValue(pos)
            | Error::ReferenceMissingEndBracket(pos)
            | Error::ReferenceUseMissingEndBracket(pos)
            | Error::InvalidReferenceName(pos, _)
            | Error::UnknownReference(pos, _)
            | Error::BinaryDataMissingEnd(pos)
            | Error::InvalidBase64(pos) => Some(*pos),
            _ => None,
        }
    }

    /// Returns `true` for the errors raised when there was nothing left to parse.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::EmptyInput(_) | Error::EmptyString(_))
    }
}
