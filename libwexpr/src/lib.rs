//! Wexpr parser and writer.
//!
//! Wexpr is a human writable data format in the S-expression family:
//!
//! ```text
//! ; a comment
//! @(
//!     name "Jane Doe"
//!     tags #(admin [role]editor)
//!     primary *[role]
//!     avatar <aGVsbG8=>
//! )
//! ```
//!
//! Values are barewords or quoted strings, `#( )` is an array, `@( )` a map,
//! `< >` Base64 binary data, `[name]` binds the following expression to a
//! name and `*[name]` inserts a copy of it.
//!
//! Documents can also be stored in a compact binary form made of
//! length-prefixed chunks, see [`encode_chunk`] and [`write_binary_file`].

mod binary;
mod encode;
pub mod endian;
mod error;
mod expression;
mod file;
mod parser;
mod reference;
mod scanner;
pub mod uvlq;
mod version;

pub use binary::{decode_chunk, encode_chunk, COMPRESSION_RAW};
pub use encode::{encode, is_bareword_safe, Style};
pub use error::{Error, Position, Result};
pub use expression::{Expression, ExpressionType};
pub use file::{
    is_binary_file, read_binary_file, write_binary_file, FILE_FORMAT_VERSION, FILE_MAGIC,
    HEADER_SIZE,
};
pub use reference::ReferenceTable;
pub use version::{Version, FILE_FORMAT, VERSION};

use scanner::ParseState;

/// Parse a Wexpr document from a string.
///
/// # Example
///
/// ```
/// use libwexpr::parse;
///
/// let expr = parse("@(answer 42)").unwrap();
/// assert_eq!(expr.map_value_for_key("answer").unwrap().unwrap().as_value().unwrap(), "42");
/// ```
pub fn parse(input: &str) -> Result<Expression> {
    let mut state = ParseState::new(input, None);
    parser::parse_root(&mut state)
}

/// Parse a Wexpr document, resolving `*[name]` against `references` when
/// the document does not define `name` itself.
pub fn parse_with_references(input: &str, references: &ReferenceTable) -> Result<Expression> {
    let mut state = ParseState::new(input, Some(references));
    parser::parse_root(&mut state)
}
