//! Wexpr expression representation.

use indexmap::IndexMap;
use std::fmt;

use crate::error::{Error, Result};

/// The kind of an expression.
///
/// The numeric codes double as chunk type bytes in the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExpressionType {
    Null = 0x00,
    Value = 0x01,
    Array = 0x02,
    Map = 0x03,
    BinaryData = 0x04,
    Invalid = 0xFF,
}

impl ExpressionType {
    /// The numeric code for this type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up the type for a chunk type byte. `Invalid` has no chunk form.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(ExpressionType::Null),
            0x01 => Some(ExpressionType::Value),
            0x02 => Some(ExpressionType::Array),
            0x03 => Some(ExpressionType::Map),
            0x04 => Some(ExpressionType::BinaryData),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpressionType::Null => "Null",
            ExpressionType::Value => "Value",
            ExpressionType::Array => "Array",
            ExpressionType::Map => "Map",
            ExpressionType::BinaryData => "BinaryData",
            ExpressionType::Invalid => "Invalid",
        };
        f.write_str(name)
    }
}

/// A Wexpr expression.
///
/// Arrays and maps own their children, so cloning an expression is always a
/// deep copy.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Expression {
    /// Placeholder for an expression that has not been filled in.
    #[default]
    Invalid,
    /// `null` or `nil`.
    Null,
    /// Bareword or quoted string. Numbers are kept as their source text.
    Value(String),
    /// Ordered list of expressions.
    Array(Vec<Expression>),
    /// Map from key to expression, iterated in first insertion order.
    Map(IndexMap<String, Expression>),
    /// Raw bytes.
    BinaryData(Vec<u8>),
}

impl Expression {
    /// Create an invalid expression.
    pub fn invalid() -> Self {
        Expression::Invalid
    }

    /// Create a null expression.
    pub fn null() -> Self {
        Expression::Null
    }

    /// Create a value expression.
    pub fn value(val: impl Into<String>) -> Self {
        Expression::Value(val.into())
    }

    /// Create an empty array expression.
    pub fn array() -> Self {
        Expression::Array(Vec::new())
    }

    /// Create an empty map expression.
    pub fn map() -> Self {
        Expression::Map(IndexMap::new())
    }

    /// Create a binary data expression.
    pub fn binary_data(data: impl Into<Vec<u8>>) -> Self {
        Expression::BinaryData(data.into())
    }

    /// Deep copy of this expression and all of its children.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// The type of this expression.
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            Expression::Invalid => ExpressionType::Invalid,
            Expression::Null => ExpressionType::Null,
            Expression::Value(_) => ExpressionType::Value,
            Expression::Array(_) => ExpressionType::Array,
            Expression::Map(_) => ExpressionType::Map,
            Expression::BinaryData(_) => ExpressionType::BinaryData,
        }
    }

    /// Switch to another type, replacing the payload with that type's empty one.
    pub fn change_type(&mut self, typ: ExpressionType) {
        *self = match typ {
            ExpressionType::Invalid => Expression::Invalid,
            ExpressionType::Null => Expression::Null,
            ExpressionType::Value => Expression::Value(String::new()),
            ExpressionType::Array => Expression::array(),
            ExpressionType::Map => Expression::map(),
            ExpressionType::BinaryData => Expression::BinaryData(Vec::new()),
        };
    }

    /// Returns `true` if this expression is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Expression::Null)
    }

    /// Returns `true` if this expression is the invalid placeholder.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Expression::Invalid)
    }

    fn mismatch(&self, expected: ExpressionType) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.expression_type(),
        }
    }

    // --- Value

    /// The string of a `Value` expression.
    pub fn as_value(&self) -> Result<&str> {
        match self {
            Expression::Value(s) => Ok(s),
            _ => Err(self.mismatch(ExpressionType::Value)),
        }
    }

    /// Replace the string of a `Value` expression.
    pub fn set_value(&mut self, val: impl Into<String>) -> Result<()> {
        match self {
            Expression::Value(s) => {
                *s = val.into();
                Ok(())
            }
            _ => Err(self.mismatch(ExpressionType::Value)),
        }
    }

    // --- Binary data

    /// The bytes of a `BinaryData` expression.
    pub fn as_binary_data(&self) -> Result<&[u8]> {
        match self {
            Expression::BinaryData(b) => Ok(b),
            _ => Err(self.mismatch(ExpressionType::BinaryData)),
        }
    }

    /// Replace the bytes of a `BinaryData` expression.
    pub fn set_binary_data(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        match self {
            Expression::BinaryData(b) => {
                *b = data.into();
                Ok(())
            }
            _ => Err(self.mismatch(ExpressionType::BinaryData)),
        }
    }

    // --- Array

    /// Number of elements in an `Array` expression.
    pub fn array_len(&self) -> Result<usize> {
        match self {
            Expression::Array(items) => Ok(items.len()),
            _ => Err(self.mismatch(ExpressionType::Array)),
        }
    }

    /// Element at `index`, or `None` if out of range.
    pub fn array_at(&self, index: usize) -> Result<Option<&Expression>> {
        match self {
            Expression::Array(items) => Ok(items.get(index)),
            _ => Err(self.mismatch(ExpressionType::Array)),
        }
    }

    /// Mutable element at `index`, or `None` if out of range.
    pub fn array_at_mut(&mut self, index: usize) -> Result<Option<&mut Expression>> {
        match self {
            Expression::Array(items) => Ok(items.get_mut(index)),
            _ => Err(self.mismatch(ExpressionType::Array)),
        }
    }

    /// Append an element to the end of an `Array` expression.
    pub fn array_push(&mut self, element: Expression) -> Result<()> {
        match self {
            Expression::Array(items) => {
                items.push(element);
                Ok(())
            }
            _ => Err(self.mismatch(ExpressionType::Array)),
        }
    }

    // --- Map

    /// Number of entries in a `Map` expression.
    pub fn map_len(&self) -> Result<usize> {
        match self {
            Expression::Map(entries) => Ok(entries.len()),
            _ => Err(self.mismatch(ExpressionType::Map)),
        }
    }

    /// Key at `index` in insertion order, or `None` if out of range.
    pub fn map_key_at(&self, index: usize) -> Result<Option<&str>> {
        match self {
            Expression::Map(entries) => Ok(entries.get_index(index).map(|(k, _)| k.as_str())),
            _ => Err(self.mismatch(ExpressionType::Map)),
        }
    }

    /// Value at `index` in insertion order, or `None` if out of range.
    pub fn map_value_at(&self, index: usize) -> Result<Option<&Expression>> {
        match self {
            Expression::Map(entries) => Ok(entries.get_index(index).map(|(_, v)| v)),
            _ => Err(self.mismatch(ExpressionType::Map)),
        }
    }

    /// Value stored under `key`.
    pub fn map_value_for_key(&self, key: &str) -> Result<Option<&Expression>> {
        match self {
            Expression::Map(entries) => Ok(entries.get(key)),
            _ => Err(self.mismatch(ExpressionType::Map)),
        }
    }

    /// Mutable value stored under `key`.
    pub fn map_value_for_key_mut(&mut self, key: &str) -> Result<Option<&mut Expression>> {
        match self {
            Expression::Map(entries) => Ok(entries.get_mut(key)),
            _ => Err(self.mismatch(ExpressionType::Map)),
        }
    }

    /// Store `value` under `key`. An existing key keeps its position.
    pub fn map_set_value_for_key(&mut self, key: impl Into<String>, value: Expression) -> Result<()> {
        match self {
            Expression::Map(entries) => {
                entries.insert(key.into(), value);
                Ok(())
            }
            _ => Err(self.mismatch(ExpressionType::Map)),
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Invalid => write!(f, "<invalid>"),
            Expression::Null => write!(f, "null"),
            Expression::Value(s) => write!(f, "{:?}", s),
            Expression::Array(items) => f.debug_list().entries(items).finish(),
            Expression::Map(entries) => f.debug_map().entries(entries).finish(),
            Expression::BinaryData(b) => {
                write!(f, "<")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, ">")
            }
        }
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Expression::Value(s)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Expression::Value(s.to_string())
    }
}

impl From<Vec<Expression>> for Expression {
    fn from(items: Vec<Expression>) -> Self {
        Expression::Array(items)
    }
}

impl From<IndexMap<String, Expression>> for Expression {
    fn from(entries: IndexMap<String, Expression>) -> Self {
        Expression::Map(entries)
    }
}

impl From<Vec<u8>> for Expression {
    fn from(b: Vec<u8>) -> Self {
        Expression::BinaryData(b)
    }
}
