//! Binary Wexpr files.
//!
//! A file is a 20-byte header followed by chunks:
//!
//! ```text
//! 0x83 "BWEXPR\n" | u32 version (big-endian) | 8 reserved zero bytes | chunks...
//! ```
//!
//! Exactly one chunk must hold an expression. Chunks with other type bytes
//! are skipped so later format revisions can add auxiliary data.

use tracing::{debug, warn};

use crate::binary::{decode_chunk, encode_chunk, payload_slice};
use crate::endian;
use crate::error::{Error, Result};
use crate::expression::{Expression, ExpressionType};
use crate::uvlq;
use crate::version::FILE_FORMAT;

/// Leading bytes of every binary file.
pub const FILE_MAGIC: [u8; 8] = [0x83, b'B', b'W', b'E', b'X', b'P', b'R', b'\n'];

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Value of the header's version field.
pub const FILE_FORMAT_VERSION: u32 = FILE_FORMAT.to_header_field();

const VERSION_OFFSET: usize = 8;
const RESERVED_OFFSET: usize = 12;

/// Returns `true` if `data` looks like a binary file rather than text.
pub fn is_binary_file(data: &[u8]) -> bool {
    data.first() == Some(&FILE_MAGIC[0])
}

/// Write `expr` as a complete binary file.
pub fn write_binary_file(expr: &Expression) -> Result<Vec<u8>> {
    let chunk = encode_chunk(expr)?;

    let mut out = Vec::with_capacity(HEADER_SIZE + chunk.len());
    out.extend_from_slice(&FILE_MAGIC);
    out.extend_from_slice(&endian::big_u32_bytes(FILE_FORMAT_VERSION));
    out.extend_from_slice(&[0u8; HEADER_SIZE - RESERVED_OFFSET]);
    out.extend_from_slice(&chunk);
    Ok(out)
}

/// Read the root expression from a binary file.
pub fn read_binary_file(data: &[u8]) -> Result<Expression> {
    validate_header(data)?;

    let mut root = None;
    let mut pos = HEADER_SIZE;
    while pos < data.len() {
        let rest = &data[pos..];
        let (size, size_len) = uvlq::read(rest).ok_or(Error::ChunkNotBigEnough)?;
        let type_byte = *rest.get(size_len).ok_or(Error::ChunkNotBigEnough)?;
        let chunk_len = size_len + 1 + payload_slice(rest, size_len + 1, size)?.len();

        if ExpressionType::from_code(type_byte).is_some() {
            if root.is_some() {
                return Err(Error::MultipleExpressions);
            }
            debug!(offset = pos, size, "found expression chunk");
            let (expr, _) = decode_chunk(&rest[..chunk_len])?;
            root = Some(expr);
        } else {
            warn!(
                chunk_type = type_byte,
                offset = pos + size_len,
                "skipping unknown chunk"
            );
        }

        pos += chunk_len;
    }

    root.ok_or(Error::NoExpression)
}

fn validate_header(data: &[u8]) -> Result<()> {
    if data.len() < HEADER_SIZE {
        return Err(Error::InvalidHeader("not big enough"));
    }
    if data[..VERSION_OFFSET] != FILE_MAGIC {
        return Err(Error::InvalidHeader("invalid magic"));
    }

    let version = endian::read_big_u32(&data[VERSION_OFFSET..])
        .ok_or(Error::InvalidHeader("not big enough"))?;
    if version != FILE_FORMAT_VERSION {
        return Err(Error::UnknownVersion(version));
    }

    if data[RESERVED_OFFSET..HEADER_SIZE].iter().any(|&b| b != 0) {
        return Err(Error::InvalidHeader("unknown reserved bits"));
    }
    Ok(())
}
