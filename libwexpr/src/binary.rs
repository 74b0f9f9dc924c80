//! Binary chunk encoding.
//!
//! Every expression is one chunk:
//!
//! ```text
//! UVLQ64(payload size) | type byte | payload
//! ```
//!
//! The type byte is the [`ExpressionType`] code. Payloads:
//!   - Null       -> empty
//!   - Value      -> UTF-8 text
//!   - Array      -> child chunks, back to back
//!   - Map        -> key chunk (a Value) then value chunk, for each entry
//!   - BinaryData -> compression byte (0x00 = raw) then the bytes

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::expression::{Expression, ExpressionType};
use crate::uvlq;

/// The only compression method: bytes stored as-is.
pub const COMPRESSION_RAW: u8 = 0x00;

/// Size prefix and type byte.
const MIN_CHUNK_LEN: usize = 2;

/// Encode an expression and its children as a single chunk.
pub fn encode_chunk(expr: &Expression) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_chunk(&mut out, expr)?;
    Ok(out)
}

fn write_chunk(out: &mut Vec<u8>, expr: &Expression) -> Result<()> {
    let payload = match expr {
        Expression::Invalid => return Err(Error::InvalidExpression),
        Expression::Null => Vec::new(),
        Expression::Value(s) => s.as_bytes().to_vec(),
        Expression::Array(items) => {
            let mut payload = Vec::new();
            for item in items {
                write_chunk(&mut payload, item)?;
            }
            payload
        }
        Expression::Map(entries) => {
            let mut payload = Vec::new();
            for (key, value) in entries {
                write_header(&mut payload, ExpressionType::Value, key.len());
                payload.extend_from_slice(key.as_bytes());
                write_chunk(&mut payload, value)?;
            }
            payload
        }
        Expression::BinaryData(data) => {
            let mut payload = Vec::with_capacity(data.len() + 1);
            payload.push(COMPRESSION_RAW);
            payload.extend_from_slice(data);
            payload
        }
    };

    write_header(out, expr.expression_type(), payload.len());
    out.extend_from_slice(&payload);
    Ok(())
}

fn write_header(out: &mut Vec<u8>, typ: ExpressionType, size: usize) {
    uvlq::push(out, size as u64);
    out.push(typ.code());
}

/// Decode one chunk from the front of `data`.
///
/// Returns the expression and the number of bytes the chunk occupied, so
/// callers can continue with `&data[used..]`.
pub fn decode_chunk(data: &[u8]) -> Result<(Expression, usize)> {
    if data.len() < MIN_CHUNK_LEN {
        return Err(Error::ChunkNotBigEnough);
    }

    let (size, size_len) = uvlq::read(data).ok_or(Error::ChunkNotBigEnough)?;
    let type_byte = *data.get(size_len).ok_or(Error::ChunkNotBigEnough)?;
    let start = size_len + 1;
    let payload = payload_slice(data, start, size)?;
    let used = start + payload.len();

    let typ = ExpressionType::from_code(type_byte).ok_or(Error::UnknownChunkType(type_byte))?;
    let expr = match typ {
        ExpressionType::Null => Expression::Null,
        ExpressionType::Value => Expression::Value(decode_text(payload)?),
        ExpressionType::Array => {
            let mut items = Vec::new();
            let mut pos = 0;
            while pos < payload.len() {
                let (item, n) = decode_chunk(&payload[pos..])?;
                items.push(item);
                pos += n;
            }
            Expression::Array(items)
        }
        ExpressionType::Map => {
            let mut entries = IndexMap::new();
            let mut pos = 0;
            while pos < payload.len() {
                let (key, n) = decode_chunk(&payload[pos..])?;
                pos += n;
                let Expression::Value(key) = key else {
                    return Err(Error::ChunkMapKeyNotValue);
                };
                let (value, n) = decode_chunk(&payload[pos..])?;
                pos += n;
                entries.insert(key, value);
            }
            Expression::Map(entries)
        }
        ExpressionType::BinaryData => {
            let (&compression, bytes) = payload.split_first().ok_or(Error::ChunkNotBigEnough)?;
            if compression != COMPRESSION_RAW {
                return Err(Error::UnknownCompression(compression));
            }
            Expression::BinaryData(bytes.to_vec())
        }
        ExpressionType::Invalid => return Err(Error::UnknownChunkType(type_byte)),
    };

    Ok((expr, used))
}

/// The `size` bytes of `data` starting at `start`.
pub(crate) fn payload_slice(data: &[u8], start: usize, size: u64) -> Result<&[u8]> {
    let available = data.len().saturating_sub(start);
    match usize::try_from(size) {
        Ok(len) if len <= available => Ok(&data[start..start + len]),
        _ => Err(Error::ChunkBiggerThanData { size, available }),
    }
}

fn decode_text(payload: &[u8]) -> Result<String> {
    std::str::from_utf8(payload)
        .map(str::to_string)
        .map_err(|_| Error::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(expr: &Expression) -> Expression {
        let bytes = encode_chunk(expr).unwrap();
        let (decoded, used) = decode_chunk(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        decoded
    }

    #[test]
    fn test_null_chunk() {
        assert_eq!(encode_chunk(&Expression::Null).unwrap(), vec![0x00, 0x00]);
        assert_eq!(round_trip(&Expression::Null), Expression::Null);
    }

    #[test]
    fn test_value_chunk() {
        let bytes = encode_chunk(&Expression::value("hi")).unwrap();
        assert_eq!(bytes, vec![0x02, 0x01, b'h', b'i']);
        assert_eq!(round_trip(&Expression::value("")), Expression::value(""));
    }

    #[test]
    fn test_binary_data_chunk() {
        let bytes = encode_chunk(&Expression::binary_data(vec![9, 8])).unwrap();
        assert_eq!(bytes, vec![0x03, 0x04, 0x00, 9, 8]);
    }

    #[test]
    fn test_nested_round_trip() {
        let mut inner = Expression::map();
        inner
            .map_set_value_for_key("deep", Expression::from(vec![Expression::value("x")]))
            .unwrap();
        inner
            .map_set_value_for_key("bin", Expression::binary_data(vec![0, 1, 2, 255]))
            .unwrap();
        let mut root = Expression::map();
        root.map_set_value_for_key("z", Expression::Null).unwrap();
        root.map_set_value_for_key("a", Expression::from(vec![inner, Expression::array()]))
            .unwrap();

        let decoded = round_trip(&root);
        assert_eq!(decoded, root);
        assert_eq!(decoded.map_key_at(0).unwrap(), Some("z"));
    }

    #[test]
    fn test_large_payload_uses_multi_byte_size() {
        let text = "x".repeat(300);
        let bytes = encode_chunk(&Expression::value(text.clone())).unwrap();
        assert_eq!(&bytes[..3], &[0x82, 0x2c, 0x01]);
        assert_eq!(round_trip(&Expression::value(text.clone())), Expression::value(text));
    }

    #[test]
    fn test_decode_leaves_trailing_data() {
        let mut bytes = encode_chunk(&Expression::value("a")).unwrap();
        bytes.extend_from_slice(&[0xde, 0xad]);
        let (expr, used) = decode_chunk(&bytes).unwrap();
        assert_eq!(expr, Expression::value("a"));
        assert_eq!(&bytes[used..], &[0xde, 0xad]);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_chunk(&[0x00]), Err(Error::ChunkNotBigEnough));
        assert_eq!(decode_chunk(&[0x80, 0x80]), Err(Error::ChunkNotBigEnough));
        assert_eq!(decode_chunk(&[0x00, 0x07]), Err(Error::UnknownChunkType(7)));
        assert_eq!(decode_chunk(&[0x02, 0x04, 0x01, 0x00]), Err(Error::UnknownCompression(1)));
        assert_eq!(decode_chunk(&[0x00, 0x04]), Err(Error::ChunkNotBigEnough));
        assert_eq!(decode_chunk(&[0x02, 0x01, 0xff, 0xfe]), Err(Error::InvalidUtf8));
        assert_eq!(
            decode_chunk(&[0x05, 0x01, b'a']),
            Err(Error::ChunkBiggerThanData {
                size: 5,
                available: 1
            })
        );
        // Size prefix longer than a u64 can take.
        let mut overlong = vec![0xff; 11];
        overlong.extend_from_slice(&[0x01, 0x01]);
        assert_eq!(decode_chunk(&overlong), Err(Error::ChunkNotBigEnough));
        // Map whose key chunk is null.
        assert_eq!(
            decode_chunk(&[0x04, 0x03, 0x00, 0x00, 0x00, 0x00]),
            Err(Error::ChunkMapKeyNotValue)
        );
    }

    #[test]
    fn test_invalid_cannot_be_encoded() {
        assert_eq!(encode_chunk(&Expression::Invalid), Err(Error::InvalidExpression));
    }
}
