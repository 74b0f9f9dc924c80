//! UVLQ64: unsigned 64-bit variable-length quantities.
//!
//! Values are split into 7-bit groups written most significant first. Every
//! byte but the last has its high bit set.

/// Largest encoding of a `u64`.
pub const MAX_LEN: usize = 10;

/// Number of bytes needed to encode `value`.
pub fn byte_size_for(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Write `value` to the front of `buf`.
///
/// Returns the number of bytes written, or `None` if `buf` is too small.
pub fn write(buf: &mut [u8], value: u64) -> Option<usize> {
    let len = byte_size_for(value);
    let out = buf.get_mut(..len)?;
    for (i, byte) in out.iter_mut().enumerate() {
        let shift = (len - 1 - i) * 7;
        *byte = ((value >> shift) & 0x7F) as u8 | 0x80;
    }
    out[len - 1] &= 0x7F;
    Some(len)
}

/// Append the encoding of `value` to `out`.
pub fn push(out: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; MAX_LEN];
    if let Some(len) = write(&mut buf, value) {
        out.extend_from_slice(&buf[..len]);
    }
}

/// Read a value from the front of `buf`.
///
/// Returns the value and the number of bytes consumed, or `None` if `buf`
/// ends before a terminating byte, the encoding is longer than [`MAX_LEN`],
/// or the value does not fit in a `u64`.
pub fn read(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().take(MAX_LEN).enumerate() {
        if value >> 57 != 0 {
            return None;
        }
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
