//! Byte order helpers for fixed-width header fields, which are big-endian.

pub fn u32_to_big(v: u32) -> u32 {
    v.to_be()
}

pub fn big_u32_to_native(v: u32) -> u32 {
    u32::from_be(v)
}

/// Read a big-endian `u32` stored at the front of `bytes`.
pub fn read_big_u32(bytes: &[u8]) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(big_u32_to_native(u32::from_ne_bytes(raw)))
}

/// The big-endian bytes of `v`.
pub fn big_u32_bytes(v: u32) -> [u8; 4] {
    u32_to_big(v).to_ne_bytes()
}
