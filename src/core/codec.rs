//! Binary encoding of values kept in the key-value collections.
//!
//! Rates are stored as the big-endian bit pattern of an `f64`, positions as a
//! big-endian `u32` and timestamps as a big-endian `i64`. Every decoder checks
//! the exact width and returns `None` for anything else.

pub const RATE_WIDTH: usize = 8;
pub const POSITION_WIDTH: usize = 4;
pub const TIMESTAMP_WIDTH: usize = 8;

pub fn encode_rate(rate: f64) -> Vec<u8> {
    rate.to_bits().to_be_bytes().to_vec()
}

pub fn decode_rate(bytes: &[u8]) -> Option<f64> {
    let raw: [u8; RATE_WIDTH] = bytes.try_into().ok()?;
    Some(f64::from_bits(u64::from_be_bytes(raw)))
}

pub fn encode_position(position: u32) -> Vec<u8> {
    position.to_be_bytes().to_vec()
}

pub fn decode_position(bytes: &[u8]) -> Option<u32> {
    let raw: [u8; POSITION_WIDTH] = bytes.try_into().ok()?;
    Some(u32::from_be_bytes(raw))
}

pub fn encode_timestamp(seconds: i64) -> Vec<u8> {
    seconds.to_be_bytes().to_vec()
}

pub fn decode_timestamp(bytes: &[u8]) -> Option<i64> {
    let raw: [u8; TIMESTAMP_WIDTH] = bytes.try_into().ok()?;
    Some(i64::from_be_bytes(raw))
}
