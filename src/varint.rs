//! Base-128 varints and zigzag signed varints.
//!
//! Unsigned values are written low-order group first, seven data bits per byte, with bit 7 set
//! on every byte except the last (LEB128). Signed values are zigzag mapped first so that small
//! magnitudes of either sign stay short.
//!
//! ```
//! use wirebuf::varint::{decode_var_u64, encode_var_u64};
//! let mut buf = Vec::new();
//! encode_var_u64(300, &mut buf);
//! assert_eq!(buf, vec![0xac, 0x02]);
//! let (value, rest) = decode_var_u64(&buf)?;
//! assert_eq!(value, 300);
//! assert!(rest.is_empty());
//! # Ok::<(), wirebuf::EncodingError>(())
//! ```

use crate::{
    types::{MAX_VARINT32_LEN, MAX_VARINT64_LEN},
    EncodingError,
};

const CONTINUATION_BIT: u8 = 0x80;
const GROUP_MASK: u8 = 0x7f;

/// Map a signed value onto an unsigned one, interleaving the sign.
#[inline]
pub fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`].
#[inline]
pub fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Map a signed value onto an unsigned one, interleaving the sign.
#[inline]
pub fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode_32`].
#[inline]
pub fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// The number of bytes required to varint encode `value`.
pub fn var_u64_encoded_size(value: u64) -> usize {
    // One group per started block of 7 significant bits, at least one group.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Append the varint encoding of `value` to `out`. Returns the number of bytes written.
#[inline]
pub fn encode_var_u64(value: u64, out: &mut Vec<u8>) -> usize {
    if value < u64::from(CONTINUATION_BIT) {
        out.push(value as u8);
        return 1;
    }
    let mut scratch = [0u8; MAX_VARINT64_LEN];
    let n = write_groups(value, &mut scratch);
    out.extend_from_slice(&scratch[..n]);
    n
}

/// Append the varint encoding of `value` to `out`. Returns the number of bytes written.
#[inline]
pub fn encode_var_u32(value: u32, out: &mut Vec<u8>) -> usize {
    encode_var_u64(u64::from(value), out)
}

/// Append the zigzag varint encoding of `value` to `out`. Returns the number of bytes written.
#[inline]
pub fn encode_var_i64(value: i64, out: &mut Vec<u8>) -> usize {
    encode_var_u64(zigzag_encode_64(value), out)
}

/// Append the zigzag varint encoding of `value` to `out`. Returns the number of bytes written.
#[inline]
pub fn encode_var_i32(value: i32, out: &mut Vec<u8>) -> usize {
    encode_var_u64(u64::from(zigzag_encode_32(value)), out)
}

fn write_groups(mut value: u64, scratch: &mut [u8; MAX_VARINT64_LEN]) -> usize {
    let mut i = 0;
    while value >= u64::from(CONTINUATION_BIT) {
        scratch[i] = (value as u8 & GROUP_MASK) | CONTINUATION_BIT;
        value >>= 7;
        i += 1;
    }
    scratch[i] = value as u8;
    i + 1
}

/// Decode a varint of at most `max_groups` groups and `bits` payload bits.
fn decode_groups(
    buffer: &[u8],
    max_groups: usize,
    bits: u32,
) -> Result<(u64, usize), EncodingError> {
    let mut result = 0u64;
    for (i, &byte) in buffer.iter().take(max_groups).enumerate() {
        let shift = 7 * i as u32;
        let payload = u64::from(byte & GROUP_MASK);
        if byte & CONTINUATION_BIT != 0 {
            result |= payload << shift;
            continue;
        }
        // Only the final allowed group can carry bits past the target width.
        if shift + 7 > bits && payload >> (bits - shift) != 0 {
            return Err(EncodingError::out_of_range(&format!(
                "Varint overflows {bits}-bit integer at byte [{i}]"
            )));
        }
        return Ok((result | (payload << shift), i + 1));
    }
    if buffer.len() < max_groups {
        Err(EncodingError::out_of_bounds(&format!(
            "Varint truncated, buffer ended after [{}] bytes",
            buffer.len()
        )))
    } else {
        Err(EncodingError::out_of_bounds(&format!(
            "Varint did not terminate within [{max_groups}] bytes"
        )))
    }
}

/// Decode a varint `u64` from the start of `buffer`, returning it with the remaining bytes.
pub fn decode_var_u64(buffer: &[u8]) -> Result<(u64, &[u8]), EncodingError> {
    let (value, used) = decode_groups(buffer, MAX_VARINT64_LEN, 64)?;
    Ok((value, &buffer[used..]))
}

/// Decode a varint `u32` from the start of `buffer`, returning it with the remaining bytes.
pub fn decode_var_u32(buffer: &[u8]) -> Result<(u32, &[u8]), EncodingError> {
    let (value, used) = decode_groups(buffer, MAX_VARINT32_LEN, 32)?;
    Ok((value as u32, &buffer[used..]))
}

/// Decode a zigzag varint `i64` from the start of `buffer`, returning it with the remaining bytes.
pub fn decode_var_i64(buffer: &[u8]) -> Result<(i64, &[u8]), EncodingError> {
    let (value, rest) = decode_var_u64(buffer)?;
    Ok((zigzag_decode_64(value), rest))
}

/// Decode a zigzag varint `i32` from the start of `buffer`, returning it with the remaining bytes.
pub fn decode_var_i32(buffer: &[u8]) -> Result<(i32, &[u8]), EncodingError> {
    let (value, rest) = decode_var_u32(buffer)?;
    Ok((zigzag_decode_32(value), rest))
}
