//! Fixed width scalars with a selectable byte order.
//!
//! Every integer width (8/16/32/64 bit, signed or unsigned) and both IEEE-754 float widths
//! implement [`FixedWidth`]. [`ByteCursor`] and [`ByteSink`] use it to read and write scalars
//! in a single generic code path, so `read_u32`, `read_i64`, `read_f32` and friends are all the
//! same monomorphized function.
//!
//! ```
//! use wirebuf::{Endian, FixedWidth};
//! assert_eq!(42u32.to_fixed(Endian::Big), [0, 0, 0, 42]);
//! assert_eq!(42u32.to_fixed(Endian::Little), [42, 0, 0, 0]);
//! assert_eq!(u32::from_fixed([0, 0, 0, 42], Endian::Big), 42);
//! ```
//!
//! [`ByteCursor`]: crate::ByteCursor
//! [`ByteSink`]: crate::ByteSink

use crate::{EncodingError, Endian, IntWidth};

/// A scalar with a fixed encoded width.
pub trait FixedWidth: Copy {
    /// The encoded bytes of this type.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default + Copy;

    /// The size in bytes of the encoded value.
    const WIDTH: usize;

    /// Encode `self` in the given byte order.
    fn to_fixed(self, endian: Endian) -> Self::Bytes;

    /// Decode a value from `bytes` in the given byte order.
    fn from_fixed(bytes: Self::Bytes, endian: Endian) -> Self;
}

macro_rules! impl_fixed_width {
    ($($t:ty => $n:expr),* $(,)?) => {
        $(
            impl FixedWidth for $t {
                type Bytes = [u8; $n];
                const WIDTH: usize = $n;

                #[inline]
                fn to_fixed(self, endian: Endian) -> Self::Bytes {
                    match endian {
                        Endian::Big => self.to_be_bytes(),
                        Endian::Little => self.to_le_bytes(),
                    }
                }

                #[inline]
                fn from_fixed(bytes: Self::Bytes, endian: Endian) -> Self {
                    match endian {
                        Endian::Big => <$t>::from_be_bytes(bytes),
                        Endian::Little => <$t>::from_le_bytes(bytes),
                    }
                }
            }
        )*
    };
}

impl_fixed_width! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Check that `value` is representable at `width`/`signed`.
pub(crate) fn check_int_range(
    value: i128,
    width: IntWidth,
    signed: bool,
) -> Result<(), EncodingError> {
    let (min, max) = width.range(signed);
    if value < min || value > max {
        let sign = if signed { "signed" } else { "unsigned" };
        return Err(EncodingError::out_of_range(&format!(
            "Value [{value}] does not fit {sign} {}-bit integer range [{min}, {max}]",
            width.bits()
        )));
    }
    Ok(())
}

/// Encode an already range checked `value` into the low `width` bytes of a 64 bit scratch array.
/// Returns the scratch array and the number of bytes used.
pub(crate) fn int_to_fixed(value: i128, width: IntWidth, endian: Endian) -> ([u8; 8], usize) {
    // Two's complement truncation to the target width.
    let raw = value as u64;
    let n = width.bytes();
    let mut out = [0u8; 8];
    match endian {
        Endian::Big => out[..n].copy_from_slice(&raw.to_be_bytes()[8 - n..]),
        Endian::Little => out[..n].copy_from_slice(&raw.to_le_bytes()[..n]),
    }
    (out, n)
}

/// Decode `bytes` (exactly `width` long) as an integer of the given width and signedness.
pub(crate) fn int_from_fixed(bytes: &[u8], width: IntWidth, signed: bool, endian: Endian) -> i128 {
    let n = width.bytes();
    let mut wide = [0u8; 8];
    match endian {
        Endian::Big => wide[8 - n..].copy_from_slice(bytes),
        Endian::Little => wide[..n].copy_from_slice(bytes),
    }
    let raw = match endian {
        Endian::Big => u64::from_be_bytes(wide),
        Endian::Little => u64::from_le_bytes(wide),
    };
    if signed {
        // Sign extend from the top bit of the width.
        let shift = 64 - width.bits();
        (((raw << shift) as i64) >> shift) as i128
    } else {
        raw as i128
    }
}
