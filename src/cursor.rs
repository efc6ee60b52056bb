//! Bounds-checked decode cursor over a borrowed byte buffer.
//!
//! A [`ByteCursor`] never owns or mutates the bytes it reads. Byte and string views it returns
//! alias the source buffer and share its lifetime `'a`, so they stay valid for as long as the
//! caller keeps the buffer alive, independent of the cursor itself. Every read either consumes
//! its full width and advances [`ByteCursor::offset`], or fails and leaves the offset untouched.

use std::borrow::Cow;

use crate::{
    fixedwidth::{int_from_fixed, FixedWidth},
    utf8, varint, EncodingError, Endian, IntWidth,
};

macro_rules! typed_reads {
    ($($name:ident => $t:ty),* $(,)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($t), "` in the given byte order.")]
            #[inline]
            pub fn $name(&mut self, endian: Endian) -> Result<$t, EncodingError> {
                self.read_fixed::<$t>(endian)
            }
        )*
    };
}

/// Decode cursor over a borrowed byte buffer.
///
/// ```
/// use wirebuf::{ByteCursor, Endian};
/// let bytes = [0x00, 0x2a, 0x05, b'h', b'e', b'l', b'l', b'o'];
/// let mut cursor = ByteCursor::new(&bytes);
/// assert_eq!(cursor.read_u16(Endian::Big)?, 42);
/// assert_eq!(cursor.read_var_string(false)?, "hello");
/// assert_eq!(cursor.available_bytes(), 0);
/// # Ok::<(), wirebuf::EncodingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when the underlying buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of unread bytes.
    #[inline]
    pub fn available_bytes(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// True while unread bytes remain.
    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.offset < self.buffer.len()
    }

    /// Zero-copy view of all unread bytes. Does not advance.
    #[inline]
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }

    /// The `n` bytes starting at `at`, or an out of bounds error.
    fn slice_at(&self, at: usize, n: usize) -> Result<&'a [u8], EncodingError> {
        let buffer = self.buffer;
        at.checked_add(n)
            .and_then(|end| buffer.get(at..end))
            .ok_or_else(|| {
                EncodingError::out_of_bounds(&format!(
                    "Could not read [{n}] bytes at offset [{at}] from buffer of length [{}]",
                    buffer.len()
                ))
            })
    }

    /// Split the next `N` bytes off and return them.
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], EncodingError> {
        let Some((out, _)) = self.remaining_slice().split_first_chunk::<N>() else {
            return Err(EncodingError::out_of_bounds(&format!(
                "Could not read [{N}] bytes at offset [{}] from buffer of length [{}]",
                self.offset,
                self.buffer.len()
            )));
        };
        self.offset += N;
        Ok(*out)
    }

    /// Read any fixed width scalar.
    #[inline]
    pub fn read_fixed<T: FixedWidth>(&mut self, endian: Endian) -> Result<T, EncodingError> {
        let data = self.slice_at(self.offset, T::WIDTH)?;
        let mut bytes = T::Bytes::default();
        bytes.as_mut().copy_from_slice(data);
        self.offset += T::WIDTH;
        Ok(T::from_fixed(bytes, endian))
    }

    /// Read an integer whose width and signedness are only known at runtime.
    pub fn read_int(
        &mut self,
        width: IntWidth,
        signed: bool,
        endian: Endian,
    ) -> Result<i128, EncodingError> {
        let data = self.slice_at(self.offset, width.bytes())?;
        self.offset += width.bytes();
        Ok(int_from_fixed(data, width, signed, endian))
    }

    /// Read one byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, EncodingError> {
        let [byte] = self.take_array::<1>()?;
        Ok(byte)
    }

    /// Read one byte as a two's complement `i8`.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, EncodingError> {
        Ok(self.read_u8()? as i8)
    }

    /// Read one byte as a bool, any non-zero value is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, EncodingError> {
        Ok(self.read_u8()? != 0)
    }

    typed_reads! {
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Read a varint `u64`.
    pub fn read_var_u64(&mut self) -> Result<u64, EncodingError> {
        let (value, rest) = varint::decode_var_u64(self.remaining_slice())?;
        self.offset = self.buffer.len() - rest.len();
        Ok(value)
    }

    /// Read a varint `u32`.
    pub fn read_var_u32(&mut self) -> Result<u32, EncodingError> {
        let (value, rest) = varint::decode_var_u32(self.remaining_slice())?;
        self.offset = self.buffer.len() - rest.len();
        Ok(value)
    }

    /// Read a zigzag varint `i64`.
    pub fn read_var_i64(&mut self) -> Result<i64, EncodingError> {
        let (value, rest) = varint::decode_var_i64(self.remaining_slice())?;
        self.offset = self.buffer.len() - rest.len();
        Ok(value)
    }

    /// Read a zigzag varint `i32`.
    pub fn read_var_i32(&mut self) -> Result<i32, EncodingError> {
        let (value, rest) = varint::decode_var_i32(self.remaining_slice())?;
        self.offset = self.buffer.len() - rest.len();
        Ok(value)
    }

    /// Zero-copy read of the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], EncodingError> {
        let out = self.slice_at(self.offset, n)?;
        self.offset += n;
        Ok(out)
    }

    /// Read the next `n` bytes as UTF-8 text.
    ///
    /// Valid text borrows from the source buffer. See [`utf8::decode`] for `allow_malformed`.
    pub fn read_string(
        &mut self,
        n: usize,
        allow_malformed: bool,
    ) -> Result<Cow<'a, str>, EncodingError> {
        if n == 0 {
            return Ok(Cow::Borrowed(""));
        }
        let bytes = self.slice_at(self.offset, n)?;
        let text = utf8::decode(bytes, allow_malformed)?;
        self.offset += n;
        Ok(text)
    }

    /// Read a varint length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], EncodingError> {
        let start = self.offset;
        let len = self.read_var_len()?;
        self.read_bytes(len).inspect_err(|_| self.offset = start)
    }

    /// Read a varint length prefix followed by that many bytes of UTF-8 text.
    pub fn read_var_string(
        &mut self,
        allow_malformed: bool,
    ) -> Result<Cow<'a, str>, EncodingError> {
        let start = self.offset;
        let len = self.read_var_len()?;
        self.read_string(len, allow_malformed)
            .inspect_err(|_| self.offset = start)
    }

    fn read_var_len(&mut self) -> Result<usize, EncodingError> {
        let start = self.offset;
        let len = self.read_var_u64()?;
        usize::try_from(len).map_err(|_| {
            self.offset = start;
            EncodingError::out_of_range(&format!("Length [{len}] does not fit usize"))
        })
    }

    /// Look at the next byte without advancing.
    pub fn peek_u8(&self) -> Result<u8, EncodingError> {
        Ok(self.slice_at(self.offset, 1)?[0])
    }

    /// Zero-copy view of the next `n` bytes without advancing.
    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8], EncodingError> {
        self.peek_bytes_at(n, self.offset)
    }

    /// Zero-copy view of `n` bytes starting at the absolute position `at`, without advancing.
    pub fn peek_bytes_at(&self, n: usize, at: usize) -> Result<&'a [u8], EncodingError> {
        if n == 0 {
            return Ok(&[]);
        }
        self.slice_at(at, n)
    }

    /// Advance by `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), EncodingError> {
        if n > self.available_bytes() {
            return Err(EncodingError::out_of_bounds(&format!(
                "Could not skip [{n}] bytes at offset [{}] in buffer of length [{}]",
                self.offset,
                self.buffer.len()
            )));
        }
        self.offset += n;
        Ok(())
    }

    /// Move to the absolute `position`. Positions before the current offset are allowed.
    pub fn seek(&mut self, position: usize) -> Result<(), EncodingError> {
        if position > self.buffer.len() {
            return Err(EncodingError::out_of_bounds(&format!(
                "Could not seek to [{position}] in buffer of length [{}]",
                self.buffer.len()
            )));
        }
        self.offset = position;
        Ok(())
    }

    /// Move back to the start of the buffer.
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}
