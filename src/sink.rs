//! Growable encode buffer.
//!
//! # Growth policy
//!
//! Before a write of `size` bytes, if `offset + size` exceeds the current capacity the buffer
//! is reallocated to `max(capacity * growth_factor, offset + size)` and the written prefix is
//! carried over. The growth factor defaults to [`DEFAULT_GROWTH_FACTOR`] (1.5) and is the same
//! for every write path, including [`ByteSink::reserve`].

use crate::{
    fixedwidth::{check_int_range, int_to_fixed, FixedWidth},
    utf8, varint, EncodingError, Endian, IntWidth,
};

/// Initial capacity of a sink built from [`SinkConfig::default`].
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;
/// Capacity multiplier applied when a sink runs out of room.
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;

/// Configuration for a [`ByteSink`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SinkConfig {
    /// Capacity allocated on creation and after every [`ByteSink::reset`]/[`ByteSink::take_bytes`].
    pub initial_capacity: usize,

    /// Multiplier applied to the capacity when a write does not fit. Must be finite and above 1.
    pub growth_factor: f64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl SinkConfig {
    /// Create a sink configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial capacity.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the growth factor.
    #[must_use]
    pub fn growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Check that the configuration can drive a sink.
    pub fn validate(&self) -> Result<(), EncodingError> {
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(EncodingError::invalid_argument(&format!(
                "Growth factor must be finite and greater than 1, got [{}]",
                self.growth_factor
            )));
        }
        Ok(())
    }
}

macro_rules! typed_writes {
    ($($name:ident => $t:ty),* $(,)?) => {
        $(
            #[doc = concat!("Write a `", stringify!($t), "` in the given byte order.")]
            #[inline]
            pub fn $name(&mut self, value: $t, endian: Endian) {
                self.write_fixed(value, endian)
            }
        )*
    };
}

/// Growable, owned encode buffer.
///
/// ```
/// use wirebuf::{ByteSink, Endian};
/// let mut sink = ByteSink::new();
/// sink.write_u32(42, Endian::Big);
/// sink.write_string("Hello");
/// assert_eq!(sink.take_bytes(), vec![0, 0, 0, 42, b'H', b'e', b'l', b'l', b'o']);
/// assert_eq!(sink.bytes_written(), 0);
/// ```
#[derive(Debug)]
pub struct ByteSink {
    buffer: Vec<u8>,
    config: SinkConfig,
    /// Id of the pool this sink is currently checked out of.
    pub(crate) lease: Option<u64>,
}

impl Default for ByteSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ByteSink {
    /// The clone holds the same bytes but is not checked out of any pool.
    fn clone(&self) -> Self {
        let mut buffer = Vec::with_capacity(self.buffer.capacity());
        buffer.extend_from_slice(&self.buffer);
        Self {
            buffer,
            config: self.config.clone(),
            lease: None,
        }
    }
}

impl ByteSink {
    /// Create a sink with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(SinkConfig::default())
    }

    /// Create a sink with the default growth factor and `capacity` initial bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_valid_config(SinkConfig::default().initial_capacity(capacity))
    }

    /// Create a sink from `config`, failing if it does not validate.
    pub fn with_config(config: SinkConfig) -> Result<Self, EncodingError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    pub(crate) fn from_valid_config(config: SinkConfig) -> Self {
        Self {
            buffer: Vec::with_capacity(config.initial_capacity),
            config,
            lease: None,
        }
    }

    /// The configuration this sink was built with.
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Number of bytes written since creation or the last reset.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    /// Alias of [`ByteSink::bytes_written`].
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Currently allocated capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Make room for `additional` more bytes according to the growth policy.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.buffer.len().saturating_add(additional);
        let capacity = self.buffer.capacity();
        if needed > capacity {
            self.grow(capacity, needed);
        }
    }

    #[cold]
    fn grow(&mut self, capacity: usize, needed: usize) {
        let scaled = (capacity as f64 * self.config.growth_factor) as usize;
        let target = scaled.max(needed);
        tracing::trace!(from = capacity, to = target, "Growing sink buffer");
        self.buffer.reserve_exact(target - self.buffer.len());
    }

    /// Write any fixed width scalar.
    #[inline]
    pub fn write_fixed<T: FixedWidth>(&mut self, value: T, endian: Endian) {
        self.reserve(T::WIDTH);
        self.buffer
            .extend_from_slice(value.to_fixed(endian).as_ref());
    }

    /// Write an integer whose width and signedness are only known at runtime.
    ///
    /// Fails with [`OutOfRange`](crate::EncodingErrorKind::OutOfRange) and writes nothing if
    /// `value` is not representable at that width and signedness.
    pub fn write_int(
        &mut self,
        value: i128,
        width: IntWidth,
        signed: bool,
        endian: Endian,
    ) -> Result<(), EncodingError> {
        check_int_range(value, width, signed)?;
        let (bytes, n) = int_to_fixed(value, width, endian);
        self.write_bytes(&bytes[..n]);
        Ok(())
    }

    /// Write one byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.reserve(1);
        self.buffer.push(value);
    }

    /// Write an `i8` as one two's complement byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    /// Write a bool as one byte, `1` or `0`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    typed_writes! {
        write_u16 => u16,
        write_i16 => i16,
        write_u32 => u32,
        write_i32 => i32,
        write_u64 => u64,
        write_i64 => i64,
        write_f32 => f32,
        write_f64 => f64,
    }

    /// Write a varint `u64`.
    #[inline]
    pub fn write_var_u64(&mut self, value: u64) {
        self.reserve(varint::var_u64_encoded_size(value));
        varint::encode_var_u64(value, &mut self.buffer);
    }

    /// Write a varint `u32`.
    #[inline]
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_var_u64(u64::from(value));
    }

    /// Write a zigzag varint `i64`.
    #[inline]
    pub fn write_var_i64(&mut self, value: i64) {
        self.write_var_u64(varint::zigzag_encode_64(value));
    }

    /// Write a zigzag varint `i32`.
    #[inline]
    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_u64(u64::from(varint::zigzag_encode_32(value)));
    }

    /// Copy a contiguous byte slice in. Empty input is a no-op.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.reserve(bytes.len());
        self.buffer.extend_from_slice(bytes);
    }

    /// Copy bytes from any iterator in.
    ///
    /// Prefer [`ByteSink::write_bytes`] when the bytes are already contiguous.
    pub fn extend_bytes<I: IntoIterator<Item = u8>>(&mut self, bytes: I) {
        let iter = bytes.into_iter();
        self.reserve(iter.size_hint().0);
        for byte in iter {
            self.write_u8(byte);
        }
    }

    /// Write the UTF-8 bytes of `value`, without a length prefix.
    #[inline]
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Encode UTF-16 code units as UTF-8, without a length prefix. Returns the bytes written.
    ///
    /// Unpaired surrogates become U+FFFD when `allow_malformed` is set and are an
    /// [`InvalidEncoding`](crate::EncodingErrorKind::InvalidEncoding) error otherwise, in which
    /// case the sink is left untouched.
    pub fn write_utf16(
        &mut self,
        units: &[u16],
        allow_malformed: bool,
    ) -> Result<usize, EncodingError> {
        if !allow_malformed {
            utf8::utf16_encoded_len(units, false)?;
        }
        self.reserve(utf8::utf16_encoded_capacity(units.len()));
        utf8::encode_utf16_unreserved(units, allow_malformed, &mut self.buffer)
    }

    /// Write a varint length prefix followed by `bytes`.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_var_u64(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    /// Write a varint byte length prefix followed by the UTF-8 bytes of `value`.
    pub fn write_var_string(&mut self, value: &str) {
        self.write_var_bytes(value.as_bytes());
    }

    /// Write a varint byte length prefix followed by UTF-16 `units` encoded as UTF-8.
    pub fn write_var_utf16(
        &mut self,
        units: &[u16],
        allow_malformed: bool,
    ) -> Result<(), EncodingError> {
        let len = utf8::utf16_encoded_len(units, allow_malformed)?;
        self.reserve(varint::var_u64_encoded_size(len as u64) + len);
        self.write_var_u64(len as u64);
        utf8::encode_utf16_unreserved(units, allow_malformed, &mut self.buffer)?;
        Ok(())
    }

    /// Borrow everything written so far. Writes are impossible while the view is alive.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Copy of everything written so far. The sink keeps its content and later writes append.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// Move everything written so far out and start over with a fresh buffer of the initial
    /// capacity.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.config.initial_capacity),
        )
    }

    /// Discard all content and return to the initial capacity.
    pub fn reset(&mut self) {
        if self.buffer.capacity() == self.config.initial_capacity {
            self.buffer.clear();
        } else {
            self.buffer = Vec::with_capacity(self.config.initial_capacity);
        }
    }
}
