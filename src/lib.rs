#![forbid(unsafe_code, missing_docs)]
#![cfg_attr(test, deny(warnings))]
#![doc(test(attr(deny(warnings))))]

//! # Bounds-checked binary cursors and pooled encode buffers for building wire formats
//!
//! Messages are built by issuing an ordered sequence of typed writes against a [`ByteSink`]
//! and parsed by issuing the same sequence of typed reads against a [`ByteCursor`]. There is
//! no schema: the call order is the format.
//!
//! - Fixed width integers and floats in either byte order ([`Endian`], big endian by default).
//! - Base-128 varints and zigzag signed varints ([`varint`]).
//! - UTF-8 text, including a UTF-16 code unit encoder with a defined policy for unpaired
//!   surrogates ([`utf8`]).
//! - "Var" framing: a varint byte length followed by the payload.
//! - A thread safe [`SinkPool`] to reuse sinks across encode cycles.
//!
//! ## Usage
//!
//! ```
//! use wirebuf::{ByteCursor, ByteSink, Endian};
//!
//! // Encode
//! let mut sink = ByteSink::new();
//! sink.write_u32(42, Endian::Big);
//! sink.write_var_i64(-3);
//! sink.write_var_string("hi");
//! sink.write_f64(0.5, Endian::Little);
//! let buffer = sink.take_bytes();
//!
//! // Decode, in the same order
//! let mut cursor = ByteCursor::new(&buffer);
//! assert_eq!(cursor.read_u32(Endian::Big)?, 42);
//! assert_eq!(cursor.read_var_i64()?, -3);
//! assert_eq!(cursor.read_var_string(false)?, "hi");
//! assert_eq!(cursor.read_f64(Endian::Little)?, 0.5);
//! assert_eq!(cursor.available_bytes(), 0);
//! # Ok::<(), wirebuf::EncodingError>(())
//! ```
pub mod cursor;
pub mod fixedwidth;
pub mod pool;
pub mod sink;
pub mod types;
pub mod utf8;
pub mod varint;

pub use cursor::ByteCursor;
pub use fixedwidth::FixedWidth;
pub use pool::{PoolConfig, PoolStats, PooledSink, SinkPool};
pub use sink::{ByteSink, SinkConfig};
pub use types::{
    EncodingError, EncodingErrorKind, Endian, IntWidth, MAX_VARINT32_LEN, MAX_VARINT64_LEN,
};
