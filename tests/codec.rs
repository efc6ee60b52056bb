use wirebuf::{ByteCursor, ByteSink, EncodingError, EncodingErrorKind, Endian, IntWidth};

const ENDIANS: [Endian; 2] = [Endian::Big, Endian::Little];

macro_rules! check_fixed_round_trip {
    ($write:ident, $read:ident, $t:ty) => {
        for endian in ENDIANS {
            let mut values = vec![<$t>::MIN, <$t>::MAX, 0, 1];
            if <$t>::MIN != 0 {
                values.push((0 as $t).wrapping_sub(1));
            }
            let mut sink = ByteSink::new();
            for v in &values {
                sink.$write(*v, endian);
            }
            let buffer = sink.take_bytes();
            assert_eq!(buffer.len(), values.len() * std::mem::size_of::<$t>());
            let mut cursor = ByteCursor::new(&buffer);
            for v in &values {
                assert_eq!(cursor.$read(endian)?, *v);
            }
            assert_eq!(cursor.available_bytes(), 0);
        }
    };
}

#[test]
fn fixed_width_round_trip() -> Result<(), EncodingError> {
    check_fixed_round_trip!(write_u16, read_u16, u16);
    check_fixed_round_trip!(write_i16, read_i16, i16);
    check_fixed_round_trip!(write_u32, read_u32, u32);
    check_fixed_round_trip!(write_i32, read_i32, i32);
    check_fixed_round_trip!(write_u64, read_u64, u64);
    check_fixed_round_trip!(write_i64, read_i64, i64);

    let mut sink = ByteSink::new();
    for v in [u8::MIN, u8::MAX, 1] {
        sink.write_u8(v);
    }
    for v in [i8::MIN, i8::MAX, -1, 0, 1] {
        sink.write_i8(v);
    }
    let buffer = sink.take_bytes();
    let mut cursor = ByteCursor::new(&buffer);
    assert_eq!([cursor.read_u8()?, cursor.read_u8()?, cursor.read_u8()?], [0, 255, 1]);
    for v in [i8::MIN, i8::MAX, -1, 0, 1] {
        assert_eq!(cursor.read_i8()?, v);
    }
    Ok(())
}

#[test]
fn runtime_width_round_trip() -> Result<(), EncodingError> {
    let widths = [IntWidth::W8, IntWidth::W16, IntWidth::W32, IntWidth::W64];
    for endian in ENDIANS {
        for width in widths {
            for signed in [false, true] {
                let (min, max) = width.range(signed);
                let mut values = vec![min, max, 0, 1];
                if signed {
                    values.push(-1);
                }
                let mut sink = ByteSink::new();
                for v in &values {
                    sink.write_int(*v, width, signed, endian)?;
                }
                let buffer = sink.take_bytes();
                let mut cursor = ByteCursor::new(&buffer);
                for v in &values {
                    assert_eq!(cursor.read_int(width, signed, endian)?, *v);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn runtime_width_out_of_range_writes_nothing() {
    let mut sink = ByteSink::new();
    let cases = [
        (256, IntWidth::W8, false),
        (-129, IntWidth::W8, true),
        (-1, IntWidth::W16, false),
        (u64::MAX as i128 + 1, IntWidth::W64, false),
        (i64::MIN as i128 - 1, IntWidth::W64, true),
    ];
    for (value, width, signed) in cases {
        let err = sink
            .write_int(value, width, signed, Endian::Big)
            .unwrap_err();
        assert_eq!(err.kind, EncodingErrorKind::OutOfRange);
    }
    assert_eq!(sink.bytes_written(), 0);
}

#[test]
fn floats_round_trip() -> Result<(), EncodingError> {
    for endian in ENDIANS {
        let mut sink = ByteSink::new();
        sink.write_f32(-1.5, endian);
        sink.write_f64(f64::INFINITY, endian);
        sink.write_f64(f64::NAN, endian);
        sink.write_f32(f32::MIN_POSITIVE, endian);
        let buffer = sink.take_bytes();
        let mut cursor = ByteCursor::new(&buffer);
        assert_eq!(cursor.read_f32(endian)?, -1.5);
        assert_eq!(cursor.read_f64(endian)?, f64::INFINITY);
        assert!(cursor.read_f64(endian)?.is_nan());
        assert_eq!(cursor.read_f32(endian)?, f32::MIN_POSITIVE);
    }
    Ok(())
}

#[test]
fn varints_round_trip() -> Result<(), EncodingError> {
    let unsigned = [
        0,
        127,
        128,
        16383,
        16384,
        2097151,
        2097152,
        268435455,
        268435456,
        i64::MAX as u64,
    ];
    let signed = [0, -1, 1, i64::MIN, i64::MAX];
    let mut sink = ByteSink::new();
    for v in unsigned {
        sink.write_var_u64(v);
    }
    for v in signed {
        sink.write_var_i64(v);
    }
    for v in [0, -1, 1, i32::MIN, i32::MAX] {
        sink.write_var_i32(v);
    }
    sink.write_var_u32(u32::MAX);
    let buffer = sink.take_bytes();

    let mut cursor = ByteCursor::new(&buffer);
    for v in unsigned {
        assert_eq!(cursor.read_var_u64()?, v);
    }
    for v in signed {
        assert_eq!(cursor.read_var_i64()?, v);
    }
    for v in [0, -1, 1, i32::MIN, i32::MAX] {
        assert_eq!(cursor.read_var_i32()?, v);
    }
    assert_eq!(cursor.read_var_u32()?, u32::MAX);
    assert!(!cursor.has_remaining());
    Ok(())
}

#[test]
fn utf8_round_trip() -> Result<(), EncodingError> {
    for text in ["plain ascii text", "Съешь же ещё", "漢字かな交じり", "🦀 + 👍🏽"] {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut sink = ByteSink::new();
        sink.write_var_utf16(&units, false)?;
        let written = sink.write_utf16(&units, false)?;
        assert_eq!(written, text.len());
        sink.write_var_string(text);
        let buffer = sink.take_bytes();

        let mut cursor = ByteCursor::new(&buffer);
        assert_eq!(cursor.read_var_string(false)?, text);
        assert_eq!(cursor.read_string(text.len(), false)?, text);
        assert_eq!(cursor.read_var_string(false)?, text);
    }
    Ok(())
}

#[test]
fn lone_high_surrogate_policy() -> Result<(), EncodingError> {
    let mut sink = ByteSink::new();
    sink.write_utf16(&[0xd83d], true)?;
    assert_eq!(sink.as_bytes(), &[0xef, 0xbf, 0xbd]);

    let mut sink = ByteSink::new();
    let err = sink.write_utf16(&[0xd83d], false).unwrap_err();
    assert_eq!(err.kind, EncodingErrorKind::InvalidEncoding);
    assert!(sink.is_empty());
    Ok(())
}

#[test]
fn growth_preserves_prefix() {
    let initial = 16;
    let mut sink = ByteSink::with_capacity(initial);
    let prefix: Vec<u8> = (0..initial as u8).collect();
    sink.write_bytes(&prefix);
    let big = vec![0xab; 1000];
    sink.write_bytes(&big);
    // The write needs more than 16 * 1.5, so capacity is exactly what it needs.
    assert_eq!(sink.capacity(), initial + big.len());
    assert_eq!(&sink.as_bytes()[..initial], prefix.as_slice());
    assert_eq!(&sink.as_bytes()[initial..], big.as_slice());

    sink.write_u8(1);
    assert_eq!(sink.capacity(), (initial + big.len()) * 3 / 2);
    assert_eq!(&sink.as_bytes()[..initial], prefix.as_slice());
}

#[test]
fn peek_matches_previous_read() -> Result<(), EncodingError> {
    let buffer = [1, 2, 3, 4, 5, 6];
    let mut cursor = ByteCursor::new(&buffer);
    cursor.skip(2)?;
    let at = cursor.offset();
    let read = cursor.read_bytes(3)?;
    let offset = cursor.offset();
    assert_eq!(cursor.peek_bytes_at(3, at)?, read);
    assert_eq!(cursor.offset(), offset);
    Ok(())
}

#[test]
fn read_past_end_is_out_of_bounds() {
    let buffer = [0u8; 10];
    let mut cursor = ByteCursor::new(&buffer);
    let err = cursor.read_bytes(buffer.len() + 1).unwrap_err();
    assert_eq!(err.kind, EncodingErrorKind::OutOfBounds);
    assert_eq!(cursor.offset(), 0);
}

#[test]
fn backtracking_with_seek() -> Result<(), EncodingError> {
    let mut sink = ByteSink::new();
    sink.write_u8(2);
    sink.write_u16(0xbeef, Endian::Big);
    let buffer = sink.take_bytes();

    let mut cursor = ByteCursor::new(&buffer);
    let mark = cursor.offset();
    // Guess a u32, fail, backtrack and read the real layout.
    cursor.read_u8()?;
    assert!(cursor.read_u32(Endian::Big).is_err());
    cursor.seek(mark)?;
    assert_eq!(cursor.read_u8()?, 2);
    assert_eq!(cursor.read_u16(Endian::Big)?, 0xbeef);
    Ok(())
}

#[test]
fn take_bytes_scenario() -> Result<(), EncodingError> {
    let mut sink = ByteSink::new();
    sink.write_u32(42, Endian::default());
    sink.write_string("Hello");
    let bytes = sink.take_bytes();
    assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x2a, b'H', b'e', b'l', b'l', b'o']);

    sink.write_u8(10);
    assert_eq!(sink.to_bytes(), vec![10]);
    assert_eq!(sink.bytes_written(), 1);
    Ok(())
}

#[test]
fn bool_and_var_bytes() -> Result<(), EncodingError> {
    let payload = vec![7u8; 300];
    let mut sink = ByteSink::new();
    sink.write_bool(true);
    sink.write_bool(false);
    sink.write_var_bytes(&payload);
    sink.write_var_bytes(&[]);
    let buffer = sink.take_bytes();
    // 300 needs a two byte varint prefix.
    assert_eq!(buffer.len(), 2 + 2 + 300 + 1);

    let mut cursor = ByteCursor::new(&buffer);
    assert!(cursor.read_bool()?);
    assert!(!cursor.read_bool()?);
    assert_eq!(cursor.read_var_bytes()?, payload.as_slice());
    assert!(cursor.read_var_bytes()?.is_empty());
    Ok(())
}
