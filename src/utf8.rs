//! UTF-8 decoding and UTF-16 to UTF-8 encoding.
//!
//! Decoding delegates to the standard library validator. With `allow_malformed` set, invalid
//! sequences are replaced by U+FFFD (the standard "maximal subpart" policy of
//! [`String::from_utf8_lossy`]); otherwise they fail with
//! [`EncodingErrorKind::InvalidEncoding`](crate::EncodingErrorKind::InvalidEncoding).
//!
//! Encoding walks 16-bit code units by hand so that text which did not originate as a Rust
//! `str` (and may therefore contain unpaired surrogates) gets a defined encoding:
//!
//! | code unit | output |
//! |---|---|
//! | `< 0x80` | 1 byte |
//! | `< 0x800` | 2 bytes |
//! | high surrogate followed by low surrogate | 4 bytes, both units consumed |
//! | any other surrogate | U+FFFD (`EF BF BD`) when malformed input is allowed, else an error |
//! | everything else | 3 bytes |

use std::borrow::Cow;

use crate::EncodingError;

/// Most UTF-8 bytes a single UTF-16 code unit can produce.
///
/// A surrogate pair is two units for four bytes, every other unit is at most three bytes.
pub const MAX_BYTES_PER_UNIT: usize = 3;

const ASCII_BATCH: usize = 4;
const REPLACEMENT: [u8; 3] = [0xef, 0xbf, 0xbd];

/// Upper bound of the UTF-8 size of `units` code units.
#[inline]
pub fn utf16_encoded_capacity(units: usize) -> usize {
    units.saturating_mul(MAX_BYTES_PER_UNIT)
}

/// Exact UTF-8 size of `units`, under the same surrogate policy as [`encode_utf16`].
pub fn utf16_encoded_len(units: &[u16], allow_malformed: bool) -> Result<usize, EncodingError> {
    let mut len = 0;
    let mut i = 0;
    while i < units.len() {
        let c = units[i];
        match c {
            0..=0x7f => len += 1,
            0x80..=0x7ff => len += 2,
            0xd800..=0xdbff if matches!(units.get(i + 1).copied(), Some(0xdc00..=0xdfff)) => {
                len += 4;
                i += 1;
            }
            0xd800..=0xdfff if !allow_malformed => return Err(unpaired_surrogate(c, i)),
            _ => len += 3,
        }
        i += 1;
    }
    Ok(len)
}

fn unpaired_surrogate(unit: u16, index: usize) -> EncodingError {
    EncodingError::invalid_encoding(&format!(
        "Unpaired surrogate [{unit:#06x}] at code unit [{index}]"
    ))
}

/// Decode `bytes` as UTF-8.
///
/// Valid input is returned borrowed. Invalid input either fails or, with `allow_malformed`, is
/// returned owned with replacement characters substituted.
pub fn decode(bytes: &[u8], allow_malformed: bool) -> Result<Cow<'_, str>, EncodingError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(_) if allow_malformed => Ok(String::from_utf8_lossy(bytes)),
        Err(e) => Err(EncodingError::invalid_encoding(&format!(
            "String is invalid UTF-8, {e}"
        ))),
    }
}

/// Append the UTF-8 encoding of the UTF-16 `units` to `out`. Returns the number of bytes written.
///
/// On failure `out` is restored to its original length.
pub fn encode_utf16(
    units: &[u16],
    allow_malformed: bool,
    out: &mut Vec<u8>,
) -> Result<usize, EncodingError> {
    out.reserve(utf16_encoded_capacity(units.len()));
    encode_utf16_unreserved(units, allow_malformed, out)
}

/// [`encode_utf16`] without the up-front reservation, for callers that size `out` themselves.
pub(crate) fn encode_utf16_unreserved(
    units: &[u16],
    allow_malformed: bool,
    out: &mut Vec<u8>,
) -> Result<usize, EncodingError> {
    let start = out.len();
    let mut i = 0;
    while i < units.len() {
        if let Some(batch) = units.get(i..i + ASCII_BATCH) {
            if batch.iter().fold(0, |acc, &c| acc | c) < 0x80 {
                out.extend(batch.iter().map(|&c| c as u8));
                i += ASCII_BATCH;
                continue;
            }
        }

        let c = units[i];
        match c {
            0..=0x7f => {
                out.push(c as u8);
                i += 1;
            }
            0x80..=0x7ff => {
                out.extend_from_slice(&[0xc0 | (c >> 6) as u8, 0x80 | (c & 0x3f) as u8]);
                i += 1;
            }
            0xd800..=0xdbff if matches!(units.get(i + 1).copied(), Some(0xdc00..=0xdfff)) => {
                let low = units[i + 1];
                let code_point =
                    0x10000 + ((u32::from(c) - 0xd800) << 10) + (u32::from(low) - 0xdc00);
                out.extend_from_slice(&[
                    0xf0 | (code_point >> 18) as u8,
                    0x80 | ((code_point >> 12) & 0x3f) as u8,
                    0x80 | ((code_point >> 6) & 0x3f) as u8,
                    0x80 | (code_point & 0x3f) as u8,
                ]);
                i += 2;
            }
            0xd800..=0xdfff => {
                if !allow_malformed {
                    out.truncate(start);
                    return Err(unpaired_surrogate(c, i));
                }
                out.extend_from_slice(&REPLACEMENT);
                i += 1;
            }
            _ => {
                out.extend_from_slice(&[
                    0xe0 | (c >> 12) as u8,
                    0x80 | ((c >> 6) & 0x3f) as u8,
                    0x80 | (c & 0x3f) as u8,
                ]);
                i += 1;
            }
        }
    }
    Ok(out.len() - start)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::EncodingErrorKind;

    fn encode(text: &str) -> Result<Vec<u8>, EncodingError> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut out = vec![];
        encode_utf16(&units, false, &mut out)?;
        Ok(out)
    }

    #[test]
    fn encodes_like_std() -> Result<(), EncodingError> {
        for text in ["", "a", "hello world", "Привет", "日本語テキスト", "👋🌍", "aж日👋b"] {
            assert_eq!(encode(text)?, text.as_bytes());
        }
        Ok(())
    }

    #[test]
    fn ascii_batches_do_not_change_output() -> Result<(), EncodingError> {
        // Non-ASCII at every position relative to the batch boundary.
        for pos in 0..9 {
            let mut text: String = "abcdefgh".into();
            text.insert(pos, 'é');
            assert_eq!(encode(&text)?, text.as_bytes());
        }
        Ok(())
    }

    #[test]
    fn lone_surrogates_are_replaced_when_allowed() -> Result<(), EncodingError> {
        let mut out = vec![];
        encode_utf16(&[0xd83d], true, &mut out)?;
        assert_eq!(out, REPLACEMENT);

        let mut out = vec![];
        encode_utf16(&[b'a' as u16, 0xdc00, 0xd800, b'b' as u16], true, &mut out)?;
        assert_eq!(out, [&b"a"[..], &REPLACEMENT[..], &REPLACEMENT[..], &b"b"[..]].concat());
        Ok(())
    }

    #[test]
    fn lone_surrogates_fail_when_strict() {
        let mut out = b"keep".to_vec();
        let err = encode_utf16(&[b'x' as u16, 0xd83d], false, &mut out).unwrap_err();
        assert_eq!(err.kind, EncodingErrorKind::InvalidEncoding);
        assert_eq!(out, b"keep");
    }

    #[test]
    fn encoded_len_matches_encoding() -> Result<(), EncodingError> {
        let units: Vec<u16> = "aж日👋".encode_utf16().collect();
        assert_eq!(utf16_encoded_len(&units, false)?, "aж日👋".len());
        assert_eq!(utf16_encoded_len(&[0xdc00, b'a' as u16], true)?, 4);
        assert_eq!(
            utf16_encoded_len(&[0xdc00], false).unwrap_err().kind,
            EncodingErrorKind::InvalidEncoding
        );
        Ok(())
    }

    #[test]
    fn decode_strict_and_lossy() -> Result<(), EncodingError> {
        assert!(matches!(decode(b"hi", false)?, Cow::Borrowed("hi")));
        let bad = [b'a', 0xff, b'b'];
        assert_eq!(
            decode(&bad, false).unwrap_err().kind,
            EncodingErrorKind::InvalidEncoding
        );
        assert_eq!(decode(&bad, true)?, "a\u{fffd}b");
        Ok(())
    }
}
