use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{MessageError, Result};
use crate::field::Field;

pub const BOOLEAN_TYPE: u8 = 1;
pub const BYTE_TYPE: u8 = 2;
pub const BYTES_TYPE: u8 = 3;
pub const SHORT_TYPE: u8 = 4;
pub const CHAR_TYPE: u8 = 5;
pub const INT_TYPE: u8 = 6;
pub const LONG_TYPE: u8 = 7;
pub const FLOAT_TYPE: u8 = 8;
pub const DOUBLE_TYPE: u8 = 9;
pub const STRING_TYPE: u8 = 10;
pub const NULL_TYPE: u8 = 11;

/// Default maximum size of a single variable-length field: 16 MiB.
pub const DEFAULT_MAX_FIELD_SIZE: usize = 16 * 1024 * 1024;

/// Encode one field (or a wire null) into the typed-stream format.
///
/// Wire format, one field:
/// ```text
/// ┌──────────┬──────────────────────────────────────────┐
/// │ Tag (1B) │ Value (big-endian, size fixed by tag)    │
/// └──────────┴──────────────────────────────────────────┘
/// bytes:  tag 3, u32 length, data
/// string: tag 10, UTF-8, 0x00 terminator
/// null:   tag 11, no value
/// ```
pub fn encode_field(field: Option<&Field>, dst: &mut BytesMut) -> Result<()> {
    let Some(field) = field else {
        dst.put_u8(NULL_TYPE);
        return Ok(());
    };

    match field {
        Field::Boolean(v) => {
            dst.put_u8(BOOLEAN_TYPE);
            dst.put_u8(u8::from(*v));
        }
        Field::Byte(v) => {
            dst.put_u8(BYTE_TYPE);
            dst.put_i8(*v);
        }
        Field::Short(v) => {
            dst.put_u8(SHORT_TYPE);
            dst.put_i16(*v);
        }
        Field::Char(v) => {
            let unit = u16::try_from(u32::from(*v))
                .map_err(|_| MessageError::InvalidChar(u32::from(*v)))?;
            dst.put_u8(CHAR_TYPE);
            dst.put_u16(unit);
        }
        Field::Int(v) => {
            dst.put_u8(INT_TYPE);
            dst.put_i32(*v);
        }
        Field::Long(v) => {
            dst.put_u8(LONG_TYPE);
            dst.put_i64(*v);
        }
        Field::Float(v) => {
            dst.put_u8(FLOAT_TYPE);
            dst.put_f32(*v);
        }
        Field::Double(v) => {
            dst.put_u8(DOUBLE_TYPE);
            dst.put_f64(*v);
        }
        Field::String(v) => {
            if v.as_bytes().contains(&0) {
                return Err(MessageError::InteriorNul);
            }
            dst.reserve(v.len() + 2);
            dst.put_u8(STRING_TYPE);
            dst.put_slice(v.as_bytes());
            dst.put_u8(0);
        }
        Field::Bytes(v) => {
            let len = u32::try_from(v.len()).map_err(|_| MessageError::FieldTooLarge {
                size: v.len(),
                max: u32::MAX as usize,
            })?;
            dst.reserve(v.len() + 5);
            dst.put_u8(BYTES_TYPE);
            dst.put_u32(len);
            dst.put_slice(v);
        }
    }
    Ok(())
}

/// Decode the next field from the front of `src`.
///
/// Returns `Ok(None)` for a wire null and `Err(MessageError::EndOfStream)`
/// when `src` is empty. On success the field bytes are consumed; on any
/// error `src` is left untouched.
pub fn decode_field(src: &mut Bytes, max_field_size: usize) -> Result<Option<Field>> {
    let Some(&tag) = src.first() else {
        return Err(MessageError::EndOfStream);
    };

    let body = &src[1..];
    let (field, len) = match tag {
        NULL_TYPE => (None, 0),
        BOOLEAN_TYPE => {
            let [v] = take::<1>(body)?;
            (Some(Field::Boolean(v != 0)), 1)
        }
        BYTE_TYPE => (Some(Field::Byte(i8::from_be_bytes(take(body)?))), 1),
        SHORT_TYPE => (Some(Field::Short(i16::from_be_bytes(take(body)?))), 2),
        CHAR_TYPE => {
            let unit = u16::from_be_bytes(take(body)?);
            let v = char::from_u32(u32::from(unit))
                .ok_or(MessageError::InvalidChar(u32::from(unit)))?;
            (Some(Field::Char(v)), 2)
        }
        INT_TYPE => (Some(Field::Int(i32::from_be_bytes(take(body)?))), 4),
        LONG_TYPE => (Some(Field::Long(i64::from_be_bytes(take(body)?))), 8),
        FLOAT_TYPE => (Some(Field::Float(f32::from_be_bytes(take(body)?))), 4),
        DOUBLE_TYPE => (Some(Field::Double(f64::from_be_bytes(take(body)?))), 8),
        STRING_TYPE => {
            let end = match body.iter().position(|b| *b == 0) {
                Some(end) => end,
                None if body.len() > max_field_size => {
                    return Err(MessageError::FieldTooLarge {
                        size: body.len(),
                        max: max_field_size,
                    })
                }
                None => {
                    return Err(MessageError::Truncated {
                        needed: body.len() + 1,
                        available: body.len(),
                    })
                }
            };
            if end > max_field_size {
                return Err(MessageError::FieldTooLarge {
                    size: end,
                    max: max_field_size,
                });
            }
            let text = std::str::from_utf8(&body[..end])?;
            (Some(Field::String(text.to_owned())), end + 1)
        }
        BYTES_TYPE => {
            let size = u32::from_be_bytes(take(body)?) as usize;
            if size > max_field_size {
                return Err(MessageError::FieldTooLarge {
                    size,
                    max: max_field_size,
                });
            }
            let available = body.len() - 4;
            if available < size {
                return Err(MessageError::Truncated {
                    needed: size,
                    available,
                });
            }
            (Some(Field::Bytes(src.slice(5..5 + size))), 4 + size)
        }
        other => return Err(MessageError::UnknownType(other)),
    };

    src.advance(1 + len);
    Ok(field)
}

fn take<const N: usize>(body: &[u8]) -> Result<[u8; N]> {
    body.get(..N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(MessageError::Truncated {
            needed: N,
            available: body.len(),
        })
}

/// Configuration for typed-stream decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Maximum size in bytes of a single string or bytes field. Default: 16 MiB.
    pub max_field_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
        }
    }
}
