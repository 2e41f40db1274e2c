use bytes::{Bytes, BytesMut};

use crate::codec::encode_field;
use crate::error::Result;
use crate::field::Field;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Builds a typed-stream body field by field.
#[derive(Debug, Default)]
pub struct StreamWriter {
    buf: BytesMut,
}

impl StreamWriter {
    /// Create an empty stream body.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Append a field, or a wire null for `None`.
    pub fn write_object(&mut self, field: Option<&Field>) -> Result<()> {
        encode_field(field, &mut self.buf)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_object(Some(&Field::from(value)))
    }

    pub fn write_int(&mut self, value: i32) {
        // Fixed-width fields cannot fail to encode.
        let _ = self.write_object(Some(&Field::Int(value)));
    }

    pub fn write_long(&mut self, value: i64) {
        let _ = self.write_object(Some(&Field::Long(value)));
    }

    pub fn write_boolean(&mut self, value: bool) {
        let _ = self.write_object(Some(&Field::Boolean(value)));
    }

    pub fn write_double(&mut self, value: f64) {
        let _ = self.write_object(Some(&Field::Double(value)));
    }

    pub fn write_bytes(&mut self, value: impl Into<Bytes>) -> Result<()> {
        self.write_object(Some(&Field::Bytes(value.into())))
    }

    pub fn write_null(&mut self) {
        let _ = self.write_object(None);
    }

    /// Encoded size so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the encoded body.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
