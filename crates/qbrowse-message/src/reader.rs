use bytes::Bytes;

use crate::codec::{decode_field, StreamConfig};
use crate::error::{MessageError, Result};
use crate::field::Field;
use crate::liveness::Liveness;

/// A source of typed-stream fields, read one at a time.
///
/// `Ok(None)` is a wire null. `Err(MessageError::EndOfStream)` means no
/// fields remain; it is the only way a stream signals completion.
pub trait FieldSource {
    fn read_object(&mut self) -> Result<Option<Field>>;
}

/// Reads fields incrementally from a typed-stream body.
///
/// The reader owns a cheap clone of the body, so reading never changes the
/// message it came from.
#[derive(Debug, Clone)]
pub struct StreamReader {
    body: Bytes,
    remaining: Bytes,
    config: StreamConfig,
    liveness: Option<Liveness>,
}

impl StreamReader {
    /// Create a reader over a typed-stream body with default configuration.
    pub fn new(body: Bytes) -> Self {
        Self::with_config(body, StreamConfig::default())
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(body: Bytes, config: StreamConfig) -> Self {
        Self {
            remaining: body.clone(),
            body,
            config,
            liveness: None,
        }
    }

    /// Tie this reader to a connection; reads fail once the link is cut.
    pub fn with_liveness(mut self, liveness: Option<Liveness>) -> Self {
        self.liveness = liveness;
        self
    }

    /// Read the next field.
    pub fn read_field(&mut self) -> Result<Option<Field>> {
        if let Some(link) = &self.liveness {
            if !link.is_alive() {
                return Err(MessageError::Detached);
            }
        }
        decode_field(&mut self.remaining, self.config.max_field_size)
    }

    /// Rewind to the first field.
    pub fn reset(&mut self) {
        self.remaining = self.body.clone();
    }

    /// Number of undecoded bytes left.
    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    /// Current reader configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl FieldSource for StreamReader {
    fn read_object(&mut self) -> Result<Option<Field>> {
        self.read_field()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::StreamWriter;

    fn sample_body() -> Bytes {
        let mut writer = StreamWriter::new();
        writer.write_string("x").unwrap();
        writer.write_int(1);
        writer.finish()
    }

    #[test]
    fn reads_fields_then_end_of_stream() {
        let mut reader = StreamReader::new(sample_body());

        assert_eq!(reader.read_field().unwrap(), Some(Field::from("x")));
        assert_eq!(reader.read_field().unwrap(), Some(Field::Int(1)));
        assert!(reader.read_field().unwrap_err().is_end_of_stream());
        assert!(reader.read_field().unwrap_err().is_end_of_stream());
        assert_eq!(reader.remaining_len(), 0);
    }

    #[test]
    fn reset_rewinds_to_first_field() {
        let mut reader = StreamReader::new(sample_body());
        reader.read_field().unwrap();
        reader.read_field().unwrap();

        reader.reset();
        assert_eq!(reader.read_field().unwrap(), Some(Field::from("x")));
    }

    #[test]
    fn cut_liveness_detaches_reader() {
        let link = Liveness::new();
        let mut reader = StreamReader::new(sample_body()).with_liveness(Some(link.clone()));

        assert_eq!(reader.read_field().unwrap(), Some(Field::from("x")));
        link.cut();
        assert!(matches!(reader.read_field(), Err(MessageError::Detached)));
    }

    #[test]
    fn respects_configured_field_limit() {
        let mut writer = StreamWriter::new();
        writer.write_string("a fairly long string").unwrap();
        let mut reader =
            StreamReader::with_config(writer.finish(), StreamConfig { max_field_size: 4 });

        assert!(matches!(
            reader.read_field(),
            Err(MessageError::FieldTooLarge { max: 4, .. })
        ));
    }
}
