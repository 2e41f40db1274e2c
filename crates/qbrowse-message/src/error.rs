/// Errors that can occur while reading message content.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// No more fields remain in a typed stream.
    ///
    /// This is the normal termination signal for stream reads.
    #[error("end of stream reached")]
    EndOfStream,

    /// The field tag is not a known wire type.
    #[error("unknown stream field type 0x{0:02X}")]
    UnknownType(u8),

    /// The buffer ended in the middle of a field value.
    #[error("truncated stream field (need {needed} bytes, have {available})")]
    Truncated { needed: usize, available: usize },

    /// A string field is not valid UTF-8.
    #[error("stream string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A char field is not a single UTF-16 code unit (surrogate or non-BMP).
    #[error("invalid char code point U+{0:04X}")]
    InvalidChar(u32),

    /// A string field contains a NUL character, which terminates strings on the wire.
    #[error("stream string contains an interior NUL")]
    InteriorNul,

    /// A variable-length field exceeds the configured maximum size.
    #[error("stream field too large ({size} bytes, max {max})")]
    FieldTooLarge { size: usize, max: usize },

    /// The connection that delivered the message has been closed.
    #[error("message detached from a closed connection")]
    Detached,
}

impl MessageError {
    /// True for the end-of-stream signal.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, MessageError::EndOfStream)
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
