//! Message decoding for display.
//!
//! Every rendered string is HTML-escaped. Decoding never changes the message.

use std::fmt::Write;

use qbrowse_message::{
    ContentKind, Field, FieldSource, Message, MessageBody, MessageError, StreamConfig,
};
use tracing::trace;

use crate::error::Result;
use crate::escape::escape_html;

const SEPARATOR: &str = ", ";

/// List a message's properties as `"name = value, "` pairs, in broker order.
///
/// Returns an empty string when the message has no properties.
pub fn properties(message: &Message) -> Result<String> {
    let mut out = String::new();
    for name in message.property_names()? {
        let value = message.string_property(name)?.unwrap_or_default();
        let _ = write!(out, "{name} = {value}{SEPARATOR}");
    }
    Ok(out)
}

/// Classify a message by its declared body encoding.
///
/// `None` means the message has no renderable content; it is not an error.
pub fn classify(message: &Message) -> Option<ContentKind> {
    message.kind()
}

/// Read every field of a typed stream into `"value, "` tokens, unescaped.
///
/// Null fields add no token. End of stream ends the loop normally; any other
/// read failure aborts.
pub fn accumulate_stream<S: FieldSource + ?Sized>(source: &mut S) -> Result<String> {
    let mut out = String::new();
    let mut reached_end = false;
    let mut fields = 0usize;

    while !reached_end {
        match source.read_object() {
            Ok(Some(field)) => {
                let _ = write!(out, "{field}{SEPARATOR}");
                fields += 1;
            }
            Ok(None) => {}
            Err(MessageError::EndOfStream) => reached_end = true,
            Err(err) => return Err(err.into()),
        }
    }

    trace!(fields, "typed stream exhausted");
    Ok(out)
}

/// Decode a typed stream into an HTML-escaped display string.
pub fn decode_stream<S: FieldSource + ?Sized>(source: &mut S) -> Result<String> {
    accumulate_stream(source).map(|text| escape_html(&text))
}

/// Render a message body for display, according to its kind.
///
/// - Text: the text
/// - Binary: lowercase hex
/// - Map: `"name = value, "` per entry
/// - Object: compact JSON
/// - Stream: every non-null field, see [`decode_stream`]
/// - no kind: empty string
pub fn content(message: &Message, config: &StreamConfig) -> Result<String> {
    let raw = match message.body() {
        MessageBody::Empty => String::new(),
        MessageBody::Text(text) => text.clone(),
        MessageBody::Bytes(data) => Field::Bytes(data.clone()).to_string(),
        MessageBody::Map(entries) => {
            let mut out = String::new();
            for (name, value) in entries {
                let _ = write!(out, "{name} = {value}{SEPARATOR}");
            }
            out
        }
        MessageBody::Object(value) => value.to_string(),
        MessageBody::Stream(_) => match message.stream_reader(*config) {
            Some(mut reader) => accumulate_stream(&mut reader)?,
            None => String::new(),
        },
    };
    Ok(escape_html(&raw))
}
