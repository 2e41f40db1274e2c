//! Broker message model and typed-stream codec.
//!
//! This is the lowest layer of qbrowse. A browsed message carries:
//! - Ordered properties reported by the broker
//! - A body in one of five encodings (text, binary, map, object, typed stream)
//! - An optional liveness link to the connection that delivered it
//!
//! Typed-stream bodies are self-describing but carry no field count, so they
//! are read one field at a time until [`MessageError::EndOfStream`].

pub mod codec;
pub mod error;
pub mod field;
pub mod kind;
pub mod liveness;
pub mod message;
pub mod reader;
pub mod writer;

pub use codec::{decode_field, encode_field, StreamConfig, DEFAULT_MAX_FIELD_SIZE};
pub use error::{MessageError, Result};
pub use field::Field;
pub use kind::ContentKind;
pub use liveness::Liveness;
pub use message::{Message, MessageBody};
pub use reader::{FieldSource, StreamReader};
pub use writer::StreamWriter;
