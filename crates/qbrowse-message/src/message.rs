use bytes::Bytes;

use crate::codec::StreamConfig;
use crate::error::{MessageError, Result};
use crate::field::Field;
use crate::kind::ContentKind;
use crate::liveness::Liveness;
use crate::reader::StreamReader;

/// Message body, tagged by its declared encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// A bare message with properties only.
    Empty,
    Text(String),
    Bytes(Bytes),
    /// Named entries, in the order the broker reports them.
    Map(Vec<(String, Field)>),
    /// A serialized object, carried as JSON.
    Object(serde_json::Value),
    /// A typed-stream body; read it through [`Message::stream_reader`].
    Stream(Bytes),
}

impl MessageBody {
    /// The content kind of this body, or `None` for [`MessageBody::Empty`].
    pub fn kind(&self) -> Option<ContentKind> {
        match self {
            MessageBody::Empty => None,
            MessageBody::Text(_) => Some(ContentKind::Text),
            MessageBody::Bytes(_) => Some(ContentKind::Binary),
            MessageBody::Map(_) => Some(ContentKind::Map),
            MessageBody::Object(_) => Some(ContentKind::Object),
            MessageBody::Stream(_) => Some(ContentKind::Stream),
        }
    }
}

/// A message observed on a queue.
///
/// Messages handed out by a browser are snapshots owned by the broker side;
/// nothing on this type mutates broker state.
#[derive(Debug, Clone)]
pub struct Message {
    id: Option<String>,
    properties: Vec<(String, Field)>,
    body: MessageBody,
    liveness: Option<Liveness>,
}

// Equality compares content only; the delivery link is not part of it.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.properties == other.properties && self.body == other.body
    }
}

impl Message {
    /// Create a message with the given body and no properties.
    pub fn new(body: MessageBody) -> Self {
        Self {
            id: None,
            properties: Vec::new(),
            body,
            liveness: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(MessageBody::Empty)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(MessageBody::Text(text.into()))
    }

    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::new(MessageBody::Bytes(data.into()))
    }

    pub fn map(entries: Vec<(String, Field)>) -> Self {
        Self::new(MessageBody::Map(entries))
    }

    pub fn object(value: serde_json::Value) -> Self {
        Self::new(MessageBody::Object(value))
    }

    /// Create a typed-stream message from an encoded body.
    pub fn stream(body: Bytes) -> Self {
        Self::new(MessageBody::Stream(body))
    }

    /// Set the broker-assigned message id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a property. New names keep insertion order; an existing name
    /// keeps its position and takes the new value.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Field>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
        self
    }

    /// Link this message to the connection delivering it.
    pub fn attach(mut self, liveness: Liveness) -> Self {
        self.liveness = Some(liveness);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// The declared content kind, or `None` when the body is unrecognized.
    pub fn kind(&self) -> Option<ContentKind> {
        self.body.kind()
    }

    /// True once the delivering connection has been closed.
    pub fn is_detached(&self) -> bool {
        self.liveness.as_ref().is_some_and(|link| !link.is_alive())
    }

    /// Property names in broker order.
    pub fn property_names(&self) -> Result<Vec<&str>> {
        self.ensure_attached()?;
        Ok(self
            .properties
            .iter()
            .map(|(name, _)| name.as_str())
            .collect())
    }

    /// A property value in its string form, or `None` if the property is absent.
    pub fn string_property(&self, name: &str) -> Result<Option<String>> {
        self.ensure_attached()?;
        Ok(self
            .properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.to_string()))
    }

    /// A fresh reader positioned at the first field, or `None` for non-stream bodies.
    pub fn stream_reader(&self, config: StreamConfig) -> Option<StreamReader> {
        match &self.body {
            MessageBody::Stream(body) => Some(
                StreamReader::with_config(body.clone(), config)
                    .with_liveness(self.liveness.clone()),
            ),
            _ => None,
        }
    }

    fn ensure_attached(&self) -> Result<()> {
        if self.is_detached() {
            return Err(MessageError::Detached);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::StreamWriter;

    #[test]
    fn kind_follows_body_variant() {
        assert_eq!(Message::text("t").kind(), Some(ContentKind::Text));
        assert_eq!(Message::bytes(vec![1u8]).kind(), Some(ContentKind::Binary));
        assert_eq!(Message::map(Vec::new()).kind(), Some(ContentKind::Map));
        assert_eq!(
            Message::object(serde_json::json!({"a": 1})).kind(),
            Some(ContentKind::Object)
        );
        assert_eq!(Message::stream(Bytes::new()).kind(), Some(ContentKind::Stream));
        assert_eq!(Message::empty().kind(), None);
    }

    #[test]
    fn properties_keep_insertion_order() {
        let message = Message::text("hello")
            .with_property("zeta", 1)
            .with_property("alpha", "two");

        assert_eq!(message.property_names().unwrap(), vec!["zeta", "alpha"]);
        assert_eq!(
            message.string_property("alpha").unwrap().as_deref(),
            Some("two")
        );
        assert_eq!(message.string_property("missing").unwrap(), None);
    }

    #[test]
    fn repeated_property_name_replaces_value() {
        let message = Message::text("hello")
            .with_property("priority", 1)
            .with_property("region", "eu")
            .with_property("priority", 9);

        assert_eq!(message.property_names().unwrap(), vec!["priority", "region"]);
        assert_eq!(
            message.string_property("priority").unwrap().as_deref(),
            Some("9")
        );
    }

    #[test]
    fn detached_message_refuses_property_access() {
        let link = Liveness::new();
        let message = Message::text("hello")
            .with_property("k", "v")
            .attach(link.clone());
        assert!(!message.is_detached());

        link.cut();
        assert!(message.is_detached());
        assert!(matches!(
            message.property_names(),
            Err(MessageError::Detached)
        ));
        assert!(matches!(
            message.string_property("k"),
            Err(MessageError::Detached)
        ));
    }

    #[test]
    fn stream_reader_is_independent_per_call() {
        let mut writer = StreamWriter::new();
        writer.write_string("x").unwrap();
        let message = Message::stream(writer.finish());

        let mut first = message.stream_reader(StreamConfig::default()).unwrap();
        first.read_field().unwrap();

        let mut second = message.stream_reader(StreamConfig::default()).unwrap();
        assert_eq!(second.read_field().unwrap(), Some(Field::from("x")));
        assert!(Message::text("t")
            .stream_reader(StreamConfig::default())
            .is_none());
    }
}
