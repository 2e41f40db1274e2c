//! Spool files: a JSON snapshot of broker credentials and queue backlogs,
//! loaded into an in-process broker for offline browsing.

use std::collections::BTreeMap;
use std::path::Path;

use qbrowse::broker::MemoryBroker;
use qbrowse::message::{Field, Message, MessageBody, StreamWriter};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spool {
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    #[serde(default)]
    pub queues: BTreeMap<String, Vec<SpoolMessage>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpoolMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub body: SpoolBody,
}

/// Message body, tagged by encoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpoolBody {
    Text(String),
    /// Lowercase or uppercase hex.
    Bytes(String),
    Map(Map<String, Value>),
    Object(Value),
    /// Scalars only; `null` writes a null field.
    Stream(Vec<Value>),
    Empty(()),
}

impl Spool {
    pub fn load(path: &Path) -> CliResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> CliResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| CliError::new(DATA_INVALID, format!("invalid spool file: {err}")))
    }

    /// Build an in-process broker holding this spool's credentials and queues.
    pub fn into_broker(self) -> CliResult<MemoryBroker> {
        let broker = MemoryBroker::new();
        for (user, key) in self.credentials {
            broker.grant(user, key);
        }
        for (queue, messages) in self.queues {
            broker.declare_queue(queue.as_str());
            let count = messages.len();
            for (index, message) in messages.into_iter().enumerate() {
                let message = message
                    .into_message()
                    .map_err(|reason| spool_error(&queue, index, reason))?;
                broker.enqueue(queue.as_str(), message);
            }
            debug!(queue = %queue, messages = count, "queue loaded from spool");
        }
        Ok(broker)
    }
}

impl SpoolMessage {
    fn into_message(self) -> Result<Message, String> {
        let body = match self.body {
            SpoolBody::Text(text) => MessageBody::Text(text),
            SpoolBody::Bytes(digits) => MessageBody::Bytes(
                hex::decode(&digits)
                    .map_err(|err| format!("invalid hex body: {err}"))?
                    .into(),
            ),
            SpoolBody::Map(entries) => MessageBody::Map(
                entries
                    .into_iter()
                    .map(|(name, value)| {
                        let field = to_field(&value)?
                            .ok_or_else(|| format!("map entry {name:?} is null"))?;
                        Ok((name, field))
                    })
                    .collect::<Result<_, String>>()?,
            ),
            SpoolBody::Object(value) => MessageBody::Object(value),
            SpoolBody::Stream(values) => {
                let mut writer = StreamWriter::new();
                for value in &values {
                    writer
                        .write_object(to_field(value)?.as_ref())
                        .map_err(|err| err.to_string())?;
                }
                MessageBody::Stream(writer.finish())
            }
            SpoolBody::Empty(()) => MessageBody::Empty,
        };

        let mut message = Message::new(body);
        if let Some(id) = self.id {
            message = message.with_id(id);
        }
        for (name, value) in self.properties {
            let field =
                to_field(&value)?.ok_or_else(|| format!("property {name:?} is null"))?;
            message = message.with_property(name, field);
        }
        Ok(message)
    }
}

/// Map a JSON scalar to a field. Integers become `Int` when they fit, else `Long`.
fn to_field(value: &Value) -> Result<Option<Field>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(v) => Ok(Some(Field::Boolean(*v))),
        Value::String(v) => Ok(Some(Field::String(v.clone()))),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Some(match i32::try_from(v) {
                    Ok(small) => Field::Int(small),
                    Err(_) => Field::Long(v),
                }))
            } else if let Some(v) = n.as_f64() {
                Ok(Some(Field::Double(v)))
            } else {
                Err(format!("number {n} is out of range"))
            }
        }
        Value::Array(_) | Value::Object(_) => Err(format!("{value} is not a scalar")),
    }
}

fn spool_error(queue: &str, index: usize, reason: String) -> CliError {
    CliError::new(
        DATA_INVALID,
        format!("invalid spool message {queue}[{index}]: {reason}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "credentials": {"alice": "key123"},
        "queues": {
            "orders": [
                {"id": "m-1", "properties": {"priority": 4}, "body": {"text": "hello"}},
                {"body": {"stream": ["x", 1, null, 2.5, true]}},
                {"body": {"bytes": "DEad"}},
                {"body": {"map": {"qty": 3}}},
                {"body": {"object": {"sku": "A-1"}}},
                {"body": {"empty": null}}
            ],
            "idle": []
        }
    }"#;

    #[test]
    fn loads_every_body_kind() {
        let broker = Spool::parse(SAMPLE).unwrap().into_broker().unwrap();
        let backlog = broker.backlog("orders").unwrap();

        assert_eq!(backlog.len(), 6);
        assert_eq!(
            backlog[0],
            Message::text("hello")
                .with_id("m-1")
                .with_property("priority", 4)
        );
        assert_eq!(backlog[2], Message::bytes(vec![0xDEu8, 0xAD]));
        assert_eq!(
            backlog[3],
            Message::map(vec![("qty".to_string(), Field::Int(3))])
        );
        assert_eq!(backlog[5], Message::empty());
        assert_eq!(broker.backlog_len("idle"), 0);
        assert!(broker.backlog("idle").is_some());
    }

    #[test]
    fn stream_values_keep_nulls() {
        let broker = Spool::parse(SAMPLE).unwrap().into_broker().unwrap();
        let backlog = broker.backlog("orders").unwrap();
        let message = &backlog[1];

        let mut writer = StreamWriter::new();
        writer.write_string("x").unwrap();
        writer.write_int(1);
        writer.write_null();
        writer.write_double(2.5);
        writer.write_boolean(true);
        assert_eq!(message, &Message::stream(writer.finish()));
    }

    #[test]
    fn rejects_nested_stream_values() {
        let spool =
            Spool::parse(r#"{"queues": {"q": [{"body": {"stream": [[1, 2]]}}]}}"#).unwrap();
        let err = spool.into_broker().unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("q[0]"));
    }

    #[test]
    fn rejects_bad_hex() {
        for digits in ["abc", "zz"] {
            let raw = format!(r#"{{"queues": {{"q": [{{"body": {{"bytes": "{digits}"}}}}]}}}}"#);
            let err = Spool::parse(&raw).unwrap().into_broker().unwrap_err();
            assert_eq!(err.code, DATA_INVALID);
            assert!(err.message.contains("invalid hex body"), "{}", err.message);
        }

        let broker = Spool::parse(r#"{"queues": {"q": [{"body": {"bytes": ""}}]}}"#)
            .unwrap()
            .into_broker()
            .unwrap();
        let backlog = broker.backlog("q").unwrap();
        assert_eq!(backlog[0], Message::bytes(Vec::<u8>::new()));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Spool::parse(r#"{"topics": {}}"#).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
