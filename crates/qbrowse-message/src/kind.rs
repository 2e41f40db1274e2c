//! Content kinds.
//!
//! Every renderable message body falls into exactly one of five kinds.
//! Messages without a body have no kind.

use std::fmt;

/// The declared encoding of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Binary,
    Map,
    Object,
    Stream,
}

impl ContentKind {
    /// Returns a human-readable name for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "Text",
            ContentKind::Binary => "Binary",
            ContentKind::Map => "Map",
            ContentKind::Object => "Object",
            ContentKind::Stream => "Stream",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
