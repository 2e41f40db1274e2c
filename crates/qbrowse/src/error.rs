use std::fmt;

use qbrowse_broker::{BrokerError, DirectoryError, UrlError};
use qbrowse_message::MessageError;

/// Errors assembling a client's identity and connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("queue name must not be empty")]
    EmptyQueueName,

    #[error("user name must not be empty")]
    EmptyUserName,

    /// The broker connection URL could not be assembled.
    #[error("cannot build broker URL: {0}")]
    Url(#[from] UrlError),
}

/// Releases that failed while closing a browse session.
///
/// Every release is attempted; this lists the ones that failed, in order.
#[derive(Debug)]
pub struct CloseError {
    pub failures: Vec<(&'static str, BrokerError)>,
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (handle, err)) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{handle}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CloseError {}

/// Errors surfaced by the browsing client.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    /// Identity or configuration input is unusable. Not retryable as-is.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A directory binding is missing or unusable.
    #[error("directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Broker-level failure while connecting, starting, or reading.
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    /// A typed-stream field is unknown or corrupted.
    #[error("decode error: {0}")]
    Decode(MessageError),

    /// One or more handles failed to release.
    #[error("failed to release browse session: {0}")]
    Close(CloseError),
}

impl BrowseError {
    /// True for failures a fresh session may get past (lost or refused connections).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BrowseError::Broker(
                BrokerError::Connect { .. } | BrokerError::Closed | BrokerError::Operation { .. }
            )
        )
    }
}

impl From<MessageError> for BrowseError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Detached => BrowseError::Broker(BrokerError::Closed),
            other => BrowseError::Decode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_maps_to_broker_error() {
        let err = BrowseError::from(MessageError::Detached);
        assert!(matches!(err, BrowseError::Broker(BrokerError::Closed)));
        assert!(err.is_transient());
    }

    #[test]
    fn codec_errors_map_to_decode() {
        let err = BrowseError::from(MessageError::UnknownType(0x42));
        assert!(matches!(err, BrowseError::Decode(MessageError::UnknownType(0x42))));
        assert!(!err.is_transient());
    }

    #[test]
    fn close_error_lists_every_failure() {
        let err = CloseError {
            failures: vec![
                ("connection", BrokerError::Closed),
                ("browser", BrokerError::NotStarted),
            ],
        };
        assert_eq!(
            err.to_string(),
            "connection: handle closed; browser: connection not started"
        );
    }
}
