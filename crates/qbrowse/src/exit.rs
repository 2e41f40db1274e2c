use std::fmt;
use std::io;

use qbrowse::broker::BrokerError;
use qbrowse::BrowseError;

// Exit codes follow the sysexits/rsfulmen conventions.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const BROKER_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NO_INPUT: i32 = 66;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => NO_INPUT,
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn browse_error(context: &str, err: BrowseError) -> CliError {
    let code = match &err {
        BrowseError::Config(_) => USAGE,
        BrowseError::Directory(_) => NO_INPUT,
        BrowseError::Decode(_) => DATA_INVALID,
        BrowseError::Broker(_) => BROKER_ERROR,
        BrowseError::Close(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}
