use thiserror::Error;

/// Errors that can occur while handling inbound traffic
///
/// None of these are fatal: the message in question is dropped or rejected
/// and the cycle loop carries on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TagError {
    #[error("Unknown vehicle [{0}]")]
    UnknownVehicle(String),

    #[error("Malformed position report: {0}")]
    MalformedReport(String),

    #[error("Unhandled mail: {0}")]
    UnhandledMail(String),

    #[error("Game loop is not running")]
    LoopClosed,
}

impl TagError {
    /// Machine-readable reason for result posts and API bodies
    pub fn reason(&self) -> &'static str {
        match self {
            TagError::UnknownVehicle(_) => "unknown-vehicle",
            TagError::MalformedReport(_) => "malformed-report",
            TagError::UnhandledMail(_) => "unhandled-mail",
            TagError::LoopClosed => "loop-closed",
        }
    }
}

pub type TagResult<T> = Result<T, TagError>;
