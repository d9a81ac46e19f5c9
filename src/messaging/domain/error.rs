//! Error types for configuration validation and session lifecycle checks.

use thiserror::Error;

/// Errors returned while validating configuration objects and call arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is absent from the configuration object.
    #[error("configuration field '{0}' is required")]
    MissingField(&'static str),

    /// A required field is present but empty after trimming.
    #[error("configuration field '{0}' must not be blank")]
    BlankField(&'static str),

    /// An MQ object name exceeds the queue manager's length limit.
    #[error("{field} '{value}' exceeds {max} character limit")]
    NameTooLong {
        /// Configuration field holding the name.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Maximum accepted length.
        max: usize,
    },

    /// An MQ object name contains characters outside `[A-Za-z0-9._/%]`.
    #[error("{field} '{value}' contains characters outside the MQ object name set")]
    InvalidName {
        /// Configuration field holding the name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// The listener port is outside `1..=65535`.
    #[error("port number {0} is outside 1..=65535")]
    InvalidPort(i64),

    /// The listener port was given as text that is not a number.
    #[error("port number '{0}' is not numeric")]
    NonNumericPort(String),

    /// TLS is enabled but some of its settings are missing.
    #[error("TLS is enabled but {} missing", .0.join(", "))]
    IncompleteTls(Vec<&'static str>),

    /// A password was supplied without a user name.
    #[error("password requires a user name")]
    PasswordWithoutUser,

    /// The receive timeout is negative.
    #[error("receive timeout must not be negative: {0} ms")]
    NegativeTimeout(i64),

    /// A message header name is not a valid property identifier.
    #[error("header name '{0}' is not a valid property identifier")]
    InvalidHeaderName(String),

    /// A message header name uses the prefix reserved for JMS fields.
    #[error("header name '{0}' uses the reserved JMS prefix")]
    ReservedHeaderName(String),

    /// The configuration document could not be decoded.
    #[error("malformed configuration document: {0}")]
    Malformed(String),
}

/// Errors raised when a session operation is not allowed in its current state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionStateError {
    /// The session was closed; no operation may follow.
    #[error("session is closed")]
    Closed,

    /// Another operation is still in flight on the session.
    #[error("session is busy ({0})")]
    Busy(String),

    /// The requested transition is not part of the lifecycle.
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Requested target state.
        to: String,
    },
}
