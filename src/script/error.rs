//! Errors raised across the script boundary.

use crate::messaging::{
    domain::ConfigError,
    services::{ErrorKind, MessagingError},
};
use serde_json::{Value, json};
use thiserror::Error;

/// Errors surfaced to scripts as thrown exceptions.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A method was called with the wrong number of arguments.
    #[error("{method} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Method or constructor name.
        method: &'static str,
        /// Accepted argument counts.
        expected: String,
        /// Arguments supplied.
        actual: usize,
    },

    /// The queue name argument is absent or not a string.
    #[error("missing queue name")]
    MissingQueueName,

    /// The body argument is absent or not a string.
    #[error("missing message body")]
    MissingBody,

    /// The headers argument is not an object of string values.
    #[error("headers must be an object with string values")]
    InvalidHeaders,

    /// A constructor received something other than a configuration object.
    #[error("{export} expects a configuration object")]
    InvalidConfigArgument {
        /// Constructor name.
        export: &'static str,
    },

    /// The object has no method with this name.
    #[error("{object} has no method '{method}'")]
    UnknownMethod {
        /// Exported object name.
        object: &'static str,
        /// Requested method.
        method: String,
    },

    /// The module has no export with this name.
    #[error("module has no export named '{0}'")]
    UnknownExport(String),

    /// A producer or consumer operation failed.
    #[error(transparent)]
    Messaging(#[from] MessagingError),
}

impl From<ConfigError> for ScriptError {
    fn from(err: ConfigError) -> Self {
        Self::Messaging(MessagingError::Config(err))
    }
}

impl ScriptError {
    /// Returns the failure category; argument problems count as configuration errors.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Messaging(err) => err.kind(),
            _ => ErrorKind::Config,
        }
    }

    /// Returns the exception payload handed to the host.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.kind().as_str(),
            "message": self.to_string(),
        })
    }
}

/// Result type for script calls.
pub type ScriptResult<T> = Result<T, ScriptError>;
