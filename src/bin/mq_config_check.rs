//! Validates a producer or consumer configuration file without connecting.
//!
//! Usage:
//!
//! ```text
//! mq_config_check <producer|consumer> <config-path>
//! ```
//!
//! The JSON document at `config-path` is the object a script would pass to
//! `new Producer(...)` or `new Consumer(...)`. A representative consumer
//! document is:
//!
//! ```json
//! {
//!   "qmName": "QM1",
//!   "hostname": "localhost",
//!   "portNumber": 1414,
//!   "channelName": "DEV.APP.SVRCONN",
//!   "queueName": "DEV.QUEUE.1",
//!   "timeout": 5000,
//!   "msgLimit": 2
//! }
//! ```
//!
//! On success the validated settings are written to standard output as
//! JSON, with the password reduced to a presence flag. Set `RUST_LOG` to
//! see diagnostics on standard error.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ibmmq_bridge::messaging::domain::{
    ConfigError, ConnectionConfig, ConsumerConfig, ProducerConfig,
};
use serde_json::{Value, json};
use std::env;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while checking a configuration file.
#[derive(Debug, Error)]
enum CheckError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
    #[error("failed to write summary: {0}")]
    Output(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Producer,
    Consumer,
}

impl Role {
    fn parse(arg: &str) -> Result<Self, CheckError> {
        match arg {
            "producer" => Ok(Self::Producer),
            "consumer" => Ok(Self::Consumer),
            other => Err(CheckError::InvalidArgs(format!(
                "unknown role '{other}'; expected producer or consumer"
            ))),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()?;

    let (role, config_path) = parse_args(collect_args()?.into_iter())?;
    let summary = check(role, &config_path)?;
    write_summary(&mut io::stdout().lock(), &summary)?;
    info!(role = role.as_str(), path = %config_path, "configuration is valid");
    Ok(())
}

fn collect_args() -> Result<Vec<String>, CheckError> {
    env::args_os()
        .map(|arg_os| {
            arg_os
                .into_string()
                .map_err(|_| CheckError::InvalidArgs("argument is not valid UTF-8".into()))
        })
        .collect()
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Role, Utf8PathBuf), CheckError> {
    let _program = args.next();
    let role = args
        .next()
        .ok_or_else(|| CheckError::InvalidArgs("missing role argument".into()))
        .and_then(|arg| Role::parse(&arg))?;
    let config_path = args
        .next()
        .map(Utf8PathBuf::from)
        .ok_or_else(|| CheckError::InvalidArgs("missing config path argument".into()))?;
    if let Some(extra) = args.next() {
        return Err(CheckError::InvalidArgs(format!(
            "unexpected extra argument: {extra}"
        )));
    }
    Ok((role, config_path))
}

fn check(role: Role, config_path: &Utf8Path) -> Result<Value, CheckError> {
    let text = read_config_file(config_path).map_err(|source| CheckError::ConfigRead {
        path: config_path.to_owned(),
        source,
    })?;
    let document: Value =
        serde_json::from_str(&text).map_err(|source| CheckError::ConfigParse {
            path: config_path.to_owned(),
            source,
        })?;
    debug!(role = role.as_str(), path = %config_path, "configuration parsed");

    let summary = match role {
        Role::Producer => producer_summary(&ProducerConfig::from_json(&document)?),
        Role::Consumer => consumer_summary(&ConsumerConfig::from_json(&document)?),
    };
    Ok(summary)
}

fn read_config_file(path: &Utf8Path) -> io::Result<String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}

fn connection_summary(connection: &ConnectionConfig) -> Value {
    json!({
        "queueManager": connection.queue_manager().as_str(),
        "connectionName": connection.connection_name(),
        "channel": connection.channel().as_str(),
        "userName": connection.credentials().map(|credentials| credentials.user_name()),
        "passwordSet": connection
            .credentials()
            .is_some_and(|credentials| credentials.password().is_some()),
        "tls": connection.tls().map(|tls| json!({
            "cipherSpec": tls.cipher_spec(),
            "keyRepository": tls.key_repository(),
            "certificateLabel": tls.certificate_label(),
        })),
    })
}

fn producer_summary(config: &ProducerConfig) -> Value {
    json!({
        "role": Role::Producer.as_str(),
        "connection": connection_summary(config.connection()),
        "transacted": config.session_mode().is_transacted(),
    })
}

fn consumer_summary(config: &ConsumerConfig) -> Value {
    json!({
        "role": Role::Consumer.as_str(),
        "connection": connection_summary(config.connection()),
        "transacted": config.session_mode().is_transacted(),
        "queue": config.queue().as_str(),
        "timeoutMs": u64::try_from(config.timeout().as_duration().as_millis()).unwrap_or(u64::MAX),
        "msgLimit": config.limit().get(),
    })
}

fn write_summary(out: &mut impl Write, summary: &Value) -> Result<(), CheckError> {
    serde_json::to_writer_pretty(&mut *out, summary)
        .map_err(|err| CheckError::Output(err.into()))?;
    writeln!(out).map_err(CheckError::Output)
}
