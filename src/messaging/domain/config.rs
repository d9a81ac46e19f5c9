//! Connection descriptors and per-adapter configuration.

use super::{ChannelName, ConfigError, QueueManagerName, QueueName};
use std::fmt;
use std::time::Duration;

/// Highest TCP port a listener can bind.
const MAX_PORT: i64 = 65_535;

/// Returns `value` trimmed, or `None` when it is absent or blank.
pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// User credentials presented when the connection is established.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_name: String,
    password: Option<String>,
}

impl Credentials {
    /// Creates credentials for `user_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BlankField`] when the user name is blank.
    pub fn new(user_name: impl Into<String>) -> Result<Self, ConfigError> {
        let normalized = user_name.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ConfigError::BlankField("userName"));
        }

        Ok(Self {
            user_name: normalized,
            password: None,
        })
    }

    /// Attaches a password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Replaces the password, keeping it exactly as given.
    #[must_use]
    pub fn with_optional_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Returns the user name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Returns the password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// TLS parameters for the client channel.
///
/// All three values are required together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    cipher_spec: String,
    key_repository: String,
    certificate_label: String,
}

impl TlsSettings {
    /// Creates TLS settings, reporting every missing value at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteTls`] naming each absent or blank
    /// field.
    pub fn new(
        cipher_spec: Option<String>,
        key_repository: Option<String>,
        certificate_label: Option<String>,
    ) -> Result<Self, ConfigError> {
        let cipher = non_blank(cipher_spec);
        let repository = non_blank(key_repository);
        let label = non_blank(certificate_label);

        match (cipher, repository, label) {
            (Some(cipher_spec), Some(key_repository), Some(certificate_label)) => Ok(Self {
                cipher_spec,
                key_repository,
                certificate_label,
            }),
            (cipher, repository, label) => {
                let missing = [
                    ("tlsCipherSpec", cipher.is_none()),
                    ("keyRepoPath", repository.is_none()),
                    ("certLabel", label.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(ConfigError::IncompleteTls(missing))
            }
        }
    }

    /// Returns the cipher specification, e.g. `ANY_TLS12_OR_HIGHER`.
    #[must_use]
    pub fn cipher_spec(&self) -> &str {
        &self.cipher_spec
    }

    /// Returns the key repository path (without the `.kdb` suffix).
    #[must_use]
    pub fn key_repository(&self) -> &str {
        &self.key_repository
    }

    /// Returns the client certificate label.
    #[must_use]
    pub fn certificate_label(&self) -> &str {
        &self.certificate_label
    }
}

/// Acknowledgement mode of the session opened for an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionMode {
    /// Sends and receives form a unit of work finalized by `commit`.
    #[default]
    Transacted,
    /// Every send and receive is final immediately; `commit` is rejected.
    AutoAcknowledge,
}

impl SessionMode {
    /// Maps the `transacted` configuration flag to a session mode.
    #[must_use]
    pub const fn from_transacted(transacted: bool) -> Self {
        if transacted {
            Self::Transacted
        } else {
            Self::AutoAcknowledge
        }
    }

    /// Returns whether the session groups operations into a unit of work.
    #[must_use]
    pub const fn is_transacted(self) -> bool {
        matches!(self, Self::Transacted)
    }
}

/// Immutable descriptor of how to reach a queue manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    queue_manager: QueueManagerName,
    hostname: String,
    port: u16,
    channel: ChannelName,
    credentials: Option<Credentials>,
    tls: Option<TlsSettings>,
}

impl ConnectionConfig {
    /// Creates a connection descriptor without credentials or TLS.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BlankField`] for a blank host name and
    /// [`ConfigError::InvalidPort`] for port zero or values above 65535.
    pub fn new(
        queue_manager: QueueManagerName,
        hostname: impl Into<String>,
        port: i64,
        channel: ChannelName,
    ) -> Result<Self, ConfigError> {
        let normalized_host = hostname.into().trim().to_owned();
        if normalized_host.is_empty() {
            return Err(ConfigError::BlankField("hostname"));
        }

        if !(1..=MAX_PORT).contains(&port) {
            return Err(ConfigError::InvalidPort(port));
        }
        let checked_port = u16::try_from(port).map_err(|_| ConfigError::InvalidPort(port))?;

        Ok(Self {
            queue_manager,
            hostname: normalized_host,
            port: checked_port,
            channel,
            credentials: None,
            tls: None,
        })
    }

    /// Attaches user credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Enables TLS on the client channel.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsSettings) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Returns the queue-manager name.
    #[must_use]
    pub const fn queue_manager(&self) -> &QueueManagerName {
        &self.queue_manager
    }

    /// Returns the listener host name.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the listener port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the SVRCONN channel name.
    #[must_use]
    pub const fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Returns the MQ connection name in `host(port)` form.
    #[must_use]
    pub fn connection_name(&self) -> String {
        format!("{}({})", self.hostname, self.port)
    }

    /// Returns the credentials, if any.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns the TLS settings, if TLS is enabled.
    #[must_use]
    pub const fn tls(&self) -> Option<&TlsSettings> {
        self.tls.as_ref()
    }
}

/// Upper bound on how long a single receive waits for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReceiveTimeout(Duration);

impl ReceiveTimeout {
    /// Creates a timeout from milliseconds. Zero polls without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NegativeTimeout`] for negative values.
    pub fn from_millis(millis: i64) -> Result<Self, ConfigError> {
        let checked = u64::try_from(millis).map_err(|_| ConfigError::NegativeTimeout(millis))?;
        Ok(Self(Duration::from_millis(checked)))
    }

    /// Returns the timeout as a duration.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        self.0
    }
}

/// Number of messages a single `consume` call receives.
///
/// Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageLimit(usize);

impl MessageLimit {
    /// Normalizes a script-supplied limit; zero and negative values become 1.
    #[must_use]
    pub fn normalized(limit: i64) -> Self {
        Self(
            usize::try_from(limit)
                .ok()
                .filter(|value| *value > 0)
                .unwrap_or(1),
        )
    }

    /// Returns the limit.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for MessageLimit {
    fn default() -> Self {
        Self(1)
    }
}

/// Validated configuration of a producer adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    connection: ConnectionConfig,
    session_mode: SessionMode,
}

impl ProducerConfig {
    /// Creates a producer configuration with a transacted session.
    #[must_use]
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            session_mode: SessionMode::Transacted,
        }
    }

    /// Overrides the session mode.
    #[must_use]
    pub const fn with_session_mode(mut self, session_mode: SessionMode) -> Self {
        self.session_mode = session_mode;
        self
    }

    /// Returns the connection descriptor.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Returns the session mode.
    #[must_use]
    pub const fn session_mode(&self) -> SessionMode {
        self.session_mode
    }
}

/// Validated configuration of a consumer adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    connection: ConnectionConfig,
    queue: QueueName,
    timeout: ReceiveTimeout,
    limit: MessageLimit,
    session_mode: SessionMode,
}

impl ConsumerConfig {
    /// Creates a consumer configuration that receives one message per call
    /// without waiting.
    #[must_use]
    pub fn new(connection: ConnectionConfig, queue: QueueName) -> Self {
        Self {
            connection,
            queue,
            timeout: ReceiveTimeout::default(),
            limit: MessageLimit::default(),
            session_mode: SessionMode::Transacted,
        }
    }

    /// Sets the per-receive timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: ReceiveTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of messages each `consume` call receives.
    #[must_use]
    pub const fn with_limit(mut self, limit: MessageLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Overrides the session mode.
    #[must_use]
    pub const fn with_session_mode(mut self, session_mode: SessionMode) -> Self {
        self.session_mode = session_mode;
        self
    }

    /// Returns the connection descriptor.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Returns the queue messages are consumed from.
    #[must_use]
    pub const fn queue(&self) -> &QueueName {
        &self.queue
    }

    /// Returns the per-receive timeout.
    #[must_use]
    pub const fn timeout(&self) -> ReceiveTimeout {
        self.timeout
    }

    /// Returns the per-call message limit.
    #[must_use]
    pub const fn limit(&self) -> MessageLimit {
        self.limit
    }

    /// Returns the session mode.
    #[must_use]
    pub const fn session_mode(&self) -> SessionMode {
        self.session_mode
    }
}
