//! Builder for creating controller clients.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::bmc::Bmc;
use crate::dialect::{CommandSet, DialectRegistry};
use crate::error::{DialectError, Result};
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::transport::Connector;

/// Builder for constructing a [`Bmc`] client.
///
/// # Example
///
/// ```rust,no_run
/// use bmcsh::BmcBuilder;
///
/// # fn example() -> Result<(), bmcsh::Error> {
/// let bmc = BmcBuilder::new("10.0.0.10")
///     .username("root")
///     .password("calvin")
///     .dialect("idrac8")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct BmcBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    dialect_name: Option<String>,
    custom_dialect: Option<CommandSet>,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    connector: Option<Box<dyn Connector>>,
}

impl BmcBuilder {
    /// Create a new builder for the specified controller host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            dialect_name: None,
            custom_dialect: None,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            connector: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the vendor dialect by registry name (e.g., "idrac8", "ilo").
    pub fn dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect_name = Some(dialect.into());
        self
    }

    /// Set a custom dialect definition.
    pub fn custom_dialect(mut self, dialect: CommandSet) -> Self {
        self.custom_dialect = Some(dialect);
        self
    }

    /// Set the connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Set the known_hosts file path.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Replace the session connector. Test harnesses use this to stand in
    /// a simulated controller for the SSH transport.
    pub fn connector(mut self, connector: Box<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Build the client.
    ///
    /// This creates the client but does not connect; the session is
    /// established on the first command.
    pub fn build(self) -> Result<Bmc> {
        let username = self.username.ok_or_else(|| DialectError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;

        let dialect = if let Some(custom) = self.custom_dialect {
            custom
        } else if let Some(name) = self.dialect_name {
            DialectRegistry::global()
                .read()
                .map_err(|_| DialectError::InvalidConfig {
                    message: "Failed to acquire registry lock".to_string(),
                })?
                .get(&name)
                .ok_or(DialectError::UnknownDialect { name })?
                .clone()
        } else {
            return Err(DialectError::InvalidConfig {
                message: "Dialect must be specified".to_string(),
            }
            .into());
        };

        let config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok(match self.connector {
            Some(connector) => Bmc::with_connector(config, dialect, connector),
            None => Bmc::new(config, dialect),
        })
    }
}
