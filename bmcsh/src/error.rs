//! Error types for bmcsh.

use std::io;
use thiserror::Error;

use crate::dialect::Operation;

/// Main error type for bmcsh operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Command classification errors. Transparent so that the raw
    /// controller text surfaces unchanged as the error message.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Dialect definition and lookup errors
    #[error("Dialect error: {0}")]
    Dialect(#[from] DialectError),
}

/// Transport layer errors (SSH connection, authentication, remote exec).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Remote command exited nonzero before producing a classifiable
    /// response
    #[error("Remote command exited with status {status}: {output}")]
    ExitStatus { status: u32, output: String },

    /// Host key changed since it was recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged {
        host: String,
        port: u16,
        line: usize,
    },

    /// Host key not present in known_hosts under strict verification
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts file could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Command classification errors.
///
/// The CLI protocols spoken by management controllers carry no structured
/// error codes; the response text is the only diagnostic there is. The
/// `UnexpectedResponse` message is therefore exactly that text.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The controller answered, but the response matched no success marker
    #[error("{output}")]
    UnexpectedResponse { command: String, output: String },

    /// A power-state query was issued through a step that defines no
    /// power marker
    #[error("Dialect '{dialect}' defines no power marker for '{command}'")]
    MissingPowerMarker { dialect: String, command: String },
}

/// Dialect definition and registry errors.
#[derive(Error, Debug)]
pub enum DialectError {
    /// No dialect registered under this name
    #[error("Unknown dialect '{name}'")]
    UnknownDialect { name: String },

    /// A dialect with this name is already registered
    #[error("Dialect '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// The dialect defines no command sequence for the operation
    #[error("Dialect '{dialect}' does not support {operation}")]
    UnsupportedOperation {
        dialect: String,
        operation: Operation,
    },

    /// Invalid configuration in the client builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias using bmcsh's Error.
pub type Result<T> = std::result::Result<T, Error>;
