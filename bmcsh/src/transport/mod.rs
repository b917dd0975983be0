//! SSH transport layer wrapping russh.
//!
//! This module owns the session provider boundary: connecting to a
//! controller, authenticating, and running one command line at a time.
//! The traits here are what the client executes through, so anything
//! that can run a command and hand back captured text can stand in for
//! the real SSH transport.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::{SshConnector, SshTransport};

use async_trait::async_trait;

use crate::error::TransportError;

/// An authenticated channel to one management controller.
///
/// A session is only valid for the target it was authenticated against
/// and carries no cross-target state. Commands are issued one at a time;
/// `&mut self` keeps callers from interleaving commands on one channel.
#[async_trait]
pub trait Session: Send {
    /// Run a single command line and return the captured response text
    /// (stdout and stderr combined).
    async fn run(&mut self, command: &str) -> std::result::Result<String, TransportError>;

    /// Tear the session down.
    async fn close(&mut self) -> std::result::Result<(), TransportError>;
}

/// Connects and authenticates sessions to management controllers.
///
/// One authentication attempt per call; retry policy belongs to the
/// caller.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish an authenticated session to the configured target.
    async fn connect(
        &self,
        config: &SshConfig,
    ) -> std::result::Result<Box<dyn Session>, TransportError>;
}
