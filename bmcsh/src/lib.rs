//! # bmcsh
//!
//! Async SSH client for legacy BMC command-line dialects.
//!
//! Older baseboard management controllers (Dell iDRAC, HP iLO) expose
//! power control through a vendor CLI over SSH: you run a line of text
//! and classify the line of text that comes back. bmcsh packages that
//! protocol layer (session lifecycle, per-vendor command tables, and
//! response classification) behind one typed API.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, established lazily and reused
//! - Vendor dialects as plain data tables (iDRAC8 and iLO built in)
//! - Literal substring classification of free-text firmware responses
//! - Multi-step operations (one-time PXE boot) with strict step gating
//! - Easy vendor extensibility, including dialects loaded from config
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bmcsh::BmcBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bmcsh::Error> {
//!     let mut bmc = BmcBuilder::new("10.0.0.10")
//!         .username("root")
//!         .password("calvin")
//!         .dialect("idrac8")
//!         .build()?;
//!
//!     if !bmc.is_on().await? {
//!         bmc.power_on().await?;
//!     }
//!
//!     bmc.close().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dialect;
pub mod error;
pub mod transport;

// Re-export main types for convenience
pub use client::{Bmc, BmcBuilder, Outcome};
pub use dialect::{CommandSet, CommandStep, DialectRegistry, Operation};
pub use error::Error;
pub use transport::{AuthMethod, Connector, HostKeyVerification, Session, SshConfig};
