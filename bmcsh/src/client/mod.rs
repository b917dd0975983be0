//! High-level client for controller interaction.
//!
//! The client layer provides the main API: one method per logical
//! operation, executed as the vendor dialect's command sequence over a
//! lazily-established SSH session.

mod bmc;
mod builder;
pub(crate) mod outcome;

pub use bmc::Bmc;
pub use builder::BmcBuilder;
pub use outcome::Outcome;
