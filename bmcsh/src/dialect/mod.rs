//! Vendor dialect definitions for management controllers.
//!
//! Controllers speak vendor-specific CLI dialects with no machine-readable
//! structure. A dialect is plain data: for each logical operation, the
//! literal command line(s) the firmware accepts and the literal response
//! substring(s) that mean it worked. One execution engine in
//! [`crate::client`] is parameterized over these tables; adding a vendor
//! means adding a table, not a type hierarchy.

mod command_set;
mod registry;
pub mod vendors;

pub use command_set::{CommandSet, CommandStep};
pub use registry::DialectRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A vendor-agnostic management intent.
///
/// Each dialect maps an operation to one or more [`CommandStep`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Power the host on.
    PowerOn,

    /// Power the host off.
    PowerOff,

    /// Hard-reset the host.
    PowerCycleHost,

    /// Reboot the management controller itself.
    PowerCycleController,

    /// Boot from the network exactly once, then power-cycle the host.
    SetPxeOnce,

    /// Ask whether the host is currently powered on.
    QueryPowerState,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::PowerOn => "power on",
            Operation::PowerOff => "power off",
            Operation::PowerCycleHost => "power cycle host",
            Operation::PowerCycleController => "power cycle controller",
            Operation::SetPxeOnce => "set pxe once",
            Operation::QueryPowerState => "query power state",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::PowerCycleHost.to_string(), "power cycle host");
        assert_eq!(Operation::SetPxeOnce.to_string(), "set pxe once");
    }

    #[test]
    fn test_operation_serde_names() {
        assert_eq!(
            serde_json::to_string(&Operation::PowerCycleController).unwrap(),
            "\"power_cycle_controller\""
        );
        let op: Operation = serde_json::from_str("\"query_power_state\"").unwrap();
        assert_eq!(op, Operation::QueryPowerState);
    }
}
