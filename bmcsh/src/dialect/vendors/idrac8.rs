//! Dell iDRAC8 dialect.
//!
//! iDRAC8 exposes the `racadm` utility over SSH. Power control goes
//! through `racadm serveraction`, controller reset through
//! `racadm racreset`, and one-time boot configuration through
//! `racadm config -g cfgServerInfo`.
//!
//! # Command table
//!
//! ```text
//! racadm serveraction powerup      -> "... successful"
//! racadm serveraction powerdown    -> "... successful"
//! racadm serveraction hardreset    -> "... successful"
//! racadm racreset hard             -> "... initiated successfully"
//! racadm serveraction powerstatus  -> "Server power status: ON" / "... OFF"
//! ```
//!
//! One-time PXE boot is a three-step sequence: raise the boot-once flag,
//! point the first boot device at PXE, then hard-reset the host. The
//! final step is the same step the host power-cycle uses, so the
//! sequence succeeds exactly when a standalone power-cycle would.

use crate::dialect::{CommandSet, CommandStep, Operation};

/// Dialect name for Dell iDRAC8.
pub const DIALECT_NAME: &str = "idrac8";

/// The hard-reset step shared by the host power-cycle and the final leg
/// of the one-time PXE sequence.
fn power_cycle_step() -> CommandStep {
    CommandStep::new("racadm serveraction hardreset").with_success_marker("successful")
}

/// Create the Dell iDRAC8 command set.
pub fn command_set() -> CommandSet {
    CommandSet::new(DIALECT_NAME)
        .with_step(
            Operation::PowerOn,
            CommandStep::new("racadm serveraction powerup").with_success_marker("successful"),
        )
        .with_step(
            Operation::PowerOff,
            CommandStep::new("racadm serveraction powerdown").with_success_marker("successful"),
        )
        .with_step(Operation::PowerCycleHost, power_cycle_step())
        .with_step(
            Operation::PowerCycleController,
            CommandStep::new("racadm racreset hard")
                .with_success_marker("initiated successfully"),
        )
        .with_step(
            Operation::QueryPowerState,
            CommandStep::new("racadm serveraction powerstatus")
                .with_power_on_marker("Server power status: ON"),
        )
        .with_sequence(
            Operation::SetPxeOnce,
            vec![
                CommandStep::new("racadm config -g cfgServerInfo -o cfgServerBootOnce 1")
                    .with_success_marker("successful"),
                CommandStep::new("racadm config -g cfgServerInfo -o cfgServerFirstBootDevice PXE")
                    .with_success_marker("successful"),
                power_cycle_step(),
            ],
        )
}
