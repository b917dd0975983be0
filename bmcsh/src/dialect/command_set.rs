//! Command set definition: the per-vendor table of command steps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Operation;

/// One vendor-specific command line and the response text that proves it
/// worked.
///
/// Markers are matched by literal, case-sensitive substring containment,
/// never full-string equality: firmware wraps the fixed phrase in variable
/// prefixes and suffixes (timestamps, RAC ids, progress dots), so equality
/// would never hold in practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStep {
    /// The literal command line the firmware accepts.
    pub command: String,

    /// Response substrings that indicate success; any one match suffices.
    #[serde(default)]
    pub success_markers: Vec<String>,

    /// Response substring meaning "the host is powered on", for
    /// power-state queries. Distinct from success markers: the query
    /// command succeeds even when the host is off, so this is searched
    /// over the response content rather than used to pass or fail the
    /// command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_on_marker: Option<String>,
}

impl CommandStep {
    /// Create a step for the given command line.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success_markers: vec![],
            power_on_marker: None,
        }
    }

    /// Add a success marker.
    pub fn with_success_marker(mut self, marker: impl Into<String>) -> Self {
        self.success_markers.push(marker.into());
        self
    }

    /// Set the powered-on marker for a power-state query step.
    pub fn with_power_on_marker(mut self, marker: impl Into<String>) -> Self {
        self.power_on_marker = Some(marker.into());
        self
    }

    /// Classify a raw response: the first success marker contained in it,
    /// if any.
    pub fn matched_marker<'a>(&'a self, output: &str) -> Option<&'a str> {
        self.success_markers
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }
}

/// A vendor dialect: the mapping from logical operation to command steps.
///
/// Multi-step entries are ordered; the execution engine runs them in
/// sequence and a step only runs if every step before it classified as
/// success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    /// Dialect name (e.g., "idrac8", "ilo").
    pub name: String,

    /// Command steps per operation, in required execution order.
    pub operations: IndexMap<Operation, Vec<CommandStep>>,
}

impl CommandSet {
    /// Create a new dialect with no operations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: IndexMap::new(),
        }
    }

    /// Map an operation to a single command step.
    pub fn with_step(self, operation: Operation, step: CommandStep) -> Self {
        self.with_sequence(operation, vec![step])
    }

    /// Map an operation to an ordered sequence of command steps.
    pub fn with_sequence(mut self, operation: Operation, steps: Vec<CommandStep>) -> Self {
        self.operations.insert(operation, steps);
        self
    }

    /// Get the command steps for an operation. `None` when the dialect
    /// does not express the operation.
    pub fn steps(&self, operation: Operation) -> Option<&[CommandStep]> {
        self.operations
            .get(&operation)
            .map(Vec::as_slice)
            .filter(|steps| !steps.is_empty())
    }

    /// Check whether the dialect expresses an operation.
    pub fn supports(&self, operation: Operation) -> bool {
        self.steps(operation).is_some()
    }
}
