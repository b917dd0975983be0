//! Outcome type for command step execution.

use std::time::Duration;

use crate::dialect::CommandStep;

/// Classified result of one command step.
///
/// `matched_marker` is the proof of success: it is set only when the raw
/// response contained one of the step's success markers verbatim. A step
/// that came back over a healthy transport but matched nothing is not a
/// success.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The command that was executed.
    pub command: String,

    /// The raw response text from the controller.
    pub output: String,

    /// The success marker found in the response, if any.
    pub matched_marker: Option<String>,

    /// Time taken to execute the command.
    pub elapsed: Duration,
}

impl Outcome {
    /// Classify a raw response against the step that produced it.
    pub(crate) fn classify(step: &CommandStep, output: String, elapsed: Duration) -> Self {
        let matched_marker = step.matched_marker(&output).map(str::to_string);
        Self {
            command: step.command.clone(),
            output,
            matched_marker,
            elapsed,
        }
    }

    /// Check if the response matched a success marker.
    pub fn is_success(&self) -> bool {
        self.matched_marker.is_some()
    }

    /// Check if the response contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.output.contains(pattern)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> CommandStep {
        CommandStep::new("racadm serveraction powerup").with_success_marker("successful")
    }

    #[test]
    fn test_classify_success() {
        let outcome = Outcome::classify(
            &step(),
            "Server power operation successful".to_string(),
            Duration::from_millis(5),
        );
        assert!(outcome.is_success());
        assert_eq!(outcome.matched_marker.as_deref(), Some("successful"));
        assert_eq!(outcome.command, "racadm serveraction powerup");
    }

    #[test]
    fn test_classify_unmatched() {
        let outcome = Outcome::classify(
            &step(),
            "ERROR: Unable to perform requested operation.".to_string(),
            Duration::from_millis(5),
        );
        assert!(!outcome.is_success());
        assert!(outcome.matched_marker.is_none());
    }

    #[test]
    fn test_contains_searches_content() {
        let outcome = Outcome::classify(
            &CommandStep::new("power"),
            "power: server power is currently: On".to_string(),
            Duration::from_millis(5),
        );
        // No success markers on a query step, so not a "success"...
        assert!(!outcome.is_success());
        // ...but the content is still searchable
        assert!(outcome.contains("currently: On"));
        assert!(!outcome.contains("currently: Off"));
    }
}
