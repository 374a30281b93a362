//! Configuration for the turn scheduler.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the turn scheduler.
///
/// Deserializes from the `[scheduler]` table of a scenario file; every
/// field is optional there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause between turns when running as a background task.
    pub turn_delay_ms: u64,

    /// Upper bound on a single decision.
    pub decision_timeout_ms: u64,

    /// Actions one character may take before its turn is forced to end.
    pub max_actions_per_turn: usize,

    /// Command substituted when a decision fails or times out.
    pub default_command: String,

    /// Stop the background loop after this many turns.
    pub max_turns: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            turn_delay_ms: 500,
            decision_timeout_ms: 30_000,
            max_actions_per_turn: 4,
            default_command: "look".to_string(),
            max_turns: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates a configuration for tests and batch runs: no delay and a
    /// short decision timeout.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            turn_delay_ms: 0,
            decision_timeout_ms: 1_000,
            ..Self::default()
        }
    }

    /// Returns the inter-turn delay.
    #[must_use]
    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }

    /// Returns the decision timeout.
    #[must_use]
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Builder method to set the inter-turn delay.
    #[must_use]
    pub fn with_turn_delay(mut self, delay: Duration) -> Self {
        self.turn_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Builder method to set the decision timeout.
    #[must_use]
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Builder method to set the per-turn action cap. Zero is treated as 1.
    #[must_use]
    pub fn with_max_actions_per_turn(mut self, max: usize) -> Self {
        self.max_actions_per_turn = max.max(1);
        self
    }

    /// Builder method to set the fallback command.
    #[must_use]
    pub fn with_default_command(mut self, command: impl Into<String>) -> Self {
        self.default_command = command.into();
        self
    }

    /// Builder method to bound the background loop.
    #[must_use]
    pub fn with_max_turns(mut self, turns: Option<u64>) -> Self {
        self.max_turns = turns;
        self
    }
}
