//! Events: immutable records of resolved actions.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use agora_parser::{FailureKind, Resolution};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Event identifier. The first event after construction or reset is 1.
pub type EventId = u64;

/// One resolved action, success or failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the log
    pub id: EventId,
    /// Wall-clock publication time, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// The scheduler turn this action belongs to
    pub turn: u64,
    /// Name of the acting character
    pub actor: String,
    /// The command as issued
    pub command: String,
    /// Name of the matched action, if any
    pub action: Option<String>,
    /// Whether the action succeeded
    pub success: bool,
    /// Narration of the outcome
    pub description: String,
    /// Failure category, if the action failed
    pub failure: Option<FailureKind>,
    /// Whether the action ended the actor's turn
    pub ends_turn: bool,
    /// Whether the world was modified
    pub world_changed: bool,
    /// Structured data for remote consumers
    pub payload: Json,
}

/// An event before the log assigns its id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingEvent {
    /// The scheduler turn
    pub turn: u64,
    /// Name of the acting character
    pub actor: String,
    /// The command as issued
    pub command: String,
    /// The resolver's outcome
    pub resolution: Resolution,
    /// Structured data for remote consumers
    pub payload: Json,
}

impl Event {
    pub(crate) fn publish(id: EventId, pending: PendingEvent) -> Self {
        let PendingEvent {
            turn,
            actor,
            command,
            resolution,
            payload,
        } = pending;
        Self {
            id,
            timestamp_ms: now_ms(),
            turn,
            actor,
            command,
            success: resolution.success(),
            action: resolution.action,
            description: resolution.description,
            failure: resolution.failure,
            ends_turn: resolution.ends_turn,
            world_changed: resolution.world_changed,
            payload,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "ok" } else { "!!" };
        write!(
            f,
            "#{} [turn {}] {} > {} ({mark})",
            self.id, self.turn, self.actor, self.command
        )?;
        for line in self.description.lines() {
            write!(f, "\n    {line}")?;
        }
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
