//! Agent strategies: where commands come from.
//!
//! The scheduler asks a character's [`AgentStrategy`] for one command per
//! action decision, passing the feedback from that character's previous
//! action (or its full perception on the first decision). A strategy may
//! take arbitrarily long, fail, or ignore the feedback entirely; the
//! scheduler bounds every call with a timeout.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// A decision provider failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The provider reported an error
    #[error("decision failed: {0}")]
    Failed(String),
    /// A finite provider has nothing left to say
    #[error("no more commands")]
    Exhausted,
    /// The driving side of a channel strategy went away
    #[error("command channel disconnected")]
    Disconnected,
    /// The decision took longer than the configured timeout
    #[error("decision timed out after {0} ms")]
    TimedOut(u64),
}

/// What a character is told before deciding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feedback {
    /// The outcome of the previous action, or the full perception on the
    /// character's first decision
    pub text: String,
    /// Commands that would currently succeed
    pub commands: Vec<String>,
    /// The turn being decided
    pub turn: u64,
}

/// The decision contract.
#[async_trait]
pub trait AgentStrategy: Send {
    /// Returns the next command.
    async fn decide(&mut self, feedback: &Feedback) -> Result<String, StrategyError>;

    /// Restores the strategy's initial state. Called on scheduler reset.
    fn reset(&mut self) {}
}

// =============================================================================
// Scripted
// =============================================================================

/// Replays a fixed list of commands, then reports [`StrategyError::Exhausted`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedStrategy {
    script: Vec<String>,
    position: usize,
}

impl ScriptedStrategy {
    /// Creates a strategy from a list of commands.
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: commands.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }

    /// Returns the number of commands not yet issued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len() - self.position
    }
}

#[async_trait]
impl AgentStrategy for ScriptedStrategy {
    async fn decide(&mut self, _feedback: &Feedback) -> Result<String, StrategyError> {
        let command = self
            .script
            .get(self.position)
            .cloned()
            .ok_or(StrategyError::Exhausted)?;
        self.position += 1;
        Ok(command)
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}

// =============================================================================
// Random
// =============================================================================

/// Picks uniformly among the currently available commands, from a seeded
/// generator.
#[derive(Clone, Debug)]
pub struct RandomStrategy {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomStrategy {
    /// Creates a strategy with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[async_trait]
impl AgentStrategy for RandomStrategy {
    async fn decide(&mut self, feedback: &Feedback) -> Result<String, StrategyError> {
        feedback
            .commands
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| StrategyError::Failed("no commands available".to_string()))
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

// =============================================================================
// Channel
// =============================================================================

/// Waits for commands pushed by an external driver, such as a REPL.
///
/// Feedback is forwarded to the driver before each wait.
#[derive(Debug)]
pub struct ChannelStrategy {
    commands: mpsc::Receiver<String>,
    feedback: watch::Sender<Option<Feedback>>,
}

/// The driving half of a [`ChannelStrategy`].
#[derive(Clone, Debug)]
pub struct ChannelDriver {
    commands: mpsc::Sender<String>,
    feedback: watch::Receiver<Option<Feedback>>,
}

impl ChannelStrategy {
    /// Creates a connected strategy and driver. `buffer` bounds the number
    /// of commands that can be queued ahead.
    #[must_use]
    pub fn pair(buffer: usize) -> (Self, ChannelDriver) {
        let (command_tx, command_rx) = mpsc::channel(buffer.max(1));
        let (feedback_tx, feedback_rx) = watch::channel(None);
        (
            Self {
                commands: command_rx,
                feedback: feedback_tx,
            },
            ChannelDriver {
                commands: command_tx,
                feedback: feedback_rx,
            },
        )
    }
}

#[async_trait]
impl AgentStrategy for ChannelStrategy {
    async fn decide(&mut self, feedback: &Feedback) -> Result<String, StrategyError> {
        self.feedback.send_replace(Some(feedback.clone()));
        self.commands.recv().await.ok_or(StrategyError::Disconnected)
    }

    fn reset(&mut self) {
        while self.commands.try_recv().is_ok() {}
        self.feedback.send_replace(None);
    }
}

impl ChannelDriver {
    /// Queues a command for the character's next decision.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::Disconnected`] if the strategy was dropped.
    pub async fn submit(&self, command: impl Into<String>) -> Result<(), StrategyError> {
        self.commands
            .send(command.into())
            .await
            .map_err(|_| StrategyError::Disconnected)
    }

    /// Returns the feedback most recently sent to the driver.
    #[must_use]
    pub fn latest_feedback(&self) -> Option<Feedback> {
        self.feedback.borrow().clone()
    }

    /// Returns true if the strategy is waiting for a command.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.feedback.borrow().is_some()
    }

    /// Waits until new feedback arrives.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::Disconnected`] if the strategy was dropped.
    pub async fn next_feedback(&mut self) -> Result<Feedback, StrategyError> {
        loop {
            self.feedback
                .changed()
                .await
                .map_err(|_| StrategyError::Disconnected)?;
            if let Some(feedback) = self.feedback.borrow_and_update().clone() {
                return Ok(feedback);
            }
        }
    }
}
