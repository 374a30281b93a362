//! Turn scheduling.
//!
//! The scheduler walks a fixed roster of characters in order. For each
//! action decision it:
//!
//! 1. Builds feedback: the full perception on a character's first
//!    decision, afterwards the outcome of its previous action.
//! 2. Asks the character's strategy for a command, bounded by the decision
//!    timeout. A failed or late decision is replaced by the default command.
//! 3. Parses and resolves the command against the shared world.
//! 4. Publishes exactly one [`Event`] and stores the outcome as feedback.
//! 5. Advances to the next character if the action ends the turn, or if
//!    the character has used up its actions for this turn.
//!
//! World mutation happens in one synchronous section after the decision
//! resolves, so an in-flight [`Scheduler::step`] can be dropped at its only
//! suspension point without leaving partial state behind.

use std::fmt;
use std::sync::Arc;

use agora_foundation::{Error, ErrorKind, Result, ThingId};
use agora_parser::{FailureKind, Perception, Resolution, Resolver, discover};
use agora_world::World;
use parking_lot::RwLock;
use serde_json::{Map, Value as Json, json};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::event::{Event, PendingEvent};
use crate::event_log::EventLog;
use crate::strategy::{AgentStrategy, Feedback, StrategyError};

/// The world shared between the scheduler and its readers.
pub type SharedWorld = Arc<RwLock<World>>;

// =============================================================================
// Roster
// =============================================================================

struct Participant {
    actor: ThingId,
    name: String,
    strategy: Box<dyn AgentStrategy>,
    feedback: Option<String>,
    active: bool,
}

// =============================================================================
// Scheduler
// =============================================================================

/// Sequential turn orchestration.
pub struct Scheduler {
    resolver: Arc<Resolver>,
    world: SharedWorld,
    initial: World,
    log: EventLog,
    config: SchedulerConfig,
    roster: Vec<Participant>,
    current: usize,
    actions_this_turn: usize,
    turns: u64,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("characters", &self.roster.len())
            .field("current", &self.current)
            .field("turns", &self.turns)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Creates a scheduler over `world`. The world as given is the state
    /// restored by [`Scheduler::reset`].
    #[must_use]
    pub fn new(world: World, resolver: Resolver, config: SchedulerConfig) -> Self {
        Self {
            resolver: Arc::new(resolver),
            world: Arc::new(RwLock::new(world.clone())),
            initial: world,
            log: EventLog::new(),
            config,
            roster: Vec::new(),
            current: 0,
            actions_this_turn: 0,
            turns: 0,
        }
    }

    /// Creates a scheduler with the standard action set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the standard actions fail to
    /// register.
    pub fn standard(world: World, config: SchedulerConfig) -> Result<Self> {
        Ok(Self::new(world, Resolver::standard()?, config))
    }

    /// Adds a character to the end of the roster.
    ///
    /// A previously removed character is reactivated in its original slot.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not a character, or is already
    /// scheduled.
    pub fn register(&mut self, actor: ThingId, strategy: Box<dyn AgentStrategy>) -> Result<()> {
        let name = {
            let world = self.world.read();
            world.character(actor)?;
            world.name_of(actor).to_string()
        };
        if let Some(existing) = self.roster.iter_mut().find(|p| p.actor == actor) {
            if existing.active {
                return Err(Error::duplicate_identity(name));
            }
            existing.active = true;
            existing.strategy = strategy;
            existing.feedback = None;
        } else {
            self.roster.push(Participant {
                actor,
                name: name.clone(),
                strategy,
                feedback: None,
                active: true,
            });
        }
        info!(character = %name, "registered");
        Ok(())
    }

    /// Adds a character by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no character has that name, or it is already
    /// scheduled.
    pub fn register_named(
        &mut self,
        name: &str,
        strategy: Box<dyn AgentStrategy>,
    ) -> Result<ThingId> {
        let actor = self
            .world
            .read()
            .thing_named(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownThing(name.to_string())))?;
        self.register(actor, strategy)?;
        Ok(actor)
    }

    /// Removes a character from scheduling. Its roster slot is kept, so the
    /// order of the others does not change. Returns false if the character
    /// was not scheduled.
    pub fn deregister(&mut self, actor: ThingId) -> bool {
        let Some(index) = self.roster.iter().position(|p| p.actor == actor && p.active) else {
            return false;
        };
        self.roster[index].active = false;
        if index == self.current {
            self.actions_this_turn = 0;
        }
        info!(character = %self.roster[index].name, "deregistered");
        true
    }

    /// Returns the shared world.
    #[must_use]
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Returns a copy of the current world.
    #[must_use]
    pub fn snapshot(&self) -> World {
        self.world.read().clone()
    }

    /// Returns the event log.
    #[must_use]
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    /// Returns the resolver.
    #[must_use]
    pub fn resolver(&self) -> Arc<Resolver> {
        Arc::clone(&self.resolver)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns the number of completed turns.
    #[must_use]
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Returns the scheduled characters in turn order.
    #[must_use]
    pub fn roster(&self) -> Vec<ThingId> {
        self.roster
            .iter()
            .filter(|p| p.active)
            .map(|p| p.actor)
            .collect()
    }

    /// Returns the character whose turn it is.
    #[must_use]
    pub fn current_actor(&self) -> Option<ThingId> {
        self.next_active().map(|i| self.roster[i].actor)
    }

    /// Returns the outcome of a character's most recent action.
    #[must_use]
    pub fn feedback(&self, actor: ThingId) -> Option<&str> {
        self.roster
            .iter()
            .find(|p| p.actor == actor)
            .and_then(|p| p.feedback.as_deref())
    }

    /// Returns what a character currently perceives.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not a character.
    pub fn perception(&self, actor: ThingId) -> Result<Perception> {
        let world = self.world.read();
        Perception::of(&self.resolver, &world, actor)
    }

    /// Runs one action decision for the current character.
    ///
    /// Returns `None` when no character is scheduled.
    pub async fn step(&mut self) -> Option<Event> {
        let index = self.next_active()?;
        if index != self.current {
            self.current = index;
            self.actions_this_turn = 0;
        }
        let turn = self.turns + 1;
        let actor = self.roster[index].actor;
        if self.actions_this_turn == 0 {
            info!(turn, character = %self.roster[index].name, "turn started");
        }
        let feedback = self.feedback_for(index, turn);

        let timeout = self.config.decision_timeout();
        let participant = &mut self.roster[index];
        let decision = tokio::time::timeout(timeout, participant.strategy.decide(&feedback)).await;
        let (command, strategy_error) = match decision {
            Ok(Ok(command)) => (command, None),
            Ok(Err(error)) => (self.config.default_command.clone(), Some(error)),
            Err(_) => (
                self.config.default_command.clone(),
                Some(StrategyError::TimedOut(self.config.decision_timeout_ms)),
            ),
        };
        if let Some(error) = &strategy_error {
            warn!(
                turn,
                character = %participant.name,
                %error,
                default = %command,
                "decision failed; substituting default"
            );
        }

        let mut resolution = {
            let mut world = self.world.write();
            self.resolver.execute(&mut world, actor, &command)
        };
        // The default command's own outcome survives in the payload.
        let default_failure = strategy_error.as_ref().and(resolution.failure);
        if strategy_error.is_some() {
            resolution.failure = Some(FailureKind::StrategyFailure);
            resolution.ends_turn = true;
        }
        debug!(turn, character = %self.roster[index].name, %command, outcome = ?resolution.failure, "resolved");

        let mut payload = self.payload(actor, &resolution, strategy_error.as_ref());
        if strategy_error.is_some() {
            payload["default_failure"] = json!(default_failure);
        }
        let event = self.log.publish(PendingEvent {
            turn,
            actor: self.roster[index].name.clone(),
            command,
            resolution,
            payload,
        });
        self.roster[index].feedback = Some(event.description.clone());

        self.actions_this_turn += 1;
        if !event.ends_turn && self.actions_this_turn >= self.config.max_actions_per_turn {
            debug!(turn, character = %self.roster[index].name, "action limit reached");
        }
        if event.ends_turn || self.actions_this_turn >= self.config.max_actions_per_turn {
            self.end_turn();
        }
        Some(event)
    }

    /// Runs actions until the current character's turn ends.
    pub async fn run_turn(&mut self) -> Vec<Event> {
        let start = self.turns;
        let mut events = Vec::new();
        while self.turns == start {
            match self.step().await {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    /// Runs `count` complete turns.
    pub async fn run_turns(&mut self, count: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..count {
            let batch = self.run_turn().await;
            if batch.is_empty() {
                break;
            }
            events.extend(batch);
        }
        events
    }

    /// Restores the initial world and clears the event log, turn counters,
    /// and stored feedback. Strategies are reset as well.
    pub fn reset(&mut self) {
        *self.world.write() = self.initial.clone();
        self.log.reset();
        self.current = 0;
        self.actions_this_turn = 0;
        self.turns = 0;
        for participant in &mut self.roster {
            participant.feedback = None;
            participant.strategy.reset();
        }
        info!("scheduler reset");
    }

    /// Moves the scheduler onto a background task.
    #[must_use]
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let world = self.world();
        let log = self.log();
        let resolver = self.resolver();
        let task = tokio::spawn(self.run(shutdown_rx, request_rx));
        SchedulerHandle {
            shutdown: shutdown_tx,
            requests: request_tx,
            task,
            world,
            log,
            resolver,
        }
    }

    async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
        mut requests: mpsc::UnboundedReceiver<Request>,
    ) -> Self {
        info!(characters = self.roster().len(), "scheduler started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            if self.config.max_turns.is_some_and(|max| self.turns >= max) {
                info!(turns = self.turns, "turn limit reached");
                break;
            }

            let turns_before = self.turns;
            let wake = tokio::select! {
                biased;
                _ = shutdown.changed() => Wake::Stop,
                Some(request) = requests.recv() => Wake::Request(request),
                event = self.step() => Wake::Stepped(event.is_some()),
            };

            match wake {
                Wake::Stop => break,
                Wake::Request(request) => self.handle(request),
                Wake::Stepped(false) => {
                    // Nobody to schedule: wait for a registration.
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        Some(request) = requests.recv() => self.handle(request),
                        else => break,
                    }
                }
                Wake::Stepped(true) => {
                    let delay = self.config.turn_delay();
                    if self.turns > turns_before && !delay.is_zero() {
                        tokio::select! {
                            biased;
                            _ = shutdown.changed() => break,
                            () = tokio::time::sleep(delay) => {}
                        }
                    } else {
                        tokio::task::yield_now().await;
                    }
                }
            }
        }
        info!(turns = self.turns, events = self.log.len(), "scheduler stopped");
        self
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Reset(ack) => {
                self.reset();
                let _ = ack.send(());
            }
            Request::Register(actor, strategy, ack) => {
                let _ = ack.send(self.register(actor, strategy));
            }
            Request::Deregister(actor, ack) => {
                let _ = ack.send(self.deregister(actor));
            }
        }
    }

    fn next_active(&self) -> Option<usize> {
        let len = self.roster.len();
        (0..len)
            .map(|k| (self.current + k) % len)
            .find(|&i| self.roster[i].active)
    }

    fn end_turn(&mut self) {
        info!(
            turn = self.turns + 1,
            character = %self.roster[self.current].name,
            actions = self.actions_this_turn,
            "turn ended"
        );
        self.turns += 1;
        self.actions_this_turn = 0;
        self.current = (self.current + 1) % self.roster.len();
    }

    fn feedback_for(&self, index: usize, turn: u64) -> Feedback {
        let participant = &self.roster[index];
        let world = self.world.read();
        match &participant.feedback {
            Some(text) => Feedback {
                text: text.clone(),
                commands: discover(&self.resolver, &world, participant.actor).unwrap_or_default(),
                turn,
            },
            None => match Perception::of(&self.resolver, &world, participant.actor) {
                Ok(perception) => Feedback {
                    text: perception.to_string(),
                    commands: perception.commands,
                    turn,
                },
                Err(error) => {
                    warn!(character = %participant.name, %error, "no perception available");
                    Feedback {
                        turn,
                        ..Feedback::default()
                    }
                }
            },
        }
    }

    fn payload(
        &self,
        actor: ThingId,
        resolution: &Resolution,
        strategy_error: Option<&StrategyError>,
    ) -> Json {
        let world = self.world.read();
        let location = world
            .character(actor)
            .and_then(|c| world.location(c.location))
            .map(|l| l.name.clone())
            .ok();
        let targets: Map<String, Json> = resolution
            .targets
            .iter()
            .map(|(slot, name)| (slot.clone(), Json::String(name.clone())))
            .collect();
        json!({
            "actor_id": actor.0,
            "location": location,
            "targets": targets,
            "strategy_error": strategy_error.map(ToString::to_string),
        })
    }
}

// =============================================================================
// Background Task
// =============================================================================

enum Request {
    Reset(oneshot::Sender<()>),
    Register(ThingId, Box<dyn AgentStrategy>, oneshot::Sender<Result<()>>),
    Deregister(ThingId, oneshot::Sender<bool>),
}

enum Wake {
    Stop,
    Request(Request),
    Stepped(bool),
}

/// A scheduler running on a background task.
///
/// Dropping the handle also stops the task.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    requests: mpsc::UnboundedSender<Request>,
    task: JoinHandle<Scheduler>,
    world: SharedWorld,
    log: EventLog,
    resolver: Arc<Resolver>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset(_) => f.write_str("Reset"),
            Self::Register(actor, ..) => write!(f, "Register({actor:?})"),
            Self::Deregister(actor, _) => write!(f, "Deregister({actor:?})"),
        }
    }
}

impl SchedulerHandle {
    /// Returns the shared world.
    #[must_use]
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Returns a copy of the current world.
    #[must_use]
    pub fn snapshot(&self) -> World {
        self.world.read().clone()
    }

    /// Returns the event log.
    #[must_use]
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    /// Returns what a character currently perceives.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not a character.
    pub fn perception(&self, actor: ThingId) -> Result<Perception> {
        let world = self.world.read();
        Perception::of(&self.resolver, &world, actor)
    }

    /// Returns true once the background task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resets the running scheduler between actions. Returns false if the
    /// task has already exited.
    pub async fn reset(&self) -> bool {
        let (ack, done) = oneshot::channel();
        if self.requests.send(Request::Reset(ack)).is_err() {
            return false;
        }
        done.await.is_ok()
    }

    /// Adds a character to the running scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if the character cannot be registered or the task
    /// has exited.
    pub async fn register(&self, actor: ThingId, strategy: Box<dyn AgentStrategy>) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.requests
            .send(Request::Register(actor, strategy, ack))
            .map_err(|_| not_running())?;
        done.await.map_err(|_| not_running())?
    }

    /// Removes a character from the running scheduler.
    pub async fn deregister(&self, actor: ThingId) -> bool {
        let (ack, done) = oneshot::channel();
        if self.requests.send(Request::Deregister(actor, ack)).is_err() {
            return false;
        }
        done.await.unwrap_or(false)
    }

    /// Signals shutdown and waits for the task, returning the scheduler.
    ///
    /// # Errors
    ///
    /// Returns the task's join error if it panicked.
    pub async fn stop(self) -> std::result::Result<Scheduler, JoinError> {
        self.shutdown.send_replace(true);
        self.task.await
    }

    /// Waits for the task to finish on its own (for example on reaching
    /// `max_turns`).
    ///
    /// # Errors
    ///
    /// Returns the task's join error if it panicked.
    pub async fn join(self) -> std::result::Result<Scheduler, JoinError> {
        self.task.await
    }
}

fn not_running() -> Error {
    Error::new(ErrorKind::Internal("scheduler is not running".to_string()))
}
