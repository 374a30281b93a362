//! A running simulation seen from the terminal.
//!
//! The session owns a tokio runtime with the scheduler spawned on it. The
//! REPL itself stays synchronous and reaches into the runtime only to hand
//! a command to the human character and wait for its outcome.

use std::time::Duration;

use agora_engine::{Event, EventId, EventLog, Scheduler, SchedulerHandle};
use agora_foundation::{Error, ErrorKind, Result};
use agora_parser::Perception;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::scenario::{HumanSeat, Simulation};

/// A running simulation.
#[derive(Debug)]
pub struct Session {
    runtime: Runtime,
    handle: SchedulerHandle,
    human: Option<HumanSeat>,
    title: String,
    seen: EventId,
    reply_timeout: Duration,
}

impl Session {
    /// Starts the simulation's scheduler on a fresh runtime.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the runtime cannot be created.
    pub fn start(simulation: Simulation) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| Error::io(e.to_string()))?;
        let config = simulation.scheduler.config();
        let reply_timeout = config.decision_timeout() + config.turn_delay() * 4;
        let handle = {
            let _guard = runtime.enter();
            simulation.scheduler.spawn()
        };
        Ok(Self {
            runtime,
            handle,
            human: simulation.human,
            title: simulation.title,
            seen: 0,
            reply_timeout,
        })
    }

    /// Returns the scenario title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the human character's name, if one is seated.
    #[must_use]
    pub fn human_name(&self) -> Option<&str> {
        self.human.as_ref().map(|h| h.name.as_str())
    }

    /// Returns the event log.
    #[must_use]
    pub fn log(&self) -> EventLog {
        self.handle.log()
    }

    /// Returns events published since the last call.
    pub fn take_new_events(&mut self) -> Vec<Event> {
        let log = self.handle.log();
        if log.latest_id() < self.seen {
            self.seen = 0;
        }
        let events = log.events_since(self.seen);
        if let Some(last) = events.last() {
            self.seen = last.id;
        }
        events
    }

    /// Returns what the human character perceives, or the first character
    /// when nobody is seated.
    ///
    /// # Errors
    ///
    /// Returns an error if the world has no characters.
    pub fn perception(&self) -> Result<Perception> {
        let actor = match &self.human {
            Some(human) => human.actor,
            None => self
                .handle
                .snapshot()
                .characters()
                .next()
                .ok_or_else(|| Error::new(ErrorKind::UnknownThing("any character".to_string())))?,
        };
        self.handle.perception(actor)
    }

    /// Returns what the named character perceives.
    ///
    /// # Errors
    ///
    /// Returns an error if no character has that name.
    pub fn perception_of(&self, name: &str) -> Result<Perception> {
        let actor = self
            .handle
            .snapshot()
            .thing_named(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownThing(name.to_string())))?;
        self.handle.perception(actor)
    }

    /// Describes every character and where it is.
    #[must_use]
    pub fn who(&self) -> Vec<String> {
        let world = self.handle.snapshot();
        world
            .characters()
            .filter_map(|id| {
                let state = world.character(id).ok()?;
                let location = world.location(state.location).ok()?;
                let mut line = format!("{} ({:?}) in {}", world.name_of(id), state.kind, location.name);
                let carried: Vec<_> = state.inventory().map(|t| world.name_of(t)).collect();
                if !carried.is_empty() {
                    line.push_str(&format!(", carrying {}", carried.join(", ")));
                }
                Some(line)
            })
            .collect()
    }

    /// Hands a command to the human character and waits until its outcome
    /// is published. Returns every event not yet seen.
    ///
    /// # Errors
    ///
    /// Returns an error if no human is seated or the scheduler has stopped.
    pub fn submit(&mut self, command: &str) -> Result<Vec<Event>> {
        let human = self
            .human
            .as_ref()
            .ok_or_else(|| Error::config("this scenario has no human character"))?;
        let log = self.handle.log();
        let mark = log.latest_id();
        let timeout = self.reply_timeout;

        self.runtime.block_on(async {
            human
                .driver
                .submit(command)
                .await
                .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
            if tokio::time::timeout(timeout, wait_for_actor(&log, &human.name, mark))
                .await
                .is_err()
            {
                debug!(command, "no reply before timeout");
            }
            Ok::<_, Error>(())
        })?;
        Ok(self.take_new_events())
    }

    /// Returns the commands currently available to the human character.
    #[must_use]
    pub fn available_commands(&self) -> Vec<String> {
        self.human
            .as_ref()
            .and_then(|h| self.handle.perception(h.actor).ok())
            .map(|p| p.commands)
            .unwrap_or_default()
    }

    /// Resets the simulation to its initial state.
    pub fn reset(&mut self) -> bool {
        let done = self.runtime.block_on(self.handle.reset());
        self.seen = 0;
        done
    }

    /// Stops the scheduler and returns it.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the scheduler task panicked.
    pub fn shutdown(self) -> Result<Scheduler> {
        let Self {
            runtime, handle, ..
        } = self;
        runtime
            .block_on(handle.stop())
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))
    }
}

async fn wait_for_actor(log: &EventLog, actor: &str, after: EventId) {
    let mut latest = log.subscribe();
    loop {
        if log.events_since(after).iter().any(|e| e.actor == actor) {
            return;
        }
        if latest.changed().await.is_err() {
            return;
        }
    }
}
