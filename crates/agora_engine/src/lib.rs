//! Event log, agent strategies, and the turn scheduler for Agora.
//!
//! This crate provides:
//! - [`Event`] and [`EventLog`] - The append-only record of resolved actions
//! - [`AgentStrategy`] - The decision contract, with scripted, random, and
//!   channel-driven implementations
//! - [`Scheduler`] - Sequential turn orchestration over a shared world
//! - [`SchedulerHandle`] - A running scheduler task that can be stopped or reset

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod event;
pub mod event_log;
pub mod scheduler;
pub mod strategy;

pub use config::SchedulerConfig;
pub use event::{Event, EventId, PendingEvent};
pub use event_log::EventLog;
pub use scheduler::{Scheduler, SchedulerHandle, SharedWorld};
pub use strategy::{
    AgentStrategy, ChannelDriver, ChannelStrategy, Feedback, RandomStrategy, ScriptedStrategy,
    StrategyError,
};
