//! Scenarios, REPL, and CLI for Agora.
//!
//! This crate provides:
//! - [`Scenario`] - TOML scenario files and their instantiation
//! - [`Session`] - A scheduler running in the background for a terminal
//! - [`Repl`] - Interactive read-eval-print loop playing the human character

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod repl;
pub mod scenario;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{MetaCommand, Repl};
pub use scenario::{CharacterEntry, HumanSeat, Scenario, Simulation, StrategyKind};
pub use session::Session;
