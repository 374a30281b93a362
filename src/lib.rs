//! Agora - Turn-based multi-agent text world
//!
//! This crate re-exports all layers of the Agora system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: agora_runtime    — Scenario files, REPL, CLI
//! Layer 3: agora_engine     — Event log, strategies, turn scheduler
//! Layer 2: agora_parser     — Command parser, action resolver, perception
//! Layer 1: agora_world      — Locations, things, characters, ownership
//! Layer 0: agora_foundation — Core types (ids, Value, Capability, Error)
//! ```

pub use agora_engine as engine;
pub use agora_foundation as foundation;
pub use agora_parser as parser;
pub use agora_runtime as runtime;
pub use agora_world as world;
