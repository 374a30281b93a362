//! Command parsing, action resolution, and perception for Agora.
//!
//! This crate turns character input like "get apple" or "put key in box"
//! into world changes, and tells each character what it can see and do.
//!
//! # Architecture
//!
//! ```text
//! "put the key in the box"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   TOKENIZER     │  → ["put", "the", "key", "in", "the", "box"]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ PATTERN         │  → place in: "put {item} in {recipient}"
//! │ MATCHING        │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ NOUN            │  → item = key, recipient = box
//! │ RESOLUTION      │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CAPABILITY +    │  → box is a Container, and it is open
//! │ PRECONDITION    │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ EFFECT          │  → Resolution { "You put the key in the box.", ... }
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tokenizer`] - Convert raw input to lowercase words
//! - [`vocabulary`] - Directions and articles
//! - [`pattern`] - Command patterns with `{slot}` placeholders
//! - [`scope`] - Entity visibility for noun resolution
//! - [`noun_phrase`] - Noun phrase representation and resolution
//! - [`action`] - Action definitions and the action registry
//! - [`parser`] - Main parser pipeline orchestration
//! - [`resolver`] - Capability checks, preconditions, and effects
//! - [`perception`] - Per-character views and command discovery
//! - [`stdlib`] - The standard action set

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod noun_phrase;
pub mod parser;
pub mod pattern;
pub mod perception;
pub mod resolver;
pub mod scope;
pub mod stdlib;
pub mod tokenizer;
pub mod vocabulary;

// Re-export main types for convenience
pub use action::{
    ActionContext, ActionDef, ActionId, ActionRegistry, EffectContext, Refusal, Target, Targets,
};
pub use noun_phrase::{NounPhrase, NounResolver};
pub use parser::{CommandParser, ParseFailure, ParsedCommand};
pub use pattern::Pattern;
pub use perception::{ExitView, Perception, ThingView, describe_surroundings, discover};
pub use resolver::{FailureKind, Resolution, Resolver};
pub use scope::{Scope, SlotScope};
pub use vocabulary::Vocabulary;
