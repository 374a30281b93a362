//! Locations, things, characters, and world state for Agora.
//!
//! This crate provides:
//! - [`Location`] - A node in the directed location graph
//! - [`Thing`] - Items, containers, and characters with capability tags
//! - [`World`] - Arena-backed world state with O(1) snapshots
//! - [`WorldBuilder`] - Validated world construction from declarations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod declaration;
pub mod location;
pub mod thing;
pub mod world;

pub use builder::WorldBuilder;
pub use declaration::{CharacterDecl, LocationDecl, Placement, ThingDecl, WorldConfig};
pub use location::{Exit, Location};
pub use thing::{CharacterKind, CharacterState, Owner, Thing};
pub use world::World;
