//! Core identifiers, values, capabilities, and errors for Agora.
//!
//! This crate provides:
//! - [`LocationId`] / [`ThingId`] - Dense arena identifiers
//! - [`EntityRef`] - A reference to either kind of entity
//! - [`Value`] - Per-capability attribute values
//! - [`Capability`] - Behavioral tags that gate generic actions
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod capability;
pub mod entity;
pub mod error;
pub mod value;

pub use capability::{AttributeSpec, Capability};
pub use entity::{EntityRef, LocationId, ThingId};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use value::{Value, ValueType};
