//! Arena identifiers for locations and things.
//!
//! Identifiers are dense indices allocated in declaration order, so
//! comparing two ids of the same kind also compares declaration order.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a location in the world arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationId(pub u32);

/// Identifier of a thing (item, container, or character) in the world arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThingId(pub u32);

impl LocationId {
    /// Returns the arena index for this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl ThingId {
    /// Returns the arena index for this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationId({})", self.0)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({})", self.0)
    }
}

impl fmt::Debug for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThingId({})", self.0)
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thing({})", self.0)
    }
}

/// A reference to any top-level entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntityRef {
    /// A location.
    Location(LocationId),
    /// A thing or character.
    Thing(ThingId),
}

impl From<LocationId> for EntityRef {
    fn from(id: LocationId) -> Self {
        Self::Location(id)
    }
}

impl From<ThingId> for EntityRef {
    fn from(id: ThingId) -> Self {
        Self::Thing(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location(id) => write!(f, "{id}"),
            Self::Thing(id) => write!(f, "{id}"),
        }
    }
}
