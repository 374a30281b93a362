//! Locations and exits.

use agora_foundation::{LocationId, ThingId};
use im::OrdSet;

/// A one-way exit from a location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exit {
    /// Direction word as declared (e.g. "north", "n" or "portal").
    pub direction: String,
    /// Destination location.
    pub to: LocationId,
}

/// A node in the location graph.
///
/// Exits are directed; a door may lead north from the hall without a
/// matching south exit in the next room.
#[derive(Clone, Debug)]
pub struct Location {
    /// Arena id.
    pub id: LocationId,
    /// Unique display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Exits in insertion order.
    pub(crate) exits: Vec<Exit>,
    /// Things owned directly by this location.
    pub(crate) contents: OrdSet<ThingId>,
    /// Characters currently present.
    pub(crate) occupants: OrdSet<ThingId>,
}

impl Location {
    pub(crate) fn new(id: LocationId, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
            exits: Vec::new(),
            contents: OrdSet::new(),
            occupants: OrdSet::new(),
        }
    }

    /// Returns the exits in insertion order.
    #[must_use]
    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    /// Returns the destination for a direction, if an exit exists.
    #[must_use]
    pub fn exit(&self, direction: &str) -> Option<LocationId> {
        self.exits
            .iter()
            .find(|e| e.direction.eq_ignore_ascii_case(direction))
            .map(|e| e.to)
    }

    /// Returns the things lying here, in declaration order.
    pub fn contents(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.contents.iter().copied()
    }

    /// Returns the characters present, in declaration order.
    pub fn occupants(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.occupants.iter().copied()
    }

    /// Adds or replaces an exit.
    pub(crate) fn set_exit(&mut self, direction: String, to: LocationId) {
        if let Some(existing) = self
            .exits
            .iter_mut()
            .find(|e| e.direction.eq_ignore_ascii_case(&direction))
        {
            existing.to = to;
        } else {
            self.exits.push(Exit { direction, to });
        }
    }
}
