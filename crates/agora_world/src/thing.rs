//! Things and characters.
//!
//! A character is a thing that also carries a [`CharacterState`]: a current
//! location, an inventory, and a turn-order position. Characters are
//! present in a location rather than owned by it, so they never appear in
//! any owner's contents.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use agora_foundation::{Capability, LocationId, ThingId, Value};
use im::OrdSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The single holder of an item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Owner {
    /// Lying in a location.
    Location(LocationId),
    /// Carried in a character's inventory.
    Character(ThingId),
    /// Inside (or on top of) a container thing.
    Container(ThingId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location(id) => write!(f, "{id}"),
            Self::Character(id) => write!(f, "inventory of {id}"),
            Self::Container(id) => write!(f, "contents of {id}"),
        }
    }
}

/// Where a character's commands come from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CharacterKind {
    /// Driven by an automated strategy.
    #[default]
    Agent,
    /// Driven from outside the engine, e.g. a human at a terminal.
    External,
}

/// Character-specific state.
#[derive(Clone, Debug)]
pub struct CharacterState {
    /// Current location (back-reference; the location lists the character
    /// among its occupants).
    pub location: LocationId,
    /// Position in the turn order.
    pub turn_order: usize,
    /// Source of commands.
    pub kind: CharacterKind,
    pub(crate) inventory: OrdSet<ThingId>,
}

impl CharacterState {
    /// Returns the carried things in declaration order.
    pub fn inventory(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.inventory.iter().copied()
    }

    /// Returns true if the inventory is empty.
    #[must_use]
    pub fn is_empty_handed(&self) -> bool {
        self.inventory.is_empty()
    }
}

/// An interactive entity other than a location.
#[derive(Clone, Debug)]
pub struct Thing {
    /// Arena id.
    pub id: ThingId,
    /// Unique display name.
    pub name: String,
    /// Extra names the parser accepts.
    pub aliases: Vec<String>,
    /// Free-text description.
    pub description: String,
    pub(crate) capabilities: BTreeSet<Capability>,
    pub(crate) attributes: BTreeMap<String, Value>,
    /// `None` for characters and for things removed from play.
    pub(crate) owner: Option<Owner>,
    /// Things inside or on this one (containers and surfaces only).
    pub(crate) contents: OrdSet<ThingId>,
    pub(crate) character: Option<CharacterState>,
}

impl Thing {
    /// Returns true if the thing declares the capability.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Returns the declared capabilities.
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns all attributes, sorted by name.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Returns a boolean attribute, treating a missing or non-boolean value
    /// as false.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.attribute(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns the current owner.
    #[must_use]
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    /// Returns the things inside or on this one.
    pub fn contents(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.contents.iter().copied()
    }

    /// Returns character state, if this thing is a character.
    #[must_use]
    pub fn character(&self) -> Option<&CharacterState> {
        self.character.as_ref()
    }

    /// Returns true if this thing is a character.
    #[must_use]
    pub fn is_character(&self) -> bool {
        self.character.is_some()
    }

    /// Returns true if the thing can hold other things.
    #[must_use]
    pub fn holds_things(&self) -> bool {
        self.capabilities.iter().any(|c| c.holds_things())
    }

    /// Returns true if a holder's contents can be seen from outside.
    ///
    /// Surfaces always expose their contents. Containers do unless they are
    /// openable and currently shut.
    #[must_use]
    pub fn exposes_contents(&self) -> bool {
        if self.has(Capability::Surface) {
            return true;
        }
        self.has(Capability::Container)
            && (!self.has(Capability::Openable) || self.flag(agora_foundation::capability::IS_OPEN))
    }

    /// Returns true if `word` names this thing exactly (name or alias),
    /// ignoring case.
    #[must_use]
    pub fn is_named(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(word))
    }
}
