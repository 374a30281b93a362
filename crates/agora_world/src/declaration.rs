//! Declarative world descriptions.
//!
//! Declarations name their references (locations, holders) by string so
//! they can be written by hand or loaded from a scenario file. The
//! [`WorldBuilder`](crate::WorldBuilder) resolves those names into ids.

use std::collections::BTreeMap;

use agora_foundation::{Capability, Error, ErrorKind, Result, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::thing::CharacterKind;

/// A location declaration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationDecl {
    /// Unique name.
    pub name: String,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Direction -> destination location name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exits: BTreeMap<String, String>,
}

impl LocationDecl {
    /// Creates a declaration with no exits.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            exits: BTreeMap::new(),
        }
    }

    /// Adds an exit.
    #[must_use]
    pub fn with_exit(mut self, direction: impl Into<String>, to: impl Into<String>) -> Self {
        self.exits.insert(direction.into(), to.into());
        self
    }
}

/// Where a declared thing starts out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement<'a> {
    /// Lying in the named location.
    Location(&'a str),
    /// Inside or on the named container or surface.
    Inside(&'a str),
    /// Carried by the named character.
    HeldBy(&'a str),
}

/// A thing declaration.
///
/// Exactly one of `location`, `inside` and `held_by` must be set.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThingDecl {
    /// Unique name.
    pub name: String,
    /// Extra names the parser accepts.
    pub aliases: Vec<String>,
    /// Free-text description.
    pub description: String,
    /// Declared capabilities.
    pub capabilities: Vec<Capability>,
    /// Initial attribute values.
    pub attributes: BTreeMap<String, Value>,
    /// Name of the location holding the thing.
    pub location: Option<String>,
    /// Name of the container or surface holding the thing.
    pub inside: Option<String>,
    /// Name of the character carrying the thing.
    pub held_by: Option<String>,
}

impl ThingDecl {
    /// Creates a bare declaration with no placement.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Places the thing in a location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Places the thing inside a container or on a surface.
    #[must_use]
    pub fn within(mut self, holder: impl Into<String>) -> Self {
        self.inside = Some(holder.into());
        self
    }

    /// Gives the thing to a character.
    #[must_use]
    pub fn carried_by(mut self, character: impl Into<String>) -> Self {
        self.held_by = Some(character.into());
        self
    }

    /// Returns the declared placement.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless exactly one placement is set.
    pub fn placement(&self) -> Result<Placement<'_>> {
        match (
            self.location.as_deref(),
            self.inside.as_deref(),
            self.held_by.as_deref(),
        ) {
            (Some(loc), None, None) => Ok(Placement::Location(loc)),
            (None, Some(holder), None) => Ok(Placement::Inside(holder)),
            (None, None, Some(ch)) => Ok(Placement::HeldBy(ch)),
            (None, None, None) => Err(Error::config(format!("{} has no placement", self.name))),
            _ => Err(Error::config(format!(
                "{} has more than one placement",
                self.name
            ))),
        }
    }

    /// Checks that every declared capability's required attributes are
    /// present with the right type.
    ///
    /// # Errors
    ///
    /// Returns `MissingAttribute` or `AttributeType` for the first problem.
    pub fn validate(&self) -> Result<()> {
        for capability in &self.capabilities {
            for required in capability.required_attributes() {
                let Some(value) = self.attributes.get(required.name) else {
                    return Err(Error::missing_attribute(
                        self.name.clone(),
                        *capability,
                        required.name,
                    ));
                };
                if value.value_type() != required.ty {
                    return Err(Error::new(ErrorKind::AttributeType {
                        thing: self.name.clone(),
                        attribute: required.name.to_string(),
                        expected: required.ty,
                        actual: value.value_type(),
                    }));
                }
            }
        }
        Ok(())
    }
}

/// A character declaration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CharacterDecl {
    /// Unique name.
    pub name: String,
    /// Extra names the parser accepts.
    pub aliases: Vec<String>,
    /// Free-text description.
    pub description: String,
    /// Starting location name.
    pub location: String,
    /// Source of commands.
    pub kind: CharacterKind,
}

impl CharacterDecl {
    /// Creates an agent-driven character declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the starting location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Marks the character as externally driven.
    #[must_use]
    pub fn external(mut self) -> Self {
        self.kind = CharacterKind::External;
        self
    }
}

/// A whole world, as loaded from a scenario file.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Locations in declaration order.
    #[cfg_attr(feature = "serde", serde(rename = "location"))]
    pub locations: Vec<LocationDecl>,
    /// Characters in turn order.
    #[cfg_attr(feature = "serde", serde(rename = "character"))]
    pub characters: Vec<CharacterDecl>,
    /// Things in declaration order.
    #[cfg_attr(feature = "serde", serde(rename = "thing"))]
    pub things: Vec<ThingDecl>,
}
