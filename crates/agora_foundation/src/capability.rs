//! Capability tags.
//!
//! A capability is a declared behavioral category that gates which generic
//! actions apply to a thing. Each capability names the attributes its
//! generic actions read and write; a thing declaring the capability must
//! carry those attributes from construction onward.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};
use crate::value::ValueType;

/// Attribute name: whether an openable thing is open.
pub const IS_OPEN: &str = "is_open";
/// Attribute name: whether a lockable thing is locked.
pub const IS_LOCKED: &str = "is_locked";
/// Attribute name: name of the thing that operates a lock.
pub const KEY: &str = "key";
/// Attribute name: whether an activatable thing is switched on.
pub const IS_ACTIVE: &str = "is_active";

/// A behavioral tag on a thing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Capability {
    /// Can be picked up, dropped, given, and placed.
    Gettable,
    /// Can be opened and closed.
    Openable,
    /// Can be locked and unlocked with a key.
    Lockable,
    /// Holds other things inside; contents visible while open.
    Container,
    /// Holds other things on top; contents always visible.
    Surface,
    /// Can be eaten or drunk, destroying it.
    Consumable,
    /// Can be switched on and off.
    Activatable,
}

/// A required attribute for a capability.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute name.
    pub name: &'static str,
    /// Expected value type.
    pub ty: ValueType,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Capability; 7] = [
        Self::Gettable,
        Self::Openable,
        Self::Lockable,
        Self::Container,
        Self::Surface,
        Self::Consumable,
        Self::Activatable,
    ];

    /// Returns the attributes a thing must carry to declare this capability.
    #[must_use]
    pub const fn required_attributes(self) -> &'static [AttributeSpec] {
        match self {
            Self::Openable => &[AttributeSpec {
                name: IS_OPEN,
                ty: ValueType::Bool,
            }],
            Self::Lockable => &[
                AttributeSpec {
                    name: IS_LOCKED,
                    ty: ValueType::Bool,
                },
                AttributeSpec {
                    name: KEY,
                    ty: ValueType::Text,
                },
            ],
            Self::Activatable => &[AttributeSpec {
                name: IS_ACTIVE,
                ty: ValueType::Bool,
            }],
            Self::Gettable | Self::Container | Self::Surface | Self::Consumable => &[],
        }
    }

    /// Returns true if things with this capability can hold other things.
    #[must_use]
    pub const fn holds_things(self) -> bool {
        matches!(self, Self::Container | Self::Surface)
    }

    /// Returns the lowercase tag name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gettable => "gettable",
            Self::Openable => "openable",
            Self::Lockable => "lockable",
            Self::Container => "container",
            Self::Surface => "surface",
            Self::Consumable => "consumable",
            Self::Activatable => "activatable",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| Error::new(ErrorKind::UnknownCapability(s.to_string())))
    }
}
