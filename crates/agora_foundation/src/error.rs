//! Error types for the Agora system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Configuration errors are raised only while a world or action registry is
//! being built; once the simulation runs, command failures travel as event
//! outcomes instead of errors.

use std::fmt;

use thiserror::Error;

use crate::capability::Capability;
use crate::entity::{EntityRef, ThingId};
use crate::value::ValueType;

/// Result alias for Agora operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Agora operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a duplicate identity error.
    #[must_use]
    pub fn duplicate_identity(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateIdentity(name.into()))
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: impl Into<EntityRef>) -> Self {
        Self::new(ErrorKind::EntityNotFound(id.into()))
    }

    /// Creates a missing attribute error.
    #[must_use]
    pub fn missing_attribute(
        thing: impl Into<String>,
        capability: Capability,
        attribute: &'static str,
    ) -> Self {
        Self::new(ErrorKind::MissingAttribute {
            thing: thing.into(),
            capability,
            attribute,
        })
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates a configuration file error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Returns true if this error describes a bad world or registry
    /// configuration, which is only ever fatal at build time.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::DuplicateIdentity(_)
                | ErrorKind::UnknownLocation(_)
                | ErrorKind::UnknownThing(_)
                | ErrorKind::UnknownCapability(_)
                | ErrorKind::MissingAttribute { .. }
                | ErrorKind::AttributeType { .. }
                | ErrorKind::InvalidOwner { .. }
                | ErrorKind::OwnershipCycle(_)
                | ErrorKind::DuplicateAction(_)
                | ErrorKind::InvalidPattern { .. }
                | ErrorKind::Config(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Two top-level entities share the same identity.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(String),

    /// A location name did not resolve.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// A thing or character name did not resolve.
    #[error("unknown thing: {0}")]
    UnknownThing(String),

    /// A capability tag did not parse.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// A thing declares a capability without the attribute it requires.
    #[error("{thing} is {capability} but has no `{attribute}` attribute")]
    MissingAttribute {
        /// The thing being constructed.
        thing: String,
        /// The declared capability.
        capability: Capability,
        /// The missing attribute name.
        attribute: &'static str,
    },

    /// A required attribute has the wrong type.
    #[error("attribute `{attribute}` on {thing}: expected {expected}, got {actual}")]
    AttributeType {
        /// The thing being constructed.
        thing: String,
        /// The attribute name.
        attribute: String,
        /// The expected type.
        expected: ValueType,
        /// The actual type.
        actual: ValueType,
    },

    /// An attribute was written that the thing never declared.
    #[error("{thing} has no `{attribute}` attribute")]
    UnknownAttribute {
        /// The thing being modified.
        thing: String,
        /// The attribute name.
        attribute: String,
    },

    /// A thing was placed in an owner that cannot hold it.
    #[error("{thing} cannot be placed in {owner}")]
    InvalidOwner {
        /// The thing being placed.
        thing: String,
        /// The rejected owner.
        owner: String,
    },

    /// A thing would end up inside itself.
    #[error("ownership cycle through {0}")]
    OwnershipCycle(String),

    /// Two actions were registered under one name.
    #[error("duplicate action: {0}")]
    DuplicateAction(String),

    /// A command pattern template is malformed.
    #[error("invalid pattern `{pattern}` for action {action}: {message}")]
    InvalidPattern {
        /// The action declaring the pattern.
        action: String,
        /// The pattern source.
        pattern: String,
        /// What is wrong with it.
        message: String,
    },

    /// An id does not refer to a live entity.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityRef),

    /// A thing was used where a character is required.
    #[error("not a character: {0:?}")]
    NotACharacter(ThingId),

    /// File or terminal I/O failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// A configuration file could not be read or decoded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or declaration name.
    pub source: Option<String>,
    /// Chain of declarations being processed.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
