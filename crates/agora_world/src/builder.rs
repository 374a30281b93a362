//! Validated world construction.
//!
//! The builder resolves the names used in declarations into ids and
//! reports configuration errors with the declaration that caused them.
//! Things may be declared in any order; a thing placed inside another is
//! added once its holder exists.

use agora_foundation::{Error, ErrorKind, LocationId, Result, ThingId};

use crate::declaration::{CharacterDecl, LocationDecl, Placement, ThingDecl, WorldConfig};
use crate::thing::Owner;
use crate::world::World;

/// Builds a [`World`] from declarations.
#[derive(Debug, Default)]
pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a world from a complete configuration.
    ///
    /// Locations come first, then exits, then characters, then things.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error, with the offending
    /// declaration recorded in the error context.
    pub fn from_config(config: &WorldConfig) -> Result<World> {
        let mut builder = Self::new();
        for decl in &config.locations {
            builder
                .world
                .add_location(&decl.name, &decl.description)
                .map_err(|e| in_frame(e, "location", &decl.name))?;
        }
        for decl in &config.locations {
            builder
                .exits(decl)
                .map_err(|e| in_frame(e, "location", &decl.name))?;
        }
        for decl in &config.characters {
            builder
                .character(decl)
                .map_err(|e| in_frame(e, "character", &decl.name))?;
        }
        builder.things(&config.things)?;
        builder.build()
    }

    /// Adds a location without exits.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateIdentity` if the name is taken.
    pub fn location(&mut self, name: &str, description: &str) -> Result<LocationId> {
        self.world.add_location(name, description)
    }

    /// Adds a one-way exit between two named locations.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLocation` if either name does not resolve.
    pub fn exit(&mut self, from: &str, direction: &str, to: &str) -> Result<()> {
        let from = self.location_id(from)?;
        let to = self.location_id(to)?;
        self.world.add_exit(from, direction, to)
    }

    /// Adds a character at its declared location.
    ///
    /// # Errors
    ///
    /// Returns an error if the location is unknown or the name is taken.
    pub fn character(&mut self, decl: &CharacterDecl) -> Result<ThingId> {
        let location = self.location_id(&decl.location)?;
        self.world.add_character(decl, location)
    }

    /// Adds a thing whose holder already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration is invalid or its holder does
    /// not resolve.
    pub fn thing(&mut self, decl: &ThingDecl) -> Result<ThingId> {
        let owner = self.resolve_owner(decl.placement()?)?;
        self.world.add_thing(decl, owner)
    }

    /// Finishes construction, verifying ownership.
    ///
    /// # Errors
    ///
    /// Returns an error if the ownership invariant does not hold.
    pub fn build(self) -> Result<World> {
        self.world.check_ownership()?;
        Ok(self.world)
    }

    fn exits(&mut self, decl: &LocationDecl) -> Result<()> {
        for (direction, to) in &decl.exits {
            self.exit(&decl.name, direction, to)?;
        }
        Ok(())
    }

    /// Adds things in dependency order: each pass places every thing whose
    /// holder is already present.
    fn things(&mut self, decls: &[ThingDecl]) -> Result<()> {
        let mut pending: Vec<&ThingDecl> = decls.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for decl in pending {
                let placement = decl
                    .placement()
                    .map_err(|e| in_frame(e, "thing", &decl.name))?;
                if let Placement::Inside(holder) = placement {
                    if self.world.thing_named(holder).is_none()
                        && decls.iter().any(|d| d.name.eq_ignore_ascii_case(holder))
                    {
                        deferred.push(decl);
                        continue;
                    }
                }
                self.thing(decl)
                    .map_err(|e| in_frame(e, "thing", &decl.name))?;
            }
            if deferred.len() == before {
                let stuck = deferred[0];
                return Err(in_frame(
                    Error::new(ErrorKind::OwnershipCycle(stuck.name.clone())),
                    "thing",
                    &stuck.name,
                ));
            }
            pending = deferred;
        }
        Ok(())
    }

    fn resolve_owner(&self, placement: Placement<'_>) -> Result<Owner> {
        match placement {
            Placement::Location(name) => self.location_id(name).map(Owner::Location),
            Placement::Inside(name) => self
                .world
                .thing_named(name)
                .map(Owner::Container)
                .ok_or_else(|| Error::new(ErrorKind::UnknownThing(name.to_string()))),
            Placement::HeldBy(name) => self
                .world
                .thing_named(name)
                .filter(|id| self.world.character(*id).is_ok())
                .map(Owner::Character)
                .ok_or_else(|| Error::new(ErrorKind::UnknownThing(name.to_string()))),
        }
    }

    fn location_id(&self, name: &str) -> Result<LocationId> {
        self.world
            .location_named(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownLocation(name.to_string())))
    }
}

fn in_frame(err: Error, kind: &str, name: &str) -> Error {
    let context = err
        .context
        .clone()
        .unwrap_or_default()
        .with_frame(format!("{kind} {name}"));
    err.with_context(context)
}
