//! World state management with cheap snapshots.
//!
//! The `World` is the unified interface to locations, things, and
//! characters. It stores them in arenas built on persistent data structures,
//! so `clone()` is O(1) and shares structure with the original. The
//! scheduler publishes snapshots this way, and action effects run against a
//! scratch clone that replaces the original only when the effect succeeds.
//!
//! Every operation that moves a thing removes it from its previous owner in
//! the same call, so no thing is ever held by two owners.

use agora_foundation::{
    Capability, EntityRef, Error, ErrorKind, LocationId, Result, ThingId, Value,
};
use im::{HashMap, OrdSet, Vector};

use crate::declaration::{CharacterDecl, ThingDecl};
use crate::location::Location;
use crate::thing::{CharacterState, Owner, Thing};

/// Arena-backed simulation state.
///
/// Clone is O(1) due to structural sharing.
#[derive(Clone, Debug, Default)]
pub struct World {
    locations: Vector<Location>,
    things: Vector<Thing>,
    /// Lowercased identity -> entity. Covers locations and things alike.
    names: HashMap<String, EntityRef>,
    /// Characters in turn order.
    roster: Vector<ThingId>,
}

impl World {
    /// Creates a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Adds a location.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateIdentity` if any entity already uses the name.
    pub fn add_location(&mut self, name: &str, description: &str) -> Result<LocationId> {
        let id = LocationId(next_index(self.locations.len())?);
        self.claim_name(name, EntityRef::Location(id))?;
        self.locations
            .push_back(Location::new(id, name.to_string(), description.to_string()));
        Ok(id)
    }

    /// Adds (or replaces) a one-way exit.
    ///
    /// # Errors
    ///
    /// Returns an error if either location does not exist, or a
    /// configuration error if `direction` is not a single plain word.
    pub fn add_exit(&mut self, from: LocationId, direction: &str, to: LocationId) -> Result<()> {
        self.location(to)?;
        if direction.is_empty()
            || !direction
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::config(format!(
                "exit {direction:?} from {} must be a single word",
                self.location(from)?.name
            )));
        }
        let loc = self
            .locations
            .get_mut(from.index())
            .ok_or_else(|| Error::entity_not_found(from))?;
        loc.set_exit(direction.to_lowercase(), to);
        Ok(())
    }

    /// Adds a thing under the given owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration is invalid (missing or mistyped
    /// capability attributes), the name is taken, or the owner cannot hold
    /// things.
    pub fn add_thing(&mut self, decl: &ThingDecl, owner: Owner) -> Result<ThingId> {
        decl.validate()?;
        self.check_owner(&decl.name, owner, None)?;

        let id = ThingId(next_index(self.things.len())?);
        self.claim_name(&decl.name, EntityRef::Thing(id))?;
        self.things.push_back(Thing {
            id,
            name: decl.name.clone(),
            aliases: decl.aliases.clone(),
            description: decl.description.clone(),
            capabilities: decl.capabilities.iter().copied().collect(),
            attributes: decl.attributes.clone(),
            owner: None,
            contents: OrdSet::new(),
            character: None,
        });
        self.attach(id, owner)?;
        Ok(id)
    }

    /// Adds a character at a location, appending it to the turn order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the location does not exist.
    pub fn add_character(&mut self, decl: &CharacterDecl, location: LocationId) -> Result<ThingId> {
        self.location(location)?;
        let id = ThingId(next_index(self.things.len())?);
        self.claim_name(&decl.name, EntityRef::Thing(id))?;
        self.things.push_back(Thing {
            id,
            name: decl.name.clone(),
            aliases: decl.aliases.clone(),
            description: decl.description.clone(),
            capabilities: std::collections::BTreeSet::new(),
            attributes: std::collections::BTreeMap::new(),
            owner: None,
            contents: OrdSet::new(),
            character: Some(CharacterState {
                location,
                turn_order: self.roster.len(),
                kind: decl.kind,
                inventory: OrdSet::new(),
            }),
        });
        self.roster.push_back(id);
        if let Some(loc) = self.locations.get_mut(location.index()) {
            loc.occupants.insert(id);
        }
        Ok(id)
    }

    fn claim_name(&mut self, name: &str, entity: EntityRef) -> Result<()> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Err(Error::config("entity names must not be empty"));
        }
        if self.names.contains_key(&key) {
            return Err(Error::duplicate_identity(name));
        }
        self.names.insert(key, entity);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Looks up an entity by its unique name, ignoring case.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<EntityRef> {
        self.names.get(&name.trim().to_lowercase()).copied()
    }

    /// Looks up a location by name.
    #[must_use]
    pub fn location_named(&self, name: &str) -> Option<LocationId> {
        match self.lookup(name)? {
            EntityRef::Location(id) => Some(id),
            EntityRef::Thing(_) => None,
        }
    }

    /// Looks up a thing or character by name.
    #[must_use]
    pub fn thing_named(&self, name: &str) -> Option<ThingId> {
        match self.lookup(name)? {
            EntityRef::Thing(id) => Some(id),
            EntityRef::Location(_) => None,
        }
    }

    /// Returns a location.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` for an unknown id.
    pub fn location(&self, id: LocationId) -> Result<&Location> {
        self.locations
            .get(id.index())
            .ok_or_else(|| Error::entity_not_found(id))
    }

    /// Returns a thing (including characters and removed things).
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` for an unknown id.
    pub fn thing(&self, id: ThingId) -> Result<&Thing> {
        self.things
            .get(id.index())
            .ok_or_else(|| Error::entity_not_found(id))
    }

    /// Returns a character's state.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or not a character.
    pub fn character(&self, id: ThingId) -> Result<&CharacterState> {
        self.thing(id)?
            .character
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NotACharacter(id)))
    }

    /// Returns the display name of a thing, or a placeholder for unknown ids.
    #[must_use]
    pub fn name_of(&self, id: ThingId) -> &str {
        self.things.get(id.index()).map_or("something", |t| &t.name)
    }

    /// Returns all locations in declaration order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// Returns all things still in play (characters included), in
    /// declaration order.
    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        self.things.iter().filter(|t| t.owner.is_some() || t.is_character())
    }

    /// Returns the characters in turn order.
    pub fn characters(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.roster.iter().copied()
    }

    /// Returns the number of locations.
    #[must_use]
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Returns true if the thing is still in play.
    #[must_use]
    pub fn is_live(&self, id: ThingId) -> bool {
        self.things
            .get(id.index())
            .is_some_and(|t| t.owner.is_some() || t.is_character())
    }

    /// Returns the current owner of a thing.
    #[must_use]
    pub fn owner_of(&self, id: ThingId) -> Option<Owner> {
        self.things.get(id.index()).and_then(|t| t.owner)
    }

    /// Returns the things held directly by an owner, in declaration order.
    #[must_use]
    pub fn contents_of(&self, owner: Owner) -> Vec<ThingId> {
        match self.holder_set(owner) {
            Some(set) => set.iter().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Returns the location a thing is ultimately in, following the owner
    /// chain. Characters report their current location.
    #[must_use]
    pub fn location_of(&self, id: ThingId) -> Option<LocationId> {
        let mut current = id;
        // Bounded by the arena size; a longer walk would mean a cycle.
        for _ in 0..=self.things.len() {
            let thing = self.things.get(current.index())?;
            if let Some(ch) = &thing.character {
                return Some(ch.location);
            }
            match thing.owner? {
                Owner::Location(loc) => return Some(loc),
                Owner::Character(c) | Owner::Container(c) => current = c,
            }
        }
        None
    }

    /// Returns true if `id` is `ancestor` or sits somewhere inside it.
    #[must_use]
    pub fn is_within(&self, id: ThingId, ancestor: ThingId) -> bool {
        let mut current = id;
        for _ in 0..=self.things.len() {
            if current == ancestor {
                return true;
            }
            match self.owner_of(current) {
                Some(Owner::Container(c) | Owner::Character(c)) => current = c,
                _ => return false,
            }
        }
        false
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Moves a thing to a new owner, detaching it from the old one.
    ///
    /// # Errors
    ///
    /// Returns an error if the thing is a character or out of play, or the
    /// new owner cannot hold it.
    pub fn move_thing(&mut self, id: ThingId, to: Owner) -> Result<()> {
        let thing = self.thing(id)?;
        if thing.is_character() {
            return Err(Error::new(ErrorKind::InvalidOwner {
                thing: thing.name.clone(),
                owner: to.to_string(),
            }));
        }
        if thing.owner.is_none() {
            return Err(Error::entity_not_found(id));
        }
        let name = thing.name.clone();
        self.check_owner(&name, to, Some(id))?;
        self.detach(id);
        self.attach(id, to)
    }

    /// Removes a thing from play (e.g. after it is eaten). Anything it held
    /// passes to its former owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the thing is a character or already out of play.
    pub fn remove_thing(&mut self, id: ThingId) -> Result<()> {
        let thing = self.thing(id)?;
        let Some(former) = thing.owner else {
            return Err(Error::entity_not_found(id));
        };
        let spilled: Vec<ThingId> = thing.contents.iter().copied().collect();
        self.detach(id);
        for inner in spilled {
            self.detach(inner);
            self.attach(inner, former)?;
        }
        Ok(())
    }

    /// Moves a character to another location.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not a character or the location does
    /// not exist.
    pub fn move_character(&mut self, id: ThingId, to: LocationId) -> Result<()> {
        self.location(to)?;
        let from = self.character(id)?.location;
        if let Some(loc) = self.locations.get_mut(from.index()) {
            loc.occupants.remove(&id);
        }
        if let Some(loc) = self.locations.get_mut(to.index()) {
            loc.occupants.insert(id);
        }
        if let Some(ch) = self
            .things
            .get_mut(id.index())
            .and_then(|t| t.character.as_mut())
        {
            ch.location = to;
        }
        Ok(())
    }

    /// Overwrites an existing attribute.
    ///
    /// Attributes are fixed at construction; this only changes values and
    /// refuses to change an attribute's type.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute does not exist or the type differs.
    pub fn set_attribute(&mut self, id: ThingId, name: &str, value: Value) -> Result<()> {
        let thing = self
            .things
            .get_mut(id.index())
            .ok_or_else(|| Error::entity_not_found(id))?;
        let Some(slot) = thing.attributes.get_mut(name) else {
            return Err(Error::new(ErrorKind::UnknownAttribute {
                thing: thing.name.clone(),
                attribute: name.to_string(),
            }));
        };
        if slot.value_type() != value.value_type() {
            return Err(Error::new(ErrorKind::AttributeType {
                thing: thing.name.clone(),
                attribute: name.to_string(),
                expected: slot.value_type(),
                actual: value.value_type(),
            }));
        }
        *slot = value;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------------

    /// Verifies that every thing in play is held by exactly one owner, and
    /// that every character is listed by exactly its own location.
    ///
    /// # Errors
    ///
    /// Returns an `Internal` error describing the first violation found.
    pub fn check_ownership(&self) -> Result<()> {
        for thing in &self.things {
            let holders = self.holders_listing(thing.id);
            match (thing.owner, holders.as_slice()) {
                (Some(owner), [only]) if *only == owner => {}
                (None, []) => {}
                (owner, listed) => {
                    return Err(Error::new(ErrorKind::Internal(format!(
                        "{} has owner {owner:?} but is listed by {listed:?}",
                        thing.name
                    ))));
                }
            }
            if let Some(ch) = &thing.character {
                let present: Vec<_> = self
                    .locations
                    .iter()
                    .filter(|l| l.occupants.contains(&thing.id))
                    .map(|l| l.id)
                    .collect();
                if present != [ch.location] {
                    return Err(Error::new(ErrorKind::Internal(format!(
                        "{} is at {:?} but present in {present:?}",
                        thing.name, ch.location
                    ))));
                }
            }
        }
        Ok(())
    }

    fn holders_listing(&self, id: ThingId) -> Vec<Owner> {
        let mut found = Vec::new();
        for loc in &self.locations {
            if loc.contents.contains(&id) {
                found.push(Owner::Location(loc.id));
            }
        }
        for t in &self.things {
            if t.contents.contains(&id) {
                found.push(Owner::Container(t.id));
            }
            if t.character.as_ref().is_some_and(|c| c.inventory.contains(&id)) {
                found.push(Owner::Character(t.id));
            }
        }
        found
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn check_owner(&self, name: &str, owner: Owner, moving: Option<ThingId>) -> Result<()> {
        let invalid = || {
            Error::new(ErrorKind::InvalidOwner {
                thing: name.to_string(),
                owner: owner.to_string(),
            })
        };
        match owner {
            Owner::Location(loc) => {
                self.location(loc)?;
            }
            Owner::Character(c) => {
                self.character(c).map_err(|_| invalid())?;
            }
            Owner::Container(c) => {
                let holder = self.thing(c)?;
                if !holder.holds_things() || holder.owner.is_none() {
                    return Err(invalid());
                }
                if let Some(id) = moving {
                    if self.is_within(c, id) {
                        return Err(Error::new(ErrorKind::OwnershipCycle(name.to_string())));
                    }
                }
            }
        }
        Ok(())
    }

    fn holder_set(&self, owner: Owner) -> Option<&OrdSet<ThingId>> {
        match owner {
            Owner::Location(loc) => self.locations.get(loc.index()).map(|l| &l.contents),
            Owner::Character(c) => self
                .things
                .get(c.index())
                .and_then(|t| t.character.as_ref())
                .map(|ch| &ch.inventory),
            Owner::Container(c) => self.things.get(c.index()).map(|t| &t.contents),
        }
    }

    fn holder_set_mut(&mut self, owner: Owner) -> Option<&mut OrdSet<ThingId>> {
        match owner {
            Owner::Location(loc) => self.locations.get_mut(loc.index()).map(|l| &mut l.contents),
            Owner::Character(c) => self
                .things
                .get_mut(c.index())
                .and_then(|t| t.character.as_mut())
                .map(|ch| &mut ch.inventory),
            Owner::Container(c) => self.things.get_mut(c.index()).map(|t| &mut t.contents),
        }
    }

    fn detach(&mut self, id: ThingId) {
        let Some(old) = self.owner_of(id) else {
            return;
        };
        if let Some(set) = self.holder_set_mut(old) {
            set.remove(&id);
        }
        if let Some(thing) = self.things.get_mut(id.index()) {
            thing.owner = None;
        }
    }

    fn attach(&mut self, id: ThingId, to: Owner) -> Result<()> {
        let set = self
            .holder_set_mut(to)
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no holder for {to}"))))?;
        set.insert(id);
        if let Some(thing) = self.things.get_mut(id.index()) {
            thing.owner = Some(to);
        }
        Ok(())
    }
}

fn next_index(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::new(ErrorKind::Internal("arena full".to_string())))
}

/// Capability check shared by generic actions.
impl World {
    /// Returns true if the thing exists and declares the capability.
    #[must_use]
    pub fn has_capability(&self, id: ThingId, capability: Capability) -> bool {
        self.things
            .get(id.index())
            .is_some_and(|t| t.has(capability))
    }
}
