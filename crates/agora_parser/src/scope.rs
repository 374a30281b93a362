//! Scope evaluation for noun resolution.
//!
//! Determines which entities a character can refer to: things lying in
//! its location, things it carries, anything inside an exposing container
//! or on a surface among those, and the other characters present.

use agora_foundation::{LocationId, Result, ThingId};
use agora_world::{Owner, World};

/// Which part of the actor's surroundings a slot draws from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SlotScope {
    /// Anything visible, carried or not
    #[default]
    Visible,
    /// Only things the actor carries
    Held,
    /// Only visible entities the actor does not carry
    Nearby,
}

/// The entities visible to one character.
#[derive(Clone, Debug)]
pub struct Scope {
    /// The character's location.
    pub location: LocationId,
    held: Vec<ThingId>,
    around: Vec<ThingId>,
    characters: Vec<ThingId>,
}

impl Scope {
    /// Computes the scope of a character.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not a character.
    pub fn of(world: &World, actor: ThingId) -> Result<Self> {
        let location = world.character(actor)?.location;

        let mut held = Vec::new();
        for id in world.contents_of(Owner::Character(actor)) {
            expose(world, id, &mut held);
        }

        let mut around = Vec::new();
        for id in world.contents_of(Owner::Location(location)) {
            expose(world, id, &mut around);
        }

        let characters = world
            .location(location)?
            .occupants()
            .filter(|&c| c != actor)
            .collect();

        Ok(Self {
            location,
            held,
            around,
            characters,
        })
    }

    /// Things the actor carries, including exposed contents of carried
    /// holders.
    #[must_use]
    pub fn held(&self) -> &[ThingId] {
        &self.held
    }

    /// Things in the location, including exposed nested contents.
    #[must_use]
    pub fn around(&self) -> &[ThingId] {
        &self.around
    }

    /// Other characters present.
    #[must_use]
    pub fn characters(&self) -> &[ThingId] {
        &self.characters
    }

    /// Returns true if the entity is visible.
    #[must_use]
    pub fn contains(&self, id: ThingId) -> bool {
        self.held.contains(&id) || self.around.contains(&id) || self.characters.contains(&id)
    }

    /// Returns the candidates for a slot, in declaration order.
    #[must_use]
    pub fn candidates(&self, scope: SlotScope) -> Vec<ThingId> {
        let mut out: Vec<ThingId> = match scope {
            SlotScope::Held => self.held.clone(),
            SlotScope::Nearby => self
                .around
                .iter()
                .chain(&self.characters)
                .copied()
                .collect(),
            SlotScope::Visible => self
                .held
                .iter()
                .chain(&self.around)
                .chain(&self.characters)
                .copied()
                .collect(),
        };
        out.sort_unstable();
        out
    }
}

fn expose(world: &World, id: ThingId, out: &mut Vec<ThingId>) {
    let Ok(thing) = world.thing(id) else {
        return;
    };
    out.push(id);
    if thing.exposes_contents() {
        for inner in thing.contents() {
            expose(world, inner, out);
        }
    }
}
