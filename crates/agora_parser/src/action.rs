//! Action registry.
//!
//! An action is a name, one or more surface patterns, per-slot rules, a
//! precondition, and an effect. Actions are registered once at startup and
//! never change afterwards. Nothing ties an action to a kind of object: a
//! slot rule names the capability a target needs, so any thing carrying
//! that capability supports the action.

use std::collections::BTreeSet;
use std::fmt;

use agora_foundation::{Capability, Error, ErrorKind, LocationId, Result, ThingId};
use agora_world::{Owner, Thing, World};

use crate::pattern::{Pattern, SlotKind};
use crate::scope::SlotScope;

/// A precondition failure, phrased for the actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Refusal(pub String);

impl Refusal {
    /// Creates a refusal.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks whether an action may run.
pub type Precondition = fn(&ActionContext<'_>) -> std::result::Result<(), Refusal>;

/// Applies an action, returning its description.
pub type Effect = fn(&mut EffectContext<'_>) -> Result<String>;

/// A resolved slot value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// An entity
    Thing(ThingId),
    /// A canonical direction name
    Direction(String),
}

/// Slot name -> resolved target, in pattern order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Targets(Vec<(String, Target)>);

impl Targets {
    /// Creates empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a slot.
    pub fn bind(&mut self, slot: impl Into<String>, target: Target) {
        self.0.push((slot.into(), target));
    }

    /// Gets the target bound to a slot.
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<&Target> {
        self.0.iter().find(|(s, _)| s == slot).map(|(_, t)| t)
    }

    /// Gets the entity bound to a slot.
    #[must_use]
    pub fn thing(&self, slot: &str) -> Option<ThingId> {
        match self.get(slot)? {
            Target::Thing(id) => Some(*id),
            Target::Direction(_) => None,
        }
    }

    /// Gets the bound direction, if any.
    #[must_use]
    pub fn direction(&self) -> Option<&str> {
        self.0.iter().find_map(|(_, t)| match t {
            Target::Direction(d) => Some(d.as_str()),
            Target::Thing(_) => None,
        })
    }

    /// Iterates over bindings in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Target)> {
        self.0.iter().map(|(s, t)| (s.as_str(), t))
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only view handed to preconditions.
#[derive(Clone, Copy, Debug)]
pub struct ActionContext<'a> {
    /// Current world state
    pub world: &'a World,
    /// The acting character
    pub actor: ThingId,
    /// Resolved slots
    pub targets: &'a Targets,
}

impl<'a> ActionContext<'a> {
    /// Gets the thing bound to a slot.
    #[must_use]
    pub fn thing(&self, slot: &str) -> Option<&'a Thing> {
        self.targets.thing(slot).and_then(|id| self.world.thing(id).ok())
    }

    /// Gets the thing bound to a slot, or refuses.
    ///
    /// # Errors
    ///
    /// Refuses when the slot is unbound.
    pub fn require(&self, slot: &str) -> std::result::Result<&'a Thing, Refusal> {
        self.thing(slot)
            .ok_or_else(|| Refusal::new(format!("What do you want to use as {slot}?")))
    }

    /// Returns the actor's location.
    #[must_use]
    pub fn location(&self) -> Option<LocationId> {
        self.world.character(self.actor).ok().map(|c| c.location)
    }

    /// Returns true if the actor carries the thing, directly or inside
    /// something carried.
    #[must_use]
    pub fn carries(&self, id: ThingId) -> bool {
        id != self.actor && self.world.is_within(id, self.actor)
    }

    /// Returns true if the actor carries the thing directly.
    #[must_use]
    pub fn holds(&self, id: ThingId) -> bool {
        self.world.owner_of(id) == Some(Owner::Character(self.actor))
    }
}

/// Mutable view handed to effects. Effects run against a scratch copy of
/// the world that replaces the original only if the effect succeeds.
#[derive(Debug)]
pub struct EffectContext<'a> {
    /// World state to mutate
    pub world: &'a mut World,
    /// The acting character
    pub actor: ThingId,
    /// Resolved slots
    pub targets: &'a Targets,
}

impl EffectContext<'_> {
    /// Gets the thing bound to a slot.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the slot is unbound.
    pub fn target(&self, slot: &str) -> Result<ThingId> {
        self.targets
            .thing(slot)
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("slot {slot} is unbound"))))
    }

    /// Returns the display name of a thing.
    #[must_use]
    pub fn name(&self, id: ThingId) -> String {
        self.world.name_of(id).to_string()
    }

    /// Returns the actor's location.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a character.
    pub fn location(&self) -> Result<LocationId> {
        Ok(self.world.character(self.actor)?.location)
    }
}

/// Per-slot resolution rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRule {
    /// Slot name
    pub name: String,
    /// Where candidates come from
    pub scope: SlotScope,
    /// Capability a resolved target must declare
    pub capability: Option<Capability>,
}

fn always(_: &ActionContext<'_>) -> std::result::Result<(), Refusal> {
    Ok(())
}

/// An action definition.
#[derive(Clone, Debug)]
pub struct ActionDef {
    /// Action name
    pub name: String,
    /// Surface pattern sources, first one canonical
    pub patterns: Vec<String>,
    /// Slot rules
    pub slots: Vec<SlotRule>,
    /// Whether a resolved attempt ends the actor's turn
    pub ends_turn: bool,
    /// Whether the effect can change the world
    pub mutates: bool,
    /// Checked before the effect
    pub precondition: Precondition,
    /// Applies the action
    pub effect: Effect,
}

impl ActionDef {
    /// Creates an action that ends the turn and may mutate the world.
    #[must_use]
    pub fn new(name: impl Into<String>, effect: Effect) -> Self {
        Self {
            name: name.into(),
            patterns: Vec::new(),
            slots: Vec::new(),
            ends_turn: true,
            mutates: true,
            precondition: always,
            effect,
        }
    }

    /// Adds a surface pattern.
    #[must_use]
    pub fn pattern(mut self, source: impl Into<String>) -> Self {
        self.patterns.push(source.into());
        self
    }

    /// Sets the precondition.
    #[must_use]
    pub fn precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }

    /// Sets where a slot draws its candidates from.
    #[must_use]
    pub fn scope(mut self, slot: &str, scope: SlotScope) -> Self {
        self.rule_mut(slot).scope = scope;
        self
    }

    /// Requires a capability on a slot's target.
    #[must_use]
    pub fn requires(mut self, slot: &str, capability: Capability) -> Self {
        self.rule_mut(slot).capability = Some(capability);
        self
    }

    /// Marks the action as not ending the turn.
    #[must_use]
    pub fn keeps_turn(mut self) -> Self {
        self.ends_turn = false;
        self
    }

    /// Marks the action as never changing the world.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.mutates = false;
        self
    }

    /// Returns the rule for a slot (default rule if undeclared).
    #[must_use]
    pub fn rule(&self, slot: &str) -> SlotRule {
        self.slots
            .iter()
            .find(|r| r.name == slot)
            .cloned()
            .unwrap_or_else(|| SlotRule {
                name: slot.to_string(),
                scope: SlotScope::Visible,
                capability: None,
            })
    }

    fn rule_mut(&mut self, slot: &str) -> &mut SlotRule {
        let idx = match self.slots.iter().position(|r| r.name == slot) {
            Some(idx) => idx,
            None => {
                self.slots.push(SlotRule {
                    name: slot.to_string(),
                    scope: SlotScope::Visible,
                    capability: None,
                });
                self.slots.len() - 1
            }
        };
        &mut self.slots[idx]
    }
}

/// Index of a registered action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub usize);

/// A compiled pattern belonging to an action.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    /// Owning action
    pub action: ActionId,
    /// The compiled pattern
    pub pattern: Pattern,
}

/// Registry of all defined actions, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<ActionDef>,
    patterns: Vec<CompiledPattern>,
}

impl ActionRegistry {
    /// Creates a new empty action registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action, compiling its patterns.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAction` if the name is taken, or `InvalidPattern`
    /// if a pattern is malformed, the patterns disagree on their slots, or
    /// a slot rule names no slot.
    pub fn register(&mut self, def: ActionDef) -> Result<ActionId> {
        if self
            .actions
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(&def.name))
        {
            return Err(Error::new(ErrorKind::DuplicateAction(def.name)));
        }
        let invalid = |pattern: &str, message: &str| {
            Error::new(ErrorKind::InvalidPattern {
                action: def.name.clone(),
                pattern: pattern.to_string(),
                message: message.to_string(),
            })
        };
        if def.patterns.is_empty() {
            return Err(invalid("", "action has no patterns"));
        }

        let id = ActionId(self.actions.len());
        let mut compiled = Vec::with_capacity(def.patterns.len());
        let mut slot_set: Option<BTreeSet<(String, bool)>> = None;
        for source in &def.patterns {
            let pattern = Pattern::compile(&def.name, source)?;
            let slots: BTreeSet<(String, bool)> = pattern
                .slots()
                .map(|(n, k)| (n.to_string(), k == SlotKind::Direction))
                .collect();
            match &slot_set {
                Some(expected) if *expected != slots => {
                    return Err(invalid(source, "slots differ between patterns"));
                }
                Some(_) => {}
                None => slot_set = Some(slots),
            }
            compiled.push(CompiledPattern {
                action: id,
                pattern,
            });
        }

        let slot_set = slot_set.unwrap_or_default();
        for rule in &def.slots {
            if !slot_set.iter().any(|(n, _)| *n == rule.name) {
                return Err(invalid(&def.patterns[0], &format!("no slot named {}", rule.name)));
            }
        }

        self.patterns.extend(compiled);
        self.actions.push(def);
        Ok(id)
    }

    /// Looks up an action by id.
    #[must_use]
    pub fn get(&self, id: ActionId) -> Option<&ActionDef> {
        self.actions.get(id.0)
    }

    /// Looks up an action by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<(ActionId, &ActionDef)> {
        self.actions
            .iter()
            .enumerate()
            .find(|(_, a)| a.name.eq_ignore_ascii_case(name))
            .map(|(i, a)| (ActionId(i), a))
    }

    /// Returns all registered actions in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &ActionDef)> {
        self.actions.iter().enumerate().map(|(i, a)| (ActionId(i), a))
    }

    /// Returns all compiled patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Returns the first (canonical) pattern of an action.
    #[must_use]
    pub fn canonical_pattern(&self, id: ActionId) -> Option<&Pattern> {
        self.patterns
            .iter()
            .find(|p| p.action == id)
            .map(|p| &p.pattern)
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
