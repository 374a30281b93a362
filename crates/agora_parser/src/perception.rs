//! World state views and discovery.
//!
//! A [`Perception`] is everything one character can currently observe:
//! its location, inventory, the visible things and characters, the exits,
//! and the commands it could successfully issue right now. The discovery
//! pass instantiates each action's canonical pattern against every
//! reachable entity, then keeps only the commands that parse back to the
//! same action and targets and pass the capability and precondition
//! checks. Discovered commands therefore never fail with a precondition
//! error when executed against the same state.

use std::collections::HashSet;
use std::fmt;

use agora_foundation::capability::{IS_ACTIVE, IS_LOCKED, IS_OPEN};
use agora_foundation::{Capability, Result, ThingId};
use agora_world::{Owner, Thing, World};
use serde::{Deserialize, Serialize};

use crate::action::{Target, Targets};
use crate::pattern::SlotKind;
use crate::resolver::Resolver;
use crate::scope::Scope;

/// A visible thing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingView {
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Capability tags
    pub capabilities: Vec<Capability>,
    /// Human-readable state ("open", "locked", "on", ...)
    pub state: Vec<String>,
    /// Name of the container or surface holding it, if nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inside: Option<String>,
}

/// A usable exit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitView {
    /// Canonical direction
    pub direction: String,
    /// Destination name
    pub to: String,
}

/// Everything a character can observe, plus the commands it can issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perception {
    /// The observing character
    pub character: String,
    /// Current location name
    pub location: String,
    /// Current location description
    pub description: String,
    /// Carried things, including exposed nested contents
    pub inventory: Vec<ThingView>,
    /// Things visible in the location
    pub things: Vec<ThingView>,
    /// Other characters present
    pub characters: Vec<String>,
    /// Exits from the location
    pub exits: Vec<ExitView>,
    /// Currently executable commands
    pub commands: Vec<String>,
}

impl Perception {
    /// Builds the view for a character.
    ///
    /// # Errors
    ///
    /// Returns an error if `actor` is not a character.
    pub fn of(resolver: &Resolver, world: &World, actor: ThingId) -> Result<Self> {
        let scope = Scope::of(world, actor)?;
        let location = world.location(scope.location)?;

        let view = |ids: &[ThingId]| -> Vec<ThingView> {
            ids.iter()
                .filter_map(|&id| world.thing(id).ok())
                .map(|t| thing_view(world, t))
                .collect()
        };

        let exits = location
            .exits()
            .iter()
            .map(|e| ExitView {
                direction: e.direction.clone(),
                to: world
                    .location(e.to)
                    .map_or_else(|_| String::from("?"), |l| l.name.clone()),
            })
            .collect();

        Ok(Self {
            character: world.name_of(actor).to_string(),
            location: location.name.clone(),
            description: location.description.clone(),
            inventory: view(scope.held()),
            things: view(scope.around()),
            characters: scope
                .characters()
                .iter()
                .map(|&c| world.name_of(c).to_string())
                .collect(),
            exits,
            commands: discover(resolver, world, actor)?,
        })
    }
}

impl fmt::Display for Perception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "You are {}, in {}.", self.character, self.location)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        write_things(f, "You see", &self.things)?;
        write_things(f, "You carry", &self.inventory)?;
        if !self.characters.is_empty() {
            writeln!(f, "Also here: {}.", self.characters.join(", "))?;
        }
        if self.exits.is_empty() {
            writeln!(f, "There are no exits.")?;
        } else {
            let exits: Vec<_> = self
                .exits
                .iter()
                .map(|e| format!("{} ({})", e.direction, e.to))
                .collect();
            writeln!(f, "Exits: {}.", exits.join(", "))?;
        }
        write!(f, "You can: {}.", self.commands.join("; "))
    }
}

fn write_things(f: &mut fmt::Formatter<'_>, label: &str, things: &[ThingView]) -> fmt::Result {
    if things.is_empty() {
        return Ok(());
    }
    let shown: Vec<String> = things
        .iter()
        .map(|t| {
            let mut s = t.name.clone();
            if !t.state.is_empty() {
                s.push_str(&format!(" [{}]", t.state.join(", ")));
            }
            if let Some(holder) = &t.inside {
                s.push_str(&format!(" (in {holder})"));
            }
            s
        })
        .collect();
    writeln!(f, "{label}: {}.", shown.join(", "))
}

fn thing_view(world: &World, thing: &Thing) -> ThingView {
    let inside = match thing.owner() {
        Some(Owner::Container(holder)) => Some(world.name_of(holder).to_string()),
        _ => None,
    };
    ThingView {
        name: thing.name.clone(),
        description: thing.description.clone(),
        capabilities: thing.capabilities().collect(),
        state: state_words(thing),
        inside,
    }
}

fn state_words(thing: &Thing) -> Vec<String> {
    let mut words = Vec::new();
    if thing.has(Capability::Openable) {
        words.push(if thing.flag(IS_OPEN) { "open" } else { "closed" }.to_string());
    }
    if thing.has(Capability::Lockable) && thing.flag(IS_LOCKED) {
        words.push("locked".to_string());
    }
    if thing.has(Capability::Activatable) {
        words.push(if thing.flag(IS_ACTIVE) { "on" } else { "off" }.to_string());
    }
    words
}

/// Joins the names of things with commas.
#[must_use]
pub fn list_names(world: &World, ids: &[ThingId]) -> String {
    ids.iter()
        .map(|&id| world.name_of(id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Describes a character's surroundings: the location, visible things,
/// other characters, and exits.
///
/// # Errors
///
/// Returns an error if `actor` is not a character.
pub fn describe_surroundings(world: &World, actor: ThingId) -> Result<String> {
    let here = world.character(actor)?.location;
    let location = world.location(here)?;
    let mut lines = vec![location.name.clone()];
    if !location.description.is_empty() {
        lines.push(location.description.clone());
    }

    let top: Vec<ThingId> = location.contents().collect();
    if !top.is_empty() {
        lines.push(format!("You see: {}.", list_names(world, &top)));
    }
    let scope = Scope::of(world, actor)?;
    for &id in scope.around() {
        if let Some(line) = contents_line(world, id) {
            lines.push(line);
        }
    }

    let others: Vec<ThingId> = scope.characters().to_vec();
    if !others.is_empty() {
        lines.push(format!("Also here: {}.", list_names(world, &others)));
    }

    let exits: Vec<&str> = location.exits().iter().map(|e| e.direction.as_str()).collect();
    if exits.is_empty() {
        lines.push("There are no exits.".to_string());
    } else {
        lines.push(format!("Exits: {}.", exits.join(", ")));
    }
    Ok(lines.join("\n"))
}

/// Describes a single thing or character.
///
/// # Errors
///
/// Returns an error if the id is unknown.
pub fn describe_thing(world: &World, id: ThingId) -> Result<String> {
    let thing = world.thing(id)?;
    let mut text = if thing.description.is_empty() {
        format!("You see nothing special about the {}.", thing.name)
    } else {
        thing.description.clone()
    };
    let state = state_words(thing);
    if !state.is_empty() {
        text.push_str(&format!(" It is {}.", state.join(" and ")));
    }
    if let Some(line) = contents_line(world, id) {
        text.push(' ');
        text.push_str(&line);
    }
    Ok(text)
}

fn contents_line(world: &World, id: ThingId) -> Option<String> {
    let thing = world.thing(id).ok()?;
    if !thing.exposes_contents() {
        return None;
    }
    let inside: Vec<ThingId> = thing.contents().collect();
    if inside.is_empty() {
        return None;
    }
    let preposition = if thing.has(Capability::Surface) { "On" } else { "In" };
    Some(format!(
        "{preposition} the {}: {}.",
        thing.name,
        list_names(world, &inside)
    ))
}

/// Enumerates every command `actor` could successfully issue right now.
///
/// Uses the first pattern of each action; results keep action declaration
/// order and contain no duplicates.
///
/// # Errors
///
/// Returns an error if `actor` is not a character.
pub fn discover(resolver: &Resolver, world: &World, actor: ThingId) -> Result<Vec<String>> {
    let scope = Scope::of(world, actor)?;
    let location = world.location(scope.location)?;
    let registry = resolver.registry();

    let mut seen = HashSet::new();
    let mut commands = Vec::new();

    for (id, def) in registry.actions() {
        let Some(pattern) = registry.canonical_pattern(id) else {
            continue;
        };
        let slots: Vec<(&str, SlotKind)> = pattern.slots().collect();
        let options: Vec<Vec<Target>> = slots
            .iter()
            .map(|&(name, kind)| match kind {
                SlotKind::Direction => location
                    .exits()
                    .iter()
                    .map(|e| Target::Direction(e.direction.clone()))
                    .collect(),
                SlotKind::Entity => {
                    let rule = def.rule(name);
                    scope
                        .candidates(rule.scope)
                        .into_iter()
                        .filter(|&t| rule.capability.is_none_or(|c| world.has_capability(t, c)))
                        .map(Target::Thing)
                        .collect()
                }
            })
            .collect();

        for combo in Combinations::new(&options) {
            let mut targets = Targets::new();
            for (&(name, _), target) in slots.iter().zip(&combo) {
                targets.bind(name, target.clone());
            }
            let Some(text) = pattern.instantiate(|slot| match targets.get(slot)? {
                Target::Thing(t) => Some(world.name_of(*t).to_lowercase()),
                Target::Direction(d) => Some(d.clone()),
            }) else {
                continue;
            };
            if seen.contains(&text) {
                continue;
            }
            let Ok(parsed) = resolver.parse(world, actor, &text) else {
                continue;
            };
            if parsed.action != id || parsed.targets != targets {
                continue;
            }
            if resolver.check(world, actor, &parsed).is_ok() {
                seen.insert(text.clone());
                commands.push(text);
            }
        }
    }

    Ok(commands)
}

/// Cartesian product over per-slot options.
struct Combinations<'a> {
    options: &'a [Vec<Target>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(options: &'a [Vec<Target>]) -> Self {
        Self {
            options,
            indices: vec![0; options.len()],
            done: options.iter().any(Vec::is_empty),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<Target>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .indices
            .iter()
            .zip(self.options)
            .map(|(&i, opts)| opts[i].clone())
            .collect();

        // Advance like an odometer, last slot fastest.
        self.done = true;
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.options[pos].len() {
                self.done = false;
                break;
            }
            self.indices[pos] = 0;
        }
        Some(item)
    }
}
