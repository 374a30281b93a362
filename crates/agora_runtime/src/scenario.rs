//! Scenario files.
//!
//! A scenario is a TOML document describing a world plus who drives each
//! character:
//!
//! ```toml
//! title = "Two Rooms"
//!
//! [scheduler]
//! turn_delay_ms = 250
//!
//! [[location]]
//! name = "Hall"
//! exits = { north = "Study" }
//!
//! [[location]]
//! name = "Study"
//!
//! [[character]]
//! name = "Alice"
//! location = "Hall"
//! strategy = "scripted"
//! script = ["north", "look"]
//!
//! [[thing]]
//! name = "apple"
//! location = "Hall"
//! capabilities = ["gettable"]
//! ```

use std::fs;
use std::path::Path;

use agora_engine::{
    AgentStrategy, ChannelDriver, ChannelStrategy, RandomStrategy, Scheduler, SchedulerConfig,
    ScriptedStrategy,
};
use agora_foundation::{Error, ErrorContext, Result, ThingId};
use agora_world::{CharacterDecl, LocationDecl, ThingDecl, World, WorldBuilder, WorldConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEMO: &str = include_str!("../scenarios/demo.toml");

/// Where a character's commands come from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// A fixed list of commands
    Scripted,
    /// Seeded random choice among available commands
    #[default]
    Random,
    /// Typed at the REPL
    Human,
}

/// A character declaration plus its strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterEntry {
    /// Unique name
    pub name: String,
    /// Extra names the parser accepts
    pub aliases: Vec<String>,
    /// Free-text description
    pub description: String,
    /// Starting location name
    pub location: String,
    /// Command source
    pub strategy: StrategyKind,
    /// Commands for a scripted character
    pub script: Vec<String>,
    /// Seed for a random character; derived from the run seed if absent
    pub seed: Option<u64>,
}

impl CharacterEntry {
    /// Returns the world declaration for this character.
    #[must_use]
    pub fn declaration(&self) -> CharacterDecl {
        let mut decl = CharacterDecl::new(&self.name)
            .at(&self.location)
            .with_description(&self.description);
        for alias in &self.aliases {
            decl = decl.with_alias(alias);
        }
        if self.strategy == StrategyKind::Human {
            decl = decl.external();
        }
        decl
    }
}

/// A complete scenario.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Display title
    pub title: String,
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
    /// Locations in declaration order
    #[serde(rename = "location")]
    pub locations: Vec<LocationDecl>,
    /// Characters in turn order
    #[serde(rename = "character")]
    pub characters: Vec<CharacterEntry>,
    /// Things in declaration order
    #[serde(rename = "thing")]
    pub things: Vec<ThingDecl>,
}

/// The externally driven character of a running scenario.
#[derive(Debug)]
pub struct HumanSeat {
    /// The character
    pub actor: ThingId,
    /// Its name
    pub name: String,
    /// Pushes commands to its strategy
    pub driver: ChannelDriver,
}

/// A scheduler populated from a scenario.
#[derive(Debug)]
pub struct Simulation {
    /// The scenario title
    pub title: String,
    /// The scheduler, with every character registered
    pub scheduler: Scheduler,
    /// The human character, if one is seated
    pub human: Option<HumanSeat>,
}

impl Scenario {
    /// Parses a scenario from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not a valid scenario.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Reads a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::io(e.to_string())
                .with_context(ErrorContext::new().with_source(path.display().to_string()))
        })?;
        Self::from_toml(&text).map_err(|e| {
            e.with_context(ErrorContext::new().with_source(path.display().to_string()))
        })
    }

    /// Returns the built-in demo scenario.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bundled file does not parse.
    pub fn demo() -> Result<Self> {
        Self::from_toml(DEMO)
    }

    /// Returns the world part of the scenario.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            locations: self.locations.clone(),
            characters: self.characters.iter().map(CharacterEntry::declaration).collect(),
            things: self.things.clone(),
        }
    }

    /// Builds the initial world.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the world is invalid.
    pub fn build_world(&self) -> Result<World> {
        WorldBuilder::from_config(&self.world_config())
    }

    /// Builds the world and a scheduler with every character registered.
    ///
    /// Random characters without an explicit seed use `seed` plus their
    /// position in the roster. With `interactive` false, a human character
    /// is played by a random strategy instead.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the world is invalid or more than
    /// one character is declared human.
    pub fn instantiate(&self, seed: u64, interactive: bool) -> Result<Simulation> {
        let humans = self
            .characters
            .iter()
            .filter(|c| c.strategy == StrategyKind::Human)
            .count();
        if humans > 1 {
            return Err(Error::config("at most one character may be human"));
        }

        let world = self.build_world()?;
        let mut scheduler = Scheduler::standard(world, self.scheduler.clone())?;
        let mut human = None;

        for (index, entry) in self.characters.iter().enumerate() {
            let derived_seed = entry.seed.unwrap_or(seed.wrapping_add(index as u64));
            let strategy: Box<dyn AgentStrategy> = match entry.strategy {
                StrategyKind::Scripted => Box::new(ScriptedStrategy::new(entry.script.clone())),
                StrategyKind::Random => Box::new(RandomStrategy::new(derived_seed)),
                StrategyKind::Human if interactive => {
                    let (strategy, driver) = ChannelStrategy::pair(8);
                    human = Some((entry.name.clone(), driver));
                    Box::new(strategy)
                }
                StrategyKind::Human => {
                    info!(character = %entry.name, "no terminal; playing human character randomly");
                    Box::new(RandomStrategy::new(derived_seed))
                }
            };
            scheduler.register_named(&entry.name, strategy)?;
        }

        let human = match human {
            Some((name, driver)) => {
                let actor = scheduler
                    .world()
                    .read()
                    .thing_named(&name)
                    .ok_or_else(|| Error::config(format!("unknown character {name}")))?;
                Some(HumanSeat {
                    actor,
                    name,
                    driver,
                })
            }
            None => None,
        };

        Ok(Simulation {
            title: self.title.clone(),
            scheduler,
            human,
        })
    }
}
