//! Action resolution.
//!
//! Turns parsed commands into outcomes. Slot capabilities are checked
//! first, then the action's precondition; only then does the effect run,
//! against a scratch copy of the world that is committed when the effect
//! returns `Ok`. Every call produces exactly one [`Resolution`], success or
//! not, and failures never propagate as errors.

use agora_foundation::ThingId;
use agora_world::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{ActionContext, ActionDef, ActionRegistry, EffectContext, Target};
use crate::parser::{CommandParser, ParseFailure, ParsedCommand};

/// Category of a failed command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No pattern matched
    ParseError,
    /// A slot did not resolve to a visible entity
    TargetNotFound,
    /// The precondition refused
    PreconditionError,
    /// A target lacks the capability its slot requires
    CapabilityMismatch,
    /// The decision provider failed and a default was substituted
    StrategyFailure,
    /// The effect itself failed; nothing was committed
    Internal,
}

/// The outcome of one command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Name of the matched action, if any pattern matched
    pub action: Option<String>,
    /// Resolved slots as (slot, display name)
    pub targets: Vec<(String, String)>,
    /// Narration for the actor
    pub description: String,
    /// Failure category, `None` on success
    pub failure: Option<FailureKind>,
    /// Whether this attempt ends the actor's turn
    pub ends_turn: bool,
    /// Whether the world was modified
    pub world_changed: bool,
}

impl Resolution {
    /// Returns true if the command succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    fn failed(kind: FailureKind, description: String) -> Self {
        Self {
            action: None,
            targets: Vec::new(),
            description,
            failure: Some(kind),
            ends_turn: false,
            world_changed: false,
        }
    }

    /// Builds a parse failure resolution. Parse failures never end the turn.
    #[must_use]
    pub fn parse_failure(failure: &ParseFailure) -> Self {
        let kind = match failure {
            ParseFailure::NoMatch | ParseFailure::NoActor(_) => FailureKind::ParseError,
            ParseFailure::TargetNotFound { .. } => FailureKind::TargetNotFound,
        };
        Self::failed(kind, failure.to_string())
    }
}

/// Parses and resolves commands against a fixed action registry.
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    parser: CommandParser,
    registry: ActionRegistry,
}

impl Resolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(parser: CommandParser, registry: ActionRegistry) -> Self {
        Self { parser, registry }
    }

    /// Creates a resolver with the standard vocabulary and action set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the standard actions fail to
    /// register.
    pub fn standard() -> agora_foundation::Result<Self> {
        Ok(Self::new(
            CommandParser::standard(),
            crate::stdlib::standard_actions()?,
        ))
    }

    /// Gets the action registry.
    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Gets the parser.
    #[must_use]
    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Parses input without resolving it.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] when the input does not parse.
    pub fn parse(
        &self,
        world: &World,
        actor: ThingId,
        input: &str,
    ) -> Result<ParsedCommand, ParseFailure> {
        self.parser.parse(&self.registry, world, actor, input)
    }

    /// Parses and resolves one command, committing its effect to `world`
    /// on success.
    pub fn execute(&self, world: &mut World, actor: ThingId, input: &str) -> Resolution {
        match self.parse(world, actor, input) {
            Ok(parsed) => self.apply(world, actor, &parsed),
            Err(failure) => {
                debug!(actor = %world.name_of(actor), input, %failure, "parse failed");
                Resolution::parse_failure(&failure)
            }
        }
    }

    /// Checks capabilities and the precondition for a parsed command
    /// without running its effect.
    ///
    /// # Errors
    ///
    /// Returns the failure category and narration.
    pub fn check(
        &self,
        world: &World,
        actor: ThingId,
        parsed: &ParsedCommand,
    ) -> Result<(), (FailureKind, String)> {
        let Some(def) = self.registry.get(parsed.action) else {
            return Err((FailureKind::ParseError, ParseFailure::NoMatch.to_string()));
        };

        for (slot, target) in parsed.targets.iter() {
            let (Target::Thing(id), Some(capability)) = (target, def.rule(slot).capability) else {
                continue;
            };
            if !world.has_capability(*id, capability) {
                return Err((
                    FailureKind::CapabilityMismatch,
                    format!(
                        "You can't {} the {}.",
                        verb_of(&parsed.pattern, def),
                        world.name_of(*id)
                    ),
                ));
            }
        }

        let ctx = ActionContext {
            world,
            actor,
            targets: &parsed.targets,
        };
        (def.precondition)(&ctx).map_err(|r| (FailureKind::PreconditionError, r.0))
    }

    /// Resolves a parsed command.
    pub fn apply(&self, world: &mut World, actor: ThingId, parsed: &ParsedCommand) -> Resolution {
        let Some(def) = self.registry.get(parsed.action) else {
            return Resolution::parse_failure(&ParseFailure::NoMatch);
        };
        let targets = parsed
            .targets
            .iter()
            .map(|(slot, t)| {
                let shown = match t {
                    Target::Thing(id) => world.name_of(*id).to_string(),
                    Target::Direction(d) => d.clone(),
                };
                (slot.to_string(), shown)
            })
            .collect();
        let mut resolution = Resolution {
            action: Some(def.name.clone()),
            targets,
            description: String::new(),
            failure: None,
            ends_turn: def.ends_turn,
            world_changed: false,
        };

        if let Err((kind, message)) = self.check(world, actor, parsed) {
            debug!(actor = %world.name_of(actor), action = %def.name, ?kind, %message, "refused");
            resolution.failure = Some(kind);
            resolution.description = message;
            return resolution;
        }

        let mut scratch = world.clone();
        let result = {
            let mut ctx = EffectContext {
                world: &mut scratch,
                actor,
                targets: &parsed.targets,
            };
            (def.effect)(&mut ctx)
        };

        match result {
            Ok(description) => {
                if def.mutates {
                    *world = scratch;
                    resolution.world_changed = true;
                }
                resolution.description = description;
            }
            Err(error) => {
                warn!(actor = %world.name_of(actor), action = %def.name, %error, "effect failed; nothing committed");
                resolution.failure = Some(FailureKind::Internal);
                resolution.description = "Nothing happens.".to_string();
            }
        }
        resolution
    }
}

/// The literal words before the first slot, e.g. "turn on" for
/// `"turn on {item}"`. Falls back to the action name.
fn verb_of(pattern: &str, def: &ActionDef) -> String {
    let words: Vec<&str> = pattern
        .split_whitespace()
        .take_while(|w| !w.starts_with('{'))
        .collect();
    if words.is_empty() {
        def.name.clone()
    } else {
        words.join(" ")
    }
}
