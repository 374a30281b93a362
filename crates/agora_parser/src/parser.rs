//! Main parser pipeline.
//!
//! Orchestrates the flow from raw input to a resolved command:
//!
//! 1. Tokenize the input.
//! 2. Match every registered pattern; order the matches by specificity,
//!    keeping declaration order among equals.
//! 3. Resolve each candidate's slots against the actor's scope. The first
//!    candidate whose slots all resolve wins.
//!
//! With no matching pattern the result is [`ParseFailure::NoMatch`]. When
//! patterns match but none resolves, the most specific candidate's first
//! unresolved slot is reported as [`ParseFailure::TargetNotFound`].

use std::borrow::Cow;

use agora_foundation::ThingId;
use agora_world::{Location, World};
use thiserror::Error;
use tracing::trace;

use crate::action::{ActionId, ActionRegistry, Target, Targets};
use crate::noun_phrase::{NounPhrase, NounResolution, NounResolver};
use crate::pattern::{SlotCaptures, SlotKind};
use crate::scope::{Scope, SlotScope};
use crate::tokenizer::InputTokenizer;
use crate::vocabulary::{Direction, Vocabulary};

/// A successfully parsed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The matched action
    pub action: ActionId,
    /// The matched pattern source
    pub pattern: String,
    /// Resolved slots
    pub targets: Targets,
}

/// A parse failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// No pattern matched the input
    #[error("I don't understand that command.")]
    NoMatch,
    /// A pattern matched but a slot did not resolve
    #[error("{message}")]
    TargetNotFound {
        /// The slot that failed
        slot: String,
        /// The words given for it
        text: String,
        /// Narration for the actor
        message: String,
    },
    /// The acting entity is not a character in this world
    #[error("You are nowhere at all.")]
    NoActor(ThingId),
}

impl ParseFailure {
    fn not_found(slot: &str, text: &str, scope: SlotScope, kind: SlotKind) -> Self {
        let message = match (kind, scope) {
            (SlotKind::Direction, _) => format!("There is no way {text}."),
            (SlotKind::Entity, SlotScope::Held) => format!("You aren't carrying any {text}."),
            (SlotKind::Entity, _) if text.is_empty() => "You don't see that here.".to_string(),
            (SlotKind::Entity, _) => format!("You don't see any {text} here."),
        };
        Self::TargetNotFound {
            slot: slot.to_string(),
            text: text.to_string(),
            message,
        }
    }
}

/// Result of resolving one candidate's slots.
enum SlotOutcome {
    Resolved(Targets),
    Unresolved(ParseFailure),
}

/// The command parser.
#[derive(Clone, Debug, Default)]
pub struct CommandParser {
    vocabulary: Vocabulary,
}

impl CommandParser {
    /// Creates a parser over the given vocabulary.
    #[must_use]
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Creates a parser with the standard vocabulary.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Vocabulary::standard())
    }

    /// Gets a reference to the vocabulary.
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parses input issued by `actor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] when no pattern matches or no matching
    /// pattern's slots resolve.
    pub fn parse(
        &self,
        registry: &ActionRegistry,
        world: &World,
        actor: ThingId,
        input: &str,
    ) -> Result<ParsedCommand, ParseFailure> {
        let words = InputTokenizer::words(input);
        if words.is_empty() {
            return Err(ParseFailure::NoMatch);
        }

        let scope = Scope::of(world, actor).map_err(|_| ParseFailure::NoActor(actor))?;
        let location = world
            .location(scope.location)
            .map_err(|_| ParseFailure::NoActor(actor))?;
        let vocabulary = self.vocabulary_at(location);

        let mut candidates: Vec<(usize, SlotCaptures)> = registry
            .patterns()
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.pattern.match_words(&words, &vocabulary).map(|c| (i, c)))
            .collect();
        if candidates.is_empty() {
            return Err(ParseFailure::NoMatch);
        }
        // Stable: equal specificity keeps declaration order.
        candidates.sort_by_key(|(i, _)| std::cmp::Reverse(registry.patterns()[*i].pattern.specificity()));

        let mut first_failure = None;
        for (index, captures) in candidates {
            let compiled = &registry.patterns()[index];
            let Some(def) = registry.get(compiled.action) else {
                continue;
            };
            match self.resolve_slots(def, &captures, &scope, location, &vocabulary, world) {
                SlotOutcome::Resolved(targets) => {
                    trace!(action = %def.name, pattern = %compiled.pattern, "parsed");
                    return Ok(ParsedCommand {
                        action: compiled.action,
                        pattern: compiled.pattern.source().to_string(),
                        targets,
                    });
                }
                SlotOutcome::Unresolved(failure) => {
                    first_failure.get_or_insert(failure);
                }
            }
        }

        Err(first_failure.unwrap_or(ParseFailure::NoMatch))
    }

    /// Returns the vocabulary extended with the exits of `location` whose
    /// names are not already direction words.
    fn vocabulary_at(&self, location: &Location) -> Cow<'_, Vocabulary> {
        let unknown: Vec<&str> = location
            .exits()
            .iter()
            .map(|e| e.direction.as_str())
            .filter(|d| self.vocabulary.lookup_direction(d).is_none())
            .collect();
        if unknown.is_empty() {
            return Cow::Borrowed(&self.vocabulary);
        }
        let mut vocabulary = self.vocabulary.clone();
        for name in unknown {
            vocabulary.register_direction(Direction::new(name, &[], None));
        }
        Cow::Owned(vocabulary)
    }

    fn resolve_slots(
        &self,
        def: &crate::action::ActionDef,
        captures: &SlotCaptures,
        scope: &Scope,
        location: &Location,
        vocabulary: &Vocabulary,
        world: &World,
    ) -> SlotOutcome {
        let mut targets = Targets::new();
        for (slot, text) in captures {
            let rule = def.rule(slot);
            if slot == crate::pattern::DIRECTION_SLOT {
                match vocabulary.lookup_direction(text) {
                    Some(dir) => {
                        // Bind the exit as declared, so "north" finds an exit named "n".
                        let exit = location
                            .exits()
                            .iter()
                            .find(|e| vocabulary.canonical_direction(&e.direction) == dir.name)
                            .map_or_else(|| dir.name.clone(), |e| e.direction.clone());
                        targets.bind(slot.clone(), Target::Direction(exit));
                    }
                    None => {
                        return SlotOutcome::Unresolved(ParseFailure::not_found(
                            slot,
                            text,
                            rule.scope,
                            SlotKind::Direction,
                        ));
                    }
                }
                continue;
            }

            let phrase = NounPhrase::parse(text, &self.vocabulary);
            let candidates = scope.candidates(rule.scope);
            match NounResolver::resolve(&phrase, &candidates, world) {
                NounResolution::Unique(id) => targets.bind(slot.clone(), Target::Thing(id)),
                NounResolution::NotFound => {
                    return SlotOutcome::Unresolved(ParseFailure::not_found(
                        slot,
                        &phrase.text(),
                        rule.scope,
                        SlotKind::Entity,
                    ));
                }
            }
        }
        SlotOutcome::Resolved(targets)
    }
}
