//! Noun phrase representation and resolution.
//!
//! Handles resolving phrases like "the brass lamp" to entities in scope.

use std::cmp::Ordering;

use agora_foundation::ThingId;
use agora_world::{Thing, World};
use tracing::debug;

use crate::tokenizer::InputTokenizer;
use crate::vocabulary::Vocabulary;

/// A parsed noun phrase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NounPhrase {
    /// The words after leading articles were dropped
    pub words: Vec<String>,
}

impl NounPhrase {
    /// Builds a phrase from raw slot text, dropping leading articles.
    /// Quoted slot text is normalized again here, so `"Bob's hat"` and
    /// `bob's hat` name the same thing.
    #[must_use]
    pub fn parse(text: &str, vocab: &Vocabulary) -> Self {
        let words = InputTokenizer::words(text)
            .into_iter()
            .skip_while(|w| vocab.is_article(w))
            .collect();
        Self { words }
    }

    /// Returns the phrase as a single lowercase string.
    #[must_use]
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// Returns true if nothing but articles was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// How well a phrase matched an entity. Later variants are better.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// The phrase appears inside the name or an alias
    Substring,
    /// The phrase equals an alias
    Alias,
    /// The phrase equals the name
    Exact,
}

/// Result of noun resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NounResolution {
    /// Resolved to one entity
    Unique(ThingId),
    /// No matching entity found
    NotFound,
}

/// Resolves noun phrases to entities in scope.
#[derive(Clone, Copy, Debug, Default)]
pub struct NounResolver;

impl NounResolver {
    /// Scores a thing against a phrase. Names and aliases are normalized
    /// like player input before comparing.
    #[must_use]
    pub fn quality(thing: &Thing, phrase: &str) -> Option<MatchQuality> {
        if phrase.is_empty() {
            return None;
        }
        let name = InputTokenizer::normalize(&thing.name);
        if name == phrase {
            return Some(MatchQuality::Exact);
        }
        let aliases: Vec<String> = thing
            .aliases
            .iter()
            .map(|a| InputTokenizer::normalize(a))
            .collect();
        if aliases.iter().any(|a| a == phrase) {
            return Some(MatchQuality::Alias);
        }
        if name.contains(phrase) || aliases.iter().any(|a| a.contains(phrase)) {
            return Some(MatchQuality::Substring);
        }
        None
    }

    /// Resolves a phrase against candidate entities.
    ///
    /// Resolution order:
    /// 1. Exact name match
    /// 2. Alias match
    /// 3. Substring match on name/alias
    ///
    /// Remaining ties go to the entity declared first.
    #[must_use]
    pub fn resolve(phrase: &NounPhrase, candidates: &[ThingId], world: &World) -> NounResolution {
        let text = phrase.text();
        let mut best: Option<(MatchQuality, ThingId)> = None;
        let mut tied = Vec::new();

        for &id in candidates {
            let Ok(thing) = world.thing(id) else {
                continue;
            };
            let Some(quality) = Self::quality(thing, &text) else {
                continue;
            };
            match best.map(|(q, b)| (quality.cmp(&q), b)) {
                None | Some((Ordering::Greater, _)) => {
                    best = Some((quality, id));
                    tied.clear();
                }
                Some((Ordering::Equal, current)) => {
                    if id < current {
                        tied.push(current);
                        best = Some((quality, id));
                    } else {
                        tied.push(id);
                    }
                }
                Some((Ordering::Less, _)) => {}
            }
        }

        match best {
            Some((quality, id)) => {
                if !tied.is_empty() {
                    debug!(
                        phrase = %text,
                        chosen = %world.name_of(id),
                        ?quality,
                        others = tied.len(),
                        "ambiguous noun phrase resolved to first declared"
                    );
                }
                NounResolution::Unique(id)
            }
            None => NounResolution::NotFound,
        }
    }
}
