//! Command surface patterns.
//!
//! A pattern is a token template such as `"place {item} on {recipient}"`:
//! literal words that must appear as written, and `{slot}` placeholders
//! that capture one or more words. A slot named `direction` captures a
//! single word the vocabulary knows as a direction.

use std::fmt;

use agora_foundation::{Error, ErrorKind, Result};

use crate::vocabulary::Vocabulary;

/// Name of the slot that captures a direction word.
pub const DIRECTION_SLOT: &str = "direction";

/// How a slot's words are resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotKind {
    /// Resolved against visible entities
    Entity,
    /// Resolved through the direction vocabulary
    Direction,
}

/// A compiled pattern element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternElement {
    /// A literal word that must appear
    Literal(String),
    /// A slot with variable binding
    Slot {
        /// Variable name
        name: String,
        /// Resolution kind
        kind: SlotKind,
    },
}

/// A compiled command pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    elements: Vec<PatternElement>,
}

/// Raw slot text captured by a successful match, in pattern order.
pub type SlotCaptures = Vec<(String, String)>;

impl Pattern {
    /// Compiles a pattern template.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the template is empty, has a malformed
    /// or duplicated slot, or places two slots side by side.
    pub fn compile(action: &str, source: &str) -> Result<Self> {
        let invalid = |message: &str| {
            Error::new(ErrorKind::InvalidPattern {
                action: action.to_string(),
                pattern: source.to_string(),
                message: message.to_string(),
            })
        };

        let mut elements = Vec::new();
        for word in source.split_whitespace() {
            let element = if let Some(inner) = word.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid("unterminated slot"))?;
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(invalid("slot names must be alphanumeric"));
                }
                if elements
                    .iter()
                    .any(|e| matches!(e, PatternElement::Slot { name: n, .. } if n == name))
                {
                    return Err(invalid("duplicate slot"));
                }
                if matches!(elements.last(), Some(PatternElement::Slot { .. })) {
                    return Err(invalid("adjacent slots"));
                }
                let kind = if name == DIRECTION_SLOT {
                    SlotKind::Direction
                } else {
                    SlotKind::Entity
                };
                PatternElement::Slot {
                    name: name.to_string(),
                    kind,
                }
            } else if word.contains(['{', '}']) {
                return Err(invalid("stray brace"));
            } else {
                PatternElement::Literal(word.to_lowercase())
            };
            elements.push(element);
        }

        if elements.is_empty() {
            return Err(invalid("empty pattern"));
        }

        Ok(Self {
            source: source.to_string(),
            elements,
        })
    }

    /// Returns the template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the compiled elements.
    #[must_use]
    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    /// Returns the slots in pattern order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, SlotKind)> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Slot { name, kind } => Some((name.as_str(), *kind)),
            PatternElement::Literal(_) => None,
        })
    }

    /// Calculates specificity score (more elements = more specific).
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.elements.len()
    }

    /// Matches tokenized input, returning the captured slot text.
    ///
    /// All words must be consumed. Entity slots take as few words as
    /// possible while still letting the rest of the pattern match.
    #[must_use]
    pub fn match_words(&self, words: &[String], vocab: &Vocabulary) -> Option<SlotCaptures> {
        let mut captures = Vec::new();
        match_from(&self.elements, words, vocab, &mut captures).then_some(captures)
    }

    /// Builds command text by filling each slot.
    ///
    /// Returns `None` if `fill` declines any slot.
    pub fn instantiate<F>(&self, mut fill: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut parts = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            match element {
                PatternElement::Literal(word) => parts.push(word.clone()),
                PatternElement::Slot { name, .. } => parts.push(fill(name)?),
            }
        }
        Some(parts.join(" "))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_from(
    elements: &[PatternElement],
    words: &[String],
    vocab: &Vocabulary,
    captures: &mut SlotCaptures,
) -> bool {
    let Some((element, rest)) = elements.split_first() else {
        return words.is_empty();
    };

    match element {
        PatternElement::Literal(literal) => {
            words.first().is_some_and(|w| w == literal)
                && match_from(rest, &words[1..], vocab, captures)
        }
        PatternElement::Slot {
            name,
            kind: SlotKind::Direction,
        } => {
            let Some(word) = words.first() else {
                return false;
            };
            if vocab.lookup_direction(word).is_none() {
                return false;
            }
            captures.push((name.clone(), word.clone()));
            if match_from(rest, &words[1..], vocab, captures) {
                return true;
            }
            captures.pop();
            false
        }
        PatternElement::Slot {
            name,
            kind: SlotKind::Entity,
        } => {
            for take in 1..=words.len() {
                captures.push((name.clone(), words[..take].join(" ")));
                if match_from(rest, &words[take..], vocab, captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}
