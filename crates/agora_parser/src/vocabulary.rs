//! Vocabulary registry.
//!
//! Stores the words the parser treats specially: directions with their
//! synonyms, and the articles dropped from noun phrases.

use std::collections::HashMap;

/// A registered direction.
#[derive(Clone, Debug)]
pub struct Direction {
    /// Canonical direction name
    pub name: String,
    /// Synonym words
    pub synonyms: Vec<String>,
    /// Opposite direction
    pub opposite: Option<String>,
}

impl Direction {
    /// Creates a direction.
    #[must_use]
    pub fn new(name: &str, synonyms: &[&str], opposite: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| (*s).to_string()).collect(),
            opposite: opposite.map(str::to_string),
        }
    }
}

/// Runtime storage for vocabulary definitions.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    /// Directions in registration order
    directions: Vec<Direction>,
    /// Word (canonical or synonym) -> index into `directions`
    direction_words: HashMap<String, usize>,
    /// Articles stripped from the front of noun phrases
    articles: Vec<String>,
}

impl Vocabulary {
    /// Creates a new empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard vocabulary: compass, vertical and in/out
    /// directions plus English articles.
    #[must_use]
    pub fn standard() -> Self {
        let mut vocab = Self::new();
        for dir in [
            Direction::new("north", &["n"], Some("south")),
            Direction::new("south", &["s"], Some("north")),
            Direction::new("east", &["e"], Some("west")),
            Direction::new("west", &["w"], Some("east")),
            Direction::new("northeast", &["ne"], Some("southwest")),
            Direction::new("northwest", &["nw"], Some("southeast")),
            Direction::new("southeast", &["se"], Some("northwest")),
            Direction::new("southwest", &["sw"], Some("northeast")),
            Direction::new("up", &["u"], Some("down")),
            Direction::new("down", &["d"], Some("up")),
            Direction::new("in", &["inside"], Some("out")),
            Direction::new("out", &["outside"], Some("in")),
        ] {
            vocab.register_direction(dir);
        }
        for article in ["the", "a", "an", "some"] {
            vocab.register_article(article);
        }
        vocab
    }

    /// Registers a direction with its synonyms. Re-registering a word
    /// points it at the newer direction.
    pub fn register_direction(&mut self, dir: Direction) {
        let idx = self.directions.len();
        self.direction_words.insert(dir.name.to_lowercase(), idx);
        for syn in &dir.synonyms {
            self.direction_words.insert(syn.to_lowercase(), idx);
        }
        self.directions.push(dir);
    }

    /// Looks up a direction by word (canonical or synonym).
    #[must_use]
    pub fn lookup_direction(&self, word: &str) -> Option<&Direction> {
        self.direction_words
            .get(&word.to_lowercase())
            .and_then(|&i| self.directions.get(i))
    }

    /// Returns the canonical name for a direction word, or the word itself
    /// (lowercased) when it is not a known direction.
    #[must_use]
    pub fn canonical_direction(&self, word: &str) -> String {
        self.lookup_direction(word)
            .map_or_else(|| word.to_lowercase(), |d| d.name.clone())
    }

    /// Registers an article.
    pub fn register_article(&mut self, article: &str) {
        self.articles.push(article.to_lowercase());
    }

    /// Checks if a word is a registered article.
    #[must_use]
    pub fn is_article(&self, word: &str) -> bool {
        self.articles.iter().any(|a| a.eq_ignore_ascii_case(word))
    }
}
