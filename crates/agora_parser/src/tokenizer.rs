//! Input tokenization.
//!
//! Converts a raw command string into a stream of tokens.

/// A token from command input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputToken {
    /// A lowercase word
    Word(String),
    /// A quoted string (preserved as-is, lowercased for matching)
    Quoted(String),
}

impl InputToken {
    /// Returns the token text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Word(w) | Self::Quoted(w) => w,
        }
    }
}

/// Tokenizes command input.
pub struct InputTokenizer;

impl InputTokenizer {
    /// Tokenizes a raw input string.
    ///
    /// - Converts words to lowercase
    /// - Strips punctuation (except within quotes)
    /// - Preserves quoted strings as atomic units
    #[must_use]
    pub fn tokenize(input: &str) -> Vec<InputToken> {
        let mut tokens = Vec::new();
        let mut chars = input.chars();
        let mut current_word = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    flush(&mut current_word, &mut tokens);
                    let quoted: String = chars.by_ref().take_while(|&c| c != '"').collect();
                    let quoted = quoted.trim().to_lowercase();
                    if !quoted.is_empty() {
                        tokens.push(InputToken::Quoted(quoted));
                    }
                }
                c if c.is_whitespace() => flush(&mut current_word, &mut tokens),
                '.' | ',' | '!' | '?' | ';' | ':' | '\'' | '(' | ')' => {}
                _ => current_word.push(ch),
            }
        }

        flush(&mut current_word, &mut tokens);
        tokens
    }

    /// Tokenizes and returns only the token texts.
    #[must_use]
    pub fn words(input: &str) -> Vec<String> {
        Self::tokenize(input)
            .into_iter()
            .map(|t| match t {
                InputToken::Word(w) | InputToken::Quoted(w) => w,
            })
            .collect()
    }

    /// Normalizes text the way input is normalized, so entity names
    /// compare equal to what a player can type: "Bob's Hat" becomes
    /// "bobs hat".
    #[must_use]
    pub fn normalize(text: &str) -> String {
        Self::words(text).join(" ")
    }
}

fn flush(word: &mut String, tokens: &mut Vec<InputToken>) {
    if !word.is_empty() {
        tokens.push(InputToken::Word(word.to_lowercase()));
        word.clear();
    }
}
