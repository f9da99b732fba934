//! Multilingual station vocabulary.
//!
//! A lexicon is a list of per-language tokens meaning "station". It drives
//! two heuristics: the Overpass name filter of the extended station query,
//! and the collision tie-break that prefers station-like names. New
//! languages are added as data, either in [`StationLexicon::default`] or in a
//! JSON file loaded with [`StationLexicon::from_file`].

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Characters that would change the meaning of the Overpass regex or break
/// out of its string literal.
const FORBIDDEN_CHARS: &[char] = &[
    '\\', '"', '\'', '.', '^', '$', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}',
];

/// Built-in tokens: (language, tokens).
const DEFAULT_TOKENS: &[(&str, &[&str])] = &[
    ("en", &["station"]),
    ("de", &["bahnhof", "hauptbahnhof", "hbf", "haltepunkt"]),
    ("fr", &["gare"]),
    ("es", &["estación", "estacion"]),
    ("it", &["stazione"]),
    ("pt", &["estação"]),
    ("nl", &["station", "halte"]),
    ("tr", &["garı", "istasyon", "İstasyon"]),
    ("ru", &["вокзал", "станция"]),
    ("uk", &["вокзал", "станція"]),
    ("bg", &["гара"]),
    ("ro", &["gara", "halta"]),
    ("el", &["σταθμός", "σταθμος"]),
    ("pl", &["dworzec", "stacja"]),
    ("cs", &["nádraží", "zastávka"]),
    ("hu", &["pályaudvar", "állomás"]),
    ("ka", &["სადგური"]),
    ("hy", &["կայարան"]),
    ("az", &["vağzal", "stansiya"]),
    ("ar", &["محطة"]),
    ("fa", &["ایستگاه"]),
    ("he", &["תחנה"]),
];

/// Errors loading a lexicon.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("failed to read lexicon: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid token {token:?} for language {language}")]
    InvalidToken { language: String, token: String },
}

/// Station words for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTokens {
    /// Language tag, informational only
    pub language: String,
    pub tokens: Vec<String>,
}

/// A validated set of station words across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LanguageTokens>", into = "Vec<LanguageTokens>")]
pub struct StationLexicon {
    entries: Vec<LanguageTokens>,
    /// Lowercased, deduplicated tokens used for matching.
    folded: Vec<String>,
}

impl StationLexicon {
    /// Build a lexicon, rejecting empty tokens and regex metacharacters.
    pub fn new(entries: Vec<LanguageTokens>) -> Result<Self, LexiconError> {
        for entry in &entries {
            for token in &entry.tokens {
                let trimmed = token.trim();
                if trimmed.is_empty() || trimmed.contains(FORBIDDEN_CHARS) {
                    return Err(LexiconError::InvalidToken {
                        language: entry.language.clone(),
                        token: token.clone(),
                    });
                }
            }
        }
        Ok(Self::from_valid(entries))
    }

    fn from_valid(entries: Vec<LanguageTokens>) -> Self {
        let mut folded: Vec<String> = Vec::new();
        for token in entries.iter().flat_map(|e| &e.tokens) {
            let lower = token.trim().to_lowercase();
            if !folded.contains(&lower) {
                folded.push(lower);
            }
        }
        Self { entries, folded }
    }

    /// Load a lexicon from a JSON array of `{language, tokens}` objects.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn entries(&self) -> &[LanguageTokens] {
        &self.entries
    }

    /// Whether any word of a name starts with a station word, ignoring case.
    ///
    /// Tokens only match at the start of a word, so `garı` matches
    /// "Sirkeci Garı" but not "Bulgarı".
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.folded.iter().any(|token| {
            lower.match_indices(token.as_str()).any(|(i, _)| {
                lower[..i]
                    .chars()
                    .next_back()
                    .is_none_or(|c| !c.is_alphanumeric())
            })
        })
    }

    /// Alternation of all tokens for a case-insensitive Overpass regex.
    pub fn overpass_pattern(&self) -> String {
        let mut tokens: Vec<&str> = Vec::new();
        for entry in &self.entries {
            for token in &entry.tokens {
                let token = token.trim();
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }
        tokens.join("|")
    }
}

impl Default for StationLexicon {
    fn default() -> Self {
        let entries = DEFAULT_TOKENS
            .iter()
            .map(|(language, tokens)| LanguageTokens {
                language: language.to_string(),
                tokens: tokens.iter().map(|t| t.to_string()).collect(),
            })
            .collect();
        Self::from_valid(entries)
    }
}

impl TryFrom<Vec<LanguageTokens>> for StationLexicon {
    type Error = LexiconError;

    fn try_from(entries: Vec<LanguageTokens>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<StationLexicon> for Vec<LanguageTokens> {
    fn from(lexicon: StationLexicon) -> Self {
        lexicon.entries
    }
}
