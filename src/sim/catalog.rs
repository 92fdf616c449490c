//! Word catalogs
//!
//! A catalog is a fixed list of words, each either a target (has the vowel
//! sound being practised) or a distractor. Catalogs never change during a round.

use serde::{Deserialize, Serialize};

/// One word the spawner can drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinition {
    pub text: String,
    pub is_correct: bool,
}

impl WordDefinition {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// A level's word list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCatalog {
    /// Level tag used when reporting results ("expert")
    pub level: String,
    /// Detailed practice focus ("LONG E, O, U vowels"), named in practice hints
    #[serde(default)]
    pub focus: String,
    /// Short name of the sound ("long vowels"), named in praise
    #[serde(default)]
    pub sound: String,
    pub words: Vec<WordDefinition>,
}

const EXPERT_TARGETS: &[&str] = &[
    "team", "bead", "leaf", "seal", "rope", "bone", "cone", "vote", "cube", "mule", "fuse", "tune",
];

const EXPERT_DISTRACTORS: &[&str] = &[
    "cat", "sit", "cup", "bed", "dog", "pen", "hat", "bus", "rat", "mug",
];

impl WordCatalog {
    pub fn new(level: impl Into<String>, focus: impl Into<String>, words: Vec<WordDefinition>) -> Self {
        Self {
            level: level.into(),
            focus: focus.into(),
            sound: String::new(),
            words,
        }
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    /// Long E, O, U vowel sounds against short-vowel distractors
    pub fn expert() -> Self {
        let words = EXPERT_TARGETS
            .iter()
            .map(|w| WordDefinition::new(*w, true))
            .chain(EXPERT_DISTRACTORS.iter().map(|w| WordDefinition::new(*w, false)))
            .collect();
        Self::new("expert", "LONG E, O, U vowels", words).with_sound("long vowels")
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WordDefinition> {
        self.words.get(index)
    }

    /// What end-of-round praise names
    pub fn praise_topic(&self) -> &str {
        first_non_empty(&self.sound, &self.focus)
    }

    /// What an end-of-round practice hint names
    pub fn practice_topic(&self) -> &str {
        first_non_empty(&self.focus, &self.sound)
    }

    /// Words with the target sound
    pub fn targets(&self) -> impl Iterator<Item = &WordDefinition> {
        self.words.iter().filter(|w| w.is_correct)
    }

    /// Words without the target sound
    pub fn distractors(&self) -> impl Iterator<Item = &WordDefinition> {
        self.words.iter().filter(|w| !w.is_correct)
    }
}

fn first_non_empty<'a>(a: &'a str, b: &'a str) -> &'a str {
    match (a.is_empty(), b.is_empty()) {
        (false, _) => a,
        (true, false) => b,
        (true, true) => "these words",
    }
}

impl Default for WordCatalog {
    fn default() -> Self {
        Self::expert()
    }
}
