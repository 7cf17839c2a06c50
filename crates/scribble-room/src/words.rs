//! The word bank and hint masking.

use rand::Rng;
use rand::seq::SliceRandom;

/// Built-in vocabulary. Everything here is drawable in under a minute.
const VOCABULARY: &[&str] = &[
    "apple", "airplane", "anchor", "banana", "balloon", "bicycle", "bridge",
    "butterfly", "cactus", "camera", "candle", "castle", "cat", "clock",
    "cloud", "crown", "diamond", "dinosaur", "dog", "dragon", "drum",
    "elephant", "envelope", "feather", "fish", "flower", "fork", "ghost",
    "giraffe", "glasses", "guitar", "hammer", "hat", "helicopter", "house",
    "island", "jellyfish", "kangaroo", "key", "kite", "ladder", "lamp",
    "lighthouse", "lion", "lollipop", "mountain", "moon", "mushroom",
    "octopus", "owl", "penguin", "pencil", "piano", "pineapple", "pizza",
    "rabbit", "rainbow", "robot", "rocket", "sailboat", "scissors", "shark",
    "snail", "snowman", "spider", "star", "sun", "sword", "telescope",
    "tent", "toothbrush", "train", "tree", "turtle", "umbrella", "volcano",
    "watermelon", "whale", "windmill", "zebra",
];

/// The set of words a drawer may be offered.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<String>,
}

impl Default for WordBank {
    fn default() -> Self {
        Self::new(VOCABULARY.iter().copied())
    }
}

impl WordBank {
    /// Builds a bank from the given words. Blank entries and duplicates
    /// are dropped so every pick is distinct.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for word in words {
            let word = word.into();
            let word = word.trim();
            if !word.is_empty() && !unique.iter().any(|w| w == word) {
                unique.push(word.to_string());
            }
        }
        Self { words: unique }
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the bank has no words at all.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Up to `count` distinct words, uniformly shuffled.
    pub fn pick<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut words = self.words.clone();
        words.shuffle(rng);
        words.truncate(count);
        words
    }
}

/// Masks every character except the first and last with `_`.
///
/// Works on characters, not bytes: `"café"` becomes `"c__é"`.
pub fn hint(word: &str) -> String {
    let last = word.chars().count().saturating_sub(1);
    word.chars()
        .enumerate()
        .map(|(i, c)| if i == 0 || i == last { c } else { '_' })
        .collect()
}
