//! Deterministic text fingerprints.
//!
//! Neither encoder calls out to a model. Both map text to `dimension` slots
//! by hashing, then L2-normalize. Empty or whitespace-only text maps to the
//! zero vector.

use super::vector::Embedding;

pub const DEFAULT_DIMENSION: usize = 384;

/// Text to fixed-dimension vector.
///
/// Implementations must be pure: equal input, equal output.
pub trait Encoder: Send + Sync {
    /// Stable identifier, recorded with stored vectors.
    fn id(&self) -> &str;

    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Embedding;

    fn encode_all(&self, texts: &[&str]) -> Vec<Embedding> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

/// Legacy positional character hash.
///
/// For the word at index `i` and its char at index `j`, slot
/// `(code(char) + i + j) mod D` is incremented. Words come from splitting the
/// lowercased text on runs of ECMAScript `\s` (Unicode whitespace plus U+FEFF,
/// minus U+0085); leading whitespace produces an empty first word, which
/// shifts every index by one. Kept for parity with vectors produced by the
/// earlier system. `code` is the Unicode scalar value, so chars outside the
/// Basic Multilingual Plane land in different slots than under UTF-16 code
/// units.
#[derive(Debug, Clone)]
pub struct PositionalCharEncoder {
    dimension: usize,
    id: String,
}

impl PositionalCharEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            id: format!("positional-char-v1/{dimension}"),
        }
    }
}

impl Default for PositionalCharEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Encoder for PositionalCharEncoder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Embedding {
        let mut slots = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return Embedding::from_raw(slots);
        }

        let lowered = text.to_lowercase();
        let shift = usize::from(lowered.starts_with(is_ecma_space));
        let dim = self.dimension as u64;
        let words = lowered.split(is_ecma_space).filter(|w| !w.is_empty());

        for (i, word) in words.enumerate() {
            for (j, ch) in word.chars().enumerate() {
                let slot = (u64::from(ch as u32) + (i + shift) as u64 + j as u64) % dim;
                slots[slot as usize] += 1.0;
            }
        }

        Embedding::normalized(slots)
    }
}

/// Membership in ECMAScript's `\s` class.
fn is_ecma_space(c: char) -> bool {
    match c {
        '\u{feff}' => true,
        '\u{85}' => false,
        c => c.is_whitespace(),
    }
}

/// Weight of one character trigram relative to one whole word.
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Position-independent lexical hash.
///
/// Every whitespace-delimited word (lowercased, edge punctuation trimmed)
/// adds 1.0 to its seahash slot, and each of its boundary-marked char
/// trigrams adds 0.5, so texts sharing words or word stems score high.
#[derive(Debug, Clone)]
pub struct LexicalHashEncoder {
    dimension: usize,
    id: String,
}

impl LexicalHashEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            id: format!("lexical-hash-v2/{dimension}"),
        }
    }

    fn slot(&self, feature: &str) -> usize {
        (seahash::hash(feature.as_bytes()) % self.dimension as u64) as usize
    }
}

impl Default for LexicalHashEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Encoder for LexicalHashEncoder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Embedding {
        let mut slots = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return Embedding::from_raw(slots);
        }

        let lowered = text.to_lowercase();
        for raw in lowered.split_whitespace() {
            let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
            // punctuation-only words still count, so non-blank text never
            // encodes to the zero vector
            let word = if trimmed.is_empty() { raw } else { trimmed };

            slots[self.slot(word)] += 1.0;

            let marked: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            let mut gram = String::with_capacity(12);
            for window in marked.windows(3) {
                gram.clear();
                gram.extend(window);
                slots[self.slot(&gram)] += TRIGRAM_WEIGHT;
            }
        }

        Embedding::normalized(slots)
    }
}
