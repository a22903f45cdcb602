//! Relation label semantics.
//!
//! # Responsibility
//! - Resolve a relation label into a strength value and polarity.
//! - Derive a presentation color class from that strength.
//!
//! # Invariants
//! - Resolution order: emoji table, parenthetical suffix, canonical
//!   vocabulary, custom words, integer fallback. First match wins.
//! - Resolution never fails; unknown labels resolve to strength 1, neutral.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*([+-]?)\s*(\d+)\s*\)\s*$").expect("valid parenthetical strength regex")
});

const PARENTHETICAL_MAX: u8 = 10;
const SCALE_MIN: u8 = 1;
const SCALE_MAX: u8 = 9;

/// Signed emoji glyphs, strongest negative to strongest positive.
const SIGNED_EMOJI: &[(&str, i8)] = &[
    ("🟥", -3),
    ("🟧", -2),
    ("🟨", -1),
    ("🟢", 1),
    ("💚", 2),
    ("🟩", 3),
];

/// Unsigned level emoji.
const LEVEL_EMOJI: &[(&str, u8)] = &[("🔹", 1), ("🔷", 2), ("🟦", 3)];

/// Canonical nine-level vocabulary.
const VOCABULARY: &[(&str, u8)] = &[
    ("extremely-high", 9),
    ("very-high", 8),
    ("high", 7),
    ("moderately-high", 6),
    ("medium", 5),
    ("moderately-low", 4),
    ("low", 3),
    ("very-low", 2),
    ("extremely-low", 1),
];

/// Humane synonyms for the nine-level scale.
const CUSTOM_WORDS: &[(&str, u8)] = &[
    ("max", 9),
    ("very high", 8),
    ("high", 7),
    ("above average", 6),
    ("average", 5),
    ("below average", 4),
    ("low", 3),
    ("very low", 2),
    ("min", 1),
];

/// Direction of a relation's influence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// Numeric weight of a relation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strength {
    /// Absolute strength. 1..=9, or up to 10 for explicit parenthetical values.
    pub value: u8,
    pub polarity: Polarity,
}

impl Strength {
    pub fn new(value: u8, polarity: Polarity) -> Self {
        Self { value, polarity }
    }

    fn neutral(value: u8) -> Self {
        Self::new(value, Polarity::Neutral)
    }
}

/// Resolves a relation label to its strength.
pub fn strength_of(label: &str) -> Strength {
    let label = label.trim();
    emoji_strength(label)
        .or_else(|| parenthetical_strength(label))
        .or_else(|| table_strength(VOCABULARY, label))
        .or_else(|| table_strength(CUSTOM_WORDS, label))
        .unwrap_or_else(|| integer_fallback(label))
}

/// Derives the presentation class for a relation label.
///
/// Format: `relation-{polarity}-{bucket}` with `bucket = ceil(value / 2)`,
/// where `value` is clamped to the nine-level scale first.
pub fn color_class_of(label: &str) -> String {
    let strength = strength_of(label);
    let clamped = strength.value.clamp(SCALE_MIN, SCALE_MAX);
    let bucket = clamped.div_ceil(2);
    format!("relation-{}-{bucket}", strength.polarity.as_str())
}

fn emoji_strength(label: &str) -> Option<Strength> {
    for (glyph, value) in SIGNED_EMOJI {
        if label.contains(glyph) {
            let polarity = if *value < 0 {
                Polarity::Negative
            } else {
                Polarity::Positive
            };
            return Some(Strength::new(value.unsigned_abs(), polarity));
        }
    }
    LEVEL_EMOJI
        .iter()
        .find(|(glyph, _)| label.contains(glyph))
        .map(|(_, value)| Strength::neutral(*value))
}

fn parenthetical_strength(label: &str) -> Option<Strength> {
    let caps = PARENTHETICAL_RE.captures(label)?;
    let sign = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let magnitude = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(u64::from(PARENTHETICAL_MAX));
    let polarity = match sign {
        "+" => Polarity::Positive,
        "-" if magnitude != 0 => Polarity::Negative,
        _ => Polarity::Neutral,
    };
    let value = magnitude.clamp(u64::from(SCALE_MIN), u64::from(PARENTHETICAL_MAX)) as u8;
    Some(Strength::new(value, polarity))
}

fn table_strength(table: &[(&str, u8)], label: &str) -> Option<Strength> {
    let normalized = label.to_lowercase();
    table
        .iter()
        .find(|(word, _)| *word == normalized)
        .map(|(_, value)| Strength::neutral(*value))
}

fn integer_fallback(label: &str) -> Strength {
    let value = label
        .parse::<i64>()
        .map(|parsed| parsed.clamp(i64::from(SCALE_MIN), i64::from(SCALE_MAX)) as u8)
        .unwrap_or(SCALE_MIN);
    Strength::neutral(value)
}

#[cfg(test)]
mod tests {
    use super::{color_class_of, strength_of, Polarity, Strength};

    #[test]
    fn vocabulary_is_monotonic() {
        assert_eq!(strength_of("extremely-high").value, 9);
        assert_eq!(strength_of("high").value, 7);
        assert_eq!(strength_of("extremely-low").value, 1);
        assert_eq!(strength_of("High").polarity, Polarity::Neutral);
    }

    #[test]
    fn emoji_wins_over_parenthetical() {
        assert_eq!(
            strength_of("🟩 great (99)"),
            Strength::new(3, Polarity::Positive)
        );
        assert_eq!(strength_of("🟥 blocks"), Strength::new(3, Polarity::Negative));
        assert_eq!(strength_of("🔷"), Strength::new(2, Polarity::Neutral));
    }

    #[test]
    fn parenthetical_sign_sets_polarity_and_clamps() {
        assert_eq!(
            strength_of("supports (+4)"),
            Strength::new(4, Polarity::Positive)
        );
        assert_eq!(
            strength_of("hinders (-2)"),
            Strength::new(2, Polarity::Negative)
        );
        assert_eq!(strength_of("weight (6)"), Strength::new(6, Polarity::Neutral));
        assert_eq!(strength_of("huge (42)").value, 10);
        assert_eq!(strength_of("nothing (0)").value, 1);
    }

    #[test]
    fn custom_words_and_integer_fallback() {
        assert_eq!(strength_of("max").value, 9);
        assert_eq!(strength_of("very high").value, 8);
        assert_eq!(strength_of("below average").value, 4);
        assert_eq!(strength_of("min").value, 1);
        assert_eq!(strength_of("5").value, 5);
        assert_eq!(strength_of("77").value, 9);
        assert_eq!(strength_of("unknown words").value, 1);
        assert_eq!(strength_of("").value, 1);
    }

    #[test]
    fn color_class_buckets_by_half() {
        assert_eq!(color_class_of("extremely-high"), "relation-neutral-5");
        assert_eq!(color_class_of("high"), "relation-neutral-4");
        assert_eq!(color_class_of("🟥"), "relation-negative-2");
        assert_eq!(color_class_of("up (+10)"), "relation-positive-5");
        assert_eq!(color_class_of("garbage"), "relation-neutral-1");
    }
}
