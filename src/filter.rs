// Sensibility filter for submitted sentences
//
// Cheap local heuristics that catch keyboard smashing before a remote call is
// spent on it. Every rule runs over the trimmed, lowercased text in one pass.

use crate::constants::{
    FILTER_MAX_VOWELLESS_CONSONANTS, FILTER_MIN_CHARS, FILTER_REPEAT_RUN, FILTER_SYMBOL_RATIO,
};

/// Which heuristic rejected the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    TooShort,
    RepeatedCharacter,
    NoVowels,
    TooManySymbols,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensibility {
    Sensible,
    Nonsensical(FilterRule),
}

impl Sensibility {
    pub fn is_sensible(&self) -> bool {
        matches!(self, Sensibility::Sensible)
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_lowercase() && !is_vowel(c)
}

/// Classify `text` as sensible or nonsensical.
///
/// Rules are checked in order and the first hit wins:
/// - fewer than 3 characters after trimming
/// - any character repeated 4+ times in a row
/// - no vowels at all but more than 3 consonants
/// - more than 40% of characters are neither ASCII letters, digits nor whitespace
pub fn classify(text: &str) -> Sensibility {
    let trimmed = text.trim();

    let mut total = 0usize;
    let mut vowels = 0usize;
    let mut consonants = 0usize;
    let mut symbols = 0usize;
    let mut run_char: Option<char> = None;
    let mut run_len = 0usize;
    let mut repeated = false;

    for raw in trimmed.chars() {
        let c = raw.to_lowercase().next().unwrap_or(raw);
        total += 1;

        if c != '\n' && run_char == Some(c) {
            run_len += 1;
        } else {
            run_char = Some(c);
            run_len = 1;
        }
        if run_len >= FILTER_REPEAT_RUN {
            repeated = true;
        }

        if is_vowel(c) {
            vowels += 1;
        } else if is_consonant(c) {
            consonants += 1;
        } else if !(c.is_ascii_alphanumeric() || c.is_whitespace()) {
            symbols += 1;
        }
    }

    if total < FILTER_MIN_CHARS {
        return Sensibility::Nonsensical(FilterRule::TooShort);
    }
    if repeated {
        return Sensibility::Nonsensical(FilterRule::RepeatedCharacter);
    }
    if vowels == 0 && consonants > FILTER_MAX_VOWELLESS_CONSONANTS {
        return Sensibility::Nonsensical(FilterRule::NoVowels);
    }
    if symbols as f64 / total as f64 > FILTER_SYMBOL_RATIO {
        return Sensibility::Nonsensical(FilterRule::TooManySymbols);
    }
    Sensibility::Sensible
}
