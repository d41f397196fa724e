//! Text normalization for transcribed utterances.

/// Normalized views of one transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Trimmed and lowercased
    pub lower: String,
    /// `lower` with ASCII punctuation removed
    pub clean: String,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

/// Lowercase and strip punctuation.
///
/// Only ASCII punctuation is removed, so apostrophes vanish ("let's" -> "lets")
/// while hyphens in words such as "bird-dog" are removed from `clean` but kept
/// in `lower`.
pub fn normalize(raw: &str) -> NormalizedText {
    let lower = raw.trim().to_lowercase();
    let clean = lower
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    NormalizedText { lower, clean }
}

/// Title-case each word: the first letter after any non-letter is uppercased.
pub fn title_case(phrase: &str) -> String {
    let mut out = String::with_capacity(phrase.len());
    let mut at_word_start = true;
    for c in phrase.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        let n = normalize("  Start Workout  ");
        assert_eq!(n.lower, "start workout");
        assert_eq!(n.clean, "start workout");
    }

    #[test]
    fn test_normalize_strips_punctuation_from_clean_only() {
        let n = normalize("Plank!");
        assert_eq!(n.lower, "plank!");
        assert_eq!(n.clean, "plank");

        let n = normalize("Let's do bird-dogs.");
        assert_eq!(n.lower, "let's do bird-dogs.");
        assert_eq!(n.clean, "lets do birddogs");
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert!(!normalize("?").is_empty());
        assert_eq!(normalize("?").clean, "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("high knees"), "High Knees");
        assert_eq!(title_case("plank"), "Plank");
        assert_eq!(title_case("bird-dog"), "Bird-Dog");
        assert_eq!(title_case("WALL sit"), "Wall Sit");
    }
}
