//! Intent canonicalization.
//!
//! Raw intents come from several cascade stages and historically drifted
//! ("begin workout", "move on", "need a break"). They are folded through the
//! lexicon's synonym table, identity when absent, then parsed into [`Intent`].

use tracing::error;

use crate::lexicon::Lexicon;
use crate::types::Intent;

/// Fold a raw intent string into the fixed enumeration.
///
/// Returns `None` only for a lexicon gap, which the compiler rejects at load
/// time; see [`canonicalize_or_unknown`] for the request path.
pub fn canonicalize(lexicon: &Lexicon, raw: &str) -> Option<Intent> {
    let folded = lexicon.synonym(raw).unwrap_or(raw);
    Intent::from_phrase(folded)
}

/// Request-path canonicalization: a gap is logged and rendered as `UNKNOWN`.
pub fn canonicalize_or_unknown(lexicon: &Lexicon, raw: &str) -> Intent {
    canonicalize(lexicon, raw).unwrap_or_else(|| {
        error!(raw_intent = %raw, "Raw intent has no canonical form");
        Intent::Unknown
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconCompiler;

    #[test]
    fn test_canonical_phrases_map_to_themselves() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(
            canonicalize(&lexicon, "start workout"),
            Some(Intent::StartWorkout)
        );
        assert_eq!(
            canonicalize(&lexicon, "switch exercise"),
            Some(Intent::SwitchExercise)
        );
        assert_eq!(canonicalize(&lexicon, "UNKNOWN"), Some(Intent::Unknown));
    }

    #[test]
    fn test_synonyms_fold() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        let cases = [
            ("begin workout", Intent::StartWorkout),
            ("end workout", Intent::StopWorkout),
            ("pass", Intent::SkipExercise),
            ("move on", Intent::SkipExercise),
            ("need a break", Intent::AddRest),
            ("do this exercise", Intent::SwitchExercise),
            ("begin routine", Intent::StartRoutine),
        ];
        for (raw, expected) in cases {
            assert_eq!(canonicalize(&lexicon, raw), Some(expected), "raw: {}", raw);
        }
    }

    #[test]
    fn test_gap_renders_unknown() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(canonicalize(&lexicon, "do a backflip"), None);
        assert_eq!(
            canonicalize_or_unknown(&lexicon, "do a backflip"),
            Intent::Unknown
        );
    }

    /// Every raw intent any stage can emit must fold to a known intent.
    #[test]
    fn test_every_stage_output_is_covered() {
        let lexicon = LexiconCompiler::builtin().unwrap();

        for (token, raw) in lexicon.single_tokens() {
            assert!(
                canonicalize(&lexicon, raw).is_some(),
                "single token '{}' emits uncovered '{}'",
                token,
                raw
            );
        }
        for set in lexicon.phrase_sets() {
            assert!(canonicalize(&lexicon, &set.intent).is_some());
        }
        for (label, raw) in &lexicon.fallback().labels {
            assert!(
                canonicalize(&lexicon, raw).is_some(),
                "fallback label '{}' emits uncovered '{}'",
                label,
                raw
            );
        }
        assert!(canonicalize(&lexicon, Intent::SwitchExercise.phrase()).is_some());
        assert!(canonicalize(&lexicon, Intent::Unknown.phrase()).is_some());
    }
}
