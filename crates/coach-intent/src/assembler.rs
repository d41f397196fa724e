//! Command assembly and the confidence tag.

use crate::lexicon::Lexicon;
use crate::normalize::NormalizedText;
use crate::types::{CommandResult, Confidence, Intent};

/// Confidence tag for a normalized transcription.
///
/// `High` only for the lexicon's bare high-confidence tokens. Everything else,
/// including fallback hits well above the gate, is `Medium`: the tag is a
/// fixed compatibility contract, not a calibrated probability.
pub fn confidence_for(lexicon: &Lexicon, text: &NormalizedText) -> Confidence {
    if lexicon.is_high_confidence(&text.clean) {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

/// Package the final command.
pub fn assemble(
    lexicon: &Lexicon,
    intent: Intent,
    entity: Option<String>,
    transcription: &str,
    text: &NormalizedText,
) -> CommandResult {
    // Entity-bearing intents are the only ones allowed to carry an entity.
    let entity = entity.filter(|_| intent.takes_entity());
    CommandResult {
        intent,
        entity,
        transcription: transcription.to_string(),
        confidence: confidence_for(lexicon, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconCompiler;
    use crate::normalize::normalize;

    #[test]
    fn test_high_confidence_tokens() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        for token in ["start", "stop", "skip", "plank", "squat", "pushup", "bridge"] {
            assert_eq!(
                confidence_for(&lexicon, &normalize(token)),
                Confidence::High,
                "token: {}",
                token
            );
        }
        // Punctuation and case are normalized away first
        assert_eq!(
            confidence_for(&lexicon, &normalize("Stop!")),
            Confidence::High
        );
    }

    #[test]
    fn test_other_tokens_are_medium() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        for text in ["squats", "rest", "start workout", "lunges", "I want to do squats"] {
            assert_eq!(
                confidence_for(&lexicon, &normalize(text)),
                Confidence::Medium,
                "text: {}",
                text
            );
        }
    }

    #[test]
    fn test_assemble_drops_entity_for_plain_intents() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        let text = normalize("skip");
        let result = assemble(
            &lexicon,
            Intent::SkipExercise,
            Some("Plank".to_string()),
            "skip",
            &text,
        );
        assert_eq!(result.entity, None);
        assert_eq!(result.confidence, Confidence::High);
    }
}
