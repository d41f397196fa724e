//! Property tests for the interpretation cascade.
//!
//! Run with: cargo test -p coach-intent --test cascade_properties

use std::sync::Arc;

use async_trait::async_trait;
use coach_intent::{
    normalize, CascadeMatcher, ClassifierError, FallbackAdapter, FallbackConfig, Intent,
    LabelScore, LexiconCompiler, MatchStage, ZeroShotClassifier,
};
use proptest::prelude::*;

/// Deterministic stand-in for the zero-shot model: label and score are a pure
/// function of the input text, so repeated calls agree.
struct DigestClassifier;

#[async_trait]
impl ZeroShotClassifier for DigestClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        let digest: usize = text.bytes().map(usize::from).sum();
        // One extra slot yields a label outside the lexicon.
        let slot = digest % (labels.len() + 1);
        let label = labels
            .get(slot)
            .cloned()
            .unwrap_or_else(|| "dance party".to_string());
        let score = (digest % 100) as f32 / 100.0;
        Ok(vec![LabelScore::new(label, score)])
    }
}

fn matcher() -> CascadeMatcher {
    let lexicon = Arc::new(LexiconCompiler::builtin().expect("builtin lexicon"));
    CascadeMatcher::with_fallback(
        lexicon,
        FallbackAdapter::new(Arc::new(DigestClassifier), FallbackConfig::default()),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("test runtime")
}

/// Words that exercise every stage: commands, exercises, mishearings,
/// routine phrases, filler, and random lowercase noise.
fn utterance() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        prop::sample::select(vec![
            "start", "stop", "skip", "rest", "plank", "squats", "push up", "clank", "lunch",
            "bird dog", "core", "routine", "workout", "next exercise", "take rest", "wall seat",
            "high knees", "legs", "i", "want", "to", "do", "please", "the", "now",
        ])
        .prop_map(str::to_string),
        "[a-z]{1,8}",
        "[A-Za-z!?,.']{1,6}",
    ];
    prop::collection::vec(word, 0..6).prop_map(|words| words.join(" "))
}

/// Connectors that contain no keyword, phrase or mishearing.
fn filler() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["and", "then", "after that", "or maybe", "followed by"])
}

proptest! {
    #[test]
    fn interpretation_is_idempotent(text in utterance()) {
        let rt = runtime();
        let matcher = matcher();
        let first = rt.block_on(matcher.command(&text));
        let second = rt.block_on(matcher.command(&text));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn entity_only_on_entity_intents(text in utterance()) {
        let rt = runtime();
        let matcher = matcher();
        let result = rt.block_on(matcher.command(&text));
        if let Some(entity) = &result.entity {
            prop_assert!(
                matches!(result.intent, Intent::SwitchExercise | Intent::StartRoutine),
                "entity {:?} on {:?}", entity, result.intent
            );
            prop_assert!(
                matcher.lexicon().is_known_entity(entity),
                "entity {:?} outside vocabulary", entity
            );
        }
    }

    #[test]
    fn earlier_keyword_wins(
        (first, second) in (0usize..9, 0usize..9).prop_filter("distinct", |(a, b)| a != b),
        joiner in filler(),
        earlier_last in any::<bool>(),
    ) {
        let matcher = matcher();
        let keywords = matcher.lexicon().exercise_keywords().to_vec();
        let (early, late) = if first < second { (first, second) } else { (second, first) };
        let text = if earlier_last {
            format!("{} {} {}", keywords[late], joiner, keywords[early])
        } else {
            format!("{} {} {}", keywords[early], joiner, keywords[late])
        };

        let hit = matcher
            .match_lexical(&normalize(&text))
            .expect("two keywords must match lexically");
        prop_assert_eq!(hit.stage, MatchStage::Keyword);
        prop_assert_eq!(&hit.matched, &keywords[early]);
        prop_assert_eq!(hit.entity, Some(matcher.lexicon().keyword_entity(&keywords[early])));
    }

    #[test]
    fn empty_or_blank_is_unknown(spaces in " {0,8}") {
        let rt = runtime();
        let result = rt.block_on(matcher().command(&spaces));
        prop_assert_eq!(result.intent, Intent::Unknown);
        prop_assert_eq!(result.entity, None);
        prop_assert_eq!(result.transcription, "");
    }
}

#[test]
fn keyword_list_has_nine_entries() {
    // earlier_keyword_wins indexes the builtin list directly
    assert_eq!(matcher().lexicon().exercise_keywords().len(), 9);
}
