//! Cascade matcher - the main entry point for command interpretation.
//!
//! Stages run cheapest first and stop at the first hit:
//!
//! 1. Direct token: exact lookup of the cleaned text
//! 2. Phrase: curated phrases contained in the lowercased text
//! 3. Keyword: exercise keywords contained in the cleaned text
//! 4. Mishearing: garbled variants contained in the cleaned text
//! 5. Routine: a starter word plus a routine marker word ("start the core routine")
//! 6. Fallback: zero-shot classifier behind a confidence gate
//!
//! The raw intent is then canonicalized, the entity resolved, and the
//! command assembled. Interpretation never fails for any input.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::assembler::assemble;
use crate::canonical::{canonicalize, canonicalize_or_unknown};
use crate::entity::resolve_entity;
use crate::fallback::{FallbackAdapter, FallbackOutcome};
use crate::lexicon::Lexicon;
use crate::normalize::{normalize, NormalizedText};
use crate::types::{CommandResult, Intent, Interpretation, MatchStage};

/// Outcome of the lexical stages (1-5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalMatch {
    pub raw_intent: String,
    pub entity: Option<String>,
    pub stage: MatchStage,
    /// Surface form that triggered the match
    pub matched: String,
}

/// Cascade matcher for workout voice commands.
///
/// Cheap to clone; the lexicon and classifier are shared.
#[derive(Clone)]
pub struct CascadeMatcher {
    lexicon: Arc<Lexicon>,
    fallback: FallbackAdapter,
}

impl CascadeMatcher {
    /// Matcher without a fallback classifier.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self::with_fallback(lexicon, FallbackAdapter::unavailable())
    }

    pub fn with_fallback(lexicon: Arc<Lexicon>, fallback: FallbackAdapter) -> Self {
        Self { lexicon, fallback }
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn fallback(&self) -> &FallbackAdapter {
        &self.fallback
    }

    /// Interpret a transcription into a command.
    pub async fn command(&self, transcription: &str) -> CommandResult {
        self.interpret(transcription).await.command
    }

    /// Interpret a transcription, keeping the stage and raw intent.
    #[instrument(skip(self), fields(transcription = %transcription))]
    pub async fn interpret(&self, transcription: &str) -> Interpretation {
        let transcription = transcription.trim();
        let text = normalize(transcription);

        if text.is_empty() {
            debug!("Empty transcription");
            return Interpretation {
                command: CommandResult::empty(),
                stage: MatchStage::Empty,
                raw_intent: Intent::Unknown.phrase().to_string(),
            };
        }

        debug!(lower = %text.lower, clean = %text.clean, "Normalized transcription");

        let (raw_intent, entity, stage) = match self.match_lexical(&text) {
            Some(hit) => (hit.raw_intent, hit.entity, hit.stage),
            None => {
                let outcome = self.fallback.classify(&self.lexicon, transcription).await;
                if let FallbackOutcome::Accepted { label, score, .. } = &outcome {
                    debug!(label = %label, score = *score, "Fallback accepted");
                }
                (
                    outcome.raw_intent().to_string(),
                    None,
                    MatchStage::Fallback,
                )
            }
        };

        let intent = canonicalize_or_unknown(&self.lexicon, &raw_intent);
        let entity = resolve_entity(&self.lexicon, intent, &text.lower, entity);
        let command = assemble(&self.lexicon, intent, entity, transcription, &text);

        info!(
            intent = %command.intent,
            entity = ?command.entity,
            stage = %stage,
            raw_intent = %raw_intent,
            "Interpreted voice command"
        );

        Interpretation {
            command,
            stage,
            raw_intent,
        }
    }

    /// Run stages 1-5. `None` means the fallback stage is needed.
    pub fn match_lexical(&self, text: &NormalizedText) -> Option<LexicalMatch> {
        self.match_direct(text)
            .or_else(|| self.match_phrase(text))
            .or_else(|| self.match_keyword(text))
            .or_else(|| self.match_mishearing(text))
            .or_else(|| self.match_routine(text))
    }

    fn match_direct(&self, text: &NormalizedText) -> Option<LexicalMatch> {
        let raw_intent = self.lexicon.direct_intent(&text.clean)?;
        let entity = if canonicalize(&self.lexicon, raw_intent) == Some(Intent::SwitchExercise) {
            self.lexicon.token_entity(&text.clean).map(str::to_string)
        } else {
            None
        };
        debug!(token = %text.clean, raw_intent, entity = ?entity, "Direct match");
        Some(LexicalMatch {
            raw_intent: raw_intent.to_string(),
            entity,
            stage: MatchStage::Direct,
            matched: text.clean.clone(),
        })
    }

    fn match_phrase(&self, text: &NormalizedText) -> Option<LexicalMatch> {
        let (raw_intent, phrase) = self.lexicon.match_phrase(&text.lower)?;
        debug!(phrase, raw_intent, "Phrase match");
        Some(LexicalMatch {
            raw_intent: raw_intent.to_string(),
            entity: None,
            stage: MatchStage::Phrase,
            matched: phrase.to_string(),
        })
    }

    fn match_keyword(&self, text: &NormalizedText) -> Option<LexicalMatch> {
        let keyword = self.lexicon.match_keyword(&text.clean)?;
        let entity = self.lexicon.keyword_entity(keyword);
        debug!(keyword, entity = %entity, "Exercise keyword match");
        Some(LexicalMatch {
            raw_intent: Intent::SwitchExercise.phrase().to_string(),
            entity: Some(entity),
            stage: MatchStage::Keyword,
            matched: keyword.to_string(),
        })
    }

    fn match_mishearing(&self, text: &NormalizedText) -> Option<LexicalMatch> {
        let (variant, keyword) = self.lexicon.match_mishearing(&text.clean)?;
        let entity = self.lexicon.keyword_entity(keyword);
        debug!(variant, keyword, entity = %entity, "Exercise mishearing corrected");
        Some(LexicalMatch {
            raw_intent: Intent::SwitchExercise.phrase().to_string(),
            entity: Some(entity),
            stage: MatchStage::Mishearing,
            matched: variant.to_string(),
        })
    }

    // Runs after every exercise stage so "plank routine" stays an exercise switch.
    fn match_routine(&self, text: &NormalizedText) -> Option<LexicalMatch> {
        let (starter, marker) = self.lexicon.match_routine_request(&text.clean)?;
        debug!(starter, marker, "Routine request");
        Some(LexicalMatch {
            raw_intent: Intent::StartRoutine.phrase().to_string(),
            entity: None,
            stage: MatchStage::Routine,
            matched: format!("{} {}", starter, marker),
        })
    }
}
