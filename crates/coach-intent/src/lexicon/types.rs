//! Lexicon source types, as written in `lexicon.yaml`.
//!
//! Tables are sequences rather than maps so that declaration order survives
//! parsing; the scans in the cascade depend on it.

use serde::{Deserialize, Serialize};

/// Root of a lexicon YAML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconSource {
    pub version: String,
    pub exercise_vocabulary: Vec<String>,
    pub routine_codes: Vec<String>,
    pub single_tokens: Vec<TokenIntent>,
    #[serde(default)]
    pub token_entities: Vec<TokenEntity>,
    #[serde(default)]
    pub phrases: Vec<PhraseCategory>,
    pub exercise_keywords: Vec<String>,
    #[serde(default)]
    pub keyword_display_names: Vec<KeywordEntity>,
    #[serde(default)]
    pub mishearings: Vec<Mishearing>,
    pub fallback: FallbackSource,
    #[serde(default)]
    pub intent_synonyms: Vec<IntentSynonym>,
    #[serde(default)]
    pub exercise_phrases: Vec<String>,
    #[serde(default)]
    pub exercise_display_names: Vec<PhraseEntity>,
    #[serde(default)]
    pub routines: Vec<RoutinePhrase>,
    #[serde(default)]
    pub routine_requests: RoutineRequestSource,
    #[serde(default)]
    pub high_confidence_tokens: Vec<String>,
}

/// Exact token → raw intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIntent {
    pub token: String,
    pub intent: String,
}

/// Exact token → exercise display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntity {
    pub token: String,
    pub entity: String,
}

/// One phrase-stage category: any contained phrase selects `intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseCategory {
    pub intent: String,
    pub phrases: Vec<String>,
}

/// Exercise keyword → display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntity {
    pub keyword: String,
    pub entity: String,
}

/// Misrecognized surface form → the exercise keyword it stands for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mishearing {
    pub variant: String,
    pub keyword: String,
}

/// Zero-shot fallback label set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSource {
    /// Wrapper for the utterance; `{text}` is replaced with the transcription
    #[serde(default = "default_context_template")]
    pub context_template: String,
    #[serde(default)]
    pub labels: Vec<FallbackLabel>,
}

fn default_context_template() -> String {
    "{text}".to_string()
}

/// Candidate label offered to the classifier and the raw intent it maps to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackLabel {
    pub label: String,
    pub intent: String,
}

/// Raw intent synonym → canonical raw intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSynonym {
    pub raw: String,
    pub canonical: String,
}

/// Extended exercise phrase → display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseEntity {
    pub phrase: String,
    pub entity: String,
}

/// Routine phrase → routine code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutinePhrase {
    pub phrase: String,
    pub code: String,
}

/// Words that together ask for a routine: a starter word and a marker word,
/// both matched as whole tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutineRequestSource {
    #[serde(default)]
    pub starters: Vec<String>,
    #[serde(default)]
    pub markers: Vec<String>,
}
