//! Shared types for voice command interpretation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Intent
// =============================================================================

/// Canonical action requested by an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    StartWorkout,
    StopWorkout,
    SwitchExercise,
    SkipExercise,
    AddRest,
    StartRoutine,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::StartWorkout,
        Intent::StopWorkout,
        Intent::SwitchExercise,
        Intent::SkipExercise,
        Intent::AddRest,
        Intent::StartRoutine,
        Intent::Unknown,
    ];

    /// Wire form, e.g. `SWITCH_EXERCISE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartWorkout => "START_WORKOUT",
            Self::StopWorkout => "STOP_WORKOUT",
            Self::SwitchExercise => "SWITCH_EXERCISE",
            Self::SkipExercise => "SKIP_EXERCISE",
            Self::AddRest => "ADD_REST",
            Self::StartRoutine => "START_ROUTINE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Raw phrase form used inside the lexicon, e.g. `switch exercise`.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::StartWorkout => "start workout",
            Self::StopWorkout => "stop workout",
            Self::SwitchExercise => "switch exercise",
            Self::SkipExercise => "skip exercise",
            Self::AddRest => "add rest",
            Self::StartRoutine => "start routine",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a canonical raw phrase (`"add rest"`) or wire form (`"ADD_REST"`).
    ///
    /// Synonyms are NOT resolved here; that is the canonicalizer's job.
    pub fn from_phrase(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_uppercase().replace(' ', "_");
        Self::ALL.into_iter().find(|i| i.as_str() == folded)
    }

    /// Whether results with this intent may carry an entity.
    pub fn takes_entity(&self) -> bool {
        matches!(self, Self::SwitchExercise | Self::StartRoutine)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_phrase(s).ok_or_else(|| format!("unknown intent: {}", s))
    }
}

// =============================================================================
// Command result
// =============================================================================

/// Coarse confidence tag attached to every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

/// Final structured voice command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub intent: Intent,
    pub entity: Option<String>,
    pub transcription: String,
    pub confidence: Confidence,
}

impl CommandResult {
    /// Result for an empty transcription.
    pub fn empty() -> Self {
        Self {
            intent: Intent::Unknown,
            entity: None,
            transcription: String::new(),
            confidence: Confidence::Medium,
        }
    }
}

/// Cascade stage that decided the raw intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Empty,
    Direct,
    Phrase,
    Keyword,
    Mishearing,
    Routine,
    Fallback,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Direct => "direct",
            Self::Phrase => "phrase",
            Self::Keyword => "keyword",
            Self::Mishearing => "mishearing",
            Self::Routine => "routine",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// A command plus how it was reached. Used for logging and evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub command: CommandResult,
    pub stage: MatchStage,
    /// Raw intent string before canonicalization
    pub raw_intent: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Lexicon load and validation errors. Any of these aborts startup.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Failed to read lexicon from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse lexicon: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Intent '{raw}' from {table} does not canonicalize to a known intent")]
    UncoveredIntent { raw: String, table: &'static str },

    #[error("Entity '{entity}' from {table} is not in the canonical vocabulary")]
    UnknownEntity { entity: String, table: &'static str },

    #[error("Mishearing '{variant}' points at '{keyword}', which is not an exercise keyword")]
    DanglingMishearing { variant: String, keyword: String },

    #[error("Duplicate entry '{key}' in {table}")]
    Duplicate { key: String, table: &'static str },

    #[error("'{token}' in {table} must be a single word")]
    MultiWordToken { token: String, table: &'static str },

    #[error("Lexicon table {table} is empty")]
    EmptyTable { table: &'static str },
}

/// Errors from the external zero-shot classifier.
///
/// These never escape the cascade; the fallback adapter folds them into
/// [`crate::FallbackOutcome::Failed`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Classifier timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Classifier transport error: {0}")]
    Transport(String),

    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    #[error("Classifier returned status {status}: {message}")]
    Status { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_phrase_accepts_both_forms() {
        assert_eq!(Intent::from_phrase("add rest"), Some(Intent::AddRest));
        assert_eq!(Intent::from_phrase("ADD_REST"), Some(Intent::AddRest));
        assert_eq!(Intent::from_phrase("UNKNOWN"), Some(Intent::Unknown));
        assert_eq!(Intent::from_phrase("need a break"), None);
    }

    #[test]
    fn test_phrase_round_trips_for_every_intent() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_phrase(intent.phrase()), Some(intent));
        }
    }

    #[test]
    fn test_command_result_wire_format() {
        let result = CommandResult {
            intent: Intent::SwitchExercise,
            entity: Some("Plank".to_string()),
            transcription: "plank".to_string(),
            confidence: Confidence::High,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "intent": "SWITCH_EXERCISE",
                "entity": "Plank",
                "transcription": "plank",
                "confidence": "high"
            })
        );
    }

    #[test]
    fn test_empty_result_serializes_null_entity() {
        let json = serde_json::to_value(CommandResult::empty()).unwrap();
        assert_eq!(json["entity"], serde_json::Value::Null);
        assert_eq!(json["intent"], "UNKNOWN");
        assert_eq!(json["confidence"], "medium");
    }
}
