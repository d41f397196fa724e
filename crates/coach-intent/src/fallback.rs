//! Semantic fallback - zero-shot classifier adapter.
//!
//! Last stage of the cascade. The adapter offers the lexicon's candidate labels
//! to an external zero-shot classifier, gates the top result on a confidence
//! threshold and maps the label back to a raw intent.
//!
//! Every path out of the adapter is a [`FallbackOutcome`]; only
//! [`FallbackOutcome::Accepted`] carries an intent; all other variants resolve
//! to `UNKNOWN` at the call site.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::lexicon::Lexicon;
use crate::types::{ClassifierError, Intent};

/// Default gate: the top score must be strictly greater than this.
pub const DEFAULT_THRESHOLD: f32 = 0.30;

/// Default bound on a single classifier call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One scored candidate label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// External zero-shot classification capability.
///
/// Implementations return the candidate labels ranked best first, scores in
/// `[0, 1]`. An empty `labels` slice must yield an empty ranking.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// Tagged result of one fallback attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    /// Top label cleared the gate and maps to a known raw intent
    Accepted {
        label: String,
        score: f32,
        raw_intent: String,
    },
    /// Top score at or below the threshold
    LowConfidence { label: String, score: f32 },
    /// Top label is not one of the lexicon's candidate labels
    Unmapped { label: String, score: f32 },
    /// Classifier returned no ranking
    NoCandidates,
    /// Call failed or timed out
    Failed(ClassifierError),
    /// No classifier configured
    Unavailable,
}

impl FallbackOutcome {
    /// Raw intent to feed the canonicalizer.
    pub fn raw_intent(&self) -> &str {
        match self {
            Self::Accepted { raw_intent, .. } => raw_intent,
            _ => Intent::Unknown.phrase(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Fallback gate settings.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub threshold: f32,
    pub timeout: Duration,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Adapter between the cascade and an optional external classifier.
#[derive(Clone)]
pub struct FallbackAdapter {
    classifier: Option<Arc<dyn ZeroShotClassifier>>,
    config: FallbackConfig,
}

impl FallbackAdapter {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>, config: FallbackConfig) -> Self {
        Self {
            classifier: Some(classifier),
            config,
        }
    }

    /// Adapter with no classifier; every attempt is [`FallbackOutcome::Unavailable`].
    pub fn unavailable() -> Self {
        Self {
            classifier: None,
            config: FallbackConfig::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Classify `transcription` against the lexicon's fallback labels.
    pub async fn classify(&self, lexicon: &Lexicon, transcription: &str) -> FallbackOutcome {
        let Some(classifier) = &self.classifier else {
            debug!("No fallback classifier configured");
            return FallbackOutcome::Unavailable;
        };

        let labels = lexicon.fallback().candidates();
        let context = lexicon.fallback().contextualize(transcription);

        let ranked = match tokio::time::timeout(
            self.config.timeout,
            classifier.classify(&context, &labels),
        )
        .await
        {
            Ok(Ok(ranked)) => ranked,
            Ok(Err(e)) => {
                warn!(error = %e, "Fallback classifier failed");
                return FallbackOutcome::Failed(e);
            }
            Err(_) => {
                let e = ClassifierError::Timeout {
                    duration_ms: self.config.timeout.as_millis() as u64,
                };
                warn!(error = %e, "Fallback classifier failed");
                return FallbackOutcome::Failed(e);
            }
        };

        let Some(top) = ranked.into_iter().next() else {
            debug!("Fallback classifier returned no candidates");
            return FallbackOutcome::NoCandidates;
        };

        debug!(label = %top.label, score = top.score, "Fallback classification");

        // NaN never clears the gate.
        if top.score.partial_cmp(&self.config.threshold) != Some(Ordering::Greater) {
            debug!(
                score = top.score,
                threshold = self.config.threshold,
                "Fallback confidence too low"
            );
            return FallbackOutcome::LowConfidence {
                label: top.label,
                score: top.score,
            };
        }

        match lexicon.fallback().intent_for(&top.label) {
            Some(raw_intent) => FallbackOutcome::Accepted {
                raw_intent: raw_intent.to_string(),
                label: top.label,
                score: top.score,
            },
            None => {
                warn!(label = %top.label, "Fallback classifier returned unmapped label");
                FallbackOutcome::Unmapped {
                    label: top.label,
                    score: top.score,
                }
            }
        }
    }
}
