//! Accuracy evaluation over a labelled utterance corpus.
//!
//! A corpus is YAML:
//!
//! ```yaml
//! description: Core command set
//! cases:
//!   - text: "I want to do squats"
//!     expected_intent: SWITCH_EXERCISE
//!     expected_entity: Squat
//! ```
//!
//! Every case runs through the full cascade, including the fallback stage if
//! the matcher has a classifier.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use coach_intent::{CascadeMatcher, CommandResult, Intent, MatchStage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid corpus YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One labelled utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    pub text: String,
    pub expected_intent: Intent,
    #[serde(default)]
    pub expected_entity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCorpus {
    #[serde(default)]
    pub description: Option<String>,
    pub cases: Vec<EvalCase>,
}

impl EvalCorpus {
    pub fn from_yaml_str(content: &str) -> Result<Self, EvaluationError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, EvaluationError> {
        let content = std::fs::read_to_string(path).map_err(|source| EvaluationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Outcome of a single case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub case: EvalCase,
    pub actual: CommandResult,
    pub stage: MatchStage,
    pub intent_correct: bool,
    pub entity_correct: bool,
    pub latency_ms: f64,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.intent_correct && self.entity_correct
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IntentBreakdown {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub mean_ms: f64,
    pub max_ms: f64,
}

/// Aggregate accuracy report.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub timestamp: DateTime<Utc>,
    pub lexicon_hash: String,
    pub total_cases: usize,
    pub intent_correct: usize,
    pub entity_correct: usize,
    pub fully_correct: usize,
    /// Percentages, 0-100
    pub intent_accuracy: f64,
    pub entity_accuracy: f64,
    pub overall_accuracy: f64,
    pub latency: LatencySummary,
    /// Keyed by expected intent wire form
    pub by_intent: BTreeMap<String, IntentBreakdown>,
    /// Stage that decided each case, counted
    pub by_stage: BTreeMap<String, usize>,
    pub failures: Vec<CaseResult>,
}

impl EvaluationReport {
    pub fn is_perfect(&self) -> bool {
        self.failures.is_empty()
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Runs corpus cases through a matcher.
pub struct Evaluator {
    matcher: CascadeMatcher,
}

impl Evaluator {
    pub fn new(matcher: CascadeMatcher) -> Self {
        Self { matcher }
    }

    /// Interpret one case and score it.
    pub async fn run_case(&self, case: &EvalCase) -> CaseResult {
        let started = Instant::now();
        let interpretation = self.matcher.interpret(&case.text).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let actual = interpretation.command;
        let intent_correct = actual.intent == case.expected_intent;
        let entity_correct = actual.entity == case.expected_entity;
        if !(intent_correct && entity_correct) {
            warn!(
                text = %case.text,
                expected = %case.expected_intent,
                actual = %actual.intent,
                stage = %interpretation.stage,
                "Evaluation case failed"
            );
        }

        CaseResult {
            case: case.clone(),
            actual,
            stage: interpretation.stage,
            intent_correct,
            entity_correct,
            latency_ms,
        }
    }

    /// Evaluate cases in order and aggregate the report.
    pub async fn run(&self, cases: &[EvalCase]) -> EvaluationReport {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(self.run_case(case).await);
        }
        let report = self.summarize(results);
        info!(
            total = report.total_cases,
            overall_accuracy = report.overall_accuracy,
            "Evaluation complete"
        );
        report
    }

    fn summarize(&self, results: Vec<CaseResult>) -> EvaluationReport {
        let total = results.len();
        let intent_correct = results.iter().filter(|r| r.intent_correct).count();
        let entity_correct = results.iter().filter(|r| r.entity_correct).count();
        let fully_correct = results.iter().filter(|r| r.passed()).count();

        let latency = if results.is_empty() {
            LatencySummary::default()
        } else {
            let latencies = results.iter().map(|r| r.latency_ms);
            LatencySummary {
                min_ms: latencies.clone().fold(f64::INFINITY, f64::min),
                mean_ms: latencies.clone().sum::<f64>() / total as f64,
                max_ms: latencies.fold(0.0, f64::max),
            }
        };

        let mut by_intent: BTreeMap<String, IntentBreakdown> = BTreeMap::new();
        let mut by_stage: BTreeMap<String, usize> = BTreeMap::new();
        for result in &results {
            let entry = by_intent
                .entry(result.case.expected_intent.as_str().to_string())
                .or_default();
            entry.total += 1;
            if result.passed() {
                entry.correct += 1;
            }
            *by_stage.entry(result.stage.to_string()).or_default() += 1;
        }
        for breakdown in by_intent.values_mut() {
            breakdown.accuracy = percent(breakdown.correct, breakdown.total);
        }

        EvaluationReport {
            timestamp: Utc::now(),
            lexicon_hash: self.matcher.lexicon().hash.clone(),
            total_cases: total,
            intent_correct,
            entity_correct,
            fully_correct,
            intent_accuracy: percent(intent_correct, total),
            entity_accuracy: percent(entity_correct, total),
            overall_accuracy: percent(fully_correct, total),
            latency,
            by_intent,
            by_stage,
            failures: results.into_iter().filter(|r| !r.passed()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_intent::LexiconCompiler;
    use std::sync::Arc;

    fn evaluator() -> Evaluator {
        let lexicon = Arc::new(LexiconCompiler::builtin().unwrap());
        Evaluator::new(CascadeMatcher::new(lexicon))
    }

    fn case(text: &str, intent: Intent, entity: Option<&str>) -> EvalCase {
        EvalCase {
            text: text.to_string(),
            expected_intent: intent,
            expected_entity: entity.map(str::to_string),
        }
    }

    #[test]
    fn test_corpus_parses() {
        let corpus = EvalCorpus::from_yaml_str(
            r#"
cases:
  - text: plank
    expected_intent: SWITCH_EXERCISE
    expected_entity: Plank
  - text: ""
    expected_intent: UNKNOWN
"#,
        )
        .unwrap();
        assert_eq!(corpus.cases.len(), 2);
        assert_eq!(corpus.cases[1].expected_entity, None);
        assert!(EvalCorpus::from_yaml_str("cases: [{text: x, expected_intent: DANCE}]").is_err());
    }

    #[tokio::test]
    async fn test_report_counts_and_percentages() {
        let cases = vec![
            case("plank", Intent::SwitchExercise, Some("Plank")),
            case("stop", Intent::StopWorkout, None),
            // Wrong entity on purpose
            case("squats", Intent::SwitchExercise, Some("Plank")),
            // Wrong intent on purpose
            case("rest", Intent::SkipExercise, None),
        ];
        let report = evaluator().run(&cases).await;

        assert_eq!(report.total_cases, 4);
        assert_eq!(report.intent_correct, 3);
        assert_eq!(report.entity_correct, 3);
        assert_eq!(report.fully_correct, 2);
        assert!((report.overall_accuracy - 50.0).abs() < f64::EPSILON);
        assert!((report.intent_accuracy - 75.0).abs() < f64::EPSILON);
        assert_eq!(report.failures.len(), 2);
        assert!(!report.is_perfect());

        let switch = &report.by_intent["SWITCH_EXERCISE"];
        assert_eq!((switch.total, switch.correct), (2, 1));
        assert_eq!(report.by_stage["direct"], 4);
        assert!(report.latency.min_ms <= report.latency.mean_ms);
        assert!(report.latency.mean_ms <= report.latency.max_ms);
    }

    #[tokio::test]
    async fn test_empty_corpus_report() {
        let report = evaluator().run(&[]).await;
        assert_eq!(report.total_cases, 0);
        assert_eq!(report.overall_accuracy, 0.0);
        assert!(report.is_perfect());
    }

    #[tokio::test]
    async fn test_report_serializes_to_json() {
        let report = evaluator()
            .run(&[case("clank", Intent::SwitchExercise, Some("Plank"))])
            .await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_cases"], 1);
        assert_eq!(json["by_stage"]["mishearing"], 1);
        assert!(json["timestamp"].is_string());
    }
}
