//! LexiconCompiler - build and validate a [`Lexicon`] from YAML.
//!
//! ## Build Process
//!
//! 1. Parse the YAML source into [`LexiconSource`]
//! 2. Audit every raw intent and entity the tables can emit
//! 3. Build exact-lookup indexes, keep scan tables ordered
//! 4. Hash the source for version tracking
//!
//! Validation failures are fatal: a lexicon that could emit an intent the
//! canonicalizer cannot fold, or an entity outside the vocabulary, is a
//! configuration bug and must not reach request handling.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::snapshot::{FallbackLabels, Lexicon, PhraseSet};
use super::types::*;
use crate::normalize::title_case;
use crate::types::{Intent, LexiconError};

/// Lexicon shipped with the crate.
pub const BUILTIN_LEXICON: &str = include_str!("../../config/lexicon.yaml");

/// Compiler for building a [`Lexicon`] from YAML.
pub struct LexiconCompiler;

impl LexiconCompiler {
    /// Compile the built-in lexicon.
    pub fn builtin() -> Result<Lexicon, LexiconError> {
        Self::from_yaml_str(BUILTIN_LEXICON)
    }

    /// Compile a lexicon file.
    pub fn from_path(path: &Path) -> Result<Lexicon, LexiconError> {
        let content = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let lexicon = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            hash = %lexicon.hash,
            "Loaded lexicon"
        );
        Ok(lexicon)
    }

    /// Compile a lexicon from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Lexicon, LexiconError> {
        let source: LexiconSource = serde_yaml::from_str(content)?;
        let hash = hex::encode(Sha256::digest(content.as_bytes()));
        Self::compile(source, hash)
    }

    /// Validate and index a parsed source.
    pub fn compile(source: LexiconSource, hash: String) -> Result<Lexicon, LexiconError> {
        require_non_empty(&source.single_tokens, "single_tokens")?;
        require_non_empty(&source.exercise_keywords, "exercise_keywords")?;
        require_non_empty(&source.exercise_vocabulary, "exercise_vocabulary")?;

        let synonyms = index_unique(
            source
                .intent_synonyms
                .iter()
                .map(|s| (s.raw.clone(), s.canonical.clone())),
            "intent_synonyms",
        )?;

        // Synonym targets must already be canonical.
        for target in synonyms.values() {
            if Intent::from_phrase(target).is_none() {
                return Err(LexiconError::UncoveredIntent {
                    raw: target.clone(),
                    table: "intent_synonyms",
                });
            }
        }

        let covers = |raw: &str| {
            let folded = synonyms.get(raw).map(String::as_str).unwrap_or(raw);
            Intent::from_phrase(folded).is_some()
        };

        let single_tokens: Vec<(String, String)> = source
            .single_tokens
            .iter()
            .map(|t| (t.token.clone(), t.intent.clone()))
            .collect();
        for (_, intent) in &single_tokens {
            if !covers(intent) {
                return Err(LexiconError::UncoveredIntent {
                    raw: intent.clone(),
                    table: "single_tokens",
                });
            }
        }
        let single_token_index = index_unique(single_tokens.iter().cloned(), "single_tokens")?;

        for set in &source.phrases {
            if !covers(&set.intent) {
                return Err(LexiconError::UncoveredIntent {
                    raw: set.intent.clone(),
                    table: "phrases",
                });
            }
        }
        let phrase_sets = source
            .phrases
            .iter()
            .map(|p| PhraseSet {
                intent: p.intent.clone(),
                phrases: p.phrases.clone(),
            })
            .collect();

        for label in &source.fallback.labels {
            if !covers(&label.intent) {
                return Err(LexiconError::UncoveredIntent {
                    raw: label.intent.clone(),
                    table: "fallback.labels",
                });
            }
        }
        let fallback = FallbackLabels {
            context_template: source.fallback.context_template.clone(),
            labels: source
                .fallback
                .labels
                .iter()
                .map(|l| (l.label.clone(), l.intent.clone()))
                .collect(),
        };

        let vocabulary: HashSet<&str> = source
            .exercise_vocabulary
            .iter()
            .map(String::as_str)
            .collect();
        let routine_codes: HashSet<&str> =
            source.routine_codes.iter().map(String::as_str).collect();

        let check_exercise = |entity: &str, table: &'static str| {
            if vocabulary.contains(entity) {
                Ok(())
            } else {
                Err(LexiconError::UnknownEntity {
                    entity: entity.to_string(),
                    table,
                })
            }
        };

        let token_entities = index_unique(
            source
                .token_entities
                .iter()
                .map(|t| (t.token.clone(), t.entity.clone())),
            "token_entities",
        )?;
        for entity in token_entities.values() {
            check_exercise(entity, "token_entities")?;
        }

        let exercise_keywords = source.exercise_keywords.clone();
        let keyword_set = unique_set(&exercise_keywords, "exercise_keywords")?;
        let keyword_display = index_unique(
            source
                .keyword_display_names
                .iter()
                .map(|k| (k.keyword.clone(), k.entity.clone())),
            "keyword_display_names",
        )?;
        for keyword in &exercise_keywords {
            let display = keyword_display
                .get(keyword)
                .cloned()
                .unwrap_or_else(|| title_case(keyword));
            check_exercise(&display, "exercise_keywords")?;
        }

        let mishearings: Vec<(String, String)> = source
            .mishearings
            .iter()
            .map(|m| (m.variant.clone(), m.keyword.clone()))
            .collect();
        let mut seen_variants = HashSet::new();
        for (variant, keyword) in &mishearings {
            if !seen_variants.insert(variant.as_str()) {
                return Err(LexiconError::Duplicate {
                    key: variant.clone(),
                    table: "mishearings",
                });
            }
            if !keyword_set.contains(keyword.as_str()) {
                return Err(LexiconError::DanglingMishearing {
                    variant: variant.clone(),
                    keyword: keyword.clone(),
                });
            }
        }

        let exercise_display = index_unique(
            source
                .exercise_display_names
                .iter()
                .map(|p| (p.phrase.clone(), p.entity.clone())),
            "exercise_display_names",
        )?;
        for phrase in &source.exercise_phrases {
            let display = exercise_display
                .get(phrase)
                .cloned()
                .unwrap_or_else(|| title_case(phrase));
            check_exercise(&display, "exercise_phrases")?;
        }

        let routines: Vec<(String, String)> = source
            .routines
            .iter()
            .map(|r| (r.phrase.clone(), r.code.clone()))
            .collect();
        for (_, code) in &routines {
            if !routine_codes.contains(code.as_str()) {
                return Err(LexiconError::UnknownEntity {
                    entity: code.clone(),
                    table: "routines",
                });
            }
        }

        let routine_starters: HashSet<String> = unique_set(
            &source.routine_requests.starters,
            "routine_requests.starters",
        )?
        .into_iter()
        .map(str::to_string)
        .collect();
        let routine_markers: HashSet<String> = unique_set(
            &source.routine_requests.markers,
            "routine_requests.markers",
        )?
        .into_iter()
        .map(str::to_string)
        .collect();
        for word in routine_starters.iter().chain(&routine_markers) {
            if word.split_whitespace().count() != 1 {
                return Err(LexiconError::MultiWordToken {
                    token: word.clone(),
                    table: "routine_requests",
                });
            }
        }

        Ok(Lexicon {
            hash,
            version: source.version,
            single_tokens,
            single_token_index,
            token_entities,
            phrase_sets,
            exercise_keywords,
            keyword_display,
            mishearings,
            routine_starters,
            routine_markers,
            fallback,
            intent_synonyms: synonyms,
            exercise_phrases: source.exercise_phrases,
            exercise_display,
            routines,
            exercise_vocabulary: source.exercise_vocabulary,
            routine_codes: source.routine_codes,
            high_confidence_tokens: source.high_confidence_tokens.into_iter().collect(),
        })
    }
}

fn require_non_empty<T>(items: &[T], table: &'static str) -> Result<(), LexiconError> {
    if items.is_empty() {
        Err(LexiconError::EmptyTable { table })
    } else {
        Ok(())
    }
}

/// Build a lookup index, rejecting duplicate keys.
fn index_unique(
    pairs: impl Iterator<Item = (String, String)>,
    table: &'static str,
) -> Result<HashMap<String, String>, LexiconError> {
    let mut index = HashMap::new();
    for (key, value) in pairs {
        if index.contains_key(&key) {
            return Err(LexiconError::Duplicate { key, table });
        }
        index.insert(key, value);
    }
    Ok(index)
}

fn unique_set<'a>(
    items: &'a [String],
    table: &'static str,
) -> Result<HashSet<&'a str>, LexiconError> {
    let mut set = HashSet::new();
    for item in items {
        if !set.insert(item.as_str()) {
            return Err(LexiconError::Duplicate {
                key: item.clone(),
                table,
            });
        }
    }
    Ok(set)
}
