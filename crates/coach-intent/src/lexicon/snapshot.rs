//! Lexicon - compiled, immutable vocabulary for the cascade.
//!
//! Built once at startup by [`super::LexiconCompiler`] and shared via
//! `Arc<Lexicon>`. Exact lookups go through hash indexes; every scan that
//! relies on "first match wins" walks an ordered `Vec`.

use std::collections::{HashMap, HashSet};

use crate::normalize::title_case;

/// Phrase-stage category, kept in declaration order.
#[derive(Debug, Clone)]
pub struct PhraseSet {
    pub intent: String,
    pub phrases: Vec<String>,
}

/// Fallback classifier label table.
#[derive(Debug, Clone)]
pub struct FallbackLabels {
    pub context_template: String,
    /// (label, raw intent) in the order offered to the classifier
    pub labels: Vec<(String, String)>,
}

impl FallbackLabels {
    /// Candidate labels in declaration order.
    pub fn candidates(&self) -> Vec<String> {
        self.labels.iter().map(|(label, _)| label.clone()).collect()
    }

    /// Raw intent for a classifier label, if the label is one of ours.
    pub fn intent_for(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, intent)| intent.as_str())
    }

    /// Wrap the transcription in the context template.
    pub fn contextualize(&self, text: &str) -> String {
        self.context_template.replace("{text}", text)
    }
}

/// Compiled lexicon.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// SHA-256 of the YAML source (hex)
    pub hash: String,
    pub version: String,

    // =========================================================================
    // Stage 1: direct token
    // =========================================================================
    pub(crate) single_tokens: Vec<(String, String)>,
    pub(crate) single_token_index: HashMap<String, String>,
    pub(crate) token_entities: HashMap<String, String>,

    // =========================================================================
    // Stages 2-4: ordered scans
    // =========================================================================
    pub(crate) phrase_sets: Vec<PhraseSet>,
    pub(crate) exercise_keywords: Vec<String>,
    pub(crate) keyword_display: HashMap<String, String>,
    pub(crate) mishearings: Vec<(String, String)>,

    // =========================================================================
    // Stage 5: routine request, whole tokens
    // =========================================================================
    pub(crate) routine_starters: HashSet<String>,
    pub(crate) routine_markers: HashSet<String>,

    // =========================================================================
    // Stage 6, canonicalization, entities
    // =========================================================================
    pub(crate) fallback: FallbackLabels,
    pub(crate) intent_synonyms: HashMap<String, String>,
    pub(crate) exercise_phrases: Vec<String>,
    pub(crate) exercise_display: HashMap<String, String>,
    pub(crate) routines: Vec<(String, String)>,
    pub(crate) exercise_vocabulary: Vec<String>,
    pub(crate) routine_codes: Vec<String>,
    pub(crate) high_confidence_tokens: HashSet<String>,
}

impl Lexicon {
    // =========================================================================
    // Stage 1
    // =========================================================================

    /// Raw intent for an exact cleaned transcription.
    pub fn direct_intent(&self, text_clean: &str) -> Option<&str> {
        self.single_token_index.get(text_clean).map(String::as_str)
    }

    /// Exercise display name for an exact cleaned transcription.
    pub fn token_entity(&self, text_clean: &str) -> Option<&str> {
        self.token_entities.get(text_clean).map(String::as_str)
    }

    /// Single-token table in declaration order.
    pub fn single_tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.single_tokens
            .iter()
            .map(|(t, i)| (t.as_str(), i.as_str()))
    }

    // =========================================================================
    // Stages 2-4
    // =========================================================================

    /// First phrase category (in priority order) with a phrase contained in `text_lower`.
    pub fn match_phrase(&self, text_lower: &str) -> Option<(&str, &str)> {
        self.phrase_sets.iter().find_map(|set| {
            set.phrases
                .iter()
                .find(|p| text_lower.contains(p.as_str()))
                .map(|p| (set.intent.as_str(), p.as_str()))
        })
    }

    /// First exercise keyword (in list order) contained in `text_clean`.
    pub fn match_keyword(&self, text_clean: &str) -> Option<&str> {
        self.exercise_keywords
            .iter()
            .find(|k| text_clean.contains(k.as_str()))
            .map(String::as_str)
    }

    /// First mishearing variant contained in `text_clean`, with its keyword.
    pub fn match_mishearing(&self, text_clean: &str) -> Option<(&str, &str)> {
        self.mishearings
            .iter()
            .find(|(variant, _)| text_clean.contains(variant.as_str()))
            .map(|(v, k)| (v.as_str(), k.as_str()))
    }

    /// Display name for an exercise keyword; title-cased when unmapped.
    pub fn keyword_entity(&self, keyword: &str) -> String {
        self.keyword_display
            .get(keyword)
            .cloned()
            .unwrap_or_else(|| title_case(keyword))
    }

    pub fn exercise_keywords(&self) -> &[String] {
        &self.exercise_keywords
    }

    pub fn phrase_sets(&self) -> &[PhraseSet] {
        &self.phrase_sets
    }

    pub fn mishearings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mishearings.iter().map(|(v, k)| (v.as_str(), k.as_str()))
    }

    // =========================================================================
    // Stage 5, canonicalization, entities
    // =========================================================================

    pub fn fallback(&self) -> &FallbackLabels {
        &self.fallback
    }

    /// Canonical raw intent for a synonym, if one is registered.
    pub fn synonym(&self, raw: &str) -> Option<&str> {
        self.intent_synonyms.get(raw).map(String::as_str)
    }

    /// First extended exercise phrase contained in `text_lower`, as a display name.
    pub fn exercise_entity(&self, text_lower: &str) -> Option<String> {
        self.exercise_phrases
            .iter()
            .find(|p| text_lower.contains(p.as_str()))
            .map(|p| self.phrase_display(p))
    }

    /// Display name for an extended exercise phrase; title-cased when unmapped.
    pub(crate) fn phrase_display(&self, phrase: &str) -> String {
        self.exercise_display
            .get(phrase)
            .cloned()
            .unwrap_or_else(|| title_case(phrase))
    }

    // =========================================================================
    // Stage 5
    // =========================================================================

    /// First starter token of a cleaned transcription that also carries a
    /// marker token, as `(starter, marker)`. "start the core routine" matches;
    /// "stop the routine" and "im done with my routine" do not.
    pub fn match_routine_request(&self, text_clean: &str) -> Option<(&str, &str)> {
        let mut tokens = text_clean.split_whitespace();
        let marker = tokens
            .clone()
            .find_map(|t| self.routine_markers.get(t))?;
        let starter = tokens.find_map(|t| self.routine_starters.get(t))?;
        Some((starter.as_str(), marker.as_str()))
    }

    /// First routine phrase contained in `text_lower`, as a routine code.
    pub fn routine_code(&self, text_lower: &str) -> Option<&str> {
        self.routines
            .iter()
            .find(|(phrase, _)| text_lower.contains(phrase.as_str()))
            .map(|(_, code)| code.as_str())
    }

    pub fn is_high_confidence(&self, text_clean: &str) -> bool {
        self.high_confidence_tokens.contains(text_clean)
    }

    pub fn exercise_vocabulary(&self) -> &[String] {
        &self.exercise_vocabulary
    }

    pub fn routine_codes(&self) -> &[String] {
        &self.routine_codes
    }

    /// Whether `entity` belongs to the canonical exercise or routine vocabulary.
    pub fn is_known_entity(&self, entity: &str) -> bool {
        self.exercise_vocabulary.iter().any(|e| e == entity)
            || self.routine_codes.iter().any(|c| c == entity)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexicon::LexiconCompiler;

    #[test]
    fn test_phrase_priority_is_category_order() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        // Contains both a start phrase and a stop phrase; start is checked first.
        let hit = lexicon.match_phrase("stop workout then start workout");
        assert_eq!(hit, Some(("start workout", "start workout")));
    }

    #[test]
    fn test_keyword_scan_uses_list_order() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(lexicon.match_keyword("squat then plank"), Some("plank"));
    }

    #[test]
    fn test_mishearing_lookup() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(lexicon.match_mishearing("clank"), Some(("clank", "plank")));
        assert_eq!(lexicon.match_mishearing("hello there"), None);
    }

    #[test]
    fn test_routine_code_first_phrase_wins() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(
            lexicon.routine_code("start the lower body power routine"),
            Some("lower_body")
        );
        assert_eq!(lexicon.routine_code("start a routine"), None);
    }

    #[test]
    fn test_routine_request_needs_starter_and_marker() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(
            lexicon.match_routine_request("start the core routine"),
            Some(("start", "routine"))
        );
        assert_eq!(
            lexicon.match_routine_request("begin routine for lower body"),
            Some(("begin", "routine"))
        );
        assert_eq!(lexicon.match_routine_request("stop the routine"), None);
        assert_eq!(lexicon.match_routine_request("skip this routine"), None);
        // Whole tokens only: "done" is not "do"
        assert_eq!(lexicon.match_routine_request("im done with my routine"), None);
        assert_eq!(lexicon.match_routine_request("start the workout"), None);
    }

    #[test]
    fn test_fallback_context_template() {
        let lexicon = LexiconCompiler::builtin().unwrap();
        assert_eq!(
            lexicon.fallback().contextualize("hello"),
            "User said: 'hello' during a fitness workout session"
        );
        assert_eq!(
            lexicon.fallback().intent_for("next exercise"),
            Some("skip exercise")
        );
        assert_eq!(lexicon.fallback().intent_for("dance"), None);
    }
}
