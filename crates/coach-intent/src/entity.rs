//! Entity resolution for exercise switches and routine starts.

use crate::lexicon::Lexicon;
use crate::types::Intent;

/// Resolve the entity for a canonical intent.
///
/// `existing` is whatever the cascade already determined; it is kept as is.
/// Intents other than `SWITCH_EXERCISE` / `START_ROUTINE` never carry an entity.
pub fn resolve_entity(
    lexicon: &Lexicon,
    intent: Intent,
    text_lower: &str,
    existing: Option<String>,
) -> Option<String> {
    if !intent.takes_entity() {
        return None;
    }
    if existing.is_some() {
        return existing;
    }
    match intent {
        Intent::SwitchExercise => lexicon.exercise_entity(text_lower),
        Intent::StartRoutine => lexicon.routine_code(text_lower).map(str::to_string),
        _ => None,
    }
}
