//! Workout Voice Command Interpreter
//!
//! Turns a transcribed utterance into a structured command: a canonical intent
//! plus an optional exercise or routine entity.
//!
//! # Architecture
//!
//! ```text
//! Transcription
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Normalizer                             │
//! │  "Plank!" → lower "plank!", clean "plank"│
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Cascade (first hit wins)               │
//! │  1. direct token    "plank"             │
//! │  2. phrase          "...next exercise..."│
//! │  3. keyword         "...squats..."      │
//! │  4. mishearing      "clank" → plank     │
//! │  5. routine         "start ... routine" │
//! └─────────────────────────────────────────┘
//!       │ miss
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Zero-shot fallback (score > 0.30)      │
//! │  timeout / error / low score → UNKNOWN  │
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//!  Canonicalize → Resolve entity → CommandResult
//! ```

pub mod assembler;
pub mod canonical;
pub mod cascade;
pub mod entity;
pub mod fallback;
pub mod lexicon;
pub mod normalize;
pub mod types;

pub use cascade::{CascadeMatcher, LexicalMatch};
pub use fallback::{
    FallbackAdapter, FallbackConfig, FallbackOutcome, LabelScore, ZeroShotClassifier,
};
pub use lexicon::{Lexicon, LexiconCompiler};
pub use normalize::{normalize, NormalizedText};
pub use types::*;
