//! Workout command lexicon.
//!
//! ```text
//! lexicon.yaml ──► LexiconCompiler ──► Lexicon (Arc, read-only)
//!                    │ parse             │ exact indexes
//!                    │ validate          │ ordered scan tables
//!                    │ hash              │
//! ```

mod compiler;
mod snapshot;
pub mod types;

pub use compiler::{LexiconCompiler, BUILTIN_LEXICON};
pub use snapshot::{FallbackLabels, Lexicon, PhraseSet};
