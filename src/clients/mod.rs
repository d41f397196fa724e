//! Clients for the external speech-to-text and zero-shot services.

pub mod classifier;
pub mod transcriber;

pub use classifier::HttpZeroShotClassifier;
pub use transcriber::{HttpTranscriber, Transcriber, TranscriberError};
