//! Startup errors for the voice service.

use coach_intent::{ClassifierError, LexiconError};
use thiserror::Error;

use crate::clients::TranscriberError;
use crate::config::ConfigError;

/// Anything that stops the service from being assembled.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Lexicon rejected: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("Classifier client setup failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Transcriber client setup failed: {0}")]
    Transcriber(#[from] TranscriberError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
