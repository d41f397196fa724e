//! Voice command service for the workout coach.
//!
//! Wraps the [`coach_intent`] cascade with the pieces a deployment needs:
//! environment configuration, clients for the speech-to-text and zero-shot
//! classification services, an axum HTTP surface (feature `server`) and an
//! accuracy evaluation harness.

pub mod clients;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod service;

#[cfg(feature = "server")]
pub mod api;

pub use config::{AppConfig, ConfigError};
pub use error::{ServiceError, ServiceResult};
pub use evaluation::{EvalCase, EvalCorpus, EvaluationReport, Evaluator};
