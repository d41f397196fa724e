//! Voice command endpoints
//!
//! ```text
//! audio ──► /api/speech ──► Transcriber ──┐
//!                                         ├──► CascadeMatcher ──► CommandResult
//! text  ──► /api/interpret ───────────────┘
//! ```

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use coach_intent::CommandResult;
use serde::{Deserialize, Serialize};
use tracing::{error, info, Instrument};
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub lexicon_version: String,
    pub lexicon_hash: String,
    /// Speech-to-text client configured
    pub transcriber: bool,
    /// Zero-shot classifier configured
    pub classifier: bool,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let lexicon = state.matcher.lexicon();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        lexicon_version: lexicon.version.clone(),
        lexicon_hash: lexicon.hash.clone(),
        transcriber: state.transcriber.is_some(),
        classifier: state.matcher.fallback().is_available(),
    })
}

/// Request body for text interpretation
#[derive(Debug, Deserialize)]
pub struct InterpretRequest {
    /// Transcribed utterance; missing is treated as empty
    #[serde(default)]
    pub text: String,
}

/// POST /api/interpret
///
/// Runs an already-transcribed utterance through the cascade. Works without a
/// classifier; the fallback stage then yields `UNKNOWN`.
pub async fn interpret(
    State(state): State<AppState>,
    Json(request): Json<InterpretRequest>,
) -> Json<CommandResult> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("interpret", %request_id);
    let command = state.matcher.command(&request.text).instrument(span).await;
    Json(command)
}

/// POST /api/speech
///
/// Raw audio body, forwarded to the speech-to-text service with the request's
/// content type. Answers 503 until both upstream services are configured.
pub async fn speech(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CommandResult>, ApiError> {
    let request_id = Uuid::new_v4();

    let transcriber = match (&state.transcriber, state.speech_ready()) {
        (Some(transcriber), true) => transcriber.clone(),
        _ => {
            return Err(ApiError::Unavailable(
                "Speech models are not configured".to_string(),
            ))
        }
    };

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let span = tracing::info_span!("speech", %request_id, bytes = body.len());
    async move {
        let transcription = transcriber
            .transcribe(body.to_vec(), content_type)
            .await
            .map_err(|e| {
                error!("Transcription failed: {}", e);
                ApiError::from(e)
            })?;
        info!(transcription = %transcription, "Transcribed");

        Ok(Json(state.matcher.command(&transcription).await))
    }
    .instrument(span)
    .await
}
