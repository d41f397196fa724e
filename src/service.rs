//! Assemble the matcher and service clients from configuration.

use std::sync::Arc;

use coach_intent::{CascadeMatcher, FallbackAdapter, ZeroShotClassifier};
use tracing::{info, warn};

use crate::clients::{HttpTranscriber, HttpZeroShotClassifier, Transcriber};
use crate::config::AppConfig;
use crate::error::ServiceResult;

/// Lexicon plus, when configured, the HTTP zero-shot classifier.
pub fn build_matcher(config: &AppConfig) -> ServiceResult<CascadeMatcher> {
    let lexicon = Arc::new(config.load_lexicon()?);
    info!(
        version = %lexicon.version,
        hash = %lexicon.hash,
        "Lexicon loaded"
    );

    let fallback = match &config.classifier_url {
        Some(url) => {
            let classifier: Arc<dyn ZeroShotClassifier> = Arc::new(HttpZeroShotClassifier::new(
                url.clone(),
                config.api_token.clone(),
                config.http_timeout,
            )?);
            info!(endpoint = %url, threshold = config.fallback.threshold, "Zero-shot fallback enabled");
            FallbackAdapter::new(classifier, config.fallback.clone())
        }
        None => {
            warn!("COACH_CLASSIFIER_URL not set, fallback stage disabled");
            FallbackAdapter::unavailable()
        }
    };

    Ok(CascadeMatcher::with_fallback(lexicon, fallback))
}

/// The HTTP speech-to-text client, if an endpoint is configured.
pub fn build_transcriber(config: &AppConfig) -> ServiceResult<Option<Arc<dyn Transcriber>>> {
    match &config.stt_url {
        Some(url) => {
            let transcriber =
                HttpTranscriber::new(url.clone(), config.api_token.clone(), config.http_timeout)?;
            info!(endpoint = %url, "Speech-to-text client enabled");
            Ok(Some(Arc::new(transcriber)))
        }
        None => {
            warn!("COACH_STT_URL not set, /api/speech will answer 503");
            Ok(None)
        }
    }
}
