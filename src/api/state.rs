//! Shared application state

use std::sync::Arc;

use coach_intent::CascadeMatcher;

use crate::clients::Transcriber;

/// State shared by the voice routes.
#[derive(Clone)]
pub struct AppState {
    pub matcher: CascadeMatcher,
    pub transcriber: Option<Arc<dyn Transcriber>>,
}

impl AppState {
    pub fn new(matcher: CascadeMatcher) -> Self {
        Self {
            matcher,
            transcriber: None,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Both the transcriber and the zero-shot classifier are configured.
    pub fn speech_ready(&self) -> bool {
        self.transcriber.is_some() && self.matcher.fallback().is_available()
    }
}
