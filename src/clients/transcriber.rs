//! Speech-to-text service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

const DEFAULT_AUDIO_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum TranscriberError {
    #[error("Audio body is empty")]
    EmptyAudio,

    #[error("Transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription service returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Audio in, plain text out.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, TranscriberError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// HTTP speech-to-text client.
///
/// Posts the raw audio body with its content type and expects `{"text": ...}`.
#[derive(Debug, Clone)]
pub struct HttpTranscriber {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl HttpTranscriber {
    pub fn new(
        endpoint: Url,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranscriberError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    #[instrument(skip(self, audio), fields(bytes = audio.len(), endpoint = %self.endpoint))]
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, TranscriberError> {
        if audio.is_empty() {
            return Err(TranscriberError::EmptyAudio);
        }

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, content_type.unwrap_or(DEFAULT_AUDIO_TYPE))
            .body(audio);
        if let Some(token) = &self.api_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Transcription service error");
            return Err(TranscriberError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: TranscriptionResponse = response.json().await?;
        let text = body.text.trim().to_string();
        debug!(transcription = %text, "Transcribed audio");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let body: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "  start workout  ", "chunks": []}"#).unwrap();
        assert_eq!(body.text.trim(), "start workout");
    }

    #[tokio::test]
    async fn test_empty_audio_is_rejected_locally() {
        let transcriber = HttpTranscriber::new(
            Url::parse("http://127.0.0.1:9/asr").unwrap(),
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        let err = transcriber.transcribe(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, TranscriberError::EmptyAudio));
    }
}
