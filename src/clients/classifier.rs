//! Zero-shot classification service client.
//!
//! Speaks the Hugging Face inference shape:
//!
//! ```text
//! POST {"inputs": "...", "parameters": {"candidate_labels": [..]}}
//!  ◄── {"sequence": "...", "labels": [..], "scores": [..]}
//! ```
//!
//! Some deployments wrap the response in a one-element array; both are read.

use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use coach_intent::{ClassifierError, LabelScore, ZeroShotClassifier};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotBody {
    Single(ZeroShotResponse),
    Batch(Vec<ZeroShotResponse>),
}

impl ZeroShotBody {
    fn into_ranking(self) -> Result<Vec<LabelScore>, ClassifierError> {
        let response = match self {
            ZeroShotBody::Single(r) => r,
            ZeroShotBody::Batch(batch) => batch
                .into_iter()
                .next()
                .ok_or_else(|| ClassifierError::Malformed("empty batch".to_string()))?,
        };

        if response.labels.len() != response.scores.len() {
            return Err(ClassifierError::Malformed(format!(
                "{} labels but {} scores",
                response.labels.len(),
                response.scores.len()
            )));
        }

        let mut ranking: Vec<LabelScore> = response
            .labels
            .into_iter()
            .zip(response.scores)
            .map(|(label, score)| LabelScore::new(label, score))
            .collect();
        // Services already rank best first; a stable sort keeps their order on ties.
        ranking.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Ok(ranking)
    }
}

/// HTTP zero-shot classifier.
#[derive(Debug, Clone)]
pub struct HttpZeroShotClassifier {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl HttpZeroShotClassifier {
    /// `timeout` is a transport bound only; the fallback adapter applies its
    /// own, usually tighter, deadline.
    pub fn new(
        endpoint: Url,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
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
impl ZeroShotClassifier for HttpZeroShotClassifier {
    #[instrument(skip(self, labels), fields(endpoint = %self.endpoint, labels = labels.len()))]
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
            },
        };
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: ZeroShotBody = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        let ranking = body.into_ranking()?;
        debug!(top = ?ranking.first(), "Zero-shot ranking");
        Ok(ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let labels = vec!["begin workout".to_string(), "need rest".to_string()];
        let body = ZeroShotRequest {
            inputs: "let's go",
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "let's go");
        assert_eq!(json["parameters"]["candidate_labels"][1], "need rest");
    }

    #[test]
    fn test_single_response_is_ranked() {
        let body: ZeroShotBody = serde_json::from_str(
            r#"{"sequence": "x", "labels": ["need rest", "begin workout"], "scores": [0.2, 0.7]}"#,
        )
        .unwrap();
        let ranking = body.into_ranking().unwrap();
        assert_eq!(ranking[0], LabelScore::new("begin workout", 0.7));
        assert_eq!(ranking[1].label, "need rest");
    }

    #[test]
    fn test_batch_response_uses_first_entry() {
        let body: ZeroShotBody = serde_json::from_str(
            r#"[{"labels": ["end workout"], "scores": [0.9]}]"#,
        )
        .unwrap();
        let ranking = body.into_ranking().unwrap();
        assert_eq!(ranking, vec![LabelScore::new("end workout", 0.9)]);
    }

    #[test]
    fn test_mismatched_lengths_are_malformed() {
        let body: ZeroShotBody =
            serde_json::from_str(r#"{"labels": ["a", "b"], "scores": [0.9]}"#).unwrap();
        assert!(matches!(
            body.into_ranking(),
            Err(ClassifierError::Malformed(_))
        ));

        let body: ZeroShotBody = serde_json::from_str("[]").unwrap();
        assert!(matches!(
            body.into_ranking(),
            Err(ClassifierError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_no_labels_skips_the_request() {
        // Port 9 (discard) is never contacted
        let classifier = HttpZeroShotClassifier::new(
            Url::parse("http://127.0.0.1:9/zero-shot").unwrap(),
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(classifier.classify("hello", &[]).await.unwrap().is_empty());
    }
}
