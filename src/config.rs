//! Service configuration from the environment.
//!
//! Every setting has a default so the service starts with nothing configured;
//! in that state `/api/interpret` works with lexical matching only and
//! `/api/speech` answers 503.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use coach_intent::{FallbackConfig, Lexicon, LexiconCompiler, LexiconError};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:3001,http://localhost:3003";
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Configuration errors. Any of these aborts startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Runtime configuration for the voice command service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Lexicon override; the built-in lexicon is used when unset
    pub lexicon_path: Option<PathBuf>,
    /// Speech-to-text service endpoint
    pub stt_url: Option<Url>,
    /// Zero-shot classification service endpoint
    pub classifier_url: Option<Url>,
    /// Bearer token sent to both services
    pub api_token: Option<String>,
    pub fallback: FallbackConfig,
    /// Request timeout for the speech-to-text call
    pub http_timeout: Duration,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load from process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match (get("COACH_BIND_ADDR"), get("PORT")) {
            (Some(addr), _) => addr
                .parse()
                .map_err(|e| ConfigError::invalid("COACH_BIND_ADDR", &addr, e))?,
            (None, Some(port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|e| ConfigError::invalid("PORT", &port, e))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| ConfigError::invalid("COACH_BIND_ADDR", DEFAULT_BIND_ADDR, e))?,
        };

        let parse_url = |var: &'static str| -> Result<Option<Url>, ConfigError> {
            get(var)
                .map(|raw| Url::parse(&raw).map_err(|e| ConfigError::invalid(var, &raw, e)))
                .transpose()
        };

        let threshold = match get("COACH_FALLBACK_THRESHOLD") {
            Some(raw) => {
                let value: f32 = raw
                    .parse()
                    .map_err(|e| ConfigError::invalid("COACH_FALLBACK_THRESHOLD", &raw, e))?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::invalid(
                        "COACH_FALLBACK_THRESHOLD",
                        &raw,
                        "must be within [0, 1]",
                    ));
                }
                value
            }
            None => coach_intent::fallback::DEFAULT_THRESHOLD,
        };

        let parse_millis = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(var) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| ConfigError::invalid(var, &raw, e)),
                None => Ok(default),
            }
        };

        let cors_origins = get("COACH_CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            bind_addr,
            lexicon_path: get("COACH_LEXICON_PATH").map(PathBuf::from),
            stt_url: parse_url("COACH_STT_URL")?,
            classifier_url: parse_url("COACH_CLASSIFIER_URL")?,
            api_token: get("COACH_API_TOKEN"),
            fallback: FallbackConfig {
                threshold,
                timeout: parse_millis(
                    "COACH_FALLBACK_TIMEOUT_MS",
                    coach_intent::fallback::DEFAULT_TIMEOUT,
                )?,
            },
            http_timeout: parse_millis(
                "COACH_HTTP_TIMEOUT_MS",
                Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            )?,
            cors_origins,
        })
    }

    /// Compile the configured lexicon, or the built-in one.
    pub fn load_lexicon(&self) -> Result<Lexicon, LexiconError> {
        match &self.lexicon_path {
            Some(path) => LexiconCompiler::from_path(path),
            None => LexiconCompiler::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:5000");
        assert!(config.stt_url.is_none());
        assert!(config.classifier_url.is_none());
        assert!((config.fallback.threshold - 0.30).abs() < f32::EPSILON);
        assert_eq!(config.fallback.timeout, Duration::from_secs(5));
        assert_eq!(config.cors_origins.len(), 3);
    }

    #[test]
    fn test_port_overrides_default_port() {
        let config = config_from(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");

        let config = config_from(&[("PORT", "8080"), ("COACH_BIND_ADDR", "127.0.0.1:9000")])
            .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_service_urls() {
        let config = config_from(&[
            ("COACH_STT_URL", "http://localhost:9000/asr"),
            ("COACH_CLASSIFIER_URL", "http://localhost:9001/zero-shot"),
        ])
        .unwrap();
        assert_eq!(
            config.stt_url.unwrap().as_str(),
            "http://localhost:9000/asr"
        );
        assert!(config.classifier_url.is_some());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("COACH_STT_URL", "not a url")]).is_err());
        assert!(config_from(&[("COACH_FALLBACK_THRESHOLD", "1.5")]).is_err());
        assert!(config_from(&[("COACH_FALLBACK_THRESHOLD", "high")]).is_err());
        assert!(config_from(&[("COACH_FALLBACK_TIMEOUT_MS", "-1")]).is_err());
        assert!(config_from(&[("PORT", "99999")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("COACH_CLASSIFIER_URL", "  ")]).unwrap();
        assert!(config.classifier_url.is_none());
    }

    #[test]
    fn test_cors_origins_are_split() {
        let config =
            config_from(&[("COACH_CORS_ORIGINS", "http://a.test, http://b.test,")]).unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_load_builtin_lexicon() {
        let config = config_from(&[]).unwrap();
        assert!(config.load_lexicon().is_ok());
    }
}
