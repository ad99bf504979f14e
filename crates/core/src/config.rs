use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

/// Parse a profiled env var, falling back to `default` when missing or malformed.
fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a profiled fraction in `[0, 1]`. NaN, infinities and out-of-range
/// values are rejected with a warning and replaced by `default`.
fn profiled_env_fraction(profile: &str, key: &str, default: f64) -> f64 {
    let Some(raw) = profiled_env_opt(profile, key) else {
        return default;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => v,
        _ => {
            tracing::warn!("{} must be a number between 0 and 1, got '{}'; using {}", key, raw, default);
            default
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `HEALTHFLOW_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("HEALTHFLOW_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            upload: UploadConfig::from_env_profiled(p),
            pipeline: PipelineConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:    {}:{}, cors={}", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!("  upload:    max_bytes={}, mime={}", self.upload.max_bytes, self.upload.allowed_mime);
        tracing::info!(
            "  pipeline:  min_confidence={}, min_content_chars={}, timeout={}s",
            self.pipeline.min_confidence,
            self.pipeline.min_content_chars,
            self.pipeline.request_timeout_secs,
        );
        tracing::info!(
            "  llm:       provider={}, configured={}",
            self.llm.provider,
            self.llm.is_configured()
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "upload": {
                "maxBytes": self.upload.max_bytes,
                "allowedMime": self.upload.allowed_mime,
            },
            "pipeline": {
                "minConfidence": self.pipeline.min_confidence,
                "minContentChars": self.pipeline.min_content_chars,
                "requestTimeoutSecs": self.pipeline.request_timeout_secs,
            },
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.active_model(&self.ollama),
                "configured": self.llm.is_configured(),
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 5000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Upload constraints ────────────────────────────────────────

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub allowed_mime: String,
}

impl UploadConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_bytes: profiled_env_parse(p, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            allowed_mime: "application/pdf".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime: "application/pdf".to_string(),
        }
    }
}

// ── Pipeline thresholds ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Classification gate; `confidence >= min_confidence` passes.
    pub min_confidence: f64,
    /// Minimum cleaned-text length, in characters, checked after the gate.
    pub min_content_chars: usize,
    /// How many characters of the report the classifier sees.
    pub classifier_sample_chars: usize,
    pub request_timeout_secs: u64,
}

impl PipelineConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            min_confidence: profiled_env_fraction(p, "MIN_CONFIDENCE", defaults.min_confidence),
            min_content_chars: profiled_env_parse(p, "MIN_CONTENT_CHARS", defaults.min_content_chars),
            classifier_sample_chars: profiled_env_parse(
                p,
                "CLASSIFIER_SAMPLE_CHARS",
                defaults.classifier_sample_chars,
            ),
            request_timeout_secs: profiled_env_parse(
                p,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            min_content_chars: 100,
            classifier_sample_chars: 2000,
            request_timeout_secs: 120,
        }
    }
}

// ── LLM (Gemini / Ollama) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini", "ollama"
    pub provider: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "gemini"),
            gemini_api_key: profiled_env_opt(p, "GEMINI_API_KEY"),
            gemini_model: profiled_env_or(p, "GEMINI_MODEL", "gemini-2.0-flash"),
            gemini_base_url: profiled_env_or(
                p,
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", 0.4),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", 4096),
            timeout_secs: profiled_env_parse(p, "REQUEST_TIMEOUT_SECS", 120),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "gemini" => self.gemini_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    pub fn active_model<'a>(&'a self, ollama: &'a OllamaConfig) -> &'a str {
        match self.provider.as_str() {
            "ollama" => &ollama.model,
            _ => &self.gemini_model,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults_match_product_thresholds() {
        let p = PipelineConfig::default();
        assert_eq!(p.min_confidence, 0.6);
        assert_eq!(p.min_content_chars, 100);
        assert_eq!(p.classifier_sample_chars, 2000);
        assert_eq!(p.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn upload_default_is_ten_mebibytes() {
        let u = UploadConfig::default();
        assert_eq!(u.max_bytes, 10_485_760);
        assert_eq!(u.allowed_mime, "application/pdf");
    }

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("HFTESTPROFILE_MIN_CONFIDENCE", "0.75");
        let config = Config::for_profile("hftestprofile");
        assert_eq!(config.profile, "HFTESTPROFILE");
        assert_eq!(config.pipeline.min_confidence, 0.75);
        env::remove_var("HFTESTPROFILE_MIN_CONFIDENCE");
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        env::set_var("HFBADPROFILE_MAX_UPLOAD_BYTES", "ten megs");
        let config = Config::for_profile("hfbadprofile");
        assert_eq!(config.upload.max_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        env::remove_var("HFBADPROFILE_MAX_UPLOAD_BYTES");
    }

    #[test]
    fn confidence_threshold_outside_unit_range_falls_back() {
        for bad in ["NaN", "inf", "-inf", "1.5", "-0.1", "high"] {
            env::set_var("HFGATEPROFILE_MIN_CONFIDENCE", bad);
            let config = Config::for_profile("hfgateprofile");
            assert_eq!(config.pipeline.min_confidence, 0.6, "accepted {bad}");
        }

        for (good, expected) in [("0", 0.0), ("1", 1.0), (" 0.3 ", 0.3)] {
            env::set_var("HFGATEPROFILE_MIN_CONFIDENCE", good);
            let config = Config::for_profile("hfgateprofile");
            assert_eq!(config.pipeline.min_confidence, expected);
        }
        env::remove_var("HFGATEPROFILE_MIN_CONFIDENCE");
    }

    #[test]
    fn ollama_needs_no_key() {
        let llm = LlmConfig {
            provider: "ollama".into(),
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            temperature: 0.4,
            max_tokens: 4096,
            timeout_secs: 120,
        };
        assert!(llm.is_configured());
        let gemini = LlmConfig { provider: "gemini".into(), ..llm };
        assert!(!gemini.is_configured());
    }
}
