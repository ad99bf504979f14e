//! Application configuration builders.
//!
//! Constructs the model provider and the report pipeline from `Config`.

use std::sync::Arc;

use tracing::{info, warn};

use healthflow_core::Config;
use healthflow_ingest::PdfExtractor;
use healthflow_llm::providers::{create_provider, UnavailableProvider};
use healthflow_llm::LlmProvider;

use crate::pipeline::ReportPipeline;
use crate::state::AppState;

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    healthflow_core::config::load_dotenv();
    Config::from_env()
}

/// Build the model provider. A misconfigured provider does not stop startup:
/// the returned stand-in fails every call with the configuration error.
pub fn build_provider(config: &Config) -> (Arc<dyn LlmProvider>, bool) {
    match create_provider(&config.llm, &config.ollama) {
        Ok(provider) => {
            info!(
                provider = provider.name(),
                model = config.llm.active_model(&config.ollama),
                "LLM provider ready"
            );
            (provider, true)
        }
        Err(e) => {
            warn!("LLM provider unavailable: {} (analysis requests will fail)", e);
            (Arc::new(UnavailableProvider::new(e.to_string())), false)
        }
    }
}

pub fn build_pipeline(config: &Config, provider: Arc<dyn LlmProvider>) -> ReportPipeline {
    let extractor = PdfExtractor::new();
    info!(strategies = ?extractor.strategy_names(), "PDF extractor ready");
    ReportPipeline::new(extractor, provider, &config.pipeline)
}

pub fn build_state(config: Config) -> AppState {
    let (provider, llm_configured) = build_provider(&config);
    let pipeline = build_pipeline(&config, provider);
    AppState {
        config,
        pipeline,
        llm_configured,
    }
}
