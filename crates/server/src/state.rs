use healthflow_core::Config;

use crate::pipeline::ReportPipeline;

pub struct AppState {
    pub config: Config,
    pub pipeline: ReportPipeline,
    /// Whether a model provider could be built at startup.
    pub llm_configured: bool,
}
