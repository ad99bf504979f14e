pub mod analyzer;
pub mod classifier;
pub mod prompts;
pub mod provider;
pub mod providers;

pub use analyzer::{AnalysisError, HealthAnalyzer};
pub use classifier::MedicalClassifier;
pub use provider::{LlmError, LlmProvider};
