//! facette-engine: analysis orchestration and configuration.
//!
//! Tries the AI classifier first and falls back to the local heuristic on any
//! AI failure, so every valid frame resolves to a classification, a
//! confidence, product recommendations and care tips.

pub mod cancel;
pub mod config;
pub mod orchestrator;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use config::{AiSettings, Config, ConfigError};
pub use orchestrator::{
    AnalysisError, AnalysisReport, AnalysisRequest, AnalysisSource, AnalysisState, Analyzer,
};
