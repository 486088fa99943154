//! facette-ai: AI classifier adapter.
//!
//! Builds the classification prompt from face measurements, sends it to a
//! chat-completions provider and leniently parses the JSON answer.

pub mod analysis;
pub mod client;
pub mod deepseek;
pub mod prompt;
pub mod response;

pub use analysis::{analyze_face, test_connection};
pub use client::{AiClient, AiError, AiFailureKind, Prompt};
pub use deepseek::{DeepSeekClient, DeepSeekConfig};
pub use prompt::FaceAnalysisData;
pub use response::{parse_analysis, AiAnalysis, FallbackContent};
