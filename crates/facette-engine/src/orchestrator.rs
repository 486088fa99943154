//! AI-first face analysis with a deterministic local fallback.
//!
//! A run walks `LocalOnly → Resolved` when no AI client is supplied, and
//! `AiRequested → AiSucceeded | AiFailed → Resolved` otherwise. Any AI
//! failure, including timeout and cancellation, resolves through the local
//! classifier. Only unusable landmarks surface as an error.

use crate::cancel::Cancellation;
use crate::config::Config;
use facette_ai::{analyze_face, AiAnalysis, AiClient, AiError, FaceAnalysisData, FallbackContent};
use facette_core::{
    classify, extract_metrics, personalized_tips, recommend, AgeBracket, Catalog, Classification,
    FaceBox, FaceMetrics, FaceShape, LandmarkSet, MetricsError, ProductRecommendation, SkinType,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("invalid landmarks: {0}")]
    InvalidLandmarks(#[from] MetricsError),
}

/// Orchestrator states, recorded in visit order on every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum AnalysisState {
    LocalOnly,
    AiRequested,
    AiSucceeded,
    /// Carries the failure description.
    AiFailed(String),
    Resolved,
}

/// Which path produced the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Ai,
    Local,
}

/// One frame to analyse.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub landmarks: LandmarkSet,
    pub face_box: FaceBox,
    /// Jitter seed, normally the capture time in milliseconds.
    pub seed: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'c> {
    pub id: Uuid,
    pub source: AnalysisSource,
    pub path: Vec<AnalysisState>,
    pub metrics: FaceMetrics,
    pub classification: Classification,
    pub confidence: f64,
    pub recommendations: Vec<ProductRecommendation<'c>>,
    pub tips: Vec<String>,
    pub personality_traits: Vec<String>,
    pub product_hints: Vec<String>,
    pub explanation: String,
}

/// Runs analyses against one catalog.
pub struct Analyzer<'c> {
    catalog: &'c Catalog,
    ai_timeout: Duration,
    personalized_tips: bool,
}

impl<'c> Analyzer<'c> {
    pub fn new(catalog: &'c Catalog, config: &Config) -> Self {
        Self {
            catalog,
            ai_timeout: config.ai_timeout(),
            personalized_tips: config.personalized_tips,
        }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Analyse without contacting any AI provider.
    pub fn analyze_local(&self, request: &AnalysisRequest) -> Result<AnalysisReport<'c>, AnalysisError> {
        let metrics = extract_metrics(&request.landmarks, &request.face_box)?;
        tracing::info!(state = "local_only", "analysis started without AI client");
        Ok(self.resolve_local(vec![AnalysisState::LocalOnly], metrics, request))
    }

    /// Analyse a frame, asking `ai` first when supplied.
    ///
    /// The AI round trip is a single attempt bounded by the configured
    /// timeout and by `cancel`.
    pub async fn analyze<C: AiClient>(
        &self,
        request: &AnalysisRequest,
        ai: Option<&C>,
        cancel: Option<Cancellation>,
    ) -> Result<AnalysisReport<'c>, AnalysisError> {
        let Some(client) = ai else {
            return self.analyze_local(request);
        };

        let metrics = extract_metrics(&request.landmarks, &request.face_box)?;
        let data = FaceAnalysisData::from_metrics(&metrics, request.face_box.confidence);
        let mut path = vec![AnalysisState::AiRequested];
        tracing::info!(state = "ai_requested", timeout_secs = self.ai_timeout.as_secs(), "AI analysis requested");

        match self.request_ai(client, &data, cancel).await {
            Ok(analysis) => {
                path.push(AnalysisState::AiSucceeded);
                tracing::info!(state = "ai_succeeded", confidence = analysis.confidence, "AI analysis succeeded");
                Ok(self.resolve_ai(path, metrics, request, analysis))
            }
            Err(e) => {
                tracing::warn!(state = "ai_failed", kind = ?e.kind(), error = %e, "AI analysis failed; using local classifier");
                path.push(AnalysisState::AiFailed(e.to_string()));
                Ok(self.resolve_local(path, metrics, request))
            }
        }
    }

    async fn request_ai<C: AiClient>(
        &self,
        client: &C,
        data: &FaceAnalysisData,
        cancel: Option<Cancellation>,
    ) -> Result<AiAnalysis, AiError> {
        let cancelled = async move {
            match cancel {
                Some(mut signal) => signal.cancelled().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(AiError::Cancelled),
            outcome = tokio::time::timeout(self.ai_timeout, analyze_face(client, data)) => {
                outcome.unwrap_or(Err(AiError::Timeout))
            }
        }
    }

    fn resolve_local(
        &self,
        mut path: Vec<AnalysisState>,
        metrics: FaceMetrics,
        request: &AnalysisRequest,
    ) -> AnalysisReport<'c> {
        let classification = classify(&metrics, request.seed);
        let confidence = request.face_box.confidence;
        let fallback = FallbackContent::default();
        let tips = if self.personalized_tips {
            personalized_tips(&classification, confidence)
        } else {
            fallback.beauty_tips
        };

        path.push(AnalysisState::Resolved);
        let report = AnalysisReport {
            id: Uuid::new_v4(),
            source: AnalysisSource::Local,
            path,
            metrics,
            classification,
            confidence,
            recommendations: recommend(&classification, confidence, self.catalog),
            tips,
            personality_traits: fallback.personality_traits,
            product_hints: fallback.product_recommendations,
            explanation: fallback.explanation,
        };
        log_resolved(&report);
        report
    }

    fn resolve_ai(
        &self,
        mut path: Vec<AnalysisState>,
        metrics: FaceMetrics,
        request: &AnalysisRequest,
        analysis: AiAnalysis,
    ) -> AnalysisReport<'c> {
        // Score and hash are diagnostics; they always come from the local scorer.
        let local = classify(&metrics, request.seed);
        let classification = Classification {
            age_bracket: AgeBracket::from_label(&analysis.estimated_age).unwrap_or_default(),
            skin_type: SkinType::from_label(&analysis.skin_type).unwrap_or_default(),
            face_shape: FaceShape::from_label(&analysis.face_shape).unwrap_or_default(),
            ..local
        };
        let confidence = analysis.confidence;

        path.push(AnalysisState::Resolved);
        let report = AnalysisReport {
            id: Uuid::new_v4(),
            source: AnalysisSource::Ai,
            path,
            metrics,
            classification,
            confidence,
            recommendations: recommend(&classification, confidence, self.catalog),
            tips: analysis.beauty_tips,
            personality_traits: analysis.personality_traits,
            product_hints: analysis.product_recommendations,
            explanation: analysis.explanation,
        };
        log_resolved(&report);
        report
    }
}

fn log_resolved(report: &AnalysisReport<'_>) {
    tracing::info!(
        id = %report.id,
        source = ?report.source,
        age = %report.classification.age_bracket,
        skin = %report.classification.skin_type,
        shape = %report.classification.face_shape,
        confidence = report.confidence,
        recommendations = report.recommendations.len(),
        "analysis resolved"
    );
}
