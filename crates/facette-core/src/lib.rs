//! facette-core: Facial geometry classification and product recommendation.
//!
//! Turns detector landmarks into geometric metrics, classifies age bracket,
//! skin type and face shape with a deterministic scored heuristic, and ranks
//! catalog products against the classification.

pub mod catalog;
pub mod classifier;
pub mod metrics;
pub mod recommender;
pub mod types;

pub use catalog::{Catalog, CatalogError, Product};
pub use classifier::classify;
pub use metrics::{extract_metrics, MetricsError};
pub use recommender::{personalized_tips, recommend};
pub use types::{
    AgeBracket, Classification, FaceBox, FaceCapture, FaceMetrics, FaceShape, LandmarkSet, Point,
    ProductRecommendation, SkinType,
};
