//! Deterministic age / skin-type / face-shape classification.
//!
//! The age estimate is an additive score over four independent metric
//! factors plus a bounded jitter derived from the face hash. Skin type is a
//! pure function of two lengths. Face shape is a first-match decision table.
//! All thresholds live in the constant tables below.

use crate::types::{AgeBracket, Classification, FaceMetrics, FaceShape, SkinType};

/// Descending `(exclusive lower bound, points)` tiers; the first bound exceeded wins.
type Tiers = [(f64, i32)];

/// noseToEyeRatio: a larger eye-to-nose drop scores older.
pub const NOSE_TO_EYE_TIERS: [(f64, i32); 3] = [(0.35, 25), (0.25, 15), (0.15, 10)];
pub const NOSE_TO_EYE_FLOOR: i32 = 5;

/// jawRatio: a strong jaw scores younger, a narrow ("sagging") jaw older.
pub const JAW_TIERS: [(f64, i32); 3] = [(0.85, 5), (0.75, 10), (0.65, 15)];
pub const JAW_FLOOR: i32 = 20;

/// faceRatio: elongated and wide faces both score above the middle band.
pub const FACE_RATIO_ELONGATED: (f64, i32) = (1.4, 10);
pub const FACE_RATIO_WIDE: (f64, i32) = (1.0, 15);
pub const FACE_RATIO_MIDDLE: i32 = 5;

/// Mean of eye distance, mouth width and nose height.
pub const COMPLEXITY_TIERS: [(f64, i32); 2] = [(75.0, 10), (65.0, 5)];
pub const COMPLEXITY_FLOOR: i32 = 0;

/// Jitter is `(face_hash % JITTER_SPAN) - JITTER_OFFSET`, i.e. in [-10, +9].
pub const JITTER_SPAN: u32 = 20;
pub const JITTER_OFFSET: i32 = 10;

/// Exclusive upper score bound per bracket; scores past the last bound are [`AgeBracket::Over65`].
pub const AGE_CUTOFFS: [(i32, AgeBracket); 4] = [
    (20, AgeBracket::From18To25),
    (35, AgeBracket::From25To35),
    (50, AgeBracket::From35To50),
    (65, AgeBracket::From50To65),
];

/// Indexed by `floor((eye_distance + mouth_width) mod 6)`.
pub const SKIN_TYPES: [SkinType; 6] = [
    SkinType::ClearSensitive,
    SkinType::NormalBalanced,
    SkinType::MatteNatural,
    SkinType::Combination,
    SkinType::ClearDry,
    SkinType::DarkRich,
];

/// One row of the face-shape decision table. Bounds are exclusive; `None` means unconstrained.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRule {
    pub shape: FaceShape,
    pub face_ratio_above: Option<f64>,
    pub face_ratio_below: Option<f64>,
    pub jaw_ratio_above: Option<f64>,
    pub jaw_ratio_below: Option<f64>,
}

impl ShapeRule {
    const fn new(shape: FaceShape) -> Self {
        Self {
            shape,
            face_ratio_above: None,
            face_ratio_below: None,
            jaw_ratio_above: None,
            jaw_ratio_below: None,
        }
    }

    pub fn matches(&self, face_ratio: f64, jaw_ratio: f64) -> bool {
        self.face_ratio_above.map_or(true, |b| face_ratio > b)
            && self.face_ratio_below.map_or(true, |b| face_ratio < b)
            && self.jaw_ratio_above.map_or(true, |b| jaw_ratio > b)
            && self.jaw_ratio_below.map_or(true, |b| jaw_ratio < b)
    }
}

/// Evaluated top to bottom; first match wins.
pub const FACE_SHAPE_RULES: [ShapeRule; 5] = [
    ShapeRule { face_ratio_above: Some(1.5), ..ShapeRule::new(FaceShape::ElongatedOval) },
    ShapeRule {
        face_ratio_above: Some(1.3),
        jaw_ratio_above: Some(0.75),
        ..ShapeRule::new(FaceShape::Rectangle)
    },
    ShapeRule { face_ratio_below: Some(1.1), ..ShapeRule::new(FaceShape::Round) },
    ShapeRule { jaw_ratio_above: Some(0.85), ..ShapeRule::new(FaceShape::Square) },
    ShapeRule { jaw_ratio_below: Some(0.65), ..ShapeRule::new(FaceShape::InvertedTriangle) },
];
pub const FACE_SHAPE_FALLBACK: FaceShape = FaceShape::ClassicOval;

/// Per-factor breakdown of the jitter-free age score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeScore {
    pub nose_to_eye: i32,
    pub jaw: i32,
    pub face_ratio: i32,
    pub complexity: i32,
}

impl AgeScore {
    pub fn total(&self) -> i32 {
        self.nose_to_eye + self.jaw + self.face_ratio + self.complexity
    }
}

fn tiered(value: f64, tiers: &Tiers, floor: i32) -> i32 {
    tiers
        .iter()
        .find(|(bound, _)| value > *bound)
        .map_or(floor, |&(_, points)| points)
}

/// Score the four metric factors, without jitter.
pub fn score_age(metrics: &FaceMetrics) -> AgeScore {
    let face_ratio = if metrics.face_ratio > FACE_RATIO_ELONGATED.0 {
        FACE_RATIO_ELONGATED.1
    } else if metrics.face_ratio < FACE_RATIO_WIDE.0 {
        FACE_RATIO_WIDE.1
    } else {
        FACE_RATIO_MIDDLE
    };
    let complexity = (metrics.eye_distance + metrics.mouth_width + metrics.nose_height) / 3.0;

    AgeScore {
        nose_to_eye: tiered(metrics.nose_to_eye_ratio, &NOSE_TO_EYE_TIERS, NOSE_TO_EYE_FLOOR),
        jaw: tiered(metrics.jaw_ratio, &JAW_TIERS, JAW_FLOOR),
        face_ratio,
        complexity: tiered(complexity, &COMPLEXITY_TIERS, COMPLEXITY_FLOOR),
    }
}

/// Metric-only part of the face hash, in [0, 1000).
pub fn base_hash(metrics: &FaceMetrics) -> u32 {
    let sum = metrics.eye_distance + metrics.mouth_width + metrics.nose_height + metrics.jaw_width;
    ((sum * 1000.0).floor() as i64).rem_euclid(1000) as u32
}

/// Combine the base hash with the seed's time-variation term (`seed mod 100`).
pub fn face_hash(metrics: &FaceMetrics, seed: i64) -> u32 {
    let time_variation = seed.rem_euclid(100) as u32;
    (base_hash(metrics) + time_variation) % 1000
}

/// Jitter added to the age score, in [-10, +9].
pub fn jitter(face_hash: u32) -> i32 {
    (face_hash % JITTER_SPAN) as i32 - JITTER_OFFSET
}

pub fn age_bracket(score: i32) -> AgeBracket {
    AGE_CUTOFFS
        .iter()
        .find(|(cutoff, _)| score < *cutoff)
        .map_or(AgeBracket::Over65, |&(_, bracket)| bracket)
}

pub fn skin_type(metrics: &FaceMetrics) -> SkinType {
    let index = ((metrics.eye_distance + metrics.mouth_width) % 6.0).floor() as usize;
    SKIN_TYPES.get(index).copied().unwrap_or_default()
}

pub fn face_shape(face_ratio: f64, jaw_ratio: f64) -> FaceShape {
    FACE_SHAPE_RULES
        .iter()
        .find(|rule| rule.matches(face_ratio, jaw_ratio))
        .map_or(FACE_SHAPE_FALLBACK, |rule| rule.shape)
}

/// Classify a face.
///
/// `seed` is normally the capture timestamp in milliseconds; only `seed mod 100`
/// is used. Never fails: metrics that cannot be scored yield
/// [`Classification::default`].
pub fn classify(metrics: &FaceMetrics, seed: i64) -> Classification {
    if !metrics.is_well_formed() {
        tracing::warn!(?metrics, "metrics not scorable; using default classification");
        return Classification::default();
    }

    let hash = face_hash(metrics, seed);
    let breakdown = score_age(metrics);
    let jitter = jitter(hash);
    let score = breakdown.total() + jitter;

    let classification = Classification {
        age_bracket: age_bracket(score),
        skin_type: skin_type(metrics),
        face_shape: face_shape(metrics.face_ratio, metrics.jaw_ratio),
        diagnostic_score: score,
        face_hash: hash,
    };

    tracing::debug!(
        base_hash = base_hash(metrics),
        face_hash = hash,
        nose_to_eye = breakdown.nose_to_eye,
        jaw = breakdown.jaw,
        face_ratio = breakdown.face_ratio,
        complexity = breakdown.complexity,
        jitter,
        score,
        age = %classification.age_bracket,
        skin = %classification.skin_type,
        shape = %classification.face_shape,
        "face classified"
    );

    classification
}
