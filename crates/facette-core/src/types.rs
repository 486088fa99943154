use serde::{Deserialize, Serialize};
use std::fmt;

/// A single 2D landmark coordinate, in detector pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Number of points in the iBUG 68-point layout.
pub const LANDMARK_COUNT_68: usize = 68;

/// Facial landmarks partitioned by region.
///
/// Point ordering inside each region follows the 68-point convention:
/// jaw 17 points left to right, nose 9 points (bridge top first), eyes 6
/// points each (outer corner, two upper lid, inner corner, two lower lid),
/// mouth outline starting at the left corner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub jaw: Vec<Point>,
    pub nose: Vec<Point>,
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
    pub mouth: Vec<Point>,
}

impl LandmarkSet {
    /// Partition a flat 68-point array (jaw 0-16, brows 17-26, nose 27-35,
    /// left eye 36-41, right eye 42-47, mouth 48-67).
    ///
    /// Returns `None` if the array does not hold exactly 68 points.
    pub fn from_points_68(points: &[Point]) -> Option<Self> {
        if points.len() != LANDMARK_COUNT_68 {
            return None;
        }
        Some(Self {
            jaw: points[0..17].to_vec(),
            nose: points[27..36].to_vec(),
            left_eye: points[36..42].to_vec(),
            right_eye: points[42..48].to_vec(),
            mouth: points[48..68].to_vec(),
        })
    }
}

/// Detected face region. Only the dimensions feed the metrics; the
/// detector score becomes the local-path confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub width: f64,
    pub height: f64,
    /// Detector score in [0, 1].
    #[serde(default)]
    pub confidence: f64,
}

/// One captured frame as handed over by the landmark detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceCapture {
    #[serde(rename = "box")]
    pub face_box: FaceBox,
    pub landmarks: CaptureLandmarks,
}

/// Landmarks as they arrive on the wire: named regions or a flat 68-point array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureLandmarks {
    Regions(LandmarkSet),
    Points(Vec<Point>),
}

impl CaptureLandmarks {
    pub fn into_set(self) -> Option<LandmarkSet> {
        match self {
            CaptureLandmarks::Regions(set) => Some(set),
            CaptureLandmarks::Points(points) => LandmarkSet::from_points_68(&points),
        }
    }
}

/// Scalar measurements derived from one landmark set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMetrics {
    pub face_width: f64,
    pub face_height: f64,
    pub eye_distance: f64,
    pub mouth_width: f64,
    pub nose_height: f64,
    pub jaw_width: f64,
    pub nose_to_eye_ratio: f64,
    /// faceHeight / faceWidth.
    pub face_ratio: f64,
    /// jawWidth / faceWidth.
    pub jaw_ratio: f64,
}

impl FaceMetrics {
    /// True when every field is finite and both face dimensions are positive.
    pub fn is_well_formed(&self) -> bool {
        self.face_width > 0.0
            && self.face_height > 0.0
            && [
                self.face_width,
                self.face_height,
                self.eye_distance,
                self.mouth_width,
                self.nose_height,
                self.jaw_width,
                self.nose_to_eye_ratio,
                self.face_ratio,
                self.jaw_ratio,
            ]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Age bracket produced by the classifier (five-bracket table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "25-35")]
    From25To35,
    #[serde(rename = "35-50")]
    From35To50,
    #[serde(rename = "50-65")]
    From50To65,
    #[serde(rename = "65+")]
    Over65,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::From18To25,
        AgeBracket::From25To35,
        AgeBracket::From35To50,
        AgeBracket::From50To65,
        AgeBracket::Over65,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From18To25 => "18-25",
            AgeBracket::From25To35 => "25-35",
            AgeBracket::From35To50 => "35-50",
            AgeBracket::From50To65 => "50-65",
            AgeBracket::Over65 => "65+",
        }
    }

    /// Position in [`AgeBracket::ALL`], youngest first.
    pub fn tier(&self) -> usize {
        *self as usize
    }

    /// Map a free-text age estimate ("35-45 ans", "about 28", "65+") onto a bracket
    /// using the first number it contains.
    pub fn from_label(text: &str) -> Option<Self> {
        let digits: String = text
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let age: u32 = digits.parse().ok()?;
        Some(match age {
            0..=24 => AgeBracket::From18To25,
            25..=34 => AgeBracket::From25To35,
            35..=49 => AgeBracket::From35To50,
            50..=64 => AgeBracket::From50To65,
            _ => AgeBracket::Over65,
        })
    }
}

impl Default for AgeBracket {
    fn default() -> Self {
        AgeBracket::From25To35
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Skin-type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinType {
    #[serde(rename = "Peau claire et sensible")]
    ClearSensitive,
    #[serde(rename = "Peau normale équilibrée")]
    NormalBalanced,
    #[serde(rename = "Peau mate naturelle")]
    MatteNatural,
    #[serde(rename = "Peau mixte")]
    Combination,
    #[serde(rename = "Peau claire à tendance sèche")]
    ClearDry,
    #[serde(rename = "Peau foncée riche")]
    DarkRich,
}

impl SkinType {
    pub fn label(&self) -> &'static str {
        match self {
            SkinType::ClearSensitive => "Peau claire et sensible",
            SkinType::NormalBalanced => "Peau normale équilibrée",
            SkinType::MatteNatural => "Peau mate naturelle",
            SkinType::Combination => "Peau mixte",
            SkinType::ClearDry => "Peau claire à tendance sèche",
            SkinType::DarkRich => "Peau foncée riche",
        }
    }

    /// Fair skin, either sensitive or dry.
    pub fn is_clear(&self) -> bool {
        matches!(self, SkinType::ClearSensitive | SkinType::ClearDry)
    }

    /// Map a free-text skin description onto a category by keyword.
    pub fn from_label(text: &str) -> Option<Self> {
        let t = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| t.contains(w));

        if has(&["foncée", "foncee", "dark", "noire"]) {
            Some(SkinType::DarkRich)
        } else if has(&["mate", "olive"]) {
            Some(SkinType::MatteNatural)
        } else if has(&["mixte", "combination", "grasse", "oily"]) {
            Some(SkinType::Combination)
        } else if has(&["claire", "fair", "light"]) {
            if has(&["sèche", "seche", "dry"]) {
                Some(SkinType::ClearDry)
            } else {
                Some(SkinType::ClearSensitive)
            }
        } else if has(&["sensible", "sensitive"]) {
            Some(SkinType::ClearSensitive)
        } else if has(&["normal"]) {
            Some(SkinType::NormalBalanced)
        } else {
            None
        }
    }
}

impl Default for SkinType {
    fn default() -> Self {
        SkinType::NormalBalanced
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Face-shape category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceShape {
    #[serde(rename = "Ovale allongé")]
    ElongatedOval,
    #[serde(rename = "Rectangle")]
    Rectangle,
    #[serde(rename = "Rond")]
    Round,
    #[serde(rename = "Carré")]
    Square,
    #[serde(rename = "Triangle inversé")]
    InvertedTriangle,
    #[serde(rename = "Ovale classique")]
    ClassicOval,
}

impl FaceShape {
    pub fn label(&self) -> &'static str {
        match self {
            FaceShape::ElongatedOval => "Ovale allongé",
            FaceShape::Rectangle => "Rectangle",
            FaceShape::Round => "Rond",
            FaceShape::Square => "Carré",
            FaceShape::InvertedTriangle => "Triangle inversé",
            FaceShape::ClassicOval => "Ovale classique",
        }
    }

    /// Map a free-text face-shape description onto a category by keyword.
    pub fn from_label(text: &str) -> Option<Self> {
        let t = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| t.contains(w));

        if has(&["allong", "elongated", "oblong"]) {
            Some(FaceShape::ElongatedOval)
        } else if has(&["rectang"]) {
            Some(FaceShape::Rectangle)
        } else if has(&["rond", "round"]) {
            Some(FaceShape::Round)
        } else if has(&["carr", "square"]) {
            Some(FaceShape::Square)
        } else if has(&["triangle", "heart", "cœur", "coeur"]) {
            Some(FaceShape::InvertedTriangle)
        } else if has(&["oval"]) {
            Some(FaceShape::ClassicOval)
        } else {
            None
        }
    }
}

impl Default for FaceShape {
    fn default() -> Self {
        FaceShape::ClassicOval
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Discrete classification of one analysed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub age_bracket: AgeBracket,
    pub skin_type: SkinType,
    pub face_shape: FaceShape,
    /// Total age score, jitter included.
    pub diagnostic_score: i32,
    /// Reproducibility hash in [0, 1000).
    pub face_hash: u32,
}

/// Score reported by the default classification.
pub const DEFAULT_DIAGNOSTIC_SCORE: i32 = 35;

impl Default for Classification {
    /// Returned whenever the inputs cannot be scored.
    fn default() -> Self {
        Self {
            age_bracket: AgeBracket::default(),
            skin_type: SkinType::default(),
            face_shape: FaceShape::default(),
            diagnostic_score: DEFAULT_DIAGNOSTIC_SCORE,
            face_hash: 0,
        }
    }
}

/// A catalog product recommended for a classification.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecommendation<'a> {
    pub product: &'a crate::catalog::Product,
    pub reason: String,
    /// Lower is shown first.
    pub priority: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, (i * 2) as f64)).collect()
    }

    #[test]
    fn test_from_points_68_partition() {
        let set = LandmarkSet::from_points_68(&grid(68)).unwrap();
        assert_eq!(set.jaw.len(), 17);
        assert_eq!(set.nose.len(), 9);
        assert_eq!(set.left_eye.len(), 6);
        assert_eq!(set.right_eye.len(), 6);
        assert_eq!(set.mouth.len(), 20);
        assert_eq!(set.nose[0], Point::new(27.0, 54.0));
        assert_eq!(set.left_eye[0].x, 36.0);
        assert_eq!(set.right_eye[0].x, 42.0);
        assert_eq!(set.mouth[0].x, 48.0);
    }

    #[test]
    fn test_from_points_68_wrong_count() {
        assert!(LandmarkSet::from_points_68(&grid(67)).is_none());
        assert!(LandmarkSet::from_points_68(&grid(69)).is_none());
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_age_bracket_from_label() {
        assert_eq!(AgeBracket::from_label("18-25 ans"), Some(AgeBracket::From18To25));
        assert_eq!(AgeBracket::from_label("25-35 ans"), Some(AgeBracket::From25To35));
        assert_eq!(AgeBracket::from_label("35-45 ans"), Some(AgeBracket::From35To50));
        assert_eq!(AgeBracket::from_label("45+"), Some(AgeBracket::From35To50));
        assert_eq!(AgeBracket::from_label("environ 58 ans"), Some(AgeBracket::From50To65));
        assert_eq!(AgeBracket::from_label("65+ ans"), Some(AgeBracket::Over65));
        assert_eq!(AgeBracket::from_label("inconnu"), None);
    }

    #[test]
    fn test_age_bracket_tiers_ordered() {
        for (i, bracket) in AgeBracket::ALL.iter().enumerate() {
            assert_eq!(bracket.tier(), i);
        }
    }

    #[test]
    fn test_skin_type_from_label() {
        assert_eq!(SkinType::from_label("Peau normale"), Some(SkinType::NormalBalanced));
        assert_eq!(SkinType::from_label("Peau claire"), Some(SkinType::ClearSensitive));
        assert_eq!(SkinType::from_label("Peau claire à tendance sèche"), Some(SkinType::ClearDry));
        assert_eq!(SkinType::from_label("Peau mate"), Some(SkinType::MatteNatural));
        assert_eq!(SkinType::from_label("Peau FONCÉE"), Some(SkinType::DarkRich));
        assert_eq!(SkinType::from_label("Peau mixte à grasse"), Some(SkinType::Combination));
        assert_eq!(SkinType::from_label("???"), None);
    }

    #[test]
    fn test_face_shape_from_label() {
        assert_eq!(FaceShape::from_label("Ovale"), Some(FaceShape::ClassicOval));
        assert_eq!(FaceShape::from_label("Ovale allongé"), Some(FaceShape::ElongatedOval));
        assert_eq!(FaceShape::from_label("visage carré"), Some(FaceShape::Square));
        assert_eq!(FaceShape::from_label("Rond"), Some(FaceShape::Round));
        assert_eq!(FaceShape::from_label("Triangle inversé"), Some(FaceShape::InvertedTriangle));
        assert_eq!(FaceShape::from_label("Rectangle"), Some(FaceShape::Rectangle));
        assert_eq!(FaceShape::from_label(""), None);
    }

    #[test]
    fn test_default_classification() {
        let c = Classification::default();
        assert_eq!(c.age_bracket, AgeBracket::From25To35);
        assert_eq!(c.skin_type, SkinType::NormalBalanced);
        assert_eq!(c.face_shape, FaceShape::ClassicOval);
        assert_eq!(c.diagnostic_score, 35);
        assert_eq!(c.face_hash, 0);
    }

    #[test]
    fn test_capture_accepts_flat_points() {
        let points: Vec<serde_json::Value> = (0..68)
            .map(|i| serde_json::json!({ "x": i as f64, "y": 1.0 }))
            .collect();
        let json = serde_json::json!({
            "box": { "width": 200.0, "height": 240.0, "confidence": 0.9 },
            "landmarks": points,
        });
        let capture: FaceCapture = serde_json::from_value(json).unwrap();
        let set = capture.landmarks.into_set().unwrap();
        assert_eq!(set.jaw.len(), 17);
        assert_eq!(capture.face_box.confidence, 0.9);
    }
}
