//! Geometric metric extraction from facial landmarks.
//!
//! Reduces a landmark set and its face box to a fixed set of distances and
//! ratios. Every landmark index referenced below is checked before use; a
//! frame that cannot produce complete metrics is rejected as a whole.

use crate::types::{FaceBox, FaceMetrics, LandmarkSet, Point};
use thiserror::Error;

// --- Landmark indices within each region ---
const EYE_OUTER: usize = 0;
const EYE_UPPER_LID_A: usize = 1;
const EYE_UPPER_LID_B: usize = 2;
const EYE_INNER: usize = 3;
const MOUTH_LEFT: usize = 0;
const MOUTH_RIGHT: usize = 6;
const NOSE_BRIDGE_TOP: usize = 0;
const NOSE_TIP_AREA: usize = 6;
const JAW_FIRST: usize = 0;
const JAW_LAST: usize = 16;

/// Reasons a frame cannot be measured. Every variant means "invalid landmarks":
/// no meaningful classification exists for the frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("degenerate face box {width}x{height}: both dimensions must be positive")]
    DegenerateFaceBox { width: f64, height: f64 },
    #[error("missing landmark {region}[{index}] (region has {len} points)")]
    MissingLandmark {
        region: &'static str,
        index: usize,
        len: usize,
    },
    #[error("non-finite coordinate at {region}[{index}]")]
    NonFiniteLandmark { region: &'static str, index: usize },
}

/// Fetch a landmark, rejecting missing indices and NaN/infinite coordinates.
fn point(region: &'static str, points: &[Point], index: usize) -> Result<Point, MetricsError> {
    let p = points.get(index).copied().ok_or(MetricsError::MissingLandmark {
        region,
        index,
        len: points.len(),
    })?;
    if !p.is_finite() {
        return Err(MetricsError::NonFiniteLandmark { region, index });
    }
    Ok(p)
}

/// Eye center: horizontal midpoint of the corners, vertical midpoint of the upper lid.
fn eye_center(region: &'static str, eye: &[Point]) -> Result<Point, MetricsError> {
    let outer = point(region, eye, EYE_OUTER)?;
    let inner = point(region, eye, EYE_INNER)?;
    let lid_a = point(region, eye, EYE_UPPER_LID_A)?;
    let lid_b = point(region, eye, EYE_UPPER_LID_B)?;
    Ok(Point::new((outer.x + inner.x) / 2.0, (lid_a.y + lid_b.y) / 2.0))
}

/// Compute face metrics for one detected face.
pub fn extract_metrics(landmarks: &LandmarkSet, face_box: &FaceBox) -> Result<FaceMetrics, MetricsError> {
    let (face_width, face_height) = (face_box.width, face_box.height);
    // Negated comparison also rejects NaN.
    if !(face_width > 0.0 && face_height > 0.0) || !face_width.is_finite() || !face_height.is_finite() {
        return Err(MetricsError::DegenerateFaceBox {
            width: face_width,
            height: face_height,
        });
    }

    let left_eye = eye_center("left_eye", &landmarks.left_eye)?;
    let right_eye = eye_center("right_eye", &landmarks.right_eye)?;
    let eye_distance = left_eye.distance(&right_eye);

    let mouth_width =
        (point("mouth", &landmarks.mouth, MOUTH_RIGHT)?.x - point("mouth", &landmarks.mouth, MOUTH_LEFT)?.x).abs();

    let nose_top = point("nose", &landmarks.nose, NOSE_BRIDGE_TOP)?;
    let nose_height = (point("nose", &landmarks.nose, NOSE_TIP_AREA)?.y - nose_top.y).abs();

    let jaw_width = (point("jaw", &landmarks.jaw, JAW_LAST)?.x - point("jaw", &landmarks.jaw, JAW_FIRST)?.x).abs();

    let metrics = FaceMetrics {
        face_width,
        face_height,
        eye_distance,
        mouth_width,
        nose_height,
        jaw_width,
        nose_to_eye_ratio: (nose_top.y - left_eye.y).abs() / face_height,
        face_ratio: face_height / face_width,
        jaw_ratio: jaw_width / face_width,
    };

    tracing::debug!(
        eye_distance = metrics.eye_distance,
        mouth_width = metrics.mouth_width,
        nose_height = metrics.nose_height,
        jaw_width = metrics.jaw_width,
        nose_to_eye_ratio = metrics.nose_to_eye_ratio,
        face_ratio = metrics.face_ratio,
        jaw_ratio = metrics.jaw_ratio,
        "face metrics extracted"
    );

    Ok(metrics)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn eye(x0: f64, y: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y),
            Point::new(x0 + 8.0, y - 4.0),
            Point::new(x0 + 16.0, y - 4.0),
            Point::new(x0 + 24.0, y),
            Point::new(x0 + 16.0, y + 3.0),
            Point::new(x0 + 8.0, y + 3.0),
        ]
    }

    /// A plausible frontal face inside a 200×240 box.
    pub(crate) fn sample_landmarks() -> LandmarkSet {
        let jaw = (0..17)
            .map(|i| Point::new(10.0 + i as f64 * 11.25, 120.0 + (i as f64 - 8.0).powi(2)))
            .collect();
        let nose = (0..9).map(|i| Point::new(100.0, 90.0 + i as f64 * 8.0)).collect();
        let mouth = (0..20)
            .map(|i| Point::new(70.0 + (i % 7) as f64 * 10.0, 180.0))
            .collect();
        LandmarkSet {
            jaw,
            nose,
            left_eye: eye(50.0, 90.0),
            right_eye: eye(126.0, 90.0),
            mouth,
        }
    }

    pub(crate) fn sample_box() -> FaceBox {
        FaceBox { width: 200.0, height: 240.0, confidence: 0.92 }
    }

    #[test]
    fn test_extract_sample_face() {
        let m = extract_metrics(&sample_landmarks(), &sample_box()).unwrap();

        // Eye centers at (62, 86) and (138, 86).
        assert!((m.eye_distance - 76.0).abs() < 1e-9, "eye_distance = {}", m.eye_distance);
        assert!((m.mouth_width - 60.0).abs() < 1e-9);
        assert!((m.nose_height - 48.0).abs() < 1e-9);
        assert!((m.jaw_width - 180.0).abs() < 1e-9);
        assert!((m.nose_to_eye_ratio - 4.0 / 240.0).abs() < 1e-12);
        assert!((m.face_ratio - 1.2).abs() < 1e-12);
        assert!((m.jaw_ratio - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_non_negative_and_finite() {
        // Mirror the face horizontally: spans are absolute, so lengths stay non-negative.
        let mut lm = sample_landmarks();
        for region in [&mut lm.jaw, &mut lm.nose, &mut lm.left_eye, &mut lm.right_eye, &mut lm.mouth] {
            for p in region.iter_mut() {
                p.x = 200.0 - p.x;
            }
        }
        let m = extract_metrics(&lm, &sample_box()).unwrap();
        for v in [m.eye_distance, m.mouth_width, m.nose_height, m.jaw_width] {
            assert!(v >= 0.0);
        }
        assert!(m.is_well_formed());
    }

    #[test]
    fn test_zero_width_box_rejected() {
        let face_box = FaceBox { width: 0.0, height: 240.0, confidence: 0.9 };
        let err = extract_metrics(&sample_landmarks(), &face_box).unwrap_err();
        assert!(matches!(err, MetricsError::DegenerateFaceBox { .. }));
    }

    #[test]
    fn test_nan_box_rejected() {
        let face_box = FaceBox { width: f64::NAN, height: 240.0, confidence: 0.9 };
        assert!(extract_metrics(&sample_landmarks(), &face_box).is_err());
    }

    #[test]
    fn test_short_jaw_rejected() {
        let mut lm = sample_landmarks();
        lm.jaw.truncate(16);
        let err = extract_metrics(&lm, &sample_box()).unwrap_err();
        assert_eq!(
            err,
            MetricsError::MissingLandmark { region: "jaw", index: 16, len: 16 }
        );
    }

    #[test]
    fn test_short_mouth_rejected() {
        let mut lm = sample_landmarks();
        lm.mouth.truncate(6);
        assert!(matches!(
            extract_metrics(&lm, &sample_box()),
            Err(MetricsError::MissingLandmark { region: "mouth", index: 6, .. })
        ));
    }

    #[test]
    fn test_non_finite_landmark_rejected() {
        let mut lm = sample_landmarks();
        lm.nose[0].y = f64::INFINITY;
        assert_eq!(
            extract_metrics(&lm, &sample_box()).unwrap_err(),
            MetricsError::NonFiniteLandmark { region: "nose", index: 0 }
        );
    }
}
