//! Prompt construction for face classification requests.

use crate::client::Prompt;
use facette_core::FaceMetrics;
use serde::Serialize;

/// Measurements sent to the provider. Field names are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnalysisData {
    pub face_width: f64,
    pub face_height: f64,
    pub eye_distance: f64,
    pub mouth_width: f64,
    pub nose_height: f64,
    pub jaw_width: f64,
    pub nose_to_eye_ratio: f64,
    pub face_ratio: f64,
    pub jaw_ratio: f64,
    /// Detector confidence in [0, 1].
    pub confidence: f64,
}

impl FaceAnalysisData {
    pub fn from_metrics(metrics: &FaceMetrics, confidence: f64) -> Self {
        Self {
            face_width: metrics.face_width,
            face_height: metrics.face_height,
            eye_distance: metrics.eye_distance,
            mouth_width: metrics.mouth_width,
            nose_height: metrics.nose_height,
            jaw_width: metrics.jaw_width,
            nose_to_eye_ratio: metrics.nose_to_eye_ratio,
            face_ratio: metrics.face_ratio,
            jaw_ratio: metrics.jaw_ratio,
            confidence,
        }
    }
}

pub const SYSTEM_PROMPT: &str = r#"Tu es un expert en analyse faciale et cosmétologie. Tu analyses les données géométriques d'un visage pour donner des recommandations précises sur l'âge, le type de peau, et les produits cosmétiques adaptés.

Réponds TOUJOURS au format JSON strict suivant :
{
  "estimatedAge": "XX-XX ans",
  "skinType": "description du type de peau",
  "faceShape": "forme du visage",
  "personalityTraits": ["trait1", "trait2", "trait3"],
  "beautyTips": ["conseil1", "conseil2", "conseil3"],
  "productRecommendations": ["produit1", "produit2", "produit3"],
  "confidence": 0.85,
  "explanation": "Explication de l'analyse"
}"#;

pub const PING_PROMPT: &str = "Test de connexion. Réponds juste \"OK\".";
pub const PING_MAX_TOKENS: u32 = 10;

/// Build the classification prompt for one face.
pub fn analysis_prompt(data: &FaceAnalysisData) -> Prompt {
    let user = format!(
        "Analyse ces données faciales géométriques d'une personne et donne-moi une évaluation précise :\n\
         \n\
         DONNÉES MESURÉES :\n\
         - Largeur du visage: {:.2}px\n\
         - Hauteur du visage: {:.2}px\n\
         - Distance entre les yeux: {:.2}px\n\
         - Largeur de la bouche: {:.2}px\n\
         - Hauteur du nez: {:.2}px\n\
         - Largeur de la mâchoire: {:.2}px\n\
         \n\
         RATIOS CALCULÉS :\n\
         - Ratio nez/œil: {:.4}\n\
         - Ratio hauteur/largeur visage: {:.4}\n\
         - Ratio mâchoire/largeur: {:.4}\n\
         - Confiance de détection: {:.1}%\n\
         \n\
         Basé sur ces mesures précises, estime l'âge, le type de peau, la forme du visage, \
         et donne des recommandations de produits cosmétiques et de beauté adaptés. \
         Sois précis et réaliste dans tes estimations.",
        data.face_width,
        data.face_height,
        data.eye_distance,
        data.mouth_width,
        data.nose_height,
        data.jaw_width,
        data.nose_to_eye_ratio,
        data.face_ratio,
        data.jaw_ratio,
        data.confidence * 100.0,
    );

    Prompt {
        system: Some(SYSTEM_PROMPT.to_string()),
        user,
        max_tokens: None,
    }
}

pub fn ping_prompt() -> Prompt {
    Prompt {
        system: None,
        user: PING_PROMPT.to_string(),
        max_tokens: Some(PING_MAX_TOKENS),
    }
}
