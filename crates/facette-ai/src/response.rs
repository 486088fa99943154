//! Extraction and lenient parsing of the provider's analysis payload.
//!
//! Providers frequently wrap the JSON answer in commentary or code fences.
//! The first JSON object in the text is taken; each field is read on its own
//! and falls back to a fixed default when absent or of the wrong shape.

use crate::client::AiError;
use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_ESTIMATED_AGE: &str = "25-35 ans";
pub const DEFAULT_SKIN_TYPE: &str = "Peau normale";
pub const DEFAULT_FACE_SHAPE: &str = "Ovale";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_EXPLANATION: &str = "Analyse basée sur les proportions faciales";

/// Keys of the expected response object.
pub const RESPONSE_KEYS: [&str; 8] = [
    "estimatedAge",
    "skinType",
    "faceShape",
    "personalityTraits",
    "beautyTips",
    "productRecommendations",
    "confidence",
    "explanation",
];

/// Canned analysis shown when the provider cannot be used.
pub const FALLBACK_PERSONALITY: [&str; 3] = ["Confiant", "Amical", "Authentique"];
pub const FALLBACK_TIPS: [&str; 3] = [
    "Hydratez votre peau quotidiennement",
    "Utilisez une protection solaire",
    "Nettoyez votre visage matin et soir",
];
pub const FALLBACK_PRODUCT_HINTS: [&str; 3] = [
    "Crème hydratante quotidienne",
    "Nettoyant doux",
    "Protection solaire SPF 30+",
];
pub const FALLBACK_EXPLANATION: &str = "Analyse de base basée sur les proportions faciales standard";

/// Structured analysis returned by the AI provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub estimated_age: String,
    pub skin_type: String,
    pub face_shape: String,
    pub personality_traits: Vec<String>,
    pub beauty_tips: Vec<String>,
    pub product_recommendations: Vec<String>,
    /// In (0, 1].
    pub confidence: f64,
    pub explanation: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The fixed personality and tips content used on the local path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackContent {
    pub personality_traits: Vec<String>,
    pub beauty_tips: Vec<String>,
    pub product_recommendations: Vec<String>,
    pub explanation: String,
}

impl Default for FallbackContent {
    fn default() -> Self {
        Self {
            personality_traits: owned(&FALLBACK_PERSONALITY),
            beauty_tips: owned(&FALLBACK_TIPS),
            product_recommendations: owned(&FALLBACK_PRODUCT_HINTS),
            explanation: FALLBACK_EXPLANATION.to_string(),
        }
    }
}

/// Find the first JSON object embedded in free text.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn confidence_field(obj: &Map<String, Value>) -> f64 {
    let raw = match obj.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(c) if c.is_finite() && c > 0.0 => c.min(1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Parse a provider reply into an [`AiAnalysis`].
///
/// Fails only when the text holds no JSON object carrying at least one of
/// the expected keys.
pub fn parse_analysis(text: &str) -> Result<AiAnalysis, AiError> {
    let obj = extract_json_object(text)
        .ok_or_else(|| AiError::Malformed("no JSON object in response".to_string()))?;

    if !RESPONSE_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Err(AiError::Malformed("JSON object has none of the expected keys".to_string()));
    }

    let analysis = AiAnalysis {
        estimated_age: string_field(&obj, "estimatedAge").unwrap_or_else(|| DEFAULT_ESTIMATED_AGE.to_string()),
        skin_type: string_field(&obj, "skinType").unwrap_or_else(|| DEFAULT_SKIN_TYPE.to_string()),
        face_shape: string_field(&obj, "faceShape").unwrap_or_else(|| DEFAULT_FACE_SHAPE.to_string()),
        personality_traits: list_field(&obj, "personalityTraits"),
        beauty_tips: list_field(&obj, "beautyTips"),
        product_recommendations: list_field(&obj, "productRecommendations"),
        confidence: confidence_field(&obj),
        explanation: string_field(&obj, "explanation").unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
    };

    tracing::debug!(
        age = %analysis.estimated_age,
        skin = %analysis.skin_type,
        shape = %analysis.face_shape,
        confidence = analysis.confidence,
        "AI analysis parsed"
    );

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "estimatedAge": "35-45 ans",
        "skinType": "Peau mixte",
        "faceShape": "Carré",
        "personalityTraits": ["Déterminé", "Calme"],
        "beautyTips": ["Sérum le soir", "SPF 50 le jour"],
        "productRecommendations": ["Sérum anti-rides"],
        "confidence": 0.92,
        "explanation": "Mâchoire marquée"
    }"#;

    #[test]
    fn test_parse_full_payload() {
        let a = parse_analysis(FULL).unwrap();
        assert_eq!(a.estimated_age, "35-45 ans");
        assert_eq!(a.skin_type, "Peau mixte");
        assert_eq!(a.face_shape, "Carré");
        assert_eq!(a.personality_traits, vec!["Déterminé", "Calme"]);
        assert_eq!(a.beauty_tips.len(), 2);
        assert_eq!(a.product_recommendations, vec!["Sérum anti-rides"]);
        assert!((a.confidence - 0.92).abs() < 1e-12);
        assert_eq!(a.explanation, "Mâchoire marquée");
    }

    #[test]
    fn test_extract_from_commentary_and_fences() {
        let text = format!("Voici mon analyse :\n```json\n{FULL}\n```\nN'hésitez pas {{si besoin}}.");
        let a = parse_analysis(&text).unwrap();
        assert_eq!(a.face_shape, "Carré");
    }

    #[test]
    fn test_skips_non_json_braces() {
        let text = r#"Format {attendu} : {"skinType": "Peau mate"}"#;
        let a = parse_analysis(text).unwrap();
        assert_eq!(a.skin_type, "Peau mate");
        assert_eq!(a.estimated_age, DEFAULT_ESTIMATED_AGE);
    }

    #[test]
    fn test_missing_and_malformed_fields_use_defaults() {
        let a = parse_analysis(r#"{"estimatedAge": "", "faceShape": 3, "beautyTips": "Boire de l'eau", "confidence": "abc"}"#)
            .unwrap();
        assert_eq!(a.estimated_age, DEFAULT_ESTIMATED_AGE);
        assert_eq!(a.skin_type, DEFAULT_SKIN_TYPE);
        assert_eq!(a.face_shape, "3");
        assert_eq!(a.beauty_tips, vec!["Boire de l'eau"]);
        assert!(a.personality_traits.is_empty());
        assert_eq!(a.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(a.explanation, DEFAULT_EXPLANATION);
    }

    #[test]
    fn test_confidence_bounds() {
        let conf = |raw: &str| parse_analysis(&format!(r#"{{"confidence": {raw}}}"#)).unwrap().confidence;
        assert_eq!(conf("0"), DEFAULT_CONFIDENCE);
        assert_eq!(conf("-0.4"), DEFAULT_CONFIDENCE);
        assert_eq!(conf("1.7"), 1.0);
        assert_eq!(conf("\"0.8\""), 0.8);
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_analysis("Désolé, je ne peux pas analyser ce visage.").unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }

    #[test]
    fn test_unrelated_object_is_malformed() {
        let err = parse_analysis(r#"{"error": "quota exceeded"}"#).unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        assert!(parse_analysis(r#"{"estimatedAge": "25-35 ans", "skinType": "#).is_err());
    }

    #[test]
    fn test_fallback_content() {
        let f = FallbackContent::default();
        assert_eq!(f.personality_traits, vec!["Confiant", "Amical", "Authentique"]);
        assert_eq!(f.beauty_tips.len(), 3);
        assert_eq!(f.product_recommendations[2], "Protection solaire SPF 30+");
    }
}
