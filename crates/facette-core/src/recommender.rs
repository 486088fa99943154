//! Keyword-based product ranking for a classification.
//!
//! Three passes over the catalog (age bracket, skin type, high-confidence
//! premium picks) are merged with id deduplication, stably sorted by priority
//! and truncated. The function is a pure query: same inputs, same ordered output.

use crate::catalog::{Catalog, Product};
use crate::types::{AgeBracket, Classification, ProductRecommendation, SkinType};
use std::collections::HashSet;

pub const MAX_RECOMMENDATIONS: usize = 6;

pub const PRIORITY_PREMIUM: u8 = 0;
pub const PRIORITY_AGE: u8 = 1;
pub const PRIORITY_SKIN: u8 = 2;

/// Confidence above which the premium pass runs.
pub const PREMIUM_CONFIDENCE: f64 = 0.8;
/// Catalog entries taken, in natural order, when no special case applies.
pub const DEFAULT_PREMIUM_COUNT: usize = 2;

pub const PREMIUM_REASON: &str = "Recommandation IA premium (haute confiance)";

const MATURE_KEYWORDS: &[&str] = &["anti-âge", "raffermissant", "intensif", "régénérant", "lift"];

pub const AGE_KEYWORDS: [(AgeBracket, &[&str]); 5] = [
    (AgeBracket::From18To25, &["hydratant", "léger", "quotidien", "jeunesse", "protection"]),
    (AgeBracket::From25To35, &["vitamine", "anti-âge", "préventif", "soin", "hydratant"]),
    (AgeBracket::From35To50, &["anti-rides", "fermeté", "contour", "intensif", "réparatrice"]),
    (AgeBracket::From50To65, MATURE_KEYWORDS),
    (AgeBracket::Over65, MATURE_KEYWORDS),
];

pub const SKIN_KEYWORDS: [(SkinType, &[&str]); 6] = [
    (SkinType::ClearSensitive, &["protection", "solaire", "SPF", "écran", "sensitive"]),
    (SkinType::NormalBalanced, &["hydratant", "équilibrant", "quotidien", "normal"]),
    (SkinType::MatteNatural, &["éclat", "unifiant", "hydratant", "nutrition"]),
    (SkinType::Combination, &["équilibrant", "purifiant", "matifiant", "micellaire"]),
    (SkinType::ClearDry, &["protection", "solaire", "SPF", "écran", "sèche"]),
    (SkinType::DarkRich, &["nutrition", "réparatrice", "hydratant", "riche"]),
];

/// A premium keyword set triggered by a specific classification.
#[derive(Debug, Clone, Copy)]
pub struct SpecialCase {
    pub ages: &'static [AgeBracket],
    /// `None` matches every skin type.
    pub skins: Option<&'static [SkinType]>,
    /// Exclusive lower bound on confidence.
    pub min_confidence: f64,
    pub keywords: &'static [&'static str],
}

impl SpecialCase {
    pub fn applies(&self, classification: &Classification, confidence: f64) -> bool {
        self.ages.contains(&classification.age_bracket)
            && self.skins.map_or(true, |s| s.contains(&classification.skin_type))
            && confidence > self.min_confidence
    }
}

/// Evaluated in order; the first applicable case supplies the premium keywords.
pub const SPECIAL_CASES: [SpecialCase; 2] = [
    // Young fair skin: sun protection first.
    SpecialCase {
        ages: &[AgeBracket::From18To25],
        skins: Some(&[SkinType::ClearSensitive, SkinType::ClearDry]),
        min_confidence: PREMIUM_CONFIDENCE,
        keywords: &["solaire", "SPF", "protection"],
    },
    SpecialCase {
        ages: &[AgeBracket::From35To50],
        skins: None,
        min_confidence: 0.9,
        keywords: &["anti-âge", "sérum", "intensif"],
    },
];

pub fn age_keywords(bracket: AgeBracket) -> &'static [&'static str] {
    AGE_KEYWORDS
        .iter()
        .find(|(b, _)| *b == bracket)
        .map(|(_, k)| *k)
        .unwrap_or(&[])
}

pub fn skin_keywords(skin: SkinType) -> &'static [&'static str] {
    SKIN_KEYWORDS
        .iter()
        .find(|(s, _)| *s == skin)
        .map(|(_, k)| *k)
        .unwrap_or(&[])
}

fn find_by_keywords<'a>(catalog: &'a Catalog, keywords: &[&str]) -> Vec<&'a Product> {
    catalog.iter().filter(|p| p.matches_any(keywords)).collect()
}

/// Premium candidates: the first applicable special case, else the head of the catalog.
fn premium_candidates<'a>(
    classification: &Classification,
    confidence: f64,
    catalog: &'a Catalog,
) -> Vec<&'a Product> {
    match SPECIAL_CASES.iter().find(|c| c.applies(classification, confidence)) {
        Some(case) => find_by_keywords(catalog, case.keywords),
        None => catalog.iter().take(DEFAULT_PREMIUM_COUNT).collect(),
    }
}

/// Rank catalog products for a classification.
///
/// Returns at most [`MAX_RECOMMENDATIONS`] entries with non-decreasing priority
/// and unique product ids.
pub fn recommend<'a>(
    classification: &Classification,
    confidence: f64,
    catalog: &'a Catalog,
) -> Vec<ProductRecommendation<'a>> {
    let mut seen = HashSet::new();
    let mut recommendations = Vec::new();
    let mut push = |product: &'a Product, reason: &str, priority: u8| {
        if seen.insert(product.id) {
            recommendations.push(ProductRecommendation {
                product,
                reason: reason.to_string(),
                priority,
            });
        }
    };

    let age_reason = format!("Adapté pour votre tranche d'âge ({})", classification.age_bracket);
    for product in find_by_keywords(catalog, age_keywords(classification.age_bracket)) {
        push(product, &age_reason, PRIORITY_AGE);
    }

    let skin_reason = format!(
        "Spécialement conçu pour {}",
        classification.skin_type.label().to_lowercase()
    );
    for product in find_by_keywords(catalog, skin_keywords(classification.skin_type)) {
        push(product, &skin_reason, PRIORITY_SKIN);
    }

    if confidence > PREMIUM_CONFIDENCE {
        for product in premium_candidates(classification, confidence, catalog) {
            push(product, PREMIUM_REASON, PRIORITY_PREMIUM);
        }
    }

    // Stable: equal priorities keep first-seen order.
    recommendations.sort_by_key(|r| r.priority);
    recommendations.truncate(MAX_RECOMMENDATIONS);

    tracing::debug!(
        age = %classification.age_bracket,
        skin = %classification.skin_type,
        confidence,
        count = recommendations.len(),
        "recommendations ranked"
    );

    recommendations
}

/// Care tips for a classification: two for the age bracket, one for fair or
/// dark skin, and a remark when confidence is high.
pub fn personalized_tips(classification: &Classification, confidence: f64) -> Vec<String> {
    let mut tips: Vec<&str> = match classification.age_bracket {
        AgeBracket::From18To25 => vec![
            "Établissez une routine de soins préventive dès maintenant",
            "N'oubliez jamais la protection solaire quotidienne",
        ],
        AgeBracket::From25To35 => vec![
            "Intégrez des antioxydants comme la vitamine C",
            "Hydratation renforcée pour prévenir les premiers signes",
        ],
        AgeBracket::From35To50 => vec![
            "Concentrez-vous sur le contour des yeux",
            "Utilisez des soins de nuit réparateurs",
        ],
        AgeBracket::From50To65 | AgeBracket::Over65 => vec![
            "Privilégiez les soins intensifs et les sérums concentrés",
            "Pensez aux soins raffermissants quotidiens",
        ],
    };

    if classification.skin_type.is_clear() {
        tips.push("Protection solaire indispensable même en hiver");
    } else if classification.skin_type == SkinType::DarkRich {
        tips.push("Hydratation intensive pour éviter les taches");
    }

    if confidence > 0.85 {
        tips.push("Notre IA est très confiante dans cette analyse !");
    }

    tips.into_iter().map(String::from).collect()
}
