use crate::types::{FactorScores, SignalScores};

pub const TEXT_WEIGHT: f32 = 0.60;
pub const LOCATION_WEIGHT: f32 = 0.30;
pub const CATEGORY_WEIGHT: f32 = 0.10;

/// Weighted fusion of the three signals. With inputs in [0, 1] the result is
/// in [0, 1]; a negative cosine pulls the score down and is not clamped.
pub fn combined_score(text_similarity: f32, location_similarity: f32, category_match: bool) -> f32 {
    let category = if category_match { 1.0 } else { 0.0 };
    TEXT_WEIGHT * text_similarity + LOCATION_WEIGHT * location_similarity + CATEGORY_WEIGHT * category
}

impl SignalScores {
    pub fn combined(&self) -> f32 {
        combined_score(self.text, self.location, self.category)
    }

    pub fn factor_scores(&self) -> FactorScores {
        factor_scores(self.text, self.location, self.category)
    }
}

pub fn factor_scores(text_similarity: f32, location_similarity: f32, category_match: bool) -> FactorScores {
    FactorScores {
        text_similarity: as_percent(text_similarity),
        location_match: as_percent(location_similarity),
        category_match: if category_match { 100.0 } else { 0.0 },
    }
}

/// Fraction to percentage rounded to one decimal place.
pub fn as_percent(fraction: f32) -> f32 {
    (fraction * 1000.0).round() / 10.0
}
