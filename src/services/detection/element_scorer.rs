// Element Scorer
// Combines one descriptor's indicators into a weighted AI score and a
// signal-strength confidence.

use crate::models::{ElementResult, IndicatorSet, MediaDescriptor};

use super::indicators::{compute_indicators, Indicator};

/// Weight applied to indicator names outside the fixed table
pub const DEFAULT_INDICATOR_WEIGHT: f64 = 0.10;
/// Indicators above this count as strong signals for confidence
const STRONG_INDICATOR_THRESHOLD: f64 = 0.7;
const BASE_CONFIDENCE: f64 = 0.5;
const KNOWN_DIMENSIONS_BONUS: f64 = 0.2;
const STRONG_INDICATOR_BONUS: f64 = 0.1;

pub fn indicator_weight(name: &str) -> f64 {
    match Indicator::from_name(name) {
        Some(Indicator::PerfectSymmetry) => 0.15,
        Some(Indicator::UnusualPatterns) => 0.20,
        Some(Indicator::ColorConsistency) => 0.15,
        Some(Indicator::TextureAnalysis) => 0.15,
        Some(Indicator::EdgeDetection) => 0.15,
        Some(Indicator::MetadataAnalysis) => 0.25,
        Some(Indicator::FileCharacteristics) => 0.20,
        Some(Indicator::AiArtifacts) => 0.30,
        Some(Indicator::VideoCharacteristics) => 0.35,
        Some(Indicator::ProcessedImageAnalysis) => 0.40,
        None => DEFAULT_INDICATOR_WEIGHT,
    }
}

/// Weighted mean of the indicators present. Empty sets score 0.
pub fn score_indicators(indicators: &IndicatorSet) -> f64 {
    let (weighted, total) = indicators
        .iter()
        .fold((0.0, 0.0), |(weighted, total), (name, value)| {
            let w = indicator_weight(name);
            (weighted + value * w, total + w)
        });
    if total <= 0.0 {
        return 0.0;
    }
    weighted / total
}

/// Confidence measures how much signal was available, not how AI-like it is
pub fn element_confidence(descriptor: &MediaDescriptor, indicators: &IndicatorSet) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if descriptor.is_analyzable() {
        confidence += KNOWN_DIMENSIONS_BONUS;
    }
    let strong = indicators
        .values()
        .filter(|v| **v > STRONG_INDICATOR_THRESHOLD)
        .count();
    confidence += strong as f64 * STRONG_INDICATOR_BONUS;
    confidence.min(1.0)
}

/// Score a single descriptor end to end
pub fn score_element(descriptor: &MediaDescriptor) -> ElementResult {
    let indicators = compute_indicators(descriptor);
    let ai_score = score_indicators(&indicators);
    let confidence = element_confidence(descriptor, &indicators);
    ElementResult {
        descriptor: descriptor.clone(),
        indicators,
        ai_score,
        confidence,
    }
}
