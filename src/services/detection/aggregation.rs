// Aggregation Logic
// Folds per-element results into the page-level probability and confidence

use crate::models::{ElementResult, IndicatorSet, PageAggregate};
use std::collections::BTreeMap;

const HIGH_SCORE_CONFIDENCE: f64 = 0.8;
const LOW_SCORE_CONFIDENCE: f64 = 0.6;
const MAX_ELEMENT_CONFIDENCE: f64 = 0.9;

/// Aggregate element results into the page result.
/// Indicators are averaged over the elements that produced them, so
/// video-only indicators average over video elements only.
pub fn aggregate_elements(elements: &[ElementResult]) -> PageAggregate {
    if elements.is_empty() {
        return PageAggregate::default();
    }

    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for element in elements {
        for (name, value) in &element.indicators {
            let entry = sums.entry(name.as_str()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    let indicators: IndicatorSet = sums
        .into_iter()
        .map(|(name, (sum, count))| (name.to_string(), sum / count as f64))
        .collect();

    let ai_probability =
        elements.iter().map(|e| e.ai_score).sum::<f64>() / elements.len() as f64;

    PageAggregate {
        ai_probability,
        confidence: page_confidence(ai_probability, elements.len()),
        indicators,
    }
}

/// Element-count contribution to page confidence
pub fn element_count_confidence(count: usize) -> f64 {
    (0.5 + count as f64 * 0.1).min(MAX_ELEMENT_CONFIDENCE)
}

pub fn page_confidence(ai_probability: f64, count: usize) -> f64 {
    let score_confidence = if ai_probability > 0.5 {
        HIGH_SCORE_CONFIDENCE
    } else {
        LOW_SCORE_CONFIDENCE
    };
    (score_confidence + element_count_confidence(count)) / 2.0
}
