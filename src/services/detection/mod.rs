// Detection Module
// Heuristic AI-visual-content detection organized into specialized submodules:
// - indicators: per-descriptor heuristic signal functions
// - element_scorer: weighted element score and confidence
// - aggregation: page-level probability and confidence
// - session: request state machine with fork-join scoring
// - report: response payload for the presentation layer

pub mod indicators;
pub mod element_scorer;
pub mod aggregation;
pub mod session;
pub mod report;

// Re-export commonly used functions
pub use indicators::{compute_indicators, is_power_of_two, Indicator};
pub use element_scorer::{
    element_confidence,
    indicator_weight,
    score_element,
    score_indicators,
    DEFAULT_INDICATOR_WEIGHT,
};
pub use aggregation::{aggregate_elements, element_count_confidence, page_confidence};
pub use session::{
    analyze_descriptors,
    analyze_descriptors_async,
    DetectionError,
    DetectionSession,
    MediaCollector,
    DEFAULT_MAX_CONCURRENCY,
};
pub use report::{build_response, media_element_info, AI_ELEMENT_THRESHOLD};
