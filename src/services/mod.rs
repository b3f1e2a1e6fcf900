// visualAI Core Services

pub mod config_store;
pub mod detection;

pub use config_store::*;

// Re-export detection module functions
pub use detection::{
    aggregate_elements,
    analyze_descriptors,
    analyze_descriptors_async,
    build_response,
    compute_indicators,
    score_element,
    DetectionError,
    DetectionSession,
    MediaCollector,
};
