// Indicator Library
// Heuristic signal functions over known media metadata (dimensions, URL, duration).
//
// Every indicator accumulates partial credit from independent checks and clamps
// the sum to 1. Dimension checks only fire when both dimensions are known, so
// each function is total over any descriptor.

use crate::models::{IndicatorSet, MediaDescriptor, MediaKind};
use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// Reference tables (kept verbatim, duplicates are part of the scoring)
// ============================================================================

const RATIO_TOLERANCE: f64 = 0.01;

/// Sizes commonly produced by image generators
const COMMON_AI_SIZES: [(u32, u32); 11] = [
    (512, 512),
    (1024, 1024),
    (768, 768),
    (512, 768),
    (1024, 768),
    (1920, 1080),
    (1080, 1920),
    (1536, 1536),
    (2048, 2048),
    // Portrait 3:4 here, not a second 1024x1024. A repeated square entry
    // is counted twice by size_matches and breaks the 1024x1024 scores.
    (768, 1024),
    (512, 512),
];

const GENERATOR_EDGE_SIZES: [u32; 5] = [512, 768, 1024, 1536, 2048];

/// Export sizes typical of editing tools and CMS pipelines
const PROCESSED_EDGE_SIZES: [u32; 5] = [800, 1200, 1600, 1920, 2560];

const PATTERN_ASPECT_RATIOS: [f64; 5] = [1.0, 16.0 / 9.0, 4.0 / 3.0, 3.0 / 2.0, 5.0 / 4.0];

const ARTIFACT_ASPECT_RATIOS: [f64; 7] = [
    1.0,
    4.0 / 3.0,
    3.0 / 4.0,
    16.0 / 9.0,
    9.0 / 16.0,
    3.0 / 2.0,
    2.0 / 3.0,
];

const PROCESSED_ASPECT_RATIOS: [f64; 4] = [1.0, 4.0 / 3.0, 3.0 / 2.0, 16.0 / 9.0];

const VIDEO_ASPECT_RATIOS: [f64; 4] = [16.0 / 9.0, 9.0 / 16.0, 1.0, 4.0 / 3.0];

const VIDEO_SIZES: [(u32, u32); 11] = [
    (1920, 1080),
    (1080, 1920),
    (1280, 720),
    (720, 1280),
    (1024, 1024),
    (512, 512),
    (768, 768),
    (1024, 576),
    (576, 1024),
    (1920, 1080),
    (1280, 720),
];

const VIDEO_PLATFORM_KEYWORDS: [&str; 9] = [
    "runway", "pika", "sora", "synthesia", "heygen", "d-id", "luma", "kling", "gen-2",
];

const PROCESSING_KEYWORDS: [&str; 8] = [
    "edited",
    "processed",
    "filtered",
    "enhanced",
    "upscaled",
    "resized",
    "compressed",
    "optimized",
];

const IMAGE_HOST_DOMAINS: [&str; 7] = [
    "imgur.com",
    "flickr.com",
    "unsplash.com",
    "pexels.com",
    "pixabay.com",
    "cloudinary.com",
    "imgix.net",
];

const AI_PLATFORMS: [&str; 14] = [
    "midjourney",
    "dall-e",
    "stable-diffusion",
    "generated",
    "ai-generated",
    "synthetic",
    "artificial",
    "picsum",
    "sample",
    "openai",
    "anthropic",
    "runway",
    "pika",
    "sora",
];

const AI_DOMAINS: [&str; 7] = [
    "openai.com",
    "anthropic.com",
    "midjourney.com",
    "stability.ai",
    "runwayml.com",
    "pika.art",
    "sora.openai.com",
];

const DIMENSION_STRINGS: [&str; 7] = [
    "512x512",
    "768x768",
    "1024x1024",
    "1536x1536",
    "2048x2048",
    "1920x1080",
    "1080x1920",
];

fn naming_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"[a-f0-9]{32}",
            r"generated_\d+",
            r"ai_\d+",
            r"random=\d+",
            r"sample",
            r"dalle",
            r"midjourney",
            r"stable",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("naming pattern regex"))
        .collect()
    })
}

// ============================================================================
// Indicator names
// ============================================================================

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Indicator {
    PerfectSymmetry,
    UnusualPatterns,
    ColorConsistency,
    TextureAnalysis,
    EdgeDetection,
    MetadataAnalysis,
    FileCharacteristics,
    AiArtifacts,
    VideoCharacteristics,
    ProcessedImageAnalysis,
}

impl Indicator {
    pub const ALL: [Indicator; 10] = [
        Indicator::PerfectSymmetry,
        Indicator::UnusualPatterns,
        Indicator::ColorConsistency,
        Indicator::TextureAnalysis,
        Indicator::EdgeDetection,
        Indicator::MetadataAnalysis,
        Indicator::FileCharacteristics,
        Indicator::AiArtifacts,
        Indicator::VideoCharacteristics,
        Indicator::ProcessedImageAnalysis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::PerfectSymmetry => "Perfect Symmetry",
            Indicator::UnusualPatterns => "Unusual Patterns",
            Indicator::ColorConsistency => "Color Consistency",
            Indicator::TextureAnalysis => "Texture Analysis",
            Indicator::EdgeDetection => "Edge Detection",
            Indicator::MetadataAnalysis => "Metadata Analysis",
            Indicator::FileCharacteristics => "File Characteristics",
            Indicator::AiArtifacts => "AI Artifacts",
            Indicator::VideoCharacteristics => "Video Characteristics",
            Indicator::ProcessedImageAnalysis => "Processed Image Analysis",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.name() == name)
    }

    /// Whether this indicator is evaluated for the given media kind
    pub fn applies_to(&self, kind: MediaKind) -> bool {
        match self {
            Indicator::VideoCharacteristics => kind == MediaKind::Video,
            _ => true,
        }
    }

    pub fn evaluate(&self, descriptor: &MediaDescriptor) -> f64 {
        match self {
            Indicator::PerfectSymmetry => perfect_symmetry(descriptor),
            Indicator::UnusualPatterns => unusual_patterns(descriptor),
            Indicator::ColorConsistency => color_consistency(descriptor),
            Indicator::TextureAnalysis => texture_analysis(descriptor),
            Indicator::EdgeDetection => edge_detection(descriptor),
            Indicator::MetadataAnalysis => metadata_analysis(descriptor),
            Indicator::FileCharacteristics => file_characteristics(descriptor),
            Indicator::AiArtifacts => ai_artifacts(descriptor),
            Indicator::VideoCharacteristics => video_characteristics(descriptor),
            Indicator::ProcessedImageAnalysis => processed_image_analysis(descriptor),
        }
    }
}

/// Evaluate every indicator that applies to the descriptor's media kind
pub fn compute_indicators(descriptor: &MediaDescriptor) -> IndicatorSet {
    Indicator::ALL
        .iter()
        .filter(|i| i.applies_to(descriptor.kind))
        .map(|i| (i.name().to_string(), i.evaluate(descriptor)))
        .collect()
}

// ============================================================================
// Shared checks
// ============================================================================

#[inline]
pub fn is_power_of_two(n: u32) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

#[inline]
fn aspect_ratio(w: u32, h: u32) -> f64 {
    w as f64 / h as f64
}

fn ratio_matches(ratio: f64, table: &[f64]) -> usize {
    table
        .iter()
        .filter(|r| (ratio - **r).abs() < RATIO_TOLERANCE)
        .count()
}

fn size_matches(w: u32, h: u32, table: &[(u32, u32)]) -> usize {
    table.iter().filter(|(tw, th)| *tw == w && *th == h).count()
}

fn keyword_matches(haystack: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| haystack.contains(*k)).count()
}

fn both_pow2(w: u32, h: u32) -> bool {
    is_power_of_two(w) && is_power_of_two(h)
}

#[inline]
fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

// ============================================================================
// Indicators
// ============================================================================

pub fn perfect_symmetry(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    if (aspect_ratio(w, h) - 1.0).abs() < RATIO_TOLERANCE {
        score += 0.4;
    }
    if both_pow2(w, h) {
        score += 0.3;
    }
    if w >= 2048 && h >= 2048 && w == h {
        score += 0.5;
    }
    clamp_score(score)
}

pub fn unusual_patterns(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    score += 0.2 * ratio_matches(aspect_ratio(w, h), &PATTERN_ASPECT_RATIOS) as f64;
    score += 0.3 * size_matches(w, h, &COMMON_AI_SIZES) as f64;
    if w == 1024 && h == 1024 {
        score += 0.4;
    }
    if w == 512 && h == 512 {
        score += 0.3;
    }
    clamp_score(score)
}

pub fn color_consistency(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    if w >= 1024 && h >= 1024 {
        score += 0.3;
    }
    if w == 512 && h == 512 {
        score += 0.4;
    }
    if w >= 2048 || h >= 2048 {
        score += 0.3;
    }
    if w == h && w >= 1024 {
        score += 0.4;
    }
    clamp_score(score)
}

pub fn texture_analysis(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    if w >= 2048 || h >= 2048 {
        score += 0.3;
    }
    if w == h {
        score += 0.2;
    }
    if both_pow2(w, h) {
        score += 0.3;
    }
    if w == 1536 && h == 1536 {
        score += 0.4;
    }
    clamp_score(score)
}

pub fn edge_detection(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    if GENERATOR_EDGE_SIZES.contains(&w) && GENERATOR_EDGE_SIZES.contains(&h) {
        score += 0.4;
    }
    if w == h {
        score += 0.3;
    }
    if w >= 2048 || h >= 2048 {
        score += 0.3;
    }
    if both_pow2(w, h) {
        score += 0.2;
    }
    clamp_score(score)
}

pub fn ai_artifacts(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    if w >= 2048 && h >= 2048 {
        score += 0.4;
    }
    if both_pow2(w, h) && w == h {
        score += 0.5;
    }
    if GENERATOR_EDGE_SIZES.contains(&w) && GENERATOR_EDGE_SIZES.contains(&h) {
        score += 0.4;
    }
    if w == 1024 && h == 1024 {
        score += 0.5;
    }
    if w == 512 && h == 512 {
        score += 0.4;
    }
    if w >= 1024 && h >= 1024 {
        score += 0.3;
    }
    if PROCESSED_EDGE_SIZES.contains(&w) || PROCESSED_EDGE_SIZES.contains(&h) {
        score += 0.3;
    }
    score += 0.2 * ratio_matches(aspect_ratio(w, h), &ARTIFACT_ASPECT_RATIOS) as f64;
    clamp_score(score)
}

/// Video-only signals: generator output sizes, short clip durations and
/// video-generation platforms in the source URL.
pub fn video_characteristics(descriptor: &MediaDescriptor) -> f64 {
    if !descriptor.is_video() {
        return 0.0;
    }
    let mut score = 0.0;

    if let Some((w, h)) = descriptor.dimensions() {
        score += 0.4 * size_matches(w, h, &VIDEO_SIZES) as f64;
        if w == h {
            score += 0.3;
        }
        if both_pow2(w, h) {
            score += 0.3;
        }
        if w >= 2048 || h >= 2048 {
            score += 0.4;
        }
        score += 0.2 * ratio_matches(aspect_ratio(w, h), &VIDEO_ASPECT_RATIOS) as f64;
        if w == 1920 && h == 1080 {
            score += 0.5;
        }
        if w == 1024 && h == 1024 {
            score += 0.4;
        }
    }

    // Zero, negative or NaN durations mean the metadata has not loaded yet.
    if let Some(duration) = descriptor.duration_seconds.filter(|d| d.is_finite() && *d > 0.0) {
        if duration % 5.0 == 0.0 && duration <= 60.0 {
            score += 0.2;
        }
        if duration <= 15.0 {
            score += 0.3;
        }
    }

    let src = descriptor.source_url.to_lowercase();
    score += 0.5 * keyword_matches(&src, &VIDEO_PLATFORM_KEYWORDS) as f64;

    clamp_score(score)
}

/// Signals left behind by resizing/export pipelines and image hosts
pub fn processed_image_analysis(descriptor: &MediaDescriptor) -> f64 {
    let mut score = 0.0;

    if let Some((w, h)) = descriptor.dimensions() {
        if w >= 1024 || h >= 1024 {
            score += 0.3;
        }
        if PROCESSED_EDGE_SIZES.contains(&w) || PROCESSED_EDGE_SIZES.contains(&h) {
            score += 0.4;
        }
        score += 0.2 * ratio_matches(aspect_ratio(w, h), &PROCESSED_ASPECT_RATIOS) as f64;
        if w >= 800 && h >= 800 {
            score += 0.3;
        }
        if w % 8 == 0 && h % 8 == 0 {
            score += 0.2;
        }
        for block in [256, 512, 1024] {
            if w % block == 0 || h % block == 0 {
                score += 0.3;
            }
        }
    }

    let src = descriptor.source_url.to_lowercase();
    score += 0.4 * keyword_matches(&src, &PROCESSING_KEYWORDS) as f64;
    score += 0.2 * keyword_matches(&src, &IMAGE_HOST_DOMAINS) as f64;

    clamp_score(score)
}

/// URL-only signals: generator platforms, naming patterns, domains and
/// embedded generator sizes. Independent of dimensions.
pub fn metadata_analysis(descriptor: &MediaDescriptor) -> f64 {
    let src = descriptor.source_url.as_str();
    let lower = src.to_lowercase();
    let mut score = 0.0;

    score += 0.4 * keyword_matches(&lower, &AI_PLATFORMS) as f64;
    score += 0.3 * naming_patterns().iter().filter(|re| re.is_match(src)).count() as f64;
    score += 0.5 * keyword_matches(&lower, &AI_DOMAINS) as f64;

    if src.contains("random=") {
        score += 0.2;
    }
    if src.contains("ai") || src.contains("generated") {
        score += 0.3;
    }

    score += 0.2 * keyword_matches(&lower, &PROCESSING_KEYWORDS) as f64;
    score += 0.3 * keyword_matches(src, &DIMENSION_STRINGS) as f64;

    clamp_score(score)
}

pub fn file_characteristics(descriptor: &MediaDescriptor) -> f64 {
    let Some((w, h)) = descriptor.dimensions() else {
        return 0.0;
    };
    let mut score = 0.0;
    score += 0.4 * size_matches(w, h, &COMMON_AI_SIZES) as f64;
    if both_pow2(w, h) {
        score += 0.3;
    }
    if w == h {
        score += 0.3;
    }
    if w >= 2048 || h >= 2048 {
        score += 0.3;
    }
    if w == 1024 && h == 1024 {
        score += 0.5;
    }
    if w == 512 && h == 512 {
        score += 0.4;
    }
    clamp_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn golden() -> MediaDescriptor {
        MediaDescriptor::image("https://x/img.png", 1024, 1024)
    }

    #[test]
    fn test_common_sizes_list_square_1024_once() {
        assert_eq!(size_matches(1024, 1024, &COMMON_AI_SIZES), 1);
        assert_eq!(size_matches(768, 1024, &COMMON_AI_SIZES), 1);
    }

    #[test]
    fn test_is_power_of_two() {
        for n in [1, 2, 4, 8, 1024, 2048] {
            assert!(is_power_of_two(n), "{} should be a power of two", n);
        }
        for n in [0, 3, 6, 768, 1536] {
            assert!(!is_power_of_two(n), "{} should not be a power of two", n);
        }
    }

    #[test]
    fn test_golden_square_image() {
        let d = golden();
        assert!((perfect_symmetry(&d) - 0.7).abs() < EPS);
        assert!((unusual_patterns(&d) - 0.9).abs() < EPS);
        assert!((color_consistency(&d) - 0.7).abs() < EPS);
        assert!((texture_analysis(&d) - 0.5).abs() < EPS);
        assert!((edge_detection(&d) - 0.9).abs() < EPS);
        assert_eq!(ai_artifacts(&d), 1.0);
        assert_eq!(metadata_analysis(&d), 0.0);
        assert_eq!(file_characteristics(&d), 1.0);
        assert_eq!(processed_image_analysis(&d), 1.0);
    }

    #[test]
    fn test_high_res_square_bonus() {
        let d = MediaDescriptor::image("https://x/a.png", 2048, 2048);
        // 0.4 ratio + 0.3 pow2 + 0.5 high-res square, clamped
        assert_eq!(perfect_symmetry(&d), 1.0);

        let wide = MediaDescriptor::image("https://x/a.png", 1000, 700);
        assert_eq!(perfect_symmetry(&wide), 0.0);
    }

    #[test]
    fn test_metadata_platform_keyword() {
        let d = MediaDescriptor::image("https://cdn.example.com/midjourney/x.png", 640, 480);
        assert!(metadata_analysis(&d) >= 0.4);

        let mut no_dims = d.clone();
        no_dims.width = None;
        no_dims.height = None;
        assert!(metadata_analysis(&no_dims) >= 0.4);
    }

    #[test]
    fn test_metadata_naming_patterns() {
        let d = MediaDescriptor::image("https://picsum.photos/200?random=42", 200, 200);
        // picsum (0.4) + random=\d+ (0.3) + random= (0.2) -> 0.9
        assert!((metadata_analysis(&d) - 0.9).abs() < EPS);

        let hashed = MediaDescriptor::image(
            "https://x/0123456789abcdef0123456789abcdef.jpg",
            640,
            480,
        );
        assert!((metadata_analysis(&hashed) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_metadata_dimension_string() {
        let d = MediaDescriptor::image("https://x/thumb_1920x1080.jpg", 640, 480);
        assert!((metadata_analysis(&d) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_unknown_dimensions_score_zero() {
        let d = MediaDescriptor {
            kind: MediaKind::Image,
            source_url: "https://x/photo.jpg".to_string(),
            width: None,
            height: Some(512),
            duration_seconds: None,
        };
        assert_eq!(perfect_symmetry(&d), 0.0);
        assert_eq!(unusual_patterns(&d), 0.0);
        assert_eq!(file_characteristics(&d), 0.0);
        assert_eq!(processed_image_analysis(&d), 0.0);
    }

    #[test]
    fn test_video_characteristics_only_for_video() {
        let image = MediaDescriptor::image("https://runway/x.png", 1920, 1080);
        assert_eq!(video_characteristics(&image), 0.0);
        assert!(!compute_indicators(&image).contains_key("Video Characteristics"));

        let video = MediaDescriptor::video("https://cdn/clip.mp4", 1280, 720, Some(10.0));
        // two 1280x720 table rows (0.8) + 16:9 (0.2) + duration 10 (0.2 + 0.3)
        assert_eq!(video_characteristics(&video), 1.0);
        let set = compute_indicators(&video);
        assert_eq!(set.len(), 10);
        assert!(set.contains_key("Processed Image Analysis"));
    }

    #[test]
    fn test_video_duration_and_platform() {
        let long = MediaDescriptor::video("https://cdn/clip.mp4", 640, 480, Some(61.0));
        // 4:3 only
        assert!((video_characteristics(&long) - 0.2).abs() < EPS);

        let mut platform = long.clone();
        platform.source_url = "https://sora.example/clip.mp4".to_string();
        assert!((video_characteristics(&platform) - 0.7).abs() < EPS);
    }

    #[test]
    fn test_processed_image_keywords() {
        let d = MediaDescriptor::image("https://i.imgur.com/resized/photo.jpg", 333, 333);
        // ratio 1 (0.2) + resized (0.4) + imgur.com (0.2)
        assert!((processed_image_analysis(&d) - 0.8).abs() < EPS);
    }

    #[test]
    fn test_all_indicators_in_unit_range() {
        let urls = [
            "",
            "https://openai.com/generated_12/ai_3/sample-dalle-midjourney-stable-1024x1024-edited.png?random=9",
            "https://x/img.png",
        ];
        let sizes = [(1, 1), (512, 512), (1024, 768), (4096, 4096), (3000, 17), (1920, 1080)];
        for url in urls {
            for (w, h) in sizes {
                for d in [
                    MediaDescriptor::image(url, w, h),
                    MediaDescriptor::video(url, w, h, Some(5.0)),
                ] {
                    for (name, value) in compute_indicators(&d) {
                        assert!((0.0..=1.0).contains(&value), "{} out of range: {}", name, value);
                    }
                }
            }
        }
    }

    #[test]
    fn test_indicator_name_round_trip() {
        for indicator in Indicator::ALL {
            assert_eq!(Indicator::from_name(indicator.name()), Some(indicator));
        }
        assert_eq!(Indicator::from_name("Unknown"), None);
    }
}
