// visualAI Data Models
// Descriptors, indicator maps, element results and response payloads

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Indicator name -> score in [0, 1]
pub type IndicatorSet = BTreeMap<String, f64>;

// ============ Media Descriptor ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Known metadata for one media element, as supplied by the discovery side.
///
/// Width and height are already resolved (natural size for images, video size
/// for videos) and may be missing while the media is still loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescriptor {
    pub kind: MediaKind,
    #[serde(default)]
    pub source_url: String,
    #[serde(default, deserialize_with = "lenient_dimension")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_dimension")]
    pub height: Option<u32>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// A dimension that is not a non-negative integer within u32 range decodes as
/// missing, so one bad entry leaves only that descriptor unanalyzable.
fn lenient_dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok()))
}

impl MediaDescriptor {
    pub fn image(source_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            kind: MediaKind::Image,
            source_url: source_url.into(),
            width: Some(width),
            height: Some(height),
            duration_seconds: None,
        }
    }

    pub fn video(
        source_url: impl Into<String>,
        width: u32,
        height: u32,
        duration_seconds: Option<f64>,
    ) -> Self {
        Self {
            kind: MediaKind::Video,
            source_url: source_url.into(),
            width: Some(width),
            height: Some(height),
            duration_seconds,
        }
    }

    /// Both dimensions, only when both are present and non-zero
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    pub fn is_analyzable(&self) -> bool {
        self.dimensions().is_some()
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn size_label(&self) -> String {
        match self.dimensions() {
            Some((w, h)) => format!("{}x{}", w, h),
            None => "Unknown".to_string(),
        }
    }
}

// ============ Scoring Results ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementResult {
    pub descriptor: MediaDescriptor,
    pub indicators: IndicatorSet,
    pub ai_score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageAggregate {
    pub ai_probability: f64,
    pub confidence: f64,
    pub indicators: IndicatorSet,
}

// ============ Session Report ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    Success,
    NoMedia,
    NoAnalyzable,
    Error,
}

impl AnalysisStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnalysisStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    /// Unix epoch milliseconds
    pub analyzed_at: i64,
    pub status: AnalysisStatus,
    pub ai_probability: f64,
    pub confidence: f64,
    pub indicators: IndicatorSet,
    pub elements: Vec<ElementResult>,
    pub error_message: Option<String>,
}

// ============ Response Payload ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaElementInfo {
    pub src: String,
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    pub size: String,
    pub ai_score: f64,
    pub ai_probability: f64,
    pub indicators: IndicatorSet,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub confidence: f64,
    pub analyzed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub confidence: f64,
    pub ai_probability: f64,
    pub indicators: IndicatorSet,
    pub media_count: usize,
    pub media_elements: Vec<MediaElementInfo>,
    pub analysis_status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub session_id: String,
    pub analyzed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_status: Option<AnalysisStatus>,
    pub data: AnalysisData,
    /// Set by the command layer when the page crosses the notification threshold
    #[serde(default)]
    pub notify: bool,
}
