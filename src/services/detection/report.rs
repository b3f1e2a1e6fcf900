// Report payload
// Flattens a session report into the response shape the popup renders

use crate::models::{
    AnalysisData, AnalysisResponse, AnalysisStatus, ElementResult, MediaElementInfo, SessionReport,
};

/// Elements scoring above this are labelled AI-generated
pub const AI_ELEMENT_THRESHOLD: f64 = 0.6;

pub fn media_element_info(element: &ElementResult, analyzed_at: i64) -> MediaElementInfo {
    MediaElementInfo {
        src: element.descriptor.source_url.clone(),
        media_type: element.descriptor.kind,
        size: element.descriptor.size_label(),
        ai_score: element.ai_score,
        ai_probability: element.ai_score,
        indicators: element.indicators.clone(),
        is_ai: element.ai_score > AI_ELEMENT_THRESHOLD,
        confidence: element.confidence,
        analyzed_at,
    }
}

pub fn build_response(report: &SessionReport) -> AnalysisResponse {
    let success = report.status == AnalysisStatus::Success;
    let media_elements: Vec<MediaElementInfo> = report
        .elements
        .iter()
        .map(|e| media_element_info(e, report.analyzed_at))
        .collect();

    AnalysisResponse {
        success,
        error: if success { None } else { report.error_message.clone() },
        analysis_status: if success { None } else { Some(report.status) },
        data: AnalysisData {
            confidence: report.confidence,
            ai_probability: report.ai_probability,
            indicators: report.indicators.clone(),
            media_count: media_elements.len(),
            media_elements,
            analysis_status: report.status,
            error_message: if success { None } else { report.error_message.clone() },
            session_id: report.session_id.clone(),
            analyzed_at: report.analyzed_at,
        },
        notify: false,
    }
}
