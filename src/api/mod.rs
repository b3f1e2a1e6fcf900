// Command Handlers
// In-process endpoints the host messaging layer dispatches to

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{AnalysisResponse, AnalysisStatus, MediaDescriptor};
use crate::services::config_store::{ConfigStore, DetectorSettings};
use crate::services::detection::{build_response, DetectionSession};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DetectorRequest {
    AnalyzeContent {
        #[serde(default)]
        media: Vec<MediaDescriptor>,
    },
    Test,
    GetSettings,
    UpdateSettings {
        settings: DetectorSettings,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_status: Option<AnalysisStatus>,
}

impl CommandAck {
    fn ok(message: Option<&str>) -> Self {
        Self {
            success: true,
            message: message.map(str::to_string),
            error: None,
            analysis_status: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error),
            analysis_status: Some(AnalysisStatus::Error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub settings: DetectorSettings,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetectorResponse {
    Analysis(Box<AnalysisResponse>),
    Settings(SettingsResponse),
    Ack(CommandAck),
}

/// Run a detection session over the supplied media and shape the response
pub async fn analyze_content(
    media: Vec<MediaDescriptor>,
    settings: &DetectorSettings,
) -> AnalysisResponse {
    let mut session = DetectionSession::new().with_max_concurrency(settings.max_concurrency);
    info!(
        "[API] analyzeContent session={} candidates={}",
        session.id(),
        media.len()
    );
    let report = session.run_async(&media).await;
    let mut response = build_response(&report);
    response.notify = response.success && settings.should_notify(report.ai_probability);
    response
}

pub fn ping() -> CommandAck {
    CommandAck::ok(Some("Content script is loaded"))
}

/// Current settings; unreadable config falls back to defaults
pub fn get_settings(store: &ConfigStore) -> DetectorSettings {
    store.get_settings().unwrap_or_else(|e| {
        warn!("[API] getSettings fell back to defaults: {}", e);
        DetectorSettings::default()
    })
}

pub fn update_settings(store: &ConfigStore, settings: DetectorSettings) -> Result<(), String> {
    if !(0.0..=1.0).contains(&settings.analysis_threshold) {
        return Err(format!(
            "analysisThreshold must be within [0, 1], got {}",
            settings.analysis_threshold
        ));
    }
    store.update_settings(settings)
}

pub struct CommandHandler {
    store: ConfigStore,
}

impl CommandHandler {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    pub async fn handle(&self, request: DetectorRequest) -> DetectorResponse {
        match request {
            DetectorRequest::AnalyzeContent { media } => {
                let settings = get_settings(&self.store);
                DetectorResponse::Analysis(Box::new(analyze_content(media, &settings).await))
            }
            DetectorRequest::Test => DetectorResponse::Ack(ping()),
            DetectorRequest::GetSettings => DetectorResponse::Settings(SettingsResponse {
                settings: get_settings(&self.store),
            }),
            DetectorRequest::UpdateSettings { settings } => {
                match update_settings(&self.store, settings) {
                    Ok(()) => DetectorResponse::Ack(CommandAck::ok(None)),
                    Err(e) => {
                        warn!("[API] updateSettings failed: {}", e);
                        DetectorResponse::Ack(CommandAck::failed(e))
                    }
                }
            }
        }
    }

    /// Decode a raw message, dispatch it, and encode the reply
    pub async fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<DetectorRequest>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("[API] Rejected malformed request: {}", e);
                DetectorResponse::Ack(CommandAck::failed(format!("Invalid request: {}", e)))
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"{}","analysisStatus":"error"}}"#, e)
        })
    }
}
