// Detection Session
// Drives one analysis request: intake -> filter -> per-element scoring -> aggregation.
// Every failure is folded into the returned report; nothing escapes the session.

use crate::models::{AnalysisStatus, ElementResult, IndicatorSet, MediaDescriptor, SessionReport};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use super::aggregation::aggregate_elements;
use super::element_scorer::score_element;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("No images or videos found on this page")]
    NoMediaFound,
    #[error("Found media but unable to analyze (CORS restrictions or invalid images)")]
    NoAnalyzableMedia,
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),
    #[error("Media discovery failed: {0}")]
    Collector(String),
}

impl DetectionError {
    pub fn status(&self) -> AnalysisStatus {
        match self {
            DetectionError::NoMediaFound => AnalysisStatus::NoMedia,
            DetectionError::NoAnalyzableMedia => AnalysisStatus::NoAnalyzable,
            DetectionError::AnalysisFailure(_) | DetectionError::Collector(_) => {
                AnalysisStatus::Error
            }
        }
    }
}

/// Source of candidate media for a session (page discovery lives behind this)
pub trait MediaCollector {
    fn collect(&self) -> Result<Vec<MediaDescriptor>, DetectionError>;
}

impl MediaCollector for [MediaDescriptor] {
    fn collect(&self) -> Result<Vec<MediaDescriptor>, DetectionError> {
        Ok(self.to_vec())
    }
}

impl MediaCollector for Vec<MediaDescriptor> {
    fn collect(&self) -> Result<Vec<MediaDescriptor>, DetectionError> {
        Ok(self.clone())
    }
}

/// One analysis request. Starts `Pending` and runs exactly once.
#[derive(Debug)]
pub struct DetectionSession {
    id: String,
    status: AnalysisStatus,
    max_concurrency: usize,
}

impl Default for DetectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: AnalysisStatus::Pending,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    /// Run the session on the calling thread
    pub fn run<C: MediaCollector + ?Sized>(&mut self, collector: &C) -> SessionReport {
        let started = Instant::now();
        let outcome: Result<Vec<ElementResult>, DetectionError> = self.begin().and_then(|_| {
            guarded("analysis", || {
                intake(collector).map(|media| media.iter().map(score_element).collect())
            })
        });
        self.finish(outcome, started)
    }

    /// Run the session with per-element scoring fanned out over tokio tasks
    pub async fn run_async<C: MediaCollector + ?Sized>(&mut self, collector: &C) -> SessionReport {
        let started = Instant::now();
        let outcome = match self
            .begin()
            .and_then(|_| guarded("media intake", || intake(collector)))
        {
            Ok(media) => score_concurrently(media, self.max_concurrency).await,
            Err(e) => Err(e),
        };
        self.finish(outcome, started)
    }

    fn begin(&self) -> Result<(), DetectionError> {
        if self.status.is_terminal() {
            return Err(DetectionError::AnalysisFailure(format!(
                "session {} already completed",
                self.id
            )));
        }
        Ok(())
    }

    fn finish(
        &mut self,
        outcome: Result<Vec<ElementResult>, DetectionError>,
        started: Instant,
    ) -> SessionReport {
        let analyzed_at = chrono::Utc::now().timestamp_millis();
        let report = match outcome {
            Ok(elements) => {
                let page = aggregate_elements(&elements);
                info!(
                    "[SESSION] {} success: elements={}, ai_probability={:.3}, confidence={:.3}, elapsed_ms={}",
                    self.id,
                    elements.len(),
                    page.ai_probability,
                    page.confidence,
                    started.elapsed().as_millis()
                );
                SessionReport {
                    session_id: self.id.clone(),
                    analyzed_at,
                    status: AnalysisStatus::Success,
                    ai_probability: page.ai_probability,
                    confidence: page.confidence,
                    indicators: page.indicators,
                    elements,
                    error_message: None,
                }
            }
            Err(e) => {
                match e {
                    DetectionError::NoMediaFound | DetectionError::NoAnalyzableMedia => {
                        info!("[SESSION] {} finished without results: {}", self.id, e)
                    }
                    _ => warn!("[SESSION] {} failed: {}", self.id, e),
                }
                SessionReport {
                    session_id: self.id.clone(),
                    analyzed_at,
                    status: e.status(),
                    ai_probability: 0.0,
                    confidence: 0.0,
                    indicators: IndicatorSet::new(),
                    elements: Vec::new(),
                    error_message: Some(e.to_string()),
                }
            }
        };
        self.status = report.status;
        report
    }
}

/// Run a session stage, turning a panic into `AnalysisFailure`
fn guarded<T>(
    stage: &str,
    f: impl FnOnce() -> Result<T, DetectionError>,
) -> Result<T, DetectionError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(DetectionError::AnalysisFailure(format!(
            "{} panicked: {}",
            stage,
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Collect candidates and keep the analyzable ones
fn intake<C: MediaCollector + ?Sized>(collector: &C) -> Result<Vec<MediaDescriptor>, DetectionError> {
    let media = collector.collect()?;
    if media.is_empty() {
        return Err(DetectionError::NoMediaFound);
    }
    let total = media.len();
    let analyzable: Vec<MediaDescriptor> = media.into_iter().filter(|m| m.is_analyzable()).collect();
    info!(
        "[SESSION] Intake: {} candidates, {} analyzable",
        total,
        analyzable.len()
    );
    if analyzable.is_empty() {
        return Err(DetectionError::NoAnalyzableMedia);
    }
    Ok(analyzable)
}

/// Fork-join scoring; results come back in intake order
async fn score_concurrently(
    media: Vec<MediaDescriptor>,
    max_concurrency: usize,
) -> Result<Vec<ElementResult>, DetectionError> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut join_set: JoinSet<Result<(usize, ElementResult), DetectionError>> = JoinSet::new();

    for (index, descriptor) in media.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|_| DetectionError::AnalysisFailure("semaphore closed".to_string()))?;
            Ok((index, score_element(&descriptor)))
        });
    }

    let mut scored: Vec<(usize, ElementResult)> = Vec::with_capacity(join_set.len());
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok(item) => scored.push(item?),
            Err(e) => {
                join_set.abort_all();
                return Err(DetectionError::AnalysisFailure(format!(
                    "scoring task failed: {}",
                    e
                )));
            }
        }
    }

    scored.sort_by_key(|(index, _)| *index);
    Ok(scored.into_iter().map(|(_, element)| element).collect())
}

/// Analyze a descriptor list in a fresh session (sync version)
pub fn analyze_descriptors(media: &[MediaDescriptor]) -> SessionReport {
    DetectionSession::new().run(media)
}

/// Analyze a descriptor list in a fresh session with concurrent scoring
pub async fn analyze_descriptors_async(
    media: &[MediaDescriptor],
    max_concurrency: usize,
) -> SessionReport {
    DetectionSession::new()
        .with_max_concurrency(max_concurrency)
        .run_async(media)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    const EPS: f64 = 1e-9;

    struct FailingCollector;

    impl MediaCollector for FailingCollector {
        fn collect(&self) -> Result<Vec<MediaDescriptor>, DetectionError> {
            Err(DetectionError::Collector("document not ready".to_string()))
        }
    }

    struct PanickingCollector;

    impl MediaCollector for PanickingCollector {
        fn collect(&self) -> Result<Vec<MediaDescriptor>, DetectionError> {
            panic!("collector blew up")
        }
    }

    fn unloaded(url: &str) -> MediaDescriptor {
        MediaDescriptor {
            kind: MediaKind::Image,
            source_url: url.to_string(),
            width: None,
            height: None,
            duration_seconds: None,
        }
    }

    fn page() -> Vec<MediaDescriptor> {
        vec![
            MediaDescriptor::image("https://x/img.png", 1024, 1024),
            unloaded("https://x/lazy.jpg"),
            MediaDescriptor::image("https://x/photo.jpg", 640, 427),
            MediaDescriptor::video("https://cdn/clip.mp4", 1920, 1080, Some(12.0)),
        ]
    }

    #[test]
    fn test_empty_input_reports_no_media() {
        let report = analyze_descriptors(&[]);
        assert_eq!(report.status, AnalysisStatus::NoMedia);
        assert_eq!(report.ai_probability, 0.0);
        assert_eq!(report.confidence, 0.0);
        assert!(report.elements.is_empty());
        assert_eq!(
            report.error_message.as_deref(),
            Some("No images or videos found on this page")
        );
    }

    #[test]
    fn test_unanalyzable_only_reports_no_analyzable() {
        let mut zero = MediaDescriptor::image("https://x/zero.png", 0, 300);
        zero.kind = MediaKind::Video;
        let report = analyze_descriptors(&[unloaded("https://x/a.jpg"), zero]);
        assert_eq!(report.status, AnalysisStatus::NoAnalyzable);
        assert_eq!(report.ai_probability, 0.0);
        assert_eq!(report.confidence, 0.0);
        assert!(report.elements.is_empty());
        assert_ne!(
            report.error_message,
            analyze_descriptors(&[]).error_message
        );
    }

    #[test]
    fn test_success_filters_and_keeps_order() {
        let mut session = DetectionSession::new();
        assert_eq!(session.status(), AnalysisStatus::Pending);
        let report = session.run(&page());
        assert_eq!(session.status(), AnalysisStatus::Success);
        assert_eq!(report.status, AnalysisStatus::Success);
        assert_eq!(report.session_id, session.id());
        assert_eq!(report.elements.len(), 3);
        assert_eq!(report.elements[0].descriptor.source_url, "https://x/img.png");
        assert_eq!(report.elements[2].descriptor.kind, MediaKind::Video);
        // three elements -> element confidence 0.8
        let score_conf = if report.ai_probability > 0.5 { 0.8 } else { 0.6 };
        assert!((report.confidence - (score_conf + 0.8) / 2.0).abs() < EPS);
        assert!(report.error_message.is_none());
    }

    #[test]
    fn test_collector_fault_reports_error() {
        let mut session = DetectionSession::new();
        let report = session.run(&FailingCollector);
        assert_eq!(report.status, AnalysisStatus::Error);
        assert_eq!(report.ai_probability, 0.0);
        assert!(report
            .error_message
            .unwrap_or_default()
            .contains("document not ready"));
    }

    #[test]
    fn test_panicking_collector_reports_error() {
        let mut session = DetectionSession::new();
        let report = session.run(&PanickingCollector);
        assert_eq!(session.status(), AnalysisStatus::Error);
        assert_eq!(report.status, AnalysisStatus::Error);
        assert!(report.elements.is_empty());
        assert!(report
            .error_message
            .unwrap_or_default()
            .contains("collector blew up"));
    }

    #[test]
    fn test_session_runs_once() {
        let mut session = DetectionSession::new();
        let first = session.run(&page());
        assert_eq!(first.status, AnalysisStatus::Success);
        let second = session.run(&page());
        assert_eq!(second.status, AnalysisStatus::Error);
        assert!(second.elements.is_empty());
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let media = page();
        let sync_report = analyze_descriptors(&media);
        let async_report = analyze_descriptors_async(&media, 2).await;
        assert_eq!(async_report.status, AnalysisStatus::Success);
        assert_eq!(sync_report.elements, async_report.elements);
        assert!((sync_report.ai_probability - async_report.ai_probability).abs() < EPS);
        assert!((sync_report.confidence - async_report.confidence).abs() < EPS);
        assert_eq!(sync_report.indicators, async_report.indicators);
    }

    #[tokio::test]
    async fn test_async_failure_paths() {
        let report = analyze_descriptors_async(&[], 4).await;
        assert_eq!(report.status, AnalysisStatus::NoMedia);

        let mut session = DetectionSession::new().with_max_concurrency(0);
        let report = session.run_async(&FailingCollector).await;
        assert_eq!(report.status, AnalysisStatus::Error);

        let mut session = DetectionSession::new();
        let report = session.run_async(&PanickingCollector).await;
        assert_eq!(report.status, AnalysisStatus::Error);
        assert!(report
            .error_message
            .unwrap_or_default()
            .contains("media intake panicked"));
    }
}
