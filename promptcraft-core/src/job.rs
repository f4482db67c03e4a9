//! # Video generation jobs
//!
//! A [`Job`] is created by a submission call and afterwards only changes by
//! re-fetching it from the remote service. `completed` and `failed` are
//! terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Message surfaced when a failed job carries no error of its own.
pub const FAILED_FALLBACK_MESSAGE: &str = "Video generation failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Label used in progress lines
    pub fn display_label(&self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::InProgress => "Processing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a failed job by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A remote video generation job, as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Percent complete, 0-100
    #[serde(default, deserialize_with = "de_progress")]
    pub progress: f64,
    #[serde(default)]
    pub error: Option<JobError>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "de_seconds")]
    pub seconds: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub remixed_from_video_id: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            progress: 0.0,
            error: None,
            model: None,
            size: None,
            seconds: None,
            created_at: None,
            remixed_from_video_id: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress.clamp(0.0, 100.0);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(JobError {
            code: None,
            message: Some(message.into()),
        });
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The remote error message, or [`FAILED_FALLBACK_MESSAGE`].
    pub fn failure_message(&self) -> &str {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(FAILED_FALLBACK_MESSAGE)
    }

    /// One-line description for listings
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} [{}]", self.id, self.status)];
        if let Some(model) = &self.model {
            parts.push(model.clone());
        }
        if let Some(size) = &self.size {
            parts.push(size.clone());
        }
        if let Some(seconds) = &self.seconds {
            parts.push(format!("{}s", seconds));
        }
        if let Some(source) = &self.remixed_from_video_id {
            parts.push(format!("remix of {}", source));
        }
        if let Some(created) = self.created_at.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) {
            parts.push(format!("created {}", created.format("%Y-%m-%d %H:%M UTC")));
        }
        parts.join(" ")
    }
}

fn de_progress<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or(0.0).clamp(0.0, 100.0))
}

/// The service reports seconds as a string; accept a bare number too.
fn de_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// Enumerated selections
// ============================================================================

/// Allowed clip durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSeconds {
    Four,
    Eight,
    Twelve,
}

impl VideoSeconds {
    pub const ALL: [VideoSeconds; 3] = [VideoSeconds::Four, VideoSeconds::Eight, VideoSeconds::Twelve];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSeconds::Four => "4",
            VideoSeconds::Eight => "8",
            VideoSeconds::Twelve => "12",
        }
    }

    /// Parse user input; anything outside the set is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == input.trim())
    }

    /// `[4, 8, 12]`
    pub fn choices() -> String {
        let values: Vec<_> = Self::ALL.iter().map(|s| s.as_str()).collect();
        format!("[{}]", values.join(", "))
    }
}

/// Allowed output dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSize {
    #[default]
    Landscape720,
    Portrait720,
    Landscape1024,
    Portrait1024,
}

impl VideoSize {
    pub const ALL: [VideoSize; 4] = [
        VideoSize::Landscape720,
        VideoSize::Portrait720,
        VideoSize::Landscape1024,
        VideoSize::Portrait1024,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSize::Landscape720 => "1280x720",
            VideoSize::Portrait720 => "720x1280",
            VideoSize::Landscape1024 => "1792x1024",
            VideoSize::Portrait1024 => "1024x1792",
        }
    }

    /// Select by 1-based index as shown in the menu
    pub fn from_index(index: &str) -> Option<Self> {
        let n: usize = index.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// `1) 1280x720  2) 720x1280 ...`
    pub fn menu() -> String {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}) {}", i + 1, s.as_str()))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

// ============================================================================
// Submission
// ============================================================================

/// Everything collected before a job is submitted
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub model: String,
    pub prompt: String,
    pub seconds: VideoSeconds,
    pub size: VideoSize,
    pub reference: Option<PathBuf>,
    pub remix_of: Option<String>,
}

/// The single creation request that will be issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Remix {
        video_id: String,
        prompt: String,
    },
    WithReference {
        model: String,
        prompt: String,
        seconds: VideoSeconds,
        size: VideoSize,
        reference: PathBuf,
    },
    Create {
        model: String,
        prompt: String,
        seconds: VideoSeconds,
        size: VideoSize,
    },
}

impl Submission {
    pub fn mode(&self) -> &'static str {
        match self {
            Submission::Remix { .. } => "remix",
            Submission::WithReference { .. } => "reference",
            Submission::Create { .. } => "create",
        }
    }
}

/// Pick the submission mode: remix, else reference image, else plain prompt.
pub fn select_submission(request: SubmitRequest) -> Submission {
    let SubmitRequest {
        model,
        prompt,
        seconds,
        size,
        reference,
        remix_of,
    } = request;

    if let Some(video_id) = remix_of.filter(|id| !id.trim().is_empty()) {
        return Submission::Remix {
            video_id: video_id.trim().to_string(),
            prompt,
        };
    }

    match reference {
        Some(reference) => Submission::WithReference {
            model,
            prompt,
            seconds,
            size,
            reference,
        },
        None => Submission::Create {
            model,
            prompt,
            seconds,
            size,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SubmitRequest {
        SubmitRequest {
            model: "sora-2".into(),
            prompt: "a cat on a skateboard".into(),
            seconds: VideoSeconds::Four,
            size: VideoSize::default(),
            reference: None,
            remix_of: None,
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_decode_full_job() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": "video_68d",
            "object": "video",
            "model": "sora-2",
            "status": "in_progress",
            "progress": 33,
            "created_at": 1759938772,
            "size": "1280x720",
            "seconds": "8",
            "error": null
        }))
        .unwrap();

        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.progress, 33.0);
        assert_eq!(job.seconds.as_deref(), Some("8"));
        assert!(job.error.is_none());
        assert_eq!(
            job.summary(),
            "video_68d [in_progress] sora-2 1280x720 8s created 2025-10-08 15:52 UTC"
        );
    }

    #[test]
    fn test_decode_minimal_job() {
        let job: Job = serde_json::from_str(r#"{"id": "v1", "status": "queued"}"#).unwrap();
        assert_eq!(job.progress, 0.0);
        assert!(job.model.is_none());

        let job: Job =
            serde_json::from_str(r#"{"id": "v1", "status": "queued", "progress": null, "seconds": 4}"#)
                .unwrap();
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.seconds.as_deref(), Some("4"));
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        assert!(serde_json::from_str::<Job>(r#"{"id": "v1", "status": "exploded"}"#).is_err());
    }

    #[test]
    fn test_failure_message() {
        let job = Job::new("v1", JobStatus::Failed);
        assert_eq!(job.failure_message(), "Video generation failed.");

        let job: Job = serde_json::from_value(serde_json::json!({
            "id": "v1",
            "status": "failed",
            "error": {"code": "moderation_blocked"}
        }))
        .unwrap();
        assert_eq!(job.failure_message(), FAILED_FALLBACK_MESSAGE);

        let job = Job::new("v1", JobStatus::Failed).with_error("prompt rejected");
        assert_eq!(job.failure_message(), "prompt rejected");
    }

    #[test]
    fn test_video_seconds_parse() {
        assert_eq!(VideoSeconds::parse("4"), Some(VideoSeconds::Four));
        assert_eq!(VideoSeconds::parse(" 12 "), Some(VideoSeconds::Twelve));
        assert_eq!(VideoSeconds::parse("abc"), None);
        assert_eq!(VideoSeconds::parse("5"), None);
        assert_eq!(VideoSeconds::choices(), "[4, 8, 12]");
    }

    #[test]
    fn test_video_size_from_index() {
        assert_eq!(VideoSize::from_index("1"), Some(VideoSize::Landscape720));
        assert_eq!(VideoSize::from_index("4"), Some(VideoSize::Portrait1024));
        assert_eq!(VideoSize::from_index("0"), None);
        assert_eq!(VideoSize::from_index("5"), None);
        assert_eq!(VideoSize::from_index("x"), None);
        assert!(VideoSize::menu().starts_with("1) 1280x720"));
    }

    #[test]
    fn test_remix_takes_priority() {
        let mut req = request();
        req.reference = Some(PathBuf::from("input/ref.png"));
        req.remix_of = Some(" video_abc ".into());

        assert_eq!(
            select_submission(req),
            Submission::Remix {
                video_id: "video_abc".into(),
                prompt: "a cat on a skateboard".into(),
            }
        );
    }

    #[test]
    fn test_reference_before_plain() {
        let mut req = request();
        req.reference = Some(PathBuf::from("input/ref.png"));
        req.remix_of = Some("   ".into());

        let submission = select_submission(req);
        assert_eq!(submission.mode(), "reference");
    }

    #[test]
    fn test_plain_create() {
        assert_eq!(select_submission(request()).mode(), "create");
    }
}
