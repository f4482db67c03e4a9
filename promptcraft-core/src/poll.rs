//! # Job poll loop
//!
//! Re-fetches a job at a fixed interval until it reaches a terminal state.
//! The observer sees every non-terminal observation (used for the progress
//! bar); it has no influence on the state transitions.
//!
//! The loop is unbounded by default. A deadline and a cancellation token can
//! be supplied through [`PollOptions`].

use crate::error::{Error, Result};
use crate::job::Job;
use crate::provider::VideoService;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Width of the progress bar in characters
pub const PROGRESS_BAR_WIDTH: usize = 30;

#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between status fetches
    pub interval: Duration,
    /// Give up once this much time has passed (None = wait forever)
    pub deadline: Option<Duration>,
    /// Checked before every wait and while waiting
    pub cancel: CancellationToken,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Poll `job` until it is `completed` or `failed` and return that observation.
///
/// A job that is already terminal is returned without any fetch.
pub async fn poll_job<S, F>(
    service: &S,
    job: Job,
    options: &PollOptions,
    mut on_progress: F,
) -> Result<Job>
where
    S: VideoService,
    F: FnMut(&Job),
{
    let started = Instant::now();
    let mut job = job;
    let mut fetches = 0usize;

    loop {
        if job.is_terminal() {
            tracing::debug!(job_id = %job.id, status = %job.status, fetches, "job reached terminal state");
            return Ok(job);
        }

        on_progress(&job);

        tokio::select! {
            _ = options.cancel.cancelled() => {
                return Err(Error::cancelled("polling cancelled")
                    .with_operation("poll::poll_job")
                    .with_context("job_id", job.id.clone()));
            }
            _ = tokio::time::sleep(options.interval) => {}
        }

        if let Some(deadline) = options.deadline {
            if started.elapsed() >= deadline {
                return Err(Error::timeout(format!(
                    "job still {} after {:?}",
                    job.status, deadline
                ))
                .with_operation("poll::poll_job")
                .with_context("job_id", job.id.clone())
                .with_context("fetches", fetches.to_string()));
            }
        }

        let id = job.id.clone();
        job = service
            .retrieve(&id)
            .await
            .map_err(|e| e.with_operation("poll::poll_job"))?;
        fetches += 1;
        tracing::trace!(job_id = %job.id, status = %job.status, progress = job.progress, "polled job");
    }
}

/// `=` for the completed share of `width`, `-` for the rest.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let progress = if progress.is_finite() { progress.clamp(0.0, 100.0) } else { 0.0 };
    let filled = ((progress / 100.0) * width as f64) as usize;
    let filled = filled.min(width);
    format!("{}{}", "=".repeat(filled), "-".repeat(width - filled))
}

/// `Processing: [=========---------------------] 30.0%`
pub fn progress_line(job: &Job) -> String {
    format!(
        "{}: [{}] {:.1}%",
        job.status.display_label(),
        progress_bar(job.progress, PROGRESS_BAR_WIDTH),
        job.progress
    )
}
