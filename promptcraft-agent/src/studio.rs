//! Video studio - collect a request, submit one job, poll it, fetch the clip

use chrono::Local;
use promptcraft_core::{
    find_reference_image, poll_job, progress_line, read_seconds, read_size, select_submission,
    Error, Job, JobStatus, PollOptions, Prompter, Result, SubmitRequest, Submission, VideoService,
};
use std::io::Write;
use std::path::PathBuf;

const PROMPT_MESSAGE: &str = "Please enter video prompt (end with Ctrl-D):";
const REMIX_MESSAGE: &str =
    "Please enter remix video ID (or leave blank to create new video) (end with Ctrl-D):";

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub model: String,
    /// Searched for a reference image
    pub input_dir: PathBuf,
    /// Overwritten on every successful run
    pub output_path: PathBuf,
    /// Content variant to download
    pub variant: String,
    pub poll: PollOptions,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            model: "sora-2".to_string(),
            input_dir: PathBuf::from("input"),
            output_path: PathBuf::from("video.mp4"),
            variant: "video".to_string(),
            poll: PollOptions::default(),
        }
    }
}

/// How a studio run ended
#[derive(Debug, Clone, PartialEq)]
pub enum StudioOutcome {
    /// No prompt was given; nothing submitted
    NoPrompt,
    /// No duration was given; nothing submitted
    NoSeconds,
    /// The job failed remotely; nothing downloaded
    Failed { job: Job, message: String },
    Completed { job: Job, path: PathBuf, bytes: u64 },
}

/// Drives one video generation from prompt to file.
///
/// Status lines go to `console`, each prefixed with a local `[HH:MM:SS]`
/// timestamp.
pub struct VideoStudio<S: VideoService, W: Write> {
    service: S,
    config: StudioConfig,
    console: W,
}

impl<S: VideoService, W: Write> VideoStudio<S, W> {
    pub fn new(service: S, config: StudioConfig, console: W) -> Self {
        Self {
            service,
            config,
            console,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Give back the console, mostly for inspecting captured output.
    pub fn into_console(self) -> W {
        self.console
    }

    /// Print the jobs the service already knows about.
    pub async fn list_existing(&mut self) -> Result<Vec<Job>> {
        let jobs = self
            .service
            .list()
            .await
            .map_err(|e| e.with_operation("studio::list_existing"))?;

        if jobs.is_empty() {
            log(&mut self.console, "# No existing videos.");
        } else {
            log(&mut self.console, "# Existing videos:");
            for job in &jobs {
                log(&mut self.console, &format!("- {}", job.summary()));
            }
        }
        Ok(jobs)
    }

    /// Ask for prompt, duration, size and remix id.
    /// `Err(outcome)` carries the reason nothing can be submitted.
    pub fn collect_request(
        &self,
        prompter: &mut impl Prompter,
    ) -> Result<std::result::Result<SubmitRequest, StudioOutcome>> {
        let prompt = prompter
            .ask(PROMPT_MESSAGE)?
            .map(|p| p.trim().to_string())
            .unwrap_or_default();
        if prompt.is_empty() {
            return Ok(Err(StudioOutcome::NoPrompt));
        }

        let Some(seconds) = read_seconds(prompter)? else {
            return Ok(Err(StudioOutcome::NoSeconds));
        };
        let size = read_size(prompter)?;

        let remix_of = prompter
            .ask(REMIX_MESSAGE)?
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Ok(SubmitRequest {
            model: self.config.model.clone(),
            prompt,
            seconds,
            size,
            reference: find_reference_image(&self.config.input_dir),
            remix_of,
        }))
    }

    /// List existing videos and collect the request.
    /// `Err(outcome)` means nothing will be submitted.
    pub async fn prepare(
        &mut self,
        prompter: &mut impl Prompter,
    ) -> Result<std::result::Result<Submission, StudioOutcome>> {
        self.list_existing().await?;

        let request = match self.collect_request(prompter)? {
            Ok(request) => request,
            Err(outcome) => {
                tracing::debug!(?outcome, "nothing to submit");
                return Ok(Err(outcome));
            }
        };

        let submission = select_submission(request);
        match &submission {
            Submission::Remix { video_id, .. } => {
                log(&mut self.console, &format!("Remixing video {}...", video_id))
            }
            Submission::WithReference { reference, .. } => log(
                &mut self.console,
                &format!("Using reference image {}", reference.display()),
            ),
            Submission::Create { .. } => {}
        }
        Ok(Ok(submission))
    }

    /// Run the whole flow once.
    pub async fn run(&mut self, prompter: &mut impl Prompter) -> Result<StudioOutcome> {
        match self.prepare(prompter).await? {
            Ok(submission) => self.generate(&submission).await,
            Err(outcome) => Ok(outcome),
        }
    }

    /// Submit one job, wait for it and fetch the clip.
    ///
    /// Nothing is submitted when the poll token is already cancelled.
    pub async fn generate(&mut self, submission: &Submission) -> Result<StudioOutcome> {
        if self.config.poll.cancel.is_cancelled() {
            return Err(Error::cancelled("cancelled before submission")
                .with_operation("studio::generate"));
        }

        let Self {
            service,
            config,
            console,
        } = self;

        let job = service
            .submit(submission)
            .await
            .map_err(|e| e.with_operation("studio::generate"))?;
        log(console, &format!("Video generation started: {}", job.id));

        let job = poll_job(&*service, job, &config.poll, |job| {
            log(console, &progress_line(job))
        })
        .await?;

        if job.status == JobStatus::Failed {
            let message = job.failure_message().to_string();
            log(console, &message);
            return Ok(StudioOutcome::Failed { job, message });
        }

        log(console, "Video generation completed");
        let bytes = service
            .download(&job.id, &config.variant, &config.output_path)
            .await?;
        log(
            console,
            &format!("Wrote {} ({} bytes)", config.output_path.display(), bytes),
        );

        Ok(StudioOutcome::Completed {
            job,
            path: config.output_path.clone(),
            bytes,
        })
    }
}

fn log<W: Write + ?Sized>(console: &mut W, message: &str) {
    let stamp = Local::now().format("%H:%M:%S");
    if let Err(e) = writeln!(console, "[{}] {}", stamp, message) {
        tracing::debug!(error = %e, "failed to write status line");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptcraft_core::{ErrorKind, ScriptedPrompter};
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Replays job observations and records calls
    #[derive(Default)]
    struct MockService {
        existing: Vec<Job>,
        observations: Mutex<VecDeque<Job>>,
        submitted: Mutex<Vec<Submission>>,
        downloads: Mutex<Vec<(String, String, PathBuf)>>,
    }

    impl MockService {
        fn with_observations(jobs: Vec<Job>) -> Self {
            Self {
                observations: Mutex::new(jobs.into()),
                ..Default::default()
            }
        }

        fn next(&self) -> Result<Job> {
            self.observations
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::unexpected("no observation left"))
        }
    }

    impl VideoService for &MockService {
        async fn submit(&self, submission: &Submission) -> Result<Job> {
            self.submitted.lock().unwrap().push(submission.clone());
            self.next()
        }

        async fn retrieve(&self, _video_id: &str) -> Result<Job> {
            self.next()
        }

        async fn download(&self, video_id: &str, variant: &str, dest: &Path) -> Result<u64> {
            std::fs::write(dest, b"mp4")?;
            self.downloads
                .lock()
                .unwrap()
                .push((video_id.to_string(), variant.to_string(), dest.to_path_buf()));
            Ok(3)
        }

        async fn list(&self) -> Result<Vec<Job>> {
            Ok(self.existing.clone())
        }
    }

    fn studio_config(dir: &TempDir) -> StudioConfig {
        StudioConfig {
            input_dir: dir.path().join("input"),
            output_path: dir.path().join("video.mp4"),
            poll: PollOptions::default().with_interval(Duration::from_millis(10)),
            ..Default::default()
        }
    }

    fn console_text(console: Vec<u8>) -> String {
        String::from_utf8(console).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_is_downloaded() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_observations(vec![
            Job::new("video_1", JobStatus::Queued),
            Job::new("video_1", JobStatus::InProgress).with_progress(40.0),
            Job::new("video_1", JobStatus::Completed).with_progress(100.0),
        ]);
        let mut studio = VideoStudio::new(&service, studio_config(&dir), Vec::new());
        let mut prompter = ScriptedPrompter::new(["a cat surfing", "8", "2", ""]);

        let outcome = studio.run(&mut prompter).await.unwrap();
        match outcome {
            StudioOutcome::Completed { job, path, bytes } => {
                assert_eq!(job.id, "video_1");
                assert_eq!(path, dir.path().join("video.mp4"));
                assert_eq!(bytes, 3);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(std::fs::read(dir.path().join("video.mp4")).unwrap(), b"mp4");
        let downloads = service.downloads.lock().unwrap();
        assert_eq!(downloads[0].0, "video_1");
        assert_eq!(downloads[0].1, "video");

        let submitted = service.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].mode(), "create");

        let console = console_text(studio.into_console());
        assert!(console.contains("# No existing videos."));
        assert!(console.contains("Video generation started: video_1"));
        assert!(console.contains("Queued: ["));
        assert!(console.contains("Processing: [============------------------] 40.0%"));
        assert!(console.lines().all(|l| l.starts_with('[')));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_uses_fallback_message() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_observations(vec![
            Job::new("video_2", JobStatus::InProgress),
            Job::new("video_2", JobStatus::Failed),
        ]);
        let mut studio = VideoStudio::new(&service, studio_config(&dir), Vec::new());
        let mut prompter = ScriptedPrompter::new(["storm", "4"]);

        let outcome = studio.run(&mut prompter).await.unwrap();
        match &outcome {
            StudioOutcome::Failed { message, .. } => {
                assert_eq!(message, "Video generation failed.")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(service.downloads.lock().unwrap().is_empty());
        assert!(!dir.path().join("video.mp4").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remix_wins_over_reference_image() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("input")).unwrap();
        std::fs::write(dir.path().join("input/ref.png"), b"png").unwrap();

        let service = MockService::with_observations(vec![
            Job::new("video_4", JobStatus::Failed).with_error("moderation"),
        ]);
        let mut studio = VideoStudio::new(&service, studio_config(&dir), Vec::new());
        let mut prompter = ScriptedPrompter::new(["more rain", "12", "", " video_3 "]);

        let outcome = studio.run(&mut prompter).await.unwrap();
        assert!(matches!(outcome, StudioOutcome::Failed { ref message, .. } if message == "moderation"));
        assert_eq!(
            service.submitted.lock().unwrap()[0],
            Submission::Remix {
                video_id: "video_3".into(),
                prompt: "more rain".into()
            }
        );
    }

    #[tokio::test]
    async fn test_reference_image_is_attached() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("input")).unwrap();
        std::fs::write(dir.path().join("input/A.txt"), "notes").unwrap();
        std::fs::write(dir.path().join("input/B.png"), b"png").unwrap();

        let service = MockService::default();
        let studio = VideoStudio::new(&service, studio_config(&dir), Vec::new());
        let mut prompter = ScriptedPrompter::new(["sunrise", "4", "3"]);

        let request = studio.collect_request(&mut prompter).unwrap().unwrap();
        assert_eq!(request.reference, Some(dir.path().join("input/B.png")));
        assert_eq!(request.remix_of, None);
        assert_eq!(select_submission(request).mode(), "reference");
    }

    #[tokio::test]
    async fn test_missing_prompt_or_duration_submits_nothing() {
        let dir = TempDir::new().unwrap();
        let service = MockService::default();
        let mut studio = VideoStudio::new(&service, studio_config(&dir), Vec::new());

        let mut prompter = ScriptedPrompter::new(["   "]);
        assert_eq!(studio.run(&mut prompter).await.unwrap(), StudioOutcome::NoPrompt);

        let mut prompter = ScriptedPrompter::new(["a prompt"]);
        assert_eq!(studio.run(&mut prompter).await.unwrap(), StudioOutcome::NoSeconds);

        assert!(service.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lists_existing_videos() {
        let dir = TempDir::new().unwrap();
        let service = MockService {
            existing: vec![
                Job::new("video_a", JobStatus::Completed),
                Job::new("video_b", JobStatus::Queued),
            ],
            ..Default::default()
        };
        let mut studio = VideoStudio::new(&service, studio_config(&dir), Vec::new());

        let jobs = studio.list_existing().await.unwrap();
        assert_eq!(jobs.len(), 2);

        let console = console_text(studio.into_console());
        assert!(console.contains("# Existing videos:"));
        assert!(console.contains("- video_a [completed]"));
        assert!(console.contains("- video_b [queued]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_submission_submits_nothing() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_observations(vec![Job::new("video_5", JobStatus::Queued)]);
        let config = studio_config(&dir);
        let cancel = config.poll.cancel.clone();
        let mut studio = VideoStudio::new(&service, config, Vec::new());
        let mut prompter = ScriptedPrompter::new(["waves", "4"]);

        let submission = studio.prepare(&mut prompter).await.unwrap().unwrap();
        // Ctrl-C while the prompts were still open
        cancel.cancel();

        let err = studio.generate(&submission).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(err.operation(), "studio::generate");
        assert!(service.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_polling_skips_download() {
        let dir = TempDir::new().unwrap();
        let service = MockService::with_observations(vec![Job::new("video_6", JobStatus::Queued)]);
        let config = studio_config(&dir);
        let cancel = config.poll.cancel.clone();
        let mut studio = VideoStudio::new(&service, config, Vec::new());
        let mut prompter = ScriptedPrompter::new(["waves", "4"]);

        let submission = studio.prepare(&mut prompter).await.unwrap().unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cancel.cancel();
        });

        let err = studio.generate(&submission).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(service.submitted.lock().unwrap().len(), 1);
        assert!(service.downloads.lock().unwrap().is_empty());
    }
}
