//! OpenAI Videos API
//!
//! - `POST /videos` (multipart) creates a job, optionally with an
//!   `input_reference` image
//! - `POST /videos/{id}/remix` starts a new job from an existing one
//! - `GET /videos/{id}` re-fetches status and progress
//! - `GET /videos/{id}/content?variant=video` streams the finished clip
//! - `GET /videos` lists existing jobs

use super::*;
use crate::job::{VideoSeconds, VideoSize};
use futures_util::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

pub struct OpenAIVideoService {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIVideoService {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn create(
        &self,
        model: &str,
        prompt: &str,
        seconds: VideoSeconds,
        size: VideoSize,
        reference: Option<&Path>,
    ) -> Result<Job> {
        let mut form = Form::new()
            .text("model", model.to_string())
            .text("prompt", prompt.to_string())
            .text("seconds", seconds.as_str())
            .text("size", size.as_str());

        if let Some(path) = reference {
            form = form.part("input_reference", reference_part(path).await?);
        }

        let req = self.client
            .post(format!("{}/videos", self.base_url()))
            .multipart(form);
        let response = send(authorize(req, &self.config), "videos::create").await?;
        decode(response, "videos::create").await
    }

    async fn remix(&self, video_id: &str, prompt: &str) -> Result<Job> {
        let req = self.client
            .post(format!("{}/videos/{}/remix", self.base_url(), video_id))
            .json(&RemixRequest { prompt });
        let response = send(authorize(req, &self.config), "videos::remix")
            .await
            .map_err(|e| e.with_context("video_id", video_id))?;
        decode(response, "videos::remix").await
    }
}

impl VideoService for OpenAIVideoService {
    async fn submit(&self, submission: &Submission) -> Result<Job> {
        tracing::debug!(mode = submission.mode(), "submitting video job");
        match submission {
            Submission::Remix { video_id, prompt } => self.remix(video_id, prompt).await,
            Submission::WithReference {
                model,
                prompt,
                seconds,
                size,
                reference,
            } => self.create(model, prompt, *seconds, *size, Some(reference)).await,
            Submission::Create {
                model,
                prompt,
                seconds,
                size,
            } => self.create(model, prompt, *seconds, *size, None).await,
        }
    }

    async fn retrieve(&self, video_id: &str) -> Result<Job> {
        let req = self.client.get(format!("{}/videos/{}", self.base_url(), video_id));
        let response = send(authorize(req, &self.config), "videos::retrieve")
            .await
            .map_err(|e| e.with_context("video_id", video_id))?;
        decode(response, "videos::retrieve").await
    }

    async fn download(&self, video_id: &str, variant: &str, dest: &Path) -> Result<u64> {
        let req = self.client.get(format!(
            "{}/videos/{}/content?variant={}",
            self.base_url(),
            video_id,
            variant
        ));
        let response = send(authorize(req, &self.config), "videos::download")
            .await
            .map_err(|e| e.with_context("video_id", video_id))?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| error::network(e).with_operation("videos::download")));
        let written = write_replacing(stream, dest).await?;

        tracing::debug!(video_id, bytes = written, path = %dest.display(), "downloaded video content");
        Ok(written)
    }

    async fn list(&self) -> Result<Vec<Job>> {
        let req = self.client.get(format!("{}/videos", self.base_url()));
        let response = send(authorize(req, &self.config), "videos::list").await?;
        let page: ListResponse = decode(response, "videos::list").await?;
        Ok(page.into_jobs())
    }
}

/// `dest` with `.part` appended to its file name
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Stream chunks into a sibling `.part` file and rename it over `dest` once
/// every chunk has arrived. On any error `dest` is left as it was.
async fn write_replacing<S, B>(stream: S, dest: &Path) -> Result<u64>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
{
    let mut stream = std::pin::pin!(stream);
    let partial = partial_path(dest);
    let io_err = |e: std::io::Error, path: &Path| {
        Error::from(e)
            .with_operation("videos::download")
            .with_context("path", path.display().to_string())
    };

    let mut file = tokio::fs::File::create(&partial)
        .await
        .map_err(|e| io_err(e, &partial))?;

    let mut written = 0u64;
    let copied: Result<()> = async {
        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            let bytes = bytes.as_ref();
            file.write_all(bytes).await.map_err(|e| io_err(e, &partial))?;
            written += bytes.len() as u64;
        }
        file.flush().await.map_err(|e| io_err(e, &partial))
    }
    .await;
    drop(file);

    if let Err(e) = copied {
        if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
            tracing::debug!(path = %partial.display(), error = %cleanup, "could not remove partial download");
        }
        return Err(e);
    }

    tokio::fs::rename(&partial, dest)
        .await
        .map_err(|e| io_err(e, dest))?;
    Ok(written)
}

/// Reference image as a multipart file part
async fn reference_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        Error::from(e)
            .with_operation("videos::reference_part")
            .with_context("path", path.display().to_string())
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reference".to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(|e| {
            Error::invalid_argument(format!("unusable content type '{}'", mime))
                .with_operation("videos::reference_part")
                .set_source(e)
        })
}

// ============================================================================
// Videos API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct RemixRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

impl ListResponse {
    /// Entries that do not decode as a job are logged and dropped.
    fn into_jobs(self) -> Vec<Job> {
        self.data
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Job>(value) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable video entry");
                    None
                }
            })
            .collect()
    }
}
