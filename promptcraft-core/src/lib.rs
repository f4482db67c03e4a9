//! # promptcraft core
//!
//! Building blocks for forwarding local files to hosted generative-AI APIs.
//!
//! ## Core Concepts
//! - **Transcript**: append-only list of user/assistant turns, rendered into one prompt
//! - **Job**: a remote video generation task, polled until it reaches a terminal state
//! - **Inputs**: instruction and input directories collected into prompt text
//! - **Output**: the cumulative output log and numbered raw responses
//! - **Provider**: trait-based access to the remote services (OpenAI, xAI)

pub mod error;
pub mod config;
pub mod transcript;
pub mod job;
pub mod poll;
pub mod inputs;
pub mod output;
pub mod prompt;
pub mod provider;

pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use config::{load_api_key, ProviderConfig, ProviderType};
pub use transcript::{render_transcript, Role, Transcript, Turn, CONTINUE_INSTRUCTION};
pub use job::{
    select_submission, Job, JobError, JobStatus, SubmitRequest, Submission, VideoSeconds,
    VideoSize, FAILED_FALLBACK_MESSAGE,
};
pub use poll::{poll_job, progress_bar, progress_line, PollOptions, PROGRESS_BAR_WIDTH};
pub use inputs::{find_reference_image, load_input, load_instructions, IMAGE_EXTENSIONS};
pub use output::OutputLog;
pub use prompt::{read_seconds, read_size, Prompter, ScriptedPrompter, StdinPrompter};
pub use provider::{
    ChatCompletionsProvider, OpenAIVideoService, ReasoningEffort, ResponsesProvider,
    TextProvider, TextRequest, TextResponse, VideoService,
};
