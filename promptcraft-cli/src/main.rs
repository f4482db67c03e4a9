//! # promptcraft CLI
//!
//! Forwards local files and prompts to hosted generative-AI services.
//!
//! Usage:
//!   promptcraft ask [--interactive]
//!   promptcraft chat <question>
//!   promptcraft video
//!   promptcraft videos
//!
//! Examples:
//!   promptcraft ask --instructions instruction --input input --output output.txt
//!   promptcraft ask --model gpt-5 --reasoning-effort high --interactive
//!   promptcraft chat "What is the capital of France?"
//!   promptcraft video --poll-interval 5 --timeout 900

use clap::{Parser, Subcommand};
use promptcraft_agent::{Conversation, ConversationConfig, StudioConfig, StudioOutcome, VideoStudio};
use promptcraft_core::{
    load_api_key, load_input, load_instructions, ChatCompletionsProvider, OpenAIVideoService,
    OutputLog, ProviderConfig, ReasoningEffort, ResponsesProvider, Result, StdinPrompter,
    TextProvider, TextRequest, VideoService,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OPENAI_KEY_FILE: &str = ".api-key";
const XAI_KEY_FILE: &str = ".grok-key";
const DEFAULT_QUESTION: &str = "What is the meaning of life, the universe, and everything?";

#[derive(Parser)]
#[command(name = "promptcraft")]
#[command(author, version, about = "promptcraft - forward local files to hosted AI services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read the API key from this file instead of the default
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send instructions and input files, write the response to a file
    Ask {
        /// Directory of instruction files
        #[arg(long, default_value = "instruction")]
        instructions: PathBuf,

        /// Directory of input files
        #[arg(long, default_value = "input")]
        input: PathBuf,

        /// Cumulative output log
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        #[arg(short, long, default_value = "gpt-5-nano")]
        model: String,

        /// minimal, low, medium or high
        #[arg(long, value_parser = parse_effort)]
        reasoning_effort: Option<ReasoningEffort>,

        /// Keep asking follow-up questions after the first response
        #[arg(short, long)]
        interactive: bool,
    },
    /// Ask xAI a single question
    Chat {
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,

        #[arg(short, long, default_value = "grok-4")]
        model: String,
    },
    /// Generate a video from a prompt, a reference image or an existing video
    Video {
        /// Directory searched for a reference image
        #[arg(long, default_value = "input")]
        input: PathBuf,

        /// Where the finished clip is written
        #[arg(short, long, default_value = "video.mp4")]
        output: PathBuf,

        #[arg(short, long, default_value = "sora-2")]
        model: String,

        /// Seconds between status checks
        #[arg(long, default_value = "2")]
        poll_interval: u64,

        /// Give up waiting after this many seconds (default: wait forever)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List existing videos
    Videos,
}

fn parse_effort(s: &str) -> std::result::Result<ReasoningEffort, String> {
    s.parse::<ReasoningEffort>().map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "promptcraft=debug,promptcraft_core=debug,promptcraft_agent=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn api_key(cli_override: Option<&Path>, default: &str) -> Result<String> {
    load_api_key(cli_override.unwrap_or_else(|| Path::new(default)))
}

/// Split `path` into the directory and file name the output log expects.
fn output_log(path: &Path) -> OutputLog {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.txt".to_string());
    OutputLog::new(dir, file_name)
}

#[allow(clippy::too_many_arguments)]
async fn run_ask(
    key_file: Option<&Path>,
    instructions_dir: &Path,
    input_dir: &Path,
    output: &Path,
    model: String,
    reasoning_effort: Option<ReasoningEffort>,
    interactive: bool,
    verbose: bool,
) -> Result<()> {
    let input = load_input(input_dir);
    if input.trim().is_empty() {
        println!("No input data found.");
        return Ok(());
    }
    let instructions = load_instructions(instructions_dir);
    if instructions.trim().is_empty() {
        println!("No instructions found.");
        return Ok(());
    }

    let key = api_key(key_file, OPENAI_KEY_FILE)?;
    let provider = ResponsesProvider::new(ProviderConfig::openai(key))?;
    let config = ConversationConfig {
        model: Some(model),
        instructions,
        reasoning_effort,
        verbose,
    };
    let mut conversation = Conversation::new(provider, config, output_log(output));

    let response = conversation.start(&input).await?;
    println!("{}", response);
    println!("\nResponse written to {}", conversation.output().path().display());

    if interactive {
        let mut prompter = StdinPrompter::new();
        let exchanged = conversation.run_follow_ups(&mut prompter).await?;
        tracing::debug!(exchanged, "interactive session finished");
    }
    Ok(())
}

async fn run_chat(key_file: Option<&Path>, question: Vec<String>, model: String) -> Result<()> {
    let question = if question.is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        question.join(" ")
    };

    let key = api_key(key_file, XAI_KEY_FILE)?;
    let provider = ChatCompletionsProvider::new(ProviderConfig::xai(key))?;
    let response = provider
        .respond(TextRequest::new(question).with_model(model))
        .await?;
    println!("{}", response.text);
    Ok(())
}

fn video_service(key_file: Option<&Path>) -> Result<OpenAIVideoService> {
    let key = api_key(key_file, OPENAI_KEY_FILE)?;
    OpenAIVideoService::new(ProviderConfig::openai(key))
}

async fn run_video(
    key_file: Option<&Path>,
    input: PathBuf,
    output: PathBuf,
    model: String,
    poll_interval: u64,
    timeout: Option<u64>,
) -> Result<()> {
    let service = video_service(key_file)?;

    let mut config = StudioConfig {
        model,
        input_dir: input,
        output_path: output,
        ..Default::default()
    };
    config.poll = config.poll.with_interval(Duration::from_secs(poll_interval.max(1)));
    if let Some(secs) = timeout {
        config.poll = config.poll.with_deadline(Duration::from_secs(secs));
    }

    let cancel = config.poll.cancel.clone();
    let mut studio = VideoStudio::new(service, config, std::io::stdout());
    let mut prompter = StdinPrompter::new();

    // Ctrl-C keeps its default meaning while the prompts are open; only the
    // submit/poll phase listens for it.
    let outcome = match studio.prepare(&mut prompter).await? {
        Ok(submission) => {
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });
            studio.generate(&submission).await?
        }
        Err(outcome) => outcome,
    };

    match outcome {
        StudioOutcome::NoPrompt => println!("No prompt given."),
        StudioOutcome::NoSeconds => println!("No duration given."),
        StudioOutcome::Failed { job, .. } => tracing::debug!(job_id = %job.id, "job failed"),
        StudioOutcome::Completed { path, .. } => tracing::debug!(path = %path.display(), "video saved"),
    }
    Ok(())
}

async fn run_videos(key_file: Option<&Path>) -> Result<()> {
    let service = video_service(key_file)?;
    let jobs = service.list().await?;
    if jobs.is_empty() {
        println!("No existing videos.");
    }
    for job in jobs {
        println!("{}", job.summary());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let key_file = cli.key_file.as_deref();

    let result = match cli.command {
        Commands::Ask {
            instructions,
            input,
            output,
            model,
            reasoning_effort,
            interactive,
        } => {
            run_ask(
                key_file,
                &instructions,
                &input,
                &output,
                model,
                reasoning_effort,
                interactive,
                cli.verbose,
            )
            .await
        }
        Commands::Chat { question, model } => run_chat(key_file, question, model).await,
        Commands::Video {
            input,
            output,
            model,
            poll_interval,
            timeout,
        } => run_video(key_file, input, output, model, poll_interval, timeout).await,
        Commands::Videos => run_videos(key_file).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
