//! Conversation - initial exchange plus follow-up loop

use promptcraft_core::{
    Error, OutputLog, Prompter, ReasoningEffort, Result, TextProvider, TextRequest, Transcript,
    Turn,
};

/// Shown before every follow-up question
pub const FOLLOW_UP_PROMPT: &str =
    "Enter a follow-up question (blank line or Ctrl-D to finish):";

/// Configuration for a conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationConfig {
    /// Model override; the provider default is used when None
    pub model: Option<String>,
    /// Sent unchanged with every request
    pub instructions: String,
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Print progress lines
    pub verbose: bool,
}

/// Owns the transcript for one run and writes every answer to disk.
pub struct Conversation<P: TextProvider> {
    provider: P,
    config: ConversationConfig,
    transcript: Transcript,
    output: OutputLog,
    responses: usize,
}

impl<P: TextProvider> Conversation<P> {
    pub fn new(provider: P, config: ConversationConfig, output: OutputLog) -> Self {
        Self {
            provider,
            config,
            transcript: Transcript::new(),
            output,
            responses: 0,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    /// Number of responses received so far
    pub fn responses(&self) -> usize {
        self.responses
    }

    fn request(&self, input: String) -> TextRequest {
        let mut request = TextRequest::new(input).with_instructions(self.config.instructions.clone());
        if let Some(model) = &self.config.model {
            request = request.with_model(model.clone());
        }
        if let Some(effort) = self.config.reasoning_effort {
            request = request.with_reasoning_effort(effort);
        }
        request
    }

    async fn send(&mut self, input: String) -> Result<String> {
        if self.config.verbose {
            println!(
                "Asking {} ({} chars of input)...",
                self.provider.name(),
                input.len()
            );
        }

        let response = self.provider.respond(self.request(input)).await?;
        tracing::debug!(
            response_id = %response.id,
            model = %response.model,
            chars = response.text.len(),
            "received response"
        );

        let n = self.responses + 1;
        self.output.save_response(n, &response.text)?;
        self.responses = n;
        Ok(response.text)
    }

    /// Send the initial input and start the output log.
    pub async fn start(&mut self, input: &str) -> Result<String> {
        if !self.transcript.is_empty() {
            return Err(Error::invalid_argument("conversation already started")
                .with_operation("conversation::start"));
        }

        self.output.write_provided(&self.config.instructions, input)?;

        let text = self
            .send(input.to_string())
            .await
            .map_err(|e| e.with_operation("conversation::start"))?;

        self.transcript.push(Turn::user(input).with_label("initial input"));
        self.transcript.push(Turn::assistant(text.clone()));
        self.output.write_initial(&self.config.instructions, input, &text)?;

        if self.config.verbose {
            println!("Wrote {}", self.output.path().display());
        }
        Ok(text)
    }

    /// Ask one more question with the whole transcript as context.
    pub async fn follow_up(&mut self, question: &str) -> Result<String> {
        if self.transcript.is_empty() {
            return Err(Error::invalid_argument("conversation has not started")
                .with_operation("conversation::follow_up"));
        }

        // The question only joins the transcript once its answer is stored.
        let n = self.transcript.user_turns();
        let mut pending = self.transcript.clone();
        pending.push(Turn::user(question).with_label(format!("follow-up {}", n)));

        let text = self
            .send(pending.render())
            .await
            .map_err(|e| e.with_operation("conversation::follow_up"))?;

        pending.push(Turn::assistant(text.clone()));
        self.transcript = pending;
        self.output.append_follow_up(n, question, &text)?;
        Ok(text)
    }

    /// Keep asking for follow-ups until a blank line or end of input.
    /// Returns how many follow-ups were exchanged.
    pub async fn run_follow_ups(&mut self, prompter: &mut impl Prompter) -> Result<usize> {
        let mut exchanged = 0;
        loop {
            let Some(question) = prompter.ask(FOLLOW_UP_PROMPT)? else { break };
            if question.trim().is_empty() {
                break;
            }

            let text = self.follow_up(&question).await?;
            prompter.say(&text);
            exchanged += 1;
        }
        tracing::debug!(exchanged, "follow-up loop finished");
        Ok(exchanged)
    }
}
