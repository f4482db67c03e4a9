//! Interactive line input
//!
//! [`Prompter`] is the seam between the interactive flows and the terminal, so
//! the same flows can be driven from a script in tests.

use crate::error::{Error, Result};
use crate::job::{VideoSeconds, VideoSize};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

pub trait Prompter {
    /// Show `message` and read one line (without its line ending).
    /// `None` means the input source is exhausted.
    fn ask(&mut self, message: &str) -> Result<Option<String>>;

    /// Show an informational line.
    fn say(&mut self, message: &str);
}

/// Prompts on stdout, reads from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for StdinPrompter {
    fn ask(&mut self, message: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{}", message)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::from(e).with_operation("prompt::ask"))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Replays canned answers and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub said: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            said: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, message: &str) -> Result<Option<String>> {
        self.asked.push(message.to_string());
        Ok(self.answers.pop_front())
    }

    fn say(&mut self, message: &str) {
        self.said.push(message.to_string());
    }
}

/// Ask for a clip duration until a valid one is given.
///
/// Blank input or end of input returns `None`.
pub fn read_seconds(prompter: &mut impl Prompter) -> Result<Option<VideoSeconds>> {
    let message = format!(
        "Please enter video duration in seconds {} (end with Ctrl-D):",
        VideoSeconds::choices()
    );
    loop {
        let Some(answer) = prompter.ask(&message)? else { return Ok(None) };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        match VideoSeconds::parse(answer) {
            Some(seconds) => return Ok(Some(seconds)),
            None => prompter.say(&format!(
                "'{}' is not one of {}, try again.",
                answer,
                VideoSeconds::choices()
            )),
        }
    }
}

/// Ask for an output size by menu index. Blank or end of input picks the default.
pub fn read_size(prompter: &mut impl Prompter) -> Result<VideoSize> {
    let message = format!(
        "Please choose video size {} (blank for {}):",
        VideoSize::menu(),
        VideoSize::default().as_str()
    );
    loop {
        let Some(answer) = prompter.ask(&message)? else { return Ok(VideoSize::default()) };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(VideoSize::default());
        }
        match VideoSize::from_index(answer) {
            Some(size) => return Ok(size),
            None => prompter.say(&format!(
                "'{}' is not a size number between 1 and {}, try again.",
                answer,
                VideoSize::ALL.len()
            )),
        }
    }
}
