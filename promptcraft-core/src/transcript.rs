//! # Conversation transcript
//!
//! The remote text APIs are stateless per call, so a conversation is kept
//! locally as an append-only list of turns and flattened into a single prompt
//! before every request.

use serde::{Deserialize, Serialize};

/// Closing line of every rendered transcript.
pub const CONTINUE_INSTRUCTION: &str =
    "Respond to the most recent user message above, taking the whole conversation into account.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            label: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Header line naming the speaker, e.g. `### User (follow-up 2)`
    pub fn header(&self) -> String {
        match &self.label {
            Some(label) => format!("### {} ({})", self.role.as_str(), label),
            None => format!("### {}", self.role.as_str()),
        }
    }
}

/// Ordered history of turns. Turns can only be appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of user turns so far
    pub fn user_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::User).count()
    }

    pub fn render(&self) -> String {
        render_transcript(&self.turns)
    }
}

/// Render turns, in order, into one prompt block ending with
/// [`CONTINUE_INSTRUCTION`].
pub fn render_transcript(turns: &[Turn]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str(&turn.header());
        out.push('\n');
        out.push_str(turn.content.trim_end());
        out.push_str("\n\n");
    }
    out.push_str(CONTINUE_INSTRUCTION);
    out.push('\n');
    out
}
