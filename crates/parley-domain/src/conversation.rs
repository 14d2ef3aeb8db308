//! Conversation module - interview turns and model chat messages

use serde::{Deserialize, Serialize};

/// Who authored an interview turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The interviewing analyst (played by the model)
    Analyst,

    /// The interviewed persona (played by the model)
    Persona,
}

impl Role {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Analyst => "analyst",
            Role::Persona => "persona",
        }
    }
}

/// A single role-tagged interview message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author of the turn
    pub role: Role,

    /// Message text
    pub text: String,
}

/// Role of a message sent to the language model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions
    System,
    /// The counterpart the model is talking to
    User,
    /// The model's own earlier output
    Assistant,
}

impl ChatRole {
    /// Wire name used by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A message in the history handed to a model call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: ChatRole,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only transcript of one interview
///
/// The index of the most recent analyst turn is tracked explicitly so the
/// termination check never has to infer it from positions in the history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    last_analyst: Option<usize>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an analyst turn and return its index
    pub fn push_analyst(&mut self, text: impl Into<String>) -> usize {
        let index = self.turns.len();
        self.turns.push(ConversationTurn {
            role: Role::Analyst,
            text: text.into(),
        });
        self.last_analyst = Some(index);
        index
    }

    /// Append a persona turn and return its index
    pub fn push_persona(&mut self, text: impl Into<String>) -> usize {
        let index = self.turns.len();
        self.turns.push(ConversationTurn {
            role: Role::Persona,
            text: text.into(),
        });
        index
    }

    /// All turns in order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Total number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns authored by a role
    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// The most recent analyst question, if any
    pub fn last_analyst_turn(&self) -> Option<&ConversationTurn> {
        self.last_analyst.and_then(|idx| self.turns.get(idx))
    }

    /// The most recent turn of any role
    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Render the transcript as role-prefixed text, one turn per line block
    ///
    /// Analyst turns are prefixed with `Analyst`, persona turns with the
    /// persona's name.
    pub fn render(&self, persona_name: &str) -> String {
        self.turns
            .iter()
            .map(|turn| match turn.role {
                Role::Analyst => format!("Analyst: {}", turn.text),
                Role::Persona => format!("{}: {}", persona_name, turn.text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert the transcript into a chat history seen from one side
    ///
    /// Turns authored by `speaker` become assistant messages; the other
    /// side's turns become user messages.
    pub fn as_chat(&self, speaker: Role) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| {
                if turn.role == speaker {
                    ChatMessage::assistant(turn.text.clone())
                } else {
                    ChatMessage::user(turn.text.clone())
                }
            })
            .collect()
    }
}
