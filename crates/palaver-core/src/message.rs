//! Message and conversation log types shared by the store, renderer and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the conversation a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub direction: Direction,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn sent(text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            direction: Direction::Sent,
            text: text.into(),
            sent_at,
        }
    }

    pub fn received(text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            direction: Direction::Received,
            text: text.into(),
            sent_at,
        }
    }
}

/// Append-only, insertion-ordered conversation log.
///
/// Insertion order is display order; nothing here sorts or edits messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    messages: Vec<Message>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
