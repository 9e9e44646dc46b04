use chrono::{DateTime, Utc};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One displayed message of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only log of turns; insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    turns: Vec<ChatTurn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn all(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
