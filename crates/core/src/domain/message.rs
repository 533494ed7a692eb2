use crate::domain::analysis::Analysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub analysis: Option<Analysis>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, text.into(), None)
    }

    pub fn assistant(text: impl Into<String>, analysis: Option<Analysis>) -> Self {
        Self::new(Author::Assistant, text.into(), analysis)
    }

    fn new(author: Author, text: String, analysis: Option<Analysis>) -> Self {
        Self {
            id: MessageId::new(),
            author,
            text,
            created_at: Utc::now(),
            analysis,
        }
    }
}
