use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::day_key::DayKey;
use crate::error::CoreError;

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(CoreError::InvalidRole(other.to_owned())),
        }
    }
}

/// One side of a conversation turn. Never mutated once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}_{}", role.as_str(), uuid::Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp,
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::User, content, timestamp)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::Assistant, content, timestamp)
    }

    /// Flattens the message into its persisted form.
    #[must_use]
    pub fn to_record(&self, user_id: &str, day_key: &DayKey) -> ConversationRecord {
        ConversationRecord {
            id: self.id.clone(),
            user_id: user_id.to_owned(),
            role: self.role,
            content: self.content.clone(),
            day_key: day_key.as_str().to_owned(),
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Persisted shape of a message: flat, with an ISO-8601 timestamp string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationRecord {
    pub id: String,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub day_key: String,
    pub timestamp: String,
}

impl TryFrom<ConversationRecord> for Message {
    type Error = CoreError;

    fn try_from(record: ConversationRecord) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .map_err(|source| CoreError::InvalidTimestamp {
                value: record.timestamp.clone(),
                source,
            })?
            .with_timezone(&Utc);
        Ok(Self { id: record.id, role: record.role, content: record.content, timestamp })
    }
}
