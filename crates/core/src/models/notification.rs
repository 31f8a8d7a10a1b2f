use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Error,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "Success"),
            NotificationKind::Error => write!(f, "Error"),
        }
    }
}

/// Transient banner shown after a mutation or analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            expires_at: now + ttl,
        }
    }

    pub fn error(message: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
