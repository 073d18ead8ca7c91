// ABOUTME: Transient user-facing notifications produced by the dashboard.

use std::time::Duration;

use serde::Serialize;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A short message shown for `ttl` and then dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip)]
    pub ttl: Duration,
}

impl Notification {
    pub fn info(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(NoticeLevel::Info, message, ttl)
    }

    pub fn success(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(NoticeLevel::Success, message, ttl)
    }

    pub fn error(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(NoticeLevel::Error, message, ttl)
    }

    fn new(level: NoticeLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            ttl,
        }
    }
}
