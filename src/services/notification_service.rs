use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    #[serde(skip)]
    created_at: Instant,
}

/// Ephemeral toast messages. Nothing is kept once a message expires.
#[derive(Debug)]
pub struct NotificationSink {
    ttl: Duration,
    items: Vec<Notification>,
}

impl NotificationSink {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        let message = message.into();
        match level {
            NotificationLevel::Success => info!(text = %message, "notification"),
            NotificationLevel::Error => warn!(text = %message, "notification"),
        }
        let id = Uuid::new_v4();
        self.items.push(Notification {
            id,
            level,
            message,
            created_at: Instant::now(),
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Error, message)
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drops expired messages and returns the rest, oldest first.
    pub fn active(&mut self) -> Vec<Notification> {
        let ttl = self.ttl;
        self.items.retain(|n| n.created_at.elapsed() < ttl);
        self.items.clone()
    }
}
