//! Toast queue shared by every page action.
//!
//! Toasts are enqueued with a time to live, shown until they expire or
//! the user dismisses them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 16;
pub const MAX_TTL_SECS: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Time to live for a toast, capped at one day.
pub fn ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

#[derive(Debug)]
pub struct NotificationQueue {
    capacity: usize,
    next_id: u64,
    items: VecDeque<Notification>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl NotificationQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: 1,
            items: VecDeque::new(),
        }
    }

    pub fn enqueue(
        &mut self,
        level: Level,
        message: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(Notification {
            id,
            level,
            message: message.into(),
            created_at: now,
            expires_at: now + ttl,
        });
        id
    }

    /// Drops expired toasts and returns what is still on screen, oldest first.
    pub fn visible(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        self.items.retain(|item| item.expires_at > now);
        self.items.iter().cloned().collect()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }
}
