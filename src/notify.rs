//! User-facing notification side channel.
//!
//! Store and session operations emit transient status messages here;
//! whatever surface is attached (terminal, toasts) subscribes. Sends
//! with no live subscriber are dropped silently.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Broadcasts notifications to any number of subscribers.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<broadcast::Sender<Notification>>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        let _ = self.sender.send(Notification::new(Level::Info, message));
    }

    pub fn success(&self, message: impl Into<String>) {
        let _ = self.sender.send(Notification::new(Level::Success, message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        let _ = self.sender.send(Notification::new(Level::Warning, message));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_receives_in_order() {
        let notifier = Notifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.info("Agent is searching for missing data...");
        notifier.success("Blocker resolved by agent");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, Level::Info);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, Level::Success);
        assert_eq!(second.message, "Blocker resolved by agent");
    }

    #[test]
    fn send_without_subscribers_is_silent() {
        let notifier = Notifier::new(8);
        notifier.warn("Job stopped");
    }

    #[test]
    fn late_subscriber_misses_earlier_sends() {
        let notifier = Notifier::new(8);
        notifier.info("before subscribe");
        let mut rx = notifier.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
