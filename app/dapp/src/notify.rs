//! # Notifications
//!
//! Transient user-facing messages. A notification nobody receives falls back
//! to the log, so a missing subscriber never hides an outcome.
use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{debug, error, info};

const CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

#[derive(Clone)]
pub struct Notifier {
    sender: Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);

        Self { sender }
    }

    pub fn subscribe(&self) -> Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(Level::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(Level::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(Level::Error, message.into());
    }

    /// Returns whether any subscriber received the notification.
    fn send(&self, level: Level, message: String) -> bool {
        let notification = Notification { level, message };

        match self.sender.send(notification) {
            Ok(_) => {
                debug!("Notified {level:?}");
                true
            }
            // Nobody is listening, the log is the only place it shows up.
            Err(broadcast::error::SendError(Notification { level, message })) => {
                match level {
                    Level::Error => error!("{message}"),
                    Level::Info | Level::Success => info!("{message}"),
                }
                false
            }
        }
    }
}
