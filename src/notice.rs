//! User-visible notices
//!
//! Every operation outcome produces exactly one transient notice. The
//! presentation layer decides how to show them; the core only publishes.

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::state::Button;

/// Capacity of the notice broadcast channel
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// Operation refused because the device is disconnected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusedAction {
    ApplyChanges,
    ButtonPress,
    DeviceReport,
}

/// Link operation that started but did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedAction {
    Connect,
    Disconnect,
    ApplyChanges,
}

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NoticeKind {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    Applying,
    Applied,
    ButtonPressed(Button),
    DeviceUpdated,
    NotConnected(RefusedAction),
    Failed(FailedAction),
    /// Rejected by the single-flight guard; carries the rejected operation
    Busy(&'static str),
}

/// Severity hint for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Loading,
    Success,
    Info,
    Error,
}

impl NoticeKind {
    pub fn level(&self) -> NoticeLevel {
        match self {
            NoticeKind::Connecting | NoticeKind::Disconnecting | NoticeKind::Applying => {
                NoticeLevel::Loading
            }
            NoticeKind::Connected | NoticeKind::Applied => NoticeLevel::Success,
            NoticeKind::Disconnected | NoticeKind::ButtonPressed(_) | NoticeKind::DeviceUpdated => {
                NoticeLevel::Info
            }
            NoticeKind::NotConnected(_) | NoticeKind::Failed(_) | NoticeKind::Busy(_) => {
                NoticeLevel::Error
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            NoticeKind::Connecting => "Connecting to device...".to_string(),
            NoticeKind::Connected => "Device connected!".to_string(),
            NoticeKind::Disconnecting => "Disconnecting from device...".to_string(),
            NoticeKind::Disconnected => "Device disconnected.".to_string(),
            NoticeKind::Applying => "Applying changes to device...".to_string(),
            NoticeKind::Applied => "Changes applied to device!".to_string(),
            NoticeKind::ButtonPressed(button) => format!("Device button '{}' pressed.", button),
            NoticeKind::DeviceUpdated => "Device updated from phone.".to_string(),
            NoticeKind::NotConnected(RefusedAction::ApplyChanges) => {
                "Device not connected. Cannot apply changes.".to_string()
            }
            NoticeKind::NotConnected(RefusedAction::ButtonPress) => {
                "Device not connected. Cannot simulate button press.".to_string()
            }
            NoticeKind::NotConnected(RefusedAction::DeviceReport) => {
                "Device not connected. Ignoring device update.".to_string()
            }
            NoticeKind::Failed(FailedAction::Connect) => "Failed to connect to device.".to_string(),
            NoticeKind::Failed(FailedAction::Disconnect) => {
                "Failed to disconnect from device.".to_string()
            }
            NoticeKind::Failed(FailedAction::ApplyChanges) => {
                "Failed to apply changes to device.".to_string()
            }
            NoticeKind::Busy(op) => format!("Device busy. Cannot {} right now.", op),
        }
    }
}

/// A single timestamped notice
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            level: kind.level(),
            message: kind.message(),
            kind,
            at: Local::now(),
        }
    }
}

/// Publisher side of the notice channel
#[derive(Clone)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a notice; having no listeners is fine
    pub fn publish(&self, kind: NoticeKind) {
        let notice = Notice::new(kind);
        trace!(kind = ?notice.kind, "Notice");
        let _ = self.tx.send(notice);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_listeners() {
        let bus = NoticeBus::new();
        bus.publish(NoticeKind::Connecting);
    }

    #[tokio::test]
    async fn test_listener_receives_in_order() {
        let bus = NoticeBus::new();
        let mut rx = bus.subscribe();

        bus.publish(NoticeKind::Applying);
        bus.publish(NoticeKind::Applied);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, NoticeKind::Applying);
        assert_eq!(first.level, NoticeLevel::Loading);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, NoticeKind::Applied);
        assert_eq!(second.message, "Changes applied to device!");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            NoticeKind::ButtonPressed(Button::Next).message(),
            "Device button 'next' pressed."
        );
        assert_eq!(
            NoticeKind::NotConnected(RefusedAction::ButtonPress).level(),
            NoticeLevel::Error
        );
        assert_eq!(
            NoticeKind::Failed(FailedAction::ApplyChanges).message(),
            "Failed to apply changes to device."
        );
        assert_eq!(NoticeKind::Busy("connect").level(), NoticeLevel::Error);
    }
}
