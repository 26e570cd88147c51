//! Customer notifications (order updates, promotions, account notices).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NotificationId;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Promo,
    #[default]
    Account,
}

impl NotificationKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Order => "Order update",
            Self::Promo => "Promotion",
            Self::Account => "Account",
        }
    }
}

/// A notification as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Number of unread notifications.
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Mark one notification read locally. Returns `false` if not found.
pub fn mark_read(notifications: &mut [Notification], id: NotificationId) -> bool {
    notifications
        .iter_mut()
        .find(|n| n.id == id)
        .map(|n| n.read = true)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: i32, read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id),
            title: format!("Update {id}"),
            body: String::new(),
            kind: NotificationKind::Order,
            read,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unread_count_and_mark_read() {
        let mut notifications = vec![notification(1, false), notification(2, true)];
        assert_eq!(unread_count(&notifications), 1);
        assert!(mark_read(&mut notifications, NotificationId::new(1)));
        assert_eq!(unread_count(&notifications), 0);
        assert!(!mark_read(&mut notifications, NotificationId::new(9)));
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let json = r#"{"id":4,"title":"Welcome","created_at":"2026-10-01T08:00:00Z"}"#;
        let parsed: Result<Notification, _> = serde_json::from_str(json);
        assert!(parsed.is_ok_and(|n| !n.read && n.kind == NotificationKind::Account));
    }
}
