use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationCategory {
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient_id: u64,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    /// the leave request this is about
    pub correlated_entity_id: Option<u64>,
}

impl Notification {
    pub fn leave(recipient_id: u64, request_id: u64, title: &str, message: String) -> Self {
        Self {
            recipient_id,
            title: title.to_string(),
            message,
            category: NotificationCategory::Leave,
            correlated_entity_id: Some(request_id),
        }
    }
}
