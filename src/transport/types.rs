//! Chat endpoint wire format.
//!
//! ```text
//! POST /api/chat
//! { "fileId": "...", "message": "...", "chatHistory": [ {id, type, content, timestamp}, ... ] }
//!
//! 200 OK
//! { "response": "..." }
//! ```

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::core::message::{Message, Role};

/// Speaker tag used by the backend. Assistant turns are called "bot".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    User,
    Bot,
}

impl From<Role> for EntryType {
    fn from(role: Role) -> Self {
        match role {
            Role::User => EntryType::User,
            Role::Assistant => EntryType::Bot,
        }
    }
}

/// One prior turn in `chatHistory`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub content: String,
    /// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
    pub timestamp: String,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.0,
            entry_type: message.role.into(),
            content: message.content.clone(),
            timestamp: message.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub file_id: String,
    pub message: String,
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatResponse {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::MessageId;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_request_serializes_with_backend_field_names() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let history = vec![
            Message::assistant(MessageId(1), "Hello!".into(), ts),
            Message::user(MessageId(2), "Hi".into(), ts),
        ];
        let request = ChatRequest {
            file_id: "abc".into(),
            message: "Summarize this".into(),
            chat_history: history.iter().map(HistoryEntry::from).collect(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "fileId": "abc",
                "message": "Summarize this",
                "chatHistory": [
                    {"id": 1, "type": "bot", "content": "Hello!", "timestamp": "2024-05-01T10:00:00.000Z"},
                    {"id": 2, "type": "user", "content": "Hi", "timestamp": "2024-05-01T10:00:00.000Z"}
                ]
            })
        );
    }

    #[test]
    fn test_response_requires_response_field() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"answer":"x"}"#).is_err());
        assert!(serde_json::from_str::<ChatResponse>(r#"{"response":null}"#).is_err());
        let ok: ChatResponse = serde_json::from_str(r#"{"response":"x","extra":1}"#).unwrap();
        assert_eq!(ok.response, "x");
    }
}
