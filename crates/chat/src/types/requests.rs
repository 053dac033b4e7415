//! Request payloads and listing options.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ChatMessageType, ChatParticipant, CommunicationIdentifier};

/// Body of a send-message call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatMessageRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_display_name: Option<String>,
    #[serde(rename = "type")]
    pub message_type: ChatMessageType,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl SendChatMessageRequest {
    pub fn new(content: impl Into<String>, message_type: ChatMessageType) -> Self {
        Self {
            content: content.into(),
            sender_display_name: None,
            message_type,
            metadata: HashMap::new(),
        }
    }

    /// Plain-text message
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, ChatMessageType::Text)
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::new(content, ChatMessageType::Html)
    }

    pub fn with_sender_display_name(mut self, name: impl Into<String>) -> Self {
        self.sender_display_name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendChatMessageResult {
    pub id: String,
}

/// Merge-patch body for editing a message. Absent fields are left untouched
/// by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateChatMessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl UpdateChatMessageRequest {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListChatMessagesOptions {
    pub max_page_size: Option<u32>,
    /// Only messages created after this instant.
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListChatThreadsOptions {
    pub max_page_size: Option<u32>,
    /// Only threads updated after this instant.
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListChatParticipantsOptions {
    pub max_page_size: Option<u32>,
    pub skip: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateChatThreadRequest {
    pub topic: String,
    pub participants: Vec<ChatParticipant>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddChatParticipantsRequest {
    pub participants: Vec<ChatParticipant>,
}

pub(crate) type RemoveChatParticipantRequest = CommunicationIdentifier;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_request_omits_empty_optional_fields() {
        let body = serde_json::to_value(SendChatMessageRequest::text("hello")).unwrap();
        assert_eq!(body, json!({ "content": "hello", "type": "text" }));
    }

    #[test]
    fn send_request_includes_metadata_and_sender() {
        let request = SendChatMessageRequest::html("<b>hi</b>")
            .with_sender_display_name("Ada")
            .with_metadata("key1", "value1");
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(
            body,
            json!({
                "content": "<b>hi</b>",
                "senderDisplayName": "Ada",
                "type": "html",
                "metadata": { "key1": "value1" }
            })
        );
    }

    #[test]
    fn update_request_only_serializes_supplied_fields() {
        let body =
            serde_json::to_value(UpdateChatMessageRequest::default().with_metadata("k", "v"))
                .unwrap();
        assert_eq!(body, json!({ "metadata": { "k": "v" } }));

        let body = serde_json::to_value(UpdateChatMessageRequest::content("edited")).unwrap();
        assert_eq!(body, json!({ "content": "edited" }));
    }
}
