use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::participant::{ChatParticipant, CommunicationIdentifier};

/// Kind of a chat message. The last three are emitted by the service itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatMessageType {
    Text,
    Html,
    TopicUpdated,
    ParticipantAdded,
    ParticipantRemoved,
}

impl ChatMessageType {
    /// Whether the message was written by a user rather than the service
    pub fn is_user_content(&self) -> bool {
        matches!(self, ChatMessageType::Text | ChatMessageType::Html)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageContent {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub participants: Vec<ChatParticipant>,
    #[serde(default)]
    pub initiator_communication_identifier: Option<CommunicationIdentifier>,
}

/// A message within a chat thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: ChatMessageType,
    #[serde(default)]
    pub sequence_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub content: Option<ChatMessageContent>,
    #[serde(default)]
    pub sender_display_name: Option<String>,
    #[serde(default)]
    pub created_on: String,
    #[serde(default)]
    pub sender_communication_identifier: Option<CommunicationIdentifier>,
    #[serde(default)]
    pub deleted_on: Option<String>,
    #[serde(default)]
    pub edited_on: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ChatMessage {
    pub fn sender_id(&self) -> Option<&str> {
        self.sender_communication_identifier
            .as_ref()
            .map(CommunicationIdentifier::user_id)
    }

    /// Body of a text or html message
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref()?.message.as_deref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_on.is_some()
    }

    pub fn is_edited(&self) -> bool {
        self.edited_on.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_message() {
        let message: ChatMessage = serde_json::from_str(
            r#"{
                "id": "1631234567890",
                "type": "text",
                "sequenceId": "3",
                "version": "1631234567890",
                "content": { "message": "golang msg test" },
                "senderDisplayName": "test",
                "createdOn": "2021-09-10T00:42:47Z",
                "senderCommunicationIdentifier": {
                    "rawId": "8:acs:sender",
                    "communicationUser": { "id": "8:acs:sender" }
                },
                "editedOn": "2021-09-10T00:43:00Z",
                "metadata": { "key3": "value3" }
            }"#,
        )
        .unwrap();

        assert_eq!(message.message_type, ChatMessageType::Text);
        assert_eq!(message.text(), Some("golang msg test"));
        assert_eq!(message.sender_id(), Some("8:acs:sender"));
        assert!(message.is_edited());
        assert!(!message.is_deleted());
        assert_eq!(message.metadata.get("key3").map(String::as_str), Some("value3"));
    }

    #[test]
    fn parses_system_message_content() {
        let message: ChatMessage = serde_json::from_str(
            r#"{
                "id": "2",
                "type": "participantAdded",
                "sequenceId": "1",
                "version": "2",
                "content": {
                    "participants": [
                        { "communicationIdentifier": { "rawId": "8:acs:new" }, "displayName": "New" }
                    ],
                    "initiatorCommunicationIdentifier": { "rawId": "8:acs:owner" }
                },
                "createdOn": "2021-09-10T00:42:47Z"
            }"#,
        )
        .unwrap();

        assert!(!message.message_type.is_user_content());
        assert!(message.sender_id().is_none());
        let content = message.content.expect("content");
        assert_eq!(content.participants.len(), 1);
    }
}
