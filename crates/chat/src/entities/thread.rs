use serde::{Deserialize, Serialize};

use super::participant::CommunicationIdentifier;

/// Properties of a chat thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    pub id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub created_by_communication_identifier: Option<CommunicationIdentifier>,
    #[serde(default)]
    pub deleted_on: Option<String>,
}

impl ChatThread {
    /// User id of the thread's creator, when the service reported one
    pub fn created_by(&self) -> Option<&str> {
        self.created_by_communication_identifier
            .as_ref()
            .map(CommunicationIdentifier::user_id)
    }
}

/// Summary row returned when listing threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThreadItem {
    pub id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub deleted_on: Option<String>,
    #[serde(default)]
    pub last_message_received_on: Option<String>,
}

/// A participant the service refused to add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidParticipant {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatThreadResult {
    pub chat_thread: ChatThread,
    #[serde(default)]
    pub invalid_participants: Vec<InvalidParticipant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_result_tolerates_minimal_body() {
        let result: CreateChatThreadResult =
            serde_json::from_str(r#"{"chatThread":{"id":"th-1","topic":"topic"}}"#).unwrap();
        assert_eq!(result.chat_thread.id, "th-1");
        assert_eq!(result.chat_thread.topic, "topic");
        assert!(result.chat_thread.created_by().is_none());
        assert!(result.invalid_participants.is_empty());
    }

    #[test]
    fn create_result_reports_rejected_participants() {
        let result: CreateChatThreadResult = serde_json::from_str(
            r#"{
                "chatThread": {
                    "id": "th-2",
                    "topic": "t",
                    "createdOn": "2021-09-07T10:00:00Z",
                    "createdByCommunicationIdentifier": {
                        "rawId": "8:acs:owner",
                        "communicationUser": { "id": "8:acs:owner" }
                    }
                },
                "invalidParticipants": [
                    { "target": "8:acs:nope", "code": "404", "message": "not found" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(result.chat_thread.created_by(), Some("8:acs:owner"));
        assert_eq!(result.invalid_participants[0].target, "8:acs:nope");
    }
}
