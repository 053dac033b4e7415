use serde::{Deserialize, Serialize};

/// A caller-supplied reference to a user who should join a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatUser {
    pub id: String,
    pub display_name: String,
}

impl ChatUser {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationUser {
    pub id: String,
}

/// Wire identity of a chat participant or message sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationIdentifier {
    #[serde(default)]
    pub raw_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_user: Option<CommunicationUser>,
}

impl CommunicationIdentifier {
    /// Identifier for a communication user id.
    pub fn user(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            raw_id: id.clone(),
            communication_user: Some(CommunicationUser { id }),
        }
    }

    /// The communication user id, falling back to the raw id.
    pub fn user_id(&self) -> &str {
        self.communication_user
            .as_ref()
            .map(|user| user.id.as_str())
            .unwrap_or(self.raw_id.as_str())
    }
}

/// A member of a chat thread as the service sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    pub communication_identifier: CommunicationIdentifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Point from which the participant can read thread history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_history_time: Option<String>,
}

impl From<&ChatUser> for ChatParticipant {
    fn from(user: &ChatUser) -> Self {
        Self {
            communication_identifier: CommunicationIdentifier::user(user.id.clone()),
            display_name: Some(user.display_name.clone()),
            share_history_time: None,
        }
    }
}
