use tracing::{info, instrument};

use super::{Call, ChatClient};
use crate::endpoint::QueryParams;
use crate::entities::{
    ChatParticipant, ChatParticipantsCollection, ChatUser, CommunicationIdentifier,
};
use crate::types::requests::{AddChatParticipantsRequest, RemoveChatParticipantRequest};
use crate::types::{ChatResult, ListChatParticipantsOptions};

impl ChatClient {
    #[instrument(skip(self, participants), fields(participants = participants.len()))]
    pub async fn add_chat_participants(
        &self,
        thread_id: &str,
        participants: &[ChatUser],
    ) -> ChatResult<()> {
        let body = AddChatParticipantsRequest {
            participants: participants.iter().map(ChatParticipant::from).collect(),
        };
        let url = self.endpoint.url(
            &["chat", "threads", thread_id, "participants", ":add"],
            &QueryParams::new(),
        )?;

        self.execute_empty(Call::post_json(url, &body)?).await?;
        info!("participants added");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_chat_participant(&self, thread_id: &str, user_id: &str) -> ChatResult<()> {
        let body: RemoveChatParticipantRequest = CommunicationIdentifier::user(user_id);
        let url = self.endpoint.url(
            &["chat", "threads", thread_id, "participants", ":remove"],
            &QueryParams::new(),
        )?;

        self.execute_empty(Call::post_json(url, &body)?).await?;
        info!("participant removed");
        Ok(())
    }

    pub async fn list_chat_participants(
        &self,
        thread_id: &str,
        options: &ListChatParticipantsOptions,
    ) -> ChatResult<ChatParticipantsCollection> {
        let query = QueryParams::new()
            .push_opt("maxPageSize", options.max_page_size.filter(|size| *size > 0))
            .push_opt("skip", options.skip.filter(|skip| *skip > 0));
        let url = self
            .endpoint
            .url(&["chat", "threads", thread_id, "participants"], &query)?;
        self.execute(Call::get(url)).await
    }
}
