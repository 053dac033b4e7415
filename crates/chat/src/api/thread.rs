use tracing::{debug, info, instrument};

use super::{Call, ChatClient};
use crate::endpoint::QueryParams;
use crate::entities::{ChatParticipant, ChatThreadsCollection, ChatUser, CreateChatThreadResult};
use crate::types::requests::CreateChatThreadRequest;
use crate::types::{ChatResult, ListChatThreadsOptions};

impl ChatClient {
    /// Create a thread with an initial participant list. Participants the
    /// service refuses are reported in the result rather than failing the call.
    #[instrument(skip(self, participants), fields(participants = participants.len()))]
    pub async fn create_chat_thread(
        &self,
        topic: &str,
        participants: &[ChatUser],
    ) -> ChatResult<CreateChatThreadResult> {
        let body = CreateChatThreadRequest {
            topic: topic.to_string(),
            participants: participants.iter().map(ChatParticipant::from).collect(),
        };
        let url = self.endpoint.url(&["chat", "threads"], &QueryParams::new())?;

        let result: CreateChatThreadResult = self.execute(Call::post_json(url, &body)?).await?;

        if !result.invalid_participants.is_empty() {
            debug!(
                rejected = result.invalid_participants.len(),
                "service rejected some participants"
            );
        }
        info!(thread_id = %result.chat_thread.id, "chat thread created");
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn delete_chat_thread(&self, thread_id: &str) -> ChatResult<()> {
        let url = self
            .endpoint
            .url(&["chat", "threads", thread_id], &QueryParams::new())?;
        self.execute_empty(Call::delete(url)).await?;
        info!("chat thread deleted");
        Ok(())
    }

    pub async fn list_chat_threads(
        &self,
        options: &ListChatThreadsOptions,
    ) -> ChatResult<ChatThreadsCollection> {
        let query = QueryParams::new()
            .push_opt("maxPageSize", options.max_page_size.filter(|size| *size > 0))
            .push_time("startTime", options.start_time);
        let url = self.endpoint.url(&["chat", "threads"], &query)?;
        self.execute(Call::get(url)).await
    }
}
